//! Observer client - stays connected to the notification hub.
//!
//! The client connects as soon as it is spawned. While connected it
//! dispatches every event to the handlers registered for its kind and
//! evicts the cache keys the event makes stale. When the connection drops
//! it retries with bounded exponential backoff and, once the ceiling is
//! reached, gives up until asked to reconnect manually. The hub never
//! replays missed events, so every connection after the first clears the
//! cache and asks the hub for the current session list.
//!
//! ```text
//!   spawn ──► Connecting ──ok──► Connected ──lost──┐
//!                 ▲   │                            │
//!                 │   └──failed──► Disconnected ◄──┘
//!                 │                    │
//!                 └── timer fired ◄────┤ Retry { attempt, delay }
//!                 └── reconnect() ◄────┘ GiveUp { attempts }
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::domain::foundation::{DomainError, ErrorCode, StateMachine};
use crate::domain::notification::{ClientMessage, EventKind, HubEvent, ServerMessage};
use crate::ports::{Connector, ObserverTransport, Scheduler, Timer, TransportError};

use super::backoff::{Backoff, BackoffPolicy, ReconnectDecision};
use super::cache::{CacheKey, ViewCache};
use super::state::ClientState;

/// Callback invoked for each event of a registered kind.
pub type EventHandler = Box<dyn Fn(&HubEvent) + Send + Sync>;

const COMMAND_BUFFER: usize = 16;

// ════════════════════════════════════════════════════════════════════════════
// Errors and signals
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// No usable connection to the hub.
    #[error("Transport unavailable: {0}")]
    TransportUnavailable(String),

    #[error("Observer client has shut down")]
    Closed,
}

impl ClientError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ClientError::TransportUnavailable(_) => ErrorCode::TransportUnavailable,
            ClientError::Closed => ErrorCode::InternalError,
        }
    }
}

impl From<ClientError> for DomainError {
    fn from(err: ClientError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}

impl From<TransportError> for ClientError {
    fn from(err: TransportError) -> Self {
        ClientError::TransportUnavailable(err.to_string())
    }
}

/// Lifecycle notifications emitted by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverSignal {
    Connected,
    Disconnected,
    ReconnectScheduled { attempt: u32, delay: Duration },
    /// Terminal until [`ObserverHandle::reconnect`] is called.
    GaveUp { attempts: u32 },
}

enum Command {
    Send(ClientMessage, oneshot::Sender<Result<(), ClientError>>),
    Reconnect,
    Shutdown,
}

// ════════════════════════════════════════════════════════════════════════════
// Core state
// ════════════════════════════════════════════════════════════════════════════

/// Connection state, backoff and dispatch, with no I/O.
pub struct ObserverCore {
    state: ClientState,
    backoff: Backoff,
    gave_up: bool,
    handlers: HashMap<EventKind, Vec<EventHandler>>,
    cache: Arc<ViewCache>,
}

impl ObserverCore {
    pub fn new(policy: BackoffPolicy, cache: Arc<ViewCache>) -> Self {
        Self {
            state: ClientState::Disconnected,
            backoff: Backoff::new(policy),
            gave_up: false,
            handlers: HashMap::new(),
            cache,
        }
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    pub fn attempt(&self) -> u32 {
        self.backoff.attempt()
    }

    pub fn has_given_up(&self) -> bool {
        self.gave_up
    }

    pub fn register(&mut self, kind: EventKind, handler: EventHandler) {
        self.handlers.entry(kind).or_default().push(handler);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────────

    pub fn begin_connect(&mut self) {
        self.move_to(ClientState::Connecting);
    }

    /// Connected: the attempt counter starts over.
    pub fn connection_established(&mut self) {
        self.move_to(ClientState::Connected);
        self.backoff.reset();
        self.gave_up = false;
    }

    /// Connection failed or dropped. Decides whether to retry.
    pub fn connection_lost(&mut self) -> ReconnectDecision {
        self.move_to(ClientState::Disconnected);
        let decision = self.backoff.next();
        if let ReconnectDecision::GiveUp { .. } = decision {
            self.gave_up = true;
        }
        decision
    }

    /// User-initiated reconnect clears the give-up and the attempt counter.
    pub fn manual_reconnect(&mut self) {
        if self.state != ClientState::Disconnected {
            self.move_to(ClientState::Disconnected);
        }
        self.backoff.reset();
        self.gave_up = false;
    }

    /// Drop every cached view. Used when events may have been missed.
    pub fn forget_views(&self) {
        let evicted = self.cache.len();
        self.cache.clear();
        tracing::debug!(evicted, "Cleared cached views");
    }

    fn move_to(&mut self, target: ClientState) {
        match self.state.transition_to(target) {
            Ok(next) => self.state = next,
            Err(e) => tracing::warn!(error = %e, "Ignoring invalid observer transition"),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Dispatch
    // ─────────────────────────────────────────────────────────────────────────

    /// Handle one message from the hub.
    pub fn dispatch(&self, message: &ServerMessage) {
        match message {
            ServerMessage::Event { event } => self.dispatch_event(event),
            ServerMessage::State { sessions } => match serde_json::to_value(sessions) {
                Ok(value) => self.cache.put(CacheKey::Sessions, value),
                Err(e) => tracing::warn!(error = %e, "Failed to cache session state"),
            },
            ServerMessage::Connected { observer_id, .. } => {
                tracing::debug!(observer_id = %observer_id, "Hub acknowledged observer");
            }
            ServerMessage::Pong { .. } => tracing::trace!("Received pong"),
            ServerMessage::Error { code, message } => {
                tracing::warn!(code = %code, message = %message, "Hub reported an error");
            }
        }
    }

    fn dispatch_event(&self, event: &HubEvent) {
        let evicted = self.cache.apply(event);
        if !evicted.is_empty() {
            tracing::trace!(event_type = %event.kind(), evicted = evicted.len(), "Cache invalidated");
        }
        if let Some(handlers) = self.handlers.get(&event.kind()) {
            for handler in handlers {
                handler(event);
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Client builder
// ════════════════════════════════════════════════════════════════════════════

/// Configures handlers, then spawns the connection driver.
///
/// # Example
///
/// ```ignore
/// let handle = ObserverClient::new(BackoffPolicy::default())
///     .on(EventKind::SessionStateChanged, |event| println!("{:?}", event))
///     .spawn(Arc::new(WsConnector::new(url)), Arc::new(TokioScheduler));
/// ```
pub struct ObserverClient {
    core: ObserverCore,
    cache: Arc<ViewCache>,
}

impl ObserverClient {
    pub fn new(policy: BackoffPolicy) -> Self {
        let cache = Arc::new(ViewCache::new());
        Self {
            core: ObserverCore::new(policy, Arc::clone(&cache)),
            cache,
        }
    }

    /// Register a handler for one event kind. Several handlers per kind run
    /// in registration order.
    pub fn on<F>(mut self, kind: EventKind, handler: F) -> Self
    where
        F: Fn(&HubEvent) + Send + Sync + 'static,
    {
        self.core.register(kind, Box::new(handler));
        self
    }

    pub fn cache(&self) -> Arc<ViewCache> {
        Arc::clone(&self.cache)
    }

    /// Start connecting immediately in a background task.
    pub fn spawn(
        self,
        connector: Arc<dyn Connector>,
        scheduler: Arc<dyn Scheduler>,
    ) -> ObserverHandle {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (state_tx, state_rx) = watch::channel(ClientState::Disconnected);
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();

        let driver = Driver {
            core: self.core,
            connector,
            scheduler,
            commands: command_rx,
            state: state_tx,
            signals: signal_tx,
            connected_before: false,
        };
        let task = tokio::spawn(driver.run());

        ObserverHandle {
            commands: command_tx,
            state: state_rx,
            signals: signal_rx,
            cache: self.cache,
            task,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Handle
// ════════════════════════════════════════════════════════════════════════════

/// Caller-side control of a running observer client.
pub struct ObserverHandle {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<ClientState>,
    signals: mpsc::UnboundedReceiver<ObserverSignal>,
    cache: Arc<ViewCache>,
    task: JoinHandle<()>,
}

impl ObserverHandle {
    pub fn state(&self) -> ClientState {
        *self.state.borrow()
    }

    pub fn cache(&self) -> Arc<ViewCache> {
        Arc::clone(&self.cache)
    }

    /// Send a message to the hub.
    ///
    /// # Errors
    ///
    /// - `TransportUnavailable` unless currently connected
    pub async fn send(&self, message: ClientMessage) -> Result<(), ClientError> {
        let state = self.state();
        if !state.is_connected() {
            tracing::warn!(state = %state, "Cannot send while not connected");
            return Err(ClientError::TransportUnavailable(format!(
                "observer is {}",
                state
            )));
        }

        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(Command::Send(message, reply_tx))
            .await
            .map_err(|_| ClientError::Closed)?;
        reply_rx.await.map_err(|_| ClientError::Closed)?
    }

    /// Drop any current connection and connect again immediately with a
    /// fresh attempt counter.
    pub async fn reconnect(&self) -> Result<(), ClientError> {
        self.commands
            .send(Command::Reconnect)
            .await
            .map_err(|_| ClientError::Closed)
    }

    /// Next lifecycle signal; `None` once the client has stopped.
    pub async fn next_signal(&mut self) -> Option<ObserverSignal> {
        self.signals.recv().await
    }

    /// Wait until the client reaches `target`.
    pub async fn wait_for(&mut self, target: ClientState) -> Result<(), ClientError> {
        self.state
            .wait_for(|state| *state == target)
            .await
            .map(|_| ())
            .map_err(|_| ClientError::Closed)
    }

    /// Stop the client and wait for its task to finish.
    pub async fn shutdown(self) {
        let _ = self.commands.send(Command::Shutdown).await;
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Observer task ended abnormally");
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Driver
// ════════════════════════════════════════════════════════════════════════════

enum PumpExit {
    Lost,
    Reconnect,
    Shutdown,
}

enum WaitExit {
    Retry,
    Reconnect,
    Shutdown,
}

struct Driver {
    core: ObserverCore,
    connector: Arc<dyn Connector>,
    scheduler: Arc<dyn Scheduler>,
    commands: mpsc::Receiver<Command>,
    state: watch::Sender<ClientState>,
    // Unbounded so a slow signal consumer never stalls reconnects.
    signals: mpsc::UnboundedSender<ObserverSignal>,
    connected_before: bool,
}

impl Driver {
    async fn run(mut self) {
        loop {
            self.core.begin_connect();
            self.publish_state();

            let decision = match self.connector.connect().await {
                Ok(mut transport) => {
                    let resumed = std::mem::replace(&mut self.connected_before, true);
                    self.core.connection_established();
                    if resumed {
                        // The hub does not replay what was missed while away.
                        self.core.forget_views();
                    }
                    self.publish_state();
                    if resumed {
                        if let Err(e) = transport.send(ClientMessage::RequestState).await {
                            tracing::debug!(error = %e, "Failed to request state after reconnect");
                        }
                    }
                    self.signal(ObserverSignal::Connected);
                    tracing::info!(resumed, "Observer connected");

                    match self.pump(transport).await {
                        PumpExit::Shutdown => break,
                        PumpExit::Reconnect => {
                            self.core.manual_reconnect();
                            self.publish_state();
                            self.signal(ObserverSignal::Disconnected);
                            continue;
                        }
                        PumpExit::Lost => {
                            let decision = self.core.connection_lost();
                            self.publish_state();
                            self.signal(ObserverSignal::Disconnected);
                            tracing::info!("Observer connection lost");
                            decision
                        }
                    }
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Observer connect failed");
                    let decision = self.core.connection_lost();
                    self.publish_state();
                    decision
                }
            };

            let exit = match decision {
                ReconnectDecision::Retry { attempt, delay } => {
                    let timer = self.scheduler.schedule(delay);
                    tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "Reconnect scheduled");
                    self.signal(ObserverSignal::ReconnectScheduled { attempt, delay });
                    self.wait(Some(timer)).await
                }
                ReconnectDecision::GiveUp { attempts } => {
                    tracing::warn!(attempts, "Observer gave up reconnecting");
                    self.signal(ObserverSignal::GaveUp { attempts });
                    self.wait(None).await
                }
            };

            match exit {
                WaitExit::Retry => {}
                WaitExit::Reconnect => self.core.manual_reconnect(),
                WaitExit::Shutdown => break,
            }
        }

        if self.core.state() != ClientState::Disconnected {
            self.core.manual_reconnect();
        }
        self.publish_state();
        tracing::debug!("Observer client stopped");
    }

    /// Forward hub messages to dispatch and caller sends to the hub.
    async fn pump(&mut self, mut transport: Box<dyn ObserverTransport>) -> PumpExit {
        loop {
            tokio::select! {
                message = transport.next_message() => match message {
                    Some(message) => self.core.dispatch(&message),
                    None => return PumpExit::Lost,
                },
                command = self.commands.recv() => match command {
                    Some(Command::Send(message, reply)) => {
                        let result = transport.send(message).await;
                        let lost = matches!(result, Err(TransportError::Unavailable(_)));
                        let _ = reply.send(result.map_err(ClientError::from));
                        if lost {
                            return PumpExit::Lost;
                        }
                    }
                    Some(Command::Reconnect) => return PumpExit::Reconnect,
                    Some(Command::Shutdown) | None => return PumpExit::Shutdown,
                },
            }
        }
    }

    /// Wait out a retry timer, or indefinitely after giving up.
    async fn wait(&mut self, timer: Option<Timer>) -> WaitExit {
        let timer = async move {
            match timer {
                Some(timer) => timer.await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(timer);

        loop {
            tokio::select! {
                _ = &mut timer => return WaitExit::Retry,
                command = self.commands.recv() => match command {
                    Some(Command::Send(_, reply)) => {
                        tracing::warn!("Dropping send while disconnected");
                        let _ = reply.send(Err(ClientError::TransportUnavailable(
                            "observer is disconnected".to_string(),
                        )));
                    }
                    Some(Command::Reconnect) => return WaitExit::Reconnect,
                    Some(Command::Shutdown) | None => return WaitExit::Shutdown,
                },
            }
        }
    }

    fn publish_state(&self) {
        self.state.send_replace(self.core.state());
    }

    fn signal(&self, signal: ObserverSignal) {
        let _ = self.signals.send(signal);
    }
}
