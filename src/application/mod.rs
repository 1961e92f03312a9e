//! Application layer - Orchestrates domain operations across ports.
//!
//! `SessionManager` is the single entry point for session commands and
//! queries; adapters (HTTP, WebSocket) call into it and never touch the
//! aggregate directly.

mod session_manager;

pub use session_manager::SessionManager;
