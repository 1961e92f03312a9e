//! Pairing payloads and paired identities.
//!
//! A pairing payload is the short-lived token a session exposes while it
//! waits for an external party to confirm. It is a comma-separated string:
//!
//! ```text
//! <reference>,<noise key>,<identity key>,<advertising secret>,<issued at ms>
//! ```
//!
//! Every component except the timestamp is independent random bytes, so the
//! payload can be decoded by a third party without consulting any server
//! state, and it never derives from a secret held elsewhere.

use std::time::Duration;

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// Validity window observed for pairing payloads.
pub const DEFAULT_PAIRING_TTL: Duration = Duration::from_secs(60);

const REFERENCE_BYTES: usize = 16;
const KEY_BYTES: usize = 32;

/// Time-limited pairing token attached to a session awaiting confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingPayload {
    value: String,
    issued_at: Timestamp,
}

impl PairingPayload {
    /// Generates a fresh payload stamped with `issued_at`.
    pub fn generate(issued_at: Timestamp) -> Self {
        let mut rng = rand::thread_rng();

        let mut reference = [0u8; REFERENCE_BYTES];
        rng.fill_bytes(&mut reference);

        let mut keys = Vec::with_capacity(3);
        for _ in 0..3 {
            let mut key = [0u8; KEY_BYTES];
            rng.fill_bytes(&mut key);
            keys.push(STANDARD.encode(key));
        }

        let value = format!(
            "{},{},{},{},{}",
            URL_SAFE_NO_PAD.encode(reference),
            keys[0],
            keys[1],
            keys[2],
            issued_at.as_unix_millis()
        );

        Self { value, issued_at }
    }

    /// The opaque payload string handed to the visual encoder.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn issued_at(&self) -> Timestamp {
        self.issued_at
    }

    /// Absolute expiry for the given TTL.
    pub fn expires_at(&self, ttl: Duration) -> Timestamp {
        self.issued_at.plus(ttl)
    }

    /// Expiry is derived on every call; there is no stored expired flag.
    pub fn is_expired(&self, ttl: Duration, now: &Timestamp) -> bool {
        self.issued_at.has_elapsed(ttl, now)
    }
}

/// Components of a payload as seen by a third-party decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPairing {
    pub reference: Vec<u8>,
    pub noise_key: Vec<u8>,
    pub identity_key: Vec<u8>,
    pub advertising_secret: Vec<u8>,
    pub issued_at: Timestamp,
}

impl DecodedPairing {
    /// Decodes a payload string without any server-side state.
    ///
    /// Returns `None` for anything that isn't a well-formed payload.
    pub fn parse(value: &str) -> Option<Self> {
        let parts: Vec<&str> = value.split(',').collect();
        let [reference, noise, identity, secret, issued] = parts.as_slice() else {
            return None;
        };

        Some(Self {
            reference: URL_SAFE_NO_PAD.decode(reference).ok()?,
            noise_key: STANDARD.decode(noise).ok()?,
            identity_key: STANDARD.decode(identity).ok()?,
            advertising_secret: STANDARD.decode(secret).ok()?,
            issued_at: Timestamp::from_unix_millis(issued.parse().ok()?),
        })
    }
}

/// Opaque identity assigned to a session at the moment pairing is confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairedIdentity(String);

impl PairedIdentity {
    /// Assigns a fresh phone-like identifier.
    pub fn assign() -> Self {
        let subscriber: u64 = rand::thread_rng().gen_range(2_000_000_000..10_000_000_000);
        Self(format!("+1{}", subscriber))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PairedIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
