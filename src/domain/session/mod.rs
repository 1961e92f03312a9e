//! Session domain module.
//!
//! Handles the pairing lifecycle of a session: creation, payload issuance,
//! confirmation, and disconnection. All state is in memory.

mod aggregate;
mod errors;
mod pairing;
mod state;

pub use aggregate::{Session, SessionSnapshot};
pub use errors::SessionError;
pub use pairing::{DecodedPairing, PairedIdentity, PairingPayload, DEFAULT_PAIRING_TTL};
pub use state::SessionState;
