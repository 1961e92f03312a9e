//! HTTP adapter for session endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    ConfirmPairingResponse, CreateSessionRequest, ErrorResponse, PairingResponse,
    SessionListResponse,
};
pub use routes::session_routes;
