//! Domain error types
//!
//! Only connection establishment has a synchronous failure path the
//! caller can act on. Transport errors observed after a handle exists are
//! delivered as advisory events instead, so the receive pipeline never
//! aborts.

use thiserror::Error;

/// Errors raised when establishing a connection
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The endpoint could not be parsed as a URL
    #[error("Invalid endpoint URL '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// The endpoint URL is not a WebSocket URL
    #[error("Unsupported URL scheme '{0}'; expected ws:// or wss://")]
    UnsupportedScheme(String),
}
