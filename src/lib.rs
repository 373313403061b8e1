//! tether: terminal chat client for agent backends
//!
//! This library provides:
//! - A connection manager owning one persistent WebSocket handle
//! - An append-only transcript store driving the rendered chat log
//! - A session pump translating connection events into transcript entries
//! - A line-oriented terminal front-end

pub mod client;
pub mod config;
pub mod connection;
pub mod core;
pub mod transport;

pub use crate::client::{ChatClient, ClientEvent};
pub use crate::config::Config;
pub use crate::connection::{
    ConnectionEvent, ConnectionEventKind, ConnectionManager, ConnectionState, HandleId,
};
pub use crate::core::errors::ConnectionError;
pub use crate::core::transcript::Transcript;
pub use crate::core::types::{decode_inbound, ChatEntry, InboundFrame, OutboundFrame, Sender};
