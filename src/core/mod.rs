//! Core domain: transcript store, chat entry types, wire frame codec

pub mod errors;
pub mod transcript;
pub mod types;

pub use errors::ConnectionError;
pub use transcript::Transcript;
pub use types::{decode_inbound, ChatEntry, InboundFrame, OutboundFrame, Sender};
