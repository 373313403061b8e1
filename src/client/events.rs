//! Client notifications
//!
//! Async events sent from the session pump to the front-end so rendering
//! can react without polling the transcript.

use crate::connection::ConnectionState;
use crate::core::types::ChatEntry;

/// Events emitted by the session pump to the front-end
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// A new entry was appended to the transcript
    EntryAppended(ChatEntry),

    /// The connection lifecycle state changed
    StateChanged(ConnectionState),
}
