//! Chat session pump
//!
//! Orchestrates the connection manager and the transcript store: every
//! connection event is handled to completion, in delivery order, before
//! the next one is looked at, so transcript appends are serialized
//! without a lock. User sends get an optimistic local echo that lands
//! before any reply can be processed.

pub mod events;

use tokio::sync::mpsc;

use crate::config::Config;
use crate::connection::{
    ConnectionEvent, ConnectionEventKind, ConnectionManager, ConnectionState, HandleId,
};
use crate::core::errors::ConnectionError;
use crate::core::transcript::Transcript;
use crate::core::types::{decode_inbound, ChatEntry};

pub use events::ClientEvent;

/// One chat session: a transcript plus the connection feeding it
pub struct ChatClient {
    transcript: Transcript,
    connection: ConnectionManager,
    notifications: mpsc::UnboundedSender<ClientEvent>,
    default_agent: String,
}

impl ChatClient {
    /// Create a new client.
    ///
    /// `connection_events` is the inbox the connection tasks write to;
    /// the caller owns the receiving half and feeds each event back
    /// through [`ChatClient::handle_event`]. `notifications` carries
    /// render updates to the front-end.
    pub fn new(
        config: &Config,
        connection_events: mpsc::UnboundedSender<ConnectionEvent>,
        notifications: mpsc::UnboundedSender<ClientEvent>,
    ) -> Self {
        Self {
            transcript: Transcript::with_limit(config.chat.transcript_limit),
            connection: ConnectionManager::new(config.connection.url.clone(), connection_events),
            notifications,
            default_agent: config.chat.default_agent_label.clone(),
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// Open a fresh connection, releasing any prior handle first
    pub fn connect(&mut self) -> Result<HandleId, ConnectionError> {
        let id = self.connection.connect()?;
        self.notify_state();
        Ok(id)
    }

    /// Handle one connection event to completion.
    ///
    /// Lifecycle signals become `System` notices; inbound frames decode
    /// into agent entries or degrade to a verbatim notice. Stale-handle
    /// events still append (receipt order is transcript order) but never
    /// move the current handle's state.
    pub fn handle_event(&mut self, event: ConnectionEvent) {
        let before = self.connection.state();
        self.connection.note_event(&event);

        match event.kind {
            ConnectionEventKind::Opened => self.append(ChatEntry::system("connected")),
            ConnectionEventKind::Frame(raw) => {
                self.append(decode_inbound(&raw, &self.default_agent));
            }
            ConnectionEventKind::Closed => self.append(ChatEntry::system("connection closed")),
            ConnectionEventKind::Errored(reason) => {
                tracing::warn!("connection error: {reason}");
                self.append(ChatEntry::system("connection error"));
            }
        }

        if self.connection.state() != before {
            self.notify_state();
        }
    }

    /// Send one user message with optimistic local echo.
    ///
    /// Silent no-op unless the text is non-empty after trimming and the
    /// connection is open; returns whether the message went out.
    pub fn send_message(&mut self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        if !self.connection.send(text) {
            return false;
        }
        self.append(ChatEntry::you(text));
        true
    }

    fn append(&mut self, entry: ChatEntry) {
        self.transcript.append(entry.clone());
        let _ = self.notifications.send(ClientEvent::EntryAppended(entry));
    }

    fn notify_state(&self) {
        let _ = self
            .notifications
            .send(ClientEvent::StateChanged(self.connection.state()));
    }

    /// Install a socketless handle on the underlying manager
    #[cfg(test)]
    pub(crate) fn attach_raw_handle(&mut self) -> (HandleId, mpsc::UnboundedReceiver<String>) {
        self.connection.attach_raw_handle()
    }
}
