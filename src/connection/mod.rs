//! Connection manager - owns the single WebSocket handle
//!
//! One logical connection is current at a time. `connect()` releases the
//! previous handle before opening a new one, and every lifecycle signal
//! (opened, inbound frame, closed, errored) is delivered as a
//! `ConnectionEvent` into one ordered inbox, tagged with the handle that
//! produced it. There is no retry, no backoff, and no timeout: a failed
//! attempt emits one `Errored` followed by one `Closed`.

use futures::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use crate::core::errors::ConnectionError;
use crate::core::types::OutboundFrame;

/// Identifies one connection handle instance
pub type HandleId = u64;

/// Lifecycle state of the current handle
///
/// `Connecting -> Open -> Closed`; `Closed` is terminal for a handle
/// instance, and a manager with no handle reports `Closed`. Transport
/// errors are advisory events, never a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

impl ConnectionState {
    /// Get a string representation for logging
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connecting => "Connecting",
            Self::Open => "Open",
            Self::Closed => "Closed",
        }
    }
}

/// One signal from a connection task
#[derive(Debug, Clone)]
pub struct ConnectionEvent {
    /// Handle that produced the event
    pub handle: HandleId,
    pub kind: ConnectionEventKind,
}

#[derive(Debug, Clone)]
pub enum ConnectionEventKind {
    /// The connection reached the open state
    Opened,
    /// One raw inbound text frame
    Frame(String),
    /// The connection ended; terminal for this handle
    Closed,
    /// Advisory transport error; does not itself change state
    Errored(String),
}

struct ActiveHandle {
    id: HandleId,
    outbound: mpsc::UnboundedSender<String>,
    shutdown: Option<oneshot::Sender<()>>,
}

/// Owns at most one live connection and the channel its events arrive on
pub struct ConnectionManager {
    endpoint: String,
    next_id: HandleId,
    current: Option<ActiveHandle>,
    state: ConnectionState,
    events: mpsc::UnboundedSender<ConnectionEvent>,
}

impl ConnectionManager {
    pub fn new(endpoint: impl Into<String>, events: mpsc::UnboundedSender<ConnectionEvent>) -> Self {
        Self {
            endpoint: endpoint.into(),
            next_id: 1,
            current: None,
            state: ConnectionState::Closed,
            events,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    /// Get the id of the current handle, if any
    pub fn current_handle(&self) -> Option<HandleId> {
        self.current.as_ref().map(|handle| handle.id)
    }

    /// Open a fresh connection, releasing the previous handle first.
    ///
    /// Returns the new handle id once its task is spawned; the actual
    /// open/closed/errored outcome arrives later as events.
    pub fn connect(&mut self) -> Result<HandleId, ConnectionError> {
        let url = Url::parse(&self.endpoint).map_err(|err| ConnectionError::InvalidEndpoint {
            url: self.endpoint.clone(),
            reason: err.to_string(),
        })?;
        match url.scheme() {
            "ws" | "wss" => {}
            other => return Err(ConnectionError::UnsupportedScheme(other.to_string())),
        }

        self.release_current();

        let id = self.next_id;
        self.next_id += 1;

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let events = self.events.clone();
        let endpoint = self.endpoint.clone();

        tracing::debug!("opening connection {id} to {endpoint}");
        tokio::spawn(run_connection(id, endpoint, outbound_rx, shutdown_rx, events));

        self.current = Some(ActiveHandle {
            id,
            outbound: outbound_tx,
            shutdown: Some(shutdown_tx),
        });
        self.state = ConnectionState::Connecting;
        Ok(id)
    }

    /// Release the current handle, asking its task to close the socket.
    /// Safe to call with no handle.
    pub fn release_current(&mut self) {
        if let Some(mut handle) = self.current.take() {
            tracing::debug!("releasing connection {}", handle.id);
            if let Some(shutdown) = handle.shutdown.take() {
                let _ = shutdown.send(());
            }
            self.state = ConnectionState::Closed;
        }
    }

    /// Queue one outbound text payload on the open connection.
    ///
    /// Silent no-op unless the handle is open; returns whether the frame
    /// was queued.
    pub fn send(&self, text: &str) -> bool {
        if self.state != ConnectionState::Open {
            return false;
        }
        let Some(handle) = &self.current else {
            return false;
        };
        let frame = OutboundFrame {
            content: text.to_string(),
        };
        let payload = match serde_json::to_string(&frame) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!("failed to encode outbound frame: {err}");
                return false;
            }
        };
        handle.outbound.send(payload).is_ok()
    }

    /// Track a delivered event against the current handle.
    ///
    /// Events from a released handle still reach the transcript, but they
    /// must not move the state of its replacement, so every transition
    /// here is gated on the handle id.
    pub fn note_event(&mut self, event: &ConnectionEvent) {
        if self.current_handle() != Some(event.handle) {
            return;
        }
        match &event.kind {
            ConnectionEventKind::Opened => self.state = ConnectionState::Open,
            ConnectionEventKind::Closed => {
                self.state = ConnectionState::Closed;
                self.current = None;
            }
            ConnectionEventKind::Frame(_) | ConnectionEventKind::Errored(_) => {}
        }
    }

    /// Install a handle backed by a bare channel so state transitions can
    /// be driven without a socket.
    #[cfg(test)]
    pub(crate) fn attach_raw_handle(&mut self) -> (HandleId, mpsc::UnboundedReceiver<String>) {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let id = self.next_id;
        self.next_id += 1;
        self.current = Some(ActiveHandle {
            id,
            outbound: outbound_tx,
            shutdown: None,
        });
        self.state = ConnectionState::Connecting;
        (id, outbound_rx)
    }
}

async fn run_connection(
    id: HandleId,
    endpoint: String,
    mut outbound_rx: mpsc::UnboundedReceiver<String>,
    mut shutdown_rx: oneshot::Receiver<()>,
    events: mpsc::UnboundedSender<ConnectionEvent>,
) {
    let emit = |kind: ConnectionEventKind| {
        let _ = events.send(ConnectionEvent { handle: id, kind });
    };

    let mut ws = match tokio_tungstenite::connect_async(&endpoint).await {
        Ok((stream, _response)) => stream,
        Err(err) => {
            tracing::warn!("connection {id} to {endpoint} failed: {err}");
            emit(ConnectionEventKind::Errored(err.to_string()));
            emit(ConnectionEventKind::Closed);
            return;
        }
    };

    tracing::debug!("connection {id} open");
    emit(ConnectionEventKind::Opened);

    loop {
        tokio::select! {
            _ = &mut shutdown_rx => {
                let _ = ws.close(None).await;
                break;
            }
            Some(payload) = outbound_rx.recv() => {
                if let Err(err) = ws.send(Message::Text(payload)).await {
                    emit(ConnectionEventKind::Errored(err.to_string()));
                    break;
                }
            }
            inbound = ws.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => emit(ConnectionEventKind::Frame(text)),
                    Some(Ok(Message::Close(_))) | None => break,
                    // Ping/pong and binary frames are not part of the protocol
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        emit(ConnectionEventKind::Errored(err.to_string()));
                        break;
                    }
                }
            }
        }
    }

    tracing::debug!("connection {id} closed");
    emit(ConnectionEventKind::Closed);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> (ConnectionManager, mpsc::UnboundedReceiver<ConnectionEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        (
            ConnectionManager::new("ws://127.0.0.1:8000/ws/chat", events_tx),
            events_rx,
        )
    }

    fn event(handle: HandleId, kind: ConnectionEventKind) -> ConnectionEvent {
        ConnectionEvent { handle, kind }
    }

    #[test]
    fn test_initial_state_is_closed() {
        let (mgr, _rx) = manager();
        assert_eq!(mgr.state(), ConnectionState::Closed);
        assert_eq!(mgr.current_handle(), None);
    }

    #[test]
    fn test_connect_rejects_non_websocket_scheme() {
        let (events_tx, _events_rx) = mpsc::unbounded_channel();
        let mut mgr = ConnectionManager::new("http://127.0.0.1:8000/ws/chat", events_tx);

        let err = mgr.connect().unwrap_err();
        assert!(matches!(err, ConnectionError::UnsupportedScheme(scheme) if scheme == "http"));
        assert_eq!(mgr.current_handle(), None);
    }

    #[test]
    fn test_connect_rejects_unparseable_url() {
        let (events_tx, _events_rx) = mpsc::unbounded_channel();
        let mut mgr = ConnectionManager::new("not a url", events_tx);

        assert!(matches!(
            mgr.connect(),
            Err(ConnectionError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn test_open_then_close_lifecycle() {
        let (mut mgr, _rx) = manager();
        let (id, _outbound) = mgr.attach_raw_handle();
        assert_eq!(mgr.state(), ConnectionState::Connecting);

        mgr.note_event(&event(id, ConnectionEventKind::Opened));
        assert_eq!(mgr.state(), ConnectionState::Open);

        mgr.note_event(&event(id, ConnectionEventKind::Closed));
        assert_eq!(mgr.state(), ConnectionState::Closed);
        assert_eq!(mgr.current_handle(), None);
    }

    #[test]
    fn test_error_event_does_not_change_state() {
        let (mut mgr, _rx) = manager();
        let (id, _outbound) = mgr.attach_raw_handle();
        mgr.note_event(&event(id, ConnectionEventKind::Opened));

        mgr.note_event(&event(id, ConnectionEventKind::Errored("boom".to_string())));
        assert_eq!(mgr.state(), ConnectionState::Open);
    }

    #[test]
    fn test_stale_handle_events_are_ignored() {
        let (mut mgr, _rx) = manager();
        let (old_id, _old_outbound) = mgr.attach_raw_handle();
        mgr.note_event(&event(old_id, ConnectionEventKind::Opened));

        // Replace the handle; the old handle's close must not flip the
        // replacement out of its own lifecycle.
        let (new_id, _new_outbound) = mgr.attach_raw_handle();
        assert_eq!(mgr.state(), ConnectionState::Connecting);

        mgr.note_event(&event(old_id, ConnectionEventKind::Closed));
        assert_eq!(mgr.state(), ConnectionState::Connecting);
        assert_eq!(mgr.current_handle(), Some(new_id));

        mgr.note_event(&event(new_id, ConnectionEventKind::Opened));
        assert_eq!(mgr.state(), ConnectionState::Open);
    }

    #[test]
    fn test_send_requires_open_state() {
        let (mut mgr, _rx) = manager();
        assert!(!mgr.send("hello"));

        let (id, mut outbound) = mgr.attach_raw_handle();
        // Still connecting: no-op
        assert!(!mgr.send("hello"));
        assert!(outbound.try_recv().is_err());

        mgr.note_event(&event(id, ConnectionEventKind::Opened));
        assert!(mgr.send("hello"));
        assert_eq!(outbound.try_recv().unwrap(), r#"{"content":"hello"}"#);
    }

    #[test]
    fn test_send_after_close_is_noop() {
        let (mut mgr, _rx) = manager();
        let (id, mut outbound) = mgr.attach_raw_handle();
        mgr.note_event(&event(id, ConnectionEventKind::Opened));
        mgr.note_event(&event(id, ConnectionEventKind::Closed));

        assert!(!mgr.send("hello"));
        assert!(outbound.try_recv().is_err());
    }
}
