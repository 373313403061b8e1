//! Canonical type definitions for the chat domain
//!
//! Single source of truth for the types shared by the transcript store,
//! the connection manager, and the terminal front-end.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Who authored a transcript entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sender {
    /// The local user
    You,
    /// Connection lifecycle notices
    System,
    /// A remote agent, identified by an open-ended name
    Agent(String),
}

impl Sender {
    /// Get display label for this sender
    pub fn label(&self) -> &str {
        match self {
            Self::You => "You",
            Self::System => "System",
            Self::Agent(name) => name,
        }
    }
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One immutable transcript record
#[derive(Debug, Clone, PartialEq)]
pub struct ChatEntry {
    pub sender: Sender,
    pub content: String,
    /// Tool metadata forwarded for display, never interpreted
    pub tool: Option<Value>,
    /// Handoff marker forwarded for display, never interpreted
    pub handoff: Option<Value>,
}

impl ChatEntry {
    pub fn you(content: impl Into<String>) -> Self {
        Self {
            sender: Sender::You,
            content: content.into(),
            tool: None,
            handoff: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            sender: Sender::System,
            content: content.into(),
            tool: None,
            handoff: None,
        }
    }

    pub fn agent(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            sender: Sender::Agent(name.into()),
            content: content.into(),
            tool: None,
            handoff: None,
        }
    }

    /// Whether the handoff marker carries a truthy value
    pub fn handoff_occurred(&self) -> bool {
        self.handoff.as_ref().is_some_and(is_truthy)
    }
}

/// Wire shape of an inbound frame
///
/// Best effort: the backend promises nothing beyond `content`. `tool` and
/// `handoff` stay raw JSON so an odd type in either cannot reject a frame
/// that carries a valid `content`.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundFrame {
    #[serde(default)]
    pub agent: Option<String>,
    pub content: String,
    #[serde(default)]
    pub tool: Option<Value>,
    #[serde(default)]
    pub handoff: Option<Value>,
}

/// Wire shape of an outbound frame
#[derive(Debug, Clone, Serialize)]
pub struct OutboundFrame {
    pub content: String,
}

/// Decode one inbound frame into a transcript entry.
///
/// An absent or empty `agent` falls back to `default_agent`. Malformed
/// payloads degrade to a `System` entry carrying the raw text verbatim;
/// decoding never fails.
pub fn decode_inbound(raw: &str, default_agent: &str) -> ChatEntry {
    match serde_json::from_str::<InboundFrame>(raw) {
        Ok(frame) => {
            let name = frame
                .agent
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| default_agent.to_string());
            ChatEntry {
                sender: Sender::Agent(name),
                content: frame.content,
                tool: frame.tool,
                handoff: frame.handoff,
            }
        }
        Err(err) => {
            tracing::debug!("undecodable inbound frame ({err}), showing verbatim");
            ChatEntry::system(raw)
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_full_frame() {
        let raw = r#"{"agent":"coach","content":"Hi","tool":{"name":"skill_db"},"handoff":true}"#;
        let entry = decode_inbound(raw, "agent");

        assert_eq!(entry.sender, Sender::Agent("coach".to_string()));
        assert_eq!(entry.content, "Hi");
        assert_eq!(entry.tool, Some(json!({"name": "skill_db"})));
        assert_eq!(entry.handoff, Some(json!(true)));
    }

    #[test]
    fn test_decode_defaults_agent_when_absent() {
        let entry = decode_inbound(r#"{"content":"Python and SQL."}"#, "agent");
        assert_eq!(entry.sender, Sender::Agent("agent".to_string()));
        assert_eq!(entry.content, "Python and SQL.");
        assert_eq!(entry.tool, None);
        assert_eq!(entry.handoff, None);
    }

    #[test]
    fn test_decode_defaults_agent_when_empty() {
        let entry = decode_inbound(r#"{"agent":"","content":"hello"}"#, "assistant");
        assert_eq!(entry.sender, Sender::Agent("assistant".to_string()));
    }

    #[test]
    fn test_decode_malformed_falls_back_verbatim() {
        let entry = decode_inbound("not json at all", "agent");
        assert_eq!(entry.sender, Sender::System);
        assert_eq!(entry.content, "not json at all");
    }

    #[test]
    fn test_decode_non_object_falls_back_verbatim() {
        let entry = decode_inbound(r#""just a string""#, "agent");
        assert_eq!(entry.sender, Sender::System);
        assert_eq!(entry.content, r#""just a string""#);
    }

    #[test]
    fn test_decode_missing_content_falls_back_verbatim() {
        let raw = r#"{"agent":"coach"}"#;
        let entry = decode_inbound(raw, "agent");
        assert_eq!(entry.sender, Sender::System);
        assert_eq!(entry.content, raw);
    }

    #[test]
    fn test_decode_odd_passthrough_types_survive() {
        // A numeric handoff or a string tool must not reject the frame
        let entry = decode_inbound(r#"{"content":"ok","tool":"grep","handoff":1}"#, "agent");
        assert_eq!(entry.sender, Sender::Agent("agent".to_string()));
        assert_eq!(entry.tool, Some(json!("grep")));
        assert!(entry.handoff_occurred());
    }

    #[test]
    fn test_handoff_truthiness() {
        assert!(!ChatEntry::system("x").handoff_occurred());

        let mut entry = ChatEntry::agent("coach", "x");
        for falsy in [json!(false), json!(null), json!(0), json!("")] {
            entry.handoff = Some(falsy);
            assert!(!entry.handoff_occurred());
        }
        for truthy in [json!(true), json!(1), json!("yes"), json!({})] {
            entry.handoff = Some(truthy);
            assert!(entry.handoff_occurred());
        }
    }

    #[test]
    fn test_outbound_frame_shape() {
        let frame = OutboundFrame {
            content: "Hello".to_string(),
        };
        let encoded = serde_json::to_string(&frame).unwrap();
        assert_eq!(encoded, r#"{"content":"Hello"}"#);
    }

    #[test]
    fn test_sender_labels() {
        assert_eq!(Sender::You.label(), "You");
        assert_eq!(Sender::System.label(), "System");
        assert_eq!(Sender::Agent("coach".to_string()).label(), "coach");
    }
}
