//! Transcript store - append-only chat history
//!
//! The single mutation is `append`; entries are immutable once stored and
//! keep arrival order for the life of the session. No reordering, no
//! update-in-place.

use crate::core::types::ChatEntry;

/// Ordered log of chat entries
pub struct Transcript {
    entries: Vec<ChatEntry>,
    /// Cap on retained history; `None` keeps everything
    limit: Option<usize>,
}

impl Transcript {
    /// Create an empty, unbounded transcript
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            limit: None,
        }
    }

    /// Create an empty transcript that retains at most `limit` entries,
    /// evicting the oldest on overflow
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            entries: Vec::new(),
            limit,
        }
    }

    /// Append one entry to the end; never fails
    pub fn append(&mut self, entry: ChatEntry) {
        self.entries.push(entry);
        if let Some(limit) = self.limit {
            if self.entries.len() > limit {
                let excess = self.entries.len() - limit;
                self.entries.drain(..excess);
            }
        }
    }

    /// Get all entries, oldest first
    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    /// Get an owned copy for a render layer
    pub fn snapshot(&self) -> Vec<ChatEntry> {
        self.entries.clone()
    }

    /// Get entry count
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Sender;

    #[test]
    fn test_new_transcript_is_empty() {
        let transcript = Transcript::new();
        assert!(transcript.is_empty());
        assert_eq!(transcript.len(), 0);
    }

    #[test]
    fn test_append_keeps_arrival_order() {
        let mut transcript = Transcript::new();

        transcript.append(ChatEntry::system("connected"));
        transcript.append(ChatEntry::agent("coach", "Hi"));
        transcript.append(ChatEntry::you("Hello"));

        let entries = transcript.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].sender, Sender::System);
        assert_eq!(entries[1].sender, Sender::Agent("coach".to_string()));
        assert_eq!(entries[2].sender, Sender::You);
    }

    #[test]
    fn test_snapshot_is_stable() {
        let mut transcript = Transcript::new();
        transcript.append(ChatEntry::you("first"));

        let snapshot = transcript.snapshot();
        transcript.append(ChatEntry::you("second"));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].content, "first");
        assert_eq!(transcript.len(), 2);
    }

    #[test]
    fn test_unbounded_by_default() {
        let mut transcript = Transcript::new();
        for i in 0..1000 {
            transcript.append(ChatEntry::you(format!("message {i}")));
        }
        assert_eq!(transcript.len(), 1000);
        assert_eq!(transcript.entries()[0].content, "message 0");
    }

    #[test]
    fn test_limit_evicts_oldest() {
        let mut transcript = Transcript::with_limit(Some(2));

        transcript.append(ChatEntry::you("a"));
        transcript.append(ChatEntry::you("b"));
        transcript.append(ChatEntry::you("c"));

        let entries = transcript.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].content, "b");
        assert_eq!(entries[1].content, "c");
    }
}
