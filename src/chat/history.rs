//! Shared chat history log.
//!
//! The history is an append-only sequence of lines. Every line is
//! addressable by a stable zero-based index; indices are assigned in
//! strictly increasing order and never reused. Nothing is ever truncated
//! or evicted.

use crate::{ChatError, Result};

/// Append-only log of chat and event lines.
#[derive(Debug, Default)]
pub struct HistoryLog {
    lines: Vec<String>,
}

impl HistoryLog {
    /// Create an empty history log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line, returning the index it was assigned.
    pub fn append(&mut self, line: impl Into<String>) -> usize {
        let index = self.lines.len();
        self.lines.push(line.into());
        index
    }

    /// Get the line at `index`.
    pub fn get(&self, index: usize) -> Result<&str> {
        self.lines
            .get(index)
            .map(String::as_str)
            .ok_or(ChatError::OutOfRange {
                index,
                len: self.lines.len(),
            })
    }

    /// Number of lines in the log.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Index of the newest line, or None if the log is empty.
    pub fn newest_index(&self) -> Option<usize> {
        self.lines.len().checked_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_log_is_empty() {
        let log = HistoryLog::new();
        assert!(log.is_empty());
        assert_eq!(log.len(), 0);
        assert!(log.newest_index().is_none());
    }

    #[test]
    fn test_append_returns_sequential_indices() {
        let mut log = HistoryLog::new();
        assert_eq!(log.append("first"), 0);
        assert_eq!(log.append("second"), 1);
        assert_eq!(log.append("third"), 2);
        assert_eq!(log.len(), 3);
        assert_eq!(log.newest_index(), Some(2));
    }

    #[test]
    fn test_get_returns_appended_lines() {
        let mut log = HistoryLog::new();
        log.append("0 Alice has joined the chat");
        log.append("1 Alice: hello");

        assert_eq!(log.get(0).unwrap(), "0 Alice has joined the chat");
        assert_eq!(log.get(1).unwrap(), "1 Alice: hello");
    }

    #[test]
    fn test_get_out_of_range() {
        let mut log = HistoryLog::new();
        log.append("only line");

        let err = log.get(1).unwrap_err();
        assert!(matches!(err, ChatError::OutOfRange { index: 1, len: 1 }));
    }

    #[test]
    fn test_get_on_empty_log() {
        let log = HistoryLog::new();
        assert!(matches!(
            log.get(0),
            Err(ChatError::OutOfRange { index: 0, len: 0 })
        ));
    }

    #[test]
    fn test_indices_stable_after_further_appends() {
        let mut log = HistoryLog::new();
        let first = log.append("a");
        log.append("b");
        log.append("c");

        // Earlier lines are never moved or mutated by later appends.
        assert_eq!(log.get(first).unwrap(), "a");
    }

    #[test]
    fn test_append_monotonic_no_gaps() {
        let mut log = HistoryLog::new();
        let mut prev = None;
        for i in 0..100 {
            let idx = log.append(format!("line {i}"));
            if let Some(p) = prev {
                assert_eq!(idx, p + 1);
            } else {
                assert_eq!(idx, 0);
            }
            prev = Some(idx);
        }
        assert_eq!(log.len(), 100);
    }
}
