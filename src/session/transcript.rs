/// Mutable transcript of the current answer
///
/// Live recognition snapshots and manual edits both *replace* the text
/// (each snapshot is the authoritative full text of the in-progress
/// segment); the finalization pass *appends* on its own line. The buffer is
/// cleared only when the interview advances to the next question.
#[derive(Debug, Default)]
pub struct TranscriptBuffer {
    text: String,
}

impl TranscriptBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the live view with a new snapshot
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Append a finalized result on its own line
    pub fn append_final(&mut self, text: &str) {
        self.text.push('\n');
        self.text.push_str(text);
    }

    /// Clear to empty; paired with a question advance
    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshots_replace_not_append() {
        let mut buffer = TranscriptBuffer::new();
        buffer.set("hello");
        buffer.set("hello world");

        assert_eq!(buffer.text(), "hello world");
    }

    #[test]
    fn test_append_final_adds_newline() {
        let mut buffer = TranscriptBuffer::new();
        buffer.set("partial");
        buffer.append_final("mock result");

        assert_eq!(buffer.text(), "partial\nmock result");
    }

    #[test]
    fn test_clear() {
        let mut buffer = TranscriptBuffer::new();
        buffer.set("something");
        buffer.clear();

        assert!(buffer.is_empty());
        assert_eq!(buffer.text(), "");
    }
}
