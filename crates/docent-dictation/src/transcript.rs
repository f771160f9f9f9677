//! Dual-buffer transcript merge.
//!
//! Continuous dictation engines deliver overlapping interim segments on
//! every partial utterance; naively concatenating them duplicates words.
//! `TranscriptBuffer` keeps one settled buffer that only grows via finalized
//! segments and one volatile buffer that is replaced wholesale on every
//! interim segment, merging the two only at read time.

/// One event from a dictation stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEvent {
    /// A recognized span. Interim segments are tentative and revisable;
    /// final segments are settled and immutable.
    Segment { text: String, is_final: bool },
    /// A transient capture error. Capture continues, no state change.
    SoftError(String),
    /// The recognizer stream ended.
    Ended,
}

impl TranscriptEvent {
    pub fn interim(text: impl Into<String>) -> Self {
        TranscriptEvent::Segment {
            text: text.into(),
            is_final: false,
        }
    }

    pub fn final_segment(text: impl Into<String>) -> Self {
        TranscriptEvent::Segment {
            text: text.into(),
            is_final: true,
        }
    }
}

/// Accumulated dictation text: settled finals plus the latest interim view.
///
/// A pure reducer over the event stream; independently testable without a
/// real dictation engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptBuffer {
    settled: String,
    interim: String,
}

impl TranscriptBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin with already-typed text as the settled buffer.
    pub fn with_seed(seed: &str) -> Self {
        Self {
            settled: seed.to_string(),
            interim: String::new(),
        }
    }

    /// Fold one event into the buffer.
    ///
    /// Final segments append to the settled buffer, joined with a single
    /// space when it is non-empty, and supersede any pending interim view
    /// of the same utterance. Interim segments replace the pending view
    /// wholesale; they are never accumulated. Soft errors and end-of-stream
    /// leave the buffer untouched.
    pub fn apply(&mut self, event: TranscriptEvent) {
        match event {
            TranscriptEvent::Segment { text, is_final } => {
                if is_final {
                    if self.settled.is_empty() {
                        self.settled = text;
                    } else {
                        self.settled.push(' ');
                        self.settled.push_str(&text);
                    }
                    self.interim.clear();
                } else {
                    self.interim = text;
                }
            }
            TranscriptEvent::SoftError(_) | TranscriptEvent::Ended => {}
        }
    }

    /// Drop the pending interim view, keeping everything settled.
    ///
    /// Used on stream restarts, where the interim text of the interrupted
    /// utterance is stale.
    pub fn discard_interim(&mut self) {
        self.interim.clear();
    }

    /// Only the finalized text.
    pub fn settled(&self) -> &str {
        &self.settled
    }

    /// The value shown to the user: settled text plus the pending view.
    pub fn merged(&self) -> String {
        format!("{}{}", self.settled, self.interim)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_buffer() {
        let buf = TranscriptBuffer::new();
        assert_eq!(buf.settled(), "");
        assert_eq!(buf.merged(), "");
    }

    #[test]
    fn test_seed_becomes_settled() {
        let buf = TranscriptBuffer::with_seed("already typed");
        assert_eq!(buf.settled(), "already typed");
        assert_eq!(buf.merged(), "already typed");
    }

    #[test]
    fn test_interim_replaced_wholesale() {
        let mut buf = TranscriptBuffer::new();
        buf.apply(TranscriptEvent::interim("he"));
        assert_eq!(buf.merged(), "he");

        buf.apply(TranscriptEvent::interim("hel"));
        buf.apply(TranscriptEvent::interim("hello"));
        assert_eq!(buf.merged(), "hello");
        assert_eq!(buf.settled(), "");
    }

    #[test]
    fn test_final_appends_and_clears_interim() {
        let mut buf = TranscriptBuffer::new();
        buf.apply(TranscriptEvent::interim("hello wor"));
        buf.apply(TranscriptEvent::final_segment("hello world"));
        assert_eq!(buf.settled(), "hello world");
        assert_eq!(buf.merged(), "hello world");
    }

    #[test]
    fn test_merge_idempotence_over_interim_storm() {
        // Any number of interim events for an utterance followed by one
        // final event yields the utterance exactly once.
        let mut buf = TranscriptBuffer::new();
        for partial in ["w", "wh", "wha", "what is", "what is ros"] {
            buf.apply(TranscriptEvent::interim(partial));
        }
        buf.apply(TranscriptEvent::final_segment("what is ros two"));

        assert_eq!(buf.settled(), "what is ros two");
        assert_eq!(buf.settled().matches("what is").count(), 1);
    }

    #[test]
    fn test_finals_join_with_single_space() {
        let mut buf = TranscriptBuffer::new();
        buf.apply(TranscriptEvent::final_segment("hello"));
        buf.apply(TranscriptEvent::final_segment("world"));
        assert_eq!(buf.settled(), "hello world");
    }

    #[test]
    fn test_final_joins_after_seed() {
        let mut buf = TranscriptBuffer::with_seed("note");
        buf.apply(TranscriptEvent::final_segment("to self"));
        assert_eq!(buf.settled(), "note to self");
    }

    #[test]
    fn test_soft_error_and_ended_change_nothing() {
        let mut buf = TranscriptBuffer::new();
        buf.apply(TranscriptEvent::final_segment("hello"));
        buf.apply(TranscriptEvent::interim("wor"));

        let before = buf.clone();
        buf.apply(TranscriptEvent::SoftError("no speech".to_string()));
        buf.apply(TranscriptEvent::Ended);
        assert_eq!(buf, before);
    }

    #[test]
    fn test_discard_interim_keeps_settled() {
        let mut buf = TranscriptBuffer::new();
        buf.apply(TranscriptEvent::final_segment("hello"));
        buf.apply(TranscriptEvent::interim("wor"));
        buf.discard_interim();
        assert_eq!(buf.merged(), "hello");
        assert_eq!(buf.settled(), "hello");
    }

    #[test]
    fn test_interleaved_utterances() {
        let mut buf = TranscriptBuffer::new();
        buf.apply(TranscriptEvent::interim("what"));
        buf.apply(TranscriptEvent::final_segment("what is"));
        buf.apply(TranscriptEvent::interim("ros"));
        buf.apply(TranscriptEvent::interim("ros two"));
        buf.apply(TranscriptEvent::final_segment("ros two"));
        assert_eq!(buf.settled(), "what is ros two");
    }
}
