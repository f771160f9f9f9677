//! Docent dictation crate - speech capture engine.
//!
//! Turns a continuous, possibly-interrupted dictation stream into one
//! coherent editable string without losing already-spoken text. A strict
//! state machine guards the Idle -> Listening lifecycle, and the dual-buffer
//! transcript merge keeps settled text separate from the volatile interim
//! view so that overlapping partial results never duplicate words.

pub mod engine;
pub mod state;
pub mod transcript;

pub use engine::{CaptureEngine, CaptureError, Recognizer, UnsupportedRecognizer};
pub use state::CaptureState;
pub use transcript::{TranscriptBuffer, TranscriptEvent};
