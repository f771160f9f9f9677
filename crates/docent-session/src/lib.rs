//! Docent session crate - conversation engine and feedback controller.
//!
//! `ConversationSession` is the single source of truth for the visible
//! transcript and the send/receive lifecycle: it owns conversation identity,
//! message ordering, the busy guard serializing network operations, and
//! persistence to the local cache. `FeedbackController` handles per-message
//! optimistic ratings with rollback, independent of the transcript.

pub mod error;
pub mod feedback;
pub mod session;

pub use error::SessionError;
pub use feedback::FeedbackController;
pub use session::{ConversationSession, ConversationState, FALLBACK_REPLY};
