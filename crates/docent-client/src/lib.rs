//! Docent client crate - typed request/response boundary to the answer
//! backend.
//!
//! Wraps the Query, History, Feedback, and Health endpoints behind the
//! `AnswerApi` trait. No business logic lives here: failures are classified
//! and returned, and the caller decides what they mean for the transcript.

pub mod client;
pub mod error;

pub use client::{AnswerApi, AnswerClient};
pub use error::ClientError;
