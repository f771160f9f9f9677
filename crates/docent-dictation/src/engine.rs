//! Capture engine managing the dictation session lifecycle.
//!
//! The `CaptureEngine` drives a `Recognizer` through a strict state machine,
//! folds its events into a `TranscriptBuffer`, and emits the merged string
//! to the listener after every event. An unexpected end-of-stream while
//! logically listening triggers a bounded automatic restart that preserves
//! all settled text.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use docent_core::error::DocentError;

use crate::state::{CaptureState, StateMachine};
use crate::transcript::{TranscriptBuffer, TranscriptEvent};

/// Errors from the capture engine.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("dictation is not supported on this platform")]
    Unsupported,
    #[error("listening ended unexpectedly")]
    EndedUnexpectedly,
    #[error("invalid capture state transition: {from} -> {to}")]
    InvalidTransition {
        from: CaptureState,
        to: CaptureState,
    },
    #[error("recognizer error: {0}")]
    Recognizer(String),
}

impl From<CaptureError> for DocentError {
    fn from(err: CaptureError) -> Self {
        DocentError::Capture(err.to_string())
    }
}

/// A platform dictation capability: an external producer of transcript
/// events.
///
/// `start` opens one capture stream; the stream ends when the receiver
/// yields `Ended` or closes. The engine may call `start` again to recover
/// from an unexpected end.
#[async_trait]
pub trait Recognizer: Send {
    /// Whether the platform provides a dictation capability at all.
    fn is_supported(&self) -> bool;

    /// Begin a capture stream, returning the event receiver.
    async fn start(&mut self) -> Result<mpsc::UnboundedReceiver<TranscriptEvent>, CaptureError>;
}

/// Recognizer for platforms with no dictation capability.
///
/// Callers must surface the resulting `CaptureError::Unsupported` to the
/// user as a blocking notice.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedRecognizer;

#[async_trait]
impl Recognizer for UnsupportedRecognizer {
    fn is_supported(&self) -> bool {
        false
    }

    async fn start(&mut self) -> Result<mpsc::UnboundedReceiver<TranscriptEvent>, CaptureError> {
        Err(CaptureError::Unsupported)
    }
}

/// Drives one recognizer through capture sessions.
pub struct CaptureEngine<R> {
    recognizer: R,
    state: StateMachine,
    /// Maximum automatic restarts within a single `run` call.
    max_restarts: u32,
}

impl<R: Recognizer> CaptureEngine<R> {
    pub fn new(recognizer: R, max_restarts: u32) -> Self {
        Self {
            recognizer,
            state: StateMachine::new(),
            max_restarts,
        }
    }

    /// Returns the current capture state.
    pub fn current_state(&self) -> CaptureState {
        self.state.current()
    }

    /// Run one capture session to completion.
    ///
    /// Starts capture with `seed` as the settled buffer and emits the merged
    /// transcript on `updates` after every recognizer event. Transient
    /// errors are logged and capture continues. An end-of-stream while still
    /// listening restarts the recognizer, preserving settled text, up to
    /// `max_restarts` times; past the bound (or if the restart itself fails)
    /// the session ends with `CaptureError::EndedUnexpectedly`.
    ///
    /// Cancelling `stop` is the explicit stop: the buffer is frozen and its
    /// merged value returned as the authoritative input text.
    pub async fn run(
        &mut self,
        seed: &str,
        updates: mpsc::UnboundedSender<String>,
        stop: CancellationToken,
    ) -> Result<String, CaptureError> {
        if !self.recognizer.is_supported() {
            return Err(CaptureError::Unsupported);
        }

        self.state.transition(CaptureState::Listening)?;
        let mut buffer = TranscriptBuffer::with_seed(seed);
        let mut restarts = 0u32;

        let mut rx = match self.recognizer.start().await {
            Ok(rx) => rx,
            Err(e) => {
                self.state.reset();
                return Err(e);
            }
        };

        tracing::info!(seed_len = seed.len(), "Capture session started");

        loop {
            tokio::select! {
                _ = stop.cancelled() => {
                    self.state.transition(CaptureState::Idle)?;
                    let text = buffer.merged();
                    tracing::info!(text_len = text.len(), "Capture stopped");
                    return Ok(text);
                }
                event = rx.recv() => {
                    // A closed channel is an end-of-stream.
                    match event.unwrap_or(TranscriptEvent::Ended) {
                        ev @ TranscriptEvent::Segment { .. } => {
                            buffer.apply(ev);
                            // The listener going away is not a capture failure.
                            let _ = updates.send(buffer.merged());
                        }
                        TranscriptEvent::SoftError(reason) => {
                            tracing::debug!(%reason, "Transient capture error, continuing");
                        }
                        TranscriptEvent::Ended => {
                            if restarts >= self.max_restarts {
                                tracing::warn!(restarts, "Restart budget exhausted");
                                self.state.reset();
                                return Err(CaptureError::EndedUnexpectedly);
                            }
                            restarts += 1;
                            buffer.discard_interim();
                            tracing::warn!(
                                attempt = restarts,
                                "Recognizer ended while listening, restarting"
                            );
                            match self.recognizer.start().await {
                                Ok(new_rx) => rx = new_rx,
                                Err(e) => {
                                    tracing::warn!(error = %e, "Capture restart failed");
                                    self.state.reset();
                                    return Err(CaptureError::EndedUnexpectedly);
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
