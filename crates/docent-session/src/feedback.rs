//! Optimistic per-message feedback ratings.
//!
//! The rating flips locally before the network call, so the surface can
//! repaint immediately. A failed submission rolls the rating back to
//! neutral, but only if the user has not changed it again in the meantime.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use docent_client::AnswerApi;
use docent_core::types::{FeedbackRequest, Rating};

/// Tracks helpfulness ratings per message id. Ratings live in memory only
/// and reset when the session ends.
pub struct FeedbackController {
    client: Arc<dyn AnswerApi>,
    ratings: Mutex<HashMap<String, Rating>>,
}

impl FeedbackController {
    pub fn new(client: Arc<dyn AnswerApi>) -> Self {
        Self {
            client,
            ratings: Mutex::new(HashMap::new()),
        }
    }

    /// The current rating for a message. Unrated messages are neutral.
    pub fn rating(&self, message_id: &str) -> Rating {
        self.ratings
            .lock()
            .expect("ratings lock poisoned")
            .get(message_id)
            .copied()
            .unwrap_or_default()
    }

    /// Apply a rating to a message.
    ///
    /// Selecting the already-active rating toggles it back to neutral
    /// without contacting the backend. Otherwise the rating is set
    /// optimistically and submitted; if submission fails the rating is
    /// rolled back to neutral unless the user changed it again while the
    /// request was in flight.
    pub async fn set_rating(&self, message_id: &str, rating: Rating) {
        {
            let mut ratings = self.ratings.lock().expect("ratings lock poisoned");
            let current = ratings.get(message_id).copied().unwrap_or_default();
            if current == rating {
                ratings.insert(message_id.to_string(), Rating::Neutral);
                return;
            }
            ratings.insert(message_id.to_string(), rating);
        }
        if rating == Rating::Neutral {
            return;
        }

        let request = FeedbackRequest {
            message_id: message_id.to_string(),
            rating: rating.as_i8(),
            comment: None,
        };
        match self.client.submit_feedback(&request).await {
            Ok(response) => {
                tracing::debug!(
                    message_id = %message_id,
                    success = response.success,
                    "Feedback recorded"
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, message_id = %message_id, "Feedback submission failed");
                let mut ratings = self.ratings.lock().expect("ratings lock poisoned");
                if ratings.get(message_id).copied() == Some(rating) {
                    ratings.insert(message_id.to_string(), Rating::Neutral);
                }
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
