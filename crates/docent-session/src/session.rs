//! Conversation session: transcript, identity, and the send lifecycle.
//!
//! All mutation of the visible transcript happens through this type. A
//! single busy guard covers sends and history loads, so at most one network
//! operation touches the transcript at a time; the state lock is never held
//! across an await.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use docent_client::AnswerApi;
use docent_core::types::{Message, QueryRequest};
use docent_storage::HistoryStore;

use crate::error::SessionError;

/// Assistant reply inserted in place of an answer when the query fails.
pub const FALLBACK_REPLY: &str =
    "Sorry, I encountered an error processing your request. Please try again.";

/// Snapshot of the conversation visible to the host surface.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    /// Backend-assigned id, adopted from the first successful reply.
    pub conversation_id: Option<String>,
    /// The transcript in display order.
    pub messages: Vec<Message>,
    /// A query is in flight.
    pub is_sending: bool,
    /// A history load is in flight.
    pub is_loading_history: bool,
}

/// Page context attached to outgoing queries. The selected text is
/// one-shot: it is cleared once a query carrying it succeeds.
#[derive(Debug, Default)]
struct PageContext {
    page_url: Option<String>,
    selected_text: Option<String>,
}

/// The conversation engine.
///
/// Methods take `&self`; internal state sits behind a mutex so the session
/// can be shared across tasks. Network and storage failures inside a send
/// or a history load do not propagate: a failed send becomes a fallback
/// reply, a failed cache write becomes a log line.
pub struct ConversationSession {
    client: Arc<dyn AnswerApi>,
    store: Arc<HistoryStore>,
    state: Mutex<ConversationState>,
    context: Mutex<PageContext>,
    shutdown: CancellationToken,
}

impl ConversationSession {
    /// Create a session with an empty transcript.
    pub fn new(client: Arc<dyn AnswerApi>, store: Arc<HistoryStore>) -> Self {
        Self {
            client,
            store,
            state: Mutex::new(ConversationState::default()),
            context: Mutex::new(PageContext::default()),
            shutdown: CancellationToken::new(),
        }
    }

    /// Create a session and seed it from the cached conversation, if any.
    pub fn restored(
        client: Arc<dyn AnswerApi>,
        store: Arc<HistoryStore>,
    ) -> Result<Self, SessionError> {
        let session = Self::new(client, store);
        session.restore_from_cache()?;
        Ok(session)
    }

    // =========================================================================
    // Sending
    // =========================================================================

    /// Send a query and append the reply to the transcript.
    ///
    /// The user message is appended before the request goes out. On success
    /// the assistant reply is appended with its citations; on failure a
    /// fallback reply is appended instead and `Ok` is still returned. Refused
    /// with `Busy` while another send or history load is in flight.
    pub async fn send_message(&self, query: &str) -> Result<(), SessionError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SessionError::EmptyQuery);
        }
        let query = query.to_string();

        let request = {
            let mut state = self.lock_state()?;
            if state.is_sending || state.is_loading_history {
                return Err(SessionError::Busy);
            }
            state.is_sending = true;
            state.messages.push(Message::user(query.clone()));

            let context = self.lock_context()?;
            QueryRequest {
                query,
                conversation_id: state.conversation_id.clone(),
                selected_text: context.selected_text.clone(),
                page_url: context.page_url.clone(),
            }
        };

        let result = self.client.query(&request).await;

        let mut state = self.lock_state()?;
        state.is_sending = false;
        if self.shutdown.is_cancelled() {
            return Ok(());
        }

        match result {
            Ok(response) => {
                if state.conversation_id.is_none() {
                    state.conversation_id = Some(response.conversation_id.clone());
                    if let Err(e) = self.store.set_current_conversation(&response.conversation_id)
                    {
                        tracing::warn!(error = %e, "Failed to record current conversation");
                    }
                    tracing::info!(
                        conversation_id = %response.conversation_id,
                        "Conversation started"
                    );
                }
                state.messages.push(Message::assistant(
                    Uuid::new_v4().to_string(),
                    response.response,
                    Some(response.sources),
                ));
                self.persist(&state);
                // The selected text was delivered; a failed send keeps it
                // so a retry still carries the context.
                if let Ok(mut context) = self.lock_context() {
                    context.selected_text = None;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Query failed, inserting fallback reply");
                state.messages.push(Message::assistant(
                    Uuid::new_v4().to_string(),
                    FALLBACK_REPLY,
                    None,
                ));
                self.persist(&state);
            }
        }
        Ok(())
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Replace the transcript with the server's record of the conversation.
    ///
    /// A no-op when no conversation has started. On failure the current
    /// transcript is kept unchanged. Refused with `Busy` while another send
    /// or history load is in flight.
    pub async fn load_history(&self) -> Result<(), SessionError> {
        let conversation_id = {
            let mut state = self.lock_state()?;
            if state.is_sending || state.is_loading_history {
                return Err(SessionError::Busy);
            }
            let Some(id) = state.conversation_id.clone() else {
                return Ok(());
            };
            state.is_loading_history = true;
            id
        };

        let result = self.client.history(&conversation_id).await;

        let mut state = self.lock_state()?;
        state.is_loading_history = false;
        if self.shutdown.is_cancelled() {
            return Ok(());
        }

        match result {
            Ok(history) => {
                state.messages = history.messages;
                self.persist(&state);
                tracing::info!(
                    conversation_id = %conversation_id,
                    count = state.messages.len(),
                    "History loaded"
                );
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    conversation_id = %conversation_id,
                    "Failed to load history, keeping local transcript"
                );
            }
        }
        Ok(())
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Drop the conversation: empty the transcript, forget the id, and
    /// purge the cached copy.
    pub fn clear(&self) -> Result<(), SessionError> {
        let mut state = self.lock_state()?;
        if let Some(id) = state.conversation_id.take() {
            if let Err(e) = self.store.delete_history(&id) {
                tracing::warn!(error = %e, "Failed to delete cached transcript");
            }
            if let Err(e) = self.store.clear_current_conversation() {
                tracing::warn!(error = %e, "Failed to clear conversation pointer");
            }
            tracing::info!(conversation_id = %id, "Conversation cleared");
        }
        state.messages.clear();
        Ok(())
    }

    /// Seed the session from the cached current conversation.
    ///
    /// Returns `true` when a conversation was restored.
    pub fn restore_from_cache(&self) -> Result<bool, SessionError> {
        let Some(id) = self.store.current_conversation()? else {
            return Ok(false);
        };
        let stored = self.store.load_history(&id)?;

        let mut state = self.lock_state()?;
        state.conversation_id = Some(id.clone());
        if let Some(stored) = stored {
            state.messages = stored.messages;
        }
        tracing::info!(
            conversation_id = %id,
            count = state.messages.len(),
            "Restored conversation from cache"
        );
        Ok(true)
    }

    /// Mark the session closed. An in-flight send or history load finishes
    /// its network call but leaves the transcript untouched.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Record where the user is reading and what they have selected.
    pub fn set_page_context(&self, page_url: Option<String>, selected_text: Option<String>) {
        if let Ok(mut context) = self.lock_context() {
            context.page_url = page_url;
            context.selected_text = selected_text;
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Snapshot of the current conversation state.
    pub fn state(&self) -> ConversationState {
        self.state
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// The adopted conversation id, if any.
    pub fn conversation_id(&self) -> Option<String> {
        self.state().conversation_id
    }

    /// The transcript in display order.
    pub fn messages(&self) -> Vec<Message> {
        self.state().messages
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn lock_state(&self) -> Result<MutexGuard<'_, ConversationState>, SessionError> {
        self.state
            .lock()
            .map_err(|e| SessionError::Internal(format!("state lock poisoned: {}", e)))
    }

    fn lock_context(&self) -> Result<MutexGuard<'_, PageContext>, SessionError> {
        self.context
            .lock()
            .map_err(|e| SessionError::Internal(format!("context lock poisoned: {}", e)))
    }

    fn persist(&self, state: &ConversationState) {
        if let Some(id) = &state.conversation_id {
            if let Err(e) = self.store.save_history(id, &state.messages) {
                tracing::warn!(error = %e, "Failed to cache transcript");
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
