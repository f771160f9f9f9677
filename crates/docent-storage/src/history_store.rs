//! Repository for conversation histories and the current-conversation pointer.
//!
//! Each conversation id maps to one row holding the serialized transcript;
//! saves replace the whole value, so the last writer wins. A second process
//! writing the same conversation id will clobber this one silently; explicit
//! history loads against the server are the reconciliation path.

use std::sync::Arc;

use chrono::Utc;
use rusqlite::OptionalExtension;

use docent_core::error::DocentError;
use docent_core::types::{Message, StoredHistory};

use crate::db::Database;

/// SQLite-backed cache of conversation transcripts.
pub struct HistoryStore {
    db: Arc<Database>,
}

impl HistoryStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Persist the full transcript for a conversation.
    ///
    /// Overwrites any existing record for the same conversation id.
    pub fn save_history(
        &self,
        conversation_id: &str,
        messages: &[Message],
    ) -> Result<(), DocentError> {
        let now = Utc::now();
        let stored = StoredHistory {
            messages: messages.to_vec(),
            timestamp: now,
        };
        let payload = serde_json::to_string(&stored)?;

        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO histories (conversation_id, payload, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (conversation_id) DO UPDATE SET
                     payload = excluded.payload,
                     updated_at = excluded.updated_at",
                rusqlite::params![conversation_id, payload, now.timestamp()],
            )
            .map_err(|e| DocentError::Storage(format!("Failed to save history: {}", e)))?;
            Ok(())
        })
    }

    /// Load the stored transcript for a conversation, if any.
    pub fn load_history(&self, conversation_id: &str) -> Result<Option<StoredHistory>, DocentError> {
        self.db.with_conn(|conn| {
            let payload: Option<String> = conn
                .query_row(
                    "SELECT payload FROM histories WHERE conversation_id = ?1",
                    rusqlite::params![conversation_id],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|e| DocentError::Storage(format!("Failed to load history: {}", e)))?;

            match payload {
                Some(json) => {
                    let stored: StoredHistory = serde_json::from_str(&json)?;
                    Ok(Some(stored))
                }
                None => Ok(None),
            }
        })
    }

    /// Delete the stored transcript for a conversation.
    pub fn delete_history(&self, conversation_id: &str) -> Result<(), DocentError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "DELETE FROM histories WHERE conversation_id = ?1",
                rusqlite::params![conversation_id],
            )
            .map_err(|e| DocentError::Storage(format!("Failed to delete history: {}", e)))?;
            Ok(())
        })
    }

    /// Record the conversation to restore on startup.
    pub fn set_current_conversation(&self, conversation_id: &str) -> Result<(), DocentError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO current_conversation (id, conversation_id)
                 VALUES (1, ?1)
                 ON CONFLICT (id) DO UPDATE SET conversation_id = excluded.conversation_id",
                rusqlite::params![conversation_id],
            )
            .map_err(|e| DocentError::Storage(format!("Failed to set pointer: {}", e)))?;
            Ok(())
        })
    }

    /// The conversation to restore on startup, if one was recorded.
    pub fn current_conversation(&self) -> Result<Option<String>, DocentError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT conversation_id FROM current_conversation WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| DocentError::Storage(format!("Failed to read pointer: {}", e)))
        })
    }

    /// Forget the current-conversation pointer.
    pub fn clear_current_conversation(&self) -> Result<(), DocentError> {
        self.db.with_conn(|conn| {
            conn.execute("DELETE FROM current_conversation WHERE id = 1", [])
                .map_err(|e| DocentError::Storage(format!("Failed to clear pointer: {}", e)))?;
            Ok(())
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
