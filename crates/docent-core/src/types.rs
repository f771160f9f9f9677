//! Shared data model and wire types.
//!
//! Mirrors the HTTP contract of the answer backend: `QueryRequest` /
//! `QueryResponse` for sends, `ConversationHistory` for explicit reloads,
//! `FeedbackRequest` / `FeedbackResponse` for helpfulness ratings. `Message`
//! is the unit of the visible transcript and is immutable once created.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Transcript model
// =============================================================================

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::System => write!(f, "system"),
        }
    }
}

/// A single transcript entry.
///
/// Append-only: a message is never mutated after creation. Ids are unique
/// within a conversation; the client assigns ids for user and error
/// messages, server-assigned ids are kept for history-loaded messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Citation identifiers backing an assistant answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_chunks: Option<Vec<String>>,
}

impl Message {
    /// Create a user message with a freshly generated id.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
            source_chunks: None,
        }
    }

    /// Create an assistant message with a server-assigned id and citations.
    pub fn assistant(
        id: impl Into<String>,
        content: impl Into<String>,
        source_chunks: Option<Vec<String>>,
    ) -> Self {
        Self {
            id: id.into(),
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            source_chunks,
        }
    }
}

/// A retrieved document fragment backing an assistant answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub chapter: String,
    #[serde(default)]
    pub section: String,
}

// =============================================================================
// Wire types
// =============================================================================

/// Request body for `POST /chat/query`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_url: Option<String>,
}

/// Response body for `POST /chat/query`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub conversation_id: String,
    pub response: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
    /// Ordered citation identifiers, carried onto the assistant message.
    #[serde(default)]
    pub sources: Vec<String>,
}

/// Response body for `GET /chat/history/{conversation_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationHistory {
    pub conversation_id: String,
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// Request body for `POST /feedback`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub message_id: String,
    pub rating: i8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Response body for `POST /feedback`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// Response body for `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub details: serde_json::Value,
}

// =============================================================================
// Persistence and feedback
// =============================================================================

/// Persisted record for one conversation: the full transcript and the
/// instant of the last write. Whole-value replacement on every save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredHistory {
    pub messages: Vec<Message>,
    pub timestamp: DateTime<Utc>,
}

/// Per-message helpfulness rating. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rating {
    Dislike,
    #[default]
    Neutral,
    Like,
}

impl Rating {
    /// Wire representation: -1 / 0 / 1.
    pub fn as_i8(self) -> i8 {
        match self {
            Rating::Dislike => -1,
            Rating::Neutral => 0,
            Rating::Like => 1,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
        let role: Role = serde_json::from_str("\"system\"").unwrap();
        assert_eq!(role, Role::System);
    }

    #[test]
    fn test_user_message_has_unique_id() {
        let a = Message::user("hello");
        let b = Message::user("hello");
        assert_ne!(a.id, b.id);
        assert_eq!(a.role, Role::User);
        assert!(a.source_chunks.is_none());
    }

    #[test]
    fn test_assistant_message_keeps_given_id() {
        let msg = Message::assistant("srv-42", "answer", Some(vec!["doc-a".to_string()]));
        assert_eq!(msg.id, "srv-42");
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.source_chunks, Some(vec!["doc-a".to_string()]));
    }

    #[test]
    fn test_message_round_trip() {
        let msg = Message::assistant("m1", "text", Some(vec!["c1".to_string(), "c2".to_string()]));
        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn test_message_without_sources_omits_field() {
        let msg = Message::user("hi");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(!json.contains("source_chunks"));
    }

    #[test]
    fn test_query_request_omits_absent_context() {
        let req = QueryRequest {
            query: "what is ROS 2?".to_string(),
            conversation_id: None,
            selected_text: None,
            page_url: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, "{\"query\":\"what is ROS 2?\"}");
    }

    #[test]
    fn test_query_response_defaults_empty_collections() {
        let json = "{\"conversation_id\":\"c1\",\"response\":\"hi\"}";
        let resp: QueryResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.conversation_id, "c1");
        assert!(resp.citations.is_empty());
        assert!(resp.sources.is_empty());
    }

    #[test]
    fn test_feedback_request_wire_shape() {
        let req = FeedbackRequest {
            message_id: "m1".to_string(),
            rating: -1,
            comment: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, "{\"message_id\":\"m1\",\"rating\":-1}");
    }

    #[test]
    fn test_rating_wire_values() {
        assert_eq!(Rating::Dislike.as_i8(), -1);
        assert_eq!(Rating::Neutral.as_i8(), 0);
        assert_eq!(Rating::Like.as_i8(), 1);
        assert_eq!(Rating::default(), Rating::Neutral);
    }

    #[test]
    fn test_stored_history_round_trip() {
        let stored = StoredHistory {
            messages: vec![Message::user("q"), Message::assistant("a1", "a", None)],
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&stored).unwrap();
        let back: StoredHistory = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stored);
    }
}
