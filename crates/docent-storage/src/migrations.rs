//! Database schema migrations.
//!
//! Applies the initial schema: the histories table (one JSON payload row
//! per conversation), the single-row current-conversation pointer, and the
//! schema_migrations tracking table.

use rusqlite::Connection;
use tracing::info;

use docent_core::error::DocentError;

/// Run all pending database migrations.
///
/// Currently implements the initial schema (version 1). Future migrations
/// can be added by checking the current version and applying incremental
/// changes.
pub fn run_migrations(conn: &Connection) -> Result<(), DocentError> {
    // Create the migrations tracking table first.
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| DocentError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| DocentError::Storage(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: initial_schema");
    }

    Ok(())
}

/// Version 1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<(), DocentError> {
    conn.execute_batch(
        "
        -- One record per conversation; the payload is the serialized
        -- StoredHistory. Writes are whole-value replacements.
        CREATE TABLE IF NOT EXISTS histories (
            conversation_id TEXT PRIMARY KEY NOT NULL,
            payload         TEXT NOT NULL,
            updated_at      INTEGER NOT NULL
        );

        -- Durable pointer to the conversation restored on startup.
        -- Single row enforced by the fixed id.
        CREATE TABLE IF NOT EXISTS current_conversation (
            id              INTEGER PRIMARY KEY CHECK (id = 1),
            conversation_id TEXT NOT NULL
        );

        INSERT INTO schema_migrations (version, name) VALUES (1, 'initial_schema');
        ",
    )
    .map_err(|e| DocentError::Storage(format!("Failed to apply v1 migration: {}", e)))?;

    Ok(())
}
