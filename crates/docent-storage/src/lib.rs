//! Docent storage crate - durable local cache for conversation histories.
//!
//! Provides a WAL-mode SQLite database with migrations and a repository
//! mapping conversation ids to whole-transcript records, plus the durable
//! pointer to the "current" conversation that survives restarts.

pub mod db;
pub mod history_store;
pub mod migrations;

pub use db::Database;
pub use history_store::HistoryStore;
