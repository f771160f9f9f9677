//! Docent application binary - composition root.
//!
//! Ties together all Docent crates into a single executable:
//! 1. Load configuration from TOML
//! 2. Open the local conversation cache (SQLite)
//! 3. Build the HTTP answer client
//! 4. Restore the cached conversation, if any
//! 5. Run an interactive prompt over stdin
//!
//! Plain input lines are sent as queries; lines starting with `/` are
//! commands (see `/help`).

mod cli;

use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use docent_client::{AnswerApi, AnswerClient};
use docent_core::config::DocentConfig;
use docent_core::types::{Message, Rating, Role};
use docent_dictation::{CaptureEngine, CaptureError, UnsupportedRecognizer};
use docent_session::{ConversationSession, FeedbackController, SessionError};
use docent_storage::{Database, HistoryStore};

use cli::CliArgs;

/// Expand ~ to home directory in a path string.
fn resolve_data_dir(data_dir: &str) -> PathBuf {
    if data_dir.starts_with("~/") || data_dir.starts_with("~\\") {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(&data_dir[2..])
    } else {
        PathBuf::from(data_dir)
    }
}

fn print_message(message: &Message) {
    println!("[{}] {}: {}", message.id, message.role, message.content);
    if let Some(chunks) = &message.source_chunks {
        if !chunks.is_empty() {
            println!("    sources: {}", chunks.join(", "));
        }
    }
}

fn print_transcript(messages: &[Message]) {
    if messages.is_empty() {
        println!("(empty conversation)");
        return;
    }
    for message in messages {
        print_message(message);
    }
}

fn print_help() {
    println!("Commands:");
    println!("  /history        reload the conversation from the server");
    println!("  /clear          start a new conversation");
    println!("  /like <id>      mark a reply as helpful");
    println!("  /dislike <id>   mark a reply as unhelpful");
    println!("  /dictate        dictate a query (where supported)");
    println!("  /help           show this help");
    println!("  /quit           exit");
    println!("Anything else is sent as a question.");
}

async fn send(session: &ConversationSession, query: &str) {
    match session.send_message(query).await {
        Ok(()) => {
            let messages = session.messages();
            if let Some(reply) = messages.iter().rev().find(|m| m.role == Role::Assistant) {
                print_message(reply);
            }
        }
        Err(SessionError::Busy) => println!("A request is already in flight, try again."),
        Err(e) => println!("Error: {}", e),
    }
}

async fn rate(feedback: &FeedbackController, message_id: &str, rating: Rating) {
    feedback.set_rating(message_id, rating).await;
    match feedback.rating(message_id) {
        Rating::Like => println!("Marked {} as helpful.", message_id),
        Rating::Dislike => println!("Marked {} as unhelpful.", message_id),
        Rating::Neutral => println!("Rating removed from {}.", message_id),
    }
}

/// Run one dictation session and return the captured text, if any.
///
/// The stock build carries no platform recognizer, so this reports the
/// capability as unavailable; a platform recognizer plugs in here.
async fn dictate(max_restarts: u32) -> Option<String> {
    let mut engine = CaptureEngine::new(UnsupportedRecognizer, max_restarts);
    let (updates_tx, mut updates_rx) = tokio::sync::mpsc::unbounded_channel::<String>();
    let stop = CancellationToken::new();

    tokio::spawn(async move {
        while let Some(text) = updates_rx.recv().await {
            println!("... {}", text);
        }
    });

    match engine.run("", updates_tx, stop).await {
        Ok(text) if !text.trim().is_empty() => Some(text),
        Ok(_) => {
            println!("Nothing captured.");
            None
        }
        Err(CaptureError::Unsupported) => {
            println!("Dictation is not supported on this platform.");
            None
        }
        Err(e) => {
            println!("Dictation failed: {}", e);
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let config = DocentConfig::load_or_default(&config_file);

    // Tracing. RUST_LOG wins over the resolved level.
    let log_level = args
        .resolve_log_level()
        .unwrap_or_else(|| config.general.log_level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    tracing::info!("Starting Docent v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // Storage.
    let data_dir = resolve_data_dir(
        &args
            .resolve_data_dir()
            .unwrap_or_else(|| config.general.data_dir.clone()),
    );
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::error!(path = %data_dir.display(), error = %e, "Failed to create data directory");
        return Err(e.into());
    }
    let db_path = data_dir.join("docent.db");
    let db = Arc::new(Database::new(&db_path)?);
    let store = Arc::new(HistoryStore::new(db));
    tracing::info!(path = %db_path.display(), "Conversation cache opened");

    // Answer client.
    let base_url = args.resolve_base_url(&config.api.base_url);
    let client = Arc::new(AnswerClient::new(base_url.clone()));
    tracing::info!(base_url = %base_url, "Answer client ready");

    match client.health().await {
        Ok(health) => tracing::info!(status = %health.status, "Answer backend reachable"),
        Err(e) => tracing::warn!(error = %e, "Answer backend not reachable, queries will fail"),
    }

    // Session.
    let session = ConversationSession::restored(client.clone(), store)?;
    let feedback = FeedbackController::new(client);

    let restored = session.messages();
    if !restored.is_empty() {
        println!("Restored conversation:");
        print_transcript(&restored);
    }
    print_help();

    // === Prompt loop ===

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.split_once(' ').unwrap_or((line, "")) {
            ("/quit", _) | ("/exit", _) => break,
            ("/help", _) => print_help(),
            ("/history", _) => match session.load_history().await {
                Ok(()) => print_transcript(&session.messages()),
                Err(SessionError::Busy) => println!("A request is already in flight, try again."),
                Err(e) => println!("Error: {}", e),
            },
            ("/clear", _) => match session.clear() {
                Ok(()) => println!("Conversation cleared."),
                Err(e) => println!("Error: {}", e),
            },
            ("/like", id) if !id.is_empty() => rate(&feedback, id.trim(), Rating::Like).await,
            ("/dislike", id) if !id.is_empty() => rate(&feedback, id.trim(), Rating::Dislike).await,
            ("/like", _) | ("/dislike", _) => println!("Usage: /like <message-id>"),
            ("/dictate", _) => {
                if let Some(text) = dictate(config.dictation.max_restarts).await {
                    send(&session, &text).await;
                }
            }
            (command, _) if command.starts_with('/') => {
                println!("Unknown command: {} (try /help)", command);
            }
            _ => send(&session, line).await,
        }
    }

    session.shutdown();
    tracing::info!("Docent exiting");
    Ok(())
}
