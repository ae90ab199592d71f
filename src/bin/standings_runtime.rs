//! Standings Runtime - production wiring for the contest engine
//!
//! Opens the SQLite-backed store, runs schema migrations, and starts the
//! mutation-event ingestion loop. External collaborators clone the event
//! sender to report mutations; presentation collaborators call
//! `get_leaderboard`/`search_participants` on the shared engine handle.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin standings_runtime
//! ```

use standings::board::config::EngineConfig;
use standings::board::engine::StandingsEngine;
use standings::board::ingestion::{start_event_ingestion, MutationEvent};
use standings::board::sqlite_store::{run_schema_migrations, SqliteContestStore};
use standings::board::store::BoxError;
use std::sync::Arc;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    dotenv::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = EngineConfig::from_env();

    log::info!("🚀 Standings runtime starting");
    log::info!("   ├─ Database: {}", config.db_path);
    log::info!(
        "   ├─ Scoring window: -{}s look-back, +{}s slack",
        config.lookback_secs,
        config.slack_secs
    );
    log::info!("   └─ Search limit: {}", config.search_limit);

    let mut conn = rusqlite::Connection::open(&config.db_path)?;
    run_schema_migrations(&mut conn, "sql")?;
    drop(conn);

    let store = Arc::new(SqliteContestStore::new(&config.db_path)?);
    let engine = Arc::new(StandingsEngine::new(store, &config));

    let (event_tx, event_rx) = mpsc::channel::<MutationEvent>(config.channel_buffer);
    let ingestion = tokio::spawn(start_event_ingestion(event_rx, engine));

    // event_tx is the integration surface: collaborators embedding this
    // runtime clone it to report mutations. Held here until shutdown so
    // the ingestion loop only stops once every sender is gone.
    tokio::signal::ctrl_c().await?;
    log::info!("Received Ctrl+C, shutting down");

    drop(event_tx);
    ingestion.await?;

    log::info!("✅ Standings runtime stopped");
    Ok(())
}
