//! Contest standings engine.
//!
//! See [`board`] for the engine itself; `standings_runtime` wires it to a
//! SQLite-backed store and a mutation-event channel.
//!
//! ```sh
//! cargo run --release --bin standings_runtime
//! ```
//!
//! ## Environment Variables
//!
//! - STANDINGS_DB_PATH - SQLite database path (default: /var/lib/standings/standings.db)
//! - SCORING_LOOKBACK_SECS - Rolling scoring window look-back (default: 86400)
//! - SCORING_SLACK_SECS - Forward clock-skew slack (default: 86400)
//! - SEARCH_RESULT_LIMIT - Typeahead result size (default: 5)
//! - EVENT_CHANNEL_BUFFER - Mutation-event channel buffer (default: 1024)
//! - RUST_LOG - Logging level (optional, default: info)

pub mod board;

pub use board::{
    Contest, ContestStore, CreditWeights, EligibilityMode, EngineConfig, LeaderboardEntry,
    LeaderboardRead, LeaderboardSnapshot, MutationEvent, Participant, SqliteContestStore,
    StandingsEngine,
};
