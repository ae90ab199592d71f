//! Engine configuration from environment variables

use super::aggregate::{ScoringWindow, DEFAULT_LOOKBACK_SECS, DEFAULT_SLACK_SECS};
use std::env;

/// Configuration for the standings engine and runtime
///
/// Loaded from environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Path to the SQLite database file holding source tables
    pub db_path: String,

    /// Scoring window look-back from "now", seconds
    pub lookback_secs: i64,

    /// Forward slack beyond "now" tolerated for clock skew, seconds
    pub slack_secs: i64,

    /// Maximum participants returned by typeahead search
    pub search_limit: usize,

    /// Buffer size of the mutation-event channel
    pub channel_buffer: usize,
}

impl EngineConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `STANDINGS_DB_PATH` (default: /var/lib/standings/standings.db)
    /// - `SCORING_LOOKBACK_SECS` (default: 86400)
    /// - `SCORING_SLACK_SECS` (default: 86400)
    /// - `SEARCH_RESULT_LIMIT` (default: 5)
    /// - `EVENT_CHANNEL_BUFFER` (default: 1024)
    pub fn from_env() -> Self {
        Self {
            db_path: env::var("STANDINGS_DB_PATH")
                .unwrap_or_else(|_| "/var/lib/standings/standings.db".to_string()),

            lookback_secs: env::var("SCORING_LOOKBACK_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_LOOKBACK_SECS),

            slack_secs: env::var("SCORING_SLACK_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_SLACK_SECS),

            search_limit: env::var("SEARCH_RESULT_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),

            channel_buffer: env::var("EVENT_CHANNEL_BUFFER")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1_024),
        }
    }

    pub fn scoring_window(&self) -> ScoringWindow {
        ScoringWindow {
            lookback_secs: self.lookback_secs,
            slack_secs: self.slack_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_overrides() {
        // Phase 1: defaults when nothing is set
        env::remove_var("STANDINGS_DB_PATH");
        env::remove_var("SCORING_LOOKBACK_SECS");
        env::remove_var("SCORING_SLACK_SECS");
        env::remove_var("SEARCH_RESULT_LIMIT");
        env::remove_var("EVENT_CHANNEL_BUFFER");

        let config = EngineConfig::from_env();
        assert_eq!(config.db_path, "/var/lib/standings/standings.db");
        assert_eq!(config.lookback_secs, 86_400);
        assert_eq!(config.slack_secs, 86_400);
        assert_eq!(config.search_limit, 5);
        assert_eq!(config.channel_buffer, 1_024);

        // Phase 2: overrides take effect
        env::set_var("STANDINGS_DB_PATH", "/tmp/standings-test.db");
        env::set_var("SCORING_LOOKBACK_SECS", "3600");
        env::set_var("SCORING_SLACK_SECS", "0");
        env::set_var("SEARCH_RESULT_LIMIT", "10");

        let config = EngineConfig::from_env();
        assert_eq!(config.db_path, "/tmp/standings-test.db");
        assert_eq!(config.scoring_window().bounds(5_000), (1_400, 5_000));
        assert_eq!(config.search_limit, 10);

        // Cleanup
        env::remove_var("STANDINGS_DB_PATH");
        env::remove_var("SCORING_LOOKBACK_SECS");
        env::remove_var("SCORING_SLACK_SECS");
        env::remove_var("SEARCH_RESULT_LIMIT");
    }
}
