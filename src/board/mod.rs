//! # Contest Standings Engine
//!
//! Aggregates time-windowed participant activity (verified votes,
//! shipments, collected units) into weighted credit scores, ranks
//! participants with shared-rank tie handling, restricts eligibility by
//! whitelist/blacklist and category/region constraints, and serves
//! results through a per-contest cache that is invalidated and
//! asynchronously recomputed on mutations.
//!
//! ## Architecture
//!
//! Everything around this engine (HTTP routing, admin forms, auth,
//! export formatting, the retry queue) is an external collaborator that
//! either feeds [`ingestion::MutationEvent`]s in or reads snapshots out.
//!
//! 1. Mutation events arrive from collaborators (in-memory channel)
//! 2. The cache coalesces invalidations per contest (at most one
//!    recompute in flight; bursts collapse into a single follow-up)
//! 3. A recompute filters eligibility, aggregates each participant's
//!    activity over the rolling scoring window, scores and ranks
//! 4. The finished leaderboard is published as one immutable snapshot
//! 5. Readers get the current snapshot or an explicit Pending marker,
//!    never a partially-built list
//!
//! ## Module Organization
//!
//! - `types` - Core data structures (Contest, Participant, LeaderboardEntry)
//! - `store` - Read-only store trait over externally-owned source data
//! - `sqlite_store` - SQLite implementation and schema migration loader
//! - `eligibility` - Whitelist/blacklist + category/region filtering
//! - `aggregate` - Rolling-window activity aggregation
//! - `score` - Weighted credit calculation
//! - `rank` - Ordering and shared-rank assignment
//! - `cache` - Per-contest snapshot cache with coalescing invalidation
//! - `search` - Participant typeahead lookup
//! - `engine` - Orchestration and external interface
//! - `ingestion` - Mutation-event channel consumer
//! - `config` - Environment-variable configuration

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod eligibility;
pub mod engine;
pub mod ingestion;
pub mod rank;
pub mod score;
pub mod search;
pub mod sqlite_store;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use aggregate::ScoringWindow;
pub use cache::{LeaderboardCache, LeaderboardRead, LeaderboardSnapshot};
pub use config::EngineConfig;
pub use engine::{EngineError, StandingsEngine};
pub use ingestion::MutationEvent;
pub use sqlite_store::SqliteContestStore;
pub use store::{BoxError, ContestStore};
pub use types::{
    ActivityCounts, Contest, ContestConfigError, CreditWeights, EligibilityMode, LeaderboardEntry,
    Participant,
};
