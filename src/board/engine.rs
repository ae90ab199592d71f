//! Standings engine - orchestration layer over the leaderboard pipeline
//!
//! Runs the full recompute pipeline for one contest:
//!
//! ```text
//! mutation event (vote verified, shipment recorded, settings changed)
//!     ↓
//! StandingsEngine::invalidate()           (coalesced, at-most-one in flight)
//!     ↓
//! eligibility::eligible_participants()
//!     ↓
//! aggregate::aggregate_activity()         (per participant, independently)
//!     ↓
//! score::credits()
//!     ↓
//! rank::rank()
//!     ↓
//! LeaderboardCache::publish()             (single atomic snapshot swap)
//! ```
//!
//! The engine is stateless apart from the cache, takes the contest as an
//! explicit parameter everywhere (no ambient request context), and reads
//! all source data through the [`ContestStore`] seam. Reads never block on
//! recomputation and never surface internal computation errors: the read
//! path returns the best available snapshot or an explicit Pending marker.

use super::aggregate::{aggregate_activity, ScoringWindow};
use super::cache::{LeaderboardCache, LeaderboardRead, LeaderboardSnapshot};
use super::config::EngineConfig;
use super::eligibility;
use super::rank;
use super::score;
use super::search;
use super::store::{BoxError, ContestStore};
use super::types::{Contest, ContestConfigError, ContestId, Participant, ParticipantId};
use std::sync::Arc;

/// Engine-level failure surfaced to administrative and recompute callers
///
/// Never reaches the read path: `get_leaderboard` keeps serving the
/// previous snapshot when a recompute fails.
#[derive(Debug)]
pub enum EngineError {
    ContestNotFound(ContestId),
    /// One or more activity sources were unreachable; the whole cycle was
    /// abandoned rather than publishing partially-summed scores
    ParticipantsUnavailable(ContestId, Vec<ParticipantId>),
    InvalidConfiguration(ContestConfigError),
    Store(BoxError),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::ContestNotFound(id) => write!(f, "contest {} not found", id),
            EngineError::ParticipantsUnavailable(contest, participants) => write!(
                f,
                "activity unavailable for {} participant(s) of contest {}, cycle abandoned",
                participants.len(),
                contest
            ),
            EngineError::InvalidConfiguration(err) => write!(f, "invalid configuration: {}", err),
            EngineError::Store(err) => write!(f, "store error: {}", err),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Store(err) => Some(err.as_ref()),
            EngineError::InvalidConfiguration(err) => Some(err),
            _ => None,
        }
    }
}

/// Contest standings engine
///
/// Safe to share behind an `Arc` across request-serving tasks; all
/// pipeline stages run on the calling task, only the coalesced recompute
/// is spawned.
pub struct StandingsEngine {
    store: Arc<dyn ContestStore>,
    cache: LeaderboardCache,
    window: ScoringWindow,
    search_limit: usize,
    /// Timestamp function (for testing with mock time)
    now_fn: Box<dyn Fn() -> i64 + Send + Sync>,
}

impl StandingsEngine {
    /// Create an engine with the system clock
    pub fn new(store: Arc<dyn ContestStore>, config: &EngineConfig) -> Self {
        Self::new_with_timestamp_fn(store, config, Box::new(|| chrono::Utc::now().timestamp()))
    }

    /// Create an engine with a custom timestamp function
    ///
    /// Used for testing with deterministic timestamps.
    pub fn new_with_timestamp_fn(
        store: Arc<dyn ContestStore>,
        config: &EngineConfig,
        now_fn: Box<dyn Fn() -> i64 + Send + Sync>,
    ) -> Self {
        Self {
            store,
            cache: LeaderboardCache::new(),
            window: config.scoring_window(),
            search_limit: config.search_limit,
            now_fn,
        }
    }

    /// Inbound trigger: a vote was verified or a shipment recorded
    pub fn on_activity_mutation(self: Arc<Self>, contest_id: ContestId) {
        self.invalidate(contest_id);
    }

    /// Inbound trigger: contest weights or eligibility settings changed
    pub fn on_contest_settings_changed(self: Arc<Self>, contest_id: ContestId) {
        self.invalidate(contest_id);
    }

    /// Mark the contest stale and schedule an asynchronous recompute
    ///
    /// Idempotent: invalidations landing during an in-flight recompute
    /// coalesce into one follow-up pass (see [`LeaderboardCache`]).
    pub fn invalidate(self: Arc<Self>, contest_id: ContestId) {
        if self.cache.begin_invalidate(contest_id) {
            tokio::spawn(async move {
                self.recompute_loop(contest_id).await;
            });
        } else {
            log::debug!(
                "invalidation for contest {} coalesced into in-flight recompute",
                contest_id
            );
        }
    }

    async fn recompute_loop(&self, contest_id: ContestId) {
        loop {
            if let Err(e) = self.recompute(contest_id).await {
                // Previous snapshot stays served; retry with backoff is
                // owned by the external task dispatcher
                log::error!("❌ Recompute failed for contest {}: {}", contest_id, e);
            }
            if !self.cache.finish_recompute(contest_id) {
                break;
            }
            log::debug!("running coalesced recompute for contest {}", contest_id);
        }
    }

    /// Run the full pipeline and atomically publish the result
    ///
    /// A recompute is not cancellable mid-flight: it runs to completion and
    /// publishes even if more mutations arrive, and the coalescing flag
    /// guarantees a fresh pass follows. An empty eligibility set publishes
    /// an empty leaderboard (that is a result, not an error).
    pub async fn recompute(
        &self,
        contest_id: ContestId,
    ) -> Result<Arc<LeaderboardSnapshot>, EngineError> {
        let data_version = self.cache.version(contest_id);
        let as_of = (self.now_fn)();

        let contest = self
            .store
            .contest(contest_id)
            .await
            .map_err(EngineError::Store)?
            .ok_or(EngineError::ContestNotFound(contest_id))?;

        let all = self.store.participants().await.map_err(EngineError::Store)?;
        let eligible = eligibility::eligible_participants(&contest, &all);

        let mut scored: Vec<(Participant, f64)> = Vec::with_capacity(eligible.len());
        let mut unavailable: Vec<ParticipantId> = Vec::new();

        for participant in eligible {
            match aggregate_activity(
                self.store.as_ref(),
                &contest,
                participant.id,
                &self.window,
                as_of,
            )
            .await
            {
                Ok(counts) => {
                    scored.push((participant, score::credits(&counts, &contest.weights)));
                }
                Err(e) => {
                    log::warn!(
                        "⚠️  Activity unavailable for participant {} of contest {}: {}",
                        participant.id,
                        contest_id,
                        e
                    );
                    unavailable.push(participant.id);
                }
            }
        }

        if !unavailable.is_empty() {
            return Err(EngineError::ParticipantsUnavailable(contest_id, unavailable));
        }

        let entries = rank::rank(scored);
        let snapshot = LeaderboardSnapshot {
            contest_id,
            entries,
            computed_at: as_of,
            data_version,
            leaderboard_enabled: contest.leaderboard_enabled,
            show_credits: contest.show_credits,
        };

        self.cache.publish(snapshot.clone());
        log::info!(
            "✅ Published leaderboard for contest {} ({} entries, version {})",
            contest_id,
            snapshot.entries.len(),
            data_version
        );

        Ok(Arc::new(snapshot))
    }

    /// Outbound read: current leaderboard, never blocking on recomputation
    pub fn get_leaderboard(&self, contest_id: ContestId) -> LeaderboardRead {
        self.cache.get(contest_id)
    }

    /// Outbound read: typeahead lookup over the contest's eligibility set
    pub async fn search_participants(
        &self,
        contest_id: ContestId,
        query: &str,
    ) -> Result<Vec<Participant>, EngineError> {
        let contest = self
            .store
            .contest(contest_id)
            .await
            .map_err(EngineError::Store)?
            .ok_or(EngineError::ContestNotFound(contest_id))?;

        let all = self.store.participants().await.map_err(EngineError::Store)?;
        let eligible = eligibility::eligible_participants(&contest, &all);

        Ok(search::search(&eligible, query, self.search_limit))
    }

    /// Eligibility set ordered for administrative listing
    pub async fn eligible_participants(
        &self,
        contest_id: ContestId,
    ) -> Result<Vec<Participant>, EngineError> {
        let contest = self
            .store
            .contest(contest_id)
            .await
            .map_err(EngineError::Store)?
            .ok_or(EngineError::ContestNotFound(contest_id))?;

        let all = self.store.participants().await.map_err(EngineError::Store)?;
        Ok(eligibility::eligible_participants_ordered(&contest, &all))
    }

    /// Configuration-time validation for the external admin collaborator
    pub async fn validate_contest(&self, contest: &Contest) -> Result<(), EngineError> {
        let known = self
            .store
            .known_user_ids()
            .await
            .map_err(EngineError::Store)?;
        contest
            .validate(&known)
            .map_err(EngineError::InvalidConfiguration)
    }

    /// Cache handle, exposed for staleness checks and instrumentation
    pub fn cache(&self) -> &LeaderboardCache {
        &self.cache
    }
}
