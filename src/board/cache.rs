//! Per-contest leaderboard cache with coalescing invalidation
//!
//! The cache is the engine's only shared mutable state. Each contest owns
//! one slot moving through `Empty -> Computing -> Ready -> Stale ->
//! Computing -> ...`; the published snapshot is an immutable `Arc` swapped
//! wholesale under a brief lock, so readers never observe a torn or
//! partially-built list.
//!
//! Invalidation protocol (driven by the engine, enforced here):
//! - at most one recompute in flight per contest
//! - invalidations arriving during an in-flight recompute coalesce into a
//!   single queued follow-up, consumed when the in-flight one finishes
//! - every invalidation bumps the slot's data-version counter; snapshots
//!   record the version they were computed against, so a long recompute's
//!   stale reads are distinguishable from fresh ones
//!
//! Reads never block on recomputation: an absent snapshot is an explicit
//! [`LeaderboardRead::Pending`], never silently-empty data.

use super::types::{ContestId, LeaderboardEntry};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Immutable published leaderboard for one contest
///
/// Created by a recompute, replaced wholesale on the next publish, never
/// mutated in place. Contest display flags are captured at compute time so
/// presentation collaborators need not re-query the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardSnapshot {
    pub contest_id: ContestId,
    pub entries: Vec<LeaderboardEntry>,
    /// Unix seconds at which the recompute ran
    pub computed_at: i64,
    /// Invalidation counter value this snapshot incorporates
    pub data_version: u64,
    pub leaderboard_enabled: bool,
    pub show_credits: bool,
}

impl LeaderboardSnapshot {
    /// JSON rendering for export collaborators (spreadsheet/API feeds)
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Non-blocking cache read result
#[derive(Debug, Clone)]
pub enum LeaderboardRead {
    Ready(Arc<LeaderboardSnapshot>),
    /// Not yet computed: recomputation in progress or not yet requested
    Pending,
}

#[derive(Debug, Default)]
struct CacheSlot {
    snapshot: Option<Arc<LeaderboardSnapshot>>,
    computing: bool,
    /// Recompute again after the in-flight one finishes
    queued: bool,
    /// Bumped on every invalidation
    version: u64,
}

/// Cache over all contests' leaderboard slots
#[derive(Debug, Default)]
pub struct LeaderboardCache {
    slots: Mutex<HashMap<ContestId, CacheSlot>>,
    /// Invalidation-driven recomputes started (first runs + coalesced
    /// follow-ups); observable so the coalescing property is testable
    recomputes_started: AtomicU64,
}

impl LeaderboardCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve the current snapshot without ever blocking on recomputation
    pub fn get(&self, contest_id: ContestId) -> LeaderboardRead {
        let slots = self.slots.lock().unwrap();
        match slots.get(&contest_id).and_then(|slot| slot.snapshot.clone()) {
            Some(snapshot) => LeaderboardRead::Ready(snapshot),
            None => LeaderboardRead::Pending,
        }
    }

    /// Current data version for a contest (0 if never invalidated)
    pub fn version(&self, contest_id: ContestId) -> u64 {
        let slots = self.slots.lock().unwrap();
        slots.get(&contest_id).map(|slot| slot.version).unwrap_or(0)
    }

    /// True when the served snapshot lags behind the latest invalidation
    pub fn is_stale(&self, contest_id: ContestId) -> bool {
        let slots = self.slots.lock().unwrap();
        match slots.get(&contest_id) {
            Some(slot) => match &slot.snapshot {
                Some(snapshot) => snapshot.data_version < slot.version,
                None => slot.version > 0,
            },
            None => false,
        }
    }

    /// Record an invalidation; returns true when the caller should start a
    /// recompute task
    ///
    /// Idempotent under bursts: while a recompute is in flight every
    /// further invalidation only sets the queued flag, so N invalidations
    /// collapse into exactly one follow-up recompute.
    pub fn begin_invalidate(&self, contest_id: ContestId) -> bool {
        let mut slots = self.slots.lock().unwrap();
        let slot = slots.entry(contest_id).or_default();
        slot.version += 1;

        if slot.computing {
            slot.queued = true;
            false
        } else {
            slot.computing = true;
            self.recomputes_started.fetch_add(1, Ordering::SeqCst);
            true
        }
    }

    /// Atomically publish a freshly computed snapshot
    pub fn publish(&self, snapshot: LeaderboardSnapshot) {
        let mut slots = self.slots.lock().unwrap();
        let slot = slots.entry(snapshot.contest_id).or_default();
        slot.snapshot = Some(Arc::new(snapshot));
    }

    /// Finish an in-flight recompute; returns true when a queued
    /// invalidation demands another pass
    pub fn finish_recompute(&self, contest_id: ContestId) -> bool {
        let mut slots = self.slots.lock().unwrap();
        let slot = slots.entry(contest_id).or_default();

        if slot.queued {
            slot.queued = false;
            self.recomputes_started.fetch_add(1, Ordering::SeqCst);
            true
        } else {
            slot.computing = false;
            false
        }
    }

    /// Total invalidation-driven recomputes started across all contests
    pub fn recomputes_started(&self) -> u64 {
        self.recomputes_started.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_snapshot(contest_id: ContestId, data_version: u64) -> LeaderboardSnapshot {
        LeaderboardSnapshot {
            contest_id,
            entries: Vec::new(),
            computed_at: 1_000,
            data_version,
            leaderboard_enabled: true,
            show_credits: true,
        }
    }

    #[test]
    fn test_get_before_any_compute_is_pending() {
        let cache = LeaderboardCache::new();
        assert!(matches!(cache.get(1), LeaderboardRead::Pending));
    }

    #[test]
    fn test_publish_then_get_round_trips() {
        let cache = LeaderboardCache::new();
        cache.publish(make_snapshot(1, 0));

        match cache.get(1) {
            LeaderboardRead::Ready(snapshot) => {
                assert_eq!(snapshot.contest_id, 1);
                assert!(snapshot.entries.is_empty());
            }
            LeaderboardRead::Pending => panic!("expected a published snapshot"),
        }
    }

    #[test]
    fn test_invalidations_coalesce_while_computing() {
        let cache = LeaderboardCache::new();

        // First invalidation starts a recompute
        assert!(cache.begin_invalidate(1));
        assert_eq!(cache.recomputes_started(), 1);

        // A burst during the in-flight recompute queues exactly one follow-up
        for _ in 0..10 {
            assert!(!cache.begin_invalidate(1));
        }
        assert_eq!(cache.recomputes_started(), 1);

        // In-flight finishes: one queued pass, then idle
        assert!(cache.finish_recompute(1));
        assert_eq!(cache.recomputes_started(), 2);
        assert!(!cache.finish_recompute(1));
        assert_eq!(cache.recomputes_started(), 2);

        // Idle again: next invalidation starts fresh
        assert!(cache.begin_invalidate(1));
    }

    #[test]
    fn test_version_tracks_every_invalidation() {
        let cache = LeaderboardCache::new();
        assert_eq!(cache.version(1), 0);

        cache.begin_invalidate(1);
        cache.begin_invalidate(1);
        cache.begin_invalidate(1);

        assert_eq!(cache.version(1), 3);
    }

    #[test]
    fn test_staleness_is_version_lag() {
        let cache = LeaderboardCache::new();

        cache.begin_invalidate(1);
        assert!(cache.is_stale(1)); // invalidated, nothing published yet

        cache.publish(make_snapshot(1, 1));
        assert!(!cache.is_stale(1));

        cache.begin_invalidate(1); // version 2 > snapshot's 1
        assert!(cache.is_stale(1));

        cache.publish(make_snapshot(1, 2));
        assert!(!cache.is_stale(1));
    }

    #[test]
    fn test_contests_have_independent_slots() {
        let cache = LeaderboardCache::new();

        assert!(cache.begin_invalidate(1));
        assert!(cache.begin_invalidate(2)); // not blocked by contest 1

        cache.publish(make_snapshot(2, 1));
        assert!(matches!(cache.get(1), LeaderboardRead::Pending));
        assert!(matches!(cache.get(2), LeaderboardRead::Ready(_)));
    }
}
