//! Core data structures for the standings engine
//!
//! Contests and participants are long-lived rows owned by external
//! administrative collaborators; activity records are append-only rows
//! owned by external transactional collaborators. The engine only ever
//! reads them (see `store`), derives leaderboard entries, and caches the
//! result. Nothing in this module is persisted by the engine itself.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub type ContestId = u64;
pub type ParticipantId = u64;
pub type UserId = u64;
pub type CategoryId = u64;
pub type RegionId = u64;

/// How a contest's listed owner-user ids are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EligibilityMode {
    /// Only participants whose owner is listed may compete
    Whitelist,
    /// Everyone may compete except participants whose owner is listed
    Blacklist,
}

/// Per-contest credit weights
///
/// A weight of 0 means that activity type contributes nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CreditWeights {
    pub per_vote: f64,
    pub per_shipment: f64,
    pub per_unit: f64,
}

/// Contest configuration as read from the store
///
/// Invariants (`first_day < last_day`, weights >= 0) are enforced by
/// [`Contest::validate`] at configuration time by the external admin
/// collaborator; the engine assumes validated input afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contest {
    pub id: ContestId,
    /// Contest span, Unix seconds
    pub first_day: i64,
    pub last_day: i64,
    pub weights: CreditWeights,
    pub eligibility: EligibilityMode,
    /// Owner-user ids the eligibility mode applies to; empty = no restriction
    pub listed_user_ids: HashSet<UserId>,
    /// None = unconstrained
    pub allowed_category_ids: Option<HashSet<CategoryId>>,
    /// None = unconstrained
    pub allowed_region_ids: Option<HashSet<RegionId>>,
    pub leaderboard_enabled: bool,
    pub show_credits: bool,
}

/// Participant snapshot as read from the store
///
/// Display attributes double as deterministic tie-break keys, so they are
/// carried on the snapshot rather than re-queried at rank time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub owner_user_id: UserId,
    pub organization: String,
    pub first_name: String,
    pub last_name: String,
    pub city: String,
    pub region_code: String,
    pub postal_code: String,
    pub category_id: Option<CategoryId>,
    pub region_id: Option<RegionId>,
}

/// Qualifying activity counts for one participant inside the scoring window
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ActivityCounts {
    /// Verified votes only
    pub votes: i64,
    pub shipments: i64,
    /// Sum of per-shipment collected units; absent values count as 0
    pub units: f64,
}

/// One ranked leaderboard row; derived, never persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub participant: Participant,
    pub credits: f64,
    /// 1-based; ties share a rank (see `rank`)
    pub rank: u32,
}

/// Configuration-time validation failure
#[derive(Debug, Clone, PartialEq)]
pub enum ContestConfigError {
    InvertedWindow { first_day: i64, last_day: i64 },
    NegativeWeight(&'static str),
    UnknownListedUser(UserId),
}

impl std::fmt::Display for ContestConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContestConfigError::InvertedWindow {
                first_day,
                last_day,
            } => write!(
                f,
                "contest window is inverted: first_day {} >= last_day {}",
                first_day, last_day
            ),
            ContestConfigError::NegativeWeight(which) => {
                write!(f, "credit weight {} is negative", which)
            }
            ContestConfigError::UnknownListedUser(id) => {
                write!(f, "listed user id {} refers to no known user", id)
            }
        }
    }
}

impl std::error::Error for ContestConfigError {}

impl Contest {
    /// Validate contest configuration against the known user set
    ///
    /// Called by the external administrative collaborator when a contest is
    /// created or its settings change. Malformed listed ids are surfaced
    /// here, not at query time; the eligibility filter treats an empty
    /// listed set as "no restriction" and never re-validates.
    pub fn validate(&self, known_user_ids: &HashSet<UserId>) -> Result<(), ContestConfigError> {
        if self.first_day >= self.last_day {
            return Err(ContestConfigError::InvertedWindow {
                first_day: self.first_day,
                last_day: self.last_day,
            });
        }

        if self.weights.per_vote < 0.0 {
            return Err(ContestConfigError::NegativeWeight("per_vote"));
        }
        if self.weights.per_shipment < 0.0 {
            return Err(ContestConfigError::NegativeWeight("per_shipment"));
        }
        if self.weights.per_unit < 0.0 {
            return Err(ContestConfigError::NegativeWeight("per_unit"));
        }

        for id in &self.listed_user_ids {
            if !known_user_ids.contains(id) {
                return Err(ContestConfigError::UnknownListedUser(*id));
            }
        }

        Ok(())
    }
}
