//! Read-only store seam between the engine and external storage
//!
//! All source data (contests, participants, activity records) is owned by
//! external storage collaborators. The engine queries it through
//! [`ContestStore`] and never writes through this trait; the append
//! helpers that model the transactional collaborators live on the concrete
//! SQLite store (see `sqlite_store`).
//!
//! The vote/shipment/unit queries are deliberately independent so a
//! partial outage of one source fails only the aggregation that touched
//! it, and so each can be exercised in isolation.

use super::types::{CategoryId, Contest, Participant, ParticipantId, UserId};
use async_trait::async_trait;
use std::collections::HashSet;

/// Boxed error for the async store boundary
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Read-only query interface over externally-owned contest data
#[async_trait]
pub trait ContestStore: Send + Sync {
    /// Load a contest with its listed-user and category/region constraint sets
    async fn contest(&self, id: u64) -> Result<Option<Contest>, BoxError>;

    /// All known participants (candidate set before eligibility filtering)
    async fn participants(&self) -> Result<Vec<Participant>, BoxError>;

    /// All known user ids, for configuration-time validation
    async fn known_user_ids(&self) -> Result<HashSet<UserId>, BoxError>;

    /// Count of verified votes for a participant with timestamp in [from, to]
    async fn count_verified_votes(
        &self,
        participant: ParticipantId,
        from: i64,
        to: i64,
    ) -> Result<i64, BoxError>;

    /// Count of shipments for a participant with timestamp in [from, to],
    /// restricted to the allowed categories when a constraint is present
    async fn count_shipments(
        &self,
        participant: ParticipantId,
        from: i64,
        to: i64,
        allowed_categories: Option<&HashSet<CategoryId>>,
    ) -> Result<i64, BoxError>;

    /// Sum of collected units over the same shipment set as
    /// [`ContestStore::count_shipments`]; shipments without a units value
    /// contribute 0
    async fn sum_units(
        &self,
        participant: ParticipantId,
        from: i64,
        to: i64,
        allowed_categories: Option<&HashSet<CategoryId>>,
    ) -> Result<f64, BoxError>;
}
