//! Time-windowed activity aggregation
//!
//! Sums qualifying activity (verified votes, shipments, collected units)
//! for one participant inside the contest's rolling scoring window. The
//! window is `[as_of - lookback, as_of + slack]`: a look-back from "now"
//! with forward slack to tolerate clock skew between the engine and the
//! transactional collaborators appending records.
//!
//! The window is configuration, not hard-coded business logic: the
//! source system scores a rolling single day regardless of the contest's
//! full span, and whether that is intended is an open product question.
//! Defaults preserve the observed behavior (1-day look-back, 1-day slack).
//!
//! The three counts are independent store queries. Any failing query
//! fails the whole aggregation for that participant: a partially-summed
//! score is worse than no score, so the caller gets an error and reports
//! the participant unavailable for the cycle.

use super::store::{BoxError, ContestStore};
use super::types::{ActivityCounts, Contest, ParticipantId};

pub const DEFAULT_LOOKBACK_SECS: i64 = 86_400;
pub const DEFAULT_SLACK_SECS: i64 = 86_400;

/// Rolling scoring window relative to "now"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringWindow {
    pub lookback_secs: i64,
    pub slack_secs: i64,
}

impl Default for ScoringWindow {
    fn default() -> Self {
        Self {
            lookback_secs: DEFAULT_LOOKBACK_SECS,
            slack_secs: DEFAULT_SLACK_SECS,
        }
    }
}

impl ScoringWindow {
    /// Inclusive [from, to] bounds of the window anchored at `as_of`
    pub fn bounds(&self, as_of: i64) -> (i64, i64) {
        (as_of - self.lookback_secs, as_of + self.slack_secs)
    }
}

/// Aggregate qualifying activity for one participant
///
/// Vote counting honors the verification flag; shipment and unit queries
/// are restricted to the contest's allowed categories when a constraint is
/// present. Returns an error (and no counts) if any of the three queries
/// fails.
pub async fn aggregate_activity(
    store: &dyn ContestStore,
    contest: &Contest,
    participant: ParticipantId,
    window: &ScoringWindow,
    as_of: i64,
) -> Result<ActivityCounts, BoxError> {
    let (from, to) = window.bounds(as_of);
    let categories = contest.allowed_category_ids.as_ref();

    let votes = store.count_verified_votes(participant, from, to).await?;
    let shipments = store
        .count_shipments(participant, from, to, categories)
        .await?;
    let units = store.sum_units(participant, from, to, categories).await?;

    Ok(ActivityCounts {
        votes,
        shipments,
        units,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_span_lookback_and_slack() {
        let window = ScoringWindow {
            lookback_secs: 3_600,
            slack_secs: 600,
        };

        assert_eq!(window.bounds(10_000), (6_400, 10_600));
    }

    #[test]
    fn test_default_window_is_one_day_each_way() {
        let window = ScoringWindow::default();
        let (from, to) = window.bounds(0);

        assert_eq!(from, -86_400);
        assert_eq!(to, 86_400);
    }
}
