//! Credit score calculation
//!
//! Pure function over aggregated counts and per-contest weights, no I/O.

use super::types::{ActivityCounts, CreditWeights};

/// Combine activity counts with contest weights into a credit score
///
/// `credits = per_vote*votes + per_shipment*shipments + per_unit*units`.
/// A zero weight removes that activity type from the score entirely.
///
/// Negative counts never occur with validated input; if one shows up it is
/// clamped to zero and logged as an internal-consistency warning rather
/// than crashing the recompute.
pub fn credits(counts: &ActivityCounts, weights: &CreditWeights) -> f64 {
    let votes = clamp_count(counts.votes, "votes");
    let shipments = clamp_count(counts.shipments, "shipments");
    let units = if counts.units < 0.0 {
        log::warn!(
            "negative units count {} clamped to 0 (internal consistency)",
            counts.units
        );
        0.0
    } else {
        counts.units
    };

    weights.per_vote * votes as f64 + weights.per_shipment * shipments as f64 + weights.per_unit * units
}

fn clamp_count(value: i64, field: &str) -> i64 {
    if value < 0 {
        log::warn!(
            "negative {} count {} clamped to 0 (internal consistency)",
            field,
            value
        );
        0
    } else {
        value
    }
}
