//! Leaderboard ordering and rank assignment
//!
//! Pure function over scored participants; ranking state never leaks out
//! of the sort-then-assign pass.
//!
//! Sort order:
//! - primary: credits descending
//! - tie-breaks (ascending, case-insensitive): organization, city,
//!   region code, postal code
//!
//! The tie-break chain keeps equal-score orderings stable across
//! recomputations, which user-facing pagination depends on.
//!
//! Rank assignment: ties share a rank; the next distinct-credit entry
//! takes its 1-based position in the sorted order, not previous rank + 1.
//! Example: credits [10, 10, 8, 8, 8, 5] -> ranks [1, 1, 3, 3, 3, 6].

use super::types::{LeaderboardEntry, Participant};

/// Order scored participants and assign shared ranks
///
/// Empty input produces an empty leaderboard, not an error.
pub fn rank(scored: Vec<(Participant, f64)>) -> Vec<LeaderboardEntry> {
    let mut scored = scored;
    scored.sort_by(|(pa, ca), (pb, cb)| {
        cb.total_cmp(ca)
            .then_with(|| tie_key(pa).cmp(&tie_key(pb)))
    });

    let mut entries = Vec::with_capacity(scored.len());
    let mut current_rank = 1u32;
    let mut previous_credits: Option<f64> = None;

    for (index, (participant, credits)) in scored.into_iter().enumerate() {
        if previous_credits != Some(credits) {
            current_rank = index as u32 + 1;
            previous_credits = Some(credits);
        }

        entries.push(LeaderboardEntry {
            participant,
            credits,
            rank: current_rank,
        });
    }

    entries
}

fn tie_key(p: &Participant) -> (String, String, String, String) {
    (
        p.organization.to_lowercase(),
        p.city.to_lowercase(),
        p.region_code.to_lowercase(),
        p.postal_code.to_lowercase(),
    )
}
