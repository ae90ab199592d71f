//! Participant typeahead lookup
//!
//! Case-insensitive substring match over a participant's organization,
//! first+last name, postal code, city, and region code, restricted by the
//! caller to the contest's eligibility set. Pure read over a bounded
//! result size, so no caching layer sits in front of it.

use super::types::Participant;

/// Top-K participants matching the query
///
/// A blank query matches nothing. Results are ordered like the
/// administrative listing (organization, city, postal code ascending,
/// case-insensitive) so typeahead output is stable between keystrokes.
pub fn search(participants: &[Participant], query: &str, limit: usize) -> Vec<Participant> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<Participant> = participants
        .iter()
        .filter(|p| {
            let full_name = format!("{} {}", p.first_name, p.last_name);
            [
                p.organization.as_str(),
                full_name.as_str(),
                p.postal_code.as_str(),
                p.city.as_str(),
                p.region_code.as_str(),
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect();

    matches.sort_by_cached_key(|p| {
        (
            p.organization.to_lowercase(),
            p.city.to_lowercase(),
            p.postal_code.to_lowercase(),
        )
    });
    matches.truncate(limit);
    matches
}
