//! Eligibility filtering for contest participants
//!
//! Computes the set of participants allowed to compete in a contest from
//! the contest's whitelist/blacklist of owner-user ids and its optional
//! category/region constraints. The result is unordered; ordering happens
//! in `rank` (or in [`eligible_participants_ordered`] for administrative
//! listings).
//!
//! Listed-id validation happens at configuration time via
//! `Contest::validate`; by the time a contest reaches this filter an
//! empty listed set simply means "no restriction".

use super::types::{Contest, EligibilityMode, Participant};

/// True when the participant satisfies the contest's category/region
/// constraints. A participant without a category or region never matches
/// the corresponding constraint.
fn matches_constraints(contest: &Contest, participant: &Participant) -> bool {
    if let Some(allowed) = &contest.allowed_category_ids {
        match participant.category_id {
            Some(cat) if allowed.contains(&cat) => {}
            _ => return false,
        }
    }

    if let Some(allowed) = &contest.allowed_region_ids {
        match participant.region_id {
            Some(region) if allowed.contains(&region) => {}
            _ => return false,
        }
    }

    true
}

/// Compute the eligibility set for a contest
///
/// Whitelist: participants whose owner is listed, intersected with the
/// category/region constraints. Blacklist: participants matching the
/// constraints minus those whose owner is listed. An empty listed set
/// restricts nothing in either mode.
pub fn eligible_participants(contest: &Contest, all: &[Participant]) -> Vec<Participant> {
    all.iter()
        .filter(|p| matches_constraints(contest, p))
        .filter(|p| {
            let listed = contest.listed_user_ids.contains(&p.owner_user_id);
            match contest.eligibility {
                EligibilityMode::Whitelist => contest.listed_user_ids.is_empty() || listed,
                EligibilityMode::Blacklist => !listed,
            }
        })
        .cloned()
        .collect()
}

/// Eligibility set ordered for administrative listing
///
/// Deterministic: (organization, city, postal code) ascending,
/// case-insensitive.
pub fn eligible_participants_ordered(contest: &Contest, all: &[Participant]) -> Vec<Participant> {
    let mut eligible = eligible_participants(contest, all);
    eligible.sort_by_cached_key(|p| {
        (
            p.organization.to_lowercase(),
            p.city.to_lowercase(),
            p.postal_code.to_lowercase(),
        )
    });
    eligible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::types::CreditWeights;
    use std::collections::HashSet;

    fn make_participant(id: u64, owner: u64) -> Participant {
        Participant {
            id,
            owner_user_id: owner,
            organization: format!("Org {}", id),
            first_name: "Pat".to_string(),
            last_name: format!("Lee{}", id),
            city: "Springfield".to_string(),
            region_code: "SP".to_string(),
            postal_code: format!("{:05}", id),
            category_id: Some(1),
            region_id: Some(1),
        }
    }

    fn make_contest(mode: EligibilityMode, listed: &[u64]) -> Contest {
        Contest {
            id: 1,
            first_day: 0,
            last_day: 1_000_000,
            weights: CreditWeights {
                per_vote: 1.0,
                per_shipment: 0.0,
                per_unit: 0.0,
            },
            eligibility: mode,
            listed_user_ids: listed.iter().copied().collect(),
            allowed_category_ids: None,
            allowed_region_ids: None,
            leaderboard_enabled: true,
            show_credits: true,
        }
    }

    #[test]
    fn test_whitelist_keeps_only_listed_owners() {
        let all: Vec<_> = (1..=4).map(|i| make_participant(i, i)).collect();
        let contest = make_contest(EligibilityMode::Whitelist, &[2, 4]);

        let eligible = eligible_participants(&contest, &all);
        let ids: Vec<_> = eligible.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&2) && ids.contains(&4));
    }

    #[test]
    fn test_blacklist_removes_listed_owners() {
        let all: Vec<_> = (1..=4).map(|i| make_participant(i, i)).collect();
        let contest = make_contest(EligibilityMode::Blacklist, &[2, 4]);

        let eligible = eligible_participants(&contest, &all);
        let ids: Vec<_> = eligible.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&1) && ids.contains(&3));
    }

    #[test]
    fn test_whitelist_and_blacklist_are_complements() {
        // For a fixed listed set: whitelist ∪ blacklist = all, intersection = ∅
        let all: Vec<_> = (1..=6).map(|i| make_participant(i, i)).collect();
        let listed = [1, 3, 5];

        let white = eligible_participants(&make_contest(EligibilityMode::Whitelist, &listed), &all);
        let black = eligible_participants(&make_contest(EligibilityMode::Blacklist, &listed), &all);

        let white_ids: HashSet<_> = white.iter().map(|p| p.id).collect();
        let black_ids: HashSet<_> = black.iter().map(|p| p.id).collect();

        assert!(white_ids.is_disjoint(&black_ids));
        let union: HashSet<_> = white_ids.union(&black_ids).copied().collect();
        assert_eq!(union.len(), all.len());
    }

    #[test]
    fn test_empty_listed_set_restricts_nothing() {
        let all: Vec<_> = (1..=3).map(|i| make_participant(i, i)).collect();

        let white = eligible_participants(&make_contest(EligibilityMode::Whitelist, &[]), &all);
        let black = eligible_participants(&make_contest(EligibilityMode::Blacklist, &[]), &all);

        assert_eq!(white.len(), 3);
        assert_eq!(black.len(), 3);
    }

    #[test]
    fn test_category_and_region_constraints_intersect() {
        let mut p1 = make_participant(1, 1);
        p1.category_id = Some(7);
        p1.region_id = Some(9);
        let mut p2 = make_participant(2, 2);
        p2.category_id = Some(7);
        p2.region_id = Some(1);
        let mut p3 = make_participant(3, 3);
        p3.category_id = None;
        p3.region_id = Some(9);

        let mut contest = make_contest(EligibilityMode::Blacklist, &[]);
        contest.allowed_category_ids = Some([7].into_iter().collect());
        contest.allowed_region_ids = Some([9].into_iter().collect());

        // Only p1 satisfies both constraints; p3 has no category at all
        let eligible = eligible_participants(&contest, &[p1, p2, p3]);
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].id, 1);
    }

    #[test]
    fn test_ordered_listing_is_case_insensitive() {
        let mut a = make_participant(1, 1);
        a.organization = "zeta collective".to_string();
        let mut b = make_participant(2, 2);
        b.organization = "Alpha House".to_string();
        let mut c = make_participant(3, 3);
        c.organization = "alpha house".to_string();
        c.city = "Ashton".to_string();

        let contest = make_contest(EligibilityMode::Blacklist, &[]);
        let ordered = eligible_participants_ordered(&contest, &[a, b, c]);

        // Both alpha houses before zeta; tie between them broken by city
        assert_eq!(ordered[0].id, 3);
        assert_eq!(ordered[1].id, 2);
        assert_eq!(ordered[2].id, 1);
    }
}
