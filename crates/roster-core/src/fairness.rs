//! Fairness ordering
//!
//! Ranks an organization's members for a shift name by how long ago each
//! was last assigned a shift of that name within the organization.
//! Members never assigned come first; ties fall back to member id so
//! repeated calls over the same data agree.

use crate::error::{RosterResult, StoreContext};
use crate::service::RosterService;
use chrono::{DateTime, FixedOffset};
use roster_store::{Member, MemberId, OrganizationId, RosterId, RosterQuery};
use serde::Serialize;
use std::collections::HashMap;

/// One member in a ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedCandidate {
    pub member: Member,
    /// Latest roster date this member worked the shift name, if ever
    pub last_assigned: Option<DateTime<FixedOffset>>,
}

/// Candidates for one shift name, least recently assigned first
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShiftRanking {
    pub shift_name: String,
    pub candidates: Vec<RankedCandidate>,
}

impl ShiftRanking {
    /// Member ids in ranked order
    #[must_use]
    pub fn member_ids(&self) -> Vec<MemberId> {
        self.candidates.iter().map(|c| c.member.id).collect()
    }
}

/// Latest assignment date per (shift name, member)
#[derive(Debug, Clone, Default)]
pub struct AssignmentHistory {
    latest: HashMap<String, HashMap<MemberId, DateTime<FixedOffset>>>,
}

impl AssignmentHistory {
    /// Empty history
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Note that `members` worked `shift_name` on `date`
    pub fn record<'a>(
        &mut self,
        shift_name: &str,
        members: impl IntoIterator<Item = &'a MemberId>,
        date: DateTime<FixedOffset>,
    ) {
        let by_member = self.latest.entry(shift_name.to_string()).or_default();
        for member in members {
            by_member
                .entry(*member)
                .and_modify(|latest| {
                    if date > *latest {
                        *latest = date;
                    }
                })
                .or_insert(date);
        }
    }

    /// Latest date `member` worked `shift_name`
    #[must_use]
    pub fn last_assigned(&self, shift_name: &str, member: MemberId) -> Option<DateTime<FixedOffset>> {
        self.latest.get(shift_name)?.get(&member).copied()
    }
}

/// Order `members` for `shift_name`: never assigned first, then oldest
/// last assignment first, ties by member id
#[must_use]
pub fn rank_candidates(
    members: impl IntoIterator<Item = Member>,
    shift_name: &str,
    history: &AssignmentHistory,
) -> Vec<RankedCandidate> {
    let mut candidates: Vec<RankedCandidate> = members
        .into_iter()
        .map(|member| RankedCandidate {
            last_assigned: history.last_assigned(shift_name, member.id),
            member,
        })
        .collect();
    candidates.sort_by(|a, b| {
        a.last_assigned
            .cmp(&b.last_assigned)
            .then_with(|| a.member.id.cmp(&b.member.id))
    });
    candidates
}

impl RosterService {
    /// Rank the members of an organization for a shift name
    ///
    /// # Errors
    /// - `NotFound` if the organization does not exist
    /// - Store failures while listing members or rosters
    pub async fn rank_shift(
        &self,
        organization_id: OrganizationId,
        shift_name: &str,
    ) -> RosterResult<ShiftRanking> {
        self.require_organization(organization_id).await?;
        let members = self
            .store
            .members_of_organization(organization_id)
            .await
            .context("load organization members")?;
        let history = self.load_history(organization_id).await?;

        Ok(ShiftRanking {
            shift_name: shift_name.to_string(),
            candidates: rank_candidates(members, shift_name, &history),
        })
    }

    /// Assignment history of every roster in an organization.
    ///
    /// Assignments whose roster or shift cannot be resolved are skipped
    /// with a warning instead of failing the ranking.
    pub(crate) async fn load_history(
        &self,
        organization_id: OrganizationId,
    ) -> RosterResult<AssignmentHistory> {
        let dates: HashMap<RosterId, DateTime<FixedOffset>> = self
            .store
            .list_rosters(&RosterQuery::in_organization(organization_id))
            .await
            .context("load organization rosters")?
            .into_iter()
            .map(|r| (r.id, r.date))
            .collect();
        let assignments = self
            .store
            .assignments_of_organization(organization_id)
            .await
            .context("load organization assignments")?;

        let mut history = AssignmentHistory::new();
        let mut skipped = 0usize;
        for assignment in assignments.iter().filter(|a| !a.members.is_empty()) {
            let Some(date) = dates.get(&assignment.roster_id) else {
                tracing::warn!(
                    assignment = %assignment.id,
                    roster = %assignment.roster_id,
                    "Skipping assignment with unresolvable roster"
                );
                skipped += 1;
                continue;
            };

            let shift = match self.store.get_shift(assignment.shift_id).await {
                Ok(Some(shift)) => shift,
                Ok(None) => {
                    tracing::warn!(
                        assignment = %assignment.id,
                        shift = %assignment.shift_id,
                        "Skipping assignment with unresolvable shift"
                    );
                    skipped += 1;
                    continue;
                }
                Err(e) => {
                    tracing::warn!(assignment = %assignment.id, error = %e, "Skipping assignment");
                    skipped += 1;
                    continue;
                }
            };

            history.record(&shift.name, &assignment.members, *date);
        }

        tracing::debug!(
            organization = %organization_id,
            assignments = assignments.len(),
            skipped,
            "Loaded assignment history"
        );
        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn day(offset_days: i64) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2030, 6, 15, 18, 0, 0)
            .unwrap()
            + Duration::days(offset_days)
    }

    fn members(n: usize) -> Vec<Member> {
        (0..n as u64).map(|i| Member::new(format!("m{i}"), i)).collect()
    }

    #[test]
    fn never_assigned_comes_first() {
        let ms = members(2);
        let mut history = AssignmentHistory::new();
        history.record("Morning", [&ms[1].id], day(-10));

        let ranked = rank_candidates(ms.clone(), "Morning", &history);
        assert_eq!(ranked[0].member.id, ms[0].id);
        assert_eq!(ranked[0].last_assigned, None);
        assert_eq!(ranked[1].last_assigned, Some(day(-10)));
    }

    #[test]
    fn least_recent_comes_first() {
        let ms = members(2);
        let mut history = AssignmentHistory::new();
        history.record("Morning", [&ms[0].id], day(-3));
        history.record("Morning", [&ms[1].id], day(-10));

        let ranked = rank_candidates(ms.clone(), "Morning", &history);
        assert_eq!(ranked[0].member.id, ms[1].id);
        assert_eq!(ranked[1].member.id, ms[0].id);
    }

    #[test]
    fn only_the_latest_date_counts() {
        let ms = members(2);
        let mut history = AssignmentHistory::new();
        history.record("Bar", [&ms[0].id], day(-30));
        history.record("Bar", [&ms[0].id], day(-1));
        history.record("Bar", [&ms[1].id], day(-5));

        assert_eq!(history.last_assigned("Bar", ms[0].id), Some(day(-1)));
        let ranked = rank_candidates(ms.clone(), "Bar", &history);
        assert_eq!(ranked[0].member.id, ms[1].id);
    }

    #[test]
    fn other_shift_names_are_ignored() {
        let ms = members(2);
        let mut history = AssignmentHistory::new();
        history.record("Evening", [&ms[0].id], day(-1));

        let ranked = rank_candidates(ms, "Morning", &history);
        assert!(ranked.iter().all(|c| c.last_assigned.is_none()));
    }

    #[test]
    fn ties_break_by_member_id() {
        let mut ms = members(3);
        ms.reverse();
        let history = AssignmentHistory::new();

        let ranked = rank_candidates(ms.clone(), "Morning", &history);
        let ids: Vec<_> = ranked.iter().map(|c| c.member.id).collect();
        let mut sorted: Vec<_> = ms.iter().map(|m| m.id).collect();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    proptest! {
        #[test]
        fn ranking_is_a_sorted_permutation(
            offsets in prop::collection::vec(prop::option::of(-400i64..0), 0..12)
        ) {
            let ms = members(offsets.len());
            let mut history = AssignmentHistory::new();
            for (member, offset) in ms.iter().zip(&offsets) {
                if let Some(offset) = offset {
                    history.record("Shift", [&member.id], day(*offset));
                }
            }

            let ranked = rank_candidates(ms.clone(), "Shift", &history);

            prop_assert_eq!(ranked.len(), ms.len());
            let mut ranked_ids: Vec<_> = ranked.iter().map(|c| c.member.id).collect();
            let mut input_ids: Vec<_> = ms.iter().map(|m| m.id).collect();
            for pair in ranked.windows(2) {
                let key = |c: &RankedCandidate| (c.last_assigned, c.member.id);
                prop_assert!(key(&pair[0]) <= key(&pair[1]));
            }
            ranked_ids.sort();
            input_ids.sort();
            prop_assert_eq!(ranked_ids, input_ids);
        }
    }
}
