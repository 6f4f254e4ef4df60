//! Finalization and assignment views
//!
//! Finalizing creates one empty assignment per shift that has none and
//! marks the roster finalized. The per-shift "create if absent" step makes
//! the operation safe to retry or run concurrently: a losing concurrent
//! insert hits the store's (roster, shift) constraint and is ignored.

use crate::config::UnknownMemberPolicy;
use crate::error::{RosterError, RosterResult, StoreContext};
use crate::fairness::{rank_candidates, ShiftRanking};
use crate::service::RosterService;
use indexmap::IndexMap;
use roster_store::{
    Assignment, AssignmentId, Member, MemberId, Roster, RosterId, RosterPatch, Shift,
};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Outcome of `finalize`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalizeReport {
    pub roster: Roster,
    /// Placeholders created by this call
    pub created: Vec<Assignment>,
    /// Assignments that already existed and were left untouched
    pub kept: Vec<Assignment>,
}

impl FinalizeReport {
    /// Every assignment of the roster after the call
    pub fn assignments(&self) -> impl Iterator<Item = &Assignment> {
        self.created.iter().chain(&self.kept)
    }
}

/// Outcome of `set_assignment_members`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberSelection {
    pub assignment: Assignment,
    /// Requested ids that resolved and were stored
    pub applied: Vec<MemberId>,
    /// Requested ids that did not resolve to a member
    pub dropped: Vec<MemberId>,
}

/// An assignment with its shift and selected members
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentDetails {
    pub assignment: Assignment,
    pub shift: Shift,
    pub members: Vec<Member>,
}

/// A finalized roster's assignments with a ranking per shift name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedRoster {
    pub roster: Roster,
    /// Sorted by shift order
    pub assignments: Vec<AssignmentDetails>,
    /// One ranking per distinct shift name, in first-appearance order
    pub rankings: Vec<ShiftRanking>,
}

impl SavedRoster {
    /// Ranking for a shift name
    #[must_use]
    pub fn ranking(&self, shift_name: &str) -> Option<&ShiftRanking> {
        self.rankings.iter().find(|r| r.shift_name == shift_name)
    }
}

impl RosterService {
    /// Create an empty assignment for every shift lacking one and mark
    /// the roster finalized. Existing assignments keep their members.
    ///
    /// # Errors
    /// - `NotFound` if the roster does not exist
    /// - Store failures; assignments created before the failure remain
    ///   and a retry completes the rest
    pub async fn finalize(&self, roster_id: RosterId) -> RosterResult<FinalizeReport> {
        let roster = self.require_roster(roster_id).await?;
        let shifts = self
            .store
            .shifts_of_roster(roster.id)
            .await
            .context("load shifts")?;

        let mut created = Vec::new();
        let mut kept = Vec::new();
        for shift in &shifts {
            if let Some(existing) = self.find_assignment(roster.id, shift).await? {
                kept.push(existing);
                continue;
            }

            match self
                .store
                .insert_assignment(Assignment::placeholder(roster.id, shift.id))
                .await
            {
                Ok(assignment) => created.push(assignment),
                Err(e) if e.is_unique_violation() => {
                    tracing::debug!(
                        roster = %roster.id,
                        shift = %shift.id,
                        "Assignment created concurrently, keeping it"
                    );
                    if let Some(existing) = self.find_assignment(roster.id, shift).await? {
                        kept.push(existing);
                    }
                }
                Err(e) => return Err(e).context("create assignment"),
            }
        }

        let roster = self
            .store
            .patch_roster(roster.id, RosterPatch::finalize())
            .await
            .context("finalize roster")?;

        tracing::info!(
            roster = %roster.id,
            created = created.len(),
            kept = kept.len(),
            "Finalized roster {}",
            roster.name
        );

        Ok(FinalizeReport {
            roster,
            created,
            kept,
        })
    }

    /// Replace an assignment's members with the ids that resolve.
    ///
    /// Unknown ids are reported in [`MemberSelection::dropped`], or fail
    /// the call under [`UnknownMemberPolicy::Reject`].
    ///
    /// # Errors
    /// - `NotFound` if the assignment does not exist, or for the first
    ///   unknown member under the reject policy
    pub async fn set_assignment_members(
        &self,
        assignment_id: AssignmentId,
        member_ids: &[MemberId],
    ) -> RosterResult<MemberSelection> {
        self.require_assignment(assignment_id).await?;

        let requested: BTreeSet<MemberId> = member_ids.iter().copied().collect();
        let resolved: BTreeSet<MemberId> = self
            .store
            .get_members(&requested)
            .await
            .context("resolve members")?
            .into_iter()
            .map(|m| m.id)
            .collect();
        let dropped: Vec<MemberId> = requested.difference(&resolved).copied().collect();

        if let Some(unknown) = dropped.first() {
            match self.config.unknown_member_policy {
                UnknownMemberPolicy::Reject => {
                    return Err(RosterError::not_found("member", unknown));
                }
                UnknownMemberPolicy::Drop => tracing::debug!(
                    assignment = %assignment_id,
                    dropped = dropped.len(),
                    "Dropping unknown members from selection"
                ),
            }
        }

        let applied: Vec<MemberId> = resolved.iter().copied().collect();
        let assignment = self
            .store
            .set_assignment_members(assignment_id, resolved)
            .await
            .context("set assignment members")?;

        Ok(MemberSelection {
            assignment,
            applied,
            dropped,
        })
    }

    /// Assignments of a roster with a fairness ranking per shift name
    ///
    /// # Errors
    /// - `NotFound` if the roster does not exist
    /// - Store failures while loading members or history
    pub async fn get_assignments(&self, roster_id: RosterId) -> RosterResult<SavedRoster> {
        let roster = self.require_roster(roster_id).await?;
        let shifts: HashMap<_, Shift> = self
            .store
            .shifts_of_roster(roster.id)
            .await
            .context("load shifts")?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();
        let assignments = self
            .store
            .assignments_of_roster(roster.id)
            .await
            .context("load assignments")?;
        let candidates = self
            .store
            .members_of_organization(roster.organization_id)
            .await
            .context("load organization members")?;
        let history = self.load_history(roster.organization_id).await?;

        let mut details = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            let Some(shift) = shifts.get(&assignment.shift_id).cloned() else {
                tracing::warn!(
                    assignment = %assignment.id,
                    shift = %assignment.shift_id,
                    "Skipping assignment with unresolvable shift"
                );
                continue;
            };
            let members = self
                .store
                .get_members(&assignment.members)
                .await
                .context("load assigned members")?;
            details.push(AssignmentDetails {
                assignment,
                shift,
                members,
            });
        }
        details.sort_by_key(|d| d.shift.order);

        let mut rankings: IndexMap<String, ShiftRanking> = IndexMap::new();
        for detail in &details {
            let name = &detail.shift.name;
            if !rankings.contains_key(name) {
                rankings.insert(
                    name.clone(),
                    ShiftRanking {
                        shift_name: name.clone(),
                        candidates: rank_candidates(candidates.iter().cloned(), name, &history),
                    },
                );
            }
        }

        Ok(SavedRoster {
            roster,
            assignments: details,
            rankings: rankings.into_values().collect(),
        })
    }

    async fn find_assignment(
        &self,
        roster_id: RosterId,
        shift: &Shift,
    ) -> RosterResult<Option<Assignment>> {
        self.store
            .find_assignment(roster_id, shift.id)
            .await
            .context("load assignment")
    }
}
