//! Template carryover
//!
//! Pre-fills answers on a roster created from a template: each standing
//! preference of an organization member becomes an answer on the new
//! shift whose name equals the template shift's name. Matching is by
//! exact name; a renamed shift simply does not carry over.

use crate::error::{RosterResult, StoreContext};
use crate::service::RosterService;
use roster_store::{
    Answer, MemberId, Roster, Shift, ShiftId, Template, TemplatePreference, TemplateShift,
    TemplateShiftId,
};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Answers to create, plus how many preferences were skipped
#[derive(Debug, Default)]
pub(crate) struct CarryoverPlan {
    pub(crate) answers: Vec<Answer>,
    pub(crate) skipped: usize,
}

/// Match preferences to the roster's shifts by name
pub(crate) fn plan_carryover(
    roster: &Roster,
    shifts: &[Shift],
    template_shifts: &[TemplateShift],
    preferences: &[TemplatePreference],
) -> CarryoverPlan {
    // A later shift with a repeated name takes the slot
    let by_name: HashMap<&str, ShiftId> = shifts.iter().map(|s| (s.name.as_str(), s.id)).collect();
    let template_names: HashMap<TemplateShiftId, &str> = template_shifts
        .iter()
        .map(|s| (s.id, s.name.as_str()))
        .collect();

    let mut plan = CarryoverPlan::default();
    let mut taken: HashSet<(MemberId, ShiftId)> = HashSet::new();

    for preference in preferences {
        let Some(shift_id) = template_names
            .get(&preference.template_shift_id)
            .and_then(|name| by_name.get(name))
            .copied()
        else {
            continue;
        };

        if !roster.accepts(&preference.value) {
            tracing::warn!(
                roster = %roster.id,
                member = %preference.member_id,
                value = %preference.value,
                "Skipping preference outside the roster's value set"
            );
            plan.skipped += 1;
            continue;
        }

        if !taken.insert((preference.member_id, shift_id)) {
            plan.skipped += 1;
            continue;
        }

        plan.answers.push(Answer::new(
            preference.member_id,
            roster.id,
            shift_id,
            preference.value.clone(),
        ));
    }

    plan
}

impl RosterService {
    /// Create answers on `roster` from the standing preferences of its
    /// organization's members for `template`
    pub(crate) async fn carry_over(
        &self,
        roster: &Roster,
        template: &Template,
        shifts: &[Shift],
    ) -> RosterResult<Vec<Answer>> {
        let members: BTreeSet<MemberId> = self
            .store
            .members_of_organization(roster.organization_id)
            .await
            .context("load organization members")?
            .into_iter()
            .map(|m| m.id)
            .collect();
        if members.is_empty() || shifts.is_empty() {
            return Ok(Vec::new());
        }

        let template_shifts = self
            .store
            .template_shifts(template.id)
            .await
            .context("load template shifts")?;
        if template_shifts.is_empty() {
            return Ok(Vec::new());
        }

        let preferences = self
            .store
            .preferences_for_template(template.id, Some(&members))
            .await
            .context("load template preferences")?;

        let plan = plan_carryover(roster, shifts, &template_shifts, &preferences);

        let mut created = Vec::with_capacity(plan.answers.len());
        for answer in plan.answers {
            created.push(
                self.store
                    .insert_answer(answer)
                    .await
                    .context("carry over preference")?,
            );
        }

        tracing::debug!(
            roster = %roster.id,
            template = %template.id,
            carried = created.len(),
            skipped = plan.skipped,
            "Carried over template preferences"
        );
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};
    use roster_store::{OrganizationId, TemplateId};

    struct Setup {
        roster: Roster,
        template_id: TemplateId,
    }

    fn setup() -> Setup {
        let date = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2030, 7, 1, 18, 0, 0)
            .unwrap();
        Setup {
            roster: Roster::new(
                OrganizationId::new(),
                "Borrel",
                date,
                ["J", "X", "L", "N"].map(String::from).to_vec(),
            ),
            template_id: TemplateId::new(),
        }
    }

    #[test]
    fn matches_by_exact_name() {
        let s = setup();
        let member = MemberId::new();
        let shifts = vec![
            Shift::new(s.roster.id, "Morning", 0),
            Shift::new(s.roster.id, "Evening", 1),
        ];
        let morning = TemplateShift::new(s.template_id, "Morning", 0);
        let late = TemplateShift::new(s.template_id, "Late", 1);
        let preferences = vec![
            TemplatePreference::new(member, morning.id, "X"),
            TemplatePreference::new(member, late.id, "J"),
        ];

        let plan = plan_carryover(&s.roster, &shifts, &[morning, late], &preferences);

        assert_eq!(plan.answers.len(), 1);
        let answer = &plan.answers[0];
        assert_eq!(answer.shift_id, shifts[0].id);
        assert_eq!(answer.member_id, member);
        assert_eq!(answer.value, "X");
        assert_eq!(plan.skipped, 0);
    }

    #[test]
    fn names_differing_in_case_do_not_match() {
        let s = setup();
        let shifts = vec![Shift::new(s.roster.id, "morning", 0)];
        let morning = TemplateShift::new(s.template_id, "Morning", 0);
        let preferences = vec![TemplatePreference::new(MemberId::new(), morning.id, "J")];

        let plan = plan_carryover(&s.roster, &shifts, &[morning], &preferences);
        assert!(plan.answers.is_empty());
    }

    #[test]
    fn values_outside_the_roster_set_are_skipped() {
        let s = setup();
        let shifts = vec![Shift::new(s.roster.id, "Morning", 0)];
        let morning = TemplateShift::new(s.template_id, "Morning", 0);
        let preferences = vec![TemplatePreference::new(MemberId::new(), morning.id, "Maybe")];

        let plan = plan_carryover(&s.roster, &shifts, &[morning], &preferences);
        assert!(plan.answers.is_empty());
        assert_eq!(plan.skipped, 1);
    }

    #[test]
    fn repeated_shift_name_uses_the_later_shift() {
        let s = setup();
        let shifts = vec![
            Shift::new(s.roster.id, "Bar", 0),
            Shift::new(s.roster.id, "Bar", 1),
        ];
        let bar = TemplateShift::new(s.template_id, "Bar", 0);
        let preferences = vec![TemplatePreference::new(MemberId::new(), bar.id, "L")];

        let plan = plan_carryover(&s.roster, &shifts, &[bar], &preferences);
        assert_eq!(plan.answers.len(), 1);
        assert_eq!(plan.answers[0].shift_id, shifts[1].id);
    }

    #[test]
    fn one_answer_per_member_and_shift() {
        let s = setup();
        let member = MemberId::new();
        let shifts = vec![Shift::new(s.roster.id, "Bar", 0)];
        let first = TemplateShift::new(s.template_id, "Bar", 0);
        let second = TemplateShift::new(s.template_id, "Bar", 1);
        let preferences = vec![
            TemplatePreference::new(member, first.id, "J"),
            TemplatePreference::new(member, second.id, "N"),
        ];

        let plan = plan_carryover(&s.roster, &shifts, &[first, second], &preferences);
        assert_eq!(plan.answers.len(), 1);
        assert_eq!(plan.answers[0].value, "J");
        assert_eq!(plan.skipped, 1);
    }
}
