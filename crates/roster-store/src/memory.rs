//! In-process [`EntityStore`] backend
//!
//! All tables live behind one `parking_lot::RwLock`, so every trait call is
//! a single atomic step: constraint checks and the write that follows them
//! cannot interleave with another writer, and cascades never leave orphans.

use crate::error::{constraints, StoreError, StoreResult};
use crate::ids::{
    AnswerId, AssignmentId, MemberId, OrganizationId, PreferenceId, RosterId, ShiftId,
    TemplateId, TemplateShiftId,
};
use crate::model::{
    Answer, Assignment, Member, Organization, Roster, RosterPatch, RosterQuery, Shift, Template,
    TemplatePreference, TemplateShift,
};
use crate::store::EntityStore;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Default)]
struct Tables {
    organizations: BTreeMap<OrganizationId, Organization>,
    members: BTreeMap<MemberId, Member>,
    rosters: BTreeMap<RosterId, Roster>,
    shifts: BTreeMap<ShiftId, Shift>,
    answers: BTreeMap<AnswerId, Answer>,
    assignments: BTreeMap<AssignmentId, Assignment>,
    templates: BTreeMap<TemplateId, Template>,
    template_shifts: BTreeMap<TemplateShiftId, TemplateShift>,
    preferences: BTreeMap<PreferenceId, TemplatePreference>,
}

impl Tables {
    fn require_organization(&self, id: OrganizationId) -> StoreResult<()> {
        if self.organizations.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::foreign_key("organization", id))
        }
    }

    fn require_organizations(&self, ids: &BTreeSet<OrganizationId>) -> StoreResult<()> {
        ids.iter().try_for_each(|id| self.require_organization(*id))
    }

    fn require_member(&self, id: MemberId) -> StoreResult<()> {
        if self.members.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::foreign_key("member", id))
        }
    }

    fn require_roster(&self, id: RosterId) -> StoreResult<()> {
        if self.rosters.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::foreign_key("roster", id))
        }
    }

    fn require_shift(&self, id: ShiftId) -> StoreResult<()> {
        if self.shifts.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::foreign_key("shift", id))
        }
    }

    fn order_taken(&self, roster_id: RosterId, order: u32) -> Option<ShiftId> {
        self.shifts
            .values()
            .find(|s| s.roster_id == roster_id && s.order == order)
            .map(|s| s.id)
    }

    fn remove_shift_dependents(&mut self, shift_ids: &BTreeSet<ShiftId>) {
        self.answers.retain(|_, a| !shift_ids.contains(&a.shift_id));
        self.assignments
            .retain(|_, a| !shift_ids.contains(&a.shift_id));
    }

    fn remove_template_shift_dependents(&mut self, ids: &BTreeSet<TemplateShiftId>) {
        self.preferences
            .retain(|_, p| !ids.contains(&p.template_shift_id));
    }
}

/// Thread-safe in-memory entity store
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn insert_organization(&self, organization: Organization) -> StoreResult<Organization> {
        let mut t = self.tables.write();
        if t.organizations.values().any(|o| o.name == organization.name) {
            return Err(StoreError::UniqueViolation {
                constraint: constraints::ORGANIZATION_NAME,
            });
        }
        t.organizations.insert(organization.id, organization.clone());
        Ok(organization)
    }

    async fn get_organization(&self, id: OrganizationId) -> StoreResult<Option<Organization>> {
        Ok(self.tables.read().organizations.get(&id).cloned())
    }

    async fn find_organization_by_name(&self, name: &str) -> StoreResult<Option<Organization>> {
        Ok(self
            .tables
            .read()
            .organizations
            .values()
            .find(|o| o.name == name)
            .cloned())
    }

    async fn insert_member(&self, member: Member) -> StoreResult<Member> {
        let mut t = self.tables.write();
        if t.members
            .values()
            .any(|m| m.external_id == member.external_id)
        {
            return Err(StoreError::UniqueViolation {
                constraint: constraints::MEMBER_EXTERNAL_ID,
            });
        }
        t.require_organizations(&member.organizations)?;
        t.members.insert(member.id, member.clone());
        Ok(member)
    }

    async fn get_member(&self, id: MemberId) -> StoreResult<Option<Member>> {
        Ok(self.tables.read().members.get(&id).cloned())
    }

    async fn find_member_by_external_id(&self, external_id: u64) -> StoreResult<Option<Member>> {
        Ok(self
            .tables
            .read()
            .members
            .values()
            .find(|m| m.external_id == external_id)
            .cloned())
    }

    async fn get_members(&self, ids: &BTreeSet<MemberId>) -> StoreResult<Vec<Member>> {
        let t = self.tables.read();
        Ok(ids.iter().filter_map(|id| t.members.get(id).cloned()).collect())
    }

    async fn members_of_organization(&self, id: OrganizationId) -> StoreResult<Vec<Member>> {
        Ok(self
            .tables
            .read()
            .members
            .values()
            .filter(|m| m.belongs_to(id))
            .cloned()
            .collect())
    }

    async fn set_member_organizations(
        &self,
        id: MemberId,
        organizations: BTreeSet<OrganizationId>,
    ) -> StoreResult<Member> {
        let mut t = self.tables.write();
        t.require_organizations(&organizations)?;
        let member = t
            .members
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("member", id))?;
        member.organizations = organizations;
        member.timestamps.touch();
        Ok(member.clone())
    }

    async fn insert_roster(&self, roster: Roster) -> StoreResult<Roster> {
        let mut t = self.tables.write();
        t.require_organization(roster.organization_id)?;
        if let Some(template_id) = roster.template_id {
            if !t.templates.contains_key(&template_id) {
                return Err(StoreError::foreign_key("template", template_id));
            }
        }
        t.rosters.insert(roster.id, roster.clone());
        Ok(roster)
    }

    async fn get_roster(&self, id: RosterId) -> StoreResult<Option<Roster>> {
        Ok(self.tables.read().rosters.get(&id).cloned())
    }

    async fn list_rosters(&self, query: &RosterQuery) -> StoreResult<Vec<Roster>> {
        Ok(self
            .tables
            .read()
            .rosters
            .values()
            .filter(|r| query.matches(r))
            .cloned()
            .collect())
    }

    async fn patch_roster(&self, id: RosterId, patch: RosterPatch) -> StoreResult<Roster> {
        let mut t = self.tables.write();
        let roster = t
            .rosters
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("roster", id))?;
        if patch.apply(roster) {
            roster.timestamps.touch();
        }
        Ok(roster.clone())
    }

    async fn delete_roster(&self, id: RosterId) -> StoreResult<bool> {
        let mut t = self.tables.write();
        if t.rosters.remove(&id).is_none() {
            return Ok(false);
        }
        let shift_ids: BTreeSet<ShiftId> = t
            .shifts
            .values()
            .filter(|s| s.roster_id == id)
            .map(|s| s.id)
            .collect();
        t.shifts.retain(|_, s| s.roster_id != id);
        t.remove_shift_dependents(&shift_ids);
        // Rows keyed to the roster but pointing at foreign shifts go as well
        t.answers.retain(|_, a| a.roster_id != id);
        t.assignments.retain(|_, a| a.roster_id != id);
        Ok(true)
    }

    async fn insert_shift(&self, shift: Shift) -> StoreResult<Shift> {
        let mut t = self.tables.write();
        t.require_roster(shift.roster_id)?;
        if t.order_taken(shift.roster_id, shift.order).is_some() {
            return Err(StoreError::UniqueViolation {
                constraint: constraints::SHIFT_ORDER,
            });
        }
        t.shifts.insert(shift.id, shift.clone());
        Ok(shift)
    }

    async fn append_shift(&self, roster_id: RosterId, name: &str) -> StoreResult<Shift> {
        let mut t = self.tables.write();
        t.require_roster(roster_id)?;
        let order = t
            .shifts
            .values()
            .filter(|s| s.roster_id == roster_id)
            .map(|s| s.order)
            .max()
            .map_or(Some(0), |max| max.checked_add(1))
            .ok_or(StoreError::CheckViolation {
                constraint: constraints::SHIFT_ORDER_RANGE,
            })?;
        if t.order_taken(roster_id, order).is_some() {
            return Err(StoreError::UniqueViolation {
                constraint: constraints::SHIFT_ORDER,
            });
        }
        let shift = Shift::new(roster_id, name, order);
        t.shifts.insert(shift.id, shift.clone());
        Ok(shift)
    }

    async fn get_shift(&self, id: ShiftId) -> StoreResult<Option<Shift>> {
        Ok(self.tables.read().shifts.get(&id).cloned())
    }

    async fn shifts_of_roster(&self, roster_id: RosterId) -> StoreResult<Vec<Shift>> {
        let mut shifts: Vec<Shift> = self
            .tables
            .read()
            .shifts
            .values()
            .filter(|s| s.roster_id == roster_id)
            .cloned()
            .collect();
        shifts.sort_by_key(|s| s.order);
        Ok(shifts)
    }

    async fn move_shift(&self, id: ShiftId, order: u32) -> StoreResult<Shift> {
        let mut t = self.tables.write();
        let (roster_id, current) = t
            .shifts
            .get(&id)
            .map(|s| (s.roster_id, s.order))
            .ok_or_else(|| StoreError::not_found("shift", id))?;

        if let Some(other) = t.order_taken(roster_id, order).filter(|other| *other != id) {
            if let Some(displaced) = t.shifts.get_mut(&other) {
                displaced.order = current;
                displaced.timestamps.touch();
            }
        }

        let shift = t
            .shifts
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("shift", id))?;
        shift.order = order;
        shift.timestamps.touch();
        Ok(shift.clone())
    }

    async fn delete_shift(&self, id: ShiftId) -> StoreResult<bool> {
        let mut t = self.tables.write();
        if t.shifts.remove(&id).is_none() {
            return Ok(false);
        }
        t.remove_shift_dependents(&BTreeSet::from([id]));
        Ok(true)
    }

    async fn insert_answer(&self, answer: Answer) -> StoreResult<Answer> {
        let mut t = self.tables.write();
        t.require_member(answer.member_id)?;
        t.require_roster(answer.roster_id)?;
        t.require_shift(answer.shift_id)?;
        let duplicate = t.answers.values().any(|a| {
            a.member_id == answer.member_id
                && a.roster_id == answer.roster_id
                && a.shift_id == answer.shift_id
        });
        if duplicate {
            return Err(StoreError::UniqueViolation {
                constraint: constraints::ANSWER_KEY,
            });
        }
        t.answers.insert(answer.id, answer.clone());
        Ok(answer)
    }

    async fn get_answer(&self, id: AnswerId) -> StoreResult<Option<Answer>> {
        Ok(self.tables.read().answers.get(&id).cloned())
    }

    async fn update_answer_value(&self, id: AnswerId, value: &str) -> StoreResult<Answer> {
        let mut t = self.tables.write();
        let answer = t
            .answers
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("answer", id))?;
        answer.value = value.to_string();
        answer.timestamps.touch();
        Ok(answer.clone())
    }

    async fn answers_of_roster(&self, roster_id: RosterId) -> StoreResult<Vec<Answer>> {
        Ok(self
            .tables
            .read()
            .answers
            .values()
            .filter(|a| a.roster_id == roster_id)
            .cloned()
            .collect())
    }

    async fn insert_assignment(&self, assignment: Assignment) -> StoreResult<Assignment> {
        let mut t = self.tables.write();
        t.require_roster(assignment.roster_id)?;
        t.require_shift(assignment.shift_id)?;
        assignment
            .members
            .iter()
            .try_for_each(|m| t.require_member(*m))?;
        let duplicate = t.assignments.values().any(|a| {
            a.roster_id == assignment.roster_id && a.shift_id == assignment.shift_id
        });
        if duplicate {
            return Err(StoreError::UniqueViolation {
                constraint: constraints::ASSIGNMENT_SHIFT,
            });
        }
        t.assignments.insert(assignment.id, assignment.clone());
        Ok(assignment)
    }

    async fn get_assignment(&self, id: AssignmentId) -> StoreResult<Option<Assignment>> {
        Ok(self.tables.read().assignments.get(&id).cloned())
    }

    async fn find_assignment(
        &self,
        roster_id: RosterId,
        shift_id: ShiftId,
    ) -> StoreResult<Option<Assignment>> {
        Ok(self
            .tables
            .read()
            .assignments
            .values()
            .find(|a| a.roster_id == roster_id && a.shift_id == shift_id)
            .cloned())
    }

    async fn assignments_of_roster(&self, roster_id: RosterId) -> StoreResult<Vec<Assignment>> {
        Ok(self
            .tables
            .read()
            .assignments
            .values()
            .filter(|a| a.roster_id == roster_id)
            .cloned()
            .collect())
    }

    async fn assignments_of_organization(
        &self,
        organization_id: OrganizationId,
    ) -> StoreResult<Vec<Assignment>> {
        let t = self.tables.read();
        Ok(t.assignments
            .values()
            .filter(|a| {
                t.rosters
                    .get(&a.roster_id)
                    .is_some_and(|r| r.organization_id == organization_id)
            })
            .cloned()
            .collect())
    }

    async fn set_assignment_members(
        &self,
        id: AssignmentId,
        members: BTreeSet<MemberId>,
    ) -> StoreResult<Assignment> {
        let mut t = self.tables.write();
        members.iter().try_for_each(|m| t.require_member(*m))?;
        let assignment = t
            .assignments
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("assignment", id))?;
        assignment.members = members;
        assignment.timestamps.touch();
        Ok(assignment.clone())
    }

    async fn insert_template(&self, template: Template) -> StoreResult<Template> {
        let mut t = self.tables.write();
        t.require_organization(template.organization_id)?;
        t.templates.insert(template.id, template.clone());
        Ok(template)
    }

    async fn get_template(&self, id: TemplateId) -> StoreResult<Option<Template>> {
        Ok(self.tables.read().templates.get(&id).cloned())
    }

    async fn list_templates(
        &self,
        organization_id: Option<OrganizationId>,
    ) -> StoreResult<Vec<Template>> {
        Ok(self
            .tables
            .read()
            .templates
            .values()
            .filter(|tpl| organization_id.map_or(true, |o| tpl.organization_id == o))
            .cloned()
            .collect())
    }

    async fn update_template(&self, mut template: Template) -> StoreResult<Template> {
        let mut t = self.tables.write();
        if !t.templates.contains_key(&template.id) {
            return Err(StoreError::not_found("template", template.id));
        }
        t.require_organization(template.organization_id)?;
        template.timestamps.touch();
        t.templates.insert(template.id, template.clone());
        Ok(template)
    }

    async fn delete_template(&self, id: TemplateId) -> StoreResult<bool> {
        let mut t = self.tables.write();
        if t.templates.remove(&id).is_none() {
            return Ok(false);
        }
        let shift_ids: BTreeSet<TemplateShiftId> = t
            .template_shifts
            .values()
            .filter(|s| s.template_id == id)
            .map(|s| s.id)
            .collect();
        t.template_shifts.retain(|_, s| s.template_id != id);
        t.remove_template_shift_dependents(&shift_ids);
        for roster in t.rosters.values_mut() {
            if roster.template_id == Some(id) {
                roster.template_id = None;
                roster.timestamps.touch();
            }
        }
        Ok(true)
    }

    async fn insert_template_shift(&self, shift: TemplateShift) -> StoreResult<TemplateShift> {
        let mut t = self.tables.write();
        if !t.templates.contains_key(&shift.template_id) {
            return Err(StoreError::foreign_key("template", shift.template_id));
        }
        t.template_shifts.insert(shift.id, shift.clone());
        Ok(shift)
    }

    async fn get_template_shift(&self, id: TemplateShiftId) -> StoreResult<Option<TemplateShift>> {
        Ok(self.tables.read().template_shifts.get(&id).cloned())
    }

    async fn template_shifts(&self, template_id: TemplateId) -> StoreResult<Vec<TemplateShift>> {
        let mut shifts: Vec<TemplateShift> = self
            .tables
            .read()
            .template_shifts
            .values()
            .filter(|s| s.template_id == template_id)
            .cloned()
            .collect();
        shifts.sort_by_key(|s| s.position);
        Ok(shifts)
    }

    async fn update_template_shift(&self, mut shift: TemplateShift) -> StoreResult<TemplateShift> {
        let mut t = self.tables.write();
        if !t.template_shifts.contains_key(&shift.id) {
            return Err(StoreError::not_found("template shift", shift.id));
        }
        shift.timestamps.touch();
        t.template_shifts.insert(shift.id, shift.clone());
        Ok(shift)
    }

    async fn delete_template_shift(&self, id: TemplateShiftId) -> StoreResult<bool> {
        let mut t = self.tables.write();
        if t.template_shifts.remove(&id).is_none() {
            return Ok(false);
        }
        t.remove_template_shift_dependents(&BTreeSet::from([id]));
        Ok(true)
    }

    async fn insert_preference(
        &self,
        preference: TemplatePreference,
    ) -> StoreResult<TemplatePreference> {
        let mut t = self.tables.write();
        t.require_member(preference.member_id)?;
        if !t.template_shifts.contains_key(&preference.template_shift_id) {
            return Err(StoreError::foreign_key(
                "template shift",
                preference.template_shift_id,
            ));
        }
        let duplicate = t.preferences.values().any(|p| {
            p.member_id == preference.member_id
                && p.template_shift_id == preference.template_shift_id
        });
        if duplicate {
            return Err(StoreError::UniqueViolation {
                constraint: constraints::PREFERENCE_KEY,
            });
        }
        t.preferences.insert(preference.id, preference.clone());
        Ok(preference)
    }

    async fn get_preference(&self, id: PreferenceId) -> StoreResult<Option<TemplatePreference>> {
        Ok(self.tables.read().preferences.get(&id).cloned())
    }

    async fn update_preference_value(
        &self,
        id: PreferenceId,
        value: &str,
    ) -> StoreResult<TemplatePreference> {
        let mut t = self.tables.write();
        let preference = t
            .preferences
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("template preference", id))?;
        preference.value = value.to_string();
        preference.timestamps.touch();
        Ok(preference.clone())
    }

    async fn preferences_for_template(
        &self,
        template_id: TemplateId,
        members: Option<&BTreeSet<MemberId>>,
    ) -> StoreResult<Vec<TemplatePreference>> {
        let t = self.tables.read();
        let shift_ids: BTreeSet<TemplateShiftId> = t
            .template_shifts
            .values()
            .filter(|s| s.template_id == template_id)
            .map(|s| s.id)
            .collect();
        Ok(t.preferences
            .values()
            .filter(|p| shift_ids.contains(&p.template_shift_id))
            .filter(|p| members.map_or(true, |m| m.contains(&p.member_id)))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    async fn roster_fixture(store: &MemoryStore) -> (Organization, Member, Roster) {
        let org = store
            .insert_organization(Organization::new("Bar Committee"))
            .await
            .unwrap();
        let member = store
            .insert_member(Member::new("Alice", 1).with_organization(org.id))
            .await
            .unwrap();
        let date = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2031, 1, 1, 12, 0, 0)
            .unwrap();
        let roster = store
            .insert_roster(Roster::new(org.id, "Week 1", date, vec!["J".into()]))
            .await
            .unwrap();
        (org, member, roster)
    }

    #[tokio::test]
    async fn organization_names_are_unique() {
        let store = MemoryStore::new();
        store
            .insert_organization(Organization::new("Board"))
            .await
            .unwrap();
        let err = store
            .insert_organization(Organization::new("Board"))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn append_shift_uses_max_order_plus_one() {
        let store = MemoryStore::new();
        let (_, _, roster) = roster_fixture(&store).await;

        let a = store.append_shift(roster.id, "A").await.unwrap();
        let b = store.append_shift(roster.id, "B").await.unwrap();
        store.delete_shift(a.id).await.unwrap();
        let c = store.append_shift(roster.id, "C").await.unwrap();

        assert_eq!(b.order, 1);
        assert_eq!(c.order, 2);
    }

    #[tokio::test]
    async fn append_shift_after_max_order_is_rejected() {
        let store = MemoryStore::new();
        let (_, _, roster) = roster_fixture(&store).await;
        let a = store.append_shift(roster.id, "A").await.unwrap();
        let b = store.append_shift(roster.id, "B").await.unwrap();
        store.move_shift(b.id, u32::MAX).await.unwrap();

        let err = store.append_shift(roster.id, "C").await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::CheckViolation {
                constraint: constraints::SHIFT_ORDER_RANGE
            }
        ));
        let orders: Vec<u32> = store
            .shifts_of_roster(roster.id)
            .await
            .unwrap()
            .iter()
            .map(|s| s.order)
            .collect();
        assert_eq!(orders, vec![0, u32::MAX]);
        assert_eq!(store.get_shift(a.id).await.unwrap().unwrap().order, 0);
    }

    #[tokio::test]
    async fn patch_roster_keeps_fields_it_does_not_set() {
        let store = MemoryStore::new();
        let (_, _, roster) = roster_fixture(&store).await;

        store
            .patch_roster(roster.id, RosterPatch::finalize())
            .await
            .unwrap();
        let renamed = store
            .patch_roster(
                roster.id,
                RosterPatch {
                    name: Some("Week 2".into()),
                    ..RosterPatch::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(renamed.name, "Week 2");
        assert!(renamed.finalized);
        assert_eq!(renamed.date, roster.date);

        let err = store
            .patch_roster(RosterId::new(), RosterPatch::finalize())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "roster", .. }));
    }

    #[tokio::test]
    async fn move_shift_swaps_with_holder_of_target_order() {
        let store = MemoryStore::new();
        let (_, _, roster) = roster_fixture(&store).await;
        let a = store.append_shift(roster.id, "A").await.unwrap();
        let b = store.append_shift(roster.id, "B").await.unwrap();

        let moved = store.move_shift(b.id, 0).await.unwrap();
        assert_eq!(moved.order, 0);

        let names: Vec<String> = store
            .shifts_of_roster(roster.id)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["B".to_string(), "A".to_string()]);
        assert_eq!(store.get_shift(a.id).await.unwrap().unwrap().order, 1);
    }

    #[tokio::test]
    async fn duplicate_answer_key_is_rejected() {
        let store = MemoryStore::new();
        let (_, member, roster) = roster_fixture(&store).await;
        let shift = store.append_shift(roster.id, "A").await.unwrap();

        store
            .insert_answer(Answer::new(member.id, roster.id, shift.id, "J"))
            .await
            .unwrap();
        let err = store
            .insert_answer(Answer::new(member.id, roster.id, shift.id, "J"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::UniqueViolation {
                constraint: constraints::ANSWER_KEY
            }
        );
    }

    #[tokio::test]
    async fn one_assignment_per_roster_shift() {
        let store = MemoryStore::new();
        let (_, _, roster) = roster_fixture(&store).await;
        let shift = store.append_shift(roster.id, "A").await.unwrap();

        store
            .insert_assignment(Assignment::placeholder(roster.id, shift.id))
            .await
            .unwrap();
        let err = store
            .insert_assignment(Assignment::placeholder(roster.id, shift.id))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn deleting_roster_cascades() {
        let store = MemoryStore::new();
        let (_, member, roster) = roster_fixture(&store).await;
        let shift = store.append_shift(roster.id, "A").await.unwrap();
        store
            .insert_answer(Answer::new(member.id, roster.id, shift.id, "J"))
            .await
            .unwrap();
        store
            .insert_assignment(Assignment::placeholder(roster.id, shift.id))
            .await
            .unwrap();

        assert!(store.delete_roster(roster.id).await.unwrap());
        assert!(store.get_shift(shift.id).await.unwrap().is_none());
        assert!(store.answers_of_roster(roster.id).await.unwrap().is_empty());
        assert!(store
            .assignments_of_roster(roster.id)
            .await
            .unwrap()
            .is_empty());
        assert!(!store.delete_roster(roster.id).await.unwrap());
    }

    #[tokio::test]
    async fn deleting_template_clears_roster_reference() {
        let store = MemoryStore::new();
        let (org, member, roster) = roster_fixture(&store).await;
        let template = store
            .insert_template(Template::new(org.id, "Weekly"))
            .await
            .unwrap();
        let tshift = store
            .insert_template_shift(TemplateShift::new(template.id, "A", 0))
            .await
            .unwrap();
        store
            .insert_preference(TemplatePreference::new(member.id, tshift.id, "J"))
            .await
            .unwrap();
        let mut linked = Roster::new(roster.organization_id, "Week 2", roster.date, roster.values);
        linked.template_id = Some(template.id);
        let roster = store.insert_roster(linked).await.unwrap();

        assert!(store.delete_template(template.id).await.unwrap());
        assert!(store
            .preferences_for_template(template.id, None)
            .await
            .unwrap()
            .is_empty());
        let roster = store.get_roster(roster.id).await.unwrap().unwrap();
        assert_eq!(roster.template_id, None);
    }

    #[tokio::test]
    async fn foreign_keys_are_checked() {
        let store = MemoryStore::new();
        let err = store
            .append_shift(RosterId::new(), "orphan")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ForeignKey { entity: "roster", .. }));
    }
}
