//! The [`EntityStore`] trait
//!
//! Relational persistence for every entity of the roster pipeline.
//! Implementations own:
//! - Uniqueness constraints (answer key, one assignment per shift,
//!   shift order per roster, organization name, member external id,
//!   preference key)
//! - Foreign keys on insert
//! - Cascading deletes (roster → shifts, answers, assignments;
//!   shift → answers, assignment; template → template shifts → preferences)
//!
//! Lookups return `Ok(None)` for missing rows; updates of missing rows
//! return [`StoreError::NotFound`](crate::StoreError::NotFound).

use crate::error::StoreResult;
use crate::ids::{
    AnswerId, AssignmentId, MemberId, OrganizationId, PreferenceId, RosterId, ShiftId,
    TemplateId, TemplateShiftId,
};
use crate::model::{
    Answer, Assignment, Member, Organization, Roster, RosterPatch, RosterQuery, Shift, Template,
    TemplatePreference, TemplateShift,
};
use async_trait::async_trait;
use std::collections::BTreeSet;

/// Relational entity store
#[async_trait]
pub trait EntityStore: Send + Sync + 'static {
    // ---- organizations -------------------------------------------------

    /// Insert an organization (unique name)
    async fn insert_organization(&self, organization: Organization) -> StoreResult<Organization>;
    /// Fetch an organization by id
    async fn get_organization(&self, id: OrganizationId) -> StoreResult<Option<Organization>>;
    /// Fetch an organization by its unique name
    async fn find_organization_by_name(&self, name: &str) -> StoreResult<Option<Organization>>;

    // ---- members -------------------------------------------------------

    /// Insert a member (unique external id, organizations must exist)
    async fn insert_member(&self, member: Member) -> StoreResult<Member>;
    /// Fetch a member by id
    async fn get_member(&self, id: MemberId) -> StoreResult<Option<Member>>;
    /// Fetch a member by identity-provider id
    async fn find_member_by_external_id(&self, external_id: u64) -> StoreResult<Option<Member>>;
    /// Fetch the members among `ids` that exist, in id order
    async fn get_members(&self, ids: &BTreeSet<MemberId>) -> StoreResult<Vec<Member>>;
    /// All members of an organization, in id order
    async fn members_of_organization(&self, id: OrganizationId) -> StoreResult<Vec<Member>>;
    /// Replace a member's organization set
    async fn set_member_organizations(
        &self,
        id: MemberId,
        organizations: BTreeSet<OrganizationId>,
    ) -> StoreResult<Member>;

    // ---- rosters -------------------------------------------------------

    /// Insert a roster (organization must exist)
    async fn insert_roster(&self, roster: Roster) -> StoreResult<Roster>;
    /// Fetch a roster by id
    async fn get_roster(&self, id: RosterId) -> StoreResult<Option<Roster>>;
    /// Rosters matching `query`, in id order
    async fn list_rosters(&self, query: &RosterQuery) -> StoreResult<Vec<Roster>>;
    /// Apply the fields set in `patch` to the stored row in one step
    async fn patch_roster(&self, id: RosterId, patch: RosterPatch) -> StoreResult<Roster>;
    /// Delete a roster with its shifts, answers and assignments.
    /// Returns whether a row was removed.
    async fn delete_roster(&self, id: RosterId) -> StoreResult<bool>;

    // ---- shifts --------------------------------------------------------

    /// Insert a shift (roster must exist, order unique in roster)
    async fn insert_shift(&self, shift: Shift) -> StoreResult<Shift>;
    /// Insert a shift at the roster's current maximum order + 1.
    /// Fails with a check violation once the maximum order is `u32::MAX`.
    async fn append_shift(&self, roster_id: RosterId, name: &str) -> StoreResult<Shift>;
    /// Fetch a shift by id
    async fn get_shift(&self, id: ShiftId) -> StoreResult<Option<Shift>>;
    /// Shifts of a roster sorted by order
    async fn shifts_of_roster(&self, roster_id: RosterId) -> StoreResult<Vec<Shift>>;
    /// Move a shift to `order`, swapping with the shift currently holding it
    async fn move_shift(&self, id: ShiftId, order: u32) -> StoreResult<Shift>;
    /// Delete a shift with its answers and assignment
    async fn delete_shift(&self, id: ShiftId) -> StoreResult<bool>;

    // ---- answers -------------------------------------------------------

    /// Insert an answer (unique per member, roster and shift)
    async fn insert_answer(&self, answer: Answer) -> StoreResult<Answer>;
    /// Fetch an answer by id
    async fn get_answer(&self, id: AnswerId) -> StoreResult<Option<Answer>>;
    /// Replace an answer's value
    async fn update_answer_value(&self, id: AnswerId, value: &str) -> StoreResult<Answer>;
    /// Answers of a roster, in id order
    async fn answers_of_roster(&self, roster_id: RosterId) -> StoreResult<Vec<Answer>>;

    // ---- assignments ---------------------------------------------------

    /// Insert an assignment (unique per roster and shift)
    async fn insert_assignment(&self, assignment: Assignment) -> StoreResult<Assignment>;
    /// Fetch an assignment by id
    async fn get_assignment(&self, id: AssignmentId) -> StoreResult<Option<Assignment>>;
    /// Fetch the assignment of a roster shift
    async fn find_assignment(
        &self,
        roster_id: RosterId,
        shift_id: ShiftId,
    ) -> StoreResult<Option<Assignment>>;
    /// Assignments of a roster, in id order
    async fn assignments_of_roster(&self, roster_id: RosterId) -> StoreResult<Vec<Assignment>>;
    /// Assignments of every roster owned by an organization
    async fn assignments_of_organization(
        &self,
        organization_id: OrganizationId,
    ) -> StoreResult<Vec<Assignment>>;
    /// Replace an assignment's member set
    async fn set_assignment_members(
        &self,
        id: AssignmentId,
        members: BTreeSet<MemberId>,
    ) -> StoreResult<Assignment>;

    // ---- templates -----------------------------------------------------

    /// Insert a template (organization must exist)
    async fn insert_template(&self, template: Template) -> StoreResult<Template>;
    /// Fetch a template by id
    async fn get_template(&self, id: TemplateId) -> StoreResult<Option<Template>>;
    /// Templates, optionally restricted to an organization
    async fn list_templates(
        &self,
        organization_id: Option<OrganizationId>,
    ) -> StoreResult<Vec<Template>>;
    /// Overwrite a template row
    async fn update_template(&self, template: Template) -> StoreResult<Template>;
    /// Delete a template with its shifts and preferences; clears the
    /// template reference of rosters created from it
    async fn delete_template(&self, id: TemplateId) -> StoreResult<bool>;

    /// Insert a template shift (template must exist)
    async fn insert_template_shift(&self, shift: TemplateShift) -> StoreResult<TemplateShift>;
    /// Fetch a template shift by id
    async fn get_template_shift(&self, id: TemplateShiftId) -> StoreResult<Option<TemplateShift>>;
    /// Shifts of a template sorted by position
    async fn template_shifts(&self, template_id: TemplateId) -> StoreResult<Vec<TemplateShift>>;
    /// Overwrite a template shift row
    async fn update_template_shift(&self, shift: TemplateShift) -> StoreResult<TemplateShift>;
    /// Delete a template shift with its preferences
    async fn delete_template_shift(&self, id: TemplateShiftId) -> StoreResult<bool>;

    // ---- template preferences ------------------------------------------

    /// Insert a preference (unique per member and template shift)
    async fn insert_preference(
        &self,
        preference: TemplatePreference,
    ) -> StoreResult<TemplatePreference>;
    /// Fetch a preference by id
    async fn get_preference(&self, id: PreferenceId) -> StoreResult<Option<TemplatePreference>>;
    /// Replace a preference's value
    async fn update_preference_value(
        &self,
        id: PreferenceId,
        value: &str,
    ) -> StoreResult<TemplatePreference>;
    /// Preferences on any shift of `template_id`, restricted to `members`
    /// when given
    async fn preferences_for_template(
        &self,
        template_id: TemplateId,
        members: Option<&BTreeSet<MemberId>>,
    ) -> StoreResult<Vec<TemplatePreference>>;
}
