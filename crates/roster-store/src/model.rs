//! Entity definitions
//!
//! Plain data rows as the store persists them. Relationships are expressed
//! through identifiers; the many-to-many links (organization membership,
//! assignment members) are carried as id sets on the owning row.

use crate::ids::{
    AnswerId, AssignmentId, MemberId, OrganizationId, PreferenceId, RosterId, ShiftId,
    TemplateId, TemplateShiftId,
};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Creation and update timestamps shared by every entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    /// When the row was inserted
    pub created_at: DateTime<Utc>,
    /// When the row was last changed
    pub updated_at: DateTime<Utc>,
}

impl Timestamps {
    /// Timestamps for a row created now
    #[inline]
    #[must_use]
    pub fn now() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
        }
    }

    /// Bump `updated_at`
    #[inline]
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for Timestamps {
    fn default() -> Self {
        Self::now()
    }
}

/// A club sub-unit owning rosters, templates and members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    /// Unique organization name
    pub name: String,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Organization {
    /// New organization with a fresh id
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: OrganizationId::new(),
            name: name.into(),
            timestamps: Timestamps::now(),
        }
    }
}

/// A person who answers rosters and gets assigned to shifts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    /// Display name
    pub name: String,
    /// Identifier issued by the identity provider, unique and stable
    pub external_id: u64,
    /// Organizations this member belongs to
    pub organizations: BTreeSet<OrganizationId>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Member {
    /// New member with a fresh id and no organizations
    #[must_use]
    pub fn new(name: impl Into<String>, external_id: u64) -> Self {
        Self {
            id: MemberId::new(),
            name: name.into(),
            external_id,
            organizations: BTreeSet::new(),
            timestamps: Timestamps::now(),
        }
    }

    /// Add organization membership
    #[must_use]
    pub fn with_organization(mut self, organization: OrganizationId) -> Self {
        self.organizations.insert(organization);
        self
    }

    /// Check membership
    #[inline]
    #[must_use]
    pub fn belongs_to(&self, organization: OrganizationId) -> bool {
        self.organizations.contains(&organization)
    }
}

/// One dated scheduling unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    pub id: RosterId,
    pub organization_id: OrganizationId,
    pub name: String,
    /// Scheduled date, kept with the offset it was submitted in
    pub date: DateTime<FixedOffset>,
    /// Allowed answer values, in display order
    pub values: Vec<String>,
    /// Set once the roster has been converted into assignments
    pub finalized: bool,
    /// Template this roster was created from, if any
    pub template_id: Option<TemplateId>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Roster {
    /// New draft roster
    #[must_use]
    pub fn new(
        organization_id: OrganizationId,
        name: impl Into<String>,
        date: DateTime<FixedOffset>,
        values: Vec<String>,
    ) -> Self {
        Self {
            id: RosterId::new(),
            organization_id,
            name: name.into(),
            date,
            values,
            finalized: false,
            template_id: None,
            timestamps: Timestamps::now(),
        }
    }

    /// Whether `value` belongs to this roster's value set
    #[inline]
    #[must_use]
    pub fn accepts(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}

/// Field-level roster change. Fields left unset keep the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterPatch {
    pub name: Option<String>,
    pub date: Option<DateTime<FixedOffset>>,
    /// Mark the roster finalized. There is no way back to draft.
    pub finalize: bool,
}

impl RosterPatch {
    /// Only mark the roster finalized
    #[inline]
    #[must_use]
    pub fn finalize() -> Self {
        Self {
            finalize: true,
            ..Self::default()
        }
    }

    /// Whether nothing would change
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.date.is_none() && !self.finalize
    }

    /// Apply to `roster`, returning whether any field changed
    pub fn apply(self, roster: &mut Roster) -> bool {
        let mut changed = false;
        if let Some(name) = self.name.filter(|n| *n != roster.name) {
            roster.name = name;
            changed = true;
        }
        if let Some(date) = self.date.filter(|d| *d != roster.date) {
            roster.date = date;
            changed = true;
        }
        if self.finalize && !roster.finalized {
            roster.finalized = true;
            changed = true;
        }
        changed
    }
}

/// A named, ordered column of a roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    pub id: ShiftId,
    pub roster_id: RosterId,
    pub name: String,
    /// Roster-scoped display position
    pub order: u32,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Shift {
    /// New shift at `order`
    #[must_use]
    pub fn new(roster_id: RosterId, name: impl Into<String>, order: u32) -> Self {
        Self {
            id: ShiftId::new(),
            roster_id,
            name: name.into(),
            order,
            timestamps: Timestamps::now(),
        }
    }
}

/// A member's declared value for a shift on a roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub id: AnswerId,
    pub member_id: MemberId,
    pub roster_id: RosterId,
    pub shift_id: ShiftId,
    pub value: String,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Answer {
    /// New answer
    #[must_use]
    pub fn new(
        member_id: MemberId,
        roster_id: RosterId,
        shift_id: ShiftId,
        value: impl Into<String>,
    ) -> Self {
        Self {
            id: AnswerId::new(),
            member_id,
            roster_id,
            shift_id,
            value: value.into(),
            timestamps: Timestamps::now(),
        }
    }
}

/// Finalized binding of members to one shift of a roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub roster_id: RosterId,
    pub shift_id: ShiftId,
    /// Members selected to work the shift
    pub members: BTreeSet<MemberId>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Assignment {
    /// Empty placeholder for a shift
    #[must_use]
    pub fn placeholder(roster_id: RosterId, shift_id: ShiftId) -> Self {
        Self {
            id: AssignmentId::new(),
            roster_id,
            shift_id,
            members: BTreeSet::new(),
            timestamps: Timestamps::now(),
        }
    }

    /// Whether `member` is assigned
    #[inline]
    #[must_use]
    pub fn includes(&self, member: MemberId) -> bool {
        self.members.contains(&member)
    }
}

/// Reusable, dateless definition of recurring shift names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    pub organization_id: OrganizationId,
    pub name: String,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Template {
    /// New template without shifts
    #[must_use]
    pub fn new(organization_id: OrganizationId, name: impl Into<String>) -> Self {
        Self {
            id: TemplateId::new(),
            organization_id,
            name: name.into(),
            timestamps: Timestamps::now(),
        }
    }
}

/// A recurring shift name within a template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateShift {
    pub id: TemplateShiftId,
    pub template_id: TemplateId,
    pub name: String,
    /// Position within the template's shift list
    pub position: u32,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl TemplateShift {
    /// New template shift
    #[must_use]
    pub fn new(template_id: TemplateId, name: impl Into<String>, position: u32) -> Self {
        Self {
            id: TemplateShiftId::new(),
            template_id,
            name: name.into(),
            position,
            timestamps: Timestamps::now(),
        }
    }
}

/// A member's standing answer for a template shift
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplatePreference {
    pub id: PreferenceId,
    pub member_id: MemberId,
    pub template_shift_id: TemplateShiftId,
    pub value: String,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl TemplatePreference {
    /// New standing preference
    #[must_use]
    pub fn new(
        member_id: MemberId,
        template_shift_id: TemplateShiftId,
        value: impl Into<String>,
    ) -> Self {
        Self {
            id: PreferenceId::new(),
            member_id,
            template_shift_id,
            value: value.into(),
            timestamps: Timestamps::now(),
        }
    }
}

/// Roster listing filter; every set field must match
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterQuery {
    pub id: Option<RosterId>,
    /// Calendar day of the roster date
    pub date: Option<NaiveDate>,
    pub organization_id: Option<OrganizationId>,
}

impl RosterQuery {
    /// Match everything
    #[inline]
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to one roster
    #[inline]
    #[must_use]
    pub fn by_id(id: RosterId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// Restrict to an organization
    #[inline]
    #[must_use]
    pub fn in_organization(organization_id: OrganizationId) -> Self {
        Self {
            organization_id: Some(organization_id),
            ..Self::default()
        }
    }

    /// Whether `roster` satisfies all set filters
    #[must_use]
    pub fn matches(&self, roster: &Roster) -> bool {
        self.id.map_or(true, |id| roster.id == id)
            && self.date.map_or(true, |d| roster.date.date_naive() == d)
            && self
                .organization_id
                .map_or(true, |o| roster.organization_id == o)
    }
}
