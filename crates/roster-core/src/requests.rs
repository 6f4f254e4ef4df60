//! Operation inputs
//!
//! Creation requests carry every required field; update requests are
//! partial and only change what is set.

use chrono::{DateTime, FixedOffset};
use roster_store::{MemberId, OrganizationId, RosterId, ShiftId, TemplateId, TemplateShiftId};
use serde::{Deserialize, Serialize};

/// Input for `create_roster`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRoster {
    pub name: String,
    pub date: DateTime<FixedOffset>,
    pub organization_id: OrganizationId,
    /// Shift names; each gets its list position as order
    #[serde(default)]
    pub shifts: Vec<String>,
    /// Template to carry standing preferences over from
    #[serde(default)]
    pub template_id: Option<TemplateId>,
}

impl CreateRoster {
    /// Roster without shifts or template
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        date: DateTime<FixedOffset>,
        organization_id: OrganizationId,
    ) -> Self {
        Self {
            name: name.into(),
            date,
            organization_id,
            shifts: Vec::new(),
            template_id: None,
        }
    }

    /// With shift names in display order
    #[must_use]
    pub fn with_shifts<I, S>(mut self, shifts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.shifts = shifts.into_iter().map(Into::into).collect();
        self
    }

    /// Created from a template
    #[must_use]
    pub fn from_template(mut self, template_id: TemplateId) -> Self {
        self.template_id = Some(template_id);
        self
    }
}

/// Partial roster update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterUpdate {
    pub name: Option<String>,
    pub date: Option<DateTime<FixedOffset>>,
    pub finalized: Option<bool>,
}

impl RosterUpdate {
    /// Rename
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Reschedule
    #[must_use]
    pub fn date(date: DateTime<FixedOffset>) -> Self {
        Self {
            date: Some(date),
            ..Self::default()
        }
    }
}

/// Partial shift update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftUpdate {
    pub order: Option<u32>,
}

/// Input for `create_answer`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAnswer {
    pub member_id: MemberId,
    pub roster_id: RosterId,
    pub shift_id: ShiftId,
    pub value: String,
}

/// Input for `create_template`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTemplate {
    pub organization_id: OrganizationId,
    pub name: String,
    pub shifts: Vec<String>,
}

impl CreateTemplate {
    #[must_use]
    pub fn new<I, S>(organization_id: OrganizationId, name: impl Into<String>, shifts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            organization_id,
            name: name.into(),
            shifts: shifts.into_iter().map(Into::into).collect(),
        }
    }
}

/// Partial template update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateUpdate {
    pub name: Option<String>,
    /// Replacement shift list; names already present keep their rows
    pub shifts: Option<Vec<String>>,
}

/// Input for `create_preference`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePreference {
    pub member_id: MemberId,
    pub template_shift_id: TemplateShiftId,
    pub value: String,
}
