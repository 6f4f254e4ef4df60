//! Declarative seed data
//!
//! A TOML document of organizations, members, rosters (with recorded
//! assignments) and templates, written straight to a store. Seeding skips
//! the calendar-day rule so past rosters can build up assignment history.
//!
//! ```toml
//! [[organizations]]
//! name = "Bar"
//!
//! [[members]]
//! name = "Alice"
//! external_id = 1
//! organizations = ["Bar"]
//!
//! [[rosters]]
//! name = "Borrel"
//! organization = "Bar"
//! date = "2030-06-01T18:00:00+02:00"
//! shifts = ["Tap", "Kitchen"]
//!
//! [[rosters.assignments]]
//! shift = "Tap"
//! members = [1]
//! ```

use crate::config::RosterConfig;
use crate::error::{RosterError, RosterResult, StoreContext};
use chrono::{DateTime, FixedOffset};
use roster_store::{
    Assignment, EntityStore, Member, MemberId, Organization, OrganizationId, Roster, Shift,
    Template, TemplatePreference, TemplateShift,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedMember {
    pub name: String,
    pub external_id: u64,
    /// Organization names
    #[serde(default)]
    pub organizations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedAssignment {
    /// Shift name within the roster
    pub shift: String,
    /// Member external ids
    #[serde(default)]
    pub members: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedRoster {
    pub name: String,
    pub organization: String,
    pub date: DateTime<FixedOffset>,
    #[serde(default)]
    pub shifts: Vec<String>,
    /// Marks the roster finalized; implied by recorded assignments
    #[serde(default)]
    pub finalized: bool,
    #[serde(default)]
    pub assignments: Vec<SeedAssignment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedPreference {
    /// Member external id
    pub member: u64,
    /// Template shift name
    pub shift: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedTemplate {
    pub name: String,
    pub organization: String,
    pub shifts: Vec<String>,
    #[serde(default)]
    pub preferences: Vec<SeedPreference>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedOrganization {
    pub name: String,
}

/// Seed document root
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedDocument {
    pub organizations: Vec<SeedOrganization>,
    pub members: Vec<SeedMember>,
    pub rosters: Vec<SeedRoster>,
    pub templates: Vec<SeedTemplate>,
}

/// Row counts written by [`SeedDocument::apply`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub organizations: usize,
    pub members: usize,
    pub rosters: usize,
    pub assignments: usize,
    pub templates: usize,
    pub preferences: usize,
}

fn unknown(kind: &str, name: impl std::fmt::Debug) -> RosterError {
    RosterError::invalid_input(format!("seed references unknown {kind} {name:?}"))
}

impl SeedDocument {
    /// Parse a TOML seed document
    ///
    /// # Errors
    /// `RosterError::Config` on syntax or schema errors
    pub fn from_toml_str(source: &str) -> RosterResult<Self> {
        toml::from_str(source).map_err(|e| RosterError::Config(format!("seed: {e}")))
    }

    /// Read and parse a TOML seed file
    ///
    /// # Errors
    /// `RosterError::Config` if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> RosterResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| RosterError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Write every row to `store`, giving rosters the configured value set
    ///
    /// # Errors
    /// - `InvalidInput` for references to undeclared organizations,
    ///   members or shifts
    /// - Store failures, e.g. `Conflict` for duplicate names or ids
    pub async fn apply(
        &self,
        store: &dyn EntityStore,
        config: &RosterConfig,
    ) -> RosterResult<SeedSummary> {
        let mut summary = SeedSummary::default();

        let mut organizations: HashMap<&str, OrganizationId> = HashMap::new();
        for seed in &self.organizations {
            let organization = store
                .insert_organization(Organization::new(seed.name.clone()))
                .await
                .context("seed organization")?;
            organizations.insert(seed.name.as_str(), organization.id);
            summary.organizations += 1;
        }
        let organization = |name: &str| {
            organizations
                .get(name)
                .copied()
                .ok_or_else(|| unknown("organization", name))
        };

        let mut members: HashMap<u64, MemberId> = HashMap::new();
        for seed in &self.members {
            let mut member = Member::new(seed.name.clone(), seed.external_id);
            for name in &seed.organizations {
                member.organizations.insert(organization(name)?);
            }
            let member = store.insert_member(member).await.context("seed member")?;
            members.insert(seed.external_id, member.id);
            summary.members += 1;
        }
        let member = |external_id: u64| {
            members
                .get(&external_id)
                .copied()
                .ok_or_else(|| unknown("member", external_id))
        };

        for seed in &self.rosters {
            let mut roster = Roster::new(
                organization(&seed.organization)?,
                seed.name.clone(),
                seed.date,
                config.default_values.clone(),
            );
            roster.finalized = seed.finalized || !seed.assignments.is_empty();
            let roster = store.insert_roster(roster).await.context("seed roster")?;

            let mut shifts = HashMap::new();
            for (index, name) in seed.shifts.iter().enumerate() {
                let order = u32::try_from(index).map_err(|_| unknown("shift", name))?;
                let shift = store
                    .insert_shift(Shift::new(roster.id, name.clone(), order))
                    .await
                    .context("seed shift")?;
                shifts.insert(name.as_str(), shift.id);
            }

            for seed_assignment in &seed.assignments {
                let shift_id = shifts
                    .get(seed_assignment.shift.as_str())
                    .copied()
                    .ok_or_else(|| unknown("shift", &seed_assignment.shift))?;
                let mut assignment = Assignment::placeholder(roster.id, shift_id);
                assignment.members = seed_assignment
                    .members
                    .iter()
                    .map(|id| member(*id))
                    .collect::<RosterResult<BTreeSet<_>>>()?;
                store
                    .insert_assignment(assignment)
                    .await
                    .context("seed assignment")?;
                summary.assignments += 1;
            }
            summary.rosters += 1;
        }

        for seed in &self.templates {
            let template = store
                .insert_template(Template::new(
                    organization(&seed.organization)?,
                    seed.name.clone(),
                ))
                .await
                .context("seed template")?;

            let mut shifts = HashMap::new();
            for (index, name) in seed.shifts.iter().enumerate() {
                let position = u32::try_from(index).map_err(|_| unknown("shift", name))?;
                let shift = store
                    .insert_template_shift(TemplateShift::new(template.id, name.clone(), position))
                    .await
                    .context("seed template shift")?;
                shifts.insert(name.as_str(), shift.id);
            }

            for preference in &seed.preferences {
                let shift_id = shifts
                    .get(preference.shift.as_str())
                    .copied()
                    .ok_or_else(|| unknown("template shift", &preference.shift))?;
                store
                    .insert_preference(TemplatePreference::new(
                        member(preference.member)?,
                        shift_id,
                        preference.value.clone(),
                    ))
                    .await
                    .context("seed preference")?;
                summary.preferences += 1;
            }
            summary.templates += 1;
        }

        tracing::info!(
            organizations = summary.organizations,
            members = summary.members,
            rosters = summary.rosters,
            templates = summary.templates,
            "Applied seed document"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_store::{MemoryStore, RosterQuery};

    const DOCUMENT: &str = r#"
        [[organizations]]
        name = "Bar"

        [[members]]
        name = "Alice"
        external_id = 1
        organizations = ["Bar"]

        [[members]]
        name = "Bob"
        external_id = 2
        organizations = ["Bar"]

        [[rosters]]
        name = "Borrel"
        organization = "Bar"
        date = "2020-01-10T18:00:00+01:00"
        shifts = ["Tap", "Kitchen"]

        [[rosters.assignments]]
        shift = "Tap"
        members = [1, 2]

        [[templates]]
        name = "Weekly"
        organization = "Bar"
        shifts = ["Tap"]

        [[templates.preferences]]
        member = 2
        shift = "Tap"
        value = "X"
    "#;

    #[tokio::test]
    async fn applies_past_rosters_and_assignments() {
        let store = MemoryStore::new();
        let document = SeedDocument::from_toml_str(DOCUMENT).unwrap();
        assert_eq!(document.organizations[0].name, "Bar");

        let summary = document.apply(&store, &RosterConfig::default()).await.unwrap();
        assert_eq!(summary.members, 2);
        assert_eq!(summary.assignments, 1);
        assert_eq!(summary.preferences, 1);

        let rosters = store.list_rosters(&RosterQuery::all()).await.unwrap();
        assert_eq!(rosters.len(), 1);
        assert!(rosters[0].finalized);
        let assignments = store.assignments_of_roster(rosters[0].id).await.unwrap();
        assert_eq!(assignments[0].members.len(), 2);
    }

    #[tokio::test]
    async fn unknown_references_are_rejected() {
        let store = MemoryStore::new();
        let document = SeedDocument::from_toml_str(
            r#"
            [[members]]
            name = "Carol"
            external_id = 3
            organizations = ["Kitchen"]
            "#,
        )
        .unwrap();

        let err = document.apply(&store, &RosterConfig::default()).await.unwrap_err();
        assert!(matches!(err, RosterError::InvalidInput(msg) if msg.contains("Kitchen")));
    }

    #[test]
    fn syntax_errors_are_config_errors() {
        let err = SeedDocument::from_toml_str("[[rosters]\nname =").unwrap_err();
        assert!(matches!(err, RosterError::Config(_)));
    }
}
