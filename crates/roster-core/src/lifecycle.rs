//! Roster lifecycle
//!
//! Create, list, update and delete rosters and their shifts:
//! - Names are required and dates obey the calendar-day rule
//! - Shifts passed at creation get their list position as order; later
//!   shifts append at the current maximum + 1
//! - Deletes cascade and are no-ops for unknown ids

use crate::error::{RosterError, RosterResult, StoreContext};
use crate::requests::{CreateRoster, RosterUpdate, ShiftUpdate};
use crate::service::{required, RosterService};
use roster_store::{
    Answer, Organization, Roster, RosterId, RosterPatch, RosterQuery, Shift, ShiftId,
};
use serde::Serialize;

/// A roster with its organization, shifts and answers loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterDetails {
    pub roster: Roster,
    pub organization: Organization,
    /// Sorted by order
    pub shifts: Vec<Shift>,
    pub answers: Vec<Answer>,
}

impl RosterService {
    /// Create a roster with its shifts, carrying over template
    /// preferences when a template is given
    ///
    /// # Errors
    /// - `InvalidInput` for a blank name or shift name, a date before
    ///   today, or a template of another organization
    /// - `NotFound` for an unknown organization or template
    pub async fn create_roster(&self, request: CreateRoster) -> RosterResult<RosterDetails> {
        let name = required("name", &request.name)?;
        self.check_date(&request.date)?;
        let shift_names = request
            .shifts
            .iter()
            .map(|s| required("shift name", s))
            .collect::<RosterResult<Vec<_>>>()?;

        let organization = self.require_organization(request.organization_id).await?;
        let template = match request.template_id {
            Some(id) => {
                let template = self.require_template(id).await?;
                if template.organization_id != organization.id {
                    return Err(RosterError::invalid_input(format!(
                        "template {id} belongs to another organization"
                    )));
                }
                Some(template)
            }
            None => None,
        };

        let mut roster = Roster::new(
            organization.id,
            name,
            request.date,
            self.config.default_values.clone(),
        );
        roster.template_id = request.template_id;
        let roster = self
            .store
            .insert_roster(roster)
            .await
            .context("create roster")?;

        let mut shifts = Vec::with_capacity(shift_names.len());
        for (position, shift_name) in shift_names.into_iter().enumerate() {
            let order = u32::try_from(position)
                .map_err(|_| RosterError::invalid_input("too many shifts"))?;
            shifts.push(
                self.store
                    .insert_shift(Shift::new(roster.id, shift_name, order))
                    .await
                    .context("create shift")?,
            );
        }

        let answers = match &template {
            Some(template) => self.carry_over(&roster, template, &shifts).await?,
            None => Vec::new(),
        };

        tracing::info!(
            roster = %roster.id,
            organization = %organization.id,
            shifts = shifts.len(),
            "Created roster {}",
            roster.name
        );

        Ok(RosterDetails {
            roster,
            organization,
            shifts,
            answers,
        })
    }

    /// Rosters matching every set filter, with details loaded
    ///
    /// # Errors
    /// Store failures with operation context
    pub async fn get_rosters(&self, query: &RosterQuery) -> RosterResult<Vec<RosterDetails>> {
        let rosters = self
            .store
            .list_rosters(query)
            .await
            .context("list rosters")?;
        futures::future::try_join_all(rosters.into_iter().map(|r| self.details(r))).await
    }

    /// One roster with details
    ///
    /// # Errors
    /// `NotFound` if the roster does not exist
    pub async fn get_roster(&self, id: RosterId) -> RosterResult<RosterDetails> {
        let roster = self.require_roster(id).await?;
        self.details(roster).await
    }

    /// Apply the fields set in `update`
    ///
    /// A finalized roster cannot be reopened.
    ///
    /// # Errors
    /// - `NotFound` if the roster does not exist
    /// - `InvalidInput` for a blank name, a date before today or
    ///   `finalized: false` on a finalized roster
    pub async fn update_roster(&self, id: RosterId, update: RosterUpdate) -> RosterResult<Roster> {
        let name = update.name.as_deref().map(|n| required("name", n)).transpose()?;
        if let Some(date) = &update.date {
            self.check_date(date)?;
        }

        let roster = self.require_roster(id).await?;
        if update.finalized == Some(false) && roster.finalized {
            return Err(RosterError::invalid_input("a finalized roster cannot be reopened"));
        }

        let patch = RosterPatch {
            name,
            date: update.date,
            finalize: update.finalized == Some(true),
        };
        if patch.is_empty() {
            return Ok(roster);
        }

        self.store
            .patch_roster(id, patch)
            .await
            .context("update roster")
    }

    /// Delete a roster with its shifts, answers and assignments.
    /// Returns whether anything was removed.
    ///
    /// # Errors
    /// Store failures with operation context
    pub async fn delete_roster(&self, id: RosterId) -> RosterResult<bool> {
        let removed = self
            .store
            .delete_roster(id)
            .await
            .context("delete roster")?;
        if removed {
            tracing::info!(roster = %id, "Deleted roster");
        }
        Ok(removed)
    }

    /// Append a shift after the roster's current last one
    ///
    /// # Errors
    /// - `InvalidInput` for a blank name, or when the last shift already
    ///   holds the highest possible order
    /// - `NotFound` if the roster does not exist
    pub async fn create_shift(&self, roster_id: RosterId, name: &str) -> RosterResult<Shift> {
        let name = required("name", name)?;
        self.store
            .append_shift(roster_id, &name)
            .await
            .context("create shift")
    }

    /// Reorder a shift; taking an order already in use swaps the two
    ///
    /// # Errors
    /// `NotFound` if the shift does not exist
    pub async fn update_shift(&self, id: ShiftId, update: ShiftUpdate) -> RosterResult<Shift> {
        match update.order {
            Some(order) => self
                .store
                .move_shift(id, order)
                .await
                .context("update shift"),
            None => self.require_shift(id).await,
        }
    }

    /// Delete a shift with its answers and assignment
    ///
    /// # Errors
    /// Store failures with operation context
    pub async fn delete_shift(&self, id: ShiftId) -> RosterResult<bool> {
        self.store.delete_shift(id).await.context("delete shift")
    }

    async fn details(&self, roster: Roster) -> RosterResult<RosterDetails> {
        let (organization, shifts, answers) = futures::try_join!(
            self.require_organization(roster.organization_id),
            async {
                self.store
                    .shifts_of_roster(roster.id)
                    .await
                    .context("load shifts")
            },
            async {
                self.store
                    .answers_of_roster(roster.id)
                    .await
                    .context("load answers")
            },
        )?;

        Ok(RosterDetails {
            roster,
            organization,
            shifts,
            answers,
        })
    }
}
