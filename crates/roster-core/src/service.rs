//! The roster service
//!
//! One explicitly constructed handle over the store, the configuration and
//! the clock. Operations live in the component modules
//! ([`lifecycle`](crate::lifecycle), [`answers`](crate::answers),
//! [`finalize`](crate::finalize), [`templates`](crate::templates)).

use crate::clock::{is_today_or_later, Clock, SystemClock};
use crate::config::RosterConfig;
use crate::error::{RosterError, RosterResult, StoreContext};
use chrono::{DateTime, FixedOffset};
use roster_store::{
    Answer, AnswerId, Assignment, AssignmentId, EntityStore, Organization, OrganizationId,
    Roster, RosterId, Shift, ShiftId, Template, TemplateId, TemplateShift, TemplateShiftId,
};
use std::sync::Arc;

/// Entry point for every roster operation
#[derive(Clone)]
pub struct RosterService {
    pub(crate) store: Arc<dyn EntityStore>,
    pub(crate) config: Arc<RosterConfig>,
    pub(crate) clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for RosterService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RosterService")
            .field("config", &self.config)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl RosterService {
    /// Create a service on the wall clock
    #[must_use]
    pub fn new(store: Arc<dyn EntityStore>, config: RosterConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Underlying store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<dyn EntityStore> {
        &self.store
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &RosterConfig {
        &self.config
    }

    /// Reject dates before today (calendar day, in the date's offset)
    pub(crate) fn check_date(&self, date: &DateTime<FixedOffset>) -> RosterResult<()> {
        if is_today_or_later(date, self.clock.now()) {
            Ok(())
        } else {
            Err(RosterError::invalid_input(format!(
                "date {} is before today",
                date.date_naive()
            )))
        }
    }

    pub(crate) async fn require_organization(
        &self,
        id: OrganizationId,
    ) -> RosterResult<Organization> {
        self.store
            .get_organization(id)
            .await
            .context("load organization")?
            .ok_or_else(|| RosterError::not_found("organization", id))
    }

    pub(crate) async fn require_roster(&self, id: RosterId) -> RosterResult<Roster> {
        self.store
            .get_roster(id)
            .await
            .context("load roster")?
            .ok_or_else(|| RosterError::not_found("roster", id))
    }

    pub(crate) async fn require_shift(&self, id: ShiftId) -> RosterResult<Shift> {
        self.store
            .get_shift(id)
            .await
            .context("load shift")?
            .ok_or_else(|| RosterError::not_found("shift", id))
    }

    pub(crate) async fn require_answer(&self, id: AnswerId) -> RosterResult<Answer> {
        self.store
            .get_answer(id)
            .await
            .context("load answer")?
            .ok_or_else(|| RosterError::not_found("answer", id))
    }

    pub(crate) async fn require_assignment(&self, id: AssignmentId) -> RosterResult<Assignment> {
        self.store
            .get_assignment(id)
            .await
            .context("load assignment")?
            .ok_or_else(|| RosterError::not_found("assignment", id))
    }

    pub(crate) async fn require_template(&self, id: TemplateId) -> RosterResult<Template> {
        self.store
            .get_template(id)
            .await
            .context("load template")?
            .ok_or_else(|| RosterError::not_found("template", id))
    }

    pub(crate) async fn require_template_shift(
        &self,
        id: TemplateShiftId,
    ) -> RosterResult<TemplateShift> {
        self.store
            .get_template_shift(id)
            .await
            .context("load template shift")?
            .ok_or_else(|| RosterError::not_found("template shift", id))
    }
}

/// Trimmed `value`, or `InvalidInput` naming `field` when blank
pub(crate) fn required(field: &str, value: &str) -> RosterResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(RosterError::invalid_input(format!("{field} is required")))
    } else {
        Ok(trimmed.to_string())
    }
}
