//! Answer validation
//!
//! Values must belong to the roster's value set when written. The
//! (member, roster, shift) key is enforced by the store, not pre-checked,
//! so concurrent duplicates resolve to one `Conflict`.

use crate::error::{RosterError, RosterResult, StoreContext};
use crate::requests::CreateAnswer;
use crate::service::RosterService;
use roster_store::{Answer, AnswerId};

impl RosterService {
    /// Record a member's answer for a shift
    ///
    /// # Errors
    /// - `NotFound` if the roster, shift or member does not exist
    /// - `InvalidInput` if the shift belongs to another roster
    /// - `InvalidValue` if the value is outside the roster's value set
    /// - `Conflict` if the member already answered this shift
    pub async fn create_answer(&self, request: CreateAnswer) -> RosterResult<Answer> {
        let roster = self.require_roster(request.roster_id).await?;
        let shift = self.require_shift(request.shift_id).await?;
        if shift.roster_id != roster.id {
            return Err(RosterError::invalid_input(format!(
                "shift {} does not belong to roster {}",
                shift.id, roster.id
            )));
        }
        if !roster.accepts(&request.value) {
            return Err(RosterError::invalid_value(request.value, &roster.values));
        }

        self.store
            .insert_answer(Answer::new(
                request.member_id,
                roster.id,
                shift.id,
                request.value,
            ))
            .await
            .context("create answer")
    }

    /// Correct the value of an existing answer
    ///
    /// # Errors
    /// - `NotFound` if the answer or its roster does not exist
    /// - `InvalidValue` if the value is outside the roster's value set
    pub async fn update_answer(&self, id: AnswerId, value: &str) -> RosterResult<Answer> {
        let answer = self.require_answer(id).await?;
        let roster = self.require_roster(answer.roster_id).await?;
        if !roster.accepts(value) {
            return Err(RosterError::invalid_value(value, &roster.values));
        }

        self.store
            .update_answer_value(id, value)
            .await
            .context("update answer")
    }
}
