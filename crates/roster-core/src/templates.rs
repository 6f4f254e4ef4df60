//! Templates and standing preferences
//!
//! Templates are dateless shift-name lists owned by an organization.
//! Members record standing preferences per template shift; carryover
//! turns them into answers when a roster is created from the template.

use crate::error::{RosterError, RosterResult, StoreContext};
use crate::requests::{CreatePreference, CreateTemplate, TemplateUpdate};
use crate::service::{required, RosterService};
use roster_store::{
    MemberId, OrganizationId, PreferenceId, Template, TemplateId, TemplatePreference,
    TemplateShift,
};
use serde::Serialize;
use std::collections::BTreeSet;

/// A template with its shifts sorted by position
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateDetails {
    pub template: Template,
    pub shifts: Vec<TemplateShift>,
}

impl TemplateDetails {
    /// Shift names in position order
    #[must_use]
    pub fn shift_names(&self) -> Vec<&str> {
        self.shifts.iter().map(|s| s.name.as_str()).collect()
    }
}

fn shift_list(names: &[String]) -> RosterResult<Vec<String>> {
    if names.is_empty() {
        return Err(RosterError::invalid_input("a template needs at least one shift"));
    }
    names.iter().map(|n| required("shift name", n)).collect()
}

fn position(index: usize) -> RosterResult<u32> {
    u32::try_from(index).map_err(|_| RosterError::invalid_input("too many shifts"))
}

impl RosterService {
    /// Create a template with its shifts
    ///
    /// # Errors
    /// - `InvalidInput` for a blank name, no shifts or a blank shift name
    /// - `NotFound` for an unknown organization
    pub async fn create_template(&self, request: CreateTemplate) -> RosterResult<TemplateDetails> {
        let name = required("name", &request.name)?;
        let names = shift_list(&request.shifts)?;
        self.require_organization(request.organization_id).await?;

        let template = self
            .store
            .insert_template(Template::new(request.organization_id, name))
            .await
            .context("create template")?;

        let mut shifts = Vec::with_capacity(names.len());
        for (index, shift_name) in names.into_iter().enumerate() {
            shifts.push(
                self.store
                    .insert_template_shift(TemplateShift::new(
                        template.id,
                        shift_name,
                        position(index)?,
                    ))
                    .await
                    .context("create template shift")?,
            );
        }

        tracing::info!(template = %template.id, shifts = shifts.len(), "Created template {}", template.name);
        Ok(TemplateDetails { template, shifts })
    }

    /// One template with its shifts
    ///
    /// # Errors
    /// `NotFound` if the template does not exist
    pub async fn get_template(&self, id: TemplateId) -> RosterResult<TemplateDetails> {
        let template = self.require_template(id).await?;
        self.template_details(template).await
    }

    /// Templates, optionally of one organization
    ///
    /// # Errors
    /// Store failures with operation context
    pub async fn get_templates(
        &self,
        organization_id: Option<OrganizationId>,
    ) -> RosterResult<Vec<TemplateDetails>> {
        let templates = self
            .store
            .list_templates(organization_id)
            .await
            .context("list templates")?;
        futures::future::try_join_all(templates.into_iter().map(|t| self.template_details(t)))
            .await
    }

    /// Rename a template and/or replace its shift list.
    ///
    /// Shifts whose names survive keep their rows and preferences; the rest
    /// are removed with their preferences and new names are added.
    ///
    /// # Errors
    /// - `InvalidInput` for a blank name, an empty list or a blank shift name
    /// - `NotFound` if the template does not exist
    pub async fn update_template(
        &self,
        id: TemplateId,
        update: TemplateUpdate,
    ) -> RosterResult<TemplateDetails> {
        let name = update.name.as_deref().map(|n| required("name", n)).transpose()?;
        let names = update.shifts.as_deref().map(shift_list).transpose()?;

        let mut template = self.require_template(id).await?;
        if let Some(name) = name {
            template.name = name;
            template = self
                .store
                .update_template(template)
                .await
                .context("update template")?;
        }

        if let Some(names) = names {
            let mut existing = self
                .store
                .template_shifts(id)
                .await
                .context("load template shifts")?;

            for (index, shift_name) in names.into_iter().enumerate() {
                let slot = position(index)?;
                match existing.iter().position(|s| s.name == shift_name) {
                    Some(found) => {
                        let mut shift = existing.swap_remove(found);
                        if shift.position != slot {
                            shift.position = slot;
                            self.store
                                .update_template_shift(shift)
                                .await
                                .context("update template shift")?;
                        }
                    }
                    None => {
                        self.store
                            .insert_template_shift(TemplateShift::new(id, shift_name, slot))
                            .await
                            .context("create template shift")?;
                    }
                }
            }

            for stale in existing {
                self.store
                    .delete_template_shift(stale.id)
                    .await
                    .context("delete template shift")?;
            }
        }

        self.template_details(template).await
    }

    /// Delete a template with its shifts and preferences. Rosters created
    /// from it stay and lose the reference.
    ///
    /// # Errors
    /// `NotFound` if the template does not exist
    pub async fn delete_template(&self, id: TemplateId) -> RosterResult<()> {
        let removed = self
            .store
            .delete_template(id)
            .await
            .context("delete template")?;
        if !removed {
            return Err(RosterError::not_found("template", id));
        }
        tracing::info!(template = %id, "Deleted template");
        Ok(())
    }

    /// Record a member's standing preference for a template shift
    ///
    /// # Errors
    /// - `NotFound` for an unknown template shift or member
    /// - `InvalidValue` if the value is outside the configured value set
    /// - `Conflict` if the member already has a preference for the shift
    pub async fn create_preference(
        &self,
        request: CreatePreference,
    ) -> RosterResult<TemplatePreference> {
        self.check_preference_value(&request.value)?;
        let shift = self.require_template_shift(request.template_shift_id).await?;

        self.store
            .insert_preference(TemplatePreference::new(
                request.member_id,
                shift.id,
                request.value,
            ))
            .await
            .context("create preference")
    }

    /// A member's preferences across a template's shifts
    ///
    /// # Errors
    /// `NotFound` if the template does not exist
    pub async fn get_preferences(
        &self,
        member_id: MemberId,
        template_id: TemplateId,
    ) -> RosterResult<Vec<TemplatePreference>> {
        self.require_template(template_id).await?;
        self.store
            .preferences_for_template(template_id, Some(&BTreeSet::from([member_id])))
            .await
            .context("load preferences")
    }

    /// Change a standing preference's value
    ///
    /// # Errors
    /// - `InvalidValue` if the value is outside the configured value set
    /// - `NotFound` if the preference does not exist
    pub async fn update_preference(
        &self,
        id: PreferenceId,
        value: &str,
    ) -> RosterResult<TemplatePreference> {
        self.check_preference_value(value)?;
        self.store
            .update_preference_value(id, value)
            .await
            .context("update preference")
    }

    fn check_preference_value(&self, value: &str) -> RosterResult<()> {
        let allowed = &self.config.default_values;
        if allowed.iter().any(|v| v == value) {
            Ok(())
        } else {
            Err(RosterError::invalid_value(value, allowed))
        }
    }

    async fn template_details(&self, template: Template) -> RosterResult<TemplateDetails> {
        let shifts = self
            .store
            .template_shifts(template.id)
            .await
            .context("load template shifts")?;
        Ok(TemplateDetails { template, shifts })
    }
}
