//! Identity claims to organization membership
//!
//! The identity provider authenticates members and asserts which
//! organizations they belong to. This module gives that assertion a
//! declared schema ([`IdentityClaims`]), maps it to organization names
//! ([`ClaimMapping`]) and synchronizes the member row
//! ([`IdentitySync`]). Token verification stays with the collaborator.

use crate::error::{RosterError, RosterResult, StoreContext};
use roster_store::{EntityStore, Member, Organization};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Malformed identity assertion
#[derive(Debug, thiserror::Error)]
pub enum ClaimError {
    /// Payload does not match the claim schema
    #[error("malformed claims: {0}")]
    Malformed(#[from] serde_json::Error),

    /// `preferred_username` is not `m<digits>`
    #[error("invalid username format: {0:?}")]
    InvalidUsername(String),

    /// No roles for the configured client
    #[error("no resource access entry for client {0:?}")]
    MissingClient(String),
}

/// Roles granted for one client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRoles {
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Expected shape of the identity assertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// `m` followed by the member's numeric external id
    pub preferred_username: String,
    /// Display name
    pub given_name: String,
    /// Client id → granted roles
    #[serde(default)]
    pub resource_access: HashMap<String, ClientRoles>,
}

impl IdentityClaims {
    /// Decode a JSON claim payload
    ///
    /// # Errors
    /// `ClaimError::Malformed` if required claims are missing or mistyped
    pub fn from_json(payload: &str) -> Result<Self, ClaimError> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Numeric external id from `preferred_username`
    ///
    /// # Errors
    /// `ClaimError::InvalidUsername` unless the username is `m<digits>`
    pub fn external_id(&self) -> Result<u64, ClaimError> {
        self.preferred_username
            .strip_prefix('m')
            .and_then(|digits| digits.parse().ok())
            .ok_or_else(|| ClaimError::InvalidUsername(self.preferred_username.clone()))
    }
}

/// Where organization roles live in the claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimMapping {
    /// Client id prefix; the client key is `<prefix>-<environment>`
    pub client_prefix: String,
    /// Deployment environment; roles read `<environment> <Organization>`
    pub environment: String,
}

impl Default for ClaimMapping {
    fn default() -> Self {
        Self {
            client_prefix: "grooster".into(),
            environment: "test".into(),
        }
    }
}

impl ClaimMapping {
    /// Client key looked up in `resource_access`
    #[must_use]
    pub fn client_key(&self) -> String {
        format!("{}-{}", self.client_prefix, self.environment)
    }

    /// Organization names asserted by `claims`, deduplicated, in role order
    ///
    /// # Errors
    /// `ClaimError::MissingClient` if the client entry is absent
    pub fn organizations(&self, claims: &IdentityClaims) -> Result<Vec<String>, ClaimError> {
        let key = self.client_key();
        let client = claims
            .resource_access
            .get(&key)
            .ok_or(ClaimError::MissingClient(key))?;

        let prefix = format!("{} ", self.environment);
        let mut names: Vec<String> = Vec::new();
        for role in &client.roles {
            if let Some(name) = role.strip_prefix(prefix.as_str()) {
                if !name.is_empty() && !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }
        Ok(names)
    }
}

/// Member with the organizations it was synchronized into
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncedMember {
    pub member: Member,
    pub organizations: Vec<Organization>,
}

/// Applies identity assertions to the member directory
pub struct IdentitySync {
    store: Arc<dyn EntityStore>,
    mapping: ClaimMapping,
}

impl std::fmt::Debug for IdentitySync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentitySync")
            .field("mapping", &self.mapping)
            .finish_non_exhaustive()
    }
}

impl IdentitySync {
    /// Create with the store and mapping it will use for its lifetime
    #[must_use]
    pub fn new(store: Arc<dyn EntityStore>, mapping: ClaimMapping) -> Self {
        Self { store, mapping }
    }

    /// Resolve or create the member behind `claims` and replace its
    /// organization set with the asserted one. Organizations are created
    /// on first sight.
    ///
    /// # Errors
    /// - `RosterError::Claims` for malformed claims (nothing is written)
    /// - Store failures with operation context
    pub async fn sync_member(&self, claims: &IdentityClaims) -> RosterResult<SyncedMember> {
        let external_id = claims.external_id()?;
        let names = self.mapping.organizations(claims)?;

        let mut organizations = Vec::with_capacity(names.len());
        for name in &names {
            organizations.push(self.organization_named(name).await?);
        }
        let ids: BTreeSet<_> = organizations.iter().map(|o| o.id).collect();

        let existing = self
            .store
            .find_member_by_external_id(external_id)
            .await
            .context("find member")?;

        let member = match existing {
            Some(member) => {
                self.store
                    .set_member_organizations(member.id, ids)
                    .await
                    .context("sync member organizations")?
            }
            None => {
                let mut member = Member::new(claims.given_name.clone(), external_id);
                member.organizations = ids.clone();
                match self.store.insert_member(member).await {
                    Ok(member) => {
                        tracing::info!(member = %member.id, external_id, "Created member from claims");
                        member
                    }
                    // Concurrent first login created the row already
                    Err(e) if e.is_unique_violation() => {
                        let member = self
                            .store
                            .find_member_by_external_id(external_id)
                            .await
                            .context("find member")?
                            .ok_or_else(|| RosterError::not_found("member", external_id))?;
                        self.store
                            .set_member_organizations(member.id, ids)
                            .await
                            .context("sync member organizations")?
                    }
                    Err(e) => return Err(e).context("create member"),
                }
            }
        };

        Ok(SyncedMember {
            member,
            organizations,
        })
    }

    async fn organization_named(&self, name: &str) -> RosterResult<Organization> {
        if let Some(organization) = self
            .store
            .find_organization_by_name(name)
            .await
            .context("find organization")?
        {
            return Ok(organization);
        }

        match self.store.insert_organization(Organization::new(name)).await {
            Ok(organization) => {
                tracing::info!(organization = %organization.id, name, "Created organization from claims");
                Ok(organization)
            }
            Err(e) if e.is_unique_violation() => self
                .store
                .find_organization_by_name(name)
                .await
                .context("find organization")?
                .ok_or_else(|| RosterError::not_found("organization", name)),
            Err(e) => Err(e).context("create organization"),
        }
    }
}
