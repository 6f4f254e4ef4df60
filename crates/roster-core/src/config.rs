//! Service configuration
//!
//! Loaded once at startup (TOML) and handed to the service explicitly.

use crate::error::{RosterError, RosterResult};
use crate::identity::ClaimMapping;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// How `set_assignment_members` treats ids that do not resolve to members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownMemberPolicy {
    /// Apply the resolvable subset and report the rest as dropped
    #[default]
    Drop,
    /// Fail with `NotFound` and leave the assignment unchanged
    Reject,
}

/// Roster service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    /// Value set given to every new roster
    pub default_values: Vec<String>,
    /// Policy for unknown ids in assignment member updates
    pub unknown_member_policy: UnknownMemberPolicy,
    /// Identity claim mapping
    pub claims: ClaimMapping,
}

impl RosterConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a different default value set
    #[must_use]
    pub fn with_default_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// With an unknown member policy
    #[inline]
    #[must_use]
    pub fn with_unknown_member_policy(mut self, policy: UnknownMemberPolicy) -> Self {
        self.unknown_member_policy = policy;
        self
    }

    /// With a claim mapping
    #[inline]
    #[must_use]
    pub fn with_claims(mut self, claims: ClaimMapping) -> Self {
        self.claims = claims;
        self
    }

    /// Parse and validate TOML
    ///
    /// # Errors
    /// `RosterError::Config` on syntax errors or invalid values
    pub fn from_toml_str(source: &str) -> RosterResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| RosterError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// `RosterError::Config` if the file cannot be read or is invalid
    pub fn load(path: impl AsRef<Path>) -> RosterResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| RosterError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Render as TOML
    ///
    /// # Errors
    /// `RosterError::Config` if serialization fails
    pub fn to_toml_string(&self) -> RosterResult<String> {
        toml::to_string_pretty(self).map_err(|e| RosterError::Config(e.to_string()))
    }

    /// Check the value set: non-empty, no blanks, no duplicates
    ///
    /// # Errors
    /// `RosterError::Config` describing the first problem found
    pub fn validate(&self) -> RosterResult<()> {
        if self.default_values.is_empty() {
            return Err(RosterError::Config("default_values must not be empty".into()));
        }
        let mut seen = HashSet::new();
        for value in &self.default_values {
            if value.trim().is_empty() {
                return Err(RosterError::Config("default_values contains a blank value".into()));
            }
            if !seen.insert(value.as_str()) {
                return Err(RosterError::Config(format!(
                    "default_values contains {value:?} twice"
                )));
            }
        }
        if self.claims.client_prefix.trim().is_empty() {
            return Err(RosterError::Config("claims.client_prefix must not be empty".into()));
        }
        Ok(())
    }
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            default_values: ["J", "X", "L", "N"].map(String::from).to_vec(),
            unknown_member_policy: UnknownMemberPolicy::default(),
            claims: ClaimMapping::default(),
        }
    }
}
