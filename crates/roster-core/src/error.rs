//! Error types for Roster Core
//!
//! One taxonomy for every service operation:
//! - Missing referenced rows
//! - Rejected input (empty fields, past dates, foreign templates)
//! - Answer values outside a roster's value set
//! - Uniqueness conflicts
//! - Opaque storage faults, wrapped with the failing operation

use crate::identity::ClaimError;
use roster_store::StoreError;

/// Main roster error type
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    /// Referenced entity does not exist
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity kind
        entity: &'static str,
        /// Identifier that failed to resolve
        id: String,
    },

    /// Empty required field, calendar-day violation or malformed filter
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Value is not part of the roster's value set
    #[error("{value:?} is not a valid value (allowed: {allowed:?})")]
    InvalidValue {
        /// Submitted value
        value: String,
        /// Value set it was checked against
        allowed: Vec<String>,
    },

    /// Uniqueness violation
    #[error("conflict during {operation}: {constraint}")]
    Conflict {
        /// Operation that attempted the write
        operation: &'static str,
        /// Constraint that rejected it
        constraint: &'static str,
    },

    /// Persistence fault unrelated to domain rules
    #[error("storage failure during {operation}: {source}")]
    Storage {
        /// Operation that hit the fault
        operation: &'static str,
        /// Underlying store error
        #[source]
        source: StoreError,
    },

    /// Malformed identity claims
    #[error("claims error: {0}")]
    Claims(#[from] ClaimError),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl RosterError {
    /// Missing entity
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Rejected input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Value outside `allowed`
    pub fn invalid_value(value: impl Into<String>, allowed: &[String]) -> Self {
        Self::InvalidValue {
            value: value.into(),
            allowed: allowed.to_vec(),
        }
    }

    /// Check for a missing entity
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check for a uniqueness conflict
    #[inline]
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Check if a caller may retry unchanged.
    ///
    /// Only backend faults qualify; every other variant needs corrected
    /// input. The core itself never retries.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Storage {
                source: StoreError::Backend(_),
                ..
            }
        )
    }
}

/// Attach the failing operation to a store result
pub(crate) trait StoreContext<T> {
    fn context(self, operation: &'static str) -> Result<T, RosterError>;
}

impl<T> StoreContext<T> for Result<T, StoreError> {
    fn context(self, operation: &'static str) -> Result<T, RosterError> {
        self.map_err(|source| match source {
            StoreError::NotFound { entity, id } | StoreError::ForeignKey { entity, id } => {
                RosterError::NotFound { entity, id }
            }
            StoreError::UniqueViolation { constraint } => RosterError::Conflict {
                operation,
                constraint,
            },
            StoreError::CheckViolation { constraint } => {
                RosterError::InvalidInput(format!("{operation}: {constraint} exceeded"))
            }
            source @ StoreError::Backend(_) => RosterError::Storage { operation, source },
        })
    }
}

/// Result alias for service operations
pub type RosterResult<T> = Result<T, RosterError>;

#[cfg(test)]
mod tests {
    use super::*;
    use roster_store::constraints;

    #[test]
    fn unique_violation_maps_to_conflict() {
        let result: Result<(), StoreError> = Err(StoreError::UniqueViolation {
            constraint: constraints::ANSWER_KEY,
        });
        let err = result.context("create answer").unwrap_err();
        assert!(err.is_conflict());
        assert!(err.to_string().contains("create answer"));
    }

    #[test]
    fn foreign_key_maps_to_not_found() {
        let result: Result<(), StoreError> = Err(StoreError::foreign_key("member", "01H"));
        let err = result.context("create answer").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn check_violation_maps_to_invalid_input() {
        let result: Result<(), StoreError> = Err(StoreError::CheckViolation {
            constraint: constraints::SHIFT_ORDER_RANGE,
        });
        let err = result.context("create shift").unwrap_err();
        assert!(matches!(err, RosterError::InvalidInput(ref m) if m.contains("create shift")));
        assert!(!err.is_retryable());
    }

    #[test]
    fn only_backend_faults_are_retryable() {
        let backend: Result<(), StoreError> = Err(StoreError::Backend("io".into()));
        assert!(backend.context("finalize roster").unwrap_err().is_retryable());
        assert!(!RosterError::invalid_input("name is required").is_retryable());
        assert!(!RosterError::not_found("roster", "x").is_retryable());
    }
}
