//! Store error types

/// Errors raised by an [`EntityStore`](crate::EntityStore) backend
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Row to update does not exist
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity kind
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// A uniqueness constraint rejected the write
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation {
        /// Constraint name
        constraint: &'static str,
    },

    /// A value fell outside the range a column admits
    #[error("check constraint violated: {constraint}")]
    CheckViolation {
        /// Constraint name
        constraint: &'static str,
    },

    /// A referenced parent row does not exist
    #[error("foreign key violated: {entity} {id} does not exist")]
    ForeignKey {
        /// Referenced entity kind
        entity: &'static str,
        /// Referenced identifier
        id: String,
    },

    /// Backend fault unrelated to domain rules
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Missing row
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Missing parent row
    pub fn foreign_key(entity: &'static str, id: impl ToString) -> Self {
        Self::ForeignKey {
            entity,
            id: id.to_string(),
        }
    }

    /// Check for a uniqueness violation
    #[inline]
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation { .. })
    }
}

/// Result alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Constraint names reported in [`StoreError::UniqueViolation`]
pub mod constraints {
    /// `organizations.name`
    pub const ORGANIZATION_NAME: &str = "organization_name";
    /// `members.external_id`
    pub const MEMBER_EXTERNAL_ID: &str = "member_external_id";
    /// `(shifts.roster_id, shifts.order)`
    pub const SHIFT_ORDER: &str = "shift_roster_order";
    /// `shifts.order` has no successor for the next appended shift
    pub const SHIFT_ORDER_RANGE: &str = "shift_order_range";
    /// `(answers.member_id, answers.roster_id, answers.shift_id)`
    pub const ANSWER_KEY: &str = "answer_member_roster_shift";
    /// `(assignments.roster_id, assignments.shift_id)`
    pub const ASSIGNMENT_SHIFT: &str = "assignment_roster_shift";
    /// `(preferences.member_id, preferences.template_shift_id)`
    pub const PREFERENCE_KEY: &str = "preference_member_template_shift";
}
