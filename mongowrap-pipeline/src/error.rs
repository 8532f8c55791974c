//! Validation errors raised by pipeline stage methods.

use thiserror::Error;

/// Result type for pipeline construction.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// A structurally invalid argument passed to a stage method.
///
/// These are raised before anything reaches the server. A stage method that
/// returns one of these leaves the builder's stages untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// `$skip` or `$limit` given a negative count.
    #[error("{stage} requires a non-negative value, got {value}")]
    Negative {
        /// Stage operator token.
        stage: &'static str,
        /// The rejected value.
        value: i64,
    },

    /// A sort direction other than `1` or `-1`.
    #[error("invalid sort direction {direction} for field '{field}' (expected 1 or -1)")]
    InvalidSortDirection {
        /// Field being sorted.
        field: String,
        /// The rejected direction.
        direction: i32,
    },

    /// `$sort` called without any `(field, direction)` pairs.
    #[error("$sort requires at least one (field, direction) pair")]
    EmptySort,

    /// The same field listed twice in one `$sort`.
    #[error("duplicate sort field '{0}'")]
    DuplicateSortField(String),

    /// An empty field name.
    #[error("empty field name in {stage} stage")]
    EmptyField {
        /// Stage operator token.
        stage: &'static str,
    },

    /// `$group` accumulators that try to redefine the group identifier.
    #[error("$group accumulators may not define '_id'; it is built from the group keys")]
    ReservedGroupField,
}

impl ValidationError {
    /// Create a negative-count error.
    pub fn negative(stage: &'static str, value: i64) -> Self {
        Self::Negative { stage, value }
    }

    /// Create an invalid sort direction error.
    pub fn invalid_sort_direction(field: impl Into<String>, direction: i32) -> Self {
        Self::InvalidSortDirection {
            field: field.into(),
            direction,
        }
    }

    /// Create an empty field error.
    pub fn empty_field(stage: &'static str) -> Self {
        Self::EmptyField { stage }
    }
}
