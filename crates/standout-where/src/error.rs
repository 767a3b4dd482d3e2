//! Error types for the where crate.

use thiserror::Error;

use crate::op::Op;

/// Boxed error returned by fallible custom predicates.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur when building, parsing or evaluating expressions.
#[derive(Debug, Error)]
pub enum WhereError {
    /// Invalid regular expression pattern.
    #[error("invalid regex pattern: {0}")]
    InvalidRegex(#[from] regex::Error),

    /// Expression text is not valid JSON.
    #[error("invalid expression JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A JSON value that must be an object was something else.
    #[error("{what} must be an object, got {found}")]
    NotAnObject {
        what: &'static str,
        found: &'static str,
    },

    /// A combinator operand is neither an expression nor a list of expressions.
    #[error("{combinator} operand must be an expression or a list of expressions, got {found}")]
    MalformedCombinator {
        combinator: &'static str,
        found: &'static str,
    },

    /// Operator-set key that names no operator of any category.
    #[error("unknown operator '{name}'")]
    UnknownOperator { name: String },

    /// Operand shape does not fit the operator.
    #[error("operator '{op}' expects {expected}, got {found}")]
    InvalidOperand {
        op: Op,
        expected: &'static str,
        found: &'static str,
    },

    /// Field names starting with `$` collide with combinator keys.
    #[error("field name '{name}' is reserved: names starting with '$' are combinator keys")]
    ReservedFieldName { name: String },

    /// Expression nesting is deeper than the configured limit.
    #[error("expression nesting exceeds maximum depth of {max}")]
    DepthExceeded { max: usize },

    /// A custom predicate failed.
    #[error("predicate on field '{field}' failed: {source}")]
    Predicate {
        field: String,
        #[source]
        source: BoxError,
    },
}

/// Result type for where operations.
pub type Result<T> = std::result::Result<T, WhereError>;
