//! Where - Declarative where-clause evaluator for in-memory record collections.
//!
//! An [`Expression`] describes which records to keep. It maps field names to
//! literals, typed operator sets or custom predicates, and can fold in the
//! logical combinators `$AND`, `$OR` and `$NOT`. Expressions are built with a
//! fluent API or parsed from JSON.
//!
//! # Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use standout_where::{Expression, Operators, Record};
//!
//! let people: Vec<Record> = serde_json::from_value(json!([
//!     {"name": "Alice", "age": 30, "tags": ["admin"]},
//!     {"name": "Bob", "age": 25, "tags": []},
//!     {"name": "Charlie", "age": 35, "tags": ["ops", "admin"]},
//! ]))
//! .unwrap();
//!
//! // From JSON
//! let expr = Expression::from_json(&json!({
//!     "tags": {"includesSome": ["admin"]},
//!     "$NOT": {"name": {"startsWith": "a", "caseInsensitive": true}},
//! }))
//! .unwrap();
//! let results = expr.filter(&people).unwrap();
//! assert_eq!(results.len(), 1);
//!
//! // Or with the builder
//! let expr = Expression::new()
//!     .field("age", Operators::new().greater_than_or_equal(30))
//!     .field("tags", Operators::new().length(Operators::new().greater_than(1)));
//! assert_eq!(expr.position(&people).unwrap(), Some(2));
//! ```
//!
//! # Evaluation Semantics
//!
//! A record matches when every field predicate holds, after which the
//! combinators fold into one accumulator in a fixed order:
//!
//! ```text
//! acc = (every field predicate holds)
//! acc = acc ∧ ¬(every $NOT operand matches)
//! acc = acc ∧ (every $AND operand matches)
//! acc = acc ∧ (some $OR operand matches)     $OR given a list
//! acc = acc ∨ ($OR operand matches)          $OR given one expression
//! ```
//!
//! A field failure short-circuits the combinators. A single `$OR` operand is
//! never evaluated when the accumulator is already true, so it only widens
//! an expression whose other parts rejected the record. That only happens
//! when the rejection came from a combinator, never from a field.
//!
//! # Field Types and Operators
//!
//! The field value's own type picks one category. Operators of other
//! categories are ignored rather than failing the match.
//!
//! | Category | Values | Operators |
//! |----------|--------|-----------|
//! | Generic | everything | `equals`, `notEquals` |
//! | String | strings | `includes`, `startsWith`, `endsWith`, `caseInsensitive`, `matches` |
//! | Numerical | numbers, timestamps | `greaterThan`, `greaterThanOrEqual`, `lessThan`, `lessThanOrEqual` |
//! | Array | arrays | `includesEvery`, `includesSome`, `includesNone`, `length` |
//!
//! Equality is strict: no coercion between strings, numbers and timestamps.
//! Ordering operators compare timestamps as epoch milliseconds, so they can be
//! bounded by plain numbers.
//!
//! # Errors
//!
//! Malformed expressions are rejected before any record is evaluated, with a
//! [`WhereError`]. Errors from custom predicates abort the scan and are passed
//! through as [`WhereError::Predicate`].
//!
//! # Logging
//!
//! The crate logs through the [`log`] facade: `debug` for scan progress and
//! rejected expressions, `trace` for operators ignored by category.

mod error;
mod expression;
mod filter;
mod op;
mod operators;
mod options;
mod parse;
mod predicate;
mod record;
mod value;

// Re-export public API
pub use error::{BoxError, Result, WhereError};
pub use expression::{Combinators, Expression, FieldPredicate, Operand};
pub use filter::filter;
pub use op::{Combinator, Op};
pub use operators::Operators;
pub use options::{Options, DEFAULT_MAX_DEPTH};
pub use predicate::{FieldContext, Predicate};
pub use record::Record;
pub use value::{Category, Number, Numeric, Timestamp, Value};
