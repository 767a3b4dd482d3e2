//! Custom predicate functions.
//!
//! A [`Predicate`] is an opaque caller-supplied test attached to a field. It
//! receives the field value together with the record, its position and the
//! whole dataset, so it can look at neighboring records.

use std::fmt;
use std::sync::Arc;

use crate::error::BoxError;
use crate::record::Record;
use crate::value::Value;

/// Everything a custom predicate can inspect.
#[derive(Debug, Clone, Copy)]
pub struct FieldContext<'a> {
    /// Name of the field the predicate is attached to.
    pub field: &'a str,
    /// Field value, or `None` if the record lacks the field.
    pub value: Option<&'a Value>,
    /// The record being evaluated.
    pub record: &'a Record,
    /// Position of the record in the dataset.
    pub index: usize,
    /// The whole dataset.
    pub dataset: &'a [Record],
}

type PredicateFn = dyn Fn(&FieldContext<'_>) -> Result<bool, BoxError> + Send + Sync;

/// Caller-supplied field test.
///
/// The evaluator calls a predicate exactly once per evaluation of the field
/// key it is attached to. Calls are never cached or retried, and errors are
/// passed through to the caller.
///
/// # Example
///
/// ```
/// use standout_where::{Expression, Predicate, Record};
///
/// let data = vec![
///     Record::new().with("score", 10),
///     Record::new().with("score", 12),
///     Record::new().with("score", 11),
/// ];
///
/// // Keep records whose score went up since the previous record
/// let rising = Predicate::new(|ctx| {
///     let previous = ctx.index.checked_sub(1).and_then(|i| ctx.dataset[i].get(ctx.field));
///     match (previous.and_then(|v| v.as_number()), ctx.value.and_then(|v| v.as_number())) {
///         (Some(before), Some(now)) => now > before,
///         _ => false,
///     }
/// });
///
/// let expr = Expression::new().field("score", rising);
/// let results = expr.filter(&data).unwrap();
/// assert_eq!(results.len(), 1);
/// ```
#[derive(Clone)]
pub struct Predicate(Arc<PredicateFn>);

impl Predicate {
    /// Wraps an infallible predicate.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&FieldContext<'_>) -> bool + Send + Sync + 'static,
    {
        let inner = move |ctx: &FieldContext<'_>| -> Result<bool, BoxError> { Ok(f(ctx)) };
        Predicate(Arc::new(inner))
    }

    /// Wraps a fallible predicate. Its errors abort the evaluation.
    pub fn try_new<F, E>(f: F) -> Self
    where
        F: Fn(&FieldContext<'_>) -> Result<bool, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        let inner =
            move |ctx: &FieldContext<'_>| -> Result<bool, BoxError> { f(ctx).map_err(Into::into) };
        Predicate(Arc::new(inner))
    }

    /// Invokes the predicate.
    pub fn call(&self, ctx: &FieldContext<'_>) -> Result<bool, BoxError> {
        (self.0)(ctx)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}
