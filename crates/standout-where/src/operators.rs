//! Typed operator sets for field predicates.
//!
//! An [`Operators`] value holds every operator configured for one field, across
//! all categories. At evaluation time the field value's own variant selects a
//! single category, and only that category's operators (plus the generic
//! `equals` / `notEquals`) take part. The others are ignored, not failed.
//!
//! | Category | Operators |
//! |----------|-----------|
//! | Generic | `equals`, `notEquals` |
//! | String | generic + `includes`, `startsWith`, `endsWith`, `caseInsensitive`, `matches` |
//! | Numerical | generic + `greaterThan`, `greaterThanOrEqual`, `lessThan`, `lessThanOrEqual` |
//! | Array | generic + `includesEvery`, `includesSome`, `includesNone`, `length` |

use std::borrow::Cow;

use regex::Regex;

use crate::error::{Result, WhereError};
use crate::expression::{Combinators, Operand, Scope};
use crate::op::{Combinator, Op};
use crate::options::Options;
use crate::value::{Category, Numeric, Value};

/// Operator set attached to a field.
///
/// Every operator is optional and all configured ones must hold. Combinator
/// operands evaluate against the whole record, after the operators pass.
///
/// # Example
///
/// ```
/// use standout_where::{Expression, Operators, Record};
///
/// let data = vec![
///     Record::new().with("name", "Banana"),
///     Record::new().with("name", "cherry"),
/// ];
///
/// let expr = Expression::new().field(
///     "name",
///     Operators::new().case_insensitive(true).starts_with("B"),
/// );
///
/// assert_eq!(expr.count(&data).unwrap(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Operators {
    generic: GenericOps,
    string: StringOps,
    numerical: NumericalOps,
    array: ArrayOps,
    pub(crate) combinators: Combinators,
}

#[derive(Debug, Clone, Default)]
struct GenericOps {
    equals: Option<Value>,
    not_equals: Option<Value>,
}

#[derive(Debug, Clone, Default)]
struct StringOps {
    includes: Option<String>,
    starts_with: Option<String>,
    ends_with: Option<String>,
    case_insensitive: bool,
    matches: Option<Regex>,
}

#[derive(Debug, Clone, Copy, Default)]
struct NumericalOps {
    greater_than: Option<Numeric>,
    greater_than_or_equal: Option<Numeric>,
    less_than: Option<Numeric>,
    less_than_or_equal: Option<Numeric>,
}

#[derive(Debug, Clone, Default)]
struct ArrayOps {
    includes_every: Option<Vec<Value>>,
    includes_some: Option<Vec<Value>>,
    includes_none: Option<Vec<Value>>,
    length: Option<Box<Operators>>,
}

impl Operators {
    /// Creates an empty operator set. An empty set matches any value.
    pub fn new() -> Self {
        Operators::default()
    }

    // ========================================================================
    // Generic operators
    // ========================================================================

    /// Requires strict equality with `value`.
    pub fn equals(mut self, value: impl Into<Value>) -> Self {
        self.generic.equals = Some(value.into());
        self
    }

    /// Requires strict inequality with `value`.
    pub fn not_equals(mut self, value: impl Into<Value>) -> Self {
        self.generic.not_equals = Some(value.into());
        self
    }

    // ========================================================================
    // String operators
    // ========================================================================

    /// Requires the string to contain `needle`.
    pub fn includes(mut self, needle: impl Into<String>) -> Self {
        self.string.includes = Some(needle.into());
        self
    }

    /// Requires the string to start with `prefix`.
    pub fn starts_with(mut self, prefix: impl Into<String>) -> Self {
        self.string.starts_with = Some(prefix.into());
        self
    }

    /// Requires the string to end with `suffix`.
    pub fn ends_with(mut self, suffix: impl Into<String>) -> Self {
        self.string.ends_with = Some(suffix.into());
        self
    }

    /// Lower-cases the field value and every string operand before comparing,
    /// including `equals` and `notEquals`.
    pub fn case_insensitive(mut self, enabled: bool) -> Self {
        self.string.case_insensitive = enabled;
        self
    }

    /// Requires the string to match a regular expression.
    ///
    /// Returns an error if the pattern is invalid.
    pub fn matches(self, pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)?;
        Ok(self.regex(regex))
    }

    /// Requires the string to match an already compiled regular expression.
    pub fn regex(mut self, regex: Regex) -> Self {
        self.string.matches = Some(regex);
        self
    }

    // ========================================================================
    // Numerical operators
    // ========================================================================

    /// Requires the value to be greater than `bound`.
    pub fn greater_than(mut self, bound: impl Into<Numeric>) -> Self {
        self.numerical.greater_than = Some(bound.into());
        self
    }

    /// Requires the value to be greater than or equal to `bound`.
    pub fn greater_than_or_equal(mut self, bound: impl Into<Numeric>) -> Self {
        self.numerical.greater_than_or_equal = Some(bound.into());
        self
    }

    /// Requires the value to be less than `bound`.
    pub fn less_than(mut self, bound: impl Into<Numeric>) -> Self {
        self.numerical.less_than = Some(bound.into());
        self
    }

    /// Requires the value to be less than or equal to `bound`.
    pub fn less_than_or_equal(mut self, bound: impl Into<Numeric>) -> Self {
        self.numerical.less_than_or_equal = Some(bound.into());
        self
    }

    // ========================================================================
    // Array operators
    // ========================================================================

    /// Requires the array to contain every one of `values`.
    pub fn includes_every<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.array.includes_every = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Requires the array to contain at least one of `values`.
    pub fn includes_some<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.array.includes_some = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Requires the array to contain none of `values`.
    pub fn includes_none<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.array.includes_none = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Applies `ops` to the array's element count.
    ///
    /// The count is numerical, so only generic and numerical operators of
    /// `ops` take effect.
    pub fn length(mut self, ops: Operators) -> Self {
        self.array.length = Some(Box::new(ops));
        self
    }

    // ========================================================================
    // Combinators
    // ========================================================================

    /// Sets the `$AND` operand, evaluated against the whole record.
    pub fn and(mut self, operand: impl Into<Operand>) -> Self {
        self.combinators.set(Combinator::And, operand.into());
        self
    }

    /// Sets the `$OR` operand, evaluated against the whole record.
    pub fn or(mut self, operand: impl Into<Operand>) -> Self {
        self.combinators.set(Combinator::Or, operand.into());
        self
    }

    /// Sets the `$NOT` operand, evaluated against the whole record.
    pub fn not(mut self, operand: impl Into<Operand>) -> Self {
        self.combinators.set(Combinator::Not, operand.into());
        self
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Returns the configured operators, in [`Op::ALL`] order.
    pub fn configured(&self) -> Vec<Op> {
        [
            (self.generic.equals.is_some(), Op::Equals),
            (self.generic.not_equals.is_some(), Op::NotEquals),
            (self.string.includes.is_some(), Op::Includes),
            (self.string.starts_with.is_some(), Op::StartsWith),
            (self.string.ends_with.is_some(), Op::EndsWith),
            (self.string.case_insensitive, Op::CaseInsensitive),
            (self.string.matches.is_some(), Op::Matches),
            (self.numerical.greater_than.is_some(), Op::GreaterThan),
            (self.numerical.greater_than_or_equal.is_some(), Op::GreaterThanOrEqual),
            (self.numerical.less_than.is_some(), Op::LessThan),
            (self.numerical.less_than_or_equal.is_some(), Op::LessThanOrEqual),
            (self.array.includes_every.is_some(), Op::IncludesEvery),
            (self.array.includes_some.is_some(), Op::IncludesSome),
            (self.array.includes_none.is_some(), Op::IncludesNone),
            (self.array.length.is_some(), Op::Length),
        ]
        .into_iter()
        .filter_map(|(set, op)| set.then_some(op))
        .collect()
    }

    /// Returns the combinators of this operator set.
    pub fn combinators(&self) -> &Combinators {
        &self.combinators
    }

    /// Returns `true` if no operator and no combinator is configured.
    pub fn is_empty(&self) -> bool {
        self.configured().is_empty() && self.combinators.is_empty()
    }

    // ========================================================================
    // Evaluation
    // ========================================================================

    pub(crate) fn validate_at(&self, depth: usize, options: &Options) -> Result<()> {
        if depth > options.max_depth {
            return Err(WhereError::DepthExceeded {
                max: options.max_depth,
            });
        }
        if let Some(length) = &self.array.length {
            length.validate_at(depth + 1, options)?;
        }
        self.combinators.validate_at(depth + 1, options)
    }

    /// Evaluates the operator set against a possibly absent field value.
    pub(crate) fn evaluate(&self, value: Option<&Value>, scope: &Scope<'_>) -> Result<bool> {
        if log::log_enabled!(log::Level::Trace) {
            self.trace_ignored(Category::of(value));
        }

        let verdict = match value {
            Some(Value::String(s)) => self.string.evaluate(&self.generic, s),
            Some(Value::Number(n)) => {
                self.generic.evaluate(value) && self.numerical.evaluate(Numeric::Number(*n))
            }
            Some(Value::Timestamp(t)) => {
                self.generic.evaluate(value) && self.numerical.evaluate(Numeric::Timestamp(*t))
            }
            Some(Value::Array(items)) => {
                self.generic.evaluate(value) && self.array.evaluate(items, scope)?
            }
            Some(Value::Null | Value::Bool(_) | Value::Object(_)) | None => {
                self.generic.evaluate(value)
            }
        };

        if !verdict {
            return Ok(false);
        }
        self.combinators.apply(true, scope)
    }

    fn trace_ignored(&self, category: Category) {
        let ignored: Vec<&str> = self
            .configured()
            .into_iter()
            .filter(|op| !op.applies_to(category))
            .map(Op::as_str)
            .collect();
        if !ignored.is_empty() {
            log::trace!(
                "ignoring operators [{}] for {category} value",
                ignored.join(", ")
            );
        }
    }
}

impl GenericOps {
    fn evaluate(&self, value: Option<&Value>) -> bool {
        if let Some(expected) = &self.equals {
            if !value.is_some_and(|v| v.strict_eq(expected)) {
                return false;
            }
        }
        if let Some(unexpected) = &self.not_equals {
            if value.is_some_and(|v| v.strict_eq(unexpected)) {
                return false;
            }
        }
        true
    }
}

/// Lower-cases `s` when folding is on.
fn fold(s: &str, case_insensitive: bool) -> Cow<'_, str> {
    if case_insensitive {
        Cow::Owned(s.to_lowercase())
    } else {
        Cow::Borrowed(s)
    }
}

impl StringOps {
    /// Evaluates the string set, including the generic operators, on the
    /// folded value.
    fn evaluate(&self, generic: &GenericOps, value: &str) -> bool {
        let ci = self.case_insensitive;
        let folded = fold(value, ci);
        let value: &str = &folded;

        if let Some(expected) = &generic.equals {
            if !self.string_eq(value, expected) {
                return false;
            }
        }
        if let Some(unexpected) = &generic.not_equals {
            if self.string_eq(value, unexpected) {
                return false;
            }
        }
        if let Some(needle) = &self.includes {
            if !value.contains(&*fold(needle, ci)) {
                return false;
            }
        }
        if let Some(prefix) = &self.starts_with {
            if !value.starts_with(&*fold(prefix, ci)) {
                return false;
            }
        }
        if let Some(suffix) = &self.ends_with {
            if !value.ends_with(&*fold(suffix, ci)) {
                return false;
            }
        }
        if let Some(regex) = &self.matches {
            if !regex.is_match(value) {
                return false;
            }
        }
        true
    }

    /// Strict equality of a folded field value with an operand. Non-string
    /// operands never equal a string.
    fn string_eq(&self, folded: &str, operand: &Value) -> bool {
        match operand {
            Value::String(s) => *folded == *fold(s, self.case_insensitive),
            _ => false,
        }
    }
}

impl NumericalOps {
    fn evaluate(&self, value: Numeric) -> bool {
        let checks = [
            (self.greater_than, Op::GreaterThan),
            (self.greater_than_or_equal, Op::GreaterThanOrEqual),
            (self.less_than, Op::LessThan),
            (self.less_than_or_equal, Op::LessThanOrEqual),
        ];
        checks.into_iter().all(|(bound, op)| match bound {
            // NaN on either side compares as no match
            Some(bound) => value.compare(bound).is_some_and(|o| op.eval_ordering(o)),
            None => true,
        })
    }
}

impl ArrayOps {
    fn evaluate(&self, items: &[Value], scope: &Scope<'_>) -> Result<bool> {
        let contains = |needle: &Value| items.iter().any(|item| item.strict_eq(needle));

        if let Some(every) = &self.includes_every {
            if !every.iter().all(|v| contains(v)) {
                return Ok(false);
            }
        }
        if let Some(some) = &self.includes_some {
            if !some.iter().any(|v| contains(v)) {
                return Ok(false);
            }
        }
        if let Some(none) = &self.includes_none {
            if none.iter().any(|v| contains(v)) {
                return Ok(false);
            }
        }
        if let Some(length) = &self.length {
            let count = Value::from(items.len());
            if !length.evaluate(Some(&count), scope)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
