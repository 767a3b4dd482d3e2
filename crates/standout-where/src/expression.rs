//! Record-level filter expressions.
//!
//! An [`Expression`] conjoins field predicates and optionally folds in the
//! three logical combinators. Operator sets attached to a field can carry
//! combinators of their own, which evaluate whole sub-expressions against the
//! same record, so expressions and operator sets are mutually recursive.
//!
//! Evaluation of one record:
//!
//! ```text
//! acc = true
//! for each field key, in insertion order:
//!     if the field predicate fails: return false
//! acc = acc ∧ ¬(every $NOT operand matches)
//! acc = acc ∧ (every $AND operand matches)
//! acc = acc ∧ (some $OR operand matches)     if $OR is a list
//! acc = acc ∨ ($OR operand matches)          if $OR is a single expression
//! return acc
//! ```

use indexmap::IndexMap;

use crate::error::{Result, WhereError};
use crate::op::{self, Combinator};
use crate::operators::Operators;
use crate::options::Options;
use crate::predicate::{FieldContext, Predicate};
use crate::record::Record;
use crate::value::{Number, Timestamp, Value};

/// A where clause: conjoined field predicates plus optional combinators.
///
/// # Example
///
/// ```
/// use standout_where::{Expression, Operators, Record};
///
/// let people = vec![
///     Record::new().with("name", "Alice").with("age", 30),
///     Record::new().with("name", "Bob").with("age", 25),
///     Record::new().with("name", "Charlie").with("age", 35),
/// ];
///
/// let expr = Expression::new().or(vec![
///     Expression::new().field("name", "Alice"),
///     Expression::new().field("age", Operators::new().greater_than(30)),
/// ]);
///
/// let results = expr.filter(&people).unwrap();
/// assert_eq!(results.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Expression {
    pub(crate) fields: IndexMap<String, FieldPredicate>,
    pub(crate) combinators: Combinators,
}

impl Expression {
    /// Creates an empty expression. An empty expression matches every record.
    pub fn new() -> Self {
        Expression::default()
    }

    /// Attaches a predicate to a field.
    ///
    /// Setting the same field twice replaces the earlier predicate. Field names
    /// starting with `$` are rejected when the expression is validated.
    pub fn field(mut self, name: impl Into<String>, predicate: impl Into<FieldPredicate>) -> Self {
        self.fields.insert(name.into(), predicate.into());
        self
    }

    /// Attaches a custom predicate function to a field.
    pub fn predicate<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&FieldContext<'_>) -> bool + Send + Sync + 'static,
    {
        self.field(name, Predicate::new(f))
    }

    /// Sets the `$AND` operand.
    pub fn and(mut self, operand: impl Into<Operand>) -> Self {
        self.combinators.set(Combinator::And, operand.into());
        self
    }

    /// Sets the `$OR` operand.
    ///
    /// A list requires at least one member to match. A single expression is
    /// disjoined with the result so far instead.
    pub fn or(mut self, operand: impl Into<Operand>) -> Self {
        self.combinators.set(Combinator::Or, operand.into());
        self
    }

    /// Sets the `$NOT` operand.
    ///
    /// For a list, the record is rejected only if every member matches.
    pub fn not(mut self, operand: impl Into<Operand>) -> Self {
        self.combinators.set(Combinator::Not, operand.into());
        self
    }

    /// Iterates over field predicates in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldPredicate)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the combinators of this expression.
    pub fn combinators(&self) -> &Combinators {
        &self.combinators
    }

    /// Returns `true` if this expression has no fields and no combinators.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.combinators.is_empty()
    }

    /// Checks the expression before any record is evaluated.
    ///
    /// Rejects reserved field names and nesting deeper than
    /// [`Options::max_depth`].
    pub fn validate(&self, options: &Options) -> Result<()> {
        self.validate_at(0, options).inspect_err(|err| {
            log::debug!("rejected expression: {err}");
        })
    }

    pub(crate) fn validate_at(&self, depth: usize, options: &Options) -> Result<()> {
        if depth > options.max_depth {
            return Err(WhereError::DepthExceeded {
                max: options.max_depth,
            });
        }
        for (name, predicate) in &self.fields {
            if op::is_reserved(name) {
                return Err(WhereError::ReservedFieldName { name: name.clone() });
            }
            if let FieldPredicate::Operators(ops) = predicate {
                ops.validate_at(depth + 1, options)?;
            }
        }
        self.combinators.validate_at(depth + 1, options)
    }

    /// Tests the record at `index` of `dataset`.
    ///
    /// Returns `Ok(false)` if `index` is out of bounds.
    pub fn matches(&self, dataset: &[Record], index: usize) -> Result<bool> {
        self.matches_with(dataset, index, &Options::default())
    }

    /// Tests the record at `index` of `dataset` with explicit options.
    pub fn matches_with(&self, dataset: &[Record], index: usize, options: &Options) -> Result<bool> {
        self.validate(options)?;
        match Scope::new(dataset, index) {
            Some(scope) => self.evaluate(&scope),
            None => Ok(false),
        }
    }

    pub(crate) fn evaluate(&self, scope: &Scope<'_>) -> Result<bool> {
        for (name, predicate) in &self.fields {
            let value = scope.record.get(name);
            if !predicate.evaluate(name, value, scope)? {
                return Ok(false);
            }
        }
        self.combinators.apply(true, scope)
    }
}

/// The matching rule attached to one field.
#[derive(Debug, Clone)]
pub enum FieldPredicate {
    /// Strict equality with the field value. An absent field never matches.
    Literal(Value),
    /// Custom function, called with the field value and its context.
    Predicate(Predicate),
    /// Typed operator set, selected by the field value's category.
    Operators(Operators),
}

impl FieldPredicate {
    fn evaluate(&self, field: &str, value: Option<&Value>, scope: &Scope<'_>) -> Result<bool> {
        match self {
            FieldPredicate::Literal(expected) => Ok(value.is_some_and(|v| v.strict_eq(expected))),
            FieldPredicate::Predicate(predicate) => {
                let ctx = FieldContext {
                    field,
                    value,
                    record: scope.record,
                    index: scope.index,
                    dataset: scope.dataset,
                };
                predicate.call(&ctx).map_err(|source| {
                    log::debug!("predicate on field '{field}' failed at index {}: {source}", scope.index);
                    WhereError::Predicate {
                        field: field.to_string(),
                        source,
                    }
                })
            }
            FieldPredicate::Operators(ops) => ops.evaluate(value, scope),
        }
    }
}

impl From<Operators> for FieldPredicate {
    fn from(ops: Operators) -> Self {
        FieldPredicate::Operators(ops)
    }
}

impl From<Predicate> for FieldPredicate {
    fn from(predicate: Predicate) -> Self {
        FieldPredicate::Predicate(predicate)
    }
}

macro_rules! literal_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for FieldPredicate {
                fn from(value: $ty) -> Self {
                    FieldPredicate::Literal(Value::from(value))
                }
            }
        )*
    };
}

literal_from!(
    Value, Number, Timestamp, Record, bool, &str, String, i32, i64, i128, u32, u64, f64, usize,
);

/// Operand of a combinator: one sub-expression or a list of them.
#[derive(Debug, Clone)]
pub enum Operand {
    /// A single sub-expression.
    Single(Box<Expression>),
    /// An ordered list of sub-expressions.
    Many(Vec<Expression>),
}

impl Operand {
    /// Returns the sub-expressions, one for `Single`.
    pub fn expressions(&self) -> &[Expression] {
        match self {
            Operand::Single(expr) => std::slice::from_ref(&**expr),
            Operand::Many(exprs) => exprs,
        }
    }

    /// `true` if every sub-expression matches. Stops at the first miss.
    fn all_match(&self, scope: &Scope<'_>) -> Result<bool> {
        for expr in self.expressions() {
            if !expr.evaluate(scope)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// `true` if some sub-expression matches. Stops at the first hit.
    fn any_match(&self, scope: &Scope<'_>) -> Result<bool> {
        for expr in self.expressions() {
            if expr.evaluate(scope)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl From<Expression> for Operand {
    fn from(expr: Expression) -> Self {
        Operand::Single(Box::new(expr))
    }
}

impl From<Vec<Expression>> for Operand {
    fn from(exprs: Vec<Expression>) -> Self {
        Operand::Many(exprs)
    }
}

impl<const N: usize> From<[Expression; N]> for Operand {
    fn from(exprs: [Expression; N]) -> Self {
        Operand::Many(exprs.into())
    }
}

/// The `$NOT`, `$AND` and `$OR` operands of an expression or operator set.
#[derive(Debug, Clone, Default)]
pub struct Combinators {
    not: Option<Operand>,
    and: Option<Operand>,
    or: Option<Operand>,
}

impl Combinators {
    /// Returns the operand of a combinator, if set.
    pub fn get(&self, combinator: Combinator) -> Option<&Operand> {
        match combinator {
            Combinator::Not => self.not.as_ref(),
            Combinator::And => self.and.as_ref(),
            Combinator::Or => self.or.as_ref(),
        }
    }

    pub(crate) fn set(&mut self, combinator: Combinator, operand: Operand) {
        let slot = match combinator {
            Combinator::Not => &mut self.not,
            Combinator::And => &mut self.and,
            Combinator::Or => &mut self.or,
        };
        *slot = Some(operand);
    }

    /// Returns the number of combinators set.
    pub fn len(&self) -> usize {
        [&self.not, &self.and, &self.or]
            .into_iter()
            .filter(|operand| operand.is_some())
            .count()
    }

    /// Returns `true` if no combinator is set.
    pub fn is_empty(&self) -> bool {
        self.not.is_none() && self.and.is_none() && self.or.is_none()
    }

    pub(crate) fn validate_at(&self, depth: usize, options: &Options) -> Result<()> {
        for operand in [&self.not, &self.and, &self.or].into_iter().flatten() {
            for expr in operand.expressions() {
                expr.validate_at(depth, options)?;
            }
        }
        Ok(())
    }

    /// Folds the combinators into `acc` in `$NOT`, `$AND`, `$OR` order.
    ///
    /// Operands are only evaluated when they can change `acc`.
    pub(crate) fn apply(&self, mut acc: bool, scope: &Scope<'_>) -> Result<bool> {
        if let Some(operand) = &self.not {
            acc = acc && !operand.all_match(scope)?;
        }
        if let Some(operand) = &self.and {
            acc = acc && operand.all_match(scope)?;
        }
        if let Some(operand) = &self.or {
            acc = match operand {
                Operand::Single(expr) => acc || expr.evaluate(scope)?,
                Operand::Many(_) => acc && operand.any_match(scope)?,
            };
        }
        Ok(acc)
    }
}

/// The record under evaluation and its place in the dataset.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Scope<'a> {
    pub(crate) dataset: &'a [Record],
    pub(crate) index: usize,
    pub(crate) record: &'a Record,
}

impl<'a> Scope<'a> {
    pub(crate) fn new(dataset: &'a [Record], index: usize) -> Option<Self> {
        dataset.get(index).map(|record| Scope {
            dataset,
            index,
            record,
        })
    }
}
