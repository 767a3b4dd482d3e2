//! JSON wire format for expressions.
//!
//! ```text
//! {
//!   "name": { "startsWith": "A", "caseInsensitive": true },
//!   "active": true,
//!   "$OR": [ { "age": { "greaterThan": 30 } }, { "tags": { "includesSome": ["admin"] } } ]
//! }
//! ```
//!
//! An object under a field is an operator set; any other value is a literal.
//! `null` on an operator other than `equals` / `notEquals` means the operator
//! is not set.

use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use serde_json::Value as Json;

use crate::error::{Result, WhereError};
use crate::expression::{Expression, FieldPredicate, Operand};
use crate::op::{self, Combinator, Op};
use crate::operators::Operators;
use crate::options::Options;
use crate::record::Record;
use crate::value::{Number, Numeric, Value};

/// Returns the JSON type name of a value, for error messages.
pub(crate) fn json_type(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

impl Expression {
    /// Parses an expression from JSON.
    ///
    /// # Example
    ///
    /// ```
    /// use serde_json::json;
    /// use standout_where::{Expression, Record};
    ///
    /// let expr = Expression::from_json(&json!({"age": {"greaterThanOrEqual": 18}})).unwrap();
    /// let data = vec![Record::new().with("age", 17), Record::new().with("age", 42)];
    ///
    /// assert_eq!(expr.position(&data).unwrap(), Some(1));
    /// ```
    pub fn from_json(json: &Json) -> Result<Self> {
        Expression::from_json_with(json, &Options::default())
    }

    /// Parses an expression from JSON with an explicit nesting limit.
    pub fn from_json_with(json: &Json, options: &Options) -> Result<Self> {
        let parser = Parser {
            max_depth: options.max_depth,
        };
        parser.expression(json, 0).inspect_err(|err| {
            log::debug!("rejected expression: {err}");
        })
    }
}

impl FromStr for Expression {
    type Err = WhereError;

    fn from_str(s: &str) -> Result<Self> {
        let json: Json = serde_json::from_str(s)?;
        Expression::from_json(&json)
    }
}

impl<'de> Deserialize<'de> for Expression {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let json = Json::deserialize(deserializer)?;
        Expression::from_json(&json).map_err(serde::de::Error::custom)
    }
}

/// Depth accounting follows `Expression::validate`.
struct Parser {
    max_depth: usize,
}

impl Parser {
    fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            return Err(WhereError::DepthExceeded {
                max: self.max_depth,
            });
        }
        Ok(())
    }

    fn expression(&self, json: &Json, depth: usize) -> Result<Expression> {
        self.check_depth(depth)?;
        let map = json.as_object().ok_or_else(|| WhereError::NotAnObject {
            what: "expression",
            found: json_type(json),
        })?;

        let mut expr = Expression::new();
        for (key, value) in map {
            if let Some(combinator) = Combinator::from_key(key) {
                let operand = self.operand(combinator, value, depth + 1)?;
                expr.combinators.set(combinator, operand);
            } else if op::is_reserved(key) {
                return Err(WhereError::ReservedFieldName { name: key.clone() });
            } else {
                let predicate = self.field(value, depth + 1)?;
                expr.fields.insert(key.clone(), predicate);
            }
        }
        Ok(expr)
    }

    fn operand(&self, combinator: Combinator, json: &Json, depth: usize) -> Result<Operand> {
        let malformed = |found: &Json| WhereError::MalformedCombinator {
            combinator: combinator.as_str(),
            found: json_type(found),
        };

        match json {
            Json::Object(_) => Ok(Operand::Single(Box::new(self.expression(json, depth)?))),
            Json::Array(items) => items
                .iter()
                .map(|item| match item {
                    Json::Object(_) => self.expression(item, depth),
                    other => Err(malformed(other)),
                })
                .collect::<Result<Vec<_>>>()
                .map(Operand::Many),
            other => Err(malformed(other)),
        }
    }

    fn field(&self, json: &Json, depth: usize) -> Result<FieldPredicate> {
        match json {
            Json::Object(_) => Ok(FieldPredicate::Operators(self.operators(json, depth)?)),
            literal => Ok(FieldPredicate::Literal(self.literal(literal, depth)?)),
        }
    }

    /// Converts a literal, counting each nested array or object as a level.
    fn literal(&self, json: &Json, depth: usize) -> Result<Value> {
        self.check_depth(depth)?;
        let value = match json {
            Json::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.literal(item, depth + 1))
                    .collect::<Result<_>>()?,
            ),
            Json::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, item)| Ok((key.clone(), self.literal(item, depth + 1)?)))
                    .collect::<Result<Record>>()?,
            ),
            scalar => Value::from(scalar.clone()),
        };
        Ok(value)
    }

    fn operators(&self, json: &Json, depth: usize) -> Result<Operators> {
        self.check_depth(depth)?;
        let map = json.as_object().ok_or_else(|| WhereError::NotAnObject {
            what: "operator set",
            found: json_type(json),
        })?;

        let mut ops = Operators::new();
        for (key, operand) in map {
            if let Some(combinator) = Combinator::from_key(key) {
                let operand = self.operand(combinator, operand, depth + 1)?;
                ops.combinators.set(combinator, operand);
                continue;
            }
            let op = Op::from_name(key)
                .ok_or_else(|| WhereError::UnknownOperator { name: key.clone() })?;
            if operand.is_null() && !matches!(op, Op::Equals | Op::NotEquals) {
                continue;
            }
            ops = self.operator(ops, op, operand, depth)?;
        }
        Ok(ops)
    }

    /// Adds one operator to `ops`, checking the operand's shape.
    fn operator(&self, ops: Operators, op: Op, operand: &Json, depth: usize) -> Result<Operators> {
        let invalid = |expected: &'static str| WhereError::InvalidOperand {
            op,
            expected,
            found: json_type(operand),
        };
        let string = || {
            operand
                .as_str()
                .map(str::to_owned)
                .ok_or_else(|| invalid("string"))
        };
        let number = || {
            operand
                .as_number()
                .map(|n| Numeric::from(Number::from(n)))
                .ok_or_else(|| invalid("number"))
        };
        let array = || match operand {
            Json::Array(items) => items
                .iter()
                .map(|item| self.literal(item, depth + 1))
                .collect::<Result<Vec<_>>>(),
            _ => Err(invalid("array")),
        };

        let ops = match op {
            Op::Equals => ops.equals(self.literal(operand, depth + 1)?),
            Op::NotEquals => ops.not_equals(self.literal(operand, depth + 1)?),
            Op::Includes => ops.includes(string()?),
            Op::StartsWith => ops.starts_with(string()?),
            Op::EndsWith => ops.ends_with(string()?),
            Op::CaseInsensitive => {
                ops.case_insensitive(operand.as_bool().ok_or_else(|| invalid("boolean"))?)
            }
            Op::Matches => ops.matches(&string()?)?,
            Op::GreaterThan => ops.greater_than(number()?),
            Op::GreaterThanOrEqual => ops.greater_than_or_equal(number()?),
            Op::LessThan => ops.less_than(number()?),
            Op::LessThanOrEqual => ops.less_than_or_equal(number()?),
            Op::IncludesEvery => ops.includes_every(array()?),
            Op::IncludesSome => ops.includes_some(array()?),
            Op::IncludesNone => ops.includes_none(array()?),
            Op::Length => {
                if !operand.is_object() {
                    return Err(invalid("object"));
                }
                ops.length(self.operators(operand, depth + 1)?)
            }
        };
        Ok(ops)
    }
}
