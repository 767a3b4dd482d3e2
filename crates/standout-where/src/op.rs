//! Operator and combinator names.
//!
//! The [`Op`] enum names every field-level operator, grouped by the value
//! [`Category`] it applies to. [`Combinator`] names the three logical keys.
//! Both carry the camelCase / `$UPPER` names used by the wire format.

use std::cmp::Ordering;
use std::fmt;

use crate::value::Category;

/// Field-level comparison operator.
///
/// Operators are grouped by the categories they support:
/// - **Generic**: `Equals`, `NotEquals` - work on every category
/// - **String**: `Includes`, `StartsWith`, `EndsWith`, `CaseInsensitive`, `Matches`
/// - **Numerical**: `GreaterThan`, `GreaterThanOrEqual`, `LessThan`, `LessThanOrEqual`
/// - **Array**: `IncludesEvery`, `IncludesSome`, `IncludesNone`, `Length`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    // Generic operators
    /// Strict equality.
    Equals,
    /// Strict inequality.
    NotEquals,

    // String operators
    /// String contains substring.
    Includes,
    /// String starts with prefix.
    StartsWith,
    /// String ends with suffix.
    EndsWith,
    /// Lower-case the field value and string operands before comparing.
    CaseInsensitive,
    /// String matches regular expression.
    Matches,

    // Numerical operators
    /// Greater than.
    GreaterThan,
    /// Greater than or equal.
    GreaterThanOrEqual,
    /// Less than.
    LessThan,
    /// Less than or equal.
    LessThanOrEqual,

    // Array operators
    /// Array contains every listed value.
    IncludesEvery,
    /// Array contains at least one listed value.
    IncludesSome,
    /// Array contains none of the listed values.
    IncludesNone,
    /// Numerical operators applied to the array length.
    Length,
}

impl Op {
    /// Every operator, in declaration order.
    pub const ALL: [Op; 15] = [
        Op::Equals,
        Op::NotEquals,
        Op::Includes,
        Op::StartsWith,
        Op::EndsWith,
        Op::CaseInsensitive,
        Op::Matches,
        Op::GreaterThan,
        Op::GreaterThanOrEqual,
        Op::LessThan,
        Op::LessThanOrEqual,
        Op::IncludesEvery,
        Op::IncludesSome,
        Op::IncludesNone,
        Op::Length,
    ];

    /// Returns the category this operator belongs to.
    pub fn category(self) -> Category {
        match self {
            Op::Equals | Op::NotEquals => Category::Generic,
            Op::Includes | Op::StartsWith | Op::EndsWith | Op::CaseInsensitive | Op::Matches => {
                Category::String
            }
            Op::GreaterThan | Op::GreaterThanOrEqual | Op::LessThan | Op::LessThanOrEqual => {
                Category::Numerical
            }
            Op::IncludesEvery | Op::IncludesSome | Op::IncludesNone | Op::Length => {
                Category::Array
            }
        }
    }

    /// Returns `true` if this operator is active for values of `category`.
    ///
    /// Generic operators are active for every category.
    pub fn applies_to(self, category: Category) -> bool {
        let own = self.category();
        own == Category::Generic || own == category
    }

    /// Evaluates an ordering operator given a comparison result.
    ///
    /// Returns `false` for operators that are not ordering-based.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            Op::GreaterThan => ordering == Ordering::Greater,
            Op::GreaterThanOrEqual => ordering != Ordering::Less,
            Op::LessThan => ordering == Ordering::Less,
            Op::LessThanOrEqual => ordering != Ordering::Greater,
            _ => false,
        }
    }

    /// Returns the wire name of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Equals => "equals",
            Op::NotEquals => "notEquals",
            Op::Includes => "includes",
            Op::StartsWith => "startsWith",
            Op::EndsWith => "endsWith",
            Op::CaseInsensitive => "caseInsensitive",
            Op::Matches => "matches",
            Op::GreaterThan => "greaterThan",
            Op::GreaterThanOrEqual => "greaterThanOrEqual",
            Op::LessThan => "lessThan",
            Op::LessThanOrEqual => "lessThanOrEqual",
            Op::IncludesEvery => "includesEvery",
            Op::IncludesSome => "includesSome",
            Op::IncludesNone => "includesNone",
            Op::Length => "length",
        }
    }

    /// Looks an operator up by its wire name.
    pub fn from_name(name: &str) -> Option<Op> {
        Op::ALL.into_iter().find(|op| op.as_str() == name)
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Logical combinator key.
///
/// Combinators fold into one accumulator in the fixed order of
/// [`Combinator::ORDER`], whatever order they were declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// `$NOT`
    Not,
    /// `$AND`
    And,
    /// `$OR`
    Or,
}

impl Combinator {
    /// Evaluation order.
    pub const ORDER: [Combinator; 3] = [Combinator::Not, Combinator::And, Combinator::Or];

    /// Returns the reserved key of this combinator.
    pub fn as_str(self) -> &'static str {
        match self {
            Combinator::Not => "$NOT",
            Combinator::And => "$AND",
            Combinator::Or => "$OR",
        }
    }

    /// Looks a combinator up by its reserved key.
    pub fn from_key(key: &str) -> Option<Combinator> {
        Combinator::ORDER.into_iter().find(|c| c.as_str() == key)
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returns `true` for field names that would be ambiguous with combinator keys.
pub(crate) fn is_reserved(name: &str) -> bool {
    name.starts_with('$')
}
