//! Runtime value types for field comparison.
//!
//! The [`Value`] enum is the runtime value of a record field. Its variant decides
//! the [`Category`] of operators that apply to it. Numbers and timestamps share
//! the numerical category and meet on a common axis through [`Numeric`].

use std::cmp::Ordering;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::record::Record;

/// Runtime category of a field value.
///
/// Checked in this fixed priority: string, numerical (numbers and timestamps),
/// array, and everything else as generic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// String values.
    String,
    /// Numbers of any width and timestamps.
    Numerical,
    /// Ordered lists of values.
    Array,
    /// Null, booleans, nested records, and absent fields.
    Generic,
}

impl Category {
    /// Returns the category of a possibly absent field value.
    ///
    /// An absent field is generic.
    pub fn of(value: Option<&Value>) -> Category {
        value.map_or(Category::Generic, Value::category)
    }

    /// Returns the display name of this category.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::String => "string",
            Category::Numerical => "numerical",
            Category::Array => "array",
            Category::Generic => "generic",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Runtime value of a record field.
///
/// Equality is strict: values of different variants are never equal, except
/// that `I64`, `U64` and `F64` numbers compare by numeric value. Timestamps are
/// not coerced to numbers for equality; only ordering operators normalize them.
///
/// # Example
///
/// ```
/// use standout_where::{Category, Number, Timestamp, Value};
///
/// assert_eq!(Value::from("Alice").category(), Category::String);
/// assert_eq!(Value::from(30).category(), Category::Numerical);
/// assert_eq!(Value::Timestamp(Timestamp(0)).category(), Category::Numerical);
///
/// assert_eq!(Value::from(5i64), Value::from(5.0f64));
/// assert_ne!(Value::Timestamp(Timestamp(5)), Value::Number(Number::I64(5)));
/// ```
#[derive(Debug, Clone)]
pub enum Value {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Number(Number),
    /// Timestamp value (milliseconds since Unix epoch).
    Timestamp(Timestamp),
    /// String value.
    String(String),
    /// Ordered list of values.
    Array(Vec<Value>),
    /// Nested record.
    Object(Record),
}

impl Value {
    /// Returns `true` if this is a `Null` value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` if this is a `String` value.
    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Returns `true` if this is a `Number` value.
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    /// Returns `true` if this is a `Timestamp` value.
    pub fn is_timestamp(&self) -> bool {
        matches!(self, Value::Timestamp(_))
    }

    /// Returns `true` if this is an `Array` value.
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Returns `true` if this is an `Object` value.
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// Returns `true` if this is a `Bool` value.
    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    /// Extracts the string value, if present.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extracts the number value, if present.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Extracts the timestamp value, if present.
    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Extracts the array elements, if present.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Extracts the nested record, if present.
    pub fn as_object(&self) -> Option<&Record> {
        match self {
            Value::Object(record) => Some(record),
            _ => None,
        }
    }

    /// Extracts the boolean value, if present.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extracts a number or timestamp for ordering comparisons.
    pub fn as_numeric(&self) -> Option<Numeric> {
        match self {
            Value::Number(n) => Some(Numeric::Number(*n)),
            Value::Timestamp(t) => Some(Numeric::Timestamp(*t)),
            _ => None,
        }
    }

    /// Returns the runtime category that selects this value's operator set.
    pub fn category(&self) -> Category {
        match self {
            Value::String(_) => Category::String,
            Value::Number(_) | Value::Timestamp(_) => Category::Numerical,
            Value::Array(_) => Category::Array,
            Value::Null | Value::Bool(_) | Value::Object(_) => Category::Generic,
        }
    }

    /// Returns a short name for the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Timestamp(_) => "timestamp",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Strict equality with no cross-variant coercion.
    ///
    /// Arrays and records compare structurally.
    pub fn strict_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a.strict_eq(*b),
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.strict_eq(y))
            }
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.strict_eq(other)
    }
}

/// Numeric value supporting all common numeric types.
///
/// Numbers are stored in one of four variants to preserve precision:
/// - `I64` for signed integers
/// - `U64` for unsigned integers
/// - `F64` for floating point
/// - `BigInt` for integers wider than 64 bits
///
/// Integer variants compare exactly with each other. Comparisons involving
/// `F64` convert both sides to f64.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
    /// Wide integer.
    BigInt(i128),
}

impl Number {
    /// Converts the number to f64 for comparison.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
            Number::BigInt(n) => n as f64,
        }
    }

    fn as_i128(self) -> Option<i128> {
        match self {
            Number::I64(n) => Some(n as i128),
            Number::U64(n) => Some(n as i128),
            Number::BigInt(n) => Some(n),
            Number::F64(_) => None,
        }
    }

    /// Compares two numbers, handling mixed types.
    ///
    /// Returns `None` when either side is NaN.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self.as_i128(), other.as_i128()) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }

    /// Strict equality: `BigInt` only equals `BigInt`, the other variants
    /// compare by numeric value.
    pub fn strict_eq(self, other: Number) -> bool {
        match (self, other) {
            (Number::BigInt(a), Number::BigInt(b)) => a == b,
            (Number::BigInt(_), _) | (_, Number::BigInt(_)) => false,
            _ => self.compare(other) == Some(Ordering::Equal),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

/// Conversions from primitive types, into `Number`, `Numeric` and `Value`.
macro_rules! from_primitive {
    ($variant:ident as $wide:ty: $($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Number {
                #[allow(clippy::unnecessary_cast)]
                fn from(n: $ty) -> Self {
                    Number::$variant(n as $wide)
                }
            }

            impl From<$ty> for Numeric {
                fn from(n: $ty) -> Self {
                    Numeric::Number(Number::from(n))
                }
            }

            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::Number(Number::from(n))
                }
            }
        )*
    };
}

from_primitive!(I64 as i64: i8, i16, i32, i64, isize);
from_primitive!(U64 as u64: u8, u16, u32, u64, usize);
from_primitive!(F64 as f64: f32, f64);
from_primitive!(BigInt as i128: i128);

impl From<&serde_json::Number> for Number {
    fn from(n: &serde_json::Number) -> Self {
        if let Some(i) = n.as_i64() {
            Number::I64(i)
        } else if let Some(u) = n.as_u64() {
            Number::U64(u)
        } else {
            Number::F64(n.as_f64().unwrap_or(f64::NAN))
        }
    }
}

/// Timestamp value represented as milliseconds since Unix epoch.
///
/// # Example
///
/// ```
/// use standout_where::Timestamp;
///
/// let ts = Timestamp(1706500000000); // 2024-01-29 approx
///
/// assert!(Timestamp(1000) < Timestamp(2000));
/// assert_eq!(Timestamp::from_secs(2).as_millis(), 2000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Creates a new timestamp from milliseconds since Unix epoch.
    pub fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    /// Creates a new timestamp from seconds since Unix epoch.
    ///
    /// Saturates at the bounds of the millisecond range.
    pub fn from_secs(secs: i64) -> Self {
        Timestamp(secs.saturating_mul(1000))
    }

    /// Returns the timestamp as milliseconds since Unix epoch.
    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// Returns the timestamp as seconds since Unix epoch.
    pub fn as_secs(self) -> i64 {
        self.0 / 1000
    }
}

impl From<SystemTime> for Timestamp {
    fn from(time: SystemTime) -> Self {
        match time.duration_since(UNIX_EPOCH) {
            Ok(after) => Timestamp(i64::try_from(after.as_millis()).unwrap_or(i64::MAX)),
            Err(before) => Timestamp(
                i64::try_from(before.duration().as_millis())
                    .map_or(i64::MIN, |millis| -millis),
            ),
        }
    }
}

/// A number or a timestamp: the operand type of ordering operators.
///
/// [`Numeric::normalize`] maps both onto one numeric axis, so a timestamp
/// field can be ordered against a millisecond count and the other way round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    /// Plain number.
    Number(Number),
    /// Timestamp, normalized to epoch milliseconds.
    Timestamp(Timestamp),
}

impl Numeric {
    /// Maps the value onto the common numeric axis.
    pub fn normalize(self) -> Number {
        match self {
            Numeric::Number(n) => n,
            Numeric::Timestamp(t) => Number::I64(t.as_millis()),
        }
    }

    /// Compares two values after normalization.
    pub fn compare(self, other: Numeric) -> Option<Ordering> {
        self.normalize().compare(other.normalize())
    }
}

impl From<Number> for Numeric {
    fn from(n: Number) -> Self {
        Numeric::Number(n)
    }
}

impl From<Timestamp> for Numeric {
    fn from(t: Timestamp) -> Self {
        Numeric::Timestamp(t)
    }
}

impl From<SystemTime> for Numeric {
    fn from(time: SystemTime) -> Self {
        Numeric::Timestamp(time.into())
    }
}

impl From<Numeric> for Value {
    fn from(n: Numeric) -> Self {
        match n {
            Numeric::Number(n) => Value::Number(n),
            Numeric::Timestamp(t) => Value::Timestamp(t),
        }
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<Timestamp> for Value {
    fn from(t: Timestamp) -> Self {
        Value::Timestamp(t)
    }
}

impl From<SystemTime> for Value {
    fn from(time: SystemTime) -> Self {
        Value::Timestamp(time.into())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Object(record)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(Number::from(&n)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(map.into_iter().collect()),
        }
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Number::I64(n) => serializer.serialize_i64(n),
            Number::U64(n) => serializer.serialize_u64(n),
            Number::F64(n) => serializer.serialize_f64(n),
            Number::BigInt(n) => serializer.serialize_i128(n),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::Timestamp(t) => serializer.serialize_i64(t.as_millis()),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => items.serialize(serializer),
            Value::Object(record) => record.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}
