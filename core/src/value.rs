//! Parsed values and the kinds that produce them.
//!
//! Every pattern declares a [`Kind`] that converts raw words into
//! [`Value`]s. Multi-valued patterns store a [`Value::List`] in word order.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Target kind for converting a raw word.
///
/// # Examples
///
/// ```
/// use argrammar_core::{Kind, Value};
///
/// assert_eq!(Kind::Int.convert("42"), Some(Value::Int(42)));
/// assert_eq!(Kind::Bool.convert("yes"), Some(Value::Bool(true)));
/// assert_eq!(Kind::Int.convert("forty-two"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// `true`/`false`, `yes`/`no`, `on`/`off`, `1`/`0`.
    Bool,
    /// Signed 64-bit integer.
    Int,
    /// 64-bit float.
    Float,
    /// The word unchanged (the default).
    #[default]
    Str,
}

impl Kind {
    /// Converts a word, returning `None` if it does not parse.
    pub fn convert(self, word: &str) -> Option<Value> {
        match self {
            Kind::Bool => parse_bool(word).map(Value::Bool),
            Kind::Int => word.parse().ok().map(Value::Int),
            Kind::Float => word.parse().ok().map(Value::Float),
            Kind::Str => Some(Value::Str(word.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::Str => "str",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn parse_bool(word: &str) -> Option<bool> {
    match word.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// A parsed argument value.
///
/// Serializes untagged, so a result map renders as plain JSON/YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// No value (default of single-valued patterns that were not given).
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
}

impl Value {
    /// Short name of the variant, used in access errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Renders the value back into the raw words that produce it.
    ///
    /// Scalars yield one word, lists one word per item, `None` yields none.
    pub fn to_words(&self) -> Vec<String> {
        match self {
            Value::None => Vec::new(),
            Value::Bool(b) => vec![b.to_string()],
            Value::Int(n) => vec![n.to_string()],
            Value::Float(x) => vec![x.to_string()],
            Value::Str(s) => vec![s.clone()],
            Value::List(items) => items.iter().flat_map(Value::to_words).collect(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("none"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

/// Typed extraction from a [`Value`], used by
/// [`ParsedArgs::get`](crate::ParsedArgs::get).
pub trait FromValue: Sized {
    /// Name reported when the value has the wrong shape.
    const EXPECTED: &'static str;

    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for bool {
    const EXPECTED: &'static str = "bool";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromValue for i64 {
    const EXPECTED: &'static str = "int";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    const EXPECTED: &'static str = "float";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(x) => Some(*x),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }
}

impl FromValue for String {
    const EXPECTED: &'static str = "str";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(String::from)
    }
}

impl FromValue for Value {
    const EXPECTED: &'static str = "value";

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const EXPECTED: &'static str = T::EXPECTED;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::None => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    const EXPECTED: &'static str = "list";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(items) => items.iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_convert() {
        assert_eq!(Kind::Str.convert("-x"), Some(Value::Str("-x".into())));
        assert_eq!(Kind::Int.convert("-7"), Some(Value::Int(-7)));
        assert_eq!(Kind::Float.convert("2.5"), Some(Value::Float(2.5)));
        assert_eq!(Kind::Bool.convert("OFF"), Some(Value::Bool(false)));
        assert_eq!(Kind::Bool.convert("maybe"), None);
        assert_eq!(Kind::Float.convert("abc"), None);
    }

    #[test]
    fn test_value_to_words() {
        let v = Value::List(vec![Value::Int(1), Value::Float(0.5)]);
        assert_eq!(v.to_words(), vec!["1", "0.5"]);
        assert!(Value::None.to_words().is_empty());
    }

    #[test]
    fn test_from_value_shapes() {
        let list = Value::from(vec!["a", "b"]);
        assert_eq!(
            Vec::<String>::from_value(&list),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(Option::<i64>::from_value(&Value::None), Some(None));
        assert_eq!(Option::<i64>::from_value(&Value::Int(3)), Some(Some(3)));
        assert_eq!(i64::from_value(&Value::Str("3".into())), None);
        assert_eq!(f64::from_value(&Value::Int(2)), Some(2.0));
    }

    #[test]
    fn test_value_serializes_untagged() {
        let v = Value::List(vec![Value::Int(1), Value::Str("a".into()), Value::None]);
        assert_eq!(serde_json::to_string(&v).unwrap(), r#"[1,"a",null]"#);
        let back: Value = serde_json::from_str("[true, 2, 2.5]").unwrap();
        assert_eq!(
            back,
            Value::List(vec![Value::Bool(true), Value::Int(2), Value::Float(2.5)])
        );
    }
}
