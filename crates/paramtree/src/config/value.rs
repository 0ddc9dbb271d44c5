//! Leaf values stored in a configuration tree.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A scalar stored at a leaf of a configuration tree.
///
/// Containers (maps and lists) are represented by [`ConfigNode`](super::ConfigNode);
/// this enum only covers the primitive values that end up in table cells.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// A null/empty value.
    #[default]
    Null,
    /// A boolean value.
    Bool(bool),
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit floating point number.
    Float(f64),
    /// A string value.
    String(String),
}

impl ConfigValue {
    /// Returns true if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, ConfigValue::Null)
    }

    /// Returns a short name of the held type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::Null => "null",
            ConfigValue::Bool(_) => "bool",
            ConfigValue::Int(_) => "int",
            ConfigValue::Float(_) => "float",
            ConfigValue::String(_) => "str",
        }
    }

    /// Returns this value as a float. Integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigValue::Float(v) => Some(*v),
            ConfigValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Returns this value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns this value as a string slice, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(v) => Some(v),
            _ => None,
        }
    }

    /// Converts `self` to the type currently held by `existing`.
    ///
    /// Edits coming from a view arrive loosely typed (a spin box yields a
    /// float, a line edit yields text). Before an edit is written back it is
    /// converted to the type already stored at the target, and rejected when
    /// that is impossible. Returns `None` on failure.
    pub fn coerce_like(&self, existing: &ConfigValue) -> Option<ConfigValue> {
        match existing {
            ConfigValue::Null => Some(self.clone()),
            ConfigValue::Float(_) => match self {
                ConfigValue::Float(v) => Some(ConfigValue::Float(*v)),
                ConfigValue::Int(v) => Some(ConfigValue::Float(*v as f64)),
                ConfigValue::Bool(v) => Some(ConfigValue::Float(if *v { 1.0 } else { 0.0 })),
                ConfigValue::String(s) => s.trim().parse().ok().map(ConfigValue::Float),
                ConfigValue::Null => None,
            },
            ConfigValue::Int(_) => match self {
                ConfigValue::Int(v) => Some(ConfigValue::Int(*v)),
                ConfigValue::Float(v) if v.is_finite() => Some(ConfigValue::Int(v.trunc() as i64)),
                ConfigValue::Bool(v) => Some(ConfigValue::Int(i64::from(*v))),
                ConfigValue::String(s) => s.trim().parse().ok().map(ConfigValue::Int),
                _ => None,
            },
            ConfigValue::Bool(_) => match self {
                ConfigValue::Bool(v) => Some(ConfigValue::Bool(*v)),
                ConfigValue::Int(v) => Some(ConfigValue::Bool(*v != 0)),
                ConfigValue::Float(v) => Some(ConfigValue::Bool(*v != 0.0)),
                ConfigValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" => Some(ConfigValue::Bool(true)),
                    "false" => Some(ConfigValue::Bool(false)),
                    _ => None,
                },
                ConfigValue::Null => None,
            },
            ConfigValue::String(_) => match self {
                ConfigValue::Null => None,
                other => Some(ConfigValue::String(other.to_string())),
            },
        }
    }

    /// Zero converted to the type of `self`: `0`, `0.0`, `false` or `"0"`.
    ///
    /// Null has no zero and gives `None`.
    pub fn zero_like(&self) -> Option<ConfigValue> {
        match self {
            ConfigValue::Null => None,
            other => ConfigValue::Int(0).coerce_like(other),
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Null => write!(f, "null"),
            ConfigValue::Bool(v) => write!(f, "{v}"),
            ConfigValue::Int(v) => write!(f, "{v}"),
            ConfigValue::Float(v) => write!(f, "{v}"),
            ConfigValue::String(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(v: bool) -> Self {
        ConfigValue::Bool(v)
    }
}

impl From<i32> for ConfigValue {
    fn from(v: i32) -> Self {
        ConfigValue::Int(v as i64)
    }
}

impl From<i64> for ConfigValue {
    fn from(v: i64) -> Self {
        ConfigValue::Int(v)
    }
}

impl From<f64> for ConfigValue {
    fn from(v: f64) -> Self {
        ConfigValue::Float(v)
    }
}

impl From<String> for ConfigValue {
    fn from(v: String) -> Self {
        ConfigValue::String(v)
    }
}

impl From<&str> for ConfigValue {
    fn from(v: &str) -> Self {
        ConfigValue::String(v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_f64_widens_ints() {
        assert_eq!(ConfigValue::Int(3).as_f64(), Some(3.0));
        assert_eq!(ConfigValue::Float(2.5).as_f64(), Some(2.5));
        assert_eq!(ConfigValue::Bool(true).as_f64(), None);
    }

    #[test]
    fn test_coerce_to_float() {
        let existing = ConfigValue::Float(1.0);
        assert_eq!(
            ConfigValue::from("2.5").coerce_like(&existing),
            Some(ConfigValue::Float(2.5))
        );
        assert_eq!(
            ConfigValue::Int(4).coerce_like(&existing),
            Some(ConfigValue::Float(4.0))
        );
        assert_eq!(ConfigValue::from("abc").coerce_like(&existing), None);
    }

    #[test]
    fn test_coerce_to_int_truncates() {
        let existing = ConfigValue::Int(0);
        assert_eq!(
            ConfigValue::Float(2.9).coerce_like(&existing),
            Some(ConfigValue::Int(2))
        );
        assert_eq!(ConfigValue::Float(f64::NAN).coerce_like(&existing), None);
    }

    #[test]
    fn test_coerce_to_bool() {
        let existing = ConfigValue::Bool(false);
        assert_eq!(
            ConfigValue::from("True").coerce_like(&existing),
            Some(ConfigValue::Bool(true))
        );
        assert_eq!(
            ConfigValue::Int(0).coerce_like(&existing),
            Some(ConfigValue::Bool(false))
        );
        assert_eq!(ConfigValue::from("maybe").coerce_like(&existing), None);
    }

    #[test]
    fn test_coerce_to_string_and_null() {
        assert_eq!(
            ConfigValue::Float(1.5).coerce_like(&ConfigValue::from("x")),
            Some(ConfigValue::from("1.5"))
        );
        assert_eq!(
            ConfigValue::Bool(true).coerce_like(&ConfigValue::Null),
            Some(ConfigValue::Bool(true))
        );
    }

    #[test]
    fn test_zero_like_follows_type() {
        assert_eq!(ConfigValue::Float(2.5).zero_like(), Some(ConfigValue::Float(0.0)));
        assert_eq!(ConfigValue::Int(7).zero_like(), Some(ConfigValue::Int(0)));
        assert_eq!(ConfigValue::Bool(true).zero_like(), Some(ConfigValue::Bool(false)));
        assert_eq!(ConfigValue::from("tth").zero_like(), Some(ConfigValue::from("0")));
        assert_eq!(ConfigValue::Null.zero_like(), None);
    }

    #[test]
    fn test_serde_untagged() {
        let values: Vec<ConfigValue> = serde_json::from_str(r#"[null, true, 3, 2.5, "a"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                ConfigValue::Null,
                ConfigValue::Bool(true),
                ConfigValue::Int(3),
                ConfigValue::Float(2.5),
                ConfigValue::from("a"),
            ]
        );
    }
}
