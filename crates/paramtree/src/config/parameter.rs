//! Refinable parameters attached to configuration rows.
//!
//! A parameter mirrors the numeric columns of one row (value, bounds, vary
//! flag and optionally a delta). The tree models keep the parameter and the
//! raw mapping consistent; code outside the model should treat a shared
//! parameter as read-only while a model is attached.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use super::value::ConfigValue;

/// Reserved mapping key under which a row's parameter is addressed.
pub const PARAM_KEY: &str = "_param";

/// A parameter shared between the configuration tree and its owner.
pub type SharedParameter = Arc<RwLock<Parameter>>;

/// The attributes of a [`Parameter`] that can appear as table columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamAttribute {
    /// The current value.
    Value,
    /// Whether the value is refined.
    Vary,
    /// Lower bound.
    Min,
    /// Upper bound.
    Max,
    /// Symmetric refinement range.
    Delta,
}

impl ParamAttribute {
    /// Every attribute, in canonical column order.
    pub const ALL: [ParamAttribute; 5] = [
        ParamAttribute::Value,
        ParamAttribute::Vary,
        ParamAttribute::Min,
        ParamAttribute::Max,
        ParamAttribute::Delta,
    ];

    /// The mapping key holding this attribute next to `_param`.
    pub const fn key(self) -> &'static str {
        match self {
            ParamAttribute::Value => "_value",
            ParamAttribute::Vary => "_vary",
            ParamAttribute::Min => "_min",
            ParamAttribute::Max => "_max",
            ParamAttribute::Delta => "_delta",
        }
    }

    /// The attribute name, i.e. the key without its leading underscore.
    pub fn name(self) -> &'static str {
        &self.key()[1..]
    }

    /// Resolves a mapping key (`_value`, `_min`, ...) to its attribute.
    pub fn from_key(key: &str) -> Option<Self> {
        let name = key.strip_prefix('_')?;
        Self::ALL.into_iter().find(|attr| attr.name() == name)
    }

    /// Returns true for attributes holding a number.
    pub fn is_numeric(self) -> bool {
        !matches!(self, ParamAttribute::Vary)
    }

    /// The value type this attribute accepts, for error messages.
    pub fn expected_type(self) -> &'static str {
        if self.is_numeric() { "float" } else { "bool" }
    }
}

impl fmt::Display for ParamAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A refinable quantity: value, inclusive bounds, vary flag and delta.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Name of the parameter, usually the key of the row it backs.
    pub name: String,
    /// The current value.
    pub value: f64,
    /// Lower bound (inclusive).
    pub min: f64,
    /// Upper bound (inclusive).
    pub max: f64,
    /// Whether the value may change during refinement.
    pub vary: bool,
    /// Symmetric refinement range, for delta-style calibrations.
    pub delta: Option<f64>,
}

impl Parameter {
    /// Creates an unbounded, fixed parameter.
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
            vary: false,
            delta: None,
        }
    }

    /// Sets the bounds.
    pub fn with_bounds(mut self, min: f64, max: f64) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Sets the vary flag.
    pub fn with_vary(mut self, vary: bool) -> Self {
        self.vary = vary;
        self
    }

    /// Sets the delta.
    pub fn with_delta(mut self, delta: f64) -> Self {
        self.delta = Some(delta);
        self
    }

    /// Wraps the parameter in a shared handle.
    pub fn shared(self) -> SharedParameter {
        Arc::new(RwLock::new(self))
    }

    /// Returns true when `min <= value <= max`.
    pub fn in_bounds(&self) -> bool {
        self.min <= self.value && self.value <= self.max
    }

    /// Reads an attribute as a configuration value.
    ///
    /// An unset delta reads as [`ConfigValue::Null`].
    pub fn get(&self, attribute: ParamAttribute) -> ConfigValue {
        match attribute {
            ParamAttribute::Value => ConfigValue::Float(self.value),
            ParamAttribute::Vary => ConfigValue::Bool(self.vary),
            ParamAttribute::Min => ConfigValue::Float(self.min),
            ParamAttribute::Max => ConfigValue::Float(self.max),
            ParamAttribute::Delta => self.delta.map_or(ConfigValue::Null, ConfigValue::Float),
        }
    }

    /// Assigns an attribute.
    ///
    /// Numeric attributes accept ints and floats, `vary` accepts a bool. On
    /// a type mismatch the parameter is left untouched and the expected type
    /// name is returned.
    pub fn set(
        &mut self,
        attribute: ParamAttribute,
        value: &ConfigValue,
    ) -> Result<(), &'static str> {
        if attribute.is_numeric() {
            let number = value.as_f64().ok_or(attribute.expected_type())?;
            match attribute {
                ParamAttribute::Value => self.value = number,
                ParamAttribute::Min => self.min = number,
                ParamAttribute::Max => self.max = number,
                ParamAttribute::Delta => self.delta = Some(number),
                ParamAttribute::Vary => unreachable!("vary is not numeric"),
            }
        } else {
            self.vary = value.as_bool().ok_or(attribute.expected_type())?;
        }
        Ok(())
    }

    /// Moves the bounds so that `value` fits, keeping their distances to the
    /// current value.
    ///
    /// Returns the new `(min, max)` when the bounds had to move, `None` when
    /// `value` already lies within them. The parameter's value itself is not
    /// changed.
    pub fn recenter_bounds(&mut self, value: f64) -> Option<(f64, f64)> {
        if value >= self.min && value <= self.max {
            return None;
        }
        self.min = value - (self.value - self.min);
        self.max = value + (self.max - self.value);
        Some((self.min, self.max))
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Parameter '{}', value={}, bounds=[{}:{}], vary={}",
            self.name, self.value, self.min, self.max, self.vary
        )?;
        if let Some(delta) = self.delta {
            write!(f, ", delta={delta}")?;
        }
        write!(f, ">")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_keys() {
        assert_eq!(ParamAttribute::from_key("_value"), Some(ParamAttribute::Value));
        assert_eq!(ParamAttribute::from_key("_delta"), Some(ParamAttribute::Delta));
        assert_eq!(ParamAttribute::from_key("value"), None);
        assert_eq!(ParamAttribute::from_key("_param"), None);
        assert_eq!(ParamAttribute::Max.name(), "max");
    }

    #[test]
    fn test_set_checks_types() {
        let mut param = Parameter::new("tilt", 1.0);
        assert!(param.set(ParamAttribute::Value, &ConfigValue::Int(2)).is_ok());
        assert_eq!(param.value, 2.0);

        assert_eq!(
            param.set(ParamAttribute::Value, &ConfigValue::from("x")),
            Err("float")
        );
        assert_eq!(
            param.set(ParamAttribute::Vary, &ConfigValue::Float(1.0)),
            Err("bool")
        );
        assert_eq!(param.value, 2.0);
        assert!(!param.vary);
    }

    #[test]
    fn test_recenter_above_max() {
        let mut param = Parameter::new("x", 5.0).with_bounds(4.0, 6.0);
        assert_eq!(param.recenter_bounds(10.0), Some((9.0, 11.0)));
        assert_eq!(param.value, 5.0);
    }

    #[test]
    fn test_recenter_below_min() {
        let mut param = Parameter::new("x", 5.0).with_bounds(3.0, 5.5);
        assert_eq!(param.recenter_bounds(-1.0), Some((-3.0, -0.5)));
    }

    #[test]
    fn test_recenter_within_bounds_is_noop() {
        let mut param = Parameter::new("x", 5.0).with_bounds(4.0, 6.0);
        assert_eq!(param.recenter_bounds(6.0), None);
        assert_eq!((param.min, param.max), (4.0, 6.0));
    }

    #[test]
    fn test_get_unset_delta() {
        let param = Parameter::new("x", 1.0);
        assert_eq!(param.get(ParamAttribute::Delta), ConfigValue::Null);
        assert_eq!(
            param.with_delta(0.5).get(ParamAttribute::Delta),
            ConfigValue::Float(0.5)
        );
    }
}
