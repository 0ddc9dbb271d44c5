//! Roles and cell data.
//!
//! A view asks a cell for data under a role. Tree models answer `Display`,
//! `Edit` and `CheckState` from the configuration, and `ForegroundColor` for
//! boundary highlighting.

use crate::config::ConfigValue;

/// The aspect of a cell a view asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemRole {
    /// Text shown in the cell.
    Display,
    /// The value handed to an editor.
    Edit,
    /// Hover text.
    ToolTip,
    /// Cell fill color.
    BackgroundColor,
    /// Text color; red marks a value sitting on a boundary.
    ForegroundColor,
    /// Checkbox state of a boolean cell.
    CheckState,
    /// Free for application use.
    User(u32),
}

/// Checkbox state of a boolean cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CheckState {
    /// Box is empty.
    #[default]
    Unchecked,
    /// Box is ticked.
    Checked,
}

impl From<bool> for CheckState {
    fn from(checked: bool) -> Self {
        if checked { CheckState::Checked } else { CheckState::Unchecked }
    }
}

impl From<CheckState> for bool {
    fn from(state: CheckState) -> Self {
        state == CheckState::Checked
    }
}

/// RGBA, components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha; 1.0 is opaque.
    pub a: f32,
}

impl Color {
    /// Opaque red, used for boundary highlighting.
    pub const RED: Self = Self::from_rgb(1.0, 0.0, 0.0);

    /// An opaque color.
    pub const fn from_rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

/// What a cell returns for one role.
///
/// The scalar variants mirror [`ConfigValue`]; `Color` and `CheckState`
/// only appear for their roles.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ItemData {
    /// The cell has nothing for this role.
    #[default]
    None,
    /// Text.
    String(String),
    /// An integer.
    Int(i64),
    /// A float.
    Float(f64),
    /// A boolean.
    Bool(bool),
    /// A color, for the color roles.
    Color(Color),
    /// A checkbox state.
    CheckState(CheckState),
}

impl ItemData {
    /// True for [`ItemData::None`].
    pub fn is_none(&self) -> bool {
        matches!(self, ItemData::None)
    }

    /// The text of a `String` value.
    pub fn into_string(self) -> Option<String> {
        match self {
            ItemData::String(s) => Some(s),
            _ => None,
        }
    }

    /// Ints widen to floats.
    pub fn as_float(&self) -> Option<f64> {
        match *self {
            ItemData::Float(n) => Some(n),
            ItemData::Int(n) => Some(n as f64),
            _ => None,
        }
    }

    /// The state of a `CheckState` value.
    pub fn as_check_state(&self) -> Option<CheckState> {
        match *self {
            ItemData::CheckState(state) => Some(state),
            _ => None,
        }
    }

    /// The configuration value an edit carrying this data would write.
    ///
    /// A check state writes a bool. Colors cannot be written and give `None`.
    pub fn to_config_value(&self) -> Option<ConfigValue> {
        let value = match self {
            ItemData::None => ConfigValue::Null,
            ItemData::String(s) => ConfigValue::String(s.clone()),
            ItemData::Int(n) => ConfigValue::Int(*n),
            ItemData::Float(n) => ConfigValue::Float(*n),
            ItemData::Bool(b) => ConfigValue::Bool(*b),
            ItemData::CheckState(state) => ConfigValue::Bool((*state).into()),
            ItemData::Color(_) => return None,
        };
        Some(value)
    }
}

impl From<&ConfigValue> for ItemData {
    fn from(value: &ConfigValue) -> Self {
        match value {
            ConfigValue::Null => ItemData::None,
            ConfigValue::Bool(b) => ItemData::Bool(*b),
            ConfigValue::Int(n) => ItemData::Int(*n),
            ConfigValue::Float(n) => ItemData::Float(*n),
            ConfigValue::String(s) => ItemData::String(s.clone()),
        }
    }
}

macro_rules! item_data_from {
    ($($source:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$source> for ItemData {
                fn from(value: $source) -> Self {
                    ItemData::$variant(value.into())
                }
            }
        )*
    };
}

item_data_from! {
    String => String,
    &str => String,
    i64 => Int,
    f64 => Float,
    bool => Bool,
    Color => Color,
    CheckState => CheckState,
}
