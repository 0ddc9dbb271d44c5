//! Column schemas for multi-column tree models.

use crate::config::ParamAttribute;

/// The structural column showing each row's mapping key.
pub const KEY_COLUMN: usize = 0;

/// Header text of the key column.
pub const KEY_HEADER: &str = "Key";

/// One logical column: a header label bound to a parameter attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Header label.
    pub name: String,
    /// The attribute, and therefore the mapping key, the column displays.
    pub attribute: ParamAttribute,
}

impl ColumnDescriptor {
    /// Creates a column descriptor.
    pub fn new(name: impl Into<String>, attribute: ParamAttribute) -> Self {
        Self {
            name: name.into(),
            attribute,
        }
    }

    /// The mapping key (`_value`, `_min`, ...) this column reads.
    pub fn key(&self) -> &'static str {
        self.attribute.key()
    }
}

/// The ordered attribute columns of a model.
///
/// Model column `0` is always [`KEY_COLUMN`]; descriptor `i` is displayed in
/// model column `i + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    columns: Vec<ColumnDescriptor>,
}

impl ColumnSchema {
    /// Creates a schema from descriptors in display order.
    pub fn new(columns: impl IntoIterator<Item = ColumnDescriptor>) -> Self {
        Self {
            columns: columns.into_iter().collect(),
        }
    }

    /// Value, Vary, Minimum, Maximum.
    pub fn default_calibration() -> Self {
        Self::new([
            ColumnDescriptor::new("Value", ParamAttribute::Value),
            ColumnDescriptor::new("Vary", ParamAttribute::Vary),
            ColumnDescriptor::new("Minimum", ParamAttribute::Min),
            ColumnDescriptor::new("Maximum", ParamAttribute::Max),
        ])
    }

    /// Value, Vary, Delta.
    pub fn delta_calibration() -> Self {
        Self::new([
            ColumnDescriptor::new("Value", ParamAttribute::Value),
            ColumnDescriptor::new("Vary", ParamAttribute::Vary),
            ColumnDescriptor::new("Delta", ParamAttribute::Delta),
        ])
    }

    /// Number of attribute columns, excluding the key column.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the schema has no attribute columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Number of model columns, including the key column.
    pub fn column_count(&self) -> usize {
        self.columns.len() + 1
    }

    /// Iterates over the descriptors in display order.
    pub fn iter(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter()
    }

    /// Returns the model column displaying `attribute`.
    pub fn column_of(&self, attribute: ParamAttribute) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.attribute == attribute)
            .map(|i| i + 1)
    }

    /// Returns the descriptor shown in model column `column`.
    pub fn descriptor(&self, column: usize) -> Option<&ColumnDescriptor> {
        column.checked_sub(1).and_then(|i| self.columns.get(i))
    }

    /// Returns the attribute shown in model column `column`.
    pub fn attribute_at(&self, column: usize) -> Option<ParamAttribute> {
        self.descriptor(column).map(|c| c.attribute)
    }

    /// Returns true if some column displays the mapping key `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.columns.iter().any(|c| c.key() == key)
    }

    /// Header label for model column `column`.
    pub fn header(&self, column: usize) -> Option<&str> {
        if column == KEY_COLUMN {
            return Some(KEY_HEADER);
        }
        self.descriptor(column).map(|c| c.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schema_layout() {
        let schema = ColumnSchema::default_calibration();
        assert_eq!(schema.column_count(), 5);
        assert_eq!(schema.column_of(ParamAttribute::Value), Some(1));
        assert_eq!(schema.column_of(ParamAttribute::Max), Some(4));
        assert_eq!(schema.column_of(ParamAttribute::Delta), None);
        assert_eq!(schema.header(0), Some("Key"));
        assert_eq!(schema.header(3), Some("Minimum"));
        assert_eq!(schema.header(5), None);
    }

    #[test]
    fn test_delta_schema_layout() {
        let schema = ColumnSchema::delta_calibration();
        assert_eq!(schema.attribute_at(3), Some(ParamAttribute::Delta));
        assert_eq!(schema.attribute_at(KEY_COLUMN), None);
        assert!(schema.contains_key("_delta"));
        assert!(!schema.contains_key("_min"));
    }
}
