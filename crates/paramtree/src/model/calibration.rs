//! Calibration tree models.
//!
//! A calibration model is a [`DictTreeModel`] whose attribute cells are
//! backed by the [`Parameter`](crate::config::Parameter) attached to each
//! row. Writes keep the mapping and the parameter consistent, and moving a
//! value outside its bounds drags the bounds along instead of failing.

use paramtree_core::logging::targets;
use paramtree_core::{Result, Signal, TreeError};

use super::dict_tree_model::DictTreeModel;
use super::index::ModelIndex;
use super::role::{Color, ItemData, ItemRole};
use super::schema::ColumnSchema;
use super::traits::{ItemFlags, ItemModel, ModelSignals, Orientation};
use crate::config::{ConfigNode, ConfigPath, ConfigValue, ParamAttribute, SharedConfig};
use crate::options::TreeModelOptions;

/// The column layout and boundary rule of a calibration model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CalibrationVariant {
    /// Value, Vary, Minimum, Maximum. A value within tolerance of either
    /// bound is highlighted together with that bound.
    #[default]
    Default,
    /// Value, Vary, Delta. A delta within tolerance of zero is highlighted
    /// together with the value.
    Delta,
}

impl CalibrationVariant {
    /// The column schema of this variant.
    pub fn schema(self) -> ColumnSchema {
        match self {
            CalibrationVariant::Default => ColumnSchema::default_calibration(),
            CalibrationVariant::Delta => ColumnSchema::delta_calibration(),
        }
    }
}

/// A [`DictTreeModel`] that keeps row parameters in sync with their cells.
///
/// # Example
///
/// ```
/// use paramtree::config::{ConfigMap, ConfigNode, ConfigPath, Parameter};
/// use paramtree::model::{CalibrationTreeModel, CalibrationVariant};
///
/// let energy = Parameter::new("energy", 65.0).with_bounds(60.0, 70.0).shared();
/// let config = ConfigNode::from(
///     ConfigMap::new().with("energy", ConfigMap::from_parameter(energy.clone())),
/// )
/// .shared();
///
/// let model = CalibrationTreeModel::new(config, CalibrationVariant::Default);
/// model
///     .set_config_val(&ConfigPath::from(["energy", "_value"]), 75.0)
///     .unwrap();
///
/// let energy = energy.read();
/// assert_eq!((energy.min, energy.value, energy.max), (70.0, 75.0, 80.0));
/// ```
pub struct CalibrationTreeModel {
    inner: DictTreeModel,
    variant: CalibrationVariant,
}

impl CalibrationTreeModel {
    /// Creates a calibration model with default options.
    pub fn new(config: SharedConfig, variant: CalibrationVariant) -> Self {
        Self::with_options(config, variant, TreeModelOptions::default())
    }

    /// Creates a calibration model with the given options.
    pub fn with_options(config: SharedConfig, variant: CalibrationVariant, options: TreeModelOptions) -> Self {
        Self {
            inner: DictTreeModel::with_options(config, variant.schema(), options),
            variant,
        }
    }

    /// Returns the variant.
    pub fn variant(&self) -> CalibrationVariant {
        self.variant
    }

    /// Returns the underlying dictionary model.
    pub fn inner(&self) -> &DictTreeModel {
        &self.inner
    }

    /// Emitted after every write made through the model.
    pub fn dict_modified(&self) -> &Signal<()> {
        self.inner.dict_modified()
    }

    /// Returns a copy of the node at `path`.
    pub fn config_val(&self, path: &ConfigPath) -> Result<ConfigNode> {
        self.inner.config_val(path)
    }

    /// Returns the leaf value at `path`.
    pub fn get_value(&self, path: &ConfigPath) -> Result<ConfigValue> {
        self.inner.get_value(path)
    }

    /// Rebuilds all rows from the configuration.
    pub fn rebuild_tree(&self) {
        self.inner.rebuild_tree();
    }

    /// Swaps in a new configuration and rebuilds.
    pub fn update_from_config(&self, config: SharedConfig) {
        self.inner.update_from_config(config);
    }

    /// Returns the index of the row at `path`, in `column`.
    pub fn index_for_path(&self, path: &ConfigPath, column: usize) -> ModelIndex {
        self.inner.index_for_path(path, column)
    }

    /// Writes `value` at `path`, updates the row's parameter and emits
    /// `dict_modified`.
    ///
    /// For `_value`, `_vary`, `_min`, `_max` and `_delta` paths the
    /// parameter attached to the parent mapping is updated as well. If it is
    /// missing the call fails with [`TreeError::MissingParameter`] before
    /// anything is written. Other paths are written as-is.
    pub fn set_config_val(&self, path: &ConfigPath, value: impl Into<ConfigValue>) -> Result<()> {
        self.write_parameter(path, value.into())?;
        self.inner.dict_modified().emit(());
        Ok(())
    }

    fn write_parameter(&self, path: &ConfigPath, value: ConfigValue) -> Result<()> {
        let Some(attribute) = path.last_key().and_then(ParamAttribute::from_key) else {
            return self.inner.write_config(path, value);
        };
        let row_path = path.parent().unwrap_or_default();
        let param = self.inner.config().read().parameter(&row_path)?;

        let recentered = {
            let mut param = param.write();
            let mut staged = param.clone();
            let recentered = match attribute {
                ParamAttribute::Value => value.as_f64().and_then(|v| staged.recenter_bounds(v)),
                _ => None,
            };
            staged
                .set(attribute, &value)
                .map_err(|expected| TreeError::invalid_value_type(path, expected, &value))?;
            *param = staged;
            recentered
        };

        // The parameter is current before any cell notification goes out.
        self.inner.write_config(path, value.clone())?;
        if let Some((min, max)) = recentered {
            tracing::debug!(
                target: targets::CALIBRATION,
                path = %row_path,
                value = %value,
                min,
                max,
                "value outside bounds, bounds re-centered"
            );
            // Cells are refreshed only for bound columns in the schema.
            self.inner.write_config(&row_path.join(ParamAttribute::Min.key()), min)?;
            self.inner.write_config(&row_path.join(ParamAttribute::Max.key()), max)?;
        }
        Ok(())
    }

    /// Returns true if the cell at `index` is highlighted as sitting on a
    /// boundary.
    ///
    /// Only the value column and the bound columns of leaf rows that hold a
    /// value can be flagged.
    pub fn is_boundary_flagged(&self, index: &ModelIndex) -> bool {
        let schema = self.inner.schema();
        let Some(value_col) = schema.column_of(ParamAttribute::Value) else {
            return false;
        };
        let number = |column: usize| {
            self.inner
                .leaf_cell_value(index, column)
                .and_then(|v| v.as_f64())
        };
        let Some(value) = number(value_col) else {
            return false;
        };
        let tolerance = self.inner.boundary_tolerance();
        let column = index.column();

        match self.variant {
            CalibrationVariant::Default => [ParamAttribute::Max, ParamAttribute::Min]
                .into_iter()
                .filter_map(|bound| schema.column_of(bound))
                .filter(|&bound_col| column == value_col || column == bound_col)
                .filter_map(number)
                .any(|bound| (value - bound).abs() < tolerance),
            CalibrationVariant::Delta => {
                let Some(delta_col) = schema.column_of(ParamAttribute::Delta) else {
                    return false;
                };
                (column == value_col || column == delta_col)
                    && number(delta_col).is_some_and(|delta| delta.abs() < tolerance)
            }
        }
    }
}

impl ItemModel for CalibrationTreeModel {
    fn row_count(&self, parent: &ModelIndex) -> usize {
        self.inner.row_count(parent)
    }

    fn column_count(&self, parent: &ModelIndex) -> usize {
        self.inner.column_count(parent)
    }

    fn data(&self, index: &ModelIndex, role: ItemRole) -> ItemData {
        if role == ItemRole::ForegroundColor && self.is_boundary_flagged(index) {
            return ItemData::Color(Color::RED);
        }
        self.inner.data(index, role)
    }

    fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex {
        self.inner.index(row, column, parent)
    }

    fn parent(&self, index: &ModelIndex) -> ModelIndex {
        self.inner.parent(index)
    }

    fn signals(&self) -> &ModelSignals {
        self.inner.signals()
    }

    fn set_data(&self, index: &ModelIndex, value: ItemData, role: ItemRole) -> bool {
        self.inner
            .apply_edit(index, value, role, |path, value| self.write_parameter(path, value))
    }

    fn flags(&self, index: &ModelIndex) -> ItemFlags {
        self.inner.flags(index)
    }

    fn has_children(&self, parent: &ModelIndex) -> bool {
        self.inner.has_children(parent)
    }

    fn header_data(&self, section: usize, orientation: Orientation, role: ItemRole) -> ItemData {
        self.inner.header_data(section, orientation, role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigMap, Parameter, SharedParameter};

    fn config_with(param: SharedParameter) -> SharedConfig {
        ConfigNode::from(
            ConfigMap::new()
                .with("beam", ConfigMap::new().with("energy", ConfigMap::from_parameter(param)))
                .with("plain", ConfigMap::new().with("_value", 1.0)),
        )
        .shared()
    }

    fn energy_path(key: &str) -> ConfigPath {
        ConfigPath::from(["beam", "energy", key])
    }

    #[test]
    fn test_write_within_bounds_keeps_bounds() {
        let param = Parameter::new("energy", 5.0).with_bounds(4.0, 6.0).shared();
        let model = CalibrationTreeModel::new(config_with(param.clone()), CalibrationVariant::Default);

        model.set_config_val(&energy_path("_value"), 5.5).unwrap();
        let p = param.read();
        assert_eq!((p.min, p.value, p.max), (4.0, 5.5, 6.0));
        assert_eq!(model.get_value(&energy_path("_min")).unwrap(), ConfigValue::Float(4.0));
    }

    #[test]
    fn test_write_above_max_recenters() {
        let param = Parameter::new("energy", 5.0).with_bounds(4.0, 6.0).shared();
        let model = CalibrationTreeModel::new(config_with(param.clone()), CalibrationVariant::Default);

        model.set_config_val(&energy_path("_value"), 10.0).unwrap();
        let p = param.read();
        assert_eq!((p.min, p.value, p.max), (9.0, 10.0, 11.0));
        assert_eq!(model.get_value(&energy_path("_min")).unwrap(), ConfigValue::Float(9.0));
        assert_eq!(model.get_value(&energy_path("_max")).unwrap(), ConfigValue::Float(11.0));

        let max_cell = model.index_for_path(&ConfigPath::from(["beam", "energy"]), 4);
        assert_eq!(model.data(&max_cell, ItemRole::Display).as_float(), Some(11.0));
    }

    #[test]
    fn test_data_changed_sees_updated_parameter() {
        let param = Parameter::new("energy", 5.0).with_bounds(4.0, 6.0).shared();
        let model = CalibrationTreeModel::new(config_with(param.clone()), CalibrationVariant::Default);

        let seen = std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));
        let (sink, observed) = (seen.clone(), param.clone());
        model.signals().data_changed.connect(move |_| {
            let p = observed.read();
            sink.lock().push((p.min, p.value, p.max));
        });

        model.set_config_val(&energy_path("_value"), 10.0).unwrap();
        let seen = seen.lock();
        assert_eq!(seen.len(), 3);
        assert!(seen.iter().all(|&state| state == (9.0, 10.0, 11.0)));
    }

    #[test]
    fn test_vary_requires_bool() {
        let param = Parameter::new("energy", 5.0).shared();
        let model = CalibrationTreeModel::new(config_with(param.clone()), CalibrationVariant::Default);

        let err = model.set_config_val(&energy_path("_vary"), 1.0).unwrap_err();
        assert!(matches!(err, TreeError::InvalidValueType { expected: "bool", .. }));
        assert_eq!(model.get_value(&energy_path("_vary")).unwrap(), ConfigValue::Bool(false));

        model.set_config_val(&energy_path("_vary"), true).unwrap();
        assert!(param.read().vary);
    }

    #[test]
    fn test_missing_parameter_leaves_mapping() {
        let param = Parameter::new("energy", 5.0).shared();
        let model = CalibrationTreeModel::new(config_with(param), CalibrationVariant::Default);

        let err = model
            .set_config_val(&ConfigPath::from(["plain", "_value"]), 2.0)
            .unwrap_err();
        assert_eq!(err, TreeError::missing_parameter(ConfigPath::from(["plain", "_param"])));
        assert_eq!(
            model.get_value(&ConfigPath::from(["plain", "_value"])).unwrap(),
            ConfigValue::Float(1.0)
        );
    }

    #[test]
    fn test_boundary_flags_default() {
        let param = Parameter::new("energy", 5.0).with_bounds(0.0, 5.0009).shared();
        let model = CalibrationTreeModel::new(config_with(param), CalibrationVariant::Default);
        let row = ConfigPath::from(["beam", "energy"]);

        let value = model.index_for_path(&row, 1);
        let min = model.index_for_path(&row, 3);
        let max = model.index_for_path(&row, 4);
        assert!(model.is_boundary_flagged(&value));
        assert!(model.is_boundary_flagged(&max));
        assert!(!model.is_boundary_flagged(&min));
        assert_eq!(
            model.data(&max, ItemRole::ForegroundColor),
            ItemData::Color(Color::RED)
        );

        // Interior rows are never flagged.
        let beam = model.index_for_path(&ConfigPath::from(["beam"]), 1);
        assert!(!model.is_boundary_flagged(&beam));
    }

    #[test]
    fn test_boundary_flags_delta() {
        let param = Parameter::new("energy", 5.0).with_delta(0.0005).shared();
        let model = CalibrationTreeModel::new(config_with(param), CalibrationVariant::Delta);
        let row = ConfigPath::from(["beam", "energy"]);

        assert!(model.is_boundary_flagged(&model.index_for_path(&row, 1)));
        assert!(model.is_boundary_flagged(&model.index_for_path(&row, 3)));
        assert!(!model.is_boundary_flagged(&model.index_for_path(&row, 2)));

        model.set_config_val(&energy_path("_delta"), 0.5).unwrap();
        assert!(!model.is_boundary_flagged(&model.index_for_path(&row, 1)));
    }

    #[test]
    fn test_non_parameter_paths_are_plain_writes() {
        let param = Parameter::new("energy", 5.0).shared();
        let config = config_with(param);
        config
            .write()
            .set(&ConfigPath::from(["beam", "label"]), "cu-ka".into())
            .unwrap();
        let model = CalibrationTreeModel::new(config, CalibrationVariant::Default);

        model
            .set_config_val(&ConfigPath::from(["beam", "label"]), "mo-ka")
            .unwrap();
        assert_eq!(
            model.get_value(&ConfigPath::from(["beam", "label"])).unwrap(),
            ConfigValue::from("mo-ka")
        );
    }
}
