//! Multi-column tree model over a configuration mapping.
//!
//! `DictTreeModel` presents a [`ConfigNode`] as a hierarchy of rows. Each
//! non-column key of a mapping becomes a child row; keys named by the
//! [`ColumnSchema`] (`_value`, `_min`, ...) fill the row's cells instead.
//! List elements become rows keyed by their index.
//!
//! The model caches the row structure and cell values. Every write made
//! through the model updates the configuration and the cache together;
//! writes made behind the model's back are picked up by
//! [`rebuild_tree`](DictTreeModel::rebuild_tree).

use std::collections::HashMap;

use paramtree_core::logging::{span_names, targets};
use paramtree_core::{PerfSpan, Result, Signal, TreeError};
use parking_lot::RwLock;

use super::index::ModelIndex;
use super::role::{CheckState, ItemData, ItemRole};
use super::schema::{ColumnSchema, KEY_COLUMN};
use super::traits::{ItemFlags, ItemModel, ModelSignals, Orientation};
use crate::config::{ConfigNode, ConfigPath, ConfigValue, ParamAttribute, PathSegment, SharedConfig};
use crate::options::{ComboKey, TreeModelOptions};

/// Identifies a row for the lifetime of one tree build.
type RowId = u64;

/// A row of the presentation tree.
#[derive(Debug, Clone)]
struct Row {
    key: PathSegment,
    parent: Option<RowId>,
    children: Vec<RowId>,
    /// One slot per schema column.
    cells: Vec<Option<ConfigValue>>,
}

/// Internal storage for rows.
#[derive(Debug, Default)]
struct RowStorage {
    rows: HashMap<RowId, Row>,
    root_children: Vec<RowId>,
    next_id: RowId,
}

impl RowStorage {
    /// Creates empty storage whose IDs start after `next_id`, so indices
    /// from a previous build never resolve.
    fn continuing_from(next_id: RowId) -> Self {
        Self {
            next_id,
            ..Default::default()
        }
    }

    fn add_row(&mut self, parent: Option<RowId>, key: PathSegment, cells: Vec<Option<ConfigValue>>) -> RowId {
        self.next_id += 1;
        let id = self.next_id;
        self.rows.insert(
            id,
            Row {
                key,
                parent,
                children: Vec::new(),
                cells,
            },
        );
        match parent.and_then(|pid| self.rows.get_mut(&pid)) {
            Some(parent_row) => parent_row.children.push(id),
            None => self.root_children.push(id),
        }
        id
    }

    fn clear(&mut self) {
        self.rows.clear();
        self.root_children.clear();
    }

    fn get(&self, id: RowId) -> Option<&Row> {
        self.rows.get(&id)
    }

    fn children_of(&self, parent_id: Option<RowId>) -> &[RowId] {
        match parent_id {
            None => &self.root_children,
            Some(id) => self
                .rows
                .get(&id)
                .map(|r| r.children.as_slice())
                .unwrap_or(&[]),
        }
    }

    fn child_at(&self, parent_id: Option<RowId>, index: usize) -> Option<RowId> {
        self.children_of(parent_id).get(index).copied()
    }

    fn parent_of(&self, id: RowId) -> Option<RowId> {
        self.rows.get(&id).and_then(|r| r.parent)
    }

    fn row_of(&self, id: RowId) -> Option<usize> {
        let siblings = self.children_of(self.parent_of(id));
        siblings.iter().position(|&child_id| child_id == id)
    }

    fn path_of(&self, id: RowId) -> Option<ConfigPath> {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(row_id) = current {
            let row = self.rows.get(&row_id)?;
            segments.push(row.key.clone());
            current = row.parent;
        }
        segments.reverse();
        Some(ConfigPath::from(segments))
    }

    fn find(&self, path: &ConfigPath) -> Option<RowId> {
        let mut parent = None;
        for segment in path.segments() {
            let id = self
                .children_of(parent)
                .iter()
                .copied()
                .find(|id| self.rows.get(id).is_some_and(|r| &r.key == segment))?;
            parent = Some(id);
        }
        parent
    }
}

/// A multi-column hierarchical model over a shared configuration.
///
/// # Example
///
/// ```
/// use paramtree::config::{ConfigMap, ConfigNode, ConfigPath, Parameter};
/// use paramtree::model::{ColumnSchema, DictTreeModel, ItemModel, ItemRole, ModelIndex};
///
/// let tilt = Parameter::new("tilt", 0.5).with_bounds(0.0, 1.0).shared();
/// let config = ConfigNode::from(
///     ConfigMap::new().with("panel", ConfigMap::new().with("tilt", ConfigMap::from_parameter(tilt))),
/// )
/// .shared();
///
/// let model = DictTreeModel::new(config, ColumnSchema::default_calibration());
/// let panel = model.index(0, 0, &ModelIndex::invalid());
/// let tilt_value = model.index(0, 1, &panel);
/// assert_eq!(model.data(&tilt_value, ItemRole::Display).as_float(), Some(0.5));
/// ```
pub struct DictTreeModel {
    config: RwLock<SharedConfig>,
    schema: ColumnSchema,
    options: RwLock<TreeModelOptions>,
    rows: RwLock<RowStorage>,
    signals: ModelSignals,
    dict_modified: Signal<()>,
}

impl DictTreeModel {
    /// Creates a model with default options and builds its rows.
    pub fn new(config: SharedConfig, schema: ColumnSchema) -> Self {
        Self::with_options(config, schema, TreeModelOptions::default())
    }

    /// Creates a model with the given options and builds its rows.
    pub fn with_options(config: SharedConfig, schema: ColumnSchema, options: TreeModelOptions) -> Self {
        let model = Self {
            config: RwLock::new(config),
            schema,
            options: RwLock::new(options),
            rows: RwLock::new(RowStorage::default()),
            signals: ModelSignals::new(),
            dict_modified: Signal::new(),
        };
        model.build_rows();
        model
    }

    /// Returns a handle to the configuration currently displayed.
    pub fn config(&self) -> SharedConfig {
        self.config.read().clone()
    }

    /// Returns the column schema.
    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    /// Returns a copy of the current options.
    pub fn options(&self) -> TreeModelOptions {
        self.options.read().clone()
    }

    /// Replaces the options and rebuilds the tree.
    pub fn set_options(&self, options: TreeModelOptions) {
        *self.options.write() = options;
        self.rebuild_tree();
    }

    /// Emitted after every write made through the model.
    pub fn dict_modified(&self) -> &Signal<()> {
        &self.dict_modified
    }

    /// Returns true if cells may be edited.
    pub fn is_editable(&self) -> bool {
        self.options.read().editable
    }

    /// Enables or disables editing. Does not rebuild.
    pub fn set_editable(&self, editable: bool) {
        self.options.write().editable = editable;
    }

    /// Absolute tolerance used by boundary highlighting.
    pub fn boundary_tolerance(&self) -> f64 {
        self.options.read().boundary_tolerance
    }

    /// Returns the blacklisted paths.
    pub fn blacklisted_paths(&self) -> Vec<ConfigPath> {
        self.options.read().blacklisted_paths.clone()
    }

    /// Replaces the blacklisted paths and rebuilds the tree.
    pub fn set_blacklisted_paths<I, P>(&self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<ConfigPath>,
    {
        self.options.write().blacklisted_paths = paths.into_iter().map(Into::into).collect();
        self.rebuild_tree();
    }

    // ------------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------------

    /// Rebuilds all rows from the configuration.
    ///
    /// Bracketed by `model_about_to_reset` / `model_reset`.
    pub fn rebuild_tree(&self) {
        self.signals.emit_reset(|| self.build_rows());
    }

    /// Swaps in a new configuration and rebuilds.
    ///
    /// Bracketed by `model_about_to_reset` / `model_reset`; no row of the
    /// previous configuration survives.
    pub fn update_from_config(&self, config: SharedConfig) {
        self.signals.emit_reset(|| {
            *self.config.write() = config;
            self.build_rows();
        });
    }

    /// Removes every row. The configuration is left untouched.
    pub fn clear(&self) {
        self.signals.emit_reset(|| self.rows.write().clear());
    }

    /// Number of top-level rows.
    pub fn root_count(&self) -> usize {
        self.rows.read().root_children.len()
    }

    /// Returns true if the model has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.read().root_children.is_empty()
    }

    fn build_rows(&self) {
        let _perf = PerfSpan::new(span_names::REBUILD);
        let options = self.options.read().clone();
        let handle = self.config();
        let config = handle.read();

        let mut rows = self.rows.write();
        let mut storage = RowStorage::continuing_from(rows.next_id);
        self.add_children(&mut storage, None, &ConfigPath::root(), &config, &options);

        tracing::debug!(
            target: targets::MODEL,
            rows = storage.rows.len(),
            top_level = storage.root_children.len(),
            "rebuilt configuration tree"
        );
        *rows = storage;
    }

    fn add_children(
        &self,
        storage: &mut RowStorage,
        parent: Option<RowId>,
        parent_path: &ConfigPath,
        node: &ConfigNode,
        options: &TreeModelOptions,
    ) {
        let children: Vec<(PathSegment, &ConfigNode)> = match node {
            ConfigNode::Map(map) => map
                .iter()
                .filter(|(key, _)| !self.schema.contains_key(key))
                .map(|(key, child)| (PathSegment::from(key), child))
                .collect(),
            ConfigNode::List(items) => items
                .iter()
                .enumerate()
                .map(|(i, child)| (PathSegment::Index(i), child))
                .collect(),
            ConfigNode::Value(_) => return,
        };

        for (segment, child) in children {
            if options.hide_private_keys && segment.is_private() {
                continue;
            }
            let path = parent_path.join(segment.clone());
            if options.is_blacklisted(&path) {
                continue;
            }
            let id = storage.add_row(parent, segment, self.cells_for(child));
            self.add_children(storage, Some(id), &path, child, options);
        }
    }

    fn cells_for(&self, node: &ConfigNode) -> Vec<Option<ConfigValue>> {
        let map = node.as_map();
        self.schema
            .iter()
            .map(|column| map.and_then(|m| m.value(column.key())).cloned())
            .collect()
    }

    // ------------------------------------------------------------------------
    // Configuration access
    // ------------------------------------------------------------------------

    /// Returns a copy of the node at `path`.
    ///
    /// Fails with [`TreeError::PathNotFound`] if any segment is absent.
    pub fn config_val(&self, path: &ConfigPath) -> Result<ConfigNode> {
        let handle = self.config();
        let config = handle.read();
        config.get(path).cloned()
    }

    /// Returns the leaf value at `path`.
    ///
    /// Fails with [`TreeError::PathNotFound`] if any segment is absent and
    /// with [`TreeError::InvalidValueType`] if the node is not a leaf.
    pub fn get_value(&self, path: &ConfigPath) -> Result<ConfigValue> {
        match self.config_val(path)? {
            ConfigNode::Value(value) => Ok(value),
            ConfigNode::Map(_) => Err(TreeError::invalid_value_type(path, "value", "mapping")),
            ConfigNode::List(_) => Err(TreeError::invalid_value_type(path, "value", "list")),
        }
    }

    /// Writes `value` at `path` and emits `dict_modified`.
    ///
    /// Every segment but the last must exist.
    pub fn set_config_val(&self, path: &ConfigPath, value: impl Into<ConfigNode>) -> Result<()> {
        self.write_config(path, value)?;
        self.dict_modified.emit(());
        Ok(())
    }

    /// Writes `value` at `path` without emitting `dict_modified`.
    ///
    /// If the path is a displayed cell, the cached cell is updated and
    /// `data_changed` is emitted for it. Writes that add keys or replace
    /// containers rebuild the tree.
    pub fn write_config(&self, path: &ConfigPath, value: impl Into<ConfigNode>) -> Result<()> {
        let node = value.into();
        let cell_value = node.as_value().cloned();
        let existed = {
            let handle = self.config();
            let mut config = handle.write();
            let existed = config.get(path).is_ok_and(ConfigNode::is_leaf);
            config.set(path, node)?;
            existed
        };
        tracing::trace!(target: targets::MODEL, %path, "configuration written");

        match cell_value {
            Some(value) if existed => {
                if let Some(index) = self.refresh_cell(path, value) {
                    self.signals
                        .emit_data_changed_single(index, vec![ItemRole::Display, ItemRole::Edit]);
                }
            }
            _ => self.rebuild_tree(),
        }
        Ok(())
    }

    /// Updates the cached cell displaying `path`, if there is one, and
    /// returns its index.
    fn refresh_cell(&self, path: &ConfigPath, value: ConfigValue) -> Option<ModelIndex> {
        let attribute = ParamAttribute::from_key(path.last_key()?)?;
        let column = self.schema.column_of(attribute)?;
        let row_path = path.parent()?;

        let mut rows = self.rows.write();
        let id = rows.find(&row_path)?;
        let row = rows.rows.get_mut(&id)?;
        row.cells[column - 1] = Some(value);
        Self::create_index_for_id(&rows, id, column)
    }

    // ------------------------------------------------------------------------
    // Structure editing
    // ------------------------------------------------------------------------

    /// Returns true if list elements may be inserted and removed.
    pub fn lists_resizable(&self) -> bool {
        self.options.read().lists_resizable
    }

    /// Enables or disables list resizing. Does not rebuild.
    pub fn set_lists_resizable(&self, resizable: bool) {
        self.options.write().lists_resizable = resizable;
    }

    /// Replaces the switchable keys and rebuilds the tree.
    pub fn set_combo_keys(&self, keys: impl IntoIterator<Item = ComboKey>) {
        self.options.write().combo_keys = keys.into_iter().collect();
        self.rebuild_tree();
    }

    /// Returns true if the list element at `path` may be removed.
    ///
    /// Lists must be resizable and the element must not be the list's last.
    pub fn can_remove_list_item(&self, path: &ConfigPath) -> bool {
        let Some(&PathSegment::Index(position)) = path.last() else {
            return false;
        };
        if !self.lists_resizable() {
            return false;
        }
        let handle = self.config();
        let config = handle.read();
        matches!(
            config.get(&path.parent().unwrap_or_default()),
            Ok(ConfigNode::List(items)) if position < items.len() && items.len() > 1
        )
    }

    /// Inserts an element before the list element at `path`. An index one
    /// past the end appends.
    ///
    /// The new element is zero converted to the type of the list's first
    /// element, or `0` for an empty list. Fails with
    /// [`TreeError::InvalidStructureEdit`] when lists are not resizable or
    /// the first element has no zero. The tree is rebuilt and
    /// `dict_modified` emitted.
    pub fn insert_list_item(&self, path: &ConfigPath) -> Result<()> {
        self.ensure_lists_resizable(path)?;
        self.edit_structure(path, |config| {
            let (items, position) = list_at(config, path)?;
            if position > items.len() {
                return Err(TreeError::path_not_found(path));
            }
            let element = match items.first() {
                None => ConfigValue::Int(0),
                Some(ConfigNode::Value(first)) => first.zero_like().ok_or_else(|| {
                    TreeError::invalid_structure_edit(path, format!("{} elements have no zero", first.type_name()))
                })?,
                Some(_) => {
                    return Err(TreeError::invalid_structure_edit(path, "list elements are containers"));
                }
            };
            items.insert(position, ConfigNode::Value(element));
            Ok(())
        })
    }

    /// Removes the list element at `path`.
    ///
    /// Fails with [`TreeError::InvalidStructureEdit`] when lists are not
    /// resizable or the element is the only one left. The tree is rebuilt
    /// and `dict_modified` emitted.
    pub fn remove_list_item(&self, path: &ConfigPath) -> Result<()> {
        self.ensure_lists_resizable(path)?;
        self.edit_structure(path, |config| {
            let (items, position) = list_at(config, path)?;
            if position >= items.len() {
                return Err(TreeError::path_not_found(path));
            }
            if items.len() == 1 {
                return Err(TreeError::invalid_structure_edit(path, "the last element of a list cannot be removed"));
            }
            items.remove(position);
            Ok(())
        })
    }

    /// The keys the entry at `path` may switch to, in the order they are
    /// listed. Empty when the entry is not a switchable key.
    pub fn combo_alternatives(&self, path: &ConfigPath) -> Vec<String> {
        let (Some(parent), Some(key)) = (path.parent(), path.last_key()) else {
            return Vec::new();
        };
        let options = self.options.read();
        if options.combo_choice(&parent, key).is_none() {
            return Vec::new();
        }
        options
            .combo_choices(&parent)
            .filter(|combo| combo.key != key)
            .map(|combo| combo.key.clone())
            .collect()
    }

    /// Switches the entry at `path` to the alternative key `new_key`.
    ///
    /// Both keys must be listed alternatives of the mapping holding them.
    /// The entry keeps its position and takes the new alternative's default
    /// content. The tree is rebuilt and `dict_modified` emitted.
    pub fn change_combo_item(&self, path: &ConfigPath, new_key: &str) -> Result<()> {
        let (Some(parent), Some(old_key)) = (path.parent(), path.last_key()) else {
            return Err(TreeError::invalid_structure_edit(path, "not a mapping key"));
        };
        if old_key == new_key {
            return Err(TreeError::invalid_structure_edit(path, format!("{new_key} is already selected")));
        }
        let default = {
            let options = self.options.read();
            if options.combo_choice(&parent, old_key).is_none() {
                return Err(TreeError::invalid_structure_edit(path, "key is not switchable"));
            }
            options
                .combo_choice(&parent, new_key)
                .map(|combo| combo.default.clone())
                .ok_or_else(|| TreeError::invalid_structure_edit(path, format!("{new_key} is not an alternative")))?
        };

        self.edit_structure(path, |config| {
            let map = config
                .get_mut(&parent)
                .ok()
                .and_then(ConfigNode::as_map_mut)
                .filter(|map| map.contains_key(old_key))
                .ok_or_else(|| TreeError::path_not_found(path))?;
            map.replace_key(old_key, new_key, ConfigNode::from_json(default))
                .map(drop)
                .ok_or_else(|| TreeError::invalid_structure_edit(path, format!("{new_key} is already present")))
        })
    }

    fn ensure_lists_resizable(&self, path: &ConfigPath) -> Result<()> {
        if self.lists_resizable() {
            Ok(())
        } else {
            Err(TreeError::invalid_structure_edit(path, "lists are not resizable"))
        }
    }

    /// Applies `edit`, which must leave the configuration untouched when it
    /// fails, then rebuilds inside a model reset and emits `dict_modified`.
    fn edit_structure<F>(&self, path: &ConfigPath, edit: F) -> Result<()>
    where
        F: FnOnce(&mut ConfigNode) -> Result<()>,
    {
        {
            let handle = self.config();
            let mut config = handle.write();
            edit(&mut *config)?;
        }
        tracing::debug!(target: targets::MODEL, %path, "configuration restructured");
        self.rebuild_tree();
        self.dict_modified.emit(());
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Index helpers
    // ------------------------------------------------------------------------

    /// Returns the configuration path of the row at `index`.
    pub fn path_to_item(&self, index: &ModelIndex) -> Option<ConfigPath> {
        if !index.is_valid() {
            return None;
        }
        self.rows.read().path_of(index.internal_id())
    }

    /// Returns the configuration path of the cell at `index`.
    ///
    /// For the key column this is the row's own path; for attribute columns
    /// it is the row path followed by the column key.
    pub fn path_to_value(&self, index: &ModelIndex) -> Option<ConfigPath> {
        let item_path = self.path_to_item(index)?;
        if index.column() == KEY_COLUMN {
            return Some(item_path);
        }
        let column = self.schema.descriptor(index.column())?;
        Some(item_path.join(column.key()))
    }

    /// Returns the index of the row at `path`, in `column`.
    pub fn index_for_path(&self, path: &ConfigPath, column: usize) -> ModelIndex {
        if column >= self.schema.column_count() {
            return ModelIndex::invalid();
        }
        let rows = self.rows.read();
        rows.find(path)
            .and_then(|id| Self::create_index_for_id(&rows, id, column))
            .unwrap_or_else(ModelIndex::invalid)
    }

    /// Returns the cached value of the cell at `index`.
    pub fn cell_value(&self, index: &ModelIndex) -> Option<ConfigValue> {
        if !index.is_valid() || index.column() == KEY_COLUMN {
            return None;
        }
        let rows = self.rows.read();
        rows.get(index.internal_id())?
            .cells
            .get(index.column() - 1)?
            .clone()
    }

    /// Returns the cached value of `column` for the row at `index`, if the
    /// row is a leaf.
    ///
    /// Interior rows never take part in boundary checks.
    pub(crate) fn leaf_cell_value(&self, index: &ModelIndex, column: usize) -> Option<ConfigValue> {
        if !index.is_valid() || column == KEY_COLUMN {
            return None;
        }
        let rows = self.rows.read();
        let row = rows.get(index.internal_id())?;
        if !row.children.is_empty() {
            return None;
        }
        row.cells.get(column - 1)?.clone()
    }

    fn create_index_for_id(storage: &RowStorage, id: RowId, column: usize) -> Option<ModelIndex> {
        let row = storage.row_of(id)?;
        let parent_index = match storage.parent_of(id) {
            Some(pid) => Self::create_index_for_id(storage, pid, KEY_COLUMN)?,
            None => ModelIndex::invalid(),
        };
        Some(ModelIndex::new(row, column, parent_index, id))
    }

    fn parent_row_id(parent: &ModelIndex) -> Option<RowId> {
        parent.is_valid().then(|| parent.internal_id())
    }

    // ------------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------------

    /// Applies an edit made through the item-model interface.
    ///
    /// Equal values succeed without writing. Otherwise the value is
    /// converted to the type the cell already holds and handed to `write`
    /// together with the cell's path. Returns `false`, after logging a
    /// warning, when the cell cannot take the value.
    pub(crate) fn apply_edit<W>(&self, index: &ModelIndex, value: ItemData, role: ItemRole, write: W) -> bool
    where
        W: FnOnce(&ConfigPath, ConfigValue) -> Result<()>,
    {
        if !matches!(role, ItemRole::Edit | ItemRole::Display | ItemRole::CheckState) {
            return false;
        }
        if !self.flags(index).editable {
            return false;
        }
        let (Some(current), Some(path)) = (self.cell_value(index), self.path_to_value(index)) else {
            return false;
        };
        let Some(requested) = value.to_config_value() else {
            tracing::warn!(target: targets::MODEL, %path, ?value, "edit value has no configuration type");
            return false;
        };
        if requested == current {
            return true;
        }

        let Some(converted) = requested.coerce_like(&current) else {
            let err = TreeError::invalid_value_type(&path, current.type_name(), &requested);
            tracing::warn!(target: targets::MODEL, %err, "rejected edit");
            return false;
        };

        match write(&path, converted) {
            Ok(()) => {
                self.dict_modified.emit(());
                true
            }
            Err(err) => {
                tracing::warn!(target: targets::MODEL, %err, "rejected edit");
                false
            }
        }
    }
}

impl ItemModel for DictTreeModel {
    fn row_count(&self, parent: &ModelIndex) -> usize {
        if parent.is_valid() && parent.column() != KEY_COLUMN {
            return 0;
        }
        self.rows
            .read()
            .children_of(Self::parent_row_id(parent))
            .len()
    }

    fn column_count(&self, _parent: &ModelIndex) -> usize {
        self.schema.column_count()
    }

    fn data(&self, index: &ModelIndex, role: ItemRole) -> ItemData {
        if !index.is_valid() {
            return ItemData::None;
        }

        if index.column() == KEY_COLUMN {
            let rows = self.rows.read();
            return match (rows.get(index.internal_id()), role) {
                (Some(row), ItemRole::Display | ItemRole::Edit) => ItemData::String(row.key.to_string()),
                _ => ItemData::None,
            };
        }

        let Some(value) = self.cell_value(index) else {
            return ItemData::None;
        };
        match (role, &value) {
            // Views draw booleans as a checkbox.
            (ItemRole::Display, ConfigValue::Bool(_)) => ItemData::None,
            (ItemRole::Display | ItemRole::Edit, _) => ItemData::from(&value),
            (ItemRole::CheckState, ConfigValue::Bool(checked)) => {
                ItemData::CheckState(CheckState::from(*checked))
            }
            _ => ItemData::None,
        }
    }

    fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex {
        if column >= self.schema.column_count() {
            return ModelIndex::invalid();
        }
        let rows = self.rows.read();
        match rows.child_at(Self::parent_row_id(parent), row) {
            Some(id) => ModelIndex::new(row, column, parent.sibling_at_column(KEY_COLUMN), id),
            None => ModelIndex::invalid(),
        }
    }

    fn parent(&self, index: &ModelIndex) -> ModelIndex {
        if !index.is_valid() {
            return ModelIndex::invalid();
        }
        let rows = self.rows.read();
        rows.parent_of(index.internal_id())
            .and_then(|pid| Self::create_index_for_id(&rows, pid, KEY_COLUMN))
            .unwrap_or_else(ModelIndex::invalid)
    }

    fn signals(&self) -> &ModelSignals {
        &self.signals
    }

    fn set_data(&self, index: &ModelIndex, value: ItemData, role: ItemRole) -> bool {
        self.apply_edit(index, value, role, |path, value| self.write_config(path, value))
    }

    fn flags(&self, index: &ModelIndex) -> ItemFlags {
        if !index.is_valid() {
            return ItemFlags::disabled();
        }

        let rows = self.rows.read();
        let Some(row) = rows.get(index.internal_id()) else {
            return ItemFlags::disabled();
        };
        let flags = ItemFlags::new().with_never_has_children(row.children.is_empty());
        if index.column() == KEY_COLUMN {
            return flags;
        }

        let cell = row.cells.get(index.column() - 1).and_then(Option::as_ref);
        let editable = self.is_editable() && row.children.is_empty() && cell.is_some();
        flags
            .with_editable(editable)
            .with_checkable(matches!(cell, Some(ConfigValue::Bool(_))))
    }

    fn has_children(&self, parent: &ModelIndex) -> bool {
        self.row_count(parent) > 0
    }

    fn header_data(&self, section: usize, orientation: Orientation, role: ItemRole) -> ItemData {
        match (orientation, role) {
            (Orientation::Horizontal, ItemRole::Display) => self
                .schema
                .header(section)
                .map(ItemData::from)
                .unwrap_or_default(),
            _ => ItemData::None,
        }
    }
}

/// The list holding the element at `path`, and the element's position.
fn list_at<'a>(config: &'a mut ConfigNode, path: &ConfigPath) -> Result<(&'a mut Vec<ConfigNode>, usize)> {
    let Some(&PathSegment::Index(position)) = path.last() else {
        return Err(TreeError::invalid_structure_edit(path, "not a list element"));
    };
    match config.get_mut(&path.parent().unwrap_or_default()) {
        Ok(ConfigNode::List(items)) => Ok((items, position)),
        _ => Err(TreeError::path_not_found(path)),
    }
}
