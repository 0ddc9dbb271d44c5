//! The item-model contract and the notifications that go with it.
//!
//! Views only ever talk to a configuration tree through [`ItemModel`]: they
//! count rows, ask cells for data by role, and push edits back with
//! `set_data`. Models answer structural changes through [`ModelSignals`].

use paramtree_core::Signal;

use super::index::ModelIndex;
use super::role::{CheckState, ItemData, ItemRole};

/// What a view may do with a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemFlags {
    /// The cell can be selected.
    pub selectable: bool,
    /// The cell opens an editor.
    pub editable: bool,
    /// The cell shows a checkbox.
    pub checkable: bool,
    /// The cell reacts to input at all.
    pub enabled: bool,
    /// The row is a leaf, so views can skip the expand arrow.
    pub never_has_children: bool,
}

impl ItemFlags {
    /// An enabled, selectable, read-only cell.
    pub fn new() -> Self {
        Self {
            selectable: true,
            enabled: true,
            ..Self::default()
        }
    }

    /// A cell nothing can interact with. Returned for invalid indices.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Sets whether the cell opens an editor.
    pub fn with_editable(self, editable: bool) -> Self {
        Self { editable, ..self }
    }

    /// Sets whether the cell shows a checkbox.
    pub fn with_checkable(self, checkable: bool) -> Self {
        Self { checkable, ..self }
    }

    /// Marks the row as a leaf.
    pub fn with_never_has_children(self, never_has_children: bool) -> Self {
        Self {
            never_has_children,
            ..self
        }
    }
}

/// Which header a `header_data` call asks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Column headers.
    Horizontal,
    /// Row headers. Configuration trees have none.
    Vertical,
}

/// A hierarchical, multi-column model of a configuration tree.
///
/// Passing [`ModelIndex::invalid()`] as a parent addresses the top level.
/// Only the key column (column 0) of a row has children.
///
/// Implementors provide the structural queries and `data`; editable models
/// override [`set_data`](ItemModel::set_data) and
/// [`flags`](ItemModel::flags) and announce writes through
/// [`ModelSignals::data_changed`].
pub trait ItemModel: Send + Sync {
    /// Rows directly under `parent`.
    fn row_count(&self, parent: &ModelIndex) -> usize;

    /// Columns of the rows under `parent`: the key column plus one per
    /// attribute.
    fn column_count(&self, parent: &ModelIndex) -> usize;

    /// The cell content for `role`, or [`ItemData::None`].
    fn data(&self, index: &ModelIndex, role: ItemRole) -> ItemData;

    /// The index of the cell at (`row`, `column`) under `parent`, invalid
    /// when there is no such cell.
    fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex;

    /// The key-column index of the row owning `index`; invalid at the top
    /// level.
    fn parent(&self, index: &ModelIndex) -> ModelIndex;

    /// The model's change notifications.
    fn signals(&self) -> &ModelSignals;

    /// Writes an edit back. Read-only models reject everything.
    fn set_data(&self, _index: &ModelIndex, _value: ItemData, _role: ItemRole) -> bool {
        false
    }

    /// What a view may do with the cell at `index`.
    fn flags(&self, _index: &ModelIndex) -> ItemFlags {
        ItemFlags::new()
    }

    /// Returns true if `parent` has rows under it.
    fn has_children(&self, parent: &ModelIndex) -> bool {
        self.row_count(parent) > 0
    }

    /// Header content for `section`.
    fn header_data(&self, _section: usize, _orientation: Orientation, _role: ItemRole) -> ItemData {
        ItemData::None
    }

    /// Shorthand for the display text of a cell.
    fn display_text(&self, index: &ModelIndex) -> Option<String> {
        self.data(index, ItemRole::Display).into_string()
    }

    /// Shorthand for the checkbox state of a boolean cell.
    fn check_state(&self, index: &ModelIndex) -> Option<CheckState> {
        self.data(index, ItemRole::CheckState).as_check_state()
    }

    /// Toggles a boolean cell the way a checkbox click would.
    fn set_check_state(&self, index: &ModelIndex, state: CheckState) -> bool {
        self.set_data(index, ItemData::CheckState(state), ItemRole::CheckState)
    }
}

/// Notifications a tree model emits.
///
/// Cell writes that keep the tree's shape emit `data_changed` for the cells
/// involved. Anything that changes the shape is wrapped in
/// `model_about_to_reset` / `model_reset`, and every index handed out
/// before the reset is stale afterwards.
#[derive(Default)]
pub struct ModelSignals {
    /// `(top_left, bottom_right, roles)` of the cells whose content changed.
    pub data_changed: Signal<(ModelIndex, ModelIndex, Vec<ItemRole>)>,
    /// Emitted before the tree is rebuilt; indices are still valid.
    pub model_about_to_reset: Signal<()>,
    /// Emitted once the rebuilt tree is in place.
    pub model_reset: Signal<()>,
}

impl ModelSignals {
    /// Signals with nothing connected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Announces a change confined to one cell.
    pub fn emit_data_changed_single(&self, index: ModelIndex, roles: Vec<ItemRole>) {
        self.data_changed.emit((index.clone(), index, roles));
    }

    /// Runs `rebuild` between the two reset notifications and returns its
    /// result.
    pub fn emit_reset<F, R>(&self, rebuild: F) -> R
    where
        F: FnOnce() -> R,
    {
        self.model_about_to_reset.emit(());
        let rebuilt = rebuild();
        self.model_reset.emit(());
        rebuilt
    }
}
