//! Cell addresses handed out by tree models.
//!
//! Every column of a row shares the row's internal id, which the model
//! assigned when it built the row. Ids are never reused across rebuilds, so
//! an index kept past a reset simply stops resolving.

use std::fmt;

/// Addresses one cell of an [`ItemModel`](super::ItemModel): a row and a
/// column under a parent row.
///
/// The invalid index addresses nothing; as a parent it stands for the top
/// level of the tree.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct ModelIndex(Option<Box<Cell>>);

#[derive(Clone, PartialEq, Eq, Hash)]
struct Cell {
    row: usize,
    column: usize,
    internal_id: u64,
    parent: ModelIndex,
}

impl ModelIndex {
    /// The index that addresses nothing.
    #[inline]
    pub const fn invalid() -> Self {
        Self(None)
    }

    /// Builds an index for a cell of the row identified by `internal_id`.
    /// Only models should call this.
    pub fn new(row: usize, column: usize, parent: ModelIndex, internal_id: u64) -> Self {
        Self(Some(Box::new(Cell {
            row,
            column,
            internal_id,
            parent,
        })))
    }

    /// False for the invalid index.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.0.is_some()
    }

    /// Position among the parent's rows; 0 when invalid.
    #[inline]
    pub fn row(&self) -> usize {
        self.0.as_ref().map_or(0, |cell| cell.row)
    }

    /// 0 when invalid.
    #[inline]
    pub fn column(&self) -> usize {
        self.0.as_ref().map_or(0, |cell| cell.column)
    }

    /// The parent row's key-column index; invalid for top-level rows.
    pub fn parent(&self) -> ModelIndex {
        self.0
            .as_ref()
            .map(|cell| cell.parent.clone())
            .unwrap_or_default()
    }

    /// The row id the owning model assigned.
    #[inline]
    pub fn internal_id(&self) -> u64 {
        self.0.as_ref().map_or(0, |cell| cell.internal_id)
    }

    /// The same row at another column.
    pub fn sibling_at_column(&self, column: usize) -> ModelIndex {
        match &self.0 {
            Some(cell) => ModelIndex::new(cell.row, column, cell.parent.clone(), cell.internal_id),
            None => ModelIndex::invalid(),
        }
    }

    /// Number of ancestors; top-level rows are at depth 0.
    pub fn depth(&self) -> usize {
        std::iter::successors(self.0.as_deref(), |cell| cell.parent.0.as_deref())
            .count()
            .saturating_sub(1)
    }
}

impl fmt::Debug for ModelIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(cell) => write!(
                f,
                "ModelIndex(row {}, column {}, depth {}, id {})",
                cell.row,
                cell.column,
                self.depth(),
                cell.internal_id
            ),
            None => f.write_str("ModelIndex(invalid)"),
        }
    }
}
