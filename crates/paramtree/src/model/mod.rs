//! Tree models over configuration mappings.
//!
//! This module provides the item-model contract views read from, plus the
//! two models built on it.
//!
//! # Core Types
//!
//! - [`ItemModel`]: the trait views use to query rows, cells and flags
//! - [`ModelIndex`]: addresses a cell by row, column and parent
//! - [`ItemRole`]: what aspect of a cell is requested (display, edit, ...)
//! - [`ItemData`]: the data returned for a role
//! - [`ModelSignals`]: change notifications emitted by models
//!
//! # Models
//!
//! - [`DictTreeModel`]: a multi-column tree over any configuration mapping
//! - [`CalibrationTreeModel`]: a dictionary model whose cells are backed by
//!   row parameters, with bound re-centering and boundary highlighting
//!
//! # Example
//!
//! ```
//! use paramtree::config::{ConfigMap, ConfigNode, Parameter};
//! use paramtree::model::{CalibrationTreeModel, CalibrationVariant, ItemModel, ModelIndex};
//!
//! let tilt = Parameter::new("tilt", 0.0).with_bounds(-1.0, 1.0).shared();
//! let config = ConfigNode::from(ConfigMap::new().with("tilt", ConfigMap::from_parameter(tilt))).shared();
//!
//! let model = CalibrationTreeModel::new(config, CalibrationVariant::Default);
//! assert_eq!(model.row_count(&ModelIndex::invalid()), 1);
//! assert_eq!(model.column_count(&ModelIndex::invalid()), 5);
//! ```

mod calibration;
mod dict_tree_model;
mod index;
mod role;
mod schema;
mod traits;

pub use calibration::{CalibrationTreeModel, CalibrationVariant};
pub use dict_tree_model::DictTreeModel;
pub use index::ModelIndex;
pub use role::{CheckState, Color, ItemData, ItemRole};
pub use schema::{ColumnDescriptor, ColumnSchema, KEY_COLUMN, KEY_HEADER};
pub use traits::{ItemFlags, ItemModel, ModelSignals, Orientation};
