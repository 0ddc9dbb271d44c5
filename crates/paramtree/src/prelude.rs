//! Prelude module for paramtree.
//!
//! ```
//! use paramtree::prelude::*;
//! ```
//!
//! This provides access to:
//! - Configuration trees (`ConfigNode`, `ConfigMap`, `ConfigPath`, `Parameter`)
//! - Tree models (`DictTreeModel`, `CalibrationTreeModel`, `ItemModel`)
//! - The blit manager (`BlitManager`, `ArtistTree`, `RenderBackend`)
//! - Signals and errors

// ============================================================================
// Signals and Errors
// ============================================================================

pub use crate::{ConnectionId, Result, Signal, TreeError};

// ============================================================================
// Configuration
// ============================================================================

pub use crate::config::{
    ConfigMap, ConfigNode, ConfigPath, ConfigValue, ParamAttribute, Parameter, PathSegment,
    SharedConfig, SharedParameter,
};
pub use crate::{ComboKey, TreeModelOptions};

// ============================================================================
// Models
// ============================================================================

pub use crate::model::{
    CalibrationTreeModel, CalibrationVariant, ColumnDescriptor, ColumnSchema, DictTreeModel,
    ItemData, ItemFlags, ItemModel, ItemRole, ModelIndex, Orientation,
};

// ============================================================================
// Blitting
// ============================================================================

pub use crate::blit::{ArtistTree, BlitManager, RedrawRequest, RenderBackend};
