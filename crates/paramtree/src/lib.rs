//! paramtree - hierarchical configuration tree models.
//!
//! Presents a nested configuration mapping as a multi-column tree whose
//! cells stay synchronized with the refinable parameters attached to each
//! row, and redraws animated artists when the configuration changes.
//!
//! # Example
//!
//! ```
//! use paramtree::prelude::*;
//!
//! let tilt = Parameter::new("tilt", 0.2).with_bounds(0.0, 0.5).shared();
//! let config = ConfigNode::from(
//!     ConfigMap::new().with("panel", ConfigMap::new().with("tilt", ConfigMap::from_parameter(tilt.clone()))),
//! )
//! .shared();
//!
//! let model = CalibrationTreeModel::new(config, CalibrationVariant::Default);
//! model
//!     .set_config_val(&ConfigPath::from(["panel", "tilt", "_value"]), 0.9)
//!     .unwrap();
//!
//! assert_eq!(tilt.read().value, 0.9);
//! assert!(tilt.read().in_bounds());
//! ```

#![warn(missing_docs)]

pub use paramtree_core::*;

pub mod blit;
pub mod config;
pub mod model;
mod options;
pub mod prelude;

pub use options::{ComboKey, TreeModelOptions, DEFAULT_BOUNDARY_TOLERANCE};
