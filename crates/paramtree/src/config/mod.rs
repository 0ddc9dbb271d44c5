//! Configuration trees.
//!
//! A configuration is an arbitrarily nested, insertion-ordered mapping owned
//! by the application. Models hold a [`SharedConfig`] handle to it and never
//! copy it.
//!
//! # Core Types
//!
//! - [`ConfigNode`]: a tagged tree node (value, map or list)
//! - [`ConfigMap`]: an ordered mapping that may carry a [`Parameter`]
//! - [`ConfigValue`]: the scalar stored at leaves
//! - [`ConfigPath`]: root-to-node addressing
//! - [`Parameter`]: value, bounds, vary flag and delta of a refinable quantity
//!
//! # Parameter Rows
//!
//! A row backed by a parameter is a mapping whose `_value`, `_vary`, `_min`,
//! `_max` (and optionally `_delta`) entries mirror the parameter attributes:
//!
//! ```
//! use paramtree::config::{ConfigMap, ConfigNode, ConfigPath, Parameter};
//!
//! let energy = Parameter::new("energy", 65.35).with_bounds(60.0, 70.0).shared();
//! let config: ConfigNode = ConfigMap::new()
//!     .with("beam", ConfigMap::new().with("energy", ConfigMap::from_parameter(energy)))
//!     .into();
//!
//! let path = ConfigPath::from(["beam", "energy", "_max"]);
//! assert_eq!(config.get(&path).unwrap().as_value().and_then(|v| v.as_f64()), Some(70.0));
//! ```

mod debug;
mod node;
mod parameter;
mod path;
mod value;

pub use debug::{ConfigTreeDebug, DisplayTree};
pub use node::{ConfigMap, ConfigNode, SharedConfig};
pub use parameter::{ParamAttribute, Parameter, SharedParameter, PARAM_KEY};
pub use path::{ConfigPath, PathSegment};
pub use value::ConfigValue;
