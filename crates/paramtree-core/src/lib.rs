//! Core systems for paramtree.
//!
//! This crate provides the foundations shared by the configuration tree
//! models:
//!
//! - **Signal/Slot System**: observer registration for change notification
//! - **Errors**: the [`TreeError`] taxonomy shared by every operation
//! - **Logging**: `tracing` targets and tree formatting options
//!
//! # Signal/Slot Example
//!
//! ```
//! use paramtree_core::Signal;
//!
//! let value_changed = Signal::<f64>::new();
//!
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! value_changed.emit(4.2);
//! value_changed.disconnect(conn_id);
//! ```

#![warn(missing_docs)]

mod error;
pub mod logging;
pub mod signal;

pub use error::{Result, TreeError};
pub use logging::{PerfSpan, TreeFormatOptions, TreeStyle};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
