//! Tree model options.
//!
//! Options control how a model presents and edits a configuration: which
//! paths are hidden, whether cells are editable, how close a value must be
//! to a bound before it is highlighted, and which structural edits (list
//! resizing, key switching) are offered.
//!
//! # Loading options
//!
//! ```
//! use paramtree::TreeModelOptions;
//!
//! let options = TreeModelOptions::from_toml_str(r#"
//! editable = false
//! boundary_tolerance = 0.01
//! blacklisted_paths = [["detector", "transform"]]
//! "#).unwrap();
//!
//! assert!(!options.editable);
//! assert_eq!(options.blacklisted_paths.len(), 1);
//! ```
//!
//! # Switchable keys
//!
//! A mapping can hold one of several alternative keys, each with its own
//! default content. Every alternative is listed as a `[[combo_keys]]` entry
//! naming the mapping that holds it:
//!
//! ```
//! use paramtree::TreeModelOptions;
//! use paramtree::config::ConfigPath;
//!
//! let options = TreeModelOptions::from_toml_str(r#"
//! [[combo_keys]]
//! parent = ["seed_search", "method"]
//! key = "label"
//! default = { filter_radius = 1.0, threshold = 1.0 }
//!
//! [[combo_keys]]
//! parent = ["seed_search", "method"]
//! key = "blob_dog"
//! default = { min_sigma = 0.5, max_sigma = 5.0 }
//! "#).unwrap();
//!
//! let method = ConfigPath::from(["seed_search", "method"]);
//! let choices: Vec<_> = options.combo_choices(&method).map(|c| c.key.as_str()).collect();
//! assert_eq!(choices, vec!["label", "blob_dog"]);
//! ```

use std::fs;
use std::path::Path;

use paramtree_core::{Result, TreeError};
use serde::{Deserialize, Serialize};

use crate::config::ConfigPath;

/// Tolerance below which a value counts as sitting on a bound.
pub const DEFAULT_BOUNDARY_TOLERANCE: f64 = 1e-3;

/// One alternative for a switchable key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboKey {
    /// The mapping holding the key.
    pub parent: ConfigPath,
    /// The key name.
    pub key: String,
    /// Content written under the key when the mapping switches to it.
    pub default: serde_json::Value,
}

impl ComboKey {
    /// Creates an alternative for `key` under `parent`.
    pub fn new(
        parent: impl Into<ConfigPath>,
        key: impl Into<String>,
        default: serde_json::Value,
    ) -> Self {
        Self {
            parent: parent.into(),
            key: key.into(),
            default,
        }
    }
}

/// Presentation options shared by every tree model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeModelOptions {
    /// Whether cells may be edited at all.
    pub editable: bool,
    /// Absolute tolerance for boundary highlighting.
    pub boundary_tolerance: f64,
    /// Paths excluded from the tree, with everything below them.
    pub blacklisted_paths: Vec<ConfigPath>,
    /// Hide keys starting with an underscore.
    pub hide_private_keys: bool,
    /// Whether list elements may be inserted and removed.
    pub lists_resizable: bool,
    /// Switchable keys, in the order their choices are offered.
    pub combo_keys: Vec<ComboKey>,
}

impl Default for TreeModelOptions {
    fn default() -> Self {
        Self {
            editable: true,
            boundary_tolerance: DEFAULT_BOUNDARY_TOLERANCE,
            blacklisted_paths: Vec::new(),
            hide_private_keys: true,
            lists_resizable: true,
            combo_keys: Vec::new(),
        }
    }
}

impl TreeModelOptions {
    /// Creates the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether cells are editable.
    pub fn with_editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    /// Sets the boundary highlighting tolerance.
    pub fn with_boundary_tolerance(mut self, tolerance: f64) -> Self {
        self.boundary_tolerance = tolerance;
        self
    }

    /// Sets the blacklisted paths.
    pub fn with_blacklisted_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<ConfigPath>,
    {
        self.blacklisted_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Sets whether underscore-prefixed keys are hidden.
    pub fn with_hide_private_keys(mut self, hide: bool) -> Self {
        self.hide_private_keys = hide;
        self
    }

    /// Sets whether list elements may be inserted and removed.
    pub fn with_lists_resizable(mut self, resizable: bool) -> Self {
        self.lists_resizable = resizable;
        self
    }

    /// Sets the switchable keys.
    pub fn with_combo_keys(mut self, keys: impl IntoIterator<Item = ComboKey>) -> Self {
        self.combo_keys = keys.into_iter().collect();
        self
    }

    /// The alternatives offered for keys of the mapping at `parent`.
    pub fn combo_choices<'a, 'p>(&'a self, parent: &'p ConfigPath) -> impl Iterator<Item = &'a ComboKey> + use<'a, 'p> {
        self.combo_keys.iter().filter(move |combo| combo.parent == *parent)
    }

    /// The alternative `key` of the mapping at `parent`.
    pub fn combo_choice(&self, parent: &ConfigPath, key: &str) -> Option<&ComboKey> {
        self.combo_choices(parent).find(|combo| combo.key == key)
    }

    /// Returns true if `path` is blacklisted.
    pub fn is_blacklisted(&self, path: &ConfigPath) -> bool {
        self.blacklisted_paths.iter().any(|p| p == path)
    }

    /// Parses options from a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let options: Self =
            toml::from_str(s).map_err(|e| TreeError::options(e.to_string()))?;
        options.validate()
    }

    /// Parses options from a JSON document.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let options: Self =
            serde_json::from_str(s).map_err(|e| TreeError::options(e.to_string()))?;
        options.validate()
    }

    /// Renders the options as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| TreeError::options(e.to_string()))
    }

    /// Renders the options as JSON.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| TreeError::options(e.to_string()))
    }

    /// Loads options from a file. Files ending in `.json` are read as JSON,
    /// anything else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| TreeError::options(format!("{}: {e}", path.display())))?;
        let options = if is_json(path) {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        };
        options.map_err(|e| TreeError::options(format!("{}: {e}", path.display())))
    }

    /// Saves options to a file, choosing the format like [`load`](Self::load).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_json(path) {
            self.to_json_string()?
        } else {
            self.to_toml_string()?
        };
        fs::write(path, content)
            .map_err(|e| TreeError::options(format!("{}: {e}", path.display())))
    }

    fn validate(self) -> Result<Self> {
        if !self.boundary_tolerance.is_finite() || self.boundary_tolerance < 0.0 {
            return Err(TreeError::options(format!(
                "boundary_tolerance must be a non-negative number, got {}",
                self.boundary_tolerance
            )));
        }
        for (i, combo) in self.combo_keys.iter().enumerate() {
            let repeated = self.combo_keys[..i]
                .iter()
                .any(|earlier| earlier.parent == combo.parent && earlier.key == combo.key);
            if repeated {
                return Err(TreeError::options(format!(
                    "combo key {} is listed twice under {}",
                    combo.key, combo.parent
                )));
            }
        }
        Ok(self)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
