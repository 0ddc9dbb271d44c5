//! Human-readable dumps of configuration trees.

use std::fmt::{self, Write as _};

use paramtree_core::TreeFormatOptions;

use super::node::ConfigNode;
use super::parameter::PARAM_KEY;

/// Debug utility for visualizing configuration trees.
///
/// # Example
///
/// ```
/// use paramtree::config::{ConfigMap, ConfigNode, ConfigTreeDebug};
///
/// let config: ConfigNode = ConfigMap::new()
///     .with("beam", ConfigMap::new().with("energy", 65.35))
///     .into();
///
/// let dump = ConfigTreeDebug::new().format(&config);
/// assert!(dump.contains("energy = 65.35"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigTreeDebug {
    options: TreeFormatOptions,
}

impl ConfigTreeDebug {
    /// Create a new debug visualizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a debug visualizer with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format a whole tree.
    pub fn format(&self, root: &ConfigNode) -> String {
        let mut output = String::new();
        match root {
            ConfigNode::Value(value) => {
                writeln!(output, "{value}").expect("write to String");
            }
            _ => self.format_children(root, &mut Vec::new(), &mut output),
        }
        output
    }

    /// `lineage` holds the is-last flag of every row above `node`'s children.
    fn format_children(&self, node: &ConfigNode, lineage: &mut Vec<bool>, output: &mut String) {
        let depth = lineage.len() + 1;
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return;
        }

        let mut children: Vec<(String, &ConfigNode)> = match node {
            ConfigNode::Map(map) => map.iter().map(|(k, v)| (k.to_string(), v)).collect(),
            ConfigNode::List(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
            ConfigNode::Value(_) => Vec::new(),
        };

        let param_line = match node {
            ConfigNode::Map(map) if self.options.show_parameters => {
                map.param().map(|param| param.read().to_string())
            }
            _ => None,
        };

        let total = children.len() + usize::from(param_line.is_some());
        for (i, (key, child)) in children.drain(..).enumerate() {
            let is_last = i + 1 == total;
            output.push_str(&self.options.prefix(lineage, is_last));
            output.push_str(&key);
            match child {
                ConfigNode::Value(value) if self.options.show_values => {
                    write!(output, " = {value}").expect("write to String");
                }
                _ => {}
            }
            output.push('\n');
            if !child.is_leaf() {
                lineage.push(is_last);
                self.format_children(child, lineage, output);
                lineage.pop();
            }
        }

        if let Some(line) = param_line {
            output.push_str(&self.options.prefix(lineage, true));
            writeln!(output, "{PARAM_KEY}: {line}").expect("write to String");
        }
    }
}

/// Wrapper that implements [`fmt::Display`] for a tree using default options.
pub struct DisplayTree<'a>(pub &'a ConfigNode);

impl fmt::Display for DisplayTree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&ConfigTreeDebug::new().format(self.0))
    }
}
