//! The tagged tree holding a configuration.

use std::sync::Arc;

use paramtree_core::logging::targets;
use paramtree_core::{Result, TreeError};
use parking_lot::RwLock;

use super::parameter::{ParamAttribute, Parameter, SharedParameter, PARAM_KEY};
use super::path::{ConfigPath, PathSegment};
use super::value::ConfigValue;

/// A configuration tree shared between its owner and any attached models.
pub type SharedConfig = Arc<RwLock<ConfigNode>>;

/// A node of a configuration tree.
#[derive(Debug, Clone)]
pub enum ConfigNode {
    /// A scalar leaf.
    Value(ConfigValue),
    /// An insertion-ordered mapping, optionally carrying a parameter.
    Map(ConfigMap),
    /// An ordered list.
    List(Vec<ConfigNode>),
}

impl Default for ConfigNode {
    fn default() -> Self {
        ConfigNode::Map(ConfigMap::new())
    }
}

impl ConfigNode {
    /// Wraps this node in a shared handle.
    pub fn shared(self) -> SharedConfig {
        Arc::new(RwLock::new(self))
    }

    /// Returns the leaf value, if this node is one.
    pub fn as_value(&self) -> Option<&ConfigValue> {
        match self {
            ConfigNode::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the mapping, if this node is one.
    pub fn as_map(&self) -> Option<&ConfigMap> {
        match self {
            ConfigNode::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the mapping mutably, if this node is one.
    pub fn as_map_mut(&mut self) -> Option<&mut ConfigMap> {
        match self {
            ConfigNode::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns true for scalar leaves.
    pub fn is_leaf(&self) -> bool {
        matches!(self, ConfigNode::Value(_))
    }

    /// Returns the direct child addressed by `segment`.
    pub fn child(&self, segment: &PathSegment) -> Option<&ConfigNode> {
        match (self, segment) {
            (ConfigNode::Map(map), PathSegment::Key(key)) => map.get(key),
            (ConfigNode::List(items), PathSegment::Index(i)) => items.get(*i),
            _ => None,
        }
    }

    /// Returns the direct child addressed by `segment`, mutably.
    pub fn child_mut(&mut self, segment: &PathSegment) -> Option<&mut ConfigNode> {
        match (self, segment) {
            (ConfigNode::Map(map), PathSegment::Key(key)) => map.get_mut(key),
            (ConfigNode::List(items), PathSegment::Index(i)) => items.get_mut(*i),
            _ => None,
        }
    }

    /// Resolves `path` to a node.
    ///
    /// Fails with [`TreeError::PathNotFound`] if any segment is absent.
    pub fn get(&self, path: &ConfigPath) -> Result<&ConfigNode> {
        path.segments()
            .iter()
            .try_fold(self, |node, segment| node.child(segment))
            .ok_or_else(|| TreeError::path_not_found(path))
    }

    /// Resolves `path` to a node, mutably.
    pub fn get_mut(&mut self, path: &ConfigPath) -> Result<&mut ConfigNode> {
        let mut node = self;
        for segment in path.segments() {
            node = node
                .child_mut(segment)
                .ok_or_else(|| TreeError::path_not_found(path))?;
        }
        Ok(node)
    }

    /// Writes `node` at `path`.
    ///
    /// Every segment but the last must exist. A missing last key is inserted
    /// at the end of its mapping; a list index must already exist.
    pub fn set(&mut self, path: &ConfigPath, node: ConfigNode) -> Result<()> {
        let Some(last) = path.last() else {
            *self = node;
            return Ok(());
        };
        let parent_path = path.parent().unwrap_or_default();
        let parent = self
            .get_mut(&parent_path)
            .map_err(|_| TreeError::path_not_found(path))?;

        match (parent, last) {
            (ConfigNode::Map(map), PathSegment::Key(key)) => {
                map.insert(key.clone(), node);
                Ok(())
            }
            (ConfigNode::List(items), PathSegment::Index(i)) if *i < items.len() => {
                items[*i] = node;
                Ok(())
            }
            _ => Err(TreeError::path_not_found(path)),
        }
    }

    /// Returns the parameter attached to the mapping at `path`.
    ///
    /// Fails with [`TreeError::MissingParameter`] if there is no mapping at
    /// `path` or it carries no parameter. The error names `path + [_param]`.
    pub fn parameter(&self, path: &ConfigPath) -> Result<SharedParameter> {
        self.get(path)
            .ok()
            .and_then(ConfigNode::as_map)
            .and_then(ConfigMap::param)
            .cloned()
            .ok_or_else(|| TreeError::missing_parameter(path.join(PARAM_KEY)))
    }

    /// Attaches a parameter to every mapping that has a `_value` column but no
    /// parameter yet, reading the remaining attributes from the sibling
    /// columns. Returns the number of parameters created.
    ///
    /// This turns a plain document (for instance loaded from JSON) into a
    /// tree the calibration models can drive.
    pub fn attach_parameters(&mut self) -> usize {
        let mut created = 0;
        let mut stack: Vec<(Option<String>, &mut ConfigNode)> = vec![(None, self)];

        while let Some((name, node)) = stack.pop() {
            match node {
                ConfigNode::Map(map) => {
                    if map.param.is_none() {
                        if let Some(param) = map.parameter_from_columns(name.as_deref()) {
                            map.param = Some(param.shared());
                            created += 1;
                        }
                    }
                    for (key, child) in map.entries.iter_mut() {
                        stack.push((Some(key.clone()), child));
                    }
                }
                ConfigNode::List(items) => {
                    for (i, child) in items.iter_mut().enumerate() {
                        stack.push((Some(i.to_string()), child));
                    }
                }
                ConfigNode::Value(_) => {}
            }
        }

        tracing::debug!(target: targets::CONFIG, created, "parameters attached from columns");
        created
    }

    /// Builds a tree from a JSON document.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => ConfigNode::Value(ConfigValue::Null),
            serde_json::Value::Bool(b) => ConfigNode::Value(ConfigValue::Bool(b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    ConfigNode::Value(ConfigValue::Int(i))
                } else if let Some(f) = n.as_f64() {
                    ConfigNode::Value(ConfigValue::Float(f))
                } else {
                    ConfigNode::Value(ConfigValue::Null)
                }
            }
            serde_json::Value::String(s) => ConfigNode::Value(ConfigValue::String(s)),
            serde_json::Value::Array(items) => {
                ConfigNode::List(items.into_iter().map(Self::from_json).collect())
            }
            serde_json::Value::Object(object) => ConfigNode::Map(
                object
                    .into_iter()
                    .map(|(key, value)| (key, Self::from_json(value)))
                    .collect(),
            ),
        }
    }

    /// Converts the tree to a JSON document.
    ///
    /// Attached parameters are not written; their attributes already live in
    /// the sibling columns.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ConfigNode::Value(value) => serde_json::to_value(value).unwrap_or_default(),
            ConfigNode::List(items) => {
                serde_json::Value::Array(items.iter().map(Self::to_json).collect())
            }
            ConfigNode::Map(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(key, value)| (key.to_string(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<ConfigValue> for ConfigNode {
    fn from(value: ConfigValue) -> Self {
        ConfigNode::Value(value)
    }
}

impl From<ConfigMap> for ConfigNode {
    fn from(map: ConfigMap) -> Self {
        ConfigNode::Map(map)
    }
}

impl From<Vec<ConfigNode>> for ConfigNode {
    fn from(items: Vec<ConfigNode>) -> Self {
        ConfigNode::List(items)
    }
}

impl From<f64> for ConfigNode {
    fn from(v: f64) -> Self {
        ConfigNode::Value(v.into())
    }
}

impl From<i64> for ConfigNode {
    fn from(v: i64) -> Self {
        ConfigNode::Value(v.into())
    }
}

impl From<bool> for ConfigNode {
    fn from(v: bool) -> Self {
        ConfigNode::Value(v.into())
    }
}

impl From<&str> for ConfigNode {
    fn from(v: &str) -> Self {
        ConfigNode::Value(v.into())
    }
}

/// An insertion-ordered mapping from keys to nodes.
///
/// Key order is display order. A mapping may carry a [`SharedParameter`]
/// addressed as `_param`; it is not one of the entries.
#[derive(Debug, Clone, Default)]
pub struct ConfigMap {
    entries: Vec<(String, ConfigNode)>,
    param: Option<SharedParameter>,
}

impl ConfigMap {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the row for a parameter: `_value`, `_vary`, `_min`, `_max` and,
    /// when the parameter has one, `_delta`, with the parameter attached.
    pub fn from_parameter(param: SharedParameter) -> Self {
        let mut map = Self::new();
        {
            let p = param.read();
            for attribute in ParamAttribute::ALL {
                let value = p.get(attribute);
                if attribute == ParamAttribute::Delta && value.is_null() {
                    continue;
                }
                map.insert(attribute.key(), ConfigNode::Value(value));
            }
        }
        map.param = Some(param);
        map
    }

    /// Inserts an entry, builder style.
    pub fn with(mut self, key: impl Into<String>, node: impl Into<ConfigNode>) -> Self {
        self.insert(key, node);
        self
    }

    /// Attaches a parameter, builder style.
    pub fn with_param(mut self, param: SharedParameter) -> Self {
        self.param = Some(param);
        self
    }

    /// Inserts or replaces an entry. Replaced entries keep their position.
    pub fn insert(&mut self, key: impl Into<String>, node: impl Into<ConfigNode>) {
        let key = key.into();
        let node = node.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = node,
            None => self.entries.push((key, node)),
        }
    }

    /// Replaces the entry `old` with `new`, keeping its position.
    ///
    /// Returns the replaced node, or `None` without changing anything when
    /// `old` is absent or `new` names another existing entry.
    pub fn replace_key(
        &mut self,
        old: &str,
        new: impl Into<String>,
        node: impl Into<ConfigNode>,
    ) -> Option<ConfigNode> {
        let new = new.into();
        if new != old && self.contains_key(&new) {
            return None;
        }
        let entry = self.entries.iter_mut().find(|(k, _)| k == old)?;
        entry.0 = new;
        Some(std::mem::replace(&mut entry.1, node.into()))
    }

    /// Removes an entry, returning it.
    pub fn remove(&mut self, key: &str) -> Option<ConfigNode> {
        let position = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(position).1)
    }

    /// Returns the entry for `key`.
    pub fn get(&self, key: &str) -> Option<&ConfigNode> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns the entry for `key`, mutably.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut ConfigNode> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Returns the leaf value stored under `key`.
    pub fn value(&self, key: &str) -> Option<&ConfigValue> {
        self.get(key).and_then(ConfigNode::as_value)
    }

    /// Returns true if `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterates over the keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Iterates over the entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigNode)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the attached parameter.
    pub fn param(&self) -> Option<&SharedParameter> {
        self.param.as_ref()
    }

    /// Attaches or detaches a parameter.
    pub fn set_param(&mut self, param: Option<SharedParameter>) {
        self.param = param;
    }

    fn parameter_from_columns(&self, name: Option<&str>) -> Option<Parameter> {
        let value = self.value(ParamAttribute::Value.key())?.as_f64()?;
        let mut param = Parameter::new(name.unwrap_or_default(), value);
        for attribute in [
            ParamAttribute::Vary,
            ParamAttribute::Min,
            ParamAttribute::Max,
            ParamAttribute::Delta,
        ] {
            if let Some(stored) = self.value(attribute.key()) {
                // Columns of the wrong type are left at the parameter default.
                let _ = param.set(attribute, stored);
            }
        }
        Some(param)
    }
}

impl<K: Into<String>> FromIterator<(K, ConfigNode)> for ConfigMap {
    fn from_iter<I: IntoIterator<Item = (K, ConfigNode)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, node) in iter {
            map.insert(key, node);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> ConfigNode {
        let tilt = Parameter::new("tilt", 0.5).with_bounds(0.0, 1.0).shared();
        ConfigMap::new()
            .with(
                "detector",
                ConfigMap::new()
                    .with("tilt", ConfigMap::from_parameter(tilt))
                    .with("name", "panel_0"),
            )
            .with("rings", vec![ConfigNode::from(1.0), ConfigNode::from(2.0)])
            .into()
    }

    #[test]
    fn test_get_nested() {
        let config = sample();
        let path = ConfigPath::from(["detector", "tilt", "_value"]);
        assert_eq!(
            config.get(&path).unwrap().as_value(),
            Some(&ConfigValue::Float(0.5))
        );

        let mut path = ConfigPath::from(["rings"]);
        path.push(1usize);
        assert_eq!(
            config.get(&path).unwrap().as_value(),
            Some(&ConfigValue::Float(2.0))
        );
    }

    #[test]
    fn test_get_missing_path() {
        let config = sample();
        let path = ConfigPath::from(["detector", "nope", "_value"]);
        assert_eq!(
            config.get(&path).unwrap_err(),
            TreeError::path_not_found(&path)
        );
    }

    #[test]
    fn test_set_inserts_last_key_only() {
        let mut config = sample();
        let path = ConfigPath::from(["detector", "serial"]);
        config.set(&path, "X1".into()).unwrap();
        assert_eq!(
            config.get(&path).unwrap().as_value(),
            Some(&ConfigValue::from("X1"))
        );

        let deep = ConfigPath::from(["missing", "serial"]);
        assert!(matches!(
            config.set(&deep, 1.0.into()),
            Err(TreeError::PathNotFound { .. })
        ));
    }

    #[test]
    fn test_set_list_index_must_exist() {
        let mut config = sample();
        let mut path = ConfigPath::from(["rings"]);
        path.push(5usize);
        assert!(config.set(&path, 3.0.into()).is_err());
    }

    #[test]
    fn test_insert_keeps_order() {
        let mut map = ConfigMap::new().with("a", 1i64).with("b", 2i64);
        map.insert("a", 3i64);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(map.value("a"), Some(&ConfigValue::Int(3)));
    }

    #[test]
    fn test_replace_key_keeps_position() {
        let mut map = ConfigMap::new().with("a", 1i64).with("b", 2i64).with("c", 3i64);
        let old = map.replace_key("b", "d", 4i64).unwrap();
        assert_eq!(old.as_value(), Some(&ConfigValue::Int(2)));
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "d", "c"]);

        assert!(map.replace_key("a", "c", 5i64).is_none());
        assert!(map.replace_key("zz", "y", 5i64).is_none());
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "d", "c"]);
    }

    #[test]
    fn test_parameter_lookup() {
        let config = sample();
        let param = config
            .parameter(&ConfigPath::from(["detector", "tilt"]))
            .unwrap();
        assert_eq!(param.read().max, 1.0);

        let err = config
            .parameter(&ConfigPath::from(["detector"]))
            .unwrap_err();
        assert_eq!(
            err,
            TreeError::missing_parameter(ConfigPath::from(["detector", "_param"]))
        );
    }

    #[test]
    fn test_param_attach_and_detach() {
        let tilt = Parameter::new("tilt", 0.1).shared();
        let mut config: ConfigNode = ConfigMap::new()
            .with(
                "panel",
                ConfigMap::new().with("_value", 0.1).with_param(tilt.clone()),
            )
            .into();
        let panel = ConfigPath::from(["panel"]);
        assert!(Arc::ptr_eq(&config.parameter(&panel).unwrap(), &tilt));

        let map = config.get_mut(&panel).unwrap().as_map_mut().unwrap();
        map.set_param(None);
        assert!(map.param().is_none());
        assert!(matches!(
            config.parameter(&panel),
            Err(TreeError::MissingParameter { .. })
        ));

        // A detached mapping picks its parameter up again from its columns.
        assert_eq!(config.attach_parameters(), 1);
        assert_eq!(config.parameter(&panel).unwrap().read().value, 0.1);
    }

    #[test]
    fn test_attach_parameters_from_json() {
        let mut config = ConfigNode::from_json(json!({
            "beam": {
                "energy": {"_value": 65.35, "_vary": true, "_min": 60.0, "_max": 70.0},
                "polarization": {"_value": 0.0}
            },
            "name": "run_3"
        }));

        assert_eq!(config.attach_parameters(), 2);
        let energy = config
            .parameter(&ConfigPath::from(["beam", "energy"]))
            .unwrap();
        let energy = energy.read();
        assert_eq!(energy.name, "energy");
        assert!(energy.vary);
        assert_eq!((energy.min, energy.value, energy.max), (60.0, 65.35, 70.0));

        // Running it again does not replace existing parameters.
        assert_eq!(config.attach_parameters(), 0);
    }

    #[test]
    fn test_json_roundtrip_preserves_order() {
        let doc = json!({"z": 1, "a": {"_value": 2.5, "_vary": false}});
        let config = ConfigNode::from_json(doc.clone());
        let keys: Vec<_> = config.as_map().unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "a"]);
        assert_eq!(config.to_json(), doc);
    }
}
