//! The route value tree.
//!
//! Matching produces a [`RouteValues`] tree and resolving consumes one. Keys
//! are kept in sorted order so that iteration, comparison and query-string
//! rendering are deterministic. Nested nodes are addressed with dot paths
//! such as `article.title`.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use flowroute_core::{FlowrouteError, FlowrouteResult};

use crate::object::ObjectRef;

/// The key under which identity route parts and object conversion store an identifier.
pub const IDENTITY_KEY: &str = "__identity";

/// A single node of a route value tree.
#[derive(Clone)]
pub enum RouteValue {
    /// A string leaf.
    String(String),
    /// An integer leaf.
    Integer(i64),
    /// A boolean leaf.
    Bool(bool),
    /// An explicit null.
    Null,
    /// A nested map.
    Map(RouteValues),
    /// A reference to a domain object.
    Object(ObjectRef),
}

impl RouteValue {
    /// Builds the `{"__identity": identifier}` map used to reference an object.
    pub fn identity(identifier: impl Into<String>) -> Self {
        let mut map = RouteValues::new();
        map.insert(IDENTITY_KEY, Self::String(identifier.into()));
        Self::Map(map)
    }

    /// Returns the string slice if this is a string leaf.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the nested map if this is a map node.
    pub const fn as_map(&self) -> Option<&RouteValues> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the nested map mutably if this is a map node.
    pub fn as_map_mut(&mut self) -> Option<&mut RouteValues> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the object reference if this is an object node.
    pub const fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Returns `true` for an explicit null.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the scalar leaf as text: strings as-is, integers in decimal and
    /// booleans as `"1"` / `"0"`. Nulls, maps and objects have no scalar form.
    pub fn to_scalar_string(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(s.clone()),
            Self::Integer(i) => Some(i.to_string()),
            Self::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
            Self::Null | Self::Map(_) | Self::Object(_) => None,
        }
    }

    /// Returns `true` if this node is or contains an object reference.
    pub fn contains_object(&self) -> bool {
        match self {
            Self::Object(_) => true,
            Self::Map(m) => m.contains_object(),
            _ => false,
        }
    }

    /// Returns the identifier stored in a `{"__identity": ...}` map.
    pub fn identity_of(&self) -> Option<String> {
        self.as_map()?.get(IDENTITY_KEY)?.to_scalar_string()
    }
}

impl fmt::Debug for RouteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.debug_tuple("String").field(s).finish(),
            Self::Integer(i) => f.debug_tuple("Integer").field(i).finish(),
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Null => f.write_str("Null"),
            Self::Map(m) => f.debug_tuple("Map").field(m).finish(),
            Self::Object(o) => f
                .debug_tuple("Object")
                .field(&o.object_type())
                .field(&o.identifier())
                .finish(),
        }
    }
}

impl PartialEq for RouteValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Null, Self::Null) => true,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => {
                Arc::ptr_eq(a, b)
                    || (a.object_type() == b.object_type()
                        && a.identifier().is_some()
                        && a.identifier() == b.identifier())
            }
            _ => false,
        }
    }
}

impl From<&str> for RouteValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for RouteValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for RouteValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<bool> for RouteValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<RouteValues> for RouteValue {
    fn from(m: RouteValues) -> Self {
        Self::Map(m)
    }
}

impl From<ObjectRef> for RouteValue {
    fn from(o: ObjectRef) -> Self {
        Self::Object(o)
    }
}

impl From<serde_json::Value> for RouteValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map_or_else(|| Self::String(n.to_string()), Self::Integer),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => Self::Map(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| (i.to_string(), Self::from(v)))
                    .collect(),
            ),
            serde_json::Value::Object(map) => Self::Map(map.into()),
        }
    }
}

impl Serialize for RouteValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::String(s) => serializer.serialize_str(s),
            Self::Integer(i) => serializer.serialize_i64(*i),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Null => serializer.serialize_none(),
            Self::Map(m) => m.serialize(serializer),
            Self::Object(o) => match o.identifier() {
                Some(id) => {
                    let mut map = serializer.serialize_map(Some(1))?;
                    map.serialize_entry(IDENTITY_KEY, &id)?;
                    map.end()
                }
                None => serializer.serialize_none(),
            },
        }
    }
}

impl<'de> Deserialize<'de> for RouteValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Self::from)
    }
}

/// An ordered tree of route values keyed by name.
///
/// # Examples
///
/// ```
/// use flowroute_routing::values::{RouteValue, RouteValues};
///
/// let mut values = RouteValues::new();
/// values.set_path("article.title", RouteValue::from("hello"));
/// assert_eq!(values.get_path("article.title").and_then(RouteValue::as_str), Some("hello"));
/// ```
#[derive(Clone, Default, PartialEq)]
pub struct RouteValues(BTreeMap<String, RouteValue>);

impl RouteValues {
    /// Creates an empty tree.
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builds a tree from a JSON value. Anything other than a JSON object yields an empty tree.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(map) => map.into(),
            _ => Self::new(),
        }
    }

    /// Converts the tree to JSON. Objects become `{"__identity": ...}` maps.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&RouteValue> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut RouteValue> {
        self.0.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RouteValue>) -> Option<RouteValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<RouteValue> {
        self.0.remove(key)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, RouteValue> {
        self.0.iter()
    }

    pub fn keys(&self) -> btree_map::Keys<'_, String, RouteValue> {
        self.0.keys()
    }

    pub fn retain(&mut self, f: impl FnMut(&String, &mut RouteValue) -> bool) {
        self.0.retain(f);
    }

    /// Returns the node at a dot path (`a.b.c`).
    pub fn get_path(&self, path: &str) -> Option<&RouteValue> {
        let mut segments = path.split('.');
        let mut current = self.get(segments.next()?)?;
        for segment in segments {
            current = current.as_map()?.get(segment)?;
        }
        Some(current)
    }

    /// Sets the node at a dot path, creating intermediate maps.
    ///
    /// A non-map node in the way is replaced by a map.
    pub fn set_path(&mut self, path: &str, value: RouteValue) {
        match path.split_once('.') {
            None => {
                self.insert(path, value);
            }
            Some((head, rest)) => {
                let entry = self
                    .0
                    .entry(head.to_string())
                    .or_insert_with(|| RouteValue::Map(Self::new()));
                if !matches!(entry, RouteValue::Map(_)) {
                    *entry = RouteValue::Map(Self::new());
                }
                if let RouteValue::Map(child) = entry {
                    child.set_path(rest, value);
                }
            }
        }
    }

    /// Removes and returns the node at a dot path. Parent maps are kept, even when emptied.
    pub fn remove_path(&mut self, path: &str) -> Option<RouteValue> {
        match path.split_once('.') {
            None => self.remove(path),
            Some((head, rest)) => self.get_mut(head)?.as_map_mut()?.remove_path(rest),
        }
    }

    /// Returns a copy of `self` with `overrule` merged on top.
    ///
    /// Maps present on both sides are merged recursively; any other value in
    /// `overrule` replaces the one in `self`.
    #[must_use]
    pub fn merge_recursive_overrule(&self, overrule: &Self) -> Self {
        let mut merged = self.clone();
        for (key, value) in overrule {
            match (merged.0.get_mut(key), value) {
                (Some(RouteValue::Map(base)), RouteValue::Map(over)) => {
                    *base = base.merge_recursive_overrule(over);
                }
                _ => {
                    merged.0.insert(key.clone(), value.clone());
                }
            }
        }
        merged
    }

    /// Removes nulls and (after recursion) empty maps at any depth.
    pub fn remove_empty_recursively(&mut self) {
        self.0.retain(|_, value| match value {
            RouteValue::Null => false,
            RouteValue::Map(child) => {
                child.remove_empty_recursively();
                !child.is_empty()
            }
            _ => true,
        });
    }

    /// Replaces every object reference with its `{"__identity": ...}` map.
    pub fn convert_objects_to_identity_maps(&mut self) -> FlowrouteResult<()> {
        for value in self.0.values_mut() {
            match value {
                RouteValue::Object(object) => {
                    let identifier = object.identifier().ok_or_else(|| {
                        FlowrouteError::InvalidRoutePartValue(format!(
                            "object of type \"{}\" has no identifier and cannot be passed as a route value",
                            object.object_type()
                        ))
                    })?;
                    *value = RouteValue::identity(identifier);
                }
                RouteValue::Map(child) => child.convert_objects_to_identity_maps()?,
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` if any node is an object reference.
    pub fn contains_object(&self) -> bool {
        self.0.values().any(RouteValue::contains_object)
    }
}

impl fmt::Debug for RouteValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

impl<K: Into<String>, V: Into<RouteValue>> FromIterator<(K, V)> for RouteValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl IntoIterator for RouteValues {
    type Item = (String, RouteValue);
    type IntoIter = btree_map::IntoIter<String, RouteValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a RouteValues {
    type Item = (&'a String, &'a RouteValue);
    type IntoIter = btree_map::Iter<'a, String, RouteValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for RouteValues {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Self(map.into_iter().map(|(k, v)| (k, RouteValue::from(v))).collect())
    }
}

impl Serialize for RouteValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RouteValues {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Map::<String, serde_json::Value>::deserialize(deserializer).map(Self::from)
    }
}
