//! Dynamic property model: the open bag of named values a renderer callback
//! receives, plus dotted-path access into nested JSON data.
//!
//! Items are shared (`Rc<RefCell<Value>>`) so that a row item handed to
//! several render targets keeps its reference identity, and so that callers
//! may mutate nested fields in place between renders.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

/// A shared, identity-carrying data item (typically one table row).
pub type Item = Rc<RefCell<Value>>;

/// Wrap a JSON value as a shared item.
pub fn new_item(value: Value) -> Item {
    Rc::new(RefCell::new(value))
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// The property bag passed to a renderer callback.
///
/// Plain data values live in an ordered map; the `item` slot is kept apart
/// because it is shared by reference rather than copied, which is what makes
/// identity lookups and in-place mutation possible.
#[derive(Debug, Clone, Default)]
pub struct Model {
    values: BTreeMap<String, Value>,
    item: Option<Item>,
}

impl Model {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a data value (builder).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Set the shared item (builder).
    pub fn with_item(mut self, item: Item) -> Self {
        self.item = Some(item);
        self
    }

    /// Set a data value.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    /// Set the shared item.
    pub fn set_item(&mut self, item: Item) {
        self.item = Some(item);
    }

    /// Look up a data value by key.
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// The shared item, if any.
    pub fn item(&self) -> Option<&Item> {
        self.item.as_ref()
    }

    /// Iterate the data values in key order.
    pub fn values(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// The full key shape of this model: every data key, plus `"item"` when
    /// the item slot is occupied.
    pub fn keys(&self) -> BTreeSet<String> {
        let mut keys: BTreeSet<String> = self.values.keys().cloned().collect();
        if self.item.is_some() {
            keys.insert("item".to_owned());
        }
        keys
    }

    /// Whether the model carries no values and no item.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.item.is_none()
    }
}

// ---------------------------------------------------------------------------
// PropertyPath
// ---------------------------------------------------------------------------

/// A dotted property path split into its root key and the remainder.
///
/// `"item.address.city"` has root `"item"` and rest `"address.city"`;
/// a bare `"selected"` has an empty rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyPath {
    root: String,
    rest: String,
}

impl PropertyPath {
    /// Parse a dotted path. Leading and trailing whitespace is ignored.
    pub fn parse(path: &str) -> Self {
        let path = path.trim();
        match path.split_once('.') {
            Some((root, rest)) => Self {
                root: root.to_owned(),
                rest: rest.to_owned(),
            },
            None => Self {
                root: path.to_owned(),
                rest: String::new(),
            },
        }
    }

    /// The root key (the portion before the first separator).
    pub fn root(&self) -> &str {
        &self.root
    }

    /// The remainder after the root, empty for a bare key.
    pub fn rest(&self) -> &str {
        &self.rest
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rest.is_empty() {
            write!(f, "{}", self.root)
        } else {
            write!(f, "{}.{}", self.root, self.rest)
        }
    }
}

// ---------------------------------------------------------------------------
// Path access
// ---------------------------------------------------------------------------

/// Resolve a dotted path inside a JSON value.
///
/// Objects are indexed by key, arrays by numeric segment. An empty path
/// resolves to the value itself.
pub fn get_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }
    let mut current = value;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Overwrite the value at a dotted path inside a JSON value.
///
/// Intermediate containers must already exist; none are created. The leaf is
/// inserted into its parent object (or overwrites an existing array index).
/// Returns `false` when the parent cannot be reached or is not a container.
pub fn set_path(value: &mut Value, path: &str, new: Value) -> bool {
    if path.is_empty() {
        *value = new;
        return true;
    }
    let (parent_path, leaf) = match path.rsplit_once('.') {
        Some((parent, leaf)) => (parent, leaf),
        None => ("", path),
    };
    let parent = match get_path_mut(value, parent_path) {
        Some(parent) => parent,
        None => return false,
    };
    match parent {
        Value::Object(map) => {
            map.insert(leaf.to_owned(), new);
            true
        }
        Value::Array(items) => match leaf.parse::<usize>().ok().and_then(|i| items.get_mut(i)) {
            Some(slot) => {
                *slot = new;
                true
            }
            None => false,
        },
        _ => false,
    }
}

fn get_path_mut<'a>(value: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    if path.is_empty() {
        return Some(value);
    }
    let mut current = value;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get_mut(segment)?,
            Value::Array(items) => items.get_mut(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Format a value for bound text output: strings render bare, everything
/// else uses its JSON form. `Null` renders as the empty string.
pub fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
