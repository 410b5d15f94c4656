//! Tagged values for generic introspection.
//!
//! `JsValue` is the serializable output shape: a closed variant that keeps
//! "undefined" distinct from "null" and from "present but empty" at every
//! key. `Reflected` is the source side: a shareable value graph the
//! snapshot walk descends with two safeguards, a depth budget and an
//! in-path identity set, because the source model may contain
//! back-references (parent links) and must never blow the stack.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Maximum composite nesting the snapshot walk will expand.
pub const MAX_INTROSPECTION_DEPTH: usize = 5;

/// Placeholder written where a composite exceeds the depth budget.
pub const DEPTH_PLACEHOLDER: &str = "(depth limit exceeded)";

/// Placeholder written where a property could not be read.
pub const UNREADABLE_PLACEHOLDER: &str = "(error reading property)";

/// A tagged introspection value.
///
/// Serializes with an explicit `type` tag, e.g. `{"type":"undefined"}` or
/// `{"type":"array","items":[...],"length":2}`, so a consumer can always
/// tell absence, null, and emptiness apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum JsValue {
    Undefined,
    Null,
    String { value: String },
    Number { value: f64 },
    Boolean { value: bool },
    Array { items: Vec<JsValue>, length: usize },
    Object { properties: BTreeMap<String, JsValue> },
    Function { label: String },
    Circular { label: String },
}

impl JsValue {
    pub fn string(value: impl Into<String>) -> Self {
        Self::String {
            value: value.into(),
        }
    }

    /// Placeholder for a property whose read failed.
    pub fn unreadable() -> Self {
        Self::string(UNREADABLE_PLACEHOLDER)
    }
}

/// A source value for the snapshot walk.
///
/// Composites are `Rc`-shared and interiorly mutable so the same node can
/// appear in several places, including inside itself. That is exactly the
/// shape the walk has to survive.
#[derive(Debug, Clone)]
pub enum Reflected {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Function(String),
    Array(Rc<RefCell<Vec<Reflected>>>),
    Object(Rc<RefCell<BTreeMap<String, Reflected>>>),
}

impl Reflected {
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    pub fn array(items: Vec<Reflected>) -> Self {
        Self::Array(Rc::new(RefCell::new(items)))
    }

    pub fn object(entries: Vec<(&str, Reflected)>) -> Self {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        Self::Object(Rc::new(RefCell::new(map)))
    }

    /// Convert to the serializable tagged form.
    ///
    /// Re-entering a composite already on the descent path yields
    /// `Circular`; composites past the depth budget collapse to a string
    /// placeholder. Terminates for any input, cyclic or not.
    pub fn snapshot(&self) -> JsValue {
        let mut path: Vec<usize> = Vec::new();
        self.snapshot_at(0, &mut path)
    }

    fn snapshot_at(&self, depth: usize, path: &mut Vec<usize>) -> JsValue {
        match self {
            Reflected::Undefined => JsValue::Undefined,
            Reflected::Null => JsValue::Null,
            Reflected::Bool(b) => JsValue::Boolean { value: *b },
            Reflected::Number(n) => JsValue::Number { value: *n },
            Reflected::String(s) => JsValue::String { value: s.clone() },
            Reflected::Function(label) => JsValue::Function {
                label: label.clone(),
            },
            Reflected::Array(cell) => {
                let id = Rc::as_ptr(cell) as usize;
                if path.contains(&id) {
                    return JsValue::Circular {
                        label: "(circular array)".to_string(),
                    };
                }
                if depth >= MAX_INTROSPECTION_DEPTH {
                    return JsValue::string(DEPTH_PLACEHOLDER);
                }
                path.push(id);
                let items: Vec<JsValue> = cell
                    .borrow()
                    .iter()
                    .map(|item| item.snapshot_at(depth + 1, path))
                    .collect();
                path.pop();
                let length = items.len();
                JsValue::Array { items, length }
            }
            Reflected::Object(cell) => {
                let id = Rc::as_ptr(cell) as usize;
                if path.contains(&id) {
                    return JsValue::Circular {
                        label: "(circular object)".to_string(),
                    };
                }
                if depth >= MAX_INTROSPECTION_DEPTH {
                    return JsValue::string(DEPTH_PLACEHOLDER);
                }
                path.push(id);
                let properties: BTreeMap<String, JsValue> = cell
                    .borrow()
                    .iter()
                    .map(|(key, value)| (key.clone(), value.snapshot_at(depth + 1, path)))
                    .collect();
                path.pop();
                JsValue::Object { properties }
            }
        }
    }
}

impl From<&serde_json::Value> for Reflected {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Reflected::Null,
            serde_json::Value::Bool(b) => Reflected::Bool(*b),
            serde_json::Value::Number(n) => Reflected::Number(n.as_f64().unwrap_or_default()),
            serde_json::Value::String(s) => Reflected::String(s.clone()),
            serde_json::Value::Array(items) => {
                Reflected::array(items.iter().map(Reflected::from).collect())
            }
            serde_json::Value::Object(map) => Reflected::Object(Rc::new(RefCell::new(
                map.iter()
                    .map(|(k, v)| (k.clone(), Reflected::from(v)))
                    .collect(),
            ))),
        }
    }
}

impl From<bool> for Reflected {
    fn from(value: bool) -> Self {
        Reflected::Bool(value)
    }
}

impl From<&str> for Reflected {
    fn from(value: &str) -> Self {
        Reflected::string(value)
    }
}
