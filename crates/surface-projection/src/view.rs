//! View node wire types.
//!
//! The flat, acyclic records the UI consumes. Capability fields that do
//! not apply to an item are omitted from the wire entirely
//! (`skip_serializing_if`), never sent as null or empty, so the details
//! panel can tell "not applicable" from "applicable but empty".

use crate::item::{ItemKind, Parameter, ReleaseTag, TypeParameter};
use crate::js_value::JsValue;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One entry of a breadcrumb trail: just enough identity to render a
/// clickable path segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Crumb {
    pub id: String,
    pub label: String,
    pub kind: ItemKind,
}

/// Capability-agnostic introspection record: which capabilities matched,
/// and a tagged value for every probed property. Informational only;
/// the primary `ViewNode` fields never depend on it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JsModel {
    pub mixins: Vec<String>,
    pub properties: BTreeMap<String, JsValue>,
}

/// Serializable projection of one API item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewNode {
    /// Synthetic identity, unique within one projection call.
    pub id: String,
    pub kind: ItemKind,
    /// Display name; empty when the item has none.
    #[serde(default)]
    pub name: String,
    /// Join key into the raw document, copied verbatim.
    pub canonical_reference: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_tag: Option<ReleaseTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Parameter>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_parameters: Option<Vec<TypeParameter>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_optional: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_readonly: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_static: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_abstract: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_protected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_exported: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initializer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends_types: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implements_types: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared_type: Option<String>,

    pub children: Vec<ViewNode>,
    /// Root-to-self path, self included.
    pub breadcrumb: Vec<Crumb>,
    /// Matching raw JSON object, when the side table has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_json: Option<Value>,
    pub js_model: JsModel,
}

impl ViewNode {
    /// Display label: the name, or `(Kind)` when the name is empty.
    pub fn display_label(&self) -> String {
        if self.name.is_empty() {
            format!("({})", self.kind)
        } else {
            self.name.clone()
        }
    }

    /// Total number of nodes in this subtree, self included.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(ViewNode::node_count).sum::<usize>()
    }
}
