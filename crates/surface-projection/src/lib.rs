//! Surface Projection - deterministic view-tree projection for API
//! surface documents.
//!
//! This crate turns a `.api.json` document (the output of a TypeScript
//! API-surface extraction tool) into the tree the inspector UI renders:
//! - `ApiItem` - typed item tree with optional capability fields
//! - `loader` - raw document to `ApiItem`, best-effort per field
//! - `SideTable` - canonical-reference index into the raw document
//! - `JsValue` / `Reflected` - tagged introspection values, cycle-safe
//! - `project` - the projector: IDs, breadcrumbs, capability extraction
//!
//! # Architecture
//!
//! ```text
//! raw document (serde_json::Value)
//! ├── loader::load_document ──► ApiItem tree
//! └── SideTable::build ──────► { canonicalReference -> raw object }
//!                                      │
//! project(root, side) ◄────────────────┘
//! └── ViewNode tree: id, breadcrumb, fields, rawJson, jsModel
//! ```
//!
//! The projector is deterministic: the identity counter is scoped to each
//! `project` call, nodes are numbered in pre-order, and children keep
//! their input order, so the same document yields the same tree on every
//! run.
//!
//! # Example
//!
//! ```
//! use surface_projection::{loader, project, SideTable};
//!
//! let doc: serde_json::Value = serde_json::from_str(r#"{
//!     "metadata": { "toolVersion": "7.0.0" },
//!     "kind": "Package",
//!     "canonicalReference": "widgets!",
//!     "name": "widgets",
//!     "members": []
//! }"#).unwrap();
//!
//! loader::validate_markers(&doc).unwrap();
//! let root = loader::load_document(&doc).unwrap();
//! let side = SideTable::build(&doc);
//! let tree = project(&root, &side);
//! assert_eq!(tree.id, "n1");
//! assert_eq!(tree.name, "widgets");
//! ```

mod error;
mod item;
mod js_value;
pub mod loader;
mod projector;
mod side_table;
mod view;

// Re-exports
pub use error::LoadError;
pub use item::{
    ApiItem, Capability, ClassHeritage, ContainerFacet, ItemKind, Parameter, ReleaseTag,
    TypeParameter,
};
pub use js_value::{
    JsValue, Reflected, DEPTH_PLACEHOLDER, MAX_INTROSPECTION_DEPTH, UNREADABLE_PLACEHOLDER,
};
pub use projector::project;
pub use side_table::SideTable;
pub use view::{Crumb, JsModel, ViewNode};
