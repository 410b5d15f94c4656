//! The tree projector.
//!
//! Walks the typed item tree once, in pre-order, and materializes the
//! full `ViewNode` tree: synthetic IDs from a call-scoped counter,
//! incremental breadcrumbs, per-capability field copies, the raw-JSON
//! join, and the generic introspection record.
//!
//! `project` is a pure function of its two inputs. The counter lives in
//! the `Projector` value created per call, so concurrent projections can
//! never interleave IDs and output is deterministic: same tree, same IDs,
//! every run.

use crate::item::{ApiItem, Capability};
use crate::js_value::{JsValue, Reflected};
use crate::side_table::SideTable;
use crate::view::{Crumb, JsModel, ViewNode};

/// Project an item tree into its view tree.
///
/// Output mirrors input 1:1 — same node count, same child order, nothing
/// pruned or reordered. The root receives the first ID.
pub fn project(root: &ApiItem, side: &SideTable<'_>) -> ViewNode {
    Projector::new().project_item(root, side, &[])
}

/// Call-scoped projection state: just the identity counter.
struct Projector {
    next_id: u64,
}

impl Projector {
    fn new() -> Self {
        Self { next_id: 1 }
    }

    fn next_tag(&mut self) -> String {
        let id = self.next_id;
        self.next_id += 1;
        format!("n{id}")
    }

    fn project_item(&mut self, item: &ApiItem, side: &SideTable<'_>, trail: &[Crumb]) -> ViewNode {
        let id = self.next_tag();

        let mut breadcrumb = trail.to_vec();
        breadcrumb.push(Crumb {
            id: id.clone(),
            label: item.display_label(),
            kind: item.kind,
        });

        let raw_json = side.get(&item.canonical_reference).cloned();
        let js_model = build_js_model(item);

        // Children strictly after the node's own fields, in input order.
        let children = item
            .members
            .iter()
            .map(|member| self.project_item(member, side, &breadcrumb))
            .collect();

        ViewNode {
            id,
            kind: item.kind,
            name: item.name.clone().unwrap_or_default(),
            canonical_reference: item.canonical_reference.clone(),
            release_tag: item.release_tag,
            docs: item.docs.clone(),
            excerpt: item.excerpt.clone(),
            parameters: item.parameters.clone(),
            type_parameters: item.type_parameters.clone(),
            return_type: item.return_type.clone(),
            is_optional: item.is_optional,
            is_readonly: item.is_readonly,
            is_static: item.is_static,
            is_abstract: item.is_abstract,
            is_protected: item.is_protected,
            is_exported: item.is_exported,
            initializer: item.initializer.clone(),
            extends_types: item.extends_types.clone(),
            implements_types: item
                .class_heritage
                .as_ref()
                .map(|heritage| heritage.implemented_types.clone()),
            declared_type: item.declared_type.clone(),
            children,
            breadcrumb,
            raw_json,
            js_model,
        }
    }
}

/// Probe every capability in fixed order and record a tagged value for
/// each, matched or not. An unreadable capability still counts as matched
/// but its value degrades to the error placeholder.
fn build_js_model(item: &ApiItem) -> JsModel {
    let mut model = JsModel::default();

    for capability in Capability::ALL {
        let matched = item.has(capability);
        if matched {
            model.mixins.push(capability.label().to_string());
        }

        if capability == Capability::Container {
            // The container capability fans out to two property keys.
            insert_container_properties(item, &mut model);
            continue;
        }

        let value = if item.unreadable.contains(&capability) {
            JsValue::unreadable()
        } else {
            match reflect_capability(item, capability) {
                Some(reflected) => reflected.snapshot(),
                None => JsValue::Undefined,
            }
        };
        model.properties.insert(capability.label().to_string(), value);
    }

    model
}

fn insert_container_properties(item: &ApiItem, model: &mut JsModel) {
    if item.unreadable.contains(&Capability::Container) {
        model
            .properties
            .insert("members".to_string(), JsValue::unreadable());
        model
            .properties
            .insert("preserveMemberOrder".to_string(), JsValue::unreadable());
        return;
    }

    match &item.container {
        Some(facet) => {
            let summaries = item
                .members
                .iter()
                .map(|member| {
                    Reflected::object(vec![
                        ("kind", Reflected::string(member.kind.as_str())),
                        ("displayName", Reflected::string(member.display_label())),
                    ])
                })
                .collect();
            model
                .properties
                .insert("members".to_string(), Reflected::array(summaries).snapshot());
            model.properties.insert(
                "preserveMemberOrder".to_string(),
                JsValue::Boolean {
                    value: facet.preserve_member_order,
                },
            );
        }
        None => {
            model
                .properties
                .insert("members".to_string(), JsValue::Undefined);
            model
                .properties
                .insert("preserveMemberOrder".to_string(), JsValue::Undefined);
        }
    }
}

fn reflect_capability(item: &ApiItem, capability: Capability) -> Option<Reflected> {
    match capability {
        Capability::Name => item.name.as_deref().map(Reflected::from),
        Capability::ReleaseTag => item
            .release_tag
            .map(|tag| Reflected::string(tag.as_str())),
        Capability::Docs => item.docs.as_deref().map(Reflected::from),
        Capability::Excerpt => item.excerpt.as_deref().map(Reflected::from),
        Capability::Parameters => item.parameters.as_ref().map(|parameters| {
            Reflected::array(
                parameters
                    .iter()
                    .map(|parameter| {
                        Reflected::object(vec![
                            ("name", Reflected::string(&parameter.name)),
                            (
                                "type",
                                parameter
                                    .type_text
                                    .as_deref()
                                    .map(Reflected::from)
                                    .unwrap_or(Reflected::Undefined),
                            ),
                            ("isOptional", Reflected::Bool(parameter.is_optional)),
                        ])
                    })
                    .collect(),
            )
        }),
        Capability::TypeParameters => item.type_parameters.as_ref().map(|type_parameters| {
            Reflected::array(
                type_parameters
                    .iter()
                    .map(|tp| {
                        Reflected::object(vec![
                            ("name", Reflected::string(&tp.name)),
                            (
                                "constraint",
                                tp.constraint
                                    .as_deref()
                                    .map(Reflected::from)
                                    .unwrap_or(Reflected::Undefined),
                            ),
                            (
                                "default",
                                tp.default_type
                                    .as_deref()
                                    .map(Reflected::from)
                                    .unwrap_or(Reflected::Undefined),
                            ),
                        ])
                    })
                    .collect(),
            )
        }),
        Capability::ReturnType => item.return_type.as_deref().map(Reflected::from),
        Capability::Optional => item.is_optional.map(Reflected::from),
        Capability::Readonly => item.is_readonly.map(Reflected::from),
        Capability::Static => item.is_static.map(Reflected::from),
        Capability::Abstract => item.is_abstract.map(Reflected::from),
        Capability::Protected => item.is_protected.map(Reflected::from),
        Capability::Exported => item.is_exported.map(Reflected::from),
        Capability::Initializer => item.initializer.as_deref().map(Reflected::from),
        Capability::ClassHeritage => item.class_heritage.as_ref().map(|heritage| {
            Reflected::object(vec![
                (
                    "extends",
                    heritage
                        .extends_type
                        .as_deref()
                        .map(Reflected::from)
                        .unwrap_or(Reflected::Undefined),
                ),
                (
                    "implements",
                    Reflected::array(
                        heritage
                            .implemented_types
                            .iter()
                            .map(|text| Reflected::string(text))
                            .collect(),
                    ),
                ),
            ])
        }),
        Capability::ExtendsTypes => item.extends_types.as_ref().map(|types| {
            Reflected::array(types.iter().map(|text| Reflected::string(text)).collect())
        }),
        Capability::DeclaredType => item.declared_type.as_deref().map(Reflected::from),
        // Handled by insert_container_properties.
        Capability::Container => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ContainerFacet, ItemKind, Parameter, ReleaseTag};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn empty_table() -> serde_json::Value {
        json!({})
    }

    fn sample_tree() -> ApiItem {
        ApiItem::new(ItemKind::Package, "widgets!")
            .with_name("widgets")
            .with_container(ContainerFacet::default())
            .with_member(
                ApiItem::new(ItemKind::EntryPoint, "widgets!")
                    .with_container(ContainerFacet::default())
                    .with_member(
                        ApiItem::new(ItemKind::Class, "widgets!Widget:class")
                            .with_name("Widget")
                            .with_release_tag(ReleaseTag::Public)
                            .with_container(ContainerFacet::default())
                            .with_member(
                                ApiItem::new(ItemKind::Method, "widgets!Widget#render:member(1)")
                                    .with_name("render"),
                            ),
                    )
                    .with_member(
                        ApiItem::new(ItemKind::Variable, "widgets!VERSION:var")
                            .with_name("VERSION"),
                    ),
            )
    }

    #[test]
    fn test_structural_isomorphism() {
        let tree = sample_tree();
        let raw = empty_table();
        let node = project(&tree, &SideTable::build(&raw));

        assert_eq!(node.node_count(), tree.item_count());
        assert_eq!(node.children.len(), 1);
        assert_eq!(node.children[0].children.len(), 2);
        assert_eq!(node.children[0].children[0].children.len(), 1);
    }

    #[test]
    fn test_ids_assigned_in_pre_order() {
        let raw = empty_table();
        let node = project(&sample_tree(), &SideTable::build(&raw));

        assert_eq!(node.id, "n1");
        let entry = &node.children[0];
        assert_eq!(entry.id, "n2");
        let class = &entry.children[0];
        assert_eq!(class.id, "n3");
        // The class's full subtree is numbered before the next sibling.
        assert_eq!(class.children[0].id, "n4");
        assert_eq!(entry.children[1].id, "n5");
    }

    #[test]
    fn test_ids_unique_within_one_call() {
        let raw = empty_table();
        let node = project(&sample_tree(), &SideTable::build(&raw));

        let mut ids = Vec::new();
        collect_ids(&node, &mut ids);
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn test_ids_deterministic_across_runs() {
        let tree = sample_tree();
        let raw = empty_table();
        let first = project(&tree, &SideTable::build(&raw));
        let second = project(&tree, &SideTable::build(&raw));
        assert_eq!(first, second);
    }

    fn collect_ids(node: &ViewNode, ids: &mut Vec<String>) {
        ids.push(node.id.clone());
        for child in &node.children {
            collect_ids(child, ids);
        }
    }

    #[test]
    fn test_breadcrumb_laws() {
        let raw = empty_table();
        let node = project(&sample_tree(), &SideTable::build(&raw));

        assert_eq!(node.breadcrumb.len(), 1);
        assert_breadcrumb_laws(&node);
    }

    fn assert_breadcrumb_laws(node: &ViewNode) {
        let last = node.breadcrumb.last().unwrap();
        assert_eq!(last.id, node.id);
        assert_eq!(last.label, node.display_label());
        assert_eq!(last.kind, node.kind);

        for child in &node.children {
            // A child's breadcrumb strictly extends its parent's.
            assert_eq!(child.breadcrumb.len(), node.breadcrumb.len() + 1);
            assert_eq!(&child.breadcrumb[..node.breadcrumb.len()], &node.breadcrumb[..]);
            assert_breadcrumb_laws(child);
        }
    }

    #[test]
    fn test_breadcrumb_label_falls_back_to_kind() {
        let raw = empty_table();
        let node = project(&sample_tree(), &SideTable::build(&raw));
        let entry = &node.children[0];
        assert_eq!(entry.breadcrumb.last().unwrap().label, "(EntryPoint)");
    }

    #[test]
    fn test_absent_capability_absent_field_explicit_undefined() {
        let raw = empty_table();
        let item = ApiItem::new(ItemKind::Variable, "widgets!VERSION:var").with_name("VERSION");
        let node = project(&item, &SideTable::build(&raw));

        assert_eq!(node.release_tag, None);
        assert_eq!(node.parameters, None);
        // Probed anyway: explicit undefined, never a missing key.
        assert_eq!(node.js_model.properties["releaseTag"], JsValue::Undefined);
        assert_eq!(node.js_model.properties["parameters"], JsValue::Undefined);
        assert!(!node.js_model.mixins.contains(&"parameters".to_string()));
    }

    #[test]
    fn test_all_capabilities_probed() {
        let raw = empty_table();
        let node = project(
            &ApiItem::new(ItemKind::Variable, "widgets!VERSION:var"),
            &SideTable::build(&raw),
        );
        // 17 single-key capabilities plus the container fan-out.
        assert_eq!(node.js_model.properties.len(), 19);
        assert_eq!(node.js_model.properties["members"], JsValue::Undefined);
        assert_eq!(
            node.js_model.properties["preserveMemberOrder"],
            JsValue::Undefined
        );
    }

    #[test]
    fn test_mixins_follow_probe_order() {
        let raw = empty_table();
        let item = ApiItem::new(ItemKind::Class, "widgets!Widget:class")
            .with_name("Widget")
            .with_release_tag(ReleaseTag::Public)
            .with_container(ContainerFacet::default());
        let node = project(&item, &SideTable::build(&raw));
        assert_eq!(node.js_model.mixins, vec!["name", "releaseTag", "container"]);
    }

    #[test]
    fn test_raw_json_join_round_trip() {
        let raw = json!({
            "kind": "Package",
            "canonicalReference": "widgets!",
            "members": [
                { "kind": "EntryPoint", "canonicalReference": "widgets!", "members": [
                    { "kind": "Class", "canonicalReference": "widgets!Widget:class", "members": [
                        { "kind": "Method", "canonicalReference": "widgets!Widget#render:member(1)" }
                    ]},
                    { "kind": "Variable", "canonicalReference": "widgets!VERSION:var" }
                ]}
            ]
        });
        let table = SideTable::build(&raw);
        let node = project(&sample_tree(), &table);

        assert_raw_json_round_trip(&node);
    }

    fn assert_raw_json_round_trip(node: &ViewNode) {
        if let Some(raw) = &node.raw_json {
            assert_eq!(
                raw["canonicalReference"].as_str().unwrap(),
                node.canonical_reference
            );
        }
        for child in &node.children {
            assert_raw_json_round_trip(child);
        }
    }

    #[test]
    fn test_side_table_miss_is_not_an_error() {
        let raw = json!({ "kind": "Package", "canonicalReference": "other!" });
        let node = project(&sample_tree(), &SideTable::build(&raw));
        assert_eq!(node.raw_json, None);
    }

    #[test]
    fn test_empty_container_distinguishable_from_absent() {
        let raw = empty_table();
        let container = ApiItem::new(ItemKind::Namespace, "widgets!ns:namespace")
            .with_name("ns")
            .with_container(ContainerFacet::default());
        let node = project(&container, &SideTable::build(&raw));

        assert!(node.children.is_empty());
        assert_eq!(
            node.js_model.properties["members"],
            JsValue::Array {
                items: vec![],
                length: 0
            }
        );
        assert_eq!(
            node.js_model.properties["preserveMemberOrder"],
            JsValue::Boolean { value: false }
        );
    }

    #[test]
    fn test_member_summaries_for_containers() {
        let raw = empty_table();
        let container = ApiItem::new(ItemKind::Enum, "widgets!Color:enum")
            .with_name("Color")
            .with_container(ContainerFacet::default())
            .with_member(ApiItem::new(ItemKind::EnumMember, "widgets!Color.Red:member").with_name("Red"));
        let node = project(&container, &SideTable::build(&raw));

        match &node.js_model.properties["members"] {
            JsValue::Array { items, length } => {
                assert_eq!(*length, 1);
                match &items[0] {
                    JsValue::Object { properties } => {
                        assert_eq!(properties["kind"], JsValue::string("EnumMember"));
                        assert_eq!(properties["displayName"], JsValue::string("Red"));
                    }
                    other => panic!("expected object summary, got {other:?}"),
                }
            }
            other => panic!("expected member array, got {other:?}"),
        }
    }

    #[test]
    fn test_two_parameters_one_optional() {
        let raw = empty_table();
        let function = ApiItem::new(ItemKind::Function, "widgets!create:function(1)")
            .with_name("create")
            .with_parameters(vec![
                Parameter {
                    name: "label".to_string(),
                    type_text: Some("string".to_string()),
                    is_optional: false,
                },
                Parameter {
                    name: "size".to_string(),
                    type_text: Some("number".to_string()),
                    is_optional: true,
                },
            ]);
        let node = project(&function, &SideTable::build(&raw));

        let parameters = node.parameters.as_ref().unwrap();
        assert_eq!(parameters.len(), 2);
        assert_eq!(parameters[0].name, "label");
        assert!(parameters[1].is_optional);

        match &node.js_model.properties["parameters"] {
            JsValue::Array { items, length } => {
                assert_eq!(*length, 2);
                match &items[1] {
                    JsValue::Object { properties } => {
                        assert_eq!(properties["isOptional"], JsValue::Boolean { value: true });
                    }
                    other => panic!("expected parameter object, got {other:?}"),
                }
            }
            other => panic!("expected parameter array, got {other:?}"),
        }
    }

    #[test]
    fn test_unreadable_capability_degrades_to_placeholder() {
        let raw = empty_table();
        let mut item = ApiItem::new(ItemKind::Function, "widgets!create:function(1)");
        item.unreadable.push(Capability::Parameters);
        let node = project(&item, &SideTable::build(&raw));

        assert_eq!(node.parameters, None);
        assert_eq!(node.js_model.properties["parameters"], JsValue::unreadable());
        // The mixin still reads as matched.
        assert!(node.js_model.mixins.contains(&"parameters".to_string()));
        // And the rest of the probe completed.
        assert_eq!(node.js_model.properties["name"], JsValue::Undefined);
    }

    #[test]
    fn test_js_model_does_not_leak_into_primary_fields() {
        let raw = empty_table();
        let node = project(&sample_tree(), &SideTable::build(&raw));
        // Primary name comes from the item, not from the introspection map.
        assert_eq!(node.name, "widgets");
        assert_eq!(
            node.js_model.properties["name"],
            JsValue::string("widgets")
        );
    }
}
