//! `.api.json` document loader.
//!
//! Maps the raw parsed document into the typed `ApiItem` tree. Structure
//! errors (unknown kind, missing canonical reference) abort the load;
//! a capability field that is present but malformed is recorded in
//! `ApiItem::unreadable` and skipped, so one bad field never loses the
//! rest of the tree.
//!
//! Source-text excerpts are reconstructed from `excerptTokens` plus the
//! per-capability token ranges (`returnTypeTokenRange` and friends): the
//! text of tokens `startIndex..endIndex` concatenated, then trimmed.

use crate::error::LoadError;
use crate::item::{
    ApiItem, Capability, ClassHeritage, ContainerFacet, ItemKind, Parameter, ReleaseTag,
    TypeParameter,
};
use serde_json::{Map, Value};

/// Check the two top-level document markers.
///
/// Runs before any tree work; a document failing this is "not an API
/// surface document" rather than one that failed to load.
pub fn validate_markers(doc: &Value) -> Result<(), LoadError> {
    let obj = doc.as_object().ok_or(LoadError::RootNotAnObject)?;
    for field in ["metadata", "kind"] {
        if !obj.contains_key(field) {
            return Err(LoadError::MissingMarker { field });
        }
    }
    Ok(())
}

/// Load the full item tree from a marker-validated document.
pub fn load_document(doc: &Value) -> Result<ApiItem, LoadError> {
    load_item(doc, "(document root)")
}

fn load_item(value: &Value, parent: &str) -> Result<ApiItem, LoadError> {
    let obj = value.as_object().ok_or(LoadError::RootNotAnObject)?;

    let canonical_reference = obj
        .get("canonicalReference")
        .and_then(Value::as_str)
        .ok_or_else(|| LoadError::MissingCanonicalReference {
            parent: parent.to_string(),
        })?
        .to_string();

    let kind_text = obj
        .get("kind")
        .and_then(Value::as_str)
        .ok_or_else(|| LoadError::MissingKind {
            canonical_reference: canonical_reference.clone(),
        })?;
    let kind = ItemKind::parse(kind_text).ok_or_else(|| LoadError::UnknownKind {
        canonical_reference: canonical_reference.clone(),
        kind: kind_text.to_string(),
    })?;

    let mut item = ApiItem::new(kind, canonical_reference);
    let tokens = obj.get("excerptTokens").and_then(Value::as_array);

    read_name(obj, &mut item);
    read_release_tag(obj, &mut item);
    read_docs(obj, &mut item);
    read_excerpt(obj, tokens, &mut item);
    read_parameters(obj, tokens, &mut item);
    read_type_parameters(obj, tokens, &mut item);
    read_range_field(obj, tokens, "returnTypeTokenRange", Capability::ReturnType, &mut item);
    read_flags(obj, &mut item);
    read_range_field(obj, tokens, "initializerTokenRange", Capability::Initializer, &mut item);
    read_class_heritage(obj, tokens, &mut item);
    read_interface_extends(obj, tokens, &mut item);
    read_declared_type(obj, tokens, &mut item);

    if kind.is_container() {
        item.container = Some(ContainerFacet {
            preserve_member_order: obj
                .get("preserveMemberOrder")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        });
    }

    if let Some(members_value) = obj.get("members") {
        match members_value.as_array() {
            Some(members) => {
                for (index, member) in members.iter().enumerate() {
                    if !member.is_object() {
                        return Err(LoadError::MemberNotAnObject {
                            parent: item.canonical_reference.clone(),
                            index,
                        });
                    }
                    let child = load_item(member, &item.canonical_reference)?;
                    item.members.push(child);
                }
            }
            None => mark_unreadable(&mut item, Capability::Container),
        }
    }

    Ok(item)
}

fn mark_unreadable(item: &mut ApiItem, capability: Capability) {
    if !item.unreadable.contains(&capability) {
        item.unreadable.push(capability);
    }
}

/// Trim text; all-whitespace collapses to absent.
fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn read_name(obj: &Map<String, Value>, item: &mut ApiItem) {
    match obj.get("name") {
        None => {}
        Some(Value::String(name)) => item.name = non_blank(name),
        Some(_) => mark_unreadable(item, Capability::Name),
    }
}

fn read_release_tag(obj: &Map<String, Value>, item: &mut ApiItem) {
    match obj.get("releaseTag") {
        None => {}
        Some(Value::String(tag)) => match ReleaseTag::parse(tag) {
            Some(tag) => item.release_tag = Some(tag),
            None => mark_unreadable(item, Capability::ReleaseTag),
        },
        Some(_) => mark_unreadable(item, Capability::ReleaseTag),
    }
}

fn read_docs(obj: &Map<String, Value>, item: &mut ApiItem) {
    match obj.get("docComment") {
        None => {}
        Some(Value::String(raw)) => item.docs = doc_comment_text(raw),
        Some(_) => mark_unreadable(item, Capability::Docs),
    }
}

/// Plain text of a TSDoc comment: comment fences and per-line `*` gutters
/// stripped, blank lines dropped.
fn doc_comment_text(raw: &str) -> Option<String> {
    let body = raw.trim();
    let body = body.strip_prefix("/**").unwrap_or(body);
    let body = body.strip_suffix("*/").unwrap_or(body);

    let mut lines = Vec::new();
    for line in body.lines() {
        let line = line.trim();
        let line = line.strip_prefix('*').unwrap_or(line).trim();
        if !line.is_empty() {
            lines.push(line);
        }
    }
    non_blank(&lines.join("\n"))
}

fn read_excerpt(obj: &Map<String, Value>, tokens: Option<&Vec<Value>>, item: &mut ApiItem) {
    match (obj.get("excerptTokens"), tokens) {
        (None, _) => {}
        (Some(_), Some(tokens)) => match join_tokens(tokens) {
            Ok(text) => item.excerpt = non_blank(&text),
            Err(()) => mark_unreadable(item, Capability::Excerpt),
        },
        // Present but not an array.
        (Some(_), None) => mark_unreadable(item, Capability::Excerpt),
    }
}

fn join_tokens(tokens: &[Value]) -> Result<String, ()> {
    let mut text = String::new();
    for token in tokens {
        let piece = token.get("text").and_then(Value::as_str).ok_or(())?;
        text.push_str(piece);
    }
    Ok(text)
}

/// Text of the tokens selected by a `{startIndex, endIndex}` range.
///
/// Malformed ranges (wrong shape, out of bounds, inverted) are an error
/// for the caller to degrade; a valid range over blank text is absent.
fn range_text(tokens: Option<&Vec<Value>>, range: &Value) -> Result<Option<String>, ()> {
    let tokens = tokens.ok_or(())?;
    let range = range.as_object().ok_or(())?;
    let start = range
        .get("startIndex")
        .and_then(Value::as_u64)
        .ok_or(())? as usize;
    let end = range.get("endIndex").and_then(Value::as_u64).ok_or(())? as usize;
    if start > end || end > tokens.len() {
        return Err(());
    }
    let text = join_tokens(&tokens[start..end])?;
    Ok(non_blank(&text))
}

fn read_range_field(
    obj: &Map<String, Value>,
    tokens: Option<&Vec<Value>>,
    key: &str,
    capability: Capability,
    item: &mut ApiItem,
) {
    let Some(range) = obj.get(key) else {
        return;
    };
    match range_text(tokens, range) {
        Ok(text) => match capability {
            Capability::ReturnType => item.return_type = text,
            Capability::Initializer => item.initializer = text,
            Capability::DeclaredType => item.declared_type = text,
            _ => {}
        },
        Err(()) => mark_unreadable(item, capability),
    }
}

fn read_parameters(obj: &Map<String, Value>, tokens: Option<&Vec<Value>>, item: &mut ApiItem) {
    let Some(raw) = obj.get("parameters") else {
        return;
    };
    let Some(entries) = raw.as_array() else {
        mark_unreadable(item, Capability::Parameters);
        return;
    };

    let mut parameters = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(entry) = entry.as_object() else {
            mark_unreadable(item, Capability::Parameters);
            return;
        };
        let Some(name) = entry.get("parameterName").and_then(Value::as_str) else {
            mark_unreadable(item, Capability::Parameters);
            return;
        };
        let type_text = match entry.get("parameterTypeTokenRange") {
            None => None,
            Some(range) => match range_text(tokens, range) {
                Ok(text) => text,
                Err(()) => {
                    mark_unreadable(item, Capability::Parameters);
                    return;
                }
            },
        };
        parameters.push(Parameter {
            name: name.to_string(),
            type_text,
            is_optional: entry
                .get("isOptional")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        });
    }
    item.parameters = Some(parameters);
}

fn read_type_parameters(obj: &Map<String, Value>, tokens: Option<&Vec<Value>>, item: &mut ApiItem) {
    let Some(raw) = obj.get("typeParameters") else {
        return;
    };
    let Some(entries) = raw.as_array() else {
        mark_unreadable(item, Capability::TypeParameters);
        return;
    };

    let mut type_parameters = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(entry) = entry.as_object() else {
            mark_unreadable(item, Capability::TypeParameters);
            return;
        };
        let Some(name) = entry.get("typeParameterName").and_then(Value::as_str) else {
            mark_unreadable(item, Capability::TypeParameters);
            return;
        };
        let read_range = |key: &str| -> Result<Option<String>, ()> {
            match entry.get(key) {
                None => Ok(None),
                Some(range) => range_text(tokens, range),
            }
        };
        let (constraint, default_type) = match (
            read_range("constraintTokenRange"),
            read_range("defaultTypeTokenRange"),
        ) {
            (Ok(constraint), Ok(default_type)) => (constraint, default_type),
            _ => {
                mark_unreadable(item, Capability::TypeParameters);
                return;
            }
        };
        type_parameters.push(TypeParameter {
            name: name.to_string(),
            constraint,
            default_type,
        });
    }
    item.type_parameters = Some(type_parameters);
}

fn read_flags(obj: &Map<String, Value>, item: &mut ApiItem) {
    let flags: [(&str, Capability); 6] = [
        ("isOptional", Capability::Optional),
        ("isReadonly", Capability::Readonly),
        ("isStatic", Capability::Static),
        ("isAbstract", Capability::Abstract),
        ("isProtected", Capability::Protected),
        ("isExported", Capability::Exported),
    ];
    for (key, capability) in flags {
        match obj.get(key) {
            None => {}
            Some(Value::Bool(flag)) => {
                let slot = match capability {
                    Capability::Optional => &mut item.is_optional,
                    Capability::Readonly => &mut item.is_readonly,
                    Capability::Static => &mut item.is_static,
                    Capability::Abstract => &mut item.is_abstract,
                    Capability::Protected => &mut item.is_protected,
                    _ => &mut item.is_exported,
                };
                *slot = Some(*flag);
            }
            Some(_) => mark_unreadable(item, capability),
        }
    }
}

fn read_class_heritage(obj: &Map<String, Value>, tokens: Option<&Vec<Value>>, item: &mut ApiItem) {
    let extends = obj.get("extendsTokenRange");
    let implements = obj.get("implementsTokenRanges");
    if extends.is_none() && implements.is_none() {
        return;
    }

    let mut heritage = ClassHeritage::default();
    if let Some(range) = extends {
        match range_text(tokens, range) {
            Ok(text) => heritage.extends_type = text,
            Err(()) => {
                mark_unreadable(item, Capability::ClassHeritage);
                return;
            }
        }
    }
    if let Some(ranges) = implements {
        let Some(ranges) = ranges.as_array() else {
            mark_unreadable(item, Capability::ClassHeritage);
            return;
        };
        for range in ranges {
            match range_text(tokens, range) {
                Ok(Some(text)) => heritage.implemented_types.push(text),
                Ok(None) => {}
                Err(()) => {
                    mark_unreadable(item, Capability::ClassHeritage);
                    return;
                }
            }
        }
    }
    item.class_heritage = Some(heritage);
}

fn read_interface_extends(
    obj: &Map<String, Value>,
    tokens: Option<&Vec<Value>>,
    item: &mut ApiItem,
) {
    let Some(raw) = obj.get("extendsTokenRanges") else {
        return;
    };
    let Some(ranges) = raw.as_array() else {
        mark_unreadable(item, Capability::ExtendsTypes);
        return;
    };

    let mut extends_types = Vec::with_capacity(ranges.len());
    for range in ranges {
        match range_text(tokens, range) {
            Ok(Some(text)) => extends_types.push(text),
            Ok(None) => {}
            Err(()) => {
                mark_unreadable(item, Capability::ExtendsTypes);
                return;
            }
        }
    }
    item.extends_types = Some(extends_types);
}

fn read_declared_type(obj: &Map<String, Value>, tokens: Option<&Vec<Value>>, item: &mut ApiItem) {
    // Properties, variables, and type aliases each spell their type range
    // differently; the first present key wins.
    for key in [
        "propertyTypeTokenRange",
        "variableTypeTokenRange",
        "typeTokenRange",
    ] {
        if obj.contains_key(key) {
            read_range_field(obj, tokens, key, Capability::DeclaredType, item);
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn minimal_doc() -> Value {
        json!({
            "metadata": { "toolVersion": "7.52.8" },
            "kind": "Package",
            "canonicalReference": "widgets!",
            "docComment": "",
            "name": "widgets",
            "preserveMemberOrder": false,
            "members": [
                {
                    "kind": "EntryPoint",
                    "canonicalReference": "widgets!",
                    "name": "",
                    "preserveMemberOrder": false,
                    "members": []
                }
            ]
        })
    }

    #[test]
    fn test_validate_markers_accepts_minimal_doc() {
        assert!(validate_markers(&minimal_doc()).is_ok());
    }

    #[test]
    fn test_validate_markers_rejects_missing_kind() {
        let doc = json!({ "metadata": {} });
        let err = validate_markers(&doc).unwrap_err();
        assert!(matches!(err, LoadError::MissingMarker { field: "kind" }));
        assert!(err.is_structural());
    }

    #[test]
    fn test_validate_markers_rejects_non_object() {
        let err = validate_markers(&json!(42)).unwrap_err();
        assert!(matches!(err, LoadError::RootNotAnObject));
    }

    #[test]
    fn test_load_minimal_document() {
        let root = load_document(&minimal_doc()).unwrap();
        assert_eq!(root.kind, ItemKind::Package);
        assert_eq!(root.canonical_reference, "widgets!");
        assert_eq!(root.name.as_deref(), Some("widgets"));
        assert_eq!(root.members.len(), 1);

        let entry = &root.members[0];
        assert_eq!(entry.kind, ItemKind::EntryPoint);
        // Empty name collapses to absent; display falls back to the kind.
        assert_eq!(entry.name, None);
        assert_eq!(entry.display_label(), "(EntryPoint)");
        assert_eq!(
            entry.container,
            Some(ContainerFacet {
                preserve_member_order: false
            })
        );
    }

    #[test]
    fn test_unknown_kind_fails_load() {
        let doc = json!({
            "metadata": {},
            "kind": "Gadget",
            "canonicalReference": "widgets!"
        });
        let err = load_document(&doc).unwrap_err();
        assert!(matches!(err, LoadError::UnknownKind { .. }));
        assert!(!err.is_structural());
    }

    #[test]
    fn test_missing_canonical_reference_fails_load() {
        let doc = json!({
            "metadata": {},
            "kind": "Package",
            "canonicalReference": "widgets!",
            "members": [ { "kind": "EntryPoint" } ]
        });
        let err = load_document(&doc).unwrap_err();
        assert!(matches!(
            err,
            LoadError::MissingCanonicalReference { parent } if parent == "widgets!"
        ));
    }

    #[test]
    fn test_doc_comment_text_strips_fences() {
        let raw = "/**\n * Renders a widget.\n *\n * @public\n */";
        assert_eq!(
            doc_comment_text(raw),
            Some("Renders a widget.\n@public".to_string())
        );
        assert_eq!(doc_comment_text("/** */"), None);
        assert_eq!(doc_comment_text(""), None);
    }

    #[test]
    fn test_excerpt_and_return_type_from_token_ranges() {
        let doc = json!({
            "kind": "Method",
            "canonicalReference": "widgets!Widget#render:member(1)",
            "name": "render",
            "excerptTokens": [
                { "kind": "Content", "text": "render(target: " },
                { "kind": "Reference", "text": "HTMLElement" },
                { "kind": "Content", "text": "): " },
                { "kind": "Content", "text": "void" },
                { "kind": "Content", "text": ";" }
            ],
            "returnTypeTokenRange": { "startIndex": 3, "endIndex": 4 }
        });
        let item = load_item(&doc, "(test)").unwrap();
        assert_eq!(
            item.excerpt.as_deref(),
            Some("render(target: HTMLElement): void;")
        );
        assert_eq!(item.return_type.as_deref(), Some("void"));
        assert!(item.unreadable.is_empty());
    }

    #[test]
    fn test_out_of_bounds_range_degrades_to_unreadable() {
        let doc = json!({
            "kind": "Method",
            "canonicalReference": "widgets!Widget#render:member(1)",
            "excerptTokens": [ { "kind": "Content", "text": "render(): void;" } ],
            "returnTypeTokenRange": { "startIndex": 5, "endIndex": 9 }
        });
        let item = load_item(&doc, "(test)").unwrap();
        assert_eq!(item.return_type, None);
        assert_eq!(item.unreadable, vec![Capability::ReturnType]);
    }

    #[test]
    fn test_parameters_in_order_with_optionality() {
        let doc = json!({
            "kind": "Function",
            "canonicalReference": "widgets!create:function(1)",
            "name": "create",
            "excerptTokens": [
                { "kind": "Content", "text": "string" },
                { "kind": "Content", "text": "number" }
            ],
            "parameters": [
                {
                    "parameterName": "label",
                    "parameterTypeTokenRange": { "startIndex": 0, "endIndex": 1 },
                    "isOptional": false
                },
                {
                    "parameterName": "size",
                    "parameterTypeTokenRange": { "startIndex": 1, "endIndex": 2 },
                    "isOptional": true
                }
            ]
        });
        let item = load_item(&doc, "(test)").unwrap();
        let parameters = item.parameters.unwrap();
        assert_eq!(parameters.len(), 2);
        assert_eq!(parameters[0].name, "label");
        assert!(!parameters[0].is_optional);
        assert_eq!(parameters[1].name, "size");
        assert!(parameters[1].is_optional);
        assert_eq!(parameters[1].type_text.as_deref(), Some("number"));
    }

    #[test]
    fn test_malformed_parameters_leave_typed_field_absent() {
        let doc = json!({
            "kind": "Function",
            "canonicalReference": "widgets!create:function(1)",
            "parameters": "oops"
        });
        let item = load_item(&doc, "(test)").unwrap();
        assert_eq!(item.parameters, None);
        assert_eq!(item.unreadable, vec![Capability::Parameters]);
        // The capability still reads as present for introspection.
        assert!(item.has(Capability::Parameters));
    }

    #[test]
    fn test_class_heritage() {
        let doc = json!({
            "kind": "Class",
            "canonicalReference": "widgets!Button:class",
            "name": "Button",
            "excerptTokens": [
                { "kind": "Reference", "text": "Widget" },
                { "kind": "Reference", "text": "Clickable" }
            ],
            "extendsTokenRange": { "startIndex": 0, "endIndex": 1 },
            "implementsTokenRanges": [ { "startIndex": 1, "endIndex": 2 } ]
        });
        let item = load_item(&doc, "(test)").unwrap();
        let heritage = item.class_heritage.unwrap();
        assert_eq!(heritage.extends_type.as_deref(), Some("Widget"));
        assert_eq!(heritage.implemented_types, vec!["Clickable".to_string()]);
    }

    #[test]
    fn test_interface_extends() {
        let doc = json!({
            "kind": "Interface",
            "canonicalReference": "widgets!Sized:interface",
            "name": "Sized",
            "excerptTokens": [
                { "kind": "Reference", "text": "Measurable" }
            ],
            "extendsTokenRanges": [ { "startIndex": 0, "endIndex": 1 } ]
        });
        let item = load_item(&doc, "(test)").unwrap();
        assert_eq!(
            item.extends_types,
            Some(vec!["Measurable".to_string()])
        );
    }

    #[test]
    fn test_declared_type_from_property_range() {
        let doc = json!({
            "kind": "PropertySignature",
            "canonicalReference": "widgets!Sized#width:member",
            "name": "width",
            "isOptional": true,
            "isReadonly": false,
            "excerptTokens": [
                { "kind": "Content", "text": "width?: " },
                { "kind": "Content", "text": "number" },
                { "kind": "Content", "text": ";" }
            ],
            "propertyTypeTokenRange": { "startIndex": 1, "endIndex": 2 }
        });
        let item = load_item(&doc, "(test)").unwrap();
        assert_eq!(item.declared_type.as_deref(), Some("number"));
        assert_eq!(item.is_optional, Some(true));
        assert_eq!(item.is_readonly, Some(false));
        // Flags never present in the document stay absent.
        assert_eq!(item.is_static, None);
    }

    #[test]
    fn test_release_tag() {
        let doc = json!({
            "kind": "Variable",
            "canonicalReference": "widgets!VERSION:var",
            "name": "VERSION",
            "releaseTag": "Beta"
        });
        let item = load_item(&doc, "(test)").unwrap();
        assert_eq!(item.release_tag, Some(ReleaseTag::Beta));
    }

    #[test]
    fn test_bad_release_tag_degrades() {
        let doc = json!({
            "kind": "Variable",
            "canonicalReference": "widgets!VERSION:var",
            "releaseTag": "Shiny"
        });
        let item = load_item(&doc, "(test)").unwrap();
        assert_eq!(item.release_tag, None);
        assert_eq!(item.unreadable, vec![Capability::ReleaseTag]);
    }
}
