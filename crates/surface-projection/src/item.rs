//! Typed API item model.
//!
//! An `ApiItem` is one node of the parsed API surface tree. The upstream
//! document expresses optional behavior as mixins; here each mixin becomes
//! an optional field (or sub-struct) on a plain value type, so "does this
//! item have parameters?" is a field presence check rather than a dynamic
//! type probe.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind tag for an API item. Matches the `kind` strings of the
/// `.api.json` document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Package,
    EntryPoint,
    Class,
    Interface,
    Method,
    MethodSignature,
    Property,
    PropertySignature,
    Function,
    Variable,
    TypeAlias,
    Enum,
    EnumMember,
    Namespace,
    Constructor,
    ConstructSignature,
    CallSignature,
    IndexSignature,
}

impl ItemKind {
    /// Parse the document's `kind` string.
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "Package" => Self::Package,
            "EntryPoint" => Self::EntryPoint,
            "Class" => Self::Class,
            "Interface" => Self::Interface,
            "Method" => Self::Method,
            "MethodSignature" => Self::MethodSignature,
            "Property" => Self::Property,
            "PropertySignature" => Self::PropertySignature,
            "Function" => Self::Function,
            "Variable" => Self::Variable,
            "TypeAlias" => Self::TypeAlias,
            "Enum" => Self::Enum,
            "EnumMember" => Self::EnumMember,
            "Namespace" => Self::Namespace,
            "Constructor" => Self::Constructor,
            "ConstructSignature" => Self::ConstructSignature,
            "CallSignature" => Self::CallSignature,
            "IndexSignature" => Self::IndexSignature,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Package => "Package",
            Self::EntryPoint => "EntryPoint",
            Self::Class => "Class",
            Self::Interface => "Interface",
            Self::Method => "Method",
            Self::MethodSignature => "MethodSignature",
            Self::Property => "Property",
            Self::PropertySignature => "PropertySignature",
            Self::Function => "Function",
            Self::Variable => "Variable",
            Self::TypeAlias => "TypeAlias",
            Self::Enum => "Enum",
            Self::EnumMember => "EnumMember",
            Self::Namespace => "Namespace",
            Self::Constructor => "Constructor",
            Self::ConstructSignature => "ConstructSignature",
            Self::CallSignature => "CallSignature",
            Self::IndexSignature => "IndexSignature",
        }
    }

    /// Container kinds hold members as their primary content and carry
    /// the member-order preservation flag.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Self::Package
                | Self::EntryPoint
                | Self::Class
                | Self::Interface
                | Self::Enum
                | Self::Namespace
        )
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Release classification of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReleaseTag {
    Public,
    Beta,
    Alpha,
    Internal,
    None,
}

impl ReleaseTag {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "Public" => Self::Public,
            "Beta" => Self::Beta,
            "Alpha" => Self::Alpha,
            "Internal" => Self::Internal,
            "None" => Self::None,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "Public",
            Self::Beta => "Beta",
            Self::Alpha => "Alpha",
            Self::Internal => "Internal",
            Self::None => "None",
        }
    }
}

/// One entry of a function-like item's parameter list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_text: Option<String>,
    pub is_optional: bool,
}

/// One entry of a generic item's type-parameter list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeParameter {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_type: Option<String>,
}

/// Extends/implements relationships of a class.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassHeritage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends_type: Option<String>,
    pub implemented_types: Vec<String>,
}

/// Container-specific facet: member ordering behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerFacet {
    pub preserve_member_order: bool,
}

/// The capability facets an item may carry, in the fixed order generic
/// introspection probes them. The order is part of the output contract:
/// `JsModel.mixins` and property insertion follow it exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Name,
    ReleaseTag,
    Docs,
    Excerpt,
    Parameters,
    TypeParameters,
    ReturnType,
    Optional,
    Readonly,
    Static,
    Abstract,
    Protected,
    Exported,
    Initializer,
    ClassHeritage,
    ExtendsTypes,
    DeclaredType,
    Container,
}

impl Capability {
    /// Probe order for generic introspection.
    pub const ALL: [Capability; 18] = [
        Capability::Name,
        Capability::ReleaseTag,
        Capability::Docs,
        Capability::Excerpt,
        Capability::Parameters,
        Capability::TypeParameters,
        Capability::ReturnType,
        Capability::Optional,
        Capability::Readonly,
        Capability::Static,
        Capability::Abstract,
        Capability::Protected,
        Capability::Exported,
        Capability::Initializer,
        Capability::ClassHeritage,
        Capability::ExtendsTypes,
        Capability::DeclaredType,
        Capability::Container,
    ];

    /// Label used in `JsModel.mixins` and as the property key
    /// (the container capability fans out to two keys, see the projector).
    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::ReleaseTag => "releaseTag",
            Self::Docs => "docs",
            Self::Excerpt => "excerpt",
            Self::Parameters => "parameters",
            Self::TypeParameters => "typeParameters",
            Self::ReturnType => "returnType",
            Self::Optional => "isOptional",
            Self::Readonly => "isReadonly",
            Self::Static => "isStatic",
            Self::Abstract => "isAbstract",
            Self::Protected => "isProtected",
            Self::Exported => "isExported",
            Self::Initializer => "initializer",
            Self::ClassHeritage => "classHeritage",
            Self::ExtendsTypes => "extendsTypes",
            Self::DeclaredType => "declaredType",
            Self::Container => "container",
        }
    }
}

/// One node of the parsed API surface tree.
///
/// Every optional field stands for a capability the concrete kind may or
/// may not carry; `None` means "not applicable", never "empty". Text
/// fields are whitespace-trimmed at load time and an all-whitespace value
/// collapses to `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiItem {
    pub kind: ItemKind,
    pub canonical_reference: String,
    pub members: Vec<ApiItem>,

    pub name: Option<String>,
    pub release_tag: Option<ReleaseTag>,
    pub docs: Option<String>,
    pub excerpt: Option<String>,
    pub parameters: Option<Vec<Parameter>>,
    pub type_parameters: Option<Vec<TypeParameter>>,
    pub return_type: Option<String>,
    pub is_optional: Option<bool>,
    pub is_readonly: Option<bool>,
    pub is_static: Option<bool>,
    pub is_abstract: Option<bool>,
    pub is_protected: Option<bool>,
    pub is_exported: Option<bool>,
    pub initializer: Option<String>,
    pub class_heritage: Option<ClassHeritage>,
    pub extends_types: Option<Vec<String>>,
    pub declared_type: Option<String>,
    pub container: Option<ContainerFacet>,

    /// Capabilities whose input field was present but unreadable. The
    /// loader records them instead of failing; generic introspection
    /// surfaces a placeholder for each.
    pub unreadable: Vec<Capability>,
}

impl ApiItem {
    /// Create an item with no capabilities beyond kind and reference.
    pub fn new(kind: ItemKind, canonical_reference: impl Into<String>) -> Self {
        Self {
            kind,
            canonical_reference: canonical_reference.into(),
            members: Vec::new(),
            name: None,
            release_tag: None,
            docs: None,
            excerpt: None,
            parameters: None,
            type_parameters: None,
            return_type: None,
            is_optional: None,
            is_readonly: None,
            is_static: None,
            is_abstract: None,
            is_protected: None,
            is_exported: None,
            initializer: None,
            class_heritage: None,
            extends_types: None,
            declared_type: None,
            container: None,
            unreadable: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_member(mut self, member: ApiItem) -> Self {
        self.members.push(member);
        self
    }

    pub fn with_release_tag(mut self, tag: ReleaseTag) -> Self {
        self.release_tag = Some(tag);
        self
    }

    pub fn with_parameters(mut self, parameters: Vec<Parameter>) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn with_container(mut self, facet: ContainerFacet) -> Self {
        self.container = Some(facet);
        self
    }

    /// Whether the item carries the given capability (readable or not).
    pub fn has(&self, capability: Capability) -> bool {
        if self.unreadable.contains(&capability) {
            return true;
        }
        match capability {
            Capability::Name => self.name.is_some(),
            Capability::ReleaseTag => self.release_tag.is_some(),
            Capability::Docs => self.docs.is_some(),
            Capability::Excerpt => self.excerpt.is_some(),
            Capability::Parameters => self.parameters.is_some(),
            Capability::TypeParameters => self.type_parameters.is_some(),
            Capability::ReturnType => self.return_type.is_some(),
            Capability::Optional => self.is_optional.is_some(),
            Capability::Readonly => self.is_readonly.is_some(),
            Capability::Static => self.is_static.is_some(),
            Capability::Abstract => self.is_abstract.is_some(),
            Capability::Protected => self.is_protected.is_some(),
            Capability::Exported => self.is_exported.is_some(),
            Capability::Initializer => self.initializer.is_some(),
            Capability::ClassHeritage => self.class_heritage.is_some(),
            Capability::ExtendsTypes => self.extends_types.is_some(),
            Capability::DeclaredType => self.declared_type.is_some(),
            Capability::Container => self.container.is_some(),
        }
    }

    /// Display label: the name, or `(Kind)` when the name is absent.
    pub fn display_label(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("({})", self.kind),
        }
    }

    /// Total number of items in this subtree, self included.
    pub fn item_count(&self) -> usize {
        1 + self.members.iter().map(ApiItem::item_count).sum::<usize>()
    }
}
