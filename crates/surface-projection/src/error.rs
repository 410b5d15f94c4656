//! Loader error types.

use thiserror::Error;

/// Errors raised while mapping a raw document into the typed item tree.
///
/// Only structural problems are errors; a present-but-malformed capability
/// field degrades to `ApiItem::unreadable` instead (the rest of the tree
/// must still load).
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    /// Document root lacks a required top-level marker.
    #[error("document is missing the top-level '{field}' field")]
    MissingMarker {
        /// The absent field (`metadata` or `kind`).
        field: &'static str,
    },

    /// Document root is not a JSON object.
    #[error("document root is not a JSON object")]
    RootNotAnObject,

    /// A member entry is not a JSON object.
    #[error("member {index} under '{parent}' is not a JSON object")]
    MemberNotAnObject {
        /// Canonical reference of the containing item.
        parent: String,
        /// Position in the containing `members` array.
        index: usize,
    },

    /// An item has no usable `kind` string.
    #[error("item '{canonical_reference}' has no 'kind' string")]
    MissingKind {
        /// Canonical reference of the offending item, or the parent's
        /// reference if the item has none either.
        canonical_reference: String,
    },

    /// An item's `kind` string is not a recognized item kind.
    #[error("item '{canonical_reference}' has unrecognized kind '{kind}'")]
    UnknownKind {
        canonical_reference: String,
        kind: String,
    },

    /// An item has no `canonicalReference` string.
    #[error("item under '{parent}' is missing a 'canonicalReference'")]
    MissingCanonicalReference {
        /// Canonical reference of the containing item.
        parent: String,
    },
}

impl LoadError {
    /// Short machine-readable code for this error type.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingMarker { .. } => "MISSING_MARKER",
            Self::RootNotAnObject => "ROOT_NOT_OBJECT",
            Self::MemberNotAnObject { .. } => "MEMBER_NOT_OBJECT",
            Self::MissingKind { .. } => "MISSING_KIND",
            Self::UnknownKind { .. } => "UNKNOWN_KIND",
            Self::MissingCanonicalReference { .. } => "MISSING_CANONICAL_REFERENCE",
        }
    }

    /// Whether this error means the text is not an API surface document
    /// at all, as opposed to a document whose content failed to load.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::MissingMarker { .. } | Self::RootNotAnObject)
    }
}
