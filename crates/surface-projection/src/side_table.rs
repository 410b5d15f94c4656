//! Canonical-reference side table.
//!
//! A pre-pass over the raw parsed document that indexes every object
//! carrying a `canonicalReference` string, by descending `members` arrays
//! (the same recursion shape as the typed tree, over generic JSON). Built
//! once per request from the same document instance that feeds the typed
//! loader; the projector joins against it by reference string.

use serde_json::Value;
use std::collections::HashMap;

/// Reference-keyed index into the raw document.
///
/// Borrows from the document; the table never outlives the request.
#[derive(Debug)]
pub struct SideTable<'a> {
    entries: HashMap<&'a str, &'a Value>,
}

impl<'a> SideTable<'a> {
    /// Walk the document and index every canonical reference in it.
    pub fn build(doc: &'a Value) -> Self {
        let mut entries = HashMap::new();
        index_into(doc, &mut entries);
        Self { entries }
    }

    /// Raw JSON object for a canonical reference, if the document has one.
    pub fn get(&self, canonical_reference: &str) -> Option<&'a Value> {
        self.entries.get(canonical_reference).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn index_into<'a>(value: &'a Value, entries: &mut HashMap<&'a str, &'a Value>) {
    let Some(obj) = value.as_object() else {
        return;
    };
    if let Some(reference) = obj.get("canonicalReference").and_then(Value::as_str) {
        entries.insert(reference, value);
    }
    if let Some(members) = obj.get("members").and_then(Value::as_array) {
        for member in members {
            index_into(member, entries);
        }
    }
}
