//! Variant fingerprints: the required and optional field sets of each branch.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::compiler::TypeHandle;
use crate::naming::{tag_name, NamingPolicy};

/// One `oneOf` branch: its enum tag, compiled type, and field fingerprint.
///
/// Immutable once built; both field lists are sorted and free of duplicates.
#[derive(Debug, Clone, Serialize)]
pub struct VariantDescriptor {
    tag: String,
    #[serde(rename = "type")]
    type_name: String,
    required: Vec<String>,
    optional: Vec<String>,
    #[serde(skip)]
    handle: TypeHandle,
}

impl VariantDescriptor {
    /// Fingerprint a compiled type using its per-field required markers.
    pub fn from_handle(handle: TypeHandle, policy: &dyn NamingPolicy) -> Self {
        let mut required = BTreeSet::new();
        let mut optional = BTreeSet::new();
        for field in handle.fields() {
            if field.required {
                required.insert(field.name.clone());
            } else {
                optional.insert(field.name.clone());
            }
        }
        // A name declared both ways counts as required.
        optional.retain(|name| !required.contains(name));

        Self {
            tag: tag_name(handle.name(), policy),
            type_name: handle.name().to_string(),
            required: required.into_iter().collect(),
            optional: optional.into_iter().collect(),
            handle,
        }
    }

    pub fn tag_name(&self) -> &str {
        &self.tag
    }

    /// The variant's type name; also its display string.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn required_fields(&self) -> &[String] {
        &self.required
    }

    pub fn optional_fields(&self) -> &[String] {
        &self.optional
    }

    pub fn type_handle(&self) -> &TypeHandle {
        &self.handle
    }

    /// Required fields absent from `keys`.
    pub fn missing<'a>(&'a self, keys: &BTreeSet<&str>) -> Vec<&'a str> {
        self.required
            .iter()
            .map(String::as_str)
            .filter(|name| !keys.contains(name))
            .collect()
    }

    /// Keys that are neither required nor optional for this variant.
    pub fn extra<'k>(&self, keys: &BTreeSet<&'k str>) -> Vec<&'k str> {
        keys.iter()
            .copied()
            .filter(|key| {
                self.required.binary_search_by(|f| f.as_str().cmp(key)).is_err()
                    && self.optional.binary_search_by(|f| f.as_str().cmp(key)).is_err()
            })
            .collect()
    }
}

impl std::fmt::Display for VariantDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.type_name)
    }
}
