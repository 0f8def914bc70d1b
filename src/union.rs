//! The generated sum type: ordered variant tags and the `(tag, payload)` value.

use std::hash::{Hash, Hasher};

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::descriptor::VariantDescriptor;

/// Suffix of the generated tag enum's name.
pub const TAG_TYPE_SUFFIX: &str = "OneOf";

/// A compiled `oneOf`: wrapper name plus variants in declaration order.
///
/// Declaration order is dispatch priority. Never mutated after generation,
/// so a `UnionType` can be shared across threads for decoding.
#[derive(Debug, Clone, Serialize)]
pub struct UnionType {
    name: String,
    tag_type: String,
    variants: Vec<VariantDescriptor>,
}

impl UnionType {
    pub fn new(name: impl Into<String>, variants: Vec<VariantDescriptor>) -> Self {
        let name = name.into();
        Self {
            tag_type: format!("{}{}", name, TAG_TYPE_SUFFIX),
            name,
            variants,
        }
    }

    /// Name of the wrapper type.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the tag enumeration.
    pub fn tag_type_name(&self) -> &str {
        &self.tag_type
    }

    pub fn variants(&self) -> &[VariantDescriptor] {
        &self.variants
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// The descriptor behind a tag produced by this union.
    pub fn variant(&self, tag: &Tag) -> Option<&VariantDescriptor> {
        self.variants.get(tag.index)
    }

    /// Tags in declaration order.
    pub fn tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.variants
            .iter()
            .enumerate()
            .map(|(index, v)| Tag::new(index, v.tag_name()))
    }

    /// First variant whose enum tag is `name` (`DOG`, not the type name `Dog`).
    pub fn tag_named(&self, name: &str) -> Option<Tag> {
        self.tags().find(|tag| tag.name == name)
    }

    /// True if any variant has a floating point field.
    pub fn has_float_fields(&self) -> bool {
        self.variants
            .iter()
            .any(|v| v.type_handle().has_float_field())
    }

    /// Groups of variant type names sharing an enum tag.
    pub fn tag_collisions(&self) -> Vec<(String, Vec<String>)> {
        let mut collisions: Vec<(String, Vec<String>)> = Vec::new();
        for variant in &self.variants {
            match collisions
                .iter()
                .position(|(tag, _)| tag == variant.tag_name())
            {
                Some(i) => collisions[i].1.push(variant.type_name().to_string()),
                None => collisions.push((
                    variant.tag_name().to_string(),
                    vec![variant.type_name().to_string()],
                )),
            }
        }
        collisions.retain(|(_, names)| names.len() > 1);
        collisions
    }
}

/// Identifies the variant a [`UnionValue`] holds.
///
/// The declaration index is kept alongside the name because distinct
/// variants may share a tag name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    index: usize,
    name: String,
}

impl Tag {
    pub(crate) fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
        }
    }

    /// Declaration index of the variant.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// A decoded union value. Serializes as its payload.
#[derive(Debug, Clone)]
pub struct UnionValue {
    tag: Tag,
    payload: Value,
}

impl UnionValue {
    pub(crate) fn new(tag: Tag, payload: Value) -> Self {
        Self { tag, payload }
    }

    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn into_payload(self) -> Value {
        self.payload
    }
}

impl PartialEq for UnionValue {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag && self.payload == other.payload
    }
}

impl Eq for UnionValue {}

impl Hash for UnionValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tag.hash(state);
        hash_value(&self.payload, state);
    }
}

impl Serialize for UnionValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.payload.serialize(serializer)
    }
}

/// Hash consistent with `Value`'s equality: object keys are visited in sorted
/// order and numbers are hashed through their canonical text.
fn hash_value<H: Hasher>(value: &Value, state: &mut H) {
    std::mem::discriminant(value).hash(state);
    match value {
        Value::Null => {}
        Value::Bool(b) => b.hash(state),
        Value::Number(n) => n.to_string().hash(state),
        Value::String(s) => s.hash(state),
        Value::Array(items) => {
            items.len().hash(state);
            for item in items {
                hash_value(item, state);
            }
        }
        Value::Object(map) => {
            map.len().hash(state);
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for key in keys {
                key.hash(state);
                hash_value(&map[key.as_str()], state);
            }
        }
    }
}
