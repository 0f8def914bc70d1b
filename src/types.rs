//! Core types and generation options.

use serde_json::Value;

/// Schema keyword holding the union branches.
pub const ONE_OF: &str = "oneOf";

/// Schema keyword for references.
pub const REF: &str = "$ref";

/// Tag used when a variant name has no usable characters.
pub const EMPTY_TAG: &str = "EMPTY_TAG";

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Options for a generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Emit `PartialEq` (and where safe `Eq`/`Hash`) on the generated wrapper.
    pub include_hash_and_equals: bool,
    /// Withhold `Eq`/`Hash` when any variant carries a floating point field.
    pub float_safe_equality: bool,
    /// Prepended to every generated type name.
    pub class_name_prefix: Option<String>,
    /// Appended to every generated type name.
    pub class_name_suffix: Option<String>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            include_hash_and_equals: true,
            float_safe_equality: true,
            class_name_prefix: None,
            class_name_suffix: None,
        }
    }
}

impl GenerateOptions {
    /// Create options with equality generation on and no name affixes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether equality and hashing are generated.
    pub fn hash_and_equals(mut self, enabled: bool) -> Self {
        self.include_hash_and_equals = enabled;
        self
    }

    /// Set the floating point equality strategy.
    pub fn float_safe(mut self, enabled: bool) -> Self {
        self.float_safe_equality = enabled;
        self
    }

    /// Set the type name prefix. Empty strings are treated as unset.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_name_prefix = Some(prefix.into()).filter(|p| !p.is_empty());
        self
    }

    /// Set the type name suffix. Empty strings are treated as unset.
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.class_name_suffix = Some(suffix.into()).filter(|s| !s.is_empty());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_type_names() {
        assert_eq!(json_type_name(&json!(null)), "null");
        assert_eq!(json_type_name(&json!("dog")), "string");
        assert_eq!(json_type_name(&json!([1])), "array");
        assert_eq!(json_type_name(&json!({})), "object");
    }

    #[test]
    fn options_defaults() {
        let opts = GenerateOptions::new();
        assert!(opts.include_hash_and_equals);
        assert!(opts.float_safe_equality);
        assert_eq!(opts.class_name_prefix, None);
        assert_eq!(opts.class_name_suffix, None);
    }

    #[test]
    fn options_builder_drops_empty_affixes() {
        let opts = GenerateOptions::new()
            .prefix("")
            .suffix("Dto")
            .hash_and_equals(false);
        assert_eq!(opts.class_name_prefix, None);
        assert_eq!(opts.class_name_suffix.as_deref(), Some("Dto"));
        assert!(!opts.include_hash_and_equals);
    }
}
