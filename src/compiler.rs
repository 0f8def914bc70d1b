//! Type compilation for object-typed branches and payload materialization.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::{CompileError, DecodeError, FieldError};
use crate::naming::Namespace;
use crate::schema::SchemaNode;
use crate::types::json_type_name;

/// Turns an object schema fragment into a named type.
pub trait TypeCompiler {
    /// Compile `fragment` under `name`, declaring the name in `namespace`.
    ///
    /// # Errors
    ///
    /// `CompileError::AlreadyDeclared` if `name` is taken, `CompileError::NotObject`
    /// for fragments that do not describe an object.
    fn compile(
        &self,
        name: &str,
        fragment: &SchemaNode,
        namespace: &mut Namespace,
    ) -> Result<TypeHandle, CompileError>;
}

/// Builds a variant's value from a matched input map.
pub trait Materializer: Send + Sync + fmt::Debug {
    fn materialize(
        &self,
        type_name: &str,
        fields: &Map<String, Value>,
    ) -> Result<Value, DecodeError>;
}

/// JSON type of a declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
    Null,
    Any,
}

impl FieldKind {
    /// Kind of a property schema. A type list such as `["number", "null"]`
    /// takes its single non-null member; any list admitting `number` is
    /// [`FieldKind::Number`].
    fn from_schema(property: &Value) -> Self {
        match property.get("type") {
            Some(Value::String(name)) => Self::from_type_name(name),
            Some(Value::Array(names)) => {
                let names: Vec<&str> = names.iter().filter_map(Value::as_str).collect();
                if names.contains(&"number") {
                    return FieldKind::Number;
                }
                let non_null: Vec<&str> = names.iter().copied().filter(|n| *n != "null").collect();
                match non_null.as_slice() {
                    [single] => Self::from_type_name(single),
                    [] if !names.is_empty() => FieldKind::Null,
                    _ => FieldKind::Any,
                }
            }
            _ => FieldKind::Any,
        }
    }

    fn from_type_name(name: &str) -> Self {
        match name {
            "string" => FieldKind::String,
            "integer" => FieldKind::Integer,
            "number" => FieldKind::Number,
            "boolean" => FieldKind::Boolean,
            "object" => FieldKind::Object,
            "array" => FieldKind::Array,
            "null" => FieldKind::Null,
            _ => FieldKind::Any,
        }
    }

    /// Whether values of this kind may be non-integral numbers.
    pub fn is_float(&self) -> bool {
        matches!(self, FieldKind::Number)
    }
}

/// One declared field of a compiled type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: String,
    pub required: bool,
    pub kind: FieldKind,
}

/// Handle to a compiled type: its name, declared fields, and materializer.
#[derive(Debug, Clone)]
pub struct TypeHandle {
    name: String,
    fields: Vec<FieldDecl>,
    materializer: Arc<dyn Materializer>,
}

impl TypeHandle {
    pub fn new(
        name: impl Into<String>,
        fields: Vec<FieldDecl>,
        materializer: Arc<dyn Materializer>,
    ) -> Self {
        Self {
            name: name.into(),
            fields,
            materializer,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields in schema order.
    pub fn fields(&self) -> &[FieldDecl] {
        &self.fields
    }

    pub fn has_float_field(&self) -> bool {
        self.fields.iter().any(|f| f.kind.is_float())
    }

    pub fn materialize(&self, fields: &Map<String, Value>) -> Result<Value, DecodeError> {
        self.materializer.materialize(&self.name, fields)
    }
}

/// Compiles `type: object` fragments from their `properties` and `required` keywords.
///
/// A field is marked required when listed in the fragment's `required` array
/// or, draft-03 style, when its property schema carries `"required": true`.
/// Names listed in `required` without a property schema become fields of kind
/// [`FieldKind::Any`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectTypeCompiler;

impl ObjectTypeCompiler {
    pub fn new() -> Self {
        Self
    }
}

impl TypeCompiler for ObjectTypeCompiler {
    fn compile(
        &self,
        name: &str,
        fragment: &SchemaNode,
        namespace: &mut Namespace,
    ) -> Result<TypeHandle, CompileError> {
        if !fragment.is_object_typed() {
            return Err(CompileError::NotObject {
                name: name.to_string(),
                pointer: fragment.absolute_pointer(),
            });
        }

        let content = fragment.content();
        let empty = Map::new();
        let properties = match content.get("properties") {
            None => &empty,
            Some(Value::Object(props)) => props,
            Some(other) => {
                return Err(CompileError::InvalidProperties {
                    name: name.to_string(),
                    message: format!("expected object, got {}", json_type_name(other)),
                });
            }
        };

        let required: Vec<&str> = content
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let mut fields: Vec<FieldDecl> = properties
            .iter()
            .map(|(field, property)| FieldDecl {
                name: field.clone(),
                required: required.contains(&field.as_str())
                    || property.get("required") == Some(&Value::Bool(true)),
                kind: FieldKind::from_schema(property),
            })
            .collect();

        for field in required {
            if !properties.contains_key(field) {
                fields.push(FieldDecl {
                    name: field.to_string(),
                    required: true,
                    kind: FieldKind::Any,
                });
            }
        }

        if !namespace.declare(name) {
            return Err(CompileError::AlreadyDeclared {
                name: name.to_string(),
            });
        }

        let materializer = SchemaMaterializer::new(name, fragment);
        Ok(TypeHandle::new(name, fields, Arc::new(materializer)))
    }
}

/// Validates matched payloads against the variant's schema with `jsonschema`.
///
/// If the fragment cannot be compiled into a validator (for instance because it
/// points at external documents) payloads are accepted unchecked.
pub struct SchemaMaterializer {
    validator: Option<jsonschema::Validator>,
}

impl SchemaMaterializer {
    pub fn new(type_name: &str, fragment: &SchemaNode) -> Self {
        let schema = validation_schema(fragment);
        let validator = match jsonschema::validator_for(&schema) {
            Ok(validator) => Some(validator),
            Err(e) => {
                tracing::warn!(
                    type_name,
                    pointer = %fragment.absolute_pointer(),
                    error = %e,
                    "cannot build payload validator; payloads will not be type checked"
                );
                None
            }
        };
        Self { validator }
    }

    pub fn is_validating(&self) -> bool {
        self.validator.is_some()
    }
}

impl fmt::Debug for SchemaMaterializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaMaterializer")
            .field("validating", &self.is_validating())
            .finish()
    }
}

impl Materializer for SchemaMaterializer {
    fn materialize(
        &self,
        type_name: &str,
        fields: &Map<String, Value>,
    ) -> Result<Value, DecodeError> {
        let instance = Value::Object(fields.clone());
        let Some(validator) = &self.validator else {
            return Ok(instance);
        };

        let errors: Vec<FieldError> = validator
            .iter_errors(&instance)
            .map(|e| FieldError {
                path: e.instance_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        if errors.is_empty() {
            Ok(instance)
        } else {
            Err(DecodeError::Invalid {
                type_name: type_name.to_string(),
                errors,
            })
        }
    }
}

/// Standalone copy of a fragment: the owning document's `$schema` and
/// definitions are carried over so in-document refs keep resolving, and
/// draft-03 boolean `required` markers are dropped.
fn validation_schema(fragment: &SchemaNode) -> Value {
    let mut schema = fragment.content().clone();
    let Value::Object(map) = &mut schema else {
        return schema;
    };

    if let Value::Object(root) = fragment.document().root() {
        for key in ["$schema", "definitions", "$defs"] {
            if let Some(value) = root.get(key) {
                map.entry(key).or_insert_with(|| value.clone());
            }
        }
    }

    if let Some(Value::Object(props)) = map.get_mut("properties") {
        for property in props.values_mut() {
            if let Some(prop) = property.as_object_mut() {
                if prop.get("required").map_or(false, Value::is_boolean) {
                    prop.remove("required");
                }
            }
        }
    }

    schema
}
