//! oneOf union generation
//!
//! Compiles a JSON Schema `oneOf` whose branches are object schemas into a
//! union type: an ordered list of variant tags, each fingerprinted by the
//! variant's required and optional field names, plus a dispatcher that picks
//! the variant for an untyped JSON object by its keys alone.
//!
//! # Example
//!
//! ```
//! use oneof_codegen::{generate_union, Dispatch, GenerateOptions};
//! use serde_json::json;
//!
//! let schema = json!({
//!     "definitions": {
//!         "dog": {
//!             "type": "object",
//!             "properties": {
//!                 "name": { "type": "string" },
//!                 "gender": { "type": "string" },
//!                 "bark": { "type": "boolean" }
//!             },
//!             "required": ["name", "gender"]
//!         },
//!         "cat": {
//!             "type": "object",
//!             "properties": {
//!                 "name": { "type": "string" },
//!                 "gender": { "type": "string" },
//!                 "meow": { "type": "boolean" }
//!             },
//!             "required": ["name", "gender"]
//!         }
//!     },
//!     "oneOf": [
//!         { "$ref": "#/definitions/dog" },
//!         { "$ref": "#/definitions/cat" }
//!     ]
//! });
//!
//! let animal = generate_union(&schema, "animal", &GenerateOptions::new()).unwrap();
//! assert_eq!(animal.name(), "Animal");
//!
//! let input = json!({ "name": "Rex", "gender": "M", "bark": true });
//! match animal.from_json(&input).unwrap() {
//!     Dispatch::Matched(value) => assert_eq!(value.tag().name(), "DOG"),
//!     Dispatch::NoMatch(no_match) => panic!("{}", no_match),
//! }
//! ```
//!
//! # Matching Rules
//!
//! | Input keys | Result |
//! |------------|--------|
//! | all required, some optional, nothing else | variant matches |
//! | a required field missing | variant skipped |
//! | a key neither required nor optional | variant skipped |
//! | several variants match | the first declared wins |
//! | no variant matches | [`Dispatch::NoMatch`] |

mod compiler;
mod descriptor;
mod dispatch;
mod error;
mod generator;
mod loader;
mod naming;
mod render;
mod resolver;
mod schema;
mod types;
mod union;

pub use compiler::{
    FieldDecl, FieldKind, Materializer, ObjectTypeCompiler, SchemaMaterializer, TypeCompiler,
    TypeHandle,
};
pub use descriptor::VariantDescriptor;
pub use dispatch::{Dispatch, NoMatch, Rejection};
pub use error::{CompileError, DecodeError, FieldError, GenerationError, LoadError, ReferenceError};
pub use generator::{generate_union, GenerationRun, UnionGenerator};
pub use loader::{is_url, load_schema, load_schema_auto, load_schema_str, navigate_fragment};
pub use naming::{tag_name, DefaultNamingPolicy, NameRegistry, NamingPolicy, Namespace};
pub use render::render_union;
pub use resolver::{resolve, resolve_chain, ReferenceChain};
pub use schema::{FileSchemaStore, Location, SchemaDocument, SchemaNode, SchemaStore};
pub use types::{json_type_name, GenerateOptions, EMPTY_TAG};
pub use union::{Tag, UnionType, UnionValue, TAG_TYPE_SUFFIX};

#[cfg(feature = "remote")]
pub use loader::load_schema_url;
