//! Schema documents, node views, and the `$ref` store.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use crate::error::ReferenceError;
use crate::loader::{is_url, load_schema, navigate_fragment};
use crate::types::{ONE_OF, REF};

/// Where a schema document was loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Location {
    /// Built in memory; external references resolve against the working directory.
    Inline,
    File(PathBuf),
    Url(String),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Inline => f.write_str("<inline>"),
            Location::File(path) => write!(f, "{}", path.display()),
            Location::Url(url) => f.write_str(url),
        }
    }
}

/// A loaded schema document. Cloning shares the underlying JSON.
#[derive(Debug, Clone)]
pub struct SchemaDocument {
    location: Location,
    root: Arc<Value>,
}

impl SchemaDocument {
    pub fn new(location: Location, root: Value) -> Self {
        Self {
            location,
            root: Arc::new(root),
        }
    }

    /// Wrap an in-memory schema.
    pub fn inline(root: Value) -> Self {
        Self::new(Location::Inline, root)
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// The node at a JSON pointer inside this document.
    pub fn node(&self, pointer: &str) -> Option<SchemaNode> {
        let content = navigate_fragment(&self.root, pointer)?.clone();
        Some(SchemaNode {
            document: self.clone(),
            pointer: normalize_pointer(pointer),
            content,
        })
    }

    /// The document root as a node.
    pub fn root_node(&self) -> SchemaNode {
        SchemaNode {
            document: self.clone(),
            pointer: "#".to_string(),
            content: self.root.as_ref().clone(),
        }
    }
}

/// Immutable view over one schema fragment and the document owning it.
#[derive(Debug, Clone)]
pub struct SchemaNode {
    document: SchemaDocument,
    pointer: String,
    content: Value,
}

impl SchemaNode {
    pub fn content(&self) -> &Value {
        &self.content
    }

    pub fn document(&self) -> &SchemaDocument {
        &self.document
    }

    /// JSON pointer of this node within its document, always starting with `#`.
    pub fn pointer(&self) -> &str {
        &self.pointer
    }

    /// `document#pointer`, used in diagnostics and cycle detection.
    pub fn absolute_pointer(&self) -> String {
        match self.document.location() {
            Location::Inline => self.pointer.clone(),
            location => format!("{}{}", location, self.pointer),
        }
    }

    /// The `$ref` target of this node, if any.
    pub fn reference(&self) -> Option<&str> {
        self.content.get(REF).and_then(Value::as_str)
    }

    /// True when `type` is `"object"` or a type list containing it.
    pub fn is_object_typed(&self) -> bool {
        match self.content.get("type") {
            Some(Value::String(t)) => t == "object",
            Some(Value::Array(types)) => types.iter().any(|t| t == "object"),
            _ => false,
        }
    }

    /// The `oneOf` branches in declaration order, or `None` without a `oneOf` array.
    pub fn one_of(&self) -> Option<Vec<SchemaNode>> {
        let branches = self.content.get(ONE_OF)?.as_array()?;
        Some(
            branches
                .iter()
                .enumerate()
                .map(|(i, branch)| SchemaNode {
                    document: self.document.clone(),
                    pointer: format!("{}/{}/{}", self.pointer, ONE_OF, i),
                    content: branch.clone(),
                })
                .collect(),
        )
    }

    /// A short description of the node's declared type, for error messages.
    pub fn type_label(&self) -> String {
        match self.content.get("type") {
            Some(Value::String(t)) => t.clone(),
            Some(other) => other.to_string(),
            None => "untyped".to_string(),
        }
    }
}

/// Resolves `$ref` values to schema nodes.
pub trait SchemaStore {
    /// Resolve `reference` as written inside `from`.
    fn resolve(&self, reference: &str, from: &SchemaDocument) -> Result<SchemaNode, ReferenceError>;
}

/// Store resolving in-document pointers, relative files, and (feature `remote`) URLs.
///
/// Documents are loaded on every lookup; nothing is cached.
#[derive(Debug, Clone, Default)]
pub struct FileSchemaStore {
    base_dir: Option<PathBuf>,
}

impl FileSchemaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve references from inline documents against `base_dir`.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn load(
        &self,
        reference: &str,
        target: &str,
        from: &SchemaDocument,
    ) -> Result<SchemaDocument, ReferenceError> {
        let location = match from.location() {
            _ if is_url(target) => Location::Url(target.to_string()),
            Location::Url(base) => Location::Url(join_url(reference, base, target)?),
            Location::File(path) => {
                let dir = path.parent().unwrap_or(Path::new("."));
                Location::File(canonical(dir.join(target)))
            }
            Location::Inline => Location::File(canonical(
                self.base_dir
                    .as_deref()
                    .unwrap_or(Path::new("."))
                    .join(target),
            )),
        };

        let root = match &location {
            Location::Url(url) => load_url(reference, url)?,
            Location::File(path) => load_file(reference, path)?,
            Location::Inline => load_file(reference, Path::new(target))?,
        };

        Ok(SchemaDocument::new(location, root))
    }
}

impl SchemaStore for FileSchemaStore {
    fn resolve(
        &self,
        reference: &str,
        from: &SchemaDocument,
    ) -> Result<SchemaNode, ReferenceError> {
        let (target, fragment) = match reference.find('#') {
            Some(idx) => (&reference[..idx], &reference[idx..]),
            None => (reference, "#"),
        };

        let document = if target.is_empty() {
            from.clone()
        } else {
            self.load(reference, target, from)?
        };

        document
            .node(fragment)
            .ok_or_else(|| ReferenceError::FragmentNotFound {
                reference: reference.to_string(),
                pointer: normalize_pointer(fragment),
            })
    }
}

fn load_file(reference: &str, path: &Path) -> Result<Value, ReferenceError> {
    load_schema(path).map_err(|source| ReferenceError::Load {
        reference: reference.to_string(),
        source,
    })
}

#[cfg(feature = "remote")]
fn load_url(reference: &str, url: &str) -> Result<Value, ReferenceError> {
    crate::loader::load_schema_url(url).map_err(|source| ReferenceError::Load {
        reference: reference.to_string(),
        source,
    })
}

#[cfg(not(feature = "remote"))]
fn load_url(reference: &str, _url: &str) -> Result<Value, ReferenceError> {
    Err(ReferenceError::RemoteDisabled {
        reference: reference.to_string(),
    })
}

/// Canonical form of a referenced file, so `defs/../defs/a.json` and
/// `defs/a.json` share a cycle key. Paths that do not exist are kept as joined.
fn canonical(path: PathBuf) -> PathBuf {
    path.canonicalize().unwrap_or(path)
}

/// Resolve a relative reference against the URL of the referring document.
#[cfg(feature = "remote")]
fn join_url(reference: &str, base: &str, relative: &str) -> Result<String, ReferenceError> {
    reqwest::Url::parse(base)
        .and_then(|url| url.join(relative))
        .map(String::from)
        .map_err(|e| ReferenceError::InvalidUrl {
            reference: reference.to_string(),
            message: e.to_string(),
        })
}

#[cfg(not(feature = "remote"))]
fn join_url(reference: &str, _base: &str, _relative: &str) -> Result<String, ReferenceError> {
    Err(ReferenceError::RemoteDisabled {
        reference: reference.to_string(),
    })
}

fn normalize_pointer(pointer: &str) -> String {
    let path = pointer.trim_start_matches('#').trim_start_matches('/');
    if path.is_empty() {
        "#".to_string()
    } else {
        format!("#/{}", path)
    }
}
