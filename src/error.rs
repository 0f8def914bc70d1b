//! Error types for oneOf union generation and dispatch.

use std::path::PathBuf;
use thiserror::Error;

/// Errors while loading a schema document from disk, a string, or a URL.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            LoadError::InvalidJson { .. } => 2,
        }
    }
}

/// Errors while following `$ref` pointers.
#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("fragment not found: {reference} (no value at {pointer})")]
    FragmentNotFound { reference: String, pointer: String },

    #[error("cannot load {reference}: {source}")]
    Load {
        reference: String,
        #[source]
        source: LoadError,
    },

    #[error("circular reference: {}", chain.join(" -> "))]
    Cyclic { chain: Vec<String> },

    #[error("remote reference {reference} requires the `remote` feature")]
    RemoteDisabled { reference: String },

    #[error("cannot resolve {reference} against its base URL: {message}")]
    InvalidUrl { reference: String, message: String },
}

impl ReferenceError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ReferenceError::Load { source, .. } => source.exit_code(),
            _ => 2,
        }
    }
}

/// Errors reported by a [`TypeCompiler`](crate::TypeCompiler).
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("'{name}' at {pointer} is not an object schema")]
    NotObject { name: String, pointer: String },

    #[error("type '{name}' is already declared")]
    AlreadyDeclared { name: String },

    #[error("invalid properties for '{name}': {message}")]
    InvalidProperties { name: String, message: String },
}

/// Fatal errors that abort a generation pass.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("no oneOf array at {pointer}")]
    NotOneOf { pointer: String },

    #[error("oneOf at {pointer} has no branches")]
    EmptyOneOf { pointer: String },

    #[error("only object type supported, {pointer} ({actual}) cannot be used as a oneOf option")]
    NonObjectBranch { pointer: String, actual: String },

    #[error("duplicate oneOf option '{name}'")]
    DuplicateVariant { name: String },

    #[error("variants {} of '{union}' share the enum tag {tag}", variants.join(", "))]
    TagCollision {
        union: String,
        tag: String,
        variants: Vec<String>,
    },

    #[error(transparent)]
    Reference(#[from] ReferenceError),

    #[error(transparent)]
    Compile(CompileError),
}

impl From<CompileError> for GenerationError {
    fn from(err: CompileError) -> Self {
        match err {
            CompileError::AlreadyDeclared { name } => GenerationError::DuplicateVariant { name },
            other => GenerationError::Compile(other),
        }
    }
}

impl GenerationError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            GenerationError::Reference(e) => e.exit_code(),
            _ => 2,
        }
    }
}

/// Errors while materializing the payload of a matched variant.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("expected a JSON object, got {actual}")]
    NotAnObject { actual: String },

    #[error("cannot decode {type_name}: {} error(s)", errors.len())]
    Invalid {
        type_name: String,
        errors: Vec<FieldError>,
    },
}

impl DecodeError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

/// Single payload error with path context.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldError {
    /// JSON Pointer (RFC 6901) to the offending value.
    pub path: String,
    /// Human-readable error message.
    pub message: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}
