//! Error types for meshbuf.

use thiserror::Error;

use super::PlainOldDataType;

/// Main error type for buffer and attribute proxy operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The resolved collection has no live elements
    #[error("empty property collection: {0}")]
    EmptyCollection(String),

    /// A vector operation was attempted before any buffer was fetched
    #[error("no buffer allocated, call get() first")]
    NoBuffer,

    /// Buffer shape does not fit the operation
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Attribute layer or layer field cannot be resolved
    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),

    /// Conflicting or redundant constructor arguments
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Attribute domain has no proxy support
    #[error("cannot create a proxy for attributes in domain {0}")]
    DomainNotSupported(String),

    /// Attribute storage kind has no proxy support
    #[error("cannot create a proxy for attributes with storage type {0}")]
    StorageNotSupported(String),

    /// Element or face index out of bounds
    #[error("index {index} out of range (count: {count})")]
    IndexOutOfRange { index: usize, count: usize },

    /// Typed access or arithmetic with the wrong component type
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Host has no collection under this locator
    #[error("collection not found: {0}")]
    CollectionNotFound(String),

    /// Elements of a collection have no such field
    #[error("collection {collection} has no field {field}")]
    FieldNotFound { collection: String, field: String },

    /// Locator string could not be parsed
    #[error("invalid collection locator: {0}")]
    InvalidLocator(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Layer lookup by name failed.
    pub fn unknown_attribute_name(name: &str) -> Self {
        Self::UnknownAttribute(format!("unknown property collection {name}"))
    }

    /// Layer lookup by position failed.
    pub fn unknown_attribute_index(index: usize, count: usize) -> Self {
        Self::UnknownAttribute(format!("unknown property index {index} (count: {count})"))
    }

    /// Layer elements lack the requested field.
    pub fn missing_field(layer: &str, field: &str) -> Self {
        Self::UnknownAttribute(format!(
            "property {layer} does not have an attribute {field}"
        ))
    }

    pub fn type_mismatch(expected: PlainOldDataType, actual: PlainOldDataType) -> Self {
        Self::TypeMismatch {
            expected: expected.name().to_string(),
            actual: actual.name().to_string(),
        }
    }
}

/// Result type alias for meshbuf operations.
pub type Result<T> = std::result::Result<T, Error>;
