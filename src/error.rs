//! Error types for slot containers
//!
//! Two runtime error kinds cover every keyed access:
//! - [`Error::UndeclaredKey`]: the key is not declared in the schema and
//!   names no accessor, so the container will never hold it.
//! - [`Error::ValueMissing`]: the key is permitted but currently holds
//!   no value in the backing store.
//!
//! Schema construction has its own error enum ([`SchemaError`]) because
//! those failures happen once, at registration time, not per access.
//!
//! We use `thiserror` for automatic `Display` and `Error` trait
//! implementations.

use thiserror::Error;

/// Result type alias for container operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by keyed access to a container
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Key is not declared in the schema and has no accessor bound
    #[error("key {key:?} is not declared and has no accessor")]
    UndeclaredKey {
        /// The offending key
        key: String,
    },

    /// Key is permitted but no value is currently stored under it
    #[error("key {key:?} holds no value")]
    ValueMissing {
        /// The offending key
        key: String,
    },
}

impl Error {
    /// Build an `UndeclaredKey` error for `key`
    pub fn undeclared(key: impl Into<String>) -> Self {
        Error::UndeclaredKey { key: key.into() }
    }

    /// Build a `ValueMissing` error for `key`
    pub fn missing(key: impl Into<String>) -> Self {
        Error::ValueMissing { key: key.into() }
    }

    /// The key this error refers to
    pub fn key(&self) -> &str {
        match self {
            Error::UndeclaredKey { key } => key,
            Error::ValueMissing { key } => key,
        }
    }
}

/// Errors raised while building a [`Schema`](crate::Schema)
///
/// These are registration-time failures: a schema that fails to build
/// never produces a container.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The builder declared no keys and bound no accessors
    #[error("schema declares no keys and binds no accessors")]
    EmptySchema,

    /// The same key was declared more than once
    #[error("key {key:?} declared more than once")]
    DuplicateKey {
        /// The duplicated key
        key: String,
    },
}
