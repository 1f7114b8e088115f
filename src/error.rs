//! Error types for rowcast.

use thiserror::Error;

use crate::types::TypeTag;

/// A failure reported by the underlying driver.
///
/// Cursors and connection handles return this; rowcast wraps it into a
/// [`CastError`] that says which control operation was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DriverError {
    pub message: String,
}

impl DriverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The main error type for rowcast operations.
#[derive(Debug, Error)]
pub enum CastError {
    /// A payload does not match its column's declared type.
    #[error("Decode error at row {row}, column '{column}' ({tag}): {message}")]
    Decode {
        row: usize,
        column: String,
        tag: TypeTag,
        message: String,
    },

    /// The cursor's column count disagrees with its field names or type tags.
    #[error("Result shape mismatch: {columns} columns, {fields} field names, {types} type tags")]
    Shape {
        columns: usize,
        fields: usize,
        types: usize,
    },

    /// begin/commit/rollback was rejected by the handle.
    #[error("Transaction error: {op} {savepoint} failed: {source}")]
    Transaction {
        op: &'static str,
        savepoint: String,
        #[source]
        source: DriverError,
    },

    /// The connection handle is closed or was lost.
    #[error("Invalid handle: {0}")]
    InvalidHandle(String),

    /// Statement execution or close failed inside the driver.
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`CastError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Decode,
    Transaction,
    InvalidHandle,
    Driver,
    Config,
}

impl CastError {
    /// Wrap a driver failure of a transaction control call.
    pub fn transaction(op: &'static str, savepoint: Option<&str>, source: DriverError) -> Self {
        Self::Transaction {
            op,
            savepoint: savepoint.unwrap_or("<outermost>").to_string(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CastError::Decode { .. } | CastError::Shape { .. } => ErrorKind::Decode,
            CastError::Transaction { .. } => ErrorKind::Transaction,
            CastError::InvalidHandle(_) => ErrorKind::InvalidHandle,
            CastError::Driver(_) | CastError::Io(_) => ErrorKind::Driver,
            CastError::Config(_) => ErrorKind::Config,
        }
    }
}

/// Result type alias for rowcast operations.
pub type CastResult<T> = Result<T, CastError>;

/// Timestamp text that does not match the expected grammar.
///
/// Never surfaced by materialization: the value falls back to its raw text
/// and this is logged instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unable to parse timestamp value '{text}'")]
pub struct TemporalParseWarning {
    pub text: String,
}

impl TemporalParseWarning {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}
