//! Driver-facing layer.
//!
//! The underlying database driver is consumed through two traits:
//! [`ResultCursor`] for fetched results and [`ConnectionHandle`] for the
//! connection itself. Everything in this module is built on top of them:
//!
//! - `record.rs` - `Record`, `Columns`, `FromRecord`
//! - `result.rs` - `materialize`, `Rows`, `ResultSet`, `field_types`
//! - `transaction.rs` - scoped transactions and savepoints
//! - `adapter.rs` - `Adapter`, the caller-facing connection wrapper
//! - `memory.rs` - in-memory cursor and handle

mod adapter;
pub mod memory;
mod record;
mod result;
mod transaction;

pub use adapter::Adapter;
pub use record::{Columns, FromRecord, Record};
pub use result::{ResultSet, Rows, field_types, materialize, materialize_with};
pub use transaction::{Transaction, generate_savepoint_name, transaction};

use crate::error::DriverError;
use crate::types::TypeTag;

/// A fetched result, readable by (row, column).
///
/// Implementations own the row storage; rowcast only reads from it.
pub trait ResultCursor {
    fn rows(&self) -> usize;

    fn columns(&self) -> usize;

    /// Column names, in column order.
    fn fields(&self) -> &[String];

    /// Column type tags, in column order.
    fn types(&self) -> &[TypeTag];

    /// Move the cursor's read position.
    fn seek(&mut self, row: usize);

    /// Raw bytes of one cell, `None` for SQL NULL.
    fn read(&self, row: usize, column: usize) -> Option<&[u8]>;

    /// Id generated by the last insert, if the driver reports one.
    fn insert_id(&self) -> Option<u64> {
        None
    }
}

/// One open database connection.
pub trait ConnectionHandle {
    type Cursor: ResultCursor;

    /// Run a statement and return the number of affected rows.
    fn execute(&mut self, sql: &str, binds: &[Bind]) -> Result<u64, DriverError>;

    /// Result of the last executed statement.
    fn results(&mut self) -> Option<&mut Self::Cursor>;

    /// Open a transaction, or a savepoint inside the open one.
    fn begin(&mut self, savepoint: Option<&str>) -> Result<(), DriverError>;

    /// Commit the outermost transaction (`None`) or release a savepoint.
    fn commit(&mut self, savepoint: Option<&str>) -> Result<(), DriverError>;

    /// Roll back the outermost transaction (`None`) or back to a savepoint.
    fn rollback(&mut self, savepoint: Option<&str>) -> Result<(), DriverError>;

    /// Live transaction nesting depth.
    fn open_transactions(&self) -> usize;

    fn close(&mut self) -> Result<(), DriverError>;
}

/// Parameter value bound to a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Bind {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl From<bool> for Bind {
    fn from(v: bool) -> Self {
        Bind::Bool(v)
    }
}

impl From<i32> for Bind {
    fn from(v: i32) -> Self {
        Bind::Int(v as i64)
    }
}

impl From<i64> for Bind {
    fn from(v: i64) -> Self {
        Bind::Int(v)
    }
}

impl From<f64> for Bind {
    fn from(v: f64) -> Self {
        Bind::Float(v)
    }
}

impl From<&str> for Bind {
    fn from(v: &str) -> Self {
        Bind::Text(v.to_string())
    }
}

impl From<String> for Bind {
    fn from(v: String) -> Self {
        Bind::Text(v)
    }
}

impl From<Vec<u8>> for Bind {
    fn from(v: Vec<u8>) -> Self {
        Bind::Bytes(v)
    }
}

impl<T: Into<Bind>> From<Option<T>> for Bind {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Bind::Null)
    }
}
