//! # rowcast
//!
//! Typed, timezone-correct result materialization and savepoint
//! sequencing for database drivers.
//!
//! The underlying driver is consumed through two traits: a
//! [`ResultCursor`](driver::ResultCursor) of untyped byte cells plus
//! per-column type tags, and a [`ConnectionHandle`](driver::ConnectionHandle)
//! with begin/commit/rollback and a live nesting counter. rowcast turns the
//! former into [`Record`](driver::Record)s of typed [`Value`](types::Value)s
//! and drives the latter through scoped savepoints.
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use rowcast::prelude::*;
//!
//! let decoder = TemporalDecoder::new(Zone::UTC, Some(Zone::parse_context("+02:00")));
//! for record in materialize(&mut cursor, &decoder)? {
//!     let record = record?;
//!     println!("{:?}", record.get_timestamp("created"));
//! }
//!
//! let id = transaction(&mut handle, None, |h| {
//!     h.execute("INSERT INTO orders (total) VALUES ($1)", &[Bind::Int(42)])?;
//!     Ok::<_, CastError>(h.results().and_then(|c| c.insert_id()))
//! })?;
//! ```
//!
//! ## Decoding
//!
//! | Tag         | Value                      |
//! |-------------|----------------------------|
//! | `boolean`   | `Bool`, first byte `t`/`1` |
//! | `integer`   | `Int(i64)`                 |
//! | `float`     | `Float(f64)`               |
//! | `numeric`   | `Numeric`, exact or `NaN`  |
//! | `blob`      | `Blob(Cursor<Bytes>)`      |
//! | `date`      | `Date(NaiveDate)`          |
//! | `timestamp` | `Timestamp(DateTime<Utc>)` |
//! | others      | `Text(String)`             |

pub mod config;
pub mod driver;
pub mod error;
pub mod types;

pub mod prelude {
    pub use crate::config::Settings;
    pub use crate::driver::memory::{MemoryCursor, MemoryHandle};
    pub use crate::driver::{
        Adapter, Bind, ConnectionHandle, FromRecord, Record, ResultCursor, ResultSet, Transaction,
        field_types, generate_savepoint_name, materialize, materialize_with, transaction,
    };
    pub use crate::error::*;
    pub use crate::types::{Numeric, TemporalDecoder, TypeTag, Value, Zone};
}

pub use config::Settings;
pub use driver::{Adapter, Record, materialize, transaction};
pub use error::{CastError, CastResult};
pub use types::{TemporalDecoder, TypeTag, Value, Zone};
