//! Scoped transactions and savepoints.
//!
//! [`transaction`] opens a savepoint, runs the caller's body, and then
//! commits or rolls back depending on the body's result. The handle's
//! nesting counter is consulted before either: if inner logic already
//! closed the transaction, nothing more is sent.

use tracing::{debug, warn};
use uuid::Uuid;

use super::ConnectionHandle;
use crate::error::{CastError, CastResult};

/// Fresh savepoint name, e.g. `SP3f2b8c1e9a7d4e0f8b6a5c4d3e2f1a0b`.
pub fn generate_savepoint_name() -> String {
    format!("SP{}", Uuid::new_v4().simple())
}

/// An open savepoint on a borrowed handle.
///
/// Dropping the guard without calling [`commit`](Self::commit) or
/// [`rollback`](Self::rollback) rolls the savepoint back, including when a
/// panic unwinds through the owner.
pub struct Transaction<'h, H: ConnectionHandle + ?Sized> {
    handle: &'h mut H,
    savepoint: String,
    finished: bool,
}

impl<'h, H: ConnectionHandle + ?Sized> Transaction<'h, H> {
    /// Open `savepoint`, or a generated one when `None`.
    pub fn begin(handle: &'h mut H, savepoint: Option<&str>) -> CastResult<Self> {
        let savepoint = savepoint.map_or_else(generate_savepoint_name, str::to_owned);

        debug!(savepoint = %savepoint, "BEGIN");
        handle
            .begin(Some(&savepoint))
            .map_err(|e| CastError::transaction("begin", Some(&savepoint), e))?;

        Ok(Self {
            handle,
            savepoint,
            finished: false,
        })
    }

    pub fn savepoint(&self) -> &str {
        &self.savepoint
    }

    pub fn handle(&mut self) -> &mut H {
        self.handle
    }

    /// Release the savepoint, unless the transaction was already closed.
    pub fn commit(mut self) -> CastResult<()> {
        self.finish("commit")
    }

    /// Roll back to the savepoint, unless the transaction was already closed.
    pub fn rollback(mut self) -> CastResult<()> {
        self.finish("rollback")
    }

    fn finish(&mut self, op: &'static str) -> CastResult<()> {
        self.finished = true;

        if self.handle.open_transactions() == 0 {
            debug!(savepoint = %self.savepoint, op, "Transaction already closed, skipping");
            return Ok(());
        }

        debug!(savepoint = %self.savepoint, op, "Ending savepoint");
        let name = Some(self.savepoint.as_str());
        let result = match op {
            "commit" => self.handle.commit(name),
            _ => self.handle.rollback(name),
        };
        result.map_err(|e| CastError::transaction(op, name, e))
    }
}

impl<H: ConnectionHandle + ?Sized> Drop for Transaction<'_, H> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(e) = self.finish("rollback") {
            warn!(savepoint = %self.savepoint, error = %e, "Rollback of abandoned savepoint failed");
        }
    }
}

/// Run `body` inside a savepoint.
///
/// `Ok` commits, `Err` rolls back and returns the body's own error. A
/// failing rollback is logged and never replaces that error.
///
/// ```ignore
/// let id = transaction(&mut handle, None, |h| {
///     h.execute("INSERT INTO users (name) VALUES ($1)", &["apple".into()])?;
///     Ok::<_, CastError>(h.results().and_then(|c| c.insert_id()))
/// })?;
/// ```
pub fn transaction<H, T, E, F>(handle: &mut H, savepoint: Option<&str>, body: F) -> Result<T, E>
where
    H: ConnectionHandle + ?Sized,
    E: From<CastError>,
    F: FnOnce(&mut H) -> Result<T, E>,
{
    let mut tx = Transaction::begin(handle, savepoint)?;

    match body(tx.handle()) {
        Ok(value) => {
            tx.commit()?;
            Ok(value)
        }
        Err(err) => {
            let savepoint = tx.savepoint().to_string();
            if let Err(e) = tx.rollback() {
                warn!(savepoint = %savepoint, error = %e, "Rollback failed after transaction body error");
            }
            Err(err)
        }
    }
}
