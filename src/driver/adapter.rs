//! Caller-facing connection wrapper.
//!
//! The adapter owns one [`ConnectionHandle`] and the [`TemporalDecoder`]
//! that every result it hands out inherits. Statements run on a blocking
//! worker thread; the handle is moved there and back for each one.

use tracing::{debug, warn};

use super::result::ResultSet;
use super::transaction::transaction;
use super::{Bind, ConnectionHandle, Record};
use crate::config::Settings;
use crate::error::{CastError, CastResult, DriverError};
use crate::types::{TemporalDecoder, Zone};

/// One connection plus its session timezone.
///
/// # Example
/// ```ignore
/// let mut adapter = Adapter::new(handle).with_timezone("Europe/Berlin");
/// adapter.execute("SELECT id, created FROM orders", vec![]).await?;
/// for record in adapter.results()?.iter()? {
///     let record = record?;
///     println!("{:?}", record.get_timestamp("created"));
/// }
/// adapter.close()?;
/// ```
pub struct Adapter<H: ConnectionHandle> {
    handle: Option<H>,
    lost: bool,
    decoder: TemporalDecoder,
}

impl<H: ConnectionHandle> Adapter<H> {
    /// Wrap `handle` with client-local decoding and no session timezone.
    pub fn new(handle: H) -> Self {
        Self {
            handle: Some(handle),
            lost: false,
            decoder: TemporalDecoder::local(),
        }
    }

    pub fn from_settings(handle: H, settings: &Settings) -> Self {
        Self::new(handle).with_decoder(settings.decoder())
    }

    pub fn with_decoder(mut self, decoder: TemporalDecoder) -> Self {
        self.decoder = decoder;
        self
    }

    /// Set the session timezone context, e.g. `"UTC"`, `"+02:00"`, `"America/New_York"`.
    pub fn with_timezone(mut self, zone: &str) -> Self {
        self.set_timezone(Some(zone));
        self
    }

    /// Set or clear the session timezone context.
    pub fn set_timezone(&mut self, zone: Option<&str>) {
        self.decoder = self.decoder.with_server(zone.map(Zone::parse_context));
    }

    pub fn timezone(&self) -> Option<Zone> {
        self.decoder.server()
    }

    pub fn decoder(&self) -> &TemporalDecoder {
        &self.decoder
    }

    pub fn is_closed(&self) -> bool {
        self.handle.is_none()
    }

    fn handle_mut(&mut self) -> CastResult<&mut H> {
        let lost = self.lost;
        self.handle.as_mut().ok_or_else(|| invalid(lost))
    }

    /// The wrapped handle.
    pub fn handle(&mut self) -> CastResult<&mut H> {
        self.handle_mut()
    }

    // ==================== TRANSACTION CONTROL ====================

    /// Begin a transaction (`None`) or a savepoint.
    pub fn begin(&mut self, savepoint: Option<&str>) -> CastResult<()> {
        debug!(savepoint, "BEGIN");
        self.handle_mut()?
            .begin(savepoint)
            .map_err(|e| CastError::transaction("begin", savepoint, e))
    }

    /// Commit the outermost transaction (`None`) or release a savepoint.
    pub fn commit(&mut self, savepoint: Option<&str>) -> CastResult<()> {
        debug!(savepoint, "COMMIT");
        self.handle_mut()?
            .commit(savepoint)
            .map_err(|e| CastError::transaction("commit", savepoint, e))
    }

    /// Roll back the outermost transaction (`None`) or to a savepoint.
    pub fn rollback(&mut self, savepoint: Option<&str>) -> CastResult<()> {
        debug!(savepoint, "ROLLBACK");
        self.handle_mut()?
            .rollback(savepoint)
            .map_err(|e| CastError::transaction("rollback", savepoint, e))
    }

    pub fn open_transactions(&self) -> CastResult<usize> {
        self.handle
            .as_ref()
            .map(H::open_transactions)
            .ok_or_else(|| invalid(self.lost))
    }

    /// Run `body` inside a savepoint; see [`transaction`](super::transaction).
    pub fn transaction<T, E, F>(&mut self, savepoint: Option<&str>, body: F) -> Result<T, E>
    where
        E: From<CastError>,
        F: FnOnce(&mut H) -> Result<T, E>,
    {
        let handle = self.handle_mut()?;
        transaction(handle, savepoint, body)
    }

    // ==================== RESULTS ====================

    /// Result of the last statement, decoded with this adapter's timezone.
    pub fn results(&mut self) -> CastResult<ResultSet<'_, H::Cursor>> {
        let decoder = self.decoder;
        let cursor = self
            .handle_mut()?
            .results()
            .ok_or_else(|| DriverError::new("no result available"))?;
        Ok(ResultSet::new(cursor, decoder))
    }

    /// Close the connection. Every later call fails with `InvalidHandle`.
    pub fn close(&mut self) -> CastResult<()> {
        let mut handle = self.handle.take().ok_or_else(|| invalid(self.lost))?;
        debug!("Closing connection");
        handle.close()?;
        Ok(())
    }
}

fn invalid(lost: bool) -> CastError {
    if lost {
        CastError::InvalidHandle("connection was lost by a failed statement".to_string())
    } else {
        CastError::InvalidHandle("adapter is closed".to_string())
    }
}

impl<H> Adapter<H>
where
    H: ConnectionHandle + Send + 'static,
{
    /// Execute a statement on a blocking worker thread.
    ///
    /// Returns the number of affected rows.
    pub async fn execute(&mut self, sql: impl Into<String>, binds: Vec<Bind>) -> CastResult<u64> {
        let mut handle = self.handle.take().ok_or_else(|| invalid(self.lost))?;
        // Stays set if this future is dropped before the worker hands the handle back.
        self.lost = true;
        let sql = sql.into();
        debug!(sql = %sql, binds = binds.len(), "Executing statement");

        let joined = tokio::task::spawn_blocking(move || {
            let result = handle.execute(&sql, &binds);
            (handle, result)
        })
        .await;

        match joined {
            Ok((handle, result)) => {
                self.handle = Some(handle);
                self.lost = false;
                Ok(result?)
            }
            Err(e) => {
                warn!(error = %e, "Statement worker failed, connection lost");
                Err(CastError::InvalidHandle(format!("statement worker failed: {}", e)))
            }
        }
    }

    /// Execute a statement and materialize its whole result.
    pub async fn query(&mut self, sql: impl Into<String>, binds: Vec<Bind>) -> CastResult<Vec<Record>> {
        self.execute(sql, binds).await?;
        self.results()?.load()
    }
}
