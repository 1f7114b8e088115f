//! In-memory driver.
//!
//! [`MemoryCursor`] holds literal rows; [`MemoryHandle`] records every
//! control call and tracks the savepoint stack like a real connection.
//! Both are used by the test-suite and by the `rowcast` CLI to inspect
//! JSON result fixtures.

use std::collections::{HashSet, VecDeque};
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use super::{Bind, ConnectionHandle, ResultCursor};
use crate::error::{CastError, CastResult, DriverError};
use crate::types::TypeTag;

/// A result held entirely in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryCursor {
    fields: Vec<String>,
    types: Vec<TypeTag>,
    rows: Vec<Vec<Option<Vec<u8>>>>,
    position: usize,
    insert_id: Option<u64>,
}

/// JSON shape of a result fixture.
///
/// ```json
/// {
///   "fields": ["id", "created"],
///   "types": ["integer", "timestamp"],
///   "rows": [["1", "2012-06-15 14:30:00"], ["2", null]],
///   "insert_id": 2
/// }
/// ```
#[derive(Debug, Deserialize)]
struct Fixture {
    fields: Vec<String>,
    types: Vec<TypeTag>,
    #[serde(default)]
    rows: Vec<Vec<Option<String>>>,
    #[serde(default)]
    insert_id: Option<u64>,
}

impl MemoryCursor {
    pub fn new<N, T>(fields: N, types: T) -> Self
    where
        N: IntoIterator,
        N::Item: Into<String>,
        T: IntoIterator<Item = TypeTag>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            types: types.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Append a row of text cells; `None` is SQL NULL.
    pub fn row<R, V>(mut self, cells: R) -> Self
    where
        R: IntoIterator<Item = Option<V>>,
        V: AsRef<[u8]>,
    {
        self.push_row(cells);
        self
    }

    pub fn push_row<R, V>(&mut self, cells: R)
    where
        R: IntoIterator<Item = Option<V>>,
        V: AsRef<[u8]>,
    {
        self.rows.push(
            cells
                .into_iter()
                .map(|cell| cell.map(|v| v.as_ref().to_vec()))
                .collect(),
        );
    }

    pub fn with_insert_id(mut self, id: u64) -> Self {
        self.insert_id = Some(id);
        self
    }

    /// Current seek position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Parse a JSON fixture.
    pub fn from_json(json: &str) -> CastResult<Self> {
        let fixture: Fixture = serde_json::from_str(json)
            .map_err(|e| CastError::Config(format!("Invalid result fixture: {}", e)))?;

        let mut cursor = MemoryCursor::new(fixture.fields, fixture.types);
        cursor.insert_id = fixture.insert_id;
        for row in fixture.rows {
            cursor.push_row(row);
        }
        Ok(cursor)
    }

    pub fn from_file(path: impl AsRef<Path>) -> CastResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

impl ResultCursor for MemoryCursor {
    fn rows(&self) -> usize {
        self.rows.len()
    }

    fn columns(&self) -> usize {
        self.fields.len()
    }

    fn fields(&self) -> &[String] {
        &self.fields
    }

    fn types(&self) -> &[TypeTag] {
        &self.types
    }

    fn seek(&mut self, row: usize) {
        self.position = row;
    }

    fn read(&self, row: usize, column: usize) -> Option<&[u8]> {
        self.rows.get(row)?.get(column)?.as_deref()
    }

    fn insert_id(&self) -> Option<u64> {
        self.insert_id
    }
}

/// Operations a [`MemoryHandle`] can be told to reject or panic on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Execute,
    Begin,
    Commit,
    Rollback,
    Close,
}

/// A call received by a [`MemoryHandle`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Execute(String, Vec<Bind>),
    Begin(Option<String>),
    Commit(Option<String>),
    Rollback(Option<String>),
    Close,
}

/// A connection handle without a database behind it.
///
/// Each `execute` hands out the next queued result (or an empty one).
/// `begin` pushes onto the transaction stack; `commit`/`rollback` with a
/// name pop through that savepoint, without a name they clear the stack.
#[derive(Debug, Default)]
pub struct MemoryHandle {
    calls: Vec<Call>,
    transactions: Vec<Option<String>>,
    queued: VecDeque<MemoryCursor>,
    current: Option<MemoryCursor>,
    failing: HashSet<Op>,
    panicking: HashSet<Op>,
    delay: Option<Duration>,
    closed: bool,
}

impl MemoryHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a result for a future `execute`.
    pub fn with_result(mut self, cursor: MemoryCursor) -> Self {
        self.queued.push_back(cursor);
        self
    }

    pub fn push_result(&mut self, cursor: MemoryCursor) {
        self.queued.push_back(cursor);
    }

    /// Make every future `op` fail.
    pub fn fail_on(&mut self, op: Op) {
        self.failing.insert(op);
    }

    pub fn recover(&mut self, op: Op) {
        self.failing.remove(&op);
        self.panicking.remove(&op);
    }

    /// Make every future `op` panic, like a driver that crashes mid-call.
    pub fn panic_on(&mut self, op: Op) {
        self.panicking.insert(op);
    }

    /// Block each `execute` for `delay` before it answers.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    /// Open savepoint names, outermost first. Unnamed transactions are `None`.
    pub fn transactions(&self) -> &[Option<String>] {
        &self.transactions
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn check(&self, op: Op) -> Result<(), DriverError> {
        if self.closed {
            return Err(DriverError::new("connection is closed"));
        }
        if self.panicking.contains(&op) {
            panic!("{:?} crashed the driver", op);
        }
        if self.failing.contains(&op) {
            return Err(DriverError::new(format!("{:?} rejected", op)));
        }
        Ok(())
    }

    /// Drop the stack down to (and including) `savepoint`.
    fn unwind(&mut self, savepoint: Option<&str>) -> Result<(), DriverError> {
        let Some(name) = savepoint else {
            if self.transactions.is_empty() {
                return Err(DriverError::new("no transaction in progress"));
            }
            self.transactions.clear();
            return Ok(());
        };

        let idx = self
            .transactions
            .iter()
            .rposition(|sp| sp.as_deref() == Some(name))
            .ok_or_else(|| DriverError::new(format!("savepoint \"{}\" does not exist", name)))?;
        self.transactions.truncate(idx);
        Ok(())
    }
}

impl ConnectionHandle for MemoryHandle {
    type Cursor = MemoryCursor;

    fn execute(&mut self, sql: &str, binds: &[Bind]) -> Result<u64, DriverError> {
        self.calls.push(Call::Execute(sql.to_string(), binds.to_vec()));
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.check(Op::Execute)?;

        let cursor = self.queued.pop_front().unwrap_or_default();
        let affected = cursor.rows.len() as u64;
        self.current = Some(cursor);
        Ok(affected)
    }

    fn results(&mut self) -> Option<&mut MemoryCursor> {
        self.current.as_mut()
    }

    fn begin(&mut self, savepoint: Option<&str>) -> Result<(), DriverError> {
        self.calls.push(Call::Begin(savepoint.map(str::to_owned)));
        self.check(Op::Begin)?;
        self.transactions.push(savepoint.map(str::to_owned));
        Ok(())
    }

    fn commit(&mut self, savepoint: Option<&str>) -> Result<(), DriverError> {
        self.calls.push(Call::Commit(savepoint.map(str::to_owned)));
        self.check(Op::Commit)?;
        self.unwind(savepoint)
    }

    fn rollback(&mut self, savepoint: Option<&str>) -> Result<(), DriverError> {
        self.calls.push(Call::Rollback(savepoint.map(str::to_owned)));
        self.check(Op::Rollback)?;
        self.unwind(savepoint)
    }

    fn open_transactions(&self) -> usize {
        self.transactions.len()
    }

    fn close(&mut self) -> Result<(), DriverError> {
        self.calls.push(Call::Close);
        self.check(Op::Close)?;
        self.closed = true;
        self.transactions.clear();
        self.current = None;
        Ok(())
    }
}
