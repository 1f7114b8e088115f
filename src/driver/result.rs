//! Result materialization.
//!
//! [`materialize`] walks a cursor once, row by row, and decodes every cell
//! through its column's type tag. Rows are produced lazily; the cursor is
//! exclusively borrowed until the returned iterator is dropped.
//!
//! Every call reseeks the cursor to row 0, so a second pass over the same
//! cursor starts from the beginning again.

use std::sync::Arc;

use tracing::debug;

use super::record::{Columns, FromRecord, Record};
use super::ResultCursor;
use crate::error::{CastError, CastResult};
use crate::types::{DecodeFn, TemporalDecoder, TypeTag};

/// Lazy sequence of decoded rows.
///
/// A decode failure is yielded once and ends the pass.
pub struct Rows<'c, C: ResultCursor + ?Sized> {
    cursor: &'c mut C,
    columns: Arc<Columns>,
    decoders: Vec<(TypeTag, DecodeFn)>,
    temporal: TemporalDecoder,
    row: usize,
    rows: usize,
    failed: bool,
}

/// Start a materialization pass over `cursor`.
pub fn materialize<'c, C>(cursor: &'c mut C, temporal: &TemporalDecoder) -> CastResult<Rows<'c, C>>
where
    C: ResultCursor + ?Sized,
{
    let columns = cursor.columns();
    let fields = cursor.fields();
    let types = cursor.types();
    if fields.len() != columns || types.len() != columns {
        return Err(CastError::Shape {
            columns,
            fields: fields.len(),
            types: types.len(),
        });
    }

    let names = Arc::new(Columns::new(fields.to_vec()));
    let decoders = types.iter().map(|tag| (*tag, tag.decoder())).collect();
    let rows = cursor.rows();

    cursor.seek(0);
    debug!(rows, columns, "Materializing result");

    Ok(Rows {
        cursor,
        columns: names,
        decoders,
        temporal: *temporal,
        row: 0,
        rows,
        failed: false,
    })
}

/// Start a pass whose records go through `projection` before being yielded.
pub fn materialize_with<'c, C, T, F>(
    cursor: &'c mut C,
    temporal: &TemporalDecoder,
    projection: F,
) -> CastResult<impl Iterator<Item = CastResult<T>> + 'c>
where
    C: ResultCursor + ?Sized,
    T: 'c,
    F: FnMut(Record) -> CastResult<T> + 'c,
{
    Ok(materialize(cursor, temporal)?.project(projection))
}

/// Type names of every column, e.g. `["integer", "text", "timestamp"]`.
pub fn field_types<C: ResultCursor + ?Sized>(cursor: &C) -> Vec<&'static str> {
    cursor.types().iter().map(|tag| tag.name()).collect()
}

impl<'c, C: ResultCursor + ?Sized> Rows<'c, C> {
    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    /// Pass every record through `projection`.
    ///
    /// A projection error ends the pass like a decode error does.
    pub fn project<T, F>(self, mut projection: F) -> impl Iterator<Item = CastResult<T>> + 'c
    where
        T: 'c,
        F: FnMut(Record) -> CastResult<T> + 'c,
    {
        let mut failed = false;
        self.map_while(move |record| {
            if failed {
                return None;
            }
            let projected = record.and_then(&mut projection);
            failed = projected.is_err();
            Some(projected)
        })
    }

    fn decode_row(&self, row: usize) -> CastResult<Record> {
        let mut values = Vec::with_capacity(self.decoders.len());
        for (column, (tag, decode)) in self.decoders.iter().enumerate() {
            let value = match self.cursor.read(row, column) {
                None => crate::types::Value::Null,
                Some(bytes) => decode(bytes, &self.temporal).map_err(|message| CastError::Decode {
                    row,
                    column: self.columns.names()[column].clone(),
                    tag: *tag,
                    message,
                })?,
            };
            values.push(value);
        }
        Ok(Record::new(Arc::clone(&self.columns), values))
    }
}

impl<C: ResultCursor + ?Sized> Iterator for Rows<'_, C> {
    type Item = CastResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.row >= self.rows {
            return None;
        }
        let row = self.row;
        self.row += 1;

        self.cursor.seek(row);
        let record = self.decode_row(row);
        self.failed = record.is_err();
        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            (0, Some(0))
        } else {
            (0, Some(self.rows - self.row))
        }
    }
}

/// A fetched result paired with the decoder of the adapter that produced it.
pub struct ResultSet<'c, C: ResultCursor + ?Sized> {
    cursor: &'c mut C,
    temporal: TemporalDecoder,
}

impl<'c, C: ResultCursor + ?Sized> ResultSet<'c, C> {
    pub fn new(cursor: &'c mut C, temporal: TemporalDecoder) -> Self {
        Self { cursor, temporal }
    }

    pub fn rows(&self) -> usize {
        self.cursor.rows()
    }

    pub fn columns(&self) -> usize {
        self.cursor.columns()
    }

    pub fn fields(&self) -> &[String] {
        self.cursor.fields()
    }

    pub fn field_types(&self) -> Vec<&'static str> {
        field_types(&*self.cursor)
    }

    pub fn insert_id(&self) -> Option<u64> {
        self.cursor.insert_id()
    }

    pub fn temporal(&self) -> &TemporalDecoder {
        &self.temporal
    }

    /// Start a new pass from row 0.
    pub fn iter(&mut self) -> CastResult<Rows<'_, C>> {
        materialize(&mut *self.cursor, &self.temporal)
    }

    /// Start a new pass with a projection.
    pub fn project<T, F>(&mut self, projection: F) -> CastResult<impl Iterator<Item = CastResult<T>> + '_>
    where
        T: 'c,
        F: FnMut(Record) -> CastResult<T> + 'c,
    {
        Ok(self.iter()?.project(projection))
    }

    /// Collect one full pass into `T`s.
    pub fn load<T: FromRecord>(&mut self) -> CastResult<Vec<T>> {
        self.iter()?.map(|record| record.and_then(T::from_record)).collect()
    }
}
