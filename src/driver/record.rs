//! Materialized rows.

use std::collections::HashMap;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::CastResult;
use crate::types::{Numeric, Value};

/// Column names of one result, shared by every record of a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Columns {
    names: Vec<String>,
    name_to_index: HashMap<String, usize>,
}

impl Columns {
    /// A repeated name resolves to its last column.
    pub fn new(names: Vec<String>) -> Self {
        let name_to_index = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self {
            names,
            name_to_index,
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn index(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// One row: column name → decoded value, in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    columns: Arc<Columns>,
    values: Vec<Value>,
}

impl Record {
    pub(crate) fn new(columns: Arc<Columns>, values: Vec<Value>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    /// Build a record from `(name, value)` pairs.
    pub fn from_pairs<N, V>(pairs: impl IntoIterator<Item = (N, V)>) -> Self
    where
        N: Into<String>,
        V: Into<Value>,
    {
        let (names, values): (Vec<String>, Vec<Value>) = pairs
            .into_iter()
            .map(|(n, v)| (n.into(), v.into()))
            .unzip();
        Self::new(Arc::new(Columns::new(names)), values)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(self.columns.index(name)?)
    }

    pub fn get_index(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    /// Move a value out, leaving `Value::Null` behind.
    pub fn take(&mut self, name: &str) -> Option<Value> {
        let idx = self.columns.index(name)?;
        self.values.get_mut(idx).map(std::mem::take)
    }

    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Check if a column is NULL. Missing columns count as NULL.
    pub fn is_null(&self, name: &str) -> bool {
        self.get(name).map(Value::is_null).unwrap_or(true)
    }

    // ==================== TYPED GETTERS ====================

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name)?.as_bool()
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name)?.as_i64()
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name)?.as_f64()
    }

    pub fn get_decimal(&self, name: &str) -> Option<&BigDecimal> {
        self.get(name)?.as_decimal()
    }

    pub fn get_numeric(&self, name: &str) -> Option<&Numeric> {
        self.get(name)?.as_numeric()
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name)?.as_str()
    }

    pub fn get_bytes(&self, name: &str) -> Option<&[u8]> {
        self.get(name)?.as_bytes()
    }

    pub fn get_date(&self, name: &str) -> Option<NaiveDate> {
        self.get(name)?.as_date()
    }

    pub fn get_timestamp(&self, name: &str) -> Option<DateTime<Utc>> {
        self.get(name)?.as_timestamp()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Types that can be built from a materialized row.
///
/// ```ignore
/// struct User {
///     id: i64,
///     name: String,
/// }
///
/// impl FromRecord for User {
///     fn from_record(mut record: Record) -> CastResult<Self> {
///         Ok(User {
///             id: record.get_i64("id").unwrap_or_default(),
///             name: record.take("name").and_then(|v| v.as_str().map(str::to_owned)).unwrap_or_default(),
///         })
///     }
/// }
///
/// let users: Vec<User> = adapter.results()?.load()?;
/// ```
pub trait FromRecord: Sized {
    fn from_record(record: Record) -> CastResult<Self>;
}

impl FromRecord for Record {
    fn from_record(record: Record) -> CastResult<Self> {
        Ok(record)
    }
}
