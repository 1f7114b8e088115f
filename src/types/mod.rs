//! Column type tags, decoded values, and the decode table between them.
//!
//! Every column carries a [`TypeTag`]. The tag selects one decode function
//! per column, which turns the column's raw bytes into a [`Value`].

pub mod numeric;
pub mod temporal;

pub use numeric::{Numeric, parse_numeric};
pub use temporal::{TemporalDecoder, Zone};

use std::fmt;
use std::io::Cursor;

use base64::Engine;
use bytes::Bytes;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

/// How a column's raw bytes are decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Boolean,
    Integer,
    Float,
    Numeric,
    Blob,
    Text,
    Date,
    Timestamp,
    Time,
}

impl TypeTag {
    /// Human-readable name, as reported by `field_types`.
    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Boolean => "boolean",
            TypeTag::Integer => "integer",
            TypeTag::Float => "float",
            TypeTag::Numeric => "numeric",
            TypeTag::Blob => "blob",
            TypeTag::Text => "text",
            TypeTag::Date => "date",
            TypeTag::Timestamp => "timestamp",
            TypeTag::Time => "time",
        }
    }

    /// Map a type name onto a tag. Accepts the names from [`TypeTag::name`]
    /// and the common PostgreSQL spellings; anything else is text.
    pub fn from_name(name: &str) -> TypeTag {
        match name.trim().to_ascii_lowercase().as_str() {
            "boolean" | "bool" => TypeTag::Boolean,
            "integer" | "int" | "int2" | "int4" | "int8" | "smallint" | "bigint" | "serial"
            | "bigserial" => TypeTag::Integer,
            "float" | "float4" | "float8" | "real" | "double" | "double precision" => {
                TypeTag::Float
            }
            "numeric" | "decimal" => TypeTag::Numeric,
            "blob" | "bytea" | "binary" | "varbinary" => TypeTag::Blob,
            "date" => TypeTag::Date,
            "timestamp"
            | "timestamptz"
            | "datetime"
            | "timestamp with time zone"
            | "timestamp without time zone" => TypeTag::Timestamp,
            "time" | "timetz" | "time with time zone" | "time without time zone" => TypeTag::Time,
            _ => TypeTag::Text,
        }
    }

    /// The decode function for this tag.
    pub(crate) fn decoder(self) -> DecodeFn {
        match self {
            TypeTag::Boolean => decode_bool,
            TypeTag::Integer => decode_int,
            TypeTag::Float => decode_float,
            TypeTag::Numeric => decode_numeric,
            TypeTag::Blob => decode_blob,
            TypeTag::Date => decode_date,
            TypeTag::Timestamp => decode_timestamp,
            TypeTag::Text | TypeTag::Time => decode_text,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for TypeTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for TypeTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(TypeTag::from_name(&name))
    }
}

/// Blob payloads are handed out as seekable readers.
pub type Blob = Cursor<Bytes>;

/// A decoded column value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Numeric(Numeric),
    Blob(Blob),
    Text(String),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_numeric(&self) -> Option<&Numeric> {
        match self {
            Value::Numeric(n) => Some(n),
            _ => None,
        }
    }

    /// The decimal, or `None` for non-numerics and `NaN`/`Infinity`.
    pub fn as_decimal(&self) -> Option<&BigDecimal> {
        self.as_numeric()?.as_decimal()
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Raw blob bytes, regardless of the reader position.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Blob(blob) => Some(blob.get_ref()),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Numeric(n) => write!(f, "{}", n),
            Value::Blob(blob) => write!(f, "<{} bytes>", blob.get_ref().len()),
            Value::Text(s) => write!(f, "{}", s),
            Value::Date(d) => write!(f, "{}", d),
            Value::Timestamp(t) => write!(f, "{}", t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(n) => serializer.serialize_f64(*n),
            Value::Numeric(n) => serializer.collect_str(n),
            Value::Blob(blob) => serializer.serialize_str(
                &base64::engine::general_purpose::STANDARD.encode(blob.get_ref()),
            ),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Date(d) => serializer.collect_str(d),
            Value::Timestamp(t) => {
                serializer.serialize_str(&t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Numeric> for Value {
    fn from(v: Numeric) -> Self {
        Value::Numeric(v)
    }
}

impl From<BigDecimal> for Value {
    fn from(v: BigDecimal) -> Self {
        Value::Numeric(Numeric::Finite(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

// ==================== Decode table ====================

/// Turns one non-NULL column payload into a [`Value`].
pub(crate) type DecodeFn = fn(&[u8], &TemporalDecoder) -> Result<Value, String>;

fn utf8(bytes: &[u8]) -> Result<&str, String> {
    std::str::from_utf8(bytes).map_err(|e| format!("Invalid UTF-8: {}", e))
}

fn decode_bool(bytes: &[u8], _: &TemporalDecoder) -> Result<Value, String> {
    Ok(Value::Bool(matches!(bytes.first(), Some(b't') | Some(b'1'))))
}

fn decode_int(bytes: &[u8], _: &TemporalDecoder) -> Result<Value, String> {
    let text = utf8(bytes)?;
    text.parse::<i64>()
        .map(Value::Int)
        .map_err(|e| format!("Invalid integer '{}': {}", text, e))
}

fn decode_float(bytes: &[u8], _: &TemporalDecoder) -> Result<Value, String> {
    let text = utf8(bytes)?;
    text.trim()
        .parse::<f64>()
        .map(Value::Float)
        .map_err(|e| format!("Invalid float '{}': {}", text, e))
}

fn decode_numeric(bytes: &[u8], _: &TemporalDecoder) -> Result<Value, String> {
    parse_numeric(utf8(bytes)?).map(Value::Numeric)
}

fn decode_blob(bytes: &[u8], _: &TemporalDecoder) -> Result<Value, String> {
    Ok(Value::Blob(Cursor::new(Bytes::copy_from_slice(bytes))))
}

fn decode_text(bytes: &[u8], _: &TemporalDecoder) -> Result<Value, String> {
    utf8(bytes).map(|s| Value::Text(s.to_string()))
}

fn decode_timestamp(bytes: &[u8], temporal: &TemporalDecoder) -> Result<Value, String> {
    let text = utf8(bytes)?;
    Ok(match temporal.decode_timestamp(text) {
        Ok(instant) => Value::Timestamp(instant),
        Err(warning) => {
            warn!("{}", warning);
            Value::Text(text.to_string())
        }
    })
}

fn decode_date(bytes: &[u8], temporal: &TemporalDecoder) -> Result<Value, String> {
    let text = utf8(bytes)?;
    Ok(match temporal.decode_date(text) {
        Ok(date) => Value::Date(date),
        Err(warning) => {
            warn!("{}", warning);
            Value::Text(text.to_string())
        }
    })
}
