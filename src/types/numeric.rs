//! NUMERIC/DECIMAL decoding.
//!
//! Numeric text is parsed straight into a [`BigDecimal`]; it never passes
//! through a float and is never rounded. The special values PostgreSQL
//! allows for NUMERIC (`NaN`, `Infinity`, `-Infinity`) get their own
//! variants.

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;

/// A decoded NUMERIC value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Numeric {
    Finite(BigDecimal),
    NaN,
    Infinity,
    NegInfinity,
}

impl Numeric {
    /// The decimal, unless this is one of the special values.
    pub fn as_decimal(&self) -> Option<&BigDecimal> {
        match self {
            Numeric::Finite(d) => Some(d),
            _ => None,
        }
    }

    pub fn is_nan(&self) -> bool {
        matches!(self, Numeric::NaN)
    }
}

impl From<BigDecimal> for Numeric {
    fn from(d: BigDecimal) -> Self {
        Numeric::Finite(d)
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::Finite(d) => write!(f, "{}", d),
            Numeric::NaN => f.write_str("NaN"),
            Numeric::Infinity => f.write_str("Infinity"),
            Numeric::NegInfinity => f.write_str("-Infinity"),
        }
    }
}

/// Parse numeric text: plain (`-123.4500`), scientific (`1.5e-3`), or one
/// of `NaN`, `Infinity`, `-Infinity` (any case).
pub fn parse_numeric(text: &str) -> Result<Numeric, String> {
    let text = text.trim();

    if text.eq_ignore_ascii_case("nan") {
        return Ok(Numeric::NaN);
    }
    if text.eq_ignore_ascii_case("infinity") || text.eq_ignore_ascii_case("+infinity") {
        return Ok(Numeric::Infinity);
    }
    if text.eq_ignore_ascii_case("-infinity") {
        return Ok(Numeric::NegInfinity);
    }

    BigDecimal::from_str(text)
        .map(Numeric::Finite)
        .map_err(|e| format!("Invalid numeric '{}': {}", text, e))
}
