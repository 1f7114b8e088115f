//! Timestamp text grammar using nom.
//!
//! ```text
//! 2012-06-15 14:30:00.123456+02:00
//! ────┬───── ───┬──── ───┬─── ──┬──
//!     │         │        │      └── Offset suffix (only after a full clock)
//!     │         │        └── Fraction, up to 31 digits
//!     │         └── Clock, fields may be missing (missing = 0)
//!     └── Date, required
//! ```
//!
//! Fields are matched the way `sscanf("%04d-%02d-%02d %02d:%02d:%02d")`
//! matches them: each field takes at most its width in digits and matching
//! stops at the first field that does not fit.

use nom::{
    bytes::complete::{take_till, take_while_m_n},
    character::complete::{char, multispace0, one_of},
    combinator::{map_res, opt},
    sequence::{pair, preceded, tuple},
    IResult,
};

/// Digits of fractional seconds read after the `.`.
const MAX_FRACTION_DIGITS: usize = 31;

/// Calendar and clock fields exactly as they appear in the text.
///
/// Values are not range checked here; see [`TimestampParts::naive`] for
/// normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct TimestampParts {
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub hour: i32,
    pub minute: i32,
    pub second: i32,
    pub usec: u32,
    /// Explicit suffix offset, seconds east of UTC.
    pub offset: Option<i32>,
}

/// Parse timestamp text. `None` when the date part is incomplete.
pub(crate) fn parse_timestamp(input: &str) -> Option<TimestampParts> {
    let (rest, (year, month, day)) = parse_date(input).ok()?;
    let mut parts = TimestampParts {
        year,
        month,
        day,
        ..TimestampParts::default()
    };

    let (rest, complete) = parse_clock(rest, &mut parts);
    if !complete {
        return Some(parts);
    }

    let (rest, usec) = parse_fraction(rest);
    parts.usec = usec;
    parts.offset = parse_suffix(rest);
    Some(parts)
}

/// Parse a fixed `±HHMM`, `±HH:MM` or `±HH` zone string.
///
/// Only the leading offset is read; whatever follows it is ignored.
pub(crate) fn parse_fixed_offset(input: &str) -> Option<i32> {
    let mut compact = tuple((sign, number(2), number(2)));
    if let Ok((_, (sign, hours, minutes))) = compact(input) {
        return Some(sign * (hours * 3600 + minutes * 60));
    }

    let mut colon = tuple((sign, number(2), opt(preceded(char(':'), number(2)))));
    let (_, (sign, hours, minutes)) = colon(input).ok()?;
    Some(sign * (hours * 3600 + minutes.unwrap_or(0) * 60))
}

/// A decimal field of 1 to `width` digits.
fn number<'a>(width: usize) -> impl FnMut(&'a str) -> IResult<&'a str, i32> {
    map_res(
        take_while_m_n(1, width, |c: char| c.is_ascii_digit()),
        |digits: &str| digits.parse::<i32>(),
    )
}

fn sign(input: &str) -> IResult<&str, i32> {
    let (input, c) = one_of("+-")(input)?;
    Ok((input, if c == '-' { -1 } else { 1 }))
}

/// `YYYY-MM-DD`, leading whitespace allowed.
fn parse_date(input: &str) -> IResult<&str, (i32, i32, i32)> {
    let (input, year) = preceded(multispace0, number(4))(input)?;
    let (input, month) = preceded(char('-'), number(2))(input)?;
    let (input, day) = preceded(char('-'), number(2))(input)?;
    Ok((input, (year, month, day)))
}

/// Clock fields, stored one by one until the first mismatch.
///
/// Returns whether all three matched.
fn parse_clock<'a>(input: &'a str, parts: &mut TimestampParts) -> (&'a str, bool) {
    let Ok((rest, hour)) = preceded(pair(multispace0, opt(char('T'))), number(2))(input) else {
        return (input, false);
    };
    parts.hour = hour;

    let Ok((rest, minute)) = preceded(char(':'), number(2))(rest) else {
        return (rest, false);
    };
    parts.minute = minute;

    let Ok((rest, second)) = preceded(char(':'), number(2))(rest) else {
        return (rest, false);
    };
    parts.second = second;

    (rest, true)
}

/// `.digits` → microseconds. The first six digits count, padded on the right.
fn parse_fraction(input: &str) -> (&str, u32) {
    let fraction = preceded(
        char::<&str, nom::error::Error<&str>>('.'),
        take_while_m_n(0, MAX_FRACTION_DIGITS, |c: char| c.is_ascii_digit()),
    )(input);

    let Ok((rest, digits)) = fraction else {
        return (input, 0);
    };

    let usec = digits
        .bytes()
        .chain(std::iter::repeat(b'0'))
        .take(6)
        .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'));
    (rest, usec)
}

/// Offset suffix: anything up to a sign, then hours, any separator, minutes.
///
/// A bare sign with no digits is a zero offset.
fn parse_suffix(input: &str) -> Option<i32> {
    let (rest, _) = take_till::<_, _, nom::error::Error<&str>>(|c: char| c == '+' || c == '-')(input).ok()?;
    let (rest, sign) = sign(rest).ok()?;

    let Ok((rest, hours)) = number(2)(rest) else {
        return Some(0);
    };

    let (rest, _) =
        take_till::<_, _, nom::error::Error<&str>>(|c: char| c.is_ascii_digit())(rest).ok()?;
    let minutes = number(2)(rest).map(|(_, m)| m).unwrap_or(0);

    Some(sign * (hours * 3600 + minutes * 60))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_timestamp() {
        let parts = parse_timestamp("2012-06-15 14:30:45").unwrap();
        assert_eq!(
            parts,
            TimestampParts {
                year: 2012,
                month: 6,
                day: 15,
                hour: 14,
                minute: 30,
                second: 45,
                usec: 0,
                offset: None,
            }
        );
    }

    #[test]
    fn test_date_only() {
        let parts = parse_timestamp("2012-06-15").unwrap();
        assert_eq!((parts.year, parts.month, parts.day), (2012, 6, 15));
        assert_eq!((parts.hour, parts.minute, parts.second), (0, 0, 0));
    }

    #[test]
    fn test_partial_clock_ignores_suffix() {
        let parts = parse_timestamp("2012-06-15 14:30 +02:00").unwrap();
        assert_eq!((parts.hour, parts.minute, parts.second), (14, 30, 0));
        assert_eq!(parts.offset, None);
    }

    #[test]
    fn test_iso_separator() {
        let parts = parse_timestamp("2012-06-15T14:30:45Z").unwrap();
        assert_eq!(parts.hour, 14);
        assert_eq!(parts.offset, None);
    }

    #[test]
    fn test_incomplete_date() {
        assert!(parse_timestamp("2012-06").is_none());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn test_fraction_scaling() {
        assert_eq!(parse_timestamp("2012-06-15 14:30:45.5").unwrap().usec, 500_000);
        assert_eq!(parse_timestamp("2012-06-15 14:30:45.000123").unwrap().usec, 123);
        assert_eq!(parse_timestamp("2012-06-15 14:30:45.1234567").unwrap().usec, 123_456);
        assert_eq!(parse_timestamp("2012-06-15 14:30:45.").unwrap().usec, 0);
    }

    #[test]
    fn test_fraction_then_suffix() {
        let parts = parse_timestamp("2012-06-15 14:30:45.25-07").unwrap();
        assert_eq!(parts.usec, 250_000);
        assert_eq!(parts.offset, Some(-7 * 3600));
    }

    #[test]
    fn test_suffix_forms() {
        for text in [
            "2012-06-15 14:30:00+05:30",
            "2012-06-15 14:30:00+0530",
            "2012-06-15 14:30:00+05 30",
            "2012-06-15 14:30:00 +05:30",
        ] {
            assert_eq!(parse_timestamp(text).unwrap().offset, Some(19_800), "{}", text);
        }
        assert_eq!(
            parse_timestamp("2012-06-15 14:30:00-03:00").unwrap().offset,
            Some(-10_800)
        );
        assert_eq!(parse_timestamp("2012-06-15 14:30:00+").unwrap().offset, Some(0));
    }

    #[test]
    fn test_fixed_offset_strings() {
        assert_eq!(parse_fixed_offset("+0530"), Some(19_800));
        assert_eq!(parse_fixed_offset("-05:30"), Some(-19_800));
        assert_eq!(parse_fixed_offset("+09"), Some(32_400));
        assert_eq!(parse_fixed_offset("Europe/Berlin"), None);
        assert_eq!(parse_fixed_offset("+05:30 local"), Some(19_800));
        assert_eq!(parse_fixed_offset("-0800 (PST)"), Some(-28_800));
        assert_eq!(parse_fixed_offset("+5"), Some(18_000));
        assert_eq!(parse_fixed_offset("05:30"), None);
    }
}
