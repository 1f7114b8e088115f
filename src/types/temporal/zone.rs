//! Timezones for temporal decoding.
//!
//! Offsets are looked up per call from the zone value itself, so decoding
//! never touches the process `TZ` environment.

use std::fmt;

use chrono::{DateTime, LocalResult, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::warn;

use super::grammar::parse_fixed_offset;

/// A timezone: the client's local zone, a fixed offset, or an IANA zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Zone {
    /// The running process's local zone.
    #[default]
    Local,
    /// Fixed offset, seconds east of UTC.
    Fixed(i32),
    /// IANA zone with DST rules.
    Named(Tz),
}

impl Zone {
    pub const UTC: Zone = Zone::Fixed(0);

    /// Interpret a session timezone string.
    ///
    /// `UTC*`/`GMT*` and `+00:00`/`+0000` are UTC, `±HHMM`, `±HH:MM` and
    /// `±HH` are fixed offsets (text after the offset is ignored), anything
    /// else is looked up as an IANA zone. Unknown names are treated as UTC.
    pub fn parse_context(zone: &str) -> Zone {
        let zone = zone.trim();

        let prefix = zone.get(..3).unwrap_or_default();
        if prefix.eq_ignore_ascii_case("UTC") || prefix.eq_ignore_ascii_case("GMT") {
            return Zone::UTC;
        }
        if zone == "+00:00" || zone == "+0000" {
            return Zone::UTC;
        }
        if let Some(offset) = parse_fixed_offset(zone) {
            return Zone::Fixed(offset);
        }

        match zone.parse::<Tz>() {
            Ok(tz) => Zone::Named(tz),
            Err(_) => {
                warn!(zone, "Unknown timezone, falling back to UTC");
                Zone::UTC
            }
        }
    }

    /// Like [`Zone::parse_context`], but `local` (any case) means [`Zone::Local`].
    pub fn parse_client(zone: &str) -> Zone {
        if zone.trim().eq_ignore_ascii_case("local") {
            Zone::Local
        } else {
            Zone::parse_context(zone)
        }
    }

    /// UTC offset in seconds of `local` wall time read in this zone.
    pub fn offset_at(&self, local: &NaiveDateTime) -> i32 {
        match self {
            Zone::Local => local_offset(&chrono::Local, local),
            Zone::Fixed(secs) => *secs,
            Zone::Named(tz) => local_offset(tz, local),
        }
    }

    /// Wall time of `instant` in this zone.
    pub fn wall_time(&self, instant: &DateTime<Utc>) -> NaiveDateTime {
        match self {
            Zone::Local => instant.with_timezone(&chrono::Local).naive_local(),
            Zone::Fixed(secs) => instant.naive_utc() + chrono::Duration::seconds(i64::from(*secs)),
            Zone::Named(tz) => instant.with_timezone(tz).naive_local(),
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::Local => write!(f, "local"),
            Zone::Fixed(secs) => {
                let sign = if *secs < 0 { '-' } else { '+' };
                let secs = secs.unsigned_abs();
                write!(f, "{}{:02}:{:02}", sign, secs / 3600, secs % 3600 / 60)
            }
            Zone::Named(tz) => write!(f, "{}", tz.name()),
        }
    }
}

/// Ambiguous wall times take the earlier offset; wall times inside a DST
/// gap take the offset in force at the same UTC reading.
fn local_offset<Z: TimeZone>(zone: &Z, local: &NaiveDateTime) -> i32 {
    match zone.from_local_datetime(local) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.offset().fix().local_minus_utc(),
        LocalResult::None => zone.offset_from_utc_datetime(local).fix().local_minus_utc(),
    }
}
