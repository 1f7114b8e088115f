//! Timestamp and date decoding.
//!
//! Text timestamps are resolved to absolute instants in three steps:
//!
//! 1. the text is parsed into calendar fields (see [`grammar`]);
//! 2. an offset is chosen: an explicit suffix in the text wins, then the
//!    session timezone context, then the client zone;
//! 3. the fields are read as UTC and the offset is subtracted.
//!
//! Text that does not parse yields a [`TemporalParseWarning`]; the
//! materializer keeps the original text in that case.

mod grammar;
mod zone;

pub use zone::Zone;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

use crate::error::TemporalParseWarning;
use grammar::TimestampParts;

/// Decodes timestamp text for one client zone and optional session zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TemporalDecoder {
    client: Zone,
    server: Option<Zone>,
}

impl TemporalDecoder {
    pub fn new(client: Zone, server: Option<Zone>) -> Self {
        Self { client, server }
    }

    /// Client-local interpretation, no session timezone.
    pub fn local() -> Self {
        Self::default()
    }

    pub fn with_client(mut self, client: Zone) -> Self {
        self.client = client;
        self
    }

    pub fn with_server(mut self, server: Option<Zone>) -> Self {
        self.server = server;
        self
    }

    pub fn client(&self) -> Zone {
        self.client
    }

    pub fn server(&self) -> Option<Zone> {
        self.server
    }

    /// Decode `YYYY-MM-DD HH:MM:SS[.fraction][suffix]` into an instant.
    pub fn decode_timestamp(&self, text: &str) -> Result<DateTime<Utc>, TemporalParseWarning> {
        let parts = grammar::parse_timestamp(text)
            .filter(|parts| parts.day > 0)
            .ok_or_else(|| TemporalParseWarning::new(text))?;
        let local = parts.naive().ok_or_else(|| TemporalParseWarning::new(text))?;

        let offset = match (parts.offset, self.server) {
            (Some(explicit), _) => explicit,
            (None, Some(server)) => server.offset_at(&local),
            (None, None) => self.client.offset_at(&local),
        };

        Ok(local.and_utc() - Duration::seconds(i64::from(offset)))
    }

    /// Decode the instant, then take its calendar date in the client zone.
    pub fn decode_date(&self, text: &str) -> Result<NaiveDate, TemporalParseWarning> {
        let instant = self.decode_timestamp(text)?;
        Ok(self.client.wall_time(&instant).date())
    }
}

impl TimestampParts {
    /// Calendar fields as a wall time, normalized like `mktime`.
    ///
    /// Out-of-range months carry into years, days into months and clock
    /// fields into days.
    pub(crate) fn naive(&self) -> Option<NaiveDateTime> {
        let months = i64::from(self.year) * 12 + i64::from(self.month) - 1;
        let year = i32::try_from(months.div_euclid(12)).ok()?;
        let month = u32::try_from(months.rem_euclid(12) + 1).ok()?;

        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let midnight = first.and_hms_opt(0, 0, 0)?;

        let elapsed = Duration::days(i64::from(self.day) - 1)
            + Duration::hours(i64::from(self.hour))
            + Duration::minutes(i64::from(self.minute))
            + Duration::seconds(i64::from(self.second))
            + Duration::microseconds(i64::from(self.usec));
        midnight.checked_add_signed(elapsed)
    }
}
