use std::fmt::{Display, Formatter};

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use time::macros::{date, format_description};
use time::{Date, OffsetDateTime};

use crate::ValidationError;

/// First date requested when no start is configured.
pub const DEFAULT_START: Date = date!(2020 - 01 - 01);

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(input: &str) -> Result<Date, ValidationError> {
    Date::parse(input.trim(), format_description!("[year]-[month]-[day]")).map_err(|_| {
        ValidationError::InvalidDate {
            value: input.to_owned(),
        }
    })
}

/// Format a date as `YYYY-MM-DD`.
pub fn format_date(value: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        value.year(),
        u8::from(value.month()),
        value.day()
    )
}

/// Inclusive date range for one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateWindow {
    start: Date,
    end: Date,
}

impl DateWindow {
    pub fn new(start: Date, end: Date) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvertedWindow {
                start: format_date(start),
                end: format_date(end),
            });
        }
        Ok(Self { start, end })
    }

    /// Window from `start` up to today's UTC date.
    pub fn until_today(start: Date) -> Result<Self, ValidationError> {
        Self::new(start, OffsetDateTime::now_utc().date())
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, ValidationError> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    pub const fn start(self) -> Date {
        self.start
    }

    pub const fn end(self) -> Date {
        self.end
    }

    /// Unix seconds at 00:00 UTC on the start date.
    pub fn start_unix(self) -> i64 {
        self.start.midnight().assume_utc().unix_timestamp()
    }

    /// Unix seconds at 00:00 UTC on the day after the end date, so the end
    /// date itself is included by exclusive upstream bounds.
    pub fn end_unix_exclusive(self) -> i64 {
        let next = self.end.next_day().unwrap_or(self.end);
        next.midnight().assume_utc().unix_timestamp()
    }

    pub fn contains(self, value: Date) -> bool {
        self.start <= value && value <= self.end
    }
}

impl Display for DateWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", format_date(self.start), format_date(self.end))
    }
}

impl Serialize for DateWindow {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("DateWindow", 2)?;
        state.serialize_field("start", &format_date(self.start))?;
        state.serialize_field("end", &format_date(self.end))?;
        state.end()
    }
}
