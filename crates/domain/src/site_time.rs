// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Wall-clock handling for an organization's site timezone.
//!
//! Sessions are stored as UTC instants, but schedules, availability windows,
//! date blocks and rota days are all expressed in the site's local time.
//! This module is the single place where the two meet.
//!
//! ## Invariants
//!
//! - Local times that are skipped or repeated by a DST transition are
//!   rejected rather than silently shifted
//! - Conversions work at whole-second precision

use crate::error::DomainError;
use chrono::{Datelike, NaiveDate, NaiveTime, TimeZone, Timelike};
use chrono_tz::Tz;
use time::{Date, Month, OffsetDateTime, Time};

/// An IANA timezone in which a site's wall-clock times are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteTimezone {
    tz: Tz,
}

impl SiteTimezone {
    /// The UTC zone, used where no site zone is configured.
    pub const UTC: Self = Self { tz: Tz::UTC };

    /// Parses an IANA timezone name such as `Europe/London`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTimezone` if the name is not recognized.
    pub fn parse(name: &str) -> Result<Self, DomainError> {
        let tz: Tz = name
            .parse()
            .map_err(|_| DomainError::InvalidTimezone(name.to_string()))?;
        Ok(Self { tz })
    }

    /// Returns the IANA name of this zone.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.tz.name()
    }

    /// Converts a local date and time of day to a UTC instant.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::UnresolvableLocalTime` if the local time falls in a
    /// DST gap or overlap.
    pub fn local_to_utc(&self, date: Date, time: Time) -> Result<OffsetDateTime, DomainError> {
        let naive = to_naive_date(date)?.and_time(to_naive_time(time)?);
        let local = self
            .tz
            .from_local_datetime(&naive)
            .single()
            .ok_or(DomainError::UnresolvableLocalTime { date, time })?;
        from_unix_seconds(local.timestamp())
    }

    /// Returns the UTC instant at which the given local date begins.
    ///
    /// # Errors
    ///
    /// Returns an error if midnight does not exist on that date in this zone.
    pub fn start_of_day(&self, date: Date) -> Result<OffsetDateTime, DomainError> {
        let naive = to_naive_date(date)?.and_time(to_naive_time(Time::MIDNIGHT)?);
        let local = self
            .tz
            .from_local_datetime(&naive)
            .earliest()
            .ok_or(DomainError::UnresolvableLocalTime {
                date,
                time: Time::MIDNIGHT,
            })?;
        from_unix_seconds(local.timestamp())
    }

    /// Returns the half-open UTC interval covering the local dates
    /// `from..=to`.
    ///
    /// # Errors
    ///
    /// Returns an error if `from` is after `to` or the interval is not representable.
    pub fn date_range_bounds(
        &self,
        from: Date,
        to: Date,
    ) -> Result<(OffsetDateTime, OffsetDateTime), DomainError> {
        if from > to {
            return Err(DomainError::InvalidDateRange {
                start: from,
                end: to,
            });
        }
        let after: Date = to
            .next_day()
            .ok_or_else(|| DomainError::DateArithmeticOverflow {
                operation: format!("advancing past {to}"),
            })?;
        Ok((self.start_of_day(from)?, self.start_of_day(after)?))
    }

    /// Returns the local date and time of day of an instant.
    ///
    /// # Errors
    ///
    /// Returns an error if the instant is outside the representable range.
    pub fn local_date_time(&self, instant: OffsetDateTime) -> Result<(Date, Time), DomainError> {
        let utc = chrono::DateTime::from_timestamp(instant.unix_timestamp(), 0).ok_or_else(|| {
            DomainError::DateArithmeticOverflow {
                operation: format!("converting {instant} to the site timezone"),
            }
        })?;
        let local = utc.with_timezone(&self.tz);
        Ok((
            from_naive_date(local.date_naive())?,
            from_naive_time(local.time())?,
        ))
    }

    /// Returns the local date of an instant.
    ///
    /// # Errors
    ///
    /// Returns an error if the instant is outside the representable range.
    pub fn local_date(&self, instant: OffsetDateTime) -> Result<Date, DomainError> {
        Ok(self.local_date_time(instant)?.0)
    }
}

impl Default for SiteTimezone {
    fn default() -> Self {
        Self::UTC
    }
}

fn to_naive_date(date: Date) -> Result<NaiveDate, DomainError> {
    NaiveDate::from_ymd_opt(
        date.year(),
        u32::from(u8::from(date.month())),
        u32::from(date.day()),
    )
    .ok_or_else(|| DomainError::DateArithmeticOverflow {
        operation: format!("converting date {date}"),
    })
}

fn to_naive_time(time: Time) -> Result<NaiveTime, DomainError> {
    NaiveTime::from_hms_opt(
        u32::from(time.hour()),
        u32::from(time.minute()),
        u32::from(time.second()),
    )
    .ok_or_else(|| DomainError::DateArithmeticOverflow {
        operation: format!("converting time {time}"),
    })
}

fn from_naive_date(date: NaiveDate) -> Result<Date, DomainError> {
    let overflow = || DomainError::DateArithmeticOverflow {
        operation: format!("converting date {date}"),
    };
    let month: Month = u8::try_from(date.month())
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .ok_or_else(overflow)?;
    let day: u8 = u8::try_from(date.day()).map_err(|_| overflow())?;
    Date::from_calendar_date(date.year(), month, day).map_err(|_| overflow())
}

fn from_naive_time(time: NaiveTime) -> Result<Time, DomainError> {
    let overflow = || DomainError::DateArithmeticOverflow {
        operation: format!("converting time {time}"),
    };
    let hour: u8 = u8::try_from(time.hour()).map_err(|_| overflow())?;
    let minute: u8 = u8::try_from(time.minute()).map_err(|_| overflow())?;
    let second: u8 = u8::try_from(time.second()).map_err(|_| overflow())?;
    Time::from_hms(hour, minute, second).map_err(|_| overflow())
}

fn from_unix_seconds(seconds: i64) -> Result<OffsetDateTime, DomainError> {
    OffsetDateTime::from_unix_timestamp(seconds).map_err(|e| DomainError::DateArithmeticOverflow {
        operation: format!("building instant from {seconds}: {e}"),
    })
}
