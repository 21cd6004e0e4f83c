// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Rota aggregation.
//!
//! Projects assignments over a date range into one bucket per local date.
//! The projection is derived and never persisted.

use crate::error::DomainError;
use crate::site_time::SiteTimezone;
use crate::types::Assignment;
use time::{Date, OffsetDateTime};

/// Longest date range, in days, a rota may span.
pub const MAX_ROTA_DAYS: i64 = 62;

/// An assignment joined with the session and staff details needed for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotaEntry {
    /// The assignment.
    pub assignment: Assignment,
    /// The session's title.
    pub session_title: String,
    /// The session's start (UTC).
    pub session_start: OffsetDateTime,
    /// The session's end (UTC).
    pub session_end: OffsetDateTime,
    /// The holder's display name.
    pub staff_display_name: String,
}

/// The assignments whose session starts on one local date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotaDay {
    /// The local date.
    pub date: Date,
    /// Entries ordered by session start, staff display name, then assignment id.
    pub entries: Vec<RotaEntry>,
}

/// Returns the number of days in `from..=to`.
///
/// # Errors
///
/// Returns an error if `from` is after `to` or the range exceeds `MAX_ROTA_DAYS`.
pub fn rota_day_count(from: Date, to: Date) -> Result<i64, DomainError> {
    if from > to {
        return Err(DomainError::InvalidDateRange {
            start: from,
            end: to,
        });
    }
    let days: i64 = (to - from).whole_days() + 1;
    if days > MAX_ROTA_DAYS {
        return Err(DomainError::RotaRangeTooLong {
            days,
            max: MAX_ROTA_DAYS,
        });
    }
    Ok(days)
}

/// Builds the rota for `from..=to`.
///
/// Every date in range gets a `RotaDay`, including days with no entries.
/// Entries whose session starts outside the range are ignored.
///
/// # Errors
///
/// Returns an error if the range is invalid or too long, or a session start
/// cannot be converted to site-local time.
pub fn build_rota(
    from: Date,
    to: Date,
    timezone: &SiteTimezone,
    entries: Vec<RotaEntry>,
) -> Result<Vec<RotaDay>, DomainError> {
    let days: i64 = rota_day_count(from, to)?;

    let mut rota: Vec<RotaDay> = Vec::with_capacity(usize::try_from(days).unwrap_or_default());
    let mut current: Date = from;
    loop {
        rota.push(RotaDay {
            date: current,
            entries: Vec::new(),
        });
        if current >= to {
            break;
        }
        current = current
            .next_day()
            .ok_or_else(|| DomainError::DateArithmeticOverflow {
                operation: format!("advancing past {current}"),
            })?;
    }

    for entry in entries {
        let date: Date = timezone.local_date(entry.session_start)?;
        if date < from || date > to {
            continue;
        }
        let index: usize = usize::try_from((date - from).whole_days()).map_err(|_| {
            DomainError::DateArithmeticOverflow {
                operation: format!("indexing rota day {date}"),
            }
        })?;
        if let Some(day) = rota.get_mut(index) {
            day.entries.push(entry);
        }
    }

    for day in &mut rota {
        day.entries.sort_by(|a, b| {
            a.session_start
                .cmp(&b.session_start)
                .then_with(|| a.staff_display_name.cmp(&b.staff_display_name))
                .then_with(|| a.assignment.assignment_id.cmp(&b.assignment.assignment_id))
        });
    }

    Ok(rota)
}
