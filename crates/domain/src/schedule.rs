// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Recurring session expansion.
//!
//! A recurring schedule is a date range, a set of weekdays, one daily time
//! window and one or more target groups. Expansion produces one session
//! draft per matching date per group.
//!
//! ## Invariants
//!
//! - Dates before "today" (in the site timezone) are never generated
//! - `count_sessions` and `expand_sessions` share the date-matching logic, so a
//!   preview always equals the number of drafts a real expansion yields
//! - Times are wall-clock times in the site timezone, stored as UTC

use crate::error::DomainError;
use crate::site_time::SiteTimezone;
use crate::types::GroupId;
use crate::validation::validate_title;
use crate::weekdays::WeekdaySet;
use time::{Date, OffsetDateTime, Time};

/// Maximum number of sessions a single bulk request may generate.
pub const MAX_SESSIONS_PER_REQUEST: usize = 1000;

/// Title used when no prefix is supplied.
const DEFAULT_TITLE_PREFIX: &str = "Session";

/// A validated recurring schedule definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurringSchedule {
    group_ids: Vec<GroupId>,
    start_date: Date,
    end_date: Date,
    days_of_week: WeekdaySet,
    start_time: Time,
    end_time: Time,
    title_prefix: Option<String>,
}

impl RecurringSchedule {
    /// Creates a new recurring schedule.
    ///
    /// Duplicate group ids are collapsed, keeping first occurrence order. A
    /// blank title prefix is treated as absent.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `group_ids` is empty
    /// - `start_date` is after `end_date`
    /// - `days_of_week` is empty
    /// - `start_time` is not before `end_time`
    pub fn new(
        group_ids: &[GroupId],
        start_date: Date,
        end_date: Date,
        days_of_week: WeekdaySet,
        start_time: Time,
        end_time: Time,
        title_prefix: Option<&str>,
    ) -> Result<Self, DomainError> {
        let mut unique_groups: Vec<GroupId> = Vec::with_capacity(group_ids.len());
        for group_id in group_ids {
            if !unique_groups.contains(group_id) {
                unique_groups.push(*group_id);
            }
        }

        if unique_groups.is_empty() {
            return Err(DomainError::EmptyGroupSet);
        }
        if start_date > end_date {
            return Err(DomainError::InvalidDateRange {
                start: start_date,
                end: end_date,
            });
        }
        if days_of_week.is_empty() {
            return Err(DomainError::EmptyWeekdaySet);
        }
        if start_time >= end_time {
            return Err(DomainError::InvalidTimeWindow {
                start: start_time,
                end: end_time,
            });
        }

        let title_prefix: Option<String> = match title_prefix.map(str::trim) {
            Some(prefix) if !prefix.is_empty() => Some(validate_title(prefix)?),
            _ => None,
        };

        Ok(Self {
            group_ids: unique_groups,
            start_date,
            end_date,
            days_of_week,
            start_time,
            end_time,
            title_prefix,
        })
    }

    /// Returns the target groups.
    #[must_use]
    pub fn group_ids(&self) -> &[GroupId] {
        &self.group_ids
    }

    /// Returns the first date of the range.
    #[must_use]
    pub const fn start_date(&self) -> Date {
        self.start_date
    }

    /// Returns the last date of the range (inclusive).
    #[must_use]
    pub const fn end_date(&self) -> Date {
        self.end_date
    }

    /// Returns the selected weekdays.
    #[must_use]
    pub const fn days_of_week(&self) -> WeekdaySet {
        self.days_of_week
    }

    /// Returns the daily start time.
    #[must_use]
    pub const fn start_time(&self) -> Time {
        self.start_time
    }

    /// Returns the daily end time.
    #[must_use]
    pub const fn end_time(&self) -> Time {
        self.end_time
    }

    /// Returns the title prefix, if any.
    #[must_use]
    pub fn title_prefix(&self) -> Option<&str> {
        self.title_prefix.as_deref()
    }

    /// Builds the title of the session held on `date`.
    fn title_for(&self, date: Date) -> String {
        let prefix: &str = self.title_prefix().unwrap_or(DEFAULT_TITLE_PREFIX);
        format!("{prefix} {date}")
    }

    /// Returns every date in range, not before `today`, on a selected weekday.
    fn matching_dates(&self, today: Date) -> Vec<Date> {
        let mut dates: Vec<Date> = Vec::new();
        let mut current: Date = self.start_date.max(today);
        while current <= self.end_date {
            if self.days_of_week.contains(current.weekday()) {
                dates.push(current);
            }
            match current.next_day() {
                Some(next) => current = next,
                None => break,
            }
        }
        dates
    }
}

/// A session ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDraft {
    /// The local date the session is held on.
    pub date: Date,
    /// The generated title.
    pub title: String,
    /// Start instant (UTC).
    pub start: OffsetDateTime,
    /// End instant (UTC).
    pub end: OffsetDateTime,
    /// The single group this session targets.
    pub group_id: GroupId,
}

/// Counts the sessions `expand_sessions` would produce.
///
/// This is a pure preview: it performs no timezone conversion and cannot fail.
///
/// # Arguments
///
/// * `schedule` - The recurring schedule
/// * `today` - The current date in the site timezone
#[must_use]
pub fn count_sessions(schedule: &RecurringSchedule, today: Date) -> usize {
    schedule.matching_dates(today).len() * schedule.group_ids.len()
}

/// Expands a recurring schedule into concrete session drafts.
///
/// Drafts are ordered by date, then by the order of `group_ids`.
///
/// # Arguments
///
/// * `schedule` - The recurring schedule
/// * `timezone` - The site timezone the schedule's times are expressed in
/// * `today` - The current date in the site timezone
///
/// # Errors
///
/// Returns an error if:
/// - The schedule would produce more than `MAX_SESSIONS_PER_REQUEST` sessions
/// - A start or end time does not exist (or is ambiguous) on a matching date
///
/// # Example
///
/// ```text
/// start_date = 2025-01-06 (Monday)
/// end_date   = 2025-01-12 (Sunday)
/// days       = {Mon, Wed, Fri}
/// groups     = [7]
///
/// → 2025-01-06, 2025-01-08, 2025-01-10 for group 7
/// ```
pub fn expand_sessions(
    schedule: &RecurringSchedule,
    timezone: &SiteTimezone,
    today: Date,
) -> Result<Vec<SessionDraft>, DomainError> {
    let dates: Vec<Date> = schedule.matching_dates(today);
    let requested: usize = dates.len() * schedule.group_ids.len();
    if requested > MAX_SESSIONS_PER_REQUEST {
        return Err(DomainError::TooManySessions {
            requested,
            max: MAX_SESSIONS_PER_REQUEST,
        });
    }

    let mut drafts: Vec<SessionDraft> = Vec::with_capacity(requested);
    for date in dates {
        let start: OffsetDateTime = timezone.local_to_utc(date, schedule.start_time)?;
        let end: OffsetDateTime = timezone.local_to_utc(date, schedule.end_time)?;
        let title: String = schedule.title_for(date);
        for group_id in &schedule.group_ids {
            drafts.push(SessionDraft {
                date,
                title: title.clone(),
                start,
                end,
                group_id: *group_id,
            });
        }
    }

    Ok(drafts)
}
