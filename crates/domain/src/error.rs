// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::{AssignmentId, AssignmentStatus, StaffId, SwapStatus};

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The start date of a range is after its end date.
    InvalidDateRange {
        /// The first date of the range.
        start: time::Date,
        /// The last date of the range.
        end: time::Date,
    },
    /// A recurring schedule selected no weekdays.
    EmptyWeekdaySet,
    /// A recurring schedule selected no groups.
    EmptyGroupSet,
    /// A daily time window does not start before it ends.
    InvalidTimeWindow {
        /// The window start time.
        start: time::Time,
        /// The window end time.
        end: time::Time,
    },
    /// A session or query window does not start before it ends.
    InvalidSessionWindow {
        /// The window start instant.
        start: time::OffsetDateTime,
        /// The window end instant.
        end: time::OffsetDateTime,
    },
    /// The timezone name is not a known IANA zone.
    InvalidTimezone(String),
    /// A wall-clock time does not map to exactly one instant.
    UnresolvableLocalTime {
        /// The local date.
        date: time::Date,
        /// The local time of day.
        time: time::Time,
    },
    /// A weekday symbol could not be parsed.
    InvalidWeekday(String),
    /// An assignment status string could not be parsed.
    InvalidAssignmentStatus(String),
    /// A swap status string could not be parsed.
    InvalidSwapStatus(String),
    /// The requested assignment status change is not permitted.
    InvalidAssignmentTransition {
        /// The current status.
        from: AssignmentStatus,
        /// The requested status.
        to: AssignmentStatus,
    },
    /// The requested swap status change is not permitted.
    InvalidSwapTransition {
        /// The current status.
        from: SwapStatus,
        /// The requested status.
        to: SwapStatus,
    },
    /// Assignments may only be created as pending or confirmed.
    InvalidInitialStatus(AssignmentStatus),
    /// A declined assignment is terminal and cannot be handed to anyone.
    SwapOfDeclinedAssignment {
        /// The declined assignment.
        assignment_id: AssignmentId,
    },
    /// A swap request names the same staff member on both sides.
    SwapWithSelf {
        /// The staff member on both sides of the swap.
        staff_id: StaffId,
    },
    /// The assignment role label is empty or invalid.
    InvalidRole(String),
    /// The session title is empty or invalid.
    InvalidTitle(String),
    /// A bulk schedule would generate more sessions than permitted.
    TooManySessions {
        /// The number of sessions the request would generate.
        requested: usize,
        /// The maximum permitted per request.
        max: usize,
    },
    /// A rota range covers more days than permitted.
    RotaRangeTooLong {
        /// The number of days requested.
        days: i64,
        /// The maximum permitted.
        max: i64,
    },
    /// Failed to parse a date string.
    DateParseError {
        /// The invalid date string.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
    /// Failed to parse a time-of-day string.
    TimeParseError {
        /// The invalid time string.
        time_string: String,
        /// The parsing error message.
        error: String,
    },
    /// Failed to parse an instant.
    InstantParseError {
        /// The invalid instant string.
        instant_string: String,
        /// The parsing error message.
        error: String,
    },
    /// Date arithmetic overflow.
    DateArithmeticOverflow {
        /// Description of the operation that failed.
        operation: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDateRange { start, end } => {
                write!(f, "Start date {start} is after end date {end}")
            }
            Self::EmptyWeekdaySet => write!(f, "At least one weekday must be selected"),
            Self::EmptyGroupSet => write!(f, "At least one group must be selected"),
            Self::InvalidTimeWindow { start, end } => {
                write!(f, "Start time {start} must be before end time {end}")
            }
            Self::InvalidSessionWindow { start, end } => {
                write!(f, "Start {start} must be before end {end}")
            }
            Self::InvalidTimezone(tz) => write!(f, "Invalid timezone: {tz}"),
            Self::UnresolvableLocalTime { date, time } => {
                write!(
                    f,
                    "Local time {time} on {date} is ambiguous or does not exist in the site timezone"
                )
            }
            Self::InvalidWeekday(symbol) => {
                write!(f, "Invalid weekday '{symbol}': expected one of Mon..Sun")
            }
            Self::InvalidAssignmentStatus(status) => {
                write!(f, "Invalid assignment status: {status}")
            }
            Self::InvalidSwapStatus(status) => write!(f, "Invalid swap status: {status}"),
            Self::InvalidAssignmentTransition { from, to } => {
                write!(f, "Assignment cannot move from '{from}' to '{to}'")
            }
            Self::InvalidSwapTransition { from, to } => {
                write!(f, "Swap request cannot move from '{from}' to '{to}'")
            }
            Self::InvalidInitialStatus(status) => {
                write!(
                    f,
                    "Assignments cannot be created as '{status}': use pending or confirmed"
                )
            }
            Self::SwapOfDeclinedAssignment { assignment_id } => {
                write!(f, "Assignment {assignment_id} was declined and cannot be swapped")
            }
            Self::SwapWithSelf { staff_id } => {
                write!(f, "Staff member {staff_id} cannot swap with themselves")
            }
            Self::InvalidRole(msg) => write!(f, "Invalid role: {msg}"),
            Self::InvalidTitle(msg) => write!(f, "Invalid title: {msg}"),
            Self::TooManySessions { requested, max } => {
                write!(
                    f,
                    "Schedule would create {requested} sessions; at most {max} are allowed per request"
                )
            }
            Self::RotaRangeTooLong { days, max } => {
                write!(f, "Rota range of {days} days exceeds the maximum of {max}")
            }
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse date '{date_string}': {error}")
            }
            Self::TimeParseError { time_string, error } => {
                write!(f, "Failed to parse time '{time_string}': {error}")
            }
            Self::InstantParseError {
                instant_string,
                error,
            } => {
                write!(f, "Failed to parse instant '{instant_string}': {error}")
            }
            Self::DateArithmeticOverflow { operation } => {
                write!(f, "Date arithmetic overflow while {operation}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
