// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, Time};

/// Longest accepted role label, in characters.
const MAX_ROLE_LENGTH: usize = 64;

/// Longest accepted session title, in characters.
const MAX_TITLE_LENGTH: usize = 200;

/// Validates and normalizes an assignment role label.
///
/// Roles are free-form ("Lead", "Support", ...) but must not be blank.
///
/// # Errors
///
/// Returns `DomainError::InvalidRole` if the label is blank or too long.
pub fn validate_role(role: &str) -> Result<String, DomainError> {
    let trimmed: &str = role.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidRole(String::from(
            "Role cannot be empty",
        )));
    }
    if trimmed.chars().count() > MAX_ROLE_LENGTH {
        return Err(DomainError::InvalidRole(format!(
            "Role cannot exceed {MAX_ROLE_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Validates and normalizes a session title.
///
/// # Errors
///
/// Returns `DomainError::InvalidTitle` if the title is blank or too long.
pub fn validate_title(title: &str) -> Result<String, DomainError> {
    let trimmed: &str = title.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidTitle(String::from(
            "Title cannot be empty",
        )));
    }
    if trimmed.chars().count() > MAX_TITLE_LENGTH {
        return Err(DomainError::InvalidTitle(format!(
            "Title cannot exceed {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Parses a `YYYY-MM-DD` calendar date.
///
/// # Errors
///
/// Returns `DomainError::DateParseError` if the string is not a valid date.
pub fn parse_date(value: &str) -> Result<Date, DomainError> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]")).map_err(|e| {
        DomainError::DateParseError {
            date_string: value.to_string(),
            error: e.to_string(),
        }
    })
}

/// Parses an `HH:MM` local time of day.
///
/// # Errors
///
/// Returns `DomainError::TimeParseError` if the string is not a valid time.
pub fn parse_time_of_day(value: &str) -> Result<Time, DomainError> {
    Time::parse(value.trim(), format_description!("[hour]:[minute]")).map_err(|e| {
        DomainError::TimeParseError {
            time_string: value.to_string(),
            error: e.to_string(),
        }
    })
}

/// Parses an RFC 3339 / ISO 8601 instant.
///
/// # Errors
///
/// Returns `DomainError::InstantParseError` if the string is not a valid instant.
pub fn parse_instant(value: &str) -> Result<OffsetDateTime, DomainError> {
    OffsetDateTime::parse(value.trim(), &Rfc3339).map_err(|e| DomainError::InstantParseError {
        instant_string: value.to_string(),
        error: e.to_string(),
    })
}

/// Formats an instant as RFC 3339 in UTC with whole-second precision.
///
/// This is also the stored representation, so formatted values sort in
/// chronological order.
#[must_use]
pub fn format_instant(instant: OffsetDateTime) -> String {
    let normalized: OffsetDateTime = crate::types::normalize_instant(instant);
    normalized
        .format(&Rfc3339)
        .unwrap_or_else(|_| normalized.to_string())
}
