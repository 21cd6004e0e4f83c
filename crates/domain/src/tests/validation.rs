// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    DomainError, format_instant, parse_date, parse_instant, parse_time_of_day, validate_role,
    validate_title,
};
use time::macros::{date, datetime, time};

#[test]
fn test_role_is_trimmed() {
    assert_eq!(validate_role("  Lead ").unwrap(), "Lead");
}

#[test]
fn test_blank_role_rejected() {
    assert!(matches!(validate_role("   "), Err(DomainError::InvalidRole(_))));
    assert!(matches!(validate_role(""), Err(DomainError::InvalidRole(_))));
}

#[test]
fn test_overlong_title_rejected() {
    let title: String = "x".repeat(201);
    assert!(matches!(
        validate_title(&title),
        Err(DomainError::InvalidTitle(_))
    ));
}

#[test]
fn test_parse_date() {
    assert_eq!(parse_date("2025-01-06").unwrap(), date!(2025 - 01 - 06));
    assert!(matches!(
        parse_date("2025-02-30"),
        Err(DomainError::DateParseError { .. })
    ));
    assert!(parse_date("06/01/2025").is_err());
}

#[test]
fn test_parse_time_of_day() {
    assert_eq!(parse_time_of_day("09:30").unwrap(), time!(09:30));
    assert!(matches!(
        parse_time_of_day("25:00"),
        Err(DomainError::TimeParseError { .. })
    ));
}

#[test]
fn test_parse_instant_accepts_offsets() {
    assert_eq!(
        parse_instant("2025-01-06T09:00:00+01:00").unwrap(),
        datetime!(2025-01-06 08:00 UTC)
    );
    assert!(matches!(
        parse_instant("tomorrow"),
        Err(DomainError::InstantParseError { .. })
    ));
}

#[test]
fn test_format_instant_is_utc_whole_seconds() {
    assert_eq!(
        format_instant(datetime!(2025-01-06 10:00:00.5 +01:00)),
        "2025-01-06T09:00:00Z"
    );
}

#[test]
fn test_formatted_instants_sort_chronologically() {
    let earlier: String = format_instant(datetime!(2025-01-06 23:00 -05:00));
    let later: String = format_instant(datetime!(2025-01-07 03:00 UTC));
    assert!(earlier < later);
}
