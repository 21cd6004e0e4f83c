// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    Assignment, AssignmentId, AssignmentStatus, DomainError, MAX_ROTA_DAYS, RotaDay, RotaEntry,
    SessionId, SiteTimezone, StaffId, build_rota, rota_day_count,
};
use time::macros::{date, datetime};
use time::{Date, OffsetDateTime};

fn create_entry(id: i64, name: &str, start: OffsetDateTime) -> RotaEntry {
    RotaEntry {
        assignment: Assignment {
            assignment_id: AssignmentId::new(id),
            session_id: SessionId::new(1),
            staff_id: StaffId::new(id),
            role: String::from("Lead"),
            status: AssignmentStatus::Pending,
        },
        session_title: String::from("Morning"),
        session_start: start,
        session_end: start + time::Duration::HOUR,
        staff_display_name: name.to_string(),
    }
}

#[test]
fn test_week_has_seven_days_including_empty_ones() {
    let rota: Vec<RotaDay> = build_rota(
        date!(2025 - 01 - 06),
        date!(2025 - 01 - 12),
        &SiteTimezone::UTC,
        vec![create_entry(1, "Ann", datetime!(2025-01-08 09:00 UTC))],
    )
    .unwrap();

    assert_eq!(rota.len(), 7);
    let dates: Vec<Date> = rota.iter().map(|d| d.date).collect();
    assert_eq!(dates.first(), Some(&date!(2025 - 01 - 06)));
    assert_eq!(dates.last(), Some(&date!(2025 - 01 - 12)));
    assert!(dates.windows(2).all(|w| w[0] < w[1]));
    assert!(rota[0].entries.is_empty());
    assert_eq!(rota[2].entries.len(), 1);
}

#[test]
fn test_day_count_is_inclusive() {
    assert_eq!(
        rota_day_count(date!(2025 - 01 - 06), date!(2025 - 01 - 06)).unwrap(),
        1
    );
    assert_eq!(
        rota_day_count(date!(2025 - 01 - 06), date!(2025 - 01 - 12)).unwrap(),
        7
    );
}

#[test]
fn test_entries_sorted_by_start_then_name_then_id() {
    let rota: Vec<RotaDay> = build_rota(
        date!(2025 - 01 - 06),
        date!(2025 - 01 - 06),
        &SiteTimezone::UTC,
        vec![
            create_entry(4, "Zed", datetime!(2025-01-06 08:00 UTC)),
            create_entry(3, "Bea", datetime!(2025-01-06 09:00 UTC)),
            create_entry(2, "Abe", datetime!(2025-01-06 09:00 UTC)),
            create_entry(1, "Abe", datetime!(2025-01-06 09:00 UTC)),
        ],
    )
    .unwrap();

    let ids: Vec<i64> = rota[0]
        .entries
        .iter()
        .map(|e| e.assignment.assignment_id.value())
        .collect();
    assert_eq!(ids, vec![4, 1, 2, 3]);
}

#[test]
fn test_entries_grouped_by_site_local_date() {
    // 23:00 UTC on the 6th is the 7th in Berlin.
    let tz: SiteTimezone = SiteTimezone::parse("Europe/Berlin").unwrap();
    let rota: Vec<RotaDay> = build_rota(
        date!(2025 - 01 - 06),
        date!(2025 - 01 - 07),
        &tz,
        vec![create_entry(1, "Ann", datetime!(2025-01-06 23:00 UTC))],
    )
    .unwrap();

    assert!(rota[0].entries.is_empty());
    assert_eq!(rota[1].entries.len(), 1);
}

#[test]
fn test_entries_outside_range_ignored() {
    let rota: Vec<RotaDay> = build_rota(
        date!(2025 - 01 - 06),
        date!(2025 - 01 - 07),
        &SiteTimezone::UTC,
        vec![create_entry(1, "Ann", datetime!(2025-01-09 09:00 UTC))],
    )
    .unwrap();

    assert!(rota.iter().all(|d| d.entries.is_empty()));
}

#[test]
fn test_rejects_inverted_range() {
    let result = build_rota(
        date!(2025 - 01 - 07),
        date!(2025 - 01 - 06),
        &SiteTimezone::UTC,
        Vec::new(),
    );
    assert!(matches!(result, Err(DomainError::InvalidDateRange { .. })));
}

#[test]
fn test_rejects_range_longer_than_cap() {
    let result = rota_day_count(date!(2025 - 01 - 01), date!(2025 - 03 - 31));
    assert_eq!(
        result,
        Err(DomainError::RotaRangeTooLong {
            days: 90,
            max: MAX_ROTA_DAYS
        })
    );
}
