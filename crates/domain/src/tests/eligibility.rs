// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    AvailabilitySnapshot, AvailabilityWindow, DomainError, EligibilityResult, GroupId,
    IneligibilityReason, SiteTimezone, StaffAvailability, StaffId, resolve_eligibility,
};
use std::collections::HashSet;
use time::macros::{date, datetime, time};

const GROUP: GroupId = GroupId::new(10);

/// Available 08:00-18:00 every day, prefers `GROUP`, no blocks.
fn create_available_staff() -> StaffAvailability {
    StaffAvailability {
        windows: vec![AvailabilityWindow::recurring(None, time!(08:00), time!(18:00)).unwrap()],
        preferred_groups: HashSet::from([GROUP]),
        blocked_dates: HashSet::new(),
    }
}

fn resolve_one(snapshot: &AvailabilitySnapshot, group: Option<GroupId>) -> EligibilityResult {
    let results: Vec<EligibilityResult> = resolve_eligibility(
        snapshot,
        snapshot.timezone(),
        group,
        datetime!(2025-01-06 09:00 UTC),
        datetime!(2025-01-06 10:00 UTC),
        &[StaffId::new(1)],
    )
    .unwrap();
    results[0]
}

#[test]
fn test_fully_available_staff_is_eligible() {
    let mut snapshot: AvailabilitySnapshot = AvailabilitySnapshot::new(SiteTimezone::UTC);
    snapshot.insert(StaffId::new(1), create_available_staff());

    let result: EligibilityResult = resolve_one(&snapshot, Some(GROUP));
    assert!(result.eligible);
    assert_eq!(result.reason, None);
}

#[test]
fn test_date_block_wins_over_everything() {
    let mut staff: StaffAvailability = create_available_staff();
    staff.blocked_dates.insert(date!(2025 - 01 - 06));
    staff.preferred_groups.clear();
    let mut snapshot: AvailabilitySnapshot = AvailabilitySnapshot::new(SiteTimezone::UTC);
    snapshot.insert(StaffId::new(1), staff);

    let result: EligibilityResult = resolve_one(&snapshot, Some(GROUP));
    assert!(!result.eligible);
    assert_eq!(result.reason, Some(IneligibilityReason::BlockedOnDate));
}

#[test]
fn test_missing_window_reports_unavailable() {
    let mut staff: StaffAvailability = create_available_staff();
    staff.windows = vec![AvailabilityWindow::recurring(None, time!(13:00), time!(18:00)).unwrap()];
    staff.preferred_groups.clear();
    let mut snapshot: AvailabilitySnapshot = AvailabilitySnapshot::new(SiteTimezone::UTC);
    snapshot.insert(StaffId::new(1), staff);

    let result: EligibilityResult = resolve_one(&snapshot, Some(GROUP));
    assert_eq!(result.reason, Some(IneligibilityReason::UnavailableAtTime));
}

#[test]
fn test_partial_window_does_not_cover() {
    let mut staff: StaffAvailability = create_available_staff();
    staff.windows = vec![AvailabilityWindow::recurring(None, time!(09:30), time!(18:00)).unwrap()];
    let mut snapshot: AvailabilitySnapshot = AvailabilitySnapshot::new(SiteTimezone::UTC);
    snapshot.insert(StaffId::new(1), staff);

    let result: EligibilityResult = resolve_one(&snapshot, Some(GROUP));
    assert_eq!(result.reason, Some(IneligibilityReason::UnavailableAtTime));
}

#[test]
fn test_unpreferred_group_reported_last() {
    let mut staff: StaffAvailability = create_available_staff();
    staff.preferred_groups = HashSet::from([GroupId::new(99)]);
    let mut snapshot: AvailabilitySnapshot = AvailabilitySnapshot::new(SiteTimezone::UTC);
    snapshot.insert(StaffId::new(1), staff);

    let result: EligibilityResult = resolve_one(&snapshot, Some(GROUP));
    assert_eq!(result.reason, Some(IneligibilityReason::DoesNotPreferGroup));
}

#[test]
fn test_no_group_skips_preference_check() {
    let mut staff: StaffAvailability = create_available_staff();
    staff.preferred_groups.clear();
    let mut snapshot: AvailabilitySnapshot = AvailabilitySnapshot::new(SiteTimezone::UTC);
    snapshot.insert(StaffId::new(1), staff);

    let result: EligibilityResult = resolve_one(&snapshot, None);
    assert!(result.eligible);
}

#[test]
fn test_unknown_staff_is_unavailable() {
    let snapshot: AvailabilitySnapshot = AvailabilitySnapshot::new(SiteTimezone::UTC);
    let result: EligibilityResult = resolve_one(&snapshot, Some(GROUP));
    assert_eq!(result.reason, Some(IneligibilityReason::UnavailableAtTime));
}

#[test]
fn test_results_follow_input_order() {
    let mut snapshot: AvailabilitySnapshot = AvailabilitySnapshot::new(SiteTimezone::UTC);
    snapshot.insert(StaffId::new(3), create_available_staff());

    let staff: [StaffId; 3] = [StaffId::new(3), StaffId::new(1), StaffId::new(2)];
    let results: Vec<EligibilityResult> = resolve_eligibility(
        &snapshot,
        &SiteTimezone::UTC,
        Some(GROUP),
        datetime!(2025-01-06 09:00 UTC),
        datetime!(2025-01-06 10:00 UTC),
        &staff,
    )
    .unwrap();

    let ids: Vec<StaffId> = results.iter().map(|r| r.staff_id).collect();
    assert_eq!(ids, staff.to_vec());
    assert!(results[0].eligible);
    assert!(!results[1].eligible);
}

#[test]
fn test_block_uses_site_local_date() {
    // 23:30 UTC on the 6th is already the 7th in Tokyo.
    let tz: SiteTimezone = SiteTimezone::parse("Asia/Tokyo").unwrap();
    let mut staff: StaffAvailability = create_available_staff();
    staff.windows = vec![
        AvailabilityWindow::absolute(
            datetime!(2025-01-06 00:00 UTC),
            datetime!(2025-01-08 00:00 UTC),
        )
        .unwrap(),
    ];
    staff.blocked_dates.insert(date!(2025 - 01 - 07));
    let mut snapshot: AvailabilitySnapshot = AvailabilitySnapshot::new(tz);
    snapshot.insert(StaffId::new(1), staff);

    let results: Vec<EligibilityResult> = resolve_eligibility(
        &snapshot,
        &tz,
        None,
        datetime!(2025-01-06 23:30 UTC),
        datetime!(2025-01-07 00:30 UTC),
        &[StaffId::new(1)],
    )
    .unwrap();
    assert_eq!(results[0].reason, Some(IneligibilityReason::BlockedOnDate));
}

#[test]
fn test_session_ending_at_midnight_does_not_touch_next_day() {
    let mut staff: StaffAvailability = create_available_staff();
    staff.windows = vec![
        AvailabilityWindow::absolute(
            datetime!(2025-01-06 00:00 UTC),
            datetime!(2025-01-07 00:00 UTC),
        )
        .unwrap(),
    ];
    staff.blocked_dates.insert(date!(2025 - 01 - 07));
    let mut snapshot: AvailabilitySnapshot = AvailabilitySnapshot::new(SiteTimezone::UTC);
    snapshot.insert(StaffId::new(1), staff);

    let results: Vec<EligibilityResult> = resolve_eligibility(
        &snapshot,
        &SiteTimezone::UTC,
        None,
        datetime!(2025-01-06 22:00 UTC),
        datetime!(2025-01-07 00:00 UTC),
        &[StaffId::new(1)],
    )
    .unwrap();
    assert!(results[0].eligible);
}

#[test]
fn test_rejects_empty_window() {
    let snapshot: AvailabilitySnapshot = AvailabilitySnapshot::new(SiteTimezone::UTC);
    let result = resolve_eligibility(
        &snapshot,
        &SiteTimezone::UTC,
        None,
        datetime!(2025-01-06 10:00 UTC),
        datetime!(2025-01-06 10:00 UTC),
        &[StaffId::new(1)],
    );
    assert!(matches!(result, Err(DomainError::InvalidSessionWindow { .. })));
}

#[test]
fn test_reason_wire_names() {
    assert_eq!(IneligibilityReason::BlockedOnDate.as_str(), "blocked_on_date");
    assert_eq!(
        IneligibilityReason::UnavailableAtTime.as_str(),
        "unavailable_at_time"
    );
    assert_eq!(
        serde_json::to_string(&IneligibilityReason::DoesNotPreferGroup).unwrap(),
        "\"does_not_prefer_group\""
    );
}
