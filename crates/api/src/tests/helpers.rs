// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use rotaplan::Principal;
use rotaplan_audit::Cause;
use rotaplan_persistence::Persistence;
use time::OffsetDateTime;
use time::macros::datetime;

use crate::{
    AssignmentWriteResponse, AvailabilityWindowRequest, BulkScheduleRequest,
    CreateAssignmentRequest, CreateSessionRequest, CreateSessionResponse, StaticUsageGate,
    SyncStaffRequest, create_assignment, create_session, resolve_principal, sync_staff,
};

pub const ORG: i64 = 1;
pub const OTHER_ORG: i64 = 2;
pub const ADMIN: i64 = 10;
pub const SCHEDULER: i64 = 100;
pub const HOLDER: i64 = 200;
pub const PEER: i64 = 300;
pub const THIRD: i64 = 400;

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("api-req-456"), String::from("API request"))
}

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("Failed to create in-memory persistence")
}

pub fn create_admin() -> Principal {
    resolve_principal(ADMIN, ORG, "admin").unwrap()
}

pub fn create_scheduler() -> Principal {
    resolve_principal(SCHEDULER, ORG, "scheduler").unwrap()
}

pub fn create_staff(staff_id: i64) -> Principal {
    resolve_principal(staff_id, ORG, "staff").unwrap()
}

pub fn unlimited() -> StaticUsageGate {
    StaticUsageGate::unlimited()
}

/// A fixed "now" before every seeded date.
pub fn test_now() -> OffsetDateTime {
    datetime!(2025-01-01 00:00 UTC)
}

pub fn session_request(title: &str, start: &str, end: &str) -> CreateSessionRequest {
    CreateSessionRequest {
        title: title.to_string(),
        start: start.to_string(),
        end: end.to_string(),
        group_ids: vec![5],
    }
}

/// Creates "Morning clinic" on Monday 2025-01-06, 09:00-12:00 UTC, group 5.
pub fn seed_session(persistence: &mut Persistence) -> i64 {
    seed_session_at(
        persistence,
        "Morning clinic",
        "2025-01-06T09:00:00Z",
        "2025-01-06T12:00:00Z",
    )
}

pub fn seed_session_at(persistence: &mut Persistence, title: &str, start: &str, end: &str) -> i64 {
    let response: CreateSessionResponse = create_session(
        persistence,
        &create_scheduler(),
        session_request(title, start, end),
        create_test_cause(),
    )
    .unwrap();
    response.session.session_id
}

pub fn seed_assignment(persistence: &mut Persistence, session_id: i64, staff_id: i64) -> i64 {
    let response: AssignmentWriteResponse = create_assignment(
        persistence,
        &create_scheduler(),
        &unlimited(),
        CreateAssignmentRequest {
            session_id,
            staff_id,
            role: String::from("Lead"),
            status: None,
        },
        create_test_cause(),
    )
    .unwrap();
    response.assignment.assignment_id
}

/// Registers a staff member available Mondays 08:00-18:00 who prefers group 5.
pub fn seed_available_staff(persistence: &mut Persistence, staff_id: i64, name: &str) {
    seed_staff(
        persistence,
        staff_id,
        &SyncStaffRequest {
            display_name: name.to_string(),
            windows: vec![AvailabilityWindowRequest::Recurring {
                weekday: Some(String::from("Mon")),
                start_time: String::from("08:00"),
                end_time: String::from("18:00"),
            }],
            preferred_groups: vec![5],
            blocked_dates: Vec::new(),
        },
    );
}

pub fn seed_staff(persistence: &mut Persistence, staff_id: i64, request: &SyncStaffRequest) {
    sync_staff(persistence, &create_admin(), staff_id, request).unwrap();
}

pub fn weekly_request(days: &[&str]) -> BulkScheduleRequest {
    BulkScheduleRequest {
        group_ids: vec![7],
        start_date: String::from("2025-01-06"),
        end_date: String::from("2025-01-12"),
        days_of_week: days.iter().map(|d| (*d).to_string()).collect(),
        start_time: String::from("09:00"),
        end_time: String::from("10:30"),
        title_prefix: Some(String::from("Clinic")),
        staff_ids: Vec::new(),
        role: None,
    }
}
