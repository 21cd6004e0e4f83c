// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use rotaplan_domain::OrganizationId;
use rotaplan_persistence::Persistence;

use super::helpers::{
    HOLDER, ORG, OTHER_ORG, PEER, SCHEDULER, create_scheduler, create_staff, create_test_cause,
    create_test_persistence, seed_assignment, seed_available_staff, seed_session,
    seed_session_at, unlimited,
};
use crate::{
    ApiError, AssignmentResponse, AssignmentWriteResponse, CreateAssignmentRequest,
    DateRangeQuery, ListAssignmentsResponse, StaticUsageGate, TransitionAssignmentRequest,
    create_assignment, delete_assignment, get_assignment, list_assignments, list_my_assignments,
    resolve_principal, transition_assignment,
};

fn assignment_request(session_id: i64, staff_id: i64, status: Option<&str>) -> CreateAssignmentRequest {
    CreateAssignmentRequest {
        session_id,
        staff_id,
        role: String::from("Lead"),
        status: status.map(str::to_string),
    }
}

fn transition(status: &str) -> TransitionAssignmentRequest {
    TransitionAssignmentRequest {
        status: status.to_string(),
    }
}

fn first_week() -> DateRangeQuery {
    DateRangeQuery {
        from: String::from("2025-01-06"),
        to: String::from("2025-01-12"),
        session_id: None,
    }
}

// ============================================================================
// Creation
// ============================================================================

#[test]
fn test_create_assignment_defaults_to_pending() {
    let mut persistence: Persistence = create_test_persistence();
    let session_id: i64 = seed_session(&mut persistence);

    let response: AssignmentWriteResponse = create_assignment(
        &mut persistence,
        &create_scheduler(),
        &unlimited(),
        assignment_request(session_id, HOLDER, None),
        create_test_cause(),
    )
    .unwrap();

    assert!(response.assignment.assignment_id > 0);
    assert_eq!(response.assignment.session_id, session_id);
    assert_eq!(response.assignment.staff_id, HOLDER);
    assert_eq!(response.assignment.status, "pending");
    assert_eq!(response.assignment.role, "Lead");
}

#[test]
fn test_duplicate_assignment_is_a_conflict() {
    let mut persistence: Persistence = create_test_persistence();
    let session_id: i64 = seed_session(&mut persistence);
    seed_assignment(&mut persistence, session_id, HOLDER);

    let result: Result<AssignmentWriteResponse, ApiError> = create_assignment(
        &mut persistence,
        &create_scheduler(),
        &unlimited(),
        assignment_request(session_id, HOLDER, None),
        create_test_cause(),
    );

    assert_eq!(result.unwrap_err().kind(), "conflict");
}

#[test]
fn test_same_staff_may_hold_different_sessions() {
    let mut persistence: Persistence = create_test_persistence();
    let monday: i64 = seed_session(&mut persistence);
    let tuesday: i64 = seed_session_at(
        &mut persistence,
        "Tuesday clinic",
        "2025-01-07T09:00:00Z",
        "2025-01-07T12:00:00Z",
    );

    seed_assignment(&mut persistence, monday, HOLDER);
    seed_assignment(&mut persistence, tuesday, HOLDER);
}

#[test]
fn test_missing_session_is_not_found() {
    let mut persistence: Persistence = create_test_persistence();

    let result: Result<AssignmentWriteResponse, ApiError> = create_assignment(
        &mut persistence,
        &create_scheduler(),
        &unlimited(),
        assignment_request(4242, HOLDER, None),
        create_test_cause(),
    );

    assert_eq!(result.unwrap_err().kind(), "not_found");
}

#[test]
fn test_session_in_another_organization_is_not_found() {
    let mut persistence: Persistence = create_test_persistence();
    let session_id: i64 = seed_session(&mut persistence);
    let outsider = resolve_principal(PEER, OTHER_ORG, "scheduler").unwrap();

    let result: Result<AssignmentWriteResponse, ApiError> = create_assignment(
        &mut persistence,
        &outsider,
        &unlimited(),
        assignment_request(session_id, PEER, None),
        create_test_cause(),
    );

    assert_eq!(result.unwrap_err().kind(), "not_found");
}

#[test]
fn test_blank_role_is_rejected() {
    let mut persistence: Persistence = create_test_persistence();
    let session_id: i64 = seed_session(&mut persistence);
    let mut request: CreateAssignmentRequest = assignment_request(session_id, HOLDER, None);
    request.role = String::from(" ");

    let result: Result<AssignmentWriteResponse, ApiError> = create_assignment(
        &mut persistence,
        &create_scheduler(),
        &unlimited(),
        request,
        create_test_cause(),
    );

    assert!(matches!(
        result,
        Err(ApiError::InvalidArgument { ref field, .. }) if field == "role"
    ));
}

#[test]
fn test_confirmed_offer_only_for_self() {
    let mut persistence: Persistence = create_test_persistence();
    let session_id: i64 = seed_session(&mut persistence);

    let for_other: Result<AssignmentWriteResponse, ApiError> = create_assignment(
        &mut persistence,
        &create_scheduler(),
        &unlimited(),
        assignment_request(session_id, HOLDER, Some("confirmed")),
        create_test_cause(),
    );
    assert!(matches!(
        for_other,
        Err(ApiError::InvalidArgument { ref field, .. }) if field == "status"
    ));

    let for_self: AssignmentWriteResponse = create_assignment(
        &mut persistence,
        &create_scheduler(),
        &unlimited(),
        assignment_request(session_id, SCHEDULER, Some("confirmed")),
        create_test_cause(),
    )
    .unwrap();
    assert_eq!(for_self.assignment.status, "confirmed");
}

#[test]
fn test_declined_is_never_an_initial_status() {
    let mut persistence: Persistence = create_test_persistence();
    let session_id: i64 = seed_session(&mut persistence);

    let result: Result<AssignmentWriteResponse, ApiError> = create_assignment(
        &mut persistence,
        &create_scheduler(),
        &unlimited(),
        assignment_request(session_id, HOLDER, Some("declined")),
        create_test_cause(),
    );

    assert_eq!(result.unwrap_err().kind(), "invalid_argument");
}

#[test]
fn test_staff_cannot_create_assignments() {
    let mut persistence: Persistence = create_test_persistence();
    let session_id: i64 = seed_session(&mut persistence);

    let result: Result<AssignmentWriteResponse, ApiError> = create_assignment(
        &mut persistence,
        &create_staff(HOLDER),
        &unlimited(),
        assignment_request(session_id, HOLDER, None),
        create_test_cause(),
    );

    assert_eq!(result.unwrap_err().kind(), "forbidden");
}

#[test]
fn test_usage_gate_refuses_new_assignments() {
    let mut persistence: Persistence = create_test_persistence();
    let session_id: i64 = seed_session(&mut persistence);
    let gate: StaticUsageGate = StaticUsageGate::new([OrganizationId::new(ORG)]);

    let result: Result<AssignmentWriteResponse, ApiError> = create_assignment(
        &mut persistence,
        &create_scheduler(),
        &gate,
        assignment_request(session_id, HOLDER, None),
        create_test_cause(),
    );

    assert_eq!(result.unwrap_err().kind(), "quota_exceeded");
    let listed: ListAssignmentsResponse =
        list_assignments(&mut persistence, &create_scheduler(), &first_week()).unwrap();
    assert!(listed.assignments.is_empty());
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_holder_confirms_own_assignment() {
    let mut persistence: Persistence = create_test_persistence();
    let session_id: i64 = seed_session(&mut persistence);
    let assignment_id: i64 = seed_assignment(&mut persistence, session_id, HOLDER);

    let response: AssignmentWriteResponse = transition_assignment(
        &mut persistence,
        &create_staff(HOLDER),
        &unlimited(),
        assignment_id,
        &transition("confirmed"),
        create_test_cause(),
    )
    .unwrap();

    assert_eq!(response.assignment.status, "confirmed");
    let stored: AssignmentResponse =
        get_assignment(&mut persistence, &create_scheduler(), assignment_id).unwrap();
    assert_eq!(stored.status, "confirmed");
}

#[test]
fn test_answered_assignment_cannot_change_again() {
    let mut persistence: Persistence = create_test_persistence();
    let session_id: i64 = seed_session(&mut persistence);
    let assignment_id: i64 = seed_assignment(&mut persistence, session_id, HOLDER);

    transition_assignment(
        &mut persistence,
        &create_staff(HOLDER),
        &unlimited(),
        assignment_id,
        &transition("confirmed"),
        create_test_cause(),
    )
    .unwrap();

    let result: Result<AssignmentWriteResponse, ApiError> = transition_assignment(
        &mut persistence,
        &create_staff(HOLDER),
        &unlimited(),
        assignment_id,
        &transition("declined"),
        create_test_cause(),
    );

    assert_eq!(result.unwrap_err().kind(), "invalid_transition");
}

#[test]
fn test_pending_is_not_a_transition_target() {
    let mut persistence: Persistence = create_test_persistence();
    let session_id: i64 = seed_session(&mut persistence);
    let assignment_id: i64 = seed_assignment(&mut persistence, session_id, HOLDER);

    let result: Result<AssignmentWriteResponse, ApiError> = transition_assignment(
        &mut persistence,
        &create_scheduler(),
        &unlimited(),
        assignment_id,
        &transition("pending"),
        create_test_cause(),
    );

    assert_eq!(result.unwrap_err().kind(), "invalid_transition");
}

#[test]
fn test_unknown_status_is_invalid_argument() {
    let mut persistence: Persistence = create_test_persistence();
    let session_id: i64 = seed_session(&mut persistence);
    let assignment_id: i64 = seed_assignment(&mut persistence, session_id, HOLDER);

    let result: Result<AssignmentWriteResponse, ApiError> = transition_assignment(
        &mut persistence,
        &create_scheduler(),
        &unlimited(),
        assignment_id,
        &transition("maybe"),
        create_test_cause(),
    );

    assert_eq!(result.unwrap_err().kind(), "invalid_argument");
}

#[test]
fn test_other_staff_cannot_answer_assignment() {
    let mut persistence: Persistence = create_test_persistence();
    let session_id: i64 = seed_session(&mut persistence);
    let assignment_id: i64 = seed_assignment(&mut persistence, session_id, HOLDER);

    let result: Result<AssignmentWriteResponse, ApiError> = transition_assignment(
        &mut persistence,
        &create_staff(PEER),
        &unlimited(),
        assignment_id,
        &transition("declined"),
        create_test_cause(),
    );

    assert_eq!(result.unwrap_err().kind(), "forbidden");
}

#[test]
fn test_usage_gate_refuses_transitions() {
    let mut persistence: Persistence = create_test_persistence();
    let session_id: i64 = seed_session(&mut persistence);
    let assignment_id: i64 = seed_assignment(&mut persistence, session_id, HOLDER);
    let gate: StaticUsageGate = StaticUsageGate::new([OrganizationId::new(ORG)]);

    let result: Result<AssignmentWriteResponse, ApiError> = transition_assignment(
        &mut persistence,
        &create_staff(HOLDER),
        &gate,
        assignment_id,
        &transition("confirmed"),
        create_test_cause(),
    );

    assert_eq!(result.unwrap_err().kind(), "quota_exceeded");
    let stored: AssignmentResponse =
        get_assignment(&mut persistence, &create_scheduler(), assignment_id).unwrap();
    assert_eq!(stored.status, "pending");
}

#[test]
fn test_delete_frees_the_slot() {
    let mut persistence: Persistence = create_test_persistence();
    let session_id: i64 = seed_session(&mut persistence);
    let assignment_id: i64 = seed_assignment(&mut persistence, session_id, HOLDER);

    delete_assignment(
        &mut persistence,
        &create_scheduler(),
        assignment_id,
        create_test_cause(),
    )
    .unwrap();

    let missing: Result<AssignmentResponse, ApiError> =
        get_assignment(&mut persistence, &create_scheduler(), assignment_id);
    assert_eq!(missing.unwrap_err().kind(), "not_found");

    let again: i64 = seed_assignment(&mut persistence, session_id, HOLDER);
    assert_ne!(again, assignment_id);
}

#[test]
fn test_assignment_in_another_organization_is_not_found() {
    let mut persistence: Persistence = create_test_persistence();
    let session_id: i64 = seed_session(&mut persistence);
    let assignment_id: i64 = seed_assignment(&mut persistence, session_id, HOLDER);
    let outsider = resolve_principal(PEER, OTHER_ORG, "admin").unwrap();

    let read: Result<AssignmentResponse, ApiError> =
        get_assignment(&mut persistence, &outsider, assignment_id);
    assert_eq!(read.unwrap_err().kind(), "not_found");

    let removed = delete_assignment(&mut persistence, &outsider, assignment_id, create_test_cause());
    assert_eq!(removed.unwrap_err().kind(), "not_found");
}

// ============================================================================
// Listing
// ============================================================================

#[test]
fn test_list_assignments_falls_back_to_staff_id_label() {
    let mut persistence: Persistence = create_test_persistence();
    let session_id: i64 = seed_session(&mut persistence);
    seed_available_staff(&mut persistence, HOLDER, "Alice Able");
    seed_assignment(&mut persistence, session_id, HOLDER);
    seed_assignment(&mut persistence, session_id, PEER);

    let listed: ListAssignmentsResponse =
        list_assignments(&mut persistence, &create_scheduler(), &first_week()).unwrap();

    let names: Vec<&str> = listed
        .assignments
        .iter()
        .map(|a| a.staff_display_name.as_str())
        .collect();
    assert_eq!(names, vec!["Alice Able", "Staff 300"]);
    assert_eq!(listed.assignments[0].session_title, "Morning clinic");
    assert_eq!(listed.assignments[0].session_start, "2025-01-06T09:00:00Z");
}

#[test]
fn test_list_assignments_outside_range_is_empty() {
    let mut persistence: Persistence = create_test_persistence();
    let session_id: i64 = seed_session(&mut persistence);
    seed_assignment(&mut persistence, session_id, HOLDER);

    let listed: ListAssignmentsResponse = list_assignments(
        &mut persistence,
        &create_scheduler(),
        &DateRangeQuery {
            from: String::from("2025-01-07"),
            to: String::from("2025-01-31"),
            session_id: None,
        },
    )
    .unwrap();

    assert!(listed.assignments.is_empty());
}

#[test]
fn test_list_assignments_filters_by_session() {
    let mut persistence: Persistence = create_test_persistence();
    let monday: i64 = seed_session(&mut persistence);
    let tuesday: i64 = seed_session_at(
        &mut persistence,
        "Tuesday clinic",
        "2025-01-07T09:00:00Z",
        "2025-01-07T12:00:00Z",
    );
    seed_assignment(&mut persistence, monday, HOLDER);
    seed_assignment(&mut persistence, tuesday, HOLDER);

    let mut query: DateRangeQuery = first_week();
    query.session_id = Some(tuesday);
    let listed: ListAssignmentsResponse =
        list_assignments(&mut persistence, &create_scheduler(), &query).unwrap();

    assert_eq!(listed.assignments.len(), 1);
    assert_eq!(listed.assignments[0].session_id, tuesday);
}

#[test]
fn test_list_my_assignments_only_returns_own() {
    let mut persistence: Persistence = create_test_persistence();
    let session_id: i64 = seed_session(&mut persistence);
    let mine: i64 = seed_assignment(&mut persistence, session_id, HOLDER);
    seed_assignment(&mut persistence, session_id, PEER);

    let listed: ListAssignmentsResponse =
        list_my_assignments(&mut persistence, &create_staff(HOLDER), &first_week()).unwrap();

    assert_eq!(listed.assignments.len(), 1);
    assert_eq!(listed.assignments[0].assignment_id, mine);
}
