// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use rotaplan::{Permission, Principal};
use rotaplan_persistence::Persistence;

use super::helpers::{
    HOLDER, ORG, OTHER_ORG, create_admin, create_scheduler, create_staff, create_test_cause,
    create_test_persistence, seed_session, session_request,
};
use crate::{
    ApiError, AvailabilityWindowRequest, CreateSessionResponse, DateRangeQuery,
    EligibilityResponse, OrganizationResponse, Role, RotaResponse, SyncOrganizationRequest,
    SyncStaffRequest, WriteResponse, build_rota, create_session, resolve_principal,
    resolve_session_eligibility, sync_organization, sync_staff,
};

fn staff_request(name: &str) -> SyncStaffRequest {
    SyncStaffRequest {
        display_name: name.to_string(),
        windows: Vec::new(),
        preferred_groups: Vec::new(),
        blocked_dates: Vec::new(),
    }
}

// ============================================================================
// Roles
// ============================================================================

#[test]
fn test_role_names_parse_case_insensitively() {
    assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
    assert_eq!(" Scheduler ".parse::<Role>().unwrap(), Role::Scheduler);
    assert_eq!("STAFF".parse::<Role>().unwrap(), Role::Staff);
    assert_eq!(Role::Scheduler.to_string(), "scheduler");
}

#[test]
fn test_unknown_role_is_invalid_argument() {
    let result: Result<Principal, ApiError> = resolve_principal(HOLDER, ORG, "owner");

    assert!(matches!(
        result,
        Err(ApiError::InvalidArgument { ref field, .. }) if field == "role"
    ));
}

#[test]
fn test_role_capabilities() {
    let admin: Principal = create_admin();
    let scheduler: Principal = create_scheduler();
    let staff: Principal = create_staff(HOLDER);

    assert!(admin.can(Permission::SyncAvailability));
    assert!(scheduler.can(Permission::ManageAssignments));
    assert!(scheduler.can(Permission::ReadEvents));
    assert!(!scheduler.can(Permission::SyncAvailability));
    assert!(staff.can(Permission::ViewSchedule));
    assert!(!staff.can(Permission::ManageSessions));
    assert!(!staff.can(Permission::ReadEvents));
}

// ============================================================================
// Collaborator sync
// ============================================================================

#[test]
fn test_only_admin_may_sync_collaborator_facts() {
    let mut persistence: Persistence = create_test_persistence();

    let staff: Result<WriteResponse, ApiError> = sync_staff(
        &mut persistence,
        &create_scheduler(),
        HOLDER,
        &staff_request("Alice Able"),
    );
    assert_eq!(staff.unwrap_err().kind(), "forbidden");

    let organization: Result<OrganizationResponse, ApiError> = sync_organization(
        &mut persistence,
        &create_staff(HOLDER),
        &SyncOrganizationRequest {
            name: String::from("North Site"),
            timezone: String::from("UTC"),
        },
    );
    assert_eq!(organization.unwrap_err().kind(), "forbidden");
}

#[test]
fn test_sync_organization_sets_rota_timezone() {
    let mut persistence: Persistence = create_test_persistence();

    let response: OrganizationResponse = sync_organization(
        &mut persistence,
        &create_admin(),
        &SyncOrganizationRequest {
            name: String::from(" North Site "),
            timezone: String::from("Australia/Sydney"),
        },
    )
    .unwrap();
    assert_eq!(response.name, "North Site");
    assert_eq!(response.timezone, "Australia/Sydney");

    let rota: RotaResponse = build_rota(
        &mut persistence,
        &create_scheduler(),
        &DateRangeQuery {
            from: String::from("2025-01-06"),
            to: String::from("2025-01-06"),
            session_id: None,
        },
    )
    .unwrap();
    assert_eq!(rota.timezone, "Australia/Sydney");
}

#[test]
fn test_unknown_timezone_is_invalid_argument() {
    let mut persistence: Persistence = create_test_persistence();

    let result: Result<OrganizationResponse, ApiError> = sync_organization(
        &mut persistence,
        &create_admin(),
        &SyncOrganizationRequest {
            name: String::from("North Site"),
            timezone: String::from("Mars/Olympus_Mons"),
        },
    );

    assert!(matches!(
        result,
        Err(ApiError::InvalidArgument { ref field, .. }) if field == "timezone"
    ));
}

#[test]
fn test_sync_staff_validates_fields() {
    let mut persistence: Persistence = create_test_persistence();

    let blank: Result<WriteResponse, ApiError> =
        sync_staff(&mut persistence, &create_admin(), HOLDER, &staff_request("  "));
    assert!(matches!(
        blank,
        Err(ApiError::InvalidArgument { ref field, .. }) if field == "display_name"
    ));

    let mut bad_window: SyncStaffRequest = staff_request("Alice Able");
    bad_window.windows = vec![AvailabilityWindowRequest::Recurring {
        weekday: Some(String::from("Mon")),
        start_time: String::from("18:00"),
        end_time: String::from("08:00"),
    }];
    let inverted: Result<WriteResponse, ApiError> =
        sync_staff(&mut persistence, &create_admin(), HOLDER, &bad_window);
    assert_eq!(inverted.unwrap_err().kind(), "invalid_argument");

    let mut bad_date: SyncStaffRequest = staff_request("Alice Able");
    bad_date.blocked_dates = vec![String::from("next tuesday")];
    let malformed: Result<WriteResponse, ApiError> =
        sync_staff(&mut persistence, &create_admin(), HOLDER, &bad_date);
    assert_eq!(malformed.unwrap_err().kind(), "invalid_argument");
}

#[test]
fn test_sync_staff_replaces_previous_facts() {
    let mut persistence: Persistence = create_test_persistence();
    let session_id: i64 = seed_session(&mut persistence);

    let mut available: SyncStaffRequest = staff_request("Alice Able");
    available.windows = vec![AvailabilityWindowRequest::Recurring {
        weekday: None,
        start_time: String::from("00:00"),
        end_time: String::from("23:59"),
    }];
    available.preferred_groups = vec![5];
    sync_staff(&mut persistence, &create_admin(), HOLDER, &available).unwrap();

    let before: EligibilityResponse = resolve_session_eligibility(
        &mut persistence,
        &create_scheduler(),
        session_id,
        Some(&[HOLDER]),
    )
    .unwrap();
    assert!(before.results[0].eligible);

    sync_staff(&mut persistence, &create_admin(), HOLDER, &staff_request("Alice Able")).unwrap();

    let after: EligibilityResponse = resolve_session_eligibility(
        &mut persistence,
        &create_scheduler(),
        session_id,
        Some(&[HOLDER]),
    )
    .unwrap();
    assert_eq!(after.results[0].reason.as_deref(), Some("unavailable_at_time"));
}

// ============================================================================
// Organization scoping
// ============================================================================

#[test]
fn test_sessions_are_scoped_to_their_organization() {
    let mut persistence: Persistence = create_test_persistence();
    let session_id: i64 = seed_session(&mut persistence);
    let outsider: Principal = resolve_principal(HOLDER, OTHER_ORG, "admin").unwrap();

    let result: Result<EligibilityResponse, ApiError> =
        resolve_session_eligibility(&mut persistence, &outsider, session_id, None);
    assert_eq!(result.unwrap_err().kind(), "not_found");

    let own: CreateSessionResponse = create_session(
        &mut persistence,
        &outsider,
        session_request(
            "Other clinic",
            "2025-01-06T09:00:00Z",
            "2025-01-06T12:00:00Z",
        ),
        create_test_cause(),
    )
    .unwrap();
    assert_ne!(own.session.session_id, session_id);
}
