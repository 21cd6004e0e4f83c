// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handlers.
//!
//! Each handler enforces authorization, translates the request into domain
//! types, reads the current state, asks the core for a decision and persists
//! the decision together with its schedule event. Handlers are synchronous
//! and hold the store for their whole duration.

use std::collections::HashSet;

use rotaplan::{
    Change, Command, Permission, Principal, TransitionResult, apply, resolve_for_session,
};
use rotaplan_audit::{Cause, EntityRef, ScheduleEvent};
use rotaplan_domain::{
    Assignment, AssignmentId, AssignmentStatus, AvailabilitySnapshot, AvailabilityWindow,
    BatchResult, EligibilityResult, GroupId, MAX_SESSIONS_PER_REQUEST, RecurringSchedule,
    RotaDay, RotaEntry, Session, SessionDraft, SessionId, SiteTimezone, StaffAvailability,
    StaffId, SwapRequest, SwapRequestId, SwapStatus, WeekdaySet, build_rota as build_rota_days,
    count_sessions, expand_sessions, format_instant, parse_date, parse_instant,
    parse_time_of_day, resolve_eligibility, rota_day_count, validate_role,
};
use rotaplan_persistence::{
    DEFAULT_EVENT_LIMIT, PersistTransitionResult, Persistence, StaffSwaps,
};
use time::{Date, OffsetDateTime, Time, Weekday};
use tracing::{debug, info, warn};

use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::request_response::{
    AssignmentResponse, AssignmentWriteResponse, AvailabilityWindowRequest,
    BulkSchedulePreviewResponse, BulkScheduleRequest, BulkScheduleResponse,
    CreateAssignmentRequest, CreateSessionRequest, CreateSessionResponse, CreateSwapRequest,
    DateRangeQuery, EligibilityEntry, EligibilityRequest, EligibilityResponse,
    ListAssignmentsResponse, ListEventsQuery, ListEventsResponse, ListSwapsResponse,
    OrganizationResponse, PreAssignmentFailure, PreAssignmentReport, RotaDayResponse,
    RotaEntryResponse, RotaResponse, ScheduleEventResponse, SessionResponse, SwapResponse,
    SwapWriteResponse, SyncOrganizationRequest, SyncStaffRequest, TransitionAssignmentRequest,
    WriteResponse,
};
use crate::rota_csv::render_rota_csv;
use crate::usage::{GatedOperation, UsageGate, check_usage};

/// Role label used for bulk pre-assignments when none is supplied.
pub const DEFAULT_PRE_ASSIGNMENT_ROLE: &str = "Attendee";

/// Largest event page a caller may request.
pub const MAX_EVENT_LIMIT: i64 = 500;

/// Failure reasons collected while pre-assigning staff to bulk sessions.
type PreAssignmentBatch = BatchResult<AssignmentResponse, (SessionId, StaffId), ApiError>;

// ============================================================================
// Sessions
// ============================================================================

/// Creates a single session.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `principal` - The acting identity
/// * `request` - The session to create
/// * `cause` - The cause or reason for this action
///
/// # Errors
///
/// Returns an error if:
/// - The principal may not manage sessions
/// - The title is empty or the window is invalid
/// - The write fails
pub fn create_session(
    persistence: &mut Persistence,
    principal: &Principal,
    request: CreateSessionRequest,
    cause: Cause,
) -> Result<CreateSessionResponse, ApiError> {
    principal
        .require(Permission::ManageSessions, "create_session")
        .map_err(translate_core_error)?;

    let start: OffsetDateTime = parse_instant(&request.start).map_err(translate_domain_error)?;
    let end: OffsetDateTime = parse_instant(&request.end).map_err(translate_domain_error)?;
    let group_ids: Vec<GroupId> = request.group_ids.into_iter().map(GroupId::new).collect();
    let session: Session = Session::new(
        principal.organization_id,
        &request.title,
        start,
        end,
        group_ids,
    )
    .map_err(translate_domain_error)?;

    let transition: TransitionResult = apply(
        principal,
        Command::CreateSession {
            session: session.clone(),
        },
        cause,
    )
    .map_err(translate_core_error)?;
    let persisted: PersistTransitionResult = persistence
        .persist_transition(&transition)
        .map_err(translate_persistence_error)?;

    let session_id: SessionId = persisted
        .session_ids
        .first()
        .copied()
        .ok_or_else(|| ApiError::Internal {
            message: String::from("Session insert returned no id"),
        })?;
    let session: Session = session.with_id(session_id);

    info!(
        session_id = session_id.value(),
        organization_id = principal.organization_id.value(),
        "Created session"
    );

    Ok(CreateSessionResponse {
        message: format!("Created session '{}'", session.title()),
        session: session_response(&session, session_id),
        event_id: persisted.event_id,
    })
}

/// Counts the sessions a bulk schedule would create, without writing.
///
/// # Arguments
///
/// * `persistence` - The persistence layer, for the site timezone
/// * `principal` - The acting identity
/// * `request` - The recurring schedule
/// * `now` - The current instant; dates before the site-local today are skipped
///
/// # Errors
///
/// Returns an error if the principal may not manage sessions or the schedule
/// is invalid.
pub fn preview_bulk_schedule(
    persistence: &mut Persistence,
    principal: &Principal,
    request: &BulkScheduleRequest,
    now: OffsetDateTime,
) -> Result<BulkSchedulePreviewResponse, ApiError> {
    principal
        .require(Permission::ManageSessions, "preview_schedule")
        .map_err(translate_core_error)?;

    let schedule: RecurringSchedule = parse_schedule(request)?;
    let timezone: SiteTimezone = persistence
        .organization_timezone(principal.organization_id)
        .map_err(translate_persistence_error)?;
    let today: Date = timezone.local_date(now).map_err(translate_domain_error)?;

    Ok(BulkSchedulePreviewResponse {
        session_count: count_sessions(&schedule, today),
        max_sessions: MAX_SESSIONS_PER_REQUEST,
    })
}

/// Expands a recurring schedule, persists every session, then pre-assigns staff.
///
/// Sessions are created all-or-nothing. Pre-assignments are independent: each
/// `(session, staff)` pair either succeeds or is reported as a failure, and a
/// failure never undoes the sessions or the other assignments.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `principal` - The acting identity
/// * `gate` - The usage gate consulted for each pre-assignment
/// * `request` - The recurring schedule and optional staff list
/// * `now` - The current instant; dates before the site-local today are skipped
/// * `cause` - The cause or reason for this action
///
/// # Errors
///
/// Returns an error if:
/// - The principal may not manage sessions (or assignments, when pre-assigning)
/// - The schedule is invalid or would create too many sessions
/// - A local time does not exist in the site timezone on a matching date
/// - The session write fails
#[allow(clippy::too_many_lines)]
pub fn bulk_schedule(
    persistence: &mut Persistence,
    principal: &Principal,
    gate: &dyn UsageGate,
    request: &BulkScheduleRequest,
    now: OffsetDateTime,
    cause: Cause,
) -> Result<BulkScheduleResponse, ApiError> {
    principal
        .require(Permission::ManageSessions, "schedule_sessions")
        .map_err(translate_core_error)?;
    if !request.staff_ids.is_empty() {
        principal
            .require(Permission::ManageAssignments, "pre_assign")
            .map_err(translate_core_error)?;
    }

    let role: String = validate_role(
        request
            .role
            .as_deref()
            .unwrap_or(DEFAULT_PRE_ASSIGNMENT_ROLE),
    )
    .map_err(translate_domain_error)?;
    let schedule: RecurringSchedule = parse_schedule(request)?;
    let timezone: SiteTimezone = persistence
        .organization_timezone(principal.organization_id)
        .map_err(translate_persistence_error)?;
    let today: Date = timezone.local_date(now).map_err(translate_domain_error)?;
    let drafts: Vec<SessionDraft> =
        expand_sessions(&schedule, &timezone, today).map_err(translate_domain_error)?;

    if drafts.is_empty() {
        debug!("Recurring schedule matched no dates");
        return Ok(BulkScheduleResponse {
            session_ids: Vec::new(),
            session_count: 0,
            event_id: None,
            pre_assignments: PreAssignmentReport::default(),
            message: String::from("No sessions matched the schedule"),
        });
    }

    let assignment_cause: Cause = cause.clone();
    let transition: TransitionResult = apply(
        principal,
        Command::ScheduleSessions {
            drafts: drafts.clone(),
        },
        cause,
    )
    .map_err(translate_core_error)?;
    let persisted: PersistTransitionResult = persistence
        .persist_transition(&transition)
        .map_err(translate_persistence_error)?;

    info!(
        session_count = persisted.session_ids.len(),
        organization_id = principal.organization_id.value(),
        "Scheduled recurring sessions"
    );

    let staff: Vec<StaffId> = unique_staff(&request.staff_ids);
    let mut batch: PreAssignmentBatch = BatchResult::new();
    if !staff.is_empty() {
        for (draft, session_id) in drafts.iter().zip(&persisted.session_ids) {
            pre_assign(
                persistence,
                principal,
                gate,
                draft,
                *session_id,
                &staff,
                &role,
                &assignment_cause,
                &mut batch,
            );
        }
    }

    if !batch.is_complete() {
        warn!(
            failed = batch.failed.len(),
            total = batch.total(),
            "Some pre-assignments were not created"
        );
    }

    let session_ids: Vec<i64> = persisted
        .session_ids
        .iter()
        .map(|id| id.value())
        .collect();
    Ok(BulkScheduleResponse {
        message: format!(
            "Scheduled {} sessions; {} of {} pre-assignments created",
            session_ids.len(),
            batch.succeeded.len(),
            batch.total()
        ),
        session_count: session_ids.len(),
        session_ids,
        event_id: Some(persisted.event_id),
        pre_assignments: pre_assignment_report(batch),
    })
}

#[allow(clippy::too_many_arguments)]
fn pre_assign(
    persistence: &mut Persistence,
    principal: &Principal,
    gate: &dyn UsageGate,
    draft: &SessionDraft,
    session_id: SessionId,
    staff: &[StaffId],
    role: &str,
    cause: &Cause,
    batch: &mut PreAssignmentBatch,
) {
    let session: Session = match Session::new(
        principal.organization_id,
        &draft.title,
        draft.start,
        draft.end,
        vec![draft.group_id],
    ) {
        Ok(session) => session.with_id(session_id),
        Err(err) => {
            let err: ApiError = translate_domain_error(err);
            for staff_id in staff {
                batch.record_failure((session_id, *staff_id), err.clone());
            }
            return;
        }
    };

    for staff_id in staff {
        match offer_assignment(
            persistence,
            principal,
            gate,
            session.clone(),
            *staff_id,
            role.to_string(),
            AssignmentStatus::Pending,
            cause.clone(),
        ) {
            Ok(written) => batch.record_success(written.assignment),
            Err(err) => {
                debug!(
                    session_id = session_id.value(),
                    staff_id = staff_id.value(),
                    error = %err,
                    "Pre-assignment failed"
                );
                batch.record_failure((session_id, *staff_id), err);
            }
        }
    }
}

// ============================================================================
// Eligibility
// ============================================================================

/// Resolves eligibility of staff for a persisted session.
///
/// The session's first group is used for the preference check.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `principal` - The acting identity
/// * `session_id` - The session
/// * `staff_ids` - The candidates; the organization's directory when absent
///
/// # Errors
///
/// Returns an error if the principal may not view the schedule or the
/// session does not exist in the organization.
pub fn resolve_session_eligibility(
    persistence: &mut Persistence,
    principal: &Principal,
    session_id: i64,
    staff_ids: Option<&[i64]>,
) -> Result<EligibilityResponse, ApiError> {
    principal
        .require(Permission::ViewSchedule, "resolve_eligibility")
        .map_err(translate_core_error)?;

    let session: Session = persistence
        .get_session(principal.organization_id, SessionId::new(session_id))
        .map_err(translate_persistence_error)?;
    let candidates: Vec<StaffId> = candidate_staff(persistence, principal, staff_ids)?;
    let timezone: SiteTimezone = persistence
        .organization_timezone(principal.organization_id)
        .map_err(translate_persistence_error)?;
    let snapshot: AvailabilitySnapshot = persistence
        .load_availability(principal.organization_id, &candidates)
        .map_err(translate_persistence_error)?;

    let results: Vec<EligibilityResult> =
        resolve_for_session(principal, &session, &snapshot, &timezone, &candidates)
            .map_err(translate_core_error)?;

    Ok(EligibilityResponse {
        session_id: Some(session_id),
        group_id: session.primary_group().map(GroupId::value),
        results: results.iter().map(eligibility_entry).collect(),
    })
}

/// Resolves eligibility of staff for an ad-hoc window.
///
/// # Errors
///
/// Returns an error if the principal may not view the schedule or the
/// window is invalid.
pub fn resolve_window_eligibility(
    persistence: &mut Persistence,
    principal: &Principal,
    request: &EligibilityRequest,
) -> Result<EligibilityResponse, ApiError> {
    principal
        .require(Permission::ViewSchedule, "resolve_eligibility")
        .map_err(translate_core_error)?;

    let start: OffsetDateTime = parse_instant(&request.start).map_err(translate_domain_error)?;
    let end: OffsetDateTime = parse_instant(&request.end).map_err(translate_domain_error)?;
    let group_id: Option<GroupId> = request.group_id.map(GroupId::new);

    let candidates: Vec<StaffId> = candidate_staff(persistence, principal, request.staff_ids.as_deref())?;
    let timezone: SiteTimezone = persistence
        .organization_timezone(principal.organization_id)
        .map_err(translate_persistence_error)?;
    let snapshot: AvailabilitySnapshot = persistence
        .load_availability(principal.organization_id, &candidates)
        .map_err(translate_persistence_error)?;

    let results: Vec<EligibilityResult> =
        resolve_eligibility(&snapshot, &timezone, group_id, start, end, &candidates)
            .map_err(translate_domain_error)?;

    Ok(EligibilityResponse {
        session_id: None,
        group_id: request.group_id,
        results: results.iter().map(eligibility_entry).collect(),
    })
}

/// Returns the requested candidates, or the whole directory in name order.
fn candidate_staff(
    persistence: &mut Persistence,
    principal: &Principal,
    staff_ids: Option<&[i64]>,
) -> Result<Vec<StaffId>, ApiError> {
    match staff_ids {
        Some(ids) => Ok(unique_staff(ids)),
        None => Ok(persistence
            .list_staff(principal.organization_id)
            .map_err(translate_persistence_error)?
            .into_iter()
            .map(|entry| entry.staff_id)
            .collect()),
    }
}

// ============================================================================
// Assignments
// ============================================================================

/// Offers a session to a staff member.
///
/// Eligibility is not consulted; it is advisory only.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `principal` - The acting identity
/// * `gate` - The usage gate
/// * `request` - The assignment to create
/// * `cause` - The cause or reason for this action
///
/// # Errors
///
/// Returns an error if:
/// - The principal may not manage assignments
/// - The session does not exist in the organization
/// - The role is empty, or the initial status is not permitted
/// - The usage gate refuses the write
/// - The staff member already holds an assignment on the session (`Conflict`)
pub fn create_assignment(
    persistence: &mut Persistence,
    principal: &Principal,
    gate: &dyn UsageGate,
    request: CreateAssignmentRequest,
    cause: Cause,
) -> Result<AssignmentWriteResponse, ApiError> {
    principal
        .require(Permission::ManageAssignments, "create_assignment")
        .map_err(translate_core_error)?;

    let initial_status: AssignmentStatus = request
        .status
        .as_deref()
        .map_or(Ok(AssignmentStatus::Pending), str::parse)
        .map_err(translate_domain_error)?;
    let session: Session = persistence
        .get_session(principal.organization_id, SessionId::new(request.session_id))
        .map_err(translate_persistence_error)?;

    let written: AssignmentWriteResponse = offer_assignment(
        persistence,
        principal,
        gate,
        session,
        StaffId::new(request.staff_id),
        request.role,
        initial_status,
        cause,
    )?;

    info!(
        assignment_id = written.assignment.assignment_id,
        session_id = written.assignment.session_id,
        staff_id = written.assignment.staff_id,
        "Created assignment"
    );

    Ok(written)
}

#[allow(clippy::too_many_arguments)]
fn offer_assignment(
    persistence: &mut Persistence,
    principal: &Principal,
    gate: &dyn UsageGate,
    session: Session,
    staff_id: StaffId,
    role: String,
    initial_status: AssignmentStatus,
    cause: Cause,
) -> Result<AssignmentWriteResponse, ApiError> {
    let transition: TransitionResult = apply(
        principal,
        Command::CreateAssignment {
            session,
            staff_id,
            role,
            initial_status,
        },
        cause,
    )
    .map_err(translate_core_error)?;

    check_usage(gate, principal.organization_id, GatedOperation::CreateAssignment)?;

    let persisted: PersistTransitionResult = persistence
        .persist_transition(&transition)
        .map_err(translate_persistence_error)?;

    let Some(EntityRef::Assignment(assignment_id)) = persisted.created else {
        return Err(ApiError::Internal {
            message: String::from("Assignment insert returned no id"),
        });
    };
    let Change::InsertAssignment {
        session_id,
        staff_id,
        role,
        status,
    } = transition.change
    else {
        return Err(ApiError::Internal {
            message: String::from("Unexpected change for an assignment offer"),
        });
    };

    let assignment: Assignment = Assignment {
        assignment_id,
        session_id,
        staff_id,
        role,
        status,
    };
    Ok(AssignmentWriteResponse {
        message: format!(
            "Offered session {} to staff {} as {}",
            session_id, staff_id, assignment.role
        ),
        assignment: assignment_response(&assignment),
        event_id: persisted.event_id,
    })
}

/// Retrieves an assignment.
///
/// # Errors
///
/// Returns an error if the principal may not view the schedule or the
/// assignment does not exist in the organization.
pub fn get_assignment(
    persistence: &mut Persistence,
    principal: &Principal,
    assignment_id: i64,
) -> Result<AssignmentResponse, ApiError> {
    principal
        .require(Permission::ViewSchedule, "get_assignment")
        .map_err(translate_core_error)?;

    let assignment: Assignment = persistence
        .get_assignment(principal.organization_id, AssignmentId::new(assignment_id))
        .map_err(translate_persistence_error)?;
    Ok(assignment_response(&assignment))
}

/// Lists the organization's assignments for sessions starting in a date range.
///
/// # Errors
///
/// Returns an error if the principal may not view the schedule or the range
/// is invalid.
pub fn list_assignments(
    persistence: &mut Persistence,
    principal: &Principal,
    query: &DateRangeQuery,
) -> Result<ListAssignmentsResponse, ApiError> {
    principal
        .require(Permission::ViewSchedule, "list_assignments")
        .map_err(translate_core_error)?;

    let (from, to): (Date, Date) = parse_date_range(query)?;
    let timezone: SiteTimezone = persistence
        .organization_timezone(principal.organization_id)
        .map_err(translate_persistence_error)?;
    let (start, end): (OffsetDateTime, OffsetDateTime) = timezone
        .date_range_bounds(from, to)
        .map_err(translate_domain_error)?;

    let entries: Vec<RotaEntry> = persistence
        .list_rota_entries(
            principal.organization_id,
            start,
            end,
            query.session_id.map(SessionId::new),
        )
        .map_err(translate_persistence_error)?;

    Ok(ListAssignmentsResponse {
        from: from.to_string(),
        to: to.to_string(),
        assignments: entries.iter().map(rota_entry_response).collect(),
    })
}

/// Lists the acting staff member's own assignments in a date range.
///
/// # Errors
///
/// Returns an error if the range is invalid or the query fails.
pub fn list_my_assignments(
    persistence: &mut Persistence,
    principal: &Principal,
    query: &DateRangeQuery,
) -> Result<ListAssignmentsResponse, ApiError> {
    let (from, to): (Date, Date) = parse_date_range(query)?;
    let timezone: SiteTimezone = persistence
        .organization_timezone(principal.organization_id)
        .map_err(translate_persistence_error)?;
    let (start, end): (OffsetDateTime, OffsetDateTime) = timezone
        .date_range_bounds(from, to)
        .map_err(translate_domain_error)?;

    let entries: Vec<RotaEntry> = persistence
        .list_rota_entries_for_staff(principal.organization_id, principal.staff_id, start, end)
        .map_err(translate_persistence_error)?;

    Ok(ListAssignmentsResponse {
        from: from.to_string(),
        to: to.to_string(),
        assignments: entries.iter().map(rota_entry_response).collect(),
    })
}

/// Moves an assignment to a new status.
///
/// The holder may answer their own assignment; anyone else needs the
/// `ManageAssignments` permission.
///
/// # Errors
///
/// Returns an error if:
/// - The status is unknown
/// - The assignment does not exist in the organization
/// - The principal is neither the holder nor permitted to manage assignments
/// - The transition is not `pending → confirmed` or `pending → declined`
/// - The usage gate refuses the write
/// - A concurrent writer changed the assignment first (`InvalidTransition`)
pub fn transition_assignment(
    persistence: &mut Persistence,
    principal: &Principal,
    gate: &dyn UsageGate,
    assignment_id: i64,
    request: &TransitionAssignmentRequest,
    cause: Cause,
) -> Result<AssignmentWriteResponse, ApiError> {
    let new_status: AssignmentStatus = request.status.parse().map_err(translate_domain_error)?;
    let assignment: Assignment = persistence
        .get_assignment(principal.organization_id, AssignmentId::new(assignment_id))
        .map_err(translate_persistence_error)?;

    let transition: TransitionResult = apply(
        principal,
        Command::TransitionAssignment {
            assignment: assignment.clone(),
            new_status,
        },
        cause,
    )
    .map_err(translate_core_error)?;

    check_usage(
        gate,
        principal.organization_id,
        GatedOperation::TransitionAssignment,
    )?;

    let persisted: PersistTransitionResult = persistence
        .persist_transition(&transition)
        .map_err(translate_persistence_error)?;

    info!(
        assignment_id,
        from = assignment.status.as_str(),
        to = new_status.as_str(),
        "Transitioned assignment"
    );

    let updated: Assignment = Assignment {
        status: new_status,
        ..assignment
    };
    Ok(AssignmentWriteResponse {
        message: format!("Assignment {assignment_id} is now {new_status}"),
        assignment: assignment_response(&updated),
        event_id: persisted.event_id,
    })
}

/// Removes an assignment at any status, freeing the slot.
///
/// # Errors
///
/// Returns an error if the principal may not manage assignments or the
/// assignment does not exist in the organization.
pub fn delete_assignment(
    persistence: &mut Persistence,
    principal: &Principal,
    assignment_id: i64,
    cause: Cause,
) -> Result<WriteResponse, ApiError> {
    principal
        .require(Permission::ManageAssignments, "delete_assignment")
        .map_err(translate_core_error)?;

    let assignment: Assignment = persistence
        .get_assignment(principal.organization_id, AssignmentId::new(assignment_id))
        .map_err(translate_persistence_error)?;
    let transition: TransitionResult = apply(
        principal,
        Command::DeleteAssignment { assignment },
        cause,
    )
    .map_err(translate_core_error)?;
    let persisted: PersistTransitionResult = persistence
        .persist_transition(&transition)
        .map_err(translate_persistence_error)?;

    info!(assignment_id, "Deleted assignment");

    Ok(WriteResponse {
        success: true,
        message: Some(format!("Removed assignment {assignment_id}")),
        event_id: Some(persisted.event_id),
    })
}

// ============================================================================
// Swap Requests
// ============================================================================

/// Offers the acting staff member's assignment to a peer.
///
/// # Errors
///
/// Returns an error if:
/// - The assignment does not exist in the organization
/// - The principal is not the current holder (`Forbidden`)
/// - The peer is the holder (`InvalidArgument`)
/// - The assignment was declined (`InvalidTransition`)
/// - The peer is not in the organization's staff directory (`NotFound`)
/// - A swap is already outstanding for the assignment (`Conflict`)
pub fn request_swap(
    persistence: &mut Persistence,
    principal: &Principal,
    request: &CreateSwapRequest,
    cause: Cause,
) -> Result<SwapWriteResponse, ApiError> {
    let assignment: Assignment = persistence
        .get_assignment(
            principal.organization_id,
            AssignmentId::new(request.assignment_id),
        )
        .map_err(translate_persistence_error)?;
    let to_staff_id: StaffId = StaffId::new(request.to_staff_id);

    let transition: TransitionResult = apply(
        principal,
        Command::RequestSwap {
            assignment: assignment.clone(),
            to_staff_id,
        },
        cause,
    )
    .map_err(translate_core_error)?;

    // An offer to someone outside the directory could never be answered.
    if persistence
        .get_staff(principal.organization_id, to_staff_id)
        .map_err(translate_persistence_error)?
        .is_none()
    {
        warn!(
            assignment_id = request.assignment_id,
            to_staff_id = request.to_staff_id,
            "Swap recipient is not in the staff directory"
        );
        return Err(ApiError::NotFound {
            message: format!(
                "Staff member {to_staff_id} in organization {}",
                principal.organization_id
            ),
        });
    }

    let persisted: PersistTransitionResult = persistence
        .persist_transition(&transition)
        .map_err(translate_persistence_error)?;

    let Some(EntityRef::SwapRequest(swap_request_id)) = persisted.created else {
        return Err(ApiError::Internal {
            message: String::from("Swap request insert returned no id"),
        });
    };

    info!(
        swap_request_id = swap_request_id.value(),
        assignment_id = request.assignment_id,
        to_staff_id = request.to_staff_id,
        "Requested swap"
    );

    let swap: SwapRequest = SwapRequest {
        swap_request_id,
        assignment_id: assignment.assignment_id,
        from_staff_id: assignment.staff_id,
        to_staff_id,
        status: SwapStatus::Requested,
    };
    Ok(SwapWriteResponse {
        message: format!(
            "Offered assignment {} to staff {}",
            assignment.assignment_id, to_staff_id
        ),
        swap: swap_response(&swap),
        event_id: persisted.event_id,
    })
}

/// Accepts a swap request, moving the assignment to the acting staff member.
///
/// The assignment becomes `pending` for its new holder.
///
/// # Errors
///
/// Returns an error if:
/// - The swap does not exist in the organization
/// - The principal is not the swap's recipient (`Forbidden`)
/// - The swap has already been answered (`InvalidTransition`)
/// - The holder changed since the request, or the recipient already holds an
///   assignment on the same session (`Conflict`)
pub fn accept_swap(
    persistence: &mut Persistence,
    principal: &Principal,
    swap_request_id: i64,
    cause: Cause,
) -> Result<SwapWriteResponse, ApiError> {
    answer_swap(persistence, principal, swap_request_id, SwapStatus::Accepted, cause)
}

/// Declines a swap request. The assignment is untouched.
///
/// # Errors
///
/// Returns an error if the swap does not exist, the principal is not its
/// recipient, or it has already been answered.
pub fn decline_swap(
    persistence: &mut Persistence,
    principal: &Principal,
    swap_request_id: i64,
    cause: Cause,
) -> Result<SwapWriteResponse, ApiError> {
    answer_swap(persistence, principal, swap_request_id, SwapStatus::Declined, cause)
}

fn answer_swap(
    persistence: &mut Persistence,
    principal: &Principal,
    swap_request_id: i64,
    answer: SwapStatus,
    cause: Cause,
) -> Result<SwapWriteResponse, ApiError> {
    let swap: SwapRequest = persistence
        .get_swap(principal.organization_id, SwapRequestId::new(swap_request_id))
        .map_err(translate_persistence_error)?;

    let command: Command = if answer == SwapStatus::Accepted {
        Command::AcceptSwap { swap: swap.clone() }
    } else {
        Command::DeclineSwap { swap: swap.clone() }
    };
    let transition: TransitionResult =
        apply(principal, command, cause).map_err(translate_core_error)?;
    let persisted: PersistTransitionResult = persistence
        .persist_transition(&transition)
        .map_err(translate_persistence_error)?;

    info!(
        swap_request_id,
        assignment_id = swap.assignment_id.value(),
        answer = answer.as_str(),
        "Answered swap request"
    );

    let answered: SwapRequest = SwapRequest {
        status: answer,
        ..swap
    };
    Ok(SwapWriteResponse {
        message: format!("Swap request {swap_request_id} is now {answer}"),
        swap: swap_response(&answered),
        event_id: persisted.event_id,
    })
}

/// Lists the swap requests the acting staff member sent or received.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_swaps(
    persistence: &mut Persistence,
    principal: &Principal,
) -> Result<ListSwapsResponse, ApiError> {
    let swaps: StaffSwaps = persistence
        .list_swaps_for_staff(principal.organization_id, principal.staff_id)
        .map_err(translate_persistence_error)?;
    Ok(ListSwapsResponse {
        inbound: swaps.inbound.iter().map(swap_response).collect(),
        outbound: swaps.outbound.iter().map(swap_response).collect(),
    })
}

// ============================================================================
// Rota
// ============================================================================

/// Builds the rota for `from..=to`, one entry per date.
///
/// # Errors
///
/// Returns an error if the principal may not view the schedule, or the range
/// is inverted or longer than the maximum.
pub fn build_rota(
    persistence: &mut Persistence,
    principal: &Principal,
    query: &DateRangeQuery,
) -> Result<RotaResponse, ApiError> {
    let (from, to, timezone, days): (Date, Date, SiteTimezone, Vec<RotaDay>) =
        load_rota(persistence, principal, query)?;

    Ok(RotaResponse {
        from: from.to_string(),
        to: to.to_string(),
        timezone: timezone.name().to_string(),
        days: days
            .iter()
            .map(|day| RotaDayResponse {
                date: day.date.to_string(),
                entries: day.entries.iter().map(rota_entry_response).collect(),
            })
            .collect(),
    })
}

/// Renders the rota for `from..=to` as CSV.
///
/// # Errors
///
/// Returns an error under the same conditions as [`build_rota`], or if
/// rendering fails.
pub fn export_rota_csv(
    persistence: &mut Persistence,
    principal: &Principal,
    query: &DateRangeQuery,
) -> Result<String, ApiError> {
    let (_, _, timezone, days): (Date, Date, SiteTimezone, Vec<RotaDay>) =
        load_rota(persistence, principal, query)?;
    render_rota_csv(&days, &timezone)
}

fn load_rota(
    persistence: &mut Persistence,
    principal: &Principal,
    query: &DateRangeQuery,
) -> Result<(Date, Date, SiteTimezone, Vec<RotaDay>), ApiError> {
    principal
        .require(Permission::ViewSchedule, "build_rota")
        .map_err(translate_core_error)?;

    let (from, to): (Date, Date) = parse_date_range(query)?;
    rota_day_count(from, to).map_err(translate_domain_error)?;

    let timezone: SiteTimezone = persistence
        .organization_timezone(principal.organization_id)
        .map_err(translate_persistence_error)?;
    let (start, end): (OffsetDateTime, OffsetDateTime) = timezone
        .date_range_bounds(from, to)
        .map_err(translate_domain_error)?;
    let entries: Vec<RotaEntry> = persistence
        .list_rota_entries(principal.organization_id, start, end, None)
        .map_err(translate_persistence_error)?;

    let days: Vec<RotaDay> =
        build_rota_days(from, to, &timezone, entries).map_err(translate_domain_error)?;
    Ok((from, to, timezone, days))
}

// ============================================================================
// Schedule Events
// ============================================================================

/// Lists schedule events after a cursor.
///
/// Principals who may read events see the whole organization's outbox;
/// everyone else sees only events addressed to them.
///
/// # Errors
///
/// Returns an error if the limit is out of range or the query fails.
pub fn list_events(
    persistence: &mut Persistence,
    principal: &Principal,
    query: ListEventsQuery,
) -> Result<ListEventsResponse, ApiError> {
    let limit: i64 = query.limit.unwrap_or(DEFAULT_EVENT_LIMIT);
    if !(1..=MAX_EVENT_LIMIT).contains(&limit) {
        return Err(ApiError::InvalidArgument {
            field: String::from("limit"),
            message: format!("limit must be between 1 and {MAX_EVENT_LIMIT}"),
        });
    }
    let after: i64 = query.after.unwrap_or(0).max(0);
    let recipient: Option<StaffId> = if principal.can(Permission::ReadEvents) {
        None
    } else {
        Some(principal.staff_id)
    };

    let events: Vec<ScheduleEvent> = persistence
        .list_events(principal.organization_id, recipient, after, limit)
        .map_err(translate_persistence_error)?;

    Ok(ListEventsResponse {
        next_after: events.last().and_then(|event| event.event_id),
        events: events.iter().map(event_response).collect(),
    })
}

// ============================================================================
// Collaborator Sync
// ============================================================================

/// Replaces a staff member's directory entry and availability facts.
///
/// # Errors
///
/// Returns an error if the principal may not sync availability, a field is
/// invalid, or the write fails.
pub fn sync_staff(
    persistence: &mut Persistence,
    principal: &Principal,
    staff_id: i64,
    request: &SyncStaffRequest,
) -> Result<WriteResponse, ApiError> {
    principal
        .require(Permission::SyncAvailability, "sync_staff")
        .map_err(translate_core_error)?;

    let display_name: &str = request.display_name.trim();
    if display_name.is_empty() {
        return Err(ApiError::InvalidArgument {
            field: String::from("display_name"),
            message: String::from("display name must not be empty"),
        });
    }

    let windows: Vec<AvailabilityWindow> = request
        .windows
        .iter()
        .map(parse_window)
        .collect::<Result<_, _>>()?;
    let blocked_dates: HashSet<Date> = request
        .blocked_dates
        .iter()
        .map(|date| parse_date(date).map_err(translate_domain_error))
        .collect::<Result<_, _>>()?;
    let availability: StaffAvailability = StaffAvailability {
        windows,
        preferred_groups: request
            .preferred_groups
            .iter()
            .copied()
            .map(GroupId::new)
            .collect(),
        blocked_dates,
    };

    persistence
        .sync_staff(
            principal.organization_id,
            StaffId::new(staff_id),
            display_name,
            &availability,
        )
        .map_err(translate_persistence_error)?;

    info!(
        staff_id,
        organization_id = principal.organization_id.value(),
        windows = availability.windows.len(),
        "Synced staff availability"
    );

    Ok(WriteResponse {
        success: true,
        message: Some(format!("Synced availability for staff {staff_id}")),
        event_id: None,
    })
}

/// Sets the organization's site name and timezone.
///
/// # Errors
///
/// Returns an error if the principal may not sync availability, the name is
/// empty, the timezone is unknown, or the write fails.
pub fn sync_organization(
    persistence: &mut Persistence,
    principal: &Principal,
    request: &SyncOrganizationRequest,
) -> Result<OrganizationResponse, ApiError> {
    principal
        .require(Permission::SyncAvailability, "sync_organization")
        .map_err(translate_core_error)?;

    let name: &str = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::InvalidArgument {
            field: String::from("name"),
            message: String::from("organization name must not be empty"),
        });
    }
    let timezone: SiteTimezone =
        SiteTimezone::parse(request.timezone.trim()).map_err(translate_domain_error)?;

    persistence
        .upsert_organization(principal.organization_id, name, &timezone)
        .map_err(translate_persistence_error)?;

    info!(
        organization_id = principal.organization_id.value(),
        timezone = timezone.name(),
        "Synced organization"
    );

    Ok(OrganizationResponse {
        organization_id: principal.organization_id.value(),
        name: name.to_string(),
        timezone: timezone.name().to_string(),
    })
}

// ============================================================================
// Translation helpers
// ============================================================================

fn parse_schedule(request: &BulkScheduleRequest) -> Result<RecurringSchedule, ApiError> {
    let group_ids: Vec<GroupId> = request.group_ids.iter().copied().map(GroupId::new).collect();
    let start_date: Date = parse_date(&request.start_date).map_err(translate_domain_error)?;
    let end_date: Date = parse_date(&request.end_date).map_err(translate_domain_error)?;
    let days_of_week: WeekdaySet =
        WeekdaySet::parse_symbols(&request.days_of_week).map_err(translate_domain_error)?;
    let start_time: Time = parse_time_of_day(&request.start_time).map_err(translate_domain_error)?;
    let end_time: Time = parse_time_of_day(&request.end_time).map_err(translate_domain_error)?;

    RecurringSchedule::new(
        &group_ids,
        start_date,
        end_date,
        days_of_week,
        start_time,
        end_time,
        request.title_prefix.as_deref(),
    )
    .map_err(translate_domain_error)
}

fn parse_date_range(query: &DateRangeQuery) -> Result<(Date, Date), ApiError> {
    let from: Date = parse_date(&query.from).map_err(translate_domain_error)?;
    let to: Date = parse_date(&query.to).map_err(translate_domain_error)?;
    Ok((from, to))
}

fn parse_window(window: &AvailabilityWindowRequest) -> Result<AvailabilityWindow, ApiError> {
    match window {
        AvailabilityWindowRequest::Absolute { start, end } => AvailabilityWindow::absolute(
            parse_instant(start).map_err(translate_domain_error)?,
            parse_instant(end).map_err(translate_domain_error)?,
        )
        .map_err(translate_domain_error),
        AvailabilityWindowRequest::Recurring {
            weekday,
            start_time,
            end_time,
        } => {
            let weekday: Option<Weekday> = weekday
                .as_ref()
                .map(|symbol| WeekdaySet::parse_symbols(&[symbol]))
                .transpose()
                .map_err(translate_domain_error)?
                .and_then(|set| set.weekdays().first().copied());
            AvailabilityWindow::recurring(
                weekday,
                parse_time_of_day(start_time).map_err(translate_domain_error)?,
                parse_time_of_day(end_time).map_err(translate_domain_error)?,
            )
            .map_err(translate_domain_error)
        }
    }
}

/// Deduplicates staff ids, keeping first occurrence order.
fn unique_staff(ids: &[i64]) -> Vec<StaffId> {
    let mut seen: HashSet<i64> = HashSet::with_capacity(ids.len());
    ids.iter()
        .filter(|id| seen.insert(**id))
        .map(|id| StaffId::new(*id))
        .collect()
}

fn pre_assignment_report(batch: PreAssignmentBatch) -> PreAssignmentReport {
    PreAssignmentReport {
        succeeded: batch.succeeded,
        failed: batch
            .failed
            .into_iter()
            .map(|failure| {
                let (session_id, staff_id): (SessionId, StaffId) = failure.input;
                PreAssignmentFailure {
                    session_id: session_id.value(),
                    staff_id: staff_id.value(),
                    kind: failure.reason.kind().to_string(),
                    message: failure.reason.to_string(),
                }
            })
            .collect(),
    }
}

fn session_response(session: &Session, session_id: SessionId) -> SessionResponse {
    SessionResponse {
        session_id: session_id.value(),
        title: session.title().to_string(),
        start: format_instant(session.start()),
        end: format_instant(session.end()),
        group_ids: session.group_ids().iter().map(|g| g.value()).collect(),
    }
}

fn assignment_response(assignment: &Assignment) -> AssignmentResponse {
    AssignmentResponse {
        assignment_id: assignment.assignment_id.value(),
        session_id: assignment.session_id.value(),
        staff_id: assignment.staff_id.value(),
        role: assignment.role.clone(),
        status: assignment.status.as_str().to_string(),
    }
}

fn rota_entry_response(entry: &RotaEntry) -> RotaEntryResponse {
    RotaEntryResponse {
        assignment_id: entry.assignment.assignment_id.value(),
        session_id: entry.assignment.session_id.value(),
        session_title: entry.session_title.clone(),
        session_start: format_instant(entry.session_start),
        session_end: format_instant(entry.session_end),
        staff_id: entry.assignment.staff_id.value(),
        staff_display_name: entry.staff_display_name.clone(),
        role: entry.assignment.role.clone(),
        status: entry.assignment.status.as_str().to_string(),
    }
}

fn swap_response(swap: &SwapRequest) -> SwapResponse {
    SwapResponse {
        swap_request_id: swap.swap_request_id.value(),
        assignment_id: swap.assignment_id.value(),
        from_staff_id: swap.from_staff_id.value(),
        to_staff_id: swap.to_staff_id.value(),
        status: swap.status.as_str().to_string(),
    }
}

fn eligibility_entry(result: &EligibilityResult) -> EligibilityEntry {
    EligibilityEntry {
        staff_id: result.staff_id.value(),
        eligible: result.eligible,
        reason: result.reason.map(|reason| reason.as_str().to_string()),
    }
}

fn event_response(event: &ScheduleEvent) -> ScheduleEventResponse {
    ScheduleEventResponse {
        event_id: event.event_id,
        kind: event.kind.as_str().to_string(),
        actor_id: event.actor.id.clone(),
        actor_type: event.actor.actor_type.clone(),
        cause_id: event.cause.id.clone(),
        cause_description: event.cause.description.clone(),
        recipient_staff_id: event.recipient.map(StaffId::value),
        entity_type: event.entity.map(|e| e.entity_type().to_string()),
        entity_id: event.entity.map(|e| e.entity_id()),
        details: event.details.clone(),
        created_at: event.created_at.map(format_instant),
    }
}
