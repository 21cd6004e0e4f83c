// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::{Change, Command};
use crate::error::CoreError;
use crate::principal::{Permission, Principal};
use rotaplan_audit::{Cause, EntityRef, EventKind, ScheduleEvent};
use rotaplan_domain::{
    Assignment, AssignmentStatus, DomainError, SessionDraft, SessionId, StaffId, SwapRequest,
    SwapStatus, validate_role,
};

/// The result of a successful decision.
///
/// Nothing has been written yet: the caller applies `change` and records
/// `event` in the same transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The storage change to perform.
    pub change: Change,
    /// The schedule event recording this change.
    pub event: ScheduleEvent,
}

/// Applies a command on behalf of a principal, producing a change and event.
///
/// # Arguments
///
/// * `principal` - The acting identity and its permissions
/// * `command` - The command to apply, carrying the current entity state
/// * `cause` - The cause or reason for this action
///
/// # Returns
///
/// * `Ok(TransitionResult)` containing the change to write and its event
/// * `Err(CoreError)` if the command is not permitted or invalid
///
/// # Errors
///
/// Returns an error if:
/// - The principal lacks the permission or is not the party the action requires
/// - The target entity belongs to another organization
/// - The command violates a lifecycle or validation rule
#[allow(clippy::too_many_lines)]
pub fn apply(
    principal: &Principal,
    command: Command,
    cause: Cause,
) -> Result<TransitionResult, CoreError> {
    let action: &'static str = command.action_name();

    match command {
        Command::CreateSession { session } => {
            principal.require(Permission::ManageSessions, action)?;
            if session.organization_id() != principal.organization_id {
                return Err(CoreError::Forbidden {
                    action: action.to_string(),
                    reason: String::from("cannot create sessions for another organization"),
                });
            }

            let details: String = format!(
                "Created session '{}' ({} to {})",
                session.title(),
                session.start(),
                session.end()
            );
            let event: ScheduleEvent =
                new_event(principal, cause, EventKind::SessionsScheduled, None, None, details);

            Ok(TransitionResult {
                change: Change::InsertSession { session },
                event,
            })
        }
        Command::ScheduleSessions { drafts } => {
            principal.require(Permission::ManageSessions, action)?;

            let details: String = describe_schedule(&drafts);
            let event: ScheduleEvent =
                new_event(principal, cause, EventKind::SessionsScheduled, None, None, details);

            Ok(TransitionResult {
                change: Change::InsertSessions {
                    organization_id: principal.organization_id,
                    drafts,
                },
                event,
            })
        }
        Command::CreateAssignment {
            session,
            staff_id,
            role,
            initial_status,
        } => {
            principal.require(Permission::ManageAssignments, action)?;

            let session_id: SessionId = match session.session_id() {
                Some(id) if session.organization_id() == principal.organization_id => id,
                Some(id) => {
                    return Err(CoreError::NotFound {
                        resource: String::from("Session"),
                        id: id.value(),
                    });
                }
                None => {
                    return Err(CoreError::NotFound {
                        resource: String::from("Session"),
                        id: 0,
                    });
                }
            };

            let role: String = validate_role(&role)?;

            match initial_status {
                AssignmentStatus::Pending => {}
                AssignmentStatus::Confirmed if staff_id == principal.staff_id => {}
                other => {
                    return Err(CoreError::DomainViolation(
                        DomainError::InvalidInitialStatus(other),
                    ));
                }
            }

            let details: String = format!(
                "Offered '{}' on session {} ({}) as {}",
                session.title(),
                session_id,
                role,
                initial_status
            );
            let event: ScheduleEvent = new_event(
                principal,
                cause,
                EventKind::AssignmentOffered,
                Some(staff_id),
                None,
                details,
            );

            Ok(TransitionResult {
                change: Change::InsertAssignment {
                    session_id,
                    staff_id,
                    role,
                    status: initial_status,
                },
                event,
            })
        }
        Command::TransitionAssignment {
            assignment,
            new_status,
        } => {
            require_holder_or(principal, &assignment, Permission::ManageAssignments, action)?;

            let new_status: AssignmentStatus = assignment.status.transition_to(new_status)?;
            let kind: EventKind = if new_status == AssignmentStatus::Confirmed {
                EventKind::AssignmentConfirmed
            } else {
                EventKind::AssignmentDeclined
            };

            let details: String = format!(
                "Assignment {} moved from {} to {}",
                assignment.assignment_id, assignment.status, new_status
            );
            let event: ScheduleEvent = new_event(
                principal,
                cause,
                kind,
                Some(assignment.staff_id),
                Some(EntityRef::Assignment(assignment.assignment_id)),
                details,
            );

            Ok(TransitionResult {
                change: Change::UpdateAssignmentStatus {
                    assignment_id: assignment.assignment_id,
                    expected: assignment.status,
                    new_status,
                },
                event,
            })
        }
        Command::DeleteAssignment { assignment } => {
            principal.require(Permission::ManageAssignments, action)?;

            let details: String = format!(
                "Removed assignment {} (session {}, was {})",
                assignment.assignment_id, assignment.session_id, assignment.status
            );
            let event: ScheduleEvent = new_event(
                principal,
                cause,
                EventKind::AssignmentRemoved,
                Some(assignment.staff_id),
                Some(EntityRef::Assignment(assignment.assignment_id)),
                details,
            );

            Ok(TransitionResult {
                change: Change::DeleteAssignment {
                    assignment_id: assignment.assignment_id,
                },
                event,
            })
        }
        Command::RequestSwap {
            assignment,
            to_staff_id,
        } => {
            if assignment.staff_id != principal.staff_id {
                return Err(CoreError::Forbidden {
                    action: action.to_string(),
                    reason: String::from("only the current holder may offer an assignment"),
                });
            }
            if to_staff_id == assignment.staff_id {
                return Err(CoreError::DomainViolation(DomainError::SwapWithSelf {
                    staff_id: to_staff_id,
                }));
            }
            if assignment.status == AssignmentStatus::Declined {
                return Err(CoreError::DomainViolation(
                    DomainError::SwapOfDeclinedAssignment {
                        assignment_id: assignment.assignment_id,
                    },
                ));
            }

            let details: String = format!(
                "Staff {} offered assignment {} to staff {}",
                assignment.staff_id, assignment.assignment_id, to_staff_id
            );
            let event: ScheduleEvent = new_event(
                principal,
                cause,
                EventKind::SwapRequested,
                Some(to_staff_id),
                None,
                details,
            );

            Ok(TransitionResult {
                change: Change::InsertSwap {
                    assignment_id: assignment.assignment_id,
                    from_staff_id: assignment.staff_id,
                    to_staff_id,
                },
                event,
            })
        }
        Command::AcceptSwap { swap } => {
            require_recipient(principal, &swap, action)?;
            swap.status.transition_to(SwapStatus::Accepted)?;

            let details: String = format!(
                "Staff {} accepted assignment {} from staff {}",
                swap.to_staff_id, swap.assignment_id, swap.from_staff_id
            );
            let event: ScheduleEvent = new_event(
                principal,
                cause,
                EventKind::SwapAccepted,
                Some(swap.from_staff_id),
                Some(EntityRef::SwapRequest(swap.swap_request_id)),
                details,
            );

            Ok(TransitionResult {
                change: Change::AcceptSwap {
                    swap_request_id: swap.swap_request_id,
                    assignment_id: swap.assignment_id,
                    from_staff_id: swap.from_staff_id,
                    to_staff_id: swap.to_staff_id,
                },
                event,
            })
        }
        Command::DeclineSwap { swap } => {
            require_recipient(principal, &swap, action)?;
            swap.status.transition_to(SwapStatus::Declined)?;

            let details: String = format!(
                "Staff {} declined assignment {} from staff {}",
                swap.to_staff_id, swap.assignment_id, swap.from_staff_id
            );
            let event: ScheduleEvent = new_event(
                principal,
                cause,
                EventKind::SwapDeclined,
                Some(swap.from_staff_id),
                Some(EntityRef::SwapRequest(swap.swap_request_id)),
                details,
            );

            Ok(TransitionResult {
                change: Change::DeclineSwap {
                    swap_request_id: swap.swap_request_id,
                },
                event,
            })
        }
    }
}

fn new_event(
    principal: &Principal,
    cause: Cause,
    kind: EventKind,
    recipient: Option<StaffId>,
    entity: Option<EntityRef>,
    details: String,
) -> ScheduleEvent {
    ScheduleEvent::new(
        principal.organization_id,
        principal.to_actor(),
        cause,
        kind,
        recipient,
        entity,
        Some(details),
    )
}

/// The holder may act on their own assignment; anyone else needs `permission`.
fn require_holder_or(
    principal: &Principal,
    assignment: &Assignment,
    permission: Permission,
    action: &str,
) -> Result<(), CoreError> {
    if assignment.staff_id == principal.staff_id {
        return Ok(());
    }
    principal.require(permission, action)
}

fn require_recipient(
    principal: &Principal,
    swap: &SwapRequest,
    action: &str,
) -> Result<(), CoreError> {
    if swap.to_staff_id == principal.staff_id {
        Ok(())
    } else {
        Err(CoreError::Forbidden {
            action: action.to_string(),
            reason: String::from("only the receiving staff member may answer a swap request"),
        })
    }
}

fn describe_schedule(drafts: &[SessionDraft]) -> String {
    match (drafts.first(), drafts.last()) {
        (Some(first), Some(last)) => format!(
            "Scheduled {} sessions from {} to {}",
            drafts.len(),
            first.date,
            last.date
        ),
        _ => String::from("Scheduled 0 sessions"),
    }
}
