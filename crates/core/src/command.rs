// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use rotaplan_domain::{
    Assignment, AssignmentId, AssignmentStatus, OrganizationId, Session, SessionDraft, SessionId,
    StaffId, SwapRequest, SwapRequestId,
};

/// A command represents user or system intent as data only.
///
/// Commands carry the current state of the entities they touch, as read by
/// the caller. `apply` decides against that state; the store re-checks it
/// with optimistic guards when the change is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create one session directly.
    CreateSession {
        /// The unpersisted session.
        session: Session,
    },
    /// Persist the sessions produced by expanding a recurring schedule.
    ScheduleSessions {
        /// The drafts to persist, in expansion order.
        drafts: Vec<SessionDraft>,
    },
    /// Offer a session to a staff member.
    CreateAssignment {
        /// The persisted session being covered.
        session: Session,
        /// The staff member being offered the session.
        staff_id: StaffId,
        /// Free-form role label.
        role: String,
        /// `Pending`, or `Confirmed` for immediate self-assignment.
        initial_status: AssignmentStatus,
    },
    /// Move an assignment to a new status.
    TransitionAssignment {
        /// The assignment as currently stored.
        assignment: Assignment,
        /// The requested status.
        new_status: AssignmentStatus,
    },
    /// Remove an assignment at any status.
    DeleteAssignment {
        /// The assignment as currently stored.
        assignment: Assignment,
    },
    /// Offer an assignment to a named peer.
    RequestSwap {
        /// The assignment as currently stored.
        assignment: Assignment,
        /// The proposed new holder.
        to_staff_id: StaffId,
    },
    /// Accept a swap request.
    AcceptSwap {
        /// The swap request as currently stored.
        swap: SwapRequest,
    },
    /// Decline a swap request.
    DeclineSwap {
        /// The swap request as currently stored.
        swap: SwapRequest,
    },
}

impl Command {
    /// Returns the action name used in authorization errors and logs.
    #[must_use]
    pub const fn action_name(&self) -> &'static str {
        match self {
            Self::CreateSession { .. } => "create_session",
            Self::ScheduleSessions { .. } => "schedule_sessions",
            Self::CreateAssignment { .. } => "create_assignment",
            Self::TransitionAssignment { .. } => "transition_assignment",
            Self::DeleteAssignment { .. } => "delete_assignment",
            Self::RequestSwap { .. } => "request_swap",
            Self::AcceptSwap { .. } => "accept_swap",
            Self::DeclineSwap { .. } => "decline_swap",
        }
    }
}

/// The storage change a command resolves to.
///
/// Every guarded change names the state it expects to find, so two racing
/// writers cannot both succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// Insert one session.
    InsertSession {
        /// The session to insert.
        session: Session,
    },
    /// Insert many sessions in one transaction.
    InsertSessions {
        /// The owning organization.
        organization_id: OrganizationId,
        /// The drafts to insert.
        drafts: Vec<SessionDraft>,
    },
    /// Insert an assignment. Fails on an existing `(session, staff)` pair.
    InsertAssignment {
        /// The session id.
        session_id: SessionId,
        /// The staff member.
        staff_id: StaffId,
        /// The validated role.
        role: String,
        /// The initial status.
        status: AssignmentStatus,
    },
    /// Update an assignment's status if it still has `expected`.
    UpdateAssignmentStatus {
        /// The assignment.
        assignment_id: AssignmentId,
        /// The status the assignment must still have.
        expected: AssignmentStatus,
        /// The new status.
        new_status: AssignmentStatus,
    },
    /// Delete an assignment and any swap requests on it.
    DeleteAssignment {
        /// The assignment.
        assignment_id: AssignmentId,
    },
    /// Insert a `REQUESTED` swap. Fails if one is already outstanding.
    InsertSwap {
        /// The assignment offered.
        assignment_id: AssignmentId,
        /// The current holder.
        from_staff_id: StaffId,
        /// The proposed holder.
        to_staff_id: StaffId,
    },
    /// Mark a swap `ACCEPTED` and move the assignment, if both are unchanged.
    AcceptSwap {
        /// The swap request.
        swap_request_id: SwapRequestId,
        /// The assignment to move.
        assignment_id: AssignmentId,
        /// The holder the assignment must still have.
        from_staff_id: StaffId,
        /// The new holder.
        to_staff_id: StaffId,
    },
    /// Mark a swap `DECLINED` if it is still `REQUESTED`.
    DeclineSwap {
        /// The swap request.
        swap_request_id: SwapRequestId,
    },
}
