// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Swap request mutations.
//!
//! ## Invariants
//!
//! - At most one `REQUESTED` swap exists per assignment (partial unique index)
//! - Accepting a swap moves the assignment only if the sender still holds it
//! - The status change and the reassignment commit together or not at all

use diesel::prelude::*;
use diesel::SqliteConnection;
use rotaplan_domain::{AssignmentId, AssignmentStatus, StaffId, SwapRequestId, SwapStatus};
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::diesel_schema::{assignments, swap_requests};
use crate::error::PersistenceError;
use crate::queries::assignments::find_assignment;
use crate::queries::swaps::find_swap;

/// Records a new outstanding swap request.
///
/// # Errors
///
/// Returns `PersistenceError::HolderChanged` if `from_staff_id` no longer
/// holds the assignment, or `PersistenceError::UniqueViolation` if another
/// request on the assignment is still outstanding.
pub fn insert_swap(
    conn: &mut SqliteConnection,
    assignment_id: AssignmentId,
    from_staff_id: StaffId,
    to_staff_id: StaffId,
    now: &str,
) -> Result<SwapRequestId, PersistenceError> {
    require_holder(conn, assignment_id, from_staff_id)?;

    diesel::insert_into(swap_requests::table)
        .values((
            swap_requests::assignment_id.eq(assignment_id.value()),
            swap_requests::from_staff_id.eq(from_staff_id.value()),
            swap_requests::to_staff_id.eq(to_staff_id.value()),
            swap_requests::status.eq(SwapStatus::Requested.as_str()),
            swap_requests::created_at.eq(now),
            swap_requests::updated_at.eq(now),
        ))
        .execute(conn)?;

    let swap_request_id: i64 = conn.get_last_insert_rowid()?;
    info!(
        swap_request_id,
        assignment_id = assignment_id.value(),
        "Swap requested"
    );
    Ok(SwapRequestId::new(swap_request_id))
}

/// Accepts a swap and hands the assignment to its recipient as `pending`.
///
/// The caller must run this inside a transaction so a failed reassignment
/// rolls back the status change.
///
/// # Errors
///
/// Returns `PersistenceError::StatusChanged` if the request was already
/// answered or the assignment has since been declined,
/// `PersistenceError::HolderChanged` if the sender no longer holds the
/// assignment, or `PersistenceError::UniqueViolation` if the recipient
/// already holds an assignment on the same session.
pub fn accept_swap(
    conn: &mut SqliteConnection,
    swap_request_id: SwapRequestId,
    assignment_id: AssignmentId,
    from_staff_id: StaffId,
    to_staff_id: StaffId,
    now: &str,
) -> Result<(), PersistenceError> {
    answer_swap(conn, swap_request_id, SwapStatus::Accepted, now)?;

    let moved: usize = diesel::update(
        assignments::table
            .filter(assignments::assignment_id.eq(assignment_id.value()))
            .filter(assignments::staff_id.eq(from_staff_id.value()))
            .filter(assignments::status.ne(AssignmentStatus::Declined.as_str())),
    )
    .set((
        assignments::staff_id.eq(to_staff_id.value()),
        assignments::status.eq(AssignmentStatus::Pending.as_str()),
        assignments::updated_at.eq(now),
    ))
    .execute(conn)?;

    if moved == 0 {
        return Err(match find_assignment(conn, assignment_id)? {
            None => PersistenceError::NotFound(format!("Assignment {assignment_id}")),
            Some(current) if current.staff_id != from_staff_id => {
                PersistenceError::HolderChanged {
                    assignment_id: assignment_id.value(),
                    expected_staff_id: from_staff_id.value(),
                }
            }
            Some(current) => PersistenceError::StatusChanged {
                entity: String::from("Assignment"),
                id: assignment_id.value(),
                expected: String::from("pending or confirmed"),
                actual: current.status.as_str().to_string(),
            },
        });
    }

    info!(
        swap_request_id = swap_request_id.value(),
        assignment_id = assignment_id.value(),
        to_staff_id = to_staff_id.value(),
        "Swap accepted"
    );
    Ok(())
}

/// Declines a swap. The assignment is untouched.
///
/// # Errors
///
/// Returns `PersistenceError::StatusChanged` if the request was already answered.
pub fn decline_swap(
    conn: &mut SqliteConnection,
    swap_request_id: SwapRequestId,
    now: &str,
) -> Result<(), PersistenceError> {
    answer_swap(conn, swap_request_id, SwapStatus::Declined, now)?;
    info!(swap_request_id = swap_request_id.value(), "Swap declined");
    Ok(())
}

fn answer_swap(
    conn: &mut SqliteConnection,
    swap_request_id: SwapRequestId,
    answer: SwapStatus,
    now: &str,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(
        swap_requests::table
            .filter(swap_requests::swap_request_id.eq(swap_request_id.value()))
            .filter(swap_requests::status.eq(SwapStatus::Requested.as_str())),
    )
    .set((
        swap_requests::status.eq(answer.as_str()),
        swap_requests::updated_at.eq(now),
    ))
    .execute(conn)?;

    if updated == 0 {
        return Err(match find_swap(conn, swap_request_id)? {
            None => PersistenceError::NotFound(format!("Swap request {swap_request_id}")),
            Some(current) => PersistenceError::StatusChanged {
                entity: String::from("Swap request"),
                id: swap_request_id.value(),
                expected: SwapStatus::Requested.as_str().to_string(),
                actual: current.status.as_str().to_string(),
            },
        });
    }
    Ok(())
}

fn require_holder(
    conn: &mut SqliteConnection,
    assignment_id: AssignmentId,
    staff_id: StaffId,
) -> Result<(), PersistenceError> {
    match find_assignment(conn, assignment_id)? {
        None => Err(PersistenceError::NotFound(format!(
            "Assignment {assignment_id}"
        ))),
        Some(current) if current.staff_id != staff_id => Err(PersistenceError::HolderChanged {
            assignment_id: assignment_id.value(),
            expected_staff_id: staff_id.value(),
        }),
        Some(_) => Ok(()),
    }
}
