// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Assignment mutations.
//!
//! Status changes are guarded: the `UPDATE` only matches a row still in the
//! status the decision was made against. A miss is re-read to tell a deleted
//! row apart from a concurrent change.

use diesel::prelude::*;
use diesel::SqliteConnection;
use rotaplan_domain::{AssignmentId, AssignmentStatus, SessionId, StaffId};
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::diesel_schema::assignments;
use crate::error::PersistenceError;
use crate::queries::assignments::find_assignment;

/// Inserts an assignment.
///
/// # Errors
///
/// Returns `PersistenceError::UniqueViolation` if the staff member already
/// holds an assignment on the session.
pub fn insert_assignment(
    conn: &mut SqliteConnection,
    session_id: SessionId,
    staff_id: StaffId,
    role: &str,
    status: AssignmentStatus,
    now: &str,
) -> Result<AssignmentId, PersistenceError> {
    diesel::insert_into(assignments::table)
        .values((
            assignments::session_id.eq(session_id.value()),
            assignments::staff_id.eq(staff_id.value()),
            assignments::role.eq(role),
            assignments::status.eq(status.as_str()),
            assignments::created_at.eq(now),
            assignments::updated_at.eq(now),
        ))
        .execute(conn)
        .map_err(|e| match PersistenceError::from(e) {
            PersistenceError::ForeignKeyViolation(_) => {
                PersistenceError::NotFound(format!("Session {session_id}"))
            }
            other => other,
        })?;

    let assignment_id: i64 = conn.get_last_insert_rowid()?;
    info!(
        assignment_id,
        session_id = session_id.value(),
        staff_id = staff_id.value(),
        "Assignment created"
    );
    Ok(AssignmentId::new(assignment_id))
}

/// Moves an assignment from `expected` to `new_status`.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the assignment is gone, or
/// `PersistenceError::StatusChanged` if its status is no longer `expected`.
pub fn update_assignment_status(
    conn: &mut SqliteConnection,
    assignment_id: AssignmentId,
    expected: AssignmentStatus,
    new_status: AssignmentStatus,
    now: &str,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(
        assignments::table
            .filter(assignments::assignment_id.eq(assignment_id.value()))
            .filter(assignments::status.eq(expected.as_str())),
    )
    .set((
        assignments::status.eq(new_status.as_str()),
        assignments::updated_at.eq(now),
    ))
    .execute(conn)?;

    if updated == 0 {
        return Err(match find_assignment(conn, assignment_id)? {
            None => PersistenceError::NotFound(format!("Assignment {assignment_id}")),
            Some(current) => PersistenceError::StatusChanged {
                entity: String::from("Assignment"),
                id: assignment_id.value(),
                expected: expected.as_str().to_string(),
                actual: current.status.as_str().to_string(),
            },
        });
    }

    debug!(
        assignment_id = assignment_id.value(),
        status = new_status.as_str(),
        "Assignment status updated"
    );
    Ok(())
}

/// Deletes an assignment; its swap requests go with it.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the assignment is already gone.
pub fn delete_assignment(
    conn: &mut SqliteConnection,
    assignment_id: AssignmentId,
) -> Result<(), PersistenceError> {
    let deleted: usize = diesel::delete(
        assignments::table.filter(assignments::assignment_id.eq(assignment_id.value())),
    )
    .execute(conn)?;

    if deleted == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Assignment {assignment_id}"
        )));
    }

    info!(assignment_id = assignment_id.value(), "Assignment deleted");
    Ok(())
}
