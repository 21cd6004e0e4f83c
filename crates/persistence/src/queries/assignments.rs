// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::SqliteConnection;
use rotaplan_domain::{
    Assignment, AssignmentId, AssignmentStatus, OrganizationId, RotaEntry, SessionId, StaffId,
    format_instant, parse_instant,
};
use time::OffsetDateTime;

use crate::data_models::AssignmentRow;
use crate::diesel_schema::{assignments, sessions, staff_directory};
use crate::error::PersistenceError;

/// An assignment joined with its session and the holder's display name.
type RotaEntryRow = (
    i64,
    i64,
    i64,
    String,
    String,
    String,
    String,
    String,
    Option<String>,
);

/// Retrieves an assignment whose session belongs to the organization.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the assignment does not exist in
/// the organization, or an error if the query fails.
pub fn get_assignment(
    conn: &mut SqliteConnection,
    organization_id: OrganizationId,
    assignment_id: AssignmentId,
) -> Result<Assignment, PersistenceError> {
    assignments::table
        .inner_join(sessions::table)
        .filter(assignments::assignment_id.eq(assignment_id.value()))
        .filter(sessions::organization_id.eq(organization_id.value()))
        .select(AssignmentRow::as_select())
        .first::<AssignmentRow>(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::NotFound(format!("Assignment {assignment_id}")))?
        .into_assignment()
}

/// Reads an assignment without organization scoping.
///
/// Used inside write transactions to explain why a guarded update matched
/// no rows.
pub(crate) fn find_assignment(
    conn: &mut SqliteConnection,
    assignment_id: AssignmentId,
) -> Result<Option<Assignment>, PersistenceError> {
    assignments::table
        .filter(assignments::assignment_id.eq(assignment_id.value()))
        .select(AssignmentRow::as_select())
        .first::<AssignmentRow>(conn)
        .optional()?
        .map(AssignmentRow::into_assignment)
        .transpose()
}

/// Lists the organization's assignments whose session starts in `[from, to)`.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `organization_id` - The owning organization
/// * `from` - Inclusive lower bound on session start
/// * `to` - Exclusive upper bound on session start
/// * `session_id` - Restricts the listing to one session when set
///
/// # Errors
///
/// Returns an error if the query fails or a stored row is malformed.
pub fn list_rota_entries(
    conn: &mut SqliteConnection,
    organization_id: OrganizationId,
    from: OffsetDateTime,
    to: OffsetDateTime,
    session_id: Option<SessionId>,
) -> Result<Vec<RotaEntry>, PersistenceError> {
    let mut query = assignments::table
        .inner_join(sessions::table)
        .left_join(staff_directory::table)
        .filter(sessions::organization_id.eq(organization_id.value()))
        .filter(sessions::starts_at.ge(format_instant(from)))
        .filter(sessions::starts_at.lt(format_instant(to)))
        .select((
            assignments::assignment_id,
            assignments::session_id,
            assignments::staff_id,
            assignments::role,
            assignments::status,
            sessions::title,
            sessions::starts_at,
            sessions::ends_at,
            staff_directory::display_name.nullable(),
        ))
        .order((sessions::starts_at.asc(), assignments::assignment_id.asc()))
        .into_boxed();

    if let Some(session_id) = session_id {
        query = query.filter(assignments::session_id.eq(session_id.value()));
    }

    let rows: Vec<RotaEntryRow> = query.load(conn)?;
    rows.into_iter().map(rota_entry_from_row).collect()
}

/// Lists one staff member's assignments whose session starts in `[from, to)`.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row is malformed.
pub fn list_rota_entries_for_staff(
    conn: &mut SqliteConnection,
    organization_id: OrganizationId,
    staff_id: StaffId,
    from: OffsetDateTime,
    to: OffsetDateTime,
) -> Result<Vec<RotaEntry>, PersistenceError> {
    let rows: Vec<RotaEntryRow> = assignments::table
        .inner_join(sessions::table)
        .left_join(staff_directory::table)
        .filter(sessions::organization_id.eq(organization_id.value()))
        .filter(assignments::staff_id.eq(staff_id.value()))
        .filter(sessions::starts_at.ge(format_instant(from)))
        .filter(sessions::starts_at.lt(format_instant(to)))
        .select((
            assignments::assignment_id,
            assignments::session_id,
            assignments::staff_id,
            assignments::role,
            assignments::status,
            sessions::title,
            sessions::starts_at,
            sessions::ends_at,
            staff_directory::display_name.nullable(),
        ))
        .order((sessions::starts_at.asc(), assignments::assignment_id.asc()))
        .load(conn)?;
    rows.into_iter().map(rota_entry_from_row).collect()
}

fn rota_entry_from_row(row: RotaEntryRow) -> Result<RotaEntry, PersistenceError> {
    let (assignment_id, session_id, staff_id, role, status, title, starts_at, ends_at, name) =
        row;
    Ok(RotaEntry {
        assignment: Assignment {
            assignment_id: AssignmentId::new(assignment_id),
            session_id: SessionId::new(session_id),
            staff_id: StaffId::new(staff_id),
            role,
            status: status.parse::<AssignmentStatus>()?,
        },
        session_title: title,
        session_start: parse_instant(&starts_at)?,
        session_end: parse_instant(&ends_at)?,
        staff_display_name: name.unwrap_or_else(|| format!("Staff {staff_id}")),
    })
}
