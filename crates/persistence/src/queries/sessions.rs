// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::HashMap;

use diesel::prelude::*;
use diesel::SqliteConnection;
use rotaplan_domain::{GroupId, OrganizationId, Session, SessionId, format_instant};
use time::OffsetDateTime;

use crate::data_models::SessionRow;
use crate::diesel_schema::{session_groups, sessions};
use crate::error::PersistenceError;

/// Retrieves a session owned by the organization.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if no such session exists in the
/// organization, or an error if the query fails.
pub fn get_session(
    conn: &mut SqliteConnection,
    organization_id: OrganizationId,
    session_id: SessionId,
) -> Result<Session, PersistenceError> {
    let row: SessionRow = sessions::table
        .filter(sessions::session_id.eq(session_id.value()))
        .filter(sessions::organization_id.eq(organization_id.value()))
        .select(SessionRow::as_select())
        .first::<SessionRow>(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::NotFound(format!("Session {session_id}")))?;

    let groups: Vec<i64> = session_groups::table
        .filter(session_groups::session_id.eq(session_id.value()))
        .order(session_groups::position.asc())
        .select(session_groups::group_id)
        .load(conn)?;

    row.into_session(groups.into_iter().map(GroupId::new).collect())
}

/// Lists sessions starting in `[from, to)`, ordered by start.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row is malformed.
pub fn list_sessions(
    conn: &mut SqliteConnection,
    organization_id: OrganizationId,
    from: OffsetDateTime,
    to: OffsetDateTime,
) -> Result<Vec<Session>, PersistenceError> {
    let rows: Vec<SessionRow> = sessions::table
        .filter(sessions::organization_id.eq(organization_id.value()))
        .filter(sessions::starts_at.ge(format_instant(from)))
        .filter(sessions::starts_at.lt(format_instant(to)))
        .order((sessions::starts_at.asc(), sessions::session_id.asc()))
        .select(SessionRow::as_select())
        .load(conn)?;

    let ids: Vec<i64> = rows.iter().map(|r| r.session_id).collect();
    let group_rows: Vec<(i64, i64)> = session_groups::table
        .filter(session_groups::session_id.eq_any(&ids))
        .order((session_groups::session_id.asc(), session_groups::position.asc()))
        .select((session_groups::session_id, session_groups::group_id))
        .load(conn)?;

    let mut groups: HashMap<i64, Vec<GroupId>> = HashMap::new();
    for (session_id, group_id) in group_rows {
        groups
            .entry(session_id)
            .or_default()
            .push(GroupId::new(group_id));
    }

    rows.into_iter()
        .map(|row| {
            let session_groups: Vec<GroupId> = groups.remove(&row.session_id).unwrap_or_default();
            row.into_session(session_groups)
        })
        .collect()
}
