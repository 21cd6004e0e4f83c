// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::SqliteConnection;
use rotaplan_domain::{GroupId, OrganizationId, Session, SessionDraft, SessionId, format_instant};
use time::OffsetDateTime;
use tracing::debug;

use crate::backend::PersistenceBackend;
use crate::diesel_schema::{session_groups, sessions};
use crate::error::PersistenceError;

/// Inserts a session and its groups.
pub fn insert_session(
    conn: &mut SqliteConnection,
    session: &Session,
    now: &str,
) -> Result<SessionId, PersistenceError> {
    insert_session_row(
        conn,
        session.organization_id(),
        session.title(),
        session.start(),
        session.end(),
        session.group_ids(),
        now,
    )
}

/// Inserts every draft, in order. The caller owns the transaction.
pub fn insert_drafts(
    conn: &mut SqliteConnection,
    organization_id: OrganizationId,
    drafts: &[SessionDraft],
    now: &str,
) -> Result<Vec<SessionId>, PersistenceError> {
    let mut ids: Vec<SessionId> = Vec::with_capacity(drafts.len());
    for draft in drafts {
        ids.push(insert_session_row(
            conn,
            organization_id,
            &draft.title,
            draft.start,
            draft.end,
            &[draft.group_id],
            now,
        )?);
    }
    debug!(count = ids.len(), "Inserted scheduled sessions");
    Ok(ids)
}

fn insert_session_row(
    conn: &mut SqliteConnection,
    organization_id: OrganizationId,
    title: &str,
    start: OffsetDateTime,
    end: OffsetDateTime,
    group_ids: &[GroupId],
    now: &str,
) -> Result<SessionId, PersistenceError> {
    diesel::insert_into(sessions::table)
        .values((
            sessions::organization_id.eq(organization_id.value()),
            sessions::title.eq(title),
            sessions::starts_at.eq(format_instant(start)),
            sessions::ends_at.eq(format_instant(end)),
            sessions::created_at.eq(now),
        ))
        .execute(conn)?;
    let session_id: i64 = conn.get_last_insert_rowid()?;

    for (position, group_id) in (0_i32..).zip(group_ids) {
        diesel::insert_into(session_groups::table)
            .values((
                session_groups::session_id.eq(session_id),
                session_groups::group_id.eq(group_id.value()),
                session_groups::position.eq(position),
            ))
            .execute(conn)?;
    }

    Ok(SessionId::new(session_id))
}
