// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::SqliteConnection;
use rotaplan_audit::ScheduleEvent;

use crate::backend::PersistenceBackend;
use crate::diesel_schema::schedule_events;
use crate::error::PersistenceError;

/// Appends a schedule event to the outbox.
///
/// # Errors
///
/// Returns an error if the event cannot be serialized or written.
pub fn insert_event(
    conn: &mut SqliteConnection,
    event: &ScheduleEvent,
    now: &str,
) -> Result<i64, PersistenceError> {
    let actor_json: String = serde_json::to_string(&event.actor)?;
    let cause_json: String = serde_json::to_string(&event.cause)?;

    diesel::insert_into(schedule_events::table)
        .values((
            schedule_events::organization_id.eq(event.organization_id.value()),
            schedule_events::actor_json.eq(&actor_json),
            schedule_events::cause_json.eq(&cause_json),
            schedule_events::kind.eq(event.kind.as_str()),
            schedule_events::recipient_staff_id.eq(event.recipient.map(|s| s.value())),
            schedule_events::entity_type.eq(event.entity.as_ref().map(|e| e.entity_type())),
            schedule_events::entity_id.eq(event.entity.as_ref().map(|e| e.entity_id())),
            schedule_events::details.eq(event.details.as_deref()),
            schedule_events::created_at.eq(now),
        ))
        .execute(conn)?;

    conn.get_last_insert_rowid()
}
