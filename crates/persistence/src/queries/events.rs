// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Schedule event (outbox) queries.

use diesel::prelude::*;
use diesel::SqliteConnection;
use rotaplan_audit::ScheduleEvent;
use rotaplan_domain::{OrganizationId, StaffId};

use crate::data_models::{ScheduleEventRow, schedule_event_from_row};
use crate::diesel_schema::schedule_events;
use crate::error::PersistenceError;

/// Lists an organization's events with an id greater than `after`, oldest first.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `organization_id` - The organization
/// * `recipient` - Restricts the listing to one recipient when set
/// * `after` - Exclusive cursor; `0` starts from the beginning
/// * `limit` - Maximum number of events to return
///
/// # Errors
///
/// Returns an error if the query fails or a stored event cannot be decoded.
pub fn list_events(
    conn: &mut SqliteConnection,
    organization_id: OrganizationId,
    recipient: Option<StaffId>,
    after: i64,
    limit: i64,
) -> Result<Vec<ScheduleEvent>, PersistenceError> {
    let mut query = schedule_events::table
        .filter(schedule_events::organization_id.eq(organization_id.value()))
        .filter(schedule_events::event_id.gt(after))
        .select((
            schedule_events::event_id,
            schedule_events::organization_id,
            schedule_events::actor_json,
            schedule_events::cause_json,
            schedule_events::kind,
            schedule_events::recipient_staff_id,
            schedule_events::entity_type,
            schedule_events::entity_id,
            schedule_events::details,
            schedule_events::created_at,
        ))
        .order(schedule_events::event_id.asc())
        .limit(limit)
        .into_boxed();

    if let Some(recipient) = recipient {
        query = query.filter(schedule_events::recipient_staff_id.eq(recipient.value()));
    }

    let rows: Vec<ScheduleEventRow> = query.load(conn)?;
    rows.into_iter().map(schedule_event_from_row).collect()
}
