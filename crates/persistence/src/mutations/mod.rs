// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Write operations.
//!
//! Every schedule change is written together with its schedule event in one
//! `BEGIN IMMEDIATE` transaction, so the event exists if and only if the
//! change committed.

pub mod assignments;
pub mod directory;
pub mod events;
pub mod sessions;
pub mod swaps;

use diesel::SqliteConnection;
use rotaplan::{Change, TransitionResult};
use rotaplan_audit::{EntityRef, ScheduleEvent};
use rotaplan_domain::{SessionId, format_instant};
use time::OffsetDateTime;
use tracing::info;

use crate::error::PersistenceError;

/// Result of persisting a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistTransitionResult {
    /// The id of the stored schedule event.
    pub event_id: i64,
    /// The entity the change created, if it created one.
    pub created: Option<EntityRef>,
    /// Every session created, in input order. Empty unless sessions were inserted.
    pub session_ids: Vec<SessionId>,
}

/// Writes a transition's change and event atomically.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `result` - The decision produced by the core
///
/// # Errors
///
/// Returns an error if the change conflicts with the stored state or any
/// write fails. Nothing is written in that case.
pub fn persist_transition(
    conn: &mut SqliteConnection,
    result: &TransitionResult,
) -> Result<PersistTransitionResult, PersistenceError> {
    let now: String = format_instant(OffsetDateTime::now_utc());

    conn.immediate_transaction(|conn| {
        let (created, session_ids): (Option<EntityRef>, Vec<SessionId>) =
            apply_change(conn, &result.change, &now)?;

        let event: ScheduleEvent = match created {
            Some(entity) => result.event.clone().with_entity(entity),
            None => result.event.clone(),
        };
        let event_id: i64 = events::insert_event(conn, &event, &now)?;

        info!(
            event_id,
            kind = event.kind.as_str(),
            organization_id = event.organization_id.value(),
            "Persisted schedule change"
        );

        Ok(PersistTransitionResult {
            event_id,
            created,
            session_ids,
        })
    })
}

fn apply_change(
    conn: &mut SqliteConnection,
    change: &Change,
    now: &str,
) -> Result<(Option<EntityRef>, Vec<SessionId>), PersistenceError> {
    match change {
        Change::InsertSession { session } => {
            let id: SessionId = sessions::insert_session(conn, session, now)?;
            Ok((Some(EntityRef::Session(id)), vec![id]))
        }
        Change::InsertSessions {
            organization_id,
            drafts,
        } => {
            let ids: Vec<SessionId> = sessions::insert_drafts(conn, *organization_id, drafts, now)?;
            Ok((ids.first().copied().map(EntityRef::Session), ids))
        }
        Change::InsertAssignment {
            session_id,
            staff_id,
            role,
            status,
        } => {
            let id = assignments::insert_assignment(conn, *session_id, *staff_id, role, *status, now)?;
            Ok((Some(EntityRef::Assignment(id)), Vec::new()))
        }
        Change::UpdateAssignmentStatus {
            assignment_id,
            expected,
            new_status,
        } => {
            assignments::update_assignment_status(conn, *assignment_id, *expected, *new_status, now)?;
            Ok((None, Vec::new()))
        }
        Change::DeleteAssignment { assignment_id } => {
            assignments::delete_assignment(conn, *assignment_id)?;
            Ok((None, Vec::new()))
        }
        Change::InsertSwap {
            assignment_id,
            from_staff_id,
            to_staff_id,
        } => {
            let id = swaps::insert_swap(conn, *assignment_id, *from_staff_id, *to_staff_id, now)?;
            Ok((Some(EntityRef::SwapRequest(id)), Vec::new()))
        }
        Change::AcceptSwap {
            swap_request_id,
            assignment_id,
            from_staff_id,
            to_staff_id,
        } => {
            swaps::accept_swap(
                conn,
                *swap_request_id,
                *assignment_id,
                *from_staff_id,
                *to_staff_id,
                now,
            )?;
            Ok((None, Vec::new()))
        }
        Change::DeclineSwap { swap_request_id } => {
            swaps::decline_swap(conn, *swap_request_id, now)?;
            Ok((None, Vec::new()))
        }
    }
}
