// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use rotaplan_audit::{Actor, Cause, EntityRef, EventKind, ScheduleEvent};
use rotaplan_domain::{
    Assignment, AssignmentId, AssignmentStatus, AvailabilityWindow, GroupId, OrganizationId,
    Session, SessionId, SiteTimezone, StaffId, SwapRequest, SwapRequestId, SwapStatus,
    parse_instant,
};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Time, Weekday};

use crate::diesel_schema::{
    assignments, availability_windows, organizations, sessions, staff_directory, swap_requests,
};
use crate::error::PersistenceError;

/// Storage format for site-local times of day.
const TIME_OF_DAY_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[hour]:[minute]:[second]");

/// An organization's site configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationData {
    pub organization_id: OrganizationId,
    pub name: String,
    pub timezone: SiteTimezone,
}

/// One row of the mirrored staff directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffDirectoryEntry {
    pub staff_id: StaffId,
    pub organization_id: OrganizationId,
    pub display_name: String,
}

/// The swap requests a staff member is party to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaffSwaps {
    /// Outstanding requests offered to this staff member.
    pub inbound: Vec<SwapRequest>,
    /// Requests this staff member has offered.
    pub outbound: Vec<SwapRequest>,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = organizations)]
pub struct OrganizationRow {
    pub organization_id: i64,
    pub name: String,
    pub timezone: String,
}

impl OrganizationRow {
    pub fn into_data(self) -> Result<OrganizationData, PersistenceError> {
        Ok(OrganizationData {
            organization_id: OrganizationId::new(self.organization_id),
            name: self.name,
            timezone: SiteTimezone::parse(&self.timezone)?,
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = staff_directory)]
pub struct StaffDirectoryRow {
    pub staff_id: i64,
    pub organization_id: i64,
    pub display_name: String,
}

impl From<StaffDirectoryRow> for StaffDirectoryEntry {
    fn from(row: StaffDirectoryRow) -> Self {
        Self {
            staff_id: StaffId::new(row.staff_id),
            organization_id: OrganizationId::new(row.organization_id),
            display_name: row.display_name,
        }
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = sessions)]
pub struct SessionRow {
    pub session_id: i64,
    pub organization_id: i64,
    pub title: String,
    pub starts_at: String,
    pub ends_at: String,
}

impl SessionRow {
    /// Rebuilds the domain session with its groups in stored order.
    pub fn into_session(self, group_ids: Vec<GroupId>) -> Result<Session, PersistenceError> {
        let session: Session = Session::new(
            OrganizationId::new(self.organization_id),
            &self.title,
            parse_instant(&self.starts_at)?,
            parse_instant(&self.ends_at)?,
            group_ids,
        )?;
        Ok(session.with_id(SessionId::new(self.session_id)))
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = assignments)]
pub struct AssignmentRow {
    pub assignment_id: i64,
    pub session_id: i64,
    pub staff_id: i64,
    pub role: String,
    pub status: String,
}

impl AssignmentRow {
    pub fn into_assignment(self) -> Result<Assignment, PersistenceError> {
        Ok(Assignment {
            assignment_id: AssignmentId::new(self.assignment_id),
            session_id: SessionId::new(self.session_id),
            staff_id: StaffId::new(self.staff_id),
            role: self.role,
            status: self.status.parse::<AssignmentStatus>()?,
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = swap_requests)]
pub struct SwapRequestRow {
    pub swap_request_id: i64,
    pub assignment_id: i64,
    pub from_staff_id: i64,
    pub to_staff_id: i64,
    pub status: String,
}

impl SwapRequestRow {
    pub fn into_swap(self) -> Result<SwapRequest, PersistenceError> {
        Ok(SwapRequest {
            swap_request_id: SwapRequestId::new(self.swap_request_id),
            assignment_id: AssignmentId::new(self.assignment_id),
            from_staff_id: StaffId::new(self.from_staff_id),
            to_staff_id: StaffId::new(self.to_staff_id),
            status: self.status.parse::<SwapStatus>()?,
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = availability_windows)]
pub struct AvailabilityWindowRow {
    pub staff_id: i64,
    pub kind: String,
    pub weekday: Option<i32>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub starts_at: Option<String>,
    pub ends_at: Option<String>,
}

impl AvailabilityWindowRow {
    pub fn into_window(self) -> Result<AvailabilityWindow, PersistenceError> {
        match (self.kind.as_str(), self.starts_at, self.ends_at) {
            ("absolute", Some(start), Some(end)) => Ok(AvailabilityWindow::absolute(
                parse_instant(&start)?,
                parse_instant(&end)?,
            )?),
            ("recurring", None, None) => {
                let weekday: Option<Weekday> = self.weekday.map(weekday_from_index).transpose()?;
                let start: Time = parse_time_of_day_column(self.start_time.as_deref())?;
                let end: Time = parse_time_of_day_column(self.end_time.as_deref())?;
                Ok(AvailabilityWindow::recurring(weekday, start, end)?)
            }
            (kind, _, _) => Err(PersistenceError::ReconstructionError(format!(
                "malformed {kind} availability window for staff {}",
                self.staff_id
            ))),
        }
    }
}

/// Type alias for schedule event row data.
pub type ScheduleEventRow = (
    i64,
    i64,
    String,
    String,
    String,
    Option<i64>,
    Option<String>,
    Option<i64>,
    Option<String>,
    String,
);

/// Rebuilds a stored schedule event.
pub fn schedule_event_from_row(row: ScheduleEventRow) -> Result<ScheduleEvent, PersistenceError> {
    let (
        event_id,
        organization_id,
        actor_json,
        cause_json,
        kind,
        recipient_staff_id,
        entity_type,
        entity_id,
        details,
        created_at,
    ) = row;

    let actor: Actor = serde_json::from_str(&actor_json)?;
    let cause: Cause = serde_json::from_str(&cause_json)?;
    let kind: EventKind = kind
        .parse::<EventKind>()
        .map_err(PersistenceError::ReconstructionError)?;
    let entity: Option<EntityRef> = match (entity_type, entity_id) {
        (Some(entity_type), Some(entity_id)) => Some(
            EntityRef::from_parts(&entity_type, entity_id)
                .map_err(PersistenceError::ReconstructionError)?,
        ),
        _ => None,
    };

    let event: ScheduleEvent = ScheduleEvent::new(
        OrganizationId::new(organization_id),
        actor,
        cause,
        kind,
        recipient_staff_id.map(StaffId::new),
        entity,
        details,
    );
    Ok(event.with_persisted(event_id, parse_instant(&created_at)?))
}

/// Formats a local time of day for storage.
pub fn format_time_of_day(time: Time) -> Result<String, PersistenceError> {
    time.format(TIME_OF_DAY_FORMAT)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

fn parse_time_of_day_column(value: Option<&str>) -> Result<Time, PersistenceError> {
    let value: &str = value.ok_or_else(|| {
        PersistenceError::ReconstructionError(String::from("recurring window missing a time"))
    })?;
    Time::parse(value, TIME_OF_DAY_FORMAT)
        .map_err(|e| PersistenceError::ReconstructionError(format!("time '{value}': {e}")))
}

/// Weekdays are stored as days from Monday (0..=6).
pub fn weekday_to_index(weekday: Weekday) -> i32 {
    i32::from(weekday.number_days_from_monday())
}

fn weekday_from_index(index: i32) -> Result<Weekday, PersistenceError> {
    let days: u8 = u8::try_from(index)
        .ok()
        .filter(|d| *d < 7)
        .ok_or_else(|| PersistenceError::ReconstructionError(format!("weekday index {index}")))?;
    Ok(Weekday::Monday.nth_next(days))
}
