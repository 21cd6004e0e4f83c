// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Instants travel as RFC 3339 strings, dates as `YYYY-MM-DD` and local
//! times of day as `HH:MM`. Identifiers are raw integers on the wire.

use serde::{Deserialize, Serialize};

/// API request to create a single session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    /// The display title.
    pub title: String,
    /// Session start (RFC 3339).
    pub start: String,
    /// Session end (RFC 3339).
    pub end: String,
    /// Target groups. May be empty.
    #[serde(default)]
    pub group_ids: Vec<i64>,
}

/// A persisted session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResponse {
    /// The canonical identifier.
    pub session_id: i64,
    /// The display title.
    pub title: String,
    /// Session start (RFC 3339, UTC).
    pub start: String,
    /// Session end (RFC 3339, UTC).
    pub end: String,
    /// Target groups in stored order.
    pub group_ids: Vec<i64>,
}

/// API response for a successful session creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    /// The created session.
    pub session: SessionResponse,
    /// The id of the recorded schedule event.
    pub event_id: i64,
    /// A success message.
    pub message: String,
}

/// API request to expand a recurring schedule into sessions.
///
/// The same body drives both the preview and the bulk creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkScheduleRequest {
    /// Target groups; one session is created per matching date and group.
    pub group_ids: Vec<i64>,
    /// First date of the range (`YYYY-MM-DD`).
    pub start_date: String,
    /// Last date of the range, inclusive (`YYYY-MM-DD`).
    pub end_date: String,
    /// Weekday symbols (`Mon`..`Sun`, case-insensitive).
    pub days_of_week: Vec<String>,
    /// Daily start time in site-local time (`HH:MM`).
    pub start_time: String,
    /// Daily end time in site-local time (`HH:MM`).
    pub end_time: String,
    /// Optional title prefix; titles are `"<prefix> <date>"`.
    #[serde(default)]
    pub title_prefix: Option<String>,
    /// Staff to pre-assign (pending) to every generated session.
    #[serde(default)]
    pub staff_ids: Vec<i64>,
    /// Role label for pre-assignments.
    #[serde(default)]
    pub role: Option<String>,
}

/// API response for a bulk schedule preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkSchedulePreviewResponse {
    /// The number of sessions the request would create.
    pub session_count: usize,
    /// The most sessions one request may create.
    pub max_sessions: usize,
}

/// One pre-assignment that could not be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreAssignmentFailure {
    /// The session the assignment was for.
    pub session_id: i64,
    /// The staff member the assignment was for.
    pub staff_id: i64,
    /// The error kind.
    pub kind: String,
    /// A human-readable reason.
    pub message: String,
}

/// The outcome of bulk pre-assignment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PreAssignmentReport {
    /// Assignments that were created.
    pub succeeded: Vec<AssignmentResponse>,
    /// Assignments that were not.
    pub failed: Vec<PreAssignmentFailure>,
}

/// API response for a bulk schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkScheduleResponse {
    /// Every created session, in date then group order.
    pub session_ids: Vec<i64>,
    /// The number of sessions created.
    pub session_count: usize,
    /// The schedule event, absent when nothing matched.
    pub event_id: Option<i64>,
    /// Pre-assignment results.
    pub pre_assignments: PreAssignmentReport,
    /// A summary message.
    pub message: String,
}

/// API request to resolve eligibility for an ad-hoc window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityRequest {
    /// The group to check preferences against, if any.
    #[serde(default)]
    pub group_id: Option<i64>,
    /// Window start (RFC 3339).
    pub start: String,
    /// Window end (RFC 3339).
    pub end: String,
    /// Candidates; defaults to the organization's directory.
    #[serde(default)]
    pub staff_ids: Option<Vec<i64>>,
}

/// The classification of one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityEntry {
    /// The candidate.
    pub staff_id: i64,
    /// Whether the candidate may be offered the window.
    pub eligible: bool,
    /// Why not, when not eligible.
    pub reason: Option<String>,
}

/// API response for an eligibility query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityResponse {
    /// The session checked, when resolved for a session.
    pub session_id: Option<i64>,
    /// The group preferences were checked against.
    pub group_id: Option<i64>,
    /// One entry per candidate, in candidate order.
    pub results: Vec<EligibilityEntry>,
}

/// API request to create an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAssignmentRequest {
    /// The session being covered.
    pub session_id: i64,
    /// The staff member being offered the session.
    pub staff_id: i64,
    /// Free-form role label.
    pub role: String,
    /// `pending` (default) or `confirmed` for self-assignment.
    #[serde(default)]
    pub status: Option<String>,
}

/// API request to transition an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionAssignmentRequest {
    /// The requested status.
    pub status: String,
}

/// An assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentResponse {
    /// The canonical identifier.
    pub assignment_id: i64,
    /// The session being covered.
    pub session_id: i64,
    /// The current holder.
    pub staff_id: i64,
    /// Free-form role label.
    pub role: String,
    /// Lifecycle status.
    pub status: String,
}

/// API response for an assignment write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentWriteResponse {
    /// The assignment after the write.
    pub assignment: AssignmentResponse,
    /// The id of the recorded schedule event.
    pub event_id: i64,
    /// A success message.
    pub message: String,
}

/// API request bounding a listing by site-local dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRangeQuery {
    /// First date (`YYYY-MM-DD`).
    pub from: String,
    /// Last date, inclusive (`YYYY-MM-DD`).
    pub to: String,
    /// Restrict to one session.
    #[serde(default)]
    pub session_id: Option<i64>,
}

/// An assignment with the session and staff details needed for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotaEntryResponse {
    /// The assignment.
    pub assignment_id: i64,
    /// The session.
    pub session_id: i64,
    /// The session's title.
    pub session_title: String,
    /// Session start (RFC 3339, UTC).
    pub session_start: String,
    /// Session end (RFC 3339, UTC).
    pub session_end: String,
    /// The holder.
    pub staff_id: i64,
    /// The holder's display name.
    pub staff_display_name: String,
    /// Free-form role label.
    pub role: String,
    /// Lifecycle status.
    pub status: String,
}

/// API response listing assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListAssignmentsResponse {
    /// First date of the range.
    pub from: String,
    /// Last date of the range.
    pub to: String,
    /// Assignments ordered by session start.
    pub assignments: Vec<RotaEntryResponse>,
}

/// One day of the rota.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotaDayResponse {
    /// The site-local date.
    pub date: String,
    /// Entries ordered by session start, then staff display name.
    pub entries: Vec<RotaEntryResponse>,
}

/// API response for the rota.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotaResponse {
    /// First date of the range.
    pub from: String,
    /// Last date of the range.
    pub to: String,
    /// The site timezone dates are grouped in.
    pub timezone: String,
    /// One entry per date, empty days included.
    pub days: Vec<RotaDayResponse>,
}

/// API request to offer an assignment to a peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSwapRequest {
    /// The assignment being offered.
    pub assignment_id: i64,
    /// The proposed new holder.
    pub to_staff_id: i64,
}

/// A swap request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapResponse {
    /// The canonical identifier.
    pub swap_request_id: i64,
    /// The assignment being offered.
    pub assignment_id: i64,
    /// The holder at request time.
    pub from_staff_id: i64,
    /// The proposed new holder.
    pub to_staff_id: i64,
    /// `REQUESTED`, `ACCEPTED` or `DECLINED`.
    pub status: String,
}

/// API response for a swap write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapWriteResponse {
    /// The swap request after the write.
    pub swap: SwapResponse,
    /// The id of the recorded schedule event.
    pub event_id: i64,
    /// A success message.
    pub message: String,
}

/// API response listing the acting staff member's swaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSwapsResponse {
    /// Outstanding requests offered to the staff member.
    pub inbound: Vec<SwapResponse>,
    /// Requests the staff member has offered.
    pub outbound: Vec<SwapResponse>,
}

/// API response for a write with no entity to return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteResponse {
    /// Success indicator.
    pub success: bool,
    /// Optional message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// The id of the recorded schedule event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<i64>,
}

/// API request paging through the event outbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListEventsQuery {
    /// Exclusive event id cursor.
    #[serde(default)]
    pub after: Option<i64>,
    /// Page size.
    #[serde(default)]
    pub limit: Option<i64>,
}

/// A schedule event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEventResponse {
    /// The event id, usable as a cursor.
    pub event_id: Option<i64>,
    /// The event kind.
    pub kind: String,
    /// The acting staff member.
    pub actor_id: String,
    /// The acting role.
    pub actor_type: String,
    /// The cause identifier.
    pub cause_id: String,
    /// The cause description.
    pub cause_description: String,
    /// The staff member to notify, if any.
    pub recipient_staff_id: Option<i64>,
    /// The kind of entity affected.
    pub entity_type: Option<String>,
    /// The entity affected.
    pub entity_id: Option<i64>,
    /// Human-readable details.
    pub details: Option<String>,
    /// When the event was recorded (RFC 3339).
    pub created_at: Option<String>,
}

/// API response for an event page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEventsResponse {
    /// Events, oldest first.
    pub events: Vec<ScheduleEventResponse>,
    /// The cursor for the next page, when this page is non-empty.
    pub next_after: Option<i64>,
}

/// An availability window as sent by the availability collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AvailabilityWindowRequest {
    /// A fixed interval.
    Absolute {
        /// Start (RFC 3339).
        start: String,
        /// End (RFC 3339).
        end: String,
    },
    /// A daily or weekly time-of-day range in site-local time.
    Recurring {
        /// Weekday symbol; absent means every day.
        #[serde(default)]
        weekday: Option<String>,
        /// Start time (`HH:MM`).
        start_time: String,
        /// End time (`HH:MM`).
        end_time: String,
    },
}

/// API request replacing a staff member's directory entry and availability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStaffRequest {
    /// The staff member's display name.
    pub display_name: String,
    /// Availability windows.
    #[serde(default)]
    pub windows: Vec<AvailabilityWindowRequest>,
    /// Preferred groups.
    #[serde(default)]
    pub preferred_groups: Vec<i64>,
    /// Blocked site-local dates (`YYYY-MM-DD`).
    #[serde(default)]
    pub blocked_dates: Vec<String>,
}

/// API request setting the organization's site configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOrganizationRequest {
    /// The site name.
    pub name: String,
    /// The IANA timezone name.
    pub timezone: String,
}

/// An organization's site configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationResponse {
    /// The organization.
    pub organization_id: i64,
    /// The site name.
    pub name: String,
    /// The IANA timezone name.
    pub timezone: String,
}
