// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary layer for the rota planner.
//!
//! This crate turns trusted identities into principals, translates requests
//! into domain types, drives the core's decisions and the store's writes, and
//! maps every lower-layer error onto the caller-visible taxonomy:
//!
//! - `invalid_argument`
//! - `forbidden`
//! - `not_found`
//! - `conflict`
//! - `invalid_transition`
//! - `quota_exceeded`
//! - `internal`
//!
//! Transport concerns (HTTP, headers, status codes) live in the server.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod capabilities;
mod error;
mod handlers;
mod request_response;
mod rota_csv;
mod usage;

#[cfg(test)]
mod tests;

pub use capabilities::{Role, resolve_principal};
pub use error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
pub use handlers::{
    DEFAULT_PRE_ASSIGNMENT_ROLE, MAX_EVENT_LIMIT, accept_swap, build_rota, bulk_schedule,
    create_assignment, create_session, decline_swap, delete_assignment, export_rota_csv,
    get_assignment, list_assignments, list_events, list_my_assignments, list_swaps,
    preview_bulk_schedule, request_swap, resolve_session_eligibility, resolve_window_eligibility,
    sync_organization, sync_staff, transition_assignment,
};
pub use request_response::{
    AssignmentResponse, AssignmentWriteResponse, AvailabilityWindowRequest,
    BulkSchedulePreviewResponse, BulkScheduleRequest, BulkScheduleResponse,
    CreateAssignmentRequest, CreateSessionRequest, CreateSessionResponse, CreateSwapRequest,
    DateRangeQuery, EligibilityEntry, EligibilityRequest, EligibilityResponse,
    ListAssignmentsResponse, ListEventsQuery, ListEventsResponse, ListSwapsResponse,
    OrganizationResponse, PreAssignmentFailure, PreAssignmentReport, RotaDayResponse,
    RotaEntryResponse, RotaResponse, ScheduleEventResponse, SessionResponse, SwapResponse,
    SwapWriteResponse, SyncOrganizationRequest, SyncStaffRequest, TransitionAssignmentRequest,
    WriteResponse,
};
pub use rota_csv::{ROTA_CSV_HEADERS, render_rota_csv};
pub use usage::{GatedOperation, StaticUsageGate, UsageGate, check_usage};
