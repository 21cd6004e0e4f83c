// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the rota planner.
//!
//! This crate stores sessions, assignments, swap requests and the schedule
//! event outbox in `SQLite` through Diesel, together with read-only mirrors
//! of the collaborator-owned staff directory and availability facts.
//!
//! ## Concurrency
//!
//! Writes run in `BEGIN IMMEDIATE` transactions with a busy timeout, and
//! status changes are guarded by the status they were decided against. Two
//! uniqueness rules are enforced by the schema itself:
//!
//! - one assignment per `(session, staff)`
//! - one outstanding swap request per assignment
//!
//! A write that loses a race surfaces as `UniqueViolation`, `StatusChanged`
//! or `HolderChanged` and leaves no partial state behind.
//!
//! ## Time
//!
//! Instants are stored as RFC 3339 UTC text at whole seconds, so range
//! filters compare them lexically.
//!
//! ## Testing
//!
//! `new_in_memory()` gives every caller an isolated shared-cache database.
//! Tests that need several connections to one database use `new_with_file()`.

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

use diesel::SqliteConnection;
use rotaplan::TransitionResult;
use rotaplan_audit::ScheduleEvent;
use rotaplan_domain::{
    Assignment, AssignmentId, AvailabilitySnapshot, OrganizationId, RotaEntry, Session,
    SessionId, SiteTimezone, StaffAvailability, StaffId, SwapRequest, SwapRequestId,
};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use time::OffsetDateTime;

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::{OrganizationData, StaffDirectoryEntry, StaffSwaps};
pub use error::PersistenceError;
pub use mutations::PersistTransitionResult;

use backend::PersistenceBackend;

/// Default page size for event listings.
pub const DEFAULT_EVENT_LIMIT: i64 = 100;

/// Persistence adapter for the schedule store.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_test_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        conn.verify_foreign_key_enforcement()?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// Several adapters may open the same file; writers queue on the busy
    /// timeout.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        conn.verify_foreign_key_enforcement()?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        self.conn.verify_foreign_key_enforcement()
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Persists a transition: the change and its schedule event, atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if the change conflicts with stored state or a write
    /// fails. Nothing is written in that case.
    pub fn persist_transition(
        &mut self,
        result: &TransitionResult,
    ) -> Result<PersistTransitionResult, PersistenceError> {
        mutations::persist_transition(&mut self.conn, result)
    }

    // ========================================================================
    // Organizations, Directory & Availability
    // ========================================================================

    /// Creates or replaces an organization's site configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn upsert_organization(
        &mut self,
        organization_id: OrganizationId,
        name: &str,
        timezone: &SiteTimezone,
    ) -> Result<(), PersistenceError> {
        mutations::directory::upsert_organization(&mut self.conn, organization_id, name, timezone)
    }

    /// Retrieves an organization's site configuration, if configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_organization(
        &mut self,
        organization_id: OrganizationId,
    ) -> Result<Option<OrganizationData>, PersistenceError> {
        queries::directory::get_organization(&mut self.conn, organization_id)
    }

    /// Returns the site timezone, or UTC for an unconfigured organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn organization_timezone(
        &mut self,
        organization_id: OrganizationId,
    ) -> Result<SiteTimezone, PersistenceError> {
        queries::directory::organization_timezone(&mut self.conn, organization_id)
    }

    /// Replaces a staff member's directory entry and availability facts.
    ///
    /// # Errors
    ///
    /// Returns an error if a write fails.
    pub fn sync_staff(
        &mut self,
        organization_id: OrganizationId,
        staff_id: StaffId,
        display_name: &str,
        availability: &StaffAvailability,
    ) -> Result<(), PersistenceError> {
        mutations::directory::sync_staff(
            &mut self.conn,
            organization_id,
            staff_id,
            display_name,
            availability,
        )
    }

    /// Lists the organization's staff directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_staff(
        &mut self,
        organization_id: OrganizationId,
    ) -> Result<Vec<StaffDirectoryEntry>, PersistenceError> {
        queries::directory::list_staff(&mut self.conn, organization_id)
    }

    /// Looks up a staff member in the organization's directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_staff(
        &mut self,
        organization_id: OrganizationId,
        staff_id: StaffId,
    ) -> Result<Option<StaffDirectoryEntry>, PersistenceError> {
        queries::directory::get_staff(&mut self.conn, organization_id, staff_id)
    }

    /// Loads availability facts for the given staff into a snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails or a stored row is malformed.
    pub fn load_availability(
        &mut self,
        organization_id: OrganizationId,
        staff: &[StaffId],
    ) -> Result<AvailabilitySnapshot, PersistenceError> {
        queries::directory::load_availability_snapshot(&mut self.conn, organization_id, staff)
    }

    // ========================================================================
    // Sessions
    // ========================================================================

    /// Retrieves a session owned by the organization.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if it does not exist there.
    pub fn get_session(
        &mut self,
        organization_id: OrganizationId,
        session_id: SessionId,
    ) -> Result<Session, PersistenceError> {
        queries::sessions::get_session(&mut self.conn, organization_id, session_id)
    }

    /// Lists sessions starting in `[from, to)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_sessions(
        &mut self,
        organization_id: OrganizationId,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> Result<Vec<Session>, PersistenceError> {
        queries::sessions::list_sessions(&mut self.conn, organization_id, from, to)
    }

    // ========================================================================
    // Assignments
    // ========================================================================

    /// Retrieves an assignment in the organization.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if it does not exist there.
    pub fn get_assignment(
        &mut self,
        organization_id: OrganizationId,
        assignment_id: AssignmentId,
    ) -> Result<Assignment, PersistenceError> {
        queries::assignments::get_assignment(&mut self.conn, organization_id, assignment_id)
    }

    /// Lists the organization's assignments with session and staff details.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_rota_entries(
        &mut self,
        organization_id: OrganizationId,
        from: OffsetDateTime,
        to: OffsetDateTime,
        session_id: Option<SessionId>,
    ) -> Result<Vec<RotaEntry>, PersistenceError> {
        queries::assignments::list_rota_entries(
            &mut self.conn,
            organization_id,
            from,
            to,
            session_id,
        )
    }

    /// Lists one staff member's assignments with session details.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_rota_entries_for_staff(
        &mut self,
        organization_id: OrganizationId,
        staff_id: StaffId,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> Result<Vec<RotaEntry>, PersistenceError> {
        queries::assignments::list_rota_entries_for_staff(
            &mut self.conn,
            organization_id,
            staff_id,
            from,
            to,
        )
    }

    // ========================================================================
    // Swap Requests
    // ========================================================================

    /// Retrieves a swap request in the organization.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if it does not exist there.
    pub fn get_swap(
        &mut self,
        organization_id: OrganizationId,
        swap_request_id: SwapRequestId,
    ) -> Result<SwapRequest, PersistenceError> {
        queries::swaps::get_swap(&mut self.conn, organization_id, swap_request_id)
    }

    /// Lists the swap requests a staff member sent or received.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_swaps_for_staff(
        &mut self,
        organization_id: OrganizationId,
        staff_id: StaffId,
    ) -> Result<StaffSwaps, PersistenceError> {
        queries::swaps::list_swaps_for_staff(&mut self.conn, organization_id, staff_id)
    }

    // ========================================================================
    // Schedule Events
    // ========================================================================

    /// Lists schedule events after a cursor, oldest first.
    ///
    /// # Arguments
    ///
    /// * `organization_id` - The organization
    /// * `recipient` - Only events addressed to this staff member, when set
    /// * `after` - Exclusive event id cursor
    /// * `limit` - Maximum number of events
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or an event cannot be decoded.
    pub fn list_events(
        &mut self,
        organization_id: OrganizationId,
        recipient: Option<StaffId>,
        after: i64,
        limit: i64,
    ) -> Result<Vec<ScheduleEvent>, PersistenceError> {
        queries::events::list_events(&mut self.conn, organization_id, recipient, after, limit)
    }
}
