// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Organization, staff directory, and availability queries.

use std::collections::HashMap;

use diesel::prelude::*;
use diesel::SqliteConnection;
use rotaplan_domain::{
    AvailabilitySnapshot, GroupId, OrganizationId, SiteTimezone, StaffAvailability, StaffId,
    parse_date,
};
use tracing::debug;

use crate::data_models::{
    AvailabilityWindowRow, OrganizationData, OrganizationRow, StaffDirectoryEntry,
    StaffDirectoryRow,
};
use crate::diesel_schema::{
    availability_windows, date_blocks, group_preferences, organizations, staff_directory,
};
use crate::error::PersistenceError;

/// Retrieves an organization's site configuration, if it has been synced.
///
/// # Errors
///
/// Returns an error if the query fails or the stored timezone is invalid.
pub fn get_organization(
    conn: &mut SqliteConnection,
    organization_id: OrganizationId,
) -> Result<Option<OrganizationData>, PersistenceError> {
    organizations::table
        .filter(organizations::organization_id.eq(organization_id.value()))
        .select(OrganizationRow::as_select())
        .first::<OrganizationRow>(conn)
        .optional()?
        .map(OrganizationRow::into_data)
        .transpose()
}

/// Returns the site timezone, defaulting to UTC for an unconfigured organization.
///
/// # Errors
///
/// Returns an error if the query fails or the stored timezone is invalid.
pub fn organization_timezone(
    conn: &mut SqliteConnection,
    organization_id: OrganizationId,
) -> Result<SiteTimezone, PersistenceError> {
    Ok(get_organization(conn, organization_id)?
        .map_or(SiteTimezone::UTC, |org| org.timezone))
}

/// Lists the organization's staff directory ordered by display name.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_staff(
    conn: &mut SqliteConnection,
    organization_id: OrganizationId,
) -> Result<Vec<StaffDirectoryEntry>, PersistenceError> {
    let rows: Vec<StaffDirectoryRow> = staff_directory::table
        .filter(staff_directory::organization_id.eq(organization_id.value()))
        .order((
            staff_directory::display_name.asc(),
            staff_directory::staff_id.asc(),
        ))
        .select(StaffDirectoryRow::as_select())
        .load(conn)?;
    Ok(rows.into_iter().map(StaffDirectoryEntry::from).collect())
}

/// Looks up one staff member in the organization's directory.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_staff(
    conn: &mut SqliteConnection,
    organization_id: OrganizationId,
    staff_id: StaffId,
) -> Result<Option<StaffDirectoryEntry>, PersistenceError> {
    Ok(staff_directory::table
        .filter(staff_directory::organization_id.eq(organization_id.value()))
        .filter(staff_directory::staff_id.eq(staff_id.value()))
        .select(StaffDirectoryRow::as_select())
        .first::<StaffDirectoryRow>(conn)
        .optional()?
        .map(StaffDirectoryEntry::from))
}

/// Loads the availability facts for `staff` into a snapshot.
///
/// Staff members with nothing stored get an empty entry, which makes them
/// unavailable at every time.
///
/// # Errors
///
/// Returns an error if a query fails or a stored row is malformed.
pub fn load_availability_snapshot(
    conn: &mut SqliteConnection,
    organization_id: OrganizationId,
    staff: &[StaffId],
) -> Result<AvailabilitySnapshot, PersistenceError> {
    let timezone: SiteTimezone = organization_timezone(conn, organization_id)?;
    let ids: Vec<i64> = staff.iter().map(|s| s.value()).collect();

    // Only staff in this organization's directory contribute facts.
    let members: Vec<i64> = staff_directory::table
        .filter(staff_directory::organization_id.eq(organization_id.value()))
        .filter(staff_directory::staff_id.eq_any(&ids))
        .select(staff_directory::staff_id)
        .load(conn)?;

    let mut by_staff: HashMap<i64, StaffAvailability> = ids
        .iter()
        .map(|id| (*id, StaffAvailability::default()))
        .collect();

    let windows: Vec<AvailabilityWindowRow> = availability_windows::table
        .filter(availability_windows::staff_id.eq_any(&members))
        .order(availability_windows::window_id.asc())
        .select(AvailabilityWindowRow::as_select())
        .load(conn)?;
    for row in windows {
        let staff_id: i64 = row.staff_id;
        let window = row.into_window()?;
        if let Some(entry) = by_staff.get_mut(&staff_id) {
            entry.windows.push(window);
        }
    }

    let preferences: Vec<(i64, i64)> = group_preferences::table
        .filter(group_preferences::staff_id.eq_any(&members))
        .select((group_preferences::staff_id, group_preferences::group_id))
        .load(conn)?;
    for (staff_id, group_id) in preferences {
        if let Some(entry) = by_staff.get_mut(&staff_id) {
            entry.preferred_groups.insert(GroupId::new(group_id));
        }
    }

    let blocks: Vec<(i64, String)> = date_blocks::table
        .filter(date_blocks::staff_id.eq_any(&members))
        .select((date_blocks::staff_id, date_blocks::blocked_date))
        .load(conn)?;
    for (staff_id, blocked_date) in blocks {
        if let Some(entry) = by_staff.get_mut(&staff_id) {
            entry.blocked_dates.insert(parse_date(&blocked_date)?);
        }
    }

    debug!(
        organization_id = organization_id.value(),
        requested = ids.len(),
        known = members.len(),
        "Loaded availability snapshot"
    );

    let mut snapshot: AvailabilitySnapshot = AvailabilitySnapshot::new(timezone);
    for (staff_id, availability) in by_staff {
        snapshot.insert(StaffId::new(staff_id), availability);
    }
    Ok(snapshot)
}
