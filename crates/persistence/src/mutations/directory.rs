// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Mirrors of collaborator-owned data: site configuration, the staff
//! directory, and availability facts.
//!
//! These writes replace state wholesale and produce no schedule events.

use diesel::prelude::*;
use diesel::SqliteConnection;
use rotaplan_domain::{
    AvailabilityWindow, OrganizationId, SiteTimezone, StaffAvailability, StaffId, format_instant,
};
use tracing::info;

use crate::data_models::{format_time_of_day, weekday_to_index};
use crate::diesel_schema::{
    availability_windows, date_blocks, group_preferences, organizations, staff_directory,
};
use crate::error::PersistenceError;

/// Creates or replaces an organization's site configuration.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn upsert_organization(
    conn: &mut SqliteConnection,
    organization_id: OrganizationId,
    name: &str,
    timezone: &SiteTimezone,
) -> Result<(), PersistenceError> {
    diesel::insert_into(organizations::table)
        .values((
            organizations::organization_id.eq(organization_id.value()),
            organizations::name.eq(name),
            organizations::timezone.eq(timezone.name()),
        ))
        .on_conflict(organizations::organization_id)
        .do_update()
        .set((
            organizations::name.eq(name),
            organizations::timezone.eq(timezone.name()),
        ))
        .execute(conn)?;

    info!(
        organization_id = organization_id.value(),
        timezone = timezone.name(),
        "Organization configured"
    );
    Ok(())
}

/// Replaces a staff member's directory entry and availability facts.
///
/// Runs in a single transaction: readers never observe a half-synced member.
///
/// # Errors
///
/// Returns an error if any write fails.
pub fn sync_staff(
    conn: &mut SqliteConnection,
    organization_id: OrganizationId,
    staff_id: StaffId,
    display_name: &str,
    availability: &StaffAvailability,
) -> Result<(), PersistenceError> {
    conn.immediate_transaction(|conn| {
        diesel::insert_into(staff_directory::table)
            .values((
                staff_directory::staff_id.eq(staff_id.value()),
                staff_directory::organization_id.eq(organization_id.value()),
                staff_directory::display_name.eq(display_name),
            ))
            .on_conflict(staff_directory::staff_id)
            .do_update()
            .set((
                staff_directory::organization_id.eq(organization_id.value()),
                staff_directory::display_name.eq(display_name),
            ))
            .execute(conn)?;

        diesel::delete(
            availability_windows::table.filter(availability_windows::staff_id.eq(staff_id.value())),
        )
        .execute(conn)?;
        diesel::delete(
            group_preferences::table.filter(group_preferences::staff_id.eq(staff_id.value())),
        )
        .execute(conn)?;
        diesel::delete(date_blocks::table.filter(date_blocks::staff_id.eq(staff_id.value())))
            .execute(conn)?;

        for window in &availability.windows {
            insert_window(conn, staff_id, window)?;
        }

        for group_id in &availability.preferred_groups {
            diesel::insert_into(group_preferences::table)
                .values((
                    group_preferences::staff_id.eq(staff_id.value()),
                    group_preferences::group_id.eq(group_id.value()),
                ))
                .execute(conn)?;
        }

        for date in &availability.blocked_dates {
            diesel::insert_into(date_blocks::table)
                .values((
                    date_blocks::staff_id.eq(staff_id.value()),
                    date_blocks::blocked_date.eq(date.to_string()),
                ))
                .execute(conn)?;
        }

        info!(
            staff_id = staff_id.value(),
            windows = availability.windows.len(),
            preferred_groups = availability.preferred_groups.len(),
            blocked_dates = availability.blocked_dates.len(),
            "Staff availability synced"
        );
        Ok(())
    })
}

fn insert_window(
    conn: &mut SqliteConnection,
    staff_id: StaffId,
    window: &AvailabilityWindow,
) -> Result<(), PersistenceError> {
    match *window {
        AvailabilityWindow::Absolute { start, end } => {
            diesel::insert_into(availability_windows::table)
                .values((
                    availability_windows::staff_id.eq(staff_id.value()),
                    availability_windows::kind.eq("absolute"),
                    availability_windows::starts_at.eq(format_instant(start)),
                    availability_windows::ends_at.eq(format_instant(end)),
                ))
                .execute(conn)?;
        }
        AvailabilityWindow::Recurring {
            weekday,
            start_time,
            end_time,
        } => {
            diesel::insert_into(availability_windows::table)
                .values((
                    availability_windows::staff_id.eq(staff_id.value()),
                    availability_windows::kind.eq("recurring"),
                    availability_windows::weekday.eq(weekday.map(weekday_to_index)),
                    availability_windows::start_time.eq(format_time_of_day(start_time)?),
                    availability_windows::end_time.eq(format_time_of_day(end_time)?),
                ))
                .execute(conn)?;
        }
    }
    Ok(())
}
