// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::SqliteConnection;
use rotaplan_domain::{OrganizationId, StaffId, SwapRequest, SwapRequestId, SwapStatus};

use crate::data_models::{StaffSwaps, SwapRequestRow};
use crate::diesel_schema::{assignments, sessions, swap_requests};
use crate::error::PersistenceError;

/// Retrieves a swap request whose assignment belongs to the organization.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the request does not exist in the
/// organization, or an error if the query fails.
pub fn get_swap(
    conn: &mut SqliteConnection,
    organization_id: OrganizationId,
    swap_request_id: SwapRequestId,
) -> Result<SwapRequest, PersistenceError> {
    swap_requests::table
        .inner_join(assignments::table.inner_join(sessions::table))
        .filter(swap_requests::swap_request_id.eq(swap_request_id.value()))
        .filter(sessions::organization_id.eq(organization_id.value()))
        .select(SwapRequestRow::as_select())
        .first::<SwapRequestRow>(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::NotFound(format!("Swap request {swap_request_id}")))?
        .into_swap()
}

/// Reads a swap request without organization scoping.
pub(crate) fn find_swap(
    conn: &mut SqliteConnection,
    swap_request_id: SwapRequestId,
) -> Result<Option<SwapRequest>, PersistenceError> {
    swap_requests::table
        .filter(swap_requests::swap_request_id.eq(swap_request_id.value()))
        .select(SwapRequestRow::as_select())
        .first::<SwapRequestRow>(conn)
        .optional()?
        .map(SwapRequestRow::into_swap)
        .transpose()
}

/// Lists a staff member's swap requests, newest first.
///
/// Inbound holds only requests still awaiting this staff member's answer;
/// outbound holds every request they sent.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row is malformed.
pub fn list_swaps_for_staff(
    conn: &mut SqliteConnection,
    organization_id: OrganizationId,
    staff_id: StaffId,
) -> Result<StaffSwaps, PersistenceError> {
    let rows: Vec<SwapRequestRow> = swap_requests::table
        .inner_join(assignments::table.inner_join(sessions::table))
        .filter(sessions::organization_id.eq(organization_id.value()))
        .filter(
            swap_requests::to_staff_id
                .eq(staff_id.value())
                .or(swap_requests::from_staff_id.eq(staff_id.value())),
        )
        .order(swap_requests::swap_request_id.desc())
        .select(SwapRequestRow::as_select())
        .load(conn)?;

    let mut swaps: StaffSwaps = StaffSwaps::default();
    for row in rows {
        let swap: SwapRequest = row.into_swap()?;
        if swap.to_staff_id == staff_id {
            if swap.status == SwapStatus::Requested {
                swaps.inbound.push(swap);
            }
        } else {
            swaps.outbound.push(swap);
        }
    }
    Ok(swaps)
}
