// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Command application core for the rota planner.
//!
//! Every state change enters as a [`Command`] issued by a [`Principal`].
//! [`apply`] checks the principal's capabilities and the entity's current
//! state, then returns the write to perform together with the
//! `ScheduleEvent` that records it. Nothing here touches storage.

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

mod apply;
mod command;
mod error;
mod principal;

#[cfg(test)]
mod tests;

use rotaplan_domain::{AvailabilitySource, EligibilityResult, Session, SiteTimezone, StaffId};

// Re-export public types and functions
pub use apply::{TransitionResult, apply};
pub use command::{Change, Command};
pub use error::CoreError;
pub use principal::{CapabilitySet, Permission, Principal};

/// Resolves eligibility of `staff` for a persisted session.
///
/// This is a read-only check that does not create schedule events. The
/// session's first group is used for the preference check.
///
/// # Arguments
///
/// * `principal` - The acting identity
/// * `session` - The session to resolve for
/// * `source` - Availability facts for the session's organization
/// * `timezone` - The organization's site timezone
/// * `staff` - The candidates, in the order results should be returned
///
/// # Errors
///
/// Returns an error if:
/// - The principal may not view the schedule
/// - The session belongs to another organization
/// - The session window cannot be evaluated
pub fn resolve_for_session<S: AvailabilitySource + ?Sized>(
    principal: &Principal,
    session: &Session,
    source: &S,
    timezone: &SiteTimezone,
    staff: &[StaffId],
) -> Result<Vec<EligibilityResult>, CoreError> {
    principal.require(Permission::ViewSchedule, "resolve_eligibility")?;
    if session.organization_id() != principal.organization_id {
        return Err(CoreError::NotFound {
            resource: String::from("Session"),
            id: session.session_id().map_or(0, rotaplan_domain::SessionId::value),
        });
    }
    Ok(rotaplan_domain::resolve_eligibility(
        source,
        timezone,
        session.primary_group(),
        session.start(),
        session.end(),
        staff,
    )?)
}
