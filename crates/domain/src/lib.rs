// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

mod availability;
mod batch;
mod eligibility;
mod error;
mod rota;
mod schedule;
mod site_time;
mod types;
mod validation;
mod weekdays;

#[cfg(test)]
mod tests;

pub use availability::{
    AvailabilitySnapshot, AvailabilitySource, AvailabilityWindow, StaffAvailability,
};
pub use batch::{BatchFailure, BatchResult};
pub use eligibility::{EligibilityResult, IneligibilityReason, resolve_eligibility};
pub use rota::{MAX_ROTA_DAYS, RotaDay, RotaEntry, build_rota, rota_day_count};
pub use schedule::{
    MAX_SESSIONS_PER_REQUEST, RecurringSchedule, SessionDraft, count_sessions, expand_sessions,
};
pub use site_time::SiteTimezone;

// Re-export public types
pub use error::DomainError;
pub use types::{
    Assignment, AssignmentId, AssignmentStatus, GroupId, OrganizationId, Session, SessionId,
    StaffId, SwapRequest, SwapRequestId, SwapStatus,
};
pub use validation::{
    format_instant, parse_date, parse_instant, parse_time_of_day, validate_role, validate_title,
};
pub use weekdays::WeekdaySet;
