// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Eligibility resolution.
//!
//! Classifies staff members as eligible or ineligible for a time window.
//! The result is advisory: assignment creation never consults it.
//!
//! When several reasons apply only the highest-priority one is reported:
//!
//! 1. `blocked_on_date`
//! 2. `unavailable_at_time`
//! 3. `does_not_prefer_group`

use crate::availability::AvailabilitySource;
use crate::error::DomainError;
use crate::site_time::SiteTimezone;
use crate::types::{GroupId, StaffId, normalize_instant};
use serde::{Deserialize, Serialize};
use time::{Date, Duration, OffsetDateTime};

/// Why a staff member is not eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IneligibilityReason {
    /// An explicit date block covers a day the session touches.
    BlockedOnDate,
    /// No availability window fully covers the session.
    UnavailableAtTime,
    /// The session's group is not among the staff member's preferences.
    DoesNotPreferGroup,
}

impl IneligibilityReason {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BlockedOnDate => "blocked_on_date",
            Self::UnavailableAtTime => "unavailable_at_time",
            Self::DoesNotPreferGroup => "does_not_prefer_group",
        }
    }
}

impl std::fmt::Display for IneligibilityReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The classification of one staff member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityResult {
    /// The staff member classified.
    pub staff_id: StaffId,
    /// Whether the staff member may be offered the session.
    pub eligible: bool,
    /// The highest-priority reason, when not eligible.
    pub reason: Option<IneligibilityReason>,
}

impl EligibilityResult {
    const fn eligible(staff_id: StaffId) -> Self {
        Self {
            staff_id,
            eligible: true,
            reason: None,
        }
    }

    const fn ineligible(staff_id: StaffId, reason: IneligibilityReason) -> Self {
        Self {
            staff_id,
            eligible: false,
            reason: Some(reason),
        }
    }
}

/// Resolves eligibility for every staff member in `staff`.
///
/// # Arguments
///
/// * `source` - Availability facts
/// * `timezone` - The site timezone used to find the dates the window touches
/// * `group_id` - The session's group; `None` skips the preference check
/// * `start` - Window start
/// * `end` - Window end (exclusive)
/// * `staff` - The candidates, in the order results should be returned
///
/// # Returns
///
/// One result per candidate, in input order.
///
/// # Errors
///
/// Returns an error if `end` is not after `start` or the window cannot be
/// evaluated in site-local time.
pub fn resolve_eligibility<S: AvailabilitySource + ?Sized>(
    source: &S,
    timezone: &SiteTimezone,
    group_id: Option<GroupId>,
    start: OffsetDateTime,
    end: OffsetDateTime,
    staff: &[StaffId],
) -> Result<Vec<EligibilityResult>, DomainError> {
    let start: OffsetDateTime = normalize_instant(start);
    let end: OffsetDateTime = normalize_instant(end);
    if end <= start {
        return Err(DomainError::InvalidSessionWindow { start, end });
    }

    let touched: Vec<Date> = touched_dates(timezone, start, end)?;

    let mut results: Vec<EligibilityResult> = Vec::with_capacity(staff.len());
    for staff_id in staff {
        let staff_id: StaffId = *staff_id;
        let result: EligibilityResult = if touched
            .iter()
            .any(|date| source.is_blocked_on(staff_id, *date))
        {
            EligibilityResult::ineligible(staff_id, IneligibilityReason::BlockedOnDate)
        } else if !source.is_available_during(staff_id, start, end)? {
            EligibilityResult::ineligible(staff_id, IneligibilityReason::UnavailableAtTime)
        } else if group_id.is_some_and(|g| !source.prefers_group(staff_id, g)) {
            EligibilityResult::ineligible(staff_id, IneligibilityReason::DoesNotPreferGroup)
        } else {
            EligibilityResult::eligible(staff_id)
        };
        results.push(result);
    }

    Ok(results)
}

/// Returns every site-local date that `[start, end)` overlaps.
fn touched_dates(
    timezone: &SiteTimezone,
    start: OffsetDateTime,
    end: OffsetDateTime,
) -> Result<Vec<Date>, DomainError> {
    let first: Date = timezone.local_date(start)?;
    let last: Date = timezone.local_date(end - Duration::SECOND)?;

    let mut dates: Vec<Date> = Vec::new();
    let mut current: Date = first;
    while current <= last {
        dates.push(current);
        match current.next_day() {
            Some(next) => current = next,
            None => break,
        }
    }
    Ok(dates)
}
