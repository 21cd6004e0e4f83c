// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Staff availability facts.
//!
//! Availability, group preferences and date blocks are owned by an external
//! collaborator. The core only reads them, through `AvailabilitySource`.

use crate::error::DomainError;
use crate::site_time::SiteTimezone;
use crate::types::{GroupId, StaffId, normalize_instant};
use std::collections::{HashMap, HashSet};
use time::{Date, OffsetDateTime, Time, Weekday};

/// A period during which a staff member can work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AvailabilityWindow {
    /// A one-off window between two instants.
    Absolute {
        /// Window start (UTC).
        start: OffsetDateTime,
        /// Window end (UTC).
        end: OffsetDateTime,
    },
    /// A window repeating at the same site-local time of day.
    Recurring {
        /// The weekday the window applies to. `None` means every day.
        weekday: Option<Weekday>,
        /// Local start time.
        start_time: Time,
        /// Local end time.
        end_time: Time,
    },
}

impl AvailabilityWindow {
    /// Creates an absolute window.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidSessionWindow` if `end` is not after `start`.
    pub fn absolute(start: OffsetDateTime, end: OffsetDateTime) -> Result<Self, DomainError> {
        let start: OffsetDateTime = normalize_instant(start);
        let end: OffsetDateTime = normalize_instant(end);
        if end <= start {
            return Err(DomainError::InvalidSessionWindow { start, end });
        }
        Ok(Self::Absolute { start, end })
    }

    /// Creates a recurring window.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTimeWindow` if `end_time` is not after `start_time`.
    pub fn recurring(
        weekday: Option<Weekday>,
        start_time: Time,
        end_time: Time,
    ) -> Result<Self, DomainError> {
        if end_time <= start_time {
            return Err(DomainError::InvalidTimeWindow {
                start: start_time,
                end: end_time,
            });
        }
        Ok(Self::Recurring {
            weekday,
            start_time,
            end_time,
        })
    }

    /// Checks whether this window fully covers `[start, end)`.
    ///
    /// A recurring window only covers periods that begin and end on the same
    /// local date.
    ///
    /// # Errors
    ///
    /// Returns an error if the instants cannot be converted to site-local time.
    pub fn covers(
        &self,
        timezone: &SiteTimezone,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<bool, DomainError> {
        match *self {
            Self::Absolute {
                start: window_start,
                end: window_end,
            } => Ok(window_start <= start && end <= window_end),
            Self::Recurring {
                weekday,
                start_time,
                end_time,
            } => {
                let (start_date, local_start): (Date, Time) = timezone.local_date_time(start)?;
                let (end_date, local_end): (Date, Time) = timezone.local_date_time(end)?;
                if start_date != end_date {
                    return Ok(false);
                }
                if weekday.is_some_and(|w| w != start_date.weekday()) {
                    return Ok(false);
                }
                Ok(start_time <= local_start && local_end <= end_time)
            }
        }
    }
}

/// Everything the collaborator knows about one staff member's availability.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaffAvailability {
    /// Windows during which the staff member can work.
    pub windows: Vec<AvailabilityWindow>,
    /// Groups the staff member prefers.
    pub preferred_groups: HashSet<GroupId>,
    /// Site-local dates the staff member cannot work at all.
    pub blocked_dates: HashSet<Date>,
}

/// Read-only query interface over availability facts.
pub trait AvailabilitySource {
    /// Returns whether the staff member has an explicit block on `date`.
    fn is_blocked_on(&self, staff_id: StaffId, date: Date) -> bool;

    /// Returns whether some availability window fully covers `[start, end)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the instants cannot be evaluated in site-local time.
    fn is_available_during(
        &self,
        staff_id: StaffId,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<bool, DomainError>;

    /// Returns whether the staff member prefers `group_id`.
    fn prefers_group(&self, staff_id: StaffId, group_id: GroupId) -> bool;
}

/// An in-memory snapshot of availability facts for one site.
///
/// Staff members absent from the snapshot have no windows, no preferences
/// and no blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailabilitySnapshot {
    timezone: SiteTimezone,
    staff: HashMap<StaffId, StaffAvailability>,
}

impl AvailabilitySnapshot {
    /// Creates an empty snapshot for a site.
    #[must_use]
    pub fn new(timezone: SiteTimezone) -> Self {
        Self {
            timezone,
            staff: HashMap::new(),
        }
    }

    /// Replaces the facts recorded for a staff member.
    pub fn insert(&mut self, staff_id: StaffId, availability: StaffAvailability) {
        self.staff.insert(staff_id, availability);
    }

    /// Returns the facts recorded for a staff member, if any.
    #[must_use]
    pub fn get(&self, staff_id: StaffId) -> Option<&StaffAvailability> {
        self.staff.get(&staff_id)
    }

    /// Returns the site timezone.
    #[must_use]
    pub const fn timezone(&self) -> &SiteTimezone {
        &self.timezone
    }
}

impl AvailabilitySource for AvailabilitySnapshot {
    fn is_blocked_on(&self, staff_id: StaffId, date: Date) -> bool {
        self.get(staff_id)
            .is_some_and(|a| a.blocked_dates.contains(&date))
    }

    fn is_available_during(
        &self,
        staff_id: StaffId,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<bool, DomainError> {
        let Some(availability) = self.get(staff_id) else {
            return Ok(false);
        };
        for window in &availability.windows {
            if window.covers(&self.timezone, start, end)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn prefers_group(&self, staff_id: StaffId, group_id: GroupId) -> bool {
        self.get(staff_id)
            .is_some_and(|a| a.preferred_groups.contains(&group_id))
    }
}
