// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

/// Declares a canonical numeric identifier newtype.
///
/// Identifiers are assigned by the store (or by an external collaborator for
/// staff, groups and organizations) and are opaque to the domain.
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw identifier.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw identifier.
            #[must_use]
            pub const fn value(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Identifies an organization (site).
    OrganizationId
);
entity_id!(
    /// Identifies a staff member. Owned by the identity collaborator.
    StaffId
);
entity_id!(
    /// Identifies a target group a session is held for.
    GroupId
);
entity_id!(
    /// Identifies a persisted session.
    SessionId
);
entity_id!(
    /// Identifies a persisted assignment.
    AssignmentId
);
entity_id!(
    /// Identifies a persisted swap request.
    SwapRequestId
);

/// Lifecycle status of a staff-to-session assignment.
///
/// Valid transitions are:
/// - `Pending` → `Confirmed`
/// - `Pending` → `Declined`
///
/// Both `Confirmed` and `Declined` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    /// Offered to the staff member, awaiting their answer.
    #[default]
    Pending,
    /// Accepted by the staff member.
    Confirmed,
    /// Refused by the staff member.
    Declined,
}

impl FromStr for AssignmentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "declined" => Ok(Self::Declined),
            _ => Err(DomainError::InvalidAssignmentStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl AssignmentStatus {
    /// Converts this status to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Declined => "declined",
        }
    }

    /// Checks if a transition from this status to another is valid.
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Confirmed) | (Self::Pending, Self::Declined)
        )
    }

    /// Returns whether no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Declined)
    }

    /// Validates a status change, returning the target on success.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidAssignmentTransition` if the change is not permitted.
    pub const fn transition_to(self, target: Self) -> Result<Self, DomainError> {
        if self.can_transition_to(target) {
            Ok(target)
        } else {
            Err(DomainError::InvalidAssignmentTransition {
                from: self,
                to: target,
            })
        }
    }
}

/// Lifecycle status of a swap request.
///
/// `Requested` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapStatus {
    /// Awaiting an answer from the receiving staff member.
    #[default]
    Requested,
    /// Accepted; the assignment has moved to the receiving staff member.
    Accepted,
    /// Declined; the assignment is unchanged.
    Declined,
}

impl FromStr for SwapStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "REQUESTED" => Ok(Self::Requested),
            "ACCEPTED" => Ok(Self::Accepted),
            "DECLINED" => Ok(Self::Declined),
            _ => Err(DomainError::InvalidSwapStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl SwapStatus {
    /// Converts this status to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Requested => "REQUESTED",
            Self::Accepted => "ACCEPTED",
            Self::Declined => "DECLINED",
        }
    }

    /// Validates a status change, returning the target on success.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidSwapTransition` unless this status is
    /// `Requested` and the target is terminal.
    pub const fn transition_to(self, target: Self) -> Result<Self, DomainError> {
        if matches!(
            (self, target),
            (Self::Requested, Self::Accepted) | (Self::Requested, Self::Declined)
        ) {
            Ok(target)
        } else {
            Err(DomainError::InvalidSwapTransition {
                from: self,
                to: target,
            })
        }
    }
}

/// A scheduled activity instance.
///
/// Instants are held in UTC with whole-second precision so that stored
/// values order lexically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// The canonical identifier. `None` until persisted.
    session_id: Option<SessionId>,
    /// The organization (site) the session belongs to.
    organization_id: OrganizationId,
    /// The display title.
    title: String,
    /// Session start (UTC).
    start: OffsetDateTime,
    /// Session end (UTC).
    end: OffsetDateTime,
    /// Target groups. May be empty for ad-hoc sessions.
    group_ids: Vec<GroupId>,
}

impl Session {
    /// Creates a new, unpersisted session. Repeated group ids collapse to
    /// their first occurrence.
    ///
    /// # Errors
    ///
    /// Returns an error if the title is empty or `end` is not after `start`.
    pub fn new(
        organization_id: OrganizationId,
        title: &str,
        start: OffsetDateTime,
        end: OffsetDateTime,
        group_ids: Vec<GroupId>,
    ) -> Result<Self, DomainError> {
        let title: String = crate::validation::validate_title(title)?;
        let start: OffsetDateTime = normalize_instant(start);
        let end: OffsetDateTime = normalize_instant(end);
        if end <= start {
            return Err(DomainError::InvalidSessionWindow { start, end });
        }
        let mut unique_groups: Vec<GroupId> = Vec::with_capacity(group_ids.len());
        for group_id in group_ids {
            if !unique_groups.contains(&group_id) {
                unique_groups.push(group_id);
            }
        }
        Ok(Self {
            session_id: None,
            organization_id,
            title,
            start,
            end,
            group_ids: unique_groups,
        })
    }

    /// Attaches the persisted identifier.
    #[must_use]
    pub fn with_id(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    /// Returns the canonical identifier if persisted.
    #[must_use]
    pub const fn session_id(&self) -> Option<SessionId> {
        self.session_id
    }

    /// Returns the owning organization.
    #[must_use]
    pub const fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the start instant (UTC).
    #[must_use]
    pub const fn start(&self) -> OffsetDateTime {
        self.start
    }

    /// Returns the end instant (UTC).
    #[must_use]
    pub const fn end(&self) -> OffsetDateTime {
        self.end
    }

    /// Returns the target groups.
    #[must_use]
    pub fn group_ids(&self) -> &[GroupId] {
        &self.group_ids
    }

    /// Returns the group used for eligibility checks, if any.
    #[must_use]
    pub fn primary_group(&self) -> Option<GroupId> {
        self.group_ids.first().copied()
    }
}

/// The binding of one staff member to one session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Assignment {
    /// The canonical identifier.
    pub assignment_id: AssignmentId,
    /// The session being covered.
    pub session_id: SessionId,
    /// The current holder.
    pub staff_id: StaffId,
    /// Free-form role label (e.g. "Lead", "Support").
    pub role: String,
    /// Lifecycle status.
    pub status: AssignmentStatus,
}

/// A proposal to move an assignment to another staff member.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SwapRequest {
    /// The canonical identifier.
    pub swap_request_id: SwapRequestId,
    /// The assignment being offered.
    pub assignment_id: AssignmentId,
    /// The holder at request time.
    pub from_staff_id: StaffId,
    /// The proposed new holder.
    pub to_staff_id: StaffId,
    /// Lifecycle status.
    pub status: SwapStatus,
}

/// Converts an instant to UTC and drops sub-second precision.
pub(crate) fn normalize_instant(instant: OffsetDateTime) -> OffsetDateTime {
    let utc: OffsetDateTime = instant.to_offset(time::UtcOffset::UTC);
    utc.replace_nanosecond(0).unwrap_or(utc)
}
