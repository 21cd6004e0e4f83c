// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The acting identity and what it may do.
//!
//! Identity and role resolution belong to an external collaborator. The core
//! only receives the result: a staff id, the organization it acts in, and a
//! set of granted permissions. There is no ambient role state.

use crate::error::CoreError;
use rotaplan_audit::Actor;
use rotaplan_domain::{OrganizationId, StaffId};

/// A single grantable permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Create sessions, singly or in bulk.
    ManageSessions,
    /// Offer, remove and administratively transition assignments.
    ManageAssignments,
    /// Read sessions, assignments, eligibility and the rota.
    ViewSchedule,
    /// Read the organization's schedule event outbox.
    ReadEvents,
    /// Write directory and availability facts on behalf of the collaborator.
    SyncAvailability,
}

impl Permission {
    const fn bit(self) -> u8 {
        match self {
            Self::ManageSessions => 1,
            Self::ManageAssignments => 1 << 1,
            Self::ViewSchedule => 1 << 2,
            Self::ReadEvents => 1 << 3,
            Self::SyncAvailability => 1 << 4,
        }
    }

    /// Returns the permission name used in error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ManageSessions => "manage_sessions",
            Self::ManageAssignments => "manage_assignments",
            Self::ViewSchedule => "view_schedule",
            Self::ReadEvents => "read_events",
            Self::SyncAvailability => "sync_availability",
        }
    }
}

/// The set of permissions granted to a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CapabilitySet {
    bits: u8,
}

impl CapabilitySet {
    /// Creates an empty set.
    #[must_use]
    pub const fn none() -> Self {
        Self { bits: 0 }
    }

    /// Creates a set from the given permissions.
    #[must_use]
    pub fn from_permissions(permissions: &[Permission]) -> Self {
        permissions
            .iter()
            .fold(Self::none(), |set, permission| set.with(*permission))
    }

    /// Returns a copy of this set with `permission` granted.
    #[must_use]
    pub const fn with(self, permission: Permission) -> Self {
        Self {
            bits: self.bits | permission.bit(),
        }
    }

    /// Checks whether `permission` is granted.
    #[must_use]
    pub const fn allows(&self, permission: Permission) -> bool {
        self.bits & permission.bit() != 0
    }
}

/// The acting staff member plus granted capabilities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// The acting staff member.
    pub staff_id: StaffId,
    /// The organization the principal acts in.
    pub organization_id: OrganizationId,
    /// The role name the capabilities were resolved from.
    pub role: String,
    /// The granted permissions.
    pub capabilities: CapabilitySet,
}

impl Principal {
    /// Creates a new principal.
    ///
    /// # Arguments
    ///
    /// * `staff_id` - The acting staff member
    /// * `organization_id` - The organization the principal acts in
    /// * `role` - The role name, recorded on schedule events
    /// * `capabilities` - The granted permissions
    #[must_use]
    pub const fn new(
        staff_id: StaffId,
        organization_id: OrganizationId,
        role: String,
        capabilities: CapabilitySet,
    ) -> Self {
        Self {
            staff_id,
            organization_id,
            role,
            capabilities,
        }
    }

    /// Checks whether this principal holds `permission`.
    #[must_use]
    pub const fn can(&self, permission: Permission) -> bool {
        self.capabilities.allows(permission)
    }

    /// Requires `permission` for `action`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Forbidden` if the permission is not granted.
    pub fn require(&self, permission: Permission, action: &str) -> Result<(), CoreError> {
        if self.can(permission) {
            Ok(())
        } else {
            Err(CoreError::Forbidden {
                action: action.to_string(),
                reason: format!("requires the '{}' permission", permission.as_str()),
            })
        }
    }

    /// Converts this principal into the audit actor recorded on events.
    #[must_use]
    pub fn to_actor(&self) -> Actor {
        Actor::new(self.staff_id.to_string(), self.role.clone())
    }
}
