// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Role resolution.
//!
//! The identity collaborator names a role for the acting staff member. Roles
//! are resolved here into the capability set the core checks against; the
//! core itself never sees role names except as an audit label.

use std::str::FromStr;

use rotaplan::{CapabilitySet, Permission, Principal};
use rotaplan_domain::{OrganizationId, StaffId};

use crate::error::ApiError;

/// Roles the identity collaborator may assign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Full control, including collaborator sync endpoints.
    Admin,
    /// Plans sessions and manages assignments.
    Scheduler,
    /// Answers their own assignments and swaps.
    Staff,
}

impl Role {
    /// Returns the role name as supplied on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Scheduler => "scheduler",
            Self::Staff => "staff",
        }
    }

    /// Returns the permissions granted to this role.
    ///
    /// Acting on one's own assignments and swap requests needs no permission;
    /// the core authorizes those by identity.
    #[must_use]
    pub fn capabilities(self) -> CapabilitySet {
        match self {
            Self::Admin => CapabilitySet::from_permissions(&[
                Permission::ManageSessions,
                Permission::ManageAssignments,
                Permission::ViewSchedule,
                Permission::ReadEvents,
                Permission::SyncAvailability,
            ]),
            Self::Scheduler => CapabilitySet::from_permissions(&[
                Permission::ManageSessions,
                Permission::ManageAssignments,
                Permission::ViewSchedule,
                Permission::ReadEvents,
            ]),
            Self::Staff => CapabilitySet::from_permissions(&[Permission::ViewSchedule]),
        }
    }
}

impl FromStr for Role {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "scheduler" => Ok(Self::Scheduler),
            "staff" => Ok(Self::Staff),
            _ => Err(ApiError::InvalidArgument {
                field: String::from("role"),
                message: format!(
                    "Invalid role: '{s}'. Must be 'admin', 'scheduler' or 'staff'"
                ),
            }),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Builds the principal for a trusted identity.
///
/// # Arguments
///
/// * `staff_id` - The acting staff member
/// * `organization_id` - The organization the request acts in
/// * `role` - The role name supplied by the identity collaborator
///
/// # Errors
///
/// Returns `ApiError::InvalidArgument` if the role is not recognized.
pub fn resolve_principal(
    staff_id: i64,
    organization_id: i64,
    role: &str,
) -> Result<Principal, ApiError> {
    let role: Role = role.parse()?;
    Ok(Principal::new(
        StaffId::new(staff_id),
        OrganizationId::new(organization_id),
        role.as_str().to_string(),
        role.capabilities(),
    ))
}
