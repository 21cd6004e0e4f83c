// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Usage-cap gate.
//!
//! Billing owns the usage cap. Before an assignment write commits, the API
//! asks the gate whether the organization may perform it.

use std::collections::HashSet;

use rotaplan_domain::OrganizationId;
use tracing::warn;

use crate::error::ApiError;

/// Write operations subject to the usage cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatedOperation {
    /// Creating an assignment, directly or as a bulk pre-assignment.
    CreateAssignment,
    /// Moving an assignment to a new status.
    TransitionAssignment,
}

impl GatedOperation {
    /// Returns the operation name used in errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateAssignment => "create_assignment",
            Self::TransitionAssignment => "transition_assignment",
        }
    }
}

/// Decides whether an organization may perform a gated write.
pub trait UsageGate: Send + Sync {
    /// Returns whether `organization_id` may perform `operation` now.
    fn permits(&self, organization_id: OrganizationId, operation: GatedOperation) -> bool;
}

/// A gate configured with a fixed set of over-quota organizations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticUsageGate {
    over_quota: HashSet<OrganizationId>,
}

impl StaticUsageGate {
    /// Creates a gate that refuses every gated write for `over_quota`.
    #[must_use]
    pub fn new<I: IntoIterator<Item = OrganizationId>>(over_quota: I) -> Self {
        Self {
            over_quota: over_quota.into_iter().collect(),
        }
    }

    /// Creates a gate that permits everything.
    #[must_use]
    pub fn unlimited() -> Self {
        Self::default()
    }
}

impl UsageGate for StaticUsageGate {
    fn permits(&self, organization_id: OrganizationId, _operation: GatedOperation) -> bool {
        !self.over_quota.contains(&organization_id)
    }
}

/// Consults the gate for a write.
///
/// # Errors
///
/// Returns `ApiError::QuotaExceeded` if the gate refuses.
pub fn check_usage(
    gate: &dyn UsageGate,
    organization_id: OrganizationId,
    operation: GatedOperation,
) -> Result<(), ApiError> {
    if gate.permits(organization_id, operation) {
        return Ok(());
    }
    warn!(
        organization_id = organization_id.value(),
        operation = operation.as_str(),
        "Usage gate refused write"
    );
    Err(ApiError::QuotaExceeded {
        organization_id: organization_id.value(),
        operation: operation.as_str().to_string(),
    })
}
