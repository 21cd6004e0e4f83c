// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use rotaplan_domain::DomainError;

/// Errors that can occur while deciding a state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// The principal may not perform the action.
    Forbidden {
        /// The action that was attempted.
        action: String,
        /// Why it was refused.
        reason: String,
    },
    /// The target entity does not exist in the principal's organization.
    NotFound {
        /// The kind of entity.
        resource: String,
        /// The identifier that was looked up.
        id: i64,
    },
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::Forbidden { action, reason } => {
                write!(f, "Forbidden: '{action}' {reason}")
            }
            Self::NotFound { resource, id } => write!(f, "{resource} {id} not found"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}
