// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use rotaplan::CoreError;
use rotaplan_domain::DomainError;
use rotaplan_persistence::PersistenceError;

/// API-level errors.
///
/// These are distinct from domain/core/persistence errors and represent the
/// API contract. Every variant maps to exactly one caller-visible kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Invalid input was provided.
    InvalidArgument {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// The principal may not perform the action.
    Forbidden {
        /// The action that was attempted.
        action: String,
        /// Why it was refused.
        reason: String,
    },
    /// A requested resource was not found.
    NotFound {
        /// A human-readable description of what was missing.
        message: String,
    },
    /// The write conflicts with existing state.
    Conflict {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// The requested lifecycle transition is not permitted.
    InvalidTransition {
        /// A human-readable description of the refused transition.
        message: String,
    },
    /// The usage gate refused the write.
    QuotaExceeded {
        /// The organization over its usage cap.
        organization_id: i64,
        /// The operation that was refused.
        operation: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl ApiError {
    /// Returns the stable error kind exposed to callers.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidArgument { .. } => "invalid_argument",
            Self::Forbidden { .. } => "forbidden",
            Self::NotFound { .. } => "not_found",
            Self::Conflict { .. } => "conflict",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::QuotaExceeded { .. } => "quota_exceeded",
            Self::Internal { .. } => "internal",
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::Forbidden { action, reason } => {
                write!(f, "Forbidden: '{action}' {reason}")
            }
            Self::NotFound { message } => write!(f, "Not found: {message}"),
            Self::Conflict { message } => write!(f, "Conflict: {message}"),
            Self::InvalidTransition { message } => write!(f, "Invalid transition: {message}"),
            Self::QuotaExceeded {
                organization_id,
                operation,
            } => write!(
                f,
                "Organization {organization_id} has exceeded its usage cap; '{operation}' refused"
            ),
            Self::Internal { message } => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Translates a domain error into an API error.
///
/// This explicit translation ensures domain errors are not leaked directly
/// and allows the API to provide appropriate error messages.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let field: &str = match &err {
        DomainError::InvalidAssignmentTransition { .. }
        | DomainError::InvalidSwapTransition { .. }
        | DomainError::SwapOfDeclinedAssignment { .. } => {
            return ApiError::InvalidTransition {
                message: err.to_string(),
            };
        }
        DomainError::InvalidDateRange { .. } | DomainError::RotaRangeTooLong { .. } => {
            "date_range"
        }
        DomainError::EmptyWeekdaySet | DomainError::InvalidWeekday(_) => "days_of_week",
        DomainError::EmptyGroupSet => "group_ids",
        DomainError::InvalidTimeWindow { .. } | DomainError::TimeParseError { .. } => {
            "time_window"
        }
        DomainError::InvalidSessionWindow { .. } | DomainError::InstantParseError { .. } => {
            "window"
        }
        DomainError::InvalidTimezone(_) => "timezone",
        DomainError::UnresolvableLocalTime { .. } => "start_time",
        DomainError::InvalidAssignmentStatus(_) | DomainError::InvalidInitialStatus(_) => {
            "status"
        }
        DomainError::InvalidSwapStatus(_) => "swap_status",
        DomainError::SwapWithSelf { .. } => "to_staff_id",
        DomainError::InvalidRole(_) => "role",
        DomainError::InvalidTitle(_) => "title",
        DomainError::TooManySessions { .. } => "schedule",
        DomainError::DateParseError { .. } => "date",
        DomainError::DateArithmeticOverflow { .. } => {
            return ApiError::Internal {
                message: err.to_string(),
            };
        }
    };

    ApiError::InvalidArgument {
        field: field.to_string(),
        message: err.to_string(),
    }
}

/// Translates a core error into an API error.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::Forbidden { action, reason } => ApiError::Forbidden { action, reason },
        CoreError::NotFound { resource, id } => ApiError::NotFound {
            message: format!("{resource} {id}"),
        },
    }
}

/// Translates a persistence error into an API error.
///
/// Constraint and guard failures are caller-visible; everything else is an
/// internal store failure.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::NotFound(message) | PersistenceError::ForeignKeyViolation(message) => {
            ApiError::NotFound { message }
        }
        PersistenceError::UniqueViolation(_) => ApiError::Conflict {
            message: String::from(
                "the write conflicts with an existing assignment or outstanding swap request",
            ),
        },
        err @ PersistenceError::HolderChanged { .. } => ApiError::Conflict {
            message: err.to_string(),
        },
        err @ PersistenceError::StatusChanged { .. } => ApiError::InvalidTransition {
            message: err.to_string(),
        },
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rotaplan_domain::{AssignmentStatus, StaffId};

    #[test]
    fn test_assignment_transition_maps_to_invalid_transition() {
        let err: ApiError = translate_domain_error(DomainError::InvalidAssignmentTransition {
            from: AssignmentStatus::Confirmed,
            to: AssignmentStatus::Declined,
        });
        assert_eq!(err.kind(), "invalid_transition");
    }

    #[test]
    fn test_swap_with_self_names_the_field() {
        let err: ApiError = translate_domain_error(DomainError::SwapWithSelf {
            staff_id: StaffId::new(4),
        });
        assert!(matches!(
            err,
            ApiError::InvalidArgument { ref field, .. } if field == "to_staff_id"
        ));
    }

    #[test]
    fn test_guard_failures_are_caller_visible() {
        let holder: ApiError = translate_persistence_error(PersistenceError::HolderChanged {
            assignment_id: 1,
            expected_staff_id: 2,
        });
        assert_eq!(holder.kind(), "conflict");

        let status: ApiError = translate_persistence_error(PersistenceError::StatusChanged {
            entity: String::from("Assignment"),
            id: 1,
            expected: String::from("pending"),
            actual: String::from("confirmed"),
        });
        assert_eq!(status.kind(), "invalid_transition");

        let unique: ApiError =
            translate_persistence_error(PersistenceError::UniqueViolation(String::new()));
        assert_eq!(unique.kind(), "conflict");
    }

    #[test]
    fn test_store_failures_are_internal() {
        let err: ApiError =
            translate_persistence_error(PersistenceError::DatabaseError(String::from("disk")));
        assert_eq!(err.kind(), "internal");
    }
}
