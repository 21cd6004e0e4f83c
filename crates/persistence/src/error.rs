// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::result::DatabaseErrorKind;

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// A database error occurred.
    DatabaseError(String),
    /// Database connection failed.
    DatabaseConnectionFailed(String),
    /// Database migration failed.
    MigrationFailed(String),
    /// Query execution failed.
    QueryFailed(String),
    /// A stored row could not be turned back into a domain value.
    ReconstructionError(String),
    /// Serialization/deserialization error.
    SerializationError(String),
    /// Initialization error.
    InitializationError(String),
    /// Foreign key enforcement is not enabled.
    ForeignKeyEnforcementNotEnabled,
    /// The requested resource was not found.
    NotFound(String),
    /// A uniqueness rule rejected the write.
    ///
    /// Raised for a duplicate `(session, staff)` assignment and for a second
    /// outstanding swap on the same assignment.
    UniqueViolation(String),
    /// A referenced row does not exist.
    ForeignKeyViolation(String),
    /// A guarded update found the row in a different status than expected.
    StatusChanged {
        /// The kind of entity (e.g. "Assignment").
        entity: String,
        /// The entity's identifier.
        id: i64,
        /// The status the update expected.
        expected: String,
        /// The status actually stored.
        actual: String,
    },
    /// The assignment is no longer held by the expected staff member.
    HolderChanged {
        /// The assignment's identifier.
        assignment_id: i64,
        /// The holder the write expected.
        expected_staff_id: i64,
    },
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::DatabaseConnectionFailed(msg) => {
                write!(f, "Database connection failed: {msg}")
            }
            Self::MigrationFailed(msg) => write!(f, "Migration failed: {msg}"),
            Self::QueryFailed(msg) => write!(f, "Query failed: {msg}"),
            Self::ReconstructionError(msg) => write!(f, "Row reconstruction error: {msg}"),
            Self::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
            Self::InitializationError(msg) => write!(f, "Initialization error: {msg}"),
            Self::ForeignKeyEnforcementNotEnabled => {
                write!(f, "Foreign key enforcement is not enabled")
            }
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::UniqueViolation(msg) => write!(f, "Uniqueness violated: {msg}"),
            Self::ForeignKeyViolation(msg) => write!(f, "Referenced row missing: {msg}"),
            Self::StatusChanged {
                entity,
                id,
                expected,
                actual,
            } => write!(
                f,
                "{entity} {id} is {actual}, expected {expected}; it was changed concurrently"
            ),
            Self::HolderChanged {
                assignment_id,
                expected_staff_id,
            } => write!(
                f,
                "Assignment {assignment_id} is no longer held by staff {expected_staff_id}"
            ),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<diesel::result::Error> for PersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => Self::NotFound("Record not found".to_string()),
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                Self::UniqueViolation(info.message().to_string())
            }
            diesel::result::Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                Self::ForeignKeyViolation(info.message().to_string())
            }
            _ => Self::DatabaseError(err.to_string()),
        }
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::DatabaseConnectionFailed(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<rotaplan_domain::DomainError> for PersistenceError {
    fn from(err: rotaplan_domain::DomainError) -> Self {
        Self::ReconstructionError(err.to_string())
    }
}
