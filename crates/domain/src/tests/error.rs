// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{AssignmentStatus, DomainError, StaffId};

#[test]
fn test_transition_error_names_both_states() {
    let error: DomainError = DomainError::InvalidAssignmentTransition {
        from: AssignmentStatus::Confirmed,
        to: AssignmentStatus::Declined,
    };
    assert_eq!(
        error.to_string(),
        "Assignment cannot move from 'confirmed' to 'declined'"
    );
}

#[test]
fn test_swap_with_self_message() {
    let error: DomainError = DomainError::SwapWithSelf {
        staff_id: StaffId::new(9),
    };
    assert_eq!(
        error.to_string(),
        "Staff member 9 cannot swap with themselves"
    );
}

#[test]
fn test_too_many_sessions_message() {
    let error: DomainError = DomainError::TooManySessions {
        requested: 1500,
        max: 1000,
    };
    assert!(error.to_string().contains("1500"));
    assert!(error.to_string().contains("1000"));
}

#[test]
fn test_domain_error_is_std_error() {
    let error: Box<dyn std::error::Error> = Box::new(DomainError::EmptyWeekdaySet);
    assert_eq!(error.to_string(), "At least one weekday must be selected");
}
