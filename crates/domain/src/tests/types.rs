// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    AssignmentStatus, DomainError, GroupId, OrganizationId, Session, SessionId, StaffId,
    SwapStatus,
};
use std::str::FromStr;
use time::macros::datetime;

#[test]
fn test_assignment_status_transitions() {
    assert!(AssignmentStatus::Pending.can_transition_to(AssignmentStatus::Confirmed));
    assert!(AssignmentStatus::Pending.can_transition_to(AssignmentStatus::Declined));
    assert!(!AssignmentStatus::Pending.can_transition_to(AssignmentStatus::Pending));
    assert!(!AssignmentStatus::Confirmed.can_transition_to(AssignmentStatus::Declined));
    assert!(!AssignmentStatus::Declined.can_transition_to(AssignmentStatus::Confirmed));
    assert!(!AssignmentStatus::Confirmed.can_transition_to(AssignmentStatus::Pending));
}

#[test]
fn test_terminal_statuses_reject_every_transition() {
    for from in [AssignmentStatus::Confirmed, AssignmentStatus::Declined] {
        assert!(from.is_terminal());
        for to in [
            AssignmentStatus::Pending,
            AssignmentStatus::Confirmed,
            AssignmentStatus::Declined,
        ] {
            assert_eq!(
                from.transition_to(to),
                Err(DomainError::InvalidAssignmentTransition { from, to })
            );
        }
    }
}

#[test]
fn test_assignment_status_parse_is_case_insensitive() {
    assert_eq!(
        AssignmentStatus::from_str("Confirmed").unwrap(),
        AssignmentStatus::Confirmed
    );
    assert!(matches!(
        AssignmentStatus::from_str("maybe"),
        Err(DomainError::InvalidAssignmentStatus(_))
    ));
}

#[test]
fn test_swap_status_only_leaves_requested() {
    assert_eq!(
        SwapStatus::Requested.transition_to(SwapStatus::Accepted),
        Ok(SwapStatus::Accepted)
    );
    assert_eq!(
        SwapStatus::Requested.transition_to(SwapStatus::Declined),
        Ok(SwapStatus::Declined)
    );
    assert!(SwapStatus::Accepted.transition_to(SwapStatus::Declined).is_err());
    assert!(SwapStatus::Declined.transition_to(SwapStatus::Accepted).is_err());
}

#[test]
fn test_status_wire_names() {
    assert_eq!(AssignmentStatus::Pending.as_str(), "pending");
    assert_eq!(SwapStatus::Requested.as_str(), "REQUESTED");
    assert_eq!(
        SwapStatus::from_str("accepted").unwrap(),
        SwapStatus::Accepted
    );
}

#[test]
fn test_session_requires_end_after_start() {
    let result = Session::new(
        OrganizationId::new(1),
        "Evening",
        datetime!(2025-01-06 10:00 UTC),
        datetime!(2025-01-06 09:00 UTC),
        vec![GroupId::new(1)],
    );
    assert!(matches!(result, Err(DomainError::InvalidSessionWindow { .. })));
}

#[test]
fn test_session_normalizes_instants_to_utc() {
    let session: Session = Session::new(
        OrganizationId::new(1),
        "  Evening  ",
        datetime!(2025-01-06 10:00:00.750 +02:00),
        datetime!(2025-01-06 11:00 +02:00),
        Vec::new(),
    )
    .unwrap();

    assert_eq!(session.title(), "Evening");
    assert_eq!(session.start(), datetime!(2025-01-06 08:00 UTC));
    assert_eq!(session.primary_group(), None);
    assert_eq!(session.session_id(), None);
}

#[test]
fn test_session_primary_group_is_first() {
    let session: Session = Session::new(
        OrganizationId::new(1),
        "Evening",
        datetime!(2025-01-06 10:00 UTC),
        datetime!(2025-01-06 11:00 UTC),
        vec![GroupId::new(5), GroupId::new(3)],
    )
    .unwrap()
    .with_id(SessionId::new(12));

    assert_eq!(session.primary_group(), Some(GroupId::new(5)));
    assert_eq!(session.session_id(), Some(SessionId::new(12)));
}

#[test]
fn test_session_repeated_groups_collapse() {
    let session: Session = Session::new(
        OrganizationId::new(1),
        "Evening",
        datetime!(2025-01-06 10:00 UTC),
        datetime!(2025-01-06 11:00 UTC),
        vec![GroupId::new(5), GroupId::new(5), GroupId::new(3), GroupId::new(5)],
    )
    .unwrap();

    assert_eq!(session.group_ids(), &[GroupId::new(5), GroupId::new(3)]);
    assert_eq!(session.primary_group(), Some(GroupId::new(5)));
}

#[test]
fn test_ids_serialize_transparently() {
    assert_eq!(serde_json::to_string(&StaffId::new(42)).unwrap(), "42");
    assert_eq!(StaffId::new(42).to_string(), "42");
}
