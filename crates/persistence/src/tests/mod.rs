// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod concurrency_tests;
mod event_tests;

use crate::Persistence;
use rotaplan::{CapabilitySet, Command, Permission, Principal, TransitionResult, apply};
use rotaplan_audit::Cause;
use rotaplan_domain::{
    Assignment, AssignmentId, AssignmentStatus, GroupId, OrganizationId, Session, SessionId,
    StaffId, SwapRequestId,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use time::macros::datetime;

pub const ORG: OrganizationId = OrganizationId::new(1);
pub const OTHER_ORG: OrganizationId = OrganizationId::new(2);
pub const SCHEDULER: StaffId = StaffId::new(100);
pub const HOLDER: StaffId = StaffId::new(200);
pub const PEER: StaffId = StaffId::new(300);
pub const THIRD: StaffId = StaffId::new(400);

static FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("test-cause"), String::from("Test operation"))
}

pub fn create_scheduler() -> Principal {
    create_scheduler_in(ORG)
}

pub fn create_scheduler_in(organization_id: OrganizationId) -> Principal {
    Principal::new(
        SCHEDULER,
        organization_id,
        String::from("scheduler"),
        CapabilitySet::from_permissions(&[
            Permission::ManageSessions,
            Permission::ManageAssignments,
            Permission::ViewSchedule,
            Permission::ReadEvents,
        ]),
    )
}

pub fn create_staff(staff_id: StaffId) -> Principal {
    Principal::new(
        staff_id,
        ORG,
        String::from("staff"),
        CapabilitySet::from_permissions(&[Permission::ViewSchedule]),
    )
}

/// Returns a fresh database file path under the system temp directory.
pub fn temp_database_path() -> PathBuf {
    let id: u64 = FILE_COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!(
        "rotaplan_test_{}_{id}.sqlite",
        std::process::id()
    ))
}

/// Removes a test database file and its WAL side files.
pub fn remove_database_files(path: &PathBuf) {
    for suffix in ["", "-wal", "-shm"] {
        let mut file = path.clone().into_os_string();
        file.push(suffix);
        let _ = std::fs::remove_file(file);
    }
}

pub fn persist(persistence: &mut Persistence, result: &TransitionResult) -> i64 {
    persistence.persist_transition(result).unwrap().event_id
}

/// Creates the Monday morning session and returns its id.
pub fn seed_session(persistence: &mut Persistence) -> SessionId {
    seed_session_at(persistence, ORG, datetime!(2025-01-06 09:00 UTC))
}

pub fn seed_session_at(
    persistence: &mut Persistence,
    organization_id: OrganizationId,
    start: time::OffsetDateTime,
) -> SessionId {
    let session: Session = Session::new(
        organization_id,
        "Morning clinic",
        start,
        start + time::Duration::hours(3),
        vec![GroupId::new(5), GroupId::new(6)],
    )
    .unwrap();
    let result: TransitionResult = apply(
        &create_scheduler_in(organization_id),
        Command::CreateSession { session },
        create_test_cause(),
    )
    .unwrap();
    persistence.persist_transition(&result).unwrap().session_ids[0]
}

/// Offers `staff_id` a pending assignment on the session.
pub fn seed_assignment(
    persistence: &mut Persistence,
    session_id: SessionId,
    staff_id: StaffId,
) -> AssignmentId {
    let session: Session = persistence.get_session(ORG, session_id).unwrap();
    let result: TransitionResult = apply(
        &create_scheduler(),
        Command::CreateAssignment {
            session,
            staff_id,
            role: String::from("Lead"),
            initial_status: AssignmentStatus::Pending,
        },
        create_test_cause(),
    )
    .unwrap();
    match persistence.persist_transition(&result).unwrap().created {
        Some(rotaplan_audit::EntityRef::Assignment(id)) => id,
        other => panic!("expected an assignment, got {other:?}"),
    }
}

/// Has the holder offer the assignment to `to`.
pub fn seed_swap(
    persistence: &mut Persistence,
    assignment_id: AssignmentId,
    to: StaffId,
) -> SwapRequestId {
    let assignment: Assignment = persistence.get_assignment(ORG, assignment_id).unwrap();
    let result: TransitionResult = apply(
        &create_staff(assignment.staff_id),
        Command::RequestSwap {
            assignment,
            to_staff_id: to,
        },
        create_test_cause(),
    )
    .unwrap();
    match persistence.persist_transition(&result).unwrap().created {
        Some(rotaplan_audit::EntityRef::SwapRequest(id)) => id,
        other => panic!("expected a swap request, got {other:?}"),
    }
}
