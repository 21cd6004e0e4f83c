// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{CapabilitySet, Permission, Principal};
use rotaplan_audit::Cause;
use rotaplan_domain::{
    Assignment, AssignmentId, AssignmentStatus, GroupId, OrganizationId, Session, SessionId,
    StaffId, SwapRequest, SwapRequestId, SwapStatus,
};
use time::macros::datetime;

pub const ORG: OrganizationId = OrganizationId::new(1);
pub const SCHEDULER: StaffId = StaffId::new(100);
pub const HOLDER: StaffId = StaffId::new(200);
pub const PEER: StaffId = StaffId::new(300);

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Test request"))
}

pub fn create_scheduler() -> Principal {
    Principal::new(
        SCHEDULER,
        ORG,
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

pub fn create_persisted_session() -> Session {
    Session::new(
        ORG,
        "Morning clinic",
        datetime!(2025-01-06 09:00 UTC),
        datetime!(2025-01-06 12:00 UTC),
        vec![GroupId::new(5)],
    )
    .unwrap()
    .with_id(SessionId::new(10))
}

pub fn create_assignment(status: AssignmentStatus) -> Assignment {
    Assignment {
        assignment_id: AssignmentId::new(20),
        session_id: SessionId::new(10),
        staff_id: HOLDER,
        role: String::from("Lead"),
        status,
    }
}

pub fn create_swap(status: SwapStatus) -> SwapRequest {
    SwapRequest {
        swap_request_id: SwapRequestId::new(30),
        assignment_id: AssignmentId::new(20),
        from_staff_id: HOLDER,
        to_staff_id: PEER,
        status,
    }
}
