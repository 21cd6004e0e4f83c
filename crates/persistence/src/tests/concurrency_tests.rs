// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Two connections to one database file racing on the same decision.

use super::{
    HOLDER, ORG, PEER, THIRD, create_scheduler, create_staff, create_test_cause,
    remove_database_files, seed_assignment, seed_session, temp_database_path,
};
use crate::{Persistence, PersistenceError};
use rotaplan::{Command, TransitionResult, apply};
use rotaplan_domain::{Assignment, AssignmentStatus, Session, StaffId};
use std::sync::{Arc, Barrier};
use std::thread;

/// Runs both transitions at once on separate connections.
fn race(
    path: &std::path::Path,
    first: TransitionResult,
    second: TransitionResult,
) -> Vec<Result<(), PersistenceError>> {
    let barrier: Arc<Barrier> = Arc::new(Barrier::new(2));
    let handles: Vec<_> = [first, second]
        .into_iter()
        .map(|transition| {
            let barrier = Arc::clone(&barrier);
            let path = path.to_path_buf();
            thread::spawn(move || {
                let mut persistence: Persistence = Persistence::new_with_file(&path).unwrap();
                barrier.wait();
                persistence.persist_transition(&transition).map(|_| ())
            })
        })
        .collect();
    handles.into_iter().map(|h| h.join().unwrap()).collect()
}

fn offer(assignment: &Assignment, to: StaffId) -> TransitionResult {
    apply(
        &create_staff(assignment.staff_id),
        Command::RequestSwap {
            assignment: assignment.clone(),
            to_staff_id: to,
        },
        create_test_cause(),
    )
    .unwrap()
}

#[test]
fn test_concurrent_swap_requests_admit_exactly_one() {
    let path = temp_database_path();
    let mut persistence: Persistence = Persistence::new_with_file(&path).unwrap();
    let session_id = seed_session(&mut persistence);
    let assignment_id = seed_assignment(&mut persistence, session_id, HOLDER);
    let assignment: Assignment = persistence.get_assignment(ORG, assignment_id).unwrap();

    let outcomes = race(&path, offer(&assignment, PEER), offer(&assignment, THIRD));

    assert_eq!(outcomes.iter().filter(|o| o.is_ok()).count(), 1);
    assert!(outcomes
        .iter()
        .any(|o| matches!(o, Err(PersistenceError::UniqueViolation(_)))));

    let swaps = persistence.list_swaps_for_staff(ORG, HOLDER).unwrap();
    assert_eq!(swaps.outbound.len(), 1);

    drop(persistence);
    remove_database_files(&path);
}

#[test]
fn test_concurrent_offers_of_same_staff_admit_exactly_one() {
    let path = temp_database_path();
    let mut persistence: Persistence = Persistence::new_with_file(&path).unwrap();
    let session_id = seed_session(&mut persistence);
    let session: Session = persistence.get_session(ORG, session_id).unwrap();

    let create = |role: &str| {
        apply(
            &create_scheduler(),
            Command::CreateAssignment {
                session: session.clone(),
                staff_id: PEER,
                role: role.to_string(),
                initial_status: AssignmentStatus::Pending,
            },
            create_test_cause(),
        )
        .unwrap()
    };

    let outcomes = race(&path, create("Lead"), create("Support"));
    assert_eq!(outcomes.iter().filter(|o| o.is_ok()).count(), 1);
    assert!(outcomes
        .iter()
        .any(|o| matches!(o, Err(PersistenceError::UniqueViolation(_)))));

    // One event per committed change: session, then the single offer.
    assert_eq!(persistence.list_events(ORG, None, 0, 10).unwrap().len(), 2);

    drop(persistence);
    remove_database_files(&path);
}
