// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{HOLDER, ORG, OTHER_ORG, PEER, SCHEDULER, seed_assignment, seed_session, seed_swap};
use crate::Persistence;
use rotaplan_audit::{EntityRef, EventKind, ScheduleEvent};

#[test]
fn test_events_are_ordered_and_paged_by_cursor() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let session_id = seed_session(&mut persistence);
    let assignment_id = seed_assignment(&mut persistence, session_id, HOLDER);
    seed_swap(&mut persistence, assignment_id, PEER);

    let all: Vec<ScheduleEvent> = persistence.list_events(ORG, None, 0, 10).unwrap();
    let kinds: Vec<EventKind> = all.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::SessionsScheduled,
            EventKind::AssignmentOffered,
            EventKind::SwapRequested
        ]
    );

    let first_page: Vec<ScheduleEvent> = persistence.list_events(ORG, None, 0, 2).unwrap();
    assert_eq!(first_page.len(), 2);
    let cursor: i64 = first_page[1].event_id.unwrap();
    let rest: Vec<ScheduleEvent> = persistence.list_events(ORG, None, cursor, 2).unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].kind, EventKind::SwapRequested);
}

#[test]
fn test_stored_event_keeps_actor_recipient_and_entity() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let session_id = seed_session(&mut persistence);

    let events: Vec<ScheduleEvent> = persistence.list_events(ORG, None, 0, 10).unwrap();
    let event: &ScheduleEvent = &events[0];
    assert_eq!(event.actor.id, SCHEDULER.to_string());
    assert_eq!(event.actor.actor_type, "scheduler");
    assert_eq!(event.cause.id, "test-cause");
    assert_eq!(event.recipient, None);
    assert_eq!(event.entity, Some(EntityRef::Session(session_id)));
    assert!(event.created_at.is_some());
}

#[test]
fn test_recipient_filter_and_organization_scope() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let session_id = seed_session(&mut persistence);
    let assignment_id = seed_assignment(&mut persistence, session_id, HOLDER);
    seed_swap(&mut persistence, assignment_id, PEER);

    let for_peer: Vec<ScheduleEvent> = persistence.list_events(ORG, Some(PEER), 0, 10).unwrap();
    assert_eq!(for_peer.len(), 1);
    assert_eq!(for_peer[0].kind, EventKind::SwapRequested);

    assert!(
        persistence
            .list_events(OTHER_ORG, None, 0, 10)
            .unwrap()
            .is_empty()
    );
}
