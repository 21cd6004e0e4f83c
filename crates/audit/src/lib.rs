// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

use rotaplan_domain::{AssignmentId, OrganizationId, SessionId, StaffId, SwapRequestId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

/// Represents the entity performing an action.
///
/// An actor is the identity that initiated a state change, as supplied by
/// the identity collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The type of actor (e.g., "admin", "scheduler", "staff").
    pub actor_type: String,
}

impl Actor {
    /// Creates a new Actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `actor_type` - The type of actor
    #[must_use]
    pub const fn new(id: String, actor_type: String) -> Self {
        Self { id, actor_type }
    }
}

/// Represents the reason or trigger for an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cause {
    /// A unique identifier for this cause (e.g., request ID).
    pub id: String,
    /// A description of the cause.
    pub description: String,
}

impl Cause {
    /// Creates a new Cause.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this cause
    /// * `description` - A description of what triggered this action
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

/// The kind of change a schedule event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// A staff member was offered (or self-assigned to) a session.
    AssignmentOffered,
    /// A staff member accepted an assignment.
    AssignmentConfirmed,
    /// A staff member declined an assignment.
    AssignmentDeclined,
    /// A scheduler removed an assignment.
    AssignmentRemoved,
    /// A holder offered their assignment to a peer.
    SwapRequested,
    /// A peer accepted a swap and now holds the assignment.
    SwapAccepted,
    /// A peer declined a swap.
    SwapDeclined,
    /// A bulk schedule produced new sessions.
    SessionsScheduled,
}

impl EventKind {
    /// Returns the stored representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AssignmentOffered => "AssignmentOffered",
            Self::AssignmentConfirmed => "AssignmentConfirmed",
            Self::AssignmentDeclined => "AssignmentDeclined",
            Self::AssignmentRemoved => "AssignmentRemoved",
            Self::SwapRequested => "SwapRequested",
            Self::SwapAccepted => "SwapAccepted",
            Self::SwapDeclined => "SwapDeclined",
            Self::SessionsScheduled => "SessionsScheduled",
        }
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AssignmentOffered" => Ok(Self::AssignmentOffered),
            "AssignmentConfirmed" => Ok(Self::AssignmentConfirmed),
            "AssignmentDeclined" => Ok(Self::AssignmentDeclined),
            "AssignmentRemoved" => Ok(Self::AssignmentRemoved),
            "SwapRequested" => Ok(Self::SwapRequested),
            "SwapAccepted" => Ok(Self::SwapAccepted),
            "SwapDeclined" => Ok(Self::SwapDeclined),
            "SessionsScheduled" => Ok(Self::SessionsScheduled),
            _ => Err(format!("Unknown event kind: {s}")),
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The entity a schedule event is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum EntityRef {
    /// A session (or the first session of a bulk schedule).
    Session(SessionId),
    /// An assignment.
    Assignment(AssignmentId),
    /// A swap request.
    SwapRequest(SwapRequestId),
}

impl EntityRef {
    /// Returns the stored entity type name.
    #[must_use]
    pub const fn entity_type(&self) -> &'static str {
        match self {
            Self::Session(_) => "session",
            Self::Assignment(_) => "assignment",
            Self::SwapRequest(_) => "swap_request",
        }
    }

    /// Returns the raw entity identifier.
    #[must_use]
    pub const fn entity_id(&self) -> i64 {
        match self {
            Self::Session(id) => id.value(),
            Self::Assignment(id) => id.value(),
            Self::SwapRequest(id) => id.value(),
        }
    }

    /// Rebuilds an entity reference from its stored parts.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity type is unknown.
    pub fn from_parts(entity_type: &str, entity_id: i64) -> Result<Self, String> {
        match entity_type {
            "session" => Ok(Self::Session(SessionId::new(entity_id))),
            "assignment" => Ok(Self::Assignment(AssignmentId::new(entity_id))),
            "swap_request" => Ok(Self::SwapRequest(SwapRequestId::new(entity_id))),
            _ => Err(format!("Unknown entity type: {entity_type}")),
        }
    }
}

/// An immutable fact recording one schedule change.
///
/// Every successful state change produces exactly one schedule event, written
/// in the same transaction as the change. The notification collaborator reads
/// them as an outbox; delivery is not tracked here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEvent {
    /// The persisted identifier. `None` until stored.
    pub event_id: Option<i64>,
    /// The organization the change happened in.
    pub organization_id: OrganizationId,
    /// Who made the change.
    pub actor: Actor,
    /// Why the change was made.
    pub cause: Cause,
    /// What kind of change this was.
    pub kind: EventKind,
    /// The staff member who should hear about it, if any.
    pub recipient: Option<StaffId>,
    /// The entity the change is about. `None` for a change that creates the
    /// entity, until the store assigns its id.
    pub entity: Option<EntityRef>,
    /// Optional human-readable details.
    pub details: Option<String>,
    /// When the event was stored. `None` until stored.
    pub created_at: Option<OffsetDateTime>,
}

impl ScheduleEvent {
    /// Creates a new, unpersisted `ScheduleEvent`.
    ///
    /// # Arguments
    ///
    /// * `organization_id` - The organization the change happened in
    /// * `actor` - The actor who initiated the change
    /// * `cause` - The reason for the change
    /// * `kind` - The kind of change
    /// * `recipient` - The staff member to notify, if any
    /// * `entity` - The entity the change is about, if it already exists
    /// * `details` - Optional additional details
    #[must_use]
    pub const fn new(
        organization_id: OrganizationId,
        actor: Actor,
        cause: Cause,
        kind: EventKind,
        recipient: Option<StaffId>,
        entity: Option<EntityRef>,
        details: Option<String>,
    ) -> Self {
        Self {
            event_id: None,
            organization_id,
            actor,
            cause,
            kind,
            recipient,
            entity,
            details,
            created_at: None,
        }
    }

    /// Sets the entity once the store has created it.
    #[must_use]
    pub fn with_entity(mut self, entity: EntityRef) -> Self {
        self.entity = Some(entity);
        self
    }

    /// Attaches the identifier and timestamp assigned by the store.
    #[must_use]
    pub fn with_persisted(mut self, event_id: i64, created_at: OffsetDateTime) -> Self {
        self.event_id = Some(event_id);
        self.created_at = Some(created_at);
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn create_test_event(kind: EventKind) -> ScheduleEvent {
        ScheduleEvent::new(
            OrganizationId::new(1),
            Actor::new(String::from("12"), String::from("scheduler")),
            Cause::new(String::from("req-456"), String::from("Offer cover")),
            kind,
            Some(StaffId::new(34)),
            Some(EntityRef::Assignment(AssignmentId::new(7))),
            None,
        )
    }

    #[test]
    fn test_actor_creation_requires_all_fields() {
        let actor: Actor = Actor::new(String::from("user-123"), String::from("staff"));

        assert_eq!(actor.id, "user-123");
        assert_eq!(actor.actor_type, "staff");
    }

    #[test]
    fn test_cause_creation_requires_all_fields() {
        let cause: Cause = Cause::new(String::from("req-456"), String::from("User request"));

        assert_eq!(cause.id, "req-456");
        assert_eq!(cause.description, "User request");
    }

    #[test]
    fn test_new_event_is_unpersisted() {
        let event: ScheduleEvent = create_test_event(EventKind::AssignmentOffered);

        assert_eq!(event.event_id, None);
        assert_eq!(event.created_at, None);
        assert_eq!(event.recipient, Some(StaffId::new(34)));
    }

    #[test]
    fn test_with_persisted_attaches_identity() {
        let created_at: OffsetDateTime = OffsetDateTime::UNIX_EPOCH;
        let event: ScheduleEvent =
            create_test_event(EventKind::SwapAccepted).with_persisted(99, created_at);

        assert_eq!(event.event_id, Some(99));
        assert_eq!(event.created_at, Some(created_at));
        assert_eq!(event.kind, EventKind::SwapAccepted);
    }

    #[test]
    fn test_with_entity_fills_created_entity() {
        let mut event: ScheduleEvent = create_test_event(EventKind::AssignmentOffered);
        event.entity = None;

        let event: ScheduleEvent = event.with_entity(EntityRef::Assignment(AssignmentId::new(8)));
        assert_eq!(event.entity, Some(EntityRef::Assignment(AssignmentId::new(8))));
    }

    #[test]
    fn test_event_kind_round_trips_through_storage_name() {
        for kind in [
            EventKind::AssignmentOffered,
            EventKind::AssignmentConfirmed,
            EventKind::AssignmentDeclined,
            EventKind::AssignmentRemoved,
            EventKind::SwapRequested,
            EventKind::SwapAccepted,
            EventKind::SwapDeclined,
            EventKind::SessionsScheduled,
        ] {
            assert_eq!(EventKind::from_str(kind.as_str()).unwrap(), kind);
        }
        assert!(EventKind::from_str("SessionCancelled").is_err());
    }

    #[test]
    fn test_entity_ref_parts() {
        let entity: EntityRef = EntityRef::SwapRequest(SwapRequestId::new(5));

        assert_eq!(entity.entity_type(), "swap_request");
        assert_eq!(entity.entity_id(), 5);
        assert_eq!(EntityRef::from_parts("swap_request", 5).unwrap(), entity);
        assert!(EntityRef::from_parts("roster", 5).is_err());
    }

    #[test]
    fn test_entity_ref_serializes_tagged() {
        let entity: EntityRef = EntityRef::Session(SessionId::new(3));
        assert_eq!(
            serde_json::to_string(&entity).unwrap(),
            r#"{"type":"session","id":3}"#
        );
    }
}
