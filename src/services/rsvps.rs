use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::in_flight::InFlight;
use crate::engine::{EventSummary, RsvpIntent, RsvpState, RsvpTransition};
use crate::models::{EventDetails, RsvpStatus};
use crate::session::Session;
use crate::store::EventStore;
use crate::utils::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize)]
pub struct RsvpOutcome {
    pub transition: RsvpTransition,
    pub state: RsvpState,
    pub message: String,
    /// The event as refetched after the write.
    pub event: EventDetails,
    pub summary: EventSummary,
}

#[derive(Clone)]
pub struct RsvpService {
    store: Arc<dyn EventStore>,
    in_flight: Arc<InFlight>,
}

impl RsvpService {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self {
            store,
            in_flight: InFlight::new(),
        }
    }

    pub async fn set_status(
        &self,
        session: &Session,
        event_id: Uuid,
        status: RsvpStatus,
        now: DateTime<Utc>,
    ) -> AppResult<RsvpOutcome> {
        self.apply(session, event_id, RsvpIntent::Set(status), now)
            .await
    }

    pub async fn remove(
        &self,
        session: &Session,
        event_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<RsvpOutcome> {
        self.apply(session, event_id, RsvpIntent::Remove, now).await
    }

    async fn apply(
        &self,
        session: &Session,
        event_id: Uuid,
        intent: RsvpIntent,
        now: DateTime<Utc>,
    ) -> AppResult<RsvpOutcome> {
        let user_id = session.user_id();
        let _guard = self.in_flight.try_acquire(user_id, event_id).ok_or_else(|| {
            warn!(user_id = %user_id, event_id = %event_id, "RSVP already in flight");
            AppError::Conflict("An RSVP update for this event is already in progress".to_string())
        })?;

        let event = self.fetch(event_id).await?;
        if matches!(intent, RsvpIntent::Set(_)) && event.event.is_past(now) {
            return Err(AppError::Conflict(
                "RSVPs are closed for past events".to_string(),
            ));
        }

        let current = self.store.find_rsvp(event_id, user_id).await?;
        let from = RsvpState::of(current.as_ref());
        let transition = RsvpTransition::plan(current.as_ref(), intent);

        match transition {
            RsvpTransition::Create { status } | RsvpTransition::Update { to: status, .. } => {
                self.store.upsert_rsvp(event_id, user_id, status).await?;
            }
            RsvpTransition::Delete { .. } => {
                self.store.delete_rsvp(event_id, user_id).await?;
            }
            RsvpTransition::Unchanged => {}
        }

        let state = transition.target(from);
        info!(
            user_id = %user_id,
            event_id = %event_id,
            from = ?from,
            to = ?state,
            "RSVP reconciled"
        );

        let event = self.fetch(event_id).await?;
        let summary = EventSummary::derive(&event, Some(user_id), now);

        Ok(RsvpOutcome {
            message: transition.message(),
            transition,
            state,
            event,
            summary,
        })
    }

    async fn fetch(&self, event_id: Uuid) -> AppResult<EventDetails> {
        self.store
            .find_event(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::aggregate::current_user_rsvp;
    use crate::models::{NewEvent, Profile, Role};
    use crate::store::MemoryStore;
    use chrono::Duration;

    async fn setup(date: DateTime<Utc>) -> (Arc<MemoryStore>, RsvpService, Session, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let attendee = Profile {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            role: Role::Attendee,
            verified: false,
        };
        store.insert_profile(attendee.clone()).await;
        let event = store
            .insert_event(NewEvent {
                title: "Board games".to_string(),
                description: String::new(),
                category: "Community".to_string(),
                location: "Library".to_string(),
                date,
                created_by: Uuid::new_v4(),
                cover_image: None,
            })
            .await
            .unwrap();
        let service = RsvpService::new(store.clone());
        (store, service, Session::new(attendee), event.id)
    }

    #[tokio::test]
    async fn test_going_then_interested_leaves_single_row() {
        let now = Utc::now();
        let (_, service, session, event_id) = setup(now + Duration::days(1)).await;

        let first = service
            .set_status(&session, event_id, RsvpStatus::Going, now)
            .await
            .unwrap();
        assert!(matches!(first.transition, RsvpTransition::Create { .. }));
        assert_eq!(first.message, "RSVP set to going");
        assert_eq!(first.summary.counts.going, 1);

        let second = service
            .set_status(&session, event_id, RsvpStatus::Interested, now)
            .await
            .unwrap();
        assert!(matches!(second.transition, RsvpTransition::Update { .. }));
        assert_eq!(second.message, "RSVP updated to interested");
        assert_eq!(second.state, RsvpState::Interested);

        let mine = current_user_rsvp(&second.event, Some(session.user_id())).unwrap();
        assert_eq!(mine.rsvp.status, RsvpStatus::Interested);
        assert_eq!(second.event.rsvps().len(), 1);
        assert_eq!(second.summary.counts.going, 0);
        assert_eq!(second.summary.counts.interested, 1);
    }

    #[tokio::test]
    async fn test_remove_deletes_row() {
        let now = Utc::now();
        let (store, service, session, event_id) = setup(now + Duration::days(1)).await;
        service
            .set_status(&session, event_id, RsvpStatus::Going, now)
            .await
            .unwrap();

        let outcome = service.remove(&session, event_id, now).await.unwrap();
        assert_eq!(outcome.state, RsvpState::NoRsvp);
        assert_eq!(outcome.message, "RSVP removed");
        assert!(store
            .find_rsvp(event_id, session.user_id())
            .await
            .unwrap()
            .is_none());

        let again = service.remove(&session, event_id, now).await.unwrap();
        assert_eq!(again.transition, RsvpTransition::Unchanged);
    }

    #[tokio::test]
    async fn test_in_flight_request_blocks_duplicate() {
        let now = Utc::now();
        let (store, service, session, event_id) = setup(now + Duration::days(1)).await;

        let guard = service
            .in_flight
            .try_acquire(session.user_id(), event_id)
            .unwrap();
        let err = service
            .set_status(&session, event_id, RsvpStatus::Going, now)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert!(store
            .find_rsvp(event_id, session.user_id())
            .await
            .unwrap()
            .is_none());

        drop(guard);
        service
            .set_status(&session, event_id, RsvpStatus::Going, now)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_guard_released_after_error() {
        let now = Utc::now();
        let (_, service, session, _) = setup(now).await;
        let missing = Uuid::new_v4();

        let err = service
            .set_status(&session, missing, RsvpStatus::Going, now)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(!service.in_flight.is_busy(session.user_id(), missing));
    }

    #[tokio::test]
    async fn test_past_events_closed_for_new_rsvps() {
        let now = Utc::now();
        let (_, service, session, event_id) = setup(now - Duration::hours(1)).await;
        let err = service
            .set_status(&session, event_id, RsvpStatus::Going, now)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
