use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{EventQuery, EventStore, StoreError, StoreResult, UNKNOWN_NAME};
use crate::models::{
    Event, EventDetails, NewEvent, NewReview, OrganizerInfo, Profile, Review, ReviewWithAuthor,
    Rsvp, RsvpStatus, RsvpWithAttendee,
};

#[derive(Default)]
struct Tables {
    events: Vec<Event>,
    rsvps: Vec<Rsvp>,
    reviews: Vec<Review>,
    profiles: HashMap<Uuid, Profile>,
}

impl Tables {
    fn name_of(&self, user_id: Uuid) -> String {
        self.profiles
            .get(&user_id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| UNKNOWN_NAME.to_string())
    }

    fn details(&self, event: &Event) -> EventDetails {
        let rsvps = self
            .rsvps
            .iter()
            .filter(|r| r.event_id == event.id)
            .map(|r| RsvpWithAttendee {
                rsvp: r.clone(),
                attendee_name: self.name_of(r.user_id),
            })
            .collect();

        // Newest first, matching the postgres ordering.
        let reviews = self
            .reviews
            .iter()
            .rev()
            .filter(|r| r.event_id == event.id)
            .map(|r| ReviewWithAuthor {
                review: r.clone(),
                reviewer_name: self.name_of(r.user_id),
            })
            .collect();

        let details = EventDetails::new(event.clone())
            .with_rsvps(rsvps)
            .with_reviews(reviews);

        match self.profiles.get(&event.created_by) {
            Some(p) => details.with_organizer(OrganizerInfo {
                name: p.name.clone(),
                verified: p.verified,
            }),
            None => details,
        }
    }
}

/// Process-local store. Backs the test suite and `GATHERLY_STORE=memory`.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Profiles are owned by the authentication provider; this stands in
    /// for its sign-up flow.
    pub async fn insert_profile(&self, profile: Profile) {
        let mut tables = self.tables.write().await;
        tables.profiles.insert(profile.id, profile);
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn list_events(&self, query: EventQuery) -> StoreResult<Vec<EventDetails>> {
        let tables = self.tables.read().await;

        let mut events: Vec<&Event> = tables
            .events
            .iter()
            .filter(|e| query.from.map_or(true, |from| e.date >= from))
            .filter(|e| query.created_by.map_or(true, |owner| e.created_by == owner))
            .collect();
        // Stable sort keeps insertion order for equal dates.
        events.sort_by_key(|e| e.date);

        Ok(events
            .into_iter()
            .map(|e| tables.details(e))
            .collect())
    }

    async fn find_event(&self, event_id: Uuid) -> StoreResult<Option<EventDetails>> {
        let tables = self.tables.read().await;
        Ok(tables
            .events
            .iter()
            .find(|e| e.id == event_id)
            .map(|e| tables.details(e)))
    }

    async fn insert_event(&self, event: NewEvent) -> StoreResult<Event> {
        let row = Event {
            id: Uuid::new_v4(),
            title: event.title,
            description: event.description,
            category: event.category,
            location: event.location,
            date: event.date,
            created_by: event.created_by,
            cover_image: event.cover_image,
            created_at: Utc::now(),
        };

        let mut tables = self.tables.write().await;
        tables.events.push(row.clone());
        Ok(row)
    }

    async fn delete_event(&self, event_id: Uuid, created_by: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.events.len();
        tables
            .events
            .retain(|e| !(e.id == event_id && e.created_by == created_by));
        let deleted = tables.events.len() < before;

        if deleted {
            tables.rsvps.retain(|r| r.event_id != event_id);
            tables.reviews.retain(|r| r.event_id != event_id);
        }
        Ok(deleted)
    }

    async fn find_rsvp(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<Option<Rsvp>> {
        let tables = self.tables.read().await;
        Ok(tables
            .rsvps
            .iter()
            .find(|r| r.event_id == event_id && r.user_id == user_id)
            .cloned())
    }

    async fn upsert_rsvp(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        status: RsvpStatus,
    ) -> StoreResult<Rsvp> {
        let mut tables = self.tables.write().await;

        if !tables.events.iter().any(|e| e.id == event_id) {
            return Err(StoreError::Conflict(format!(
                "event '{}' does not exist",
                event_id
            )));
        }

        if let Some(existing) = tables
            .rsvps
            .iter_mut()
            .find(|r| r.event_id == event_id && r.user_id == user_id)
        {
            existing.status = status;
            return Ok(existing.clone());
        }

        let row = Rsvp {
            id: Uuid::new_v4(),
            event_id,
            user_id,
            status,
            created_at: Utc::now(),
        };
        tables.rsvps.push(row.clone());
        Ok(row)
    }

    async fn delete_rsvp(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.rsvps.len();
        tables
            .rsvps
            .retain(|r| !(r.event_id == event_id && r.user_id == user_id));
        Ok(tables.rsvps.len() < before)
    }

    async fn insert_review(&self, review: NewReview) -> StoreResult<Review> {
        let mut tables = self.tables.write().await;

        if tables
            .reviews
            .iter()
            .any(|r| r.event_id == review.event_id && r.user_id == review.user_id)
        {
            return Err(StoreError::Conflict(
                "a review by this user already exists for this event".to_string(),
            ));
        }

        let row = Review {
            id: Uuid::new_v4(),
            event_id: review.event_id,
            user_id: review.user_id,
            rating: review.rating,
            comment: review.comment,
            created_at: Utc::now(),
        };
        tables.reviews.push(row.clone());
        Ok(row)
    }

    async fn find_profile(&self, user_id: Uuid) -> StoreResult<Option<Profile>> {
        let tables = self.tables.read().await;
        Ok(tables.profiles.get(&user_id).cloned())
    }
}
