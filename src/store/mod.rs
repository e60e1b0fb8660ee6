//! Data access facade. Every read and write the services perform goes
//! through [`EventStore`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Event, EventDetails, NewEvent, NewReview, Profile, Review, Rsvp, RsvpStatus,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid row: {0}")]
    InvalidRow(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Which events to select. Results are always ordered by date ascending
/// and carry their organizer, RSVPs and reviews.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventQuery {
    /// Only events whose date is at or after this instant.
    pub from: Option<DateTime<Utc>>,
    pub created_by: Option<Uuid>,
}

impl EventQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn upcoming(now: DateTime<Utc>) -> Self {
        Self {
            from: Some(now),
            ..Self::default()
        }
    }

    pub fn created_by(user_id: Uuid) -> Self {
        Self {
            created_by: Some(user_id),
            ..Self::default()
        }
    }
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn list_events(&self, query: EventQuery) -> StoreResult<Vec<EventDetails>>;

    /// Single event with organizer, RSVPs and reviews embedded.
    async fn find_event(&self, event_id: Uuid) -> StoreResult<Option<EventDetails>>;

    async fn insert_event(&self, event: NewEvent) -> StoreResult<Event>;

    /// Deletes only when `created_by` owns the event. Returns whether a row
    /// was removed.
    async fn delete_event(&self, event_id: Uuid, created_by: Uuid) -> StoreResult<bool>;

    async fn find_rsvp(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<Option<Rsvp>>;

    /// Creates or updates the single row for `(event_id, user_id)` in one
    /// atomic write.
    async fn upsert_rsvp(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        status: RsvpStatus,
    ) -> StoreResult<Rsvp>;

    async fn delete_rsvp(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<bool>;

    /// Fails with [`StoreError::Conflict`] if the user already reviewed the
    /// event.
    async fn insert_review(&self, review: NewReview) -> StoreResult<Review>;

    async fn find_profile(&self, user_id: Uuid) -> StoreResult<Option<Profile>>;
}

/// Display name used when a joined profile row is missing.
pub(crate) const UNKNOWN_NAME: &str = "Anonymous";
