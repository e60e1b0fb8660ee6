use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::review::ReviewWithAuthor;
use super::rsvp::RsvpWithAttendee;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub date: DateTime<Utc>,
    pub created_by: Uuid,
    pub cover_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.date < now
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizerInfo {
    pub name: String,
    pub verified: bool,
}

/// An event together with whichever relations the query embedded.
///
/// A relation that was not requested is `None`. Readers go through
/// [`EventDetails::rsvps`] and [`EventDetails::reviews`], which treat a
/// missing list as empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    #[serde(flatten)]
    pub event: Event,
    pub organizer: Option<OrganizerInfo>,
    #[serde(rename = "rsvps")]
    pub rsvp_rows: Option<Vec<RsvpWithAttendee>>,
    #[serde(rename = "reviews")]
    pub review_rows: Option<Vec<ReviewWithAuthor>>,
}

impl EventDetails {
    pub fn new(event: Event) -> Self {
        Self {
            event,
            organizer: None,
            rsvp_rows: None,
            review_rows: None,
        }
    }

    pub fn with_organizer(mut self, organizer: OrganizerInfo) -> Self {
        self.organizer = Some(organizer);
        self
    }

    pub fn with_rsvps(mut self, rsvps: Vec<RsvpWithAttendee>) -> Self {
        self.rsvp_rows = Some(rsvps);
        self
    }

    pub fn with_reviews(mut self, reviews: Vec<ReviewWithAuthor>) -> Self {
        self.review_rows = Some(reviews);
        self
    }

    pub fn id(&self) -> Uuid {
        self.event.id
    }

    pub fn rsvps(&self) -> &[RsvpWithAttendee] {
        self.rsvp_rows.as_deref().unwrap_or(&[])
    }

    pub fn reviews(&self) -> &[ReviewWithAuthor] {
        self.review_rows.as_deref().unwrap_or(&[])
    }
}

impl AsRef<Event> for Event {
    fn as_ref(&self) -> &Event {
        self
    }
}

impl AsRef<Event> for EventDetails {
    fn as_ref(&self) -> &Event {
        &self.event
    }
}

/// Validated input for an event insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub date: DateTime<Utc>,
    pub created_by: Uuid,
    pub cover_image: Option<String>,
}
