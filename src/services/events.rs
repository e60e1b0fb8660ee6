use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::engine::aggregate::{attendee_breakdown, current_user_rsvp, going_preview, AttendeeBreakdown, GoingPreview};
use crate::engine::review::check_eligibility;
use crate::engine::{EventFilter, EventSummary, ReviewEligibility, ShareLinks};
use crate::models::{Event, EventDetails, NewEvent, OrganizerInfo, Rsvp, Role};
use crate::session::Session;
use crate::store::{EventQuery, EventStore};
use crate::utils::error::{AppError, AppResult};

/// Fields arrive as typed into the create form; blank means missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub date: String,
    pub cover_image: Option<String>,
}

impl CreateEventRequest {
    fn validate(self, created_by: Uuid) -> AppResult<NewEvent> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(AppError::ValidationError("Event title is required".to_string()));
        }
        let location = self.location.trim();
        if location.is_empty() {
            return Err(AppError::ValidationError("Location is required".to_string()));
        }
        if self.date.trim().is_empty() {
            return Err(AppError::ValidationError("Date & time is required".to_string()));
        }
        let date = parse_event_date(&self.date).ok_or_else(|| {
            AppError::ValidationError(format!("Invalid date '{}'", self.date.trim()))
        })?;

        Ok(NewEvent {
            title: title.to_string(),
            description: self.description.trim().to_string(),
            category: self.category.trim().to_string(),
            location: location.to_string(),
            date,
            created_by,
            cover_image: self
                .cover_image
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
        })
    }
}

/// Accepts RFC 3339, or a `datetime-local` value (no offset) taken as UTC.
pub fn parse_event_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

#[derive(Debug, Clone, Serialize)]
pub struct EventCard {
    #[serde(flatten)]
    pub event: Event,
    pub organizer: Option<OrganizerInfo>,
    pub summary: EventSummary,
}

impl EventCard {
    fn derive(details: EventDetails, user_id: Option<Uuid>, now: DateTime<Utc>) -> Self {
        let summary = EventSummary::derive(&details, user_id, now);
        Self {
            event: details.event,
            organizer: details.organizer,
            summary,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EventList {
    pub filter: EventFilter,
    pub has_active_filters: bool,
    pub total: usize,
    pub events: Vec<EventCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventDetailView {
    #[serde(flatten)]
    pub details: EventDetails,
    pub summary: EventSummary,
    pub current_user_rsvp: Option<Rsvp>,
    pub going_preview: GoingPreview,
    pub review: ReviewEligibility,
    pub share: ShareLinks,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrganizerEventCard {
    #[serde(flatten)]
    pub card: EventCard,
    pub attendees: AttendeeBreakdown,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Dashboard {
    Attendee {
        name: String,
        events: Vec<EventCard>,
    },
    Organizer {
        name: String,
        events: Vec<OrganizerEventCard>,
    },
}

#[derive(Clone)]
pub struct EventService {
    store: Arc<dyn EventStore>,
    public_base_url: String,
}

impl EventService {
    pub fn new(store: Arc<dyn EventStore>, public_base_url: String) -> Self {
        Self {
            store,
            public_base_url,
        }
    }

    pub fn event_url(&self, event_id: Uuid) -> String {
        format!(
            "{}/events/{}",
            self.public_base_url.trim_end_matches('/'),
            event_id
        )
    }

    /// All events by date, narrowed by `filter`. The store is queried on
    /// every call.
    pub async fn list(
        &self,
        user_id: Option<Uuid>,
        filter: EventFilter,
        now: DateTime<Utc>,
    ) -> AppResult<EventList> {
        let fetched = self.store.list_events(EventQuery::all()).await?;
        let total = fetched.len();
        let events = filter
            .apply(fetched)
            .into_iter()
            .map(|details| EventCard::derive(details, user_id, now))
            .collect();

        Ok(EventList {
            has_active_filters: filter.has_active_filters(),
            filter,
            total,
            events,
        })
    }

    pub async fn fetch(&self, event_id: Uuid) -> AppResult<EventDetails> {
        self.store
            .find_event(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))
    }

    pub async fn detail(
        &self,
        user_id: Option<Uuid>,
        event_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<EventDetailView> {
        let details = self.fetch(event_id).await?;
        Ok(self.detail_view(details, user_id, now))
    }

    pub fn detail_view(
        &self,
        details: EventDetails,
        user_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> EventDetailView {
        let summary = EventSummary::derive(&details, user_id, now);
        let current = current_user_rsvp(&details, user_id).map(|row| row.rsvp.clone());
        let share = ShareLinks::for_event(
            &self.event_url(details.id()),
            &details.event.title,
            &details.event.location,
        );

        EventDetailView {
            summary,
            current_user_rsvp: current,
            going_preview: going_preview(&details),
            review: check_eligibility(&details, user_id, now).into(),
            share,
            details,
        }
    }

    pub async fn create(&self, session: &Session, request: CreateEventRequest) -> AppResult<Event> {
        session.require_organizer()?;
        let new_event = request.validate(session.user_id())?;

        let event = self.store.insert_event(new_event).await?;
        info!(event_id = %event.id, created_by = %event.created_by, "Event created");
        Ok(event)
    }

    /// Only the creating organizer may delete an event.
    pub async fn delete(&self, session: &Session, event_id: Uuid) -> AppResult<()> {
        session.require_organizer()?;

        let details = self.fetch(event_id).await?;
        if details.event.created_by != session.user_id() {
            return Err(AppError::Forbidden(
                "You can only delete your own events".to_string(),
            ));
        }

        if !self.store.delete_event(event_id, session.user_id()).await? {
            return Err(AppError::NotFound("Event not found".to_string()));
        }
        info!(event_id = %event_id, "Event deleted");
        Ok(())
    }

    /// Attendees see upcoming events; organizers see their own events with
    /// who responded.
    pub async fn dashboard(&self, session: &Session, now: DateTime<Utc>) -> AppResult<Dashboard> {
        let user_id = Some(session.user_id());
        let name = session.profile.name.clone();

        match session.profile.role {
            Role::Attendee => {
                let events = self
                    .store
                    .list_events(EventQuery::upcoming(now))
                    .await?
                    .into_iter()
                    .map(|details| EventCard::derive(details, user_id, now))
                    .collect();
                Ok(Dashboard::Attendee { name, events })
            }
            Role::Organizer => {
                let events = self
                    .store
                    .list_events(EventQuery::created_by(session.user_id()))
                    .await?
                    .into_iter()
                    .map(|details| {
                        let attendees = attendee_breakdown(&details);
                        OrganizerEventCard {
                            card: EventCard::derive(details, user_id, now),
                            attendees,
                        }
                    })
                    .collect();
                Ok(Dashboard::Organizer { name, events })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewReview, Profile, RsvpStatus};
    use crate::store::MemoryStore;
    use chrono::Duration;

    fn profile(name: &str, role: Role) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            name: name.to_string(),
            role,
            verified: false,
        }
    }

    fn request(title: &str, category: &str, location: &str, date: DateTime<Utc>) -> CreateEventRequest {
        CreateEventRequest {
            title: title.to_string(),
            category: category.to_string(),
            location: location.to_string(),
            date: date.to_rfc3339(),
            ..CreateEventRequest::default()
        }
    }

    async fn setup() -> (Arc<MemoryStore>, EventService, Session, Session) {
        let store = Arc::new(MemoryStore::new());
        let organizer = profile("Olga", Role::Organizer);
        let attendee = profile("Ada", Role::Attendee);
        store.insert_profile(organizer.clone()).await;
        store.insert_profile(attendee.clone()).await;
        let service = EventService::new(store.clone(), "https://gatherly.test/".to_string());
        (store, service, Session::new(organizer), Session::new(attendee))
    }

    #[test]
    fn test_parse_event_date_formats() {
        let rfc = parse_event_date("2025-06-01T18:30:00+02:00").unwrap();
        assert_eq!(rfc.to_rfc3339(), "2025-06-01T16:30:00+00:00");

        let local = parse_event_date("2025-06-01T18:30").unwrap();
        assert_eq!(local.to_rfc3339(), "2025-06-01T18:30:00+00:00");

        assert!(parse_event_date("next friday").is_none());
    }

    #[test]
    fn test_create_request_validation() {
        let owner = Uuid::new_v4();
        let missing_title = CreateEventRequest {
            title: "  ".to_string(),
            location: "Austin".to_string(),
            date: "2025-06-01T18:30".to_string(),
            ..CreateEventRequest::default()
        };
        assert!(matches!(
            missing_title.validate(owner),
            Err(AppError::ValidationError(_))
        ));

        let blank_cover = CreateEventRequest {
            title: " Jazz ".to_string(),
            location: "Austin".to_string(),
            date: "2025-06-01T18:30".to_string(),
            cover_image: Some(" ".to_string()),
            ..CreateEventRequest::default()
        };
        let event = blank_cover.validate(owner).unwrap();
        assert_eq!(event.title, "Jazz");
        assert_eq!(event.cover_image, None);
        assert_eq!(event.created_by, owner);
    }

    #[tokio::test]
    async fn test_only_organizers_create_events() {
        let (_, service, _, attendee) = setup().await;
        let err = service
            .create(&attendee, request("Jazz", "Music", "Austin", Utc::now()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_list_filters_and_derives_summaries() {
        let (store, service, organizer, attendee) = setup().await;
        let now = Utc::now();
        let jazz = service
            .create(&organizer, request("Jazz", "Music", "Austin", now + Duration::days(1)))
            .await
            .unwrap();
        service
            .create(&organizer, request("RustConf", "Tech", "Boston", now + Duration::days(2)))
            .await
            .unwrap();
        store
            .upsert_rsvp(jazz.id, attendee.user_id(), RsvpStatus::Going)
            .await
            .unwrap();

        let list = service
            .list(
                Some(attendee.user_id()),
                EventFilter::default().category("Music"),
                now,
            )
            .await
            .unwrap();

        assert!(list.has_active_filters);
        assert_eq!(list.total, 2);
        assert_eq!(list.events.len(), 1);
        assert_eq!(list.events[0].event.id, jazz.id);
        assert_eq!(list.events[0].summary.counts.going, 1);
        assert_eq!(
            list.events[0].summary.current_user_status,
            Some(RsvpStatus::Going)
        );
    }

    #[tokio::test]
    async fn test_detail_includes_share_links_and_gate() {
        let (_, service, organizer, attendee) = setup().await;
        let event = service
            .create(&organizer, request("Jazz", "Music", "Austin", Utc::now() + Duration::days(3)))
            .await
            .unwrap();

        let view = service
            .detail(Some(attendee.user_id()), event.id, Utc::now())
            .await
            .unwrap();
        assert_eq!(view.share.url, format!("https://gatherly.test/events/{}", event.id));
        assert!(!view.review.can_review);
        assert_eq!(
            view.review.reason.as_deref(),
            Some("You can review this event after it ends.")
        );
        assert_eq!(view.details.organizer.as_ref().map(|o| o.name.as_str()), Some("Olga"));
    }

    #[tokio::test]
    async fn test_missing_event_is_not_found() {
        let (_, service, _, _) = setup().await;
        let err = service.detail(None, Uuid::new_v4(), Utc::now()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_checks_ownership() {
        let (store, service, organizer, _) = setup().await;
        let rival = Session::new(profile("Rae", Role::Organizer));
        store.insert_profile(rival.profile.clone()).await;

        let event = service
            .create(&organizer, request("Jazz", "Music", "Austin", Utc::now()))
            .await
            .unwrap();

        let err = service.delete(&rival, event.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        service.delete(&organizer, event.id).await.unwrap();
        let err = service.delete(&organizer, event.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_dashboard_by_role() {
        let (store, service, organizer, attendee) = setup().await;
        let now = Utc::now();
        let upcoming = service
            .create(&organizer, request("Jazz", "Music", "Austin", now + Duration::days(1)))
            .await
            .unwrap();
        service
            .create(&organizer, request("Old", "Music", "Austin", now - Duration::days(1)))
            .await
            .unwrap();
        store
            .upsert_rsvp(upcoming.id, attendee.user_id(), RsvpStatus::Interested)
            .await
            .unwrap();

        match service.dashboard(&attendee, now).await.unwrap() {
            Dashboard::Attendee { name, events } => {
                assert_eq!(name, "Ada");
                assert_eq!(events.len(), 1);
                assert_eq!(events[0].event.id, upcoming.id);
            }
            other => panic!("expected attendee dashboard, got {:?}", other),
        }

        match service.dashboard(&organizer, now).await.unwrap() {
            Dashboard::Organizer { events, .. } => {
                assert_eq!(events.len(), 2);
                assert_eq!(events[0].card.event.title, "Old");
                assert_eq!(events[1].attendees.interested, vec!["Ada".to_string()]);
                assert!(events[0].card.summary.is_past);
            }
            other => panic!("expected organizer dashboard, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_organizer_dashboard_counts_reviews() {
        let (store, service, organizer, attendee) = setup().await;
        let now = Utc::now();
        let past = service
            .create(&organizer, request("Old", "Music", "Austin", now - Duration::days(2)))
            .await
            .unwrap();
        store
            .upsert_rsvp(past.id, attendee.user_id(), RsvpStatus::Going)
            .await
            .unwrap();
        store
            .insert_review(NewReview {
                event_id: past.id,
                user_id: attendee.user_id(),
                rating: 5,
                comment: None,
            })
            .await
            .unwrap();

        let detail = service.detail(None, past.id, now).await.unwrap();

        match service.dashboard(&organizer, now).await.unwrap() {
            Dashboard::Organizer { events, .. } => {
                let summary = &events[0].card.summary;
                assert_eq!(summary.review_count, 1);
                assert_eq!(summary.review_count_label, "1 review");
                assert_eq!(summary.average_rating, 5.0);
                assert_eq!(summary, &detail.summary);
            }
            other => panic!("expected organizer dashboard, got {:?}", other),
        }
    }
}
