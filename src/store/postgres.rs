use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;
use uuid::Uuid;

use super::{EventQuery, EventStore, StoreError, StoreResult, UNKNOWN_NAME};
use crate::models::{
    Event, EventDetails, NewEvent, NewReview, OrganizerInfo, Profile, Review, ReviewWithAuthor,
    Rsvp, RsvpStatus, RsvpWithAttendee,
};

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

const EVENT_COLUMNS: &str = r#"
    SELECT e.id, e.title, e.description, e.category, e.location, e.date,
           e.created_by, e.cover_image, e.created_at,
           p.name AS organizer_name, p.verified AS organizer_verified
    FROM events e
    LEFT JOIN profiles p ON p.id = e.created_by
"#;

#[derive(Debug, FromRow)]
struct EventRow {
    id: Uuid,
    title: String,
    description: String,
    category: String,
    location: String,
    date: DateTime<Utc>,
    created_by: Uuid,
    cover_image: Option<String>,
    created_at: DateTime<Utc>,
    organizer_name: Option<String>,
    organizer_verified: Option<bool>,
}

impl EventRow {
    fn into_details(self) -> EventDetails {
        let details = EventDetails::new(Event {
            id: self.id,
            title: self.title,
            description: self.description,
            category: self.category,
            location: self.location,
            date: self.date,
            created_by: self.created_by,
            cover_image: self.cover_image,
            created_at: self.created_at,
        });
        match self.organizer_name {
            Some(name) => details.with_organizer(OrganizerInfo {
                name,
                verified: self.organizer_verified.unwrap_or(false),
            }),
            None => details,
        }
    }
}

#[derive(Debug, FromRow)]
struct RsvpRow {
    id: Uuid,
    event_id: Uuid,
    user_id: Uuid,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<RsvpRow> for Rsvp {
    type Error = StoreError;

    fn try_from(row: RsvpRow) -> Result<Self, Self::Error> {
        Ok(Rsvp {
            id: row.id,
            event_id: row.event_id,
            user_id: row.user_id,
            status: row.status.parse().map_err(StoreError::InvalidRow)?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct AttendeeRow {
    #[sqlx(flatten)]
    rsvp: RsvpRow,
    attendee_name: String,
}

#[derive(Debug, FromRow)]
struct ReviewRow {
    id: Uuid,
    event_id: Uuid,
    user_id: Uuid,
    rating: i16,
    comment: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Review {
            id: row.id,
            event_id: row.event_id,
            user_id: row.user_id,
            rating: row.rating,
            comment: row.comment,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct ReviewerRow {
    #[sqlx(flatten)]
    review: ReviewRow,
    reviewer_name: String,
}

#[derive(Debug, FromRow)]
struct ProfileRow {
    id: Uuid,
    name: String,
    role: String,
    verified: bool,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = StoreError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        Ok(Profile {
            id: row.id,
            name: row.name,
            role: row.role.parse().map_err(StoreError::InvalidRow)?,
            verified: row.verified,
        })
    }
}

fn db_code(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db) => db.code().map(|c| c.into_owned()),
        _ => None,
    }
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn embed(&self, events: Vec<EventRow>) -> StoreResult<Vec<EventDetails>> {
        let ids: Vec<Uuid> = events.iter().map(|e| e.id).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let attendee_rows: Vec<AttendeeRow> = sqlx::query_as(
            r#"
            SELECT r.id, r.event_id, r.user_id, r.status, r.created_at,
                   COALESCE(p.name, $2) AS attendee_name
            FROM rsvps r
            LEFT JOIN profiles p ON p.id = r.user_id
            WHERE r.event_id = ANY($1)
            ORDER BY r.created_at ASC
            "#,
        )
        .bind(&ids)
        .bind(UNKNOWN_NAME)
        .fetch_all(&self.pool)
        .await?;

        let mut rsvps: HashMap<Uuid, Vec<RsvpWithAttendee>> = HashMap::new();
        for row in attendee_rows {
            let rsvp = Rsvp::try_from(row.rsvp)?;
            rsvps.entry(rsvp.event_id).or_default().push(RsvpWithAttendee {
                rsvp,
                attendee_name: row.attendee_name,
            });
        }

        let mut reviews: HashMap<Uuid, Vec<ReviewWithAuthor>> = HashMap::new();
        let reviewer_rows: Vec<ReviewerRow> = sqlx::query_as(
            r#"
            SELECT v.id, v.event_id, v.user_id, v.rating, v.comment, v.created_at,
                   COALESCE(p.name, $2) AS reviewer_name
            FROM reviews v
            LEFT JOIN profiles p ON p.id = v.user_id
            WHERE v.event_id = ANY($1)
            ORDER BY v.created_at DESC
            "#,
        )
        .bind(&ids)
        .bind(UNKNOWN_NAME)
        .fetch_all(&self.pool)
        .await?;

        for row in reviewer_rows {
            let review = Review::from(row.review);
            reviews.entry(review.event_id).or_default().push(ReviewWithAuthor {
                review,
                reviewer_name: row.reviewer_name,
            });
        }

        Ok(events
            .into_iter()
            .map(|row| {
                let id = row.id;
                row.into_details()
                    .with_rsvps(rsvps.remove(&id).unwrap_or_default())
                    .with_reviews(reviews.remove(&id).unwrap_or_default())
            })
            .collect())
    }
}

#[async_trait]
impl EventStore for PgStore {
    async fn list_events(&self, query: EventQuery) -> StoreResult<Vec<EventDetails>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(EVENT_COLUMNS);
        builder.push(" WHERE TRUE");
        if let Some(from) = query.from {
            builder.push(" AND e.date >= ").push_bind(from);
        }
        if let Some(owner) = query.created_by {
            builder.push(" AND e.created_by = ").push_bind(owner);
        }
        builder.push(" ORDER BY e.date ASC, e.created_at ASC");

        let rows: Vec<EventRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        tracing::debug!(count = rows.len(), "Fetched events");

        self.embed(rows).await
    }

    async fn find_event(&self, event_id: Uuid) -> StoreResult<Option<EventDetails>> {
        let sql = format!("{} WHERE e.id = $1", EVENT_COLUMNS);
        let row: Option<EventRow> = sqlx::query_as(&sql)
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(self.embed(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn insert_event(&self, event: NewEvent) -> StoreResult<Event> {
        let row: EventRow = sqlx::query_as(
            r#"
            INSERT INTO events (id, title, description, category, location, date, created_by, cover_image)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, title, description, category, location, date,
                      created_by, cover_image, created_at,
                      NULL::TEXT AS organizer_name, NULL::BOOLEAN AS organizer_verified
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.category)
        .bind(&event.location)
        .bind(event.date)
        .bind(event.created_by)
        .bind(&event.cover_image)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_details().event)
    }

    async fn delete_event(&self, event_id: Uuid, created_by: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1 AND created_by = $2")
            .bind(event_id)
            .bind(created_by)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_rsvp(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<Option<Rsvp>> {
        let row: Option<RsvpRow> = sqlx::query_as(
            r#"
            SELECT id, event_id, user_id, status, created_at
            FROM rsvps
            WHERE event_id = $1 AND user_id = $2
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Rsvp::try_from).transpose()
    }

    async fn upsert_rsvp(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        status: RsvpStatus,
    ) -> StoreResult<Rsvp> {
        let result: Result<RsvpRow, sqlx::Error> = sqlx::query_as(
            r#"
            INSERT INTO rsvps (id, event_id, user_id, status)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (event_id, user_id) DO UPDATE SET status = EXCLUDED.status
            RETURNING id, event_id, user_id, status, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(event_id)
        .bind(user_id)
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Rsvp::try_from(row),
            Err(e) if db_code(&e).as_deref() == Some(FOREIGN_KEY_VIOLATION) => Err(
                StoreError::Conflict(format!("event '{}' or user '{}' does not exist", event_id, user_id)),
            ),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_rsvp(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM rsvps WHERE event_id = $1 AND user_id = $2")
            .bind(event_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_review(&self, review: NewReview) -> StoreResult<Review> {
        let result: Result<ReviewRow, sqlx::Error> = sqlx::query_as(
            r#"
            INSERT INTO reviews (id, event_id, user_id, rating, comment)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, event_id, user_id, rating, comment, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(review.event_id)
        .bind(review.user_id)
        .bind(review.rating)
        .bind(&review.comment)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(row.into()),
            Err(e) if db_code(&e).as_deref() == Some(UNIQUE_VIOLATION) => Err(StoreError::Conflict(
                "a review by this user already exists for this event".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_profile(&self, user_id: Uuid) -> StoreResult<Option<Profile>> {
        let row: Option<ProfileRow> =
            sqlx::query_as("SELECT id, name, role, verified FROM profiles WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Profile::try_from).transpose()
    }
}
