use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::engine::review::{check_eligibility, normalize_comment, validate_rating};
use crate::engine::EventSummary;
use crate::models::{EventDetails, NewReview, Review};
use crate::session::Session;
use crate::store::EventStore;
use crate::utils::error::{AppError, AppResult};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitReviewRequest {
    #[serde(default)]
    pub rating: Option<i64>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewOutcome {
    pub review: Review,
    /// The event as refetched after the insert.
    pub event: EventDetails,
    pub summary: EventSummary,
}

#[derive(Clone)]
pub struct ReviewService {
    store: Arc<dyn EventStore>,
}

impl ReviewService {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    pub async fn submit(
        &self,
        session: &Session,
        event_id: Uuid,
        request: SubmitReviewRequest,
        now: DateTime<Utc>,
    ) -> AppResult<ReviewOutcome> {
        let rating = match request.rating {
            None | Some(0) => {
                return Err(AppError::ValidationError(
                    "Please choose a rating".to_string(),
                ))
            }
            Some(raw) => validate_rating(raw).map_err(AppError::ValidationError)?,
        };
        let comment = normalize_comment(request.comment.as_deref());

        let user_id = session.user_id();
        let event = self.fetch(event_id).await?;
        check_eligibility(&event, Some(user_id), now)
            .map_err(|rejection| AppError::Conflict(rejection.to_string()))?;

        let review = self
            .store
            .insert_review(NewReview {
                event_id,
                user_id,
                rating,
                comment,
            })
            .await?;
        info!(event_id = %event_id, user_id = %user_id, rating, "Review submitted");

        let event = self.fetch(event_id).await?;
        let summary = EventSummary::derive(&event, Some(user_id), now);

        Ok(ReviewOutcome {
            review,
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
