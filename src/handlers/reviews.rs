use axum::extract::{Path, State};
use axum::response::Response;
use chrono::Utc;

use super::{parse_event_id, AppJson};
use crate::services::reviews::SubmitReviewRequest;
use crate::session::CurrentSession;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::response::created;

pub async fn submit_review(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(event_id): Path<String>,
    AppJson(request): AppJson<SubmitReviewRequest>,
) -> AppResult<Response> {
    let event_id = parse_event_id(&event_id)?;
    let outcome = state
        .reviews
        .submit(&session, event_id, request, Utc::now())
        .await?;
    Ok(created(outcome, "Review submitted successfully!"))
}
