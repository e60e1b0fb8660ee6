use axum::extract::{Path, State};
use axum::response::Response;
use chrono::Utc;
use serde::Deserialize;

use super::{parse_event_id, AppJson};
use crate::models::RsvpStatus;
use crate::session::CurrentSession;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::response::success;

#[derive(Debug, Deserialize)]
pub struct SetRsvpRequest {
    #[serde(default)]
    pub status: String,
}

pub async fn set_rsvp(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(event_id): Path<String>,
    AppJson(request): AppJson<SetRsvpRequest>,
) -> AppResult<Response> {
    let event_id = parse_event_id(&event_id)?;
    let status: RsvpStatus = request
        .status
        .parse()
        .map_err(|_| AppError::ValidationError("Status must be 'interested' or 'going'".to_string()))?;

    let outcome = state
        .rsvps
        .set_status(&session, event_id, status, Utc::now())
        .await?;
    let message = outcome.message.clone();
    Ok(success(outcome, message))
}

pub async fn remove_rsvp(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(event_id): Path<String>,
) -> AppResult<Response> {
    let event_id = parse_event_id(&event_id)?;
    let outcome = state.rsvps.remove(&session, event_id, Utc::now()).await?;
    let message = outcome.message.clone();
    Ok(success(outcome, message))
}
