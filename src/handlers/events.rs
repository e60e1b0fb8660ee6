use axum::extract::{Path, Query, State};
use axum::response::Response;
use chrono::Utc;

use super::{parse_event_id, AppJson};
use crate::engine::EventFilter;
use crate::services::events::CreateEventRequest;
use crate::session::{CurrentSession, MaybeSession};
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::response::{created, empty_success, success};

pub async fn list_events(
    State(state): State<AppState>,
    session: MaybeSession,
    Query(filter): Query<EventFilter>,
) -> AppResult<Response> {
    let list = state
        .events
        .list(session.user_id(), filter, Utc::now())
        .await?;
    let message = format!("{} of {} events", list.events.len(), list.total);
    Ok(success(list, message))
}

pub async fn get_event(
    State(state): State<AppState>,
    session: MaybeSession,
    Path(event_id): Path<String>,
) -> AppResult<Response> {
    let event_id = parse_event_id(&event_id)?;
    let view = state
        .events
        .detail(session.user_id(), event_id, Utc::now())
        .await?;
    Ok(success(view, "Event retrieved"))
}

pub async fn create_event(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    AppJson(request): AppJson<CreateEventRequest>,
) -> AppResult<Response> {
    let event = state.events.create(&session, request).await?;
    Ok(created(event, "Your event has been created."))
}

pub async fn delete_event(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(event_id): Path<String>,
) -> AppResult<Response> {
    let event_id = parse_event_id(&event_id)?;
    state.events.delete(&session, event_id).await?;
    Ok(empty_success("Event deleted successfully"))
}
