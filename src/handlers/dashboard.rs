use axum::extract::State;
use axum::response::Response;
use chrono::Utc;

use crate::session::CurrentSession;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::response::success;

pub async fn get_dashboard(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> AppResult<Response> {
    let dashboard = state.events.dashboard(&session, Utc::now()).await?;
    Ok(success(dashboard, format!("Welcome back, {}!", session.profile.name)))
}
