//! Per-request authentication context.
//!
//! The upstream auth gateway verifies the user and forwards their id in
//! [`USER_ID_HEADER`]. The profile is loaded from the store on every request
//! and handed to services explicitly.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::models::Profile;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};

pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub profile: Profile,
}

impl Session {
    pub fn new(profile: Profile) -> Self {
        Self { profile }
    }

    pub fn user_id(&self) -> Uuid {
        self.profile.id
    }

    pub fn require_organizer(&self) -> AppResult<()> {
        if self.profile.is_organizer() {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Only organizers can manage events".to_string(),
            ))
        }
    }
}

/// Session for routes that also serve anonymous visitors.
pub struct MaybeSession(pub Option<Session>);

impl MaybeSession {
    pub fn user_id(&self) -> Option<Uuid> {
        self.0.as_ref().map(Session::user_id)
    }
}

/// Session for routes that need a signed-in user.
pub struct CurrentSession(pub Session);

#[async_trait]
impl FromRequestParts<AppState> for MaybeSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(raw) = parts.headers.get(USER_ID_HEADER) else {
            return Ok(MaybeSession(None));
        };

        let user_id = raw
            .to_str()
            .ok()
            .and_then(|v| Uuid::parse_str(v.trim()).ok())
            .ok_or_else(|| AppError::AuthError("Malformed user id".to_string()))?;

        let profile = state
            .store
            .find_profile(user_id)
            .await?
            .ok_or_else(|| AppError::AuthError("Unknown user".to_string()))?;

        Ok(MaybeSession(Some(Session::new(profile))))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match MaybeSession::from_request_parts(parts, state).await? {
            MaybeSession(Some(session)) => Ok(CurrentSession(session)),
            MaybeSession(None) => Err(AppError::AuthError("Please sign in".to_string())),
        }
    }
}
