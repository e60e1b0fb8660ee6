use axum::extract::FromRequest;
use axum::response::Response;
use serde::Serialize;
use uuid::Uuid;

use crate::engine::filter::{ALL_CATEGORIES, CATEGORIES};
use crate::utils::error::AppError;
use crate::utils::response::success;

pub mod dashboard;
pub mod events;
pub mod reviews;
pub mod rsvps;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "gatherly-api",
    };

    success(payload, "Health check successful")
}

#[derive(Serialize)]
struct CategoriesPayload {
    default: &'static str,
    categories: Vec<&'static str>,
}

pub async fn list_categories() -> Response {
    let payload = CategoriesPayload {
        default: ALL_CATEGORIES,
        categories: std::iter::once(ALL_CATEGORIES)
            .chain(CATEGORIES.iter().copied())
            .collect(),
    };

    success(payload, "Categories retrieved")
}

/// `Json` whose rejections render through [`AppError`] like every other
/// failure.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Malformed ids can never match a row, so they read as not found.
pub(crate) fn parse_event_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw)
        .map_err(|_| AppError::NotFound(format!("Event with id '{}' was not found", raw)))
}
