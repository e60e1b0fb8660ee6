use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer, Config};
use crate::handlers::{dashboard, events, health_check, list_categories, reviews, rsvps};
use crate::state::AppState;

pub fn create_routes(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/categories", get(list_categories))
        .route("/events", get(events::list_events).post(events::create_event))
        .route(
            "/events/:id",
            get(events::get_event).delete(events::delete_event),
        )
        .route(
            "/events/:id/rsvp",
            put(rsvps::set_rsvp).delete(rsvps::remove_rsvp),
        )
        .route("/events/:id/reviews", post(reviews::submit_review))
        .route("/dashboard", get(dashboard::get_dashboard))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer(config.production))
        .layer(create_cors_layer(config.cors_allowed_origins.as_deref()))
}
