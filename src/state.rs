use std::sync::Arc;

use crate::config::Config;
use crate::services::{EventService, ReviewService, RsvpService};
use crate::store::EventStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EventStore>,
    pub events: EventService,
    pub rsvps: RsvpService,
    pub reviews: ReviewService,
}

impl AppState {
    pub fn new(store: Arc<dyn EventStore>, config: &Config) -> Self {
        Self {
            events: EventService::new(store.clone(), config.public_base_url.clone()),
            rsvps: RsvpService::new(store.clone()),
            reviews: ReviewService::new(store.clone()),
            store,
        }
    }
}
