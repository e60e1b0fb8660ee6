pub mod events;
pub mod in_flight;
pub mod reviews;
pub mod rsvps;

pub use events::EventService;
pub use reviews::ReviewService;
pub use rsvps::RsvpService;
