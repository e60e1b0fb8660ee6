pub mod event;
pub mod profile;
pub mod review;
pub mod rsvp;

pub use event::{Event, EventDetails, NewEvent, OrganizerInfo};
pub use profile::{Profile, Role};
pub use review::{NewReview, Review, ReviewWithAuthor};
pub use rsvp::{Rsvp, RsvpStatus, RsvpWithAttendee};
