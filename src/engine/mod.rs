//! Pure derivations over fetched events. Nothing in here touches the store.

pub mod aggregate;
pub mod filter;
pub mod review;
pub mod rsvp;
pub mod share;

pub use aggregate::{EventSummary, RsvpCounts};
pub use filter::EventFilter;
pub use review::{ReviewEligibility, ReviewRejection};
pub use rsvp::{RsvpIntent, RsvpState, RsvpTransition};
pub use share::ShareLinks;
