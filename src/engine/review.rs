use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::engine::aggregate::current_user_rsvp;
use crate::models::{EventDetails, RsvpStatus};

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewRejection {
    #[error("Sign in to review events.")]
    NotSignedIn,
    #[error("You can review this event after it ends.")]
    EventNotOver,
    #[error("Only attendees who marked 'going' can review events.")]
    NotGoing,
    #[error("You've already reviewed this event.")]
    AlreadyReviewed,
}

/// Whether the acting user may write a review, and if not, why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewEligibility {
    pub can_review: bool,
    pub reason: Option<String>,
}

impl From<Result<(), ReviewRejection>> for ReviewEligibility {
    fn from(result: Result<(), ReviewRejection>) -> Self {
        match result {
            Ok(()) => Self {
                can_review: true,
                reason: None,
            },
            Err(rejection) => Self {
                can_review: false,
                reason: Some(rejection.to_string()),
            },
        }
    }
}

/// A review is allowed only once the event is over, for a user whose RSVP
/// is "going", and only if they have not reviewed it yet. `event` must be a
/// fresh fetch with RSVPs and reviews embedded.
pub fn check_eligibility(
    event: &EventDetails,
    user_id: Option<Uuid>,
    now: DateTime<Utc>,
) -> Result<(), ReviewRejection> {
    let user_id = user_id.ok_or(ReviewRejection::NotSignedIn)?;

    if !event.event.is_past(now) {
        return Err(ReviewRejection::EventNotOver);
    }

    let going = current_user_rsvp(event, Some(user_id))
        .map(|row| row.rsvp.status == RsvpStatus::Going)
        .unwrap_or(false);
    if !going {
        return Err(ReviewRejection::NotGoing);
    }

    if event.reviews().iter().any(|r| r.review.user_id == user_id) {
        return Err(ReviewRejection::AlreadyReviewed);
    }

    Ok(())
}

pub fn validate_rating(rating: i64) -> Result<i16, String> {
    if (i64::from(MIN_RATING)..=i64::from(MAX_RATING)).contains(&rating) {
        Ok(rating as i16)
    } else {
        Err(format!(
            "Rating must be between {} and {}",
            MIN_RATING, MAX_RATING
        ))
    }
}

/// Blank comments are stored as null, never as an empty string.
pub fn normalize_comment(comment: Option<&str>) -> Option<String> {
    comment
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}
