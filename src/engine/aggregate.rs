use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{EventDetails, RsvpStatus, RsvpWithAttendee};

/// Number of going attendees listed by name before collapsing the rest
/// into a count.
pub const GOING_PREVIEW_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RsvpCounts {
    pub interested: usize,
    pub going: usize,
}

impl RsvpCounts {
    pub fn total(&self) -> usize {
        self.interested + self.going
    }
}

pub fn counts_by_status(event: &EventDetails) -> RsvpCounts {
    event
        .rsvps()
        .iter()
        .fold(RsvpCounts::default(), |mut counts, row| {
            match row.rsvp.status {
                RsvpStatus::Interested => counts.interested += 1,
                RsvpStatus::Going => counts.going += 1,
            }
            counts
        })
}

/// The acting user's RSVP, if they are signed in and have one.
pub fn current_user_rsvp(event: &EventDetails, user_id: Option<Uuid>) -> Option<&RsvpWithAttendee> {
    let user_id = user_id?;
    event.rsvps().iter().find(|row| row.rsvp.user_id == user_id)
}

/// Mean review rating, `0.0` when there are no reviews.
pub fn average_rating(event: &EventDetails) -> f64 {
    let reviews = event.reviews();
    if reviews.is_empty() {
        return 0.0;
    }
    let sum: i64 = reviews.iter().map(|r| i64::from(r.review.rating)).sum();
    sum as f64 / reviews.len() as f64
}

/// Rating rounded to one decimal, as shown next to the stars.
pub fn rating_display(average: f64) -> String {
    format!("{:.1}", average)
}

pub fn review_count_label(count: usize) -> String {
    if count == 1 {
        "1 review".to_string()
    } else {
        format!("{} reviews", count)
    }
}

/// Attendee names split by status, in RSVP order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttendeeBreakdown {
    pub going: Vec<String>,
    pub interested: Vec<String>,
}

pub fn attendee_breakdown(event: &EventDetails) -> AttendeeBreakdown {
    let mut breakdown = AttendeeBreakdown::default();
    for row in event.rsvps() {
        let name = row.attendee_name.clone();
        match row.rsvp.status {
            RsvpStatus::Going => breakdown.going.push(name),
            RsvpStatus::Interested => breakdown.interested.push(name),
        }
    }
    breakdown
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GoingPreview {
    pub names: Vec<String>,
    pub more: usize,
}

pub fn going_preview(event: &EventDetails) -> GoingPreview {
    let going: Vec<&RsvpWithAttendee> = event
        .rsvps()
        .iter()
        .filter(|row| row.rsvp.status == RsvpStatus::Going)
        .collect();

    GoingPreview {
        names: going
            .iter()
            .take(GOING_PREVIEW_LIMIT)
            .map(|row| row.attendee_name.clone())
            .collect(),
        more: going.len().saturating_sub(GOING_PREVIEW_LIMIT),
    }
}

/// Everything a card or detail page renders about an event besides the
/// event's own fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventSummary {
    pub counts: RsvpCounts,
    pub current_user_status: Option<RsvpStatus>,
    pub average_rating: f64,
    pub rating_display: String,
    pub review_count: usize,
    pub review_count_label: String,
    pub is_past: bool,
}

impl EventSummary {
    pub fn derive(event: &EventDetails, user_id: Option<Uuid>, now: DateTime<Utc>) -> Self {
        let average = average_rating(event);
        let review_count = event.reviews().len();

        Self {
            counts: counts_by_status(event),
            current_user_status: current_user_rsvp(event, user_id).map(|row| row.rsvp.status),
            average_rating: (average * 10.0).round() / 10.0,
            rating_display: rating_display(average),
            review_count,
            review_count_label: review_count_label(review_count),
            is_past: event.event.is_past(now),
        }
    }
}
