use serde::Serialize;
use uuid::Uuid;

use crate::models::{Rsvp, RsvpStatus};

/// Where a single (event, user) pair stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RsvpState {
    NoRsvp,
    Interested,
    Going,
}

impl RsvpState {
    pub fn of(row: Option<&Rsvp>) -> Self {
        row.map_or(RsvpState::NoRsvp, |r| Self::of_status(r.status))
    }

    fn of_status(status: RsvpStatus) -> Self {
        match status {
            RsvpStatus::Interested => RsvpState::Interested,
            RsvpStatus::Going => RsvpState::Going,
        }
    }

    pub fn status(&self) -> Option<RsvpStatus> {
        match self {
            RsvpState::NoRsvp => None,
            RsvpState::Interested => Some(RsvpStatus::Interested),
            RsvpState::Going => Some(RsvpStatus::Going),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsvpIntent {
    Set(RsvpStatus),
    Remove,
}

/// The single write needed to move from the current row to the intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RsvpTransition {
    Create {
        status: RsvpStatus,
    },
    Update {
        rsvp_id: Uuid,
        from: RsvpStatus,
        to: RsvpStatus,
    },
    Delete {
        rsvp_id: Uuid,
    },
    Unchanged,
}

impl RsvpTransition {
    /// Plans a transition from the row found by the `(event_id, user_id)`
    /// lookup that precedes every write.
    pub fn plan(current: Option<&Rsvp>, intent: RsvpIntent) -> Self {
        match (current, intent) {
            (None, RsvpIntent::Set(status)) => RsvpTransition::Create { status },
            (None, RsvpIntent::Remove) => RsvpTransition::Unchanged,
            (Some(row), RsvpIntent::Set(status)) if row.status == status => {
                RsvpTransition::Unchanged
            }
            (Some(row), RsvpIntent::Set(status)) => RsvpTransition::Update {
                rsvp_id: row.id,
                from: row.status,
                to: status,
            },
            (Some(row), RsvpIntent::Remove) => RsvpTransition::Delete { rsvp_id: row.id },
        }
    }

    pub fn target(&self, current: RsvpState) -> RsvpState {
        match self {
            RsvpTransition::Create { status } | RsvpTransition::Update { to: status, .. } => {
                RsvpState::of_status(*status)
            }
            RsvpTransition::Delete { .. } => RsvpState::NoRsvp,
            RsvpTransition::Unchanged => current,
        }
    }

    pub fn message(&self) -> String {
        match self {
            RsvpTransition::Create { status } => format!("RSVP set to {}", status),
            RsvpTransition::Update { to, .. } => format!("RSVP updated to {}", to),
            RsvpTransition::Delete { .. } => "RSVP removed".to_string(),
            RsvpTransition::Unchanged => "RSVP unchanged".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn row(status: RsvpStatus) -> Rsvp {
        Rsvp {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_first_rsvp_creates_row() {
        let transition = RsvpTransition::plan(None, RsvpIntent::Set(RsvpStatus::Going));
        assert_eq!(transition, RsvpTransition::Create { status: RsvpStatus::Going });
        assert_eq!(transition.target(RsvpState::NoRsvp), RsvpState::Going);
        assert_eq!(transition.message(), "RSVP set to going");
    }

    #[test]
    fn test_status_change_updates_in_place() {
        let going = row(RsvpStatus::Going);
        let transition = RsvpTransition::plan(Some(&going), RsvpIntent::Set(RsvpStatus::Interested));
        assert_eq!(
            transition,
            RsvpTransition::Update {
                rsvp_id: going.id,
                from: RsvpStatus::Going,
                to: RsvpStatus::Interested,
            }
        );
        assert_eq!(transition.target(RsvpState::Going), RsvpState::Interested);
        assert_eq!(transition.message(), "RSVP updated to interested");
    }

    #[test]
    fn test_remove_deletes_row() {
        let interested = row(RsvpStatus::Interested);
        let transition = RsvpTransition::plan(Some(&interested), RsvpIntent::Remove);
        assert_eq!(transition, RsvpTransition::Delete { rsvp_id: interested.id });
        assert_eq!(transition.target(RsvpState::Interested), RsvpState::NoRsvp);
    }

    #[test]
    fn test_noop_intents() {
        assert_eq!(RsvpTransition::plan(None, RsvpIntent::Remove), RsvpTransition::Unchanged);

        let going = row(RsvpStatus::Going);
        let transition = RsvpTransition::plan(Some(&going), RsvpIntent::Set(RsvpStatus::Going));
        assert_eq!(transition, RsvpTransition::Unchanged);
        assert_eq!(transition.target(RsvpState::Going), RsvpState::Going);
    }

    #[test]
    fn test_state_of_row() {
        assert_eq!(RsvpState::of(None), RsvpState::NoRsvp);
        assert_eq!(RsvpState::of(Some(&row(RsvpStatus::Going))), RsvpState::Going);
        assert_eq!(RsvpState::Interested.status(), Some(RsvpStatus::Interested));
        assert_eq!(RsvpState::NoRsvp.status(), None);
    }
}
