use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

/// Keys of `(user_id, event_id)` pairs with an RSVP write outstanding.
///
/// This is the only guard against double submission: it serialises one
/// user's interactions with one event inside this process. It is not a lock
/// on the stored row.
#[derive(Debug, Default)]
pub struct InFlight {
    keys: Mutex<HashSet<(Uuid, Uuid)>>,
}

impl InFlight {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// `None` while another request holds the same key.
    pub fn try_acquire(self: &Arc<Self>, user_id: Uuid, event_id: Uuid) -> Option<InFlightGuard> {
        let key = (user_id, event_id);
        let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        if !keys.insert(key) {
            return None;
        }
        Some(InFlightGuard {
            owner: Arc::clone(self),
            key,
        })
    }

    pub fn is_busy(&self, user_id: Uuid, event_id: Uuid) -> bool {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&(user_id, event_id))
    }
}

/// Releases its key on drop, including when the request errors out.
#[derive(Debug)]
pub struct InFlightGuard {
    owner: Arc<InFlight>,
    key: (Uuid, Uuid),
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.owner
            .keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_blocked_until_drop() {
        let in_flight = InFlight::new();
        let user = Uuid::new_v4();
        let event = Uuid::new_v4();

        let guard = in_flight.try_acquire(user, event).unwrap();
        assert!(in_flight.is_busy(user, event));
        assert!(in_flight.try_acquire(user, event).is_none());

        drop(guard);
        assert!(!in_flight.is_busy(user, event));
        assert!(in_flight.try_acquire(user, event).is_some());
    }

    #[test]
    fn test_keys_are_independent() {
        let in_flight = InFlight::new();
        let user = Uuid::new_v4();
        let _first = in_flight.try_acquire(user, Uuid::new_v4()).unwrap();
        assert!(in_flight.try_acquire(user, Uuid::new_v4()).is_some());
        assert!(in_flight.try_acquire(Uuid::new_v4(), Uuid::new_v4()).is_some());
    }
}
