use std::collections::HashSet;
use std::sync::{Arc, RwLock};

/// Allow-set of chat user ids.
///
/// An empty set means open mode: everyone is authorized. Membership is the
/// whole policy, so add/remove are plain idempotent set operations.
#[derive(Clone, Default)]
pub struct AuthGate {
    allowed: Arc<RwLock<HashSet<i64>>>,
}

impl AuthGate {
    pub fn new(users: impl IntoIterator<Item = i64>) -> Self {
        Self {
            allowed: Arc::new(RwLock::new(users.into_iter().collect())),
        }
    }

    pub fn is_authorized(&self, user_id: i64) -> bool {
        let allowed = self.allowed.read().unwrap();
        allowed.is_empty() || allowed.contains(&user_id)
    }

    pub fn add(&self, user_id: i64) {
        self.allowed.write().unwrap().insert(user_id);
    }

    pub fn remove(&self, user_id: i64) {
        self.allowed.write().unwrap().remove(&user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_is_open_mode() {
        let gate = AuthGate::new([]);
        assert!(gate.is_authorized(1));
        assert!(gate.is_authorized(-42));
    }

    #[test]
    fn non_empty_set_restricts_to_members() {
        let gate = AuthGate::new([42]);
        assert!(gate.is_authorized(42));
        assert!(!gate.is_authorized(7));
    }

    #[test]
    fn add_and_remove_are_idempotent() {
        let gate = AuthGate::new([42]);
        gate.add(42);
        gate.add(7);
        assert!(gate.is_authorized(7));

        gate.remove(7);
        gate.remove(7);
        assert!(!gate.is_authorized(7));
        assert!(gate.is_authorized(42));
    }
}
