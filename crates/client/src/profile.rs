//! Viewer and member profiles.

use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;

use engine::Currency;

#[derive(Clone, Debug, PartialEq)]
pub struct Profile {
    pub user_id: Uuid,
    pub display_name: String,
    /// Preferred display currency for balances and effects.
    pub currency: Currency,
}

/// Cache of resolved profiles, owned by whoever drives a session.
///
/// There is deliberately no process-wide instance: callers construct one,
/// hand it to the code that needs it, and call [`ProfileCache::clear`] on
/// logout so a stale identity cannot leak into the next session.
#[derive(Debug, Default)]
pub struct ProfileCache {
    inner: RwLock<HashMap<Uuid, Profile>>,
}

impl ProfileCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, user_id: Uuid) -> Option<Profile> {
        self.inner.read().ok()?.get(&user_id).cloned()
    }

    pub fn insert(&self, profile: Profile) {
        if let Ok(mut guard) = self.inner.write() {
            guard.insert(profile.user_id, profile);
        }
    }

    pub fn invalidate(&self, user_id: Uuid) {
        if let Ok(mut guard) = self.inner.write() {
            guard.remove(&user_id);
        }
    }

    /// Empties the cache. Wire this to logout.
    pub fn clear(&self) {
        if let Ok(mut guard) = self.inner.write() {
            guard.clear();
        }
    }
}
