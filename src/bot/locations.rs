//! Saved user locations for the weather commands.

use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::chat::normalize_user;
use crate::storage::{FileStore, LocationRecord};

/// Keys are lowercase user names, so lookups ignore case.
pub struct LocationBook {
    locations: Mutex<HashMap<String, LocationRecord>>,
    store: FileStore,
}

impl LocationBook {
    pub fn new(store: FileStore) -> Self {
        let locations = store.load_locations().unwrap_or_else(|e| {
            tracing::warn!("Failed to load user locations: {}", e);
            HashMap::new()
        });
        Self {
            locations: Mutex::new(locations),
            store,
        }
    }

    pub async fn city_of(&self, user: &str) -> Option<String> {
        self.locations
            .lock()
            .await
            .get(&normalize_user(user))
            .map(|r| r.city.clone())
    }

    /// Save `city` for `user`. The file is rewritten while the lock is held,
    /// so concurrent updates land on disk in the order they were applied.
    pub async fn set(&self, user: &str, city: &str) {
        let mut locations = self.locations.lock().await;
        locations.insert(
            normalize_user(user),
            LocationRecord {
                city: city.to_string(),
            },
        );
        if let Err(e) = self.store.save_locations(&locations) {
            tracing::error!("Failed to save user locations: {}", e);
        }
    }
}
