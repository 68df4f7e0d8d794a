// Service exports
pub mod cache;
pub mod geocoder;
pub mod notifier;
pub mod roster;

pub use cache::{RosterCache, CacheStats, DEFAULT_ROSTER_TTL_SECS};
pub use geocoder::{NominatimClient, GeocodeError, GeocodeHit, GeocodeOutcome, format_label};
pub use notifier::{Notifier, NotifierSettings, DispatchError, DispatchReceipt, Visitor};
pub use roster::{RosterLoader, RosterSource, RosterError, parse_roster};

use crate::models::Roster;
use std::sync::Arc;

/// Cached access to the geocoded roster
pub struct RosterService {
    loader: RosterLoader,
    cache: RosterCache,
}

impl RosterService {
    pub fn new(loader: RosterLoader, cache: RosterCache) -> Self {
        Self { loader, cache }
    }

    /// Current roster, loading and geocoding it when the cache has expired
    pub async fn current(&self) -> Result<Arc<Roster>, Arc<RosterError>> {
        let key = self.loader.source().identity();
        self.cache.get_or_load(&key, self.loader.load()).await
    }

    /// Current roster, or an empty one alongside the load error
    pub async fn current_or_empty(&self) -> (Arc<Roster>, Option<String>) {
        match self.current().await {
            Ok(roster) => (roster, None),
            Err(e) => {
                tracing::error!("Failed to load roster: {}", e);
                let empty = Roster::empty(self.loader.source().identity());
                (Arc::new(empty), Some(e.to_string()))
            }
        }
    }

    pub fn cache(&self) -> &RosterCache {
        &self.cache
    }
}
