use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use moka::future::Cache;

use crate::config::{ApiConfig, CacheConfig};
use crate::controller::{CitizenController, VoteController};
use crate::models::vote::VoteView;
use crate::repository::Repositories;
use crate::service::{CitizenService, VoteService};

#[derive(Clone)]
pub struct AppState {
    pub votes: Arc<VoteController>,
    pub citizens: Arc<CitizenController>,
    pub cache: Arc<ApiCache>,
    pub start_time: Instant,
}

impl AppState {
    /// Wires services and controllers over the given repositories.
    pub fn new(config: &ApiConfig, repositories: Repositories) -> Self {
        let vote_service = VoteService::new(
            repositories.votes,
            repositories.citizens.clone(),
            config.voting,
        );
        let citizen_service = CitizenService::new(repositories.citizens);
        Self {
            votes: Arc::new(VoteController::new(vote_service, citizen_service.clone())),
            citizens: Arc::new(CitizenController::new(citizen_service)),
            cache: Arc::new(ApiCache::new(&config.cache)),
            start_time: Instant::now(),
        }
    }
}

/// Vote views keyed by id. `writes` counts vote writes so that a view read
/// before a write never outlives it in the cache.
pub struct ApiCache {
    pub votes: Cache<String, Arc<VoteView>>,
    writes: AtomicU64,
}

impl ApiCache {
    pub fn new(config: &CacheConfig) -> Self {
        let ttl = config.votes_ttl();
        let votes = Cache::builder()
            .max_capacity(config.votes_max_capacity)
            .time_to_live(ttl)
            .time_to_idle(ttl / 2 + Duration::from_secs(1))
            .build();
        Self {
            votes,
            writes: AtomicU64::new(0),
        }
    }

    /// Taken before reading a vote from storage; passed to `store_vote`.
    pub fn generation(&self) -> u64 {
        self.writes.load(Ordering::Acquire)
    }

    /// Call after the write has reached storage.
    pub async fn invalidate_vote(&self, vote_id: &str) {
        self.writes.fetch_add(1, Ordering::AcqRel);
        self.votes.invalidate(vote_id).await;
    }

    /// Caches a view read at generation `seen`. If a write happened since,
    /// the entry is dropped again.
    pub async fn store_vote(&self, vote_id: String, view: VoteView, seen: u64) {
        self.votes.insert(vote_id.clone(), Arc::new(view)).await;
        if self.generation() != seen {
            self.votes.invalidate(&vote_id).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::vote::VoteStatus;

    fn view(id: &str) -> VoteView {
        VoteView {
            id: id.into(),
            title: "Neue Parkanlage".into(),
            description: "Stadtzentrum".into(),
            deadline: "2024-01-31".into(),
            minimum_age: 18,
            status: VoteStatus::Active,
        }
    }

    #[tokio::test]
    async fn invalidation_drops_cached_vote() {
        let cache = ApiCache::new(&CacheConfig::default());
        cache.votes.insert("1".into(), Arc::new(view("1"))).await;
        cache.votes.insert("2".into(), Arc::new(view("2"))).await;

        cache.invalidate_vote("1").await;

        assert!(cache.votes.get("1").await.is_none());
        assert_eq!(cache.votes.get("2").await.unwrap().id, "2");
    }

    #[tokio::test]
    async fn view_read_before_a_write_is_not_kept() {
        let cache = ApiCache::new(&CacheConfig::default());

        let seen = cache.generation();
        let stale = view("1");
        cache.invalidate_vote("1").await;
        cache.store_vote("1".into(), stale, seen).await;
        assert!(cache.votes.get("1").await.is_none());

        let seen = cache.generation();
        cache.store_vote("1".into(), view("1"), seen).await;
        assert_eq!(cache.votes.get("1").await.unwrap().id, "1");
    }
}
