//! Application state with repository-based storage.
//!
//! This module defines the shared application state that is passed to all
//! request handlers. Storage sits behind repository trait objects so the
//! handlers never see the backend.

use std::sync::Arc;

use happenings_core::event::{index_venues, VenueIndex};
use happenings_core::storage::{EventRepository, RepositoryError, VenueRepository};

use crate::cache::ListingCache;
use crate::config::Config;
use crate::render::Site;
use crate::storage::InMemoryRepository;
use crate::urls::UrlBuilder;

/// Shared application state.
///
/// This is cloned for each request handler.
#[derive(Clone)]
pub struct AppState {
    pub event_repo: Arc<dyn EventRepository>,
    pub venue_repo: Arc<dyn VenueRepository>,
    /// Rendered default listings, dropped on every write.
    pub listing_cache: ListingCache,
    pub urls: UrlBuilder,
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates state backed by a fresh in-memory repository.
    pub fn new(config: Config) -> Self {
        let repo = Arc::new(InMemoryRepository::new());
        Self::with_repositories(repo.clone(), repo, config)
    }

    pub fn with_repositories(
        event_repo: Arc<dyn EventRepository>,
        venue_repo: Arc<dyn VenueRepository>,
        config: Config,
    ) -> Self {
        Self {
            event_repo,
            venue_repo,
            listing_cache: ListingCache::new(config.cache_max_entries, config.cache_ttl()),
            urls: UrlBuilder::new(&config.base_url),
            config: Arc::new(config),
        }
    }

    pub fn site(&self) -> Site<'_> {
        Site {
            title: &self.config.site_title,
            urls: &self.urls,
        }
    }

    /// Loads every venue, keyed by id.
    pub async fn venue_index(&self) -> Result<VenueIndex, RepositoryError> {
        Ok(index_venues(self.venue_repo.list_venues().await?))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
