//! In-memory repository implementation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use happenings_core::event::{Event, EventDraft, EventId, Venue, VenueDraft, VenueId};
use happenings_core::storage::{EventRepository, RepositoryError, Result, VenueRepository};

/// In-memory storage backend.
///
/// Uses HashMaps wrapped in `Arc<RwLock<_>>` for thread-safe access.
/// Data is lost when the last clone is dropped.
#[derive(Debug, Clone)]
pub struct InMemoryRepository {
    events: Arc<RwLock<HashMap<EventId, Event>>>,
    venues: Arc<RwLock<HashMap<VenueId, Venue>>>,
    next_event_id: Arc<AtomicI64>,
    next_venue_id: Arc<AtomicI64>,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self {
            events: Arc::new(RwLock::new(HashMap::new())),
            venues: Arc::new(RwLock::new(HashMap::new())),
            next_event_id: Arc::new(AtomicI64::new(1)),
            next_venue_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

#[async_trait]
impl EventRepository for InMemoryRepository {
    async fn get_event(&self, id: EventId) -> Result<Option<Event>> {
        let events = self.events.read().await;
        Ok(events.get(&id).cloned())
    }

    async fn list_events(&self) -> Result<Vec<Event>> {
        let events = self.events.read().await;
        let mut all: Vec<Event> = events.values().cloned().collect();
        all.sort_by_key(|e| e.id);
        Ok(all)
    }

    async fn create_event(&self, draft: &EventDraft) -> Result<Event> {
        let id = EventId(self.next_event_id.fetch_add(1, Ordering::SeqCst));
        let event = Event::from_draft(id, draft, Utc::now()).ok_or_else(|| {
            RepositoryError::InvalidData("Event start time is missing".to_string())
        })?;

        self.events.write().await.insert(id, event.clone());
        Ok(event)
    }

    async fn update_event(&self, event: &Event) -> Result<()> {
        let mut events = self.events.write().await;
        if !events.contains_key(&event.id) {
            return Err(RepositoryError::NotFound {
                entity_type: "Event",
                id: event.id.to_string(),
            });
        }
        events.insert(event.id, event.clone());
        Ok(())
    }

    async fn delete_event(&self, id: EventId) -> Result<()> {
        let mut events = self.events.write().await;
        if events.remove(&id).is_none() {
            return Err(RepositoryError::NotFound {
                entity_type: "Event",
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl VenueRepository for InMemoryRepository {
    async fn get_venue(&self, id: VenueId) -> Result<Option<Venue>> {
        let venues = self.venues.read().await;
        Ok(venues.get(&id).cloned())
    }

    async fn list_venues(&self) -> Result<Vec<Venue>> {
        let venues = self.venues.read().await;
        let mut all: Vec<Venue> = venues.values().cloned().collect();
        all.sort_by_key(|v| v.id);
        Ok(all)
    }

    async fn find_venue_by_title(&self, title: &str) -> Result<Option<Venue>> {
        let venues = self.venues.read().await;
        Ok(venues
            .values()
            .filter(|v| v.title == title)
            .min_by_key(|v| v.id)
            .cloned())
    }

    async fn create_venue(&self, draft: &VenueDraft) -> Result<Venue> {
        if draft.title.trim().is_empty() {
            return Err(RepositoryError::InvalidData(
                "Venue title can't be blank".to_string(),
            ));
        }

        let id = VenueId(self.next_venue_id.fetch_add(1, Ordering::SeqCst));
        let mut venue = Venue::new(id, draft.title.trim());
        venue.address = draft.address.clone();
        venue.latitude = draft.latitude;
        venue.longitude = draft.longitude;

        self.venues.write().await.insert(id, venue.clone());
        Ok(venue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, day)
            .unwrap()
            .and_hms_opt(19, 0, 0)
            .unwrap()
    }

    fn draft(title: &str, day: u32) -> EventDraft {
        EventDraft {
            title: title.to_string(),
            start_time: Some(at(day)),
            ..Default::default()
        }
    }

    // ==================== Event Tests ====================

    #[tokio::test]
    async fn test_event_create_and_get() {
        let repo = InMemoryRepository::new();

        let event = repo.create_event(&draft("Jazz Night", 20)).await.unwrap();

        assert_eq!(event.id, EventId(1));
        let retrieved = repo.get_event(event.id).await.unwrap();
        assert_eq!(retrieved, Some(event));
    }

    #[tokio::test]
    async fn test_event_ids_are_sequential() {
        let repo = InMemoryRepository::new();

        let first = repo.create_event(&draft("One", 1)).await.unwrap();
        let second = repo.create_event(&draft("Two", 2)).await.unwrap();

        assert_eq!(first.id, EventId(1));
        assert_eq!(second.id, EventId(2));
    }

    #[tokio::test]
    async fn test_event_create_without_start_time() {
        let repo = InMemoryRepository::new();
        let result = repo.create_event(&EventDraft::default()).await;
        assert!(matches!(result, Err(RepositoryError::InvalidData(_))));
    }

    #[tokio::test]
    async fn test_event_get_nonexistent() {
        let repo = InMemoryRepository::new();
        let result = repo.get_event(EventId(99)).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_event_list_includes_duplicates() {
        let repo = InMemoryRepository::new();
        let original = repo.create_event(&draft("Original", 5)).await.unwrap();
        let dup = EventDraft {
            duplicate_of_id: Some(original.id),
            ..draft("Dup", 5)
        };
        repo.create_event(&dup).await.unwrap();

        let all = repo.list_events().await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[1].is_duplicate());
    }

    #[tokio::test]
    async fn test_event_update() {
        let repo = InMemoryRepository::new();
        let mut event = repo.create_event(&draft("Original Title", 5)).await.unwrap();

        event.title = "Updated Title".to_string();
        repo.update_event(&event).await.unwrap();

        let retrieved = repo.get_event(event.id).await.unwrap().unwrap();
        assert_eq!(retrieved.title, "Updated Title");
    }

    #[tokio::test]
    async fn test_event_update_nonexistent() {
        let repo = InMemoryRepository::new();
        let event = Event::new(EventId(42), "Ghost", at(1));

        let result = repo.update_event(&event).await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_event_delete() {
        let repo = InMemoryRepository::new();
        let event = repo.create_event(&draft("Doomed", 5)).await.unwrap();

        repo.delete_event(event.id).await.unwrap();

        assert!(repo.get_event(event.id).await.unwrap().is_none());
        let again = repo.delete_event(event.id).await;
        assert!(matches!(again, Err(RepositoryError::NotFound { .. })));
    }

    // ==================== Venue Tests ====================

    #[tokio::test]
    async fn test_venue_create_and_find() {
        let repo = InMemoryRepository::new();

        let venue = repo
            .create_venue(&VenueDraft::named(" Holocene "))
            .await
            .unwrap();

        assert_eq!(venue.title, "Holocene");
        assert_eq!(repo.get_venue(venue.id).await.unwrap(), Some(venue.clone()));
        assert_eq!(
            repo.find_venue_by_title("Holocene").await.unwrap(),
            Some(venue)
        );
        assert!(repo.find_venue_by_title("holocene").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_venue_find_prefers_oldest() {
        let repo = InMemoryRepository::new();
        let first = repo.create_venue(&VenueDraft::named("Pub")).await.unwrap();
        repo.create_venue(&VenueDraft::named("Pub")).await.unwrap();

        let found = repo.find_venue_by_title("Pub").await.unwrap().unwrap();
        assert_eq!(found.id, first.id);
        assert_eq!(repo.list_venues().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_venue_blank_title_rejected() {
        let repo = InMemoryRepository::new();
        let result = repo.create_venue(&VenueDraft::named("  ")).await;
        assert!(matches!(result, Err(RepositoryError::InvalidData(_))));
    }
}
