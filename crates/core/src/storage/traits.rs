use async_trait::async_trait;

use crate::event::{Event, EventDraft, EventId, Venue, VenueDraft, VenueId};

use super::Result;

/// Repository for event operations.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Gets an event by its ID, duplicates included.
    async fn get_event(&self, id: EventId) -> Result<Option<Event>>;

    /// Gets every stored event, duplicates included.
    async fn list_events(&self) -> Result<Vec<Event>>;

    /// Stores a new event and returns it with its assigned ID.
    async fn create_event(&self, draft: &EventDraft) -> Result<Event>;

    /// Replaces an existing event.
    async fn update_event(&self, event: &Event) -> Result<()>;

    /// Deletes an event by its ID.
    async fn delete_event(&self, id: EventId) -> Result<()>;
}

/// Repository for venue operations.
#[async_trait]
pub trait VenueRepository: Send + Sync {
    /// Gets a venue by its ID.
    async fn get_venue(&self, id: VenueId) -> Result<Option<Venue>>;

    /// Gets every stored venue.
    async fn list_venues(&self) -> Result<Vec<Venue>>;

    /// Finds the venue with exactly this title, if any.
    async fn find_venue_by_title(&self, title: &str) -> Result<Option<Venue>>;

    /// Stores a new venue and returns it with its assigned ID.
    async fn create_venue(&self, draft: &VenueDraft) -> Result<Venue>;
}
