//! Paths and absolute URLs for the site's resources.

use happenings_core::event::{EventId, VenueId};
use happenings_core::render::OutputKind;

pub const EVENTS_PATH: &str = "/events";
pub const ROOT_PATH: &str = "/";

/// Builds links, absolute where feeds and calendars need them.
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    base_url: String,
}

impl UrlBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Prefixes a site path with the base URL.
    pub fn absolute(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn event_path(&self, id: EventId) -> String {
        format!("{EVENTS_PATH}/{id}")
    }

    /// Path to an event in a given representation; HTML has no extension.
    pub fn event_path_as(&self, id: EventId, kind: OutputKind) -> String {
        match kind {
            OutputKind::Html => self.event_path(id),
            other => format!("{EVENTS_PATH}/{id}.{}", other.extension()),
        }
    }

    pub fn event_url(&self, id: EventId) -> String {
        self.absolute(&self.event_path(id))
    }

    pub fn edit_event_path(&self, id: EventId) -> String {
        format!("{EVENTS_PATH}/{id}/edit")
    }

    pub fn clone_event_path(&self, id: EventId) -> String {
        format!("{EVENTS_PATH}/{id}/clone")
    }

    pub fn delete_event_path(&self, id: EventId) -> String {
        format!("{EVENTS_PATH}/{id}/delete")
    }

    /// `path` with a `format` parameter appended, keeping any query it has.
    pub fn with_format(&self, path: &str, kind: OutputKind) -> String {
        let separator = if path.contains('?') { '&' } else { '?' };
        format!("{path}{separator}format={}", kind.extension())
    }

    pub fn search_tag_path(&self, tag: &str) -> String {
        format!("{EVENTS_PATH}/search?tag={}", urlencoding::encode(tag))
    }

    /// Venue completion form, linking back to the event that created the venue.
    pub fn edit_venue_path(&self, id: VenueId, from_event: Option<EventId>) -> String {
        match from_event {
            Some(event) => format!("/venues/{id}/edit?from_event={event}"),
            None => format!("/venues/{id}/edit"),
        }
    }
}
