use std::collections::HashMap;
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a stored event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub i64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EventId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(EventId)
    }
}

/// Identifier of a stored venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VenueId(pub i64);

impl fmt::Display for VenueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A place where events are held.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: VenueId,
    pub title: String,
    pub address: Option<String>,
    pub url: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Venue {
    /// Creates a venue with just a title.
    pub fn new(id: VenueId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            address: None,
            url: None,
            latitude: None,
            longitude: None,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    /// Single-line location text: title, then address when known.
    pub fn location(&self) -> String {
        match &self.address {
            Some(address) if !address.trim().is_empty() => format!("{}, {}", self.title, address),
            _ => self.title.clone(),
        }
    }
}

/// Attributes of a venue that has not been stored yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VenueDraft {
    pub title: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl VenueDraft {
    /// A venue known only by the name typed into the event form.
    pub fn named(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// Venues by id, used to decorate events for display.
pub type VenueIndex = HashMap<VenueId, Venue>;

/// Builds a [`VenueIndex`] from a list of venues.
pub fn index_venues(venues: impl IntoIterator<Item = Venue>) -> VenueIndex {
    venues.into_iter().map(|v| (v.id, v)).collect()
}

/// A calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    pub venue_id: Option<VenueId>,
    pub tags: Vec<String>,
    /// Set when this event was squashed into another one.
    pub duplicate_of_id: Option<EventId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Creates an event starting at `start_time`.
    pub fn new(id: EventId, title: impl Into<String>, start_time: NaiveDateTime) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: title.into(),
            description: None,
            url: None,
            start_time,
            end_time: None,
            venue_id: None,
            tags: Vec::new(),
            duplicate_of_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a stored event from a draft.
    ///
    /// Returns `None` if the draft has no start time.
    pub fn from_draft(id: EventId, draft: &EventDraft, now: DateTime<Utc>) -> Option<Self> {
        let start_time = draft.start_time?;
        Some(Self {
            id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            url: draft.url.clone(),
            start_time,
            end_time: draft.end_time,
            venue_id: draft.venue_id,
            tags: draft.tags.clone(),
            duplicate_of_id: draft.duplicate_of_id,
            created_at: now,
            updated_at: now,
        })
    }

    /// Overwrites this event's attributes with the draft's.
    ///
    /// Returns `false` and leaves the event untouched if the draft has no start time.
    pub fn apply_draft(&mut self, draft: EventDraft, now: DateTime<Utc>) -> bool {
        let Some(start_time) = draft.start_time else {
            return false;
        };
        self.title = draft.title;
        self.description = draft.description;
        self.url = draft.url;
        self.start_time = start_time;
        self.end_time = draft.end_time;
        self.venue_id = draft.venue_id;
        self.tags = draft.tags;
        self.duplicate_of_id = draft.duplicate_of_id;
        self.updated_at = now;
        true
    }

    /// Returns the editable attributes of this event.
    pub fn to_draft(&self) -> EventDraft {
        EventDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            url: self.url.clone(),
            start_time: Some(self.start_time),
            end_time: self.end_time,
            venue_id: self.venue_id,
            tags: self.tags.clone(),
            duplicate_of_id: self.duplicate_of_id,
        }
    }

    /// Returns a draft for a new event copied from this one.
    ///
    /// The copy is never a duplicate, even when this event is.
    pub fn to_clone(&self) -> EventDraft {
        EventDraft {
            duplicate_of_id: None,
            ..self.to_draft()
        }
    }

    /// Returns true if this event was squashed into another one.
    pub fn is_duplicate(&self) -> bool {
        self.duplicate_of_id.is_some()
    }

    /// End time, falling back to the start time for open-ended events.
    pub fn effective_end(&self) -> NaiveDateTime {
        self.end_time.unwrap_or(self.start_time)
    }

    /// Tags as a comma separated list.
    pub fn tag_list(&self) -> String {
        self.tags.join(", ")
    }

    /// Returns true if the event carries `tag`, ignoring case.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_end_time(mut self, end_time: NaiveDateTime) -> Self {
        self.end_time = Some(end_time);
        self
    }

    pub fn with_venue(mut self, venue_id: VenueId) -> Self {
        self.venue_id = Some(venue_id);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Marks this event as a duplicate of `original`.
    pub fn duplicate_of(mut self, original: EventId) -> Self {
        self.duplicate_of_id = Some(original);
        self
    }
}

/// Editable attributes of an event, stored or not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub venue_id: Option<VenueId>,
    pub tags: Vec<String>,
    pub duplicate_of_id: Option<EventId>,
}

impl EventDraft {
    /// Description text, empty when unset.
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_event_id_parse_and_display() {
        assert_eq!(" 42 ".parse::<EventId>(), Ok(EventId(42)));
        assert!("abc".parse::<EventId>().is_err());
        assert_eq!(EventId(7).to_string(), "7");
    }

    #[test]
    fn test_event_builder() {
        let event = Event::new(EventId(1), "Open Source Bridge", at(9))
            .with_description("Talks")
            .with_end_time(at(17))
            .with_venue(VenueId(3))
            .with_tags(["tech", "conference"]);

        assert_eq!(event.title, "Open Source Bridge");
        assert_eq!(event.effective_end(), at(17));
        assert_eq!(event.venue_id, Some(VenueId(3)));
        assert_eq!(event.tag_list(), "tech, conference");
        assert!(event.has_tag("TECH"));
        assert!(!event.is_duplicate());
    }

    #[test]
    fn test_effective_end_defaults_to_start() {
        let event = Event::new(EventId(1), "Open", at(9));
        assert_eq!(event.effective_end(), at(9));
    }

    #[test]
    fn test_draft_round_trip() {
        let event = Event::new(EventId(1), "Meetup", at(18)).with_tags(["ruby"]);
        let draft = event.to_draft();

        let rebuilt = Event::from_draft(EventId(1), &draft, event.created_at).unwrap();
        assert_eq!(rebuilt.title, event.title);
        assert_eq!(rebuilt.start_time, event.start_time);
        assert_eq!(rebuilt.tags, event.tags);
    }

    #[test]
    fn test_from_draft_requires_start_time() {
        let draft = EventDraft {
            title: "No time".to_string(),
            ..Default::default()
        };
        assert!(Event::from_draft(EventId(1), &draft, Utc::now()).is_none());
    }

    #[test]
    fn test_apply_draft() {
        let mut event = Event::new(EventId(1), "Old", at(9));
        let mut draft = event.to_draft();
        draft.title = "New".to_string();
        draft.start_time = Some(at(10));

        assert!(event.apply_draft(draft, Utc::now()));
        assert_eq!(event.title, "New");
        assert_eq!(event.start_time, at(10));

        let empty = EventDraft::default();
        assert!(!event.apply_draft(empty, Utc::now()));
        assert_eq!(event.title, "New");
    }

    #[test]
    fn test_clone_drops_duplicate_marker() {
        let event = Event::new(EventId(2), "Copy me", at(9)).duplicate_of(EventId(1));
        let draft = event.to_clone();

        assert_eq!(draft.title, "Copy me");
        assert_eq!(draft.duplicate_of_id, None);
    }

    #[test]
    fn test_venue_location() {
        let venue = Venue::new(VenueId(1), "Holocene");
        assert_eq!(venue.location(), "Holocene");

        let venue = venue.with_address("1001 SE Morrison St");
        assert_eq!(venue.location(), "Holocene, 1001 SE Morrison St");
    }

    #[test]
    fn test_index_venues() {
        let index = index_venues([Venue::new(VenueId(1), "A"), Venue::new(VenueId(2), "B")]);
        assert_eq!(index.len(), 2);
        assert_eq!(index[&VenueId(2)].title, "B");
    }
}
