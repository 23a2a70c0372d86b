//! Display-ready views of events for the templates.

use chrono::NaiveDateTime;
use happenings_core::event::{Event, Venue, VenueIndex};

use crate::urls::UrlBuilder;

/// A tag with the search link that lists its events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagView {
    pub name: String,
    pub path: String,
}

/// Everything a template shows about one event, already formatted.
#[derive(Debug, Clone, PartialEq)]
pub struct EventView {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    /// Human readable time span, e.g. "Thursday, June 20, 2024 at 7:00pm".
    pub when: String,
    pub start_iso: String,
    pub end_iso: Option<String>,
    /// The associated venue, for structured output.
    pub venue: Option<Venue>,
    pub venue_title: Option<String>,
    pub venue_location: Option<String>,
    /// `longitude,latitude` for map placemarks.
    pub coordinates: Option<String>,
    pub tags: Vec<TagView>,
    pub tag_list: String,
    pub path: String,
    pub permalink: String,
    pub edit_path: String,
    pub clone_path: String,
    pub delete_path: String,
    /// RFC 3339 timestamp of the last change.
    pub updated: String,
}

fn iso(time: NaiveDateTime) -> String {
    time.format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Formats the span of an event the way listings show it.
pub fn describe_time(start: NaiveDateTime, end: Option<NaiveDateTime>) -> String {
    let day = |t: NaiveDateTime| t.format("%A, %B %-d, %Y").to_string();
    let clock = |t: NaiveDateTime| t.format("%-I:%M%P").to_string();

    let from = format!("{} at {}", day(start), clock(start));
    match end {
        Some(end) if end == start => from,
        Some(end) if end.date() == start.date() => format!("{from} to {}", clock(end)),
        Some(end) => format!("{from} to {} at {}", day(end), clock(end)),
        None => from,
    }
}

impl EventView {
    pub fn new(event: &Event, venues: &VenueIndex, urls: &UrlBuilder) -> Self {
        let venue = event.venue_id.and_then(|id| venues.get(&id));

        Self {
            id: event.id.0,
            title: event.title.clone(),
            description: event.description.clone(),
            url: event.url.clone(),
            when: describe_time(event.start_time, event.end_time),
            start_iso: iso(event.start_time),
            end_iso: event.end_time.map(iso),
            venue: venue.cloned(),
            venue_title: venue.map(|v| v.title.clone()),
            venue_location: venue.map(|v| v.location()),
            coordinates: venue.and_then(|v| match (v.latitude, v.longitude) {
                (Some(lat), Some(lon)) => Some(format!("{lon},{lat}")),
                _ => None,
            }),
            tags: event
                .tags
                .iter()
                .map(|tag| TagView {
                    name: tag.clone(),
                    path: urls.search_tag_path(tag),
                })
                .collect(),
            tag_list: event.tag_list(),
            path: urls.event_path(event.id),
            permalink: urls.event_url(event.id),
            edit_path: urls.edit_event_path(event.id),
            clone_path: urls.clone_event_path(event.id),
            delete_path: urls.delete_event_path(event.id),
            updated: event.updated_at.to_rfc3339(),
        }
    }

    pub fn all(events: &[Event], venues: &VenueIndex, urls: &UrlBuilder) -> Vec<Self> {
        events
            .iter()
            .map(|e| EventView::new(e, venues, urls))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use happenings_core::event::{index_venues, EventId, Venue, VenueId};

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_describe_time() {
        assert_eq!(
            describe_time(at(20, 19, 0), None),
            "Thursday, June 20, 2024 at 7:00pm"
        );
        assert_eq!(
            describe_time(at(20, 19, 0), Some(at(20, 21, 30))),
            "Thursday, June 20, 2024 at 7:00pm to 9:30pm"
        );
        assert_eq!(
            describe_time(at(20, 9, 0), Some(at(21, 17, 0))),
            "Thursday, June 20, 2024 at 9:00am to Friday, June 21, 2024 at 5:00pm"
        );
    }

    #[test]
    fn test_event_view_links_and_venue() {
        let urls = UrlBuilder::new("http://example.com");
        let venues = index_venues([Venue::new(VenueId(3), "Holocene")
            .with_address("1001 SE Morrison St")
            .with_coordinates(45.5, -122.6)]);
        let event = Event::new(EventId(7), "Jazz Night", at(20, 19, 0))
            .with_venue(VenueId(3))
            .with_tags(["jazz", "all ages"]);

        let view = EventView::new(&event, &venues, &urls);

        assert_eq!(view.path, "/events/7");
        assert_eq!(view.permalink, "http://example.com/events/7");
        assert_eq!(view.venue_title.as_deref(), Some("Holocene"));
        assert_eq!(view.coordinates.as_deref(), Some("-122.6,45.5"));
        assert_eq!(view.tags[1].path, "/events/search?tag=all%20ages");
        assert_eq!(view.start_iso, "2024-06-20T19:00:00");
    }

    #[test]
    fn test_event_view_without_venue() {
        let urls = UrlBuilder::new("http://example.com");
        let event = Event::new(EventId(1), "Picnic", at(1, 12, 0));

        let view = EventView::new(&event, &VenueIndex::new(), &urls);

        assert!(view.venue_title.is_none());
        assert!(view.coordinates.is_none());
        assert!(view.tags.is_empty());
    }
}
