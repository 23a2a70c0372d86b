//! iCalendar export.

use chrono::NaiveDateTime;
use icalendar::{Calendar, Component, EventLike};

use crate::event::{Event, VenueIndex};

fn floating(time: NaiveDateTime) -> String {
    time.format("%Y%m%dT%H%M%S").to_string()
}

/// Renders `events` as a calendar with one VEVENT each.
///
/// `permalink` returns the absolute URL of an event's page.
pub fn render_ics<F>(events: &[Event], venues: &VenueIndex, permalink: F) -> String
where
    F: Fn(&Event) -> String,
{
    let mut cal = Calendar::new();

    for event in events {
        let link = permalink(event);
        let mut ics_event = icalendar::Event::new();
        ics_event.uid(&format!("event-{}@happenings", event.id));
        ics_event.summary(&event.title);
        ics_event.add_property(
            "DTSTAMP",
            event.updated_at.format("%Y%m%dT%H%M%SZ").to_string(),
        );
        ics_event.add_property("DTSTART", floating(event.start_time));
        if let Some(end) = event.end_time {
            ics_event.add_property("DTEND", floating(end));
        }

        let mut description = event.description.clone().unwrap_or_default();
        if let Some(url) = event.url.as_deref().filter(|u| !u.trim().is_empty()) {
            if !description.is_empty() {
                description.push_str("\n\n");
            }
            description.push_str(url);
        }
        if !description.is_empty() {
            ics_event.description(&description);
        }

        if let Some(venue) = event.venue_id.and_then(|id| venues.get(&id)) {
            ics_event.location(&venue.location());
        }
        if !event.tags.is_empty() {
            ics_event.add_property("CATEGORIES", event.tags.join(","));
        }
        ics_event.add_property("URL", link);

        cal.push(ics_event.done());
    }

    cal.done().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{index_venues, EventId, Venue, VenueId};
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 20)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn permalink(event: &Event) -> String {
        format!("http://x.test/events/{}", event.id)
    }

    #[test]
    fn test_one_vevent_per_event() {
        let events = vec![
            Event::new(EventId(1), "Jazz Night", at(19))
                .with_end_time(at(22))
                .with_venue(VenueId(1)),
            Event::new(EventId(2), "Book Club", at(18)),
        ];
        let venues = index_venues([Venue::new(VenueId(1), "Holocene")]);

        let ics = render_ics(&events, &venues, permalink);

        assert!(ics.starts_with("BEGIN:VCALENDAR"));
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 2);
        assert!(ics.contains("SUMMARY:Jazz Night"));
        assert!(ics.contains("DTSTART:20240620T190000"));
        assert!(ics.contains("DTEND:20240620T220000"));
        assert!(ics.contains("LOCATION:Holocene"));
        assert!(ics.contains("UID:event-1@happenings"));
        assert!(ics.contains("URL:http://x.test/events/2"));
    }

    #[test]
    fn test_open_ended_event_has_no_dtend() {
        let events = vec![Event::new(EventId(3), "Open Mic", at(20))];
        let ics = render_ics(&events, &VenueIndex::new(), permalink);

        assert!(ics.contains("DTSTART:20240620T200000"));
        assert!(!ics.contains("DTEND"));
    }

    #[test]
    fn test_empty_calendar() {
        let ics = render_ics(&[], &VenueIndex::new(), permalink);
        assert!(ics.contains("BEGIN:VCALENDAR"));
        assert!(!ics.contains("BEGIN:VEVENT"));
    }
}
