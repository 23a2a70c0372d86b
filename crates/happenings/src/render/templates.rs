//! Askama templates for pages, feeds and XML documents.

use askama::Template;
use happenings_core::event::FormValues;

use super::views::EventView;
use crate::handlers::flash::FlashMessage;

/// Date range and ordering shown in the listing filter form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterView {
    pub start: String,
    pub end: String,
    pub order: &'static str,
}

/// Links to the other representations of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedLinks {
    pub atom: String,
    pub ics: String,
    pub kml: String,
    pub json: String,
}

#[derive(Template)]
#[template(path = "events/index.html")]
pub struct IndexTemplate<'a> {
    pub site_title: &'a str,
    pub page_title: &'a str,
    pub messages: &'a [FlashMessage],
    pub events: Vec<EventView>,
    pub filter: Option<FilterView>,
    pub search_query: &'a str,
    pub feeds: FeedLinks,
}

#[derive(Template)]
#[template(path = "events/show.html")]
pub struct ShowTemplate<'a> {
    pub site_title: &'a str,
    pub page_title: &'a str,
    pub messages: &'a [FlashMessage],
    pub event: EventView,
    pub ics_path: String,
    pub json_path: String,
}

#[derive(Template)]
#[template(path = "events/form.html")]
pub struct FormTemplate<'a> {
    pub site_title: &'a str,
    pub page_title: &'a str,
    pub messages: &'a [FlashMessage],
    pub values: &'a FormValues,
    pub action: &'a str,
    pub is_new: bool,
    pub preview: Option<EventView>,
    pub cancel_path: &'a str,
}

#[derive(Template)]
#[template(path = "events/index.atom.xml")]
pub struct AtomTemplate<'a> {
    pub site_title: &'a str,
    pub page_title: &'a str,
    pub feed_url: &'a str,
    pub alternate_url: &'a str,
    pub updated: &'a str,
    pub events: Vec<EventView>,
}

#[derive(Template)]
#[template(path = "events/index.kml.xml")]
pub struct KmlTemplate<'a> {
    pub page_title: &'a str,
    pub events: Vec<EventView>,
}

#[derive(Template)]
#[template(path = "events/events.xml")]
pub struct EventsXmlTemplate {
    pub events: Vec<EventView>,
}

#[derive(Template)]
#[template(path = "events/event.xml")]
pub struct EventXmlTemplate {
    pub event: EventView,
}

#[derive(Template)]
#[template(path = "events/errors.xml")]
pub struct ErrorsXmlTemplate<'a> {
    pub errors: &'a [String],
}
