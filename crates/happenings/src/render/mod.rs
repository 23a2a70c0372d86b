//! Turns result sets into response bodies for every output kind.
//!
//! Calendar and JSON output come from `happenings_core::render`; pages,
//! feeds and XML documents are rendered from askama templates.

mod templates;
mod views;

use askama::Template;
use axum::{
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use happenings_core::event::{Event, FormValues, VenueIndex};
use happenings_core::render::{
    event_records, json_content_type, render_ics, render_json, Callback, EventRecord, OutputKind,
    RenderError, Resource,
};

pub use templates::FilterView;
pub use views::EventView;

use templates::{
    AtomTemplate, ErrorsXmlTemplate, EventXmlTemplate, EventsXmlTemplate, FeedLinks, FormTemplate,
    IndexTemplate, KmlTemplate, ShowTemplate,
};

use crate::handlers::flash::FlashMessage;
use crate::urls::UrlBuilder;

/// A rendered response body and its content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBody {
    pub content_type: &'static str,
    pub body: String,
}

impl RenderedBody {
    pub fn new(content_type: &'static str, body: impl Into<String>) -> Self {
        Self {
            content_type,
            body: body.into(),
        }
    }
}

impl IntoResponse for RenderedBody {
    fn into_response(self) -> Response {
        ([(CONTENT_TYPE, self.content_type)], self.body).into_response()
    }
}

fn render_template<T: Template>(kind: OutputKind, template: &T) -> Result<RenderedBody, RenderError> {
    let body = template
        .render()
        .map_err(|err| RenderError::Serialization(err.to_string()))?;
    Ok(RenderedBody::new(kind.content_type(), body))
}

fn json_body<T>(value: &T, callback: Option<&Callback>) -> Result<RenderedBody, RenderError>
where
    T: serde::Serialize + ?Sized,
{
    Ok(RenderedBody::new(
        json_content_type(callback),
        render_json(value, callback)?,
    ))
}

/// Site-wide values every page needs.
#[derive(Debug, Clone, Copy)]
pub struct Site<'a> {
    pub title: &'a str,
    pub urls: &'a UrlBuilder,
}

/// A list of events, from the index or a search.
pub struct Listing<'a> {
    pub page_title: &'a str,
    /// Path of the HTML page, used to link the other representations.
    pub path: &'a str,
    pub events: &'a [Event],
    pub venues: &'a VenueIndex,
    pub messages: &'a [FlashMessage],
    pub filter: Option<FilterView>,
    pub search_query: &'a str,
}

pub fn render_listing(
    kind: OutputKind,
    listing: &Listing<'_>,
    site: Site<'_>,
    callback: Option<&Callback>,
) -> Result<RenderedBody, RenderError> {
    let urls = site.urls;
    let views = || EventView::all(listing.events, listing.venues, urls);

    match kind {
        OutputKind::Html => render_template(
            kind,
            &IndexTemplate {
                site_title: site.title,
                page_title: listing.page_title,
                messages: listing.messages,
                events: views(),
                filter: listing.filter.clone(),
                search_query: listing.search_query,
                feeds: FeedLinks {
                    atom: urls.with_format(listing.path, OutputKind::Atom),
                    ics: urls.with_format(listing.path, OutputKind::Ics),
                    kml: urls.with_format(listing.path, OutputKind::Kml),
                    json: urls.with_format(listing.path, OutputKind::Json),
                },
            },
        ),
        OutputKind::Atom => {
            let updated = listing
                .events
                .iter()
                .map(|e| e.updated_at)
                .max()
                .unwrap_or_else(Utc::now)
                .to_rfc3339();
            let feed_url = urls.absolute(&urls.with_format(listing.path, OutputKind::Atom));
            let alternate_url = urls.absolute(listing.path);
            render_template(
                kind,
                &AtomTemplate {
                    site_title: site.title,
                    page_title: listing.page_title,
                    feed_url: &feed_url,
                    alternate_url: &alternate_url,
                    updated: &updated,
                    events: views(),
                },
            )
        }
        OutputKind::Kml => render_template(
            kind,
            &KmlTemplate {
                page_title: listing.page_title,
                events: views(),
            },
        ),
        OutputKind::Xml => render_template(kind, &EventsXmlTemplate { events: views() }),
        OutputKind::Ics => Ok(RenderedBody::new(
            kind.content_type(),
            render_ics(listing.events, listing.venues, |e| urls.event_url(e.id)),
        )),
        OutputKind::Json => json_body(&event_records(listing.events, listing.venues), callback),
    }
}

pub fn render_event(
    kind: OutputKind,
    event: &Event,
    venues: &VenueIndex,
    messages: &[FlashMessage],
    site: Site<'_>,
    callback: Option<&Callback>,
) -> Result<RenderedBody, RenderError> {
    let urls = site.urls;

    match kind {
        OutputKind::Html => render_template(
            kind,
            &ShowTemplate {
                site_title: site.title,
                page_title: &event.title,
                messages,
                event: EventView::new(event, venues, urls),
                ics_path: urls.event_path_as(event.id, OutputKind::Ics),
                json_path: urls.event_path_as(event.id, OutputKind::Json),
            },
        ),
        OutputKind::Xml => render_template(
            kind,
            &EventXmlTemplate {
                event: EventView::new(event, venues, urls),
            },
        ),
        OutputKind::Ics => Ok(RenderedBody::new(
            kind.content_type(),
            render_ics(std::slice::from_ref(event), venues, |e| urls.event_url(e.id)),
        )),
        OutputKind::Json => json_body(&EventRecord::new(event, venues), callback),
        OutputKind::Atom | OutputKind::Kml => Err(RenderError::NotAcceptable {
            kind,
            resource: Resource::Event,
        }),
    }
}

/// The add, edit and clone form.
pub struct EventForm<'a> {
    pub page_title: &'a str,
    pub messages: &'a [FlashMessage],
    pub values: &'a FormValues,
    pub action: &'a str,
    pub is_new: bool,
    pub preview: Option<EventView>,
    pub cancel_path: &'a str,
}

pub fn render_form(form: EventForm<'_>, site: Site<'_>) -> Result<RenderedBody, RenderError> {
    render_template(
        OutputKind::Html,
        &FormTemplate {
            site_title: site.title,
            page_title: form.page_title,
            messages: form.messages,
            values: form.values,
            action: form.action,
            is_new: form.is_new,
            preview: form.preview,
            cancel_path: form.cancel_path,
        },
    )
}

/// Validation errors for a structured write.
pub fn render_errors(
    kind: OutputKind,
    errors: &[String],
    callback: Option<&Callback>,
) -> Result<RenderedBody, RenderError> {
    match kind {
        OutputKind::Json => json_body(&serde_json::json!({ "errors": errors }), callback),
        OutputKind::Xml => render_template(kind, &ErrorsXmlTemplate { errors }),
        other => Err(RenderError::NotAcceptable {
            kind: other,
            resource: Resource::Event,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use happenings_core::event::{index_venues, EventId, Venue, VenueId};

    fn event() -> Event {
        let start = NaiveDate::from_ymd_opt(2024, 6, 20)
            .unwrap()
            .and_hms_opt(19, 0, 0)
            .unwrap();
        Event::new(EventId(5), "Jazz & Blues", start)
            .with_venue(VenueId(1))
            .with_tags(["jazz"])
    }

    fn venues() -> VenueIndex {
        index_venues([Venue::new(VenueId(1), "Holocene").with_coordinates(45.5, -122.6)])
    }

    fn site(urls: &UrlBuilder) -> Site<'_> {
        Site {
            title: "Happenings",
            urls,
        }
    }

    fn listing<'a>(events: &'a [Event], venues: &'a VenueIndex) -> Listing<'a> {
        Listing {
            page_title: "Events",
            path: "/events",
            events,
            venues,
            messages: &[],
            filter: None,
            search_query: "",
        }
    }

    #[test]
    fn test_html_listing_escapes_titles() {
        let urls = UrlBuilder::new("http://example.com");
        let events = vec![event()];
        let venues = venues();

        let body =
            render_listing(OutputKind::Html, &listing(&events, &venues), site(&urls), None).unwrap();

        assert_eq!(body.content_type, "text/html; charset=utf-8");
        assert!(body.body.contains("Jazz &amp; Blues"));
        assert!(body.body.contains("id=\"event-5\""));
    }

    #[test]
    fn test_atom_listing_has_one_entry_per_event() {
        let urls = UrlBuilder::new("http://example.com");
        let events = vec![event()];
        let venues = venues();

        let body =
            render_listing(OutputKind::Atom, &listing(&events, &venues), site(&urls), None).unwrap();

        assert!(body.body.contains("<feed"));
        assert_eq!(body.body.matches("<entry>").count(), 1);
        assert!(body.body.contains("<title>Jazz &amp; Blues</title>"));
    }

    #[test]
    fn test_kml_listing_has_placemark() {
        let urls = UrlBuilder::new("http://example.com");
        let events = vec![event()];
        let venues = venues();

        let body =
            render_listing(OutputKind::Kml, &listing(&events, &venues), site(&urls), None).unwrap();

        assert!(body.body.contains("<Placemark>"));
        assert!(body.body.contains("-122.6,45.5"));
    }

    #[test]
    fn test_json_listing_with_callback() {
        let urls = UrlBuilder::new("http://example.com");
        let events = vec![event()];
        let venues = venues();
        let callback = Callback::parse(Some("show")).unwrap();

        let body = render_listing(
            OutputKind::Json,
            &listing(&events, &venues),
            site(&urls),
            callback.as_ref(),
        )
        .unwrap();

        assert_eq!(body.content_type, "text/javascript; charset=utf-8");
        assert!(body.body.starts_with("/**/show(["));
        assert!(body.body.contains("\"Holocene\""));
    }

    #[test]
    fn test_event_xml() {
        let urls = UrlBuilder::new("http://example.com");

        let body =
            render_event(OutputKind::Xml, &event(), &venues(), &[], site(&urls), None).unwrap();

        assert_eq!(body.content_type, "application/xml; charset=utf-8");
        assert!(body.body.contains("<title>Jazz &amp; Blues</title>"));
    }

    #[test]
    fn test_event_xml_nests_the_venue() {
        let urls = UrlBuilder::new("http://example.com");
        let venues = index_venues([Venue {
            address: Some("1001 SE Morrison St".to_string()),
            ..Venue::new(VenueId(1), "Holocene").with_coordinates(45.5, -122.6)
        }]);

        let body = render_event(OutputKind::Xml, &event(), &venues, &[], site(&urls), None).unwrap();

        let venue = body.body.split("<venue>").nth(1).unwrap();
        assert!(venue.contains("<id>1</id>"));
        assert!(venue.contains("<title>Holocene</title>"));
        assert!(venue.contains("<address>1001 SE Morrison St</address>"));
        assert!(venue.contains("<latitude>45.5</latitude>"));
        assert!(venue.contains("<longitude>-122.6</longitude>"));
    }

    #[test]
    fn test_event_rejects_feed_kinds() {
        let urls = UrlBuilder::new("http://example.com");

        let result = render_event(OutputKind::Atom, &event(), &venues(), &[], site(&urls), None);

        assert!(matches!(result, Err(RenderError::NotAcceptable { .. })));
    }

    #[test]
    fn test_render_errors() {
        let errors = vec!["Start time is invalid: <noon>".to_string()];

        let json = render_errors(OutputKind::Json, &errors, None).unwrap();
        assert_eq!(json.body, r#"{"errors":["Start time is invalid: <noon>"]}"#);

        let xml = render_errors(OutputKind::Xml, &errors, None).unwrap();
        assert!(xml
            .body
            .contains("<error>Start time is invalid: &lt;noon&gt;</error>"));

        assert!(render_errors(OutputKind::Html, &errors, None).is_err());
    }
}
