//! Structured JSON output with optional callback wrapping.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::event::{Event, Venue, VenueIndex};

use super::RenderError;

pub const MAX_CALLBACK_LENGTH: usize = 64;

static CALLBACK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$.]*$").expect("Invalid regex"));

/// An event with its venue inlined.
#[derive(Debug, Clone, Serialize)]
pub struct EventRecord<'a> {
    #[serde(flatten)]
    pub event: &'a Event,
    pub venue: Option<&'a Venue>,
}

impl<'a> EventRecord<'a> {
    pub fn new(event: &'a Event, venues: &'a VenueIndex) -> Self {
        Self {
            event,
            venue: event.venue_id.and_then(|id| venues.get(&id)),
        }
    }
}

pub fn event_records<'a>(events: &'a [Event], venues: &'a VenueIndex) -> Vec<EventRecord<'a>> {
    events.iter().map(|e| EventRecord::new(e, venues)).collect()
}

/// A validated JSONP callback name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callback(String);

impl Callback {
    /// Validates a `callback` parameter. Blank or missing means no callback.
    pub fn parse(raw: Option<&str>) -> Result<Option<Self>, RenderError> {
        let Some(name) = raw.map(str::trim).filter(|n| !n.is_empty()) else {
            return Ok(None);
        };

        if name.len() > MAX_CALLBACK_LENGTH || !CALLBACK_PATTERN.is_match(name) {
            return Err(RenderError::InvalidCallback(name.to_string()));
        }
        Ok(Some(Callback(name.to_string())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Serializes `value`, wrapping it in `callback(...)` when one is given.
pub fn render_json<T>(value: &T, callback: Option<&Callback>) -> Result<String, RenderError>
where
    T: Serialize + ?Sized,
{
    let json = serde_json::to_string(value)?;
    Ok(match callback {
        Some(cb) => format!("/**/{}({json});", cb.as_str()),
        None => json,
    })
}

pub fn json_content_type(callback: Option<&Callback>) -> &'static str {
    match callback {
        Some(_) => "text/javascript; charset=utf-8",
        None => "application/json",
    }
}
