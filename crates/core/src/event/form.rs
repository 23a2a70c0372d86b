//! Event form submissions.
//!
//! The form posts `event[...]` attributes plus separate date and time fields
//! for each end of the event. Only fields that were actually submitted are
//! applied, so a partial update leaves the rest of the draft alone.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::dates::parse_date;
use crate::params::Params;

use super::error::EventError;
use super::types::{EventDraft, EventId};

pub const EVENT_SECTION: &str = "event";
pub const START_DATE_KEY: &str = "start_date";
pub const START_TIME_KEY: &str = "start_time";
pub const END_DATE_KEY: &str = "end_date";
pub const END_TIME_KEY: &str = "end_time";
pub const VENUE_NAME_KEY: &str = "venue_name";
pub const TRAP_FIELD_KEY: &str = "trap_field";
pub const PREVIEW_KEY: &str = "preview";

pub const MAX_TITLE_LENGTH: usize = 255;

const TIME_FORMATS: &[&str] = &["%H:%M", "%H:%M:%S", "%I:%M %p", "%I:%M%p"];

/// Parses a form time such as `19:30`, `7:30 PM` or `7pm`.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    if let Some(time) = TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
    {
        return Some(time);
    }

    // "7 pm" has no minutes, which chrono refuses to parse.
    let compact = raw.replace(' ', "").to_ascii_lowercase();
    let hour = compact
        .strip_suffix("am")
        .or_else(|| compact.strip_suffix("pm"))?;
    let suffix = &compact[hour.len()..];
    NaiveTime::parse_from_str(&format!("{hour}:00{suffix}"), "%I:%M%p").ok()
}

/// Splits a comma separated tag list, dropping blanks and repeats.
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            tags.push(tag.to_string());
        }
    }
    tags
}

/// Returns true if the form asked for a preview instead of a save.
pub fn is_preview(params: &Params) -> bool {
    params.contains_key(PREVIEW_KEY)
}

/// Returns the honeypot field, if it was submitted.
pub fn trap_field(params: &Params) -> Option<&str> {
    params.str(TRAP_FIELD_KEY)
}

fn optional_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn combine_date_time(date: NaiveDate, time: &str) -> Option<NaiveDateTime> {
    if time.trim().is_empty() {
        return Some(date.and_time(NaiveTime::MIN));
    }
    parse_time(time).map(|t| date.and_time(t))
}

/// Applies the submitted form fields to `draft`.
///
/// Unparseable dates and times are returned as errors and leave the
/// corresponding time unset. The venue is not touched here; see
/// [`resolve_venue_ref`](super::venue_ref::resolve_venue_ref).
pub fn apply_submission(params: &Params, draft: &mut EventDraft) -> Vec<EventError> {
    let mut errors = Vec::new();

    if let Some(event) = params.map(EVENT_SECTION) {
        if let Some(title) = event.str("title") {
            draft.title = title.trim().to_string();
        }
        if let Some(description) = event.str("description") {
            draft.description = optional_text(description);
        }
        if let Some(url) = event.str("url") {
            draft.url = optional_text(url);
        }
        if let Some(tag_list) = event.str("tag_list") {
            draft.tags = parse_tag_list(tag_list);
        }
        if let Some(original) = event.str("duplicate_of_id") {
            draft.duplicate_of_id = original.parse::<EventId>().ok();
        }
    }

    let field = |key: &str| params.str(key).unwrap_or_default();

    if params.contains_key(START_DATE_KEY) || params.contains_key(START_TIME_KEY) {
        let date_raw = field(START_DATE_KEY);
        let time_raw = field(START_TIME_KEY);

        draft.start_time = if date_raw.trim().is_empty() {
            None
        } else {
            let combined = parse_date(date_raw).and_then(|d| combine_date_time(d, time_raw));
            if combined.is_none() {
                errors.push(EventError::InvalidStartTime(
                    format!("{date_raw} {time_raw}").trim().to_string(),
                ));
            }
            combined
        };
    }

    if params.contains_key(END_DATE_KEY) || params.contains_key(END_TIME_KEY) {
        let date_raw = field(END_DATE_KEY);
        let time_raw = field(END_TIME_KEY);

        draft.end_time = if date_raw.trim().is_empty() && time_raw.trim().is_empty() {
            None
        } else {
            let date = if date_raw.trim().is_empty() {
                draft.start_time.map(|s| s.date())
            } else {
                parse_date(date_raw)
            };
            let combined = date.and_then(|d| combine_date_time(d, time_raw));
            // Without a start date there is nothing to pin a bare end time to.
            if combined.is_none() && (draft.start_time.is_some() || !date_raw.trim().is_empty()) {
                errors.push(EventError::InvalidEndTime(
                    format!("{date_raw} {time_raw}").trim().to_string(),
                ));
            }
            combined
        };
    }

    errors
}

/// Checks that a draft can be saved.
pub fn validate_event(draft: &EventDraft) -> Result<(), Vec<EventError>> {
    let mut errors = Vec::new();

    if draft.title.trim().is_empty() {
        errors.push(EventError::EmptyTitle);
    } else if draft.title.chars().count() > MAX_TITLE_LENGTH {
        errors.push(EventError::TitleTooLong);
    }

    match (draft.start_time, draft.end_time) {
        (None, _) => errors.push(EventError::MissingStartTime),
        (Some(start), Some(end)) if end < start => errors.push(EventError::EndBeforeStart),
        _ => {}
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Raw field values for redisplaying the event form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    pub title: String,
    pub description: String,
    pub url: String,
    pub tag_list: String,
    pub venue_id: String,
    pub venue_name: String,
    pub start_date: String,
    pub start_time: String,
    pub end_date: String,
    pub end_time: String,
}

impl FormValues {
    /// Field values for an existing draft.
    pub fn from_draft(draft: &EventDraft, venue_name: Option<&str>) -> Self {
        let date = |t: Option<NaiveDateTime>| t.map(|t| t.format("%Y-%m-%d").to_string());
        let time = |t: Option<NaiveDateTime>| t.map(|t| t.format("%H:%M").to_string());

        Self {
            title: draft.title.clone(),
            description: draft.description_text().to_string(),
            url: draft.url.clone().unwrap_or_default(),
            tag_list: draft.tags.join(", "),
            venue_id: draft.venue_id.map(|v| v.to_string()).unwrap_or_default(),
            venue_name: venue_name.unwrap_or_default().to_string(),
            start_date: date(draft.start_time).unwrap_or_default(),
            start_time: time(draft.start_time).unwrap_or_default(),
            end_date: date(draft.end_time).unwrap_or_default(),
            end_time: time(draft.end_time).unwrap_or_default(),
        }
    }

    /// Replaces values with whatever was submitted, verbatim.
    pub fn overlay(mut self, params: &Params) -> Self {
        if let Some(event) = params.map(EVENT_SECTION) {
            for (key, slot) in [
                ("title", &mut self.title),
                ("description", &mut self.description),
                ("url", &mut self.url),
                ("tag_list", &mut self.tag_list),
                ("venue_id", &mut self.venue_id),
            ] {
                if let Some(value) = event.str(key) {
                    *slot = value.to_string();
                }
            }
        }

        for (key, slot) in [
            (VENUE_NAME_KEY, &mut self.venue_name),
            (START_DATE_KEY, &mut self.start_date),
            (START_TIME_KEY, &mut self.start_time),
            (END_DATE_KEY, &mut self.end_date),
            (END_TIME_KEY, &mut self.end_time),
        ] {
            if let Some(value) = params.str(key) {
                *slot = value.to_string();
            }
        }

        self
    }
}
