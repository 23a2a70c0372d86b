//! Venue references from event submissions.
//!
//! A form can point at a venue by id (`event[venue_id]`, set by the venue
//! picker) or by free text (`venue_name`). The id wins when both are sent.

use crate::params::Params;

use super::types::VenueId;

/// How a submission refers to its venue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VenueRef {
    Id(VenueId),
    /// Free text; may name a venue that does not exist yet.
    Name(String),
    /// No venue fields were submitted; leave the association alone.
    Absent,
}

/// Resolves the venue reference in a submission.
pub fn resolve_venue_ref(params: &Params) -> VenueRef {
    let venue_id = params
        .map("event")
        .and_then(|event| event.non_blank("venue_id"));

    if let Some(raw) = venue_id {
        return VenueRef::Id(VenueId(coerce_integer(raw)));
    }

    match params.str("venue_name") {
        Some(name) => VenueRef::Name(name.to_string()),
        None => VenueRef::Absent,
    }
}

/// Reads the leading integer of `raw`, or 0 when there is none.
///
/// `"12"` and `"12abc"` both give 12; `"abc"` gives 0.
pub fn coerce_integer(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    digits[..end]
        .parse::<i64>()
        .map(|n| sign * n)
        .unwrap_or(0)
}
