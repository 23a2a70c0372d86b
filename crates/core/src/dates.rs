//! Date range resolution for event listings.
//!
//! User-supplied `date[start]` and `date[end]` values are resolved one end at a
//! time. Bad input never fails the request: the end falls back to its default
//! and a [`DateWarning`] is returned for the page to display.

use std::fmt;

use chrono::{Months, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

use crate::params::{ParamValue, Params};

/// The request key holding the date range section.
pub const DATE_SECTION: &str = "date";

/// Which end of a date range is being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateKind {
    Start,
    End,
}

impl DateKind {
    /// Returns the parameter key for this end of the range.
    pub fn key(&self) -> &'static str {
        match self {
            DateKind::Start => "start",
            DateKind::End => "end",
        }
    }

    /// Returns the default date for this end of the range.
    ///
    /// Start defaults to today, end to three months from today.
    pub fn default_date(&self, today: NaiveDate) -> NaiveDate {
        match self {
            DateKind::Start => today,
            DateKind::End => today.checked_add_months(Months::new(3)).unwrap_or(today),
        }
    }
}

impl fmt::Display for DateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A non-fatal problem with a submitted date.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DateWarning {
    #[error("Can't filter by a malformed {0} date.")]
    Malformed(DateKind),
    #[error("Can't filter by a missing {0} date.")]
    Missing(DateKind),
    #[error("Can't filter by an empty {0} date.")]
    Empty(DateKind),
    #[error("Can't filter by an invalid {0} date.")]
    Invalid(DateKind),
}

impl DateWarning {
    /// Returns the end of the range this warning is about.
    pub fn kind(&self) -> DateKind {
        match self {
            DateWarning::Malformed(kind)
            | DateWarning::Missing(kind)
            | DateWarning::Empty(kind)
            | DateWarning::Invalid(kind) => *kind,
        }
    }
}

/// An inclusive range of calendar dates.
///
/// No ordering is enforced: an inverted range simply matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The default range: today through three months from today.
    pub fn default_for(today: NaiveDate) -> Self {
        Self {
            start: DateKind::Start.default_date(today),
            end: DateKind::End.default_date(today),
        }
    }

    /// First instant covered by the range.
    pub fn starts_at(&self) -> NaiveDateTime {
        self.start.and_time(NaiveTime::MIN)
    }

    /// Last second covered by the range.
    pub fn ends_at(&self) -> NaiveDateTime {
        self.end
            .and_hms_opt(23, 59, 59)
            .unwrap_or_else(|| self.end.and_time(NaiveTime::MIN))
    }

    /// Returns true if `[start, end]` overlaps the range.
    pub fn intersects(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        start <= self.ends_at() && end >= self.starts_at()
    }
}

/// Both ends of a resolved range plus the warnings collected on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRange {
    pub range: DateRange,
    pub warnings: Vec<DateWarning>,
    /// True when the request carried a date key at all, even a blank one.
    pub explicit: bool,
}

/// Resolves one end of the date range from request parameters.
pub fn resolve_date(
    params: &Params,
    kind: DateKind,
    today: NaiveDate,
) -> (NaiveDate, Option<DateWarning>) {
    let fallback = kind.default_date(today);

    let section = match params.get(DATE_SECTION) {
        Some(value) if value.is_present() => value,
        _ => return (fallback, None),
    };

    let ParamValue::Map(dates) = section else {
        return (fallback, Some(DateWarning::Malformed(kind)));
    };

    let Some(value) = dates.get(kind.key()) else {
        return (fallback, Some(DateWarning::Missing(kind)));
    };

    if !value.is_present() {
        return (fallback, Some(DateWarning::Empty(kind)));
    }

    match value.as_str().and_then(parse_date) {
        Some(date) => (date, None),
        None => (fallback, Some(DateWarning::Invalid(kind))),
    }
}

/// Resolves both ends of the date range, start first.
pub fn resolve_range(params: &Params, today: NaiveDate) -> ResolvedRange {
    let (start, start_warning) = resolve_date(params, DateKind::Start, today);
    let (end, end_warning) = resolve_date(params, DateKind::End, today);

    ResolvedRange {
        range: DateRange::new(start, end),
        warnings: start_warning.into_iter().chain(end_warning).collect(),
        explicit: params.contains_key(DATE_SECTION),
    }
}

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
];

/// Parses a calendar date in one of the accepted formats.
///
/// Accepts ISO dates (`2024-01-31`), slashed dates (`2024/01/31`,
/// `01/31/2024`) and written dates (`January 31, 2024`).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}
