//! Listing queries over canonical events.
//!
//! [`EventQuery`] captures everything a listing request asks for (ordering,
//! date filter, pagination) and [`EventQuery::build`] applies it to the
//! events loaded from storage. Duplicates never make it into a listing.

use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime};

use crate::dates::{resolve_range, DateRange, DateWarning};
use crate::params::Params;

use super::duplicates::exclude_duplicates;
use super::types::{Event, VenueIndex};

pub const ORDER_KEY: &str = "order";

/// Field a listing is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    /// Start time, earliest first.
    #[default]
    Date,
    /// Title, ignoring case.
    Name,
    /// Venue title, ignoring case; events without a venue go last.
    Venue,
}

impl SortOrder {
    /// Parses a UI ordering field.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "date" => Some(SortOrder::Date),
            "name" | "title" => Some(SortOrder::Name),
            "venue" => Some(SortOrder::Venue),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Date => "date",
            SortOrder::Name => "name",
            SortOrder::Venue => "venue",
        }
    }
}

/// Sorts events by `order`, breaking ties by start time and then id.
pub fn sort_events(events: &mut [Event], order: SortOrder, venues: &VenueIndex) {
    events.sort_by(|a, b| {
        let primary = match order {
            SortOrder::Date => Ordering::Equal,
            SortOrder::Name => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortOrder::Venue => compare_venues(a, b, venues),
        };
        primary
            .then_with(|| a.start_time.cmp(&b.start_time))
            .then_with(|| a.id.cmp(&b.id))
    });
}

fn compare_venues(a: &Event, b: &Event, venues: &VenueIndex) -> Ordering {
    let title = |e: &Event| {
        e.venue_id
            .and_then(|id| venues.get(&id))
            .map(|v| v.title.to_lowercase())
    };

    match (title(a), title(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Offset/limit window applied after ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pagination {
    pub offset: usize,
    pub limit: Option<usize>,
}

impl Pagination {
    /// Reads `offset` and `limit`; values that are not non-negative integers are ignored.
    pub fn from_params(params: &Params) -> Self {
        let read = |key: &str| params.non_blank(key).and_then(|v| v.parse::<usize>().ok());
        Self {
            offset: read("offset").unwrap_or(0),
            limit: read("limit"),
        }
    }

    /// Returns true if the window covers every event.
    pub fn is_unbounded(&self) -> bool {
        self.offset == 0 && self.limit.is_none()
    }

    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset)
            .take(self.limit.unwrap_or(usize::MAX))
            .collect()
    }
}

/// Which events a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFilter {
    /// Events starting now or later.
    Upcoming,
    /// Events overlapping an explicit date range.
    Within(DateRange),
}

impl EventFilter {
    pub fn matches(&self, event: &Event, now: NaiveDateTime) -> bool {
        match self {
            EventFilter::Upcoming => event.start_time >= now,
            EventFilter::Within(range) => range.intersects(event.start_time, event.effective_end()),
        }
    }
}

/// A listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub order: SortOrder,
    /// True when the request named an ordering field.
    pub order_requested: bool,
    /// Resolved date range, shown in the filter form even when not applied.
    pub range: DateRange,
    pub filter: EventFilter,
    pub pagination: Pagination,
    pub warnings: Vec<DateWarning>,
}

impl EventQuery {
    /// Reads a listing request from parameters.
    pub fn from_params(params: &Params, today: NaiveDate) -> Self {
        let resolved = resolve_range(params, today);
        let order_param = params.non_blank(ORDER_KEY);

        Self {
            order: order_param.and_then(SortOrder::parse).unwrap_or_default(),
            order_requested: order_param.is_some(),
            range: resolved.range,
            filter: if resolved.explicit {
                EventFilter::Within(resolved.range)
            } else {
                EventFilter::Upcoming
            },
            pagination: Pagination::from_params(params),
            warnings: resolved.warnings,
        }
    }

    /// Only the default upcoming view may be cached.
    pub fn is_cacheable(&self) -> bool {
        !self.order_requested && self.filter == EventFilter::Upcoming
    }

    /// Filters, orders and paginates `events`.
    pub fn build(&self, events: Vec<Event>, venues: &VenueIndex, now: NaiveDateTime) -> Vec<Event> {
        let mut matching: Vec<Event> = exclude_duplicates(events)
            .into_iter()
            .filter(|e| self.filter.matches(e, now))
            .collect();

        sort_events(&mut matching, self.order, venues);
        self.pagination.apply(matching)
    }
}
