//! Event search by tag or free text.

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use crate::params::Params;

use super::duplicates::exclude_duplicates;
use super::query::{sort_events, SortOrder, ORDER_KEY};
use super::types::{Event, VenueIndex};

pub const QUERY_KEY: &str = "query";
pub const TAG_KEY: &str = "tag";
pub const CURRENT_KEY: &str = "current";

/// A search that cannot produce any result set.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SearchFailure {
    #[error("You must enter a search query")]
    Empty,
    #[error("Your search query was malformed")]
    Malformed,
}

/// A search that runs, but not quite as asked.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SearchWarning {
    #[error("Unknown ordering option \"{0}\", sorting by date instead.")]
    UnknownOrder(String),
}

/// What a search matches on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchCriteria {
    /// Exact tag match, ignoring case.
    Tag(String),
    /// Every term must appear in the title, description or tags.
    Text { query: String, terms: Vec<String> },
}

/// A validated search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub criteria: SearchCriteria,
    pub order: SortOrder,
    /// Restrict results to events starting today or later.
    pub current_only: bool,
    pub warning: Option<SearchWarning>,
}

impl SearchQuery {
    /// Reads a search from parameters.
    ///
    /// A tag takes precedence over a text query when both are given.
    pub fn from_params(params: &Params) -> Result<Self, SearchFailure> {
        for key in [TAG_KEY, QUERY_KEY] {
            if params
                .get(key)
                .is_some_and(|v| v.as_str().is_none() && v.is_present())
            {
                return Err(SearchFailure::Malformed);
            }
        }

        let criteria = if let Some(tag) = params.non_blank(TAG_KEY) {
            SearchCriteria::Tag(tag.to_string())
        } else if let Some(query) = params.non_blank(QUERY_KEY) {
            SearchCriteria::Text {
                query: query.to_string(),
                terms: query.split_whitespace().map(str::to_lowercase).collect(),
            }
        } else {
            return Err(SearchFailure::Empty);
        };

        let (order, warning) = match params.non_blank(ORDER_KEY) {
            None => (SortOrder::Date, None),
            Some(raw) => match SortOrder::parse(raw) {
                Some(order) => (order, None),
                None => (
                    SortOrder::Date,
                    Some(SearchWarning::UnknownOrder(raw.to_string())),
                ),
            },
        };

        let current_only = params
            .non_blank(CURRENT_KEY)
            .is_some_and(|v| !matches!(v, "0" | "false"));

        Ok(Self {
            criteria,
            order,
            current_only,
            warning,
        })
    }

    pub fn tag(&self) -> Option<&str> {
        match &self.criteria {
            SearchCriteria::Tag(tag) => Some(tag),
            SearchCriteria::Text { .. } => None,
        }
    }

    pub fn query(&self) -> Option<&str> {
        match &self.criteria {
            SearchCriteria::Text { query, .. } => Some(query),
            SearchCriteria::Tag(_) => None,
        }
    }

    pub fn page_title(&self) -> String {
        match &self.criteria {
            SearchCriteria::Tag(tag) => format!("Events tagged with '{tag}'"),
            SearchCriteria::Text { query, .. } => format!("Search Results for '{query}'"),
        }
    }

    /// Returns true if `event` satisfies the criteria.
    pub fn matches(&self, event: &Event) -> bool {
        match &self.criteria {
            SearchCriteria::Tag(tag) => event.has_tag(tag),
            SearchCriteria::Text { terms, .. } => {
                let haystack = format!(
                    "{}\n{}\n{}",
                    event.title,
                    event.description.as_deref().unwrap_or_default(),
                    event.tags.join("\n")
                )
                .to_lowercase();
                terms.iter().all(|term| haystack.contains(term.as_str()))
            }
        }
    }

    /// Runs the search over `events`, skipping duplicates.
    pub fn run(&self, events: Vec<Event>, venues: &VenueIndex, today: NaiveDate) -> Vec<Event> {
        let cutoff = today.and_time(NaiveTime::MIN);
        let mut found: Vec<Event> = exclude_duplicates(events)
            .into_iter()
            .filter(|e| !self.current_only || e.start_time >= cutoff)
            .filter(|e| self.matches(e))
            .collect();

        sort_events(&mut found, self.order, venues);
        found
    }
}
