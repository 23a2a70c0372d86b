mod duplicates;
mod error;
mod form;
mod query;
mod search;
mod spam;
mod types;
mod venue_ref;

pub use duplicates::{
    exclude_duplicates, progenitor_of, DuplicateError, DuplicateWalk, MAX_DUPLICATE_HOPS,
};
pub use error::EventError;
pub use form::{
    apply_submission, is_preview, parse_tag_list, parse_time, trap_field, validate_event,
    FormValues, MAX_TITLE_LENGTH, VENUE_NAME_KEY,
};
pub use query::{sort_events, EventFilter, EventQuery, Pagination, SortOrder};
pub use search::{SearchCriteria, SearchFailure, SearchQuery, SearchWarning};
pub use spam::{
    count_links, is_spammy, screen_submission, SubmissionBlock, EVIL_ROBOT_MESSAGE,
    MAX_DESCRIPTION_LINKS, TOO_MANY_LINKS_MESSAGE,
};
pub use types::{index_venues, Event, EventDraft, EventId, Venue, VenueDraft, VenueId, VenueIndex};
pub use venue_ref::{coerce_integer, resolve_venue_ref, VenueRef};
