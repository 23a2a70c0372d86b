use thiserror::Error;

use super::types::{EventId, VenueId};

/// Field-level problems that keep an event from being saved.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventError {
    #[error("Title can't be blank")]
    EmptyTitle,
    #[error("Title is too long (maximum is 255 characters)")]
    TitleTooLong,
    #[error("Start time can't be blank")]
    MissingStartTime,
    #[error("Start time is invalid: {0}")]
    InvalidStartTime(String),
    #[error("End time is invalid: {0}")]
    InvalidEndTime(String),
    #[error("End time can't be before the start time")]
    EndBeforeStart,
    #[error("Venue {0} does not exist")]
    UnknownVenue(VenueId),
    #[error("An event can't be a duplicate of itself")]
    DuplicateOfItself,
    #[error("Duplicate of event {0}, which does not exist")]
    UnknownOriginal(EventId),
    #[error("Event {0} already leads back to this event as a duplicate")]
    DuplicateLoop(EventId),
    #[error("Event {0} has a broken duplicate chain")]
    BrokenOriginal(EventId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_error_display() {
        assert_eq!(EventError::EmptyTitle.to_string(), "Title can't be blank");
        assert_eq!(
            EventError::InvalidStartTime("25:00".to_string()).to_string(),
            "Start time is invalid: 25:00"
        );
        assert_eq!(
            EventError::UnknownVenue(VenueId(9)).to_string(),
            "Venue 9 does not exist"
        );
        assert_eq!(
            EventError::UnknownOriginal(EventId(999)).to_string(),
            "Duplicate of event 999, which does not exist"
        );
    }
}
