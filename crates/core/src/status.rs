//! HTTP status codes for core errors.

use crate::event::DuplicateError;
use crate::render::RenderError;
use crate::storage::RepositoryError;

/// Status for a structured write whose validation failed.
pub const VALIDATION_FAILED: u16 = 422;

/// Maps a [`RepositoryError`] to an HTTP status code.
///
/// - `NotFound` -> 404 (Not Found)
/// - `InvalidData` -> 400 (Bad Request)
///
/// # Examples
///
/// ```
/// use happenings_core::status::repository_error_to_status_code;
/// use happenings_core::storage::RepositoryError;
///
/// let error = RepositoryError::NotFound {
///     entity_type: "Event",
///     id: "42".to_string(),
/// };
/// assert_eq!(repository_error_to_status_code(&error), 404);
/// ```
pub fn repository_error_to_status_code(error: &RepositoryError) -> u16 {
    match error {
        RepositoryError::NotFound { .. } => 404,
        RepositoryError::InvalidData(_) => 400,
    }
}

/// Maps a [`RenderError`] to an HTTP status code.
///
/// A format the resource cannot be rendered in is 406; a bad callback is 400.
pub fn render_error_to_status_code(error: &RenderError) -> u16 {
    match error {
        RenderError::UnsupportedFormat(_) | RenderError::NotAcceptable { .. } => 406,
        RenderError::InvalidCallback(_) => 400,
        RenderError::Serialization(_) => 500,
    }
}

/// Maps a [`DuplicateError`] to an HTTP status code.
///
/// Every variant is a data-integrity violation.
pub fn duplicate_error_to_status_code(_error: &DuplicateError) -> u16 {
    500
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventId;
    use crate::render::{OutputKind, Resource};

    #[test]
    fn test_not_found_maps_to_404() {
        let error = RepositoryError::NotFound {
            entity_type: "Event",
            id: "12".to_string(),
        };
        assert_eq!(repository_error_to_status_code(&error), 404);
    }

    #[test]
    fn test_invalid_data_maps_to_400() {
        let error = RepositoryError::InvalidData("negative id".to_string());
        assert_eq!(repository_error_to_status_code(&error), 400);
    }

    #[test]
    fn test_render_errors() {
        assert_eq!(
            render_error_to_status_code(&RenderError::UnsupportedFormat("pdf".to_string())),
            406
        );
        assert_eq!(
            render_error_to_status_code(&RenderError::NotAcceptable {
                kind: OutputKind::Kml,
                resource: Resource::Event,
            }),
            406
        );
        assert_eq!(
            render_error_to_status_code(&RenderError::InvalidCallback("x(".to_string())),
            400
        );
    }

    #[test]
    fn test_duplicate_errors_are_server_errors() {
        let error = DuplicateError::Cycle {
            start: EventId(1),
            at: EventId(2),
        };
        assert_eq!(duplicate_error_to_status_code(&error), 500);
    }
}
