use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use happenings_core::event::DuplicateError;
use happenings_core::render::RenderError;
use happenings_core::status::{
    duplicate_error_to_status_code, render_error_to_status_code, repository_error_to_status_code,
};
use happenings_core::storage::RepositoryError;

/// Application error type that wraps `anyhow::Error`.
///
/// Core errors keep their HTTP meaning when converted; anything else is a 500.
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn status(&self) -> StatusCode {
        let code = if let Some(err) = self.0.downcast_ref::<RepositoryError>() {
            repository_error_to_status_code(err)
        } else if let Some(err) = self.0.downcast_ref::<RenderError>() {
            render_error_to_status_code(err)
        } else if let Some(err) = self.0.downcast_ref::<DuplicateError>() {
            duplicate_error_to_status_code(err)
        } else {
            500
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code = self.status();
        if status_code.is_server_error() {
            tracing::error!(error = %self.0, status = %status_code, "Request failed");
        } else {
            tracing::warn!(error = %self.0, status = %status_code, "Request rejected");
        }

        (status_code, self.0.to_string()).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use happenings_core::event::EventId;
    use happenings_core::render::{OutputKind, Resource};

    #[test]
    fn test_core_errors_keep_their_status() {
        let not_found = AppError::from(RepositoryError::NotFound {
            entity_type: "Event",
            id: "3".to_string(),
        });
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let not_acceptable = AppError::from(RenderError::NotAcceptable {
            kind: OutputKind::Kml,
            resource: Resource::Event,
        });
        assert_eq!(not_acceptable.status(), StatusCode::NOT_ACCEPTABLE);

        let callback = AppError::from(RenderError::InvalidCallback("a b".to_string()));
        assert_eq!(callback.status(), StatusCode::BAD_REQUEST);

        let cycle = AppError::from(DuplicateError::Cycle {
            start: EventId(1),
            at: EventId(2),
        });
        assert_eq!(cycle.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_other_errors_are_server_errors() {
        let error = AppError::from(anyhow::anyhow!("disk on fire"));
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
