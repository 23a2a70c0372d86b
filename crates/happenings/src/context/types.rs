//! Pure types for request-scoped context.

use axum_extra::extract::CookieJar;
use happenings_core::params::Params;
use uuid::Uuid;

use crate::handlers::flash::FlashMessage;

/// Unique identifier for a request, used for tracing and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Request-scoped context available to all handlers.
///
/// Complements `AppState` (application-scoped) with what the request carried:
/// decoded query parameters, the `Accept` header and any pending flash.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Unique request identifier for tracing.
    pub request_id: RequestId,
    /// Decoded query string pairs, in order.
    pub query_pairs: Vec<(String, String)>,
    /// Query string folded into a parameter tree.
    pub params: Params,
    pub accept: Option<String>,
    /// Cookies sent with the request.
    pub cookies: CookieJar,
    /// Flash messages set by the previous response.
    pub flash: Vec<FlashMessage>,
}

impl RequestContext {
    /// Query parameters overlaid with submitted form fields.
    ///
    /// Form values win over query values with the same key.
    pub fn merged(&self, form_pairs: &[(String, String)]) -> Params {
        Params::from_pairs(
            self.query_pairs
                .iter()
                .chain(form_pairs.iter())
                .map(|(k, v)| (k.as_str(), v.as_str())),
        )
    }

    /// The `callback` query parameter, if any.
    pub fn callback(&self) -> Option<&str> {
        self.params.str("callback")
    }

    /// The `format` query parameter, if any.
    pub fn format(&self) -> Option<&str> {
        self.params.non_blank("format")
    }

    pub fn has_flash(&self) -> bool {
        !self.flash.is_empty()
    }
}
