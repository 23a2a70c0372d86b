//! Axum extractor for RequestContext.

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Query},
    http::{header::ACCEPT, request::Parts, HeaderMap},
};
use axum_extra::extract::CookieJar;
use happenings_core::params::Params;
use uuid::Uuid;

use super::types::{RequestContext, RequestId};
use crate::handlers::flash::read_flash;

fn extract_request_id(headers: &HeaderMap) -> RequestId {
    headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .map(RequestId::from_uuid)
        .unwrap_or_else(RequestId::new)
}

fn extract_accept(headers: &HeaderMap) -> Option<String> {
    headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let query_pairs = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
            .map(|Query(pairs)| pairs)
            .unwrap_or_else(|err| {
                tracing::debug!(error = %err, "Ignoring undecodable query string");
                Vec::new()
            });
        let params = Params::from_pairs(query_pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        let cookies = CookieJar::from_headers(&parts.headers);
        let flash = read_flash(&cookies);

        Ok(RequestContext {
            request_id: extract_request_id(&parts.headers),
            query_pairs,
            params,
            accept: extract_accept(&parts.headers),
            cookies,
            flash,
        })
    }
}
