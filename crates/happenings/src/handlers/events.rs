//! Event listing, search, show and delete handlers.
//!
//! Every handler negotiates its output kind first, then loads what it needs
//! through the repository trait objects and hands the result to `render`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::{Local, NaiveDate, NaiveDateTime};

use happenings_core::event::{DuplicateWalk, Event, EventId, EventQuery, SearchQuery};
use happenings_core::render::{negotiate, Callback, OutputKind, Resource};
use happenings_core::storage::RepositoryError;

use super::flash::{clear_flash, redirect_with_flash, FlashMessage};
use crate::{
    cache::ListingKey,
    context::RequestContext,
    handlers::AppError,
    render::{render_event, render_listing, FilterView, Listing},
    state::AppState,
    urls::{EVENTS_PATH, ROOT_PATH},
};

/// `/events.{ext}` as seen by the root-level file route.
const LISTING_FILE: &str = "events";
/// `/events/search.{ext}` as seen by the event route.
const SEARCH_SEGMENT: &str = "search";

/// Today's date and the current wall-clock time.
pub(crate) fn local_now() -> (NaiveDate, NaiveDateTime) {
    let now = Local::now().naive_local();
    (now.date(), now)
}

/// Splits `12.json` into `("12", Some("json"))`.
pub(crate) fn split_extension(segment: &str) -> (&str, Option<&str>) {
    match segment.rsplit_once('.') {
        Some((id, ext)) if !id.is_empty() && !ext.is_empty() => (id, Some(ext)),
        _ => (segment, None),
    }
}

/// Output kind for a write. Calendar output has no write form, so it falls back to HTML.
pub(crate) fn write_kind(
    extension: Option<&str>,
    ctx: &RequestContext,
) -> Result<OutputKind, AppError> {
    let kind = negotiate(Resource::Event, extension, ctx.format(), ctx.accept.as_deref())?;
    Ok(match kind {
        OutputKind::Json | OutputKind::Xml => kind,
        _ => OutputKind::Html,
    })
}

/// Loads an event by its raw path id; an unparseable id is simply not found.
pub(crate) async fn find_event(state: &AppState, raw_id: &str) -> Result<Option<Event>, AppError> {
    let Ok(id) = raw_id.parse::<EventId>() else {
        return Ok(None);
    };
    Ok(state.event_repo.get_event(id).await?)
}

pub(crate) fn not_found_error(raw_id: &str) -> RepositoryError {
    RepositoryError::NotFound {
        entity_type: "Event",
        id: raw_id.trim().to_string(),
    }
}

/// Sends a missing event back to the listing with a flash.
pub(crate) fn not_found_redirect(raw_id: &str) -> Response {
    let error = not_found_error(raw_id);
    tracing::info!(event_id = %raw_id, "Event not found");
    redirect_with_flash(EVENTS_PATH, FlashMessage::error(error.to_string()))
}

/// Expires the flash cookie once an HTML page has shown its messages.
pub(crate) fn clear_shown_flash(
    response: Response,
    ctx: &RequestContext,
    kind: OutputKind,
) -> Response {
    if kind == OutputKind::Html && ctx.has_flash() {
        return (clear_flash(ctx.cookies.clone()), response).into_response();
    }
    response
}

fn encode_query<'a>(pairs: impl Iterator<Item = &'a (String, String)>) -> String {
    pairs
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Follows the duplicate chain of `event` to its progenitor.
async fn resolve_progenitor(state: &AppState, event: Event) -> Result<Event, AppError> {
    let mut walk = DuplicateWalk::start(event);
    while let Some(next) = walk.next_hop() {
        let found = state.event_repo.get_event(next).await?;
        walk.advance(found)?;
    }
    Ok(walk.finish())
}

/// GET / and GET /events - upcoming events, or those in a date range.
pub async fn index(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Response, AppError> {
    event_listing(&state, &ctx, None).await
}

/// GET /events.{ext} - the listing with its format in the path.
pub async fn index_file(
    State(state): State<AppState>,
    Path(file): Path<String>,
    ctx: RequestContext,
) -> Result<Response, AppError> {
    match split_extension(&file) {
        (LISTING_FILE, Some(extension)) => event_listing(&state, &ctx, Some(extension)).await,
        _ => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}

async fn event_listing(
    state: &AppState,
    ctx: &RequestContext,
    extension: Option<&str>,
) -> Result<Response, AppError> {
    let kind = negotiate(Resource::Listing, extension, ctx.format(), ctx.accept.as_deref())?;
    let callback = Callback::parse(ctx.callback())?;
    let (today, now) = local_now();
    let query = EventQuery::from_params(&ctx.params, today);

    tracing::debug!(
        request_id = %ctx.request_id,
        %kind,
        order = query.order.as_str(),
        warnings = query.warnings.len(),
        "Listing events"
    );

    let cache_key = (query.is_cacheable()
        && query.warnings.is_empty()
        && query.pagination.is_unbounded()
        && !ctx.has_flash())
    .then(|| {
        let callback = callback
            .as_ref()
            .filter(|_| kind == OutputKind::Json)
            .map(Callback::as_str);
        ListingKey::new(kind, callback)
    });

    if let Some(key) = &cache_key {
        if let Some(body) = state.listing_cache.get(key).await {
            tracing::debug!(%kind, "Serving cached listing");
            return Ok(body.into_response());
        }
    }
    let generation = state.listing_cache.generation().await;

    let venues = state.venue_index().await?;
    let events = query.build(state.event_repo.list_events().await?, &venues, now);

    let mut messages = ctx.flash.clone();
    messages.extend(
        query
            .warnings
            .iter()
            .map(|warning| FlashMessage::warning(warning.to_string())),
    );

    let listing = Listing {
        page_title: "Events",
        path: EVENTS_PATH,
        events: &events,
        venues: &venues,
        messages: &messages,
        filter: Some(FilterView {
            start: query.range.start.format("%Y-%m-%d").to_string(),
            end: query.range.end.format("%Y-%m-%d").to_string(),
            order: query.order.as_str(),
        }),
        search_query: "",
    };
    let body = render_listing(kind, &listing, state.site(), callback.as_ref())?;

    if let Some(key) = cache_key {
        state.listing_cache.put(key, body.clone(), generation).await;
    }

    Ok(clear_shown_flash(body.into_response(), ctx, kind))
}

/// GET /events/search - events matching a tag or text query.
pub async fn search(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Response, AppError> {
    search_results(&state, &ctx, None).await
}

async fn search_results(
    state: &AppState,
    ctx: &RequestContext,
    extension: Option<&str>,
) -> Result<Response, AppError> {
    let search = match SearchQuery::from_params(&ctx.params) {
        Ok(search) => search,
        Err(failure) => {
            tracing::info!(request_id = %ctx.request_id, reason = %failure, "Search rejected");
            return Ok(redirect_with_flash(
                ROOT_PATH,
                FlashMessage::error(failure.to_string()),
            ));
        }
    };

    let kind = negotiate(Resource::Listing, extension, ctx.format(), ctx.accept.as_deref())?;
    let callback = Callback::parse(ctx.callback())?;
    let (today, _) = local_now();

    tracing::debug!(request_id = %ctx.request_id, %kind, criteria = ?search.criteria, "Searching events");

    let venues = state.venue_index().await?;
    let events = search.run(state.event_repo.list_events().await?, &venues, today);

    let mut messages = ctx.flash.clone();
    if let Some(warning) = &search.warning {
        messages.push(FlashMessage::warning(warning.to_string()));
    }

    let page_title = search.page_title();
    let path = format!(
        "{EVENTS_PATH}/search?{}",
        encode_query(
            ctx.query_pairs
                .iter()
                .filter(|(k, _)| k != "format" && k != "callback")
        )
    );
    let results = Listing {
        page_title: &page_title,
        path: &path,
        events: &events,
        venues: &venues,
        messages: &messages,
        filter: None,
        search_query: search.query().unwrap_or_default(),
    };
    let body = render_listing(kind, &results, state.site(), callback.as_ref())?;

    Ok(clear_shown_flash(body.into_response(), ctx, kind))
}

/// GET /events/{id} - one event; duplicates redirect to their progenitor.
pub async fn show(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    ctx: RequestContext,
) -> Result<Response, AppError> {
    let (raw_id, extension) = split_extension(&segment);
    if raw_id == SEARCH_SEGMENT {
        return search_results(&state, &ctx, extension).await;
    }
    let Some(event) = find_event(&state, raw_id).await? else {
        return Ok(not_found_redirect(raw_id));
    };

    let kind = negotiate(Resource::Event, extension, ctx.format(), ctx.accept.as_deref())?;
    let callback = Callback::parse(ctx.callback())?;

    if event.is_duplicate() {
        let duplicate_id = event.id;
        let progenitor = resolve_progenitor(&state, event).await?;
        tracing::debug!(event_id = %duplicate_id, progenitor_id = %progenitor.id, "Redirecting duplicate");

        let mut target = match extension {
            Some(_) => state.urls.event_path_as(progenitor.id, kind),
            None => state.urls.event_path(progenitor.id),
        };
        if !ctx.query_pairs.is_empty() {
            target.push('?');
            target.push_str(&encode_query(ctx.query_pairs.iter()));
        }
        return Ok(Redirect::to(&target).into_response());
    }

    let venues = state.venue_index().await?;
    let body = render_event(
        kind,
        &event,
        &venues,
        &ctx.flash,
        state.site(),
        callback.as_ref(),
    )?;

    Ok(clear_shown_flash(body.into_response(), &ctx, kind))
}

/// DELETE /events/{id} and POST /events/{id}/delete.
pub async fn destroy(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    ctx: RequestContext,
) -> Result<Response, AppError> {
    let (raw_id, extension) = split_extension(&segment);
    let kind = write_kind(extension, &ctx)?;

    let Some(event) = find_event(&state, raw_id).await? else {
        return match kind {
            OutputKind::Html => Ok(not_found_redirect(raw_id)),
            _ => Err(not_found_error(raw_id).into()),
        };
    };

    state.event_repo.delete_event(event.id).await?;
    state.listing_cache.invalidate().await;
    tracing::info!(event_id = %event.id, title = %event.title, "Event deleted");

    Ok(match kind {
        OutputKind::Html => redirect_with_flash(
            EVENTS_PATH,
            FlashMessage::success(format!("\"{}\" has been deleted", event.title)),
        ),
        _ => StatusCode::OK.into_response(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("12"), ("12", None));
        assert_eq!(split_extension("12.json"), ("12", Some("json")));
        assert_eq!(split_extension("12."), ("12.", None));
        assert_eq!(split_extension(".json"), (".json", None));
    }

    #[test]
    fn test_write_kind_falls_back_to_html() {
        let ctx = RequestContext::default();
        assert_eq!(write_kind(Some("ics"), &ctx).ok(), Some(OutputKind::Html));
        assert_eq!(write_kind(Some("json"), &ctx).ok(), Some(OutputKind::Json));
        assert!(write_kind(Some("atom"), &ctx).is_err());
    }

    #[test]
    fn test_encode_query() {
        let pairs = vec![
            ("tag".to_string(), "all ages".to_string()),
            ("order".to_string(), "name".to_string()),
        ];
        assert_eq!(encode_query(pairs.iter()), "tag=all%20ages&order=name");
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(not_found_error(" 99 ").to_string(), "Event not found: 99");
    }
}
