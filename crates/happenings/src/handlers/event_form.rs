//! Event form handlers: add, edit, clone, create and update.
//!
//! Create and update share one save path. A submission that fails
//! validation, trips the spam screen or asks for a preview is shown again
//! with the submitted values; structured requests get the error list instead.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Form,
};
use chrono::Utc;

use happenings_core::event::{
    apply_submission, index_venues, is_preview, resolve_venue_ref, screen_submission, trap_field,
    validate_event, DuplicateWalk, Event, EventDraft, EventError, EventId, FormValues, Venue,
    VenueDraft, VenueRef,
};
use happenings_core::params::Params;
use happenings_core::render::{Callback, OutputKind};
use happenings_core::status::VALIDATION_FAILED;
use happenings_core::storage::RepositoryError;

use super::events::{
    clear_shown_flash, find_event, not_found_error, not_found_redirect, split_extension, write_kind,
};
use super::flash::{redirect_with_flash, FlashMessage};
use crate::{
    context::RequestContext,
    handlers::AppError,
    render::{render_errors, render_event, render_form, EventForm, EventView},
    state::AppState,
    urls::EVENTS_PATH,
};

pub const SAVED_MESSAGE: &str = "Event was successfully saved.";
pub const NEW_VENUE_MESSAGE: &str = "Please tell us more about where it's being held.";
pub const CLONED_MESSAGE: &str = "This is a new event cloned from an existing one. \
     Please update the fields, like the time and description.";

async fn venue_title(state: &AppState, draft: &EventDraft) -> Result<Option<String>, AppError> {
    Ok(match draft.venue_id {
        Some(id) => state.venue_repo.get_venue(id).await?.map(|v| v.title),
        None => None,
    })
}

/// GET /events/new - blank form, optionally prefilled from the query string.
pub async fn new_event(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Response, AppError> {
    let mut draft = EventDraft::default();
    let ignored = apply_submission(&ctx.params, &mut draft);
    if !ignored.is_empty() {
        tracing::debug!(errors = ?ignored, "Ignoring unusable prefill values");
    }

    let values = FormValues::from_draft(&draft, None).overlay(&ctx.params);
    let body = render_form(
        EventForm {
            page_title: "Add an Event",
            messages: &ctx.flash,
            values: &values,
            action: EVENTS_PATH,
            is_new: true,
            preview: None,
            cancel_path: EVENTS_PATH,
        },
        state.site(),
    )?;

    Ok(clear_shown_flash(body.into_response(), &ctx, OutputKind::Html))
}

/// GET /events/{id}/edit
pub async fn edit_event(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    ctx: RequestContext,
) -> Result<Response, AppError> {
    let Some(event) = find_event(&state, &raw_id).await? else {
        return Ok(not_found_redirect(&raw_id));
    };

    let draft = event.to_draft();
    let values = FormValues::from_draft(&draft, venue_title(&state, &draft).await?.as_deref());
    let page_title = format!("Editing '{}'", event.title);
    let action = state.urls.event_path(event.id);

    let body = render_form(
        EventForm {
            page_title: &page_title,
            messages: &ctx.flash,
            values: &values,
            action: &action,
            is_new: false,
            preview: None,
            cancel_path: &action,
        },
        state.site(),
    )?;

    Ok(clear_shown_flash(body.into_response(), &ctx, OutputKind::Html))
}

/// GET /events/{id}/clone - a new event form filled from an existing one.
pub async fn clone_event(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    ctx: RequestContext,
) -> Result<Response, AppError> {
    let Some(event) = find_event(&state, &raw_id).await? else {
        return Ok(not_found_redirect(&raw_id));
    };

    let draft = event.to_clone();
    let values = FormValues::from_draft(&draft, venue_title(&state, &draft).await?.as_deref());
    let mut messages = ctx.flash.clone();
    messages.push(FlashMessage::success(CLONED_MESSAGE));
    let cancel_path = state.urls.event_path(event.id);

    let body = render_form(
        EventForm {
            page_title: "Clone an existing Event",
            messages: &messages,
            values: &values,
            action: EVENTS_PATH,
            is_new: true,
            preview: None,
            cancel_path: &cancel_path,
        },
        state.site(),
    )?;

    Ok(clear_shown_flash(body.into_response(), &ctx, OutputKind::Html))
}

/// POST /events
pub async fn create(
    State(state): State<AppState>,
    ctx: RequestContext,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let kind = write_kind(None, &ctx)?;
    let params = ctx.merged(&fields);
    save(&state, &ctx, kind, &params, None).await
}

/// POST or PUT /events/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    ctx: RequestContext,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let (raw_id, extension) = split_extension(&segment);
    let kind = write_kind(extension, &ctx)?;

    let Some(existing) = find_event(&state, raw_id).await? else {
        return match kind {
            OutputKind::Html => Ok(not_found_redirect(raw_id)),
            _ => Err(not_found_error(raw_id).into()),
        };
    };

    let params = ctx.merged(&fields);
    save(&state, &ctx, kind, &params, Some(existing)).await
}

/// How the submission refers to its venue, once looked up.
enum VenueChoice {
    Keep,
    Existing(Venue),
    Clear,
    Create(VenueDraft),
}

async fn choose_venue(
    state: &AppState,
    params: &Params,
    errors: &mut Vec<EventError>,
) -> Result<VenueChoice, AppError> {
    Ok(match resolve_venue_ref(params) {
        VenueRef::Absent => VenueChoice::Keep,
        VenueRef::Id(id) => match state.venue_repo.get_venue(id).await? {
            Some(venue) => VenueChoice::Existing(venue),
            None => {
                errors.push(EventError::UnknownVenue(id));
                VenueChoice::Keep
            }
        },
        VenueRef::Name(name) if name.trim().is_empty() => VenueChoice::Clear,
        VenueRef::Name(name) => match state.venue_repo.find_venue_by_title(name.trim()).await? {
            Some(venue) => VenueChoice::Existing(venue),
            None => VenueChoice::Create(VenueDraft::named(name.trim())),
        },
    })
}

/// Checks that marking `own_id` as a duplicate of `original` keeps the chain
/// ending at a single canonical event.
async fn check_original(
    state: &AppState,
    own_id: Option<EventId>,
    original: EventId,
) -> Result<Option<EventError>, AppError> {
    if own_id == Some(original) {
        return Ok(Some(EventError::DuplicateOfItself));
    }
    let Some(target) = state.event_repo.get_event(original).await? else {
        return Ok(Some(EventError::UnknownOriginal(original)));
    };

    let mut walk = DuplicateWalk::start(target);
    loop {
        if own_id == Some(walk.current().id) {
            return Ok(Some(EventError::DuplicateLoop(original)));
        }
        let Some(next) = walk.next_hop() else {
            return Ok(None);
        };
        let found = state.event_repo.get_event(next).await?;
        if let Err(err) = walk.advance(found) {
            tracing::warn!(error = %err, "Refusing to extend a broken duplicate chain");
            return Ok(Some(EventError::BrokenOriginal(original)));
        }
    }
}

async fn save(
    state: &AppState,
    ctx: &RequestContext,
    kind: OutputKind,
    params: &Params,
    existing: Option<Event>,
) -> Result<Response, AppError> {
    let callback = Callback::parse(ctx.callback())?;
    let mut draft = existing.as_ref().map(Event::to_draft).unwrap_or_default();
    let mut errors = apply_submission(params, &mut draft);

    let mut new_venue = None;
    match choose_venue(state, params, &mut errors).await? {
        VenueChoice::Keep => {}
        VenueChoice::Existing(venue) => draft.venue_id = Some(venue.id),
        VenueChoice::Clear => draft.venue_id = None,
        VenueChoice::Create(venue) => {
            draft.venue_id = None;
            new_venue = Some(venue);
        }
    }

    let own_id = existing.as_ref().map(|e| e.id);
    let previous_original = existing.as_ref().and_then(|e| e.duplicate_of_id);
    if let Some(original) = draft.duplicate_of_id.filter(|id| Some(*id) != previous_original) {
        if let Some(problem) = check_original(state, own_id, original).await? {
            errors.push(problem);
        }
    }

    if errors.is_empty() {
        if let Err(invalid) = validate_event(&draft) {
            errors = invalid;
        }
    }

    let blocks = screen_submission(trap_field(params), draft.description_text());
    if !blocks.is_empty() {
        tracing::warn!(request_id = %ctx.request_id, ?blocks, "Submission blocked");
    }

    let mut problems: Vec<String> = errors.iter().map(ToString::to_string).collect();
    problems.extend(blocks.iter().map(|b| b.message().to_string()));

    if kind != OutputKind::Html {
        if !problems.is_empty() || is_preview(params) {
            tracing::warn!(request_id = %ctx.request_id, problems = problems.len(), "Event not saved");
            let body = render_errors(kind, &problems, callback.as_ref())?;
            let status =
                StatusCode::from_u16(VALIDATION_FAILED).unwrap_or(StatusCode::UNPROCESSABLE_ENTITY);
            return Ok((status, body).into_response());
        }
    } else if !problems.is_empty() || is_preview(params) {
        return redisplay(state, ctx, params, &draft, existing.as_ref(), &problems).await;
    }

    let created_venue = match new_venue {
        Some(venue) => {
            let venue = state.venue_repo.create_venue(&venue).await?;
            tracing::info!(venue_id = %venue.id, title = %venue.title, "Venue created");
            draft.venue_id = Some(venue.id);
            Some(venue)
        }
        None => None,
    };

    let (event, created) = match existing {
        Some(mut event) => {
            if !event.apply_draft(draft, Utc::now()) {
                return Err(RepositoryError::InvalidData("Event start time is missing".to_string()).into());
            }
            state.event_repo.update_event(&event).await?;
            (event, false)
        }
        None => (state.event_repo.create_event(&draft).await?, true),
    };
    state.listing_cache.invalidate().await;
    tracing::info!(event_id = %event.id, title = %event.title, created, "Event saved");

    if kind != OutputKind::Html {
        let venues = state.venue_index().await?;
        let body = render_event(kind, &event, &venues, &[], state.site(), callback.as_ref())?;
        let status = if created { StatusCode::CREATED } else { StatusCode::OK };
        return Ok((status, body).into_response());
    }

    Ok(match created_venue {
        Some(venue) => redirect_with_flash(
            &state.urls.edit_venue_path(venue.id, Some(event.id)),
            FlashMessage::success(format!("{SAVED_MESSAGE} {NEW_VENUE_MESSAGE}")),
        ),
        None => redirect_with_flash(
            &state.urls.event_path(event.id),
            FlashMessage::success(SAVED_MESSAGE),
        ),
    })
}

/// Shows the form again with the submitted values, the problems and a preview.
async fn redisplay(
    state: &AppState,
    ctx: &RequestContext,
    params: &Params,
    draft: &EventDraft,
    existing: Option<&Event>,
    problems: &[String],
) -> Result<Response, AppError> {
    let venue = match draft.venue_id {
        Some(id) => state.venue_repo.get_venue(id).await?,
        None => None,
    };
    let values = FormValues::from_draft(draft, venue.as_ref().map(|v| v.title.as_str()))
        .overlay(params);

    let preview = Event::from_draft(existing.map_or(EventId(0), |e| e.id), draft, Utc::now())
        .map(|event| EventView::new(&event, &index_venues(venue), &state.urls));

    let mut messages = ctx.flash.clone();
    messages.extend(problems.iter().map(FlashMessage::error));

    let (page_title, action) = match existing {
        Some(event) => (
            format!("Editing '{}'", event.title),
            state.urls.event_path(event.id),
        ),
        None => ("Add an Event".to_string(), EVENTS_PATH.to_string()),
    };
    let cancel_path = existing.map_or_else(|| EVENTS_PATH.to_string(), |e| state.urls.event_path(e.id));

    let body = render_form(
        EventForm {
            page_title: &page_title,
            messages: &messages,
            values: &values,
            action: &action,
            is_new: existing.is_none(),
            preview,
            cancel_path: &cancel_path,
        },
        state.site(),
    )?;

    Ok(clear_shown_flash(body.into_response(), ctx, OutputKind::Html))
}
