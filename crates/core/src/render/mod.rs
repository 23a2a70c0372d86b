//! Response rendering: output kind negotiation, calendar export and JSON.
//!
//! Page, feed, KML and XML documents are template-driven and live in the
//! server crate; they are fed the same result sets.

mod error;
mod ics;
mod json;
mod kind;

pub use error::RenderError;
pub use ics::render_ics;
pub use json::{
    event_records, json_content_type, render_json, Callback, EventRecord, MAX_CALLBACK_LENGTH,
};
pub use kind::{ensure_supported, negotiate, OutputKind, Resource};
