//! Functional core for happenings.
//!
//! Pure request logic with no I/O: parameter parsing, date range resolution,
//! submission screening, duplicate resolution, event queries and output
//! rendering. The `happenings` server crate is the imperative shell around it.

pub mod dates;
pub mod event;
pub mod params;
pub mod render;
pub mod status;
pub mod storage;
