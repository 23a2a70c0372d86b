//! Cache for rendered listings.

mod listing;

pub use listing::{ListingCache, ListingKey};
