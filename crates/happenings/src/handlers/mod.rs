pub mod error;
pub mod event_form;
pub mod events;
pub mod flash;
pub mod health;

pub use error::AppError;
