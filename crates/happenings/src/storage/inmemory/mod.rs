//! In-memory storage backend.
//!
//! Events and venues live in HashMaps wrapped in `Arc<RwLock<_>>`, with
//! sequential ids. Nothing is persisted.
//!
//! # Example
//!
//! ```rust,ignore
//! use happenings::storage::inmemory::InMemoryRepository;
//!
//! let repo = InMemoryRepository::new();
//! let event = repo.create_event(&draft).await?;
//! ```

mod repository;

pub use repository::InMemoryRepository;
