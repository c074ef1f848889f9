//! Storage abstraction layer for Taleweaver.
//!
//! Trait interfaces for everything Taleweaver persists locally, with a
//! SQLite implementation in the `sqlite` submodule. Story content itself is
//! never stored here; it lives in the remote content service.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │              story::Traversal / HTTP handlers                   │
//! └──────────────────────────┬──────────────────────────────────────┘
//!                            │ uses traits
//!                            ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     store/ (traits)                             │
//! │  ProgressStore, ProfileStore, OutcomeLog, OwnershipStore, ...  │
//! └──────────────────────────┬──────────────────────────────────────┘
//!                            │ implementation
//!                            ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     store/sqlite/                               │
//! │  SqliteStore (one connection, one table per concern)           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Naming Conventions
//!
//! - `upsert` - create or replace (single atomic statement)
//! - `clear` / `release` - idempotent delete
//! - `record` - add to an append-only log
//! - `list_*` - enumerate rows

pub mod error;
pub mod health;
pub mod outcome;
pub mod ownership;
pub mod progress;
pub mod rating;
pub mod sqlite;

pub use error::{StorageError, StorageResult};
pub use health::StoreHealth;
pub use outcome::{OutcomeLog, PlayOutcome};
pub use ownership::OwnershipStore;
pub use progress::{ProfileStore, ProgressStore};
pub use rating::{RatingStore, StoryRating};
pub use sqlite::SqliteStore;
