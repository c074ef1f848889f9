//! HTTP request handlers.

pub mod author;
mod health;
pub mod history;
pub mod navigation;
pub mod play;
pub(crate) mod problem_details;
pub mod ratings;
pub mod stats;
pub mod stories;
mod version;

pub use health::{livez, readyz};
pub use version::version;
