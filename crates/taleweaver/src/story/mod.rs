//! Story play and analysis.
//!
//! - [`resolve`] picks the next node for a submitted choice, rolling
//!   [`roll::DiceRoller`] dice for conditional choices.
//! - [`personalize`] substitutes the player's name into node content.
//! - [`traversal`] ties content, resolution and the stores together for one
//!   request at a time.
//! - [`graph`] reports unreachable nodes and broken choices to authors.
//! - [`stats`] aggregates the outcome log.
//! - [`access`] is the ownership check for authoring.

pub mod access;
pub mod graph;
pub mod notice;
pub mod personalize;
pub mod resolve;
pub mod roll;
pub mod stats;
pub mod traversal;

pub use access::{AccessError, Viewer, authorize_author};
pub use graph::{GraphDiagnostics, diagnose};
pub use notice::{Notice, NoticeLevel};
pub use resolve::{ResolveError, Resolution, resolve_choice};
pub use roll::{DiceRoller, FixedRoll, ThreadDice};
pub use traversal::{
    AdvanceOutcome, Fallback, Navigation, NodeView, Traversal, TraversalStores, ViewOutcome,
};
