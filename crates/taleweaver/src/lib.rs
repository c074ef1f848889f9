//! Taleweaver - play and author branching stories served by a remote content API.

// ============================================================================
// Core Infrastructure
// ============================================================================

pub mod build_info;
pub mod config;
pub mod store;

// ============================================================================
// Server & HTTP
// ============================================================================

pub mod handlers;
pub mod server;
pub mod session;

// ============================================================================
// Domain
// ============================================================================

pub mod content;
pub mod story;
