#![deny(missing_docs)]
//! Mediagrab core library.
//!
//! Link classification, provider resolution, response normalization and
//! delivery planning for the media relay bot.

/// Link recognition in free-form message text.
pub mod classifier;
/// Configuration management.
pub mod config;
/// Delivery planning and the outbound chat seam.
pub mod delivery;
/// Resolution and delivery error model.
pub mod error;
/// Unified media model.
pub mod media;
/// Per-message handling cycle.
pub mod pipeline;
/// Provider resolvers and extraction clients.
pub mod providers;
/// Utility functions.
pub mod utils;

#[cfg(test)]
pub mod testing;
