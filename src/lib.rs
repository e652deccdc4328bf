//! Reactive core of the ChannelX live TV browser
//!
//! Fetches live channel listings from a remote API, caches the last
//! outcome behind an observable repository, and derives the home screen
//! state from the cached data plus the user's search and filter
//! selections.

pub mod config;
pub mod errors;
pub mod models;
pub mod repositories;
pub mod services;
pub mod sources;
pub mod utils;
