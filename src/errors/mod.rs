//! Error types for the ChannelX core.

pub mod types;

pub use types::{FetchError, FetchResult};
