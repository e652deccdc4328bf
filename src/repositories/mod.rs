//! Observable data repositories backing the UI state.

pub mod channel;

pub use channel::ChannelRepository;
