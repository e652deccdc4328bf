//! Services composing repositories into UI-facing state.

pub mod filtering;
pub mod home;
pub mod player;

pub use home::{HomeService, HomeUiState, UiStateSubscription};
pub use player::PlayerService;
