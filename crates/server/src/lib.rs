//! In-memory task service with a pushed clock channel.

pub mod api;
pub mod app_state;
pub mod config;
pub mod routes;

pub use api::TaskBoard;
pub use app_state::AppState;
pub use routes::build_router;
