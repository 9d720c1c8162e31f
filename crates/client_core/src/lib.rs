//! Client-side synchronization for the task service.
//!
//! [`store`] talks request/response to the service, [`controller`] keeps the
//! local task snapshot in step with it, and [`clock`] follows the pushed clock
//! value on its own connection.

pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod store;

pub use clock::{clock_url, ClockReceiver, ClockStatus, ReconnectPolicy};
pub use config::{load_settings, ClientSettings};
pub use controller::{
    MutationOrdering, MutationOutcome, Notice, NoticeSeverity, TaskAction, TaskListController,
    TaskListView,
};
pub use error::TransportError;
pub use store::{HttpTaskStore, TaskStore};
