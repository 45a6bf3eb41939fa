//! Core types - pure abstractions shared across the codebase.

mod error;
mod mode;
mod shutdown;
mod trigger;

pub use error::{ErrorRecord, Failure, Severity, Stage};
pub use mode::RunMode;
pub use shutdown::{is_shutdown, setup_shutdown_handler};
pub use trigger::Trigger;
