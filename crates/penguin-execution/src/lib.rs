//! Runtime plumbing shared by the Penguin front ends.
//!
//! - `logging`: subscriber setup (`init_logging`)
//! - `error_layer`: forwards WARN/ERROR events to a channel for the UI

pub mod error_layer;
pub mod logging;

pub use error_layer::{ErrorChannelLayer, ObservabilityEvent};
pub use logging::{LoggingError, init_logging};
