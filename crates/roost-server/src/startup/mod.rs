//! Application startup utilities module.
//!
//! Logging setup, HTTP server construction and shutdown coordination used by
//! the `roost-server` binary.

mod http;
mod logging;
mod shutdown;

pub use http::{configure_app, main_server};
pub use logging::{LogRotation, LoggingConfig, LoggingGuard, init_logging};
pub use shutdown::ShutdownSignal;
