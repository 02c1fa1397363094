//! Logging module.
//!
//! Package-scoped loggers and the dependency-friendly, standalone and
//! dependency-suppression configuration entry points.
//!
//! # Examples
//!
//! ```rust,no_run
//! use general_backend::logging::{LogLevel, StandaloneConfig, configure_standalone_logging};
//!
//! configure_standalone_logging(&StandaloneConfig::new(LogLevel::Info, LogLevel::Warning)).unwrap();
//! ```

pub use general_backend_logging::*;
