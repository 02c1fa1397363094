//! # General Backend Logging
//!
//! Package-scoped logging for `general-backend`.
//!
//! Loggers live in a registry keyed by dotted names, so `general_backend.io`
//! is a child of `general_backend`, which is a child of the root logger.
//! Records travel up that hierarchy until a logger with `propagate` unset
//! stops them, and each logger's handlers write them out on the way.
//!
//! As a dependency, the package owns no output: call [`get_logger`] and let
//! the host decide what to do with the records. Binaries built around the
//! package call [`configure_standalone_logging`] once at startup.
//!
//! ## Quick Example
//!
//! ```
//! use general_backend_logging::{LogLevel, LoggerRegistry, LoggingSetup, MemoryHandler, StandaloneConfig};
//! use std::sync::Arc;
//!
//! let registry = LoggerRegistry::new();
//! let setup = LoggingSetup::new(&registry);
//!
//! let capture = MemoryHandler::new(LogLevel::NotSet);
//! setup.package_logger().add_handler(Arc::new(capture.clone()));
//!
//! setup
//!     .configure_standalone_logging(
//!         &StandaloneConfig::new(LogLevel::Debug, LogLevel::Warning).with_suppressed_message(true),
//!     )
//!     .unwrap();
//! setup.set_logger_level_for_dependency("chatty.dependency", LogLevel::Error);
//!
//! setup.get_logger("io").debug("opened file");
//! assert_eq!(capture.messages(), vec!["opened file"]);
//! ```

pub mod config;
pub mod error;
pub mod formatter;
pub mod handlers;
pub mod level;
pub mod logger;
pub mod record;
pub mod registry;
pub mod setup;

pub use config::{LoggingSettings, PackageLoggerConfig, SetupMode, StandaloneConfig};
pub use error::{LoggingError, LoggingResult};
pub use formatter::{DEFAULT_FORMAT, Formatter};
pub use handlers::{
	ConsoleTarget, LogHandler, MemoryHandler, NullHandler, SharedBuffer, StreamHandler,
	StreamTarget, TracingHandler,
};
pub use level::LogLevel;
pub use logger::Logger;
pub use record::LogRecord;
pub use registry::{LoggerProvider, LoggerRegistry, global_registry};
pub use setup::{
	LoggingSetup, PACKAGE_LOGGER_NAME, configure_package_logger, configure_standalone_logging,
	get_logger, package_logger, set_logger_level_for_dependency,
};
