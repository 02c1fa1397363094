//! # General Backend
//!
//! Shared helpers for backend projects. The library is meant to be a
//! well-behaved dependency: it never configures output on its own, and its
//! records flow to whatever logging the host application has set up.
//!
//! ## Feature Flags
//!
//! - `logging` (default) - package logger registry and configuration
//! - `utils` (default) - string helpers, implies `logging`
//!
//! ## Quick Example
//!
//! ```rust
//! use general_backend::{LogLevel, PackageLoggerConfig, configure_package_logger, get_logger};
//!
//! // As a dependency: quiet the package below WARNING, keep host output.
//! configure_package_logger(&PackageLoggerConfig::new(LogLevel::Warning)).unwrap();
//!
//! let logger = get_logger("masking");
//! assert_eq!(logger.name(), "general_backend.masking");
//! logger.info("filtered out");
//! ```

#[cfg(feature = "logging")]
pub mod logging;
#[cfg(feature = "utils")]
pub mod utils;

// Re-export the configuration entry points
#[cfg(feature = "logging")]
pub use general_backend_logging::{
	LogLevel, Logger, LoggingError, LoggingResult, LoggingSettings, LoggingSetup,
	PACKAGE_LOGGER_NAME, PackageLoggerConfig, StandaloneConfig, configure_package_logger,
	configure_standalone_logging, get_logger, set_logger_level_for_dependency,
};

#[cfg(feature = "utils")]
pub use general_backend_utils::{extract_realization, extract_realization_number};

#[cfg(all(test, feature = "utils"))]
mod tests {
	use super::*;
	use crate::logging::{LoggerRegistry, MemoryHandler};
	use rstest::rstest;
	use serial_test::serial;
	use std::sync::Arc;

	#[rstest]
	#[serial]
	fn test_get_logger_is_package_scoped() {
		let logger = get_logger("facade");
		assert_eq!(logger.name(), format!("{}.facade", PACKAGE_LOGGER_NAME));
		assert!(Arc::ptr_eq(&logger, &logging::get_logger("facade")));
	}

	#[rstest]
	fn test_setup_on_isolated_registry() {
		let registry = LoggerRegistry::new();
		let setup = LoggingSetup::new(&registry);
		let capture = MemoryHandler::new(LogLevel::NotSet);
		registry.root().add_handler(Arc::new(capture.clone()));

		setup.set_logger_level_for_dependency("third.party", LogLevel::Error);
		registry.get_logger("third.party").warning("muted");
		registry.get_logger("third.party").error("heard");

		assert_eq!(capture.messages(), vec!["heard"]);
	}

	#[rstest]
	fn test_utils_reexports() {
		assert_eq!(extract_realization("r8i1p1f1").as_deref(), Some("r8"));
		assert_eq!(utils::extract_realization_number("r8i1p1f1"), Some(8));
	}
}
