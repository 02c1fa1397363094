//! Package logger configuration.
//!
//! By default the package is dependency-friendly: its loggers carry no level
//! and no output of their own, so records flow to whatever the host
//! application configured on the root logger. Three entry points change that:
//!
//! - [`configure_package_logger`] adjusts the package logger only, optionally
//!   giving it a console handler.
//! - [`configure_standalone_logging`] is for binaries built around the
//!   package. It configures the root logger and the package logger.
//! - [`set_logger_level_for_dependency`] quiets (or opens up) any other logger
//!   by name.
//!
//! The free functions operate on the process-wide registry. [`LoggingSetup`]
//! runs the same operations against any [`LoggerProvider`].
//!
//! None of the entry points read files or the environment. Loading a setup
//! from `.toml` or `.json` through
//! [`LoggingSettings::from_file`](crate::config::LoggingSettings::from_file)
//! is an opt-in convenience for hosts; a dependency never needs it.

use std::sync::Arc;

use crate::config::{PackageLoggerConfig, StandaloneConfig};
use crate::error::LoggingResult;
use crate::handlers::{ConsoleTarget, LogHandler, NullHandler, StreamHandler, StreamTarget};
use crate::level::LogLevel;
use crate::logger::Logger;
use crate::registry::{LoggerProvider, global_registry};

/// Name of the package logger; every package logger name starts with it.
pub const PACKAGE_LOGGER_NAME: &str = "general_backend";

/// Handlers whose name starts with this prefix belong to the package.
pub const OWNED_HANDLER_PREFIX: &str = "general_backend.";

/// Console handler attached to the package logger on request.
pub const CONSOLE_HANDLER_NAME: &str = "general_backend.console";

/// Placeholder handler attached when the package logger is created.
pub const NULL_HANDLER_NAME: &str = "general_backend.null";

/// Console handler attached to the root logger in standalone mode.
pub const ROOT_CONSOLE_HANDLER_NAME: &str = "general_backend.root_console";

/// Whether `handler` was attached by this module.
pub fn is_package_owned(handler: &dyn LogHandler) -> bool {
	handler
		.name()
		.is_some_and(|name| name.starts_with(OWNED_HANDLER_PREFIX))
}

/// Maps a package-relative name onto the full logger name.
///
/// # Examples
///
/// ```
/// use general_backend_logging::setup::package_logger_name;
///
/// assert_eq!(package_logger_name(""), "general_backend");
/// assert_eq!(package_logger_name("masking"), "general_backend.masking");
/// assert_eq!(package_logger_name("general_backend.utils"), "general_backend.utils");
/// ```
pub fn package_logger_name(name: &str) -> String {
	if name.is_empty() {
		return PACKAGE_LOGGER_NAME.to_string();
	}
	let in_package = name
		.strip_prefix(PACKAGE_LOGGER_NAME)
		.is_some_and(|rest| rest.is_empty() || rest.starts_with('.'));
	if in_package {
		name.to_string()
	} else {
		format!("{}.{}", PACKAGE_LOGGER_NAME, name)
	}
}

fn standalone_config_message(pckg_level: LogLevel, root_level: LogLevel) -> String {
	format!(
		"Configuring standalone logging for {} package:\n\
		 * Package logger level: {}\n\
		 * Root logger level: {}\n\
		 To change the logging level for a specific dependency, use \
		 set_logger_level_for_dependency from general_backend::logging.",
		PACKAGE_LOGGER_NAME, pckg_level, root_level
	)
}

/// Runs the configuration entry points against a logger provider.
pub struct LoggingSetup<'a> {
	provider: &'a dyn LoggerProvider,
	message_sink: StreamTarget,
	console: Option<StreamTarget>,
}

impl LoggingSetup<'static> {
	/// Setup over the process-wide registry.
	pub fn global() -> Self {
		Self::new(global_registry())
	}
}

impl<'a> LoggingSetup<'a> {
	pub fn new(provider: &'a dyn LoggerProvider) -> Self {
		Self {
			provider,
			message_sink: StreamTarget::Stdout,
			console: None,
		}
	}

	/// Where the standalone announcement is written (stdout by default).
	pub fn with_message_sink(mut self, sink: StreamTarget) -> Self {
		self.message_sink = sink;
		self
	}

	/// Sends every console handler this setup attaches to `stream`,
	/// overriding the configured [`ConsoleTarget`].
	pub fn with_console_stream(mut self, stream: StreamTarget) -> Self {
		self.console = Some(stream);
		self
	}

	fn console_target(&self, target: ConsoleTarget) -> StreamTarget {
		self.console.clone().unwrap_or_else(|| target.into())
	}

	/// Returns the package logger, creating it on first use.
	///
	/// A fresh package logger gets a [`NullHandler`], so an unconfigured
	/// host never sees last-resort output for package records.
	pub fn package_logger(&self) -> Arc<Logger> {
		let logger = self.provider.get_logger(PACKAGE_LOGGER_NAME);
		if !logger.handlers().iter().any(|h| is_package_owned(h.as_ref())) {
			let null: Arc<dyn LogHandler> = Arc::new(NullHandler::new().with_name(NULL_HANDLER_NAME));
			logger.add_handler_unless(is_package_owned, null);
		}
		logger
	}

	/// Returns the package logger (`""`) or one of its descendants.
	///
	/// Names that do not already start with [`PACKAGE_LOGGER_NAME`] are
	/// placed under it.
	pub fn get_logger(&self, name: &str) -> Arc<Logger> {
		let package = self.package_logger();
		let full_name = package_logger_name(name);
		if full_name == PACKAGE_LOGGER_NAME {
			return package;
		}
		self.provider.get_logger(&full_name)
	}

	/// Sets the package logger's level and propagation and, when
	/// `add_handler` is set, gives it exactly one console handler.
	///
	/// Handlers previously attached by this module are replaced; handlers
	/// attached by the host are left alone. An invalid format is reported
	/// before anything changes.
	pub fn configure_package_logger(&self, config: &PackageLoggerConfig) -> LoggingResult<()> {
		let formatter = if config.add_handler {
			Some(config.formatter()?)
		} else {
			None
		};

		let logger = self.package_logger();
		logger.set_level(config.level);
		logger.set_propagate(config.propagate);

		if let Some(formatter) = formatter {
			let handler = StreamHandler::new(self.console_target(config.target))
				.with_name(CONSOLE_HANDLER_NAME)
				.with_level(config.level)
				.with_formatter(formatter);
			let removed = logger.replace_handlers(is_package_owned, Arc::new(handler));
			tracing::debug!(
				logger = PACKAGE_LOGGER_NAME,
				removed,
				"attached package console handler"
			);
		}

		tracing::debug!(
			logger = PACKAGE_LOGGER_NAME,
			level = %config.level,
			propagate = config.propagate,
			"configured package logger"
		);
		Ok(())
	}

	/// Configures the root logger and the package logger for standalone use.
	///
	/// The root logger gets a console handler only if it has none yet, and
	/// its level is always set. The package logger then owns its output and
	/// stops propagating. Unless suppressed, one announcement is written to
	/// the message sink.
	pub fn configure_standalone_logging(&self, config: &StandaloneConfig) -> LoggingResult<()> {
		let formatter = config.formatter()?;

		let root = self.provider.root_logger();
		let handler = StreamHandler::new(self.console_target(config.target))
			.with_name(ROOT_CONSOLE_HANDLER_NAME)
			.with_formatter(formatter);
		if root.add_handler_unless(|_| true, Arc::new(handler)) {
			tracing::debug!("attached root console handler");
		}
		root.set_level(config.root_level);

		self.configure_package_logger(&config.package_config())?;

		if !config.suppress_log_config_msg {
			let message = standalone_config_message(config.pckg_level, config.root_level);
			if let Err(error) = self.message_sink.write_line(&message) {
				tracing::warn!(%error, "failed to write logging configuration message");
			}
		}
		Ok(())
	}

	/// Sets the level of the logger called `name`, creating it if needed.
	///
	/// `name` is used as given, without the package prefix; `""` is the root.
	pub fn set_logger_level_for_dependency(&self, name: &str, level: LogLevel) {
		self.provider.get_logger(name).set_level(level);
		tracing::debug!(logger = name, %level, "set dependency logger level");
	}
}

/// Returns the package logger from the process-wide registry.
pub fn package_logger() -> Arc<Logger> {
	LoggingSetup::global().package_logger()
}

/// Returns a package-scoped logger from the process-wide registry.
///
/// # Examples
///
/// ```
/// use general_backend_logging::get_logger;
/// use std::sync::Arc;
///
/// let logger = get_logger("masking");
/// assert_eq!(logger.name(), "general_backend.masking");
/// assert!(Arc::ptr_eq(&logger, &get_logger("general_backend.masking")));
/// ```
pub fn get_logger(name: &str) -> Arc<Logger> {
	LoggingSetup::global().get_logger(name)
}

/// See [`LoggingSetup::configure_package_logger`].
pub fn configure_package_logger(config: &PackageLoggerConfig) -> LoggingResult<()> {
	LoggingSetup::global().configure_package_logger(config)
}

/// See [`LoggingSetup::configure_standalone_logging`].
pub fn configure_standalone_logging(config: &StandaloneConfig) -> LoggingResult<()> {
	LoggingSetup::global().configure_standalone_logging(config)
}

/// See [`LoggingSetup::set_logger_level_for_dependency`].
pub fn set_logger_level_for_dependency(name: &str, level: LogLevel) {
	LoggingSetup::global().set_logger_level_for_dependency(name, level);
}
