//! Logging options and settings files.
//!
//! Options can be built in code with the `with_*` methods or deserialized
//! from the host application's own settings. [`LoggingSettings`] bundles a
//! complete setup and can be read from a `.toml` or `.json` file.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{LoggingError, LoggingResult};
use crate::formatter::{DEFAULT_FORMAT, Formatter};
use crate::handlers::ConsoleTarget;
use crate::level::LogLevel;
use crate::setup::LoggingSetup;

/// Options for [`configure_package_logger`](crate::setup::configure_package_logger).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageLoggerConfig {
	/// Minimum severity handled by the package logger.
	pub level: LogLevel,
	/// Whether records continue to the host's loggers.
	pub propagate: bool,
	/// Whether the package attaches its own console handler.
	pub add_handler: bool,
	/// Line format for the console handler, [`DEFAULT_FORMAT`] when unset.
	pub fmt: Option<String>,
	/// strftime pattern for `%(asctime)s`.
	pub datefmt: Option<String>,
	pub target: ConsoleTarget,
}

impl Default for PackageLoggerConfig {
	fn default() -> Self {
		Self {
			level: LogLevel::Info,
			propagate: true,
			add_handler: false,
			fmt: None,
			datefmt: None,
			target: ConsoleTarget::Stderr,
		}
	}
}

impl PackageLoggerConfig {
	pub fn new(level: LogLevel) -> Self {
		Self {
			level,
			..Self::default()
		}
	}

	pub fn with_propagate(mut self, propagate: bool) -> Self {
		self.propagate = propagate;
		self
	}

	pub fn with_handler(mut self, add_handler: bool) -> Self {
		self.add_handler = add_handler;
		self
	}

	pub fn with_format(mut self, fmt: impl Into<String>) -> Self {
		self.fmt = Some(fmt.into());
		self
	}

	pub fn with_datefmt(mut self, datefmt: impl Into<String>) -> Self {
		self.datefmt = Some(datefmt.into());
		self
	}

	pub fn with_target(mut self, target: ConsoleTarget) -> Self {
		self.target = target;
		self
	}

	/// Builds the console formatter described by `fmt` and `datefmt`.
	pub fn formatter(&self) -> LoggingResult<Formatter> {
		build_formatter(self.fmt.as_deref().unwrap_or(DEFAULT_FORMAT), self.datefmt.as_deref())
	}
}

/// Options for [`configure_standalone_logging`](crate::setup::configure_standalone_logging).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StandaloneConfig {
	pub pckg_level: LogLevel,
	pub root_level: LogLevel,
	pub fmt: String,
	pub datefmt: Option<String>,
	/// Skip the announcement written after configuring.
	pub suppress_log_config_msg: bool,
	pub target: ConsoleTarget,
}

impl Default for StandaloneConfig {
	fn default() -> Self {
		Self {
			pckg_level: LogLevel::Info,
			root_level: LogLevel::Warning,
			fmt: DEFAULT_FORMAT.to_string(),
			datefmt: None,
			suppress_log_config_msg: false,
			target: ConsoleTarget::Stderr,
		}
	}
}

impl StandaloneConfig {
	pub fn new(pckg_level: LogLevel, root_level: LogLevel) -> Self {
		Self {
			pckg_level,
			root_level,
			..Self::default()
		}
	}

	pub fn with_format(mut self, fmt: impl Into<String>) -> Self {
		self.fmt = fmt.into();
		self
	}

	pub fn with_datefmt(mut self, datefmt: impl Into<String>) -> Self {
		self.datefmt = Some(datefmt.into());
		self
	}

	pub fn with_suppressed_message(mut self, suppress: bool) -> Self {
		self.suppress_log_config_msg = suppress;
		self
	}

	pub fn with_target(mut self, target: ConsoleTarget) -> Self {
		self.target = target;
		self
	}

	pub fn formatter(&self) -> LoggingResult<Formatter> {
		build_formatter(&self.fmt, self.datefmt.as_deref())
	}

	/// Package logger options implied by standalone mode: own handler, no propagation.
	pub fn package_config(&self) -> PackageLoggerConfig {
		PackageLoggerConfig {
			level: self.pckg_level,
			propagate: false,
			add_handler: true,
			fmt: Some(self.fmt.clone()),
			datefmt: self.datefmt.clone(),
			target: self.target,
		}
	}
}

fn build_formatter(fmt: &str, datefmt: Option<&str>) -> LoggingResult<Formatter> {
	let formatter = Formatter::new(fmt)?;
	match datefmt {
		Some(datefmt) => formatter.with_datefmt(datefmt),
		None => Ok(formatter),
	}
}

/// How [`LoggingSettings::apply`] configures the package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetupMode {
	/// Leave output to the host; only apply `package` if present.
	#[default]
	Dependency,
	/// Own the console output via `standalone`.
	Standalone,
}

/// A complete logging setup, typically loaded from a settings file.
///
/// ```toml
/// mode = "standalone"
///
/// [standalone]
/// pckg_level = "DEBUG"
/// root_level = "WARNING"
///
/// [dependencies]
/// "urllib3.connectionpool" = "ERROR"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
	pub mode: SetupMode,
	pub package: Option<PackageLoggerConfig>,
	pub standalone: StandaloneConfig,
	/// Levels for third-party loggers, by full logger name.
	pub dependencies: BTreeMap<String, LogLevel>,
}

impl LoggingSettings {
	/// Load settings from a `.toml` or `.json` file.
	///
	/// Optional for hosts; the configuration entry points never call this.
	pub fn from_file(path: impl Into<PathBuf>) -> LoggingResult<Self> {
		let path = path.into();
		let contents = std::fs::read_to_string(&path).map_err(|e| {
			LoggingError::invalid(format!("Failed to read {}: {}", path.display(), e))
		})?;

		match path.extension().and_then(|s| s.to_str()) {
			Some("toml") => Self::from_toml_str(&contents),
			Some("json") => Self::from_json_str(&contents),
			_ => Err(LoggingError::invalid(format!(
				"Unsupported settings file {}: supported formats are .toml and .json",
				path.display()
			))),
		}
	}

	pub fn from_toml_str(contents: &str) -> LoggingResult<Self> {
		toml::from_str(contents)
			.map_err(|e| LoggingError::invalid(format!("TOML parse error: {}", e)))
	}

	pub fn from_json_str(contents: &str) -> LoggingResult<Self> {
		serde_json::from_str(contents)
			.map_err(|e| LoggingError::invalid(format!("JSON parse error: {}", e)))
	}

	/// Checks every format and date format without touching any logger.
	pub fn validate(&self) -> LoggingResult<()> {
		match self.mode {
			SetupMode::Dependency => {
				if let Some(package) = self.package.as_ref().filter(|p| p.add_handler) {
					package.formatter()?;
				}
			}
			SetupMode::Standalone => {
				self.standalone.formatter()?;
			}
		}
		Ok(())
	}

	/// Runs the configuration entry points described by these settings.
	///
	/// Settings are validated first, so an invalid file leaves every logger
	/// untouched.
	pub fn apply(&self, setup: &LoggingSetup<'_>) -> LoggingResult<()> {
		self.validate()?;
		match self.mode {
			SetupMode::Dependency => {
				if let Some(package) = &self.package {
					setup.configure_package_logger(package)?;
				}
			}
			SetupMode::Standalone => setup.configure_standalone_logging(&self.standalone)?,
		}
		for (name, level) in &self.dependencies {
			setup.set_logger_level_for_dependency(name, *level);
		}
		Ok(())
	}
}
