//! Error types for the logging module.

use thiserror::Error;

/// Errors that can occur while configuring loggers.
///
/// Dispatching records never fails; only configuration input (levels,
/// format strings, settings files) is validated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoggingError {
	/// A level, format string or settings value was rejected.
	#[error("Invalid logging configuration: {0}")]
	InvalidConfiguration(String),
}

impl LoggingError {
	pub(crate) fn invalid(message: impl Into<String>) -> Self {
		Self::InvalidConfiguration(message.into())
	}
}

/// Result type alias for logging configuration operations.
pub type LoggingResult<T> = Result<T, LoggingError>;
