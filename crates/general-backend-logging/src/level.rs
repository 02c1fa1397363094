//! Severity levels.
//!
//! Levels carry the conventional numeric values (`DEBUG = 10`, `INFO = 20`, ...)
//! so settings written for other logging stacks keep working. `NotSet` on a
//! logger means "inherit from the nearest ancestor".

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{LoggingError, LoggingResult};

/// Severity of a log record, or the threshold of a logger or handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
	NotSet,
	Debug,
	Info,
	Warning,
	Error,
	Critical,
}

impl LogLevel {
	/// All levels in ascending severity.
	pub const ALL: [LogLevel; 6] = [
		LogLevel::NotSet,
		LogLevel::Debug,
		LogLevel::Info,
		LogLevel::Warning,
		LogLevel::Error,
		LogLevel::Critical,
	];

	/// Numeric value of the level.
	pub fn as_u32(self) -> u32 {
		match self {
			LogLevel::NotSet => 0,
			LogLevel::Debug => 10,
			LogLevel::Info => 20,
			LogLevel::Warning => 30,
			LogLevel::Error => 40,
			LogLevel::Critical => 50,
		}
	}

	/// Upper-case level name as rendered by `%(levelname)s`.
	pub fn as_str(self) -> &'static str {
		match self {
			LogLevel::NotSet => "NOTSET",
			LogLevel::Debug => "DEBUG",
			LogLevel::Info => "INFO",
			LogLevel::Warning => "WARNING",
			LogLevel::Error => "ERROR",
			LogLevel::Critical => "CRITICAL",
		}
	}
}

impl fmt::Display for LogLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		// `pad` so width/alignment flags apply
		f.pad(self.as_str())
	}
}

impl FromStr for LogLevel {
	type Err = LoggingError;

	/// Parses a level name, case-insensitively.
	///
	/// # Examples
	///
	/// ```
	/// use general_backend_logging::LogLevel;
	///
	/// assert_eq!("info".parse::<LogLevel>().unwrap(), LogLevel::Info);
	/// assert_eq!("WARN".parse::<LogLevel>().unwrap(), LogLevel::Warning);
	/// assert!("loud".parse::<LogLevel>().is_err());
	/// ```
	fn from_str(s: &str) -> LoggingResult<Self> {
		match s.trim().to_ascii_uppercase().as_str() {
			"NOTSET" => Ok(LogLevel::NotSet),
			"DEBUG" => Ok(LogLevel::Debug),
			"INFO" => Ok(LogLevel::Info),
			"WARNING" | "WARN" => Ok(LogLevel::Warning),
			"ERROR" => Ok(LogLevel::Error),
			"CRITICAL" | "FATAL" => Ok(LogLevel::Critical),
			_ => Err(LoggingError::invalid(format!("Unknown level: '{}'", s))),
		}
	}
}

impl TryFrom<u32> for LogLevel {
	type Error = LoggingError;

	fn try_from(value: u32) -> LoggingResult<Self> {
		LogLevel::ALL
			.into_iter()
			.find(|level| level.as_u32() == value)
			.ok_or_else(|| LoggingError::invalid(format!("Unknown numeric level: {}", value)))
	}
}

impl Serialize for LogLevel {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(self.as_str())
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLevel {
	Name(String),
	Number(u32),
}

impl<'de> Deserialize<'de> for LogLevel {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		match RawLevel::deserialize(deserializer)? {
			RawLevel::Name(name) => name.parse(),
			RawLevel::Number(value) => LogLevel::try_from(value),
		}
		.map_err(serde::de::Error::custom)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("debug", LogLevel::Debug)]
	#[case("Info", LogLevel::Info)]
	#[case(" WARNING ", LogLevel::Warning)]
	#[case("warn", LogLevel::Warning)]
	#[case("fatal", LogLevel::Critical)]
	#[case("NOTSET", LogLevel::NotSet)]
	fn test_parse_level_names(#[case] input: &str, #[case] expected: LogLevel) {
		assert_eq!(input.parse::<LogLevel>().unwrap(), expected);
	}

	#[rstest]
	fn test_unknown_level_name_is_invalid_configuration() {
		let err = "verbose".parse::<LogLevel>().unwrap_err();
		assert!(matches!(err, LoggingError::InvalidConfiguration(_)));
		assert!(err.to_string().contains("verbose"));
	}

	#[rstest]
	#[case(0, LogLevel::NotSet)]
	#[case(20, LogLevel::Info)]
	#[case(50, LogLevel::Critical)]
	fn test_numeric_levels(#[case] value: u32, #[case] expected: LogLevel) {
		assert_eq!(LogLevel::try_from(value).unwrap(), expected);
		assert_eq!(expected.as_u32(), value);
	}

	#[rstest]
	fn test_non_standard_numeric_level_rejected() {
		assert!(LogLevel::try_from(15).is_err());
	}

	#[rstest]
	fn test_ordering_follows_severity() {
		assert!(LogLevel::Debug < LogLevel::Info);
		assert!(LogLevel::Warning < LogLevel::Error);
		assert!(LogLevel::NotSet < LogLevel::Debug);
	}

	#[rstest]
	fn test_display_respects_padding() {
		assert_eq!(format!("{:<8}|", LogLevel::Info), "INFO    |");
	}

	#[rstest]
	fn test_serde_accepts_names_and_numbers() {
		let levels: Vec<LogLevel> = serde_json::from_str(r#"["error", 10, "WARNING"]"#).unwrap();
		assert_eq!(levels, vec![LogLevel::Error, LogLevel::Debug, LogLevel::Warning]);

		assert_eq!(serde_json::to_string(&LogLevel::Info).unwrap(), r#""INFO""#);
		assert!(serde_json::from_str::<LogLevel>("25").is_err());
	}
}
