use chrono::{DateTime, Local};

use crate::level::LogLevel;

/// A single logging event as seen by handlers.
#[derive(Debug, Clone)]
pub struct LogRecord {
	pub level: LogLevel,
	pub logger_name: String,
	pub message: String,
	pub created: DateTime<Local>,
	pub thread_name: Option<String>,
	pub process_id: u32,
}

impl LogRecord {
	pub fn new(level: LogLevel, logger_name: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			level,
			logger_name: logger_name.into(),
			message: message.into(),
			created: Local::now(),
			thread_name: std::thread::current().name().map(str::to_string),
			process_id: std::process::id(),
		}
	}
}
