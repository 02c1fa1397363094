//! Output sinks attached to loggers.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::formatter::Formatter;
use crate::level::LogLevel;
use crate::record::LogRecord;

/// An output sink for log records.
///
/// The owning logger only calls [`emit`](LogHandler::emit) for records at or
/// above [`level`](LogHandler::level). Emit errors are reported through
/// `tracing` and never reach the code that logged the record.
pub trait LogHandler: Send + Sync {
	fn emit(&self, record: &LogRecord) -> io::Result<()>;

	fn level(&self) -> LogLevel;

	/// Optional identifier used to find and replace handlers.
	fn name(&self) -> Option<&str> {
		None
	}
}

/// Console stream selectable from settings files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleTarget {
	Stdout,
	#[default]
	Stderr,
}

/// In-memory byte sink that can be shared between a handler and the code
/// inspecting its output.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
	bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn contents(&self) -> String {
		String::from_utf8_lossy(&self.bytes.lock()).into_owned()
	}

	pub fn lines(&self) -> Vec<String> {
		self.contents().lines().map(str::to_string).collect()
	}

	pub fn clear(&self) {
		self.bytes.lock().clear();
	}
}

impl Write for SharedBuffer {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		self.bytes.lock().extend_from_slice(buf);
		Ok(buf.len())
	}

	fn flush(&mut self) -> io::Result<()> {
		Ok(())
	}
}

/// Where a [`StreamHandler`] writes its lines.
#[derive(Debug, Clone)]
pub enum StreamTarget {
	Stdout,
	Stderr,
	Buffer(SharedBuffer),
}

impl StreamTarget {
	/// Writes `line` followed by a newline as one locked write.
	pub fn write_line(&self, line: &str) -> io::Result<()> {
		match self {
			StreamTarget::Stdout => {
				let mut out = io::stdout().lock();
				writeln!(out, "{}", line)?;
				out.flush()
			}
			StreamTarget::Stderr => {
				let mut err = io::stderr().lock();
				writeln!(err, "{}", line)
			}
			StreamTarget::Buffer(buffer) => {
				let mut bytes = buffer.bytes.lock();
				bytes.extend_from_slice(line.as_bytes());
				bytes.push(b'\n');
				Ok(())
			}
		}
	}
}

impl From<ConsoleTarget> for StreamTarget {
	fn from(target: ConsoleTarget) -> Self {
		match target {
			ConsoleTarget::Stdout => StreamTarget::Stdout,
			ConsoleTarget::Stderr => StreamTarget::Stderr,
		}
	}
}

/// Formats records and writes one line per record to a stream.
#[derive(Debug, Clone)]
pub struct StreamHandler {
	name: Option<String>,
	level: LogLevel,
	formatter: Formatter,
	target: StreamTarget,
}

impl StreamHandler {
	pub fn new(target: StreamTarget) -> Self {
		Self {
			name: None,
			level: LogLevel::NotSet,
			formatter: Formatter::default(),
			target,
		}
	}

	pub fn stderr() -> Self {
		Self::new(StreamTarget::Stderr)
	}

	pub fn stdout() -> Self {
		Self::new(StreamTarget::Stdout)
	}

	pub fn with_level(mut self, level: LogLevel) -> Self {
		self.level = level;
		self
	}

	pub fn with_formatter(mut self, formatter: Formatter) -> Self {
		self.formatter = formatter;
		self
	}

	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	pub fn formatter(&self) -> &Formatter {
		&self.formatter
	}

	pub fn target(&self) -> &StreamTarget {
		&self.target
	}
}

impl LogHandler for StreamHandler {
	fn emit(&self, record: &LogRecord) -> io::Result<()> {
		self.target.write_line(&self.formatter.format(record))
	}

	fn level(&self) -> LogLevel {
		self.level
	}

	fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}
}

/// Discards every record.
///
/// A logger with a `NullHandler` counts as "handled", which keeps the
/// registry's last-resort handler quiet for that part of the hierarchy.
#[derive(Debug, Clone, Default)]
pub struct NullHandler {
	name: Option<String>,
}

impl NullHandler {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}
}

impl LogHandler for NullHandler {
	fn emit(&self, _record: &LogRecord) -> io::Result<()> {
		Ok(())
	}

	fn level(&self) -> LogLevel {
		LogLevel::NotSet
	}

	fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}
}

/// Keeps records in memory. Clones share the same storage.
#[derive(Clone)]
pub struct MemoryHandler {
	name: Option<String>,
	level: LogLevel,
	records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemoryHandler {
	pub fn new(level: LogLevel) -> Self {
		Self {
			name: None,
			level,
			records: Arc::new(Mutex::new(Vec::new())),
		}
	}

	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	pub fn get_records(&self) -> Vec<LogRecord> {
		self.records.lock().clone()
	}

	pub fn messages(&self) -> Vec<String> {
		self.records
			.lock()
			.iter()
			.map(|record| record.message.clone())
			.collect()
	}

	pub fn clear(&self) {
		self.records.lock().clear();
	}
}

impl fmt::Debug for MemoryHandler {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MemoryHandler")
			.field("name", &self.name)
			.field("level", &self.level)
			.field("records", &self.records.lock().len())
			.finish()
	}
}

impl LogHandler for MemoryHandler {
	fn emit(&self, record: &LogRecord) -> io::Result<()> {
		self.records.lock().push(record.clone());
		Ok(())
	}

	fn level(&self) -> LogLevel {
		self.level
	}

	fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}
}

/// Forwards records to the `tracing` ecosystem.
///
/// Lets a host that already runs a `tracing` subscriber receive package
/// records without attaching any stream of its own. The logger name travels
/// in the `logger` field.
#[derive(Debug, Clone)]
pub struct TracingHandler {
	name: Option<String>,
	level: LogLevel,
}

impl TracingHandler {
	pub fn new(level: LogLevel) -> Self {
		Self { name: None, level }
	}

	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}
}

impl Default for TracingHandler {
	fn default() -> Self {
		Self::new(LogLevel::NotSet)
	}
}

impl LogHandler for TracingHandler {
	fn emit(&self, record: &LogRecord) -> io::Result<()> {
		let logger = record.logger_name.as_str();
		let message = record.message.as_str();
		// tracing callsites need a constant level
		match record.level {
			LogLevel::Error | LogLevel::Critical => tracing::error!(logger, "{}", message),
			LogLevel::Warning => tracing::warn!(logger, "{}", message),
			LogLevel::Info => tracing::info!(logger, "{}", message),
			LogLevel::Debug => tracing::debug!(logger, "{}", message),
			LogLevel::NotSet => tracing::trace!(logger, "{}", message),
		}
		Ok(())
	}

	fn level(&self) -> LogLevel {
		self.level
	}

	fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_stream_handler_writes_formatted_line() {
		let buffer = SharedBuffer::new();
		let handler = StreamHandler::new(StreamTarget::Buffer(buffer.clone()))
			.with_formatter(Formatter::new("%(levelname)s|%(name)s|%(message)s").unwrap());

		handler
			.emit(&LogRecord::new(LogLevel::Error, "general_backend", "boom"))
			.unwrap();
		handler
			.emit(&LogRecord::new(LogLevel::Info, "general_backend.io", "ok"))
			.unwrap();

		assert_eq!(
			buffer.lines(),
			vec!["ERROR|general_backend|boom", "INFO|general_backend.io|ok"]
		);
	}

	#[rstest]
	fn test_memory_handler_clones_share_records() {
		let handler = MemoryHandler::new(LogLevel::Debug);
		let observer = handler.clone();

		handler
			.emit(&LogRecord::new(LogLevel::Debug, "a", "first"))
			.unwrap();
		assert_eq!(observer.messages(), vec!["first"]);

		observer.clear();
		assert!(handler.get_records().is_empty());
	}

	#[rstest]
	fn test_named_handlers() {
		assert_eq!(NullHandler::new().with_name("x").name(), Some("x"));
		assert_eq!(StreamHandler::stderr().name(), None);
		assert_eq!(NullHandler::new().level(), LogLevel::NotSet);
	}

	/// Captures `[LEVEL] logger: message` for every tracing event.
	struct EventCapture {
		events: Arc<Mutex<Vec<String>>>,
	}

	impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
		fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
			#[derive(Default)]
			struct FieldVisitor {
				logger: String,
				message: String,
			}

			impl tracing::field::Visit for FieldVisitor {
				fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
					if field.name() == "logger" {
						self.logger = value.to_string();
					}
				}

				fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
					match field.name() {
						"message" => self.message = format!("{:?}", value),
						"logger" => self.logger = format!("{:?}", value),
						_ => {}
					}
				}
			}

			let mut visitor = FieldVisitor::default();
			event.record(&mut visitor);
			self.events.lock().push(format!(
				"[{}] {}: {}",
				event.metadata().level(),
				visitor.logger,
				visitor.message
			));
		}
	}

	#[rstest]
	#[case(LogLevel::Critical, "ERROR")]
	#[case(LogLevel::Error, "ERROR")]
	#[case(LogLevel::Warning, "WARN")]
	#[case(LogLevel::Info, "INFO")]
	#[case(LogLevel::Debug, "DEBUG")]
	#[case(LogLevel::NotSet, "TRACE")]
	fn test_tracing_handler_forwards_records(#[case] level: LogLevel, #[case] expected: &str) {
		use tracing_subscriber::layer::SubscriberExt as _;
		use tracing_subscriber::util::SubscriberInitExt as _;

		let events = Arc::new(Mutex::new(Vec::new()));
		let _guard = tracing_subscriber::registry()
			.with(EventCapture { events: events.clone() })
			.set_default();

		TracingHandler::default()
			.emit(&LogRecord::new(level, "general_backend.io", "forwarded"))
			.unwrap();

		assert_eq!(
			*events.lock(),
			vec![format!("[{}] general_backend.io: forwarded", expected)]
		);
	}

	#[rstest]
	fn test_console_target_deserialize() {
		let target: ConsoleTarget = serde_json::from_str(r#""stdout""#).unwrap();
		assert_eq!(target, ConsoleTarget::Stdout);
		assert!(matches!(StreamTarget::from(target), StreamTarget::Stdout));
	}
}
