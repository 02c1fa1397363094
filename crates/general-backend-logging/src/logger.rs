//! Named loggers and record dispatch.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::handlers::LogHandler;
use crate::level::LogLevel;
use crate::record::LogRecord;

pub(crate) type LastResort = Arc<RwLock<Option<Arc<dyn LogHandler>>>>;

/// A named node in the logger hierarchy.
///
/// Loggers obtained from a [`LoggerRegistry`](crate::registry::LoggerRegistry)
/// are linked to their nearest existing ancestor. A record logged here is
/// handed to this logger's handlers and then, while `propagate` is set, to
/// the handlers of each ancestor in turn.
pub struct Logger {
	name: String,
	level: RwLock<LogLevel>,
	propagate: RwLock<bool>,
	handlers: RwLock<Vec<Arc<dyn LogHandler>>>,
	parent: RwLock<Option<Arc<Logger>>>,
	last_resort: Option<LastResort>,
}

impl Logger {
	/// Creates a detached logger with no parent and no last-resort output.
	///
	/// # Examples
	///
	/// ```
	/// use general_backend_logging::{LogLevel, Logger, MemoryHandler};
	/// use std::sync::Arc;
	///
	/// let logger = Logger::new("standalone");
	/// let memory = MemoryHandler::new(LogLevel::Debug);
	/// logger.add_handler(Arc::new(memory.clone()));
	/// logger.set_level(LogLevel::Info);
	///
	/// logger.debug("hidden");
	/// logger.info("shown");
	/// assert_eq!(memory.messages(), vec!["shown"]);
	/// ```
	pub fn new(name: impl Into<String>) -> Self {
		Self::with_parent(name, None, None)
	}

	pub(crate) fn with_parent(
		name: impl Into<String>,
		parent: Option<Arc<Logger>>,
		last_resort: Option<LastResort>,
	) -> Self {
		Self {
			name: name.into(),
			level: RwLock::new(LogLevel::NotSet),
			propagate: RwLock::new(true),
			handlers: RwLock::new(Vec::new()),
			parent: RwLock::new(parent),
			last_resort,
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// The level set directly on this logger; `NotSet` means inherited.
	pub fn level(&self) -> LogLevel {
		*self.level.read()
	}

	pub fn set_level(&self, level: LogLevel) {
		*self.level.write() = level;
	}

	/// First level that is not `NotSet`, walking up from this logger.
	pub fn effective_level(&self) -> LogLevel {
		let level = self.level();
		if level != LogLevel::NotSet {
			return level;
		}
		let mut next = self.parent();
		while let Some(logger) = next {
			let level = logger.level();
			if level != LogLevel::NotSet {
				return level;
			}
			next = logger.parent();
		}
		LogLevel::NotSet
	}

	pub fn is_enabled_for(&self, level: LogLevel) -> bool {
		level >= self.effective_level()
	}

	pub fn propagate(&self) -> bool {
		*self.propagate.read()
	}

	pub fn set_propagate(&self, propagate: bool) {
		*self.propagate.write() = propagate;
	}

	pub fn parent(&self) -> Option<Arc<Logger>> {
		self.parent.read().clone()
	}

	pub(crate) fn set_parent(&self, parent: Arc<Logger>) {
		*self.parent.write() = Some(parent);
	}

	/// Attaches a handler. Returns `false` if this exact handler is already attached.
	pub fn add_handler(&self, handler: Arc<dyn LogHandler>) -> bool {
		let mut handlers = self.handlers.write();
		if handlers.iter().any(|existing| Arc::ptr_eq(existing, &handler)) {
			return false;
		}
		handlers.push(handler);
		true
	}

	/// Attaches `handler` unless an attached handler matches `exists`.
	/// The check and the insert happen under one lock.
	pub fn add_handler_unless<F>(&self, exists: F, handler: Arc<dyn LogHandler>) -> bool
	where
		F: Fn(&dyn LogHandler) -> bool,
	{
		let mut handlers = self.handlers.write();
		if handlers.iter().any(|existing| exists(existing.as_ref())) {
			return false;
		}
		handlers.push(handler);
		true
	}

	/// Removes every handler matching `remove`, then attaches `handler`,
	/// under one lock. Returns the number of handlers removed.
	pub fn replace_handlers<F>(&self, remove: F, handler: Arc<dyn LogHandler>) -> usize
	where
		F: Fn(&dyn LogHandler) -> bool,
	{
		let mut handlers = self.handlers.write();
		let before = handlers.len();
		handlers.retain(|existing| !remove(existing.as_ref()));
		let removed = before - handlers.len();
		handlers.push(handler);
		removed
	}

	pub fn remove_handler(&self, handler: &Arc<dyn LogHandler>) -> bool {
		let mut handlers = self.handlers.write();
		let before = handlers.len();
		handlers.retain(|existing| !Arc::ptr_eq(existing, handler));
		handlers.len() != before
	}

	/// Removes every handler matching `remove`. Returns the number removed.
	pub fn remove_handlers<F>(&self, remove: F) -> usize
	where
		F: Fn(&dyn LogHandler) -> bool,
	{
		let mut handlers = self.handlers.write();
		let before = handlers.len();
		handlers.retain(|existing| !remove(existing.as_ref()));
		before - handlers.len()
	}

	/// Snapshot of the handlers attached directly to this logger.
	pub fn handlers(&self) -> Vec<Arc<dyn LogHandler>> {
		self.handlers.read().clone()
	}

	/// Whether this logger, or any ancestor reachable through propagation,
	/// has a handler.
	pub fn has_handlers(&self) -> bool {
		if !self.handlers.read().is_empty() {
			return true;
		}
		if !self.propagate() {
			return false;
		}
		let mut next = self.parent();
		while let Some(logger) = next {
			if !logger.handlers.read().is_empty() {
				return true;
			}
			if !logger.propagate() {
				break;
			}
			next = logger.parent();
		}
		false
	}

	pub fn log(&self, level: LogLevel, message: impl Into<String>) {
		if !self.is_enabled_for(level) {
			return;
		}
		self.handle(&LogRecord::new(level, self.name.clone(), message));
	}

	pub fn debug(&self, message: impl Into<String>) {
		self.log(LogLevel::Debug, message);
	}

	pub fn info(&self, message: impl Into<String>) {
		self.log(LogLevel::Info, message);
	}

	pub fn warning(&self, message: impl Into<String>) {
		self.log(LogLevel::Warning, message);
	}

	pub fn error(&self, message: impl Into<String>) {
		self.log(LogLevel::Error, message);
	}

	pub fn critical(&self, message: impl Into<String>) {
		self.log(LogLevel::Critical, message);
	}

	/// Dispatches an already-built record, skipping this logger's level check.
	///
	/// Handler levels still apply. If no logger on the propagation path has
	/// any handler, records at `Warning` and above go to the registry's
	/// last-resort handler, subject to that handler's own level.
	pub fn handle(&self, record: &LogRecord) {
		let mut found = self.call_handlers(record);
		if self.propagate() {
			let mut next = self.parent();
			while let Some(logger) = next {
				found += logger.call_handlers(record);
				if !logger.propagate() {
					break;
				}
				next = logger.parent();
			}
		}

		if found == 0 && record.level >= LogLevel::Warning {
			let last_resort = self
				.last_resort
				.as_ref()
				.and_then(|slot| slot.read().clone());
			if let Some(handler) = last_resort.filter(|handler| record.level >= handler.level()) {
				emit(handler.as_ref(), record);
			}
		}
	}

	fn call_handlers(&self, record: &LogRecord) -> usize {
		// snapshot so handlers may log without holding the lock
		let handlers = self.handlers();
		for handler in &handlers {
			if record.level >= handler.level() {
				emit(handler.as_ref(), record);
			}
		}
		handlers.len()
	}
}

fn emit(handler: &dyn LogHandler, record: &LogRecord) {
	if let Err(error) = handler.emit(record) {
		tracing::warn!(
			logger = %record.logger_name,
			handler = handler.name().unwrap_or("<unnamed>"),
			%error,
			"log handler failed to emit record"
		);
	}
}

impl fmt::Debug for Logger {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Logger")
			.field("name", &self.name)
			.field("level", &self.level())
			.field("propagate", &self.propagate())
			.field("handlers", &self.handlers.read().len())
			.field("parent", &self.parent().map(|parent| parent.name.clone()))
			.finish()
	}
}
