//! Logger registry.
//!
//! This module provides the process-wide registry of named loggers, plus
//! isolated registries for tests and embedding. Names form a dotted
//! hierarchy (`a.b.c` is a child of `a.b`); every logger descends from the
//! root logger.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::handlers::{LogHandler, StreamHandler};
use crate::level::LogLevel;
use crate::logger::{LastResort, Logger};

/// Name reported by the root logger.
pub const ROOT_LOGGER_NAME: &str = "root";

/// The registry operations the configuration layer relies on.
pub trait LoggerProvider: Send + Sync {
	/// Looks up a logger by its full dotted name, creating it if needed.
	fn get_logger(&self, name: &str) -> Arc<Logger>;

	fn root_logger(&self) -> Arc<Logger>;
}

/// Registry of named loggers.
pub struct LoggerRegistry {
	root: Arc<Logger>,
	loggers: RwLock<HashMap<String, Arc<Logger>>>,
	last_resort: LastResort,
}

/// Global logger registry.
static GLOBAL_REGISTRY: Lazy<LoggerRegistry> = Lazy::new(LoggerRegistry::new);

/// Returns the process-wide registry.
pub fn global_registry() -> &'static LoggerRegistry {
	&GLOBAL_REGISTRY
}

impl LoggerRegistry {
	/// Creates an empty registry.
	///
	/// The root logger starts at `Warning` with no handlers. Unhandled
	/// records at `Warning` and above fall back to a bare stderr handler.
	pub fn new() -> Self {
		let fallback: Arc<dyn LogHandler> = Arc::new(StreamHandler::stderr().with_level(LogLevel::Warning));
		let last_resort: LastResort = Arc::new(RwLock::new(Some(fallback)));
		let root = Arc::new(Logger::with_parent(
			ROOT_LOGGER_NAME,
			None,
			Some(last_resort.clone()),
		));
		root.set_level(LogLevel::Warning);

		Self {
			root,
			loggers: RwLock::new(HashMap::new()),
			last_resort,
		}
	}

	pub fn root(&self) -> Arc<Logger> {
		self.root.clone()
	}

	/// Returns the logger called `name`, creating it on first use.
	///
	/// `""` and `"root"` address the root logger. A new logger is linked to
	/// its nearest existing ancestor, and existing descendants that skipped
	/// over the new name are re-linked to it.
	///
	/// # Examples
	///
	/// ```
	/// use general_backend_logging::LoggerRegistry;
	/// use std::sync::Arc;
	///
	/// let registry = LoggerRegistry::new();
	/// let leaf = registry.get_logger("app.db.pool");
	/// assert_eq!(leaf.parent().unwrap().name(), "root");
	///
	/// let middle = registry.get_logger("app.db");
	/// assert!(Arc::ptr_eq(&leaf.parent().unwrap(), &middle));
	/// assert!(Arc::ptr_eq(&registry.get_logger("app.db.pool"), &leaf));
	/// ```
	pub fn get_logger(&self, name: &str) -> Arc<Logger> {
		if name.is_empty() || name == ROOT_LOGGER_NAME {
			return self.root();
		}
		if let Some(logger) = self.loggers.read().get(name) {
			return logger.clone();
		}

		let mut loggers = self.loggers.write();
		// another thread may have won the race for the write lock
		if let Some(logger) = loggers.get(name) {
			return logger.clone();
		}

		let parent = nearest_ancestor(&loggers, name).unwrap_or_else(|| self.root());
		let logger = Arc::new(Logger::with_parent(
			name,
			Some(parent),
			Some(self.last_resort.clone()),
		));

		let prefix = format!("{}.", name);
		for (child_name, child) in loggers.iter() {
			if !child_name.starts_with(&prefix) {
				continue;
			}
			let skips_new = match child.parent() {
				Some(current) => {
					Arc::ptr_eq(&current, &self.root) || !current.name().starts_with(&prefix)
				}
				None => true,
			};
			if skips_new {
				child.set_parent(logger.clone());
			}
		}

		loggers.insert(name.to_string(), logger.clone());
		tracing::debug!(logger = name, "created logger");
		logger
	}

	/// Looks up a logger without creating it.
	pub fn existing_logger(&self, name: &str) -> Option<Arc<Logger>> {
		if name.is_empty() || name == ROOT_LOGGER_NAME {
			return Some(self.root());
		}
		self.loggers.read().get(name).cloned()
	}

	/// Names of all non-root loggers, sorted.
	pub fn logger_names(&self) -> Vec<String> {
		let mut names: Vec<String> = self.loggers.read().keys().cloned().collect();
		names.sort();
		names
	}

	/// Replaces the handler used when a record finds no handler at all.
	/// `None` silences unhandled records.
	pub fn set_last_resort(&self, handler: Option<Arc<dyn LogHandler>>) {
		*self.last_resort.write() = handler;
	}

	pub fn last_resort(&self) -> Option<Arc<dyn LogHandler>> {
		self.last_resort.read().clone()
	}
}

impl Default for LoggerRegistry {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for LoggerRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LoggerRegistry")
			.field("root", &self.root)
			.field("loggers", &self.logger_names())
			.finish()
	}
}

impl LoggerProvider for LoggerRegistry {
	fn get_logger(&self, name: &str) -> Arc<Logger> {
		LoggerRegistry::get_logger(self, name)
	}

	fn root_logger(&self) -> Arc<Logger> {
		self.root()
	}
}

fn nearest_ancestor(loggers: &HashMap<String, Arc<Logger>>, name: &str) -> Option<Arc<Logger>> {
	let mut end = name.len();
	while let Some(dot) = name[..end].rfind('.') {
		if let Some(logger) = loggers.get(&name[..dot]) {
			return Some(logger.clone());
		}
		end = dot;
	}
	None
}
