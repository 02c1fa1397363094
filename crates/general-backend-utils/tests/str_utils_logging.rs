//! String helper logging tests
//!
//! Verifies that the helpers report through the package logger.

use general_backend_logging::{LogHandler, LogLevel, MemoryHandler, get_logger};
use general_backend_utils::{extract_realization, extract_realization_number};
use rstest::rstest;
use serial_test::serial;
use std::sync::Arc;

fn capture_str_utils() -> (MemoryHandler, Arc<dyn LogHandler>) {
	let logger = get_logger("utils.str_utils");
	logger.set_level(LogLevel::Debug);
	let capture = MemoryHandler::new(LogLevel::NotSet);
	let handle: Arc<dyn LogHandler> = Arc::new(capture.clone());
	logger.add_handler(handle.clone());
	(capture, handle)
}

fn release(handle: &Arc<dyn LogHandler>) {
	let logger = get_logger("utils.str_utils");
	logger.remove_handler(handle);
	logger.set_level(LogLevel::NotSet);
}

#[rstest]
#[serial]
fn test_successful_extraction_logs_debug() {
	let (capture, handle) = capture_str_utils();

	assert_eq!(extract_realization("r4i1p1f1").as_deref(), Some("r4"));

	let records = capture.get_records();
	assert_eq!(records.len(), 1);
	assert_eq!(records[0].level, LogLevel::Debug);
	assert_eq!(records[0].logger_name, "general_backend.utils.str_utils");
	assert!(records[0].message.contains("Extracted realization 'r4'"));
	release(&handle);
}

#[rstest]
#[serial]
fn test_missing_realization_logs_warning() {
	let (capture, handle) = capture_str_utils();

	assert_eq!(extract_realization("i1p1f1"), None);

	let records = capture.get_records();
	assert_eq!(records.len(), 1);
	assert_eq!(records[0].level, LogLevel::Warning);
	assert_eq!(records[0].message, "No realization found in member_id 'i1p1f1'.");
	release(&handle);
}

#[rstest]
#[serial]
fn test_empty_member_id_logs_debug() {
	let (capture, handle) = capture_str_utils();

	assert_eq!(extract_realization(""), None);

	assert_eq!(
		capture.messages(),
		vec!["No member_id provided for realization extraction."]
	);
	release(&handle);
}

#[rstest]
#[serial]
fn test_oversized_realization_number_logs_warning() {
	let (capture, handle) = capture_str_utils();

	assert_eq!(extract_realization_number("r99999999999i1"), None);

	let records = capture.get_records();
	assert_eq!(records.len(), 2);
	assert_eq!(records[0].level, LogLevel::Debug);
	assert_eq!(records[1].level, LogLevel::Warning);
	assert!(records[1]
		.message
		.starts_with("Realization index 'r99999999999' in member_id 'r99999999999i1' is not a valid number"));
	release(&handle);
}
