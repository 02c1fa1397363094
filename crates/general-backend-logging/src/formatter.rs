//! Percent-style record formatting.
//!
//! Format strings use `%(key)<spec>` placeholders, where `<spec>` is an
//! optional `-`/`0` flag, an optional width, an optional `.precision` and a
//! conversion (`s`, `d` or `f`). `%%` renders a literal percent sign.
//!
//! Supported keys: `name`, `levelname`, `levelno`, `message`, `asctime`,
//! `created`, `msecs`, `process` and `threadName`.
//!
//! Format strings are parsed once, when the formatter is built, so a typo in
//! a configured format fails at configuration time instead of on every record.

use std::borrow::Cow;
use std::iter::Peekable;
use std::str::Chars;

use chrono::format::{Item, StrftimeItems};

use crate::error::{LoggingError, LoggingResult};
use crate::record::LogRecord;

/// Format used when no explicit format is configured for a package handler.
pub const DEFAULT_FORMAT: &str = "%(asctime)s - %(name)s - %(levelname)s - %(message)s";

/// Largest width or precision a placeholder may request.
pub const MAX_FIELD_WIDTH: usize = 1024;

const ASCTIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
	Name,
	LevelName,
	LevelNo,
	Message,
	AscTime,
	Created,
	Msecs,
	Process,
	ThreadName,
}

impl Field {
	fn parse(key: &str) -> Option<Self> {
		let field = match key {
			"name" => Field::Name,
			"levelname" => Field::LevelName,
			"levelno" => Field::LevelNo,
			"message" => Field::Message,
			"asctime" => Field::AscTime,
			"created" => Field::Created,
			"msecs" => Field::Msecs,
			"process" => Field::Process,
			"threadName" => Field::ThreadName,
			_ => return None,
		};
		Some(field)
	}

	fn is_numeric(self) -> bool {
		matches!(
			self,
			Field::LevelNo | Field::Created | Field::Msecs | Field::Process
		)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conversion {
	Str,
	Int,
	Float,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Placeholder {
	field: Field,
	left_align: bool,
	zero_pad: bool,
	width: Option<usize>,
	precision: Option<usize>,
	conversion: Conversion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
	Literal(String),
	Placeholder(Placeholder),
}

enum Value<'a> {
	Text(Cow<'a, str>),
	Int(i64),
	Float(f64),
}

/// Renders [`LogRecord`]s into single lines of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatter {
	fmt: String,
	segments: Vec<Segment>,
	datefmt: Option<String>,
	escape_control_chars: bool,
}

impl Formatter {
	/// Builds a formatter, validating the format string.
	///
	/// # Examples
	///
	/// ```
	/// use general_backend_logging::{Formatter, LogLevel, LogRecord};
	///
	/// let formatter = Formatter::new("%(levelname)s:%(name)s:%(message)s").unwrap();
	/// let record = LogRecord::new(LogLevel::Info, "general_backend", "ready");
	/// assert_eq!(formatter.format(&record), "INFO:general_backend:ready");
	///
	/// assert!(Formatter::new("%(nope)s").is_err());
	/// ```
	pub fn new(fmt: &str) -> LoggingResult<Self> {
		let segments = parse_format(fmt)?;
		Ok(Self {
			fmt: fmt.to_string(),
			segments,
			datefmt: None,
			escape_control_chars: false,
		})
	}

	/// Sets the `chrono` strftime pattern used for `%(asctime)s`.
	pub fn with_datefmt(mut self, datefmt: impl Into<String>) -> LoggingResult<Self> {
		let datefmt = datefmt.into();
		if StrftimeItems::new(&datefmt).any(|item| matches!(item, Item::Error)) {
			return Err(LoggingError::invalid(format!(
				"Invalid date format '{}'",
				datefmt
			)));
		}
		self.datefmt = Some(datefmt);
		Ok(self)
	}

	/// Escapes control characters in messages as `\xNN` so a single record
	/// always renders as a single line.
	pub fn with_escaped_control_chars(mut self, escape: bool) -> Self {
		self.escape_control_chars = escape;
		self
	}

	/// The format string this formatter was built from.
	pub fn format_string(&self) -> &str {
		&self.fmt
	}

	pub fn datefmt(&self) -> Option<&str> {
		self.datefmt.as_deref()
	}

	pub fn format(&self, record: &LogRecord) -> String {
		let mut line = String::with_capacity(self.fmt.len() + record.message.len());
		for segment in &self.segments {
			match segment {
				Segment::Literal(text) => line.push_str(text),
				Segment::Placeholder(placeholder) => {
					let value = self.value(placeholder.field, record);
					line.push_str(&render(placeholder, value));
				}
			}
		}
		line
	}

	fn value<'a>(&self, field: Field, record: &'a LogRecord) -> Value<'a> {
		match field {
			Field::Name => Value::Text(Cow::Borrowed(&record.logger_name)),
			Field::LevelName => Value::Text(Cow::Borrowed(record.level.as_str())),
			Field::LevelNo => Value::Int(i64::from(record.level.as_u32())),
			Field::Message if self.escape_control_chars => {
				Value::Text(escape_control_chars(&record.message))
			}
			Field::Message => Value::Text(Cow::Borrowed(&record.message)),
			Field::AscTime => Value::Text(Cow::Owned(self.format_time(record))),
			Field::Created => Value::Float(record.created.timestamp_micros() as f64 / 1_000_000.0),
			Field::Msecs => {
				Value::Float(f64::from(record.created.timestamp_subsec_micros() % 1_000_000) / 1000.0)
			}
			Field::Process => Value::Int(i64::from(record.process_id)),
			Field::ThreadName => Value::Text(Cow::Borrowed(
				record.thread_name.as_deref().unwrap_or("<unnamed>"),
			)),
		}
	}

	fn format_time(&self, record: &LogRecord) -> String {
		match &self.datefmt {
			Some(datefmt) => record.created.format(datefmt).to_string(),
			None => format!(
				"{},{:03}",
				record.created.format(ASCTIME_FORMAT),
				record.created.timestamp_subsec_millis().min(999)
			),
		}
	}
}

impl Default for Formatter {
	fn default() -> Self {
		Self {
			fmt: "%(message)s".to_string(),
			segments: vec![Segment::Placeholder(Placeholder {
				field: Field::Message,
				left_align: false,
				zero_pad: false,
				width: None,
				precision: None,
				conversion: Conversion::Str,
			})],
			datefmt: None,
			escape_control_chars: false,
		}
	}
}

fn parse_format(fmt: &str) -> LoggingResult<Vec<Segment>> {
	let mut segments = Vec::new();
	let mut literal = String::new();
	let mut chars = fmt.chars().peekable();

	while let Some(ch) = chars.next() {
		if ch != '%' {
			literal.push(ch);
			continue;
		}
		match chars.next() {
			Some('%') => literal.push('%'),
			Some('(') => {
				let placeholder = parse_placeholder(&mut chars, fmt)?;
				if !literal.is_empty() {
					segments.push(Segment::Literal(std::mem::take(&mut literal)));
				}
				segments.push(Segment::Placeholder(placeholder));
			}
			Some(other) => {
				return Err(LoggingError::invalid(format!(
					"Unexpected '%{}' in format '{}', use '%%' for a literal percent sign",
					other, fmt
				)));
			}
			None => {
				return Err(LoggingError::invalid(format!(
					"Format '{}' ends with a lone '%'",
					fmt
				)));
			}
		}
	}
	if !literal.is_empty() {
		segments.push(Segment::Literal(literal));
	}

	if !segments
		.iter()
		.any(|segment| matches!(segment, Segment::Placeholder(_)))
	{
		return Err(LoggingError::invalid(format!(
			"Format '{}' contains no '%(key)s' placeholder",
			fmt
		)));
	}
	Ok(segments)
}

// Called right after the opening "%(".
fn parse_placeholder(chars: &mut Peekable<Chars<'_>>, fmt: &str) -> LoggingResult<Placeholder> {
	let mut key = String::new();
	loop {
		match chars.next() {
			Some(')') => break,
			Some(c) => key.push(c),
			None => {
				return Err(LoggingError::invalid(format!(
					"Unterminated placeholder '%({}' in format '{}'",
					key, fmt
				)));
			}
		}
	}
	let field = Field::parse(&key).ok_or_else(|| {
		LoggingError::invalid(format!("Unknown format key '{}' in format '{}'", key, fmt))
	})?;

	let mut left_align = false;
	let mut zero_pad = false;
	while let Some(&flag) = chars.peek() {
		match flag {
			'-' => left_align = true,
			'0' => zero_pad = true,
			_ => break,
		}
		chars.next();
	}
	let width = take_number(chars, &key, fmt)?;
	let precision = if chars.peek() == Some(&'.') {
		chars.next();
		Some(take_number(chars, &key, fmt)?.unwrap_or(0))
	} else {
		None
	};

	let conversion = match chars.next() {
		Some('s') => Conversion::Str,
		Some('d') | Some('i') => Conversion::Int,
		Some('f') => Conversion::Float,
		Some(other) => {
			return Err(LoggingError::invalid(format!(
				"Unsupported conversion '{}' for key '{}' in format '{}'",
				other, key, fmt
			)));
		}
		None => {
			return Err(LoggingError::invalid(format!(
				"Missing conversion for key '{}' in format '{}'",
				key, fmt
			)));
		}
	};
	if conversion != Conversion::Str && !field.is_numeric() {
		return Err(LoggingError::invalid(format!(
			"Key '{}' is not numeric and cannot use a numeric conversion in format '{}'",
			key, fmt
		)));
	}

	Ok(Placeholder {
		field,
		left_align,
		zero_pad,
		width,
		precision,
		conversion,
	})
}

fn take_number(chars: &mut Peekable<Chars<'_>>, key: &str, fmt: &str) -> LoggingResult<Option<usize>> {
	let mut digits = String::new();
	while let Some(&c) = chars.peek() {
		if !c.is_ascii_digit() {
			break;
		}
		digits.push(c);
		chars.next();
	}
	if digits.is_empty() {
		return Ok(None);
	}
	match digits.parse::<usize>() {
		Ok(n) if n <= MAX_FIELD_WIDTH => Ok(Some(n)),
		_ => Err(LoggingError::invalid(format!(
			"Width or precision '{}' for key '{}' exceeds {} in format '{}'",
			digits, key, MAX_FIELD_WIDTH, fmt
		))),
	}
}

fn render(placeholder: &Placeholder, value: Value<'_>) -> String {
	let body: Cow<'_, str> = match (placeholder.conversion, value) {
		(Conversion::Str, Value::Text(text)) => match placeholder.precision {
			Some(precision) => Cow::Owned(text.chars().take(precision).collect()),
			None => text,
		},
		(Conversion::Str, Value::Int(n)) | (Conversion::Int, Value::Int(n)) => {
			Cow::Owned(n.to_string())
		}
		(Conversion::Str, Value::Float(f)) => Cow::Owned(f.to_string()),
		(Conversion::Int, Value::Float(f)) => Cow::Owned((f.trunc() as i64).to_string()),
		(Conversion::Float, Value::Int(n)) => {
			Cow::Owned(format!("{:.*}", placeholder.precision.unwrap_or(6), n as f64))
		}
		(Conversion::Float, Value::Float(f)) => {
			Cow::Owned(format!("{:.*}", placeholder.precision.unwrap_or(6), f))
		}
		// numeric conversions on text keys are rejected while parsing
		(_, Value::Text(text)) => text,
	};

	let width = placeholder.width.unwrap_or(0);
	let len = body.chars().count();
	if len >= width {
		return body.into_owned();
	}
	let fill = width - len;
	if placeholder.left_align {
		format!("{}{}", body, " ".repeat(fill))
	} else if placeholder.zero_pad && placeholder.conversion != Conversion::Str {
		match body.strip_prefix('-') {
			Some(digits) => format!("-{}{}", "0".repeat(fill), digits),
			None => format!("{}{}", "0".repeat(fill), body),
		}
	} else {
		format!("{}{}", " ".repeat(fill), body)
	}
}

/// Escapes control characters as `\xNN` byte sequences.
///
/// # Examples
///
/// ```
/// use general_backend_logging::formatter::escape_control_chars;
///
/// assert_eq!(escape_control_chars("line1\nline2"), "line1\\x0aline2");
/// assert_eq!(escape_control_chars("plain"), "plain");
/// ```
pub fn escape_control_chars(s: &str) -> Cow<'_, str> {
	if !s.chars().any(char::is_control) {
		return Cow::Borrowed(s);
	}

	let mut result = String::with_capacity(s.len() + 8);
	for ch in s.chars() {
		if ch.is_control() {
			let mut buf = [0u8; 4];
			for byte in ch.encode_utf8(&mut buf).as_bytes() {
				result.push_str(&format!("\\x{:02x}", byte));
			}
		} else {
			result.push(ch);
		}
	}
	Cow::Owned(result)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::level::LogLevel;
	use chrono::{Local, TimeZone};
	use rstest::{fixture, rstest};

	#[fixture]
	fn record() -> LogRecord {
		let mut record = LogRecord::new(LogLevel::Warning, "general_backend.io", "disk almost full");
		record.created = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
			+ chrono::Duration::milliseconds(42);
		record.thread_name = Some("worker-1".to_string());
		record
	}

	#[rstest]
	fn test_default_format_layout(record: LogRecord) {
		let formatter = Formatter::new(DEFAULT_FORMAT).unwrap();
		assert_eq!(
			formatter.format(&record),
			"2024-03-09 14:05:07,042 - general_backend.io - WARNING - disk almost full"
		);
	}

	#[rstest]
	fn test_default_formatter_renders_message_only(record: LogRecord) {
		assert_eq!(Formatter::default().format(&record), "disk almost full");
	}

	#[rstest]
	fn test_width_and_alignment(record: LogRecord) {
		let formatter = Formatter::new("[%(levelname)-8s][%(levelno)4d] %(message).4s").unwrap();
		assert_eq!(formatter.format(&record), "[WARNING ][  30] disk");
	}

	#[rstest]
	fn test_width_at_cap_accepted(record: LogRecord) {
		let formatter = Formatter::new("%(levelname)1024s").unwrap();
		let line = formatter.format(&record);
		assert_eq!(line.len(), MAX_FIELD_WIDTH);
		assert!(line.ends_with(" WARNING"));
	}

	#[rstest]
	fn test_zero_padded_msecs_and_literal_percent(record: LogRecord) {
		let formatter = Formatter::new("%(msecs)03d 100%% %(threadName)s").unwrap();
		assert_eq!(formatter.format(&record), "042 100% worker-1");
	}

	#[rstest]
	fn test_custom_datefmt(record: LogRecord) {
		let formatter = Formatter::new("%(asctime)s %(message)s")
			.unwrap()
			.with_datefmt("%d/%m/%Y")
			.unwrap();
		assert_eq!(formatter.format(&record), "09/03/2024 disk almost full");
	}

	#[rstest]
	fn test_escaped_control_chars() {
		let formatter = Formatter::new("%(message)s")
			.unwrap()
			.with_escaped_control_chars(true);
		let record = LogRecord::new(LogLevel::Info, "x", "user=admin\nINFO forged");
		assert_eq!(formatter.format(&record), "user=admin\\x0aINFO forged");
	}

	#[rstest]
	#[case("%(nope)s")]
	#[case("%(message)s %(name")]
	#[case("%(message)q")]
	#[case("%(message)")]
	#[case("%(name)d")]
	#[case("50% done %(message)s")]
	#[case("%(message)s %")]
	#[case("no placeholders at all")]
	#[case("%(message)99999999999s")]
	#[case("%(message)1025s")]
	#[case("%(created).99999999999999999999999f")]
	fn test_invalid_formats_rejected(#[case] fmt: &str) {
		let err = Formatter::new(fmt).unwrap_err();
		assert!(matches!(err, LoggingError::InvalidConfiguration(_)), "{fmt}");
	}

	#[rstest]
	fn test_invalid_datefmt_rejected() {
		let result = Formatter::new("%(asctime)s").unwrap().with_datefmt("%Y-%m-%");
		assert!(result.is_err());
	}
}
