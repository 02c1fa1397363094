//! String helpers for climate-model member identifiers.
//!
//! A CMIP `variant_label` such as `r1i1p1f1` encodes the realization (`r`),
//! initialization (`i`), physics (`p`) and forcing (`f`) indices.

use std::sync::Arc;

use general_backend_logging::{Logger, get_logger};
use once_cell::sync::Lazy;
use regex::Regex;

/// Realization patterns, tried in order: `rN` directly followed by `i`,
/// `rN` as a whole word, then the first `rN` anywhere.
static REALIZATION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
	[r"r(\d+)i", r"\br(\d+)\b", r"r(\d+)"]
		.into_iter()
		.map(|pattern| Regex::new(pattern).expect("realization pattern is valid"))
		.collect()
});

fn logger() -> Arc<Logger> {
	get_logger("utils.str_utils")
}

fn find_realization(member_id: &str) -> Option<&str> {
	if member_id.is_empty() {
		logger().debug("No member_id provided for realization extraction.");
		return None;
	}

	for pattern in REALIZATION_PATTERNS.iter() {
		if let Some(captures) = pattern.captures(member_id) {
			let digits = captures.get(1)?.as_str();
			logger().debug(format!(
				"Extracted realization 'r{}' from member_id '{}' with re '{}'.",
				digits,
				member_id,
				pattern.as_str()
			));
			return Some(digits);
		}
	}

	logger().warning(format!("No realization found in member_id '{}'.", member_id));
	None
}

/// Extracts the realization label from a member id.
///
/// # Examples
///
/// ```
/// use general_backend_utils::str_utils::extract_realization;
///
/// assert_eq!(extract_realization("r1i1p1f1").as_deref(), Some("r1"));
/// assert_eq!(extract_realization("ssp585_r12").as_deref(), Some("r12"));
/// assert_eq!(extract_realization("i1p1f1"), None);
/// ```
pub fn extract_realization(member_id: &str) -> Option<String> {
	find_realization(member_id).map(|digits| format!("r{}", digits))
}

/// Extracts the realization index from a member id (`r10i1p1f1` gives `10`).
///
/// Returns `None` if no realization is present or the index does not fit in a `u32`.
pub fn extract_realization_number(member_id: &str) -> Option<u32> {
	let digits = find_realization(member_id)?;
	match digits.parse() {
		Ok(number) => Some(number),
		Err(error) => {
			logger().warning(format!(
				"Realization index 'r{}' in member_id '{}' is not a valid number: {}.",
				digits, member_id, error
			));
			None
		}
	}
}
