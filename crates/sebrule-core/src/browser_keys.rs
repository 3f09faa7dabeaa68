//! Allowed browser exam keys
//!
//! The allowed keys are stored as one text field. Keys are separated by
//! whitespace, commas or semicolons and compared in lowercase.

use crate::prelude::*;

fn is_separator(c: char) -> bool {
	matches!(c, ' ' | '\t' | '\n' | '\r' | ',' | ';')
}

fn is_key(token: &str) -> bool {
	token.len() == 64 && token.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// Splits the stored list into normalized (lowercase) keys
pub fn split_keys(list: &str) -> Vec<String> {
	list.split(is_separator).filter(|t| !t.is_empty()).map(str::to_lowercase).collect()
}

/// Validates a submitted key list: every key must be 64 hex characters and
/// no key may appear twice (case-insensitively).
pub fn validate_keys(list: &str) -> ClResult<()> {
	let keys = split_keys(list);
	if let Some(bad) = keys.iter().find(|key| !is_key(key)) {
		return Err(Error::ValidationError(format!(
			"allowed browser exam keys must be 64 hexadecimal characters, got '{}'",
			bad
		)));
	}
	for (i, key) in keys.iter().enumerate() {
		if keys[..i].contains(key) {
			return Err(Error::ValidationError(format!(
				"allowed browser exam key '{}' is listed more than once",
				key
			)));
		}
	}
	Ok(())
}


// vim: ts=4
