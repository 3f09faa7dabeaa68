//! URL filter rules of the client configuration

use crate::plist::{Dict, Value};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterRule {
	pub expression: String,
	pub is_regex: bool,
	pub allowed: bool,
	pub active: bool,
}

impl FilterRule {
	pub fn new(expression: impl Into<String>, is_regex: bool, allowed: bool) -> Self {
		Self { expression: expression.into(), is_regex, allowed, active: true }
	}

	/// Dictionary form used in `URLFilterRules`
	pub fn to_value(&self) -> Value {
		let mut dict = Dict::new();
		dict.insert("action", i64::from(self.allowed));
		dict.insert("active", self.active);
		dict.insert("expression", self.expression.as_str());
		dict.insert("regex", self.is_regex);
		Value::Dict(dict)
	}
}

/// Splits a newline separated list. Lines are trimmed, empty lines dropped.
fn split_lines(list: &str) -> impl Iterator<Item = &str> {
	list.split('\n').map(str::trim).filter(|line| !line.is_empty())
}

/// Builds the rules of the four expression lists, in the order
/// allowed expressions, blocked expressions, allowed regexes, blocked regexes.
pub fn build_rules(
	expressions_allowed: &str,
	expressions_blocked: &str,
	regex_allowed: &str,
	regex_blocked: &str,
) -> Vec<FilterRule> {
	let lists = [
		(expressions_allowed, false, true),
		(expressions_blocked, false, false),
		(regex_allowed, true, true),
		(regex_blocked, true, false),
	];

	lists
		.into_iter()
		.flat_map(|(list, is_regex, allowed)| {
			split_lines(list).map(move |line| FilterRule::new(line, is_regex, allowed))
		})
		.collect()
}


// vim: ts=4
