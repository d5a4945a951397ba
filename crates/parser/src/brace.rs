//! Structural brace matching.

use std::sync::LazyLock;

use mtex_primitives::Span;
use regex::Regex;

use crate::error::{ParseError, Result};

/// A brace together with the run of backslashes right before it.
static BRACE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(\\*)([{}])").expect("brace pattern is valid"));

/// Pairs every structural `{` with its `}`.
///
/// A brace preceded by an odd number of backslashes is escaped and ignored.
/// Each returned span runs from the `{` through the matching `}` inclusive,
/// ordered by the position of the closing brace.
pub fn match_braces(source: &str) -> Result<Vec<Span>> {
	let unmatched = || ParseError::UnmatchedBrace {
		source_text: source.to_owned(),
	};
	let mut open = Vec::new();
	let mut pairs = Vec::new();
	for caps in BRACE.captures_iter(source) {
		if caps[1].len() % 2 == 1 {
			continue;
		}
		let brace = caps.get(2).ok_or_else(unmatched)?;
		if brace.as_str() == "{" {
			open.push(brace.start());
		} else {
			let start = open.pop().ok_or_else(unmatched)?;
			pairs.push(Span::new(start, brace.end()));
		}
	}
	if !open.is_empty() {
		return Err(unmatched());
	}
	Ok(pairs)
}
