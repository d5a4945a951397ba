//! Subscript and superscript discovery.

use std::sync::LazyLock;

use fancy_regex::Regex as FancyRegex;
use mtex_primitives::{Span, SpanKind};
use regex::Regex;
use rustc_hash::FxHashMap as HashMap;

use crate::error::{ParseError, Result};
use crate::registry::SpanRegistry;

/// An unescaped script token, or one preceded by whitespace, with trailing whitespace.
static SCRIPT_TOKEN: LazyLock<FancyRegex> = LazyLock::new(|| {
	FancyRegex::new(r"((?<!\\)[_^]\s*)|(\s+[_^]\s*)").expect("script pattern is valid")
});

/// A single word character or a backslash command.
static ATOMIC_CONTENT: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^(?:\w|\\[a-zA-Z]+)").expect("content pattern is valid"));

/// Registers every script wrapper and the content it attaches to.
///
/// Content is the brace group opening right after the token if there is one,
/// otherwise a single word character or backslash command. The content is a
/// normal span; the wrapper runs from the token through the content and
/// borrows the content's label.
pub fn isolate_scripts(source: &str, braces: &[Span], registry: &mut SpanRegistry) -> Result<()> {
	let brace_ends: HashMap<usize, usize> = braces.iter().map(|s| (s.start, s.end)).collect();
	for token in SCRIPT_TOKEN.find_iter(source) {
		let token = token.map_err(Box::new)?;
		let kind = if token.as_str().contains('_') {
			SpanKind::Subscript
		} else {
			SpanKind::Superscript
		};
		let content = match brace_ends.get(&token.end()) {
			Some(&end) => Span::new(token.end(), end),
			None => {
				let atom = ATOMIC_CONTENT.find(&source[token.end()..]).ok_or_else(|| {
					ParseError::AmbiguousScript {
						source_text: source.to_owned(),
						position: token.start(),
					}
				})?;
				Span::new(token.end() + atom.start(), token.end() + atom.end())
			}
		};
		let label = registry.insert_normal(content);
		registry.insert_script(Span::new(token.start(), content.end), kind, label);
	}
	Ok(())
}
