//! Spans the caller asked for: `{{...}}` groups and requested literals.

use mtex_primitives::Span;
use rustc_hash::FxHashMap as HashMap;
use rustc_hash::FxHashSet as HashSet;

use crate::registry::SpanRegistry;

/// Registers every `{{...}}` group as a normal span.
///
/// `braces` must be ordered by closing position, as returned by
/// [`crate::brace::match_braces`]; the inner pair of a double brace then
/// immediately precedes the outer one. Both pairs are consumed by a match so
/// that `{{{a}}}` yields one group. Returns the isolated spans in order.
pub fn isolate_double_braces(braces: &[Span], registry: &mut SpanRegistry) -> Vec<Span> {
	let mut isolated = Vec::new();
	let mut skip = false;
	for pair in braces.windows(2) {
		if skip {
			skip = false;
			continue;
		}
		let (inner, outer) = (pair[0], pair[1]);
		if outer.start + 1 == inner.start && inner.end + 1 == outer.end {
			registry.insert_normal(outer);
			isolated.push(outer);
			skip = true;
		}
	}
	isolated
}

/// Registers every non-overlapping occurrence of each requested literal.
///
/// An occurrence that ends right where a script wrapper begins is trimmed back
/// through the chain of script wrappers ending there, so isolating `x_a` in
/// `x_a^b` yields just the base `x`. Occurrences trimmed to nothing are
/// dropped. Returns the isolated spans in order.
pub fn isolate_substrings<S: AsRef<str>>(
	source: &str,
	substrings: &[S],
	registry: &mut SpanRegistry,
) -> Vec<Span> {
	let occurrences: Vec<Span> = substrings
		.iter()
		.map(AsRef::as_ref)
		.filter(|s| !s.is_empty())
		.flat_map(|s| {
			source
				.match_indices(s)
				.map(|(start, m)| Span::new(start, start + m.len()))
		})
		.collect();

	let mut script_start_by_end: HashMap<usize, usize> = HashMap::default();
	let mut script_starts: HashSet<usize> = HashSet::default();
	for (span, _) in registry.script_spans() {
		script_start_by_end.insert(span.end, span.start);
		script_starts.insert(span.start);
	}

	let mut isolated = Vec::new();
	for Span { start, mut end } in occurrences {
		if script_starts.contains(&end) {
			while let Some(&script_start) = script_start_by_end.get(&end) {
				end = script_start;
			}
			if start >= end {
				continue;
			}
		}
		let span = Span::new(start, end);
		registry.insert_normal(span);
		isolated.push(span);
	}
	isolated
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::brace::match_braces;
	use crate::script::isolate_scripts;

	fn with_scripts(source: &str) -> SpanRegistry {
		let braces = match_braces(source).unwrap();
		let mut registry = SpanRegistry::new(source.len());
		isolate_scripts(source, &braces, &mut registry).unwrap();
		registry
	}

	#[test]
	fn double_braces_are_isolated() {
		let source = "a{{b+c}}d{e}";
		let braces = match_braces(source).unwrap();
		let mut registry = SpanRegistry::new(source.len());
		let isolated = isolate_double_braces(&braces, &mut registry);
		assert_eq!(isolated, vec![Span::new(1, 8)]);
		assert!(!registry.contains(&Span::new(9, 12)));
	}

	#[test]
	fn triple_braces_yield_one_group() {
		let source = "{{{a}}}";
		let braces = match_braces(source).unwrap();
		let mut registry = SpanRegistry::new(source.len());
		let isolated = isolate_double_braces(&braces, &mut registry);
		assert_eq!(isolated, vec![Span::new(1, 6)]);
	}

	#[test]
	fn every_occurrence_is_isolated() {
		let source = "a+b=a";
		let mut registry = SpanRegistry::new(source.len());
		let isolated = isolate_substrings(source, &["a", ""], &mut registry);
		assert_eq!(isolated, vec![Span::new(0, 1), Span::new(4, 5)]);
	}

	#[test]
	fn whole_scripted_term_is_kept() {
		let source = "x^2+1";
		let mut registry = with_scripts(source);
		let isolated = isolate_substrings(source, &["x^2"], &mut registry);
		assert_eq!(isolated, vec![Span::new(0, 3)]);
	}

	#[test]
	fn chained_scripts_are_trimmed_to_base() {
		let source = "x_a^b";
		let mut registry = with_scripts(source);
		let isolated = isolate_substrings(source, &["x_a"], &mut registry);
		assert_eq!(isolated, vec![Span::new(0, 1)]);
	}

	#[test]
	fn fully_trimmed_occurrence_is_dropped() {
		let source = "x_a^b";
		let mut registry = with_scripts(source);
		let isolated = isolate_substrings(source, &["_a"], &mut registry);
		assert_eq!(isolated, vec![]);
	}
}
