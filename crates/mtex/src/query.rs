//! Resolving substrings and byte ranges to group selections.

use mtex_parser::SpanRegistry;
use mtex_primitives::{Label, Span};
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

use crate::reconcile::Group;

/// A selection of groups, as indices into the final group order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Part {
	indices: Vec<usize>,
}

impl Part {
	/// Selects every group whose label is in `labels`.
	pub fn covering<G>(groups: &[Group<G>], labels: &HashSet<Label>) -> Self {
		Self {
			indices: groups
				.iter()
				.enumerate()
				.filter(|(_, group)| labels.contains(&group.label()))
				.map(|(i, _)| i)
				.collect(),
		}
	}

	/// Group indices in ascending order.
	#[inline]
	pub fn indices(&self) -> &[usize] {
		&self.indices
	}

	#[inline]
	pub fn len(&self) -> usize {
		self.indices.len()
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.indices.is_empty()
	}
}

/// Splits `target` into consecutive registered spans that tile it exactly.
///
/// Depth-first over the spans starting at the current position, longest
/// first, backtracking when a branch dead-ends. Positions already proven
/// unable to reach `target.end` are remembered and skipped.
pub fn decompose(registry: &SpanRegistry, target: Span) -> Option<Vec<Span>> {
	let mut ends_by_start: HashMap<usize, Vec<usize>> = HashMap::default();
	for span in registry.spans() {
		if span.start >= target.start && span.end <= target.end && !span.is_empty() {
			ends_by_start.entry(span.start).or_default().push(span.end);
		}
	}
	for ends in ends_by_start.values_mut() {
		ends.sort_unstable_by(|a, b| b.cmp(a));
	}

	let mut dead = HashSet::default();
	let mut tiles = Vec::new();
	tile(&ends_by_start, target.start, target.end, &mut dead, &mut tiles).then_some(tiles)
}

fn tile(
	ends_by_start: &HashMap<usize, Vec<usize>>,
	begin: usize,
	end: usize,
	dead: &mut HashSet<usize>,
	tiles: &mut Vec<Span>,
) -> bool {
	if begin == end {
		return true;
	}
	if dead.contains(&begin) {
		return false;
	}
	for &next in ends_by_start.get(&begin).into_iter().flatten() {
		tiles.push(Span::new(begin, next));
		if tile(ends_by_start, next, end, dead, tiles) {
			return true;
		}
		tiles.pop();
	}
	dead.insert(begin);
	false
}
