//! Laminarity check over all registered spans.

use std::cmp::Reverse;

use mtex_primitives::Span;
use tracing::error;

use crate::error::{ParseError, Result};
use crate::registry::SpanRegistry;

/// Returns every pair of spans that partially overlap.
///
/// Pairs are ordered by the first span's start and, within that, outermost
/// first. The first element of each pair starts earlier.
pub fn crossing_pairs(registry: &SpanRegistry) -> Vec<(Span, Span)> {
	let mut spans: Vec<Span> = registry.spans().collect();
	spans.sort_by_key(|s| (s.start, Reverse(s.end)));

	let mut pairs = Vec::new();
	for (i, a) in spans.iter().enumerate() {
		for b in &spans[i + 1..] {
			if a.end <= b.start {
				continue;
			}
			if a.end < b.end {
				pairs.push((*a, *b));
			}
		}
	}
	pairs
}

/// Fails with [`ParseError::OverlappingSpans`] listing every crossing pair.
pub fn validate_laminar(source: &str, registry: &SpanRegistry) -> Result<()> {
	let pairs = crossing_pairs(registry);
	if pairs.is_empty() {
		return Ok(());
	}
	let pairs: Vec<(String, String)> = pairs
		.into_iter()
		.map(|(a, b)| (a.slice(source).to_owned(), b.slice(source).to_owned()))
		.collect();
	for (a, b) in &pairs {
		error!(first = %a, second = %b, "overlapping substring pair");
	}
	Err(ParseError::OverlappingSpans { pairs })
}
