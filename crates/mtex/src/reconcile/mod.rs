//! Regrouping rendered glyphs into labelled, source-addressable groups.
//!
//! Reconciliation runs in three passes over the renderer's glyph sequence:
//!
//! 1. [`label_glyphs`] decodes each glyph's label from its fill colour,
//!    carrying the previous label over uncoloured glyphs.
//! 2. Maximal runs of equal label become groups.
//! 3. Script groups are put back in source order, and each group is assigned
//!    the slice of source text it stands for.

use std::ops::Range;

use mtex_parser::SpanTree;
use mtex_primitives::{Label, Rgb, Span, SpanKind};
use rustc_hash::FxHashMap as HashMap;
use tracing::{trace, warn};

use crate::render::Glyph;

/// A maximal run of glyphs sharing one label.
#[derive(Debug, Clone, PartialEq)]
pub struct Group<G> {
	label: Label,
	glyphs: Vec<G>,
	source: Span,
	tex: String,
}

impl<G> Group<G> {
	pub fn new(label: Label, glyphs: Vec<G>, source: Span, tex: String) -> Self {
		Self {
			label,
			glyphs,
			source,
			tex,
		}
	}

	/// Label shared by every glyph in the group.
	#[inline]
	pub fn label(&self) -> Label {
		self.label
	}

	#[inline]
	pub fn glyphs(&self) -> &[G] {
		&self.glyphs
	}

	#[inline]
	pub fn glyphs_mut(&mut self) -> &mut [G] {
		&mut self.glyphs
	}

	/// Source range this group was reconstructed to stand for.
	#[inline]
	pub fn source_span(&self) -> Span {
		self.source
	}

	/// Source text this group stands for.
	#[inline]
	pub fn tex(&self) -> &str {
		&self.tex
	}
}

impl<G: Glyph> Group<G> {
	/// Repaints every glyph in the group.
	pub fn set_color(&mut self, color: Rgb) {
		for glyph in &mut self.glyphs {
			glyph.set_color(color);
		}
	}
}

/// The label carried by `glyph`'s colour, if the tree handed it out.
pub fn decode_label<G: Glyph>(glyph: &G, tree: &SpanTree) -> Option<Label> {
	match glyph.label() {
		Ok(label) if tree.registry().has_label(label) => Some(label),
		Ok(label) => {
			trace!(%label, "glyph label out of range");
			None
		}
		Err(_) => None,
	}
}

/// Decodes each glyph's label.
///
/// A glyph without a usable label was left uncoloured by the typesetter and
/// joins the glyph before it, or [`Label::ROOT`] at the start of the sequence.
pub fn label_glyphs<G: Glyph>(glyphs: &[G], tree: &SpanTree) -> Vec<Label> {
	let mut previous = Label::ROOT;
	glyphs
		.iter()
		.map(|glyph| {
			if let Some(label) = decode_label(glyph, tree) {
				previous = label;
			}
			previous
		})
		.collect()
}

/// Reconciles a glyph sequence whose fill colours carry labels.
pub fn reconcile<G: Glyph>(glyphs: Vec<G>, tree: &SpanTree) -> Vec<Group<G>> {
	let labels = label_glyphs(&glyphs, tree);
	reconcile_labelled(labels.into_iter().zip(glyphs), tree)
}

/// Reconciles glyphs whose labels are already known.
pub fn reconcile_labelled<G>(
	labelled: impl IntoIterator<Item = (Label, G)>,
	tree: &SpanTree,
) -> Vec<Group<G>> {
	let runs = group_runs(labelled);
	if runs.is_empty() {
		return Vec::new();
	}
	let runs = reorder_scripts(runs, tree);
	let labels: Vec<Label> = runs.iter().map(|(label, _)| *label).collect();
	let sources = assign_sources(&labels, tree);
	runs.into_iter()
		.zip(sources)
		.map(|((label, glyphs), source)| {
			let tex = source.slice(tree.source()).to_owned();
			Group::new(label, glyphs, source, tex)
		})
		.collect()
}

/// Packs adjacent glyphs with equal labels together.
fn group_runs<G>(labelled: impl IntoIterator<Item = (Label, G)>) -> Vec<(Label, Vec<G>)> {
	let mut runs: Vec<(Label, Vec<G>)> = Vec::new();
	for (label, glyph) in labelled {
		match runs.last_mut() {
			Some((current, glyphs)) if *current == label => glyphs.push(glyph),
			_ => runs.push((label, vec![glyph])),
		}
	}
	runs
}

/// Range of run indices covering every label inside `span`.
fn run_range(labels: &[Label], tree: &SpanTree, span: &Span) -> Option<Range<usize>> {
	let covered = tree.containing_labels(span)?;
	let mut hits = labels
		.iter()
		.enumerate()
		.filter(|(_, label)| covered.contains(label))
		.map(|(i, _)| i);
	let first = hits.next()?;
	let last = hits.last().unwrap_or(first);
	Some(first..last + 1)
}

/// Run ranges to exchange: a subscript directly followed by a superscript on
/// the same base, which the typesetter emits superscript first.
fn script_swaps(labels: &[Label], tree: &SpanTree) -> Vec<(Range<usize>, Range<usize>)> {
	let mut endpoints: Vec<(usize, Span, SpanKind)> = tree
		.registry()
		.script_spans()
		.flat_map(|(span, info)| [(span.start, span, info.kind), (span.end, span, info.kind)])
		.collect();
	endpoints.sort_by_key(|(index, span, _)| (*index, *span));

	let mut swaps = Vec::new();
	for pair in endpoints.windows(2) {
		let ((index_0, sub, kind_0), (index_1, sup, kind_1)) = (pair[0], pair[1]);
		if index_0 != index_1 || kind_0 != SpanKind::Subscript || kind_1 != SpanKind::Superscript {
			continue;
		}
		match (run_range(labels, tree, &sub), run_range(labels, tree, &sup)) {
			(Some(sub_runs), Some(sup_runs)) => swaps.push((sub_runs, sup_runs)),
			_ => warn!(%sub, %sup, "script pair has no rendered glyphs, not reordered"),
		}
	}
	swaps
}

/// Restores source order of adjacent subscript/superscript runs.
///
/// All swaps are located on the original run order and then applied to one
/// index permutation, innermost first, so that nested swaps move together
/// with the enclosing block.
fn reorder_scripts<G>(runs: Vec<(Label, Vec<G>)>, tree: &SpanTree) -> Vec<(Label, Vec<G>)> {
	let labels: Vec<Label> = runs.iter().map(|(label, _)| *label).collect();
	let mut swaps: Vec<(Range<usize>, Range<usize>)> = script_swaps(&labels, tree)
		.into_iter()
		.filter_map(|(a, b)| {
			let (first, second) = if a.start <= b.start { (a, b) } else { (b, a) };
			if first.end > second.start {
				warn!(?first, ?second, "script runs interleave, not reordered");
				return None;
			}
			Some((first, second))
		})
		.collect();
	if swaps.is_empty() {
		return runs;
	}
	swaps.sort_by_key(|(first, second)| (second.end, std::cmp::Reverse(first.start)));

	let mut order: Vec<usize> = (0..runs.len()).collect();
	for (first, second) in swaps {
		let swapped = [
			&order[..first.start],
			&order[second.clone()],
			&order[first.end..second.start],
			&order[first.clone()],
			&order[second.end..],
		]
		.concat();
		order = swapped;
	}
	trace!(?order, "script runs reordered");

	let mut slots: Vec<Option<(Label, Vec<G>)>> = runs.into_iter().map(Some).collect();
	order.into_iter().filter_map(|i| slots[i].take()).collect()
}

/// Assigns each run the slice of source it stands for.
///
/// A run's range is its label's span, or the wrapping script span if there
/// is one. Where a cyclic neighbour's label is nested inside that span, the
/// boundary is pulled in to the neighbour's span so the two slices abut. The
/// first run starts and the last run ends at their own span bounds.
fn assign_sources(labels: &[Label], tree: &SpanTree) -> Vec<Span> {
	let registry = tree.registry();
	let whole = Span::new(0, tree.source().len());
	let mut label_spans: HashMap<Label, Span> = HashMap::default();
	for (span, info) in registry.iter() {
		if info.kind.is_script() {
			label_spans.insert(info.label, *span);
		} else {
			label_spans.entry(info.label).or_insert(*span);
		}
	}
	let span_of = |label: Label| label_spans.get(&label).copied().unwrap_or(whole);

	let n = labels.len();
	let mut bounds: Vec<(usize, usize)> = (0..n)
		.map(|i| {
			let curr = span_of(labels[i]);
			let prev = labels[(i + n - 1) % n];
			let next = labels[(i + 1) % n];
			let inner = tree.containing_labels(&curr).unwrap_or_default();
			let start = if inner.contains(&prev) {
				span_of(prev).end
			} else {
				curr.start
			};
			let end = if inner.contains(&next) {
				span_of(next).start
			} else {
				curr.end
			};
			(start, end)
		})
		.collect();
	if let (Some(first), Some(last)) = (labels.first(), labels.last()) {
		bounds[0].0 = span_of(*first).start;
		bounds[n - 1].1 = span_of(*last).end;
	}
	bounds
		.into_iter()
		.map(|(start, end)| Span::new(start, end.max(start)))
		.collect()
}
