//! Parsed and rendered expressions.

use std::ops::Range;

use indexmap::IndexMap;
use mtex_parser::{ParseError, SpanRegistry, SpanTree};
use mtex_primitives::{Label, Rgb, Span};
use rustc_hash::FxHashSet as HashSet;
use tracing::debug;

use crate::cache::{CacheKey, RenderCache, RenderMode};
use crate::config::TexConfig;
use crate::error::{QueryError, RenderError, Result};
use crate::query::{Part, decompose};
use crate::reconcile::{Group, label_glyphs, reconcile, reconcile_labelled};
use crate::render::{Glyph, Renderer};

/// Stand-in for an empty source, which the typesetter would reject.
const EMPTY_SOURCE: &str = r"\quad";

/// Per-expression isolation and colouring requests.
#[derive(Debug, Clone, Default)]
pub struct TexOptions {
	/// Literals to isolate as their own groups.
	pub isolate: Vec<String>,
	/// Literals to isolate and paint after rendering.
	pub color_map: IndexMap<String, Rgb>,
}

impl TexOptions {
	pub fn isolate(mut self, tex: impl Into<String>) -> Self {
		self.isolate.push(tex.into());
		self
	}

	pub fn color(mut self, tex: impl Into<String>, color: Rgb) -> Self {
		self.color_map.insert(tex.into(), color);
		self
	}
}

/// Parses `source`, isolating `color_map_keys` then `isolate`.
///
/// Fails before any renderer is involved.
pub fn parse<S: AsRef<str>, K: AsRef<str>>(
	source: &str,
	isolate: &[S],
	color_map_keys: &[K],
) -> std::result::Result<ParsedExpression, ParseError> {
	ParsedExpression::new(source, isolate, color_map_keys)
}

/// A source string broken into spans and annotated, ready to render.
#[derive(Debug, Clone)]
pub struct ParsedExpression {
	tree: SpanTree,
	annotated: String,
}

impl ParsedExpression {
	pub fn new<S: AsRef<str>, K: AsRef<str>>(
		source: &str,
		isolate: &[S],
		color_map_keys: &[K],
	) -> std::result::Result<Self, ParseError> {
		let source = match source.trim() {
			"" => EMPTY_SOURCE,
			trimmed => trimmed,
		};
		let mut substrings: Vec<&str> = Vec::new();
		for tex in color_map_keys
			.iter()
			.map(AsRef::as_ref)
			.chain(isolate.iter().map(AsRef::as_ref))
		{
			if !tex.is_empty() && !substrings.contains(&tex) {
				substrings.push(tex);
			}
		}
		let tree = SpanTree::parse(source, &substrings)?;
		let annotated = tree.annotated_expression()?;
		Ok(Self { tree, annotated })
	}

	#[inline]
	pub fn source(&self) -> &str {
		self.tree.source()
	}

	#[inline]
	pub fn span_tree(&self) -> &SpanTree {
		&self.tree
	}

	#[inline]
	pub fn registry(&self) -> &SpanRegistry {
		self.tree.registry()
	}

	#[inline]
	pub fn specified_substrings(&self) -> &[String] {
		self.tree.specified_substrings()
	}

	/// The source with a colour directive around every labelled span.
	#[inline]
	pub fn annotated_expression(&self) -> &str {
		&self.annotated
	}

	pub fn list_all_isolated_substrings(&self) -> Vec<String> {
		self.tree.all_isolated_substrings()
	}

	/// Renders the expression, or copies a cached result for the same document.
	///
	/// A plain render of the same labelled document is reused in either mode.
	pub fn render<R: Renderer>(
		self,
		renderer: &mut R,
		cache: &RenderCache<R::Glyph>,
		config: &TexConfig,
	) -> Result<MathTex<R::Glyph>> {
		let labelled_body = config.labelled_document_body(&self.annotated);
		let plain_key = CacheKey::new(&labelled_body, RenderMode::Plain);
		let groups = if config.plain_render {
			let plain_body = config.document_body(self.source());
			cache.get_or_try_insert_with(plain_key, || {
				self.render_plain(renderer, &labelled_body, &plain_body)
			})?
		} else if let Some(groups) = cache.get(&plain_key) {
			debug!("reusing plain render");
			groups
		} else {
			let key = CacheKey::new(&labelled_body, RenderMode::Labelled);
			cache.get_or_try_insert_with(key, || {
				let glyphs = compile(renderer, &labelled_body)?;
				Ok::<_, RenderError>(reconcile(glyphs, &self.tree))
			})?
		};
		Ok(MathTex {
			tree: self.tree,
			groups,
		})
	}

	/// Renders both documents and moves the labelled glyphs' labels onto the
	/// plain glyphs, position by position.
	fn render_plain<R: Renderer>(
		&self,
		renderer: &mut R,
		labelled_body: &str,
		plain_body: &str,
	) -> std::result::Result<Vec<Group<R::Glyph>>, RenderError> {
		let labelled = compile(renderer, labelled_body)?;
		let labels = label_glyphs(&labelled, &self.tree);
		let plain = compile(renderer, plain_body)?;
		if plain.len() != labels.len() {
			return Err(RenderError::GlyphCountMismatch {
				labelled: labels.len(),
				plain: plain.len(),
			});
		}
		Ok(reconcile_labelled(labels.into_iter().zip(plain), &self.tree))
	}
}

fn compile<R: Renderer>(
	renderer: &mut R,
	document: &str,
) -> std::result::Result<Vec<R::Glyph>, RenderError> {
	debug!(bytes = document.len(), "invoking renderer");
	renderer.compile(document).map_err(RenderError::Compile)
}

/// A rendered expression whose glyph groups can be addressed by source text.
#[derive(Debug, Clone)]
pub struct MathTex<G> {
	tree: SpanTree,
	groups: Vec<Group<G>>,
}

impl<G: Glyph> MathTex<G> {
	/// Parses, renders, and applies `options.color_map` in one step.
	pub fn new<R: Renderer<Glyph = G>>(
		source: &str,
		options: &TexOptions,
		renderer: &mut R,
		cache: &RenderCache<G>,
		config: &TexConfig,
	) -> Result<Self> {
		let keys: Vec<&str> = options.color_map.keys().map(String::as_str).collect();
		let parsed = ParsedExpression::new(source, &options.isolate, &keys)?;
		let mut tex = parsed.render(renderer, cache, config)?;
		tex.set_color_by_map(&options.color_map);
		Ok(tex)
	}

	#[inline]
	pub fn source(&self) -> &str {
		self.tree.source()
	}

	#[inline]
	pub fn span_tree(&self) -> &SpanTree {
		&self.tree
	}

	/// Groups in final order.
	#[inline]
	pub fn groups(&self) -> &[Group<G>] {
		&self.groups
	}

	#[inline]
	pub fn groups_mut(&mut self) -> &mut [Group<G>] {
		&mut self.groups
	}

	/// Source text of the group at `index`.
	pub fn group_tex(&self, index: usize) -> Option<&str> {
		self.groups.get(index).map(Group::tex)
	}

	#[inline]
	pub fn specified_substrings(&self) -> &[String] {
		self.tree.specified_substrings()
	}

	pub fn list_all_isolated_substrings(&self) -> Vec<String> {
		self.tree.all_isolated_substrings()
	}

	/// Selects the groups covered by the union of `spans`.
	///
	/// Unregistered spans contribute nothing.
	pub fn part_by_spans(&self, spans: &[Span]) -> Part {
		let labels: HashSet<Label> = spans
			.iter()
			.filter_map(|span| self.tree.containing_labels(span))
			.flatten()
			.copied()
			.collect();
		Part::covering(&self.groups, &labels)
	}

	/// Selects the groups for the source bytes `start..end`.
	///
	/// The range must be a registered span or tile exactly into registered spans.
	pub fn part_by_range(&self, start: usize, end: usize) -> Result<Part> {
		let source = self.source();
		if start > end
			|| end > source.len()
			|| !source.is_char_boundary(start)
			|| !source.is_char_boundary(end)
		{
			return Err(QueryError::InvalidRange {
				start,
				end,
				len: source.len(),
			}
			.into());
		}
		let target = Span::new(start, end);
		if self.tree.registry().contains(&target) {
			return Ok(self.part_by_spans(&[target]));
		}
		let tiles = decompose(self.tree.registry(), target).ok_or_else(|| {
			QueryError::NoSpanCoverage {
				tex: target.slice(source).to_owned(),
			}
		})?;
		Ok(self.part_by_spans(&tiles))
	}

	/// Selects the groups for every occurrence of `tex`, in source order.
	pub fn parts_by_literal(&self, tex: &str) -> Result<Vec<Part>> {
		let occurrences: Vec<Span> = if tex.is_empty() {
			Vec::new()
		} else {
			self.source()
				.match_indices(tex)
				.map(|(start, m)| Span::new(start, start + m.len()))
				.collect()
		};
		if occurrences.is_empty() {
			return Err(QueryError::SubstringNotFound {
				tex: tex.to_owned(),
				index: 0,
				count: 0,
			}
			.into());
		}
		occurrences
			.into_iter()
			.map(|span| self.part_by_range(span.start, span.end))
			.collect()
	}

	/// Selects the groups for occurrence `index` of `tex`.
	pub fn part_by_literal(&self, tex: &str, index: usize) -> Result<Part> {
		let parts = self.parts_by_literal(tex)?;
		let count = parts.len();
		parts.into_iter().nth(index).ok_or_else(|| {
			QueryError::SubstringNotFound {
				tex: tex.to_owned(),
				index,
				count,
			}
			.into()
		})
	}

	/// Positions of the part's groups in the final order.
	pub fn indices_of(&self, part: &Part) -> Result<Vec<usize>> {
		if part.is_empty() {
			return Err(QueryError::EmptyPart.into());
		}
		Ok(part.indices().to_vec())
	}

	/// Smallest contiguous index range holding the part's groups.
	pub fn range_of(&self, part: &Part) -> Result<Range<usize>> {
		let indices = self.indices_of(part)?;
		Ok(indices[0]..indices[indices.len() - 1] + 1)
	}

	/// Position of the part's first group.
	pub fn index_of(&self, part: &Part) -> Result<usize> {
		Ok(self.indices_of(part)?[0])
	}

	pub fn indices_of_literal(&self, tex: &str, index: usize) -> Result<Vec<usize>> {
		self.indices_of(&self.part_by_literal(tex, index)?)
	}

	/// Indices for every occurrence of `tex`, concatenated in occurrence order.
	pub fn indices_of_all_literals(&self, tex: &str) -> Result<Vec<usize>> {
		let mut out = Vec::new();
		for part in self.parts_by_literal(tex)? {
			out.extend(self.indices_of(&part)?);
		}
		Ok(out)
	}

	pub fn range_of_literal(&self, tex: &str, index: usize) -> Result<Range<usize>> {
		self.range_of(&self.part_by_literal(tex, index)?)
	}

	pub fn index_of_literal(&self, tex: &str, index: usize) -> Result<usize> {
		self.index_of(&self.part_by_literal(tex, index)?)
	}

	/// Repaints the groups of a part.
	pub fn set_part_color(&mut self, part: &Part, color: Rgb) {
		for &i in part.indices() {
			if let Some(group) = self.groups.get_mut(i) {
				group.set_color(color);
			}
		}
	}

	/// Repaints every occurrence of `tex`.
	pub fn set_color_by_literal(&mut self, tex: &str, color: Rgb) -> Result<()> {
		for part in self.parts_by_literal(tex)? {
			self.set_part_color(&part, color);
		}
		Ok(())
	}

	/// Repaints each entry's literal, skipping entries that cannot be resolved.
	pub fn set_color_by_map(&mut self, color_map: &IndexMap<String, Rgb>) {
		for (tex, color) in color_map {
			if let Err(error) = self.set_color_by_literal(tex, *color) {
				debug!(tex = %tex, %error, "colour map entry not applied");
			}
		}
	}

	/// Logs the source text of every group, for matching indices to groups.
	pub fn log_groups(&self) {
		debug!(source = %self.source(), "groups of expression");
		for (index, group) in self.groups.iter().enumerate() {
			debug!(index, tex = %group.tex(), label = %group.label(), "group");
		}
	}
}
