//! Addressable sub-expressions of rendered math markup.
//!
//! A source string is broken into labelled spans by [`mtex_parser`], every
//! labelled span is wrapped in a colour directive encoding its label, and the
//! annotated document is handed to a [`Renderer`]. The coloured glyphs that
//! come back are regrouped by label into [`Group`]s, which can then be looked
//! up by literal substring or byte range and recoloured independently.
//!
//! ```ignore
//! let cache = RenderCache::new();
//! let tex = MathTex::new(
//! 	r"x_a^b + \frac{1}{2}",
//! 	&TexOptions::default().isolate("+"),
//! 	&mut renderer,
//! 	&cache,
//! 	&TexConfig::default(),
//! )?;
//! let plus = tex.part_by_literal("+", 0)?;
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod expression;
pub mod query;
pub mod reconcile;
pub mod render;

pub use cache::{CacheKey, RenderCache, RenderMode};
pub use config::{ConfigError, TexConfig};
pub use error::{Error, QueryError, RenderError, Result};
pub use expression::{MathTex, ParsedExpression, TexOptions, parse};
pub use mtex_parser::{ParseError, SpanTree};
pub use mtex_primitives::{Label, Rgb, Span, SpanKind};
pub use query::Part;
pub use reconcile::Group;
pub use render::{BoxError, Glyph, Renderer};
