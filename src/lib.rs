//! Parser, serializer and geometry core for `.hsc` sketch documents.
//!
//! A document is a list of elements made of pen strokes or text markers,
//! each followed by modifiers that transform it:
//!
//! ```text
//! % a square, repeated three times to the right
//! Data[ 000000'00a000'00a00a'00000a'000000 ]
//!     Array[ 3 Affine[ 1 0 20 0 1 0 0 0 1 ] ],
//! Marker (squares) Uppercase[ ];
//! ```
//!
//! [`parse`] turns text into a [`Sketch`], [`Sketch::flatten`] resolves the
//! modifiers into a [`FlatSketch`] for a renderer, and [`serialize`] writes a
//! [`Sketch`] back out.

pub mod ast;
pub mod defaults;
pub mod errors;
mod flatten;
pub mod lexer;
pub mod log;
pub mod modifiers;
pub mod numeral;
pub mod parse;
pub mod raw;
pub mod serialize;
pub mod transform;

pub use ast::{
    Element, FlatPoint, FlatSketch, FlatStroke, Marker, MarkerElement, Point, Sketch, Stroke,
    StrokeElement,
};
pub use errors::{ErrorKind, ParseError, SerializeError, SourceContext, SourcePos};
pub use parse::parse;
pub use serialize::serialize;
pub use transform::Affine;

/// Parse and flatten a document in one call.
///
/// Errors come back as a [`miette::Report`] with the source attached, ready
/// to print.
pub fn flatten_source(source: &str) -> Result<FlatSketch, miette::Report> {
    let sketch = parse(source).map_err(|e| SourceContext::new("<input>", source).report(e))?;
    Ok(sketch.flatten())
}
