//! The raw interchange format.
//!
//! A raw document is a whitespace-separated list of strokes. Each stroke is
//! a run of unsigned 2-digit base-36 `x y` pairs with no separators and no
//! modifiers, e.g. `0000m8go` for `(0, 0) (800, 600)`.

use pest::Parser;
use pest::error::{InputLocation, LineColLocation};
use pest_derive::Parser;

use crate::ast::{FlatPoint, FlatSketch, FlatStroke};
use crate::defaults;
use crate::errors::{ErrorKind, Locate, ParseError, SerializeError, SourcePos};
use crate::lexer::Token;
use crate::log::{debug, warn};
use crate::numeral::{BASE36, Field};
use crate::parse::stroke_error;

#[derive(Parser)]
#[grammar = "raw.pest"]
pub struct RawParser;

const FIELDS: [Field; 2] = [Field::Unsigned(defaults::RAW_COORD_WIDTH); 2];

/// Parse a raw document into flat strokes.
pub fn parse(source: &str) -> Result<FlatSketch, ParseError> {
    let pairs = RawParser::parse(Rule::raw, source).map_err(|e| {
        let (row, col) = match e.line_col {
            LineColLocation::Pos(pos) | LineColLocation::Span(pos, _) => pos,
        };
        let offset = match e.location {
            InputLocation::Pos(at) | InputLocation::Span((at, _)) => at,
        };
        ParseError::new(ErrorKind::ForeignDigit)
            .or_pos(SourcePos::new(row, col), (offset, 0).into())
    })?;

    let mut strokes = Vec::new();
    for pair in pairs.flatten().filter(|p| p.as_rule() == Rule::stroke) {
        let (row, col) = pair.line_col();
        let span = pair.as_span();
        let token = Token::new(span.as_str(), SourcePos::new(row, col), span.start());

        let points = BASE36
            .decode_tuples(token.text, FIELDS, |[x, y]| FlatPoint::new(x as i32, y as i32))
            .map_err(stroke_error)
            .locate(&token)?;
        strokes.push(FlatStroke::new(points));
    }

    debug!(strokes = strokes.len(), "parsed raw sketch");
    Ok(FlatSketch::new(strokes))
}

/// Print strokes in the raw format, one stroke per space-separated run.
///
/// Markers have no raw representation and are left out.
pub fn to_string(sketch: &FlatSketch) -> Result<String, SerializeError> {
    if !sketch.markers.is_empty() {
        warn!(markers = sketch.markers.len(), "raw output drops markers");
    }

    let mut runs = Vec::with_capacity(sketch.strokes.len());
    for stroke in &sketch.strokes {
        if stroke.points.is_empty() {
            return Err(SerializeError::EmptyStroke);
        }
        let mut run = String::with_capacity(stroke.points.len() * 2 * defaults::RAW_COORD_WIDTH);
        for point in &stroke.points {
            run.push_str(&coordinate(point.x)?);
            run.push_str(&coordinate(point.y)?);
        }
        runs.push(run);
    }
    Ok(runs.join(" "))
}

fn coordinate(value: i32) -> Result<String, SerializeError> {
    let range = || SerializeError::CoordinateRange {
        value,
        width: defaults::RAW_COORD_WIDTH,
    };
    let value = u32::try_from(value).map_err(|_| range())?;
    BASE36
        .encode_fixed(value, defaults::RAW_COORD_WIDTH)
        .map_err(|_| range())
}
