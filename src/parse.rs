//! Build a [`Sketch`] from lexer tokens
//!
//! ```text
//! Sketch         := Element (',' Element)* ';'
//! Element        := Tag '[' Atom* ']' StrokeModifier*
//!                 | 'Marker' String MarkerModifier*
//! Tag            := 'Brush' | 'Pencil' | 'Data' | 'Raw'
//! StrokeModifier := 'Affine' '[' Number x9 ']'
//!                 | 'Array' '[' Integer 'Affine' '[' Number x9 ']' ']'
//! MarkerModifier := 'Uppercase' '[' ']'
//! ```

use crate::ast::{
    Element, FlatPoint, FlatStroke, Marker, MarkerElement, Point, Sketch, Stroke, StrokeElement,
};
use crate::defaults;
use crate::errors::{ErrorKind, Locate, ParseError};
use crate::lexer::{Token, tokenize};
use crate::log::{debug, trace};
use crate::modifiers::{Array, MarkerModifier, StrokeModifier, Uppercase};
use crate::numeral::{BASE10, BASE36, Field, Numeral, NumeralError};
use crate::transform::Affine;

/// Bracket pairs that nest inside modifier parameters.
const BRACKETS: [(&str, &str); 1] = [("[", "]")];

/// Parse a whole document.
pub fn parse(source: &str) -> Result<Sketch, ParseError> {
    let tokens = tokenize(source)?;
    parse_tokens(&tokens)
}

/// Parse an already tokenized document.
pub fn parse_tokens(tokens: &[Token<'_>]) -> Result<Sketch, ParseError> {
    let Some(last) = tokens.last() else {
        return Err(ErrorKind::EmptyFile.into());
    };
    let Some(end) = tokens.iter().position(|t| *t == ";") else {
        return Err(ParseError::at(ErrorKind::MissingSemicolon, last));
    };

    let body = &tokens[..end];
    let mut elements = Vec::new();
    if body.is_empty() {
        return Ok(Sketch::new(elements));
    }

    // tokens[start] always exists: at worst it is the ';' itself.
    let mut start = 0;
    loop {
        let stop = body[start..]
            .iter()
            .position(|t| *t == ",")
            .map_or(body.len(), |i| start + i);

        let element = parse_element(&body[start..stop]).map_err(|e| e.or_at(&tokens[start]))?;
        elements.push(element);

        if stop == body.len() {
            break;
        }
        start = stop + 1;
    }

    debug!(elements = elements.len(), "parsed sketch");
    Ok(Sketch::new(elements))
}

fn parse_element(tokens: &[Token<'_>]) -> Result<Element, ParseError> {
    let Some((tag, rest)) = tokens.split_first() else {
        return Err(ErrorKind::EmptyElement.into());
    };
    debug!(tag = tag.text, pos = %tag.pos, "parsing element");

    match tag.text {
        "Brush" => parse_stroke_element(rest, 2, brush_atom).map(Element::Brush),
        "Pencil" => parse_stroke_element(rest, 1, flat_atom).map(Element::Pencil),
        "Data" => parse_stroke_element(rest, 1, flat_atom).map(Element::Data),
        "Raw" => parse_stroke_element(rest, 1, raw_atom).map(Element::Data),
        "Marker" => parse_marker_element(rest).map(Element::Marker),
        _ => Err(ParseError::at(ErrorKind::UnknownElementType, tag)),
    }
}

// ============================================================================
// Elements
// ============================================================================

/// `[ atoms ] modifiers`, with `arity` tokens per atom.
fn parse_stroke_element<'src, S>(
    tokens: &[Token<'src>],
    arity: usize,
    atom: impl Fn(&[Token<'src>]) -> Result<S, ParseError>,
) -> Result<StrokeElement<S>, ParseError> {
    let Some(open) = tokens.first() else {
        return Err(ErrorKind::EmptyElement.into());
    };
    if *open != "[" {
        return Err(ParseError::at(ErrorKind::MissingBracketLeft, open));
    }

    let mut at = 0;
    let contents = match group(tokens, &mut at)? {
        Group::Brackets(contents) => contents,
        Group::Literal(token) => return Err(ParseError::at(ErrorKind::MissingBracketLeft, token)),
    };
    if contents.len() % arity != 0 {
        return Err(ParseError::at(ErrorKind::AtomSize, open));
    }

    let strokes = contents
        .chunks(arity)
        .map(&atom)
        .collect::<Result<Vec<_>, _>>()?;
    let modifiers = parse_stroke_modifiers(&tokens[at..])?;

    Ok(StrokeElement { strokes, modifiers })
}

fn parse_marker_element(tokens: &[Token<'_>]) -> Result<MarkerElement, ParseError> {
    let Some((literal, rest)) = tokens.split_first() else {
        return Err(ErrorKind::EmptyElement.into());
    };
    if !literal.is_string_literal() {
        return Err(ParseError::at(ErrorKind::MissingString, literal));
    }

    let text = &literal.text[1..literal.text.len() - 1];
    Ok(MarkerElement {
        marker: Marker::new(text),
        modifiers: parse_marker_modifiers(rest)?,
    })
}

// ============================================================================
// Atoms
// ============================================================================

/// Diameter token, then `x:3 y:3 p:2` records.
fn brush_atom(atom: &[Token<'_>]) -> Result<Stroke, ParseError> {
    let [diameter, digits] = atom else {
        return Err(ErrorKind::AtomSize.into());
    };

    let diameter = BASE36
        .decode_fixed_lenient::<u32>(&diameter.text.to_ascii_lowercase(), defaults::DIAMETER_WIDTH)
        .locate(diameter)?;

    let points = BASE36
        .decode_tuples(
            &remove_ticks(digits)?,
            [
                Field::Signed(defaults::COORD_WIDTH),
                Field::Signed(defaults::COORD_WIDTH),
                Field::Unsigned(defaults::PRESSURE_WIDTH),
            ],
            |[x, y, p]| Point::new(x as i32, y as i32, p as f32 / defaults::PRESSURE_SCALE),
        )
        .map_err(stroke_error)
        .locate(digits)?;

    Ok(Stroke::new(diameter, points))
}

/// `x:3 y:3` signed records.
fn flat_atom(atom: &[Token<'_>]) -> Result<FlatStroke, ParseError> {
    flat_records(atom, Field::Signed(defaults::COORD_WIDTH))
}

/// `x:2 y:2` unsigned records, widened.
fn raw_atom(atom: &[Token<'_>]) -> Result<FlatStroke, ParseError> {
    flat_records(atom, Field::Unsigned(defaults::RAW_COORD_WIDTH))
}

fn flat_records(atom: &[Token<'_>], field: Field) -> Result<FlatStroke, ParseError> {
    let [digits] = atom else {
        return Err(ErrorKind::AtomSize.into());
    };

    let points = BASE36
        .decode_tuples(&remove_ticks(digits)?, [field, field], |[x, y]| {
            FlatPoint::new(x as i32, y as i32)
        })
        .map_err(stroke_error)
        .locate(digits)?;

    Ok(FlatStroke::new(points))
}

/// A stroke run that is not a whole number of records is a length problem,
/// not a number problem.
pub(crate) fn stroke_error(e: NumeralError) -> ErrorKind {
    match e {
        NumeralError::StringSize(_) => ErrorKind::StrokeLength,
        other => other.into(),
    }
}

/// Strip tick marks from a stroke run and lowercase it.
///
/// Ticks may only separate points: none at either end and never two in a row.
fn remove_ticks(token: &Token<'_>) -> Result<String, ParseError> {
    let text = token.text;
    let doubled = [defaults::TICK, defaults::TICK].iter().collect::<String>();
    if text.starts_with(defaults::TICK) || text.ends_with(defaults::TICK) || text.contains(&doubled)
    {
        return Err(ParseError::at(ErrorKind::TickmarkOrdering, token));
    }

    Ok(text
        .chars()
        .filter(|&c| c != defaults::TICK)
        .map(|c| c.to_ascii_lowercase())
        .collect())
}

// ============================================================================
// Modifiers
// ============================================================================

fn parse_stroke_modifiers(tokens: &[Token<'_>]) -> Result<Vec<StrokeModifier>, ParseError> {
    let mut modifiers = Vec::new();
    let mut at = 0;

    while let Some(tag) = tokens.get(at) {
        at += 1;
        let modifier = match tag.text {
            "Affine" => parse_affine(group(tokens, &mut at).map_err(|e| e.or_at(tag))?),
            "Array" => parse_array(group(tokens, &mut at).map_err(|e| e.or_at(tag))?),
            _ => return Err(ParseError::at(ErrorKind::UnknownModifierType, tag)),
        }
        .map_err(|e| e.or_at(tag))?;

        trace!(?modifier, "parsed stroke modifier");
        modifiers.push(modifier);
    }

    Ok(modifiers)
}

fn parse_marker_modifiers(tokens: &[Token<'_>]) -> Result<Vec<MarkerModifier>, ParseError> {
    let mut modifiers = Vec::new();
    let mut at = 0;

    while let Some(tag) = tokens.get(at) {
        at += 1;
        let modifier = match tag.text {
            "Uppercase" => parse_uppercase(group(tokens, &mut at).map_err(|e| e.or_at(tag))?),
            _ => return Err(ParseError::at(ErrorKind::UnknownModifierType, tag)),
        }
        .map_err(|e| e.or_at(tag))?;

        trace!(?modifier, "parsed marker modifier");
        modifiers.push(modifier);
    }

    Ok(modifiers)
}

fn parse_affine(params: Group<'_, '_>) -> Result<StrokeModifier, ParseError> {
    match params {
        Group::Brackets(contents) => Ok(parse_matrix(contents)?.into()),
        Group::Literal(token) => Err(ParseError::at(ErrorKind::MalformedModAffine, token)),
    }
}

/// Nine numbers, row-major.
fn parse_matrix(contents: &[Token<'_>]) -> Result<Affine, ParseError> {
    if let Some(bracket) = contents.iter().find(|t| bracket_kind(t).is_some()) {
        return Err(ParseError::at(ErrorKind::MalformedModAffine, bracket));
    }
    if contents.len() != 9 {
        return Err(ErrorKind::ModAffineSize.into());
    }

    let mut rows = [0.0; 9];
    for (slot, token) in rows.iter_mut().zip(contents) {
        *slot = parse_float(token)?;
    }
    Ok(Affine::from_rows(rows))
}

/// `count Affine [ a b c d e f g h i ]`
fn parse_array(params: Group<'_, '_>) -> Result<StrokeModifier, ParseError> {
    let contents = match params {
        Group::Brackets(contents) => contents,
        Group::Literal(token) => return Err(ParseError::at(ErrorKind::MalformedModArray, token)),
    };
    let [count, tag, open, matrix @ .., close] = contents else {
        return Err(ErrorKind::ModArraySize.into());
    };
    if matrix.len() != 9 {
        return Err(ErrorKind::ModArraySize.into());
    }

    let count = match parse_integer::<usize>(count)? {
        n if n > defaults::MAX_ARRAY_COUNT => {
            return Err(ParseError::at(ErrorKind::NumberSize, count));
        }
        n => n,
    };
    if *tag != "Affine" || *open != "[" || *close != "]" {
        return Err(ParseError::at(ErrorKind::MalformedModArray, tag));
    }
    let transform = parse_matrix(matrix).map_err(|e| e.or_at(tag))?;

    Ok(Array::new(count, transform).into())
}

fn parse_uppercase(params: Group<'_, '_>) -> Result<MarkerModifier, ParseError> {
    match params {
        Group::Brackets([]) => Ok(Uppercase.into()),
        Group::Brackets([first, ..]) => Err(ParseError::at(ErrorKind::ModUppercaseSize, first)),
        Group::Literal(token) => Err(ParseError::at(ErrorKind::MalformedModUppercase, token)),
    }
}

// ============================================================================
// Groups
// ============================================================================

/// Parameters following a modifier tag.
#[derive(Debug, Clone, Copy)]
enum Group<'t, 'src> {
    /// Tokens strictly inside a bracket pair.
    Brackets(&'t [Token<'src>]),
    /// A string literal standing in for a bracket group.
    Literal(&'t Token<'src>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Open,
    Close,
}

fn bracket_kind(token: &Token<'_>) -> Option<(usize, Side)> {
    BRACKETS.iter().enumerate().find_map(|(kind, &(open, close))| {
        if *token == open {
            Some((kind, Side::Open))
        } else if *token == close {
            Some((kind, Side::Close))
        } else {
            None
        }
    })
}

/// Read the group starting at `tokens[*at]` and move `at` past it.
///
/// Nesting is checked with an explicit stack.
fn group<'t, 'src>(tokens: &'t [Token<'src>], at: &mut usize) -> Result<Group<'t, 'src>, ParseError> {
    let Some(first) = tokens.get(*at) else {
        return Err(ErrorKind::MissingBracketLeft.into());
    };
    if first.is_string_literal() {
        *at += 1;
        return Ok(Group::Literal(first));
    }
    if !matches!(bracket_kind(first), Some((_, Side::Open))) {
        return Err(ParseError::at(ErrorKind::MissingBracketLeft, first));
    }

    let start = *at;
    let mut stack: Vec<(usize, &Token<'src>)> = Vec::new();
    while let Some(token) = tokens.get(*at) {
        *at += 1;
        match bracket_kind(token) {
            Some((kind, Side::Open)) => stack.push((kind, token)),
            Some((kind, Side::Close)) => match stack.pop() {
                Some((open, _)) if open == kind => {}
                _ => return Err(ParseError::at(ErrorKind::MismatchingParens, token)),
            },
            None => {}
        }
        if stack.is_empty() {
            return Ok(Group::Brackets(&tokens[start + 1..*at - 1]));
        }
    }

    match stack.last() {
        Some((_, open)) => Err(ParseError::at(ErrorKind::MissingBracketRight, open)),
        None => Err(ErrorKind::MissingBracketRight.into()),
    }
}

// ============================================================================
// Numbers
// ============================================================================

/// A base-10 integer literal.
///
/// Signed targets take no sign character. Unsigned targets accept `+` and
/// `-`, but only zero survives negation.
pub fn parse_integer<T: Numeral>(token: &Token<'_>) -> Result<T, ParseError> {
    integer_value(token.text).locate(token)
}

/// A decimal literal: optional sign, digits, at most one `.`.
pub fn parse_float(token: &Token<'_>) -> Result<f64, ParseError> {
    float_value(token.text).locate(token)
}

fn split_sign(text: &str) -> (Option<bool>, &str) {
    match text.as_bytes().first() {
        Some(b'+') => (Some(false), &text[1..]),
        Some(b'-') => (Some(true), &text[1..]),
        _ => (None, text),
    }
}

fn integer_value<T: Numeral>(text: &str) -> Result<T, ErrorKind> {
    let (sign, digits) = split_sign(text);
    if sign.is_some() && T::SIGNED {
        return Err(ErrorKind::SignCharacter);
    }

    let magnitude: T = BASE10.decode_variable(digits)?;
    if sign == Some(true) && magnitude.to_i128() != 0 {
        return Err(ErrorKind::NumberSize);
    }
    Ok(magnitude)
}

fn float_value(text: &str) -> Result<f64, ErrorKind> {
    let (sign, body) = split_sign(text);

    let value = match body.split_once('.') {
        None => integer_value::<u64>(body)? as f64,
        Some((_, tail)) if tail.contains('.') => return Err(ErrorKind::ForeignDigit),
        Some(("", "")) => return Err(ErrorKind::NumberSize),
        Some((head, tail)) => {
            let head = if head.is_empty() {
                0
            } else {
                integer_value::<u64>(head)?
            };

            let tail = tail.trim_end_matches('0');
            if tail.chars().any(|c| !BASE10.is_digit(c)) {
                return Err(ErrorKind::ForeignDigit);
            }
            // Digits past what a u64 holds cannot change an f64.
            let tail = &tail[..tail.len().min(BASE10.max_digit_count(u64::BITS))];

            format!("{head}.{tail}0")
                .parse::<f64>()
                .map_err(|_| ErrorKind::NumberError)?
        }
    };

    Ok(if sign == Some(true) { -value } else { value })
}
