//! Error types with rich diagnostics using miette
//!
//! Parse errors carry the position of the token that triggered them so the
//! report can point at the offending source.

use std::fmt;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::lexer::Token;
use crate::numeral::NumeralError;

/// Line and column of a token, both 1-indexed.
///
/// `(0, 0)` stands for an unknown position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SourcePos {
    pub row: usize,
    pub col: usize,
}

impl SourcePos {
    pub const UNKNOWN: SourcePos = SourcePos { row: 0, col: 0 };
    pub const START: SourcePos = SourcePos { row: 1, col: 1 };

    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn is_known(self) -> bool {
        self.row != 0
    }

    /// Step past `c`.
    pub fn advance(&mut self, c: char) {
        if c == '\n' {
            self.row += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
    }
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_known() {
            return write!(f, "unknown position");
        }
        write!(f, "{}", self.row)?;
        if self.col > 0 {
            write!(f, ":{}", self.col)?;
        }
        Ok(())
    }
}

/// Source context for error reporting
#[derive(Debug, Clone)]
pub struct SourceContext {
    /// Name of the source (filename or "<input>")
    pub name: String,
    /// The full source text
    pub source: String,
}

impl SourceContext {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Create a NamedSource for miette
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.name, self.source.clone())
    }

    /// Attach this source to a parse error for display.
    pub fn report(&self, error: ParseError) -> miette::Report {
        miette::Report::new(SketchDiagnostic {
            help: error.kind.help(),
            kind: error.kind,
            pos: error.pos,
            src: self.named_source(),
            span: error.span,
        })
    }
}

// ============================================================================
// Parse Errors
// ============================================================================

/// What went wrong while lexing or parsing a document.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // Lexical
    #[error("string literal is never closed")]
    UnbalancedString,

    // Structural
    #[error("document is empty")]
    EmptyFile,
    #[error("document is not terminated by ';'")]
    MissingSemicolon,
    #[error("expected a string literal")]
    MissingString,
    #[error("element is empty")]
    EmptyElement,
    #[error("unknown element type")]
    UnknownElementType,
    #[error("unknown modifier type")]
    UnknownModifierType,
    #[error("expected '['")]
    MissingBracketLeft,
    #[error("bracket is never closed")]
    MissingBracketRight,
    #[error("closing bracket does not match")]
    MismatchingParens,

    // Atoms
    #[error("wrong number of tokens for an atom")]
    AtomSize,
    #[error("stroke digits are not a whole number of points")]
    StrokeLength,
    #[error("misplaced tick mark between points")]
    TickmarkOrdering,

    // Numbers
    #[error("unexpected digit")]
    ForeignDigit,
    #[error("number has the wrong number of digits")]
    NumberSize,
    #[error("sign character is not allowed here")]
    SignCharacter,
    #[error("malformed number")]
    NumberError,

    // Modifiers
    #[error("Affine takes exactly 9 numbers")]
    ModAffineSize,
    #[error("malformed Affine parameters")]
    MalformedModAffine,
    #[error("Array takes a count and an Affine")]
    ModArraySize,
    #[error("malformed Array parameters")]
    MalformedModArray,
    #[error("Uppercase takes no parameters")]
    ModUppercaseSize,
    #[error("malformed Uppercase parameters")]
    MalformedModUppercase,
}

impl ErrorKind {
    pub fn help(self) -> Option<String> {
        let help = match self {
            ErrorKind::MissingSemicolon => "end the document with ';'",
            ErrorKind::UnknownElementType => {
                "elements are Brush, Pencil, Data, Raw or Marker (case-sensitive)"
            }
            ErrorKind::UnknownModifierType => {
                "stroke elements take Affine or Array, markers take Uppercase"
            }
            ErrorKind::TickmarkOrdering => {
                "ticks go between points: no leading, trailing or doubled '"
            }
            ErrorKind::ModAffineSize => "write the 3x3 matrix row by row: Affine[ a b c d e f g h i ]",
            ErrorKind::ModArraySize | ErrorKind::MalformedModArray => {
                "write Array[ count Affine[ a b c d e f g h i ] ]"
            }
            ErrorKind::SignCharacter => "drop the '+' or '-'",
            _ => return None,
        };
        Some(help.to_string())
    }
}

impl From<NumeralError> for ErrorKind {
    fn from(e: NumeralError) -> Self {
        match e {
            NumeralError::ForeignDigit(_) => ErrorKind::ForeignDigit,
            NumeralError::StringSize(_) => ErrorKind::NumberSize,
            NumeralError::IntegerSize => ErrorKind::NumberError,
        }
    }
}

/// A lexing or parsing failure, located in the source when possible.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{kind} at {pos}")]
pub struct ParseError {
    pub kind: ErrorKind,
    pub pos: SourcePos,
    pub span: Option<SourceSpan>,
}

impl ParseError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            pos: SourcePos::UNKNOWN,
            span: None,
        }
    }

    pub fn at(kind: ErrorKind, token: &Token<'_>) -> Self {
        Self::new(kind).or_at(token)
    }

    /// Take the position of `token` unless one is already set.
    pub fn or_at(self, token: &Token<'_>) -> Self {
        self.or_pos(token.pos, token.span())
    }

    pub fn or_pos(mut self, pos: SourcePos, span: SourceSpan) -> Self {
        if !self.pos.is_known() {
            self.pos = pos;
            self.span = Some(span);
        }
        self
    }
}

impl From<ErrorKind> for ParseError {
    fn from(kind: ErrorKind) -> Self {
        ParseError::new(kind)
    }
}

impl From<NumeralError> for ParseError {
    fn from(e: NumeralError) -> Self {
        ParseError::new(e.into())
    }
}

/// Locate any parser-convertible error at a token.
pub(crate) trait Locate<T> {
    fn locate(self, token: &Token<'_>) -> Result<T, ParseError>;
}

impl<T, E: Into<ParseError>> Locate<T> for Result<T, E> {
    fn locate(self, token: &Token<'_>) -> Result<T, ParseError> {
        self.map_err(|e| e.into().or_at(token))
    }
}

/// A parse error bundled with its source, for terminal output.
#[derive(Error, Diagnostic, Debug)]
#[error("{kind} at {pos}")]
#[diagnostic(code(hsc::parse))]
pub struct SketchDiagnostic {
    pub kind: ErrorKind,
    pub pos: SourcePos,
    #[source_code]
    pub src: NamedSource<String>,
    #[label("here")]
    pub span: Option<SourceSpan>,
    #[help]
    pub help: Option<String>,
}

// ============================================================================
// Serialize Errors
// ============================================================================

/// Values the text format cannot represent.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum SerializeError {
    #[error("coordinate {value} does not fit in {width} base-36 digits")]
    #[diagnostic(code(hsc::serialize::coordinate_range))]
    CoordinateRange { value: i32, width: usize },

    #[error("diameter {value} does not fit in 2 base-36 digits")]
    #[diagnostic(code(hsc::serialize::diameter_range))]
    DiameterRange { value: u32 },

    #[error("modifier parameter {value} cannot be written as a decimal literal")]
    #[diagnostic(code(hsc::serialize::parameter_range))]
    ParameterRange { value: f64 },

    #[error("array count {count} is above the largest count a document may hold")]
    #[diagnostic(code(hsc::serialize::array_count))]
    ArrayCount { count: usize },

    #[error("stroke has no points")]
    #[diagnostic(
        code(hsc::serialize::empty_stroke),
        help("a stroke needs at least one point to be written out")
    )]
    EmptyStroke,

    #[error("marker text {text:?} would not read back as one string")]
    #[diagnostic(
        code(hsc::serialize::unbalanced_marker),
        help("parentheses inside marker text must balance")
    )]
    UnbalancedMarker { text: String },
}
