//! Hand-written tokenizer for sketch documents.
//!
//! A single pass over the characters drives a small state machine. Tokens
//! are emitted when the state changes, borrow the source text, and remember
//! where they started for diagnostics.

use std::fmt::Write;

use miette::SourceSpan;

use crate::errors::{ErrorKind, ParseError, SourcePos};
use crate::log::{debug, trace};

/// A slice of the source plus where it starts.
///
/// Tokens compare by text only.
#[derive(Debug, Clone, Copy)]
pub struct Token<'src> {
    pub text: &'src str,
    pub pos: SourcePos,
    /// Byte offset of the first character.
    pub offset: usize,
}

impl<'src> Token<'src> {
    pub fn new(text: &'src str, pos: SourcePos, offset: usize) -> Self {
        Self { text, pos, offset }
    }

    /// A token with no source location, for comparisons.
    pub fn bare(text: &'src str) -> Self {
        Self::new(text, SourcePos::UNKNOWN, 0)
    }

    pub fn span(&self) -> SourceSpan {
        SourceSpan::from((self.offset, self.text.len()))
    }

    /// `(` ... `)` including the parentheses.
    pub fn is_string_literal(&self) -> bool {
        self.text.len() >= 2 && self.text.starts_with('(') && self.text.ends_with(')')
    }
}

impl PartialEq for Token<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for Token<'_> {}

impl PartialEq<str> for Token<'_> {
    fn eq(&self, other: &str) -> bool {
        self.text == other
    }
}

impl PartialEq<&str> for Token<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.text == *other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    LineStart,
    Comment,
    Space,
    /// Numbers, digit runs and keywords.
    Token,
    String,
    StringEnd,
    Operator,
    End,
}

fn is_newline(c: char) -> bool {
    matches!(c, '\n' | '\r')
}

fn is_operator(c: char) -> bool {
    matches!(c, '[' | ']' | ',' | ';')
}

/// Next state after reading `c` in `state`. Tracks string nesting.
fn step(state: State, c: char, depth: &mut usize) -> State {
    match state {
        State::LineStart if c == '%' => return State::Comment,
        State::Comment => {
            return if is_newline(c) {
                State::LineStart
            } else {
                State::Comment
            };
        }
        State::String => {
            if c == '(' {
                *depth += 1;
            }
            if c == ')' {
                *depth = depth.saturating_sub(1);
                if *depth == 0 {
                    return State::StringEnd;
                }
            }
            return State::String;
        }
        _ => {}
    }

    if is_newline(c) {
        State::LineStart
    } else if c.is_whitespace() {
        State::Space
    } else if is_operator(c) {
        State::Operator
    } else if c == '(' {
        State::String
    } else {
        State::Token
    }
}

/// Split `source` into tokens, stopping after the first `;`.
pub fn tokenize(source: &str) -> Result<Vec<Token<'_>>, ParseError> {
    let mut tokens = Vec::new();

    let mut prev = State::LineStart;
    let mut pos = SourcePos::START;
    let mut start = 0;
    let mut start_pos = pos;
    let mut depth = 0;
    let mut operator: Option<(usize, SourcePos)> = None;

    let chars = source
        .char_indices()
        .map(|(i, c)| (i, Some(c)))
        .chain(std::iter::once((source.len(), None)));

    for (i, c) in chars {
        let next = match c {
            Some(c) => step(prev, c, &mut depth),
            None => State::End,
        };

        if prev == State::Operator {
            if let Some((at, at_pos)) = operator.take() {
                let token = Token::new(&source[at..at + 1], at_pos, at);
                tokens.push(token);
                if token == ";" {
                    debug!(count = tokens.len(), "tokenized up to terminator");
                    return Ok(tokens);
                }
            }
        }
        if next == State::Operator {
            operator = Some((i, pos));
        }

        if prev != next {
            if prev == State::Token {
                tokens.push(Token::new(&source[start..i], start_pos, start));
            }
            if next == State::Token {
                start = i;
                start_pos = pos;
            }
            if next == State::String {
                start = i;
                start_pos = pos;
                depth = 1;
            }
            if next == State::StringEnd {
                tokens.push(Token::new(&source[start..i + 1], start_pos, start));
            }
            if prev == State::String && next == State::End {
                trace!(%start_pos, "string literal runs to end of input");
                return Err(ParseError::new(ErrorKind::UnbalancedString)
                    .or_pos(pos, SourceSpan::from((start, source.len() - start))));
            }
        }

        if let Some(c) = c {
            pos.advance(c);
        }
        prev = next;
    }

    debug!(count = tokens.len(), "tokenized whole input");
    Ok(tokens)
}

/// One line per token, `text @ row:col`, or the lexing error.
pub fn dump_tokens(source: &str) -> String {
    match tokenize(source) {
        Ok(tokens) => {
            let mut out = String::new();
            for (i, token) in tokens.iter().enumerate() {
                if i > 0 {
                    out.push('\n');
                }
                let _ = write!(out, "{} @ {}", token.text, token.pos);
            }
            out
        }
        Err(e) => format!("error: {e}"),
    }
}
