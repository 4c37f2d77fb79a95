//! Parser error types.

use crate::machine::State;
use crate::source::TextPosition;
use std::error::Error;
use std::fmt;
use std::io;

/// What went wrong, structurally.
#[derive(Debug, thiserror::Error)]
pub enum TtlSyntaxErrorKind {
    /// The character is not permitted in the current parser state.
    #[error("character '{char}' is not permitted at {state}")]
    UnexpectedCharacter { state: State, char: char },
    /// The document ended in a non-terminal state.
    #[error("unexpected end of file at {state} with {stack_depth} open frame(s)")]
    UnexpectedEof { state: State, stack_depth: usize },
    /// A disallowed character, bad escape or failed base resolution in an IRI reference.
    #[error("invalid IRI reference after '{partial}': {reason}")]
    InvalidIri { reason: String, partial: String },
    /// A `\uXXXX` or `\UXXXXXXXX` escape that does not denote a Unicode scalar value.
    #[error("invalid unicode escape '\\{encoding}'")]
    InvalidUnicodeEscape { encoding: String },
    /// A prefixed name used a prefix with no binding in the context.
    #[error("no prefix bound for '{prefix}:'")]
    UnknownPrefix { prefix: String },
    /// A malformed `@base`/`@prefix`/`BASE`/`PREFIX` directive.
    #[error("malformed '{name}' directive")]
    BadDirective { name: String },
    /// A directive or statement is missing its closing `.`.
    #[error("a '.' is expected at the end of directives and statements")]
    MissingTerminator,
    /// A malformed language tag after a string literal.
    #[error("invalid language tag '{0}'")]
    InvalidLanguageTag(String),
    /// A condition the state machine believes impossible.
    #[error("parser invariant violated: {detail}")]
    InternalInvariant { detail: String },
}

/// An error in the syntax of the parsed document.
///
/// Carries the structural [kind](TtlSyntaxError::kind), the
/// [position](TtlSyntaxError::position) of the offending character and up to
/// 80 characters of [lookahead](TtlSyntaxError::snippet).
#[derive(Debug)]
pub struct TtlSyntaxError {
    kind: TtlSyntaxErrorKind,
    position: TextPosition,
    snippet: String,
}

impl TtlSyntaxError {
    pub(crate) fn new(kind: TtlSyntaxErrorKind, position: TextPosition, snippet: String) -> Self {
        Self {
            kind,
            position,
            snippet,
        }
    }

    #[inline]
    pub fn kind(&self) -> &TtlSyntaxErrorKind {
        &self.kind
    }

    #[inline]
    pub fn into_kind(self) -> TtlSyntaxErrorKind {
        self.kind
    }

    /// The position of the error inside of the document.
    #[inline]
    pub fn position(&self) -> TextPosition {
        self.position
    }

    /// The document content just after the error, truncated to 80 characters.
    #[inline]
    pub fn snippet(&self) -> &str {
        &self.snippet
    }
}

impl fmt::Display for TtlSyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parser error at line {} column {}: {}",
            self.position.line + 1,
            self.position.column + 1,
            self.kind
        )?;
        if !self.snippet.is_empty() {
            write!(f, " near '{}'", self.snippet)?;
        }
        Ok(())
    }
}

impl Error for TtlSyntaxError {}

impl From<TtlSyntaxError> for io::Error {
    #[inline]
    fn from(error: TtlSyntaxError) -> Self {
        Self::new(io::ErrorKind::InvalidData, error)
    }
}

/// A parsing error: either a [`TtlSyntaxError`] or an I/O error from the
/// underlying character source or emitter.
#[derive(Debug, thiserror::Error)]
pub enum TtlParseError {
    /// I/O error during parsing (file not found...).
    #[error(transparent)]
    Io(#[from] io::Error),
    /// An error in the document syntax.
    #[error(transparent)]
    Syntax(#[from] TtlSyntaxError),
}

impl From<TtlParseError> for io::Error {
    #[inline]
    fn from(error: TtlParseError) -> Self {
        match error {
            TtlParseError::Io(error) => error,
            TtlParseError::Syntax(error) => error.into(),
        }
    }
}
