//! Lexical readers, one per token shape.
//!
//! Each reader is entered once the state machine has consumed the sigil that
//! announces the token (`<`, `_`, a quote, ...). Readers report the character
//! that made them fail together with the parser state and stack depth they
//! were called from.

use crate::error::{TtlParseError, TtlSyntaxError, TtlSyntaxErrorKind};
use crate::machine::State;
use crate::source::CharSource;
use std::io::{self, Read};

/// A name read from the document: `prefix:local` or a bare word
/// (a keyword such as `a`, `true` or `BASE`).
#[derive(Debug)]
pub(crate) enum Name {
    Prefixed { prefix: String, local: String },
    Word(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NumericCategory {
    Integer,
    Decimal,
    Double,
}

/// Builds a syntax error at the current source position, with lookahead.
pub(crate) fn syntax_error<R: Read>(
    source: &mut CharSource<R>,
    kind: TtlSyntaxErrorKind,
) -> TtlParseError {
    let position = source.position();
    let snippet = source.snippet();
    TtlSyntaxError::new(kind, position, snippet).into()
}

/// An [`UnexpectedCharacter`](TtlSyntaxErrorKind::UnexpectedCharacter) for the
/// next character, or [`UnexpectedEof`](TtlSyntaxErrorKind::UnexpectedEof) at
/// the end of input.
pub(crate) fn unexpected_here<R: Read>(
    source: &mut CharSource<R>,
    state: State,
    depth: usize,
) -> TtlParseError {
    match source.peek() {
        Ok(Some(c)) => syntax_error(source, TtlSyntaxErrorKind::UnexpectedCharacter { state, char: c }),
        Ok(None) => syntax_error(
            source,
            TtlSyntaxErrorKind::UnexpectedEof {
                state,
                stack_depth: depth,
            },
        ),
        Err(e) => e.into(),
    }
}

fn unexpected_eof<R: Read>(source: &mut CharSource<R>, state: State, depth: usize) -> TtlParseError {
    syntax_error(
        source,
        TtlSyntaxErrorKind::UnexpectedEof {
            state,
            stack_depth: depth,
        },
    )
}

/// Reads an IRI reference after its opening `<`, unescaping `\uXXXX` and
/// `\UXXXXXXXX`, until the closing `>`.
pub(crate) fn read_iri_ref<R: Read>(
    source: &mut CharSource<R>,
    state: State,
    depth: usize,
) -> Result<String, TtlParseError> {
    let mut iri = String::new();
    loop {
        let Some(c) = source.next()? else {
            return Err(unexpected_eof(source, state, depth));
        };
        match c {
            '>' => return Ok(iri),
            '\\' => match source.next()? {
                Some('u') => iri.push(read_unicode_escape(source, 'u', 4, state, depth)?),
                Some('U') => iri.push(read_unicode_escape(source, 'U', 8, state, depth)?),
                Some(other) => {
                    return Err(syntax_error(
                        source,
                        TtlSyntaxErrorKind::InvalidIri {
                            reason: format!("'\\{other}' is not a valid escape sequence"),
                            partial: iri,
                        },
                    ));
                }
                None => return Err(unexpected_eof(source, state, depth)),
            },
            c if is_forbidden_in_iri_ref(c) => {
                return Err(syntax_error(
                    source,
                    TtlSyntaxErrorKind::InvalidIri {
                        reason: format!("character '{}' is not allowed", c.escape_debug()),
                        partial: iri,
                    },
                ));
            }
            c => iri.push(c),
        }
    }
}

/// Reads `len` hex digits after `\u` or `\U` and converts them to a Unicode
/// scalar value.
pub(crate) fn read_unicode_escape<R: Read>(
    source: &mut CharSource<R>,
    marker: char,
    len: usize,
    state: State,
    depth: usize,
) -> Result<char, TtlParseError> {
    let mut hex = String::with_capacity(len);
    for _ in 0..len {
        match source.next()? {
            Some(c) if c.is_ascii_hexdigit() => hex.push(c),
            Some(c) => {
                hex.push(c);
                return Err(syntax_error(
                    source,
                    TtlSyntaxErrorKind::InvalidUnicodeEscape {
                        encoding: format!("{marker}{hex}"),
                    },
                ));
            }
            None => return Err(unexpected_eof(source, state, depth)),
        }
    }
    u32::from_str_radix(&hex, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| {
            syntax_error(
                source,
                TtlSyntaxErrorKind::InvalidUnicodeEscape {
                    encoding: format!("{marker}{hex}"),
                },
            )
        })
}

/// Reads a prefixed name or a bare word.
///
/// The prefix part takes characters from `PN_CHARS_BASE`; if a `:` follows,
/// the local part is read with the extended local-name set. Without a `:` the
/// accumulated text is returned as a bare word for the caller to interpret
/// (`a`, `true`, `false`, `BASE`, `PREFIX`).
pub(crate) fn read_name<R: Read>(source: &mut CharSource<R>) -> Result<Name, TtlParseError> {
    let mut prefix = String::new();
    while let Some(c) = source.peek()? {
        if is_pn_chars_base(c) {
            prefix.push(c);
            source.next()?;
        } else {
            break;
        }
    }
    if source.peek()? == Some(':') {
        source.next()?;
        let mut local = String::new();
        read_name_tail(source, &mut local)?;
        Ok(Name::Prefixed { prefix, local })
    } else {
        Ok(Name::Word(prefix))
    }
}

/// Accumulates local-name characters. A `.` is taken only when another name
/// character follows, so `ex:s.` leaves the `.` as the statement terminator.
fn read_name_tail<R: Read>(source: &mut CharSource<R>, out: &mut String) -> io::Result<()> {
    loop {
        match source.peek()? {
            Some('.') => {
                if source.peek2()?.is_some_and(is_local_name_char) {
                    out.push('.');
                    source.next()?;
                } else {
                    return Ok(());
                }
            }
            Some(c) if is_local_name_char(c) => {
                out.push(c);
                source.next()?;
            }
            _ => return Ok(()),
        }
    }
}

/// Reads a blank node label after its `_` sigil: a `:` followed by a name.
pub(crate) fn read_blank_node_label<R: Read>(
    source: &mut CharSource<R>,
    state: State,
    depth: usize,
) -> Result<String, TtlParseError> {
    if source.peek()? != Some(':') {
        return Err(unexpected_here(source, state, depth));
    }
    source.next()?;
    let mut label = String::new();
    match source.peek()? {
        Some(c) if is_pn_chars_u(c) || c.is_ascii_digit() => {
            label.push(c);
            source.next()?;
        }
        _ => return Err(unexpected_here(source, state, depth)),
    }
    read_name_tail(source, &mut label)?;
    Ok(label)
}

/// Reads a string literal after its opening quote, until the matching
/// unescaped quote.
pub(crate) fn read_string_literal<R: Read>(
    source: &mut CharSource<R>,
    quote: char,
    state: State,
    depth: usize,
) -> Result<String, TtlParseError> {
    let mut value = String::new();
    loop {
        let Some(c) = source.next()? else {
            return Err(unexpected_eof(source, state, depth));
        };
        if c == quote {
            return Ok(value);
        }
        if c == '\\' {
            match source.next()? {
                Some('t') => value.push('\t'),
                Some('b') => value.push('\u{08}'),
                Some('n') => value.push('\n'),
                Some('r') => value.push('\r'),
                Some('f') => value.push('\u{0C}'),
                Some('"') => value.push('"'),
                Some('\'') => value.push('\''),
                Some('\\') => value.push('\\'),
                Some('u') => value.push(read_unicode_escape(source, 'u', 4, state, depth)?),
                Some('U') => value.push(read_unicode_escape(source, 'U', 8, state, depth)?),
                Some(other) => {
                    return Err(syntax_error(
                        source,
                        TtlSyntaxErrorKind::UnexpectedCharacter { state, char: other },
                    ));
                }
                None => return Err(unexpected_eof(source, state, depth)),
            }
        } else {
            value.push(c);
        }
    }
}

/// Reads a numeric literal whose first character has already been consumed,
/// and classifies it as integer, decimal (fraction, no exponent) or double
/// (exponent).
pub(crate) fn read_number<R: Read>(
    source: &mut CharSource<R>,
    first: char,
    state: State,
    depth: usize,
) -> Result<(String, NumericCategory), TtlParseError> {
    let mut lexical = String::new();
    lexical.push(first);
    let mut category = NumericCategory::Integer;
    let mut digits = u32::from(first.is_ascii_digit());
    if first != '.' {
        digits += read_digits(source, &mut lexical)?;
        if source.peek()? == Some('.') && source.peek2()?.is_some_and(|c| c.is_ascii_digit()) {
            lexical.push('.');
            source.next()?;
            digits += read_digits(source, &mut lexical)?;
            category = NumericCategory::Decimal;
        }
    } else {
        category = NumericCategory::Decimal;
        let fraction = read_digits(source, &mut lexical)?;
        if fraction == 0 {
            return Err(unexpected_here(source, state, depth));
        }
        digits += fraction;
    }
    if digits == 0 {
        // a bare sign
        return Err(unexpected_here(source, state, depth));
    }
    if let Some(e) = source.peek()? {
        if (e == 'e' || e == 'E')
            && source
                .peek2()?
                .is_some_and(|c| c.is_ascii_digit() || c == '+' || c == '-')
        {
            lexical.push(e);
            source.next()?;
            if let Some(sign) = source.peek()? {
                if sign == '+' || sign == '-' {
                    lexical.push(sign);
                    source.next()?;
                }
            }
            if read_digits(source, &mut lexical)? == 0 {
                return Err(unexpected_here(source, state, depth));
            }
            category = NumericCategory::Double;
        }
    }
    Ok((lexical, category))
}

fn read_digits<R: Read>(source: &mut CharSource<R>, lexical: &mut String) -> io::Result<u32> {
    let mut count = 0;
    while let Some(c) = source.peek()? {
        if !c.is_ascii_digit() {
            break;
        }
        lexical.push(c);
        source.next()?;
        count += 1;
    }
    Ok(count)
}

/// Reads a language tag after its `@` and validates it.
pub(crate) fn read_language_tag<R: Read>(
    source: &mut CharSource<R>,
    _state: State,
    _depth: usize,
) -> Result<String, TtlParseError> {
    let mut tag = String::new();
    while let Some(c) = source.peek()? {
        if c.is_ascii_alphanumeric() || c == '-' {
            tag.push(c);
            source.next()?;
        } else {
            break;
        }
    }
    if oxilangtag::LanguageTag::parse(tag.as_str()).is_err() {
        return Err(syntax_error(
            source,
            TtlSyntaxErrorKind::InvalidLanguageTag(tag),
        ));
    }
    Ok(tag)
}

// [157s]  PN_CHARS_BASE  ::=  [A-Z] | [a-z] | [#x00C0-#x00D6] | [#x00D8-#x00F6] | [#x00F8-#x02FF] | [#x0370-#x037D] | [#x037F-#x1FFF] | [#x200C-#x200D] | [#x2070-#x218F] | [#x2C00-#x2FEF] | [#x3001-#xD7FF] | [#xF900-#xFDCF] | [#xFDF0-#xFFFD] | [#x10000-#xEFFFF]
pub(crate) fn is_pn_chars_base(c: char) -> bool {
    matches!(c,
        'A'..='Z'
        | 'a'..='z'
        | '\u{00C0}'..='\u{00D6}'
        | '\u{00D8}'..='\u{00F6}'
        | '\u{00F8}'..='\u{02FF}'
        | '\u{0370}'..='\u{037D}'
        | '\u{037F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

pub(crate) fn is_pn_chars_u(c: char) -> bool {
    is_pn_chars_base(c) || c == '_'
}

/// The local part of a prefixed name: the base set extended with digits,
/// `-` and `_` (and `.` with a follower, handled by [`read_name_tail`]).
pub(crate) fn is_local_name_char(c: char) -> bool {
    is_pn_chars_u(c) || c == '-' || c.is_ascii_digit()
}

fn is_forbidden_in_iri_ref(c: char) -> bool {
    matches!(c, '\0'..='\u{20}' | '<' | '"' | '{' | '}' | '|' | '^' | '`')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TtlParseError;

    fn source(text: &str) -> CharSource<&[u8]> {
        CharSource::new(text.as_bytes())
    }

    fn kind(error: TtlParseError) -> TtlSyntaxErrorKind {
        match error {
            TtlParseError::Syntax(e) => e.into_kind(),
            TtlParseError::Io(e) => panic!("unexpected I/O error: {e}"),
        }
    }

    #[test]
    fn iri_ref_with_unicode_escapes() {
        let mut s = source("http://a/\\u00e9\\U0001F986>");
        assert_eq!(
            read_iri_ref(&mut s, State::NewStmt, 0).unwrap(),
            "http://a/é🦆"
        );
    }

    #[test]
    fn iri_ref_rejects_forbidden_characters() {
        let mut s = source("http://a/ b>");
        let error = kind(read_iri_ref(&mut s, State::NewStmt, 0).unwrap_err());
        assert!(matches!(error, TtlSyntaxErrorKind::InvalidIri { partial, .. } if partial == "http://a/"));
    }

    #[test]
    fn iri_ref_rejects_surrogate_escape() {
        let mut s = source("http://a/\\uD800>");
        let error = kind(read_iri_ref(&mut s, State::NewStmt, 0).unwrap_err());
        assert!(
            matches!(error, TtlSyntaxErrorKind::InvalidUnicodeEscape { encoding } if encoding == "uD800")
        );
    }

    #[test]
    fn name_with_inner_dot_stops_before_terminator() {
        let mut s = source("ex:a.b. rest");
        let Name::Prefixed { prefix, local } = read_name(&mut s).unwrap() else {
            panic!("expected a prefixed name");
        };
        assert_eq!(prefix, "ex");
        assert_eq!(local, "a.b");
        assert_eq!(s.next().unwrap(), Some('.'));
    }

    #[test]
    fn bare_word_has_no_colon() {
        let mut s = source("true ");
        assert!(matches!(read_name(&mut s).unwrap(), Name::Word(w) if w == "true"));
    }

    #[test]
    fn blank_node_label() {
        let mut s = source(":art ");
        assert_eq!(
            read_blank_node_label(&mut s, State::Object, 2).unwrap(),
            "art"
        );
    }

    #[test]
    fn string_escapes() {
        let mut s = source("a\\tb\\\"c\\u0020d' rest");
        assert_eq!(
            read_string_literal(&mut s, '\'', State::Object, 2).unwrap(),
            "a\tb\"c d"
        );
    }

    #[test]
    fn string_rejects_unknown_escape() {
        let mut s = source("a\\x\"");
        let error = kind(read_string_literal(&mut s, '"', State::Object, 2).unwrap_err());
        assert!(matches!(
            error,
            TtlSyntaxErrorKind::UnexpectedCharacter { char: 'x', .. }
        ));
    }

    #[test]
    fn number_classification() {
        for (text, first, lexical, category) in [
            ("2 ", '4', "42", NumericCategory::Integer),
            ("3.14 ", '-', "-3.14", NumericCategory::Decimal),
            ("5 ", '.', ".5", NumericCategory::Decimal),
            ("e8 ", '1', "1e8", NumericCategory::Double),
            (".02e-2 ", '6', "6.02e-2", NumericCategory::Double),
        ] {
            let mut s = source(text);
            assert_eq!(
                read_number(&mut s, first, State::Object, 2).unwrap(),
                (lexical.to_owned(), category)
            );
        }
    }

    #[test]
    fn number_keeps_terminating_dot() {
        let mut s = source(". rest");
        let (lexical, category) = read_number(&mut s, '5', State::Object, 2).unwrap();
        assert_eq!(lexical, "5");
        assert_eq!(category, NumericCategory::Integer);
        assert_eq!(s.next().unwrap(), Some('.'));
    }

    #[test]
    fn language_tags() {
        let mut s = source("en-GB ");
        assert_eq!(
            read_language_tag(&mut s, State::Object, 2).unwrap(),
            "en-GB"
        );
        let mut s = source("-bad ");
        assert!(read_language_tag(&mut s, State::Object, 2).is_err());
    }
}
