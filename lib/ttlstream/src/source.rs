//! Character-level access to the parsed document.

use std::collections::VecDeque;
use std::io::{self, Read};
use std::str;

/// How far [`CharSource::snippet`] looks ahead when building diagnostics.
const SNIPPET_LEN: usize = 80;

/// A position in a text i.e. a `line` number starting from 0, a `column` number starting
/// from 0 (in number of code points) and a global file `offset` starting from 0 (in number of bytes).
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct TextPosition {
    pub line: u64,
    pub column: u64,
    pub offset: u64,
}

/// A cursor over the characters of a document, decoding UTF-8 incrementally
/// from any [`Read`] implementation.
///
/// Offers two characters of lookahead: one for ordinary dispatch and a second
/// one so `.` can be told apart from the start of a decimal number and from a
/// dot inside a prefixed name.
pub struct CharSource<R: Read> {
    reader: R,
    lookahead: VecDeque<char>,
    position: TextPosition,
    reached_end: bool,
}

impl<R: Read> CharSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            lookahead: VecDeque::with_capacity(2),
            position: TextPosition::default(),
            reached_end: false,
        }
    }

    /// The position of the next character to be returned by [`next`](Self::next).
    pub fn position(&self) -> TextPosition {
        self.position
    }

    /// The next character, without consuming it.
    pub fn peek(&mut self) -> io::Result<Option<char>> {
        self.fill(1)?;
        Ok(self.lookahead.front().copied())
    }

    /// The character after the next one, without consuming anything.
    pub fn peek2(&mut self) -> io::Result<Option<char>> {
        self.fill(2)?;
        Ok(self.lookahead.get(1).copied())
    }

    /// Consumes and returns the next character.
    pub fn next(&mut self) -> io::Result<Option<char>> {
        self.fill(1)?;
        let Some(c) = self.lookahead.pop_front() else {
            return Ok(None);
        };
        self.position.offset += c.len_utf8() as u64;
        if c == '\n' {
            self.position.line += 1;
            self.position.column = 0;
        } else {
            self.position.column += 1;
        }
        Ok(Some(c))
    }

    /// Skips whitespace (space, tab, CR, LF, FF) and `# …` comments.
    pub fn skip_whitespace(&mut self) -> io::Result<()> {
        loop {
            match self.peek()? {
                Some(c) if is_whitespace(c) => {
                    self.next()?;
                }
                Some('#') => loop {
                    match self.next()? {
                        Some('\n') | None => break,
                        Some(_) => (),
                    }
                },
                _ => return Ok(()),
            }
        }
    }

    /// Up to 80 characters of lookahead, for error messages.
    ///
    /// Consumes the source; only meant to be called when the parse is being
    /// aborted. Decoding errors end the snippet early.
    pub fn snippet(&mut self) -> String {
        let mut snippet = String::new();
        for _ in 0..SNIPPET_LEN {
            match self.next() {
                Ok(Some(c)) => snippet.push(c),
                Ok(None) | Err(_) => break,
            }
        }
        snippet
    }

    fn fill(&mut self, n: usize) -> io::Result<()> {
        while self.lookahead.len() < n && !self.reached_end {
            match self.decode_next()? {
                Some(c) => self.lookahead.push_back(c),
                None => self.reached_end = true,
            }
        }
        Ok(())
    }

    fn decode_next(&mut self) -> io::Result<Option<char>> {
        let Some(first) = self.read_byte()? else {
            return Ok(None);
        };
        let width = match first {
            0x00..=0x7F => return Ok(Some(char::from(first))),
            0xC2..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF4 => 4,
            _ => return Err(invalid_utf8()),
        };
        let mut buffer = [first, 0, 0, 0];
        for slot in &mut buffer[1..width] {
            let Some(byte) = self.read_byte()? else {
                return Err(invalid_utf8());
            };
            *slot = byte;
        }
        let decoded = str::from_utf8(&buffer[..width]).map_err(|_| invalid_utf8())?;
        Ok(decoded.chars().next())
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0_u8; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => (),
                Err(e) => return Err(e),
            }
        }
    }
}

pub fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n' | '\u{0C}')
}

fn invalid_utf8() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, "invalid UTF-8 in input")
}
