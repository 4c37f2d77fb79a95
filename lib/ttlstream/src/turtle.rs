//! The public parser API, [`TtlParser`].

use crate::context::Context;
use crate::emitter::{CollectingEmitter, Emitter};
use crate::error::TtlParseError;
use crate::machine::Machine;
use crate::source::CharSource;
use oxiri::{Iri, IriParseError};
use std::io::Read;
use ttlmodel::Triple;

/// A streaming parser for Turtle documents.
///
/// ```
/// use ttlstream::TtlParser;
///
/// let document = TtlParser::new().parse_str(
///     "@prefix schema: <http://schema.org/> .
///      <http://example.com/foo> a schema:Person .",
/// )?;
/// assert_eq!(document.triples.len(), 1);
/// assert_eq!(
///     document.context.get("schema"),
///     Some("http://schema.org/")
/// );
/// # Result::<_, ttlstream::TtlParseError>::Ok(())
/// ```
#[derive(Default, Clone)]
#[must_use]
pub struct TtlParser {
    context: Context,
}

impl TtlParser {
    /// Builds a new [`TtlParser`] with an empty context.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base IRI relative IRI references are resolved against.
    ///
    /// ```
    /// use ttlstream::TtlParser;
    ///
    /// let document = TtlParser::new()
    ///     .with_base_iri("http://example.com/")?
    ///     .parse_str("<foo> <bar> <baz> .")?;
    /// assert_eq!(
    ///     document.triples[0].subject.to_string(),
    ///     "<http://example.com/foo>"
    /// );
    /// # Result::<_, Box<dyn std::error::Error>>::Ok(())
    /// ```
    #[inline]
    pub fn with_base_iri(mut self, base_iri: impl Into<String>) -> Result<Self, IriParseError> {
        self.context.set_base(Iri::parse(base_iri.into())?);
        Ok(self)
    }

    /// Pre-seeds a prefix binding, visible to the document from its first character.
    ///
    /// ```
    /// use ttlstream::TtlParser;
    ///
    /// let document = TtlParser::new()
    ///     .with_prefix("xsd", "http://www.w3.org/2001/XMLSchema#")?
    ///     .parse_str("<http://a/s> <http://a/p> xsd:gYear .")?;
    /// assert_eq!(
    ///     document.triples[0].object.to_string(),
    ///     "<http://www.w3.org/2001/XMLSchema#gYear>"
    /// );
    /// # Result::<_, Box<dyn std::error::Error>>::Ok(())
    /// ```
    #[inline]
    pub fn with_prefix(
        mut self,
        prefix_name: impl Into<String>,
        prefix_iri: impl Into<String>,
    ) -> Result<Self, IriParseError> {
        let iri = Iri::parse(prefix_iri.into())?;
        self.context.bind(prefix_name, iri.into_inner());
        Ok(self)
    }

    /// Parses a Turtle document from a [`Read`] implementation, collecting
    /// the triples in memory.
    ///
    /// Either the whole document parses and the triples are returned together
    /// with the final context, or an error is returned and every triple is
    /// discarded.
    pub fn parse_reader<R: Read>(self, reader: R) -> Result<ParsedDocument, TtlParseError> {
        let mut emitter = CollectingEmitter::new();
        let context = self.parse_with_emitter(reader, &mut emitter)?;
        Ok(ParsedDocument {
            triples: emitter.into_triples(),
            context,
        })
    }

    /// Parses a Turtle document from a string. See [`parse_reader`](Self::parse_reader).
    pub fn parse_str(self, text: &str) -> Result<ParsedDocument, TtlParseError> {
        self.parse_reader(text.as_bytes())
    }

    /// Parses a Turtle document, handing each triple to `emitter` as soon as
    /// it is read, and returns the final context.
    ///
    /// With a [`WriterEmitter`](crate::WriterEmitter) this streams the
    /// document without buffering triples; on error the triples already
    /// handed over are not taken back.
    pub fn parse_with_emitter<R: Read, E: Emitter + ?Sized>(
        self,
        reader: R,
        emitter: &mut E,
    ) -> Result<Context, TtlParseError> {
        Machine::new(CharSource::new(reader), self.context, emitter).run()
    }
}

/// The outcome of a completed parse: the emitted triples, in emission order,
/// and the context with every accumulated `@prefix`/`@base` binding.
#[derive(Debug)]
pub struct ParsedDocument {
    pub triples: Vec<Triple>,
    pub context: Context,
}
