//! Sinks receiving the triples the parser produces.

use crate::context::Context;
use crate::lexer::is_local_name_char;
use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};
use ttlmodel::vocab::rdf;
use ttlmodel::{NamedNode, NamedOrBlankNode, Term, Triple};

/// A sink for parsed triples.
///
/// The parser calls [`emit`](Emitter::emit) once per triple, in document
/// order: a collection cell's `rdf:first` before its `rdf:rest`, and the
/// triple containing a `[ … ]` object before the triples inside the
/// brackets.
pub trait Emitter {
    fn emit(&mut self, triple: Triple) -> io::Result<()>;
}

/// An [`Emitter`] appending to an in-memory buffer, preserving emission order.
#[derive(Debug, Default)]
pub struct CollectingEmitter {
    triples: Vec<Triple>,
}

impl CollectingEmitter {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    pub fn into_triples(self) -> Vec<Triple> {
        self.triples
    }
}

impl Emitter for CollectingEmitter {
    fn emit(&mut self, triple: Triple) -> io::Result<()> {
        self.triples.push(triple);
        Ok(())
    }
}

/// An [`Emitter`] writing one `subject predicate object .` line per triple.
///
/// Built with [`with_context`](Self::with_context), it writes IRIs covered by
/// a bound namespace as `ns:local` and collapses an `rdf:type` predicate to
/// `a`; every other IRI keeps its `<iri>` form. Built with
/// [`new`](Self::new), no abbreviation happens and the output is plain
/// N-Triples. Either way the output re-parses under the same context.
///
/// Nothing is buffered beyond the underlying writer, so on a failed parse the
/// already written lines remain: callers must treat the output as truncated
/// when the parse returns an error.
///
/// ```
/// use ttlstream::{Emitter, TtlParser, WriterEmitter};
///
/// let document = TtlParser::new().parse_str(
///     "@prefix schema: <http://schema.org/> .
///      <http://example.com/foo> a schema:Person .",
/// )?;
/// let mut emitter = WriterEmitter::with_context(Vec::new(), &document.context);
/// for triple in document.triples {
///     emitter.emit(triple)?;
/// }
/// assert_eq!(
///     String::from_utf8_lossy(&emitter.finish()),
///     "<http://example.com/foo> a schema:Person .\n"
/// );
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Debug)]
pub struct WriterEmitter<W: Write> {
    writer: W,
    // namespace IRI -> prefix name
    prefixes: BTreeMap<String, String>,
}

impl<W: Write> WriterEmitter<W> {
    /// Builds an emitter that never abbreviates.
    #[inline]
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            prefixes: BTreeMap::new(),
        }
    }

    /// Builds an emitter abbreviating IRIs with the prefix bindings of `context`.
    pub fn with_context(writer: W, context: &Context) -> Self {
        Self {
            writer,
            prefixes: context
                .prefixes()
                .map(|(name, iri)| (iri.to_owned(), name.to_owned()))
                .collect(),
        }
    }

    /// Ends the write process and returns the underlying [`Write`].
    pub fn finish(self) -> W {
        self.writer
    }
}

impl<W: Write> Emitter for WriterEmitter<W> {
    fn emit(&mut self, triple: Triple) -> io::Result<()> {
        writeln!(
            self.writer,
            "{} {} {} .",
            SubjectForm {
                subject: &triple.subject,
                prefixes: &self.prefixes,
            },
            PredicateForm {
                predicate: &triple.predicate,
                prefixes: &self.prefixes,
            },
            TermForm {
                term: &triple.object,
                prefixes: &self.prefixes,
            },
        )
    }
}

struct SubjectForm<'a> {
    subject: &'a NamedOrBlankNode,
    prefixes: &'a BTreeMap<String, String>,
}

impl fmt::Display for SubjectForm<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.subject {
            NamedOrBlankNode::NamedNode(node) => fmt_named(node, self.prefixes, f),
            NamedOrBlankNode::BlankNode(node) => node.fmt(f),
        }
    }
}

struct PredicateForm<'a> {
    predicate: &'a NamedNode,
    prefixes: &'a BTreeMap<String, String>,
}

impl fmt::Display for PredicateForm<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self.predicate == rdf::TYPE {
            f.write_str("a")
        } else {
            fmt_named(self.predicate, self.prefixes, f)
        }
    }
}

struct TermForm<'a> {
    term: &'a Term,
    prefixes: &'a BTreeMap<String, String>,
}

impl fmt::Display for TermForm<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.term {
            Term::NamedNode(node) => fmt_named(node, self.prefixes, f),
            Term::BlankNode(node) => node.fmt(f),
            Term::Literal(literal) => literal.fmt(f),
        }
    }
}

fn fmt_named(
    node: &NamedNode,
    prefixes: &BTreeMap<String, String>,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    for (namespace, prefix_name) in prefixes {
        if let Some(local) = node.as_str().strip_prefix(namespace.as_str()) {
            if is_writable_local(local) {
                return write!(f, "{prefix_name}:{local}");
            }
        }
    }
    write!(f, "{node}")
}

/// Whether a prefixed-name reader would take the local part back unchanged:
/// only local-name characters, with `.` never last and always followed by
/// another one.
fn is_writable_local(local: &str) -> bool {
    let mut chars = local.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '.' {
            if !chars.peek().copied().is_some_and(is_local_name_char) {
                return false;
            }
        } else if !is_local_name_char(c) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use ttlmodel::{BlankNode, Literal, NamedNode, Triple};

    #[test]
    fn writer_emits_one_line_per_triple() {
        let mut emitter = WriterEmitter::new(Vec::new());
        emitter
            .emit(Triple::new(
                NamedNode::new_unchecked("http://a/s"),
                NamedNode::new_unchecked("http://a/p"),
                Literal::new_simple("line1\nline2"),
            ))
            .unwrap();
        emitter
            .emit(Triple::new(
                BlankNode::new_unchecked("b0"),
                NamedNode::new_unchecked("http://a/p"),
                NamedNode::new_unchecked("http://a/o"),
            ))
            .unwrap();
        assert_eq!(
            String::from_utf8(emitter.finish()).unwrap(),
            "<http://a/s> <http://a/p> \"line1\\nline2\" .\n_:b0 <http://a/p> <http://a/o> .\n"
        );
    }

    #[test]
    fn writer_abbreviates_and_collapses_rdf_type() {
        let mut context = Context::new();
        context.bind("ex", "http://e/");
        let mut emitter = WriterEmitter::with_context(Vec::new(), &context);
        emitter
            .emit(Triple::new(
                NamedNode::new_unchecked("http://e/s"),
                rdf::TYPE,
                NamedNode::new_unchecked("http://e/T"),
            ))
            .unwrap();
        // `a` stands for rdf:type in predicate position only
        emitter
            .emit(Triple::new(
                NamedNode::new_unchecked("http://e/s"),
                NamedNode::new_unchecked("http://e/p"),
                rdf::TYPE,
            ))
            .unwrap();
        assert_eq!(
            String::from_utf8(emitter.finish()).unwrap(),
            "ex:s a ex:T .\n\
             ex:s ex:p <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> .\n"
        );
    }

    #[test]
    fn writer_keeps_the_full_form_when_the_local_part_does_not_fit() {
        let mut context = Context::new();
        context.bind("ex", "http://e/");
        let mut emitter = WriterEmitter::with_context(Vec::new(), &context);
        // '/' is not a local-name character and a trailing '.' would merge
        // with the statement terminator
        for iri in ["http://e/x/y", "http://e/x.", "http://other.example/x"] {
            emitter
                .emit(Triple::new(
                    NamedNode::new_unchecked(iri),
                    NamedNode::new_unchecked("http://e/p"),
                    NamedNode::new_unchecked("http://e/o"),
                ))
                .unwrap();
        }
        assert_eq!(
            String::from_utf8(emitter.finish()).unwrap(),
            "<http://e/x/y> ex:p ex:o .\n\
             <http://e/x.> ex:p ex:o .\n\
             <http://other.example/x> ex:p ex:o .\n"
        );
    }

    #[test]
    fn collector_preserves_order() {
        let mut emitter = CollectingEmitter::new();
        for name in ["http://a/1", "http://a/2"] {
            let node = NamedNode::new_unchecked(name);
            emitter
                .emit(Triple::new(node.clone(), node.clone(), node))
                .unwrap();
        }
        let triples = emitter.into_triples();
        assert_eq!(triples.len(), 2);
        assert_eq!(triples[0].subject.to_string(), "<http://a/1>");
        assert_eq!(triples[1].subject.to_string(), "<http://a/2>");
    }
}
