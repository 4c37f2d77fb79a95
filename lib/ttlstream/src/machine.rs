//! The pushdown state machine driving the parse.
//!
//! The driver loops over characters: it skips whitespace, dispatches on the
//! current state and the next character, invokes a lexical reader, updates
//! the frame stack and possibly emits a triple, until EOF is seen at a
//! statement boundary with an empty stack.

use crate::context::Context;
use crate::emitter::Emitter;
use crate::error::{TtlParseError, TtlSyntaxErrorKind};
use crate::lexer::{self, Name, NumericCategory, is_pn_chars_base};
use crate::source::{CharSource, is_whitespace};
use oxiri::Iri;
use std::fmt;
use std::io::{self, Read};
use std::mem;
use ttlmodel::vocab::{rdf, xsd};
use ttlmodel::{BlankNode, Literal, NamedNode, NamedOrBlankNode, Term, Triple};

/// The parser states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// At a fresh statement boundary.
    NewStmt,
    /// A subject has been pushed; a predicate or the end of the block is expected.
    PredicateList,
    /// A predicate has been pushed; an object or a `,`/`;`/`.` continuation is expected.
    ObjectList,
    /// Exactly one object is required next (after a predicate or a `,`).
    Object,
    /// Inside `( … )`; a list element or `)` is expected.
    Collection,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NewStmt => "a statement boundary",
            Self::PredicateList => "a predicate list",
            Self::ObjectList => "an object list",
            Self::Object => "an object position",
            Self::Collection => "a collection",
        })
    }
}

/// A frame of the parse stack.
///
/// After a closing delimiter the driver must restore enough state to continue
/// exactly as before the opening delimiter was seen; each frame carries what
/// its closing needs.
#[derive(Debug)]
enum Frame {
    /// The subject the triples being read belong to. `anon` is set for the
    /// blank node of a `[ … ]` block, which a `]` may close.
    Subject { term: NamedOrBlankNode, anon: bool },
    /// The predicate of the objects being read, directly above its subject.
    Predicate(NamedNode),
    /// Pushed when `[ … ]` opens in a term position: `]` returns to `resume`.
    Anon { resume: State },
    /// Pushed when `( … )` opens. `cell` is the list cell whose `rdf:rest` is
    /// still unwritten; `awaiting_rest` is false until the first element has
    /// been read.
    Collection {
        cell: BlankNode,
        awaiting_rest: bool,
        resume: State,
    },
}

/// Allocates `_:bN` labels, unique within one parse.
#[derive(Debug, Default)]
struct BlankNodeAllocator {
    counter: u64,
}

impl BlankNodeAllocator {
    fn fresh(&mut self) -> BlankNode {
        let id = self.counter;
        self.counter += 1;
        BlankNode::new_unchecked(format!("b{id}"))
    }
}

pub(crate) struct Machine<'a, R: Read, E: Emitter + ?Sized> {
    source: CharSource<R>,
    context: Context,
    emitter: &'a mut E,
    frames: Vec<Frame>,
    state: State,
    blank_nodes: BlankNodeAllocator,
}

impl<'a, R: Read, E: Emitter + ?Sized> Machine<'a, R, E> {
    pub(crate) fn new(source: CharSource<R>, context: Context, emitter: &'a mut E) -> Self {
        Self {
            source,
            context,
            emitter,
            frames: Vec::new(),
            state: State::NewStmt,
            blank_nodes: BlankNodeAllocator::default(),
        }
    }

    /// Consumes the source until EOF and returns the final context.
    pub(crate) fn run(mut self) -> Result<Context, TtlParseError> {
        loop {
            self.source.skip_whitespace()?;
            let Some(c) = self.source.peek()? else {
                if self.state == State::NewStmt && self.frames.is_empty() {
                    return Ok(self.context);
                }
                return Err(self.err(TtlSyntaxErrorKind::UnexpectedEof {
                    state: self.state,
                    stack_depth: self.frames.len(),
                }));
            };
            match self.state {
                State::NewStmt => self.on_new_statement(c)?,
                State::PredicateList => self.on_predicate_list(c)?,
                State::ObjectList => self.on_object_list(c)?,
                State::Object => self.on_object(c)?,
                State::Collection => self.on_collection(c)?,
            }
        }
    }

    fn on_new_statement(&mut self, c: char) -> Result<(), TtlParseError> {
        match c {
            '@' => {
                self.source.next()?;
                self.read_at_directive()
            }
            '<' => {
                self.source.next()?;
                let subject = self.read_iri_term()?;
                self.begin_subject(subject.into(), false);
                Ok(())
            }
            '_' => {
                self.source.next()?;
                let label =
                    lexer::read_blank_node_label(&mut self.source, self.state, self.frames.len())?;
                self.begin_subject(BlankNode::new_unchecked(label).into(), false);
                Ok(())
            }
            '[' => {
                self.source.next()?;
                let node = self.blank_nodes.fresh();
                self.begin_subject(node.into(), true);
                Ok(())
            }
            '(' => {
                self.source.next()?;
                let head = self.blank_nodes.fresh();
                self.frames.push(Frame::Subject {
                    term: head.clone().into(),
                    anon: false,
                });
                self.frames.push(Frame::Collection {
                    cell: head,
                    awaiting_rest: false,
                    resume: State::PredicateList,
                });
                self.state = State::Collection;
                Ok(())
            }
            c if is_pn_chars_base(c) || c == ':' => match lexer::read_name(&mut self.source)? {
                Name::Prefixed { prefix, local } => {
                    let subject = self.resolve_prefixed(prefix, local)?;
                    self.begin_subject(subject.into(), false);
                    Ok(())
                }
                Name::Word(word) => {
                    // `BASE`/`PREFIX` only when whitespace follows the keyword
                    if word.eq_ignore_ascii_case("base") && self.keyword_break()? {
                        let raw = self.read_directive_iri("base")?;
                        self.apply_base(raw)
                    } else if word.eq_ignore_ascii_case("prefix") && self.keyword_break()? {
                        self.read_prefix_binding("prefix")
                    } else {
                        Err(self.err(TtlSyntaxErrorKind::UnexpectedCharacter {
                            state: State::NewStmt,
                            char: c,
                        }))
                    }
                }
            },
            _ => Err(self.unexpected_here()),
        }
    }

    fn on_predicate_list(&mut self, c: char) -> Result<(), TtlParseError> {
        match c {
            '.' => {
                if let [Frame::Subject { anon: false, .. }] = self.frames.as_slice() {
                    self.source.next()?;
                    self.frames.pop();
                    self.state = State::NewStmt;
                    Ok(())
                } else {
                    Err(self.unexpected_here())
                }
            }
            ';' => {
                // tolerated: another `;` before the next predicate
                self.source.next()?;
                Ok(())
            }
            ']' => {
                self.source.next()?;
                self.close_anon_subject()
            }
            '<' => {
                self.source.next()?;
                let predicate = self.read_iri_term()?;
                self.push_predicate(predicate);
                Ok(())
            }
            c if is_pn_chars_base(c) || c == ':' => {
                match lexer::read_name(&mut self.source)? {
                    Name::Prefixed { prefix, local } => {
                        let predicate = self.resolve_prefixed(prefix, local)?;
                        self.push_predicate(predicate);
                    }
                    Name::Word(word) if word == "a" => {
                        self.push_predicate(rdf::TYPE.into_owned());
                    }
                    Name::Word(_) => {
                        return Err(self.err(TtlSyntaxErrorKind::UnexpectedCharacter {
                            state: State::PredicateList,
                            char: c,
                        }));
                    }
                }
                Ok(())
            }
            // `[` here would be a blank node in predicate position
            _ => Err(self.unexpected_here()),
        }
    }

    fn on_object_list(&mut self, c: char) -> Result<(), TtlParseError> {
        match c {
            ',' => {
                self.source.next()?;
                self.state = State::Object;
                Ok(())
            }
            ';' => {
                self.source.next()?;
                self.pop_predicate()?;
                self.state = State::PredicateList;
                Ok(())
            }
            ']' => {
                self.source.next()?;
                self.pop_predicate()?;
                self.close_anon_subject()
            }
            '.' => {
                if self.dot_starts_number()? {
                    self.state = State::Object;
                    Ok(())
                } else if let [
                    Frame::Subject { anon: false, .. },
                    Frame::Predicate(_),
                ] = self.frames.as_slice()
                {
                    self.source.next()?;
                    self.frames.pop();
                    self.frames.pop();
                    self.state = State::NewStmt;
                    Ok(())
                } else {
                    Err(self.unexpected_here())
                }
            }
            c if is_term_start_char(c) => {
                self.state = State::Object;
                Ok(())
            }
            _ => Err(self.unexpected_here()),
        }
    }

    fn on_object(&mut self, c: char) -> Result<(), TtlParseError> {
        match c {
            '<' => {
                self.source.next()?;
                let object = self.read_iri_term()?;
                self.emit_object(object.into())?;
                self.state = State::ObjectList;
                Ok(())
            }
            '_' => {
                self.source.next()?;
                let label =
                    lexer::read_blank_node_label(&mut self.source, self.state, self.frames.len())?;
                self.emit_object(BlankNode::new_unchecked(label).into())?;
                self.state = State::ObjectList;
                Ok(())
            }
            '[' => {
                self.source.next()?;
                let node = self.blank_nodes.fresh();
                self.emit_object(node.clone().into())?;
                self.frames.push(Frame::Anon {
                    resume: State::ObjectList,
                });
                self.frames.push(Frame::Subject {
                    term: node.into(),
                    anon: true,
                });
                self.state = State::PredicateList;
                Ok(())
            }
            '(' => {
                self.source.next()?;
                let head = self.blank_nodes.fresh();
                self.emit_object(head.clone().into())?;
                self.frames.push(Frame::Collection {
                    cell: head,
                    awaiting_rest: false,
                    resume: State::ObjectList,
                });
                self.state = State::Collection;
                Ok(())
            }
            '"' | '\'' => {
                self.source.next()?;
                let literal = self.read_literal(c)?;
                self.emit_object(literal.into())?;
                self.state = State::ObjectList;
                Ok(())
            }
            '.' => {
                if !self.dot_starts_number()? {
                    return Err(self.unexpected_here());
                }
                self.source.next()?;
                let literal = self.read_numeric_literal('.')?;
                self.emit_object(literal.into())?;
                self.state = State::ObjectList;
                Ok(())
            }
            c if c.is_ascii_digit() || c == '+' || c == '-' => {
                self.source.next()?;
                let literal = self.read_numeric_literal(c)?;
                self.emit_object(literal.into())?;
                self.state = State::ObjectList;
                Ok(())
            }
            c if is_pn_chars_base(c) || c == ':' => {
                let term = self.read_named_object(c)?;
                self.emit_object(term)?;
                self.state = State::ObjectList;
                Ok(())
            }
            _ => Err(self.unexpected_here()),
        }
    }

    fn on_collection(&mut self, c: char) -> Result<(), TtlParseError> {
        if c == ')' {
            self.source.next()?;
            let frame = self.frames.pop();
            let Some(Frame::Collection {
                cell,
                awaiting_rest,
                resume,
            }) = frame
            else {
                return Err(self.invariant("')' closed a block without a collection frame"));
            };
            if awaiting_rest {
                self.emit(Triple::new(cell, rdf::REST, rdf::NIL))?;
            }
            self.state = resume;
            return Ok(());
        }
        if c == '.' && !self.dot_starts_number()? {
            // `.` never ends a statement inside `( … )`
            return Err(self.unexpected_here());
        }
        if c != '.' && !is_term_start_char(c) {
            return Err(self.unexpected_here());
        }
        let cell = self.advance_collection_cell()?;
        match c {
            '<' => {
                self.source.next()?;
                let element = self.read_iri_term()?;
                self.emit(Triple::new(cell, rdf::FIRST, element))
            }
            '_' => {
                self.source.next()?;
                let label =
                    lexer::read_blank_node_label(&mut self.source, self.state, self.frames.len())?;
                self.emit(Triple::new(
                    cell,
                    rdf::FIRST,
                    BlankNode::new_unchecked(label),
                ))
            }
            '"' | '\'' => {
                self.source.next()?;
                let literal = self.read_literal(c)?;
                self.emit(Triple::new(cell, rdf::FIRST, literal))
            }
            '[' => {
                self.source.next()?;
                let node = self.blank_nodes.fresh();
                self.emit(Triple::new(cell, rdf::FIRST, node.clone()))?;
                self.frames.push(Frame::Anon {
                    resume: State::Collection,
                });
                self.frames.push(Frame::Subject {
                    term: node.into(),
                    anon: true,
                });
                self.state = State::PredicateList;
                Ok(())
            }
            '(' => {
                self.source.next()?;
                let head = self.blank_nodes.fresh();
                self.emit(Triple::new(cell, rdf::FIRST, head.clone()))?;
                self.frames.push(Frame::Collection {
                    cell: head,
                    awaiting_rest: false,
                    resume: State::Collection,
                });
                Ok(())
            }
            '.' => {
                self.source.next()?;
                let literal = self.read_numeric_literal('.')?;
                self.emit(Triple::new(cell, rdf::FIRST, literal))
            }
            c if c.is_ascii_digit() || c == '+' || c == '-' => {
                self.source.next()?;
                let literal = self.read_numeric_literal(c)?;
                self.emit(Triple::new(cell, rdf::FIRST, literal))
            }
            c if is_pn_chars_base(c) || c == ':' => {
                let element = self.read_named_object(c)?;
                self.emit(Triple::new(cell, rdf::FIRST, element))
            }
            _ => Err(self.unexpected_here()),
        }
    }

    /// A prefixed name or a `true`/`false` keyword in object position.
    fn read_named_object(&mut self, first: char) -> Result<Term, TtlParseError> {
        match lexer::read_name(&mut self.source)? {
            Name::Prefixed { prefix, local } => {
                Ok(self.resolve_prefixed(prefix, local)?.into())
            }
            Name::Word(word) if word == "true" || word == "false" => {
                Ok(Literal::new_typed(word, xsd::BOOLEAN).into())
            }
            Name::Word(_) => Err(self.err(TtlSyntaxErrorKind::UnexpectedCharacter {
                state: self.state,
                char: first,
            })),
        }
    }

    fn read_numeric_literal(&mut self, first: char) -> Result<Literal, TtlParseError> {
        let (lexical, category) =
            lexer::read_number(&mut self.source, first, self.state, self.frames.len())?;
        let datatype = match category {
            NumericCategory::Integer => xsd::INTEGER,
            NumericCategory::Decimal => xsd::DECIMAL,
            NumericCategory::Double => xsd::DOUBLE,
        };
        Ok(Literal::new_typed(lexical, datatype))
    }

    /// A string literal with its optional `@lang` or `^^datatype` suffix.
    fn read_literal(&mut self, quote: char) -> Result<Literal, TtlParseError> {
        let value =
            lexer::read_string_literal(&mut self.source, quote, self.state, self.frames.len())?;
        match self.source.peek()? {
            Some('@') => {
                self.source.next()?;
                let tag =
                    lexer::read_language_tag(&mut self.source, self.state, self.frames.len())?;
                Ok(Literal::new_language_tagged(
                    value,
                    tag.to_ascii_lowercase(),
                ))
            }
            Some('^') => {
                self.source.next()?;
                if self.source.peek()? != Some('^') {
                    return Err(self.unexpected_here());
                }
                self.source.next()?;
                let datatype = self.read_datatype()?;
                Ok(Literal::new_typed(value, datatype))
            }
            _ => Ok(Literal::new_simple(value)),
        }
    }

    fn read_datatype(&mut self) -> Result<NamedNode, TtlParseError> {
        match self.source.peek()? {
            Some('<') => {
                self.source.next()?;
                self.read_iri_term()
            }
            Some(c) if is_pn_chars_base(c) || c == ':' => {
                match lexer::read_name(&mut self.source)? {
                    Name::Prefixed { prefix, local } => self.resolve_prefixed(prefix, local),
                    Name::Word(_) => Err(self.err(TtlSyntaxErrorKind::UnexpectedCharacter {
                        state: self.state,
                        char: c,
                    })),
                }
            }
            _ => Err(self.unexpected_here()),
        }
    }

    /// `@base`/`@prefix`, dot-terminated.
    fn read_at_directive(&mut self) -> Result<(), TtlParseError> {
        let mut name = String::new();
        while let Some(c) = self.source.peek()? {
            if c.is_ascii_alphabetic() {
                name.push(c);
                self.source.next()?;
            } else {
                break;
            }
        }
        match name.as_str() {
            "base" => {
                let raw = self.read_directive_iri("base")?;
                self.apply_base(raw)?;
            }
            "prefix" => self.read_prefix_binding("prefix")?,
            _ => return Err(self.err(TtlSyntaxErrorKind::BadDirective { name })),
        }
        self.source.skip_whitespace()?;
        if self.source.peek()? == Some('.') {
            self.source.next()?;
            Ok(())
        } else {
            Err(self.err(TtlSyntaxErrorKind::MissingTerminator))
        }
    }

    /// The `prefix: <iri>` tail shared by `@prefix` and `PREFIX`.
    fn read_prefix_binding(&mut self, directive: &str) -> Result<(), TtlParseError> {
        self.source.skip_whitespace()?;
        let declared = match self.source.peek()? {
            Some(c) if is_pn_chars_base(c) || c == ':' => lexer::read_name(&mut self.source)?,
            _ => {
                return Err(self.err(TtlSyntaxErrorKind::BadDirective {
                    name: directive.into(),
                }));
            }
        };
        match declared {
            Name::Prefixed { prefix, local } if local.is_empty() => {
                let raw = self.read_directive_iri(directive)?;
                let iri = self.resolve_against_base(raw)?;
                self.context.bind(prefix, iri);
                Ok(())
            }
            _ => Err(self.err(TtlSyntaxErrorKind::BadDirective {
                name: directive.into(),
            })),
        }
    }

    fn read_directive_iri(&mut self, directive: &str) -> Result<String, TtlParseError> {
        self.source.skip_whitespace()?;
        if self.source.peek()? != Some('<') {
            return Err(self.err(TtlSyntaxErrorKind::BadDirective {
                name: directive.into(),
            }));
        }
        self.source.next()?;
        lexer::read_iri_ref(&mut self.source, self.state, self.frames.len())
    }

    fn apply_base(&mut self, raw: String) -> Result<(), TtlParseError> {
        let parsed = match self.context.base() {
            Some(base) => base.resolve(&raw),
            None => Iri::parse(raw.clone()),
        };
        match parsed {
            Ok(base) => {
                self.context.set_base(base);
                Ok(())
            }
            Err(e) => Err(self.err(TtlSyntaxErrorKind::InvalidIri {
                reason: e.to_string(),
                partial: raw,
            })),
        }
    }

    /// An IRI reference in term position: read, then resolve against the base
    /// when one is set.
    fn read_iri_term(&mut self) -> Result<NamedNode, TtlParseError> {
        let raw = lexer::read_iri_ref(&mut self.source, self.state, self.frames.len())?;
        let iri = self.resolve_against_base(raw)?;
        Ok(NamedNode::new_unchecked(iri))
    }

    fn resolve_against_base(&mut self, raw: String) -> Result<String, TtlParseError> {
        let resolved = match self.context.base() {
            Some(base) => Some(base.resolve(&raw)),
            None => None,
        };
        match resolved {
            None => Ok(raw),
            Some(Ok(iri)) => Ok(iri.into_inner()),
            Some(Err(e)) => Err(self.err(TtlSyntaxErrorKind::InvalidIri {
                reason: e.to_string(),
                partial: raw,
            })),
        }
    }

    fn resolve_prefixed(
        &mut self,
        prefix: String,
        local: String,
    ) -> Result<NamedNode, TtlParseError> {
        match self.context.resolve(&prefix, &local) {
            Some(iri) => Ok(NamedNode::new_unchecked(iri)),
            None => Err(self.err(TtlSyntaxErrorKind::UnknownPrefix { prefix })),
        }
    }

    fn begin_subject(&mut self, term: NamedOrBlankNode, anon: bool) {
        self.frames.push(Frame::Subject { term, anon });
        self.state = State::PredicateList;
    }

    fn push_predicate(&mut self, predicate: NamedNode) {
        self.frames.push(Frame::Predicate(predicate));
        self.state = State::ObjectList;
    }

    fn pop_predicate(&mut self) -> Result<(), TtlParseError> {
        match self.frames.pop() {
            Some(Frame::Predicate(_)) => Ok(()),
            _ => Err(self.invariant("expected a predicate frame on top of the stack")),
        }
    }

    /// Handles `]` once the (anonymous) subject frame is on top of the stack.
    fn close_anon_subject(&mut self) -> Result<(), TtlParseError> {
        let frame = self.frames.pop();
        let Some(Frame::Subject { term, anon }) = frame else {
            return Err(self.invariant("']' closed a block without a subject frame"));
        };
        if !anon {
            return Err(self.err(TtlSyntaxErrorKind::UnexpectedCharacter {
                state: self.state,
                char: ']',
            }));
        }
        match self.frames.last() {
            Some(Frame::Anon { resume }) => {
                let resume = *resume;
                self.frames.pop();
                self.state = resume;
                Ok(())
            }
            None => {
                // `[ … ]` at statement level: the block's node is the statement
                // subject and may take further predicates before the final `.`
                self.frames.push(Frame::Subject { term, anon: false });
                self.state = State::PredicateList;
                Ok(())
            }
            Some(_) => Err(self.invariant("no return frame under an anonymous subject")),
        }
    }

    /// The list cell whose `rdf:first` the upcoming element fills, linking in
    /// a fresh cell over `rdf:rest` when the current one is occupied.
    fn advance_collection_cell(&mut self) -> Result<BlankNode, TtlParseError> {
        let occupied = match self.frames.last() {
            Some(Frame::Collection { awaiting_rest, .. }) => Some(*awaiting_rest),
            _ => None,
        };
        let Some(occupied) = occupied else {
            return Err(self.invariant("collection element outside a collection frame"));
        };
        if occupied {
            let next_cell = self.blank_nodes.fresh();
            let previous = match self.frames.last_mut() {
                Some(Frame::Collection { cell, .. }) => mem::replace(cell, next_cell.clone()),
                _ => return Err(self.invariant("collection frame vanished")),
            };
            self.emit(Triple::new(previous, rdf::REST, next_cell.clone()))?;
            Ok(next_cell)
        } else {
            match self.frames.last_mut() {
                Some(Frame::Collection {
                    cell,
                    awaiting_rest,
                    ..
                }) => {
                    *awaiting_rest = true;
                    Ok(cell.clone())
                }
                _ => Err(self.invariant("collection frame vanished")),
            }
        }
    }

    /// Emits with the subject and predicate taken from the top of the stack.
    fn emit_object(&mut self, object: Term) -> Result<(), TtlParseError> {
        let (subject, predicate) = match self.frames.as_slice() {
            [.., Frame::Subject { term, .. }, Frame::Predicate(predicate)] => {
                (term.clone(), predicate.clone())
            }
            _ => return Err(self.invariant("object emitted without subject and predicate frames")),
        };
        self.emit(Triple::new(subject, predicate, object))
    }

    fn emit(&mut self, triple: Triple) -> Result<(), TtlParseError> {
        Ok(self.emitter.emit(triple)?)
    }

    fn dot_starts_number(&mut self) -> io::Result<bool> {
        Ok(self.source.peek2()?.is_some_and(|c| c.is_ascii_digit()))
    }

    /// Whether the next character ends a keyword (whitespace, comment or EOF).
    fn keyword_break(&mut self) -> io::Result<bool> {
        Ok(self
            .source
            .peek()?
            .is_none_or(|c| is_whitespace(c) || c == '#'))
    }

    fn err(&mut self, kind: TtlSyntaxErrorKind) -> TtlParseError {
        lexer::syntax_error(&mut self.source, kind)
    }

    fn unexpected_here(&mut self) -> TtlParseError {
        lexer::unexpected_here(&mut self.source, self.state, self.frames.len())
    }

    fn invariant(&mut self, detail: &str) -> TtlParseError {
        self.err(TtlSyntaxErrorKind::InternalInvariant {
            detail: detail.into(),
        })
    }
}

fn is_term_start_char(c: char) -> bool {
    matches!(c, '<' | '_' | '[' | '(' | '"' | '\'' | ':' | '+' | '-')
        || c.is_ascii_digit()
        || is_pn_chars_base(c)
}
