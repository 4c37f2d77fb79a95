use std::collections::HashSet;
use ttlmodel::vocab::{rdf, xsd};
use ttlmodel::{BlankNode, Literal, NamedNode, NamedOrBlankNode, Term, Triple};
use ttlstream::{Emitter, TtlParseError, TtlParser, TtlSyntaxErrorKind, WriterEmitter};

fn parse(text: &str) -> Vec<Triple> {
    TtlParser::new().parse_str(text).unwrap().triples
}

fn iri(value: &str) -> NamedNode {
    NamedNode::new_unchecked(value)
}

fn bnode(label: &str) -> BlankNode {
    BlankNode::new_unchecked(label)
}

#[test]
fn single_triple_with_absolute_iris() {
    assert_eq!(
        parse("<http://a/s> <http://a/p> <http://a/o> ."),
        [Triple::new(
            iri("http://a/s"),
            iri("http://a/p"),
            iri("http://a/o"),
        )]
    );
}

#[test]
fn prefix_and_the_a_shorthand() {
    let triples = parse("@prefix ex: <http://e/> .\nex:s a ex:T .");
    assert_eq!(
        triples,
        [Triple::new(iri("http://e/s"), rdf::TYPE, iri("http://e/T"))]
    );
}

#[test]
fn predicate_object_list() {
    let triples = parse("<s> <p1> <o1> ; <p2> <o2> , <o3> .");
    assert_eq!(
        triples,
        [
            Triple::new(iri("s"), iri("p1"), iri("o1")),
            Triple::new(iri("s"), iri("p2"), iri("o2")),
            Triple::new(iri("s"), iri("p2"), iri("o3")),
        ]
    );
}

#[test]
fn anonymous_blank_node_object() {
    let triples = parse("<s> <p> [ <q> <o> ] .");
    assert_eq!(
        triples,
        [
            Triple::new(iri("s"), iri("p"), bnode("b0")),
            Triple::new(bnode("b0"), iri("q"), iri("o")),
        ]
    );
}

#[test]
fn collection_of_three() {
    let triples = parse("<s> <p> ( <a> <b> <c> ) .");
    assert_eq!(
        triples,
        [
            Triple::new(iri("s"), iri("p"), bnode("b0")),
            Triple::new(bnode("b0"), rdf::FIRST, iri("a")),
            Triple::new(bnode("b0"), rdf::REST, bnode("b1")),
            Triple::new(bnode("b1"), rdf::FIRST, iri("b")),
            Triple::new(bnode("b1"), rdf::REST, bnode("b2")),
            Triple::new(bnode("b2"), rdf::FIRST, iri("c")),
            Triple::new(bnode("b2"), rdf::REST, rdf::NIL),
        ]
    );
}

#[test]
fn unknown_prefix_with_empty_context() {
    let error = TtlParser::new().parse_str("ex:s <p> <o> .").unwrap_err();
    let TtlParseError::Syntax(error) = error else {
        panic!("expected a syntax error, got: {error}");
    };
    assert!(
        matches!(error.kind(), TtlSyntaxErrorKind::UnknownPrefix { prefix } if prefix == "ex"),
        "unexpected kind: {error}"
    );
}

#[test]
fn empty_input_yields_nothing() {
    let document = TtlParser::new().parse_str("").unwrap();
    assert!(document.triples.is_empty());
    assert!(document.context.is_empty());
}

#[test]
fn whitespace_only_input_yields_nothing() {
    let document = TtlParser::new().parse_str(" \t\r\n\u{0C} # just a comment").unwrap();
    assert!(document.triples.is_empty());
}

#[test]
fn unmatched_brackets_are_eof_errors() {
    for text in ["<s> <p> [ <q> <o> ", "<s> <p> ( <a> <b> "] {
        let error = TtlParser::new().parse_str(text).unwrap_err();
        let TtlParseError::Syntax(error) = error else {
            panic!("expected a syntax error, got: {error}");
        };
        assert!(
            matches!(error.kind(), TtlSyntaxErrorKind::UnexpectedEof { .. }),
            "unexpected kind for {text:?}: {error}"
        );
    }
}

#[test]
fn every_subject_is_iri_or_blank_and_every_predicate_is_iri() {
    let triples = parse(
        "@prefix ex: <http://e/> .
         ex:s ex:p ( 1 2 ( true ) ) ;
              ex:q [ ex:r 'nested' ; ex:s ( ex:o ) ] .
         [ ex:t 3.5 ] ex:u ex:v .",
    );
    // predicates are IRIs by construction (Triple.predicate is a NamedNode);
    // check no literal ever lands in subject position
    for triple in &triples {
        match &triple.subject {
            NamedOrBlankNode::NamedNode(_) | NamedOrBlankNode::BlankNode(_) => (),
        }
    }
    assert!(triples.len() >= 10);
}

#[test]
fn generated_blank_node_labels_are_distinct() {
    let triples = parse(
        "<s> <p> [ <q> [ <r> ( <a> <b> ) ] ] .
         <s2> <p2> ( ( 1 ) ( 2 ) ) .",
    );
    let mut generated = HashSet::new();
    let mut count = 0;
    for triple in &triples {
        for term in [
            Term::from(triple.subject.clone()),
            triple.object.clone(),
        ] {
            if let Term::BlankNode(node) = term {
                count += 1;
                generated.insert(node.into_string());
            }
        }
    }
    assert!(count > generated.len(), "blank nodes should be referenced repeatedly");
    // b0..=b7: two anon blocks, two cells, then head+cell pairs for the nested lists
    assert!(generated.iter().all(|label| label.starts_with('b')));
}

#[test]
fn collection_invariant_k_firsts_k_rests() {
    let k = 5;
    let elements: Vec<String> = (0..k).map(|i| format!("<http://a/e{i}>")).collect();
    let text = format!("<http://a/s> <http://a/p> ( {} ) .", elements.join(" "));
    let triples = parse(&text);
    let firsts = triples
        .iter()
        .filter(|t| t.predicate == rdf::FIRST)
        .count();
    let rests: Vec<&Triple> = triples
        .iter()
        .filter(|t| t.predicate == rdf::REST)
        .collect();
    assert_eq!(firsts, k);
    assert_eq!(rests.len(), k);
    assert_eq!(rests.last().unwrap().object, rdf::NIL.into());
}

#[test]
fn context_reflects_exactly_the_bound_prefixes() {
    let document = TtlParser::new()
        .with_prefix("seed", "http://seed.example/")
        .unwrap()
        .parse_str(
            "@prefix ex: <http://e/> .
             PREFIX other: <http://o/>
             ex:s ex:p other:o .",
        )
        .unwrap();
    let mut prefixes: Vec<(&str, &str)> = document.context.prefixes().collect();
    prefixes.sort_unstable();
    assert_eq!(
        prefixes,
        [
            ("ex", "http://e/"),
            ("other", "http://o/"),
            ("seed", "http://seed.example/"),
        ]
    );
}

#[test]
fn all_term_kinds_in_object_position() {
    let triples = parse(
        "@prefix ex: <http://e/> .
         <s> <p> ex:o, <o2>, _:label, \"text\", 7, true .",
    );
    let objects: Vec<Term> = triples.into_iter().map(|t| t.object).collect();
    assert_eq!(
        objects,
        [
            iri("http://e/o").into(),
            iri("o2").into(),
            bnode("label").into(),
            Literal::new_simple("text").into(),
            Literal::new_typed("7", xsd::INTEGER).into(),
            Literal::new_typed("true", xsd::BOOLEAN).into(),
        ]
    );
}

#[test]
fn writer_abbreviates_with_bound_prefixes() {
    let document = TtlParser::new()
        .parse_str(
            "@prefix schema: <http://schema.org/> .
             <http://example.com/foo> a schema:Person ;
                 schema:name \"Foo\" .",
        )
        .unwrap();
    let mut emitter = WriterEmitter::with_context(Vec::new(), &document.context);
    for triple in document.triples {
        emitter.emit(triple).unwrap();
    }
    assert_eq!(
        String::from_utf8(emitter.finish()).unwrap(),
        "<http://example.com/foo> a schema:Person .\n\
         <http://example.com/foo> schema:name \"Foo\" .\n"
    );
}

#[test]
fn round_trip_through_the_writer_emitter() {
    let source = "@prefix ex: <http://e/> .
        ex:s a ex:T ;
            ex:p ( 1 2 3 ) ;
            ex:q [ ex:r \"chat\"@en ] ;
            ex:s2 \"esc\\\"aped\\n\", -4.2, _:shared .
        _:shared ex:t ex:s .";
    let document = TtlParser::new().parse_str(source).unwrap();
    let mut emitter = WriterEmitter::with_context(Vec::new(), &document.context);
    for triple in &document.triples {
        emitter.emit(triple.clone()).unwrap();
    }
    let lines = emitter.finish();

    // the writer abbreviated with the document's own prefixes, so the
    // re-parse needs the same context seeded
    let mut reparser = TtlParser::new();
    for (name, iri) in document.context.prefixes() {
        reparser = reparser.with_prefix(name, iri).unwrap();
    }
    let second = reparser
        .parse_str(std::str::from_utf8(&lines).unwrap())
        .unwrap()
        .triples;
    // labels are reallocated deterministically in emission order, so the
    // round trip reproduces the triples exactly
    assert_eq!(document.triples, second);
}

#[test]
fn streaming_output_is_truncated_on_failure() {
    let mut emitter = WriterEmitter::new(Vec::new());
    let result = TtlParser::new().parse_with_emitter(
        "<http://a/s> <http://a/p> <http://a/o> . <http://a/s2> } ".as_bytes(),
        &mut emitter,
    );
    assert!(result.is_err());
    assert_eq!(
        String::from_utf8(emitter.finish()).unwrap(),
        "<http://a/s> <http://a/p> <http://a/o> .\n"
    );
}

#[test]
fn collecting_parse_discards_on_failure() {
    // one valid statement followed by a truncated one: the collecting entry
    // point returns the error alone, never the partial triples
    let error = TtlParser::new()
        .parse_str("<http://a/s> <http://a/p> <http://a/o> . <oops")
        .unwrap_err();
    let TtlParseError::Syntax(error) = error else {
        panic!("expected a syntax error, got: {error}");
    };
    assert!(matches!(
        error.kind(),
        TtlSyntaxErrorKind::UnexpectedEof { .. }
    ));
}

#[test]
fn two_parses_do_not_share_blank_node_counters() {
    let first = parse("<s> <p> [] .");
    let second = parse("<s2> <p2> [] .");
    assert_eq!(first[0].object, bnode("b0").into());
    assert_eq!(second[0].object, bnode("b0").into());
}
