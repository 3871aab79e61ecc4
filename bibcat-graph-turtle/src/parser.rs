//! rio_turtle adapter

use crate::error::{Result, TurtleError};
use bibcat_graph_ir::{Datatype, GraphSink, TermId};
use rio_api::model::{Literal, Subject, Term};
use rio_api::parser::TriplesParser;
use rio_turtle::TurtleParser;

/// Parse a Turtle document, emitting every triple into `sink`
///
/// Prefix declarations are reported through `on_prefix` once the document
/// has been read.
pub fn parse<S: GraphSink>(input: &str, sink: &mut S) -> Result<()> {
    let mut parser = TurtleParser::new(input.as_bytes(), None);
    let mut count = 0usize;

    parser.parse_all(&mut |triple| -> Result<()> {
        let s = subject_id(sink, triple.subject)?;
        let p = sink.term_iri(triple.predicate.iri);
        let o = object_id(sink, triple.object)?;
        sink.emit_triple(s, p, o);
        count += 1;
        Ok(())
    })?;

    let mut prefixes: Vec<_> = parser.prefixes().iter().collect();
    prefixes.sort();
    for (prefix, ns) in prefixes {
        sink.on_prefix(prefix, ns);
    }

    tracing::debug!(triples = count, "parsed turtle document");
    Ok(())
}

fn subject_id<S: GraphSink>(sink: &mut S, subject: Subject<'_>) -> Result<TermId> {
    match subject {
        Subject::NamedNode(n) => Ok(sink.term_iri(n.iri)),
        Subject::BlankNode(b) => Ok(sink.term_blank(Some(b.id))),
        _ => Err(TurtleError::Unsupported("quoted triple subject".to_string())),
    }
}

fn object_id<S: GraphSink>(sink: &mut S, object: Term<'_>) -> Result<TermId> {
    match object {
        Term::NamedNode(n) => Ok(sink.term_iri(n.iri)),
        Term::BlankNode(b) => Ok(sink.term_blank(Some(b.id))),
        Term::Literal(Literal::Simple { value }) => {
            Ok(sink.term_literal(value, Datatype::xsd_string(), None))
        }
        Term::Literal(Literal::LanguageTaggedString { value, language }) => {
            Ok(sink.term_literal(value, Datatype::rdf_lang_string(), Some(language)))
        }
        Term::Literal(Literal::Typed { value, datatype }) => {
            Ok(sink.term_literal(value, Datatype::from_iri(datatype.iri), None))
        }
        _ => Err(TurtleError::Unsupported("quoted triple object".to_string())),
    }
}
