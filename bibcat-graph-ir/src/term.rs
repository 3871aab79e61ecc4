//! RDF term types: IRI, blank node, and literal
//!
//! A term can be:
//! - An IRI (always expanded, never prefixed)
//! - A blank node (label scoped to one graph)
//! - A literal (lexical value + explicit datatype + optional language tag)

use crate::Datatype;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;

/// Blank node identifier
///
/// Labels are only meaningful inside the graph that minted them. The mapping
/// engine mints `{prefix}{n}` labels from a per-execution counter; Turtle
/// rule graphs keep the labels written in the document.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlankId(Arc<str>);

impl BlankId {
    /// Create a blank node ID from a label
    ///
    /// The label should NOT include the `_:` prefix.
    pub fn new(label: impl AsRef<str>) -> Self {
        Self(Arc::from(label.as_ref()))
    }

    /// Get the label (without `_:` prefix)
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BlankId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "_:{}", self.0)
    }
}

/// An RDF term (subject, predicate, or object position)
///
/// # Invariants
///
/// - `Term::Iri` always contains an **expanded** IRI.
/// - For `Term::Literal` with a language tag, the datatype is `rdf:langString`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    /// Full expanded IRI
    Iri(Arc<str>),

    /// Blank node
    BlankNode(BlankId),

    /// Literal value with explicit datatype
    Literal {
        /// Lexical form
        value: Arc<str>,
        /// Datatype (always present)
        datatype: Datatype,
        /// Language tag (only when datatype is rdf:langString)
        language: Option<Arc<str>>,
    },
}

impl Term {
    /// Create an IRI term from an expanded IRI string
    pub fn iri(iri: impl AsRef<str>) -> Self {
        Term::Iri(Arc::from(iri.as_ref()))
    }

    /// Create a blank node term
    pub fn blank(label: impl AsRef<str>) -> Self {
        Term::BlankNode(BlankId::new(label))
    }

    /// Create a plain string literal (xsd:string)
    pub fn string(value: impl AsRef<str>) -> Self {
        Term::Literal {
            value: Arc::from(value.as_ref()),
            datatype: Datatype::xsd_string(),
            language: None,
        }
    }

    /// Create a language-tagged string literal (rdf:langString)
    pub fn lang_string(value: impl AsRef<str>, lang: impl AsRef<str>) -> Self {
        Term::Literal {
            value: Arc::from(value.as_ref()),
            datatype: Datatype::rdf_lang_string(),
            language: Some(Arc::from(lang.as_ref())),
        }
    }

    /// Create a typed literal with a custom datatype
    pub fn typed(value: impl AsRef<str>, datatype: Datatype) -> Self {
        Term::Literal {
            value: Arc::from(value.as_ref()),
            datatype,
            language: None,
        }
    }

    pub fn is_iri(&self) -> bool {
        matches!(self, Term::Iri(_))
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Term::BlankNode(_))
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal { .. })
    }

    /// Try to get as IRI string
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    /// Try to get as blank node ID
    pub fn as_blank(&self) -> Option<&BlankId> {
        match self {
            Term::BlankNode(id) => Some(id),
            _ => None,
        }
    }

    /// Try to get literal components
    pub fn as_literal(&self) -> Option<(&str, &Datatype, Option<&str>)> {
        match self {
            Term::Literal {
                value,
                datatype,
                language,
            } => Some((value, datatype, language.as_deref())),
            _ => None,
        }
    }

    /// The string content of the term: the IRI, the blank label, or the
    /// literal's lexical form
    pub fn lexical(&self) -> &str {
        match self {
            Term::Iri(iri) => iri,
            Term::BlankNode(id) => id.as_str(),
            Term::Literal { value, .. } => value,
        }
    }
}

impl PartialOrd for Term {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Term {
    fn cmp(&self, other: &Self) -> Ordering {
        // BlankNode < Iri < Literal
        let type_ord = |t: &Term| -> u8 {
            match t {
                Term::BlankNode(_) => 0,
                Term::Iri(_) => 1,
                Term::Literal { .. } => 2,
            }
        };

        match type_ord(self).cmp(&type_ord(other)) {
            Ordering::Equal => {}
            ord => return ord,
        }

        match (self, other) {
            (Term::Iri(a), Term::Iri(b)) => a.cmp(b),
            (Term::BlankNode(a), Term::BlankNode(b)) => a.cmp(b),
            (
                Term::Literal {
                    value: v1,
                    datatype: d1,
                    language: l1,
                },
                Term::Literal {
                    value: v2,
                    datatype: d2,
                    language: l2,
                },
            ) => (d1, l1, v1).cmp(&(d2, l2, v2)),
            _ => Ordering::Equal,
        }
    }
}

impl std::fmt::Display for Term {
    /// N-Triples form
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{}>", crate::ntriples::escape_iri(iri)),
            Term::BlankNode(id) => write!(f, "{}", id),
            Term::Literal {
                value,
                datatype,
                language,
            } => {
                write!(f, "\"{}\"", crate::ntriples::escape_literal(value))?;
                if let Some(lang) = language {
                    write!(f, "@{}", lang)
                } else if !datatype.is_xsd_string() {
                    write!(f, "^^<{}>", datatype.as_iri())
                } else {
                    Ok(())
                }
            }
        }
    }
}
