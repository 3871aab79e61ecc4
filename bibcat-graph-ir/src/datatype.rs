//! RDF datatype representation
//!
//! Datatypes are always explicit in this IR - there is no "untyped" literal.
//! Plain strings default to `xsd:string`, and language-tagged strings use
//! `rdf:langString`.

use bibcat_vocab::{rdf, xsd};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// RDF literal datatype (always an expanded IRI)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Datatype(Arc<str>);

impl Datatype {
    /// Create a datatype from an expanded IRI
    pub fn from_iri(iri: impl AsRef<str>) -> Self {
        Datatype(Arc::from(iri.as_ref()))
    }

    /// xsd:string - default for plain string literals
    pub fn xsd_string() -> Self {
        Self::from_iri(xsd::STRING)
    }

    /// xsd:integer
    pub fn xsd_integer() -> Self {
        Self::from_iri(xsd::INTEGER)
    }

    /// xsd:dateTime
    pub fn xsd_date_time() -> Self {
        Self::from_iri(xsd::DATE_TIME)
    }

    /// rdf:langString - for language-tagged literals
    pub fn rdf_lang_string() -> Self {
        Self::from_iri(rdf::LANG_STRING)
    }

    /// Get the IRI of this datatype
    pub fn as_iri(&self) -> &str {
        &self.0
    }

    /// Check if this is the xsd:string datatype
    pub fn is_xsd_string(&self) -> bool {
        self.0.as_ref() == xsd::STRING
    }

    /// Check if this is the rdf:langString datatype
    pub fn is_lang_string(&self) -> bool {
        self.0.as_ref() == rdf::LANG_STRING
    }
}

impl std::fmt::Display for Datatype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
