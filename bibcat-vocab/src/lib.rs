//! RDF vocabulary constants for BIBCAT
//!
//! Central location for the vocabulary IRIs used by the mapping engine, the
//! deduplicator and the harvester.
//!
//! # Organization
//!
//! Constants are organized by vocabulary:
//! - `rdf` - RDF vocabulary (http://www.w3.org/1999/02/22-rdf-syntax-ns#)
//! - `rdfs` - RDFS vocabulary (http://www.w3.org/2000/01/rdf-schema#)
//! - `xsd` - XSD vocabulary (http://www.w3.org/2001/XMLSchema#)
//! - `owl` - OWL identity vocabulary
//! - `skos` - SKOS labelling properties
//! - `schema` - schema.org properties used for labels
//! - `bf` - BIBFRAME 2.0 classes and properties
//! - `xml_ns` - XML namespaces of the record formats the engine reads

/// RDF vocabulary constants
pub mod rdf {
    /// Namespace IRI
    pub const NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

    /// rdf:type IRI
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

    /// rdf:value IRI (default property for sub-entity literal values)
    pub const VALUE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#value";

    /// rdf:langString IRI
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
}

/// RDFS vocabulary constants
pub mod rdfs {
    /// Namespace IRI
    pub const NS: &str = "http://www.w3.org/2000/01/rdf-schema#";

    /// rdfs:label IRI
    pub const LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
}

/// XSD vocabulary constants
pub mod xsd {
    /// Namespace IRI
    pub const NS: &str = "http://www.w3.org/2001/XMLSchema#";

    /// xsd:string IRI
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

    /// xsd:integer IRI
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";

    /// xsd:decimal IRI
    pub const DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";

    /// xsd:boolean IRI
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";

    /// xsd:date IRI
    pub const DATE: &str = "http://www.w3.org/2001/XMLSchema#date";

    /// xsd:dateTime IRI
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";

    /// xsd:gYear IRI
    pub const G_YEAR: &str = "http://www.w3.org/2001/XMLSchema#gYear";

    /// xsd:anyURI IRI
    pub const ANY_URI: &str = "http://www.w3.org/2001/XMLSchema#anyURI";
}

/// OWL identity constants
pub mod owl {
    /// owl:sameAs IRI
    pub const SAME_AS: &str = "http://www.w3.org/2002/07/owl#sameAs";
}

/// SKOS labelling properties
pub mod skos {
    /// skos:prefLabel IRI
    pub const PREF_LABEL: &str = "http://www.w3.org/2004/02/skos/core#prefLabel";

    /// skos:altLabel IRI
    pub const ALT_LABEL: &str = "http://www.w3.org/2004/02/skos/core#altLabel";
}

/// schema.org properties
pub mod schema {
    /// schema:name IRI
    pub const NAME: &str = "http://schema.org/name";

    /// schema:alternateName IRI
    pub const ALTERNATE_NAME: &str = "http://schema.org/alternateName";
}

/// BIBFRAME 2.0 vocabulary
pub mod bf {
    /// Namespace IRI
    pub const NS: &str = "http://id.loc.gov/ontologies/bibframe/";

    /// bf:Work class
    pub const WORK: &str = "http://id.loc.gov/ontologies/bibframe/Work";

    /// bf:Instance class
    pub const INSTANCE: &str = "http://id.loc.gov/ontologies/bibframe/Instance";

    /// bf:Item class
    pub const ITEM: &str = "http://id.loc.gov/ontologies/bibframe/Item";

    /// bf:Agent class
    pub const AGENT: &str = "http://id.loc.gov/ontologies/bibframe/Agent";

    /// bf:Person class
    pub const PERSON: &str = "http://id.loc.gov/ontologies/bibframe/Person";

    /// bf:Organization class
    pub const ORGANIZATION: &str = "http://id.loc.gov/ontologies/bibframe/Organization";

    /// bf:Topic class
    pub const TOPIC: &str = "http://id.loc.gov/ontologies/bibframe/Topic";

    /// bf:Title class
    pub const TITLE_CLASS: &str = "http://id.loc.gov/ontologies/bibframe/Title";

    /// bf:title property
    pub const TITLE: &str = "http://id.loc.gov/ontologies/bibframe/title";

    /// bf:mainTitle property
    pub const MAIN_TITLE: &str = "http://id.loc.gov/ontologies/bibframe/mainTitle";

    /// bf:subtitle property
    pub const SUBTITLE: &str = "http://id.loc.gov/ontologies/bibframe/subtitle";

    /// bf:subject property
    pub const SUBJECT: &str = "http://id.loc.gov/ontologies/bibframe/subject";

    /// bf:instanceOf property
    pub const INSTANCE_OF: &str = "http://id.loc.gov/ontologies/bibframe/instanceOf";

    /// bf:agent property
    pub const AGENT_PROP: &str = "http://id.loc.gov/ontologies/bibframe/agent";

    /// bf:source property
    pub const SOURCE: &str = "http://id.loc.gov/ontologies/bibframe/source";
}

/// XML namespaces of the record formats read by the engine
pub mod xml_ns {
    /// MODS 3.x
    pub const MODS: &str = "http://www.loc.gov/mods/v3";

    /// Dublin Core elements 1.1
    pub const DC: &str = "http://purl.org/dc/elements/1.1/";

    /// OAI-PMH 2.0 envelope
    pub const OAI_PMH: &str = "http://www.openarchives.org/OAI/2.0/";

    /// OAI Dublin Core container
    pub const OAI_DC: &str = "http://www.openarchives.org/OAI/2.0/oai_dc/";

    /// MARC 21 XML
    pub const MARC: &str = "http://www.loc.gov/MARC21/slim";

    /// XLink
    pub const XLINK: &str = "http://www.w3.org/1999/xlink";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespaced_constants() {
        assert!(rdf::TYPE.starts_with(rdf::NS));
        assert!(rdf::VALUE.starts_with(rdf::NS));
        assert!(rdfs::LABEL.starts_with(rdfs::NS));
        assert!(xsd::DATE_TIME.starts_with(xsd::NS));
        assert!(bf::MAIN_TITLE.starts_with(bf::NS));
    }
}
