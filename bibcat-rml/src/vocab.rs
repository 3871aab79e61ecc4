//! Rule vocabulary constants
//!
//! BIBCAT rules combine W3C R2RML (`rr:`), the RML extension for
//! non-relational sources (`rml:`, `ql:`), and the KnowledgeLinks data
//! structures namespace (`kds:`) for the blank-node policy.
//!
//! ```
//! use bibcat_rml::RML;
//!
//! assert_eq!(RML::TRIPLES_MAP, "http://www.w3.org/ns/r2rml#TriplesMap");
//! assert!(RML::ITERATOR.starts_with(RML::RML_NS));
//! ```

/// Rule vocabulary namespaces and constants
pub struct RML;

impl RML {
    // ==========================================================================
    // Namespaces
    // ==========================================================================

    pub const RR_NS: &'static str = "http://www.w3.org/ns/r2rml#";
    pub const RML_NS: &'static str = "http://semweb.mmlab.be/ns/rml#";
    pub const QL_NS: &'static str = "http://semweb.mmlab.be/ns/ql#";
    pub const KDS_NS: &'static str = "http://knowledgelinks.io/ns/data-structures/";

    // ==========================================================================
    // Classes
    // ==========================================================================

    /// rr:TriplesMap
    pub const TRIPLES_MAP: &'static str = "http://www.w3.org/ns/r2rml#TriplesMap";

    // ==========================================================================
    // Properties - Logical Source
    // ==========================================================================

    /// rml:logicalSource - Links a TriplesMap to its logical source
    pub const LOGICAL_SOURCE: &'static str = "http://semweb.mmlab.be/ns/rml#logicalSource";

    /// rml:source - Locator of the source (file, endpoint, or opaque name)
    pub const SOURCE: &'static str = "http://semweb.mmlab.be/ns/rml#source";

    /// rml:iterator - Path expression selecting the iteration nodes
    pub const ITERATOR: &'static str = "http://semweb.mmlab.be/ns/rml#iterator";

    /// rml:referenceFormulation - How references are evaluated
    pub const REFERENCE_FORMULATION: &'static str =
        "http://semweb.mmlab.be/ns/rml#referenceFormulation";

    /// rml:query - Parameterized query for remote bindings sources
    pub const QUERY: &'static str = "http://semweb.mmlab.be/ns/rml#query";

    /// rml:reference - Path expression evaluated against the iteration node
    pub const REFERENCE: &'static str = "http://semweb.mmlab.be/ns/rml#reference";

    // ==========================================================================
    // Reference formulations
    // ==========================================================================

    pub const QL_XPATH: &'static str = "http://semweb.mmlab.be/ns/ql#XPath";
    pub const QL_JSONPATH: &'static str = "http://semweb.mmlab.be/ns/ql#JSONPath";
    pub const QL_CSV: &'static str = "http://semweb.mmlab.be/ns/ql#CSV";
    pub const QL_SPARQL: &'static str = "http://semweb.mmlab.be/ns/ql#SPARQL";

    // ==========================================================================
    // Properties - Subject / Predicate / Object maps
    // ==========================================================================

    pub const SUBJECT_MAP: &'static str = "http://www.w3.org/ns/r2rml#subjectMap";
    /// rr:subject - Shortcut for a constant subject
    pub const SUBJECT: &'static str = "http://www.w3.org/ns/r2rml#subject";
    pub const CLASS: &'static str = "http://www.w3.org/ns/r2rml#class";
    pub const PREDICATE_OBJECT_MAP: &'static str =
        "http://www.w3.org/ns/r2rml#predicateObjectMap";
    pub const PREDICATE: &'static str = "http://www.w3.org/ns/r2rml#predicate";
    pub const PREDICATE_MAP: &'static str = "http://www.w3.org/ns/r2rml#predicateMap";
    pub const OBJECT_MAP: &'static str = "http://www.w3.org/ns/r2rml#objectMap";
    /// rr:object - Shortcut for a constant object
    pub const OBJECT: &'static str = "http://www.w3.org/ns/r2rml#object";
    pub const PARENT_TRIPLES_MAP: &'static str = "http://www.w3.org/ns/r2rml#parentTriplesMap";

    // ==========================================================================
    // Properties - Term Maps
    // ==========================================================================

    pub const TEMPLATE: &'static str = "http://www.w3.org/ns/r2rml#template";
    pub const CONSTANT: &'static str = "http://www.w3.org/ns/r2rml#constant";
    /// rr:column - accepted as a synonym of rml:reference
    pub const COLUMN: &'static str = "http://www.w3.org/ns/r2rml#column";
    pub const TERM_TYPE: &'static str = "http://www.w3.org/ns/r2rml#termType";
    pub const DATATYPE: &'static str = "http://www.w3.org/ns/r2rml#datatype";
    pub const LANGUAGE: &'static str = "http://www.w3.org/ns/r2rml#language";

    // ==========================================================================
    // Term Type Values
    // ==========================================================================

    pub const IRI: &'static str = "http://www.w3.org/ns/r2rml#IRI";
    pub const BLANK_NODE: &'static str = "http://www.w3.org/ns/r2rml#BlankNode";
    pub const LITERAL: &'static str = "http://www.w3.org/ns/r2rml#Literal";

    // ==========================================================================
    // kds: blank-node and multi-value policy
    // ==========================================================================

    /// kds:delimiter - Separator for splitting a value (repeatable, applied in order)
    pub const DELIMITER: &'static str = "http://knowledgelinks.io/ns/data-structures/delimiter";

    /// kds:valuePredicate - Predicate carrying the value on a sub-entity
    pub const VALUE_PREDICATE: &'static str =
        "http://knowledgelinks.io/ns/data-structures/valuePredicate";

    /// kds:reuseBlankNode - Reuse a sub-entity already linked via the same predicate
    pub const REUSE_BLANK_NODE: &'static str =
        "http://knowledgelinks.io/ns/data-structures/reuseBlankNode";

    /// kds:additionalPropertyUris - Node whose statements are copied onto each sub-entity
    pub const ADDITIONAL_PROPERTIES: &'static str =
        "http://knowledgelinks.io/ns/data-structures/additionalPropertyUris";

    /// kds:dedup - Subjects of this map are candidates for identity resolution
    pub const DEDUP: &'static str = "http://knowledgelinks.io/ns/data-structures/dedup";

    /// rdf:type (re-exported for convenience)
    pub const RDF_TYPE: &'static str = bibcat_vocab::rdf::TYPE;
}
