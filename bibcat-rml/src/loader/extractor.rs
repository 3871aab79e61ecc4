//! Rule extraction
//!
//! Reads TriplesMap definitions out of a rule graph. A subject counts as a
//! TriplesMap when it is typed `rr:TriplesMap` or carries a logical source
//! or subject map; maps come out in declaration order.

use std::collections::{HashMap, HashSet};

use bibcat_graph_ir::{Graph, Term, Triple};

use crate::error::{RmlError, RmlResult};
use crate::mapping::{
    LogicalSource, ObjectTerm, PredicateObjectMap, ReferenceFormulation, SubjectMap, SubjectTerm,
    TermType, TriplesMap,
};
use crate::vocab::RML;

/// Extracts TriplesMaps from a rule graph
pub struct MappingExtractor<'a> {
    graph: &'a Graph,
    /// Index: subject → triples with that subject, in graph order
    by_subject: HashMap<&'a Term, Vec<&'a Triple>>,
}

impl<'a> MappingExtractor<'a> {
    pub fn new(graph: &'a Graph) -> Self {
        let mut by_subject: HashMap<&Term, Vec<&Triple>> = HashMap::new();
        for triple in graph.iter() {
            by_subject.entry(&triple.s).or_default().push(triple);
        }
        Self { graph, by_subject }
    }

    /// Extract every TriplesMap in the graph
    pub fn extract_all(&self) -> RmlResult<Vec<TriplesMap>> {
        let mut seen = HashSet::new();
        let mut triples_maps = Vec::new();

        for triple in self.graph.iter() {
            let Some(subject) = triple.s.as_iri() else {
                continue;
            };
            let marks_map = match triple.p.as_iri() {
                Some(RML::RDF_TYPE) => triple.o.as_iri() == Some(RML::TRIPLES_MAP),
                Some(RML::LOGICAL_SOURCE | RML::SUBJECT_MAP | RML::SUBJECT) => true,
                _ => false,
            };
            if marks_map && seen.insert(subject) {
                triples_maps.push(self.extract_triples_map(&triple.s, subject)?);
            }
        }

        tracing::debug!(maps = triples_maps.len(), "extracted TriplesMaps");
        Ok(triples_maps)
    }

    fn extract_triples_map(&self, term: &Term, iri: &str) -> RmlResult<TriplesMap> {
        let triples = self.triples_for(term);

        Ok(TriplesMap {
            iri: iri.to_string(),
            logical_source: self.extract_logical_source(&triples)?,
            subject_map: self.extract_subject_map(&triples)?,
            predicate_object_maps: self.extract_predicate_object_maps(&triples)?,
        })
    }

    fn extract_logical_source(&self, triples: &[&Triple]) -> RmlResult<Option<LogicalSource>> {
        let Some(ls_term) = self.find_object_optional(triples, RML::LOGICAL_SOURCE) else {
            return Ok(None);
        };
        let ls_triples = self.triples_for(&ls_term);

        let source = self.string_of(&ls_triples, RML::SOURCE);
        let iterator = self.string_of(&ls_triples, RML::ITERATOR);
        let query = self.string_of(&ls_triples, RML::QUERY);

        let formulation = match self.find_object_optional(&ls_triples, RML::REFERENCE_FORMULATION) {
            Some(term) => {
                let iri = self.term_to_iri(&term).ok_or_else(|| RmlError::InvalidValue {
                    property: "rml:referenceFormulation".to_string(),
                    message: "expected IRI".to_string(),
                })?;
                match iri.as_str() {
                    RML::QL_XPATH => ReferenceFormulation::XPath,
                    RML::QL_JSONPATH => ReferenceFormulation::JsonPath,
                    RML::QL_SPARQL => ReferenceFormulation::Sparql,
                    RML::QL_CSV => ReferenceFormulation::Rows,
                    other => {
                        return Err(RmlError::InvalidValue {
                            property: "rml:referenceFormulation".to_string(),
                            message: format!("unsupported formulation {other}"),
                        })
                    }
                }
            }
            None if query.is_some() => ReferenceFormulation::Sparql,
            None => ReferenceFormulation::Rows,
        };

        Ok(Some(LogicalSource {
            source,
            iterator,
            formulation,
            query,
        }))
    }

    fn extract_subject_map(&self, triples: &[&Triple]) -> RmlResult<Option<SubjectMap>> {
        // Shorthand rr:subject
        if let Some(subject) = self.find_object_optional(triples, RML::SUBJECT) {
            let iri = self.term_to_iri(&subject).ok_or_else(|| RmlError::InvalidValue {
                property: "rr:subject".to_string(),
                message: "expected IRI".to_string(),
            })?;
            return Ok(Some(SubjectMap::new(SubjectTerm::Constant(iri))));
        }

        let Some(sm_term) = self.find_object_optional(triples, RML::SUBJECT_MAP) else {
            return Ok(None);
        };
        let sm_triples = self.triples_for(&sm_term);

        let term_type = self.term_type_of(&sm_triples)?.unwrap_or(TermType::Iri);
        if term_type == TermType::Literal {
            return Err(RmlError::InvalidValue {
                property: "rr:termType".to_string(),
                message: "subjects cannot be literals".to_string(),
            });
        }

        let term = if let Some(template) = self.string_of(&sm_triples, RML::TEMPLATE) {
            Some(SubjectTerm::Template(template))
        } else if let Some(constant) = self.find_object_optional(&sm_triples, RML::CONSTANT) {
            let iri = self.term_to_iri(&constant).ok_or_else(|| RmlError::InvalidValue {
                property: "rr:constant".to_string(),
                message: "subject constant must be an IRI".to_string(),
            })?;
            Some(SubjectTerm::Constant(iri))
        } else if let Some(reference) = self.reference_of(&sm_triples) {
            Some(SubjectTerm::Reference(reference))
        } else if term_type == TermType::BlankNode {
            Some(SubjectTerm::BlankNode)
        } else {
            None
        };

        let classes = self
            .find_objects(&sm_triples, RML::CLASS)
            .iter()
            .filter_map(|t| self.term_to_iri(t))
            .collect();

        let dedup = self
            .string_of(&sm_triples, RML::DEDUP)
            .map(|v| is_true(&v))
            .unwrap_or(false);

        Ok(Some(SubjectMap {
            term,
            term_type,
            classes,
            dedup,
        }))
    }

    fn extract_predicate_object_maps(
        &self,
        triples: &[&Triple],
    ) -> RmlResult<Vec<PredicateObjectMap>> {
        let mut poms = Vec::new();
        for pom_term in self.find_objects(triples, RML::PREDICATE_OBJECT_MAP) {
            let pom_triples = self.triples_for(&pom_term);
            let predicates = self.extract_predicates(&pom_triples)?;
            let objects = self.extract_objects(&pom_triples)?;

            // Every predicate pairs with every object map
            for predicate in &predicates {
                for object in &objects {
                    let mut pom = object.clone();
                    pom.predicate = predicate.clone();
                    poms.push(pom);
                }
            }
        }
        Ok(poms)
    }

    fn extract_predicates(&self, triples: &[&Triple]) -> RmlResult<Vec<String>> {
        let mut predicates = Vec::new();

        for term in self.find_objects(triples, RML::PREDICATE) {
            let iri = self.term_to_iri(&term).ok_or_else(|| RmlError::InvalidValue {
                property: "rr:predicate".to_string(),
                message: "expected IRI".to_string(),
            })?;
            predicates.push(iri);
        }

        for pm_term in self.find_objects(triples, RML::PREDICATE_MAP) {
            let pm_triples = self.triples_for(&pm_term);
            let iri = self
                .find_object_optional(&pm_triples, RML::CONSTANT)
                .and_then(|t| self.term_to_iri(&t))
                .ok_or_else(|| {
                    RmlError::MissingProperty("rr:constant in rr:predicateMap".to_string())
                })?;
            predicates.push(iri);
        }

        if predicates.is_empty() {
            return Err(RmlError::MissingProperty(
                "rr:predicate or rr:predicateMap".to_string(),
            ));
        }
        Ok(predicates)
    }

    fn extract_objects(&self, triples: &[&Triple]) -> RmlResult<Vec<PredicateObjectMap>> {
        let mut objects = Vec::new();

        // Shorthand rr:object
        for term in self.find_objects(triples, RML::OBJECT) {
            objects.push(PredicateObjectMap::constant(String::new(), term));
        }

        for om_term in self.find_objects(triples, RML::OBJECT_MAP) {
            objects.push(self.extract_object_map(&om_term)?);
        }

        if objects.is_empty() {
            return Err(RmlError::MissingProperty(
                "rr:object or rr:objectMap".to_string(),
            ));
        }
        Ok(objects)
    }

    fn extract_object_map(&self, om_term: &Term) -> RmlResult<PredicateObjectMap> {
        let om = self.triples_for(om_term);

        let object = if let Some(parent) = self.find_object_optional(&om, RML::PARENT_TRIPLES_MAP) {
            let iri = self.term_to_iri(&parent).ok_or_else(|| RmlError::InvalidValue {
                property: "rr:parentTriplesMap".to_string(),
                message: "expected IRI".to_string(),
            })?;
            ObjectTerm::Parent(iri)
        } else if let Some(constant) = self.find_object_optional(&om, RML::CONSTANT) {
            ObjectTerm::Constant(constant)
        } else if let Some(template) = self.string_of(&om, RML::TEMPLATE) {
            ObjectTerm::Template(template)
        } else if let Some(reference) = self.reference_of(&om) {
            ObjectTerm::Reference(reference)
        } else {
            return Err(RmlError::MissingProperty(
                "rr:constant, rr:template, rml:reference or rr:parentTriplesMap".to_string(),
            ));
        };

        let mut pom = PredicateObjectMap::new(String::new(), object);
        pom.datatype = self
            .find_object_optional(&om, RML::DATATYPE)
            .and_then(|t| self.term_to_iri(&t));
        pom.language = self.string_of(&om, RML::LANGUAGE);
        pom.term_type = self.term_type_of(&om)?;
        pom.delimiters = self
            .find_objects(&om, RML::DELIMITER)
            .iter()
            .filter_map(|t| self.term_to_string(t))
            .collect();
        pom.sub_entity_class = self
            .find_object_optional(&om, RML::CLASS)
            .and_then(|t| self.term_to_iri(&t));
        if let Some(value_predicate) = self
            .find_object_optional(&om, RML::VALUE_PREDICATE)
            .and_then(|t| self.term_to_iri(&t))
        {
            pom.value_predicate = value_predicate;
        }
        pom.reuse_existing_blank_node = self
            .string_of(&om, RML::REUSE_BLANK_NODE)
            .map(|v| is_true(&v))
            .unwrap_or(false);

        // Statements of the additional-properties node are copied onto each
        // sub-entity
        if let Some(extra) = self.find_object_optional(&om, RML::ADDITIONAL_PROPERTIES) {
            for triple in self.triples_for(&extra) {
                if let Some(p) = triple.p.as_iri() {
                    pom.additional_triples.push((p.to_string(), triple.o.clone()));
                }
            }
        }

        Ok(pom)
    }

    // =========================================================================
    // Helper methods
    // =========================================================================

    fn triples_for(&self, term: &Term) -> Vec<&'a Triple> {
        self.by_subject.get(term).cloned().unwrap_or_default()
    }

    fn find_object_optional(&self, triples: &[&Triple], predicate: &str) -> Option<Term> {
        triples
            .iter()
            .find(|t| t.p.as_iri() == Some(predicate))
            .map(|t| t.o.clone())
    }

    fn find_objects(&self, triples: &[&Triple], predicate: &str) -> Vec<Term> {
        triples
            .iter()
            .filter(|t| t.p.as_iri() == Some(predicate))
            .map(|t| t.o.clone())
            .collect()
    }

    fn string_of(&self, triples: &[&Triple], predicate: &str) -> Option<String> {
        self.find_object_optional(triples, predicate)
            .and_then(|t| self.term_to_string(&t))
    }

    /// `rml:reference`, or `rr:column` as a synonym
    fn reference_of(&self, triples: &[&Triple]) -> Option<String> {
        self.string_of(triples, RML::REFERENCE)
            .or_else(|| self.string_of(triples, RML::COLUMN))
    }

    fn term_type_of(&self, triples: &[&Triple]) -> RmlResult<Option<TermType>> {
        let Some(term) = self.find_object_optional(triples, RML::TERM_TYPE) else {
            return Ok(None);
        };
        self.term_to_iri(&term)
            .and_then(|iri| TermType::from_iri(&iri))
            .map(Some)
            .ok_or_else(|| RmlError::InvalidValue {
                property: "rr:termType".to_string(),
                message: format!("unknown term type {term}"),
            })
    }

    fn term_to_string(&self, term: &Term) -> Option<String> {
        match term {
            Term::Literal { value, .. } => Some(value.to_string()),
            Term::Iri(iri) => Some(iri.to_string()),
            Term::BlankNode(_) => None,
        }
    }

    fn term_to_iri(&self, term: &Term) -> Option<String> {
        term.as_iri().map(str::to_string)
    }
}

fn is_true(value: &str) -> bool {
    matches!(value.trim(), "true" | "1")
}
