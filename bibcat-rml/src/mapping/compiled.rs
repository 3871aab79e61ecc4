//! Compiled mapping: the validated table of TriplesMaps
//!
//! Compilation checks what can be checked without a source: parent
//! references resolve, parent chains are acyclic, and every map that can
//! run has a way to mint subjects.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::{ReferenceFormulation, TriplesMap};
use crate::error::{RmlError, RmlResult};

/// Complete compiled mapping
#[derive(Debug, Clone, Default, Serialize)]
pub struct CompiledMapping {
    /// All TriplesMap definitions, keyed by IRI
    triples_maps: HashMap<String, TriplesMap>,

    /// Map IRIs in declaration order
    order: Vec<String>,

    /// Maps referenced as a parent by at least one other map
    parent_only: HashSet<String>,
}

impl CompiledMapping {
    /// Index and validate a list of TriplesMap definitions
    ///
    /// A map IRI declared twice keeps its first definition.
    pub fn new(triples_maps: Vec<TriplesMap>) -> RmlResult<Self> {
        let mut mapping = Self::default();
        for tm in triples_maps {
            mapping.add_triples_map(tm);
        }
        mapping.validate()?;
        Ok(mapping)
    }

    fn add_triples_map(&mut self, tm: TriplesMap) {
        if self.triples_maps.contains_key(&tm.iri) {
            tracing::warn!(map = %tm.iri, "duplicate TriplesMap definition ignored");
            return;
        }

        for parent in tm.parent_refs() {
            self.parent_only.insert(parent.to_string());
        }

        self.order.push(tm.iri.clone());
        self.triples_maps.insert(tm.iri.clone(), tm);
    }

    fn validate(&self) -> RmlResult<()> {
        for tm in self.iter() {
            for parent in tm.parent_refs() {
                if !self.triples_maps.contains_key(parent) {
                    return Err(RmlError::UnknownTriplesMap {
                        child: tm.iri.clone(),
                        parent: parent.to_string(),
                    });
                }
            }

            let Some(ls) = &tm.logical_source else {
                continue;
            };

            let bindings = ls.formulation == ReferenceFormulation::Sparql;
            if bindings && ls.query.is_none() {
                return Err(RmlError::MissingProperty(format!(
                    "rml:query on bindings map {}",
                    tm.iri
                )));
            }

            let has_subject = tm
                .subject_map
                .as_ref()
                .map(|sm| sm.term.is_some())
                .unwrap_or(false);
            if !has_subject && !(bindings && ls.iterator.is_some()) {
                return Err(RmlError::MissingProperty(format!(
                    "rr:subjectMap on {}",
                    tm.iri
                )));
            }
        }

        self.check_cycles()
    }

    /// Depth-first search over parent edges
    fn check_cycles(&self) -> RmlResult<()> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        fn visit<'a>(
            mapping: &'a CompiledMapping,
            iri: &'a str,
            marks: &mut HashMap<&'a str, Mark>,
            path: &mut Vec<&'a str>,
        ) -> RmlResult<()> {
            match marks.get(iri) {
                Some(Mark::Done) => return Ok(()),
                Some(Mark::Visiting) => {
                    let start = path.iter().position(|p| *p == iri).unwrap_or(0);
                    let mut cycle: Vec<String> =
                        path[start..].iter().map(|s| s.to_string()).collect();
                    cycle.push(iri.to_string());
                    return Err(RmlError::ParentCycle(cycle));
                }
                None => {}
            }

            marks.insert(iri, Mark::Visiting);
            path.push(iri);
            if let Some(tm) = mapping.triples_maps.get(iri) {
                for parent in tm.parent_refs() {
                    visit(mapping, parent, marks, path)?;
                }
            }
            path.pop();
            marks.insert(iri, Mark::Done);
            Ok(())
        }

        let mut marks = HashMap::new();
        let mut path = Vec::new();
        for iri in &self.order {
            visit(self, iri, &mut marks, &mut path)?;
        }
        Ok(())
    }

    /// Get a TriplesMap by IRI
    pub fn get(&self, iri: &str) -> Option<&TriplesMap> {
        self.triples_maps.get(iri)
    }

    /// All maps in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &TriplesMap> {
        self.order.iter().filter_map(|iri| self.triples_maps.get(iri))
    }

    pub fn len(&self) -> usize {
        self.triples_maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples_maps.is_empty()
    }

    /// Whether the map only runs on demand as somebody's parent
    pub fn is_parent_only(&self, iri: &str) -> bool {
        self.parent_only.contains(iri)
    }

    /// Maps executed directly by a run, in declaration order
    pub fn top_level(&self) -> Vec<&TriplesMap> {
        self.iter()
            .filter(|tm| !self.is_parent_only(&tm.iri))
            .collect()
    }

    /// Classes of subject maps flagged `kds:dedup`, first-seen order
    pub fn dedup_classes(&self) -> Vec<&str> {
        let mut classes: Vec<&str> = Vec::new();
        for tm in self.iter() {
            let Some(sm) = &tm.subject_map else { continue };
            if !sm.dedup {
                continue;
            }
            for class in &sm.classes {
                if !classes.contains(&class.as_str()) {
                    classes.push(class.as_str());
                }
            }
        }
        classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{LogicalSource, PredicateObjectMap, SubjectMap};

    const WORK: &str = "http://x.org/map/Work";
    const AGENT: &str = "http://x.org/map/Agent";

    fn xml_map(iri: &str) -> TriplesMap {
        TriplesMap::new(iri)
            .with_source(LogicalSource::new(ReferenceFormulation::XPath).with_iterator("//item"))
            .with_subject(
                SubjectMap::template("http://x.org/{id}").with_class("http://x.org/Thing"),
            )
    }

    #[test]
    fn test_parent_only_and_top_level() {
        let work = xml_map(WORK).with_pom(PredicateObjectMap::parent("http://x.org/agent", AGENT));
        let agent = xml_map(AGENT);

        let mapping = CompiledMapping::new(vec![work, agent]).unwrap();
        assert_eq!(mapping.len(), 2);
        assert!(mapping.is_parent_only(AGENT));
        assert!(!mapping.is_parent_only(WORK));

        let top: Vec<_> = mapping.top_level().iter().map(|tm| tm.iri.as_str()).collect();
        assert_eq!(top, vec![WORK]);
    }

    #[test]
    fn test_unknown_parent_is_error() {
        let work = xml_map(WORK).with_pom(PredicateObjectMap::parent("http://x.org/agent", AGENT));
        let err = CompiledMapping::new(vec![work]).unwrap_err();
        assert!(matches!(err, RmlError::UnknownTriplesMap { ref parent, .. } if parent == AGENT));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_cycle_is_error() {
        let linked = |from: &str, to: &str| {
            xml_map(from).with_pom(PredicateObjectMap::parent("http://x.org/p", to))
        };
        let a = linked("http://x.org/map/A", "http://x.org/map/B");
        let b = linked("http://x.org/map/B", "http://x.org/map/C");
        let c = linked("http://x.org/map/C", "http://x.org/map/A");

        match CompiledMapping::new(vec![a, b, c]).unwrap_err() {
            RmlError::ParentCycle(path) => {
                assert_eq!(path.first(), path.last());
                assert_eq!(path.len(), 4);
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_self_reference_is_cycle() {
        let a = xml_map(WORK).with_pom(PredicateObjectMap::parent("http://x.org/p", WORK));
        assert!(matches!(
            CompiledMapping::new(vec![a]).unwrap_err(),
            RmlError::ParentCycle(_)
        ));
    }

    #[test]
    fn test_missing_subject_map() {
        let tm = TriplesMap::new(WORK)
            .with_source(LogicalSource::new(ReferenceFormulation::XPath).with_iterator("//item"));
        assert!(matches!(
            CompiledMapping::new(vec![tm]).unwrap_err(),
            RmlError::MissingProperty(_)
        ));
    }

    #[test]
    fn test_bindings_map_iterator_binds_subject() {
        let tm = TriplesMap::new(WORK).with_source(
            LogicalSource::new(ReferenceFormulation::Sparql)
                .with_iterator("instance")
                .with_query("SELECT ?instance WHERE { ?instance a ?c }"),
        );
        assert!(CompiledMapping::new(vec![tm]).is_ok());
    }

    #[test]
    fn test_inert_map_is_kept() {
        let tm = TriplesMap::new(WORK);
        let mapping = CompiledMapping::new(vec![tm]).unwrap();
        assert!(mapping.get(WORK).unwrap().is_inert());
    }

    #[test]
    fn test_dedup_classes() {
        let mut agent = xml_map(AGENT);
        if let Some(sm) = agent.subject_map.as_mut() {
            sm.dedup = true;
            sm.classes = vec!["http://x.org/Person".to_string()];
        }
        let mapping = CompiledMapping::new(vec![xml_map(WORK), agent]).unwrap();
        assert_eq!(mapping.dedup_classes(), vec!["http://x.org/Person"]);
    }
}
