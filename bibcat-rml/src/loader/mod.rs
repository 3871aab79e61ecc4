//! Rule loading
//!
//! Rules are read into a [`Graph`] first; TriplesMaps are then extracted
//! from the graph and compiled. Turtle is the supported document format;
//! callers with a graph from elsewhere use [`RmlLoader::from_graph`].

mod extractor;

pub use extractor::MappingExtractor;

use bibcat_graph_ir::Graph;

use crate::error::RmlResult;
use crate::mapping::CompiledMapping;

/// Rule document loader
pub struct RmlLoader {
    graph: Graph,
}

impl RmlLoader {
    /// Use an already parsed rule graph
    pub fn from_graph(graph: Graph) -> Self {
        Self { graph }
    }

    /// Parse a Turtle rule document
    pub fn from_turtle(content: &str) -> RmlResult<Self> {
        let graph = bibcat_graph_turtle::parse_to_graph(content)?;
        Ok(Self { graph })
    }

    /// Parse and concatenate several Turtle documents into one rule graph
    pub fn from_turtle_documents<'a>(
        documents: impl IntoIterator<Item = &'a str>,
    ) -> RmlResult<Self> {
        let mut graph = Graph::new();
        for (n, content) in documents.into_iter().enumerate() {
            let parsed = bibcat_graph_turtle::parse_to_graph(content)?;
            // Anonymous blank nodes restart per document
            graph.merge_scoped(parsed, &format!("d{n}_"));
        }
        Ok(Self { graph })
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Extract, index and validate the TriplesMaps
    pub fn compile(self) -> RmlResult<CompiledMapping> {
        let extractor = MappingExtractor::new(&self.graph);
        let triples_maps = extractor.extract_all()?;
        CompiledMapping::new(triples_maps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RmlError;

    const SIMPLE: &str = r#"
        @prefix rr: <http://www.w3.org/ns/r2rml#> .
        @prefix rml: <http://semweb.mmlab.be/ns/rml#> .
        @prefix ql: <http://semweb.mmlab.be/ns/ql#> .
        @prefix ex: <http://example.org/> .

        ex:WorkMap a rr:TriplesMap ;
            rml:logicalSource [ rml:referenceFormulation ql:JSONPath ; rml:iterator "$.works" ] ;
            rr:subjectMap [ rr:template "http://example.org/work/{id}" ; rr:class ex:Work ] ;
            rr:predicateObjectMap [ rr:predicate ex:name ; rr:objectMap [ rml:reference "name" ] ] .
    "#;

    #[test]
    fn test_from_turtle_and_compile() {
        let loader = RmlLoader::from_turtle(SIMPLE).unwrap();
        assert!(!loader.graph().is_empty());

        let mapping = loader.compile().unwrap();
        assert_eq!(mapping.len(), 1);
        assert!(mapping.get("http://example.org/WorkMap").is_some());
    }

    #[test]
    fn test_syntax_error_is_parse_error() {
        let err = RmlLoader::from_turtle("ex:broken rr:x").err().unwrap();
        assert!(matches!(err, RmlError::Parse(_)));
    }

    #[test]
    fn test_multiple_documents() {
        let second = r#"
            @prefix rr: <http://www.w3.org/ns/r2rml#> .
            @prefix rml: <http://semweb.mmlab.be/ns/rml#> .
            @prefix ex: <http://example.org/> .
            ex:AgentMap rml:logicalSource [ rml:iterator "$.agents" ] ;
                rr:subjectMap [ rr:termType rr:BlankNode ] .
        "#;
        let mapping = RmlLoader::from_turtle_documents([SIMPLE, second])
            .unwrap()
            .compile()
            .unwrap();
        assert_eq!(mapping.len(), 2);
    }
}
