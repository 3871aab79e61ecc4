//! Bindings maps against a mocked triple store

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bibcat_graph_ir::Term;
use bibcat_remote::{Binding, BindingValue, RemoteError, TripleStore};
use bibcat_rml::{Context, EngineConfig, Executor, RmlError, RmlLoader, Source};

#[derive(Debug)]
struct MockStore {
    pages: parking_lot::Mutex<Vec<Vec<Binding>>>,
    queries: parking_lot::Mutex<Vec<String>>,
    calls: AtomicUsize,
    fail: bool,
}

impl MockStore {
    fn new(pages: Vec<Vec<Binding>>) -> Self {
        Self {
            pages: parking_lot::Mutex::new(pages),
            queries: parking_lot::Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new())
        }
    }
}

#[async_trait]
impl TripleStore for MockStore {
    async fn query(&self, sparql: &str) -> bibcat_remote::Result<Vec<Binding>> {
        self.queries.lock().push(sparql.to_string());
        if self.fail {
            return Err(RemoteError::Status {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        let idx = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.pages.lock().get(idx).cloned().unwrap_or_default())
    }

    async fn update(&self, _sparql: &str) -> bibcat_remote::Result<()> {
        Ok(())
    }
}

fn row(work: &str, label: &str) -> Binding {
    let mut binding = Binding::new();
    binding.insert("work".to_string(), BindingValue::uri(work));
    binding.insert("label".to_string(), BindingValue::literal(label));
    binding
}

const PREFIXES: &str = r#"
    @prefix rr: <http://www.w3.org/ns/r2rml#> .
    @prefix rml: <http://semweb.mmlab.be/ns/rml#> .
    @prefix ql: <http://semweb.mmlab.be/ns/ql#> .
    @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
    @prefix ex: <http://x.org/ns#> .
    @prefix map: <http://x.org/map#> .
"#;

const PAGED_RULES: &str = r#"
    map:Works rml:logicalSource [
            rml:referenceFormulation ql:SPARQL ;
            rml:iterator "work" ;
            rml:query "SELECT ?work ?label WHERE { ?work rdfs:label ?label } LIMIT {limit} OFFSET {offset}"
        ] ;
        rr:predicateObjectMap [ rr:predicate rdfs:label ; rr:objectMap [ rml:reference "label" ] ] .
"#;

#[tokio::test]
async fn bindings_pages_until_short_page() {
    let store = Arc::new(MockStore::new(vec![
        vec![row("http://x.org/w1", "One"), row("http://x.org/w2", "Two")],
        vec![row("http://x.org/w3", "Three"), row("http://x.org/w4", "Four")],
        vec![row("http://x.org/w5", "Five")],
    ]));
    let mapping = RmlLoader::from_turtle(&format!("{PREFIXES}{PAGED_RULES}"))
        .unwrap()
        .compile()
        .unwrap();
    let config = EngineConfig {
        bindings_page_size: 2,
        ..EngineConfig::default()
    };

    let mut executor = Executor::new(&mapping, &config).with_store(store.clone());
    let subjects = executor.run(&Source::None, &Context::new()).await.unwrap();

    assert_eq!(subjects.len(), 5);
    assert_eq!(subjects[4], Term::iri("http://x.org/w5"));
    assert_eq!(executor.stats().queries, 3);

    let queries = store.queries.lock().clone();
    assert!(queries[0].ends_with("LIMIT 2 OFFSET 0"));
    assert!(queries[2].ends_with("LIMIT 2 OFFSET 4"));
    assert_eq!(
        executor.graph().object(
            &Term::iri("http://x.org/w3"),
            &Term::iri("http://www.w3.org/2000/01/rdf-schema#label")
        ),
        Some(&Term::string("Three"))
    );
}

#[tokio::test]
async fn context_fixes_offset() {
    let store = Arc::new(MockStore::new(vec![vec![row("http://x.org/w1", "One")]]));
    let mapping = RmlLoader::from_turtle(&format!("{PREFIXES}{PAGED_RULES}"))
        .unwrap()
        .compile()
        .unwrap();
    let config = EngineConfig::default();
    let ctx = Context::new().with("limit", "10").with("offset", "30");

    let mut executor = Executor::new(&mapping, &config).with_store(store.clone());
    executor.run(&Source::None, &ctx).await.unwrap();

    let queries = store.queries.lock().clone();
    assert_eq!(queries.len(), 1);
    assert!(queries[0].ends_with("LIMIT 10 OFFSET 30"));
}

#[tokio::test]
async fn parent_bindings_map_sees_child_subject() {
    let rules = format!(
        "{PREFIXES}{}",
        r#"
        map:Record rml:logicalSource [ rml:referenceFormulation ql:XPath ; rml:iterator "/record" ] ;
            rr:subjectMap [ rr:template "http://x.org/record/{id}" ] ;
            rr:predicateObjectMap [
                rr:predicate ex:relatedWork ;
                rr:objectMap [ rr:parentTriplesMap map:Related ]
            ] .

        map:Related rml:logicalSource [
                rml:iterator "work" ;
                rml:query "SELECT ?work ?label WHERE { <{subject}> <{predicate}> ?work }"
            ] ;
            rr:predicateObjectMap [ rr:predicate rdfs:label ; rr:objectMap [ rml:reference "label" ] ] .
        "#
    );
    let store = Arc::new(MockStore::new(vec![vec![
        row("http://x.org/w1", "One"),
        row("http://x.org/w2", "Two"),
    ]]));
    let mapping = RmlLoader::from_turtle(&rules).unwrap().compile().unwrap();
    let config = EngineConfig::default();
    let source = Source::from_xml_str("<record><id>7</id></record>").unwrap();

    let mut executor = Executor::new(&mapping, &config).with_store(store.clone());
    let subjects = executor.run(&source, &Context::new()).await.unwrap();
    assert_eq!(subjects, vec![Term::iri("http://x.org/record/7")]);

    let queries = store.queries.lock().clone();
    assert_eq!(
        queries,
        vec!["SELECT ?work ?label WHERE { <http://x.org/record/7> <http://x.org/ns#relatedWork> ?work }"]
    );
    let related: Vec<_> = executor
        .graph()
        .objects(&subjects[0], &Term::iri("http://x.org/ns#relatedWork"))
        .cloned()
        .collect();
    assert_eq!(related, vec![Term::iri("http://x.org/w1"), Term::iri("http://x.org/w2")]);
}

#[tokio::test]
async fn remote_failure_fails_the_map() {
    let mapping = RmlLoader::from_turtle(&format!("{PREFIXES}{PAGED_RULES}"))
        .unwrap()
        .compile()
        .unwrap();
    let config = EngineConfig::default();

    let mut executor = Executor::new(&mapping, &config).with_store(Arc::new(MockStore::failing()));
    let err = executor.run(&Source::None, &Context::new()).await.unwrap_err();
    assert!(matches!(err, RmlError::Remote(RemoteError::Status { status: 503, .. })));
}

#[tokio::test]
async fn bindings_map_without_store_is_rejected() {
    let mapping = RmlLoader::from_turtle(&format!("{PREFIXES}{PAGED_RULES}"))
        .unwrap()
        .compile()
        .unwrap();
    let config = EngineConfig::default();

    let err = Executor::new(&mapping, &config)
        .run(&Source::None, &Context::new())
        .await
        .unwrap_err();
    assert!(matches!(err, RmlError::InvalidValue { .. }));
}
