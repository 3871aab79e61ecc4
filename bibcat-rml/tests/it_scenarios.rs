//! End-to-end mapping runs over XML, JSON and delimited sources

use std::collections::BTreeSet;

use bibcat_graph_ir::{Graph, Term};
use bibcat_rml::{transform, Context, EngineConfig, Executor, RmlLoader, Source};
use bibcat_vocab::{rdf, xsd};

const PREFIXES: &str = r#"
    @prefix rr: <http://www.w3.org/ns/r2rml#> .
    @prefix rml: <http://semweb.mmlab.be/ns/rml#> .
    @prefix ql: <http://semweb.mmlab.be/ns/ql#> .
    @prefix kds: <http://knowledgelinks.io/ns/data-structures/> .
    @prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
    @prefix ex: <http://x.org/ns#> .
    @prefix map: <http://x.org/map#> .
"#;

const ITEMS_XML: &str = r#"<items>
    <item><id>1</id><title>A</title></item>
    <item><id>2</id><title>B</title></item>
</items>"#;

const DELIMITED_ITEMS_XML: &str = r#"<items>
    <item><id>1</id><title>A,B,C</title></item>
    <item><id>2</id><title>B</title></item>
</items>"#;

fn rules(body: &str) -> String {
    format!("{PREFIXES}{body}")
}

fn scenario_a_rules() -> String {
    rules(
        r#"
        map:Item a rr:TriplesMap ;
            rml:logicalSource [ rml:referenceFormulation ql:XPath ; rml:iterator "//item" ] ;
            rr:subjectMap [ rr:template "http://x.org/{id}" ; rr:class ex:Item ] ;
            rr:predicateObjectMap [ rr:predicate ex:title ; rr:objectMap [ rml:reference "title" ] ] .
        "#,
    )
}

fn scenario_b_rules() -> String {
    rules(
        r#"
        map:Item a rr:TriplesMap ;
            rml:logicalSource [ rml:referenceFormulation ql:XPath ; rml:iterator "//item" ] ;
            rr:subjectMap [ rr:template "http://x.org/{id}" ; rr:class ex:Item ] ;
            rr:predicateObjectMap [
                rr:predicate ex:title ;
                rr:objectMap [
                    rml:reference "title" ;
                    kds:delimiter "," ;
                    rr:class ex:Title ;
                    kds:valuePredicate ex:value
                ]
            ] .
        "#,
    )
}

async fn run(rules: &str, source: &Source) -> Graph {
    let mapping = RmlLoader::from_turtle(rules).unwrap().compile().unwrap();
    transform(&mapping, &EngineConfig::default(), source, &Context::new())
        .await
        .unwrap()
}

fn iri(s: &str) -> Term {
    Term::iri(s)
}

#[tokio::test]
async fn scenario_a_two_subjects_with_title_and_type() {
    let source = Source::from_xml_str(ITEMS_XML).unwrap();
    let graph = run(&scenario_a_rules(), &source).await;

    let subjects = graph.subjects();
    assert_eq!(subjects.len(), 2);
    assert_eq!(graph.len(), 4);

    for (id, title) in [("1", "A"), ("2", "B")] {
        let subject = iri(&format!("http://x.org/{id}"));
        let titles: Vec<_> = graph.objects(&subject, &iri("http://x.org/ns#title")).collect();
        assert_eq!(titles, vec![&Term::string(title)]);
        let types: Vec<_> = graph.objects(&subject, &iri(rdf::TYPE)).collect();
        assert_eq!(types, vec![&iri("http://x.org/ns#Item")]);
    }
}

#[tokio::test]
async fn scenario_b_delimited_sub_entities() {
    let source = Source::from_xml_str(DELIMITED_ITEMS_XML).unwrap();
    let graph = run(&scenario_b_rules(), &source).await;

    let title = iri("http://x.org/ns#title");
    let value = iri("http://x.org/ns#value");
    let title_class = "http://x.org/ns#Title";

    let values_of = |id: &str| -> Vec<String> {
        let subject = iri(&format!("http://x.org/{id}"));
        let entities: Vec<_> = graph.objects(&subject, &title).collect();
        let mut values = Vec::new();
        for entity in entities {
            assert!(entity.is_blank());
            assert!(graph.has_type(entity, title_class));
            let held: Vec<_> = graph.objects(entity, &value).collect();
            assert_eq!(held.len(), 1, "each sub-entity holds exactly one token");
            values.push(held[0].lexical().to_string());
        }
        values
    };

    assert_eq!(values_of("1"), vec!["A", "B", "C"]);
    assert_eq!(values_of("2"), vec!["B"]);
}

#[tokio::test]
async fn repeated_runs_are_identical() {
    let mapping = RmlLoader::from_turtle(&scenario_b_rules())
        .unwrap()
        .compile()
        .unwrap();
    let config = EngineConfig::default();
    let source = Source::from_xml_str(DELIMITED_ITEMS_XML).unwrap();

    let mut first = Executor::new(&mapping, &config);
    first.run(&source, &Context::new()).await.unwrap();
    let mut second = Executor::new(&mapping, &config);
    second.run(&source, &Context::new()).await.unwrap();

    assert_eq!(first.graph().to_ntriples(), second.graph().to_ntriples());
    assert_eq!(first.stats(), second.stats());
}

#[tokio::test]
async fn k_tokens_make_k_sub_entities() {
    for k in 1..=5usize {
        let tokens: Vec<String> = (0..k).map(|n| format!("token{n}")).collect();
        let xml = format!(
            "<items><item><id>x</id><title>{}</title></item></items>",
            tokens.join(" , ")
        );
        let graph = run(&scenario_b_rules(), &Source::from_xml_str(&xml).unwrap()).await;

        let subject = iri("http://x.org/x");
        let title = iri("http://x.org/ns#title");
        let value = iri("http://x.org/ns#value");
        let entities: Vec<_> = graph.objects(&subject, &title).collect();
        assert_eq!(entities.len(), k);

        let held: BTreeSet<String> = entities
            .iter()
            .flat_map(|e| graph.objects(e, &value))
            .map(|v| v.lexical().to_string())
            .collect();
        assert_eq!(held, tokens.iter().cloned().collect());
    }
}

#[tokio::test]
async fn every_parent_subject_is_linked() {
    let rules = rules(
        r#"
        @prefix bf: <http://id.loc.gov/ontologies/bibframe/> .

        map:Work a rr:TriplesMap ;
            rml:logicalSource [ rml:referenceFormulation ql:XPath ; rml:iterator "/mods:mods" ] ;
            rr:subjectMap [
                rr:template "{base_iri}work/{mods:recordInfo/mods:recordIdentifier}" ;
                rr:class bf:Work
            ] ;
            rr:predicateObjectMap [
                rr:predicate bf:contribution ;
                rr:objectMap [ rr:parentTriplesMap map:Agent ]
            ] .

        map:Agent a rr:TriplesMap ;
            rml:logicalSource [ rml:referenceFormulation ql:XPath ; rml:iterator "mods:name" ] ;
            rr:subjectMap [ rr:template "{subject}/agent/{@ID}" ; rr:class bf:Agent ] ;
            rr:predicateObjectMap [
                rr:predicate <http://www.w3.org/2000/01/rdf-schema#label> ;
                rr:objectMap [ rml:reference "mods:namePart" ]
            ] .
        "#,
    );
    let xml = r#"<mods:mods xmlns:mods="http://www.loc.gov/mods/v3">
        <mods:recordInfo><mods:recordIdentifier>42</mods:recordIdentifier></mods:recordInfo>
        <mods:name ID="n1"><mods:namePart>Melville, Herman</mods:namePart></mods:name>
        <mods:name ID="n2"><mods:namePart>Harper &amp; Brothers</mods:namePart></mods:name>
        <mods:name ID="n3"><mods:namePart>Anonymous</mods:namePart></mods:name>
    </mods:mods>"#;

    let mapping = RmlLoader::from_turtle(&rules).unwrap().compile().unwrap();
    assert!(mapping.is_parent_only("http://x.org/map#Agent"));
    assert_eq!(mapping.top_level().len(), 1);

    let config = EngineConfig::default().with_base_iri("http://lib.example.edu/");
    let source = Source::from_xml_str(xml).unwrap();
    let mut executor = Executor::new(&mapping, &config);
    let subjects = executor.run(&source, &Context::new()).await.unwrap();

    let work = iri("http://lib.example.edu/work/42");
    assert_eq!(subjects, vec![work.clone()]);

    let graph = executor.graph();
    let linked: BTreeSet<_> = graph
        .objects(&work, &iri("http://id.loc.gov/ontologies/bibframe/contribution"))
        .cloned()
        .collect();
    let agents: BTreeSet<_> = graph
        .subjects_with_type("http://id.loc.gov/ontologies/bibframe/Agent")
        .into_iter()
        .cloned()
        .collect();
    assert_eq!(agents.len(), 3);
    assert_eq!(linked, agents);
    assert!(agents.contains(&iri("http://lib.example.edu/work/42/agent/n2")));
}

#[tokio::test]
async fn json_source_with_typed_literals() {
    let rules = rules(
        r#"
        map:Work a rr:TriplesMap ;
            rml:logicalSource [ rml:referenceFormulation ql:JSONPath ; rml:iterator "$.works[*]" ] ;
            rr:subjectMap [ rr:template "{base_iri}work/{id}" ] ;
            rr:predicateObjectMap [
                rr:predicate ex:year ;
                rr:objectMap [ rml:reference "year" ; rr:datatype xsd:gYear ]
            ] ;
            rr:predicateObjectMap [
                rr:predicate ex:title ;
                rr:objectMap [ rml:reference "title" ; rr:language "en" ]
            ] ;
            rr:predicateObjectMap [
                rr:predicate ex:sameAs ;
                rr:objectMap [ rml:reference "links" ]
            ] .
        "#,
    );
    let json = r#"{"works": [
        {"id": "w 1", "year": 1851, "title": "Moby Dick", "links": ["http://id.loc.gov/w1", "local-1"]},
        {"id": "w2", "title": "Typee"}
    ]}"#;
    let graph = run(&rules, &Source::from_json_str(json).unwrap()).await;

    let w1 = iri("http://example.org/work/w%201");
    assert_eq!(
        graph.object(&w1, &iri("http://x.org/ns#year")),
        Some(&Term::typed("1851", bibcat_graph_ir::Datatype::from_iri(xsd::G_YEAR)))
    );
    assert_eq!(
        graph.object(&w1, &iri("http://x.org/ns#title")),
        Some(&Term::lang_string("Moby Dick", "en"))
    );
    let links: Vec<_> = graph.objects(&w1, &iri("http://x.org/ns#sameAs")).collect();
    assert_eq!(links, vec![&iri("http://id.loc.gov/w1"), &Term::string("local-1")]);

    let w2 = iri("http://example.org/work/w2");
    assert!(graph.object(&w2, &iri("http://x.org/ns#year")).is_none());
    assert_eq!(graph.objects(&w2, &iri("http://x.org/ns#title")).count(), 1);
}

#[tokio::test]
async fn delimited_rows_source() {
    let rules = rules(
        r#"
        map:Item a rr:TriplesMap ;
            rml:logicalSource [ rml:referenceFormulation ql:CSV ] ;
            rr:subjectMap [ rr:template "{institution}/item/{barcode}" ; rr:class ex:Item ] ;
            rr:predicateObjectMap [ rr:predicate ex:shelf ; rr:objectMap [ rr:column "call number" ] ] ;
            rr:predicateObjectMap [ rr:predicate ex:heldBy ; rr:objectMap [ rr:template "{institution}" ] ] .
        "#,
    );
    let mapping = RmlLoader::from_turtle(&rules).unwrap().compile().unwrap();
    let config = EngineConfig::default().with_named_value("institution", "http://lib.example.edu");
    let source = Source::from_delimited(
        "barcode\tcall number\n3900001\tPS2384 .M6\n3900002\t\n",
        '\t',
    )
    .unwrap();

    let graph = transform(&mapping, &config, &source, &Context::new())
        .await
        .unwrap();
    let item = iri("http://lib.example.edu/item/3900001");
    assert_eq!(
        graph.object(&item, &iri("http://x.org/ns#shelf")),
        Some(&Term::string("PS2384 .M6"))
    );
    assert_eq!(
        graph.object(&item, &iri("http://x.org/ns#heldBy")),
        Some(&iri("http://lib.example.edu"))
    );
    // The second row still gets its institution link
    assert!(graph.has_type(&iri("http://lib.example.edu/item/3900002"), "http://x.org/ns#Item"));
}

#[tokio::test]
async fn blank_node_values_keep_their_own_identity() {
    let rules = rules(
        r#"
        map:Work a rr:TriplesMap ;
            rml:logicalSource [ rml:referenceFormulation ql:CSV ] ;
            rr:subjectMap [ rr:template "http://x.org/w/{id}" ] ;
            rr:predicateObjectMap [
                rr:predicate ex:title ;
                rr:objectMap [ rr:column "title" ; rr:class ex:Title ; kds:valuePredicate ex:mainTitle ]
            ] ;
            rr:predicateObjectMap [
                rr:predicate ex:code ;
                rr:objectMap [ rr:column "code" ; rr:termType rr:BlankNode ]
            ] .
        "#,
    );
    let mapping = RmlLoader::from_turtle(&rules).unwrap().compile().unwrap();
    let source = Source::from_delimited(
        "id,title,code\n1,Moby,b0\n2,Typee,a b\n3,Omoo,a/b\n4,Mardi,a b\n",
        ',',
    )
    .unwrap();
    let graph = transform(&mapping, &EngineConfig::default(), &source, &Context::new())
        .await
        .unwrap();

    let title = iri("http://x.org/ns#title");
    let code = iri("http://x.org/ns#code");
    let first = iri("http://x.org/w/1");
    let minted = graph.object(&first, &title).unwrap();
    let named = graph.object(&first, &code).unwrap();
    assert!(minted.is_blank() && named.is_blank());
    assert_ne!(minted, named);
    assert!(graph.has_type(minted, "http://x.org/ns#Title"));
    assert!(!graph.has_type(named, "http://x.org/ns#Title"));

    let spaced = graph.object(&iri("http://x.org/w/2"), &code).unwrap();
    let slashed = graph.object(&iri("http://x.org/w/3"), &code).unwrap();
    assert_ne!(spaced, slashed);
    // The same value names the same node within one run
    assert_eq!(graph.object(&iri("http://x.org/w/4"), &code), Some(spaced));
}
