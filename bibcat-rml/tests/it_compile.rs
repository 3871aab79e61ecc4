//! Rule compilation failures surface as configuration errors

use bibcat_rml::{RmlError, RmlLoader};

const PREFIXES: &str = r#"
    @prefix rr: <http://www.w3.org/ns/r2rml#> .
    @prefix rml: <http://semweb.mmlab.be/ns/rml#> .
    @prefix ql: <http://semweb.mmlab.be/ns/ql#> .
    @prefix ex: <http://x.org/ns#> .
    @prefix map: <http://x.org/map#> .
"#;

fn compile(body: &str) -> Result<bibcat_rml::CompiledMapping, RmlError> {
    RmlLoader::from_turtle(&format!("{PREFIXES}{body}"))?.compile()
}

fn xml_map(name: &str, parent: Option<&str>) -> String {
    let link = parent
        .map(|p| {
            format!(
                "; rr:predicateObjectMap [ rr:predicate ex:rel ; rr:objectMap [ rr:parentTriplesMap map:{p} ] ]"
            )
        })
        .unwrap_or_default();
    format!(
        r#"map:{name} rml:logicalSource [ rml:referenceFormulation ql:XPath ; rml:iterator "//{name}" ] ;
            rr:subjectMap [ rr:template "http://x.org/{name}/{{@id}}" ] {link} .
        "#
    )
}

#[test]
fn unknown_parent_is_fatal() {
    let err = compile(&xml_map("Work", Some("Missing"))).unwrap_err();
    match &err {
        RmlError::UnknownTriplesMap { child, parent } => {
            assert_eq!(child, "http://x.org/map#Work");
            assert_eq!(parent, "http://x.org/map#Missing");
        }
        other => panic!("expected UnknownTriplesMap, got {other:?}"),
    }
    assert!(err.is_configuration());
}

#[test]
fn parent_cycle_is_rejected() {
    let body = [
        xml_map("A", Some("B")),
        xml_map("B", Some("C")),
        xml_map("C", Some("A")),
    ]
    .concat();
    let err = compile(&body).unwrap_err();
    match err {
        RmlError::ParentCycle(path) => {
            assert_eq!(path.first(), path.last());
            assert_eq!(path.len(), 4);
        }
        other => panic!("expected ParentCycle, got {other:?}"),
    }
}

#[test]
fn self_parent_is_a_cycle() {
    let err = compile(&xml_map("Self", Some("Self"))).unwrap_err();
    assert!(matches!(err, RmlError::ParentCycle(_)));
}

#[test]
fn missing_subject_map_is_rejected() {
    let err = compile(
        r#"map:NoSubject rml:logicalSource [ rml:referenceFormulation ql:XPath ; rml:iterator "//x" ] ;
            rr:predicateObjectMap [ rr:predicate ex:p ; rr:objectMap [ rml:reference "y" ] ] ."#,
    )
    .unwrap_err();
    assert!(matches!(err, RmlError::MissingProperty(_)));
}

#[test]
fn chain_compiles_with_parent_only_maps() {
    let body = [
        xml_map("Work", Some("Instance")),
        xml_map("Instance", Some("Item")),
        xml_map("Item", None),
    ]
    .concat();
    let mapping = compile(&body).unwrap();
    assert_eq!(mapping.len(), 3);
    let top: Vec<_> = mapping.top_level().iter().map(|m| m.iri.clone()).collect();
    assert_eq!(top, vec!["http://x.org/map#Work"]);
    assert!(mapping.is_parent_only("http://x.org/map#Item"));
}
