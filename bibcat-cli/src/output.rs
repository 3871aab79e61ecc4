use std::io::Write;
use std::path::Path;

use bibcat_graph_ir::Graph;
use bibcat_rml::{CompiledMapping, SubjectTerm};
use comfy_table::{ContentArrangement, Table};

use crate::error::CliResult;

/// Write `graph` as N-Triples to `path`, or stdout
pub fn write_graph(graph: &Graph, path: Option<&Path>) -> CliResult<()> {
    write_text(&graph.to_ntriples(), path)
}

pub fn write_text(text: &str, path: Option<&Path>) -> CliResult<()> {
    match path {
        Some(path) => std::fs::write(path, text)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// One row per triples map
pub fn mapping_table(mapping: &CompiledMapping) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Map", "Source", "Iterator", "Subject", "Classes", "POMs", "Runs"]);

    for tm in mapping.iter() {
        let (formulation, iterator) = match &tm.logical_source {
            Some(ls) => (
                ls.formulation.name().to_string(),
                ls.iterator.clone().unwrap_or_default(),
            ),
            None => ("-".to_string(), String::new()),
        };
        let (subject, classes) = match &tm.subject_map {
            Some(sm) => {
                let subject = match &sm.term {
                    Some(SubjectTerm::Constant(iri)) => iri.clone(),
                    Some(SubjectTerm::Template(template)) => template.clone(),
                    Some(SubjectTerm::Reference(reference)) => format!("ref {reference}"),
                    Some(SubjectTerm::BlankNode) | None => "blank node".to_string(),
                };
                let mut classes = sm.classes.join("\n");
                if sm.dedup {
                    classes.push_str(" (dedup)");
                }
                (subject, classes)
            }
            None => ("-".to_string(), String::new()),
        };
        let runs = if tm.is_inert() {
            "never"
        } else if mapping.is_parent_only(&tm.iri) {
            "as parent"
        } else {
            "top level"
        };
        table.add_row(vec![
            tm.iri.clone(),
            formulation,
            iterator,
            subject,
            classes,
            tm.predicate_object_maps.len().to_string(),
            runs.to_string(),
        ]);
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_graph_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.nt");
        let mut graph = Graph::new();
        graph.add_triple(
            bibcat_graph_ir::Term::iri("http://x.org/1"),
            bibcat_graph_ir::Term::iri("http://x.org/p"),
            bibcat_graph_ir::Term::string("v"),
        );
        write_graph(&graph, Some(&path)).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, graph.to_ntriples());
    }
}
