//! SPARQL update builders

use bibcat_graph_ir::Graph;

/// Build `INSERT DATA` requests for `graph`, at most `chunk` triples each
///
/// Blank nodes are written as-is, so every chunk of one graph must be sent
/// to the same store for them to stay connected. A `chunk` of 0 is treated
/// as unbounded.
pub fn insert_data(graph: &Graph, chunk: usize) -> Vec<String> {
    if graph.is_empty() {
        return Vec::new();
    }
    let size = if chunk == 0 { graph.len() } else { chunk };
    graph
        .triples()
        .chunks(size)
        .map(|triples| {
            let mut body = String::from("INSERT DATA {\n");
            for t in triples {
                body.push_str("  ");
                body.push_str(&t.to_string());
                body.push('\n');
            }
            body.push('}');
            body
        })
        .collect()
}
