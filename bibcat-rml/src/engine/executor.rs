//! The mapping interpreter

use std::sync::Arc;

use bibcat_graph_ir::{Graph, Term, Triple};
use bibcat_remote::TripleStore;
use bibcat_vocab::rdf;
use futures::future::{BoxFuture, FutureExt};

use super::EngineKind;
use crate::config::EngineConfig;
use crate::context::Context;
use crate::error::{RmlError, RmlResult};
use crate::mapping::{
    CompiledMapping, LogicalSource, ObjectTerm, PredicateObjectMap, SubjectTerm, TermType,
    TriplesMap,
};
use crate::materialize::{
    expand_template, iri_escape, materialize_object, template_names, BlankNodes,
};
use crate::source::{Node, Source};

/// Counters for one executor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionStats {
    /// Iteration rows visited
    pub rows: usize,
    /// Rows dropped for lack of a subject or a template value
    pub rows_skipped: usize,
    /// Triples written to the output graph
    pub triples: usize,
    /// Remote queries issued by bindings maps
    pub queries: usize,
}

/// Executes compiled TriplesMaps into one output graph
///
/// Blank nodes are labelled from a per-executor counter, so two executors
/// given the same mapping, source and context produce identical graphs.
/// Source values typed as blank nodes draw from the same counter.
pub struct Executor<'m> {
    mapping: &'m CompiledMapping,
    config: &'m EngineConfig,
    store: Option<Arc<dyn TripleStore>>,
    graph: Graph,
    blanks: BlankNodes,
    stats: ExecutionStats,
}

impl<'m> Executor<'m> {
    pub fn new(mapping: &'m CompiledMapping, config: &'m EngineConfig) -> Self {
        Self {
            mapping,
            config,
            store: None,
            graph: Graph::new(),
            blanks: BlankNodes::new(config.blank_node_prefix.clone()),
            stats: ExecutionStats::default(),
        }
    }

    /// Triple store used by bindings maps
    pub fn with_store(mut self, store: Arc<dyn TripleStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn into_graph(self) -> Graph {
        self.graph
    }

    pub fn stats(&self) -> &ExecutionStats {
        &self.stats
    }

    /// Execute every top-level map against the root of `source`
    ///
    /// `ctx` is layered over the configuration's named values. Returns the
    /// subjects produced, in map then row order.
    pub async fn run(&mut self, source: &Source, ctx: &Context) -> RmlResult<Vec<Term>> {
        let mapping = self.mapping;
        let ctx = self.config.context().merged(ctx);
        let root = source.root();

        let mut subjects = Vec::new();
        for map in mapping.top_level() {
            subjects.extend(self.execute_map(map, root, &ctx).await?);
        }

        tracing::debug!(
            subjects = subjects.len(),
            rows = self.stats.rows,
            skipped = self.stats.rows_skipped,
            triples = self.stats.triples,
            "mapping run complete"
        );
        Ok(subjects)
    }

    /// Execute one map against `node`
    pub async fn execute(
        &mut self,
        map_iri: &str,
        node: Node<'_>,
        ctx: &Context,
    ) -> RmlResult<Vec<Term>> {
        let mapping = self.mapping;
        let map = mapping.get(map_iri).ok_or_else(|| RmlError::InvalidValue {
            property: "TriplesMap".to_string(),
            message: format!("no map named {map_iri}"),
        })?;
        self.execute_map(map, node, ctx).await
    }

    fn execute_map<'a>(
        &'a mut self,
        map: &'m TriplesMap,
        node: Node<'a>,
        ctx: &'a Context,
    ) -> BoxFuture<'a, RmlResult<Vec<Term>>> {
        async move {
            let Some(ls) = &map.logical_source else {
                tracing::debug!(map = %map.iri, "map has no logical source; skipping");
                return Ok(Vec::new());
            };
            if !node.accepts(ls.formulation) {
                return Err(RmlError::SourceMismatch {
                    map: map.iri.clone(),
                    expected: ls.formulation.name(),
                    found: node.kind_name(),
                });
            }

            let subjects = match EngineKind::for_formulation(ls.formulation) {
                EngineKind::Bindings => self.run_bindings(map, ls, ctx).await?,
                EngineKind::Xml | EngineKind::Json | EngineKind::Rows => {
                    let rows = node.iterate(ls.iterator.as_deref(), &self.config.namespaces)?;
                    let mut subjects = Vec::new();
                    for row in rows {
                        if let Some(subject) = self.apply_row(map, row, ctx).await? {
                            subjects.push(subject);
                        }
                    }
                    subjects
                }
            };

            tracing::debug!(map = %map.iri, subjects = subjects.len(), "executed map");
            Ok(subjects)
        }
        .boxed()
    }

    /// Query the store, paging with `{limit}`/`{offset}` when the query uses
    /// `{offset}` and the context does not fix it
    async fn run_bindings(
        &mut self,
        map: &'m TriplesMap,
        ls: &'m LogicalSource,
        ctx: &Context,
    ) -> RmlResult<Vec<Term>> {
        let store = self.store.clone().ok_or_else(|| RmlError::InvalidValue {
            property: "rml:query".to_string(),
            message: format!("map {} needs a triple store", map.iri),
        })?;
        let query = ls
            .query
            .as_deref()
            .ok_or_else(|| RmlError::MissingProperty(format!("rml:query on {}", map.iri)))?;

        let names = template_names(query);
        let page_size = self.config.bindings_page_size.max(1);
        let paged = names.iter().any(|n| n == "offset") && !ctx.contains("offset");
        let needs_limit = names.iter().any(|n| n == "limit") && !ctx.contains("limit");

        let mut subjects = Vec::new();
        let mut offset = 0usize;
        loop {
            let mut page = Context::new();
            if paged {
                page.insert("offset", offset.to_string());
            }
            if needs_limit {
                page.insert("limit", page_size.to_string());
            }
            let page_ctx = ctx.merged(&page);
            let text = expand_template(query, |name| Ok(page_ctx.resolve(name)))?;

            let bindings = store.query(&text).await?;
            self.stats.queries += 1;
            tracing::debug!(map = %map.iri, offset, rows = bindings.len(), "bindings page");

            for binding in &bindings {
                if let Some(subject) = self.apply_row(map, Node::Binding(binding), ctx).await? {
                    subjects.push(subject);
                }
            }

            if !paged || bindings.len() < page_size {
                break;
            }
            offset += page_size;
        }
        Ok(subjects)
    }

    /// Apply one map to one iteration row
    ///
    /// Triples are buffered and committed only when the row completes; a
    /// template that cannot be filled drops the row. Returns the subject when
    /// at least one triple was attached to it.
    async fn apply_row(
        &mut self,
        map: &'m TriplesMap,
        node: Node<'_>,
        ctx: &Context,
    ) -> RmlResult<Option<Term>> {
        self.stats.rows += 1;

        let subject = match self.mint_subject(map, node, ctx) {
            Ok(Some(subject)) => subject,
            Ok(None) => {
                self.stats.rows_skipped += 1;
                return Ok(None);
            }
            Err(e @ RmlError::TemplateSubstitution { .. }) => {
                tracing::warn!(map = %map.iri, error = %e, "row skipped");
                self.stats.rows_skipped += 1;
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let mapping = self.mapping;
        let mut buffer: Vec<Triple> = Vec::new();

        for pom in &map.predicate_object_maps {
            let predicate = Term::iri(&pom.predicate);

            if let ObjectTerm::Parent(parent_iri) = &pom.object {
                let parent = mapping.get(parent_iri).ok_or_else(|| RmlError::UnknownTriplesMap {
                    child: map.iri.clone(),
                    parent: parent_iri.clone(),
                })?;
                let link = Context::new()
                    .with("subject", subject.lexical())
                    .with("predicate", pom.predicate.as_str());
                let parent_ctx = ctx.merged(&link);
                let parents = self.execute_map(parent, node, &parent_ctx).await?;
                for parent_subject in parents {
                    buffer.push(Triple::new(subject.clone(), predicate.clone(), parent_subject));
                }
                continue;
            }

            let objects = match self.object_terms(pom, node, ctx) {
                Ok(objects) => objects,
                Err(e @ RmlError::TemplateSubstitution { .. }) => {
                    tracing::warn!(
                        map = %map.iri,
                        predicate = %pom.predicate,
                        error = %e,
                        "row skipped"
                    );
                    self.stats.rows_skipped += 1;
                    return Ok(None);
                }
                Err(e) => return Err(e),
            };
            for object in objects {
                self.attach(&subject, &predicate, pom, object, &mut buffer);
            }
        }

        let attached = !buffer.is_empty() || map.predicate_object_maps.is_empty();
        if !attached {
            return Ok(None);
        }

        // Types go in only once the subject has something attached
        if let Some(sm) = &map.subject_map {
            let rdf_type = Term::iri(rdf::TYPE);
            for class in &sm.classes {
                self.commit(Triple::new(subject.clone(), rdf_type.clone(), Term::iri(class)));
            }
        }
        for triple in buffer {
            self.commit(triple);
        }
        Ok(Some(subject))
    }

    fn commit(&mut self, triple: Triple) {
        self.graph.add(triple);
        self.stats.triples += 1;
    }

    fn mint_subject(
        &mut self,
        map: &TriplesMap,
        node: Node<'_>,
        ctx: &Context,
    ) -> RmlResult<Option<Term>> {
        let config = self.config;
        let Some(sm) = &map.subject_map else {
            return Ok(iterator_subject(map, node));
        };

        match &sm.term {
            None => Ok(iterator_subject(map, node)),
            Some(SubjectTerm::Constant(iri)) => Ok(Some(Term::iri(iri))),
            Some(SubjectTerm::Template(template)) => {
                let value = expand_template(template, |name| {
                    resolve_placeholder(name, node, ctx, config, true)
                })?;
                Ok(Some(self.subject_term(&value, sm.term_type)))
            }
            Some(SubjectTerm::Reference(reference)) => {
                if let Some(value) = node.as_binding().and_then(|b| b.get(reference)) {
                    let term = value.to_term();
                    return Ok(Some(if term.is_literal() {
                        self.subject_term(&value.value, sm.term_type)
                    } else {
                        term
                    }));
                }
                Ok(node
                    .first(reference, &config.namespaces)?
                    .map(|value| self.subject_term(&value, sm.term_type)))
            }
            Some(SubjectTerm::BlankNode) => Ok(Some(self.blanks.fresh())),
        }
    }

    fn subject_term(&mut self, value: &str, term_type: TermType) -> Term {
        match term_type {
            TermType::BlankNode => self.blanks.for_value(value),
            TermType::Iri | TermType::Literal => Term::iri(value),
        }
    }

    /// Object terms of a non-parent predicate-object map for this row
    fn object_terms(
        &mut self,
        pom: &PredicateObjectMap,
        node: Node<'_>,
        ctx: &Context,
    ) -> RmlResult<Vec<Term>> {
        let config = self.config;
        let values = match &pom.object {
            ObjectTerm::Constant(term) => return Ok(vec![term.clone()]),
            ObjectTerm::Parent(_) => return Ok(Vec::new()),
            ObjectTerm::Reference(reference) => node.reference(reference, &config.namespaces)?,
            ObjectTerm::Template(template) => {
                let escape = !pom.is_literal_only();
                vec![expand_template(template, |name| {
                    resolve_placeholder(name, node, ctx, config, escape)
                })?]
            }
        };

        let blanks = &mut self.blanks;
        Ok(values
            .iter()
            .flat_map(|value| split_tokens(value, &pom.delimiters))
            .map(|token| materialize_object(&token, pom, blanks))
            .collect())
    }

    /// Attach `object` to `subject`, wrapping it in a typed sub-entity when
    /// the map configures one
    fn attach(
        &mut self,
        subject: &Term,
        predicate: &Term,
        pom: &PredicateObjectMap,
        object: Term,
        buffer: &mut Vec<Triple>,
    ) {
        let Some(class) = &pom.sub_entity_class else {
            buffer.push(Triple::new(subject.clone(), predicate.clone(), object));
            return;
        };
        let class = Term::iri(class);

        let reused = if pom.reuse_existing_blank_node {
            self.find_reusable(subject, predicate, &class, buffer)
        } else {
            None
        };

        let entity = match reused {
            Some(entity) => entity,
            None => {
                let entity = self.blanks.fresh();
                buffer.push(Triple::new(subject.clone(), predicate.clone(), entity.clone()));
                buffer.push(Triple::new(entity.clone(), Term::iri(rdf::TYPE), class));
                for (p, o) in &pom.additional_triples {
                    buffer.push(Triple::new(entity.clone(), Term::iri(p), o.clone()));
                }
                entity
            }
        };
        buffer.push(Triple::new(entity, Term::iri(&pom.value_predicate), object));
    }

    /// A blank node of `class` already linked from `subject` via `predicate`,
    /// in this row's buffer or in the output graph
    fn find_reusable(
        &self,
        subject: &Term,
        predicate: &Term,
        class: &Term,
        buffer: &[Triple],
    ) -> Option<Term> {
        let rdf_type = Term::iri(rdf::TYPE);
        let typed = |candidate: &Term| {
            buffer
                .iter()
                .any(|t| t.s == *candidate && t.p == rdf_type && t.o == *class)
                || self.graph.contains(candidate, &rdf_type, class)
        };

        buffer
            .iter()
            .filter(|t| t.s == *subject && t.p == *predicate)
            .map(|t| &t.o)
            .chain(self.graph.objects(subject, predicate))
            .find(|o| o.is_blank() && typed(*o))
            .cloned()
    }
}

/// Subject bound by the iterator variable of a bindings map
fn iterator_subject(map: &TriplesMap, node: Node<'_>) -> Option<Term> {
    let var = map.logical_source.as_ref()?.iterator.as_deref()?;
    let value = node.as_binding()?.get(var)?;
    let term = value.to_term();
    if term.is_literal() {
        tracing::warn!(map = %map.iri, var, "iterator variable bound to a literal; row skipped");
        return None;
    }
    Some(term)
}

/// Named values first, then a reference against the row
///
/// Values read from the row are IRI-escaped when `escape` is set; named
/// values never are.
fn resolve_placeholder(
    name: &str,
    node: Node<'_>,
    ctx: &Context,
    config: &EngineConfig,
    escape: bool,
) -> RmlResult<Option<String>> {
    if let Some(value) = ctx.resolve(name) {
        return Ok(Some(value));
    }
    let value = node.first(name, &config.namespaces)?;
    Ok(value.map(|v| if escape { iri_escape(&v) } else { v }))
}

/// Split `value` on each delimiter in turn, keeping trimmed non-empty tokens
fn split_tokens(value: &str, delimiters: &[String]) -> Vec<String> {
    let mut tokens = vec![value.to_string()];
    for delimiter in delimiters.iter().filter(|d| !d.is_empty()) {
        tokens = tokens
            .iter()
            .flat_map(|token| token.split(delimiter.as_str()))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect();
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{LogicalSource, ReferenceFormulation, SubjectMap};
    use bibcat_vocab::bf;

    #[test]
    fn test_split_tokens() {
        let delimiters = vec![";".to_string(), "--".to_string()];
        assert_eq!(
            split_tokens("Whales -- Fiction; Sea stories;;", &delimiters),
            vec!["Whales", "Fiction", "Sea stories"]
        );
        assert_eq!(split_tokens("plain", &[]), vec!["plain"]);
    }

    fn rows_mapping(maps: Vec<TriplesMap>) -> CompiledMapping {
        CompiledMapping::new(maps).unwrap()
    }

    #[tokio::test]
    async fn test_reuse_blank_node_across_maps() {
        let map = TriplesMap::new("http://x.org/map/Instance")
            .with_source(LogicalSource::new(ReferenceFormulation::Rows))
            .with_subject(
                SubjectMap::template("http://x.org/instance/{id}").with_class(bf::INSTANCE),
            )
            .with_pom(
                PredicateObjectMap::reference(bf::TITLE, "main")
                    .with_sub_entity(bf::TITLE_CLASS, bf::MAIN_TITLE),
            )
            .with_pom(
                PredicateObjectMap::reference(bf::TITLE, "sub")
                    .with_sub_entity(bf::TITLE_CLASS, bf::SUBTITLE)
                    .with_reuse(),
            );
        let mapping = rows_mapping(vec![map]);
        let config = EngineConfig::default();
        let source =
            Source::from_delimited("id,main,sub\n1,Moby Dick,or The Whale\n", ',').unwrap();

        let mut executor = Executor::new(&mapping, &config);
        let subjects = executor.run(&source, &Context::new()).await.unwrap();
        assert_eq!(subjects, vec![Term::iri("http://x.org/instance/1")]);

        let graph = executor.graph();
        let titles: Vec<_> = graph.objects(&subjects[0], &Term::iri(bf::TITLE)).collect();
        assert_eq!(titles.len(), 1);
        assert_eq!(
            graph.object(titles[0], &Term::iri(bf::SUBTITLE)),
            Some(&Term::string("or The Whale"))
        );
        assert_eq!(
            graph.object(titles[0], &Term::iri(bf::MAIN_TITLE)),
            Some(&Term::string("Moby Dick"))
        );
    }

    #[tokio::test]
    async fn test_subject_without_triples_is_untyped() {
        let map = TriplesMap::new("http://x.org/map/Work")
            .with_source(LogicalSource::new(ReferenceFormulation::Rows))
            .with_subject(SubjectMap::template("http://x.org/work/{id}").with_class(bf::WORK))
            .with_pom(PredicateObjectMap::reference(bf::TITLE, "title"));
        let mapping = rows_mapping(vec![map]);
        let config = EngineConfig::default();
        let source = Source::from_delimited("id,title\n1,\n2,Typee\n", ',').unwrap();

        let mut executor = Executor::new(&mapping, &config);
        let subjects = executor.run(&source, &Context::new()).await.unwrap();
        assert_eq!(subjects, vec![Term::iri("http://x.org/work/2")]);
        assert_eq!(executor.graph().len(), 2);
        assert!(!executor.graph().has_type(&Term::iri("http://x.org/work/1"), bf::WORK));
    }

    #[tokio::test]
    async fn test_template_errors_skip_row() {
        let map = TriplesMap::new("http://x.org/map/Work")
            .with_source(LogicalSource::new(ReferenceFormulation::Rows))
            .with_subject(SubjectMap::template("http://x.org/work/{id}"))
            .with_pom(
                PredicateObjectMap::template(bf::TITLE, "{title} ({year})")
                    .with_term_type(TermType::Literal),
            );
        let mapping = rows_mapping(vec![map]);
        let config = EngineConfig::default();
        let source = Source::from_delimited(
            "id,title,year\n1,Typee,1846\n,Omoo,1847\n3,Mardi,\n",
            ',',
        )
        .unwrap();

        let mut executor = Executor::new(&mapping, &config);
        let subjects = executor.run(&source, &Context::new()).await.unwrap();
        assert_eq!(subjects, vec![Term::iri("http://x.org/work/1")]);
        assert_eq!(executor.stats().rows, 3);
        assert_eq!(executor.stats().rows_skipped, 2);
        assert_eq!(
            executor.graph().object(&subjects[0], &Term::iri(bf::TITLE)),
            Some(&Term::string("Typee (1846)"))
        );
    }

    #[tokio::test]
    async fn test_source_mismatch() {
        let map = TriplesMap::new("http://x.org/map/Json")
            .with_source(LogicalSource::new(ReferenceFormulation::JsonPath))
            .with_subject(SubjectMap::template("http://x.org/{id}"));
        let mapping = rows_mapping(vec![map]);
        let config = EngineConfig::default();
        let source = Source::from_xml_str("<a/>").unwrap();

        let err = Executor::new(&mapping, &config)
            .run(&source, &Context::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RmlError::SourceMismatch { .. }));
        assert!(err.is_configuration());
    }
}
