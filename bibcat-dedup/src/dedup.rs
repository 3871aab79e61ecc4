//! Collapsing transient entities into canonical identifiers

use std::sync::Arc;

use bibcat_graph_ir::{Graph, Term};
use bibcat_vocab::{rdf, rdfs, skos};
use serde::{Deserialize, Serialize};

use crate::candidates::{default_label_predicates, Candidate, CandidateSource, DedupKey};
use crate::error::{DedupError, Result};
use crate::index::DedupIndex;
use crate::similarity::MatchPolicy;
use crate::slug::{local_name, slugify};

/// Deduplication settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Base for minted identifiers: `{base_iri}/{class}/{label}`
    pub base_iri: String,
    /// Predicates read as an entity's label, in priority order
    pub label_predicates: Vec<String>,
    /// IRI prefixes marking entities as transient; blank nodes always are
    pub transient_prefixes: Vec<String>,
    pub policy: MatchPolicy,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            base_iri: "http://example.org".to_string(),
            label_predicates: default_label_predicates(),
            transient_prefixes: Vec::new(),
            policy: MatchPolicy::Contains,
        }
    }
}

impl DedupConfig {
    pub fn with_base_iri(mut self, base_iri: impl Into<String>) -> Self {
        self.base_iri = base_iri.into();
        self
    }

    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_transient_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.transient_prefixes.push(prefix.into());
        self
    }

    fn is_transient(&self, term: &Term) -> bool {
        match term {
            Term::BlankNode(_) => true,
            Term::Iri(iri) => self.transient_prefixes.iter().any(|p| iri.starts_with(p.as_str())),
            Term::Literal { .. } => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// An existing entity matched
    Matched,
    /// A new identifier was minted from the label
    Minted,
}

/// A transient entity and the canonical IRI that replaced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentityAssertion {
    pub transient: Term,
    pub canonical: Term,
    pub label: String,
    pub resolution: Resolution,
}

/// Outcome of one deduplication pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct DedupReport {
    /// Transient entities considered
    pub examined: usize,
    pub matched: usize,
    pub minted: usize,
    /// Entities without a usable label
    pub skipped: usize,
    /// Entities left untouched because the lookup failed
    pub failed: Vec<Term>,
    pub assertions: Vec<IdentityAssertion>,
}

/// Resolves transient entities against a candidate source
#[derive(Debug)]
pub struct Deduplicator {
    source: Arc<dyn CandidateSource>,
    config: DedupConfig,
    index: DedupIndex,
}

impl Deduplicator {
    pub fn new(source: Arc<dyn CandidateSource>, config: DedupConfig) -> Self {
        Self {
            source,
            config,
            index: DedupIndex::new(),
        }
    }

    pub fn config(&self) -> &DedupConfig {
        &self.config
    }

    pub fn index(&self) -> &DedupIndex {
        &self.index
    }

    /// Resolve every transient entity typed with one of `classes`
    ///
    /// Within a class, longer labels go first so a shorter label contained
    /// in a longer one resolves to the identifier minted for the longer.
    /// Lookup failures are logged and leave that entity as it was.
    pub async fn deduplicate(
        &mut self,
        mut graph: Graph,
        classes: &[String],
    ) -> Result<(Graph, DedupReport)> {
        for class in classes {
            validate_class(class)?;
        }

        let mut report = DedupReport::default();
        for class in classes {
            let mut entities: Vec<(Term, String)> = Vec::new();
            for entity in graph.subjects_with_type(class) {
                if !self.config.is_transient(entity) {
                    continue;
                }
                report.examined += 1;
                match self.label_of(&graph, entity) {
                    Some(label) if !slugify(&label).is_empty() => {
                        entities.push((entity.clone(), label))
                    }
                    _ => {
                        tracing::debug!(
                            entity = %entity,
                            class = %class,
                            "no usable label; not deduplicated"
                        );
                        report.skipped += 1;
                    }
                }
            }
            entities.sort_by(|(ea, la), (eb, lb)| {
                lb.chars()
                    .count()
                    .cmp(&la.chars().count())
                    .then_with(|| la.cmp(lb))
                    .then_with(|| ea.cmp(eb))
            });

            for (entity, label) in entities {
                match self.resolve_or_mint(&mut graph, class, &entity, &label).await {
                    Ok(assertion) => {
                        match assertion.resolution {
                            Resolution::Matched => report.matched += 1,
                            Resolution::Minted => report.minted += 1,
                        }
                        report.assertions.push(assertion);
                    }
                    Err(e) => {
                        tracing::warn!(
                            entity = %entity,
                            label = %label,
                            error = %e,
                            "dedup lookup failed; entity left as is"
                        );
                        report.failed.push(entity);
                    }
                }
            }
        }

        let removed = graph.retain_unique();
        if removed > 0 {
            tracing::debug!(removed, "dropped triples duplicated by identity rewrites");
        }

        tracing::info!(
            examined = report.examined,
            matched = report.matched,
            minted = report.minted,
            failed = report.failed.len(),
            "deduplication complete"
        );
        Ok((graph, report))
    }

    /// Replace `entity` with a canonical IRI for `label`
    ///
    /// A matching candidate is reused, gaining `label` as an alternate label
    /// when it differs; otherwise `{base}/{slug(class)}/{slug(label)}` is
    /// minted and labelled. Every subject and object occurrence of `entity`
    /// is rewritten.
    pub async fn resolve_or_mint(
        &mut self,
        graph: &mut Graph,
        class_filter: &str,
        entity: &Term,
        label: &str,
    ) -> Result<IdentityAssertion> {
        validate_class(class_filter)?;
        let label_slug = slugify(label);
        if label_slug.is_empty() {
            return Err(DedupError::InvalidLabel(label.to_string()));
        }

        let mut key = DedupKey::new(class_filter);
        if let Some(agent_class) = graph
            .objects(entity, &Term::iri(rdf::TYPE))
            .filter_map(Term::as_iri)
            .find(|c| *c != class_filter)
        {
            key = key.with_agent_class(agent_class);
        }

        let candidates = self
            .index
            .candidates(self.source.as_ref(), &key, label)
            .await?;
        let policy = self.config.policy;
        let found = candidates
            .into_iter()
            .find(|c| policy.matches(&c.label, label));

        let (canonical, resolution) = match found {
            Some(candidate) => {
                let canonical = Term::iri(&candidate.iri);
                graph.replace_term(entity, &canonical);
                if candidate.label != label {
                    let alt = Term::iri(skos::ALT_LABEL);
                    let value = Term::string(label);
                    if !graph.contains(&canonical, &alt, &value) {
                        graph.add_triple(canonical.clone(), alt, value);
                    }
                }
                (canonical, Resolution::Matched)
            }
            None => {
                let iri = format!(
                    "{}/{}/{}",
                    self.config.base_iri.trim_end_matches('/'),
                    slugify(local_name(class_filter)),
                    label_slug
                );
                let canonical = Term::iri(&iri);
                graph.replace_term(entity, &canonical);
                let rdfs_label = Term::iri(rdfs::LABEL);
                let value = Term::string(label);
                if !graph.contains(&canonical, &rdfs_label, &value) {
                    graph.add_triple(canonical.clone(), rdfs_label, value);
                }
                self.index
                    .record_minted(class_filter, Candidate::new(iri, label));
                (canonical, Resolution::Minted)
            }
        };

        tracing::debug!(
            transient = %entity,
            canonical = %canonical,
            ?resolution,
            "resolved entity"
        );
        Ok(IdentityAssertion {
            transient: entity.clone(),
            canonical,
            label: label.to_string(),
            resolution,
        })
    }

    fn label_of(&self, graph: &Graph, entity: &Term) -> Option<String> {
        self.config.label_predicates.iter().find_map(|p| {
            let predicate = Term::iri(p);
            let label = graph
                .objects(entity, &predicate)
                .find(|o| o.is_literal())
                .map(|o| o.lexical().trim().to_string())
                .filter(|l| !l.is_empty());
            label
        })
    }
}

fn validate_class(class: &str) -> Result<()> {
    if class.contains(':') && !class.chars().any(char::is_whitespace) {
        Ok(())
    } else {
        Err(DedupError::InvalidClass(class.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bibcat_vocab::bf;

    #[derive(Debug)]
    struct Fixed(Vec<Candidate>);

    #[async_trait]
    impl CandidateSource for Fixed {
        async fn candidates(
            &self,
            _key: &DedupKey,
            _label: &str,
        ) -> bibcat_remote::Result<Vec<Candidate>> {
            Ok(self.0.clone())
        }
    }

    fn agent_graph(label: &str) -> (Graph, Term) {
        let mut graph = Graph::new();
        let work = Term::iri("http://lib.example.edu/work/1");
        let agent = Term::blank("b0");
        graph.add_triple(work, Term::iri(bf::AGENT_PROP), agent.clone());
        graph.add_triple(agent.clone(), Term::iri(rdf::TYPE), Term::iri(bf::AGENT));
        graph.add_triple(agent.clone(), Term::iri(rdfs::LABEL), Term::string(label));
        (graph, agent)
    }

    #[tokio::test]
    async fn test_match_adds_alt_label() {
        let source = Fixed(vec![Candidate::new(
            "http://id.loc.gov/authorities/names/n79006936",
            "Melville, Herman, 1819-1891",
        )]);
        let mut dedup = Deduplicator::new(Arc::new(source), DedupConfig::default());
        let (mut graph, agent) = agent_graph("Melville, Herman");

        let assertion = dedup
            .resolve_or_mint(&mut graph, bf::AGENT, &agent, "Melville, Herman")
            .await
            .unwrap();
        assert_eq!(assertion.resolution, Resolution::Matched);
        let canonical = Term::iri("http://id.loc.gov/authorities/names/n79006936");
        assert_eq!(assertion.canonical, canonical);
        assert!(!graph.iter().any(|t| t.mentions(&agent)));
        assert!(graph.contains(
            &canonical,
            &Term::iri(skos::ALT_LABEL),
            &Term::string("Melville, Herman")
        ));
    }

    #[tokio::test]
    async fn test_mint_from_slug() {
        let mut dedup = Deduplicator::new(
            Arc::new(Fixed(Vec::new())),
            DedupConfig::default().with_base_iri("http://lib.example.edu/"),
        );
        let (mut graph, agent) = agent_graph("Harper & Brothers");

        let assertion = dedup
            .resolve_or_mint(&mut graph, bf::AGENT, &agent, "Harper & Brothers")
            .await
            .unwrap();
        assert_eq!(assertion.resolution, Resolution::Minted);
        assert_eq!(
            assertion.canonical,
            Term::iri("http://lib.example.edu/agent/harper-brothers")
        );
        let labels: Vec<_> = graph
            .objects(&assertion.canonical, &Term::iri(rdfs::LABEL))
            .collect();
        assert_eq!(labels, vec![&Term::string("Harper & Brothers")]);
    }

    #[tokio::test]
    async fn test_invalid_class() {
        let mut dedup = Deduplicator::new(Arc::new(Fixed(Vec::new())), DedupConfig::default());
        let err = dedup
            .deduplicate(Graph::new(), &["Agent".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, DedupError::InvalidClass(_)));
    }

    #[test]
    fn test_transient() {
        let config = DedupConfig::default().with_transient_prefix("http://transient/");
        assert!(config.is_transient(&Term::blank("x")));
        assert!(config.is_transient(&Term::iri("http://transient/agent/1")));
        assert!(!config.is_transient(&Term::iri("http://id.loc.gov/x")));
    }
}
