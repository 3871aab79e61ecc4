//! `bibcat.toml` support
//!
//! Every field is optional; values given on the command line win over the
//! file, and the file wins over built-in defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bibcat_dedup::{DedupConfig, MatchPolicy};
use bibcat_harvest::HarvestOptions;
use bibcat_remote::RetryPolicy;
use bibcat_rml::EngineConfig;
use serde::Deserialize;

use crate::error::{CliError, CliResult};

pub const CONFIG_FILE: &str = "bibcat.toml";

/// Request timeout when neither flag nor file sets one
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Default, Deserialize)]
pub struct BibcatFileConfig {
    #[serde(default)]
    pub engine: Option<EngineFileConfig>,
    #[serde(default)]
    pub triplestore: Option<TriplestoreFileConfig>,
    #[serde(default)]
    pub harvest: Option<HarvestFileConfig>,
    #[serde(default)]
    pub dedup: Option<DedupFileConfig>,
}

/// `[engine]`
#[derive(Debug, Default, Clone, Deserialize)]
pub struct EngineFileConfig {
    pub base_iri: Option<String>,
    pub blank_node_prefix: Option<String>,
    pub bindings_page_size: Option<usize>,
    /// `[engine.namespaces]`
    pub namespaces: Option<BTreeMap<String, String>>,
    /// `[engine.values]`, e.g. `institution_iri`
    pub values: Option<BTreeMap<String, String>>,
}

/// `[triplestore]`
#[derive(Debug, Default, Clone, Deserialize)]
pub struct TriplestoreFileConfig {
    pub url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
    /// Triples per `INSERT DATA` request
    pub load_chunk: Option<usize>,
}

/// `[harvest]`
#[derive(Debug, Default, Clone, Deserialize)]
pub struct HarvestFileConfig {
    pub endpoint: Option<String>,
    pub metadata_prefix: Option<String>,
    pub set: Option<String>,
    pub sample: Option<usize>,
    pub seed: Option<u64>,
    pub concurrency: Option<usize>,
    pub timeout_secs: Option<u64>,
}

/// `[dedup]`
#[derive(Debug, Default, Clone, Deserialize)]
pub struct DedupFileConfig {
    pub base_iri: Option<String>,
    pub classes: Option<Vec<String>>,
    pub label_predicates: Option<Vec<String>>,
    pub transient_prefixes: Option<Vec<String>>,
    /// `"triplestore"` (default) or `"loc"`
    pub source: Option<String>,
    pub loc_url: Option<String>,
}

/// Where dedup candidates come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateSourceKind {
    Triplestore,
    Loc { base_url: String },
}

impl BibcatFileConfig {
    /// Read `explicit`, or `./bibcat.toml` when it exists, or nothing
    pub fn load(explicit: Option<&Path>) -> CliResult<Self> {
        let path: PathBuf = match explicit {
            Some(p) => {
                if !p.is_file() {
                    return Err(CliError::Config(format!(
                        "config file not found: {}",
                        p.display()
                    )));
                }
                p.to_path_buf()
            }
            None => {
                let local = PathBuf::from(CONFIG_FILE);
                if !local.is_file() {
                    return Ok(Self::default());
                }
                local
            }
        };
        let text = std::fs::read_to_string(&path)?;
        let config = Self::parse(&text)
            .map_err(|e| CliError::Config(format!("{}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Engine settings, `base_iri` from the flag when given
    pub fn engine_config(
        &self,
        base_iri: Option<&str>,
        vars: &[String],
    ) -> CliResult<EngineConfig> {
        let mut config = EngineConfig::default();
        if let Some(engine) = &self.engine {
            if let Some(base) = &engine.base_iri {
                config.base_iri = base.clone();
            }
            if let Some(prefix) = &engine.blank_node_prefix {
                config.blank_node_prefix = prefix.clone();
            }
            if let Some(size) = engine.bindings_page_size {
                config.bindings_page_size = size;
            }
            for (prefix, uri) in engine.namespaces.iter().flatten() {
                config.namespaces.insert(prefix.clone(), uri.clone());
            }
            for (name, value) in engine.values.iter().flatten() {
                config.named_values.insert(name.clone(), value.clone());
            }
        }
        if let Some(base) = base_iri {
            config.base_iri = base.to_string();
        }
        for var in vars {
            let (name, value) = var.split_once('=').ok_or_else(|| {
                CliError::Usage(format!("--var expects NAME=VALUE, got {var:?}"))
            })?;
            config.named_values.insert(name.trim().to_string(), value.to_string());
        }
        Ok(config)
    }

    pub fn triplestore_url(&self, flag: Option<&str>) -> Option<String> {
        flag.map(str::to_string)
            .or_else(|| self.triplestore.as_ref().and_then(|t| t.url.clone()))
    }

    pub fn triplestore_timeout(&self) -> Duration {
        let secs = self
            .triplestore
            .as_ref()
            .and_then(|t| t.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let mut policy = RetryPolicy::default();
        if let Some(retries) = self.triplestore.as_ref().and_then(|t| t.max_retries) {
            policy.max_retries = retries;
        }
        policy
    }

    pub fn load_chunk(&self) -> usize {
        self.triplestore
            .as_ref()
            .and_then(|t| t.load_chunk)
            .unwrap_or(5_000)
    }

    pub fn harvest_endpoint(&self, flag: Option<&str>) -> CliResult<String> {
        flag.map(str::to_string)
            .or_else(|| self.harvest.as_ref().and_then(|h| h.endpoint.clone()))
            .ok_or_else(|| {
                CliError::Usage(
                    "no OAI-PMH endpoint: pass --endpoint or set [harvest].endpoint".into(),
                )
            })
    }

    pub fn harvest_timeout(&self) -> Duration {
        let secs = self
            .harvest
            .as_ref()
            .and_then(|h| h.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    pub fn harvest_concurrency(&self, flag: Option<usize>) -> usize {
        flag.or_else(|| self.harvest.as_ref().and_then(|h| h.concurrency))
            .unwrap_or(bibcat_harvest::DEFAULT_CONCURRENCY)
    }

    /// Listing options; each flag overrides its file value
    pub fn harvest_options(
        &self,
        metadata_prefix: Option<&str>,
        set: Option<&str>,
        sample: Option<usize>,
        seed: Option<u64>,
    ) -> HarvestOptions {
        let file = self.harvest.clone().unwrap_or_default();
        let mut options = HarvestOptions::default();
        if let Some(prefix) = metadata_prefix.map(str::to_string).or(file.metadata_prefix) {
            options.metadata_prefix = prefix;
        }
        options.set = set.map(str::to_string).or(file.set);
        options.sample_size = sample.or(file.sample);
        options.seed = seed.or(file.seed);
        options
    }

    /// Dedup settings; minted identifiers fall back to the engine base IRI
    pub fn dedup_config(&self, engine: &EngineConfig) -> DedupConfig {
        let file = self.dedup.clone().unwrap_or_default();
        let mut config = DedupConfig::default()
            .with_base_iri(file.base_iri.unwrap_or_else(|| engine.base_iri.clone()));
        if let Some(predicates) = file.label_predicates {
            config.label_predicates = predicates;
        }
        config.transient_prefixes = file.transient_prefixes.unwrap_or_default();
        if self.candidate_source() != CandidateSourceKind::Triplestore {
            config = config.with_policy(MatchPolicy::loc());
        }
        config
    }

    /// Classes to deduplicate: the flag's, else the file's, else `fallback`
    pub fn dedup_classes(&self, flag: &[String], fallback: Vec<String>) -> Vec<String> {
        if !flag.is_empty() {
            return flag.to_vec();
        }
        self.dedup
            .as_ref()
            .and_then(|d| d.classes.clone())
            .filter(|c| !c.is_empty())
            .unwrap_or(fallback)
    }

    pub fn candidate_source(&self) -> CandidateSourceKind {
        let dedup = self.dedup.as_ref();
        match dedup.and_then(|d| d.source.as_deref()) {
            Some("loc") => CandidateSourceKind::Loc {
                base_url: dedup.and_then(|d| d.loc_url.clone()).unwrap_or_else(|| {
                    bibcat_dedup::LocSuggestSource::DEFAULT_BASE_URL.to_string()
                }),
            },
            _ => CandidateSourceKind::Triplestore,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[engine]
base_iri = "http://lib.example.edu/"
blank_node_prefix = "n"

[engine.values]
institution_iri = "http://lib.example.edu/institution"

[engine.namespaces]
tei = "http://www.tei-c.org/ns/1.0"

[triplestore]
url = "http://localhost:9999/blazegraph/sparql"
max_retries = 1

[harvest]
endpoint = "https://repo.example.edu/oai"
metadata_prefix = "oai_dc"
sample = 100

[dedup]
classes = ["http://id.loc.gov/ontologies/bibframe/Agent"]
source = "loc"
"#;

    #[test]
    fn test_parse_sections() {
        let config = BibcatFileConfig::parse(SAMPLE).unwrap();
        let engine = config.engine_config(None, &[]).unwrap();
        assert_eq!(engine.base_iri, "http://lib.example.edu/");
        assert_eq!(engine.blank_node_prefix, "n");
        assert_eq!(
            engine.named_values.get("institution_iri").map(String::as_str),
            Some("http://lib.example.edu/institution")
        );
        assert!(engine.namespaces.contains_key("tei"));
        assert!(engine.namespaces.contains_key("mods"));
        assert_eq!(config.retry_policy().max_retries, 1);
        assert_eq!(
            config.candidate_source(),
            CandidateSourceKind::Loc {
                base_url: "https://id.loc.gov".to_string()
            }
        );
    }

    #[test]
    fn test_flags_win() {
        let config = BibcatFileConfig::parse(SAMPLE).unwrap();
        let engine = config
            .engine_config(
                Some("http://other.example.org/"),
                &["institution_iri=http://x".to_string()],
            )
            .unwrap();
        assert_eq!(engine.base_iri, "http://other.example.org/");
        assert_eq!(
            engine.named_values.get("institution_iri").map(String::as_str),
            Some("http://x")
        );

        let options = config.harvest_options(Some("mods"), None, None, Some(3));
        assert_eq!(options.metadata_prefix, "mods");
        assert_eq!(options.sample_size, Some(100));
        assert_eq!(options.seed, Some(3));
        assert_eq!(
            config.triplestore_url(Some("http://store")).as_deref(),
            Some("http://store")
        );
        assert_eq!(
            config.dedup_classes(&[], Vec::new()),
            vec!["http://id.loc.gov/ontologies/bibframe/Agent".to_string()]
        );
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = BibcatFileConfig::parse("").unwrap();
        let engine = config.engine_config(None, &[]).unwrap();
        assert_eq!(engine, EngineConfig::default());
        assert_eq!(config.candidate_source(), CandidateSourceKind::Triplestore);
        assert_eq!(config.harvest_options(None, None, None, None), HarvestOptions::default());
        assert!(config.harvest_endpoint(None).is_err());
        let dedup = config.dedup_config(&engine);
        assert_eq!(dedup.base_iri, engine.base_iri);
        assert_eq!(dedup.policy, MatchPolicy::Contains);
    }

    #[test]
    fn test_bad_var() {
        let config = BibcatFileConfig::default();
        assert!(matches!(
            config.engine_config(None, &["novalue".to_string()]),
            Err(CliError::Usage(_))
        ));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bibcat.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        let config = BibcatFileConfig::load(Some(&path)).unwrap();
        assert!(config.harvest.is_some());

        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            BibcatFileConfig::load(Some(&missing)),
            Err(CliError::Config(_))
        ));
    }
}
