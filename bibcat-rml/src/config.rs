//! Engine configuration
//!
//! An immutable value threaded through the executor; there is no global
//! namespace table or registry.

use std::collections::BTreeMap;

use bibcat_vocab::xml_ns;
use serde::{Deserialize, Serialize};

use crate::context::Context;

/// Default page size for `{limit}`/`{offset}` bindings queries
pub const DEFAULT_BINDINGS_PAGE_SIZE: usize = 1000;

/// Settings shared by every execution of a compiled mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base IRI, available to templates as `{base_iri}`
    pub base_iri: String,
    /// Extra named values for templates (institution IRI and the like)
    pub named_values: BTreeMap<String, String>,
    /// XML prefix → namespace URI, used by XPath name tests
    pub namespaces: BTreeMap<String, String>,
    /// Prefix for blank node labels minted during execution
    pub blank_node_prefix: String,
    /// Rows requested per page when a bindings query uses `{offset}`
    pub bindings_page_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_iri: "http://example.org/".to_string(),
            named_values: BTreeMap::new(),
            namespaces: default_namespaces(),
            blank_node_prefix: "b".to_string(),
            bindings_page_size: DEFAULT_BINDINGS_PAGE_SIZE,
        }
    }
}

/// Prefixes for the bibliographic XML formats BIBCAT reads
pub fn default_namespaces() -> BTreeMap<String, String> {
    [
        ("mods", xml_ns::MODS),
        ("dc", xml_ns::DC),
        ("oai", xml_ns::OAI_PMH),
        ("oai_dc", xml_ns::OAI_DC),
        ("marc", xml_ns::MARC),
        ("xlink", xml_ns::XLINK),
    ]
    .into_iter()
    .map(|(p, ns)| (p.to_string(), ns.to_string()))
    .collect()
}

impl EngineConfig {
    pub fn with_base_iri(mut self, base_iri: impl Into<String>) -> Self {
        self.base_iri = base_iri.into();
        self
    }

    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.namespaces.insert(prefix.into(), uri.into());
        self
    }

    pub fn with_named_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.named_values.insert(name.into(), value.into());
        self
    }

    /// The starting context for a run
    ///
    /// Holds `base_iri`, every named value, and a `uuid` generator that
    /// yields a fresh v4 UUID per lookup.
    pub fn context(&self) -> Context {
        let mut ctx = Context::new()
            .with("base_iri", self.base_iri.clone())
            .with_generator("uuid", || uuid::Uuid::new_v4().to_string());
        for (name, value) in &self.named_values {
            ctx.insert(name.clone(), value.clone());
        }
        ctx
    }
}
