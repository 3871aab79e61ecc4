//! Named values available to templates and queries

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A named value: fixed text, or a generator called on every lookup
#[derive(Clone)]
pub enum ContextValue {
    Text(String),
    Generator(Arc<dyn Fn() -> String + Send + Sync>),
}

impl ContextValue {
    pub fn resolve(&self) -> String {
        match self {
            ContextValue::Text(text) => text.clone(),
            ContextValue::Generator(generate) => generate(),
        }
    }
}

impl fmt::Debug for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextValue::Text(text) => f.debug_tuple("Text").field(text).finish(),
            ContextValue::Generator(_) => f.write_str("Generator(..)"),
        }
    }
}

/// Caller-supplied named values for one execution
///
/// Template placeholders look here first; names that are absent are
/// evaluated as references against the current iteration node.
#[derive(Debug, Clone, Default)]
pub struct Context {
    values: BTreeMap<String, ContextValue>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Context::insert`]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn with_generator<F>(mut self, name: impl Into<String>, generator: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.values
            .insert(name.into(), ContextValue::Generator(Arc::new(generator)));
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values
            .insert(name.into(), ContextValue::Text(value.into()));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Look up `name`, invoking generators
    pub fn resolve(&self, name: &str) -> Option<String> {
        self.values.get(name).map(ContextValue::resolve)
    }

    /// A copy of `self` with `other`'s entries layered on top
    pub fn merged(&self, other: &Context) -> Context {
        let mut values = self.values.clone();
        for (k, v) in &other.values {
            values.insert(k.clone(), v.clone());
        }
        Context { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_text_and_generator() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();
        let ctx = Context::new()
            .with("institution", "http://x.org/library")
            .with_generator("seq", move || c.fetch_add(1, Ordering::SeqCst).to_string());

        assert_eq!(ctx.resolve("institution").as_deref(), Some("http://x.org/library"));
        assert_eq!(ctx.resolve("seq").as_deref(), Some("0"));
        assert_eq!(ctx.resolve("seq").as_deref(), Some("1"));
        assert_eq!(ctx.resolve("missing"), None);
    }

    #[test]
    fn test_merged_overrides() {
        let base = Context::new().with("a", "1").with("b", "2");
        let merged = base.merged(&Context::new().with("b", "3"));
        assert_eq!(merged.resolve("a").as_deref(), Some("1"));
        assert_eq!(merged.resolve("b").as_deref(), Some("3"));
        assert_eq!(base.resolve("b").as_deref(), Some("2"));
    }
}
