//! `${key}` interpolation of declared defaults.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

/// Source of values for `${key}` placeholders in defaults.
pub trait DefaultsContext: Send + Sync {
    fn lookup(&self, key: &str) -> Option<String>;
}

/// Resolves placeholders from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvContext;

impl DefaultsContext for EnvContext {
    fn lookup(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Resolves placeholders from an explicit map.
#[derive(Debug, Clone, Default)]
pub struct MapContext {
    values: HashMap<String, String>,
}

impl MapContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapContext {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl DefaultsContext for MapContext {
    fn lookup(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Tries each context in order; the first hit wins.
#[derive(Clone, Default)]
pub struct Layered {
    layers: Vec<Arc<dyn DefaultsContext>>,
}

impl Layered {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layer(mut self, ctx: impl DefaultsContext + 'static) -> Self {
        self.layers.push(Arc::new(ctx));
        self
    }
}

impl DefaultsContext for Layered {
    fn lookup(&self, key: &str) -> Option<String> {
        self.layers.iter().find_map(|l| l.lookup(key))
    }
}

/// `$${` (escape) or `${key}` (placeholder).
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\$\{|\$\{([^}]*)\}").expect("placeholder pattern is valid")
});

/// Replace every `${key}` in `raw` with its value from `ctx`.
///
/// Unresolved placeholders are kept verbatim. `$${` produces a literal `${`.
pub fn interpolate(raw: &str, ctx: &dyn DefaultsContext) -> String {
    if !raw.contains("${") {
        return raw.to_string();
    }

    PLACEHOLDER
        .replace_all(raw, |caps: &Captures<'_>| match caps.get(1) {
            None => "${".to_string(),
            Some(key) => ctx.lookup(key.as_str()).unwrap_or_else(|| {
                tracing::trace!(key = key.as_str(), "placeholder left unresolved");
                caps[0].to_string()
            }),
        })
        .into_owned()
}
