//! Metadata provider abstractions: tag sets, the extraction trait and a registry of backends.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub mod chain;
pub mod exiftool;
pub mod native;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no metadata found")]
    NoMetadata,
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("extraction failed: {0}")]
    Backend(String),
    #[error("extraction timed out after {0:?}")]
    Timeout(Duration),
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
}

/// Tag name to value mapping produced once per file.
///
/// Keys are never guaranteed to be present; [`TagSet::get`] yields an empty
/// string for anything the backend did not report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet(HashMap<String, String>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` trimmed. Empty values are dropped.
    pub fn insert(&mut self, key: impl Into<String>, value: impl AsRef<str>) {
        let value = value.as_ref().trim();
        if !value.is_empty() {
            self.0.insert(key.into(), value.to_string());
        }
    }

    pub fn get(&self, key: &str) -> &str {
        self.0.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: AsRef<str>> FromIterator<(K, V)> for TagSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tags = TagSet::new();
        for (k, v) in iter {
            tags.insert(k, v);
        }
        tags
    }
}

/// Extracts tags from a single file. Always called from a blocking worker.
pub trait MetadataProvider: Send + Sync {
    fn name(&self) -> &str;
    fn extract(&self, path: &Path) -> Result<TagSet, ProviderError>;
}

#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn MetadataProvider>>,
    pub preferred: Option<String>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, name: &str, provider: Arc<dyn MetadataProvider>) -> Self {
        self.providers.insert(name.to_string(), provider);
        self
    }

    pub fn set_preferred(mut self, name: &str) -> Self {
        self.preferred = Some(name.to_string());
        self
    }

    pub fn get(&self, name: Option<&str>) -> Result<Arc<dyn MetadataProvider>, ProviderError> {
        let key = name
            .map(str::to_string)
            .or_else(|| self.preferred.clone())
            .ok_or_else(|| ProviderError::UnknownProvider("no metadata provider configured".into()))?;
        self.providers
            .get(&key)
            .cloned()
            .ok_or(ProviderError::UnknownProvider(key))
    }
}
