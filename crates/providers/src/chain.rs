use crate::{MetadataProvider, ProviderError, TagSet};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Tries each provider in order and returns the first success.
pub struct FallbackProvider {
    name: String,
    providers: Vec<Arc<dyn MetadataProvider>>,
}

impl FallbackProvider {
    pub fn new(name: &str, providers: Vec<Arc<dyn MetadataProvider>>) -> Self {
        Self {
            name: name.to_string(),
            providers,
        }
    }
}

impl MetadataProvider for FallbackProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn extract(&self, path: &Path) -> Result<TagSet, ProviderError> {
        let mut last = ProviderError::NoMetadata;
        for provider in &self.providers {
            match provider.extract(path) {
                Ok(tags) => return Ok(tags),
                Err(e) => {
                    debug!(path = %path.display(), provider = provider.name(), error = %e, "provider failed, trying next");
                    last = e;
                }
            }
        }
        Err(last)
    }
}
