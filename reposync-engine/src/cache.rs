//! Per-batch memo of source repository metadata.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use reposync_core::RepositoryMetadata;
use reposync_github::{GatewayError, MetadataGateway};

/// Source metadata keyed by repository name. One batch reads each source
/// repository once no matter how many target orgs it fans out to. Failed
/// reads are not cached, so the next target retries them.
#[derive(Debug, Default)]
pub struct LookupCache {
    metadata: HashMap<String, RepositoryMetadata>,
}

impl LookupCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source_metadata(
        &mut self,
        gateway: &dyn MetadataGateway,
        source_org: &str,
        repo: &str,
    ) -> Result<&RepositoryMetadata, GatewayError> {
        match self.metadata.entry(repo.to_string()) {
            Entry::Occupied(entry) => {
                tracing::debug!(repo, "source metadata from cache");
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                let meta = gateway.get_repository_metadata(source_org, repo)?;
                Ok(entry.insert(meta))
            }
        }
    }
}
