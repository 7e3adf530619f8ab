use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use super::{BundleError, BundleService};
use crate::db::workflow_repository::WorkflowRepository;
use crate::models::git_details::GitDetails;

/// Serves the bundle path recorded on the workflow by the fetch pipeline.
pub struct StoredBundleService {
    repo: Arc<dyn WorkflowRepository>,
}

impl StoredBundleService {
    pub fn new(repo: Arc<dyn WorkflowRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl BundleService for StoredBundleService {
    async fn get_ro_bundle(&self, source: &GitDetails) -> Result<PathBuf, BundleError> {
        let workflow = self
            .repo
            .find_by_retrieved_from(source)
            .await?
            .ok_or_else(|| BundleError::WorkflowNotFound(source.url(&source.branch)))?;

        let Some(bundle) = workflow.ro_bundle.map(PathBuf::from) else {
            return Err(BundleError::NotAvailable(source.url(&source.branch)));
        };

        if !tokio::fs::try_exists(&bundle).await? {
            warn!(path = %bundle.display(), "recorded bundle is missing from storage");
            return Err(BundleError::NotAvailable(source.url(&source.branch)));
        }
        Ok(bundle)
    }
}
