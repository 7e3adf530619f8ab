use std::path::PathBuf;

use async_trait::async_trait;

use crate::models::git_details::GitDetails;

#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("no workflow retrieved from {0}")]
    WorkflowNotFound(String),
    #[error("research object bundle not available for {0}")]
    NotAvailable(String),
    #[error("repository error: {0}")]
    Repository(#[from] sqlx::Error),
    #[error("bundle storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// Supplier of packaged research object bundles.
#[async_trait]
pub trait BundleService: Send + Sync {
    async fn get_ro_bundle(&self, source: &GitDetails) -> Result<PathBuf, BundleError>;
}

mod mock;
mod stored;

#[allow(unused_imports)]
pub use mock::MockBundleService;
pub use stored::StoredBundleService;
