use async_trait::async_trait;
use uuid::Uuid;

use crate::models::git_details::GitDetails;
use crate::models::workflow::Workflow;

#[async_trait]
pub trait WorkflowRepository: Send + Sync {
    async fn find(&self, id: Uuid) -> Result<Option<Workflow>, sqlx::Error>;

    /// Workflow at `path` within its repository whose last fetch saw `commit_id`.
    async fn find_by_commit_and_path(
        &self,
        commit_id: &str,
        path: &str,
    ) -> Result<Option<Workflow>, sqlx::Error>;

    async fn find_by_retrieved_from(
        &self,
        source: &GitDetails,
    ) -> Result<Option<Workflow>, sqlx::Error>;

    async fn find_by_source_and_commit(
        &self,
        source: &GitDetails,
        commit_id: &str,
    ) -> Result<Option<Workflow>, sqlx::Error>;

    /// Insert or update keyed on `retrieved_from`. Assigns an id on insert.
    async fn save(&self, workflow: Workflow) -> Result<Workflow, sqlx::Error>;
}
