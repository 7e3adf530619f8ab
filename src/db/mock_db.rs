use async_trait::async_trait;
use std::sync::Mutex;
use uuid::Uuid;

use crate::db::workflow_repository::WorkflowRepository;
use crate::models::git_details::GitDetails;
use crate::models::workflow::Workflow;

/// Workflow store held in memory, unique on `retrieved_from` like the
/// Postgres table.
#[derive(Default)]
pub struct InMemoryWorkflowRepository {
    pub workflows: Mutex<Vec<Workflow>>,
    pub should_fail: bool,
}

impl InMemoryWorkflowRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Default::default()
        }
    }

    pub fn with_workflows(workflows: Vec<Workflow>) -> Self {
        let repo = Self::new();
        for workflow in workflows {
            repo.insert_or_replace(workflow)
                .expect("seed workflow needs a source reference");
        }
        repo
    }

    fn check(&self) -> Result<(), sqlx::Error> {
        if self.should_fail {
            return Err(sqlx::Error::Protocol("Mock DB failure".into()));
        }
        Ok(())
    }

    fn find_where<F>(&self, predicate: F) -> Option<Workflow>
    where
        F: Fn(&Workflow) -> bool,
    {
        self.workflows
            .lock()
            .unwrap()
            .iter()
            .find(|wf| predicate(wf))
            .cloned()
    }

    fn insert_or_replace(&self, mut workflow: Workflow) -> Result<Workflow, sqlx::Error> {
        let Some(source) = workflow.retrieved_from.clone() else {
            return Err(sqlx::Error::Protocol(
                "workflow has no source reference".into(),
            ));
        };

        let mut workflows = self.workflows.lock().unwrap();
        match workflows
            .iter_mut()
            .find(|existing| existing.retrieved_from.as_ref() == Some(&source))
        {
            Some(existing) => {
                workflow.id = existing.id;
                *existing = workflow.clone();
            }
            None => {
                workflow.id = Some(workflow.id.unwrap_or_else(Uuid::new_v4));
                workflows.push(workflow.clone());
            }
        }
        Ok(workflow)
    }
}

#[async_trait]
impl WorkflowRepository for InMemoryWorkflowRepository {
    async fn find(&self, id: Uuid) -> Result<Option<Workflow>, sqlx::Error> {
        self.check()?;
        Ok(self.find_where(|wf| wf.id == Some(id)))
    }

    async fn find_by_commit_and_path(
        &self,
        commit_id: &str,
        path: &str,
    ) -> Result<Option<Workflow>, sqlx::Error> {
        self.check()?;
        Ok(self.find_where(|wf| {
            wf.last_commit.as_deref() == Some(commit_id)
                && wf.retrieved_from.as_ref().map(|src| src.path.as_str()) == Some(path)
        }))
    }

    async fn find_by_retrieved_from(
        &self,
        source: &GitDetails,
    ) -> Result<Option<Workflow>, sqlx::Error> {
        self.check()?;
        Ok(self.find_where(|wf| wf.retrieved_from.as_ref() == Some(source)))
    }

    async fn find_by_source_and_commit(
        &self,
        source: &GitDetails,
        commit_id: &str,
    ) -> Result<Option<Workflow>, sqlx::Error> {
        self.check()?;
        Ok(self.find_where(|wf| {
            wf.retrieved_from.as_ref() == Some(source) && wf.last_commit.as_deref() == Some(commit_id)
        }))
    }

    async fn save(&self, workflow: Workflow) -> Result<Workflow, sqlx::Error> {
        self.check()?;
        self.insert_or_replace(workflow)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn workflow_at(source: GitDetails, commit: &str, label: &str) -> Workflow {
        let mut wf = Workflow::new(
            label,
            "",
            BTreeMap::new(),
            BTreeMap::new(),
            BTreeMap::new(),
            None,
        );
        wf.retrieved_from = Some(source);
        wf.set_last_commit(commit);
        wf
    }

    fn source() -> GitDetails {
        GitDetails::new("https://github.com/owner/repo", "main", "tools/wf.cwl")
    }

    #[tokio::test]
    async fn save_assigns_id_and_upserts_on_source() {
        let repo = InMemoryWorkflowRepository::new();
        let first = repo
            .save(workflow_at(source(), "abc123", "first"))
            .await
            .unwrap();
        let id = first.id.expect("id assigned on insert");

        let second = repo
            .save(workflow_at(source(), "def456", "second"))
            .await
            .unwrap();
        assert_eq!(second.id, Some(id));
        assert_eq!(repo.workflows.lock().unwrap().len(), 1);

        let found = repo.find(id).await.unwrap().unwrap();
        assert_eq!(found.label, "second");
        assert_eq!(found.last_commit.as_deref(), Some("def456"));
    }

    #[tokio::test]
    async fn finds_by_commit_and_path() {
        let repo = InMemoryWorkflowRepository::with_workflows(vec![workflow_at(
            source(),
            "abc123",
            "wf",
        )]);

        assert!(repo
            .find_by_commit_and_path("abc123", "tools/wf.cwl")
            .await
            .unwrap()
            .is_some());
        assert!(repo
            .find_by_commit_and_path("abc123", "tools/other.cwl")
            .await
            .unwrap()
            .is_none());
        assert!(repo
            .find_by_commit_and_path("zzz", "tools/wf.cwl")
            .await
            .unwrap()
            .is_none());
        assert!(repo
            .find_by_source_and_commit(&source(), "abc123")
            .await
            .unwrap()
            .is_some());
        assert!(repo
            .find_by_source_and_commit(&source(), "def456")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn save_requires_source_reference() {
        let repo = InMemoryWorkflowRepository::new();
        let wf = Workflow::new(
            "orphan",
            "",
            BTreeMap::new(),
            BTreeMap::new(),
            BTreeMap::new(),
            None,
        );
        assert!(repo.save(wf).await.is_err());
    }

    #[tokio::test]
    async fn failing_repo_returns_errors() {
        let repo = InMemoryWorkflowRepository::failing();
        assert!(repo.find_by_retrieved_from(&source()).await.is_err());
    }
}
