use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::workflow_repository::WorkflowRepository;
use crate::models::cwl::{CwlElement, CwlStep};
use crate::models::git_details::GitDetails;
use crate::models::workflow::Workflow;

pub struct PostgresWorkflowRepository {
    pub pool: PgPool,
}

#[derive(FromRow)]
struct WorkflowRow {
    id: Uuid,
    repo_url: String,
    branch: String,
    path: String,
    retrieved_on: Option<OffsetDateTime>,
    last_commit: Option<String>,
    ro_bundle: Option<String>,
    label: String,
    doc: String,
    inputs: Json<BTreeMap<String, CwlElement>>,
    outputs: Json<BTreeMap<String, CwlElement>>,
    steps: Json<BTreeMap<String, CwlStep>>,
    docker_link: Option<String>,
    dot_graph: Option<String>,
}

impl From<WorkflowRow> for Workflow {
    fn from(row: WorkflowRow) -> Self {
        Workflow {
            id: Some(row.id),
            retrieved_from: Some(GitDetails {
                repo_url: row.repo_url,
                branch: row.branch,
                path: row.path,
            }),
            retrieved_on: row.retrieved_on,
            last_commit: row.last_commit,
            ro_bundle: row.ro_bundle,
            label: row.label,
            doc: row.doc,
            inputs: row.inputs.0,
            outputs: row.outputs.0,
            steps: row.steps.0,
            docker_link: row.docker_link,
            dot_graph: row.dot_graph,
        }
    }
}

const WORKFLOW_COLUMNS: &str = "id, repo_url, branch, path, retrieved_on, last_commit, ro_bundle, \
     label, doc, inputs, outputs, steps, docker_link, dot_graph";

#[async_trait]
impl WorkflowRepository for PostgresWorkflowRepository {
    async fn find(&self, id: Uuid) -> Result<Option<Workflow>, sqlx::Error> {
        let row = sqlx::query_as::<_, WorkflowRow>(&format!(
            "SELECT {WORKFLOW_COLUMNS} FROM workflows WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Workflow::from))
    }

    async fn find_by_commit_and_path(
        &self,
        commit_id: &str,
        path: &str,
    ) -> Result<Option<Workflow>, sqlx::Error> {
        let row = sqlx::query_as::<_, WorkflowRow>(&format!(
            r#"
            SELECT {WORKFLOW_COLUMNS}
            FROM workflows
            WHERE last_commit = $1 AND path = $2
            ORDER BY retrieved_on DESC NULLS LAST
            LIMIT 1
            "#
        ))
        .bind(commit_id)
        .bind(path)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Workflow::from))
    }

    async fn find_by_retrieved_from(
        &self,
        source: &GitDetails,
    ) -> Result<Option<Workflow>, sqlx::Error> {
        let row = sqlx::query_as::<_, WorkflowRow>(&format!(
            "SELECT {WORKFLOW_COLUMNS} FROM workflows WHERE repo_url = $1 AND branch = $2 AND path = $3"
        ))
        .bind(&source.repo_url)
        .bind(&source.branch)
        .bind(&source.path)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Workflow::from))
    }

    async fn find_by_source_and_commit(
        &self,
        source: &GitDetails,
        commit_id: &str,
    ) -> Result<Option<Workflow>, sqlx::Error> {
        let row = sqlx::query_as::<_, WorkflowRow>(&format!(
            r#"
            SELECT {WORKFLOW_COLUMNS}
            FROM workflows
            WHERE repo_url = $1 AND branch = $2 AND path = $3 AND last_commit = $4
            "#
        ))
        .bind(&source.repo_url)
        .bind(&source.branch)
        .bind(&source.path)
        .bind(commit_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Workflow::from))
    }

    async fn save(&self, workflow: Workflow) -> Result<Workflow, sqlx::Error> {
        let Some(source) = workflow.retrieved_from.as_ref() else {
            return Err(sqlx::Error::Protocol(
                "workflow has no source reference".into(),
            ));
        };

        let row = sqlx::query_as::<_, WorkflowRow>(&format!(
            r#"
            INSERT INTO workflows (id, repo_url, branch, path, retrieved_on, last_commit, ro_bundle,
                                   label, doc, inputs, outputs, steps, docker_link, dot_graph)
            VALUES (COALESCE($1, gen_random_uuid()), $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (repo_url, branch, path) DO UPDATE
            SET retrieved_on = EXCLUDED.retrieved_on,
                last_commit = EXCLUDED.last_commit,
                ro_bundle = EXCLUDED.ro_bundle,
                label = EXCLUDED.label,
                doc = EXCLUDED.doc,
                inputs = EXCLUDED.inputs,
                outputs = EXCLUDED.outputs,
                steps = EXCLUDED.steps,
                docker_link = EXCLUDED.docker_link,
                dot_graph = EXCLUDED.dot_graph
            RETURNING {WORKFLOW_COLUMNS}
            "#
        ))
        .bind(workflow.id)
        .bind(&source.repo_url)
        .bind(&source.branch)
        .bind(&source.path)
        .bind(workflow.retrieved_on)
        .bind(&workflow.last_commit)
        .bind(&workflow.ro_bundle)
        .bind(&workflow.label)
        .bind(&workflow.doc)
        .bind(Json(&workflow.inputs))
        .bind(Json(&workflow.outputs))
        .bind(Json(&workflow.steps))
        .bind(&workflow.docker_link)
        .bind(&workflow.dot_graph)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }
}
