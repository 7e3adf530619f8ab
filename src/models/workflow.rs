use std::collections::BTreeMap;
use std::io;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::error;
use uuid::Uuid;

use crate::models::cwl::{CwlElement, CwlStep};
use crate::models::git_details::GitDetails;
use crate::services::graphviz::dot_writer;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: Option<Uuid>,
    pub retrieved_from: Option<GitDetails>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub retrieved_on: Option<OffsetDateTime>,
    /// Last commit of the branch when fetched; drives cache invalidation.
    pub last_commit: Option<String>,
    pub ro_bundle: Option<String>,
    pub label: String,
    pub doc: String,
    pub inputs: BTreeMap<String, CwlElement>,
    pub outputs: BTreeMap<String, CwlElement>,
    pub steps: BTreeMap<String, CwlStep>,
    /// Only DockerRequirement is parsed for this.
    pub docker_link: Option<String>,
    pub dot_graph: Option<String>,
}

/// Result of [`Workflow::generate_graph`]. A failed write keeps the
/// previously stored graph.
#[derive(Debug)]
pub enum GraphOutcome {
    Generated,
    Retained(io::Error),
}

impl GraphOutcome {
    pub fn is_generated(&self) -> bool {
        matches!(self, GraphOutcome::Generated)
    }
}

impl Workflow {
    pub fn new(
        label: impl Into<String>,
        doc: impl Into<String>,
        inputs: BTreeMap<String, CwlElement>,
        outputs: BTreeMap<String, CwlElement>,
        steps: BTreeMap<String, CwlStep>,
        docker_link: Option<String>,
    ) -> Self {
        Self {
            id: None,
            retrieved_from: None,
            retrieved_on: None,
            last_commit: None,
            ro_bundle: None,
            label: label.into(),
            doc: doc.into(),
            inputs,
            outputs,
            steps,
            docker_link,
            dot_graph: None,
        }
    }

    /// Render the DOT graph for this workflow and store it.
    pub fn generate_graph(&mut self) -> GraphOutcome {
        self.generate_graph_with(dot_writer::render)
    }

    pub fn generate_graph_with<F>(&mut self, write: F) -> GraphOutcome
    where
        F: FnOnce(&Workflow) -> io::Result<String>,
    {
        match write(self) {
            Ok(graph) => {
                self.dot_graph = Some(graph);
                GraphOutcome::Generated
            }
            Err(err) => {
                error!(label = %self.label, "Failed to create DOT graph for workflow: {}", err);
                GraphOutcome::Retained(err)
            }
        }
    }

    /// Record the commit seen on the last fetch. A different commit drops the
    /// cached graph. Returns whether the commit changed.
    pub fn set_last_commit(&mut self, commit: impl Into<String>) -> bool {
        let commit = commit.into();
        if self.last_commit.as_deref() == Some(commit.as_str()) {
            return false;
        }
        self.last_commit = Some(commit);
        self.dot_graph = None;
        true
    }
}
