#![allow(dead_code)]
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{GraphError, GraphFormat, GraphRenderer};
use crate::models::git_details::GitDetails;

#[derive(Clone, Default)]
pub struct MockGraphRenderer {
    /// File handed back for every request; `None` reports a missing graph.
    pub file: Option<PathBuf>,
    pub requests: Arc<Mutex<Vec<(GraphFormat, GitDetails)>>>,
}

impl MockGraphRenderer {
    pub fn serving(file: impl Into<PathBuf>) -> Self {
        Self {
            file: Some(file.into()),
            ..Default::default()
        }
    }
}

#[async_trait]
impl GraphRenderer for MockGraphRenderer {
    async fn get_workflow_graph(
        &self,
        format: GraphFormat,
        source: &GitDetails,
    ) -> Result<PathBuf, GraphError> {
        self.requests
            .lock()
            .unwrap()
            .push((format, source.clone()));
        self.file
            .clone()
            .ok_or_else(|| GraphError::NotGenerated(source.repo_url.clone()))
    }
}
