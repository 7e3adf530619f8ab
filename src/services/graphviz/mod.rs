use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::models::git_details::GitDetails;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphFormat {
    Svg,
    Png,
    Xdot,
}

impl GraphFormat {
    /// Output format name passed to `dot -T`.
    pub fn as_str(&self) -> &'static str {
        match self {
            GraphFormat::Svg => "svg",
            GraphFormat::Png => "png",
            GraphFormat::Xdot => "xdot",
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            GraphFormat::Svg => "image/svg+xml",
            GraphFormat::Png => "image/png",
            GraphFormat::Xdot => "text/vnd+graphviz",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            GraphFormat::Svg => "graph.svg",
            GraphFormat::Png => "graph.png",
            GraphFormat::Xdot => "graph.dot",
        }
    }
}

impl fmt::Display for GraphFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("no workflow retrieved from {0}")]
    WorkflowNotFound(String),
    #[error("no DOT graph has been generated for {0}")]
    NotGenerated(String),
    #[error("repository error: {0}")]
    Repository(#[from] sqlx::Error),
    #[error("graph storage error: {0}")]
    Io(#[from] std::io::Error),
    #[error("graphviz failed: {0}")]
    Render(String),
}

#[async_trait]
pub trait GraphRenderer: Send + Sync {
    /// Path to the rendered graph of the workflow retrieved from `source`.
    async fn get_workflow_graph(
        &self,
        format: GraphFormat,
        source: &GitDetails,
    ) -> Result<PathBuf, GraphError>;
}

mod dot_renderer;
pub mod dot_writer;
mod mock;

pub use dot_renderer::DotGraphRenderer;
#[allow(unused_imports)]
pub use mock::MockGraphRenderer;
