use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{GraphError, GraphFormat, GraphRenderer};
use crate::db::workflow_repository::WorkflowRepository;
use crate::models::git_details::GitDetails;

/// Renders stored DOT graphs with the Graphviz `dot` binary and keeps the
/// results in a storage directory.
pub struct DotGraphRenderer {
    repo: Arc<dyn WorkflowRepository>,
    storage: PathBuf,
    dot_binary: String,
}

impl DotGraphRenderer {
    pub fn new(
        repo: Arc<dyn WorkflowRepository>,
        storage: impl Into<PathBuf>,
        dot_binary: impl Into<String>,
    ) -> Self {
        Self {
            repo,
            storage: storage.into(),
            dot_binary: dot_binary.into(),
        }
    }

    fn cache_path(&self, source: &GitDetails, commit: &str, format: GraphFormat) -> PathBuf {
        let mut hasher = Sha256::new();
        for part in [
            source.repo_url.as_str(),
            source.branch.as_str(),
            source.path.as_str(),
            commit,
        ] {
            hasher.update(part.as_bytes());
            hasher.update([0u8]);
        }
        let name = format!("{}.{}", hex::encode(hasher.finalize()), format.as_str());
        self.storage.join(name)
    }

    async fn render(&self, dot: &str, format: GraphFormat, target: &Path) -> Result<(), GraphError> {
        // one partial file per call
        let partial = target.with_extension(format!(
            "{}.{}.partial",
            format.as_str(),
            Uuid::new_v4().simple()
        ));

        let mut child = Command::new(&self.dot_binary)
            .arg(format!("-T{}", format.as_str()))
            .arg("-o")
            .arg(&partial)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdin = child.stdin.take();
        let write = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(dot.as_bytes()).await?;
                stdin.shutdown().await?;
            }
            Ok::<(), io::Error>(())
        };
        let (written, output) = tokio::join!(write, child.wait_with_output());

        let output = match output {
            Ok(output) => output,
            Err(err) => {
                discard(&partial).await;
                return Err(err.into());
            }
        };
        if !output.status.success() {
            discard(&partial).await;
            return Err(GraphError::Render(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        if let Err(err) = written {
            discard(&partial).await;
            return Err(err.into());
        }

        if let Err(err) = tokio::fs::rename(&partial, target).await {
            discard(&partial).await;
            if tokio::fs::try_exists(target).await.unwrap_or(false) {
                debug!(path = %target.display(), "graph rendered concurrently");
                return Ok(());
            }
            return Err(err.into());
        }
        Ok(())
    }
}

async fn discard(partial: &Path) {
    if let Err(err) = tokio::fs::remove_file(partial).await {
        if err.kind() != io::ErrorKind::NotFound {
            warn!(path = %partial.display(), error = %err, "failed to remove partial graph");
        }
    }
}

#[async_trait]
impl GraphRenderer for DotGraphRenderer {
    async fn get_workflow_graph(
        &self,
        format: GraphFormat,
        source: &GitDetails,
    ) -> Result<PathBuf, GraphError> {
        let workflow = self
            .repo
            .find_by_retrieved_from(source)
            .await?
            .ok_or_else(|| GraphError::WorkflowNotFound(source.url(&source.branch)))?;

        let dot = workflow
            .dot_graph
            .as_deref()
            .ok_or_else(|| GraphError::NotGenerated(source.url(&source.branch)))?;

        let commit = workflow.last_commit.as_deref().unwrap_or(&source.branch);
        let target = self.cache_path(source, commit, format);
        if tokio::fs::try_exists(&target).await? {
            debug!(path = %target.display(), "serving cached graph");
            return Ok(target);
        }

        tokio::fs::create_dir_all(&self.storage).await?;
        self.render(dot, format, &target).await?;
        info!(path = %target.display(), %format, "rendered workflow graph");
        Ok(target)
    }
}
