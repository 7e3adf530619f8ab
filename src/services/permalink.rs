use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::db::workflow_repository::WorkflowRepository;
use crate::models::git_details::GitDetails;
use crate::models::workflow::Workflow;
use crate::services::bundle::{BundleError, BundleService};
use crate::services::graphviz::{GraphError, GraphFormat, GraphRenderer};
use crate::services::rdf::{RdfError, RdfFormat, RdfService};
use crate::utils::path::{extract_path, PERMALINK_PATH_START};

/// What a permalink request asked for, after content negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Representation {
    Viewer,
    Raw,
    Rdf(RdfFormat),
    Graph(GraphFormat),
    Bundle,
}

#[derive(Debug, thiserror::Error)]
pub enum PermalinkError {
    #[error("workflow not found")]
    WorkflowNotFound,
    #[error("requested representation is not available for this workflow")]
    RepresentationNotFound,
    #[error("workflow store error: {0}")]
    Repository(#[from] sqlx::Error),
    #[error(transparent)]
    Rdf(#[from] RdfError),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Bundle(#[from] BundleError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    Inline,
    Attachment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Permalink {
    /// Temporary redirect.
    Redirect(String),
    Rdf {
        format: RdfFormat,
        body: Vec<u8>,
    },
    File {
        path: PathBuf,
        content_type: &'static str,
        file_name: &'static str,
        disposition: Disposition,
    },
}

/// Resolves `/git/{commit}/{path}` permalinks to a workflow representation.
#[derive(Clone)]
pub struct PermalinkResolver {
    workflows: Arc<dyn WorkflowRepository>,
    rdf: Arc<dyn RdfService>,
    graphs: Arc<dyn GraphRenderer>,
    bundles: Arc<dyn BundleService>,
}

impl PermalinkResolver {
    pub fn new(
        workflows: Arc<dyn WorkflowRepository>,
        rdf: Arc<dyn RdfService>,
        graphs: Arc<dyn GraphRenderer>,
        bundles: Arc<dyn BundleService>,
    ) -> Self {
        Self {
            workflows,
            rdf,
            graphs,
            bundles,
        }
    }

    /// Workflow for `commit_id` at the path following the commit segment of
    /// `request_path`.
    pub async fn find_workflow(
        &self,
        commit_id: &str,
        request_path: &str,
    ) -> Result<Workflow, PermalinkError> {
        let path = extract_path(request_path, PERMALINK_PATH_START);
        debug!(%commit_id, %path, "resolving permalink");
        self.workflows
            .find_by_commit_and_path(commit_id, &path)
            .await?
            .ok_or(PermalinkError::WorkflowNotFound)
    }

    pub async fn resolve(
        &self,
        commit_id: &str,
        request_path: &str,
        representation: Representation,
    ) -> Result<Permalink, PermalinkError> {
        let workflow = self.find_workflow(commit_id, request_path).await?;
        let source = workflow
            .retrieved_from
            .as_ref()
            .ok_or(PermalinkError::WorkflowNotFound)?;

        match representation {
            Representation::Viewer => Ok(Permalink::Redirect(source.internal_url(commit_id))),
            Representation::Raw => {
                if !source.git_type().has_raw_url() {
                    return Err(PermalinkError::RepresentationNotFound);
                }
                source
                    .raw_url(commit_id)
                    .map(Permalink::Redirect)
                    .ok_or(PermalinkError::RepresentationNotFound)
            }
            Representation::Rdf(format) => self.rdf_model(source, commit_id, format).await,
            Representation::Graph(format) => {
                let path = self.graphs.get_workflow_graph(format, source).await?;
                Ok(Permalink::File {
                    path,
                    content_type: format.media_type(),
                    file_name: format.file_name(),
                    disposition: Disposition::Inline,
                })
            }
            Representation::Bundle => {
                let path = self.bundles.get_ro_bundle(source).await?;
                Ok(Permalink::File {
                    path,
                    content_type: "application/zip",
                    file_name: "bundle.zip",
                    disposition: Disposition::Attachment,
                })
            }
        }
    }

    async fn rdf_model(
        &self,
        source: &GitDetails,
        commit_id: &str,
        format: RdfFormat,
    ) -> Result<Permalink, PermalinkError> {
        let key = rdf_graph_key(source, commit_id);
        if !self.rdf.graph_exists(&key).await? {
            return Err(PermalinkError::WorkflowNotFound);
        }
        let body = self.rdf.get_model(&key, format).await?;
        Ok(Permalink::Rdf { format, body })
    }
}

/// Name of the RDF graph describing `source` at `commit_id`: its web URL
/// without the `https://` scheme.
pub fn rdf_graph_key(source: &GitDetails, commit_id: &str) -> String {
    let url = source.url(commit_id);
    match url.strip_prefix("https://") {
        Some(rest) => rest.to_string(),
        None => url,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::db::mock_db::InMemoryWorkflowRepository;
    use crate::services::bundle::MockBundleService;
    use crate::services::graphviz::MockGraphRenderer;
    use crate::services::rdf::MockRdfService;

    const HOSTED: &str = "https://github.com/owner/repo";
    const GENERIC: &str = "https://git.example.org/owner/repo.git";

    fn workflow(repo_url: &str, commit: &str) -> Workflow {
        let mut wf = Workflow::new(
            "wf",
            "",
            BTreeMap::new(),
            BTreeMap::new(),
            BTreeMap::new(),
            None,
        );
        wf.retrieved_from = Some(GitDetails::new(repo_url, "main", "tools/wf.cwl"));
        wf.set_last_commit(commit);
        wf
    }

    struct Fixture {
        resolver: PermalinkResolver,
        rdf: MockRdfService,
        graphs: MockGraphRenderer,
        bundles: MockBundleService,
    }

    fn fixture(workflows: Vec<Workflow>, rdf: MockRdfService) -> Fixture {
        let graphs = MockGraphRenderer::serving("/tmp/graph.svg");
        let bundles = MockBundleService::serving("/tmp/bundle.zip");
        let resolver = PermalinkResolver::new(
            Arc::new(InMemoryWorkflowRepository::with_workflows(workflows)),
            Arc::new(rdf.clone()),
            Arc::new(graphs.clone()),
            Arc::new(bundles.clone()),
        );
        Fixture {
            resolver,
            rdf,
            graphs,
            bundles,
        }
    }

    const PATH: &str = "/git/abc123/tools/wf.cwl";

    #[tokio::test]
    async fn unknown_commit_is_not_found() {
        let fx = fixture(vec![workflow(HOSTED, "abc123")], MockRdfService::new());
        let err = fx
            .resolver
            .resolve("zzz999", "/git/zzz999/tools/wf.cwl", Representation::Viewer)
            .await
            .unwrap_err();
        assert!(matches!(err, PermalinkError::WorkflowNotFound));
    }

    #[tokio::test]
    async fn viewer_redirects_to_internal_url() {
        let wf = workflow(HOSTED, "abc123");
        let expected = wf.retrieved_from.as_ref().unwrap().internal_url("abc123");
        let fx = fixture(vec![wf], MockRdfService::new());

        let link = fx
            .resolver
            .resolve("abc123", PATH, Representation::Viewer)
            .await
            .unwrap();
        assert_eq!(link, Permalink::Redirect(expected));
    }

    #[tokio::test]
    async fn raw_redirects_for_hosted_sources() {
        let fx = fixture(vec![workflow(HOSTED, "abc123")], MockRdfService::new());
        let link = fx
            .resolver
            .resolve("abc123", PATH, Representation::Raw)
            .await
            .unwrap();
        assert_eq!(
            link,
            Permalink::Redirect(
                "https://raw.githubusercontent.com/owner/repo/abc123/tools/wf.cwl".into()
            )
        );
    }

    #[tokio::test]
    async fn raw_is_unsupported_for_generic_sources() {
        let fx = fixture(vec![workflow(GENERIC, "abc123")], MockRdfService::new());
        let err = fx
            .resolver
            .resolve("abc123", PATH, Representation::Raw)
            .await
            .unwrap_err();
        assert!(matches!(err, PermalinkError::RepresentationNotFound));
    }

    #[tokio::test]
    async fn absent_rdf_graph_is_not_found_for_every_syntax() {
        let fx = fixture(vec![workflow(HOSTED, "abc123")], MockRdfService::new());
        for format in [RdfFormat::Turtle, RdfFormat::JsonLd, RdfFormat::RdfXml] {
            let err = fx
                .resolver
                .resolve("abc123", PATH, Representation::Rdf(format))
                .await
                .unwrap_err();
            assert!(matches!(err, PermalinkError::WorkflowNotFound), "{format:?}");
        }
        assert!(fx.rdf.model_requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn rdf_graph_is_fetched_by_scheme_less_url() {
        let key = "github.com/owner/repo/blob/abc123/tools/wf.cwl";
        let rdf = MockRdfService::new().with_graph(key, b"<> a <Workflow> .");
        let fx = fixture(vec![workflow(HOSTED, "abc123")], rdf);

        let link = fx
            .resolver
            .resolve("abc123", PATH, Representation::Rdf(RdfFormat::Turtle))
            .await
            .unwrap();
        match link {
            Permalink::Rdf { format, body } => {
                assert_eq!(format, RdfFormat::Turtle);
                assert_eq!(body, b"text/turtle\n<> a <Workflow> .".to_vec());
            }
            other => panic!("unexpected permalink: {other:?}"),
        }
        assert_eq!(
            fx.rdf.model_requests.lock().unwrap().as_slice(),
            &[(key.to_string(), RdfFormat::Turtle)]
        );
    }

    #[tokio::test]
    async fn graph_is_delegated_to_renderer() {
        let fx = fixture(vec![workflow(HOSTED, "abc123")], MockRdfService::new());
        let link = fx
            .resolver
            .resolve("abc123", PATH, Representation::Graph(GraphFormat::Png))
            .await
            .unwrap();
        assert_eq!(
            link,
            Permalink::File {
                path: PathBuf::from("/tmp/graph.svg"),
                content_type: "image/png",
                file_name: "graph.png",
                disposition: Disposition::Inline,
            }
        );
        let requests = fx.graphs.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, GraphFormat::Png);
        assert_eq!(requests[0].1.repo_url, HOSTED);
    }

    #[tokio::test]
    async fn bundle_is_an_attachment() {
        let fx = fixture(vec![workflow(HOSTED, "abc123")], MockRdfService::new());
        let link = fx
            .resolver
            .resolve("abc123", PATH, Representation::Bundle)
            .await
            .unwrap();
        assert!(matches!(
            link,
            Permalink::File {
                disposition: Disposition::Attachment,
                file_name: "bundle.zip",
                ..
            }
        ));
        assert_eq!(fx.bundles.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn renderer_failure_aborts_request() {
        let resolver = PermalinkResolver::new(
            Arc::new(InMemoryWorkflowRepository::with_workflows(vec![workflow(
                HOSTED, "abc123",
            )])),
            Arc::new(MockRdfService::new()),
            Arc::new(MockGraphRenderer::default()),
            Arc::new(MockBundleService::default()),
        );
        let err = resolver
            .resolve("abc123", PATH, Representation::Graph(GraphFormat::Svg))
            .await
            .unwrap_err();
        assert!(matches!(err, PermalinkError::Graph(GraphError::NotGenerated(_))));
    }

    #[tokio::test]
    async fn rdf_store_failure_aborts_request() {
        let fx = fixture(vec![workflow(HOSTED, "abc123")], MockRdfService::failing());
        let err = fx
            .resolver
            .resolve("abc123", PATH, Representation::Rdf(RdfFormat::JsonLd))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PermalinkError::Rdf(RdfError::Status { status: 500, .. })
        ));
        assert!(fx.rdf.model_requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn bundle_failure_aborts_request() {
        let resolver = PermalinkResolver::new(
            Arc::new(InMemoryWorkflowRepository::with_workflows(vec![workflow(
                HOSTED, "abc123",
            )])),
            Arc::new(MockRdfService::new()),
            Arc::new(MockGraphRenderer::default()),
            Arc::new(MockBundleService::default()),
        );
        let err = resolver
            .resolve("abc123", PATH, Representation::Bundle)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PermalinkError::Bundle(BundleError::NotAvailable(_))
        ));
    }

    #[test]
    fn rdf_key_strips_scheme() {
        let source = GitDetails::new(HOSTED, "main", "wf.cwl");
        assert_eq!(
            rdf_graph_key(&source, "abc123"),
            "github.com/owner/repo/blob/abc123/wf.cwl"
        );
    }
}
