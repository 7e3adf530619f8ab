use crate::db::workflow_repository::WorkflowRepository;
use crate::services::bundle::BundleService;
use crate::services::graphviz::GraphRenderer;
use crate::services::permalink::PermalinkResolver;
use crate::services::rdf::RdfService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub workflow_repo: Arc<dyn WorkflowRepository>,
    pub rdf: Arc<dyn RdfService>,
    pub graphs: Arc<dyn GraphRenderer>,
    pub bundles: Arc<dyn BundleService>,
}

impl AppState {
    pub fn permalinks(&self) -> PermalinkResolver {
        PermalinkResolver::new(
            self.workflow_repo.clone(),
            self.rdf.clone(),
            self.graphs.clone(),
            self.bundles.clone(),
        )
    }
}
