use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RdfFormat {
    Turtle,
    JsonLd,
    RdfXml,
}

impl RdfFormat {
    pub fn media_type(&self) -> &'static str {
        match self {
            RdfFormat::Turtle => "text/turtle",
            RdfFormat::JsonLd => "application/ld+json",
            RdfFormat::RdfXml => "application/rdf+xml",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RdfError {
    #[error("rdf store request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("rdf store returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected rdf store response: {0}")]
    Decode(String),
}

/// Triple store holding one named graph per workflow.
#[async_trait]
pub trait RdfService: Send + Sync {
    async fn graph_exists(&self, key: &str) -> Result<bool, RdfError>;

    async fn get_model(&self, key: &str, format: RdfFormat) -> Result<Vec<u8>, RdfError>;
}

mod mock;
mod sparql;

#[allow(unused_imports)]
pub use mock::MockRdfService;
pub use sparql::SparqlRdfService;
