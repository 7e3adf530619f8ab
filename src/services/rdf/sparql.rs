use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::debug;

use super::{RdfError, RdfFormat, RdfService};

const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// Client for a SPARQL 1.1 endpoint that also speaks the graph store
/// protocol (`/query` and `/data`).
pub struct SparqlRdfService {
    client: Arc<Client>,
    endpoint: String,
    graph_base: String,
}

#[derive(Debug, Deserialize)]
struct AskResponse {
    boolean: bool,
}

impl SparqlRdfService {
    pub fn new(client: Arc<Client>, endpoint: &str, graph_base: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            graph_base: graph_base.to_string(),
        }
    }

    fn graph_iri(&self, key: &str) -> String {
        format!("{}{}", self.graph_base, key)
    }

    async fn check_status(response: Response) -> Result<Response, RdfError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(RdfError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl RdfService for SparqlRdfService {
    async fn graph_exists(&self, key: &str) -> Result<bool, RdfError> {
        let query = format!("ASK WHERE {{ GRAPH <{}> {{ ?s ?p ?o }} }}", self.graph_iri(key));
        debug!(%key, "checking rdf graph");

        let response = self
            .client
            .get(format!("{}/query", self.endpoint))
            .query(&[("query", query.as_str())])
            .header(ACCEPT, SPARQL_RESULTS_JSON)
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let body = response.bytes().await?;
        let ask: AskResponse =
            serde_json::from_slice(&body).map_err(|e| RdfError::Decode(e.to_string()))?;
        Ok(ask.boolean)
    }

    async fn get_model(&self, key: &str, format: RdfFormat) -> Result<Vec<u8>, RdfError> {
        let iri = self.graph_iri(key);
        let response = self
            .client
            .get(format!("{}/data", self.endpoint))
            .query(&[("graph", iri.as_str())])
            .header(ACCEPT, format.media_type())
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "github.com/owner/repo/blob/abc123/wf.cwl";

    fn service(server: &httpmock::MockServer) -> SparqlRdfService {
        SparqlRdfService::new(Arc::new(Client::new()), &server.url("/"), "https://")
    }

    #[tokio::test]
    async fn ask_query_targets_named_graph() {
        let server = httpmock::MockServer::start();
        let ask = server.mock(|when, then| {
            when.method(httpmock::Method::GET)
                .path("/query")
                .query_param(
                    "query",
                    "ASK WHERE { GRAPH <https://github.com/owner/repo/blob/abc123/wf.cwl> { ?s ?p ?o } }",
                )
                .header("accept", SPARQL_RESULTS_JSON);
            then.status(200)
                .json_body(serde_json::json!({ "head": {}, "boolean": true }));
        });

        assert!(service(&server).graph_exists(KEY).await.unwrap());
        ask.assert();
    }

    #[tokio::test]
    async fn ask_false_means_absent() {
        let server = httpmock::MockServer::start();
        server.mock(|when, then| {
            when.method(httpmock::Method::GET).path("/query");
            then.status(200)
                .json_body(serde_json::json!({ "head": {}, "boolean": false }));
        });

        assert!(!service(&server).graph_exists(KEY).await.unwrap());
    }

    #[tokio::test]
    async fn get_model_requests_format_media_type() {
        let server = httpmock::MockServer::start();
        let data = server.mock(|when, then| {
            when.method(httpmock::Method::GET)
                .path("/data")
                .query_param("graph", "https://github.com/owner/repo/blob/abc123/wf.cwl")
                .header("accept", "application/ld+json");
            then.status(200).body(r#"{"@graph":[]}"#);
        });

        let body = service(&server)
            .get_model(KEY, RdfFormat::JsonLd)
            .await
            .unwrap();
        assert_eq!(body, br#"{"@graph":[]}"#.to_vec());
        data.assert();
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let server = httpmock::MockServer::start();
        server.mock(|when, then| {
            when.method(httpmock::Method::GET).path("/data");
            then.status(503).body("store offline");
        });

        let err = service(&server)
            .get_model(KEY, RdfFormat::Turtle)
            .await
            .unwrap_err();
        match err {
            RdfError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "store offline");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_ask_response_is_decode_error() {
        let server = httpmock::MockServer::start();
        server.mock(|when, then| {
            when.method(httpmock::Method::GET).path("/query");
            then.status(200).body("not json");
        });

        let err = service(&server).graph_exists(KEY).await.unwrap_err();
        assert!(matches!(err, RdfError::Decode(_)));
    }
}
