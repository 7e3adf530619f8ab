#![allow(dead_code)]
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{RdfError, RdfFormat, RdfService};

/// In-memory graphs keyed by graph key; every format returns the same bytes
/// prefixed with the requested media type so tests can tell them apart.
#[derive(Clone, Default)]
pub struct MockRdfService {
    pub graphs: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    pub model_requests: Arc<Mutex<Vec<(String, RdfFormat)>>>,
    pub should_fail: bool,
}

impl MockRdfService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    pub fn with_graph(self, key: &str, body: &[u8]) -> Self {
        self.graphs
            .lock()
            .unwrap()
            .insert(key.to_string(), body.to_vec());
        self
    }
}

impl MockRdfService {
    fn check(&self) -> Result<(), RdfError> {
        if self.should_fail {
            return Err(RdfError::Status {
                status: 500,
                body: "Mock RDF failure".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RdfService for MockRdfService {
    async fn graph_exists(&self, key: &str) -> Result<bool, RdfError> {
        self.check()?;
        Ok(self.graphs.lock().unwrap().contains_key(key))
    }

    async fn get_model(&self, key: &str, format: RdfFormat) -> Result<Vec<u8>, RdfError> {
        self.model_requests
            .lock()
            .unwrap()
            .push((key.to_string(), format));
        self.check()?;
        let graphs = self.graphs.lock().unwrap();
        let body = graphs
            .get(key)
            .ok_or_else(|| RdfError::Decode(format!("no graph {key}")))?;
        let mut out = format!("{}\n", format.media_type()).into_bytes();
        out.extend_from_slice(body);
        Ok(out)
    }
}
