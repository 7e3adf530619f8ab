#![allow(dead_code)]
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{BundleError, BundleService};
use crate::models::git_details::GitDetails;

#[derive(Clone, Default)]
pub struct MockBundleService {
    pub file: Option<PathBuf>,
    pub requests: Arc<Mutex<Vec<GitDetails>>>,
}

impl MockBundleService {
    pub fn serving(file: impl Into<PathBuf>) -> Self {
        Self {
            file: Some(file.into()),
            ..Default::default()
        }
    }
}

#[async_trait]
impl BundleService for MockBundleService {
    async fn get_ro_bundle(&self, source: &GitDetails) -> Result<PathBuf, BundleError> {
        self.requests.lock().unwrap().push(source.clone());
        self.file
            .clone()
            .ok_or_else(|| BundleError::NotAvailable(source.repo_url.clone()))
    }
}
