use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GitType {
    Github,
    Gitlab,
    Bitbucket,
    Generic,
}

impl GitType {
    pub fn from_repo_url(repo_url: &str) -> Self {
        match host_of(repo_url).as_str() {
            "github.com" => GitType::Github,
            "gitlab.com" => GitType::Gitlab,
            "bitbucket.org" => GitType::Bitbucket,
            _ => GitType::Generic,
        }
    }

    /// Whether files hosted on this kind of server have a known raw download URL.
    pub fn has_raw_url(&self) -> bool {
        !matches!(self, GitType::Generic)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GitType::Github => "github",
            GitType::Gitlab => "gitlab",
            GitType::Bitbucket => "bitbucket",
            GitType::Generic => "generic",
        }
    }
}

impl fmt::Display for GitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a workflow file was retrieved from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GitDetails {
    pub repo_url: String,
    pub branch: String,
    pub path: String,
}

impl GitDetails {
    pub fn new(
        repo_url: impl Into<String>,
        branch: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            repo_url: repo_url.into(),
            branch: branch.into(),
            path: path.into(),
        }
    }

    pub fn git_type(&self) -> GitType {
        GitType::from_repo_url(&self.repo_url)
    }

    /// `owner/repo` for hosted repositories, `None` for generic ones.
    fn owner_repo(&self) -> Option<String> {
        if self.git_type() == GitType::Generic {
            return None;
        }
        let rest = strip_scheme(&self.repo_url);
        let (_, owner_repo) = rest.split_once('/')?;
        let owner_repo = owner_repo.trim_end_matches('/').trim_end_matches(".git");
        Some(owner_repo.to_string())
    }

    /// Public web URL of the file at `branch`.
    pub fn url(&self, branch: &str) -> String {
        let Some(owner_repo) = self.owner_repo() else {
            return self.repo_url.clone();
        };
        match self.git_type() {
            GitType::Github => format!(
                "https://github.com/{}/blob/{}/{}",
                owner_repo, branch, self.path
            ),
            GitType::Gitlab => format!(
                "https://gitlab.com/{}/-/blob/{}/{}",
                owner_repo, branch, self.path
            ),
            GitType::Bitbucket => format!(
                "https://bitbucket.org/{}/src/{}/{}",
                owner_repo, branch, self.path
            ),
            GitType::Generic => self.repo_url.clone(),
        }
    }

    /// Raw file URL at `branch`, if the host has one.
    pub fn raw_url(&self, branch: &str) -> Option<String> {
        let owner_repo = self.owner_repo()?;
        match self.git_type() {
            GitType::Github => Some(format!(
                "https://raw.githubusercontent.com/{}/{}/{}",
                owner_repo, branch, self.path
            )),
            GitType::Gitlab => Some(format!(
                "https://gitlab.com/{}/-/raw/{}/{}",
                owner_repo, branch, self.path
            )),
            GitType::Bitbucket => Some(format!(
                "https://bitbucket.org/{}/raw/{}/{}",
                owner_repo, branch, self.path
            )),
            GitType::Generic => None,
        }
    }

    /// Viewer page for the file at `branch`, relative to the site root.
    pub fn internal_url(&self, branch: &str) -> String {
        match self.owner_repo() {
            Some(owner_repo) => format!(
                "/workflows/{}/{}/blob/{}/{}",
                host_of(&self.repo_url),
                owner_repo,
                branch,
                self.path
            ),
            None => format!(
                "/workflows/{}/{}/{}",
                strip_scheme(&self.repo_url).trim_end_matches('/'),
                branch,
                self.path
            ),
        }
    }
}

fn strip_scheme(url: &str) -> &str {
    url.split_once("://").map(|(_, rest)| rest).unwrap_or(url)
}

fn host_of(url: &str) -> String {
    let rest = strip_scheme(url);
    let host = rest.split('/').next().unwrap_or_default();
    let host = host.rsplit('@').next().unwrap_or(host);
    host.trim_start_matches("www.").to_ascii_lowercase()
}
