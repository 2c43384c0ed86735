//! Data models for repository and pull request listings.
//!
//! Only the fields the traversal consumes are modelled: repository names and
//! pull request numbers. Artifact payloads stay opaque `serde_json::Value`
//! collections so the files on disk reproduce whatever GitHub returned.

use serde::Deserialize;

/// A repository discovered in the organization listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// Repository name, unique within the organization.
    pub name: String,
}

/// A pull request entry from the per-repository listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PullRequestSummary {
    /// Pull request number, unique within the repository.
    pub number: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiRepository {
    pub(super) name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiPullRequestSummary {
    pub(super) number: u64,
}

impl From<ApiRepository> for Repository {
    fn from(value: ApiRepository) -> Self {
        Self { name: value.name }
    }
}

impl From<ApiPullRequestSummary> for PullRequestSummary {
    fn from(value: ApiPullRequestSummary) -> Self {
        Self {
            number: value.number,
        }
    }
}
