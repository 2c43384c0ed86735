//! Gateway for fetching harvest source data through Octocrab.
//!
//! The trait-based design enables mocking in orchestrator tests while the
//! Octocrab implementation handles real HTTP requests. Listing operations
//! drain every page of the collection into one ordered `Vec`; per-pull-
//! request artifact fetches are capped at a single page of up to 100 items.

use async_trait::async_trait;
use http::{StatusCode, Uri};
use octocrab::{Octocrab, Page};
use serde_json::Value;
use tracing::debug;

use super::error::HarvestError;
use super::locator::{OrganizationName, PersonalAccessToken};
use super::models::{ApiPullRequestSummary, ApiRepository, PullRequestSummary, Repository};
use super::rate_limit::RateLimitInfo;

/// Maximum page size accepted by the GitHub list endpoints. Capped artifact
/// fetches request exactly one page of this size and do not follow `next`.
const ARTIFACT_PAGE_LIMIT: u8 = 100;

/// Builds an Octocrab client for the given token and API base URL.
///
/// # Errors
///
/// Returns [`HarvestError::InvalidApiBase`] when the base URI cannot be
/// parsed or [`HarvestError::Api`] when Octocrab fails to construct a
/// client.
fn build_octocrab_client(
    token: &PersonalAccessToken,
    api_base: &str,
) -> Result<Octocrab, HarvestError> {
    let base_uri: Uri = api_base
        .parse::<Uri>()
        .map_err(|error| HarvestError::InvalidApiBase(error.to_string()))?;

    Octocrab::builder()
        .personal_token(token.as_ref())
        .base_uri(base_uri)
        .map_err(|error| HarvestError::Api {
            message: format!("build client failed: {error}"),
        })?
        .build()
        .map_err(|error| map_octocrab_error("build client", &error))
}

/// Source of repositories, pull requests, and per-PR artifact payloads.
///
/// Artifact payloads are opaque ordered collections so the persisted files
/// reproduce exactly what the API returned.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HarvestGateway: Send + Sync {
    /// Lists every repository in the organization, across all states,
    /// draining all pages.
    async fn list_repositories(
        &self,
        org: &OrganizationName,
    ) -> Result<Vec<Repository>, HarvestError>;

    /// Lists the repository's pull requests, draining all pages.
    async fn list_pull_requests(
        &self,
        org: &OrganizationName,
        repo: &str,
    ) -> Result<Vec<PullRequestSummary>, HarvestError>;

    /// Fetches the full pull request detail object as a one-item collection.
    async fn pull_request_details(
        &self,
        org: &OrganizationName,
        repo: &str,
        number: u64,
    ) -> Result<Vec<Value>, HarvestError>;

    /// Fetches up to 100 review comments for the pull request (single page).
    async fn review_comments(
        &self,
        org: &OrganizationName,
        repo: &str,
        number: u64,
    ) -> Result<Vec<Value>, HarvestError>;

    /// Fetches up to 100 commits for the pull request (single page).
    async fn commits(
        &self,
        org: &OrganizationName,
        repo: &str,
        number: u64,
    ) -> Result<Vec<Value>, HarvestError>;
}

/// Octocrab-backed gateway.
pub struct OctocrabHarvestGateway {
    client: Octocrab,
}

impl OctocrabHarvestGateway {
    /// Creates a new gateway from an Octocrab client.
    #[must_use]
    pub const fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Builds a gateway against the public GitHub API.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::Api`] when Octocrab fails to construct a
    /// client.
    pub fn for_token(token: &PersonalAccessToken) -> Result<Self, HarvestError> {
        Self::for_token_with_base(token, "https://api.github.com")
    }

    /// Builds a gateway against an explicit API base URL.
    ///
    /// Tests point this at a local mock server.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::InvalidApiBase`] when the base URI cannot be
    /// parsed or [`HarvestError::Api`] when client construction fails.
    pub fn for_token_with_base(
        token: &PersonalAccessToken,
        api_base: &str,
    ) -> Result<Self, HarvestError> {
        let octocrab = build_octocrab_client(token, api_base)?;
        Ok(Self::new(octocrab))
    }

    /// Drains every page of a listing endpoint into one ordered `Vec`.
    ///
    /// The whole collection is materialized in memory before being handed
    /// to the caller; this bounds the design to organizations whose
    /// listings fit in memory.
    async fn drain_all<T, P>(
        &self,
        operation: &str,
        path: String,
        params: Option<&P>,
    ) -> Result<Vec<T>, HarvestError>
    where
        T: serde::de::DeserializeOwned,
        P: serde::Serialize + Sync,
    {
        let page: Page<T> = match self.client.get(&path, params).await {
            Ok(page) => page,
            Err(error) => return Err(self.map_error(operation, &error).await),
        };

        match self.client.all_pages(page).await {
            Ok(items) => {
                debug!(operation, path, count = items.len(), "drained all pages");
                Ok(items)
            }
            Err(error) => Err(self.map_error(operation, &error).await),
        }
    }

    /// Fetches one page of up to [`ARTIFACT_PAGE_LIMIT`] items without
    /// following `next`.
    async fn first_page(&self, operation: &str, path: String) -> Result<Vec<Value>, HarvestError> {
        let per_page = ARTIFACT_PAGE_LIMIT.to_string();
        let params = [("per_page", per_page.as_str())];

        match self.client.get::<Page<Value>, _, _>(&path, Some(&params)).await {
            Ok(page) => {
                debug!(operation, path, count = page.items.len(), "fetched capped page");
                Ok(page.items)
            }
            Err(error) => Err(self.map_error(operation, &error).await),
        }
    }

    /// Maps an octocrab error, attaching rate limit data when the failure
    /// is the throttling signal.
    async fn map_error(&self, operation: &str, error: &octocrab::Error) -> HarvestError {
        match error {
            octocrab::Error::GitHub { source, .. } if is_rate_limit_status(source.status_code) => {
                let rate_limit = self.fetch_rate_limit_info().await;
                let base_message =
                    format!("{operation} failed: {message}", message = source.message);
                let message = match &rate_limit {
                    Some(info) => format!(
                        "{base_message} (resets at {reset})",
                        reset = info.reset_at()
                    ),
                    None => base_message,
                };

                HarvestError::RateLimitExceeded {
                    rate_limit,
                    message,
                }
            }
            _ => map_octocrab_error(operation, error),
        }
    }

    async fn fetch_rate_limit_info(&self) -> Option<RateLimitInfo> {
        let rate = self.client.ratelimit().get().await.ok()?.rate;
        let Ok(limit) = u32::try_from(rate.limit) else {
            return None;
        };
        let Ok(remaining) = u32::try_from(rate.remaining) else {
            return None;
        };
        Some(RateLimitInfo::new(limit, remaining, rate.reset))
    }
}

#[async_trait]
impl HarvestGateway for OctocrabHarvestGateway {
    async fn list_repositories(
        &self,
        org: &OrganizationName,
    ) -> Result<Vec<Repository>, HarvestError> {
        let path = format!("/orgs/{}/repos", org.as_str());
        let repositories: Vec<ApiRepository> = self
            .drain_all("list repositories", path, Some(&[("type", "all")]))
            .await?;
        Ok(repositories.into_iter().map(ApiRepository::into).collect())
    }

    async fn list_pull_requests(
        &self,
        org: &OrganizationName,
        repo: &str,
    ) -> Result<Vec<PullRequestSummary>, HarvestError> {
        let path = format!("/repos/{}/{repo}/pulls", org.as_str());
        let pulls: Vec<ApiPullRequestSummary> =
            self.drain_all("list pull requests", path, None::<&()>).await?;
        Ok(pulls.into_iter().map(ApiPullRequestSummary::into).collect())
    }

    async fn pull_request_details(
        &self,
        org: &OrganizationName,
        repo: &str,
        number: u64,
    ) -> Result<Vec<Value>, HarvestError> {
        let path = format!("/repos/{}/{repo}/pulls/{number}", org.as_str());
        match self.client.get::<Value, _, _>(&path, None::<&()>).await {
            Ok(details) => Ok(vec![details]),
            Err(error) => Err(self.map_error("pull request details", &error).await),
        }
    }

    async fn review_comments(
        &self,
        org: &OrganizationName,
        repo: &str,
        number: u64,
    ) -> Result<Vec<Value>, HarvestError> {
        let path = format!("/repos/{}/{repo}/pulls/{number}/comments", org.as_str());
        self.first_page("review comments", path).await
    }

    async fn commits(
        &self,
        org: &OrganizationName,
        repo: &str,
        number: u64,
    ) -> Result<Vec<Value>, HarvestError> {
        let path = format!("/repos/{}/{repo}/pulls/{number}/commits", org.as_str());
        self.first_page("commits", path).await
    }
}

// --- Error mapping helpers ---

/// Checks whether the status is the throttling signal. The source reports
/// quota exhaustion as 403; 429 is its modern equivalent. A genuine
/// authorization failure on a 403 is indistinguishable and retries forever,
/// which matches the documented contract.
const fn is_rate_limit_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
    )
}

/// Checks if an octocrab error represents a network/transport issue.
const fn is_network_error(error: &octocrab::Error) -> bool {
    matches!(
        error,
        octocrab::Error::Http { .. }
            | octocrab::Error::Hyper { .. }
            | octocrab::Error::Service { .. }
    )
}

pub(super) fn map_octocrab_error(operation: &str, error: &octocrab::Error) -> HarvestError {
    if let octocrab::Error::GitHub { source, .. } = error {
        return if source.status_code == StatusCode::UNAUTHORIZED {
            HarvestError::Authentication {
                message: format!(
                    "{operation} failed: GitHub returned {status} {message}",
                    status = source.status_code,
                    message = source.message
                ),
            }
        } else {
            HarvestError::Api {
                message: format!(
                    "{operation} failed with status {status}: {message}",
                    status = source.status_code,
                    message = source.message
                ),
            }
        };
    }

    if is_network_error(error) {
        return HarvestError::Network {
            message: format!("{operation} failed: {error}"),
        };
    }

    HarvestError::Api {
        message: format!("{operation} failed: {error}"),
    }
}
