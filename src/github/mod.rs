//! GitHub source access for the harvester.
//!
//! This module wraps Octocrab behind a mockable gateway trait, classifies
//! failures into a single error taxonomy with a retryable rate-limit
//! signal, and provides the fixed-interval invoker that keeps the crawl
//! alive through throttling.

pub mod error;
pub mod gateway;
pub mod locator;
pub mod models;
pub mod rate_limit;
pub mod retry;

pub use error::HarvestError;
pub use gateway::{HarvestGateway, OctocrabHarvestGateway};
pub use locator::{OrganizationName, PersonalAccessToken};
pub use models::{PullRequestSummary, Repository};
pub use rate_limit::RateLimitInfo;
pub use retry::{RATE_LIMIT_BACKOFF, retry_on_rate_limit};

#[cfg(test)]
pub use gateway::MockHarvestGateway;
