//! Magpie: a resumable harvester for organization-wide GitHub pull request
//! activity.
//!
//! Magpie lists every repository in an organization, then persists four
//! JSON artifacts per pull request (details, review comments, comments,
//! commits) under a durable `output/<repo>/pulls/` tree. The crawl is
//! strictly sequential; rate limiting is survived by a fixed-interval
//! retry loop, and interruption is survived by resuming from the files
//! already on disk.

pub mod config;
pub mod github;
pub mod harvest;
pub mod progress;
pub mod store;

pub use config::{ExclusionSet, MagpieConfig};
pub use github::{
    HarvestError, HarvestGateway, OctocrabHarvestGateway, OrganizationName, PersonalAccessToken,
};
pub use harvest::{HarvestSummary, Harvester};
pub use progress::{ConsoleProgress, HarvestEvent, ProgressSink};
pub use store::{ArtifactKind, ArtifactStore};
