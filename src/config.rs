//! Run configuration resolved from the environment and the CLI mode token.
//!
//! Magpie is configured environment-first, matching the tool it replaces:
//!
//! - `MAGPIE_TOKEN` (legacy fallback `GITHUB_PAT`) - access token, required
//! - `MAGPIE_ORG` (legacy fallback `GITHUB_ORG`) - organization, defaults
//!   to `nodejs`
//! - `MAGPIE_EXCLUDED_REPOS` (legacy fallback `EXCLUDED_REPOS`) -
//!   comma-separated repository names to skip, defaults to empty
//! - `MAGPIE_OUTPUT_DIR` - artifact root, defaults to `output`
//!
//! The configuration value is constructed once at startup and passed by
//! reference; nothing here is mutated after load.

use std::collections::HashSet;
use std::env;

use camino::Utf8PathBuf;

use crate::github::{HarvestError, OrganizationName, PersonalAccessToken};

/// Organization harvested when none is configured.
pub const DEFAULT_ORGANIZATION: &str = "nodejs";

/// Artifact root used when none is configured.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// CLI mode token that restricts the run to the first repository.
pub const TEST_MODE_TOKEN: &str = "test";

/// Repository names excluded from the harvest. Consulted once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet(HashSet<String>);

impl ExclusionSet {
    /// Parses a comma-separated list of repository names.
    ///
    /// Entries are trimmed; empty entries are ignored.
    #[must_use]
    pub fn from_csv(value: &str) -> Self {
        Self(
            value
                .split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(ToOwned::to_owned)
                .collect(),
        )
    }

    /// Returns true when the repository name is excluded.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// Number of excluded names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no names are excluded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Application configuration resolved at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MagpieConfig {
    /// Access token, if any source provided one.
    pub token: Option<String>,
    /// Organization override, if set.
    pub organization: Option<String>,
    /// Raw comma-separated exclusion list, if set.
    pub excluded_repos: Option<String>,
    /// Artifact root override, if set.
    pub output_dir: Option<Utf8PathBuf>,
    /// Restricts the run to the first repository.
    pub test_mode: bool,
}

impl MagpieConfig {
    /// Loads configuration from the environment and the CLI mode token.
    ///
    /// Test mode is active when `mode` is exactly [`TEST_MODE_TOKEN`]; any
    /// other value or omission runs the full organization.
    #[must_use]
    pub fn from_env(mode: Option<&str>) -> Self {
        Self {
            token: env_first(&["MAGPIE_TOKEN", "GITHUB_PAT"]),
            organization: env_first(&["MAGPIE_ORG", "GITHUB_ORG"]),
            excluded_repos: env_first(&["MAGPIE_EXCLUDED_REPOS", "EXCLUDED_REPOS"]),
            output_dir: env_first(&["MAGPIE_OUTPUT_DIR"]).map(Utf8PathBuf::from),
            test_mode: mode == Some(TEST_MODE_TOKEN),
        }
    }

    /// Resolves the access token.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::MissingToken`] when no source provided a
    /// token. This is a fatal startup error raised before any network
    /// activity.
    pub fn resolve_token(&self) -> Result<PersonalAccessToken, HarvestError> {
        let raw = self.token.as_deref().ok_or(HarvestError::MissingToken)?;
        PersonalAccessToken::new(raw)
    }

    /// Resolves the organization, falling back to [`DEFAULT_ORGANIZATION`].
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::Configuration`] when a configured value is
    /// blank.
    pub fn resolve_organization(&self) -> Result<OrganizationName, HarvestError> {
        OrganizationName::new(self.organization.as_deref().unwrap_or(DEFAULT_ORGANIZATION))
    }

    /// Returns the parsed exclusion set.
    #[must_use]
    pub fn exclusion_set(&self) -> ExclusionSet {
        self.excluded_repos
            .as_deref()
            .map(ExclusionSet::from_csv)
            .unwrap_or_default()
    }

    /// Returns the artifact root, falling back to [`DEFAULT_OUTPUT_DIR`].
    #[must_use]
    pub fn resolve_output_dir(&self) -> Utf8PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_OUTPUT_DIR))
    }
}

/// Returns the first non-empty value among the named environment variables.
fn env_first(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| env::var(key).ok())
        .find(|value| !value.trim().is_empty())
}
