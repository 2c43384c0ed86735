//! Durable artifact storage for harvested pull request data.
//!
//! Each pull request materializes four JSON files under
//! `<root>/<repo>/pulls/`. The file naming convention is load-bearing: a
//! later run decides what to skip purely by probing for the details file,
//! so the paths written here must stay bit-exact across versions.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde_json::Value;

use crate::github::HarvestError;

/// The four data kinds collected per pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// The full pull request detail object (one-item collection).
    Details,
    /// Review comments attached to the diff.
    ReviewComments,
    /// Discussion comments. Currently sourced from the same endpoint as
    /// review comments; stored as a distinct file regardless.
    Comments,
    /// Commits on the pull request branch.
    Commits,
}

impl ArtifactKind {
    /// Every kind, in the order the orchestrator fetches them.
    pub const ALL: [Self; 4] = [
        Self::Details,
        Self::ReviewComments,
        Self::Comments,
        Self::Commits,
    ];

    /// Returns the artifact file name for a pull request number.
    #[must_use]
    pub fn file_name(self, number: u64) -> String {
        match self {
            Self::Details => format!("pr_{number}.json"),
            Self::ReviewComments => format!("pr_{number}_review_comments.json"),
            Self::Comments => format!("pr_{number}_comments.json"),
            Self::Commits => format!("pr_{number}_commits.json"),
        }
    }
}

/// Filesystem store mapping `(repository, pull request, kind)` triples to
/// JSON files under a fixed root.
///
/// The store performs no skip decisions of its own: [`ArtifactStore::write`]
/// overwrites whatever is present, and callers consult
/// [`ArtifactStore::exists`] first.
#[derive(Debug)]
pub struct ArtifactStore {
    root: Utf8PathBuf,
    dir: Dir,
}

impl ArtifactStore {
    /// Opens the store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::Io`] when the root cannot be created or
    /// opened.
    pub fn open(root: impl Into<Utf8PathBuf>) -> Result<Self, HarvestError> {
        let root = root.into();
        std::fs::create_dir_all(root.as_std_path()).map_err(|error| HarvestError::Io {
            message: format!("failed to create output root '{root}': {error}"),
        })?;
        let dir = Dir::open_ambient_dir(&root, ambient_authority()).map_err(|error| {
            HarvestError::Io {
                message: format!("failed to open output root '{root}': {error}"),
            }
        })?;
        Ok(Self { root, dir })
    }

    /// Returns the store root.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        self.root.as_path()
    }

    /// Creates `<repo>` and `<repo>/pulls` under the root. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::Io`] when directory creation fails.
    pub fn ensure_repo_dirs(&self, repo: &str) -> Result<(), HarvestError> {
        let pulls = Utf8PathBuf::from(repo).join("pulls");
        self.dir
            .create_dir_all(&pulls)
            .map_err(|error| HarvestError::Io {
                message: format!("failed to create directory '{pulls}': {error}"),
            })
    }

    /// Returns true when the artifact file for the triple already exists.
    #[must_use]
    pub fn exists(&self, repo: &str, number: u64, kind: ArtifactKind) -> bool {
        self.dir.exists(Self::relative_path(repo, number, kind))
    }

    /// Serializes the payload as pretty-printed JSON and writes it to the
    /// triple's backing file, overwriting any existing content.
    ///
    /// The write is atomic: content lands in a staging file in the same
    /// directory which is then renamed over the final path. The details
    /// file is the resume signal, so [`ArtifactStore::exists`] must never
    /// observe a partially written artifact.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::Io`] when serialization, the staging write,
    /// or the rename fails.
    pub fn write(
        &self,
        repo: &str,
        number: u64,
        kind: ArtifactKind,
        payload: &[Value],
    ) -> Result<(), HarvestError> {
        let path = Self::relative_path(repo, number, kind);
        let bytes = serde_json::to_vec_pretty(payload).map_err(|error| HarvestError::Io {
            message: format!("failed to serialize artifact '{path}': {error}"),
        })?;
        let staging = Utf8PathBuf::from(format!("{path}.tmp"));
        self.dir
            .write(&staging, bytes)
            .map_err(|error| HarvestError::Io {
                message: format!("failed to write staging file '{staging}': {error}"),
            })?;
        self.dir
            .rename(&staging, &self.dir, &path)
            .map_err(|error| HarvestError::Io {
                message: format!("failed to move '{staging}' into '{path}': {error}"),
            })
    }

    /// Returns the full path of the artifact file for a triple.
    #[must_use]
    pub fn artifact_path(&self, repo: &str, number: u64, kind: ArtifactKind) -> Utf8PathBuf {
        self.root.join(Self::relative_path(repo, number, kind))
    }

    fn relative_path(repo: &str, number: u64, kind: ArtifactKind) -> Utf8PathBuf {
        Utf8PathBuf::from(repo)
            .join("pulls")
            .join(kind.file_name(number))
    }
}
