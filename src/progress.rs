//! Progress events emitted during a harvest run.
//!
//! Console reporting is an external collaborator: the orchestrator emits
//! structured [`HarvestEvent`]s into a [`ProgressSink`], and the binary
//! installs [`ConsoleProgress`] to render them as human-readable lines.
//! Tests substitute a recording sink instead of capturing stdout.

use std::io::{self, Write};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A structured progress event emitted by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HarvestEvent {
    /// The organization's repository list was fetched and filtered.
    RepositoriesDiscovered {
        /// Organization that was listed.
        organization: String,
        /// Repository count before exclusion.
        total: usize,
        /// Size of the configured exclusion list. Entries that match no
        /// listed repository still count.
        excluded: usize,
        /// Names remaining after exclusion, in traversal order.
        names: Vec<String>,
    },
    /// Test mode is active; only the first repository will be processed.
    TestModeActive,
    /// A repository's harvest began.
    RepositoryStarted {
        /// 1-based position in the filtered repository list.
        position: usize,
        /// Filtered repository count.
        total: usize,
        /// Repository name.
        name: String,
    },
    /// The repository's pull request list was fetched.
    PullRequestsListed {
        /// Repository name.
        repository: String,
        /// Number of pull requests returned.
        count: usize,
    },
    /// A pre-existing details file short-circuited the repository.
    ResumePointFound {
        /// Repository name.
        repository: String,
        /// Pull request number whose details file was already present.
        number: u64,
    },
    /// All four artifacts for one pull request were written.
    PullRequestSaved {
        /// Repository name.
        repository: String,
        /// Pull request number.
        number: u64,
        /// 1-based position in the repository's pull request list.
        position: usize,
        /// Pull request count for the repository.
        total: usize,
    },
    /// The run finished.
    Completed {
        /// Total wall-clock duration.
        elapsed: Duration,
    },
}

/// A sink that can record progress events.
pub trait ProgressSink: Send + Sync {
    /// Records a progress event.
    fn record(&self, event: HarvestEvent);
}

/// Renders progress events as human-readable lines on stdout.
#[derive(Debug, Default)]
pub struct ConsoleProgress;

impl ProgressSink for ConsoleProgress {
    fn record(&self, event: HarvestEvent) {
        let mut stdout = io::stdout().lock();
        let _ignored = render(&event, &mut stdout);
    }
}

/// Writes the console rendering of one event to the given writer.
///
/// # Errors
///
/// Returns the underlying I/O error when the write fails.
pub fn render<W: Write>(event: &HarvestEvent, writer: &mut W) -> io::Result<()> {
    match event {
        HarvestEvent::RepositoriesDiscovered {
            organization,
            total,
            excluded,
            names,
        } => {
            writeln!(writer, "Found {total} total repos for {organization}")?;
            writeln!(writer, "Excluding {excluded} repos")?;
            for name in names {
                writeln!(writer, "- {name}")?;
            }
            Ok(())
        }
        HarvestEvent::TestModeActive => writeln!(
            writer,
            "Running in TEST mode: only the first repository will be processed."
        ),
        HarvestEvent::RepositoryStarted {
            position,
            total,
            name,
        } => writeln!(writer, "Processing repository {position}/{total} - {name}"),
        HarvestEvent::PullRequestsListed { repository, count } => {
            writeln!(writer, "Total PRs for {repository}: {count}")
        }
        HarvestEvent::ResumePointFound { repository, number } => writeln!(
            writer,
            "{repository} pulls folder is not empty (found pr_{number}.json), skipping..."
        ),
        HarvestEvent::PullRequestSaved {
            repository,
            number,
            position,
            total,
        } => writeln!(
            writer,
            "Saved PR {position}/{total} (#{number}) for repo {repository}"
        ),
        HarvestEvent::Completed { elapsed } => {
            writeln!(writer, "Total duration: {}", format_duration(*elapsed))
        }
    }
}

/// Formats a duration as `H hours, M minutes, and S seconds`.
#[must_use]
pub fn format_duration(elapsed: Duration) -> String {
    let total_seconds = elapsed.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours} hours, {minutes} minutes, and {seconds} seconds")
}
