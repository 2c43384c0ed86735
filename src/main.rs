//! Magpie CLI entrypoint: harvest an organization's pull request activity.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use magpie::{
    ArtifactStore, ConsoleProgress, HarvestError, Harvester, MagpieConfig, OctocrabHarvestGateway,
};
use tracing_subscriber::EnvFilter;

/// Harvests pull request activity for every repository in an organization.
///
/// Configuration comes from the environment: MAGPIE_TOKEN (or GITHUB_PAT),
/// MAGPIE_ORG (or GITHUB_ORG), MAGPIE_EXCLUDED_REPOS (or EXCLUDED_REPOS),
/// and MAGPIE_OUTPUT_DIR.
#[derive(Parser, Debug)]
#[command(name = "magpie", version, about)]
struct Cli {
    /// Pass the literal token `test` to process only the first repository.
    mode: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli.mode.as_deref()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let _ignored = writeln!(io::stderr().lock(), "{error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(mode: Option<&str>) -> Result<(), HarvestError> {
    let config = MagpieConfig::from_env(mode);

    let token = config.resolve_token()?;
    let organization = config.resolve_organization()?;

    let gateway = OctocrabHarvestGateway::for_token(&token)?;
    let store = ArtifactStore::open(config.resolve_output_dir())?;
    let progress = ConsoleProgress;

    let harvester = Harvester::new(
        &gateway,
        &store,
        &progress,
        organization,
        config.exclusion_set(),
        config.test_mode,
    );
    let summary = harvester.run().await?;

    tracing::info!(
        repositories = summary.repositories,
        pull_requests_saved = summary.pull_requests_saved,
        elapsed_secs = summary.elapsed.as_secs(),
        "harvest complete"
    );
    Ok(())
}
