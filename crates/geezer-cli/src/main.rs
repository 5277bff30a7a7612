mod commands;

use clap::{Parser, Subcommand};
use geezer_core::BuildVariant;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "geezer", about = "Build and publish the geezer-slots container image")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the rendered Dockerfile(s)
    Dockerfile {
        /// Build variant, overriding geezer.toml (musl or gnu)
        #[arg(long)]
        variant: Option<BuildVariant>,
    },
    /// Write the Dockerfile(s) to .geezer/ for manual customization
    Eject,
    /// Manage the CircleCI pipeline
    Ci {
        #[command(subcommand)]
        action: CiAction,
    },
    /// Run the release job locally, as CI would for the branch
    Release {
        /// Branch to release from (default: the checked-out branch)
        #[arg(long)]
        branch: Option<String>,
        /// Allow releasing with uncommitted changes
        #[arg(long)]
        allow_dirty: bool,
        /// Build only; skip registry login and push
        #[arg(long)]
        skip_publish: bool,
    },
    /// List the files a runtime image would ship from a release directory
    Artifacts {
        /// Directory holding the cargo release output
        /// (default: the package's release directory for the configured variant)
        dir: Option<PathBuf>,
    },
    /// Check docker, registry variables, and geezer.toml
    Doctor,
}

#[derive(Subcommand)]
enum CiAction {
    /// Write .circleci/config.yml
    Init,
    /// Show which jobs and steps a push to a branch runs
    Plan {
        /// Branch name
        #[arg(long)]
        branch: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                // arch-lint: allow(no-silent-result-drop) reason="an unset or invalid RUST_LOG falls back to info"
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Dockerfile { variant } => commands::dockerfile(variant)?,
        Commands::Eject => commands::eject()?,
        Commands::Ci { action } => match action {
            CiAction::Init => commands::ci_init()?,
            CiAction::Plan { branch } => commands::ci_plan(&branch)?,
        },
        Commands::Release {
            branch,
            allow_dirty,
            skip_publish,
        } => commands::release(branch.as_deref(), allow_dirty, skip_publish).await?,
        Commands::Artifacts { dir } => commands::artifacts(dir.as_deref())?,
        Commands::Doctor => commands::doctor().await?,
    }

    Ok(())
}
