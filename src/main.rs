use std::path::Path;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use asn1_lsp_client::config::{self, Config};
use asn1_lsp_client::install::bootstrap::ServerBootstrapper;
use asn1_lsp_client::install::installer::HttpAssetDownloader;
use asn1_lsp_client::install::release::{GitHubReleaseSource, ReleaseChannel};
use asn1_lsp_client::scripts::{changelog, render};

#[derive(Parser)]
#[command(name = "asn1-lsp-client")]
#[command(version, about = "Bootstraps and runs the ASN.1 language server")]
struct Cli {
    /// Explicit server binary path; overrides release resolution.
    #[arg(long, global = true)]
    server_path: Option<String>,

    /// Release channel to install from ("latest" or "nightly").
    #[arg(long, global = true)]
    release_channel: Option<ReleaseChannel>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve the server binary and run the client session until it exits.
    Run,
    /// Print the resolved server binary path without starting a session.
    Resolve,
    /// Print a greeting to verify the command surface is wired up.
    Hello,
    /// Aggregate published GitHub releases into CHANGELOG.md.
    Changelog,
    /// Render the SVG sources under media/ into fixed-width PNGs.
    RenderAssets,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command.as_ref().unwrap_or(&Command::Run) {
        Command::Hello => {
            println!("Hello World from asn1-lsp-client!");
            Ok(())
        }
        Command::Changelog => {
            let repository = std::env::var("GITHUB_REPOSITORY")
                .context("generate-changelog: GITHUB_REPOSITORY is not defined")?;
            let token = std::env::var("GITHUB_TOKEN")
                .context("generate-changelog: GITHUB_TOKEN is required to query release notes")?;
            let options = changelog::ChangelogOptions {
                base_url: changelog::DEFAULT_BASE_URL.to_string(),
                repository,
                token,
            };
            changelog::generate(&options, Path::new("CHANGELOG.md")).await
        }
        Command::RenderAssets => render::render_all(&render::default_targets()),
        Command::Run => {
            let _guard = init_logging();
            let bootstrapper = build_bootstrapper(&cli);

            // Resolution failures are reported inside activate(); the rest of
            // the command surface stays usable either way.
            if let Some(mut session) = bootstrapper.activate().await {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => info!("interrupt received, shutting down"),
                    _ = session.wait() => {}
                }
                session.shutdown().await.ok();
            }
            Ok(())
        }
        Command::Resolve => {
            let _guard = init_logging();
            let bootstrapper = build_bootstrapper(&cli);
            let path = bootstrapper.resolve_server_binary().await?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn build_bootstrapper(cli: &Cli) -> ServerBootstrapper<GitHubReleaseSource, HttpAssetDownloader> {
    let mut config = Config::load();
    if let Some(path) = &cli.server_path {
        config.server_path = Some(path.clone());
    }
    if let Some(channel) = cli.release_channel {
        config.release_channel = channel;
    }

    ServerBootstrapper::new(
        GitHubReleaseSource::default(),
        HttpAssetDownloader::default(),
        config::data_dir(),
        config,
    )
}

/// File-based logging; stderr stays clean for user-facing notifications.
fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let data_dir = config::data_dir();
    std::fs::create_dir_all(&data_dir).ok()?;

    let appender = tracing_appender::rolling::never(&data_dir, config::LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Some(guard)
}
