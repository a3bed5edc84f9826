mod cli;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use log::error;

use djinn_release::ReleaseConfig;
use djinn_release::install::{self, InstallOutcome};
use djinn_release::release::{PlatformKey, PlatformTarget, ReleaseResolver};
use djinn_release::{InstallError, service};

fn main() {
    // Plain messages for progress, level and timestamp for everything else
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            use std::io::Write;
            match record.level() {
                log::Level::Info => writeln!(buf, "{}", record.args()),
                level => writeln!(
                    buf,
                    "[{} {}] {}",
                    buf.timestamp_millis(),
                    level,
                    record.args()
                ),
            }
        })
        .init();

    let args = cli::Args::parse();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("FATAL: Failed to create Tokio runtime: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = rt.block_on(real_main(args)) {
        error!("{e:#}");
        std::process::exit(1);
    }
}

async fn real_main(args: cli::Args) -> Result<()> {
    let config_path = args.config.as_deref();

    match args.sub.unwrap_or(cli::Cmd::Install {
        root: None,
        release: None,
    }) {
        // install reports its own failures, config problems included
        cli::Cmd::Install { root, release } => {
            handle_install(config_path, root, release.as_deref()).await;
            Ok(())
        }
        cli::Cmd::Resolve { platform } => {
            let config = ReleaseConfig::load(config_path)?;
            handle_resolve(&config, &platform).await
        }
        cli::Cmd::Serve { bind } => {
            let config = ReleaseConfig::load(config_path)?;
            let bind = bind.unwrap_or_else(|| config.bind.clone());
            service::serve(&config, &bind).await
        }
        cli::Cmd::Config => {
            let config = ReleaseConfig::load(config_path)?;
            let text = toml::to_string_pretty(&config).context("Failed to serialize config")?;
            print!("{text}");
            Ok(())
        }
    }
}

async fn run_install(
    config: &ReleaseConfig,
    root: Option<PathBuf>,
    release: Option<&str>,
) -> Result<InstallOutcome, InstallError> {
    let root = match root {
        Some(root) => root,
        None => install::default_root().map_err(|source| InstallError::Prepare {
            path: PathBuf::from("."),
            source,
        })?,
    };
    let target = PlatformTarget::detect()?;
    let show_progress = std::io::stderr().is_terminal();

    match release {
        Some(version) => {
            log::info!("Detected platform: {}", target);
            install::install_version(config, target, version, &root, show_progress).await
        }
        None => install::install_latest(config, target, &root, show_progress).await,
    }
}

/// Handle install command (Exit 0 = installed, 1 = failed)
async fn handle_install(config_path: Option<&Path>, root: Option<PathBuf>, release: Option<&str>) {
    let config = match ReleaseConfig::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Installation failed: {e:#}");
            std::process::exit(1);
        }
    };

    match run_install(&config, root, release).await {
        Ok(outcome) => {
            log::debug!("Binary at {}", outcome.binary_path.display());
        }
        Err(e) => {
            log::debug!("Failed during {} stage", e.stage());
            eprintln!("Installation failed: {e}");
            std::process::exit(1);
        }
    }
}

/// Handle resolve command - print the asset URL or the releases page
async fn handle_resolve(config: &ReleaseConfig, platform: &str) -> Result<()> {
    let key: PlatformKey = platform.parse().map_err(|e: String| {
        anyhow!(
            "{e} (valid: {})",
            PlatformKey::valid_values().join(", ")
        )
    })?;

    let resolver = ReleaseResolver::from_config(config, &config.website_user_agent)?;
    match resolver.resolve_asset(key).await? {
        Some(asset) => println!("{}", asset.download_url),
        None => {
            log::warn!("No {} asset in the latest release", key);
            println!("{}", config.releases_page_url());
        }
    }
    Ok(())
}
