//! Installation orchestration
//!
//! Runs Prepare → Download → Extract → Install strictly in order. The working
//! directory is owned by a guard, so it is removed on every exit path once
//! Prepare has created it.

use std::io;
use std::path::{Path, PathBuf};

use crate::config::ReleaseConfig;
use crate::error::InstallError;
use crate::release::{PlatformTarget, ReleaseResolver};

use super::binary_staging::install_binary;
use super::download::{download_client, download_file};
use super::extract::extract_archive;
use super::plan::InstallPlan;

/// Remove `path` recursively. A directory that is already gone is not an error.
pub fn remove_dir_if_exists(path: &Path) -> io::Result<()> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// RAII wrapper for the installer's temporary working directory
///
/// Ensures the directory is removed when dropped, even on error.
struct TempWorkspace {
    path: PathBuf,
}

impl TempWorkspace {
    /// Create an empty working directory, discarding leftovers from an earlier run.
    fn create(path: &Path) -> Result<Self, InstallError> {
        let prepare_error = |source: io::Error| InstallError::Prepare {
            path: path.to_path_buf(),
            source,
        };
        remove_dir_if_exists(path).map_err(prepare_error)?;
        std::fs::create_dir_all(path).map_err(prepare_error)?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }
}

impl Drop for TempWorkspace {
    fn drop(&mut self) {
        // best effort
        if let Err(e) = remove_dir_if_exists(&self.path) {
            log::warn!("Failed to clean up {}: {}", self.path.display(), e);
        }
    }
}

/// Result of a successful installation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    pub version: String,
    pub binary_path: PathBuf,
}

/// Executes install plans
#[derive(Debug, Clone)]
pub struct Installer {
    client: reqwest::Client,
    max_redirects: usize,
    show_progress: bool,
}

impl Installer {
    pub fn new(config: &ReleaseConfig) -> Result<Self, InstallError> {
        let client =
            download_client(&config.installer_user_agent).map_err(|source| InstallError::Download {
                url: config.download_base.clone(),
                source,
            })?;
        Ok(Self {
            client,
            max_redirects: config.max_redirects,
            show_progress: false,
        })
    }

    /// Draw a progress bar while downloading
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Run one installation attempt.
    pub async fn install(&self, plan: &InstallPlan) -> Result<InstallOutcome, InstallError> {
        // Prepare
        std::fs::create_dir_all(&plan.dest_dir).map_err(|source| InstallError::Prepare {
            path: plan.dest_dir.clone(),
            source,
        })?;
        let workspace = TempWorkspace::create(&plan.temp_dir)?;

        // Download
        log::info!("Downloading from {}...", plan.archive_url);
        let archive_path = plan.archive_path();
        let bytes = download_file(
            &self.client,
            &plan.archive_url,
            &archive_path,
            self.max_redirects,
            self.show_progress,
        )
        .await
        .map_err(|source| InstallError::Download {
            url: plan.archive_url.clone(),
            source,
        })?;
        log::debug!("Downloaded {} bytes to {}", bytes, archive_path.display());

        // Extract
        log::info!("Extracting...");
        extract_archive(&archive_path, plan.archive_kind, &workspace.path).await?;

        // Locate & install
        let extracted = plan.extracted_binary();
        if !extracted.is_file() {
            return Err(InstallError::MissingBinary {
                expected: extracted,
            });
        }
        let binary_path = plan.dest_binary();
        install_binary(&extracted, &binary_path)?;

        drop(workspace);

        Ok(InstallOutcome {
            version: plan.version.clone(),
            binary_path,
        })
    }
}

/// Install a specific version under `root` without consulting the release index.
pub async fn install_version(
    config: &ReleaseConfig,
    target: PlatformTarget,
    version: &str,
    root: &Path,
    show_progress: bool,
) -> Result<InstallOutcome, InstallError> {
    let version = version.strip_prefix('v').unwrap_or(version);
    log::info!("Installing {} v{}...", config.binary_name, version);

    let plan = InstallPlan::new(config, target, version, root);
    let outcome = Installer::new(config)?
        .with_progress(show_progress)
        .install(&plan)
        .await?;

    log::info!(
        "Successfully installed {} v{}",
        config.binary_name,
        outcome.version
    );
    Ok(outcome)
}

/// Install the latest release for `target` under `root`.
pub async fn install_latest(
    config: &ReleaseConfig,
    target: PlatformTarget,
    root: &Path,
    show_progress: bool,
) -> Result<InstallOutcome, InstallError> {
    log::info!("Detected platform: {}", target);

    let resolver = ReleaseResolver::from_config(config, &config.installer_user_agent)?;
    let release = resolver.fetch_latest_release().await?;

    install_version(config, target, &release.version, root, show_progress).await
}
