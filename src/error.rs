//! Error types for release resolution and installation
//!
//! Each layer has its own enum; `InstallError` wraps the others so the CLI can
//! report which stage of an installation failed.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Host os/arch outside the set we publish archives for.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("unsupported architecture: {0}")]
    UnsupportedArchitecture(String),
}

/// Failures talking to the upstream release index.
#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("release index {url} unreachable: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("release index returned HTTP {status}")]
    Fetch { status: u16 },

    #[error("failed to parse release info: {0}")]
    Parse(String),
}

/// Failures while fetching an archive.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("download failed with status {0}")]
    Status(u16),

    #[error("redirect (HTTP {0}) without a Location header")]
    MissingLocation(u16),

    #[error("invalid redirect location {location:?}: {reason}")]
    InvalidLocation { location: String, reason: String },

    #[error("too many redirects (limit {0})")]
    TooManyRedirects(usize),

    #[error("no data received for {0} seconds")]
    Timeout(u64),

    #[error("failed to write download: {0}")]
    Io(#[from] std::io::Error),
}

/// Stage of the installer state machine, used to label failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStage {
    Resolve,
    Prepare,
    Download,
    Extract,
    Install,
}

impl fmt::Display for InstallStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstallStage::Resolve => "resolve",
            InstallStage::Prepare => "prepare",
            InstallStage::Download => "download",
            InstallStage::Extract => "extract",
            InstallStage::Install => "install",
        };
        f.write_str(name)
    }
}

/// Top-level installation error.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Release(#[from] ReleaseError),

    #[error("failed to create {}: {source}", .path.display())]
    Prepare {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("download of {url} failed: {source}")]
    Download {
        url: String,
        #[source]
        source: DownloadError,
    },

    #[error("failed to extract {}: {reason}", .archive.display())]
    Extract { archive: PathBuf, reason: String },

    #[error("binary {} not found in extracted archive", .expected.display())]
    MissingBinary { expected: PathBuf },

    #[error("failed to install binary to {}: {source}", .path.display())]
    Place {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl InstallError {
    /// Which installer stage produced this error.
    pub fn stage(&self) -> InstallStage {
        match self {
            InstallError::Platform(_) | InstallError::Release(_) => InstallStage::Resolve,
            InstallError::Prepare { .. } => InstallStage::Prepare,
            InstallError::Download { .. } => InstallStage::Download,
            InstallError::Extract { .. } => InstallStage::Extract,
            InstallError::MissingBinary { .. } | InstallError::Place { .. } => {
                InstallStage::Install
            }
        }
    }
}
