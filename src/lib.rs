//! Djinn release distribution
//!
//! Resolves release assets for a platform and installs the `djinn` binary
//! from its release archives. The same resolver backs the download redirect
//! endpoint in [`service`].

pub mod config;
pub mod error;
pub mod install;
pub mod release;
pub mod service;

pub use config::ReleaseConfig;
pub use error::{DownloadError, InstallError, InstallStage, PlatformError, ReleaseError};
