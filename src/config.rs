use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Release distribution settings shared by the installer and the download endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseConfig {
    /// Upstream repository (`owner/name`)
    pub repo: String,
    /// Name of the binary inside the release archives
    pub binary_name: String,
    /// Release index API root
    pub api_base: String,
    /// Host serving release downloads and the releases page
    pub download_base: String,
    pub installer_user_agent: String,
    pub website_user_agent: String,
    /// Lifetime of the cached release lookup on the web path
    pub cache_ttl_secs: u64,
    pub max_redirects: usize,
    /// Download endpoint binding (host:port)
    pub bind: String,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            repo: "djinnos/djinn".into(),
            binary_name: "djinn".into(),
            api_base: "https://api.github.com".into(),
            download_base: "https://github.com".into(),
            installer_user_agent: "djinn-npm-installer".into(),
            website_user_agent: "djinn-website".into(),
            cache_ttl_secs: 300,
            max_redirects: 10,
            bind: "127.0.0.1:3000".into(),
        }
    }
}

impl ReleaseConfig {
    /// Load configuration from an explicit path, the user config file, or defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg: ReleaseConfig = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;

        log::debug!("Using config from: {}", path.display());
        Ok(cfg)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// `GET` target for the latest release metadata.
    pub fn latest_release_url(&self) -> String {
        format!(
            "{}/repos/{}/releases/latest",
            self.api_base.trim_end_matches('/'),
            self.repo
        )
    }

    /// Fallback page when no direct asset can be resolved.
    pub fn releases_page_url(&self) -> String {
        format!(
            "{}/{}/releases/latest",
            self.download_base.trim_end_matches('/'),
            self.repo
        )
    }

    /// Direct download URL of an installer archive for a tagged version.
    pub fn archive_url(&self, version: &str, archive_name: &str) -> String {
        format!(
            "{}/{}/releases/download/v{}/{}",
            self.download_base.trim_end_matches('/'),
            self.repo,
            version,
            archive_name
        )
    }
}

/// `<config_dir>/djinn/release.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("djinn").join("release.toml"))
}
