//! GitHub release API payloads

use serde::Deserialize;

use crate::error::ReleaseError;

/// GitHub release metadata from API
#[derive(Deserialize, Debug)]
struct GitHubRelease {
    tag_name: Option<String>,
    #[serde(default)]
    assets: Vec<GitHubAsset>,
}

/// GitHub release asset metadata
#[derive(Deserialize, Debug)]
struct GitHubAsset {
    name: String,
    browser_download_url: String,
}

/// Latest published release, version without the leading `v`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseInfo {
    pub version: String,
    pub assets: Vec<AssetDescriptor>,
}

/// One downloadable file attached to a release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDescriptor {
    pub name: String,
    pub download_url: String,
}

impl ReleaseInfo {
    /// Parse a `releases/latest` response body.
    pub fn from_json(body: &str) -> Result<Self, ReleaseError> {
        let release: GitHubRelease =
            serde_json::from_str(body).map_err(|e| ReleaseError::Parse(e.to_string()))?;

        let tag = release
            .tag_name
            .ok_or_else(|| ReleaseError::Parse("missing tag_name".to_string()))?;
        let version = tag.strip_prefix('v').unwrap_or(&tag).trim().to_string();
        if version.is_empty() {
            return Err(ReleaseError::Parse(format!("empty version in tag {tag:?}")));
        }

        let assets = release
            .assets
            .into_iter()
            .map(|a| AssetDescriptor {
                name: a.name,
                download_url: a.browser_download_url,
            })
            .collect();

        Ok(Self { version, assets })
    }
}
