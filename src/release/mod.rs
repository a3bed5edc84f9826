//! Release discovery and asset resolution
//!
//! ## Module Organization
//!
//! - `platform` - Host platform mapping and archive kind selection
//! - `github` - Release index payloads
//! - `assets` - Asset patterns and installer archive naming
//! - `cache` - Replaceable cache for the latest-release lookup

mod assets;
mod cache;
mod github;
mod platform;

pub use assets::{PlatformKey, build_archive_name, find_asset};
pub use cache::{CacheEntry, MemoryReleaseCache, ReleaseCache};
pub use github::{AssetDescriptor, ReleaseInfo};
pub use platform::{Arch, ArchiveKind, Os, PlatformTarget, resolve_platform};

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::ACCEPT;

use crate::config::ReleaseConfig;
use crate::error::ReleaseError;

const INDEX_TIMEOUT: Duration = Duration::from_secs(30);

/// Looks up the latest release, consulting the cache first.
#[derive(Clone)]
pub struct ReleaseResolver {
    client: reqwest::Client,
    index_url: String,
    cache: Arc<dyn ReleaseCache>,
}

impl ReleaseResolver {
    pub fn new(
        index_url: impl Into<String>,
        user_agent: &str,
        cache: Arc<dyn ReleaseCache>,
    ) -> Result<Self, ReleaseError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(INDEX_TIMEOUT)
            .build()
            .map_err(ReleaseError::Client)?;

        Ok(Self {
            client,
            index_url: index_url.into(),
            cache,
        })
    }

    /// Resolver for the configured repository with a fresh in-memory cache.
    pub fn from_config(config: &ReleaseConfig, user_agent: &str) -> Result<Self, ReleaseError> {
        let cache = Arc::new(MemoryReleaseCache::new(config.cache_ttl()));
        Self::new(config.latest_release_url(), user_agent, cache)
    }

    pub fn cache(&self) -> &Arc<dyn ReleaseCache> {
        &self.cache
    }

    /// Latest release, served from cache while it is fresh.
    pub async fn fetch_latest_release(&self) -> Result<Arc<ReleaseInfo>, ReleaseError> {
        if let Some(release) = self.cache.fresh(Instant::now()) {
            log::debug!("Using cached release v{}", release.version);
            return Ok(release);
        }

        let response = self
            .client
            .get(&self.index_url)
            .header(ACCEPT, "application/vnd.github.v3+json")
            .send()
            .await
            .map_err(|source| ReleaseError::Unreachable {
                url: self.index_url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReleaseError::Fetch {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| ReleaseError::Unreachable {
                url: self.index_url.clone(),
                source,
            })?;
        let release = Arc::new(ReleaseInfo::from_json(&body)?);

        log::debug!("Fetched release v{} from {}", release.version, self.index_url);
        self.cache.put(CacheEntry::new(Arc::clone(&release)));
        Ok(release)
    }

    /// Asset for a desktop platform key in the latest release, if one matches.
    pub async fn resolve_asset(
        &self,
        key: PlatformKey,
    ) -> Result<Option<AssetDescriptor>, ReleaseError> {
        let release = self.fetch_latest_release().await?;
        Ok(find_asset(&release, key).cloned())
    }
}
