//! Download redirect endpoint
//!
//! Every request shares one resolver, so the release lookup cache is
//! process-wide.

mod download_route;

pub use download_route::DownloadState;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::get;

use crate::config::ReleaseConfig;
use crate::release::ReleaseResolver;

/// Router exposing `GET /api/download`.
pub fn router(state: Arc<DownloadState>) -> Router {
    Router::new()
        .route("/api/download", get(download_route::download))
        .with_state(state)
}

/// Endpoint state for the configured repository.
pub fn download_state(config: &ReleaseConfig) -> Result<Arc<DownloadState>> {
    let resolver = ReleaseResolver::from_config(config, &config.website_user_agent)
        .context("Failed to create release resolver")?;
    Ok(Arc::new(DownloadState {
        resolver,
        releases_page: config.releases_page_url(),
    }))
}

/// Serve the endpoint on `bind` until Ctrl-C.
pub async fn serve(config: &ReleaseConfig, bind: &str) -> Result<()> {
    let app = router(download_state(config)?);
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;

    log::info!("Download endpoint listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for shutdown signal: {e}");
            }
        })
        .await
        .context("Download endpoint failed")?;
    log::info!("Download endpoint stopped");
    Ok(())
}
