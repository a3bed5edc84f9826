//! `GET /api/download?platform=<key>` redirect handler

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use serde_json::json;

use crate::release::{PlatformKey, ReleaseResolver};

/// Shared state for the download endpoint
pub struct DownloadState {
    pub resolver: ReleaseResolver,
    /// Fallback target when no asset can be resolved
    pub releases_page: String,
}

fn invalid_platform() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "Invalid platform",
            "valid": PlatformKey::valid_values(),
        })),
    )
        .into_response()
}

/// First `platform` value of the query string; repeated keys are not an error.
fn platform_param(query: Result<Query<Vec<(String, String)>>, QueryRejection>) -> Option<String> {
    let Query(pairs) = query.ok()?;
    pairs
        .into_iter()
        .find_map(|(name, value)| (name == "platform").then_some(value))
}

pub async fn download(
    State(state): State<Arc<DownloadState>>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Response {
    let Some(key) = platform_param(query).and_then(|p| p.parse::<PlatformKey>().ok()) else {
        return invalid_platform();
    };

    match state.resolver.resolve_asset(key).await {
        Ok(Some(asset)) if HeaderValue::from_str(&asset.download_url).is_ok() => {
            log::debug!("{} -> {}", key, asset.name);
            Redirect::temporary(&asset.download_url).into_response()
        }
        Ok(Some(asset)) => {
            log::warn!(
                "Asset {} has an unusable download URL {:?}, redirecting to releases page",
                asset.name,
                asset.download_url
            );
            Redirect::temporary(&state.releases_page).into_response()
        }
        Ok(None) => {
            log::warn!("No {} asset in latest release, redirecting to releases page", key);
            Redirect::temporary(&state.releases_page).into_response()
        }
        Err(e) => {
            log::warn!("Release lookup for {} failed: {}", key, e);
            Redirect::temporary(&state.releases_page).into_response()
        }
    }
}
