//! Archive download with manual redirect handling

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::StatusCode;
use reqwest::header::LOCATION;
use tokio::io::AsyncWriteExt;
use tokio::time::timeout;
use url::Url;

use crate::error::DownloadError;

const DOWNLOAD_CONNECT_TIMEOUT: Duration = Duration::from_secs(30); // Initial connection
const DOWNLOAD_INACTIVITY_TIMEOUT: Duration = Duration::from_secs(300); // 5 min no data

/// HTTP client for archive downloads. Redirects are followed by [`download_file`].
pub fn download_client(user_agent: &str) -> Result<reqwest::Client, DownloadError> {
    let client = reqwest::Client::builder()
        .connect_timeout(DOWNLOAD_CONNECT_TIMEOUT)
        .user_agent(user_agent)
        .redirect(reqwest::redirect::Policy::none())
        .build()?;
    Ok(client)
}

fn is_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

/// Resolve a `Location` header against the URL that returned it.
fn next_location(current: &str, response: &reqwest::Response) -> Result<String, DownloadError> {
    let status = response.status().as_u16();
    let header = response
        .headers()
        .get(LOCATION)
        .ok_or(DownloadError::MissingLocation(status))?;
    let location = header.to_str().map_err(|e| DownloadError::InvalidLocation {
        location: String::from_utf8_lossy(header.as_bytes()).into_owned(),
        reason: e.to_string(),
    })?;

    let base = Url::parse(current).map_err(|e| DownloadError::InvalidLocation {
        location: location.to_string(),
        reason: e.to_string(),
    })?;
    let next = base.join(location).map_err(|e| DownloadError::InvalidLocation {
        location: location.to_string(),
        reason: e.to_string(),
    })?;
    Ok(next.into())
}

/// Download `url` into `dest`, following up to `max_redirects` redirects.
///
/// Only the body of the final 2xx response is written. If the transfer fails
/// after `dest` was created, the partial file is removed. Returns the number of
/// bytes written.
pub async fn download_file(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    max_redirects: usize,
    show_progress: bool,
) -> Result<u64, DownloadError> {
    let mut current = url.to_string();
    let mut hops = 0usize;

    let response = loop {
        let response = client.get(&current).send().await?;
        let status = response.status();

        if is_redirect(status) {
            if hops >= max_redirects {
                return Err(DownloadError::TooManyRedirects(max_redirects));
            }
            let next = next_location(&current, &response)?;
            log::debug!("{} redirected ({}) to {}", current, status.as_u16(), next);
            current = next;
            hops += 1;
            continue;
        }

        if !status.is_success() {
            return Err(DownloadError::Status(status.as_u16()));
        }
        break response;
    };

    let progress = progress_bar(response.content_length(), show_progress);
    let result = write_body(response, dest, &progress).await;
    progress.finish_and_clear();

    if result.is_err() {
        remove_partial(dest).await;
    }
    result
}

async fn write_body(
    response: reqwest::Response,
    dest: &Path,
    progress: &ProgressBar,
) -> Result<u64, DownloadError> {
    let mut file = tokio::fs::File::create(dest).await?;
    let mut stream = response.bytes_stream();
    let mut downloaded = 0u64;

    loop {
        let chunk = match timeout(DOWNLOAD_INACTIVITY_TIMEOUT, stream.next()).await {
            Ok(Some(Ok(chunk))) => chunk,
            Ok(Some(Err(e))) => return Err(e.into()),
            Ok(None) => break,
            Err(_) => return Err(DownloadError::Timeout(DOWNLOAD_INACTIVITY_TIMEOUT.as_secs())),
        };

        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;
        progress.inc(chunk.len() as u64);
    }

    file.flush().await?;
    Ok(downloaded)
}

async fn remove_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => log::debug!("Removed partial download {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("Failed to remove partial download {}: {}", path.display(), e),
    }
}

fn progress_bar(total: Option<u64>, visible: bool) -> ProgressBar {
    let Some(total) = total.filter(|_| visible) else {
        return ProgressBar::hidden();
    };
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {bytes}/{total_bytes} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    bar
}
