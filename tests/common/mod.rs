#![allow(dead_code)]

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use flate2::Compression;
use flate2::write::GzEncoder;

use djinn_release::ReleaseConfig;

pub fn tar_gz(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (path, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, path, *data).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (path, data) in entries {
        writer
            .start_file(*path, zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// What the fake release host serves
#[derive(Clone)]
pub struct Fixture {
    pub index_status: StatusCode,
    pub index_body: String,
    /// Served for every archive download, after one 302 hop
    pub archive_status: StatusCode,
    pub archive: Vec<u8>,
    pub index_hits: Arc<AtomicUsize>,
}

impl Fixture {
    pub fn new(tag: &str, archive: Vec<u8>) -> Self {
        Self {
            index_status: StatusCode::OK,
            index_body: format!(r#"{{"tag_name": "{tag}", "assets": []}}"#),
            archive_status: StatusCode::OK,
            archive,
            index_hits: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn index_hits(&self) -> usize {
        self.index_hits.load(Ordering::SeqCst)
    }
}

async fn latest(State(fixture): State<Fixture>) -> Response {
    fixture.index_hits.fetch_add(1, Ordering::SeqCst);
    (fixture.index_status, fixture.index_body.clone()).into_response()
}

async fn cdn(State(fixture): State<Fixture>) -> Response {
    (fixture.archive_status, fixture.archive.clone()).into_response()
}

/// Release downloads redirect to the CDN path, like GitHub does.
async fn release_download() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, "/cdn/archive")]).into_response()
}

/// Start the fake host and return a config pointing at it.
pub async fn serve(fixture: Fixture) -> ReleaseConfig {
    let app = Router::new()
        .route("/repos/djinnos/djinn/releases/latest", get(latest))
        .route("/djinnos/djinn/releases/download/{tag}/{file}", get(release_download))
        .route("/cdn/archive", get(cdn))
        .with_state(fixture);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    ReleaseConfig {
        api_base: format!("http://{addr}"),
        download_base: format!("http://{addr}"),
        ..ReleaseConfig::default()
    }
}

pub fn bin_entries(root: &std::path::Path) -> Vec<String> {
    match std::fs::read_dir(root.join("bin")) {
        Ok(entries) => entries
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    }
}
