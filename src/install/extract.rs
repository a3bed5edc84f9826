//! Archive extraction for installer downloads
//!
//! Handles unpacking `.tar.gz` and `.zip` archives into the working directory.

use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tar::Archive;

use crate::error::InstallError;
use crate::release::ArchiveKind;

fn extract_error(archive: &Path, reason: impl ToString) -> InstallError {
    InstallError::Extract {
        archive: archive.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn unpack_tar_gz(archive: &Path, dest: &Path) -> Result<(), InstallError> {
    let file = std::fs::File::open(archive).map_err(|e| extract_error(archive, e))?;
    let mut tar = Archive::new(GzDecoder::new(file));
    tar.unpack(dest).map_err(|e| extract_error(archive, e))
}

fn unpack_zip(archive: &Path, dest: &Path) -> Result<(), InstallError> {
    let file = std::fs::File::open(archive).map_err(|e| extract_error(archive, e))?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| extract_error(archive, e))?;
    zip.extract(dest).map_err(|e| extract_error(archive, e))
}

/// Unpack `archive` into `dest` according to its kind.
pub async fn extract_archive(
    archive: &Path,
    kind: ArchiveKind,
    dest: &Path,
) -> Result<(), InstallError> {
    let archive: PathBuf = archive.to_path_buf();
    let dest: PathBuf = dest.to_path_buf();

    // Decompression is CPU-bound
    let task_archive = archive.clone();
    tokio::task::spawn_blocking(move || match kind {
        ArchiveKind::TarGz => unpack_tar_gz(&task_archive, &dest),
        ArchiveKind::Zip => unpack_zip(&task_archive, &dest),
    })
    .await
    .map_err(|e| extract_error(&archive, format!("extraction interrupted: {e}")))?
}
