//! Placing the extracted binary into its destination directory
//!
//! The binary is copied to a sibling file inside the destination directory,
//! made executable, then renamed over the final path. Readers of the final
//! path never observe a partially written binary.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::InstallError;

/// Hidden sibling of `dest` used while the copy is in progress
fn staging_path(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    dest.with_file_name(format!(".{}.partial-{}", name, std::process::id()))
}

#[cfg(unix)]
fn make_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}

fn stage_and_rename(source: &Path, staged: &Path, dest: &Path) -> io::Result<()> {
    fs::copy(source, staged)?;
    make_executable(staged)?;
    fs::rename(staged, dest)
}

/// Install `source` at `dest` with mode 0755.
pub fn install_binary(source: &Path, dest: &Path) -> Result<(), InstallError> {
    if !source.is_file() {
        return Err(InstallError::MissingBinary {
            expected: source.to_path_buf(),
        });
    }

    let staged = staging_path(dest);
    if let Err(source_err) = stage_and_rename(source, &staged, dest) {
        if let Err(e) = fs::remove_file(&staged)
            && e.kind() != io::ErrorKind::NotFound
        {
            log::warn!("Failed to remove staged binary {}: {}", staged.display(), e);
        }
        return Err(InstallError::Place {
            path: dest.to_path_buf(),
            source: source_err,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_binary() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("djinn-extracted");
        let dest_dir = dir.path().join("bin");
        fs::create_dir_all(&dest_dir).unwrap();
        fs::write(&source, b"binary").unwrap();

        let dest = dest_dir.join("djinn");
        install_binary(&source, &dest).unwrap();

        assert_eq!(fs::read(&dest).unwrap(), b"binary");
        let leftovers: Vec<_> = fs::read_dir(&dest_dir).unwrap().collect();
        assert_eq!(leftovers.len(), 1, "staging file left behind");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&dest).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[test]
    fn test_replaces_existing_binary() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("new");
        let dest = dir.path().join("djinn");
        fs::write(&source, b"v2").unwrap();
        fs::write(&dest, b"v1").unwrap();

        install_binary(&source, &dest).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"v2");
    }

    #[test]
    fn test_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("djinn");

        let err = install_binary(&dir.path().join("nope"), &dest).unwrap_err();
        assert!(matches!(err, InstallError::MissingBinary { .. }));
        assert!(!dest.exists());
    }

    #[test]
    fn test_missing_dest_dir_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("djinn");
        fs::write(&source, b"binary").unwrap();
        let dest = dir.path().join("absent").join("djinn");

        let err = install_binary(&source, &dest).unwrap_err();
        assert!(matches!(err, InstallError::Place { .. }));
        assert!(!staging_path(&dest).exists());
    }
}
