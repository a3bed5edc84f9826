//! Binary download and installation
//!
//! ## Module Organization
//!
//! - `plan` - Paths and URLs for one installation attempt
//! - `download` - Archive download with bounded redirect following
//! - `extract` - tar.gz and zip extraction
//! - `binary_staging` - Atomic placement of the executable
//! - `orchestration` - Installer state machine and entry points

mod binary_staging;
mod download;
mod extract;
mod orchestration;
mod plan;

pub use binary_staging::install_binary;
pub use download::{download_client, download_file};
pub use extract::extract_archive;
pub use orchestration::{
    InstallOutcome, Installer, install_latest, install_version, remove_dir_if_exists,
};
pub use plan::InstallPlan;

use std::path::{Path, PathBuf};

/// Default install root: the parent of the directory holding the executable.
///
/// `bin/` and `.tmp/` are created under it.
pub fn default_root() -> std::io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    let exe_dir = exe.parent().unwrap_or(Path::new("."));
    Ok(exe_dir.parent().unwrap_or(exe_dir).to_path_buf())
}
