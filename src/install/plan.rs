//! Installation plan: every path and URL one attempt will touch

use std::path::{Path, PathBuf};

use crate::config::ReleaseConfig;
use crate::release::{ArchiveKind, PlatformTarget, build_archive_name};

/// Fully resolved parameters for a single installation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPlan {
    pub version: String,
    pub target: PlatformTarget,
    pub archive_url: String,
    pub archive_file_name: String,
    pub archive_kind: ArchiveKind,
    /// Private working directory, removed after the attempt
    pub temp_dir: PathBuf,
    pub dest_dir: PathBuf,
    pub binary_name: String,
}

impl InstallPlan {
    /// Plan an install of `version` under `root` (`root/bin` and `root/.tmp`).
    pub fn new(config: &ReleaseConfig, target: PlatformTarget, version: &str, root: &Path) -> Self {
        let archive_file_name = build_archive_name(&config.binary_name, version, target);
        Self {
            version: version.to_string(),
            target,
            archive_url: config.archive_url(version, &archive_file_name),
            archive_kind: target.archive_kind(),
            archive_file_name,
            temp_dir: root.join(".tmp"),
            dest_dir: root.join("bin"),
            binary_name: config.binary_name.clone(),
        }
    }

    /// `<binary_name>` plus `.exe` on windows
    pub fn binary_file_name(&self) -> String {
        format!("{}{}", self.binary_name, self.target.os.exe_suffix())
    }

    pub fn archive_path(&self) -> PathBuf {
        self.temp_dir.join(&self.archive_file_name)
    }

    /// Where the binary is expected after extraction
    pub fn extracted_binary(&self) -> PathBuf {
        self.temp_dir.join(self.binary_file_name())
    }

    pub fn dest_binary(&self) -> PathBuf {
        self.dest_dir.join(self.binary_file_name())
    }
}
