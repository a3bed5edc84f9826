//! Platform detection for archive naming

use std::fmt;

use once_cell::sync::OnceCell;

use crate::error::PlatformError;

/// Operating systems with published archives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    Darwin,
    Linux,
    Windows,
}

/// CPU architectures with published archives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    Amd64,
    Arm64,
}

/// Container format of an installer archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    TarGz,
    Zip,
}

/// Resolved host platform, fixed for the life of an installation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlatformTarget {
    pub os: Os,
    pub arch: Arch,
}

/// Global cache for platform detection (initialized once, used everywhere)
static PLATFORM_CACHE: OnceCell<PlatformTarget> = OnceCell::new();

impl Os {
    pub fn as_str(&self) -> &'static str {
        match self {
            Os::Darwin => "darwin",
            Os::Linux => "linux",
            Os::Windows => "windows",
        }
    }

    /// Suffix appended to executables on this os
    pub fn exe_suffix(&self) -> &'static str {
        match self {
            Os::Windows => ".exe",
            Os::Darwin | Os::Linux => "",
        }
    }
}

impl Arch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::Amd64 => "amd64",
            Arch::Arm64 => "arm64",
        }
    }
}

impl ArchiveKind {
    /// Windows archives are zips, everything else ships as tar.gz
    pub fn for_os(os: Os) -> Self {
        match os {
            Os::Windows => ArchiveKind::Zip,
            Os::Darwin | Os::Linux => ArchiveKind::TarGz,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveKind::TarGz => "tar.gz",
            ArchiveKind::Zip => "zip",
        }
    }
}

impl PlatformTarget {
    /// Detect current platform (cached after first call)
    pub fn detect() -> Result<Self, PlatformError> {
        PLATFORM_CACHE
            .get_or_try_init(Self::detect_uncached)
            .copied()
    }

    fn detect_uncached() -> Result<Self, PlatformError> {
        let os_name = match std::env::consts::OS {
            "macos" => "darwin",
            "windows" => "win32",
            other => other,
        };
        let arch_name = match std::env::consts::ARCH {
            "x86_64" => "x64",
            "aarch64" => "arm64",
            other => other,
        };
        resolve_platform(os_name, arch_name)
    }

    pub fn archive_kind(&self) -> ArchiveKind {
        ArchiveKind::for_os(self.os)
    }
}

impl fmt::Display for PlatformTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os.as_str(), self.arch.as_str())
    }
}

/// Map host os/arch names (`darwin`, `linux`, `win32`; `x64`, `arm64`) to a target.
///
/// There is no archive naming for anything else, so unknown values are errors.
pub fn resolve_platform(os_name: &str, arch_name: &str) -> Result<PlatformTarget, PlatformError> {
    let os = match os_name {
        "darwin" => Os::Darwin,
        "linux" => Os::Linux,
        "win32" => Os::Windows,
        other => return Err(PlatformError::UnsupportedPlatform(other.to_string())),
    };
    let arch = match arch_name {
        "x64" => Arch::Amd64,
        "arm64" => Arch::Arm64,
        other => return Err(PlatformError::UnsupportedArchitecture(other.to_string())),
    };
    Ok(PlatformTarget { os, arch })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_pairs() {
        let cases = [
            ("darwin", "x64", Os::Darwin, Arch::Amd64),
            ("darwin", "arm64", Os::Darwin, Arch::Arm64),
            ("linux", "x64", Os::Linux, Arch::Amd64),
            ("linux", "arm64", Os::Linux, Arch::Arm64),
            ("win32", "x64", Os::Windows, Arch::Amd64),
            ("win32", "arm64", Os::Windows, Arch::Arm64),
        ];
        for (os_name, arch_name, os, arch) in cases {
            assert_eq!(
                resolve_platform(os_name, arch_name).unwrap(),
                PlatformTarget { os, arch },
                "{os_name}/{arch_name}"
            );
        }
    }

    #[test]
    fn test_unsupported_values() {
        assert_eq!(
            resolve_platform("freebsd", "x64"),
            Err(PlatformError::UnsupportedPlatform("freebsd".into()))
        );
        // Rust-style names are not accepted here, only the host naming
        assert_eq!(
            resolve_platform("windows", "x64"),
            Err(PlatformError::UnsupportedPlatform("windows".into()))
        );
        assert_eq!(
            resolve_platform("linux", "ia32"),
            Err(PlatformError::UnsupportedArchitecture("ia32".into()))
        );
        assert_eq!(
            resolve_platform("linux", "x86_64"),
            Err(PlatformError::UnsupportedArchitecture("x86_64".into()))
        );
    }

    #[test]
    fn test_archive_kind_follows_os() {
        let win = resolve_platform("win32", "x64").unwrap();
        assert_eq!(win.archive_kind(), ArchiveKind::Zip);
        assert_eq!(win.os.exe_suffix(), ".exe");

        let mac = resolve_platform("darwin", "arm64").unwrap();
        assert_eq!(mac.archive_kind(), ArchiveKind::TarGz);
        assert_eq!(mac.os.exe_suffix(), "");
        assert_eq!(mac.to_string(), "darwin/arm64");
    }

    #[cfg(all(any(target_os = "linux", target_os = "macos"), target_arch = "x86_64"))]
    #[test]
    fn test_detect_current_platform() {
        let target = PlatformTarget::detect().unwrap();
        assert_eq!(target.arch, Arch::Amd64);
        assert_eq!(target.archive_kind(), ArchiveKind::TarGz);
    }
}
