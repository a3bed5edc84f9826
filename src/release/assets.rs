//! Asset selection and archive naming

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use super::github::{AssetDescriptor, ReleaseInfo};
use super::platform::PlatformTarget;

/// Desktop app distributables offered by the download endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformKey {
    MacArm64,
    Windows,
    LinuxAppImage,
    LinuxDeb,
}

static MAC_ARM64: Lazy<Regex> = Lazy::new(|| compile(r"Djinn-.*-arm64\.dmg$"));
static WINDOWS: Lazy<Regex> = Lazy::new(|| compile(r"Djinn-.*-x64\.exe$"));
static LINUX_APPIMAGE: Lazy<Regex> = Lazy::new(|| compile(r"Djinn-.*\.AppImage$"));
static LINUX_DEB: Lazy<Regex> = Lazy::new(|| compile(r"Djinn-.*\.deb$"));

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static asset pattern")
}

impl PlatformKey {
    pub const ALL: [PlatformKey; 4] = [
        PlatformKey::MacArm64,
        PlatformKey::Windows,
        PlatformKey::LinuxAppImage,
        PlatformKey::LinuxDeb,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformKey::MacArm64 => "mac-arm64",
            PlatformKey::Windows => "windows",
            PlatformKey::LinuxAppImage => "linux-appimage",
            PlatformKey::LinuxDeb => "linux-deb",
        }
    }

    /// Asset file name pattern bound to this key
    pub fn pattern(&self) -> &'static Regex {
        match self {
            PlatformKey::MacArm64 => &MAC_ARM64,
            PlatformKey::Windows => &WINDOWS,
            PlatformKey::LinuxAppImage => &LINUX_APPIMAGE,
            PlatformKey::LinuxDeb => &LINUX_DEB,
        }
    }

    /// Accepted query values, in display order
    pub fn valid_values() -> Vec<&'static str> {
        Self::ALL.iter().map(PlatformKey::as_str).collect()
    }
}

impl fmt::Display for PlatformKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| format!("unknown platform key: {s}"))
    }
}

/// First asset, in release order, whose name matches the key's pattern.
pub fn find_asset(release: &ReleaseInfo, key: PlatformKey) -> Option<&AssetDescriptor> {
    let pattern = key.pattern();
    release.assets.iter().find(|a| pattern.is_match(&a.name))
}

/// `<binary>_<version>_<os>_<arch>.<ext>` for the command-line installer archives.
///
/// The extension comes from the target's archive kind, so windows always gets `zip`.
pub fn build_archive_name(binary_name: &str, version: &str, target: PlatformTarget) -> String {
    format!(
        "{}_{}_{}_{}.{}",
        binary_name,
        version,
        target.os.as_str(),
        target.arch.as_str(),
        target.archive_kind().extension()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::platform::resolve_platform;

    fn release(names: &[&str]) -> ReleaseInfo {
        ReleaseInfo {
            version: "1.0.0".into(),
            assets: names
                .iter()
                .map(|name| AssetDescriptor {
                    name: name.to_string(),
                    download_url: format!("https://dl.example/{name}"),
                })
                .collect(),
        }
    }

    #[test]
    fn test_find_asset_by_key() {
        let release = release(&["Djinn-1.0.0-arm64.dmg", "Djinn-1.0.0-x64.exe"]);

        let mac = find_asset(&release, PlatformKey::MacArm64).unwrap();
        assert_eq!(mac.name, "Djinn-1.0.0-arm64.dmg");

        let win = find_asset(&release, PlatformKey::Windows).unwrap();
        assert_eq!(win.name, "Djinn-1.0.0-x64.exe");

        assert!(find_asset(&release, PlatformKey::LinuxDeb).is_none());
    }

    #[test]
    fn test_first_match_wins() {
        let release = release(&[
            "Djinn-1.0.0.deb.sha256",
            "Djinn-1.0.0-amd64.deb",
            "Djinn-1.0.0-arm64.deb",
        ]);
        let deb = find_asset(&release, PlatformKey::LinuxDeb).unwrap();
        assert_eq!(deb.name, "Djinn-1.0.0-amd64.deb");
    }

    #[test]
    fn test_patterns_reject_installer_archives() {
        let release = release(&[
            "djinn_1.0.0_darwin_arm64.tar.gz",
            "djinn_1.0.0_windows_amd64.zip",
            "Djinn-1.0.0.AppImage.blockmap",
        ]);
        for key in PlatformKey::ALL {
            assert!(find_asset(&release, key).is_none(), "{key}");
        }
    }

    #[test]
    fn test_platform_key_parsing() {
        assert_eq!("mac-arm64".parse::<PlatformKey>(), Ok(PlatformKey::MacArm64));
        assert_eq!(
            "linux-appimage".parse::<PlatformKey>(),
            Ok(PlatformKey::LinuxAppImage)
        );
        assert!("mac-x64".parse::<PlatformKey>().is_err());
        assert_eq!(
            PlatformKey::valid_values(),
            vec!["mac-arm64", "windows", "linux-appimage", "linux-deb"]
        );
    }

    #[test]
    fn test_build_archive_name() {
        let linux = resolve_platform("linux", "x64").unwrap();
        assert_eq!(
            build_archive_name("djinn", "1.2.3", linux),
            "djinn_1.2.3_linux_amd64.tar.gz"
        );

        let windows = resolve_platform("win32", "arm64").unwrap();
        assert_eq!(
            build_archive_name("djinn", "1.2.3", windows),
            "djinn_1.2.3_windows_arm64.zip"
        );
    }
}
