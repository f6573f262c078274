//! Platform identifiers understood by the catalog.

use serde::{Deserialize, Serialize};

/// Platform identifier combining OS and architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Platform {
    /// Operating system.
    pub os: Os,
    /// CPU architecture.
    pub arch: Arch,
}

impl Platform {
    /// Create a new platform.
    #[must_use]
    pub fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Get the current platform.
    #[must_use]
    pub fn current() -> Self {
        Self {
            os: Os::current(),
            arch: Arch::current(),
        }
    }

    /// Parse from string like "darwin-arm64".
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let (os, arch) = s.split_once('-')?;
        Some(Self {
            os: Os::parse(os)?,
            arch: Arch::parse(arch)?,
        })
    }

    /// Identifier used in catalog URLs, e.g. `linuxx64` or `darwinarm64`.
    ///
    /// Combinations the catalog does not publish builds for map to `exotic`.
    #[must_use]
    pub fn catalog_id(&self) -> &'static str {
        match (self.os, self.arch) {
            (Os::Linux, Arch::X86_64) => "linuxx64",
            (Os::Linux, Arch::Arm64) => "linuxarm64",
            (Os::Linux, Arch::X86) => "linuxx32",
            (Os::Linux, Arch::Arm) => "linuxarm32hf",
            (Os::Darwin, Arch::X86_64) => "darwinx64",
            (Os::Darwin, Arch::Arm64) => "darwinarm64",
            (Os::Windows, Arch::X86_64) => "windowsx64",
            _ => "exotic",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

/// Operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    /// macOS
    Darwin,
    /// Linux
    Linux,
    /// Windows
    Windows,
    /// Anything else
    Other,
}

impl Os {
    /// Get the current OS.
    #[must_use]
    pub fn current() -> Self {
        Self::parse(std::env::consts::OS).unwrap_or(Self::Other)
    }

    /// Parse from string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "darwin" | "macos" => Some(Self::Darwin),
            "linux" => Some(Self::Linux),
            "windows" | "mingw64" => Some(Self::Windows),
            _ => None,
        }
    }
}

impl std::fmt::Display for Os {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Darwin => write!(f, "darwin"),
            Self::Linux => write!(f, "linux"),
            Self::Windows => write!(f, "windows"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// 64-bit ARM
    Arm64,
    /// 64-bit x86
    X86_64,
    /// 32-bit x86
    X86,
    /// 32-bit ARM
    Arm,
    /// Anything else
    Other,
}

impl Arch {
    /// Get the current architecture.
    #[must_use]
    pub fn current() -> Self {
        Self::parse(std::env::consts::ARCH).unwrap_or(Self::Other)
    }

    /// Parse from string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "arm64" | "aarch64" => Some(Self::Arm64),
            "x86_64" | "amd64" | "x64" => Some(Self::X86_64),
            "x86" | "i386" | "i686" | "386" => Some(Self::X86),
            "arm" | "armv7" | "armhf" => Some(Self::Arm),
            _ => None,
        }
    }
}

impl std::fmt::Display for Arch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Arm64 => write!(f, "arm64"),
            Self::X86_64 => write!(f, "x86_64"),
            Self::X86 => write!(f, "x86"),
            Self::Arm => write!(f, "arm"),
            Self::Other => write!(f, "other"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_parse() {
        let p = Platform::parse("darwin-arm64").unwrap();
        assert_eq!(p.os, Os::Darwin);
        assert_eq!(p.arch, Arch::Arm64);

        let p = Platform::parse("linux-x86_64").unwrap();
        assert_eq!(p.os, Os::Linux);
        assert_eq!(p.arch, Arch::X86_64);

        assert!(Platform::parse("invalid").is_none());
        assert!(Platform::parse("darwin").is_none());
        assert!(Platform::parse("").is_none());
        assert!(Platform::parse("darwin-mips").is_none());
    }

    #[test]
    fn test_catalog_ids() {
        assert_eq!(Platform::new(Os::Linux, Arch::X86_64).catalog_id(), "linuxx64");
        assert_eq!(Platform::new(Os::Linux, Arch::Arm64).catalog_id(), "linuxarm64");
        assert_eq!(Platform::new(Os::Linux, Arch::X86).catalog_id(), "linuxx32");
        assert_eq!(Platform::new(Os::Linux, Arch::Arm).catalog_id(), "linuxarm32hf");
        assert_eq!(Platform::new(Os::Darwin, Arch::X86_64).catalog_id(), "darwinx64");
        assert_eq!(Platform::new(Os::Darwin, Arch::Arm64).catalog_id(), "darwinarm64");
        assert_eq!(Platform::new(Os::Windows, Arch::X86_64).catalog_id(), "windowsx64");
        assert_eq!(Platform::new(Os::Windows, Arch::Arm64).catalog_id(), "exotic");
        assert_eq!(Platform::new(Os::Other, Arch::X86_64).catalog_id(), "exotic");
    }

    #[test]
    fn test_platform_display() {
        assert_eq!(
            Platform::new(Os::Darwin, Arch::Arm64).to_string(),
            "darwin-arm64"
        );
        assert_eq!(
            Platform::new(Os::Linux, Arch::X86_64).to_string(),
            "linux-x86_64"
        );
    }

    #[test]
    fn test_current_platform_round_trips_through_parse() {
        let p = Platform::current();
        if p.os != Os::Other && p.arch != Arch::Other {
            assert_eq!(Platform::parse(&p.to_string()), Some(p));
        }
    }

    #[test]
    fn test_arch_parse_aliases() {
        assert_eq!(Arch::parse("aarch64"), Some(Arch::Arm64));
        assert_eq!(Arch::parse("AMD64"), Some(Arch::X86_64));
        assert_eq!(Arch::parse("i686"), Some(Arch::X86));
        assert_eq!(Arch::parse("mips"), None);
    }
}
