//! Platform detection and release asset naming.

use std::fmt;

use crate::install::error::InstallError;

/// Operating systems that have published `asn1-lsp` binaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    Linux,
    Macos,
    Windows,
}

impl Os {
    pub fn as_str(&self) -> &'static str {
        match self {
            Os::Linux => "linux",
            Os::Macos => "macos",
            Os::Windows => "windows",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CPU architectures that have published `asn1-lsp` binaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    X86_64,
    Aarch64,
}

impl Arch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::X86_64 => "x86_64",
            Arch::Aarch64 => "aarch64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized (os, arch) pair for the running process.
///
/// Computed once per activation and never mutated. Any platform outside the
/// supported set fails immediately since no release asset exists for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformDescriptor {
    pub os: Os,
    pub arch: Arch,
}

impl PlatformDescriptor {
    /// Detect the current platform from the compiled-in target identifiers.
    pub fn current() -> Result<Self, InstallError> {
        Self::from_parts(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Map reported (os, arch) strings to a descriptor.
    pub fn from_parts(os: &str, arch: &str) -> Result<Self, InstallError> {
        let os = match os {
            "linux" => Os::Linux,
            "macos" => Os::Macos,
            "windows" => Os::Windows,
            other => return Err(InstallError::UnsupportedPlatform(other.to_string())),
        };
        let arch = match arch {
            "x86_64" => Arch::X86_64,
            "aarch64" => Arch::Aarch64,
            other => return Err(InstallError::UnsupportedPlatform(other.to_string())),
        };
        Ok(Self { os, arch })
    }

    pub fn is_windows(&self) -> bool {
        self.os == Os::Windows
    }

    /// Release archive name for this platform, e.g. `asn1-lsp-linux-x86_64.zip`.
    pub fn asset_name(&self) -> String {
        format!("asn1-lsp-{}-{}.zip", self.os, self.arch)
    }

    /// Name of the server binary inside the archive.
    pub fn binary_name(&self) -> &'static str {
        if self.is_windows() {
            "asn1-lsp.exe"
        } else {
            "asn1-lsp"
        }
    }
}
