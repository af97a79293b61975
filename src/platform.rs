//! Operating system and CPU architecture targets.
//!
//! The target platform normally comes from the running host but can be
//! overridden through configuration, e.g. to stage a 32-bit driver on a
//! 64-bit machine.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatingSystem {
    Win,
    Linux,
    Mac,
}

impl OperatingSystem {
    /// Detects the operating system of the running host.
    pub fn current() -> Result<Self, Error> {
        match std::env::consts::OS {
            "windows" => Ok(OperatingSystem::Win),
            "linux" => Ok(OperatingSystem::Linux),
            "macos" => Ok(OperatingSystem::Mac),
            other => Err(Error::UnsupportedPlatform(other.to_string())),
        }
    }

    /// Lowercase name used in cache path segments ("win", "linux", "mac").
    pub fn name(&self) -> &'static str {
        match self {
            OperatingSystem::Win => "win",
            OperatingSystem::Linux => "linux",
            OperatingSystem::Mac => "mac",
        }
    }

    /// URL path tokens that identify this operating system.
    ///
    /// Release artifacts for macOS are tagged "mac", "osx" or "darwin"
    /// depending on the publisher, so all three must be recognized.
    pub fn tokens(&self) -> &'static [&'static str] {
        match self {
            OperatingSystem::Win => &["win"],
            OperatingSystem::Linux => &["linux"],
            OperatingSystem::Mac => &["mac", "osx", "darwin"],
        }
    }
}

impl FromStr for OperatingSystem {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_ascii_lowercase().as_str() {
            "win" | "windows" => Ok(OperatingSystem::Win),
            "linux" => Ok(OperatingSystem::Linux),
            "mac" | "macos" | "osx" => Ok(OperatingSystem::Mac),
            other => Err(Error::UnsupportedPlatform(other.to_string())),
        }
    }
}

impl fmt::Display for OperatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Architecture {
    /// Use the pointer width of the running host.
    #[default]
    Default,
    X32,
    X64,
}

impl Architecture {
    /// Resolves `Default` to the concrete host architecture.
    pub fn effective(&self) -> Architecture {
        match self {
            Architecture::Default => {
                if cfg!(target_pointer_width = "32") {
                    Architecture::X32
                } else {
                    Architecture::X64
                }
            }
            other => *other,
        }
    }

    /// Bit-width suffix used in cache path segments ("32" / "64").
    pub fn bits(&self) -> &'static str {
        match self.effective() {
            Architecture::X32 => "32",
            _ => "64",
        }
    }

    /// URL path tokens that identify this architecture, in match-priority
    /// order: the first token with any hit decides the filtering outcome.
    pub fn tokens(&self) -> &'static [&'static str] {
        match self.effective() {
            Architecture::X32 => &["x86", "32", "i686"],
            _ => &["x64", "64", "amd64"],
        }
    }
}

impl FromStr for Architecture {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_ascii_lowercase().as_str() {
            "" | "default" => Ok(Architecture::Default),
            "32" | "x32" | "x86" => Ok(Architecture::X32),
            "64" | "x64" | "x86_64" | "amd64" => Ok(Architecture::X64),
            other => Err(Error::UnsupportedPlatform(other.to_string())),
        }
    }
}

/// The platform a driver binary is being staged for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetPlatform {
    pub os: OperatingSystem,
    pub arch: Architecture,
}

impl TargetPlatform {
    /// The `{os}{arch}` cache path segment, e.g. "linux64" or "win32".
    pub fn cache_segment(&self) -> String {
        format!("{}{}", self.os.name(), self.arch.bits())
    }
}

impl fmt::Display for TargetPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cache_segment())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_segment_joins_os_and_bits() {
        let platform = TargetPlatform {
            os: OperatingSystem::Linux,
            arch: Architecture::X64,
        };
        assert_eq!(platform.cache_segment(), "linux64");

        let platform = TargetPlatform {
            os: OperatingSystem::Win,
            arch: Architecture::X32,
        };
        assert_eq!(platform.cache_segment(), "win32");
    }

    #[test]
    fn os_parses_aliases() {
        assert_eq!("OSX".parse::<OperatingSystem>().unwrap(), OperatingSystem::Mac);
        assert_eq!("windows".parse::<OperatingSystem>().unwrap(), OperatingSystem::Win);
        assert!("beos".parse::<OperatingSystem>().is_err());
    }

    #[test]
    fn default_arch_resolves_to_host_width() {
        let arch = Architecture::Default.effective();
        assert_ne!(arch, Architecture::Default);
    }
}
