//! Layered configuration resolution.
//!
//! Every setting is a `wdm.<name>` key resolved through a fixed fallback
//! chain: runtime override > environment variable (verbatim key, then
//! upper-snake form with dots as underscores) > user properties file
//! (whose path is itself a setting) > the bundled defaults resource.
//!
//! The properties format is line-oriented `key=value`; `#` lines and
//! blank lines are ignored and the last value wins on duplicate keys.

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::platform::{Architecture, OperatingSystem, TargetPlatform};

/// Bundled fallback settings, compiled into the library.
const DEFAULT_PROPERTIES: &str = include_str!("../webdrivermanager.properties");

/// Bundled browser-major to driver-version table.
const VERSIONS_PROPERTIES: &str = include_str!("../versions.properties");

/// Well-known setting keys.
pub mod keys {
    pub const TARGET_PATH: &str = "wdm.targetPath";
    pub const PROPERTIES: &str = "wdm.properties";
    pub const FORCE_DOWNLOAD: &str = "wdm.forceDownload";
    pub const AVOID_AUTO_VERSION: &str = "wdm.avoidAutoVersion";
    pub const USE_MIRROR: &str = "wdm.useMirror";
    pub const TIMEOUT: &str = "wdm.timeout";
    pub const TTL: &str = "wdm.ttl";
    pub const IGNORE_VERSIONS: &str = "wdm.ignoreVersions";
    pub const OS: &str = "wdm.os";
    pub const ARCHITECTURE: &str = "wdm.architecture";
    pub const PROXY: &str = "wdm.proxy";
    pub const PROXY_USER: &str = "wdm.proxyUser";
    pub const PROXY_PASS: &str = "wdm.proxyPass";
}

/// Parses properties-format text: `key=value` lines, `#` comments,
/// blank lines skipped, last value wins.
pub fn parse_properties(text: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            map.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    map
}

/// Process-wide settings store, shared by every resolution engine.
///
/// Plain in-memory maps, no synchronization: callers serialize access
/// when sharing across threads.
#[derive(Debug, Clone)]
pub struct Config {
    overrides: HashMap<String, String>,
    file_props: HashMap<String, String>,
    defaults: HashMap<String, String>,
    versions: HashMap<String, String>,
}

impl Config {
    pub fn new() -> Self {
        let mut config = Config {
            overrides: HashMap::new(),
            file_props: HashMap::new(),
            defaults: parse_properties(DEFAULT_PROPERTIES),
            versions: parse_properties(VERSIONS_PROPERTIES),
        };
        config.reload_file_props();
        config
    }

    /// Sets a runtime override, the highest-priority layer.
    pub fn set(&mut self, key: &str, value: &str) {
        self.overrides.insert(key.to_string(), value.to_string());
        if key == keys::PROPERTIES {
            self.reload_file_props();
        }
    }

    /// Restores every setting to its initial state: clears all runtime
    /// overrides so the fallback chain re-applies on next read.
    pub fn reset(&mut self) {
        self.overrides.clear();
        self.reload_file_props();
    }

    fn reload_file_props(&mut self) {
        self.file_props.clear();
        let Some(path) = self.resolve_without_file(keys::PROPERTIES) else {
            return;
        };
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                self.file_props = parse_properties(&text);
                debug!(path = %path, entries = self.file_props.len(), "loaded properties file");
            }
            // A missing user file just means the bundled defaults apply.
            Err(_) => {}
        }
    }

    /// The `WDM_FOO_BAR` spelling of a `wdm.fooBar` key.
    fn env_name(key: &str) -> String {
        key.replace('.', "_").to_ascii_uppercase()
    }

    fn resolve_without_file(&self, key: &str) -> Option<String> {
        if let Some(value) = self.overrides.get(key) {
            return Some(value.clone());
        }
        if let Ok(value) = std::env::var(key) {
            return Some(value);
        }
        if let Ok(value) = std::env::var(Self::env_name(key)) {
            return Some(value);
        }
        self.defaults.get(key).cloned()
    }

    /// Resolves a setting through the full fallback chain. Empty values
    /// count as unset so a blank default does not shadow anything.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = self
            .overrides
            .get(key)
            .cloned()
            .or_else(|| std::env::var(key).ok())
            .or_else(|| std::env::var(Self::env_name(key)).ok())
            .or_else(|| self.file_props.get(key).cloned())
            .or_else(|| self.defaults.get(key).cloned())?;
        if value.is_empty() { None } else { Some(value) }
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key)
            .map(|v| bool::from_str(v.trim()).unwrap_or(false))
            .unwrap_or(false)
    }

    pub fn get_u64(&self, key: &str) -> Result<u64, Error> {
        match self.get(key) {
            None => Ok(0),
            Some(value) => value.trim().parse().map_err(|_| Error::InvalidNumber {
                key: key.to_string(),
                value,
            }),
        }
    }

    pub fn get_url(&self, key: &str) -> Result<Option<Url>, Error> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => Url::parse(&value).map(Some).map_err(|e| Error::InvalidUri {
                key: key.to_string(),
                value,
                source: e,
            }),
        }
    }

    /// The cache root directory, with `~` expanded to the home directory
    /// and `.` resolved to the running executable's directory.
    pub fn target_path(&self) -> Result<PathBuf, Error> {
        let raw = self.get(keys::TARGET_PATH).unwrap_or_else(|| ".".to_string());
        if let Some(rest) = raw.strip_prefix('~') {
            let home = dirs::home_dir().ok_or_else(|| {
                Error::io(
                    &raw,
                    std::io::Error::new(std::io::ErrorKind::NotFound, "home directory not found"),
                )
            })?;
            return Ok(home.join(rest.trim_start_matches(['/', '\\'])));
        }
        if raw == "." || raw.starts_with("./") {
            let exe = std::env::current_exe().map_err(|e| Error::io(&raw, e))?;
            let dir = exe
                .parent()
                .ok_or_else(|| {
                    Error::io(
                        &exe,
                        std::io::Error::new(std::io::ErrorKind::NotFound, "executable has no parent"),
                    )
                })?
                .to_path_buf();
            let rest = raw.trim_start_matches('.').trim_start_matches('/');
            return Ok(if rest.is_empty() { dir } else { dir.join(rest) });
        }
        Ok(PathBuf::from(raw))
    }

    /// Target platform: configured OS/arch override, host otherwise.
    pub fn target_platform(&self) -> Result<TargetPlatform, Error> {
        let os = match self.get(keys::OS) {
            Some(value) => value.parse::<OperatingSystem>()?,
            None => OperatingSystem::current()?,
        };
        let arch = match self.get(keys::ARCHITECTURE) {
            Some(value) => value.parse::<Architecture>()?,
            None => Architecture::Default,
        };
        Ok(TargetPlatform { os, arch })
    }

    /// Comma-separated ignore list for the version filter.
    pub fn ignored_versions(&self) -> Vec<String> {
        self.get(keys::IGNORE_VERSIONS)
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Driver version from the bundled browser-compatibility table.
    pub fn version_for_browser(&self, browser: &str, browser_major: &str) -> Option<String> {
        self.versions.get(&format!("{browser}{browser_major}")).cloned()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
