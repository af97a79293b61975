//! The closed set of supported driver variants.
//!
//! Shared orchestration lives in [`crate::manager`]; each variant here
//! only supplies the hooks that differ between publishers: names, config
//! keys, listing strategy, tag normalization, version mapping, and where
//! the executable hides inside the release artifact.

pub mod chrome;
pub mod edge;
pub mod firefox;
pub mod iexplorer;
pub mod opera;
pub mod phantomjs;
pub mod selenium;
pub mod void;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::config::Config;
use crate::http::HttpClient;
use crate::listing::ListingStrategy;
use crate::platform::OperatingSystem;
use crate::shell::major_version;
use crate::version::versions_equal;

/// Identifies a driver family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverKind {
    Chrome,
    Edge,
    Firefox,
    InternetExplorer,
    Opera,
    PhantomJs,
    SeleniumServerStandalone,
    Void,
}

impl DriverKind {
    /// Instantiates the hook set for this variant.
    pub fn driver(self) -> Box<dyn Driver> {
        match self {
            DriverKind::Chrome => Box::new(chrome::ChromeDriver),
            DriverKind::Edge => Box::new(edge::EdgeDriver),
            DriverKind::Firefox => Box::new(firefox::GeckoDriver),
            DriverKind::InternetExplorer => Box::new(iexplorer::IeDriver),
            DriverKind::Opera => Box::new(opera::OperaDriver),
            DriverKind::PhantomJs => Box::new(phantomjs::PhantomJsDriver),
            DriverKind::SeleniumServerStandalone => Box::new(selenium::SeleniumServer),
            DriverKind::Void => Box::new(void::VoidDriver),
        }
    }
}

/// Per-variant hooks consumed by the resolution engine.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Artifact name, e.g. "chromedriver".
    fn driver_name(&self) -> &'static str;

    /// The browser whose installed version drives auto-resolution, when
    /// there is one.
    fn browser_name(&self) -> Option<&'static str> {
        None
    }

    /// Key fragment for this driver's `wdm.*` settings.
    fn config_prefix(&self) -> &'static str;

    fn listing_strategy(&self) -> ListingStrategy;

    fn url_key(&self) -> String {
        format!("wdm.{}DriverUrl", self.config_prefix())
    }

    fn mirror_url_key(&self) -> String {
        format!("wdm.{}DriverMirrorUrl", self.config_prefix())
    }

    fn version_key(&self) -> String {
        format!("wdm.{}DriverVersion", self.config_prefix())
    }

    fn export_key(&self) -> String {
        format!("wdm.{}DriverExport", self.config_prefix())
    }

    /// Strips publisher tag decoration ("v0.29.1" -> "0.29.1").
    fn normalize_tag(&self, tag: &str) -> String {
        tag.trim_start_matches('v').to_string()
    }

    /// Whether this variant can be set up at all.
    fn is_supported(&self) -> bool {
        true
    }

    /// Substring that identifies this driver's artifacts inside a shared
    /// listing (the selenium-release bucket holds several products).
    fn artifact_token(&self) -> &'static str {
        self.driver_name()
    }

    /// Whether candidates are narrowed by operating-system token. Off
    /// for single-OS publishers whose artifacts carry no OS tag.
    fn os_filtered(&self) -> bool {
        true
    }

    /// Whether candidates are narrowed by architecture token. Off for
    /// platform-neutral artifacts.
    fn arch_filtered(&self) -> bool {
        true
    }

    /// Maps a detected browser version to a driver version. `None` means
    /// no mapping is known and resolution falls through to "latest".
    ///
    /// The default consults the bundled compatibility table by browser
    /// major version.
    async fn driver_version_for_browser(
        &self,
        _http: &HttpClient,
        config: &Config,
        browser_version: &str,
    ) -> Option<String> {
        let browser = self.browser_name()?;
        config.version_for_browser(browser, major_version(browser_version))
    }

    /// Resolves the publisher's remote "latest" indicator, when one
    /// exists. Absence is a valid outcome, not an error.
    async fn latest_version(&self, _http: &HttpClient, _config: &Config) -> Option<String> {
        None
    }

    /// Whether a candidate's inferred version satisfies the target.
    fn version_matches(&self, candidate: &str, target: &str) -> bool {
        candidate == target || versions_equal(candidate, target)
    }

    /// Adjusts the computed archive target path before downloading.
    fn pre_download(&self, target: PathBuf, _version: &str) -> PathBuf {
        target
    }

    /// Locates the driver executable among extracted files: exact
    /// expected name first, then any file named after the driver.
    fn select_executable(&self, extracted: &[PathBuf], expected: &str) -> Option<PathBuf> {
        extracted
            .iter()
            .find(|p| p.file_name().and_then(|n| n.to_str()) == Some(expected))
            .or_else(|| {
                extracted.iter().find(|p| {
                    p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with(self.driver_name()))
                })
            })
            .cloned()
    }

    /// Whether the located executable is moved up to the flat versioned
    /// directory after extraction.
    fn rename_to_flat(&self) -> bool {
        true
    }

    /// Executable filename for the target operating system.
    fn executable_name(&self, os: OperatingSystem) -> String {
        match os {
            OperatingSystem::Win => format!("{}.exe", self.driver_name()),
            _ => self.driver_name().to_string(),
        }
    }
}
