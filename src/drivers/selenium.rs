//! Selenium server standalone: a platform-neutral jar in the
//! selenium-release bucket. Nothing to extract, no browser to detect;
//! the jar itself is the artifact.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::drivers::Driver;
use crate::listing::ListingStrategy;
use crate::platform::OperatingSystem;

pub struct SeleniumServer;

#[async_trait]
impl Driver for SeleniumServer {
    fn driver_name(&self) -> &'static str {
        "selenium-server-standalone"
    }

    fn config_prefix(&self) -> &'static str {
        "seleniumServerStandalone"
    }

    fn listing_strategy(&self) -> ListingStrategy {
        ListingStrategy::BucketIndex
    }

    // This variant's property names carry no "Driver" infix.
    fn url_key(&self) -> String {
        "wdm.seleniumServerStandaloneUrl".to_string()
    }

    fn mirror_url_key(&self) -> String {
        "wdm.seleniumServerStandaloneMirrorUrl".to_string()
    }

    fn version_key(&self) -> String {
        "wdm.seleniumServerStandaloneVersion".to_string()
    }

    fn export_key(&self) -> String {
        "wdm.seleniumServerStandaloneExport".to_string()
    }

    fn os_filtered(&self) -> bool {
        false
    }

    fn arch_filtered(&self) -> bool {
        false
    }

    /// The downloaded jar is the artifact; keep its versioned filename.
    fn select_executable(&self, extracted: &[PathBuf], _expected: &str) -> Option<PathBuf> {
        extracted
            .iter()
            .find(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(".jar"))
            })
            .cloned()
    }

    fn rename_to_flat(&self) -> bool {
        false
    }

    fn executable_name(&self, _os: OperatingSystem) -> String {
        format!("{}.jar", self.driver_name())
    }
}
