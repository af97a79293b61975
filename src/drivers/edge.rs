//! Edge driver: scraped from the Microsoft download page.
//!
//! The page has labelled two different numbering schemes over time:
//! Chromium-based builds ("91.0.864.41", four dotted components) and the
//! legacy per-Windows-build numbers ("6.17134"). The dot count of the
//! target version tells the schemes apart.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::config::Config;
use crate::drivers::Driver;
use crate::http::HttpClient;
use crate::listing::ListingStrategy;
use crate::platform::OperatingSystem;
use crate::shell::major_version;
use crate::version::versions_equal;

/// Dot count at or above which a version is Chromium-scheme.
const CHROMIUM_SCHEME_DOTS: usize = 3;

pub struct EdgeDriver;

#[async_trait]
impl Driver for EdgeDriver {
    fn driver_name(&self) -> &'static str {
        "msedgedriver"
    }

    fn browser_name(&self) -> Option<&'static str> {
        Some("edge")
    }

    fn config_prefix(&self) -> &'static str {
        "edge"
    }

    fn listing_strategy(&self) -> ListingStrategy {
        ListingStrategy::DownloadPage
    }

    /// Artifacts have been named edgedriver_*, MicrosoftWebDriver.exe
    /// and msedgedriver_* across page revisions.
    fn artifact_token(&self) -> &'static str {
        "driver"
    }

    async fn driver_version_for_browser(
        &self,
        _http: &HttpClient,
        _config: &Config,
        browser_version: &str,
    ) -> Option<String> {
        // Chromium-based Edge releases a driver per browser version; the
        // scraped page is then narrowed by major. Legacy Edge versions
        // carry no usable mapping.
        if browser_version.matches('.').count() >= CHROMIUM_SCHEME_DOTS {
            Some(browser_version.to_string())
        } else {
            None
        }
    }

    fn version_matches(&self, candidate: &str, target: &str) -> bool {
        if candidate == target || versions_equal(candidate, target) {
            return true;
        }
        // Chromium scheme: same major is close enough, the page lists
        // one driver per browser release train.
        target.matches('.').count() >= CHROMIUM_SCHEME_DOTS
            && major_version(candidate) == major_version(target)
    }

    fn select_executable(&self, extracted: &[PathBuf], expected: &str) -> Option<PathBuf> {
        extracted
            .iter()
            .find(|p| p.file_name().and_then(|n| n.to_str()) == Some(expected))
            .or_else(|| {
                // Legacy artifacts ship a bare MicrosoftWebDriver.exe.
                extracted.iter().find(|p| {
                    p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.to_ascii_lowercase().contains("webdriver"))
                })
            })
            .cloned()
    }

    fn executable_name(&self, os: OperatingSystem) -> String {
        match os {
            OperatingSystem::Win => "msedgedriver.exe".to_string(),
            _ => "msedgedriver".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chromium_scheme_matches_by_major() {
        let driver = EdgeDriver;
        assert!(driver.version_matches("91.0.864.41", "91.0.864.37"));
        assert!(!driver.version_matches("90.0.818.66", "91.0.864.37"));
    }

    #[test]
    fn legacy_scheme_requires_exact_match() {
        let driver = EdgeDriver;
        assert!(driver.version_matches("6.17134", "6.17134"));
        assert!(!driver.version_matches("6.17134", "6.16299"));
    }

    #[test]
    fn legacy_executable_is_recognized() {
        let driver = EdgeDriver;
        let extracted = vec![PathBuf::from("/cache/edge/MicrosoftWebDriver.exe")];
        assert_eq!(
            driver.select_executable(&extracted, "msedgedriver.exe"),
            Some(extracted[0].clone())
        );
    }
}
