//! Chromedriver: storage-bucket listing with `LATEST_RELEASE` markers.

use async_trait::async_trait;
use tracing::debug;

use crate::config::Config;
use crate::drivers::Driver;
use crate::http::HttpClient;
use crate::listing::ListingStrategy;
use crate::shell::major_version;

pub struct ChromeDriver;

impl ChromeDriver {
    /// Reads a `LATEST_RELEASE*` marker object from the bucket.
    async fn latest_marker(&self, http: &HttpClient, config: &Config, suffix: &str) -> Option<String> {
        let base = config.get_url(&self.url_key()).ok().flatten()?;
        let marker = base.join(&format!("LATEST_RELEASE{suffix}")).ok()?;
        let version = http.get_text(&marker).await.ok()?;
        let version = version.trim().to_string();
        if version.is_empty() { None } else { Some(version) }
    }
}

#[async_trait]
impl Driver for ChromeDriver {
    fn driver_name(&self) -> &'static str {
        "chromedriver"
    }

    fn browser_name(&self) -> Option<&'static str> {
        Some("chrome")
    }

    fn config_prefix(&self) -> &'static str {
        "chrome"
    }

    fn listing_strategy(&self) -> ListingStrategy {
        ListingStrategy::BucketIndex
    }

    async fn driver_version_for_browser(
        &self,
        http: &HttpClient,
        config: &Config,
        browser_version: &str,
    ) -> Option<String> {
        let major = major_version(browser_version);
        let version = self.latest_marker(http, config, &format!("_{major}")).await;
        if let Some(v) = &version {
            debug!(browser_version, driver_version = %v, "mapped chrome version");
        }
        version
    }

    async fn latest_version(&self, http: &HttpClient, config: &Config) -> Option<String> {
        self.latest_marker(http, config, "").await
    }
}
