//! Geckodriver: published through GitHub releases, tags prefixed "v".
//! Unix artifacts are tar.gz, Windows ones zip.

use async_trait::async_trait;

use crate::drivers::Driver;
use crate::listing::ListingStrategy;

pub struct GeckoDriver;

#[async_trait]
impl Driver for GeckoDriver {
    fn driver_name(&self) -> &'static str {
        "geckodriver"
    }

    fn browser_name(&self) -> Option<&'static str> {
        Some("firefox")
    }

    fn config_prefix(&self) -> &'static str {
        "gecko"
    }

    fn listing_strategy(&self) -> ListingStrategy {
        ListingStrategy::GitHubReleases
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_prefix_is_stripped() {
        assert_eq!(GeckoDriver.normalize_tag("v0.29.1"), "0.29.1");
    }
}
