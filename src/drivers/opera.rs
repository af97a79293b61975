//! Operadriver: GitHub releases, tags prefixed "v." in older releases
//! and "v" in newer ones. The archive nests the binary inside a
//! versioned directory (operadriver_linux64/operadriver).

use async_trait::async_trait;

use crate::drivers::Driver;
use crate::listing::ListingStrategy;

pub struct OperaDriver;

#[async_trait]
impl Driver for OperaDriver {
    fn driver_name(&self) -> &'static str {
        "operadriver"
    }

    fn browser_name(&self) -> Option<&'static str> {
        Some("opera")
    }

    fn config_prefix(&self) -> &'static str {
        "opera"
    }

    fn listing_strategy(&self) -> ListingStrategy {
        ListingStrategy::GitHubReleases
    }

    fn normalize_tag(&self, tag: &str) -> String {
        tag.trim_start_matches("v.").trim_start_matches('v').to_string()
    }
}
