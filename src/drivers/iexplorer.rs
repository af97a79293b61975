//! IEDriverServer: published in the selenium-release storage bucket.
//! No installed-browser detection; version resolution is explicit,
//! cached, or latest.

use async_trait::async_trait;

use crate::drivers::Driver;
use crate::listing::ListingStrategy;

pub struct IeDriver;

#[async_trait]
impl Driver for IeDriver {
    fn driver_name(&self) -> &'static str {
        "IEDriverServer"
    }

    fn config_prefix(&self) -> &'static str {
        "internetExplorer"
    }

    fn listing_strategy(&self) -> ListingStrategy {
        ListingStrategy::BucketIndex
    }

    /// Every IEDriverServer artifact is a Windows binary; only the
    /// Win32/x64 tag varies.
    fn os_filtered(&self) -> bool {
        false
    }
}
