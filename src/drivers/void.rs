//! Placeholder variant for browsers that need no driver binary.
//! Setting it up is a resolution error, not a silent no-op.

use async_trait::async_trait;

use crate::drivers::Driver;
use crate::listing::ListingStrategy;

pub struct VoidDriver;

#[async_trait]
impl Driver for VoidDriver {
    fn driver_name(&self) -> &'static str {
        "void"
    }

    fn config_prefix(&self) -> &'static str {
        "void"
    }

    fn listing_strategy(&self) -> ListingStrategy {
        ListingStrategy::BucketIndex
    }

    fn is_supported(&self) -> bool {
        false
    }
}
