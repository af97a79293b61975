//! Resolves, downloads, caches and returns the local path of browser
//! automation driver binaries (chromedriver, geckodriver, ...).
//!
//! ```no_run
//! use driver_manager::{DriverKind, DriverManager};
//!
//! # async fn run() -> Result<(), driver_manager::Error> {
//! let mut manager = DriverManager::new(DriverKind::Chrome);
//! let driver_path = manager.setup().await?;
//! # Ok(())
//! # }
//! ```
//!
//! `setup()` picks the driver version (explicit setting, cached
//! resolution, installed-browser detection, or remote latest), narrows
//! the publisher's artifact listing to the one matching the target
//! platform, downloads and unpacks it under the cache directory, and
//! returns the executable path. A populated cache makes repeated calls
//! free of network traffic.

pub mod archive;
pub mod config;
pub mod downloader;
pub mod drivers;
pub mod error;
pub mod filter;
pub mod http;
pub mod listing;
pub mod manager;
pub mod platform;
pub mod preferences;
pub mod shell;
pub mod version;

pub use config::Config;
pub use drivers::{Driver, DriverKind};
pub use error::Error;
pub use manager::DriverManager;
pub use platform::{Architecture, OperatingSystem, TargetPlatform};
