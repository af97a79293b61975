//! PhantomJS: scraped from its downloads page. Artifacts embed the
//! platform in the filename (phantomjs-2.1.1-linux-x86_64.tar.gz) and
//! unix releases hide the binary under a bin/ subdirectory.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::drivers::Driver;
use crate::listing::ListingStrategy;

pub struct PhantomJsDriver;

#[async_trait]
impl Driver for PhantomJsDriver {
    fn driver_name(&self) -> &'static str {
        "phantomjs"
    }

    fn config_prefix(&self) -> &'static str {
        "phantomjs"
    }

    fn listing_strategy(&self) -> ListingStrategy {
        ListingStrategy::DownloadPage
    }

    /// Beta releases are cached under their stable version directory,
    /// and the platform-named archive gets its own subdirectory so the
    /// extracted tree cannot collide with another platform's.
    fn pre_download(&self, target: PathBuf, _version: &str) -> PathBuf {
        let Some(file_name) = target.file_name().and_then(|n| n.to_str()).map(str::to_string)
        else {
            return target;
        };
        let Some(parent) = target.parent() else {
            return target;
        };
        let mut parent = parent.to_path_buf();
        let stripped = parent
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|d| d.strip_suffix("-beta"))
            .map(str::to_string);
        if let Some(version_dir) = stripped {
            parent.set_file_name(version_dir);
        }
        // phantomjs-2.1.1-linux-x86_64.tar.gz -> linux-x86_64
        let platform_dir = file_name
            .trim_end_matches(".tar.gz")
            .trim_end_matches(".tar.bz2")
            .trim_end_matches(".zip")
            .splitn(3, '-')
            .nth(2)
            .map(str::to_string);
        match platform_dir {
            Some(dir) if !dir.is_empty() => parent.join(dir).join(file_name),
            _ => parent.join(file_name),
        }
    }

    /// Unix packages carry the binary in bin/; Windows zips are flat.
    fn select_executable(&self, extracted: &[PathBuf], expected: &str) -> Option<PathBuf> {
        extracted
            .iter()
            .find(|p| {
                p.parent()
                    .and_then(|d| d.file_name())
                    .is_some_and(|d| d == "bin")
                    && p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with("phantomjs"))
            })
            .or_else(|| {
                extracted.iter().find(|p| {
                    p.file_name().and_then(|n| n.to_str()) == Some(expected)
                        || p.file_name()
                            .and_then(|n| n.to_str())
                            .is_some_and(|n| n.starts_with("phantomjs") && !n.ends_with(".zip"))
                })
            })
            .cloned()
    }
}
