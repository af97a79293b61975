//! The driver resolution engine.
//!
//! One `DriverManager` per driver kind drives the whole pipeline: pick a
//! target version, enumerate candidate artifacts, narrow them to the one
//! matching URL, download and stage the binary, and remember the outcome.
//! All per-publisher variation is delegated to the [`Driver`] hooks.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::config::{keys, Config};
use crate::downloader;
use crate::drivers::{Driver, DriverKind};
use crate::error::Error;
use crate::filter;
use crate::http::HttpClient;
use crate::listing::{self, Candidate, GitHubRelease, ListingStrategy};
use crate::platform::TargetPlatform;
use crate::preferences::Preferences;
use crate::shell;
use crate::version::latest_of;

pub struct DriverManager {
    driver: Box<dyn Driver>,
    config: Config,
}

impl DriverManager {
    pub fn new(kind: DriverKind) -> Self {
        Self::with_config(kind, Config::new())
    }

    pub fn with_config(kind: DriverKind, config: Config) -> Self {
        DriverManager {
            driver: kind.driver(),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Forgets every remembered version/URL resolution. Best effort.
    pub fn clear_preferences(&self) {
        match self.config.target_path() {
            Ok(dir) => Preferences::in_dir(&dir).clear(),
            Err(e) => warn!(error = %e, "cannot locate preference store to clear"),
        }
    }

    /// Resolves, downloads if needed, and returns the local path of a
    /// working driver executable.
    pub async fn setup(&mut self) -> Result<PathBuf, Error> {
        let driver = &*self.driver;
        if !driver.is_supported() {
            return Err(Error::UnsupportedDriver(driver.driver_name().to_string()));
        }

        let platform = self.config.target_platform()?;
        let base = self.config.target_path()?;
        let force = self.config.get_bool(keys::FORCE_DOWNLOAD);
        let ignored = self.config.ignored_versions();
        let http = HttpClient::new(&self.config)?;
        let preferences = Preferences::in_dir(&base);

        // 1. Determine the version target: explicit > cached > detected
        // browser > remote latest. Auto-resolved versions on the ignore
        // list are discarded; an explicit request always wins.
        let explicit = self.config.get(&driver.version_key());
        let mut version = explicit.clone();
        if version.is_none()
            && !self.config.get_bool(keys::AVOID_AUTO_VERSION)
            && preferences.check(driver.driver_name())
        {
            version = preferences.get(driver.driver_name());
            debug!(version = ?version, "using cached driver version");
        }
        if version.is_none() {
            if let Some(browser) = driver.browser_name() {
                if let Some(browser_version) = shell::installed_browser_version(browser, None).await
                {
                    version = driver
                        .driver_version_for_browser(&http, &self.config, &browser_version)
                        .await;
                }
            }
        }
        if version.is_none() {
            version = driver.latest_version(&http, &self.config).await;
        }
        if explicit.is_none() {
            if let Some(v) = &version {
                if ignored.iter().any(|i| i == v) {
                    debug!(version = %v, "auto-resolved version is ignored");
                    version = None;
                }
            }
        }

        // Idempotence: with a concrete version and a populated cache,
        // return the staged binary without any network traffic.
        if !force {
            if let Some(v) = &version {
                let dir = downloader::version_dir(&base, driver.driver_name(), &platform, v);
                let expected = driver.executable_name(platform.os);
                if let Some(binary) = downloader::find_cached_binary(&dir, driver, &expected) {
                    debug!(path = %binary.display(), "resolved from cache");
                    return self.record_outcome(&preferences, v, None, binary);
                }
            }
        }

        // 2. List candidates, from the mirror when enabled.
        let (candidates, source_name) = self.list_candidates(&http, &platform).await?;

        // 3. Narrow by artifact name, platform, and ignore list.
        let token = driver.artifact_token().to_ascii_lowercase();
        let mut candidates: Vec<Candidate> = candidates
            .into_iter()
            .filter(|c| c.file_name().to_ascii_lowercase().contains(&token))
            .collect();
        if driver.os_filtered() {
            candidates = filter::filter_by_os(candidates, platform.os);
        }
        if driver.arch_filtered() {
            candidates = filter::filter_by_arch(candidates, platform.arch, driver.driver_name())?;
        }
        candidates = filter::filter_by_ignored_versions(candidates, &ignored);

        let chosen = match &version {
            Some(v) => candidates
                .into_iter()
                .find(|c| {
                    c.version
                        .as_deref()
                        .is_some_and(|candidate| driver.version_matches(candidate, v))
                })
                .ok_or_else(|| Error::VersionNotFound {
                    driver: driver.driver_name().to_string(),
                    version: v.clone(),
                    platform: platform.to_string(),
                    source_name: source_name.to_string(),
                })?,
            None => pick_latest(candidates).ok_or_else(|| Error::NoCandidates {
                driver: driver.driver_name().to_string(),
                platform: platform.to_string(),
                source_name: source_name.to_string(),
            })?,
        };
        // Mirrors sometimes index artifacts they no longer host; verify
        // before committing to the download.
        if source_name == "mirror" && !http.exists(&chosen.url).await {
            return Err(Error::VersionNotFound {
                driver: driver.driver_name().to_string(),
                version: chosen.version.clone().unwrap_or_default(),
                platform: platform.to_string(),
                source_name: source_name.to_string(),
            });
        }

        let resolved_version = version
            .or_else(|| chosen.version.clone())
            .ok_or_else(|| Error::NoCandidates {
                driver: driver.driver_name().to_string(),
                platform: platform.to_string(),
                source_name: source_name.to_string(),
            })?;
        info!(
            driver = driver.driver_name(),
            version = %resolved_version,
            url = %chosen.url,
            source = source_name,
            "resolved driver artifact"
        );

        // 4. Download, extract and stage.
        let binary = downloader::download_and_stage(
            &http,
            driver,
            &base,
            &platform,
            &resolved_version,
            &chosen.url,
            force,
        )
        .await?;

        // 5. Remember the resolution and export the binary path.
        self.record_outcome(&preferences, &resolved_version, Some(&chosen), binary)
    }

    fn record_outcome(
        &mut self,
        preferences: &Preferences,
        version: &str,
        chosen: Option<&Candidate>,
        binary: PathBuf,
    ) -> Result<PathBuf, Error> {
        let ttl = self.config.get_u64(keys::TTL).unwrap_or(0);
        let name = self.driver.driver_name();
        if let Err(e) = preferences.put_if_empty(name, version, ttl) {
            warn!(error = %e, "could not record resolved version");
        }
        if let Some(candidate) = chosen {
            let key = format!("{name}.url");
            if let Err(e) = preferences.put_if_empty(&key, candidate.url.as_str(), ttl) {
                warn!(error = %e, "could not record resolved url");
            }
        }
        if let Some(export_name) = self.config.get(&self.driver.export_key()) {
            self.config
                .set(&export_name, &binary.to_string_lossy());
        }
        Ok(binary)
    }

    async fn list_candidates(
        &self,
        http: &HttpClient,
        platform: &TargetPlatform,
    ) -> Result<(Vec<Candidate>, &'static str), Error> {
        let driver = &*self.driver;
        if self.config.get_bool(keys::USE_MIRROR) {
            if let Some(mirror) = self.config.get_url(&driver.mirror_url_key())? {
                debug!(url = %mirror, "listing candidates from mirror");
                let text = http.get_text(&mirror).await?;
                let candidates = listing::parse_mirror_index(&text, &mirror, "mirror")?;
                return Ok((candidates, "mirror"));
            }
            warn!(
                driver = driver.driver_name(),
                "mirror requested but no mirror URL configured; using primary"
            );
        }

        let url = self
            .config
            .get_url(&driver.url_key())?
            .ok_or_else(|| Error::NoCandidates {
                driver: driver.driver_name().to_string(),
                platform: platform.to_string(),
                source_name: "primary (no URL configured)".to_string(),
            })?;
        let candidates = match driver.listing_strategy() {
            ListingStrategy::BucketIndex => {
                let xml = http.get_text(&url).await?;
                listing::parse_bucket_index(&xml, &url, "primary")?
            }
            ListingStrategy::GitHubReleases => {
                let releases: Vec<GitHubRelease> = http.get_json(&url).await?;
                listing::github_candidates(&releases, |tag| driver.normalize_tag(tag), "primary")?
            }
            ListingStrategy::DownloadPage => {
                let html = http.get_text(&url).await?;
                listing::parse_download_page(&html, &url, "primary")?
            }
        };
        Ok((candidates, "primary"))
    }
}

/// Highest-versioned candidate under the lenient comparison rules.
fn pick_latest(candidates: Vec<Candidate>) -> Option<Candidate> {
    let best = latest_of(candidates.iter().filter_map(|c| c.version.as_deref()))?.to_string();
    candidates
        .into_iter()
        .find(|c| c.version.as_deref() == Some(best.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn candidate(version: &str) -> Candidate {
        let url = Url::parse(&format!(
            "https://example.com/{version}/chromedriver_linux64.zip"
        ))
        .unwrap();
        Candidate::new(url, Some(version.to_string()))
    }

    #[test]
    fn latest_wins_by_numeric_comparison() {
        let chosen = pick_latest(vec![candidate("2.9"), candidate("2.46"), candidate("2.40")]);
        assert_eq!(chosen.unwrap().version.as_deref(), Some("2.46"));
    }

    #[test]
    fn no_versioned_candidates_means_none() {
        let unversioned = Candidate::new(
            Url::parse("https://example.com/chromedriver.zip").unwrap(),
            None,
        );
        assert!(pick_latest(vec![unversioned]).is_none());
        assert!(pick_latest(Vec::new()).is_none());
    }

    #[tokio::test]
    async fn void_driver_is_a_resolution_error() {
        let mut manager = DriverManager::new(DriverKind::Void);
        let result = manager.setup().await;
        assert!(matches!(result, Err(Error::UnsupportedDriver(name)) if name == "void"));
    }
}
