//! Candidate-URL listing strategies.
//!
//! Each driver publishes its releases in one of three shapes:
//!
//! - a storage-bucket directory index (XML with `<Key>` entries),
//! - a GitHub releases feed (JSON, one asset URL per platform),
//! - a bespoke HTML download page (anchors grouped under version labels).
//!
//! The parsers here are pure (`&str` in, candidates out) so they can be
//! unit-tested against captured fixtures without touching the network; the
//! manager pairs them with [`crate::http::HttpClient`] fetches.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use url::Url;

use crate::error::Error;

static BUCKET_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<Key>([^<]+)</Key>").unwrap());

/// Version labels and anchor hrefs, in document order.
static PAGE_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)Version:?\s*([0-9][0-9.]*)|<a\s[^>]*href\s*=\s*["']([^"']+)["']"#).unwrap()
});

/// One URL from a listing, not yet confirmed to match the desired
/// platform or version. The version is inferred from the listing shape
/// (path segment, release tag, or page label) and may be absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub url: Url,
    pub version: Option<String>,
}

impl Candidate {
    pub fn new(url: Url, version: Option<String>) -> Self {
        Candidate { url, version }
    }

    /// The last path segment (the artifact filename).
    pub fn file_name(&self) -> &str {
        self.url
            .path_segments()
            .and_then(|mut s| s.next_back())
            .unwrap_or_default()
    }
}

/// How a driver's releases are enumerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingStrategy {
    /// XML storage-bucket index at the driver URL.
    BucketIndex,
    /// GitHub releases API feed at the driver URL.
    GitHubReleases,
    /// HTML download page at the driver URL.
    DownloadPage,
}

/// Parses a storage-bucket XML index into candidates.
///
/// Keys look like `2.46/chromedriver_linux64.zip`; the version is the
/// first key segment. Keys without a version directory (e.g. the
/// `LATEST_RELEASE` marker objects) are skipped.
pub fn parse_bucket_index(xml: &str, base: &Url, source_name: &str) -> Result<Vec<Candidate>, Error> {
    let mut candidates = Vec::new();
    for capture in BUCKET_KEY_RE.captures_iter(xml) {
        let key = &capture[1];
        let Some((version, file)) = key.split_once('/') else {
            continue;
        };
        if file.is_empty() {
            continue;
        }
        let url = base.join(key).map_err(|e| Error::MalformedListingUrl {
            url: key.to_string(),
            source_name: source_name.to_string(),
            source: e,
        })?;
        candidates.push(Candidate::new(url, Some(version.to_string())));
    }
    Ok(candidates)
}

/// One release in a GitHub releases feed.
#[derive(Debug, Deserialize)]
pub struct GitHubRelease {
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<GitHubAsset>,
}

#[derive(Debug, Deserialize)]
pub struct GitHubAsset {
    pub browser_download_url: String,
}

/// Flattens GitHub releases into candidates.
///
/// The version comes from the release tag, normalized by the caller
/// (publishers prefix tags with "v" or "v." inconsistently).
pub fn github_candidates(
    releases: &[GitHubRelease],
    normalize_tag: impl Fn(&str) -> String,
    source_name: &str,
) -> Result<Vec<Candidate>, Error> {
    let mut candidates = Vec::new();
    for release in releases {
        let version = normalize_tag(&release.tag_name);
        for asset in &release.assets {
            let url =
                Url::parse(&asset.browser_download_url).map_err(|e| Error::MalformedListingUrl {
                    url: asset.browser_download_url.clone(),
                    source_name: source_name.to_string(),
                    source: e,
                })?;
            candidates.push(Candidate::new(url, Some(version.clone())));
        }
    }
    Ok(candidates)
}

/// Scrapes an HTML download page into `(version, url)` candidates.
///
/// The page is scanned linearly: a version label ("Version: 91.0.864.41"
/// or "Version 2.1.1") opens a group, and every following anchor href is
/// attributed to it until the next label. Anchors appearing before any
/// label are dropped.
pub fn parse_download_page(
    html: &str,
    base: &Url,
    source_name: &str,
) -> Result<Vec<Candidate>, Error> {
    let mut candidates = Vec::new();
    let mut current_version: Option<String> = None;
    for capture in PAGE_TOKEN_RE.captures_iter(html) {
        if let Some(version) = capture.get(1) {
            current_version = Some(version.as_str().trim_end_matches('.').to_string());
        } else if let Some(href) = capture.get(2) {
            let Some(version) = current_version.clone() else {
                continue;
            };
            let href = href.as_str();
            let lower = href.to_ascii_lowercase();
            if !lower.contains("driver") && !lower.contains("phantomjs") {
                continue;
            }
            let url = base.join(href).map_err(|e| Error::MalformedListingUrl {
                url: href.to_string(),
                source_name: source_name.to_string(),
                source: e,
            })?;
            candidates.push(Candidate::new(url, Some(version)));
        }
    }
    Ok(candidates)
}

/// Parses a mirror directory index.
///
/// Mirrors republish bucket-style listings but under an extra path
/// prefix, so the version is inferred from the second-to-last URL path
/// segment instead of the first key segment.
pub fn parse_mirror_index(
    xml: &str,
    base: &Url,
    source_name: &str,
) -> Result<Vec<Candidate>, Error> {
    let mut candidates = parse_bucket_index(xml, base, source_name)?;
    for candidate in &mut candidates {
        candidate.version = mirror_version(&candidate.url);
    }
    Ok(candidates)
}

/// Second-to-last path segment, the mirror layout's version directory.
pub fn mirror_version(url: &Url) -> Option<String> {
    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    if segments.len() < 2 {
        return None;
    }
    Some(segments[segments.len() - 2].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://chromedriver.storage.googleapis.com/").unwrap()
    }

    #[test]
    fn bucket_index_yields_versioned_candidates() {
        let xml = r#"<?xml version="1.0"?>
            <ListBucketResult>
              <Contents><Key>2.21/chromedriver_linux64.zip</Key></Contents>
              <Contents><Key>2.21/chromedriver_win32.zip</Key></Contents>
              <Contents><Key>2.22/chromedriver_mac32.zip</Key></Contents>
              <Contents><Key>LATEST_RELEASE</Key></Contents>
            </ListBucketResult>"#;
        let candidates = parse_bucket_index(xml, &base(), "primary").unwrap();
        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0].version.as_deref(), Some("2.21"));
        assert_eq!(
            candidates[0].url.as_str(),
            "https://chromedriver.storage.googleapis.com/2.21/chromedriver_linux64.zip"
        );
        assert_eq!(candidates[2].version.as_deref(), Some("2.22"));
    }

    #[test]
    fn github_feed_flattens_assets_with_normalized_tags() {
        let json = r#"[
            {"tag_name": "v0.29.1", "assets": [
                {"browser_download_url": "https://github.com/mozilla/geckodriver/releases/download/v0.29.1/geckodriver-v0.29.1-linux64.tar.gz"},
                {"browser_download_url": "https://github.com/mozilla/geckodriver/releases/download/v0.29.1/geckodriver-v0.29.1-win64.zip"}
            ]},
            {"tag_name": "v0.28.0", "assets": []}
        ]"#;
        let releases: Vec<GitHubRelease> = serde_json::from_str(json).unwrap();
        let candidates =
            github_candidates(&releases, |t| t.trim_start_matches('v').to_string(), "github")
                .unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].version.as_deref(), Some("0.29.1"));
        assert!(candidates[1].url.as_str().ends_with("win64.zip"));
    }

    #[test]
    fn download_page_groups_anchors_under_version_labels() {
        let html = r#"
            <p>Version: 91.0.864.41</p>
            <a href="https://msedgedriver.azureedge.net/91.0.864.41/edgedriver_win64.zip">x64</a>
            <a href="https://msedgedriver.azureedge.net/91.0.864.41/edgedriver_win32.zip">x86</a>
            <p>Version: 6.17134</p>
            <a href="https://download.example.com/legacy/MicrosoftWebDriver.exe">driver</a>
        "#;
        let page_base = Url::parse("https://developer.microsoft.com/en-us/microsoft-edge/").unwrap();
        let candidates = parse_download_page(html, &page_base, "primary").unwrap();
        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0].version.as_deref(), Some("91.0.864.41"));
        assert_eq!(candidates[2].version.as_deref(), Some("6.17134"));
        assert!(candidates[2].url.as_str().ends_with("MicrosoftWebDriver.exe"));
    }

    #[test]
    fn anchors_before_any_version_label_are_dropped() {
        let html = r#"<a href="https://x.example/edgedriver_win64.zip">stray</a>"#;
        let page_base = Url::parse("https://x.example/").unwrap();
        assert!(parse_download_page(html, &page_base, "primary").unwrap().is_empty());
    }

    #[test]
    fn mirror_version_is_second_to_last_segment() {
        let url =
            Url::parse("https://npmmirror.com/mirrors/chromedriver/2.46/chromedriver_linux64.zip")
                .unwrap();
        assert_eq!(mirror_version(&url).as_deref(), Some("2.46"));
    }

    #[test]
    fn mirror_index_reinfers_versions_from_path() {
        let xml = "<Contents><Key>mirrors/chromedriver/2.46/chromedriver_linux64.zip</Key></Contents>";
        let mirror_base = Url::parse("https://npmmirror.com/").unwrap();
        let candidates = parse_mirror_index(xml, &mirror_base, "mirror").unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].version.as_deref(), Some("2.46"));
    }
}
