//! Narrowing a raw candidate list down to the target platform.
//!
//! All filters are pure, non-mutating and order-preserving: they take the
//! candidate list by value and hand back the survivors in their original
//! order. Tokens are matched against the artifact filename only, so a
//! version directory like `2.64/` cannot masquerade as an "64" tag.

use crate::error::Error;
use crate::listing::Candidate;
use crate::platform::{Architecture, OperatingSystem};

const ALL_ARCH_TOKENS: &[&str] = &["x64", "amd64", "x86", "i686", "64", "32"];

/// Keeps candidates tagged for the requested operating system.
///
/// macOS artifacts are tagged "mac", "osx" or "darwin" depending on the
/// publisher; all survive a MAC filter, and "darwin" never counts as a
/// "win" hit. A single candidate carrying no OS tag at all passes
/// through unchanged (some drivers ship one artifact for every
/// platform).
pub fn filter_by_os(candidates: Vec<Candidate>, os: OperatingSystem) -> Vec<Candidate> {
    let matched: Vec<Candidate> = candidates
        .iter()
        .filter(|c| {
            let name = c.file_name().to_ascii_lowercase();
            if os == OperatingSystem::Win && name.contains("darwin") {
                return false;
            }
            os.tokens().iter().any(|token| name.contains(token))
        })
        .cloned()
        .collect();
    if !matched.is_empty() {
        return matched;
    }
    if candidates.len() == 1 {
        return candidates;
    }
    Vec::new()
}

/// Keeps candidates tagged for the requested architecture.
///
/// Architecture tokens are tried in priority order and the first token
/// with any hit decides: filtering X32 over {x86, 32, i686}-tagged URLs
/// selects the "x86" one, mirroring how publishers disambiguate. A
/// 32-bit request never matches an artifact that also carries a 64-bit
/// tag: "x86_64" contains the substring "x86" but is a 64-bit artifact.
/// When no requested token matches anything, a single tag-less candidate
/// passes through (permissive fallback); several tag-less candidates
/// cannot be told apart and are an error rather than a guess.
pub fn filter_by_arch(
    candidates: Vec<Candidate>,
    arch: Architecture,
    driver_name: &str,
) -> Result<Vec<Candidate>, Error> {
    let excluded: &[&str] = match arch.effective() {
        Architecture::X32 => Architecture::X64.tokens(),
        _ => &[],
    };
    for token in arch.tokens() {
        let matched: Vec<Candidate> = candidates
            .iter()
            .filter(|c| {
                let name = c.file_name().to_ascii_lowercase();
                name.contains(token) && !excluded.iter().any(|t| name.contains(t))
            })
            .cloned()
            .collect();
        if !matched.is_empty() {
            return Ok(matched);
        }
    }

    let untagged: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| {
            let name = c.file_name().to_ascii_lowercase();
            !ALL_ARCH_TOKENS.iter().any(|token| name.contains(token))
        })
        .collect();
    match untagged.len() {
        0 | 1 => Ok(untagged),
        count => Err(Error::AmbiguousArtifacts {
            driver: driver_name.to_string(),
            count,
        }),
    }
}

/// Drops candidates whose inferred version is on the ignore list.
pub fn filter_by_ignored_versions(
    candidates: Vec<Candidate>,
    ignored: &[String],
) -> Vec<Candidate> {
    if ignored.is_empty() {
        return candidates;
    }
    candidates
        .into_iter()
        .filter(|c| match &c.version {
            Some(v) => !ignored.iter().any(|ignored| ignored == v),
            None => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn candidate(url: &str) -> Candidate {
        let url = Url::parse(url).unwrap();
        let version = crate::listing::mirror_version(&url);
        Candidate::new(url, version)
    }

    fn arch_tagged() -> Vec<Candidate> {
        vec![
            candidate("https://example.com/2.1/driver_x86.zip"),
            candidate("https://example.com/2.1/driver_64.zip"),
            candidate("https://example.com/2.1/driver_i686.zip"),
            candidate("https://example.com/2.1/driver_32.zip"),
        ]
    }

    #[test]
    fn arch_filter_is_exact_when_unambiguous() {
        let x32 = filter_by_arch(arch_tagged(), Architecture::X32, "driver").unwrap();
        assert_eq!(x32.len(), 1);
        assert!(x32[0].file_name().contains("x86"));

        let x64 = filter_by_arch(arch_tagged(), Architecture::X64, "driver").unwrap();
        assert_eq!(x64.len(), 1);
        assert!(x64[0].file_name().contains("64"));
    }

    #[test]
    fn arch_filter_passes_single_untagged_candidate_through() {
        let lone = vec![candidate("https://example.com/3.9/driver_generic.zip")];
        let filtered = filter_by_arch(lone.clone(), Architecture::X32, "driver").unwrap();
        assert_eq!(filtered, lone);
        let filtered = filter_by_arch(lone.clone(), Architecture::X64, "driver").unwrap();
        assert_eq!(filtered, lone);
    }

    #[test]
    fn arch_filter_rejects_multiple_untagged_candidates() {
        let ambiguous = vec![
            candidate("https://example.com/3.9/driver_a.zip"),
            candidate("https://example.com/3.9/driver_b.zip"),
        ];
        let result = filter_by_arch(ambiguous, Architecture::X64, "driver");
        assert!(matches!(result, Err(Error::AmbiguousArtifacts { count: 2, .. })));
    }

    #[test]
    fn x86_64_artifact_is_never_a_32_bit_match() {
        // PhantomJS-style pair: "x86_64" embeds the substring "x86" but
        // is the 64-bit artifact.
        let pair = || {
            vec![
                candidate("https://example.com/2.1.1/phantomjs-2.1.1-linux-x86_64.tar.gz"),
                candidate("https://example.com/2.1.1/phantomjs-2.1.1-linux-i686.tar.gz"),
            ]
        };
        let x32 = filter_by_arch(pair(), Architecture::X32, "phantomjs").unwrap();
        assert_eq!(x32.len(), 1);
        assert!(x32[0].file_name().contains("i686"));

        let x64 = filter_by_arch(pair(), Architecture::X64, "phantomjs").unwrap();
        assert_eq!(x64.len(), 1);
        assert!(x64[0].file_name().contains("x86_64"));
    }

    #[test]
    fn arch_filter_ignores_version_directory_digits() {
        // "2.64" in the path must not count as an x64 tag.
        let urls = vec![
            candidate("https://example.com/2.64/driver_linux32.zip"),
            candidate("https://example.com/2.64/driver_linux64.zip"),
        ];
        let x32 = filter_by_arch(urls, Architecture::X32, "driver").unwrap();
        assert_eq!(x32.len(), 1);
        assert!(x32[0].file_name().contains("linux32"));
    }

    #[test]
    fn os_filter_matches_both_mac_spellings() {
        let urls = vec![
            candidate("https://example.com/1.0/driver_win.zip"),
            candidate("https://example.com/1.0/driver_mac.zip"),
            candidate("https://example.com/1.0/driver_osx.zip"),
            candidate("https://example.com/1.0/driver_linux.zip"),
        ];
        assert_eq!(filter_by_os(urls.clone(), OperatingSystem::Mac).len(), 2);
        assert_eq!(filter_by_os(urls.clone(), OperatingSystem::Win).len(), 1);
        assert_eq!(filter_by_os(urls, OperatingSystem::Linux).len(), 1);
    }

    #[test]
    fn darwin_tag_counts_as_mac_not_win() {
        let urls = vec![
            candidate("https://example.com/1.0/driver_win64.zip"),
            candidate("https://example.com/1.0/driver_darwin64.tar.gz"),
        ];
        let mac = filter_by_os(urls.clone(), OperatingSystem::Mac);
        assert_eq!(mac.len(), 1);
        assert!(mac[0].file_name().contains("darwin"));

        let win = filter_by_os(urls, OperatingSystem::Win);
        assert_eq!(win.len(), 1);
        assert!(win[0].file_name().contains("win64"));
    }

    #[test]
    fn os_filter_passes_single_untagged_candidate_through() {
        let lone = vec![candidate("https://example.com/3.9/driver.jar")];
        assert_eq!(filter_by_os(lone.clone(), OperatingSystem::Win), lone);
    }

    #[test]
    fn ignored_versions_are_removed() {
        let urls = vec![
            candidate("https://example.com/2.45/driver_linux64.zip"),
            candidate("https://example.com/2.46/driver_linux64.zip"),
        ];
        let kept = filter_by_ignored_versions(urls, &["2.46".to_string()]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].version.as_deref(), Some("2.45"));
    }
}
