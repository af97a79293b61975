//! Dotted version string comparison.
//!
//! Driver releases are versioned with dot-separated numeric components
//! ("2.46", "91.0.4472.101"). Comparison is component-wise numeric.
//! Two deliberate lenience rules are preserved from the behavior callers
//! already depend on and must not be extended to new formats:
//!
//! - a component that does not parse as an integer makes the remainder of
//!   the two versions compare equal;
//! - a shorter version is equal to a longer one in the unpaired trailing
//!   components ("1.2" equals "1.2.9").

use std::cmp::Ordering;

use crate::error::Error;

/// Compares two dotted version strings.
///
/// Fails only when either input is empty.
pub fn compare_versions(a: &str, b: &str) -> Result<Ordering, Error> {
    if a.trim().is_empty() || b.trim().is_empty() {
        return Err(Error::EmptyVersion);
    }
    for (x, y) in a.split('.').zip(b.split('.')) {
        let (x, y) = match (x.parse::<u64>(), y.parse::<u64>()) {
            (Ok(x), Ok(y)) => (x, y),
            // Opaque component: the rest compares equal.
            _ => return Ok(Ordering::Equal),
        };
        match x.cmp(&y) {
            Ordering::Equal => continue,
            other => return Ok(other),
        }
    }
    Ok(Ordering::Equal)
}

/// True when the two versions compare equal under the lenient rules.
pub fn versions_equal(a: &str, b: &str) -> bool {
    matches!(compare_versions(a, b), Ok(Ordering::Equal))
}

/// Picks the highest version from an iterator, or `None` when it is empty.
pub fn latest_of<'a, I>(versions: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    versions.into_iter().reduce(|best, candidate| {
        match compare_versions(candidate, best) {
            Ok(Ordering::Greater) => candidate,
            _ => best,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_numeric_per_component() {
        assert_eq!(compare_versions("1.2.3.4", "1.2.3.5").unwrap(), Ordering::Less);
        assert_eq!(compare_versions("2.2.3.4", "1.2.3.4").unwrap(), Ordering::Greater);
        // Numeric, not lexicographic.
        assert_eq!(compare_versions("10.0", "9.0").unwrap(), Ordering::Greater);
    }

    #[test]
    fn comparison_is_antisymmetric_and_reflexive() {
        let samples = ["1.2.3.4", "2.46", "91.0.4472.101", "0.29.1"];
        for a in samples {
            assert_eq!(compare_versions(a, a).unwrap(), Ordering::Equal);
            for b in samples {
                let ab = compare_versions(a, b).unwrap();
                let ba = compare_versions(b, a).unwrap();
                assert_eq!(ab, ba.reverse());
            }
        }
    }

    #[test]
    fn shorter_version_equals_longer_prefix() {
        assert_eq!(compare_versions("1.2", "1.2.9").unwrap(), Ordering::Equal);
        assert_eq!(compare_versions("1.2.9", "1.2").unwrap(), Ordering::Equal);
    }

    #[test]
    fn non_numeric_component_compares_equal() {
        assert_eq!(compare_versions("1.beta.5", "1.beta.9").unwrap(), Ordering::Equal);
        assert_eq!(compare_versions("1.x", "1.2").unwrap(), Ordering::Equal);
        // But a numeric difference before the opaque part still decides.
        assert_eq!(compare_versions("2.x", "1.2").unwrap(), Ordering::Greater);
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(compare_versions("", "1.0"), Err(Error::EmptyVersion)));
        assert!(matches!(compare_versions("1.0", " "), Err(Error::EmptyVersion)));
    }

    #[test]
    fn latest_of_picks_maximum() {
        let versions = ["2.40", "2.46", "2.9", "2.46.1"];
        assert_eq!(latest_of(versions), Some("2.46"));
        assert_eq!(latest_of([]), None);
    }
}
