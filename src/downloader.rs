//! Download and placement of driver artifacts.
//!
//! The cache layout is a contract, not an implementation detail: callers
//! rely on `{base}/{driver}/{os}{arch}/{version}/{filename}` staying
//! bit-exact across releases. The downloaded archive is kept at that
//! path, with the located executable flattened next to it.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};
use url::Url;

use crate::archive;
use crate::drivers::Driver;
use crate::error::Error;
use crate::http::HttpClient;
use crate::platform::TargetPlatform;

/// Deterministic cache location for a downloaded artifact.
pub fn target_path(
    base: &Path,
    driver_name: &str,
    platform: &TargetPlatform,
    version: &str,
    url: &Url,
) -> PathBuf {
    let file_name = url
        .path_segments()
        .and_then(|mut s| s.next_back())
        .filter(|n| !n.is_empty())
        .unwrap_or(driver_name);
    base.join(driver_name)
        .join(platform.cache_segment())
        .join(version)
        .join(file_name)
}

/// Versioned cache directory for a driver, without the artifact name.
pub fn version_dir(
    base: &Path,
    driver_name: &str,
    platform: &TargetPlatform,
    version: &str,
) -> PathBuf {
    base.join(driver_name)
        .join(platform.cache_segment())
        .join(version)
}

/// Looks for an already-staged executable under a cache directory,
/// ignoring kept archives.
pub fn find_cached_binary(dir: &Path, driver: &dyn Driver, expected: &str) -> Option<PathBuf> {
    let files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file())
        .filter(|p| {
            let name = p
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_ascii_lowercase();
            !(name.ends_with(".zip")
                || name.ends_with(".gz")
                || name.ends_with(".tgz")
                || name.ends_with(".tar"))
        })
        .collect();
    driver.select_executable(&files, expected)
}

/// Downloads `url` and stages the contained executable into the
/// versioned cache directory, returning the executable's final path.
///
/// When the executable is already staged and `force` is unset, nothing
/// is fetched.
pub async fn download_and_stage(
    http: &HttpClient,
    driver: &dyn Driver,
    base: &Path,
    platform: &TargetPlatform,
    version: &str,
    url: &Url,
    force: bool,
) -> Result<PathBuf, Error> {
    let target = target_path(base, driver.driver_name(), platform, version, url);
    let target = driver.pre_download(target, version);
    let dir = target
        .parent()
        .ok_or_else(|| {
            Error::io(
                &target,
                std::io::Error::new(std::io::ErrorKind::NotFound, "target path has no parent"),
            )
        })?
        .to_path_buf();
    let expected = driver.executable_name(platform.os);

    if !force {
        if let Some(existing) = find_cached_binary(&dir, driver, &expected) {
            debug!(path = %existing.display(), "driver already staged, skipping download");
            return Ok(existing);
        }
    }

    fs::create_dir_all(&dir)
        .await
        .map_err(|e| Error::io(&dir, e))?;

    info!(url = %url, target = %target.display(), "downloading driver artifact");
    let bytes = http.get_bytes(url).await?;
    write_via_tempfile(&dir, &target, bytes).await?;

    let extracted = archive::extract(&target, &dir).await?;
    let located = driver
        .select_executable(&extracted, &expected)
        .ok_or_else(|| Error::ExecutableNotFound { path: dir.clone() })?;

    let flatten = driver.rename_to_flat() && located.parent() != Some(dir.as_path());
    let binary = match located.file_name() {
        Some(name) if flatten => {
            let flat = dir.join(name);
            fs::rename(&located, &flat)
                .await
                .map_err(|e| Error::io(&located, e))?;
            remove_extraction_residue(&dir, &located).await;
            flat
        }
        _ => located,
    };

    set_executable(&binary)?;
    info!(path = %binary.display(), "driver staged");
    Ok(binary)
}

/// Writes the artifact through a scratch file in the destination
/// directory so a cancelled download never leaves a half-written
/// archive at the contract path.
async fn write_via_tempfile(dir: &Path, target: &Path, bytes: Vec<u8>) -> Result<(), Error> {
    let dir = dir.to_path_buf();
    let target = target.to_path_buf();
    tokio::task::spawn_blocking(move || {
        use std::io::Write;
        let mut scratch =
            tempfile::NamedTempFile::new_in(&dir).map_err(|e| Error::io(&dir, e))?;
        scratch
            .write_all(&bytes)
            .map_err(|e| Error::io(scratch.path().to_path_buf(), e))?;
        scratch
            .persist(&target)
            .map_err(|e| Error::io(&target, e.error))?;
        Ok(())
    })
    .await
    .unwrap()
}

/// Deletes the now-empty extraction folder the executable was moved out
/// of. Best effort: a leftover folder is untidy, not fatal.
async fn remove_extraction_residue(dir: &Path, located: &Path) {
    let Ok(relative) = located.strip_prefix(dir) else {
        return;
    };
    let Some(top) = relative.components().next() else {
        return;
    };
    let residue = dir.join(top.as_os_str());
    if residue.is_dir() {
        if let Err(e) = fs::remove_dir_all(&residue).await {
            tracing::warn!(path = %residue.display(), error = %e, "could not remove extraction folder");
        }
    }
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<(), Error> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .map_err(|e| Error::io(path, e))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<(), Error> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::DriverKind;
    use crate::platform::{Architecture, OperatingSystem};

    fn linux64() -> TargetPlatform {
        TargetPlatform {
            os: OperatingSystem::Linux,
            arch: Architecture::X64,
        }
    }

    #[test]
    fn target_path_is_bit_exact() {
        let url = Url::parse(
            "http://chromedriver.storage.googleapis.com/2.21/chromedriver_linux64.zip",
        )
        .unwrap();
        let path = target_path(Path::new("/cache"), "chromedriver", &linux64(), "2.21", &url);
        assert_eq!(
            path,
            PathBuf::from("/cache/chromedriver/linux64/2.21/chromedriver_linux64.zip")
        );
    }

    #[test]
    fn version_dir_matches_target_path_parent() {
        let url = Url::parse("http://x/2.21/chromedriver_linux64.zip").unwrap();
        let target = target_path(Path::new("/cache"), "chromedriver", &linux64(), "2.21", &url);
        let dir = version_dir(Path::new("/cache"), "chromedriver", &linux64(), "2.21");
        assert_eq!(target.parent(), Some(dir.as_path()));
    }

    #[test]
    fn cached_binary_is_found_next_to_kept_archive() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("chromedriver_linux64.zip"), b"archive").unwrap();
        std::fs::write(tmp.path().join("chromedriver"), b"binary").unwrap();
        let driver = DriverKind::Chrome.driver();
        let found = find_cached_binary(tmp.path(), driver.as_ref(), "chromedriver");
        assert_eq!(found, Some(tmp.path().join("chromedriver")));
    }

    #[test]
    fn empty_directory_has_no_cached_binary() {
        let tmp = tempfile::tempdir().unwrap();
        let driver = DriverKind::Chrome.driver();
        assert_eq!(find_cached_binary(tmp.path(), driver.as_ref(), "chromedriver"), None);
    }
}
