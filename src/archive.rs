//! Archive extraction: zip, tar.gz and raw-gz single files.
//!
//! Extraction is synchronous at the core (the zip and tar crates work on
//! blocking readers), so it runs under `spawn_blocking` to keep the
//! runtime free. A file that is not a recognized archive (e.g. the
//! selenium `.jar` or a bare `.exe`) is returned as-is.

use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Error;

/// Extracts `archive` into `dest` and returns the extracted file paths.
pub async fn extract(archive: &Path, dest: &Path) -> Result<Vec<PathBuf>, Error> {
    let name = archive
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let archive = archive.to_path_buf();
    let dest = dest.to_path_buf();
    let extracted = if name.ends_with(".zip") {
        run_blocking(move || unzip(&archive, &dest)).await?
    } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        run_blocking(move || untar_gz(&archive, &dest)).await?
    } else if name.ends_with(".gz") {
        run_blocking(move || gunzip(&archive, &dest)).await?
    } else {
        // Not an archive; the artifact is the file itself.
        vec![archive]
    };
    debug!(files = extracted.len(), "extraction finished");
    Ok(extracted)
}

async fn run_blocking<T: Send + 'static>(
    f: impl FnOnce() -> Result<T, Error> + Send + 'static,
) -> Result<T, Error> {
    // Panics from the blocking task propagate.
    tokio::task::spawn_blocking(f).await.unwrap()
}

fn unzip(archive_path: &Path, extract_to: &Path) -> Result<Vec<PathBuf>, Error> {
    let file = std::fs::File::open(archive_path).map_err(|e| Error::io(archive_path, e))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| Error::Zip {
        path: archive_path.to_path_buf(),
        source: e,
    })?;

    std::fs::create_dir_all(extract_to).map_err(|e| Error::io(extract_to, e))?;

    let mut extracted = Vec::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).map_err(|e| Error::Zip {
            path: archive_path.to_path_buf(),
            source: e,
        })?;

        let outpath = match file.enclosed_name() {
            Some(path) => extract_to.join(path),
            None => continue,
        };

        if file.name().ends_with('/') {
            std::fs::create_dir_all(&outpath).map_err(|e| Error::io(&outpath, e))?;
        } else {
            if let Some(parent) = outpath.parent() {
                if !parent.exists() {
                    std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
                }
            }

            let mut outfile =
                std::fs::File::create(&outpath).map_err(|e| Error::io(&outpath, e))?;
            std::io::copy(&mut file, &mut outfile).map_err(|e| Error::io(&outpath, e))?;

            // Restore executable bits recorded in the archive.
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Some(mode) = file.unix_mode() {
                    std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode))
                        .map_err(|e| Error::io(&outpath, e))?;
                }
            }

            extracted.push(outpath);
        }
    }
    Ok(extracted)
}

fn untar_gz(archive_path: &Path, extract_to: &Path) -> Result<Vec<PathBuf>, Error> {
    let file = std::fs::File::open(archive_path).map_err(|e| Error::io(archive_path, e))?;
    let decoder = flate2::read::GzDecoder::new(file);
    let mut archive = tar::Archive::new(decoder);
    archive.set_preserve_permissions(true);

    std::fs::create_dir_all(extract_to).map_err(|e| Error::io(extract_to, e))?;

    let mut extracted = Vec::new();
    let entries = archive
        .entries()
        .map_err(|e| Error::io(archive_path, e))?;
    for entry in entries {
        let mut entry = entry.map_err(|e| Error::io(archive_path, e))?;
        let relative = entry
            .path()
            .map_err(|e| Error::io(archive_path, e))?
            .into_owned();
        let is_file = entry.header().entry_type().is_file();
        entry
            .unpack_in(extract_to)
            .map_err(|e| Error::io(extract_to, e))?;
        if is_file {
            extracted.push(extract_to.join(relative));
        }
    }
    Ok(extracted)
}

/// Decompresses a single-file gzip artifact; the output keeps the name
/// minus its `.gz` suffix.
fn gunzip(archive_path: &Path, extract_to: &Path) -> Result<Vec<PathBuf>, Error> {
    let file = std::fs::File::open(archive_path).map_err(|e| Error::io(archive_path, e))?;
    let mut decoder = flate2::read::GzDecoder::new(file);
    let mut content = Vec::new();
    decoder
        .read_to_end(&mut content)
        .map_err(|e| Error::io(archive_path, e))?;

    std::fs::create_dir_all(extract_to).map_err(|e| Error::io(extract_to, e))?;
    let name = archive_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("driver.gz")
        .trim_end_matches(".gz")
        .to_string();
    let outpath = extract_to.join(name);
    std::fs::write(&outpath, content).map_err(|e| Error::io(&outpath, e))?;
    Ok(vec![outpath])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn build_zip(dir: &Path) -> PathBuf {
        let path = dir.join("driver.zip");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        writer.add_directory("nested/", options).unwrap();
        writer.start_file("nested/chromedriver", options).unwrap();
        writer.write_all(b"#!/bin/sh\n").unwrap();
        writer.finish().unwrap();
        path
    }

    fn build_tar_gz(dir: &Path) -> PathBuf {
        let path = dir.join("driver.tar.gz");
        let file = std::fs::File::create(&path).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        let mut header = tar::Header::new_gnu();
        header.set_size(10);
        header.set_mode(0o755);
        header.set_cksum();
        builder
            .append_data(&mut header, "geckodriver", &b"#!/bin/sh\n"[..])
            .unwrap();
        builder.into_inner().unwrap().finish().unwrap();
        path
    }

    #[tokio::test]
    async fn zip_extraction_lists_files() {
        let dir = tempfile::tempdir().unwrap();
        let archive = build_zip(dir.path());
        let out = dir.path().join("out");
        let extracted = extract(&archive, &out).await.unwrap();
        assert_eq!(extracted.len(), 1);
        assert!(extracted[0].ends_with("nested/chromedriver"));
        assert!(extracted[0].is_file());
    }

    #[tokio::test]
    async fn tar_gz_extraction_lists_files() {
        let dir = tempfile::tempdir().unwrap();
        let archive = build_tar_gz(dir.path());
        let out = dir.path().join("out");
        let extracted = extract(&archive, &out).await.unwrap();
        assert_eq!(extracted.len(), 1);
        assert!(extracted[0].ends_with("geckodriver"));
    }

    #[tokio::test]
    async fn raw_gz_keeps_name_minus_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("phantomjs.gz");
        let file = std::fs::File::create(&archive).unwrap();
        let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        encoder.write_all(b"binary contents").unwrap();
        encoder.finish().unwrap();

        let out = dir.path().join("out");
        let extracted = extract(&archive, &out).await.unwrap();
        assert_eq!(extracted, vec![out.join("phantomjs")]);
        assert_eq!(std::fs::read(&extracted[0]).unwrap(), b"binary contents");
    }

    #[tokio::test]
    async fn non_archive_passes_through() {
        let dir = tempfile::tempdir().unwrap();
        let jar = dir.path().join("selenium-server-standalone-3.9.1.jar");
        std::fs::write(&jar, b"jarjar").unwrap();
        let extracted = extract(&jar, dir.path()).await.unwrap();
        assert_eq!(extracted, vec![jar]);
    }
}
