//! Process-execution capability and installed-browser version detection.
//!
//! Detection is always optional: a browser that cannot be found or
//! queried yields `None` ("undetected"), never an error, and the caller
//! falls through to its next version-resolution strategy.

use std::path::{Path, PathBuf};

use tracing::debug;

/// Runs a command and returns its trimmed stdout.
///
/// Nonzero exit, spawn failure and empty output all yield `None`.
pub async fn run_and_capture(command: &str, args: &[&str]) -> Option<String> {
    let output = tokio::process::Command::new(command)
        .args(args)
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim().to_string();
    if text.is_empty() { None } else { Some(text) }
}

/// Detects the version of an installed browser, e.g. "91.0.4472.114".
///
/// If `path_override` is given it is queried directly; otherwise the
/// browser is looked up in standard system locations. On Windows the
/// version comes from a PowerShell file-version query; elsewhere from
/// the browser's own version flag.
pub async fn installed_browser_version(
    browser_name: &str,
    path_override: Option<&Path>,
) -> Option<String> {
    let path = match path_override {
        Some(p) => p.to_path_buf(),
        None => find_browser_path(browser_name)?,
    };
    let version = version_on_platform(browser_name, &path).await;
    match &version {
        Some(v) => debug!(browser = browser_name, version = %v, "detected installed browser"),
        None => debug!(browser = browser_name, "browser version undetected"),
    }
    version
}

#[cfg(target_os = "windows")]
fn find_browser_path(browser_name: &str) -> Option<PathBuf> {
    let program_files = std::env::var("ProgramFiles").ok()?;
    let program_files_x86 = std::env::var("ProgramFiles(x86)").ok()?;
    let local_appdata = std::env::var("LOCALAPPDATA").ok()?;

    let (sub_path, exe_name) = match browser_name {
        "chrome" => ("Google\\Chrome\\Application", "chrome.exe"),
        "firefox" => ("Mozilla Firefox", "firefox.exe"),
        "edge" => ("Microsoft\\Edge\\Application", "msedge.exe"),
        "opera" => ("Opera", "opera.exe"),
        _ => return None,
    };

    [program_files, program_files_x86, local_appdata]
        .into_iter()
        .map(|base| Path::new(&base).join(sub_path).join(exe_name))
        .find(|path| path.exists())
}

#[cfg(target_os = "macos")]
fn find_browser_path(browser_name: &str) -> Option<PathBuf> {
    let path_str = match browser_name {
        "chrome" => "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "firefox" => "/Applications/Firefox.app/Contents/MacOS/firefox",
        "edge" => "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
        "opera" => "/Applications/Opera.app/Contents/MacOS/Opera",
        _ => return None,
    };
    let path = PathBuf::from(path_str);
    if path.exists() { Some(path) } else { None }
}

#[cfg(target_os = "linux")]
fn find_browser_path(browser_name: &str) -> Option<PathBuf> {
    let candidates: &[&str] = match browser_name {
        "chrome" => &[
            "google-chrome",
            "google-chrome-stable",
            "chromium-browser",
            "chromium",
        ],
        "firefox" => &["firefox"],
        "edge" => &["microsoft-edge", "microsoft-edge-stable"],
        "opera" => &["opera"],
        _ => return None,
    };

    candidates.iter().find_map(|name| which::which(name).ok())
}

#[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
fn find_browser_path(_browser_name: &str) -> Option<PathBuf> {
    None
}

#[cfg(target_os = "windows")]
async fn version_on_platform(_browser_name: &str, path: &Path) -> Option<String> {
    let query = format!(
        "(Get-Item '{}').VersionInfo.ProductVersion",
        path.to_string_lossy()
    );
    let output = run_and_capture("powershell", &["-Command", &query]).await?;
    first_version_token(&output)
}

#[cfg(not(target_os = "windows"))]
async fn version_on_platform(browser_name: &str, path: &Path) -> Option<String> {
    // Firefox answers -V everywhere; the Chromium family uses --version.
    let version_arg = if browser_name == "firefox" { "-V" } else { "--version" };
    let output = run_and_capture(&path.to_string_lossy(), &[version_arg]).await?;
    first_version_token(&output)
}

/// First whitespace-delimited token that looks like a dotted version.
fn first_version_token(output: &str) -> Option<String> {
    output
        .split_whitespace()
        .find(|token| {
            token.chars().next().is_some_and(|c| c.is_ascii_digit()) && token.contains('.')
        })
        .map(str::to_string)
}

/// Major (first) component of a dotted version string.
pub fn major_version(version: &str) -> &str {
    version.split('.').next().unwrap_or(version)
}
