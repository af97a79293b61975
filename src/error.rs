use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error type for all possible failures in the library.
///
/// Every public operation surfaces failures as this one type; callers only
/// ever need to catch `Error`.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid value '{value}' for setting '{key}': {source}")]
    InvalidUri {
        key: String,
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid value '{value}' for setting '{key}': not a number")]
    InvalidNumber { key: String, value: String },

    #[error("Version string is empty or missing")]
    EmptyVersion,

    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to parse JSON response from '{url}': {source}")]
    JsonParse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed URL '{url}' in listing from {source_name}: {source}")]
    MalformedListingUrl {
        url: String,
        source_name: String,
        #[source]
        source: url::ParseError,
    },

    #[error(
        "No candidate found for {driver} version '{version}' on platform '{platform}' (source: {source_name})"
    )]
    VersionNotFound {
        driver: String,
        version: String,
        platform: String,
        source_name: String,
    },

    #[error("No candidates at all for {driver} on platform '{platform}' (source: {source_name})")]
    NoCandidates {
        driver: String,
        platform: String,
        source_name: String,
    },

    #[error(
        "{count} candidates for {driver} carry no recognizable architecture token; refusing to guess"
    )]
    AmbiguousArtifacts { driver: String, count: usize },

    #[error("Driver type '{0}' has no downloadable driver")]
    UnsupportedDriver(String),

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("I/O error accessing path {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to decompress zip file {path:?}: {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Driver executable not found in the downloaded archive at {path:?}")]
    ExecutableNotFound { path: PathBuf },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
