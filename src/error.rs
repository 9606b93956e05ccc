//! Error taxonomy shared by the catalog, library and session modules.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Search or metadata fetch failed at the transport or HTTP level.
    #[error("network error: {0}")]
    Network(String),

    /// The downloader exited unsuccessfully (or could not be started).
    /// `code` is the downloader's exit code when it ran at all.
    #[error("failed to download {filename}: {reason}")]
    Download {
        filename: String,
        code: Option<i32>,
        reason: String,
    },

    /// The external player could not be started.
    #[error("failed to start {program}: {source}")]
    PlaybackSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no such clip in library: {0}")]
    DeleteNotFound(String),

    /// A local-only record whose blob is gone has nothing to download from.
    #[error("{0} is not downloaded and has no source url")]
    MissingSource(String),

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
