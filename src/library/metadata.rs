//! Tag extraction for library clips and catalog previews.
//!
//! Metadata never blocks a record from being shown: every failure is logged
//! and turned into an empty `AudioMetadata`.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use lofty::file::TaggedFile;
use lofty::prelude::*;
use lofty::probe::Probe;
use reqwest::blocking::Client;

use super::model::{AudioMetadata, CoverImage};

/// Where to read tags from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataSource {
    Local(PathBuf),
    /// Fetched fully into memory before parsing.
    Remote(String),
}

/// Reads tags from local files or remote clips.
#[derive(Clone)]
pub struct MetadataReader {
    http: Client,
}

impl MetadataReader {
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    pub fn read(&self, source: &MetadataSource) -> AudioMetadata {
        match source {
            MetadataSource::Local(path) => read_local(path),
            MetadataSource::Remote(url) => self.read_remote(url),
        }
    }

    fn read_remote(&self, url: &str) -> AudioMetadata {
        let bytes = match self
            .http
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.bytes())
        {
            Ok(b) => b,
            Err(e) => {
                log::debug!("metadata fetch failed for {url}: {e}");
                return AudioMetadata::default();
            }
        };

        let parsed = Probe::new(Cursor::new(bytes.as_ref()))
            .guess_file_type()
            .map_err(lofty::error::LoftyError::from)
            .and_then(|p| p.read());
        match parsed {
            Ok(tagged) => from_tagged(&tagged),
            Err(e) => {
                log::debug!("no readable tags in {url}: {e}");
                AudioMetadata::default()
            }
        }
    }
}

/// Read tags from a file on disk.
pub fn read_local(path: &Path) -> AudioMetadata {
    match lofty::read_from_path(path) {
        Ok(tagged) => from_tagged(&tagged),
        Err(e) => {
            log::debug!("no readable tags in {}: {e}", path.display());
            AudioMetadata::default()
        }
    }
}

fn clean(v: Option<std::borrow::Cow<'_, str>>) -> Option<String> {
    v.map(|s| s.trim_matches(|c: char| c == '\0' || c.is_whitespace()).to_string())
        .filter(|s| !s.is_empty())
}

fn from_tagged(tagged: &TaggedFile) -> AudioMetadata {
    let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) else {
        return AudioMetadata::default();
    };

    let cover = tag
        .pictures()
        .iter()
        .find(|p| !p.data().is_empty())
        .map(|p| CoverImage {
            mime_type: p.mime_type().map(|m| m.as_str().to_string()),
            data: p.data().to_vec(),
        });

    AudioMetadata {
        title: clean(tag.title()),
        artist: clean(tag.artist()),
        album: clean(tag.album()),
        cover,
    }
}

/// Row name for a library clip: the title tag, else the file stem.
pub fn display_name(path: &Path, metadata: &AudioMetadata) -> String {
    if let Some(title) = metadata.title.as_deref() {
        return title.to_string();
    }
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or("UNKNOWN")
        .to_string()
}
