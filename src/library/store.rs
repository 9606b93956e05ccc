use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};

use super::metadata::{display_name, read_local};
use super::model::SoundRecord;

/// A flat directory of downloaded clips, one file per `filename`.
///
/// The directory listing is the index; there is no manifest.
#[derive(Debug, Clone)]
pub struct LibraryStore {
    root: PathBuf,
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

impl LibraryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the blob for `filename` lives (whether or not it exists).
    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    pub fn exists(&self, filename: &str) -> bool {
        !filename.is_empty() && self.path_for(filename).is_file()
    }

    /// Create the storage root if needed. Safe to call repeatedly.
    pub fn ensure_directory(&self) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|source| Error::Io {
            path: self.root.clone(),
            source,
        })
    }

    /// Filenames of all clips in the root, in filesystem order.
    pub fn list(&self) -> Vec<String> {
        if !self.root.is_dir() {
            return Vec::new();
        }

        WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()))
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .collect()
    }

    /// Remove a clip. The caller drops the matching in-memory record.
    pub fn delete(&self, filename: &str) -> Result<()> {
        if filename.is_empty() {
            return Err(Error::DeleteNotFound(filename.to_string()));
        }
        let path = self.path_for(filename);
        match fs::remove_file(&path) {
            Ok(()) => {
                log::info!("deleted {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(Error::DeleteNotFound(filename.to_string()))
            }
            Err(source) => Err(Error::Io { path, source }),
        }
    }

    /// Build list entries for every downloaded clip, sorted by name.
    ///
    /// Tags are read eagerly so the title can be used as the row name.
    pub fn local_records(&self) -> Vec<SoundRecord> {
        let mut records: Vec<SoundRecord> = self
            .list()
            .into_iter()
            .map(|filename| {
                let path = self.path_for(&filename);
                let metadata = read_local(&path);
                let mut record = SoundRecord::local(display_name(&path, &metadata), filename);
                if !metadata.is_empty() {
                    record.metadata = Some(metadata);
                }
                record
            })
            .collect();

        records.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        records
    }
}
