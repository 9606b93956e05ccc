use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

use crate::catalog::Catalog;
use crate::error::Result;
use crate::library::{AudioMetadata, LibraryStore, MetadataReader, MetadataSource, SoundRecord};

/// Completions of UI-side background work (searches, metadata lookups, library listings).
pub enum AppEvent {
    SearchFinished {
        query: String,
        result: Result<Vec<SoundRecord>>,
    },
    MetadataLoaded {
        filename: String,
        metadata: AudioMetadata,
    },
    LibraryListed(Vec<SoundRecord>),
}

/// Runs blocking network work off the UI thread and reports back as `AppEvent`s.
pub struct Background {
    catalog: Arc<dyn Catalog>,
    metadata: MetadataReader,
    tx: Sender<AppEvent>,
}

impl Background {
    pub fn new(catalog: Arc<dyn Catalog>, metadata: MetadataReader, tx: Sender<AppEvent>) -> Self {
        Self {
            catalog,
            metadata,
            tx,
        }
    }

    pub fn search(&self, query: String) {
        let catalog = Arc::clone(&self.catalog);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = catalog.search(&query);
            let _ = tx.send(AppEvent::SearchFinished { query, result });
        });
    }

    /// Re-read the library directory; naming rows reads every clip's tags.
    pub fn list_library(&self, store: LibraryStore) {
        let tx = self.tx.clone();
        thread::spawn(move || {
            let _ = tx.send(AppEvent::LibraryListed(store.local_records()));
        });
    }

    pub fn load_metadata(&self, filename: String, source: MetadataSource) {
        let reader = self.metadata.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let metadata = reader.read(&source);
            let _ = tx.send(AppEvent::MetadataLoaded { filename, metadata });
        });
    }
}
