use std::collections::HashMap;
use std::mem;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

use crate::error::{Error, Result};
use crate::library::{DisplayKind, LibraryStore, SoundRecord};

use super::process::ProcessRunner;
use super::state::{Activation, ClipStatus, Phase, SessionEvent, SessionState};

/// Coordinates one download and one player at a time.
///
/// `activate` is the only entry point the UI uses to change the session.
/// Background work reports back through `SessionEvent`s which are applied
/// with `handle_event` on the same thread; each event carries the generation
/// it was started under and is dropped when the session has moved on.
pub struct SessionManager {
    state: SessionState,
    store: LibraryStore,
    runner: Arc<dyn ProcessRunner>,
    events: Sender<SessionEvent>,
    /// Downloads still running, by filename, with the generation they report under.
    in_flight: HashMap<String, u64>,
}

impl SessionManager {
    pub fn new(
        store: LibraryStore,
        runner: Arc<dyn ProcessRunner>,
        events: Sender<SessionEvent>,
    ) -> Self {
        Self {
            state: SessionState::default(),
            store,
            runner,
            events,
            in_flight: HashMap::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn store(&self) -> &LibraryStore {
        &self.store
    }

    /// True while a relevant download is pending.
    pub fn is_busy(&self) -> bool {
        self.state.downloading_filename().is_some()
    }

    /// True while a download of `filename` is running, even one the session has moved on from.
    pub fn is_downloading(&self, filename: &str) -> bool {
        self.in_flight.contains_key(filename)
    }

    pub fn status_of(&self, filename: &str) -> ClipStatus {
        if filename.is_empty() {
            ClipStatus::Idle
        } else if self.state.active_filename() == Some(filename) {
            ClipStatus::Playing
        } else if self.state.downloading_filename() == Some(filename) {
            ClipStatus::Downloading
        } else {
            ClipStatus::Idle
        }
    }

    /// Play, stop or replace the current clip in response to a row being chosen.
    pub fn activate(&mut self, record: &SoundRecord) -> Result<Activation> {
        match record.kind {
            DisplayKind::SearchPrompt => return Ok(Activation::Search),
            DisplayKind::SectionHeader => return Ok(Activation::Ignored),
            DisplayKind::Entry => {}
        }

        let stopped = self.stop_playback();
        if stopped.as_ref().is_some_and(|p| p.same_clip(record)) {
            log::info!("stopped {}", record.filename);
            return Ok(Activation::Stopped(record.filename.clone()));
        }

        if let Phase::Downloading { record: pending, .. } = &self.state.phase {
            if pending.same_clip(record) {
                log::info!("dropped pending download of {}", record.filename);
                self.state.phase = Phase::Idle;
                return Ok(Activation::Stopped(record.filename.clone()));
            }
            log::debug!("{} supersedes pending {}", record.filename, pending.filename);
            self.state.phase = Phase::Idle;
        }

        // An abandoned download of this clip is still running; wait for it rather than start another.
        if let Some(&generation) = self.in_flight.get(&record.filename) {
            self.state.phase = Phase::Downloading {
                record: record.clone(),
                generation,
            };
            return Ok(Activation::Downloading(record.filename.clone()));
        }

        if self.store.exists(&record.filename) {
            let generation = self.state.next_generation();
            self.launch(record.clone(), generation)?;
            return Ok(Activation::Playing(record.filename.clone()));
        }

        let Some(url) = record.source_url.clone() else {
            return Err(Error::MissingSource(record.filename.clone()));
        };
        self.store.ensure_directory()?;

        let generation = self.state.next_generation();
        self.spawn_download(url, record.filename.clone(), generation);
        self.state.phase = Phase::Downloading {
            record: record.clone(),
            generation,
        };
        Ok(Activation::Downloading(record.filename.clone()))
    }

    /// Apply a background completion. Stale completions are ignored.
    pub fn handle_event(&mut self, event: SessionEvent) -> Result<()> {
        match event {
            SessionEvent::DownloadFinished {
                generation,
                filename,
                result,
            } => {
                if self.in_flight.get(&filename) == Some(&generation) {
                    self.in_flight.remove(&filename);
                }

                match mem::replace(&mut self.state.phase, Phase::Idle) {
                    Phase::Downloading {
                        record,
                        generation: current,
                    } if current == generation && record.filename == filename => match result {
                        Ok(()) => self.launch(record, generation),
                        Err(e) => {
                            log::warn!("{e}");
                            Err(e)
                        }
                    },
                    other => {
                        self.state.phase = other;
                        match result {
                            Ok(()) => log::debug!("download of {filename} finished after it was abandoned"),
                            Err(e) => log::debug!("abandoned download failed: {e}"),
                        }
                        Ok(())
                    }
                }
            }
            SessionEvent::PlaybackExited {
                generation,
                filename,
            } => {
                let current = matches!(
                    &self.state.phase,
                    Phase::Playing { record, generation: g, .. } if *g == generation && record.filename == filename
                );
                if current {
                    log::info!("finished playing {filename}");
                    self.state.phase = Phase::Idle;
                } else {
                    log::debug!("ignoring exit of stale player for {filename}");
                }
                Ok(())
            }
        }
    }

    /// Kill any running player; called on shutdown.
    pub fn shutdown(&mut self) {
        if let Some(record) = self.stop_playback() {
            log::info!("stopped {} on shutdown", record.filename);
        }
    }

    /// Terminate the player, if any, and return the clip it was playing.
    fn stop_playback(&mut self) -> Option<SoundRecord> {
        match mem::replace(&mut self.state.phase, Phase::Idle) {
            Phase::Playing {
                record,
                mut process,
                ..
            } => {
                log::debug!("terminating player {} for {}", process.pid(), record.filename);
                process.terminate();
                Some(record)
            }
            other => {
                self.state.phase = other;
                None
            }
        }
    }

    fn spawn_download(&mut self, url: String, filename: String, generation: u64) {
        self.in_flight.insert(filename.clone(), generation);

        let runner = Arc::clone(&self.runner);
        let dest = self.store.path_for(&filename);
        let tx = self.events.clone();
        log::info!("downloading {filename} from {url}");
        thread::spawn(move || {
            let result = runner.download(&url, &dest);
            let _ = tx.send(SessionEvent::DownloadFinished {
                generation,
                filename,
                result,
            });
        });
    }

    /// Start the player for a stored clip and enter `Playing`; on failure the session stays idle.
    fn launch(&mut self, record: SoundRecord, generation: u64) -> Result<()> {
        let path = self.store.path_for(&record.filename);
        let tx = self.events.clone();
        let filename = record.filename.clone();
        let on_exit = Box::new(move || {
            let _ = tx.send(SessionEvent::PlaybackExited {
                generation,
                filename,
            });
        });

        match self.runner.play(&path, on_exit) {
            Ok(process) => {
                log::info!("playing {} (pid {})", record.filename, process.pid());
                self.state.phase = Phase::Playing {
                    record,
                    generation,
                    process,
                };
                Ok(())
            }
            Err(e) => {
                log::error!("{e}");
                self.state.phase = Phase::Idle;
                Err(e)
            }
        }
    }
}
