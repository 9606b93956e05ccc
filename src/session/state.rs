use crate::error::Result;
use crate::library::SoundRecord;

use super::process::PlaybackProcess;

/// Where the single session slot stands.
pub(super) enum Phase {
    Idle,
    Downloading {
        record: SoundRecord,
        generation: u64,
    },
    /// A player process exists exactly while in this phase.
    Playing {
        record: SoundRecord,
        generation: u64,
        process: Box<dyn PlaybackProcess>,
    },
}

/// The one record of what is downloading or playing right now.
pub struct SessionState {
    pub(super) phase: Phase,
    generation: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            generation: 0,
        }
    }
}

impl SessionState {
    /// Filename of the clip whose player is alive.
    pub fn active_filename(&self) -> Option<&str> {
        match &self.phase {
            Phase::Playing { record, .. } => Some(&record.filename),
            _ => None,
        }
    }

    pub fn active_pid(&self) -> Option<u32> {
        match &self.phase {
            Phase::Playing { process, .. } => Some(process.pid()),
            _ => None,
        }
    }

    pub fn downloading_filename(&self) -> Option<&str> {
        match &self.phase {
            Phase::Downloading { record, .. } => Some(&record.filename),
            _ => None,
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.phase, Phase::Playing { .. })
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    pub(super) fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }
}

/// Per-row view of the session, used to pick the row icon.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClipStatus {
    Idle,
    Downloading,
    Playing,
}

/// What an activation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// The prompt row was chosen; the caller runs the search.
    Search,
    /// A non-playable row; nothing happened.
    Ignored,
    /// The clip was playing (or downloading) and has been toggled off.
    Stopped(String),
    Downloading(String),
    Playing(String),
}

/// Completions reported by background work, applied with `SessionManager::handle_event`.
pub enum SessionEvent {
    DownloadFinished {
        generation: u64,
        filename: String,
        result: Result<()>,
    },
    PlaybackExited {
        generation: u64,
        filename: String,
    },
}
