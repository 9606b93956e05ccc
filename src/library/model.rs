/// How a row is rendered and whether it can be played.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DisplayKind {
    /// The "press enter to search" row.
    SearchPrompt,
    SectionHeader,
    Entry,
}

/// Embedded tag data of a clip. Purely decorative.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub cover: Option<CoverImage>,
}

impl AudioMetadata {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.artist.is_none() && self.album.is_none() && self.cover.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverImage {
    pub mime_type: Option<String>,
    pub data: Vec<u8>,
}

/// One row of the sound list. `filename` is the identity key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundRecord {
    pub name: String,
    /// Where to fetch the clip from; `None` for local-only entries.
    pub source_url: Option<String>,
    pub filename: String,
    pub metadata: Option<AudioMetadata>,
    pub kind: DisplayKind,
}

impl SoundRecord {
    /// A playable catalog result.
    pub fn remote(name: impl Into<String>, source_url: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_url: Some(source_url.into()),
            filename: filename.into(),
            metadata: None,
            kind: DisplayKind::Entry,
        }
    }

    /// A clip that only exists in the library directory.
    pub fn local(name: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_url: None,
            filename: filename.into(),
            metadata: None,
            kind: DisplayKind::Entry,
        }
    }

    pub fn search_prompt() -> Self {
        Self {
            name: "🔍 Press [Enter] to search".to_string(),
            source_url: None,
            filename: String::new(),
            metadata: None,
            kind: DisplayKind::SearchPrompt,
        }
    }

    pub fn section_header(title: impl Into<String>) -> Self {
        Self {
            name: title.into(),
            source_url: None,
            filename: String::new(),
            metadata: None,
            kind: DisplayKind::SectionHeader,
        }
    }

    pub fn is_playable(&self) -> bool {
        self.kind == DisplayKind::Entry
    }

    /// Two records denote the same clip when they share a filename.
    pub fn same_clip(&self, other: &SoundRecord) -> bool {
        self.is_playable() && other.is_playable() && self.filename == other.filename
    }
}
