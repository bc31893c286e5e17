use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Cue position value meaning "no position stored".
pub const UNSET_POSITION: i64 = -1;
/// Hotcue value meaning "not bound to a hotcue slot".
pub const NO_HOTCUE: i32 = -1;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackId(pub usize);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CueId(pub u32);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CueType {
    /// The main cue / a plain cue marker.
    #[serde(alias = "cue")]
    Regular,
    /// Position the deck jumps to when the track is loaded.
    Load,
    /// Loops, jumps, beat markers and anything else the editor does not list.
    #[serde(other)]
    Other,
}

/// A marker stored within a track's audio.
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    pub id: CueId,
    /// Sample offset, `UNSET_POSITION` when unset.
    pub position: i64,
    pub kind: CueType,
    /// 0-based hotcue slot, `NO_HOTCUE` when none.
    pub hotcue: i32,
    pub label: String,
}

/// Beat grid attached to a track by analysis.
///
/// Only its capabilities matter here; the grid itself is produced elsewhere.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
pub struct Beats {
    /// Whether the grid accepts a manually set BPM.
    pub supports_set: bool,
}

#[derive(Debug, Clone)]
pub struct Track {
    pub id: TrackId,
    pub path: PathBuf,

    pub title: String,
    pub artist: String,
    pub album: String,
    pub album_artist: String,
    pub genre: String,
    pub composer: String,
    pub grouping: String,
    pub year: String,
    pub track_number: String,
    pub comment: String,
    pub bpm: f64,
    pub bpm_lock: bool,
    pub beats: Option<Beats>,

    pub duration: Option<Duration>,
    pub file_type: String,
    /// Bitrate in kbps.
    pub bitrate: Option<u32>,
    pub key: String,
    pub sample_rate: u32,
    /// md5 of the embedded cover image, if the file carries one.
    pub cover_hash: Option<String>,

    pub display: String,

    cue_points: Vec<Cue>,
    next_cue_id: u32,
}

impl Track {
    /// A track with no metadata besides what the path provides.
    pub fn new(id: TrackId, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string();
        let file_type = path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        Self {
            id,
            path,
            display: title.clone(),
            title,
            artist: String::new(),
            album: String::new(),
            album_artist: String::new(),
            genre: String::new(),
            composer: String::new(),
            grouping: String::new(),
            year: String::new(),
            track_number: String::new(),
            comment: String::new(),
            bpm: 0.0,
            bpm_lock: false,
            beats: None,
            duration: None,
            file_type,
            bitrate: None,
            key: String::new(),
            sample_rate: 0,
            cover_hash: None,
            cue_points: Vec::new(),
            next_cue_id: 0,
        }
    }

    /// Directory containing the track file.
    pub fn directory(&self) -> Option<&Path> {
        self.path.parent()
    }

    /// True when the BPM may be changed by hand: no lock and the beat grid
    /// (if any) accepts a new tempo.
    pub fn bpm_editable(&self) -> bool {
        let beats_support_set = self.beats.is_none_or(|b| b.supports_set);
        !self.bpm_lock && beats_support_set
    }

    pub fn cue_points(&self) -> &[Cue] {
        &self.cue_points
    }

    pub fn cue(&self, id: CueId) -> Option<&Cue> {
        self.cue_points.iter().find(|c| c.id == id)
    }

    pub fn cue_mut(&mut self, id: CueId) -> Option<&mut Cue> {
        self.cue_points.iter_mut().find(|c| c.id == id)
    }

    /// Append a cue point and return its id.
    pub fn add_cue(&mut self, position: i64, kind: CueType, hotcue: i32, label: &str) -> CueId {
        let id = CueId(self.next_cue_id);
        self.next_cue_id += 1;
        self.cue_points.push(Cue {
            id,
            position,
            kind,
            hotcue,
            label: label.to_string(),
        });
        id
    }

    /// Remove the cue with `id`, returning it when it existed.
    pub fn remove_cue(&mut self, id: CueId) -> Option<Cue> {
        let pos = self.cue_points.iter().position(|c| c.id == id)?;
        Some(self.cue_points.remove(pos))
    }
}
