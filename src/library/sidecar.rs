//! Per-track JSON sidecars carrying what audio tags cannot: cue points, the
//! BPM lock and beat-grid capabilities.
//!
//! A sidecar sits next to the audio file as `<file name>.<extension>`, e.g.
//! `song.mp3.cues.json`:
//!
//! ```json
//! {
//!   "bpm": 124.0,
//!   "bpm_lock": false,
//!   "beats": { "supports_set": true },
//!   "cues": [
//!     { "position": 88200, "type": "regular", "hotcue": 0, "label": "drop" }
//!   ]
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::model::{Beats, CueType, NO_HOTCUE, Track};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct Sidecar {
    pub bpm: Option<f64>,
    pub bpm_lock: bool,
    pub beats: Option<Beats>,
    pub cues: Vec<CueRecord>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CueRecord {
    pub position: i64,
    #[serde(rename = "type", default = "regular")]
    pub kind: CueType,
    #[serde(default = "no_hotcue")]
    pub hotcue: i32,
    #[serde(default)]
    pub label: String,
}

fn regular() -> CueType {
    CueType::Regular
}

fn no_hotcue() -> i32 {
    NO_HOTCUE
}

pub(super) fn sidecar_path(audio: &Path, extension: &str) -> Option<PathBuf> {
    let mut name = audio.file_name()?.to_os_string();
    name.push(".");
    name.push(extension.trim_start_matches('.'));
    Some(audio.with_file_name(name))
}

/// Read the sidecar for `audio`, if one exists and parses.
pub(super) fn load(audio: &Path, extension: &str) -> Option<Sidecar> {
    let path = sidecar_path(audio, extension)?;
    if !path.is_file() {
        return None;
    }

    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) => {
            log::warn!("cannot read sidecar {}: {e}", path.display());
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(sidecar) => Some(sidecar),
        Err(e) => {
            log::warn!("ignoring malformed sidecar {}: {e}", path.display());
            None
        }
    }
}

impl Sidecar {
    pub(super) fn apply_to(self, track: &mut Track) {
        if let Some(bpm) = self.bpm {
            track.bpm = bpm;
        }
        track.bpm_lock = self.bpm_lock;
        track.beats = self.beats;
        for cue in self.cues {
            track.add_cue(cue.position, cue.kind, cue.hotcue, &cue.label);
        }
    }
}
