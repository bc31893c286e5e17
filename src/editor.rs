//! The track info editor session.
//!
//! `TrackInfoEditor` holds the form for one loaded track and everything
//! needed to write it back: the cue table with its row snapshot, the tap
//! tempo filter and the cover currently displayed. The track itself stays in
//! the library; the editor only remembers its id and checks it on every call
//! that touches the entity.

mod cover;
mod cues;
mod form;
mod tap;

use std::path::{Path, PathBuf};

pub use cover::{CoverPrompt, reload_decision};
pub use cues::{
    CueRow, CueTable, RowId, SortColumn, build_cue_rows, format_cue_position, hotcue_display,
    parse_hotcue, reconcile,
};
pub use form::{FormField, TrackForm, format_duration};
pub use tap::TapTempo;

use crate::config::{EditorSettings, LibrarySettings};
use crate::cover::{self as cover_art, CoverArt, CoverArtCache, CoverError, CoverFound, CoverSource};
use crate::library::{self, Track, TrackId};

/// Outcome of writing the form back to a track.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct SaveReport {
    pub saved: bool,
    pub removed_cues: usize,
}

pub struct TrackInfoEditor {
    loaded: Option<TrackId>,
    form: TrackForm,
    cues: CueTable,
    tap: TapTempo,
    cover: CoverArt,
    loaded_cover_location: Option<PathBuf>,
    loaded_cover_hash: Option<String>,
}

impl TrackInfoEditor {
    pub fn new(settings: &EditorSettings) -> Self {
        Self {
            loaded: None,
            form: TrackForm::default(),
            cues: CueTable::default(),
            tap: TapTempo::new(settings),
            cover: CoverArt::default_cover(),
            loaded_cover_location: None,
            loaded_cover_hash: None,
        }
    }

    pub fn loaded_track(&self) -> Option<TrackId> {
        self.loaded
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn form(&self) -> &TrackForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut TrackForm {
        &mut self.form
    }

    pub fn cues(&self) -> &CueTable {
        &self.cues
    }

    pub fn cues_mut(&mut self) -> &mut CueTable {
        &mut self.cues
    }

    pub fn cover(&self) -> &CoverArt {
        &self.cover
    }

    pub fn loaded_cover_location(&self) -> Option<&Path> {
        self.loaded_cover_location.as_deref()
    }

    pub fn loaded_cover_hash(&self) -> Option<&str> {
        self.loaded_cover_hash.as_deref()
    }

    fn owns(&self, track: &Track) -> bool {
        let owns = self.loaded == Some(track.id);
        if !owns {
            log::debug!("ignoring call for {:?}, editor has {:?}", track.id, self.loaded);
        }
        owns
    }

    /// Show `track`, or an empty editor for `None`.
    ///
    /// The default cover is displayed until the cache answers the request
    /// made here.
    pub fn load_track(&mut self, track: Option<&Track>, cache: &CoverArtCache) {
        self.clear();
        self.loaded = track.map(|t| t.id);

        let Some(track) = track else {
            return;
        };
        log::info!("editing {:?}: {}", track.id, track.path.display());

        self.populate(track);
        self.populate_cues(track);

        self.cover = cache.default_cover_art();
        self.loaded_cover_location = None;
        self.loaded_cover_hash = None;
        self.request_cover(cache, track, None, track.cover_hash.clone());
    }

    /// Copy the track's fields into the form.
    pub fn populate(&mut self, track: &Track) {
        self.form = TrackForm::populate(track);
    }

    /// Rebuild the cue table and its snapshot from the track.
    pub fn populate_cues(&mut self, track: &Track) {
        self.cues = CueTable::build(track.cue_points(), track.sample_rate);
    }

    /// Write the form into `track`, skipping a locked BPM.
    pub fn extract(&self, track: &mut Track) {
        self.form.extract(track);
    }

    /// Write fields and cue edits back to the loaded track.
    pub fn save(&mut self, track: &mut Track) -> SaveReport {
        if !self.owns(track) {
            return SaveReport::default();
        }

        self.extract(track);
        let removed_cues = self.cues.reconcile(track);
        log::info!("saved {:?} ({removed_cues} cues removed)", track.id);
        SaveReport {
            saved: true,
            removed_cues,
        }
    }

    /// Save and keep editing.
    pub fn apply(&mut self, track: &mut Track) -> SaveReport {
        self.save(track)
    }

    /// Save and unload.
    pub fn ok(&mut self, track: &mut Track) -> SaveReport {
        let report = self.save(track);
        self.unload();
        report
    }

    /// Unload without saving.
    pub fn cancel(&mut self) {
        self.unload();
    }

    fn unload(&mut self) {
        self.clear();
        self.loaded = None;
    }

    /// Empty every field, the cue table and its snapshot.
    pub fn clear(&mut self) {
        self.form = TrackForm::default();
        self.cues.clear();
    }

    /// Feed a tap to the tempo filter and put the result in the BPM field.
    pub fn tap(&mut self) -> Option<f64> {
        self.tap_at(std::time::Instant::now())
    }

    pub fn tap_at(&mut self, now: std::time::Instant) -> Option<f64> {
        if !self.form.bpm_editable {
            return None;
        }
        let bpm = self.tap.tap_at(now)?;
        self.form.set_bpm(bpm);
        Some(bpm)
    }

    pub fn bpm_double(&mut self) -> bool {
        self.form.scale_bpm(2.0)
    }

    pub fn bpm_halve(&mut self) -> bool {
        self.form.scale_bpm(0.5)
    }

    pub fn bpm_two_thirds(&mut self) -> bool {
        self.form.scale_bpm(2.0 / 3.0)
    }

    pub fn bpm_three_fourths(&mut self) -> bool {
        self.form.scale_bpm(3.0 / 4.0)
    }

    /// Ask the cache for the cover of `track`, remembering `location` and
    /// `hash` as the last loaded pair.
    pub fn request_cover(
        &mut self,
        cache: &CoverArtCache,
        track: &Track,
        location: Option<PathBuf>,
        hash: Option<String>,
    ) {
        if !self.owns(track) {
            return;
        }
        cache.request_pixmap(track.id, &track.path, location.as_deref(), hash.as_deref());
        self.loaded_cover_location = location;
        self.loaded_cover_hash = hash;
    }

    /// Apply a cover delivered by the cache. Results for any track other
    /// than the loaded one are dropped; returns whether it was applied.
    pub fn on_cover_found(&mut self, found: CoverFound) -> bool {
        if self.loaded != Some(found.track_id) {
            log::debug!("dropping stale cover for {:?}", found.track_id);
            return false;
        }

        self.loaded_cover_location = found.cover.location.clone();
        self.loaded_cover_hash = found.cover.hash.clone();
        self.cover = found.cover;
        true
    }

    /// Directory the cover picker should open in.
    pub fn cover_picker_dir(&self, track: &Track) -> Option<PathBuf> {
        self.loaded_cover_location
            .as_deref()
            .and_then(Path::parent)
            .or_else(|| track.directory())
            .map(Path::to_path_buf)
    }

    pub fn change_cover(
        &mut self,
        cache: &CoverArtCache,
        track: &Track,
        new_location: PathBuf,
    ) -> Result<(), CoverError> {
        if !self.owns(track) {
            return Ok(());
        }
        cache.change_cover_art(track.id, &track.path, CoverSource::File(new_location))
    }

    /// Replace the cover with the default one.
    pub fn unset_cover(&mut self, cache: &CoverArtCache, track: &Track) -> Result<(), CoverError> {
        if !self.owns(track) {
            return Ok(());
        }
        cache.change_cover_art(track.id, &track.path, CoverSource::Default)
    }

    /// Compare the file's embedded cover with the one last loaded and
    /// return the question to ask, if any.
    pub fn reload_embedded_cover(&mut self, track: &Track) -> Option<CoverPrompt> {
        if !self.owns(track) {
            return None;
        }
        let embedded = cover_art::hash_of_embedded_cover(&track.path);
        reload_decision(embedded.as_deref(), self.loaded_cover_hash.as_deref())
    }

    /// Act on a prompt the user answered with "yes".
    pub fn confirm_cover_prompt(
        &mut self,
        cache: &CoverArtCache,
        track: &Track,
        prompt: CoverPrompt,
    ) -> Result<(), CoverError> {
        match prompt {
            CoverPrompt::Unset => self.unset_cover(cache, track),
            CoverPrompt::LoadEmbedded { hash } => {
                if !self.owns(track) {
                    return Ok(());
                }
                self.loaded_cover_location = None;
                self.loaded_cover_hash = Some(hash);
                cache.change_cover_art(track.id, &track.path, CoverSource::Embedded)
            }
        }
    }

    /// Re-read the tags of the loaded track from disk into the form, then
    /// check its embedded cover. Cue edits are kept.
    pub fn reload_metadata(
        &mut self,
        track: &Track,
        settings: &LibrarySettings,
    ) -> Option<CoverPrompt> {
        if !self.owns(track) {
            return None;
        }
        let fresh = library::read_track(&track.path, track.id, settings);
        self.populate(&fresh);
        self.reload_embedded_cover(track)
    }
}

#[cfg(test)]
mod tests;
