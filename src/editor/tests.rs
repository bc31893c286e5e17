use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use super::*;
use crate::config::{CoverSettings, EditorSettings, LibrarySettings};
use crate::cover::{CoverArt, CoverArtCache, CoverFound, CoverSource, content_hash};
use crate::library::{Beats, CueType, NO_HOTCUE, Track, TrackId, UNSET_POSITION};

fn next_found(cache: &CoverArtCache) -> CoverFound {
    cache
        .found()
        .recv_timeout(Duration::from_secs(5))
        .expect("cover worker answered")
}

fn sample_track(dir: &Path, id: usize) -> Track {
    let path = dir.join(format!("track{id}.mp3"));
    fs::write(&path, b"not really audio").unwrap();

    let mut track = Track::new(TrackId(id), path);
    track.title = "Windowlicker".into();
    track.artist = "Aphex Twin".into();
    track.album = "Windowlicker".into();
    track.year = "1999".into();
    track.bpm = 126.0;
    track.sample_rate = 44_100;
    track.add_cue(88_200, CueType::Regular, 0, "drop");
    track.add_cue(UNSET_POSITION, CueType::Regular, 1, "unset");
    track.add_cue(44_100, CueType::Other, NO_HOTCUE, "loop");
    track.add_cue(176_400, CueType::Load, NO_HOTCUE, "start");
    track
}

fn file_cover(path: &Path, bytes: &[u8]) -> CoverArt {
    CoverArt {
        source: CoverSource::File(path.to_path_buf()),
        location: Some(path.to_path_buf()),
        hash: Some(content_hash(bytes)),
        mime: Some("image/png".into()),
        data: bytes.to_vec().into(),
    }
}

#[test]
fn load_track_populates_fields_and_cues() {
    let dir = tempfile::tempdir().unwrap();
    let track = sample_track(dir.path(), 0);
    let cache = CoverArtCache::spawn(&CoverSettings::default());
    let mut editor = TrackInfoEditor::new(&EditorSettings::default());

    editor.load_track(Some(&track), &cache);

    assert_eq!(editor.loaded_track(), Some(TrackId(0)));
    assert_eq!(editor.form().artist, "Aphex Twin");
    assert_eq!(editor.form().window_title, "Aphex Twin - Windowlicker");
    assert!(editor.form().bpm_editable);
    assert!(editor.cover().is_default());

    let rows = editor.cues().rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].duration, "1:00.00");
    assert_eq!(rows[0].hotcue, "1");
    assert_eq!(rows[1].label, "start");
    assert_eq!(rows[1].hotcue, "");

    let found = next_found(&cache);
    assert_eq!(found.track_id, TrackId(0));
    assert!(editor.on_cover_found(found));
}

#[test]
fn loading_nothing_leaves_an_empty_editor() {
    let dir = tempfile::tempdir().unwrap();
    let track = sample_track(dir.path(), 0);
    let cache = CoverArtCache::spawn(&CoverSettings::default());
    let mut editor = TrackInfoEditor::new(&EditorSettings::default());

    editor.load_track(Some(&track), &cache);
    editor.load_track(None, &cache);

    assert!(!editor.is_loaded());
    assert_eq!(editor.form(), &TrackForm::default());
    assert!(editor.cues().is_empty());
}

#[test]
fn locked_bpm_disables_bpm_controls_and_is_not_saved() {
    let dir = tempfile::tempdir().unwrap();
    let mut track = sample_track(dir.path(), 0);
    track.bpm_lock = true;
    let cache = CoverArtCache::spawn(&CoverSettings::default());
    let mut editor = TrackInfoEditor::new(&EditorSettings::default());
    editor.load_track(Some(&track), &cache);

    assert!(!editor.form().bpm_editable);
    assert!(!editor.bpm_double());
    assert!(editor.tap_at(Instant::now()).is_none());

    editor.form_mut().bpm = 90.0;
    editor.form_mut().title = "Renamed".into();
    editor.save(&mut track);

    assert_eq!(track.bpm, 126.0);
    assert_eq!(track.title, "Renamed");
}

#[test]
fn beat_grid_without_set_support_disables_bpm() {
    let dir = tempfile::tempdir().unwrap();
    let mut track = sample_track(dir.path(), 0);
    track.beats = Some(Beats {
        supports_set: false,
    });
    let cache = CoverArtCache::spawn(&CoverSettings::default());
    let mut editor = TrackInfoEditor::new(&EditorSettings::default());
    editor.load_track(Some(&track), &cache);

    assert!(!editor.form().bpm_editable);
    assert!(!editor.bpm_halve());
    assert_eq!(editor.form().bpm, 126.0);
}

#[test]
fn bpm_scaling_buttons() {
    let dir = tempfile::tempdir().unwrap();
    let track = sample_track(dir.path(), 0);
    let cache = CoverArtCache::spawn(&CoverSettings::default());
    let mut editor = TrackInfoEditor::new(&EditorSettings::default());
    editor.load_track(Some(&track), &cache);

    assert!(editor.bpm_double());
    assert_eq!(editor.form().bpm, 252.0);
    assert!(editor.bpm_halve());
    assert_eq!(editor.form().bpm, 126.0);
    assert!(editor.bpm_two_thirds());
    assert!((editor.form().bpm - 84.0).abs() < 1e-9);
    assert!(editor.bpm_three_fourths());
    assert!((editor.form().bpm - 63.0).abs() < 1e-9);
}

#[test]
fn tapping_overwrites_the_form_bpm() {
    let dir = tempfile::tempdir().unwrap();
    let track = sample_track(dir.path(), 0);
    let cache = CoverArtCache::spawn(&CoverSettings::default());
    let mut editor = TrackInfoEditor::new(&EditorSettings::default());
    editor.load_track(Some(&track), &cache);

    // The first tap comes long after the editor was created: restart only.
    let start = Instant::now() + Duration::from_secs(10);
    assert!(editor.tap_at(start).is_none());
    assert_eq!(editor.form().bpm, 126.0);

    let mut bpm = None;
    for i in 1..=4 {
        bpm = editor.tap_at(start + Duration::from_millis(500 * i));
    }
    let bpm = bpm.unwrap();
    assert!((bpm - 120.0).abs() < 1e-6);
    assert!((editor.form().bpm - 120.0).abs() < 1e-6);
}

#[test]
fn save_reconciles_cue_edits_and_deletions() {
    let dir = tempfile::tempdir().unwrap();
    let mut track = sample_track(dir.path(), 0);
    let cache = CoverArtCache::spawn(&CoverSettings::default());
    let mut editor = TrackInfoEditor::new(&EditorSettings::default());
    editor.load_track(Some(&track), &cache);

    editor.cues_mut().set_hotcue(0, "4");
    editor.cues_mut().set_label(0, "big drop");
    editor.cues_mut().delete_row(1);

    let report = editor.apply(&mut track);
    assert!(report.saved);
    assert_eq!(report.removed_cues, 1);

    let drop = track.cue_points().iter().find(|c| c.position == 88_200).unwrap();
    assert_eq!(drop.hotcue, 3);
    assert_eq!(drop.label, "big drop");
    assert!(track.cue_points().iter().all(|c| c.kind != CueType::Load));
    // Cues never shown in the table are left alone.
    assert_eq!(track.cue_points().len(), 3);

    // Saving again changes nothing.
    assert_eq!(editor.apply(&mut track).removed_cues, 0);
    assert_eq!(track.cue_points().len(), 3);
    assert!(editor.is_loaded());
}

#[test]
fn sorting_does_not_change_which_cue_a_row_edits() {
    let dir = tempfile::tempdir().unwrap();
    let mut track = sample_track(dir.path(), 0);
    let cache = CoverArtCache::spawn(&CoverSettings::default());
    let mut editor = TrackInfoEditor::new(&EditorSettings::default());
    editor.load_track(Some(&track), &cache);

    editor.cues_mut().sort_by(SortColumn::Label);
    assert_eq!(editor.cues().rows()[0].label, "drop");
    editor.cues_mut().set_label(1, "intro");
    editor.save(&mut track);

    let load = track.cue_points().iter().find(|c| c.kind == CueType::Load).unwrap();
    assert_eq!(load.label, "intro");
}

#[test]
fn ok_saves_and_unloads_and_cancel_discards() {
    let dir = tempfile::tempdir().unwrap();
    let mut track = sample_track(dir.path(), 0);
    let cache = CoverArtCache::spawn(&CoverSettings::default());
    let mut editor = TrackInfoEditor::new(&EditorSettings::default());

    editor.load_track(Some(&track), &cache);
    editor.form_mut().genre = "IDM".into();
    editor.cancel();
    assert!(!editor.is_loaded());
    assert_eq!(track.genre, "");

    editor.load_track(Some(&track), &cache);
    editor.form_mut().genre = "IDM".into();
    assert!(editor.ok(&mut track).saved);
    assert!(!editor.is_loaded());
    assert_eq!(track.genre, "IDM");
}

#[test]
fn save_for_another_track_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let track = sample_track(dir.path(), 0);
    let mut other = sample_track(dir.path(), 1);
    let cache = CoverArtCache::spawn(&CoverSettings::default());
    let mut editor = TrackInfoEditor::new(&EditorSettings::default());
    editor.load_track(Some(&track), &cache);
    editor.form_mut().title = "Wrong".into();

    assert!(!editor.save(&mut other).saved);
    assert_eq!(other.title, "Windowlicker");
    assert_eq!(other.cue_points().len(), 4);
}

#[test]
fn covers_for_other_tracks_are_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("cover.png");
    let track = sample_track(dir.path(), 0);
    let cache = CoverArtCache::spawn(&CoverSettings::default());
    let mut editor = TrackInfoEditor::new(&EditorSettings::default());
    editor.load_track(Some(&track), &cache);

    let stale = CoverFound {
        track_id: TrackId(7),
        cover: file_cover(&image, b"png"),
    };
    assert!(!editor.on_cover_found(stale));
    assert!(editor.cover().is_default());

    let fresh = CoverFound {
        track_id: TrackId(0),
        cover: file_cover(&image, b"png"),
    };
    assert!(editor.on_cover_found(fresh));
    assert_eq!(editor.loaded_cover_location(), Some(image.as_path()));
    assert_eq!(editor.loaded_cover_hash(), Some(content_hash(b"png").as_str()));
}

#[test]
fn change_cover_reports_bad_files_and_applies_good_ones() {
    let dir = tempfile::tempdir().unwrap();
    let track = sample_track(dir.path(), 0);
    let image = dir.path().join("cover.png");
    fs::write(&image, b"png bytes").unwrap();
    let cache = CoverArtCache::spawn(&CoverSettings::default());
    let mut editor = TrackInfoEditor::new(&EditorSettings::default());
    editor.load_track(Some(&track), &cache);
    editor.on_cover_found(next_found(&cache));

    let err = editor.change_cover(&cache, &track, dir.path().join("missing.png"));
    assert!(err.is_err());

    editor.change_cover(&cache, &track, image.clone()).unwrap();
    assert!(editor.on_cover_found(next_found(&cache)));
    assert_eq!(editor.cover().location.as_deref(), Some(image.as_path()));
    assert_eq!(editor.cover_picker_dir(&track).as_deref(), Some(dir.path()));

    editor.unset_cover(&cache, &track).unwrap();
    assert!(editor.on_cover_found(next_found(&cache)));
    assert!(editor.cover().is_default());
    assert_eq!(editor.loaded_cover_hash(), None);
}

#[test]
fn reload_embedded_cover_prompts_to_unset_a_vanished_cover() {
    let dir = tempfile::tempdir().unwrap();
    let track = sample_track(dir.path(), 0);
    let image = dir.path().join("cover.png");
    let cache = CoverArtCache::spawn(&CoverSettings::default());
    let mut editor = TrackInfoEditor::new(&EditorSettings::default());
    editor.load_track(Some(&track), &cache);

    // Nothing displayed and nothing embedded.
    assert_eq!(editor.reload_embedded_cover(&track), None);

    editor.on_cover_found(CoverFound {
        track_id: TrackId(0),
        cover: file_cover(&image, b"png"),
    });
    assert_eq!(editor.reload_embedded_cover(&track), Some(CoverPrompt::Unset));
}

#[test]
fn reload_metadata_rereads_fields_but_keeps_cue_edits() {
    let dir = tempfile::tempdir().unwrap();
    let track = sample_track(dir.path(), 0);
    let cache = CoverArtCache::spawn(&CoverSettings::default());
    let mut editor = TrackInfoEditor::new(&EditorSettings::default());
    editor.load_track(Some(&track), &cache);

    editor.form_mut().artist = "Edited".into();
    editor.cues_mut().set_label(0, "kept");

    let prompt = editor.reload_metadata(&track, &LibrarySettings::default());
    assert_eq!(prompt, None);
    // The file carries no tags, so the title falls back to the file stem.
    assert_eq!(editor.form().title, "track0");
    assert_eq!(editor.form().artist, "");
    assert_eq!(editor.cues().rows()[0].label, "kept");
}

#[test]
fn calls_without_a_loaded_track_do_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut track = sample_track(dir.path(), 0);
    let cache = CoverArtCache::spawn(&CoverSettings::default());
    let mut editor = TrackInfoEditor::new(&EditorSettings::default());

    assert!(!editor.save(&mut track).saved);
    assert_eq!(editor.reload_embedded_cover(&track), None);
    assert!(editor.unset_cover(&cache, &track).is_ok());
    assert!(cache.found().recv_timeout(Duration::from_millis(100)).is_err());
}

fn flac_block(out: &mut Vec<u8>, kind: u8, last: bool, content: &[u8]) {
    out.push(if last { 0x80 | kind } else { kind });
    out.extend_from_slice(&(content.len() as u32).to_be_bytes()[1..]);
    out.extend_from_slice(content);
}

/// A metadata-only FLAC file whose front cover is `image`.
fn flac_with_cover(path: &Path, image: &[u8]) {
    let mut stream_info = Vec::new();
    stream_info.extend_from_slice(&4096u16.to_be_bytes());
    stream_info.extend_from_slice(&4096u16.to_be_bytes());
    stream_info.extend_from_slice(&[0; 6]);
    // 44.1 kHz, stereo, 16 bit, one second of samples.
    let packed = (44_100u64 << 44) | (1u64 << 41) | (15u64 << 36) | 44_100u64;
    stream_info.extend_from_slice(&packed.to_be_bytes());
    stream_info.extend_from_slice(&[0; 16]);

    let mut comments = Vec::new();
    let vendor = b"trackinfo";
    let title = b"TITLE=Cover Test";
    comments.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
    comments.extend_from_slice(vendor);
    comments.extend_from_slice(&1u32.to_le_bytes());
    comments.extend_from_slice(&(title.len() as u32).to_le_bytes());
    comments.extend_from_slice(title);

    let mime = b"image/png";
    let mut picture = Vec::new();
    picture.extend_from_slice(&3u32.to_be_bytes());
    picture.extend_from_slice(&(mime.len() as u32).to_be_bytes());
    picture.extend_from_slice(mime);
    picture.extend_from_slice(&0u32.to_be_bytes());
    picture.extend_from_slice(&[0; 16]);
    picture.extend_from_slice(&(image.len() as u32).to_be_bytes());
    picture.extend_from_slice(image);

    let mut file = b"fLaC".to_vec();
    flac_block(&mut file, 0, false, &stream_info);
    flac_block(&mut file, 4, false, &comments);
    flac_block(&mut file, 6, true, &picture);
    fs::write(path, file).unwrap();
}

#[test]
fn confirming_load_embedded_shows_the_embedded_cover() {
    let dir = tempfile::tempdir().unwrap();
    let audio = dir.path().join("tagged.flac");
    flac_with_cover(&audio, b"embedded png bytes");
    let image = dir.path().join("cover.png");
    fs::write(&image, b"file png bytes").unwrap();
    let embedded_hash = content_hash(b"embedded png bytes");

    let track = Track::new(TrackId(0), &audio);
    let cache = CoverArtCache::spawn(&CoverSettings::default());
    let mut editor = TrackInfoEditor::new(&EditorSettings::default());
    editor.load_track(Some(&track), &cache);
    assert!(editor.on_cover_found(next_found(&cache)));
    assert_eq!(editor.loaded_cover_hash(), Some(embedded_hash.as_str()));

    editor.change_cover(&cache, &track, image.clone()).unwrap();
    assert!(editor.on_cover_found(next_found(&cache)));
    assert_eq!(editor.loaded_cover_location(), Some(image.as_path()));

    let prompt = editor.reload_embedded_cover(&track).unwrap();
    assert_eq!(
        prompt,
        CoverPrompt::LoadEmbedded {
            hash: embedded_hash.clone()
        }
    );

    editor.confirm_cover_prompt(&cache, &track, prompt).unwrap();
    assert_eq!(editor.loaded_cover_hash(), Some(embedded_hash.as_str()));
    assert_eq!(editor.loaded_cover_location(), None);

    let found = next_found(&cache);
    assert_eq!(found.track_id, TrackId(0));
    assert_eq!(found.cover.source, CoverSource::Embedded);
    assert_eq!(found.cover.hash.as_deref(), Some(embedded_hash.as_str()));
    assert!(editor.on_cover_found(found));
    assert_eq!(editor.loaded_cover_hash(), Some(embedded_hash.as_str()));
    assert_eq!(editor.reload_embedded_cover(&track), None);
}

#[test]
fn confirming_unset_shows_the_default_cover() {
    let dir = tempfile::tempdir().unwrap();
    let track = sample_track(dir.path(), 0);
    let image = dir.path().join("cover.png");
    let cache = CoverArtCache::spawn(&CoverSettings::default());
    let mut editor = TrackInfoEditor::new(&EditorSettings::default());
    editor.load_track(Some(&track), &cache);
    editor.on_cover_found(next_found(&cache));
    editor.on_cover_found(CoverFound {
        track_id: TrackId(0),
        cover: file_cover(&image, b"png"),
    });

    let prompt = editor.reload_embedded_cover(&track).unwrap();
    assert_eq!(prompt, CoverPrompt::Unset);
    editor.confirm_cover_prompt(&cache, &track, prompt).unwrap();

    let found = next_found(&cache);
    assert_eq!(found.track_id, TrackId(0));
    assert!(found.cover.is_default());
    assert!(editor.on_cover_found(found));
    assert!(editor.cover().is_default());
    assert_eq!(editor.loaded_cover_hash(), None);
    assert_eq!(editor.loaded_cover_location(), None);
}
