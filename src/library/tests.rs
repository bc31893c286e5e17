use super::display::display_from_fields;
use super::model::{CueType, NO_HOTCUE, Track, TrackId};
use crate::config::TrackDisplayField;

fn track(title: &str, artist: &str) -> Track {
    let mut t = Track::new(TrackId(0), "/tmp/Song.mp3");
    t.title = title.into();
    t.artist = artist.into();
    t
}

#[test]
fn display_from_fields_can_format_artist_title() {
    let fields = [TrackDisplayField::Artist, TrackDisplayField::Title];
    assert_eq!(
        display_from_fields(&track("Song", "Artist"), &fields, " - "),
        "Artist - Song"
    );
    assert_eq!(
        display_from_fields(&track("Song", "  Artist  "), &fields, " - "),
        "Artist - Song"
    );
    assert_eq!(display_from_fields(&track("Song", ""), &fields, " - "), "Song");
}

#[test]
fn display_from_fields_falls_back_to_title() {
    let t = track("Song", "");
    assert_eq!(display_from_fields(&t, &[TrackDisplayField::Album], " - "), "Song");
    assert_eq!(display_from_fields(&t, &[TrackDisplayField::Filename], " - "), "Song");
}

#[test]
fn new_track_is_named_after_file() {
    let t = Track::new(TrackId(3), "/music/Deep Cut.FLAC");
    assert_eq!(t.title, "Deep Cut");
    assert_eq!(t.file_type, "flac");
    assert_eq!(t.directory(), Some(std::path::Path::new("/music")));
    assert!(t.bpm_editable());
}

#[test]
fn cue_ids_stay_stable_across_removal() {
    let mut t = track("Song", "");
    let a = t.add_cue(100, CueType::Regular, 0, "a");
    let b = t.add_cue(200, CueType::Load, NO_HOTCUE, "b");
    let c = t.add_cue(300, CueType::Regular, 2, "c");

    assert_eq!(t.remove_cue(b).map(|c| c.label), Some("b".to_string()));
    assert!(t.remove_cue(b).is_none());
    assert_eq!(t.cue(a).unwrap().position, 100);
    assert_eq!(t.cue(c).unwrap().hotcue, 2);

    let d = t.add_cue(400, CueType::Regular, NO_HOTCUE, "d");
    assert_ne!(d, b);
}

#[test]
fn beat_grid_without_set_support_blocks_bpm_editing() {
    let mut t = track("Song", "");
    t.beats = Some(super::Beats { supports_set: false });
    assert!(!t.bpm_editable());
    t.beats = Some(super::Beats { supports_set: true });
    assert!(t.bpm_editable());
    t.bpm_lock = true;
    assert!(!t.bpm_editable());
}
