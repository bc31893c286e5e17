use std::path::Path;

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::tag::{ItemKey, Tag};
use walkdir::WalkDir;

use crate::config::LibrarySettings;
use crate::cover::{content_hash, front_cover};

use super::display::display_from_fields;
use super::model::{Track, TrackId};
use super::sidecar;

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn set_text(slot: &mut String, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        *slot = value.to_string();
    }
}

fn apply_tag(track: &mut Track, tag: &Tag) {
    for item in tag.items() {
        let Some(text) = item.value().text() else {
            continue;
        };
        match item.key() {
            ItemKey::TrackTitle => set_text(&mut track.title, text),
            ItemKey::TrackArtist => set_text(&mut track.artist, text),
            ItemKey::AlbumTitle => set_text(&mut track.album, text),
            ItemKey::AlbumArtist => set_text(&mut track.album_artist, text),
            ItemKey::Genre => set_text(&mut track.genre, text),
            ItemKey::Composer => set_text(&mut track.composer, text),
            ItemKey::ContentGroup => set_text(&mut track.grouping, text),
            ItemKey::Year | ItemKey::RecordingDate => set_text(&mut track.year, text),
            ItemKey::TrackNumber => set_text(&mut track.track_number, text),
            ItemKey::Comment => set_text(&mut track.comment, text),
            ItemKey::InitialKey => set_text(&mut track.key, text),
            ItemKey::Bpm | ItemKey::IntegerBpm => {
                if let Ok(bpm) = text.trim().parse::<f64>() {
                    track.bpm = bpm;
                }
            }
            _ => {}
        }
    }

    track.cover_hash = front_cover(tag).map(|pic| content_hash(pic.data()));
}

/// Build a `Track` for a single file: tags and audio properties via lofty,
/// then the optional sidecar.
///
/// Unreadable files still produce a track named after the file.
pub fn read_track(path: &Path, id: TrackId, settings: &LibrarySettings) -> Track {
    let mut track = Track::new(id, path);

    match lofty::read_from_path(path) {
        Ok(tagged) => {
            let props = tagged.properties();
            track.duration = Some(props.duration());
            track.bitrate = props.audio_bitrate().or_else(|| props.overall_bitrate());
            track.sample_rate = props.sample_rate().unwrap_or(0);

            if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                apply_tag(&mut track, tag);
            }
        }
        Err(e) => log::debug!("no tags for {}: {e}", path.display()),
    }

    if let Some(sc) = sidecar::load(path, &settings.sidecar_extension) {
        sc.apply_to(&mut track);
    }

    track.display = display_from_fields(&track, &settings.display_fields, &settings.display_separator);
    track
}

/// Scan `dir` for audio files and return them sorted by display label.
///
/// Track ids follow the sorted order.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<Track> {
    let mut tracks: Vec<Track> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if path.is_file()
            && (settings.include_hidden || !is_hidden(path))
            && is_audio_file(path, settings)
        {
            tracks.push(read_track(path, TrackId(0), settings));
        }
    }

    tracks.sort_by(|a, b| a.display.to_lowercase().cmp(&b.display.to_lowercase()));
    for (i, track) in tracks.iter_mut().enumerate() {
        track.id = TrackId(i);
    }

    log::info!("scanned {} tracks under {}", tracks.len(), dir.display());
    tracks
}
