use crate::config::TrackDisplayField;

use super::model::Track;

/// Build the browser label for `track` from the configured `fields`.
///
/// Empty fields are skipped; when nothing is left the title is used as-is.
pub fn display_from_fields(track: &Track, fields: &[TrackDisplayField], sep: &str) -> String {
    let mut parts: Vec<String> = Vec::new();

    for f in fields {
        let value = match f {
            TrackDisplayField::Title => track.title.clone(),
            TrackDisplayField::Artist => track.artist.clone(),
            TrackDisplayField::Album => track.album.clone(),
            TrackDisplayField::AlbumArtist => track.album_artist.clone(),
            TrackDisplayField::Genre => track.genre.clone(),
            TrackDisplayField::Filename => track
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string(),
            TrackDisplayField::Path => track.path.display().to_string(),
        };
        let value = value.trim();
        if !value.is_empty() {
            parts.push(value.to_string());
        }
    }

    if parts.is_empty() {
        track.title.clone()
    } else {
        parts.join(sep)
    }
}
