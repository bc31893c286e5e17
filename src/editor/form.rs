//! Form state mirrored from a `Track`.

use std::time::Duration;

use crate::library::Track;

/// Editable fields, in the order the form shows them.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FormField {
    Title,
    Artist,
    Album,
    AlbumArtist,
    Genre,
    Composer,
    Grouping,
    Year,
    TrackNumber,
    Comment,
    Bpm,
}

impl FormField {
    pub const ALL: [FormField; 11] = [
        FormField::Title,
        FormField::Artist,
        FormField::Album,
        FormField::AlbumArtist,
        FormField::Genre,
        FormField::Composer,
        FormField::Grouping,
        FormField::Year,
        FormField::TrackNumber,
        FormField::Comment,
        FormField::Bpm,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Artist => "Artist",
            FormField::Album => "Album",
            FormField::AlbumArtist => "Album Artist",
            FormField::Genre => "Genre",
            FormField::Composer => "Composer",
            FormField::Grouping => "Grouping",
            FormField::Year => "Year",
            FormField::TrackNumber => "Track #",
            FormField::Comment => "Comment",
            FormField::Bpm => "BPM",
        }
    }
}

/// Format a track length as `M:SS`.
pub fn format_duration(d: Option<Duration>) -> String {
    match d {
        Some(d) => {
            let secs = d.as_secs();
            format!("{}:{:02}", secs / 60, secs % 60)
        }
        None => "?".to_string(),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackForm {
    pub window_title: String,

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
    /// False when the BPM controls are disabled (locked BPM, or a beat grid
    /// that cannot take a new tempo).
    pub bpm_editable: bool,

    pub duration: String,
    pub location: String,
    pub file_type: String,
    pub bitrate: String,
    pub bpm_text: String,
    pub key: String,
}

impl TrackForm {
    /// Copy the fields of `track` into a fresh form.
    pub fn populate(track: &Track) -> Self {
        Self {
            window_title: [track.artist.trim(), track.title.trim()]
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" - "),
            title: track.title.clone(),
            artist: track.artist.clone(),
            album: track.album.clone(),
            album_artist: track.album_artist.clone(),
            genre: track.genre.clone(),
            composer: track.composer.clone(),
            grouping: track.grouping.clone(),
            year: track.year.clone(),
            track_number: track.track_number.clone(),
            comment: track.comment.clone(),
            bpm: track.bpm,
            bpm_editable: track.bpm_editable(),
            duration: format_duration(track.duration),
            location: track.path.display().to_string(),
            file_type: track.file_type.clone(),
            bitrate: match track.bitrate {
                Some(kbps) => format!("{kbps} kbps"),
                None => "? kbps".to_string(),
            },
            bpm_text: format!("{:.1}", track.bpm),
            key: track.key.clone(),
        }
    }

    /// Write the edited values back to `track`. A locked BPM is left alone.
    pub fn extract(&self, track: &mut Track) {
        track.title = self.title.clone();
        track.artist = self.artist.clone();
        track.album = self.album.clone();
        track.album_artist = self.album_artist.clone();
        track.genre = self.genre.clone();
        track.composer = self.composer.clone();
        track.grouping = self.grouping.clone();
        track.year = self.year.clone();
        track.track_number = self.track_number.clone();
        track.comment = self.comment.clone();

        if !track.bpm_lock {
            track.bpm = self.bpm;
        }
    }

    pub fn text(&self, field: FormField) -> String {
        match field {
            FormField::Title => self.title.clone(),
            FormField::Artist => self.artist.clone(),
            FormField::Album => self.album.clone(),
            FormField::AlbumArtist => self.album_artist.clone(),
            FormField::Genre => self.genre.clone(),
            FormField::Composer => self.composer.clone(),
            FormField::Grouping => self.grouping.clone(),
            FormField::Year => self.year.clone(),
            FormField::TrackNumber => self.track_number.clone(),
            FormField::Comment => self.comment.clone(),
            FormField::Bpm => format!("{:.2}", self.bpm),
        }
    }

    /// Set `field` from user input. Returns false when the value was
    /// rejected: BPM editing disabled, or BPM text that is not a
    /// non-negative number.
    pub fn set_text(&mut self, field: FormField, value: &str) -> bool {
        let slot = match field {
            FormField::Title => &mut self.title,
            FormField::Artist => &mut self.artist,
            FormField::Album => &mut self.album,
            FormField::AlbumArtist => &mut self.album_artist,
            FormField::Genre => &mut self.genre,
            FormField::Composer => &mut self.composer,
            FormField::Grouping => &mut self.grouping,
            FormField::Year => &mut self.year,
            FormField::TrackNumber => &mut self.track_number,
            FormField::Comment => &mut self.comment,
            FormField::Bpm => {
                return match value.trim().parse::<f64>() {
                    Ok(bpm) => self.set_bpm(bpm),
                    Err(_) => false,
                };
            }
        };
        *slot = value.to_string();
        true
    }

    pub fn set_bpm(&mut self, bpm: f64) -> bool {
        if !self.bpm_editable || !bpm.is_finite() || bpm < 0.0 {
            return false;
        }
        self.bpm = bpm;
        true
    }

    /// Multiply the BPM by `factor` (double, halve, 2/3, 3/4 buttons).
    pub fn scale_bpm(&mut self, factor: f64) -> bool {
        self.set_bpm(self.bpm * factor)
    }
}
