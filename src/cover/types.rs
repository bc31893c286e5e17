use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::library::TrackId;

/// Where a cover image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverSource {
    /// The built-in placeholder shown for tracks without art.
    Default,
    /// The picture embedded in the track file's tags.
    Embedded,
    /// An image file chosen by the user.
    File(PathBuf),
}

/// A resolved cover image.
///
/// The raw bytes are kept as-is; decoding them is left to whoever renders
/// the cover.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverArt {
    pub source: CoverSource,
    /// File the image was read from, `None` for embedded and default art.
    pub location: Option<PathBuf>,
    /// md5 of `data`, `None` for the default cover.
    pub hash: Option<String>,
    pub mime: Option<String>,
    pub data: Arc<[u8]>,
}

impl CoverArt {
    pub fn default_cover() -> Self {
        Self {
            source: CoverSource::Default,
            location: None,
            hash: None,
            mime: None,
            data: Arc::from(Vec::new()),
        }
    }

    pub fn is_default(&self) -> bool {
        self.source == CoverSource::Default
    }
}

#[derive(Debug)]
pub(super) enum CoverCmd {
    Request {
        track_id: TrackId,
        track_path: PathBuf,
        location: Option<PathBuf>,
        hash: Option<String>,
    },
    Change {
        track_id: TrackId,
        track_path: PathBuf,
        source: CoverSource,
    },
    Quit,
}

/// Result of a request or change, delivered on the found channel.
#[derive(Debug, Clone)]
pub struct CoverFound {
    pub track_id: TrackId,
    pub cover: CoverArt,
}

#[derive(Debug, Error)]
pub enum CoverError {
    #[error("{0} does not exist")]
    Missing(PathBuf),
    #[error("{path} is not a supported image (expected one of: {extensions})")]
    Unsupported { path: PathBuf, extensions: String },
    #[error("cannot read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0} is empty")]
    Empty(PathBuf),
    #[error("the cover art cache is not running")]
    Disconnected,
}
