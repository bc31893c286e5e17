use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::config::CoverSettings;
use crate::library::TrackId;

use super::embedded::{content_hash, read_embedded_cover};
use super::types::{CoverArt, CoverCmd, CoverError, CoverFound, CoverSource};

// Resolved covers kept by content hash; cleared wholesale when full.
const MEMO_CAPACITY: usize = 256;

/// Handle to the cover art worker thread.
pub struct CoverArtCache {
    tx: Sender<CoverCmd>,
    found: Receiver<CoverFound>,
    image_extensions: Vec<String>,
    join: Option<JoinHandle<()>>,
}

impl CoverArtCache {
    pub fn spawn(settings: &CoverSettings) -> Self {
        let (tx, rx) = mpsc::channel::<CoverCmd>();
        let (found_tx, found) = mpsc::channel::<CoverFound>();
        let join = thread::Builder::new()
            .name("cover-art".into())
            .spawn(move || run_worker(rx, found_tx))
            .map_err(|e| log::error!("cannot start cover art thread: {e}"))
            .ok();

        Self {
            tx,
            found,
            image_extensions: settings
                .image_extensions
                .iter()
                .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
            join,
        }
    }

    /// Channel carrying resolved covers.
    pub fn found(&self) -> &Receiver<CoverFound> {
        &self.found
    }

    pub fn default_cover_art(&self) -> CoverArt {
        CoverArt::default_cover()
    }

    /// Extensions accepted for user-chosen cover files.
    pub fn image_extensions(&self) -> &[String] {
        &self.image_extensions
    }

    /// Ask for the cover of `track_id`. A known `location`/`hash` pair is
    /// tried first; the answer arrives on `found()`.
    pub fn request_pixmap(
        &self,
        track_id: TrackId,
        track_path: &Path,
        location: Option<&Path>,
        hash: Option<&str>,
    ) {
        let cmd = CoverCmd::Request {
            track_id,
            track_path: track_path.to_path_buf(),
            location: location.map(Path::to_path_buf),
            hash: hash.map(str::to_string),
        };
        if self.tx.send(cmd).is_err() {
            log::warn!("cover art request for {track_id:?} dropped: cache is not running");
        }
    }

    /// Replace the cover of `track_id`. The new cover is announced on
    /// `found()` once resolved.
    pub fn change_cover_art(
        &self,
        track_id: TrackId,
        track_path: &Path,
        source: CoverSource,
    ) -> Result<(), CoverError> {
        if let CoverSource::File(path) = &source {
            self.check_image_file(path)?;
        }

        log::info!("changing cover of {track_id:?} to {source:?}");
        self.tx
            .send(CoverCmd::Change {
                track_id,
                track_path: track_path.to_path_buf(),
                source,
            })
            .map_err(|_| CoverError::Disconnected)
    }

    fn check_image_file(&self, path: &Path) -> Result<(), CoverError> {
        if !path.exists() {
            return Err(CoverError::Missing(path.to_path_buf()));
        }

        let ext_ok = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.image_extensions.iter().any(|e| e == &ext)
            })
            .unwrap_or(false);
        if !ext_ok {
            return Err(CoverError::Unsupported {
                path: path.to_path_buf(),
                extensions: self.image_extensions.join(", "),
            });
        }

        let meta = fs::metadata(path).map_err(|source| CoverError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        if meta.len() == 0 {
            return Err(CoverError::Empty(path.to_path_buf()));
        }
        Ok(())
    }
}

impl Drop for CoverArtCache {
    fn drop(&mut self) {
        let _ = self.tx.send(CoverCmd::Quit);
        if let Some(h) = self.join.take() {
            let _ = h.join();
        }
    }
}

fn load_file(path: &Path) -> Option<CoverArt> {
    match fs::read(path) {
        Ok(data) if !data.is_empty() => Some(CoverArt {
            source: CoverSource::File(path.to_path_buf()),
            location: Some(path.to_path_buf()),
            hash: Some(content_hash(&data)),
            mime: mime_from_extension(path),
            data: Arc::from(data),
        }),
        Ok(_) => {
            log::warn!("cover file {} is empty", path.display());
            None
        }
        Err(e) => {
            log::warn!("cannot read cover file {}: {e}", path.display());
            None
        }
    }
}

fn mime_from_extension(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "bmp" => "image/bmp",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => return None,
    };
    Some(mime.to_string())
}

fn resolve(source: &CoverSource, track_path: &Path) -> CoverArt {
    let art = match source {
        CoverSource::Default => None,
        CoverSource::Embedded => read_embedded_cover(track_path),
        CoverSource::File(path) => load_file(path),
    };
    art.unwrap_or_else(CoverArt::default_cover)
}

struct Worker {
    overrides: HashMap<TrackId, CoverSource>,
    memo: HashMap<String, CoverArt>,
}

impl Worker {
    fn remember(&mut self, art: &CoverArt) {
        let Some(hash) = art.hash.clone() else {
            return;
        };
        if self.memo.len() >= MEMO_CAPACITY {
            self.memo.clear();
        }
        self.memo.insert(hash, art.clone());
    }

    fn request(
        &mut self,
        track_id: TrackId,
        track_path: &Path,
        location: Option<PathBuf>,
        hash: Option<String>,
    ) -> CoverArt {
        if let Some(source) = self.overrides.get(&track_id) {
            return resolve(source, track_path);
        }

        if let Some(cached) = hash.as_ref().and_then(|h| self.memo.get(h)) {
            return cached.clone();
        }

        let art = location
            .as_deref()
            .and_then(load_file)
            .or_else(|| read_embedded_cover(track_path))
            .unwrap_or_else(CoverArt::default_cover);

        if let (Some(expected), Some(actual)) = (hash.as_deref(), art.hash.as_deref()) {
            if expected != actual {
                log::debug!("cover of {track_id:?} changed on disk ({expected} -> {actual})");
            }
        }

        self.remember(&art);
        art
    }
}

fn run_worker(rx: Receiver<CoverCmd>, found_tx: Sender<CoverFound>) {
    let mut worker = Worker {
        overrides: HashMap::new(),
        memo: HashMap::new(),
    };

    while let Ok(cmd) = rx.recv() {
        let (track_id, cover) = match cmd {
            CoverCmd::Request {
                track_id,
                track_path,
                location,
                hash,
            } => (track_id, worker.request(track_id, &track_path, location, hash)),
            CoverCmd::Change {
                track_id,
                track_path,
                source,
            } => {
                let art = resolve(&source, &track_path);
                worker.remember(&art);
                worker.overrides.insert(track_id, source);
                (track_id, art)
            }
            CoverCmd::Quit => break,
        };

        if found_tx.send(CoverFound { track_id, cover }).is_err() {
            break;
        }
    }
}
