use std::path::Path;
use std::sync::Arc;

use lofty::file::TaggedFileExt;
use lofty::picture::{MimeType, Picture, PictureType};
use lofty::tag::Tag;

use super::types::{CoverArt, CoverSource};

/// Hex md5 of an image's bytes.
pub fn content_hash(data: &[u8]) -> String {
    format!("{:x}", md5::compute(data))
}

/// The front cover of `tag`, or its first picture when none is marked as such.
pub fn front_cover(tag: &Tag) -> Option<&Picture> {
    tag.pictures()
        .iter()
        .find(|p| p.pic_type() == PictureType::CoverFront)
        .or_else(|| tag.pictures().first())
}

fn mime_name(mime: Option<&MimeType>) -> Option<String> {
    let name = match mime? {
        MimeType::Jpeg => "image/jpeg",
        MimeType::Png => "image/png",
        MimeType::Tiff => "image/tiff",
        MimeType::Bmp => "image/bmp",
        MimeType::Gif => "image/gif",
        MimeType::Unknown(s) => return Some(s.clone()),
        _ => return None,
    };
    Some(name.to_string())
}

/// Read the cover embedded in the audio file at `path`.
pub fn read_embedded_cover(path: &Path) -> Option<CoverArt> {
    let tagged = match lofty::read_from_path(path) {
        Ok(t) => t,
        Err(e) => {
            log::debug!("no embedded cover in {}: {e}", path.display());
            return None;
        }
    };

    let picture = tagged.tags().iter().find_map(front_cover)?;
    if picture.data().is_empty() {
        return None;
    }

    Some(CoverArt {
        source: CoverSource::Embedded,
        location: None,
        hash: Some(content_hash(picture.data())),
        mime: mime_name(picture.mime_type()),
        data: Arc::from(picture.data()),
    })
}

/// md5 of the cover embedded in the audio file at `location`.
pub fn hash_of_embedded_cover(location: &Path) -> Option<String> {
    read_embedded_cover(location).and_then(|art| art.hash)
}
