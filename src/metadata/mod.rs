//! Audio tag extraction.
//!
//! The scanner and the cover loader only need two things from an audio file:
//! its title/artist and, optionally, an embedded picture. [`TagExtractor`] is
//! the seam for that; [`LoftyTagExtractor`] is the production implementation
//! backed by the lofty crate (ID3v2, Vorbis comments, MP4 atoms, ...).
//!
//! Extraction is synchronous; callers run it on the blocking pool.

use lofty::file::TaggedFileExt;
use lofty::picture::{MimeType, PictureType};
use lofty::probe::Probe;
use lofty::tag::Accessor;
use std::path::Path;

use crate::error::{Error, Result};

/// Title and artist read from an audio file's tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackTags {
    pub title: Option<String>,
    pub artist: Option<String>,
}

/// Picture data embedded in an audio file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedPicture {
    pub data: Vec<u8>,
    /// MIME type declared by the tag, if any
    pub mime_type: Option<String>,
}

/// Reads tags and embedded artwork from audio files.
pub trait TagExtractor: Send + Sync + 'static {
    /// Read title/artist. Errors mean the file could not be parsed at all.
    fn read_tags(&self, path: &Path) -> Result<TrackTags>;

    /// Read the embedded front cover, or the first picture when no picture
    /// is marked as front cover.
    fn read_picture(&self, path: &Path) -> Option<EmbeddedPicture>;
}

/// [`TagExtractor`] backed by lofty.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyTagExtractor;

impl TagExtractor for LoftyTagExtractor {
    fn read_tags(&self, path: &Path) -> Result<TrackTags> {
        let tagged_file = Probe::open(path)
            .map_err(|e| Error::metadata(path, e.to_string()))?
            .read()
            .map_err(|e| Error::metadata(path, e.to_string()))?;

        let Some(tag) = tagged_file
            .primary_tag()
            .or_else(|| tagged_file.first_tag())
        else {
            return Ok(TrackTags::default());
        };

        Ok(TrackTags {
            title: non_empty(tag.title().map(|s| s.to_string())),
            artist: non_empty(tag.artist().map(|s| s.to_string())),
        })
    }

    fn read_picture(&self, path: &Path) -> Option<EmbeddedPicture> {
        let tagged_file = Probe::open(path).ok()?.read().ok()?;
        let tag = tagged_file
            .primary_tag()
            .or_else(|| tagged_file.first_tag())?;

        let pictures = tag.pictures();
        let picture = pictures
            .iter()
            .find(|p| p.pic_type() == PictureType::CoverFront)
            .or_else(|| pictures.first())?;

        if picture.data().is_empty() {
            return None;
        }

        let mime_type = match picture.mime_type() {
            Some(MimeType::Jpeg) => Some("image/jpeg"),
            Some(MimeType::Png) => Some("image/png"),
            Some(MimeType::Gif) => Some("image/gif"),
            Some(MimeType::Bmp) => Some("image/bmp"),
            Some(MimeType::Tiff) => Some("image/tiff"),
            _ => None,
        };

        Some(EmbeddedPicture {
            data: picture.data().to_vec(),
            mime_type: mime_type.map(str::to_string),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
