//! Load cover art embedded in audio file tags.

use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use super::{CoverArt, CoverSource, mime_from_bytes};
use crate::metadata::TagExtractor;

/// Read the embedded picture of `path` on the blocking pool.
///
/// The MIME type is sniffed from the picture bytes; the tag's declared type
/// is used only when sniffing fails. Returns `None` when the file has no
/// picture or cannot be read.
pub async fn load_embedded(extractor: &Arc<dyn TagExtractor>, path: &Path) -> Option<CoverArt> {
    let extractor = Arc::clone(extractor);
    let owned = path.to_path_buf();
    let picture = match tokio::task::spawn_blocking(move || extractor.read_picture(&owned)).await {
        Ok(picture) => picture?,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Embedded artwork task failed");
            return None;
        }
    };

    let mime_type = mime_from_bytes(&picture.data)
        .map(str::to_string)
        .or(picture.mime_type)
        .unwrap_or_else(|| "image/jpeg".to_string());

    Some(CoverArt {
        data: picture.data,
        mime_type,
        source: CoverSource::AudioEmbedded(path.to_path_buf()),
    })
}
