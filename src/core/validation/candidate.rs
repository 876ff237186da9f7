//! Input files offered for optimization.

use crate::error::OptimizeError;
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where a candidate's bytes come from
#[derive(Debug, Clone)]
pub enum CandidateSource {
    /// Bytes already in memory
    Memory(Arc<[u8]>),
    /// Bytes read from disk when first needed
    File(PathBuf),
}

/// An unvalidated file offered for optimization.
///
/// The declared `size` and `media_type` are what validation looks at;
/// the content is only read by the optimizer.
#[derive(Debug, Clone)]
pub struct Candidate {
    name: String,
    size: u64,
    media_type: String,
    source: CandidateSource,
}

impl Candidate {
    /// Create a candidate from declared attributes
    pub fn new(
        name: impl Into<String>,
        size: u64,
        media_type: impl Into<String>,
        source: CandidateSource,
    ) -> Self {
        Self {
            name: name.into(),
            size,
            media_type: media_type.into(),
            source,
        }
    }

    /// Create a candidate from in-memory bytes; the size is the byte length
    pub fn from_bytes(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            media_type: media_type.into(),
            source: CandidateSource::Memory(bytes),
        }
    }

    /// Create a candidate for a file on disk.
    ///
    /// Only the metadata is read here; the media type comes from the extension.
    pub fn from_path(path: &Path) -> Result<Self, OptimizeError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let metadata = fs::metadata(path).map_err(|e| OptimizeError::Read {
            name: name.clone(),
            source: e,
        })?;

        let media_type = path
            .extension()
            .and_then(|e| e.to_str())
            .map(media_type_for_extension)
            .unwrap_or("application/octet-stream");

        Ok(Self {
            name,
            size: metadata.len(),
            media_type: media_type.to_string(),
            source: CandidateSource::File(path.to_path_buf()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn source(&self) -> &CandidateSource {
        &self.source
    }

    /// Read the candidate's content
    pub fn read_bytes(&self) -> Result<Cow<'_, [u8]>, OptimizeError> {
        match &self.source {
            CandidateSource::Memory(bytes) => Ok(Cow::Borrowed(bytes)),
            CandidateSource::File(path) => {
                fs::read(path)
                    .map(Cow::Owned)
                    .map_err(|e| OptimizeError::Read {
                        name: self.name.clone(),
                        source: e,
                    })
            }
        }
    }
}

/// Map a file extension to the media type a browser would declare for it
pub fn media_type_for_extension(ext: &str) -> &'static str {
    match ext.to_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn media_type_from_extension() {
        assert_eq!(media_type_for_extension("JPG"), "image/jpeg");
        assert_eq!(media_type_for_extension("png"), "image/png");
        assert_eq!(media_type_for_extension("svg"), "image/svg+xml");
        assert_eq!(media_type_for_extension("txt"), "application/octet-stream");
    }

    #[test]
    fn from_bytes_uses_byte_length() {
        let candidate = Candidate::from_bytes("a.png", "image/png", vec![1u8, 2, 3]);
        assert_eq!(candidate.size(), 3);
        assert_eq!(candidate.read_bytes().unwrap().as_ref(), &[1, 2, 3]);
    }

    #[test]
    fn from_path_reads_lazily() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("photo.JPEG");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(b"not really a jpeg").unwrap();
        drop(file);

        let candidate = Candidate::from_path(&path).unwrap();
        assert_eq!(candidate.name(), "photo.JPEG");
        assert_eq!(candidate.media_type(), "image/jpeg");
        assert_eq!(candidate.size(), 17);

        fs::remove_file(&path).unwrap();
        assert!(matches!(
            candidate.read_bytes(),
            Err(OptimizeError::Read { .. })
        ));
    }

    #[test]
    fn from_missing_path_fails() {
        let result = Candidate::from_path(Path::new("/nonexistent/photo.jpg"));
        assert!(result.is_err());
    }
}
