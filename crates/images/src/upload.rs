//! Uploaded file descriptor handed over by the HTTP layer.

use crate::{ImagesError, IMAGE_MEDIA_TYPE_PREFIX, MAX_IMAGE_BYTES};
use std::path::Path;

/// An uploaded file, already read into memory.
///
/// The image store assumes uploads satisfy the type and size constraints; the component that
/// parses the request calls [`UploadedImage::check`] before handing the upload on.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    bytes: Vec<u8>,
    original_filename: Option<String>,
    content_type: Option<String>,
}

impl UploadedImage {
    pub fn new(
        bytes: Vec<u8>,
        original_filename: Option<String>,
        content_type: Option<String>,
    ) -> Self {
        Self {
            bytes,
            original_filename,
            content_type,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    pub fn original_filename(&self) -> Option<&str> {
        self.original_filename.as_deref()
    }

    /// Extension of the original filename, without the dot.
    pub fn extension(&self) -> Option<&str> {
        self.original_filename
            .as_deref()
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
    }

    /// Media type of the upload.
    ///
    /// The declared content type wins when present; otherwise the type is sniffed from the
    /// content. Sniffing is best-effort and returns `None` for unrecognised content.
    pub fn media_type(&self) -> Option<String> {
        let declared = self
            .content_type
            .as_deref()
            .map(str::trim)
            .filter(|ct| !ct.is_empty() && *ct != "application/octet-stream");

        match declared {
            Some(ct) => Some(ct.to_ascii_lowercase()),
            None => infer::get(&self.bytes).map(|kind| kind.mime_type().to_string()),
        }
    }

    /// Enforces the upload constraints: an `image/*` media type and at most 1 MiB.
    ///
    /// # Errors
    ///
    /// - [`ImagesError::NotAnImage`] if the media type is missing or not `image/*`
    /// - [`ImagesError::TooLarge`] if the content exceeds [`MAX_IMAGE_BYTES`]
    pub fn check(&self) -> Result<(), ImagesError> {
        let is_image = self
            .media_type()
            .is_some_and(|mt| mt.starts_with(IMAGE_MEDIA_TYPE_PREFIX));
        if !is_image {
            return Err(ImagesError::NotAnImage);
        }

        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(ImagesError::TooLarge(self.bytes.len()));
        }

        Ok(())
    }
}
