//! Catalog Image Storage
//!
//! This crate stores, removes and presents the image files attached to product records.
//!
//! ## Design Principles
//!
//! - Product records never embed image bytes; they carry a *stored image reference*
//!   (`/uploads/<filename>`) pointing at a file in the uploads directory
//! - Stored files are never overwritten (create-new semantics, fresh name per upload)
//! - References are always root-relative in storage; absolute URLs are produced only for
//!   read responses ([`ImagesService::materialize`])
//! - Removal is best-effort from the caller's point of view: failures are reported as
//!   [`ImagesError::RemovalFailed`] and callers decide whether to abort (they log and continue)
//!
//! ## Storage Model
//!
//! ```text
//! uploads/
//! ├── 1760520000123-482913377.png
//! └── 1760520004410-901223845.jpg
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use catalog_images::{ImagesService, UploadedImage};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let service = ImagesService::new(Path::new("uploads"))?;
//! let upload = UploadedImage::new(std::fs::read("pen.png")?, Some("pen.png".into()), None);
//! upload.check()?;
//!
//! let stored = service.store(&upload)?;
//! println!("{}", service.materialize(stored.reference.as_str(), "http://localhost:3000"));
//! # Ok(())
//! # }
//! ```

mod constants;
mod images;
mod upload;

pub use constants::{IMAGE_MEDIA_TYPE_PREFIX, MAX_IMAGE_BYTES, UPLOADS_URL_PREFIX};
pub use images::{ImagesService, StoredImage};
pub use upload::UploadedImage;

/// Errors that can occur during image operations
#[derive(Debug, thiserror::Error)]
pub enum ImagesError {
    /// Uploads directory does not exist or is not a directory
    #[error("Invalid uploads directory: {0}")]
    InvalidUploadsDirectory(String),

    /// Reference is not a plain file under the uploads prefix
    #[error("Invalid image reference: {0}")]
    InvalidReference(String),

    /// Backing file of a stored reference could not be removed
    #[error("Failed to remove image {reference}: {source}")]
    RemovalFailed {
        reference: String,
        #[source]
        source: std::io::Error,
    },

    /// Upload is not an image
    #[error("Only image files are allowed")]
    NotAnImage,

    /// Upload exceeds the size ceiling
    #[error("Image exceeds the 1 MiB size limit ({0} bytes)")]
    TooLarge(usize),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
