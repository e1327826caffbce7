//! Uploads-directory image store
//!
//! This module provides the [`ImagesService`], which owns the lifecycle of the image files
//! attached to product records.
//!
//! # Architecture
//!
//! - **Records** hold a stored image reference (`/uploads/<filename>`), never bytes
//! - **Files** live flat in a single uploads directory, one file per upload
//! - **URLs** are derived from references on the read path only
//!
//! # Storage Location
//!
//! A reference `/uploads/<filename>` always maps to `<uploads_dir>/<filename>`. References whose
//! remainder is not exactly one plain path component are rejected, so a tampered record cannot
//! point removal outside the uploads directory.
//!
//! # Naming
//!
//! Filenames come from [`ImageFileName::generate`]. Files are opened with create-new semantics;
//! on the (unlikely) event of a name clash a new name is drawn, up to a fixed attempt limit.

use crate::{ImagesError, UploadedImage, UPLOADS_URL_PREFIX};
use catalog_ids::ImageFileName;
use catalog_types::NonEmptyText;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};

/// Attempts at drawing an unused filename before giving up.
const MAX_NAME_ATTEMPTS: usize = 5;

/// Result of storing an upload
///
/// `reference` is the value persisted in a product's `image` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Root-relative reference, `/uploads/<file_name>`
    pub reference: NonEmptyText,

    /// Size of the file in bytes
    pub size_bytes: u64,

    /// Media type of the upload, if known
    ///
    /// Best-effort: the declared content type, or a sniffed one.
    pub media_type: Option<String>,
}

/// Service for storing and removing product images
///
/// # Design
///
/// - Directory-scoped: each instance is bound to one uploads directory
/// - Immutable files: a stored file is never rewritten, replacements get a new name
/// - Defensive: references are validated before they are turned into paths
#[derive(Debug)]
pub struct ImagesService {
    /// Directory holding stored images
    uploads_dir: PathBuf,
}

impl ImagesService {
    /// Creates a new `ImagesService` over an existing uploads directory
    ///
    /// # Errors
    ///
    /// Returns [`ImagesError::InvalidUploadsDirectory`] if the directory does not exist, is not a
    /// directory, or cannot be canonicalised.
    pub fn new(uploads_dir: &Path) -> Result<Self, ImagesError> {
        if !uploads_dir.exists() {
            return Err(ImagesError::InvalidUploadsDirectory(format!(
                "Directory does not exist: {}",
                uploads_dir.display()
            )));
        }

        if !uploads_dir.is_dir() {
            return Err(ImagesError::InvalidUploadsDirectory(format!(
                "Path is not a directory: {}",
                uploads_dir.display()
            )));
        }

        let uploads_dir = uploads_dir.canonicalize().map_err(|e| {
            ImagesError::InvalidUploadsDirectory(format!(
                "Cannot canonicalize path {}: {}",
                uploads_dir.display(),
                e
            ))
        })?;

        Ok(Self { uploads_dir })
    }

    /// Writes an upload to the uploads directory under a freshly generated name
    ///
    /// The file is flushed to disk before this returns, so the returned reference is safe to
    /// persist.
    ///
    /// # Errors
    ///
    /// Returns [`ImagesError::Io`] if:
    /// - no unused filename could be drawn within the attempt limit
    /// - the file cannot be created, written or synced (a partially written file is removed)
    pub fn store(&self, upload: &UploadedImage) -> Result<StoredImage, ImagesError> {
        let extension = upload.extension();

        for _attempt in 0..MAX_NAME_ATTEMPTS {
            let file_name = ImageFileName::generate(extension);
            let path = self.uploads_dir.join(file_name.as_str());

            let mut file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(ImagesError::Io(std::io::Error::new(
                        e.kind(),
                        format!("Failed to create image file {}: {}", path.display(), e),
                    )))
                }
            };

            if let Err(e) = file.write_all(upload.bytes()).and_then(|()| file.sync_all()) {
                drop(file);
                if let Err(cleanup) = fs::remove_file(&path) {
                    tracing::warn!(
                        "failed to clean up partial image {}: {}",
                        path.display(),
                        cleanup
                    );
                }
                return Err(ImagesError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to write image file {}: {}", path.display(), e),
                )));
            }

            return Ok(StoredImage {
                reference: Self::reference_for(file_name.as_str()),
                size_bytes: upload.size_bytes() as u64,
                media_type: upload.media_type(),
            });
        }

        Err(ImagesError::Io(std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!(
                "failed to allocate a unique image filename after {} attempts",
                MAX_NAME_ATTEMPTS
            ),
        )))
    }

    /// Deletes the file backing a stored reference
    ///
    /// # Errors
    ///
    /// - [`ImagesError::InvalidReference`] if `reference` is not `/uploads/<plain filename>`
    /// - [`ImagesError::RemovalFailed`] if the file cannot be removed (including when it is
    ///   already gone)
    pub fn remove(&self, reference: &str) -> Result<(), ImagesError> {
        let path = self.path_for(reference)?;

        fs::remove_file(&path).map_err(|source| ImagesError::RemovalFailed {
            reference: reference.to_string(),
            source,
        })?;

        tracing::debug!("removed image {}", reference);
        Ok(())
    }

    /// Turns a stored reference into an absolute URL for client consumption
    ///
    /// `base_url` is the scheme and host of the current request, e.g.
    /// `http://localhost:3000`. The result has the form
    /// `<scheme>://<host>/uploads/<filename>`. References that are already absolute URLs are
    /// returned unchanged.
    pub fn materialize(&self, reference: &str, base_url: &str) -> String {
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return reference.to_string();
        }

        let base = base_url.trim_end_matches('/');
        if reference.starts_with('/') {
            format!("{}{}", base, reference)
        } else {
            format!("{}/{}", base, reference)
        }
    }

    /// Resolves a stored reference to the path of its backing file
    ///
    /// # Errors
    ///
    /// Returns [`ImagesError::InvalidReference`] if the reference does not name exactly one
    /// plain file under the uploads prefix.
    pub fn path_for(&self, reference: &str) -> Result<PathBuf, ImagesError> {
        let invalid = || ImagesError::InvalidReference(reference.to_string());

        let file_name = reference
            .strip_prefix(UPLOADS_URL_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(invalid)?;

        if file_name.contains('\\') {
            return Err(invalid());
        }

        let mut components = Path::new(file_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => Ok(self.uploads_dir.join(name)),
            _ => Err(invalid()),
        }
    }

    /// Returns the canonicalised uploads directory
    #[must_use]
    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    fn reference_for(file_name: &str) -> NonEmptyText {
        NonEmptyText::new(format!("{}/{}", UPLOADS_URL_PREFIX, file_name))
            .expect("reference always carries the uploads prefix")
    }
}
