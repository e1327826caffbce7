//! Constants shared by the image store and its callers.

/// URL path prefix under which stored images are referenced and served.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// Largest accepted upload, in bytes (1 MiB).
pub const MAX_IMAGE_BYTES: usize = 1024 * 1024;

/// Media type prefix every accepted upload must carry.
pub const IMAGE_MEDIA_TYPE_PREFIX: &str = "image/";
