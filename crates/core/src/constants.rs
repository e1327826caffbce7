//! Constants used throughout the catalog core crate.
//!
//! This module contains path and filename defaults to ensure consistency across the binaries
//! and the core services.

/// Default location of the product collection document when none is configured.
pub const DEFAULT_DATA_FILE: &str = "data/products.json";

/// Default directory for stored product images when none is configured.
pub const DEFAULT_UPLOADS_DIR: &str = "uploads";

/// Attempts at drawing an unused product id before giving up.
pub const MAX_ID_ATTEMPTS: usize = 5;

/// Content written to a freshly created collection document.
pub const EMPTY_COLLECTION: &str = "[]\n";
