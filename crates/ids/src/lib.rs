//! Identifier and filename generation.
//!
//! The catalog hands out two kinds of generated names:
//!
//! - **Product identifiers** ([`ProductId`]): six decimal digits in the range
//!   `100000..=999999`, e.g. `482913`. They are drawn at random and independently of the
//!   identifiers already in the collection; uniqueness is enforced by the repository, which
//!   checks each candidate against the loaded collection before accepting it.
//! - **Image filenames** ([`ImageFileName`]): `<unix-millis>-<random><.ext>`, e.g.
//!   `1760520000123-482913377.png`. The timestamp plus random suffix makes collisions unlikely;
//!   the image store additionally opens files with create-new semantics so a collision can
//!   never overwrite an existing file.
//!
//! ## Identifier form
//! Generated product identifiers are always canonical (six ASCII digits, no leading zero).
//! Identifiers read back from storage are treated as opaque tokens: any non-empty string is
//! accepted so historical records stay addressable.

mod image_name;
mod product_id;

pub use image_name::ImageFileName;
pub use product_id::ProductId;

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum IdError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type IdResult<T> = Result<T, IdError>;
