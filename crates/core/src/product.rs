//! Product records and request input.
//!
//! Field names on the wire and in the collection document are the catalog's historical
//! names (`nama`, `kategori`, `harga`, `deskripsi`); the Rust fields use their meaning.

use crate::{NonEmptyText, ProductId};

/// A persisted product record.
///
/// Serialised in the key order `id, nama, kategori, harga, image, deskripsi`.
///
/// `image` is optional in storage so that records created before images were required still
/// load. Every record the repository writes carries one.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(rename = "nama")]
    pub name: NonEmptyText,
    #[serde(rename = "kategori")]
    pub category: NonEmptyText,
    #[serde(rename = "harga")]
    pub price: f64,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(rename = "deskripsi")]
    pub description: NonEmptyText,
}

/// Text fields of a create or update request, exactly as received.
///
/// `None` means the field was absent from the request. `price` is kept unparsed so the
/// validator can report it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFields {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<String>,
    pub description: Option<String>,
}

impl ProductFields {
    /// Assigns a form field by its wire name. Unknown names are ignored and reported back as
    /// `false`.
    pub fn set(&mut self, wire_name: &str, value: String) -> bool {
        let slot = match wire_name {
            "nama" => &mut self.name,
            "kategori" => &mut self.category,
            "harga" => &mut self.price,
            "deskripsi" => &mut self.description,
            _ => return false,
        };
        *slot = Some(value);
        true
    }
}
