//! Request and response bodies of the REST API.
//!
//! Field names follow the catalog's wire names (`nama`, `kategori`, `harga`, `deskripsi`).

use catalog_core::Product;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ProductDto {
    #[schema(example = "482913")]
    pub id: String,
    #[schema(example = "Pen")]
    pub nama: String,
    #[schema(example = "Stationery")]
    pub kategori: String,
    #[schema(example = 2.5)]
    pub harga: f64,
    /// Absolute image URL on reads, stored `/uploads/<file>` reference on writes.
    pub image: Option<String>,
    #[schema(example = "Blue ink pen")]
    pub deskripsi: String,
}

impl From<Product> for ProductDto {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.to_string(),
            nama: product.name.into_string(),
            kategori: product.category.into_string(),
            harga: product.price,
            image: product.image,
            deskripsi: product.description.into_string(),
        }
    }
}

/// Multipart form accepted by create and update. Every field is optional on update.
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct ProductFormReq {
    pub nama: Option<String>,
    pub kategori: Option<String>,
    /// Decimal number, e.g. `19.99`.
    pub harga: Option<String>,
    pub deskripsi: Option<String>,
    /// Image file, `image/*`, at most 1 MiB.
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageRes {
    pub message: String,
}

impl MessageRes {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductRes {
    pub message: String,
    pub data: ProductDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductListRes {
    pub message: String,
    pub data: Vec<ProductDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ValidationErrorRes {
    pub message: String,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}
