//! # Catalog Core
//!
//! Core business logic for the product catalog.
//!
//! This crate contains pure data operations and file/folder management:
//! - Product create, list, fetch, update and delete over a single JSON collection document
//! - Field validation with per-field messages
//! - Image lifecycle: store on create/update, remove on replacement or deletion
//!
//! **No API concerns**: HTTP servers, multipart parsing and response shaping belong in
//! `api-rest`; the operator CLI lives in `cli`.

pub mod config;
pub mod constants;
pub mod error;
pub mod product;
pub mod repositories;
pub mod store;
pub mod validation;

pub use config::{path_from_env_value, CoreConfig};
pub use error::{CatalogError, CatalogResult};
pub use product::{Product, ProductFields};
pub use repositories::products::ProductRepository;
pub use validation::{validate, FieldError, ProductCandidate};

pub use catalog_ids::ProductId;
pub use catalog_images::{
    ImagesError, ImagesService, StoredImage, UploadedImage, MAX_IMAGE_BYTES, UPLOADS_URL_PREFIX,
};
pub use catalog_types::NonEmptyText;
