use crate::validation::FieldError;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("validation failed: {}", join_field_errors(.0))]
    ValidationFailed(Vec<FieldError>),
    #[error("product not found: {0}")]
    NotFound(String),
    #[error("no products found")]
    NoProducts,

    #[error("product data file is corrupt: {0}")]
    StorageCorrupt(serde_json::Error),
    #[error("product data file is unavailable: {0}")]
    StorageUnavailable(std::io::Error),
    #[error("failed to serialize products: {0}")]
    Serialization(serde_json::Error),
    #[error(
        "failed to create directory (path: {path}): {source}",
        path = path.display()
    )]
    DirCreation {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("image storage error: {0}")]
    Image(#[from] catalog_images::ImagesError),
    #[error("failed to allocate a unique product id after {0} attempts")]
    IdAllocationFailed(usize),
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;
