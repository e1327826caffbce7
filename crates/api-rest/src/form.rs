//! Multipart form parsing for create and update requests.

use crate::error::{ApiError, IMAGE_TOO_LARGE};
use axum::extract::multipart::{Field, Multipart, MultipartError};
use axum::http::StatusCode;
use catalog_core::{ProductFields, UploadedImage, MAX_IMAGE_BYTES};

/// Form field carrying the image file.
pub const IMAGE_FIELD: &str = "image";

/// A parsed product form: text fields as received plus the optional image.
#[derive(Debug, Default)]
pub struct ProductForm {
    pub fields: ProductFields,
    pub image: Option<UploadedImage>,
}

/// Reads every part of `multipart` into a [`ProductForm`].
///
/// Text parts are matched by wire name; unknown parts are drained and ignored. A file part with
/// no filename and no content (what browsers send for an empty file input) counts as absent.
/// The image is checked against the upload constraints before it is returned.
///
/// # Errors
///
/// Returns [`ApiError::BadRequest`] if the body is not valid multipart, a text part is not UTF-8,
/// the image is not an image, or it exceeds the size limit.
pub async fn read_product_form(mut multipart: Multipart) -> Result<ProductForm, ApiError> {
    let mut form = ProductForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == IMAGE_FIELD {
            form.image = read_image(field).await?;
            continue;
        }

        let value = field.text().await.map_err(multipart_error)?;
        if !form.fields.set(&name, value) {
            tracing::debug!("ignoring unknown form field {}", name);
        }
    }

    if let Some(image) = &form.image {
        image.check()?;
    }

    Ok(form)
}

async fn read_image(mut field: Field<'_>) -> Result<Option<UploadedImage>, ApiError> {
    let file_name = field
        .file_name()
        .map(str::to_string)
        .filter(|n| !n.is_empty());
    let content_type = field.content_type().map(str::to_string);

    let mut bytes = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if bytes.len() + chunk.len() > MAX_IMAGE_BYTES {
            return Err(ApiError::BadRequest(IMAGE_TOO_LARGE.into()));
        }
        bytes.extend_from_slice(&chunk);
    }

    if bytes.is_empty() && file_name.is_none() {
        return Ok(None);
    }

    Ok(Some(UploadedImage::new(bytes, file_name, content_type)))
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::BadRequest(IMAGE_TOO_LARGE.into());
    }
    ApiError::BadRequest(err.body_text())
}
