//! Product endpoints.

use crate::dto::{
    MessageRes, ProductDto, ProductFormReq, ProductListRes, ProductRes, ValidationErrorRes,
};
use crate::error::ApiError;
use crate::form::read_product_form;
use crate::AppState;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path as AxumPath, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Json;

const DEFAULT_SCHEME: &str = "http";
const DEFAULT_HOST: &str = "localhost";

/// Scheme and host the client used to reach us, e.g. `http://localhost:3000`.
///
/// The scheme comes from `X-Forwarded-Proto` (first value) when a proxy sets it; the host from
/// the `Host` header.
pub fn base_url(headers: &HeaderMap) -> String {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    let scheme = header_value(header::HeaderName::from_static("x-forwarded-proto"))
        .unwrap_or(DEFAULT_SCHEME);
    let host = header_value(header::HOST).unwrap_or(DEFAULT_HOST);

    format!("{}://{}", scheme, host)
}

fn multipart_body(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Multipart, ApiError> {
    multipart.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

#[utoipa::path(
    post,
    path = "/products",
    request_body(content = ProductFormReq, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Product created", body = ProductRes),
        (status = 400, description = "Validation failed or upload rejected", body = ValidationErrorRes),
        (status = 500, description = "Internal server error", body = MessageRes)
    )
)]
/// Create a product from a multipart form
///
/// # Errors
/// Returns `400 Bad Request` if:
/// - a field fails validation (all failing fields are listed),
/// - the upload is not an image or exceeds the size limit, or
/// - the body is not a multipart form.
///
/// Returns `500 Internal Server Error` if the collection or the image cannot be written.
#[axum::debug_handler]
pub async fn create_product(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<ProductRes>), ApiError> {
    let form = read_product_form(multipart_body(multipart)?).await?;

    let product = state
        .repository
        .create(form.fields, form.image.as_ref())?;

    Ok((
        StatusCode::CREATED,
        Json(ProductRes {
            message: "Product created successfully !".into(),
            data: product.into(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/products",
    responses(
        (status = 200, description = "All products", body = ProductListRes),
        (status = 404, description = "No products found", body = MessageRes),
        (status = 500, description = "Internal server error", body = MessageRes)
    )
)]
/// List every product, with absolute image URLs
#[axum::debug_handler]
pub async fn list_products(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ProductListRes>, ApiError> {
    let products = state.repository.list(&base_url(&headers))?;

    Ok(Json(ProductListRes {
        message: "Products retrieved successfully!".into(),
        data: products.into_iter().map(ProductDto::from).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "The product", body = ProductRes),
        (status = 404, description = "Product not found", body = MessageRes),
        (status = 500, description = "Internal server error", body = MessageRes)
    )
)]
/// Fetch one product, with an absolute image URL
#[axum::debug_handler]
pub async fn get_product(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    headers: HeaderMap,
) -> Result<Json<ProductRes>, ApiError> {
    let product = state.repository.get(&id, &base_url(&headers))?;

    Ok(Json(ProductRes {
        message: "Product retrieved successfully!".into(),
        data: product.into(),
    }))
}

#[utoipa::path(
    put,
    path = "/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    request_body(content = ProductFormReq, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Product updated", body = ProductRes),
        (status = 400, description = "Validation failed or upload rejected", body = ValidationErrorRes),
        (status = 404, description = "Product not found", body = MessageRes),
        (status = 500, description = "Internal server error", body = MessageRes)
    )
)]
/// Update a product
///
/// Fields left out of the form keep their stored values. A new image replaces the stored one,
/// which is then deleted.
#[axum::debug_handler]
pub async fn update_product(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ProductRes>, ApiError> {
    let form = read_product_form(multipart_body(multipart)?).await?;

    let product = state
        .repository
        .update(&id, form.fields, form.image.as_ref())?;

    Ok(Json(ProductRes {
        message: "Product updated successfully !".into(),
        data: product.into(),
    }))
}

#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product deleted", body = MessageRes),
        (status = 404, description = "Product not found", body = MessageRes),
        (status = 500, description = "Internal server error", body = MessageRes)
    )
)]
/// Delete a product and its image
#[axum::debug_handler]
pub async fn delete_product(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<MessageRes>, ApiError> {
    state.repository.delete(&id)?;
    Ok(Json(MessageRes::new("Product deleted successfully !")))
}
