//! # API REST
//!
//! REST API implementation for the product catalog.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - Multipart form parsing and upload pre-validation
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, static serving of uploaded images)
//!
//! All data operations go through `catalog-core`.

#![warn(rust_2018_idioms)]

pub mod dto;
pub mod error;
pub mod form;
pub mod products;

use axum::extract::{DefaultBodyLimit, State};
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use catalog_core::{ProductRepository, UPLOADS_URL_PREFIX};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use dto::{
    HealthRes, MessageRes, ProductDto, ProductFormReq, ProductListRes, ProductRes,
    ValidationErrorRes,
};
pub use error::ApiError;

/// Largest request body accepted. Image size itself is capped separately while the form is read.
pub const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

/// Application state shared across REST API handlers
#[derive(Clone)]
pub struct AppState {
    pub repository: ProductRepository,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        products::create_product,
        products::list_products,
        products::get_product,
        products::update_product,
        products::delete_product,
    ),
    components(schemas(
        HealthRes,
        MessageRes,
        ProductDto,
        ProductFormReq,
        ProductListRes,
        ProductRes,
        ValidationErrorRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router over `state`.
///
/// Uploaded images are served as static files under `/uploads`, straight from the repository's
/// uploads directory.
pub fn create_router(state: AppState) -> Router {
    let uploads = ServeDir::new(state.repository.images().uploads_dir());

    Router::new()
        .route("/health", get(health))
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/products/:id",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .nest_service(UPLOADS_URL_PREFIX, uploads)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "Catalog REST API is alive".into(),
    })
}
