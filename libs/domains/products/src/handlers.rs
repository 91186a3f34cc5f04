//! HTTP handlers for Products API

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::{ErrorBody, ProductResult};
use crate::extract::{IdPath, JsonOrForm};
use crate::models::{
    Category, CategoryList, CreateProduct, PageQuery, Product, ProductDetail, ProductListing,
    ProductPage, ProductQuery, ProductRecord, StatusMessage, UpdateProduct,
};
use crate::repository::ProductRepository;
use crate::service::ProductService;

pub const TAG: &str = "products";
pub const CATEGORIES_TAG: &str = "categories";

/// OpenAPI documentation for Products API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        create_product,
        list_products_by_category,
        get_product,
        update_product,
        delete_product,
        list_categories,
    ),
    components(
        schemas(
            Product, ProductListing, Category, CreateProduct, UpdateProduct,
            ProductPage, ProductDetail, ProductRecord, StatusMessage, CategoryList,
            ErrorBody
        )
    ),
    tags(
        (name = TAG, description = "Product catalog endpoints"),
        (name = CATEGORIES_TAG, description = "Product categories")
    )
)]
pub struct ApiDoc;

/// Create the products router with all HTTP endpoints
pub fn router<R: ProductRepository + 'static>(service: ProductService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/category/{category_id}",
            get(list_products_by_category),
        )
        .route(
            "/products/{id}",
            get(get_product).patch(update_product).delete(delete_product),
        )
        .route("/categories", get(list_categories))
        .with_state(shared_service)
}

/// List products with optional filters and pagination
#[utoipa::path(
    get,
    path = "/products",
    tag = TAG,
    params(ProductQuery),
    responses(
        (status = 200, description = "Page of products", body = ProductPage),
        (status = 404, description = "No product on the requested page", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
async fn list_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Query(query): Query<ProductQuery>,
) -> ProductResult<Json<ProductPage>> {
    let (filter, page) = query.into_parts();
    let products = service.list_products(filter, page).await?;
    Ok(Json(products))
}

/// Create a new product
#[utoipa::path(
    post,
    path = "/products",
    tag = TAG,
    request_body(
        content = CreateProduct,
        description = "JSON or form-urlencoded body"
    ),
    responses(
        (status = 201, description = "Product created successfully", body = ProductRecord),
        (status = 400, description = "Invalid input or rejected by the store", body = ErrorBody)
    )
)]
async fn create_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    JsonOrForm(input): JsonOrForm<CreateProduct>,
) -> ProductResult<impl IntoResponse> {
    let product = service.create_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// List products of one category
#[utoipa::path(
    get,
    path = "/products/category/{category_id}",
    tag = TAG,
    params(
        ("category_id" = i32, Path, description = "Category ID"),
        PageQuery
    ),
    responses(
        (status = 200, description = "Page of products", body = ProductPage),
        (status = 400, description = "Non-numeric category id", body = ErrorBody),
        (status = 404, description = "Unknown category or empty page", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
async fn list_products_by_category<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    IdPath(category_id): IdPath,
    Query(query): Query<PageQuery>,
) -> ProductResult<Json<ProductPage>> {
    service.get_category(category_id).await?;
    let products = service
        .list_products_by_category(category_id, query.page_request())
        .await?;
    Ok(Json(products))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/products/{id}",
    tag = TAG,
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = ProductDetail),
        (status = 400, description = "Non-numeric id", body = ErrorBody),
        (status = 404, description = "Product not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
async fn get_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    IdPath(id): IdPath,
) -> ProductResult<Json<ProductDetail>> {
    let product = service.get_product(id).await?;
    Ok(Json(product))
}

/// Patch a product. Empty or zero values leave the stored value unchanged.
#[utoipa::path(
    patch,
    path = "/products/{id}",
    tag = TAG,
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    request_body(
        content = UpdateProduct,
        description = "JSON or form-urlencoded body"
    ),
    responses(
        (status = 200, description = "Product updated successfully", body = ProductRecord),
        (status = 400, description = "Invalid input or rejected by the store", body = ErrorBody),
        (status = 404, description = "Product not found", body = ErrorBody)
    )
)]
async fn update_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    IdPath(id): IdPath,
    JsonOrForm(patch): JsonOrForm<UpdateProduct>,
) -> ProductResult<Json<ProductRecord>> {
    let product = service.update_product(id, patch).await?;
    Ok(Json(product))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/products/{id}",
    tag = TAG,
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product deleted successfully", body = StatusMessage),
        (status = 400, description = "Non-numeric id or rejected by the store", body = ErrorBody),
        (status = 404, description = "Product not found", body = ErrorBody)
    )
)]
async fn delete_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    IdPath(id): IdPath,
) -> ProductResult<Json<StatusMessage>> {
    let message = service.delete_product(id).await?;
    Ok(Json(message))
}

/// List all categories
#[utoipa::path(
    get,
    path = "/categories",
    tag = CATEGORIES_TAG,
    responses(
        (status = 200, description = "All categories", body = CategoryList),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
async fn list_categories<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
) -> ProductResult<Json<CategoryList>> {
    let categories = service.list_categories().await?;
    Ok(Json(categories))
}
