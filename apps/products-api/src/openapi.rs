//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Top-level document; domain paths are merged in by [`api_doc`].
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Products API",
        description = "Product catalog: products grouped into categories"
    ),
    servers(
        (url = "/api", description = "API root")
    )
)]
pub struct ApiDoc;

/// Full document served at `/api-docs/openapi.json`
pub fn api_doc() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi().merge_from(domain_products::ApiDoc::openapi())
}
