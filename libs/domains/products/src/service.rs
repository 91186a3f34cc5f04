//! Product Service - Business logic layer

use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use crate::error::{Payload, ProductError, ProductResult};
use crate::models::{
    validation_message, Category, CategoryList, CreateProduct, NewProduct, PageRequest,
    ProductDetail, ProductFilter, ProductPage, ProductRecord, StatusMessage, UpdateProduct,
};
use crate::repository::ProductRepository;

const SUCCESS: &str = "Success";

/// Product service providing the catalog operations
///
/// Read paths surface store failures as they are; mutation paths turn them
/// into `BadRequest` unless a `NotFound` was already raised.
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: ProductRepository> ProductService<R> {
    /// Create a new ProductService with the given repository
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// One page of products matching the filter
    ///
    /// An empty page is a `NotFound`, including pages past the last one.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        filter: ProductFilter,
        page: PageRequest,
    ) -> ProductResult<ProductPage> {
        let total = self.repository.count(filter.clone()).await?;
        let data = self.repository.list(filter, page).await?;

        if data.is_empty() {
            return Err(ProductError::no_products());
        }

        Ok(ProductPage {
            message: SUCCESS.to_string(),
            current_page: page.page,
            total_pages: page.total_pages(total),
            data,
        })
    }

    #[instrument(skip(self))]
    pub async fn list_products_by_category(
        &self,
        category_id: i32,
        page: PageRequest,
    ) -> ProductResult<ProductPage> {
        self.list_products(ProductFilter::by_category(category_id), page)
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_category(&self, id: i32) -> ProductResult<Category> {
        self.repository
            .get_category(id)
            .await?
            .ok_or_else(|| ProductError::category_not_found(id))
    }

    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> ProductResult<CategoryList> {
        let data = self.repository.list_categories().await?;
        Ok(CategoryList {
            message: SUCCESS.to_string(),
            data,
        })
    }

    /// Get a product joined with its category name
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: i32) -> ProductResult<ProductDetail> {
        let data = self.repository.get_listing(id).await?.ok_or_else(|| {
            ProductError::product_not_found(id).with_payload(Payload::EmptyObject)
        })?;

        Ok(ProductDetail {
            message: SUCCESS.to_string(),
            data,
        })
    }

    /// Create a new product
    #[instrument(skip(self, input))]
    pub async fn create_product(&self, input: CreateProduct) -> ProductResult<ProductRecord> {
        let input = NewProduct::try_from(input)?;

        let product = self
            .repository
            .create(input)
            .await
            .map_err(|e| e.into_bad_request().with_payload(Payload::EmptyObject))?;

        tracing::info!(product_id = product.id, "Created product");
        Ok(ProductRecord {
            message: format!("Product with id {} has been created.", product.id),
            data: product,
        })
    }

    /// Apply a sparse patch
    ///
    /// Only truthy values overwrite, so fields can never be cleared. A patch
    /// that changes nothing is not written back.
    #[instrument(skip(self, patch))]
    pub async fn update_product(
        &self,
        id: i32,
        patch: UpdateProduct,
    ) -> ProductResult<ProductRecord> {
        let mut product = self
            .repository
            .get_by_id(id)
            .await
            .map_err(ProductError::into_bad_request)?
            .ok_or_else(|| ProductError::product_not_found(id))?;

        let patch = patch.sanitized();
        patch
            .validate()
            .map_err(|errors| ProductError::bad_request(validation_message(&errors)))?;

        let product = if product.apply_patch(patch) {
            let updated = self
                .repository
                .update(product)
                .await
                .map_err(ProductError::into_bad_request)?;
            tracing::info!(product_id = id, "Updated product");
            updated
        } else {
            tracing::debug!(product_id = id, "Patch left product unchanged");
            product
        };

        Ok(ProductRecord {
            message: format!("Product with id {} has been updated.", id),
            data: product,
        })
    }

    /// Hard delete
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: i32) -> ProductResult<StatusMessage> {
        let deleted = self
            .repository
            .delete(id)
            .await
            .map_err(ProductError::into_bad_request)?;

        if !deleted {
            return Err(ProductError::product_not_found(id));
        }

        tracing::info!(product_id = id, "Deleted product");
        Ok(StatusMessage {
            message: format!("Product with id {} has been deleted.", id),
        })
    }
}
