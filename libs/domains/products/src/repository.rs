use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{ProductError, ProductResult};
use crate::models::{Category, NewProduct, PageRequest, Product, ProductFilter, ProductListing};

/// Repository trait for Product persistence
///
/// Listing methods return products joined with their category. Products whose
/// category cannot be resolved are never returned nor counted.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Count products matching a filter, ignoring pagination
    async fn count(&self, filter: ProductFilter) -> ProductResult<u64>;

    /// One page of products matching a filter, ordered by id
    async fn list(
        &self,
        filter: ProductFilter,
        page: PageRequest,
    ) -> ProductResult<Vec<ProductListing>>;

    /// Get a product joined with its category name
    async fn get_listing(&self, id: i32) -> ProductResult<Option<ProductListing>>;

    /// Get the full stored record
    async fn get_by_id(&self, id: i32) -> ProductResult<Option<Product>>;

    /// Insert a product with a store-assigned id
    async fn create(&self, input: NewProduct) -> ProductResult<Product>;

    /// Persist every attribute of an existing product and bump `updated_at`
    async fn update(&self, product: Product) -> ProductResult<Product>;

    /// Delete a product by ID, returning whether a row was removed
    async fn delete(&self, id: i32) -> ProductResult<bool>;

    async fn get_category(&self, id: i32) -> ProductResult<Option<Category>>;

    /// All categories ordered by id
    async fn list_categories(&self) -> ProductResult<Vec<Category>>;
}

#[derive(Debug, Default)]
struct CatalogState {
    categories: BTreeMap<i32, Category>,
    products: BTreeMap<i32, Product>,
    next_id: i32,
}

impl CatalogState {
    fn listing(&self, product: &Product) -> Option<ProductListing> {
        self.categories
            .get(&product.category_id)
            .map(|category| ProductListing::from_parts(product, category))
    }

    fn matching<'a>(
        &'a self,
        filter: &'a ProductFilter,
    ) -> impl Iterator<Item = ProductListing> + 'a {
        self.products
            .values()
            .filter(|p| filter.matches(&p.name, p.category_id))
            .filter_map(|p| self.listing(p))
    }

    fn ensure_category(&self, category_id: i32) -> ProductResult<()> {
        if self.categories.contains_key(&category_id) {
            Ok(())
        } else {
            Err(ProductError::Database(format!(
                "FOREIGN KEY constraint failed: category {} does not exist",
                category_id
            )))
        }
    }
}

/// In-memory implementation of ProductRepository (for development/testing)
///
/// Enforces the category reference the way the database foreign key does.
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    state: Arc<RwLock<CatalogState>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_categories(categories: impl IntoIterator<Item = Category>) -> Self {
        Self::with_catalog(categories, Vec::new())
    }

    /// Seed both collections. New ids continue after the highest seeded product id.
    pub fn with_catalog(
        categories: impl IntoIterator<Item = Category>,
        products: impl IntoIterator<Item = Product>,
    ) -> Self {
        let categories: BTreeMap<i32, Category> =
            categories.into_iter().map(|c| (c.id, c)).collect();
        let products: BTreeMap<i32, Product> = products.into_iter().map(|p| (p.id, p)).collect();
        let next_id = products.keys().next_back().map_or(1, |id| id + 1);

        Self {
            state: Arc::new(RwLock::new(CatalogState {
                categories,
                products,
                next_id,
            })),
        }
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn count(&self, filter: ProductFilter) -> ProductResult<u64> {
        let state = self.state.read().await;
        Ok(state.matching(&filter).count() as u64)
    }

    async fn list(
        &self,
        filter: ProductFilter,
        page: PageRequest,
    ) -> ProductResult<Vec<ProductListing>> {
        let state = self.state.read().await;

        let result = state
            .matching(&filter)
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(page.limit).unwrap_or(usize::MAX))
            .collect();

        Ok(result)
    }

    async fn get_listing(&self, id: i32) -> ProductResult<Option<ProductListing>> {
        let state = self.state.read().await;
        Ok(state.products.get(&id).and_then(|p| state.listing(p)))
    }

    async fn get_by_id(&self, id: i32) -> ProductResult<Option<Product>> {
        let state = self.state.read().await;
        Ok(state.products.get(&id).cloned())
    }

    async fn create(&self, input: NewProduct) -> ProductResult<Product> {
        let mut state = self.state.write().await;
        state.ensure_category(input.category_id)?;

        let id = state.next_id.max(1);
        state.next_id = id + 1;

        let now = Utc::now();
        let product = Product {
            id,
            name: input.name,
            description: input.description,
            price: input.price,
            category_id: input.category_id,
            created_at: now,
            updated_at: now,
        };
        state.products.insert(id, product.clone());

        tracing::debug!(product_id = id, "Inserted product");
        Ok(product)
    }

    async fn update(&self, mut product: Product) -> ProductResult<Product> {
        let mut state = self.state.write().await;
        state.ensure_category(product.category_id)?;

        let stored = state.products.get_mut(&product.id).ok_or_else(|| {
            ProductError::Database(format!("product {} no longer exists", product.id))
        })?;
        product.updated_at = Utc::now();
        *stored = product.clone();

        Ok(product)
    }

    async fn delete(&self, id: i32) -> ProductResult<bool> {
        let mut state = self.state.write().await;
        Ok(state.products.remove(&id).is_some())
    }

    async fn get_category(&self, id: i32) -> ProductResult<Option<Category>> {
        let state = self.state.read().await;
        Ok(state.categories.get(&id).cloned())
    }

    async fn list_categories(&self) -> ProductResult<Vec<Category>> {
        let state = self.state.read().await;
        Ok(state.categories.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories() -> Vec<Category> {
        vec![
            Category {
                id: 1,
                name: "Electronics".to_string(),
            },
            Category {
                id: 2,
                name: "Books".to_string(),
            },
        ]
    }

    fn new_product(name: &str, price: f64, category_id: i32) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            price,
            category_id,
            description: None,
        }
    }

    async fn seeded() -> InMemoryProductRepository {
        let repo = InMemoryProductRepository::with_categories(categories());
        repo.create(new_product("Phone", 199.0, 1)).await.unwrap();
        repo.create(new_product("Tablet", 299.0, 1)).await.unwrap();
        repo.create(new_product("Rust Book", 39.0, 2)).await.unwrap();
        repo
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let repo = seeded().await;
        let product = repo.create(new_product("Laptop", 999.0, 1)).await.unwrap();
        assert_eq!(product.id, 4);
        assert_eq!(product.created_at, product.updated_at);
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_category() {
        let repo = seeded().await;
        let result = repo.create(new_product("Ghost", 1.0, 42)).await;
        assert!(matches!(result, Err(ProductError::Database(_))));
        assert_eq!(repo.count(ProductFilter::default()).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_list_filters_and_paginates_by_id() {
        let repo = seeded().await;

        let filter = ProductFilter::by_category(1);
        assert_eq!(repo.count(filter.clone()).await.unwrap(), 2);

        let page = repo
            .list(filter, PageRequest::new(Some(2), Some(1)))
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].name, "Tablet");
        assert_eq!(page[0].category_name, "Electronics");

        let filter = ProductFilter::new(Some("Book".to_string()), None);
        let page = repo.list(filter, PageRequest::default()).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].category_name, "Books");
    }

    #[tokio::test]
    async fn test_name_filter_is_case_sensitive() {
        let repo = seeded().await;
        let filter = ProductFilter::new(Some("phone".to_string()), None);
        assert_eq!(repo.count(filter).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_products_without_category_are_hidden() {
        let now = Utc::now();
        let orphan = Product {
            id: 7,
            name: "Orphan".to_string(),
            description: None,
            price: 5.0,
            category_id: 99,
            created_at: now,
            updated_at: now,
        };
        let repo = InMemoryProductRepository::with_catalog(categories(), vec![orphan]);

        assert_eq!(repo.count(ProductFilter::default()).await.unwrap(), 0);
        assert!(repo.get_listing(7).await.unwrap().is_none());
        assert!(repo.get_by_id(7).await.unwrap().is_some());

        let next = repo.create(new_product("Phone", 199.0, 1)).await.unwrap();
        assert_eq!(next.id, 8);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let repo = seeded().await;

        let mut product = repo.get_by_id(1).await.unwrap().unwrap();
        product.price = 149.0;
        let updated = repo.update(product).await.unwrap();
        assert_eq!(updated.price, 149.0);
        assert!(updated.updated_at >= updated.created_at);

        assert!(repo.delete(1).await.unwrap());
        assert!(!repo.delete(1).await.unwrap());
        assert!(repo.get_listing(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_rejects_unknown_category() {
        let repo = seeded().await;
        let mut product = repo.get_by_id(1).await.unwrap().unwrap();
        product.category_id = 42;

        let result = repo.update(product).await;
        assert!(matches!(result, Err(ProductError::Database(_))));
        assert_eq!(repo.get_by_id(1).await.unwrap().unwrap().category_id, 1);
    }
}
