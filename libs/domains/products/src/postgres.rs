use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Select,
};
use sea_orm::sea_query::JoinType;

use crate::entity::{categories, products};
use crate::error::ProductResult;
use crate::models::{Category, NewProduct, PageRequest, Product, ProductFilter, ProductListing};
use crate::repository::ProductRepository;

/// PostgreSQL implementation of ProductRepository
///
/// Only portable SeaORM queries are used, so the same repository runs on the
/// SQLite database of the test suite.
#[derive(Clone)]
pub struct PgProductRepository {
    db: DatabaseConnection,
}

impl PgProductRepository {
    /// Create a new PostgreSQL product repository
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Products inner-joined with their category, narrowed by the filter
    fn joined(filter: &ProductFilter) -> Select<products::Entity> {
        let mut query = products::Entity::find()
            .join(JoinType::InnerJoin, products::Relation::Category.def());

        if let Some(name) = &filter.name {
            query = query.filter(products::Column::Name.contains(name.as_str()));
        }

        if let Some(category_id) = filter.category_id {
            query = query.filter(products::Column::CategoryId.eq(category_id));
        }

        query
    }

    /// Listing projection: product columns plus the category name
    fn project(query: Select<products::Entity>) -> Select<products::Entity> {
        query
            .select_only()
            .columns([
                products::Column::Id,
                products::Column::Name,
                products::Column::Price,
                products::Column::CategoryId,
            ])
            .column_as(categories::Column::Name, "category_name")
    }
}

// LIMIT/OFFSET are bound as signed 64-bit integers
fn clamp(value: u64) -> u64 {
    value.min(i64::MAX as u64)
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn count(&self, filter: ProductFilter) -> ProductResult<u64> {
        let total = Self::joined(&filter).count(&self.db).await?;
        Ok(total)
    }

    async fn list(
        &self,
        filter: ProductFilter,
        page: PageRequest,
    ) -> ProductResult<Vec<ProductListing>> {
        let results = Self::project(Self::joined(&filter))
            .order_by_asc(products::Column::Id)
            .offset(clamp(page.offset()))
            .limit(clamp(page.limit))
            .into_model::<ProductListing>()
            .all(&self.db)
            .await?;

        Ok(results)
    }

    async fn get_listing(&self, id: i32) -> ProductResult<Option<ProductListing>> {
        let result = Self::project(Self::joined(&ProductFilter::default()))
            .filter(products::Column::Id.eq(id))
            .into_model::<ProductListing>()
            .one(&self.db)
            .await?;

        Ok(result)
    }

    async fn get_by_id(&self, id: i32) -> ProductResult<Option<Product>> {
        let result = products::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Into::into);
        Ok(result)
    }

    async fn create(&self, input: NewProduct) -> ProductResult<Product> {
        let model: products::ActiveModel = input.into();
        let result = model.insert(&self.db).await?.into();
        Ok(result)
    }

    async fn update(&self, mut product: Product) -> ProductResult<Product> {
        product.updated_at = chrono::Utc::now();

        let model: products::ActiveModel = product.into();
        let result = model.update(&self.db).await?.into();
        Ok(result)
    }

    async fn delete(&self, id: i32) -> ProductResult<bool> {
        let result = products::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn get_category(&self, id: i32) -> ProductResult<Option<Category>> {
        let result = categories::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Into::into);
        Ok(result)
    }

    async fn list_categories(&self) -> ProductResult<Vec<Category>> {
        let results = categories::Entity::find()
            .order_by_asc(categories::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();
        Ok(results)
    }
}
