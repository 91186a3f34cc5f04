//! Integration tests for Products domain
//!
//! These tests run the SeaORM repository against a real database (in-memory
//! SQLite with the workspace migrations) to ensure:
//! - The category join and projection work
//! - Filtering, ordering and pagination are applied in SQL
//! - The category foreign key is enforced

use domain_products::*;
use test_utils::{assertions::*, seeded, TestDataBuilder, TestDatabase};

fn new_product(name: &str, price: f64, category_id: i32) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        price,
        category_id,
        description: None,
    }
}

/// Phone and Tablet in Electronics, one book
async fn seed_catalog(repo: &PgProductRepository) -> (Product, Product, Product) {
    let phone = repo
        .create(new_product("Phone", 199.0, seeded::ELECTRONICS))
        .await
        .unwrap();
    let tablet = repo
        .create(new_product("Tablet", 299.0, seeded::ELECTRONICS))
        .await
        .unwrap();
    let book = repo
        .create(new_product("Rust in Action", 45.5, seeded::BOOKS))
        .await
        .unwrap();
    (phone, tablet, book)
}

// ============================================================================
// Repository Tests
// ============================================================================

#[tokio::test]
async fn test_create_and_get_product() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("create_and_get");

    let input = NewProduct {
        name: builder.name("product", "main"),
        price: builder.price(),
        category_id: seeded::CLOTHING,
        description: Some("Integration test product".to_string()),
    };

    let created = repo.create(input.clone()).await.unwrap();
    assert!(created.id > 0);
    assert_eq!(created.name, input.name);
    assert_eq!(created.description, input.description);
    assert_price_eq(created.price, input.price, "created price");

    let listing = repo.get_listing(created.id).await.unwrap();
    let listing = assert_some(listing, "product listing should exist");
    assert_eq!(listing.id, created.id);
    assert_eq!(listing.category_id, seeded::CLOTHING);
    assert_eq!(listing.category_name, "Clothing");

    let record = repo.get_by_id(created.id).await.unwrap();
    let record = assert_some(record, "product record should exist");
    assert_eq!(record.name, created.name);
}

#[tokio::test]
async fn test_create_rejects_unknown_category() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());

    let result = repo.create(new_product("Ghost", 10.0, 999)).await;
    assert!(matches!(result, Err(ProductError::Database(_))));

    let total = repo.count(ProductFilter::default()).await.unwrap();
    assert_eq!(total, 0);
}

#[tokio::test]
async fn test_list_filters_by_name_and_category() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    let (phone, _, book) = seed_catalog(&repo).await;

    let filter = ProductFilter::new(Some("Pho".to_string()), None);
    assert_eq!(repo.count(filter.clone()).await.unwrap(), 1);
    let page = repo.list(filter, PageRequest::default()).await.unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, phone.id);
    assert_eq!(page[0].category_name, "Electronics");

    let filter = ProductFilter::by_category(seeded::BOOKS);
    let page = repo.list(filter, PageRequest::default()).await.unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, book.id);
    assert_eq!(page[0].category_name, "Books");

    let filter = ProductFilter::new(Some("Pho".to_string()), Some(seeded::BOOKS));
    assert_eq!(repo.count(filter).await.unwrap(), 0);
}

#[tokio::test]
async fn test_list_paginates_in_id_order() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    let (phone, tablet, book) = seed_catalog(&repo).await;

    let first = repo
        .list(ProductFilter::default(), PageRequest::new(Some(1), Some(2)))
        .await
        .unwrap();
    let ids: Vec<i32> = first.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![phone.id, tablet.id]);

    let second = repo
        .list(ProductFilter::default(), PageRequest::new(Some(2), Some(2)))
        .await
        .unwrap();
    let ids: Vec<i32> = second.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![book.id]);

    let beyond = repo
        .list(ProductFilter::default(), PageRequest::new(Some(3), Some(2)))
        .await
        .unwrap();
    assert!(beyond.is_empty());
}

#[tokio::test]
async fn test_update_persists_every_field() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    let (phone, _, _) = seed_catalog(&repo).await;

    let mut changed = phone.clone();
    changed.name = "Phone Pro".to_string();
    changed.category_id = seeded::HOME_AND_GARDEN;
    changed.description = Some("Now with a garden mode".to_string());

    let updated = repo.update(changed).await.unwrap();
    assert_eq!(updated.name, "Phone Pro");
    assert!(updated.updated_at >= phone.updated_at);

    let listing = assert_some(repo.get_listing(phone.id).await.unwrap(), "listing");
    assert_eq!(listing.category_name, "Home & Garden");
    assert_price_eq(listing.price, 199.0, "price untouched");
}

#[tokio::test]
async fn test_update_rejects_unknown_category() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    let (phone, _, _) = seed_catalog(&repo).await;

    let mut changed = phone.clone();
    changed.category_id = 999;

    let result = repo.update(changed).await;
    assert!(matches!(result, Err(ProductError::Database(_))));
}

#[tokio::test]
async fn test_delete_product() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    let (phone, _, _) = seed_catalog(&repo).await;

    assert!(repo.delete(phone.id).await.unwrap());
    assert!(!repo.delete(phone.id).await.unwrap());
    assert!(repo.get_listing(phone.id).await.unwrap().is_none());
    assert_eq!(repo.count(ProductFilter::default()).await.unwrap(), 2);
}

#[tokio::test]
async fn test_categories_are_seeded() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());

    let categories = repo.list_categories().await.unwrap();
    let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Electronics", "Books", "Clothing", "Home & Garden"]);

    let books = assert_some(
        repo.get_category(seeded::BOOKS).await.unwrap(),
        "books category",
    );
    assert_eq!(books.name, "Books");
    assert!(repo.get_category(999).await.unwrap().is_none());
}

// ============================================================================
// Service Tests (real database)
// ============================================================================

#[tokio::test]
async fn test_service_list_contract() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    seed_catalog(&repo).await;
    let service = ProductService::new(repo);

    let page = service
        .list_products(
            ProductFilter::by_category(seeded::ELECTRONICS),
            PageRequest::new(Some(2), Some(1)),
        )
        .await
        .unwrap();
    assert_eq!(page.message, "Success");
    assert_eq!(page.current_page, 2);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.data[0].name, "Tablet");

    let err = service
        .list_products(ProductFilter::default(), PageRequest::new(Some(9), Some(10)))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Could not find products.");
}

#[tokio::test]
async fn test_service_create_with_unknown_category_is_bad_request() {
    let db = TestDatabase::new().await;
    let service = ProductService::new(PgProductRepository::new(db.connection()));

    let err = service
        .create_product(CreateProduct {
            name: Some("Ghost".to_string()),
            price: Some(10.0),
            category_id: Some(999),
            description: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ProductError::BadRequest {
            payload: Payload::EmptyObject,
            ..
        }
    ));
}

#[tokio::test]
async fn test_service_update_and_delete_round() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    let (phone, _, _) = seed_catalog(&repo).await;
    let service = ProductService::new(repo);

    // Falsy values keep the stored ones and nothing is written
    let record = service
        .update_product(
            phone.id,
            UpdateProduct {
                name: Some(String::new()),
                price: Some(0.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(record.data.name, "Phone");
    assert_price_eq(record.data.price, 199.0, "price unchanged");
    assert_eq!(record.data.updated_at, phone.updated_at);

    let record = service
        .update_product(
            phone.id,
            UpdateProduct {
                price: Some(50.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(
        record.message,
        format!("Product with id {} has been updated.", phone.id)
    );
    assert_price_eq(record.data.price, 50.0, "price patched");
    assert_eq!(record.data.category_id, seeded::ELECTRONICS);

    let message = service.delete_product(phone.id).await.unwrap();
    assert_eq!(
        message.message,
        format!("Product with id {} has been deleted.", phone.id)
    );

    let err = service.get_product(phone.id).await.unwrap_err();
    assert!(err.is_not_found());
}
