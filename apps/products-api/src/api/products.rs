//! Products API routes

use axum::Router;
use chrono::Utc;
use domain_products::{
    handlers, Category, InMemoryProductRepository, PgProductRepository, Product, ProductService,
};
use migration::SEED_CATEGORIES;
use sea_orm::DatabaseConnection;

use crate::state::AppState;

/// Create products router on the configured store
pub fn router(state: &AppState) -> Router {
    match &state.db {
        Some(db) => postgres_router(db.clone()),
        None => handlers::router(ProductService::new(demo_catalog())),
    }
}

fn postgres_router(db: DatabaseConnection) -> Router {
    let repository = PgProductRepository::new(db);
    let service = ProductService::new(repository);
    handlers::router(service)
}

/// Seeded categories plus a few products, for running without a database.
pub fn demo_catalog() -> InMemoryProductRepository {
    let categories = SEED_CATEGORIES.iter().zip(1..).map(|(name, id)| Category {
        id,
        name: name.to_string(),
    });

    let now = Utc::now();
    let products = [
        ("Phone", 199.0, 1),
        ("Tablet", 299.0, 1),
        ("Rust in Action", 45.5, 2),
        ("Rain Jacket", 89.9, 3),
        ("Desk Lamp", 35.0, 4),
    ]
    .into_iter()
    .zip(1..)
    .map(|((name, price, category_id), id)| Product {
        id,
        name: name.to_string(),
        description: None,
        price,
        category_id,
        created_at: now,
        updated_at: now,
    });

    InMemoryProductRepository::with_catalog(categories, products)
}
