use sea_orm_migration::prelude::*;

use crate::m20250301_000001_create_categories::Categories;

/// Initial categories, inserted in id order
pub const SEED_CATEGORIES: [&str; 4] = ["Electronics", "Books", "Clothing", "Home & Garden"];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut insert = Query::insert();
        insert
            .into_table(Categories::Table)
            .columns([Categories::Name]);

        for name in SEED_CATEGORIES {
            insert.values_panic([name.into()]);
        }

        manager.exec_stmt(insert).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let delete = Query::delete()
            .from_table(Categories::Table)
            .and_where(Expr::col(Categories::Name).is_in(SEED_CATEGORIES))
            .to_owned();

        manager.exec_stmt(delete).await
    }
}
