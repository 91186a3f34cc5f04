use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

// ===== Categories Entity =====

pub mod categories {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "categories")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        #[sea_orm(column_type = "String(StringLen::N(255))", unique)]
        pub name: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::products::Entity")]
        Products,
    }

    impl Related<super::products::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Products.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for crate::models::Category {
        fn from(model: Model) -> Self {
            Self {
                id: model.id,
                name: model.name,
            }
        }
    }
}

// ===== Products Entity =====

pub mod products {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "products")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        #[sea_orm(column_type = "String(StringLen::N(255))")]
        pub name: String,
        #[sea_orm(column_type = "Text", nullable)]
        pub description: Option<String>,
        #[sea_orm(column_type = "Double")]
        pub price: f64,
        pub category_id: i32,
        pub created_at: DateTimeWithTimeZone,
        pub updated_at: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::categories::Entity",
            from = "Column::CategoryId",
            to = "super::categories::Column::Id",
            on_delete = "Restrict"
        )]
        Category,
    }

    impl Related<super::categories::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Category.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for crate::models::Product {
        fn from(model: Model) -> Self {
            Self {
                id: model.id,
                name: model.name,
                description: model.description,
                price: model.price,
                category_id: model.category_id,
                created_at: model.created_at.into(),
                updated_at: model.updated_at.into(),
            }
        }
    }

    impl From<crate::models::NewProduct> for ActiveModel {
        fn from(input: crate::models::NewProduct) -> Self {
            let now = chrono::Utc::now();
            ActiveModel {
                name: Set(input.name),
                description: Set(input.description),
                price: Set(input.price),
                category_id: Set(input.category_id),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
                ..Default::default()
            }
        }
    }

    impl From<crate::models::Product> for ActiveModel {
        fn from(product: crate::models::Product) -> Self {
            ActiveModel {
                id: Set(product.id),
                name: Set(product.name),
                description: Set(product.description),
                price: Set(product.price),
                category_id: Set(product.category_id),
                created_at: Set(product.created_at.into()),
                updated_at: Set(product.updated_at.into()),
            }
        }
    }
}
