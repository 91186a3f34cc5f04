use chrono::{DateTime, Utc};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationErrors};

use crate::error::{Payload, ProductError};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

/// Product category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: i32,
    pub name: String,
}

/// Full stored product record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: i32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    pub category_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Merge a sanitized patch into the record.
    ///
    /// Returns `true` when at least one attribute actually changed.
    pub fn apply_patch(&mut self, patch: UpdateProduct) -> bool {
        let mut changed = false;

        if let Some(name) = patch.name {
            changed |= self.name != name;
            self.name = name;
        }
        if let Some(price) = patch.price {
            changed |= self.price != price;
            self.price = price;
        }
        if let Some(category_id) = patch.category_id {
            changed |= self.category_id != category_id;
            self.category_id = category_id;
        }
        if let Some(description) = patch.description {
            changed |= self.description.as_deref() != Some(description.as_str());
            self.description = Some(description);
        }

        changed
    }
}

/// Product joined with its category name, as returned by list and get
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, FromQueryResult)]
pub struct ProductListing {
    pub id: i32,
    pub name: String,
    pub price: f64,
    pub category_id: i32,
    pub category_name: String,
}

impl ProductListing {
    pub fn from_parts(product: &Product, category: &Category) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            category_id: product.category_id,
            category_name: category.name.clone(),
        }
    }
}

/// Raw create payload.
///
/// Every field is optional so that missing values surface as a `BadRequest`
/// with a readable message instead of a deserialization rejection. Numbers
/// may be sent as JSON numbers or numeric strings (form posts).
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreateProduct {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::f64")]
    #[schema(value_type = Option<f64>, example = 199.0)]
    pub price: Option<f64>,
    #[serde(default, alias = "categoryId", alias = "cat_id", deserialize_with = "lenient::i32")]
    #[schema(value_type = Option<i32>, example = 1)]
    pub category_id: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Validated create input handed to the repository
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct NewProduct {
    #[validate(length(min = 1, message = "name should not be empty"))]
    pub name: String,
    #[validate(range(exclusive_min = 0.0, message = "price must be a positive number"))]
    pub price: f64,
    #[validate(range(min = 1, message = "category_id must be a positive number"))]
    pub category_id: i32,
    pub description: Option<String>,
}

impl TryFrom<CreateProduct> for NewProduct {
    type Error = ProductError;

    fn try_from(input: CreateProduct) -> Result<Self, Self::Error> {
        let missing = |field: &str| {
            ProductError::bad_request(format!("{} should not be empty", field))
                .with_payload(Payload::EmptyObject)
        };

        let name = input
            .name
            .filter(|name| !name.is_empty())
            .ok_or_else(|| missing("name"))?;
        let price = input.price.ok_or_else(|| missing("price"))?;
        let category_id = input.category_id.ok_or_else(|| missing("category_id"))?;

        let product = NewProduct {
            name,
            price,
            category_id,
            description: input.description.filter(|d| !d.is_empty()),
        };

        product.validate().map_err(|errors| {
            ProductError::bad_request(validation_message(&errors))
                .with_payload(Payload::EmptyObject)
        })?;

        Ok(product)
    }
}

/// Sparse patch. Absent or falsy values (empty string, zero) keep the stored value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::f64")]
    #[schema(value_type = Option<f64>)]
    #[validate(range(exclusive_min = 0.0, message = "price must be a positive number"))]
    pub price: Option<f64>,
    #[serde(default, alias = "categoryId", alias = "cat_id", deserialize_with = "lenient::i32")]
    #[schema(value_type = Option<i32>)]
    #[validate(range(min = 1, message = "category_id must be a positive number"))]
    pub category_id: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
}

impl UpdateProduct {
    /// Drop falsy values so they fall back to the stored ones
    pub fn sanitized(self) -> Self {
        Self {
            name: self.name.filter(|name| !name.is_empty()),
            price: self.price.filter(|price| *price != 0.0),
            category_id: self.category_id.filter(|id| *id != 0),
            description: self.description.filter(|d| !d.is_empty()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.category_id.is_none()
            && self.description.is_none()
    }
}

/// Filter applied by the list operations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Case-sensitive substring of the product name
    pub name: Option<String>,
    pub category_id: Option<i32>,
}

impl ProductFilter {
    /// Empty names and non-positive category ids count as absent.
    pub fn new(name: Option<String>, category_id: Option<i32>) -> Self {
        Self {
            name: name.filter(|name| !name.is_empty()),
            category_id: category_id.filter(|id| *id > 0),
        }
    }

    pub fn by_category(category_id: i32) -> Self {
        Self {
            name: None,
            category_id: Some(category_id),
        }
    }

    pub fn matches(&self, name: &str, category_id: i32) -> bool {
        let name_match = self
            .name
            .as_deref()
            .is_none_or(|needle| name.contains(needle));
        let category_match = self.category_id.is_none_or(|id| id == category_id);

        name_match && category_match
    }
}

/// One-based page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Zero or absent values fall back to the defaults
    pub fn new(page: Option<u64>, limit: Option<u64>) -> Self {
        Self {
            page: page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE),
            limit: limit.filter(|l| *l > 0).unwrap_or(DEFAULT_LIMIT),
        }
    }

    /// Parse raw query values; anything that is not a positive integer is ignored
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        let parse = |raw: Option<&str>| raw.and_then(|value| value.trim().parse::<u64>().ok());
        Self::new(parse(page), parse(limit))
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }
}

/// Query string of `GET /products`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    /// Case-sensitive substring of the product name
    pub name: Option<String>,
    /// Exact category id
    #[serde(alias = "categoryId")]
    #[param(value_type = Option<i32>)]
    pub category_id: Option<String>,
    /// Page number, starting at 1 (default 1)
    #[param(value_type = Option<u64>)]
    pub page: Option<String>,
    /// Page size (default 10)
    #[param(value_type = Option<u64>)]
    pub limit: Option<String>,
}

impl ProductQuery {
    pub fn into_parts(self) -> (ProductFilter, PageRequest) {
        let category_id = self
            .category_id
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i32>().ok());
        let page = PageRequest::from_raw(self.page.as_deref(), self.limit.as_deref());

        (ProductFilter::new(self.name, category_id), page)
    }
}

/// Query string of `GET /products/category/{category_id}`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    #[param(value_type = Option<u64>)]
    pub page: Option<String>,
    #[param(value_type = Option<u64>)]
    pub limit: Option<String>,
}

impl PageQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::from_raw(self.page.as_deref(), self.limit.as_deref())
    }
}

/// Paginated list response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductPage {
    pub message: String,
    pub current_page: u64,
    pub total_pages: u64,
    pub data: Vec<ProductListing>,
}

/// Single product joined with its category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductDetail {
    pub message: String,
    pub data: ProductListing,
}

/// Created or updated product record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductRecord {
    pub message: String,
    pub data: Product,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusMessage {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryList {
    pub message: String,
    pub data: Vec<Category>,
}

/// Flatten validator errors into a single message, ordered by field name
pub(crate) fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|(a, _), (b, _)| a.cmp(b));

    fields
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Deserializers accepting a JSON number, a numeric string or null
pub(crate) mod lenient {
    use serde::de::{self, Deserializer, Visitor};
    use std::fmt;

    enum Number {
        Int(i64),
        Float(f64),
    }

    struct NumberVisitor;

    impl<'de> Visitor<'de> for NumberVisitor {
        type Value = Option<Number>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a number or a numeric string")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(Number::Int(v)))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            i64::try_from(v)
                .map(|v| Some(Number::Int(v)))
                .map_err(|_| E::custom("number out of range"))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(Number::Float(v)))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            let v = v.trim();
            if v.is_empty() {
                return Ok(None);
            }
            if let Ok(int) = v.parse::<i64>() {
                return Ok(Some(Number::Int(int)));
            }
            v.parse::<f64>()
                .map(|float| Some(Number::Float(float)))
                .map_err(|_| E::custom(format!("'{}' is not a numeric string", v)))
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
            d.deserialize_any(NumberVisitor)
        }
    }

    pub fn f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        match d.deserialize_any(NumberVisitor)? {
            None => Ok(None),
            Some(Number::Int(v)) => Ok(Some(v as f64)),
            Some(Number::Float(v)) if v.is_finite() => Ok(Some(v)),
            Some(Number::Float(_)) => Err(de::Error::custom("number must be finite")),
        }
    }

    pub fn i32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i32>, D::Error> {
        match d.deserialize_any(NumberVisitor)? {
            None => Ok(None),
            Some(Number::Int(v)) => i32::try_from(v)
                .map(Some)
                .map_err(|_| de::Error::custom("integer out of range")),
            Some(Number::Float(v)) if v.fract() == 0.0 && v.abs() <= i32::MAX as f64 => {
                Ok(Some(v as i32))
            }
            Some(Number::Float(v)) => Err(de::Error::custom(format!("{} is not an integer", v))),
        }
    }
}
