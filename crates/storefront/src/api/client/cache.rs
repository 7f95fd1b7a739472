//! Cache types for SofaHub API responses.

use crate::api::types::{Category, Product, ProductType, Tag};

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(Vec<Product>),
    Categories(Vec<Category>),
    ProductTypes(Vec<ProductType>),
    Tags(Vec<Tag>),
}
