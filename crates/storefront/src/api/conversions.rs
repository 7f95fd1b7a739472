//! Raw API shapes and their conversion into domain types.

use serde::Deserialize;
use sofahub_core::{Price, ProductId};

use super::types::{Category, Image, Product, ProductVariation, Tag};

/// Product exactly as the API sends it.
///
/// Older endpoints name the category list `room_categories`; newer ones use
/// `categories`. Either may be missing.
#[derive(Debug, Deserialize)]
pub struct RawProduct {
    id: ProductId,
    name: String,
    slug: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    base_price: Option<Price>,
    current_price: Price,
    #[serde(default)]
    is_on_sale: bool,
    #[serde(default)]
    primary_image: Option<Image>,
    #[serde(default)]
    categories: Option<Vec<Category>>,
    #[serde(default)]
    room_categories: Option<Vec<Category>>,
    #[serde(default)]
    tags: Vec<Tag>,
    #[serde(default)]
    images: Vec<Image>,
    #[serde(default)]
    variations: Vec<ProductVariation>,
}

impl From<RawProduct> for Product {
    fn from(raw: RawProduct) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            slug: raw.slug,
            description: raw.description.filter(|d| !d.trim().is_empty()),
            base_price: raw.base_price,
            current_price: raw.current_price,
            is_on_sale: raw.is_on_sale,
            primary_image: raw.primary_image,
            categories: raw.categories.or(raw.room_categories).unwrap_or_default(),
            tags: raw.tags,
            images: raw.images,
            variations: raw.variations,
        }
    }
}
