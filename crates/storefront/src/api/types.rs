//! Domain types for the SofaHub REST API.
//!
//! Field names follow the API's JSON so most types deserialize directly.
//! Products go through a raw intermediate (see `conversions`) because the
//! backend is inconsistent about the name of the category field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sofahub_core::{
    Attributes, BlogPostId, CartItemId, CategoryId, ImageId, OrderId, OrderStatus, Price,
    ProductId, ProductTypeId, TagId, VariationId,
};

use super::conversions::RawProduct;

// =============================================================================
// Catalog Types
// =============================================================================

/// Product or blog image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub id: Option<ImageId>,
    /// Image URL.
    pub image: String,
    #[serde(default)]
    pub alt_text: String,
    #[serde(default)]
    pub is_primary: bool,
}

/// Room category (living room, bedroom, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

/// Product type (sofa, bed, dining table, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductType {
    pub id: ProductTypeId,
    pub name: String,
    pub slug: String,
}

/// Product or blog tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub slug: String,
    /// Display color, e.g. `#e11d48`.
    #[serde(default)]
    pub color_code: String,
}

/// A purchasable configuration of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariation {
    pub id: VariationId,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub attributes: Attributes,
    pub price: Price,
    #[serde(default)]
    pub stock_quantity: i32,
}

impl ProductVariation {
    /// Whether this variation can be added to a cart.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock_quantity > 0
    }
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawProduct")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// URL-safe unique identifier used in product links.
    pub slug: String,
    pub description: Option<String>,
    /// Price before any discount.
    pub base_price: Option<Price>,
    /// Price the shopper pays.
    pub current_price: Price,
    pub is_on_sale: bool,
    pub primary_image: Option<Image>,
    pub categories: Vec<Category>,
    pub tags: Vec<Tag>,
    pub images: Vec<Image>,
    pub variations: Vec<ProductVariation>,
}

impl Product {
    /// Gallery images, falling back to the primary image.
    #[must_use]
    pub fn gallery(&self) -> Vec<&Image> {
        if self.images.is_empty() {
            self.primary_image.iter().collect()
        } else {
            self.images.iter().collect()
        }
    }

    /// Look up a variation by id.
    #[must_use]
    pub fn variation(&self, id: VariationId) -> Option<&ProductVariation> {
        self.variations.iter().find(|v| v.id == id)
    }
}

// =============================================================================
// Cart Types
// =============================================================================

/// Snapshot of the variation a cart line refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItemVariation {
    pub id: VariationId,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub product_image: Option<String>,
    #[serde(default)]
    pub attributes: Attributes,
}

/// A line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub variation: CartItemVariation,
    pub quantity: u32,
    pub unit_price: Price,
    /// `unit_price * quantity` as computed by the server.
    pub total_price: Price,
}

/// A session-scoped shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub total_items: u32,
    #[serde(default)]
    pub subtotal: Price,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Cart {
    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up a line by id.
    #[must_use]
    pub fn item(&self, id: CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }
}

/// Body of `POST /cart/add/`.
#[derive(Debug, Clone, Serialize)]
pub struct AddToCartRequest<'a> {
    pub variation_id: VariationId,
    pub quantity: u32,
    pub session_id: &'a str,
}

/// Body of `PATCH /cart/items/{id}/`.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateCartItemRequest {
    pub quantity: u32,
}

// =============================================================================
// Order Types
// =============================================================================

/// Body of `POST /orders/checkout/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub mpesa_phone: String,
    /// Street address.
    pub shipping_address: String,
    pub shipping_city: String,
    /// Empty when no postal code was given.
    pub shipping_zip_code: String,
    pub session_id: String,
}

/// A line of a placed order, frozen at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub attributes: Attributes,
    pub quantity: u32,
    pub unit_price: Price,
    pub total_price: Price,
}

/// An order as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub order_number: String,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: String,
    #[serde(default)]
    pub customer_phone: String,
    #[serde(default)]
    pub shipping_address: String,
    #[serde(default)]
    pub shipping_city: String,
    #[serde(default)]
    pub payment_confirmed: bool,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub total_items: u32,
    #[serde(default)]
    pub subtotal: Price,
    #[serde(default)]
    pub total: Price,
    #[serde(default)]
    pub deposit_amount: Option<Price>,
    #[serde(default)]
    pub remaining_amount: Option<Price>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Amount collected through M-Pesa at checkout.
    ///
    /// Uses the server's figure, or half the subtotal if it was omitted.
    #[must_use]
    pub fn deposit(&self) -> Price {
        self.deposit_amount
            .unwrap_or_else(|| self.subtotal.deposit())
    }

    /// Amount collected on delivery.
    #[must_use]
    pub fn remaining(&self) -> Price {
        self.remaining_amount
            .unwrap_or_else(|| self.subtotal.balance())
    }
}

// =============================================================================
// Blog Types
// =============================================================================

/// How a blog post body is encoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Html,
    #[default]
    Text,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturedImage {
    pub image: String,
    #[serde(default)]
    pub alt_text: String,
}

/// A published blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: BlogPostId,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub content_type: ContentType,
    #[serde(default)]
    pub featured_image: Option<FeaturedImage>,
    #[serde(default)]
    pub author: Author,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub is_featured: bool,
}

/// Blog listings arrive either as a bare array or as a paginated page.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum BlogListing {
    Page { results: Vec<BlogPost> },
    List(Vec<BlogPost>),
}

impl From<BlogListing> for Vec<BlogPost> {
    fn from(listing: BlogListing) -> Self {
        match listing {
            BlogListing::Page { results } | BlogListing::List(results) => results,
        }
    }
}

// =============================================================================
// Contact Types
// =============================================================================

/// Body of `POST /contact/submit/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}
