//! SofaHub REST API client implementation.
//!
//! Uses `reqwest` 0.13 for HTTP. Caches product pages, default listings,
//! and filter metadata using `moka` (5-minute TTL by default).

mod cache;

use std::sync::Arc;

use moka::future::Cache;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use sofahub_core::{CartItemId, OrderId, VariationId};
use tracing::{debug, error, instrument, warn};
use url::Url;

use crate::api::types::{
    AddToCartRequest, BlogListing, BlogPost, Cart, Category, CheckoutRequest, ContactMessage,
    ContactResponse, Order, Product, ProductType, Tag, UpdateCartItemRequest,
};
use crate::api::{ApiError, CartApi, OrderApi};
use crate::catalog::CatalogQuery;
use crate::config::ApiConfig;

use cache::CacheValue;

/// Longest response body excerpt kept in errors and logs.
const BODY_EXCERPT_CHARS: usize = 200;

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the SofaHub REST API.
///
/// Cheap to clone; clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<String, CacheValue>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
                cache,
            }),
        })
    }

    /// The API root this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Build the absolute URL of an endpoint path such as `/cart/`.
    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let raw = format!("{}{path}", self.inner.base_url);
        Url::parse(&raw).map_err(|e| ApiError::Parse(format!("invalid endpoint URL {raw}: {e}")))
    }

    /// Build an endpoint URL carrying `?session_id=`.
    fn session_endpoint(&self, path: &str, session_id: &str) -> Result<Url, ApiError> {
        let mut url = self.endpoint(path)?;
        url.query_pairs_mut().append_pair("session_id", session_id);
        Ok(url)
    }

    /// Send a request and return the body of a successful response.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(
                status = %status,
                body = %excerpt(&body),
                "SofaHub API returned non-success status"
            );
            let message = if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("Unknown status").to_string()
            } else {
                excerpt(&body)
            };
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }

    /// Send a request and parse the JSON body.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let body = self.send(request).await?;

        serde_json::from_str(&body).map_err(|e| {
            error!(
                error = %e,
                body = %excerpt(&body),
                "Failed to parse SofaHub API response"
            );
            ApiError::Parse(e.to_string())
        })
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        self.execute(self.inner.client.get(url)).await
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// List products matching the shopper's selections.
    ///
    /// Listings without a search term are cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, query), fields(query = %query.to_query_string()))]
    pub async fn list_products(&self, query: &CatalogQuery) -> Result<Vec<Product>, ApiError> {
        let cacheable = query.search_term().is_none();
        let cache_key = format!("products:{}", query.to_query_string());

        if cacheable
            && let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let mut url = self.endpoint("/products/")?;
        url.query_pairs_mut().extend_pairs(query.to_query_pairs());

        let products: Vec<Product> = self.get(url).await?;

        if cacheable {
            self.inner
                .cache
                .insert(cache_key, CacheValue::Products(products.clone()))
                .await;
        }

        Ok(products)
    }

    /// Get a product by its slug.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown slug, or another error if
    /// the API request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn get_product(&self, slug: &str) -> Result<Product, ApiError> {
        let cache_key = format!("product:{slug}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let url = self.endpoint(&format!("/products/{}/", urlencoding::encode(slug)))?;
        let product: Product = self
            .get(url)
            .await
            .map_err(|e| e.or_not_found(|| format!("Product not found: {slug}")))?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// List room categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_room_categories(&self) -> Result<Vec<Category>, ApiError> {
        let cache_key = "room-categories".to_string();

        if let Some(CacheValue::Categories(categories)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for room categories");
            return Ok(categories);
        }

        let categories: Vec<Category> = self.get(self.endpoint("/products/room-categories/")?).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    /// List product types.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_product_types(&self) -> Result<Vec<ProductType>, ApiError> {
        let cache_key = "product-types".to_string();

        if let Some(CacheValue::ProductTypes(types)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product types");
            return Ok(types);
        }

        let types: Vec<ProductType> = self.get(self.endpoint("/products/product-types/")?).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::ProductTypes(types.clone()))
            .await;

        Ok(types)
    }

    /// List product tags.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_tags(&self) -> Result<Vec<Tag>, ApiError> {
        let cache_key = "product-tags".to_string();

        if let Some(CacheValue::Tags(tags)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product tags");
            return Ok(tags);
        }

        let tags: Vec<Tag> = self.get(self.endpoint("/products/tags/")?).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Tags(tags.clone()))
            .await;

        Ok(tags)
    }

    /// Drop every cached response.
    pub fn invalidate_cache(&self) {
        self.inner.cache.invalidate_all();
    }

    // =========================================================================
    // Cart Methods
    // =========================================================================

    /// Get the cart for a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(session_id = %session_id))]
    pub async fn fetch_cart(&self, session_id: &str) -> Result<Cart, ApiError> {
        self.get(self.session_endpoint("/cart/", session_id)?).await
    }

    /// Add a variation to a session's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(session_id = %session_id, variation_id = %variation_id))]
    pub async fn add_cart_item(
        &self,
        session_id: &str,
        variation_id: VariationId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        let body = AddToCartRequest {
            variation_id,
            quantity,
            session_id,
        };
        let request = self.inner.client.post(self.endpoint("/cart/add/")?).json(&body);
        self.send(request).await?;
        Ok(())
    }

    /// Change the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(session_id = %session_id, item_id = %item_id))]
    pub async fn update_cart_item(
        &self,
        session_id: &str,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        let url = self.session_endpoint(&format!("/cart/items/{item_id}/"), session_id)?;
        let request = self
            .inner
            .client
            .patch(url)
            .json(&UpdateCartItemRequest { quantity });
        self.send(request).await?;
        Ok(())
    }

    /// Remove a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(session_id = %session_id, item_id = %item_id))]
    pub async fn remove_cart_item(
        &self,
        session_id: &str,
        item_id: CartItemId,
    ) -> Result<(), ApiError> {
        let url = self.session_endpoint(&format!("/cart/items/{item_id}/delete/"), session_id)?;
        self.send(self.inner.client.delete(url)).await?;
        Ok(())
    }

    // =========================================================================
    // Order Methods
    // =========================================================================

    /// Place an order for the session's cart and trigger the M-Pesa prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, request), fields(session_id = %request.session_id))]
    pub async fn create_order(&self, request: &CheckoutRequest) -> Result<Order, ApiError> {
        let builder = self
            .inner
            .client
            .post(self.endpoint("/orders/checkout/")?)
            .json(request);
        self.execute(builder).await
    }

    /// Get an order by id.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown order, or another error if
    /// the API request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_order(&self, id: OrderId) -> Result<Order, ApiError> {
        self.get(self.endpoint(&format!("/orders/{id}/"))?)
            .await
            .map_err(|e| e.or_not_found(|| format!("Order not found: {id}")))
    }

    // =========================================================================
    // Blog Methods
    // =========================================================================

    /// List published blog posts.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_blog_posts(
        &self,
        search: Option<&str>,
        featured: Option<bool>,
        tags: Option<&str>,
    ) -> Result<Vec<BlogPost>, ApiError> {
        let mut url = self.endpoint("/blog/posts/")?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(search) = search.filter(|s| !s.trim().is_empty()) {
                pairs.append_pair("search", search);
            }
            if let Some(featured) = featured {
                pairs.append_pair("featured", if featured { "true" } else { "false" });
            }
            if let Some(tags) = tags.filter(|t| !t.trim().is_empty()) {
                pairs.append_pair("tags", tags);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }

        let listing: BlogListing = self.get(url).await?;
        Ok(listing.into())
    }

    /// Get a blog post by slug.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown slug, or another error if
    /// the API request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn get_blog_post(&self, slug: &str) -> Result<BlogPost, ApiError> {
        let url = self.endpoint(&format!("/blog/posts/{}/", urlencoding::encode(slug)))?;
        self.get(url)
            .await
            .map_err(|e| e.or_not_found(|| format!("Blog post not found: {slug}")))
    }

    /// List blog tags.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_blog_tags(&self) -> Result<Vec<Tag>, ApiError> {
        self.get(self.endpoint("/blog/tags/")?).await
    }

    // =========================================================================
    // Contact Methods
    // =========================================================================

    /// Submit the contact form.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, message), fields(subject = %message.subject))]
    pub async fn submit_contact(
        &self,
        message: &ContactMessage,
    ) -> Result<ContactResponse, ApiError> {
        let request = self
            .inner
            .client
            .post(self.endpoint("/contact/submit/")?)
            .json(message);
        self.execute(request).await
    }
}

impl CartApi for ApiClient {
    async fn get_cart(&self, session_id: &str) -> Result<Cart, ApiError> {
        self.fetch_cart(session_id).await
    }

    async fn add_item(
        &self,
        session_id: &str,
        variation_id: VariationId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        self.add_cart_item(session_id, variation_id, quantity).await
    }

    async fn update_item(
        &self,
        session_id: &str,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        self.update_cart_item(session_id, item_id, quantity).await
    }

    async fn remove_item(&self, session_id: &str, item_id: CartItemId) -> Result<(), ApiError> {
        self.remove_cart_item(session_id, item_id).await
    }
}

impl OrderApi for ApiClient {
    async fn checkout(&self, request: &CheckoutRequest) -> Result<Order, ApiError> {
        self.create_order(request).await
    }
}

/// First `BODY_EXCERPT_CHARS` characters of a response body.
fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}
