//! Integration tests for SofaHub.
//!
//! The tests drive the real `reqwest`-based [`ApiClient`] against
//! [`FakeShop`], an in-process axum server that mimics the SofaHub REST API
//! closely enough to exercise the cart, checkout, and catalog flows end to
//! end.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p sofahub-integration-tests
//! ```
//!
//! # Catalog
//!
//! The fake serves one product, `lamu-sofa`, with three variations:
//!
//! | Variation | Attributes             | Price  | Stock |
//! |-----------|------------------------|--------|-------|
//! | 5         | color=red, size=S      | 45,000 | 3     |
//! | 6         | color=red, size=M      | 52,000 | 2     |
//! | 7         | color=blue, size=M     | 52,000 | 0     |
//!
//! Variation 7's attributes arrive as a JSON-encoded string with an
//! encoded value, the way some backend records are stored.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, Query, Request, State};
use axum::http::{Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use sofahub_storefront::api::ApiClient;
use sofahub_storefront::config::ApiConfig;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A request as seen by the fake backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    /// Path without the `/api` prefix, e.g. `/cart/add/`.
    pub path: String,
    pub query: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone)]
struct Failure {
    method: Method,
    path_prefix: String,
    status: StatusCode,
    body: String,
}

#[derive(Debug, Clone)]
struct Variation {
    id: i32,
    attributes: Value,
    price: i64,
    stock: i64,
}

#[derive(Debug, Clone, Copy)]
struct Line {
    id: i32,
    variation_id: i32,
    quantity: u32,
}

#[derive(Debug, Default)]
struct ShopState {
    variations: Vec<Variation>,
    carts: HashMap<String, Vec<Line>>,
    orders: HashMap<i32, Value>,
    next_line_id: i32,
    next_order_id: i32,
    requests: Vec<RecordedRequest>,
    failures: Vec<Failure>,
}

type Shared = Arc<Mutex<ShopState>>;

fn lock(state: &Shared) -> MutexGuard<'_, ShopState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

const PRODUCT_NAME: &str = "Lamu Sofa";
const PRODUCT_SLUG: &str = "lamu-sofa";

fn seed_variations() -> Vec<Variation> {
    vec![
        Variation {
            id: 5,
            attributes: json!({"color": "red", "size": "S"}),
            price: 45_000,
            stock: 3,
        },
        Variation {
            id: 6,
            attributes: json!({"color": "red", "size": "M"}),
            price: 52_000,
            stock: 2,
        },
        Variation {
            id: 7,
            attributes: Value::String(r#"{"color": "\"blue\"", "size": "M"}"#.to_string()),
            price: 52_000,
            stock: 0,
        },
    ]
}

// =============================================================================
// FakeShop
// =============================================================================

/// In-process fake of the SofaHub API bound to an ephemeral local port.
///
/// The server task is aborted when the `FakeShop` is dropped.
pub struct FakeShop {
    addr: SocketAddr,
    state: Shared,
    server: JoinHandle<()>,
}

impl FakeShop {
    /// Start the fake server.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    #[allow(clippy::expect_used)]
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(ShopState {
            variations: seed_variations(),
            next_order_id: 122,
            ..ShopState::default()
        }));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake shop");
        let addr = listener.local_addr().expect("Failed to read local address");

        let app = Router::new().nest("/api", routes(state.clone()));
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// API base URL, e.g. `http://127.0.0.1:40123/api`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Client configuration pointing at this server.
    ///
    /// # Panics
    ///
    /// Panics if the base URL is rejected.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn config(&self) -> ApiConfig {
        ApiConfig::with_base_url(&self.base_url()).expect("Invalid fake shop URL")
    }

    /// A fresh client pointing at this server.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.config()).expect("Failed to build API client")
    }

    /// Answer `method` requests whose path starts with `path_prefix` with
    /// `status` and `body` until [`recover`](Self::recover) is called.
    pub fn fail(&self, method: Method, path_prefix: &str, status: u16, body: &str) {
        lock(&self.state).failures.push(Failure {
            method,
            path_prefix: path_prefix.to_string(),
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body: body.to_string(),
        });
    }

    /// Clear all injected failures.
    pub fn recover(&self) {
        lock(&self.state).failures.clear();
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state).requests.clone()
    }

    /// Number of `method` requests whose path starts with `path_prefix`.
    #[must_use]
    pub fn count(&self, method: &Method, path_prefix: &str) -> usize {
        lock(&self.state)
            .requests
            .iter()
            .filter(|r| r.method == *method && r.path.starts_with(path_prefix))
            .count()
    }

    /// Number of lines in a session's server-side cart.
    #[must_use]
    pub fn cart_lines(&self, session_id: &str) -> usize {
        lock(&self.state).carts.get(session_id).map_or(0, Vec::len)
    }
}

impl Drop for FakeShop {
    fn drop(&mut self) {
        self.server.abort();
    }
}

// =============================================================================
// Routes
// =============================================================================

fn routes(state: Shared) -> Router {
    Router::new()
        .route("/products/", get(list_products))
        .route("/products/room-categories/", get(room_categories))
        .route("/products/product-types/", get(product_types))
        .route("/products/tags/", get(product_tags))
        .route("/products/{slug}/", get(get_product))
        .route("/cart/", get(get_cart))
        .route("/cart/add/", post(add_to_cart))
        .route("/cart/items/{id}/", patch(update_item))
        .route("/cart/items/{id}/delete/", delete(remove_item))
        .route("/orders/checkout/", post(checkout))
        .route("/orders/{id}/", get(get_order))
        .route("/blog/posts/", get(blog_posts))
        .route("/blog/posts/{slug}/", get(blog_post))
        .route("/blog/tags/", get(product_tags))
        .route("/contact/submit/", post(contact))
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

/// Record every request and short-circuit injected failures.
async fn record(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let path = request
        .uri()
        .path()
        .strip_prefix("/api")
        .unwrap_or_else(|| request.uri().path())
        .to_string();

    let recorded = RecordedRequest {
        method: request.method().clone(),
        path,
        query: request.uri().query().map(str::to_string),
        content_type: request
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    };

    let failure = {
        let mut shop = lock(&state);
        let failure = shop
            .failures
            .iter()
            .find(|f| f.method == recorded.method && recorded.path.starts_with(&f.path_prefix))
            .cloned();
        shop.requests.push(recorded);
        failure
    };

    if let Some(failure) = failure {
        return (failure.status, failure.body).into_response();
    }

    next.run(request).await
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn money(shillings: i64) -> String {
    format!("{shillings}.00")
}

// =============================================================================
// Catalog Handlers
// =============================================================================

fn product_json(shop: &ShopState) -> Value {
    let variations: Vec<Value> = shop
        .variations
        .iter()
        .map(|v| {
            json!({
                "id": v.id,
                "sku": format!("LAMU-{}", v.id),
                "attributes": v.attributes,
                "price": money(v.price),
                "stock_quantity": v.stock,
            })
        })
        .collect();

    json!({
        "id": 1,
        "name": PRODUCT_NAME,
        "slug": PRODUCT_SLUG,
        "description": "Three-seater in washable linen.",
        "base_price": money(50_000),
        "current_price": money(45_000),
        "is_on_sale": true,
        "primary_image": {"id": 1, "image": "/media/lamu.jpg", "alt_text": "Lamu Sofa", "is_primary": true},
        "room_categories": [{"id": 1, "name": "Living Room", "slug": "living-room"}],
        "tags": [{"id": 1, "name": "On Sale", "slug": "on-sale", "color_code": "#e11d48"}],
        "images": [],
        "variations": variations,
    })
}

async fn list_products(State(state): State<Shared>) -> Json<Value> {
    let shop = lock(&state);
    Json(json!([product_json(&shop)]))
}

async fn get_product(State(state): State<Shared>, Path(slug): Path<String>) -> Response {
    if slug != PRODUCT_SLUG {
        return error(StatusCode::NOT_FOUND, "Not found.");
    }
    let shop = lock(&state);
    Json(product_json(&shop)).into_response()
}

async fn room_categories() -> Json<Value> {
    Json(json!([
        {"id": 1, "name": "Living Room", "slug": "living-room"},
        {"id": 2, "name": "Bedroom", "slug": "bedroom"},
    ]))
}

async fn product_types() -> Json<Value> {
    Json(json!([{"id": 1, "name": "Sofa", "slug": "sofa"}]))
}

async fn product_tags() -> Json<Value> {
    Json(json!([
        {"id": 1, "name": "On Sale", "slug": "on-sale", "color_code": "#e11d48"},
        {"id": 2, "name": "New Arrival", "slug": "new-arrival", "color_code": "#2563eb"},
    ]))
}

// =============================================================================
// Cart Handlers
// =============================================================================

#[derive(Debug, Deserialize)]
struct SessionQuery {
    session_id: String,
}

#[derive(Debug, Deserialize)]
struct AddBody {
    variation_id: i32,
    quantity: u32,
    session_id: String,
}

#[derive(Debug, Deserialize)]
struct UpdateBody {
    quantity: u32,
}

fn cart_json(shop: &ShopState, session_id: &str) -> Value {
    let lines = shop.carts.get(session_id).cloned().unwrap_or_default();
    let mut subtotal = 0;
    let mut total_items = 0;

    let items: Vec<Value> = lines
        .iter()
        .filter_map(|line| {
            let variation = shop.variations.iter().find(|v| v.id == line.variation_id)?;
            let total = variation.price * i64::from(line.quantity);
            subtotal += total;
            total_items += line.quantity;
            Some(json!({
                "id": line.id,
                "variation": {
                    "id": variation.id,
                    "product_name": PRODUCT_NAME,
                    "product_image": "/media/lamu.jpg",
                    "attributes": variation.attributes,
                },
                "quantity": line.quantity,
                "unit_price": money(variation.price),
                "total_price": money(total),
            }))
        })
        .collect();

    json!({
        "session_id": session_id,
        "items": items,
        "total_items": total_items,
        "subtotal": money(subtotal),
        "created_at": "2026-01-15T09:30:00Z",
        "updated_at": "2026-01-15T09:30:00Z",
    })
}

async fn get_cart(State(state): State<Shared>, Query(query): Query<SessionQuery>) -> Json<Value> {
    let shop = lock(&state);
    Json(cart_json(&shop, &query.session_id))
}

async fn add_to_cart(State(state): State<Shared>, Json(body): Json<AddBody>) -> Response {
    let mut shop = lock(&state);

    let Some(stock) = shop
        .variations
        .iter()
        .find(|v| v.id == body.variation_id)
        .map(|v| v.stock)
    else {
        return error(StatusCode::NOT_FOUND, "Variation not found");
    };

    let in_cart: u32 = shop
        .carts
        .get(&body.session_id)
        .into_iter()
        .flatten()
        .filter(|line| line.variation_id == body.variation_id)
        .map(|line| line.quantity)
        .sum();
    if i64::from(in_cart + body.quantity) > stock {
        return error(StatusCode::BAD_REQUEST, "Insufficient stock");
    }

    shop.next_line_id += 1;
    let line_id = shop.next_line_id;
    let lines = shop.carts.entry(body.session_id.clone()).or_default();
    if let Some(line) = lines.iter_mut().find(|l| l.variation_id == body.variation_id) {
        line.quantity += body.quantity;
    } else {
        lines.push(Line {
            id: line_id,
            variation_id: body.variation_id,
            quantity: body.quantity,
        });
    }

    (StatusCode::CREATED, Json(cart_json(&shop, &body.session_id))).into_response()
}

async fn update_item(
    State(state): State<Shared>,
    Path(id): Path<i32>,
    Query(query): Query<SessionQuery>,
    Json(body): Json<UpdateBody>,
) -> Response {
    let mut shop = lock(&state);
    let Some(line) = shop
        .carts
        .get_mut(&query.session_id)
        .and_then(|lines| lines.iter_mut().find(|l| l.id == id))
    else {
        return error(StatusCode::NOT_FOUND, "Cart item not found");
    };
    line.quantity = body.quantity;
    Json(cart_json(&shop, &query.session_id)).into_response()
}

async fn remove_item(
    State(state): State<Shared>,
    Path(id): Path<i32>,
    Query(query): Query<SessionQuery>,
) -> Response {
    let mut shop = lock(&state);
    let Some(lines) = shop.carts.get_mut(&query.session_id) else {
        return error(StatusCode::NOT_FOUND, "Cart item not found");
    };
    lines.retain(|l| l.id != id);
    StatusCode::NO_CONTENT.into_response()
}

// =============================================================================
// Order Handlers
// =============================================================================

async fn checkout(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut shop = lock(&state);
    let session_id = body["session_id"].as_str().unwrap_or_default().to_string();

    let cart = cart_json(&shop, &session_id);
    let items = cart["items"].as_array().cloned().unwrap_or_default();
    if items.is_empty() {
        return error(StatusCode::BAD_REQUEST, "cart is empty");
    }

    let subtotal: i64 = shop
        .carts
        .get(&session_id)
        .into_iter()
        .flatten()
        .filter_map(|line| {
            shop.variations
                .iter()
                .find(|v| v.id == line.variation_id)
                .map(|v| v.price * i64::from(line.quantity))
        })
        .sum();

    shop.next_order_id += 1;
    let id = shop.next_order_id;

    let order_items: Vec<Value> = items
        .iter()
        .map(|item| {
            json!({
                "product_name": item["variation"]["product_name"],
                "sku": format!("LAMU-{}", item["variation"]["id"]),
                "attributes": item["variation"]["attributes"],
                "quantity": item["quantity"],
                "unit_price": item["unit_price"],
                "total_price": item["total_price"],
            })
        })
        .collect();

    let order = json!({
        "id": id,
        "order_number": format!("ORD-{id}"),
        "status": "pending",
        "customer_name": body["customer_name"],
        "customer_email": body["customer_email"],
        "customer_phone": body["customer_phone"],
        "shipping_address": body["shipping_address"],
        "shipping_city": body["shipping_city"],
        "payment_confirmed": false,
        "items": order_items,
        "total_items": cart["total_items"],
        "subtotal": money(subtotal),
        "total": money(subtotal),
        "deposit_amount": money(subtotal / 2),
        "remaining_amount": money(subtotal - subtotal / 2),
        "created_at": "2026-01-15T10:00:00Z",
    });

    shop.orders.insert(id, order.clone());
    shop.carts.remove(&session_id);
    (StatusCode::CREATED, Json(order)).into_response()
}

async fn get_order(State(state): State<Shared>, Path(id): Path<i32>) -> Response {
    let shop = lock(&state);
    shop.orders.get(&id).map_or_else(
        || error(StatusCode::NOT_FOUND, "Not found."),
        |order| Json(order.clone()).into_response(),
    )
}

// =============================================================================
// Blog and Contact Handlers
// =============================================================================

fn blog_post_json() -> Value {
    json!({
        "id": 1,
        "title": "Caring for Linen Sofas",
        "slug": "caring-for-linen-sofas",
        "excerpt": "Keep your sofa fresh through the rainy season.",
        "content": "Vacuum weekly and rotate cushions monthly.",
        "content_type": "text",
        "featured_image": null,
        "author": {"name": "SofaHub Team"},
        "published_at": "2026-01-10T08:00:00Z",
        "tags": [],
        "is_featured": true,
    })
}

async fn blog_posts() -> Json<Value> {
    Json(json!({"count": 1, "next": null, "previous": null, "results": [blog_post_json()]}))
}

async fn blog_post(Path(slug): Path<String>) -> Response {
    if slug == "caring-for-linen-sofas" {
        Json(blog_post_json()).into_response()
    } else {
        error(StatusCode::NOT_FOUND, "Not found.")
    }
}

async fn contact(Json(body): Json<Value>) -> Response {
    if body["email"].as_str().is_none_or(str::is_empty) {
        return error(StatusCode::BAD_REQUEST, "email is required");
    }
    Json(json!({
        "success": true,
        "message": "Thank you for contacting us. We'll get back to you soon.",
    }))
    .into_response()
}
