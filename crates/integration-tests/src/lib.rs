//! Integration test harness for the FashionHub cart client.
//!
//! Runs an in-process mock of the storefront REST API on an ephemeral
//! port, with the same endpoints and merge semantics the real backend
//! exposes:
//!
//! - `POST /auth/login` - fixed test credentials for a fixed bearer token
//! - `GET /products/{id}` - seeded product snapshots
//! - `GET /cart` / `POST /cart` - list lines, add with duplicate-key merge
//! - `PUT /cart/{id}/{size}` / `DELETE /cart/{id}/{size}` / `DELETE /cart`
//!
//! Tests can seed products and cart lines, inject per-product add
//! failures, revoke the token mid-test, and inspect server-side cart
//! state directly.

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::Json;
use serde::Deserialize;
use serde_json::{Value, json};

use fashionhub_cart::{CartConfig, Notice, Notifier};
use fashionhub_core::Product;

/// Credentials the mock accepts on `POST /auth/login`.
pub const TEST_EMAIL: &str = "jane@example.com";
pub const TEST_PASSWORD: &str = "correct horse battery staple";

/// Bearer token issued for the test credentials.
pub const TEST_TOKEN: &str = "fh-test-token";

#[derive(Default)]
struct ServerState {
    products: HashMap<i64, Value>,
    cart: Vec<Value>,
    /// Product IDs whose `POST /cart` fails with a 500.
    failing_adds: HashSet<i64>,
    valid_token: String,
}

type Shared = Arc<Mutex<ServerState>>;

/// In-process mock of the storefront cart API.
pub struct MockApi {
    addr: SocketAddr,
    state: Shared,
}

impl MockApi {
    /// Bind an ephemeral port and start serving.
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(ServerState {
            valid_token: TEST_TOKEN.to_string(),
            ..ServerState::default()
        }));

        let app = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/products/{id}", get(get_product))
            .route(
                "/api/cart",
                get(get_cart).post(add_line).delete(clear_cart),
            )
            .route("/api/cart/{id}/{size}", put(update_line).delete(remove_line))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve mock API");
        });

        Self { addr, state }
    }

    /// Base URL to point `FASHIONHUB_API_URL`-style config at.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    fn lock(&self) -> MutexGuard<'_, ServerState> {
        self.state.lock().expect("server state lock")
    }

    /// Seed a product snapshot served by `GET /products/{id}`.
    pub fn insert_product(&self, product: &Product) {
        let value = serde_json::to_value(product).expect("serialize product");
        self.lock().products.insert(product.id.as_i64(), value);
    }

    /// Make `POST /cart` fail with a 500 for one product.
    pub fn fail_adds_for(&self, product_id: i64) {
        self.lock().failing_adds.insert(product_id);
    }

    /// Invalidate the issued token; subsequent calls get a 401.
    pub fn revoke_token(&self) {
        self.lock().valid_token = "revoked".to_string();
    }

    /// Seed a server-side cart line directly, bypassing the API.
    pub fn seed_cart_line(&self, product: &Product, size: &str, quantity: u32) {
        let line = json!({
            "productId": product.id.as_i64(),
            "product": serde_json::to_value(product).expect("serialize product"),
            "size": size,
            "quantity": quantity,
            "accessories": [],
        });
        self.lock().cart.push(line);
    }

    /// Snapshot of the server-side cart lines.
    #[must_use]
    pub fn cart_lines(&self) -> Vec<Value> {
        self.lock().cart.clone()
    }

    /// Server-side quantity for a `(product, size)` key, if present.
    #[must_use]
    pub fn cart_quantity(&self, product_id: i64, size: &str) -> Option<u64> {
        self.lock()
            .cart
            .iter()
            .find(|line| is_key(line, product_id, size))
            .and_then(|line| line["quantity"].as_u64())
    }
}

fn is_key(line: &Value, product_id: i64, size: &str) -> bool {
    line["productId"].as_i64() == Some(product_id) && line["size"].as_str() == Some(size)
}

fn authorized(state: &ServerState, headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {}", state.valid_token))
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(State(state): State<Shared>, Json(body): Json<LoginBody>) -> Response {
    let state = state.lock().expect("server state lock");
    if body.email == TEST_EMAIL && body.password == TEST_PASSWORD {
        Json(json!({ "token": state.valid_token })).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, "invalid credentials").into_response()
    }
}

async fn get_product(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    let state = state.lock().expect("server state lock");
    match state.products.get(&id) {
        Some(product) => Json(product.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "product not found").into_response(),
    }
}

async fn get_cart(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = state.lock().expect("server state lock");
    if !authorized(&state, &headers) {
        return (StatusCode::UNAUTHORIZED, "not authenticated").into_response();
    }
    Json(state.cart.clone()).into_response()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddLineBody {
    product_id: i64,
    size: String,
    quantity: u32,
    #[serde(default)]
    accessories: Vec<Value>,
}

async fn add_line(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<AddLineBody>,
) -> Response {
    let mut state = state.lock().expect("server state lock");
    if !authorized(&state, &headers) {
        return (StatusCode::UNAUTHORIZED, "not authenticated").into_response();
    }
    if state.failing_adds.contains(&body.product_id) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "add rejected").into_response();
    }
    let Some(product) = state.products.get(&body.product_id).cloned() else {
        return (StatusCode::NOT_FOUND, "product not found").into_response();
    };

    // Duplicate (productId, size) keys merge by summing quantities.
    if let Some(line) = state
        .cart
        .iter_mut()
        .find(|line| is_key(line, body.product_id, &body.size))
    {
        let merged = line["quantity"].as_u64().unwrap_or(0) + u64::from(body.quantity);
        line["quantity"] = json!(merged);
    } else {
        state.cart.push(json!({
            "productId": body.product_id,
            "product": product,
            "size": body.size,
            "quantity": body.quantity,
            "accessories": body.accessories,
        }));
    }
    StatusCode::CREATED.into_response()
}

#[derive(Deserialize)]
struct UpdateBody {
    quantity: u32,
}

async fn update_line(
    State(state): State<Shared>,
    Path((id, size)): Path<(i64, String)>,
    headers: HeaderMap,
    Json(body): Json<UpdateBody>,
) -> Response {
    let mut state = state.lock().expect("server state lock");
    if !authorized(&state, &headers) {
        return (StatusCode::UNAUTHORIZED, "not authenticated").into_response();
    }
    match state.cart.iter_mut().find(|line| is_key(line, id, &size)) {
        Some(line) => {
            line["quantity"] = json!(body.quantity);
            StatusCode::OK.into_response()
        }
        None => (StatusCode::NOT_FOUND, "cart line not found").into_response(),
    }
}

async fn remove_line(
    State(state): State<Shared>,
    Path((id, size)): Path<(i64, String)>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.lock().expect("server state lock");
    if !authorized(&state, &headers) {
        return (StatusCode::UNAUTHORIZED, "not authenticated").into_response();
    }
    let before = state.cart.len();
    state.cart.retain(|line| !is_key(line, id, &size));
    if state.cart.len() == before {
        (StatusCode::NOT_FOUND, "cart line not found").into_response()
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}

async fn clear_cart(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = state.lock().expect("server state lock");
    if !authorized(&state, &headers) {
        return (StatusCode::UNAUTHORIZED, "not authenticated").into_response();
    }
    state.cart.clear();
    StatusCode::NO_CONTENT.into_response()
}

/// Cart client config pointed at the mock API.
#[must_use]
pub fn test_config(api: &MockApi, profile_dir: &std::path::Path) -> CartConfig {
    CartConfig {
        api_url: url::Url::parse(&api.base_url()).expect("parse base url"),
        profile_dir: profile_dir.to_path_buf(),
        retention: chrono::Duration::days(30),
        request_timeout: std::time::Duration::from_secs(5),
    }
}

/// Notifier that records notices for assertions.
#[derive(Default)]
pub struct RecordingNotifier(Mutex<Vec<Notice>>);

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.0.lock().expect("notice lock").push(notice);
    }
}

impl RecordingNotifier {
    /// Drain recorded notices.
    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.0.lock().expect("notice lock"))
    }
}
