//! HTTP routing shim.
//!
//! The router is transport-neutral: it maps a fixed request struct to
//! inventory operations and produces a fixed response struct, so it can
//! be driven by any HTTP frontend (or directly from tests). The hyper
//! binding lives in [`server`].
//!
//! Dispatch order matters: the literal `/products/low-stock` and
//! `/products/search` paths are checked before the `/products/{id}`
//! pattern so those segments are never misread as product ids.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::inventory::{InventoryError, InventoryService};
use crate::product::{ProductDraft, ProductPatch};

pub mod server;

/// API-Gateway stage prefix stripped from incoming paths.
const STAGE_PREFIX: &str = "/prod";

/// Uniform CORS/content headers attached to every response.
pub const RESPONSE_HEADERS: [(&str, &str); 4] = [
    ("Content-Type", "application/json"),
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Headers", "Content-Type,Authorization"),
    ("Access-Control-Allow-Methods", "GET,POST,PUT,PATCH,DELETE,OPTIONS"),
];

/// Transport-neutral request shape.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Uppercase HTTP method.
    pub method: String,
    /// Path without query string.
    pub path: String,
    /// Raw query string, without the leading `?`.
    pub query: Option<String>,
    /// Request body, if any.
    pub body: Option<String>,
}

/// Transport-neutral response shape. Headers are uniform (see
/// [`RESPONSE_HEADERS`]) and added by the transport binding.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Value,
}

impl HttpResponse {
    fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    fn ok(body: Value) -> Self {
        Self::new(200, body)
    }

    fn error(status: u16, message: impl Into<String>) -> Self {
        Self::new(status, json!({ "error": message.into() }))
    }
}

/// Body of `PATCH /products/{id}/quantity`.
#[derive(Debug, Deserialize)]
struct QuantityBody {
    delta: i64,
}

/// Dispatch a request to the inventory service.
pub async fn route(service: &InventoryService, request: &HttpRequest) -> HttpResponse {
    if request.method == "OPTIONS" {
        return HttpResponse::ok(json!({ "message": "OK" }));
    }

    let path = request
        .path
        .strip_prefix(STAGE_PREFIX)
        .filter(|rest| rest.starts_with('/'))
        .unwrap_or(&request.path);

    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

    match (request.method.as_str(), segments.as_slice()) {
        ("GET", ["products"]) => list_products(service).await,
        ("GET", ["products", "low-stock"]) => list_low_stock(service).await,
        ("GET", ["products", "search"]) => search(service, request.query.as_deref()).await,
        ("GET", ["products", id]) => get_product(service, id).await,
        ("POST", ["products"]) => create_product(service, request.body.as_deref()).await,
        ("PUT", ["products", id]) => update_product(service, id, request.body.as_deref()).await,
        ("PATCH", ["products", id, "quantity"]) => {
            adjust_quantity(service, id, request.body.as_deref()).await
        }
        ("DELETE", ["products", id]) => delete_product(service, id).await,
        ("POST", ["products", id, "alert"]) => send_alert(service, id).await,
        _ => HttpResponse::new(
            404,
            json!({
                "error": "Route not found",
                "path": request.path,
                "method": request.method,
            }),
        ),
    }
}

async fn list_products(service: &InventoryService) -> HttpResponse {
    match service.list_all().await {
        Ok(products) => HttpResponse::ok(to_json(&products)),
        Err(e) => error_response(e),
    }
}

async fn list_low_stock(service: &InventoryService) -> HttpResponse {
    match service.list_low_stock().await {
        Ok(products) => HttpResponse::ok(to_json(&products)),
        Err(e) => error_response(e),
    }
}

async fn search(service: &InventoryService, query: Option<&str>) -> HttpResponse {
    let q = query.map(|raw| query_param(raw, "q")).unwrap_or_default();
    match service.search(&q).await {
        Ok(products) => HttpResponse::ok(to_json(&products)),
        Err(e) => error_response(e),
    }
}

async fn get_product(service: &InventoryService, id: &str) -> HttpResponse {
    match service.get(id).await {
        Ok(product) => HttpResponse::ok(to_json(&product)),
        // Missing product is 200/null on this endpoint, not 404.
        Err(InventoryError::NotFound) => HttpResponse::ok(Value::Null),
        Err(e) => error_response(e),
    }
}

async fn create_product(service: &InventoryService, body: Option<&str>) -> HttpResponse {
    let draft: ProductDraft = match parse_body(body) {
        Ok(draft) => draft,
        Err(response) => return response,
    };
    match service.create(draft).await {
        Ok(product) => HttpResponse::new(201, to_json(&product)),
        Err(e) => error_response(e),
    }
}

async fn update_product(service: &InventoryService, id: &str, body: Option<&str>) -> HttpResponse {
    let patch: ProductPatch = match parse_body(body) {
        Ok(patch) => patch,
        Err(response) => return response,
    };
    match service.update(id, patch).await {
        Ok(product) => HttpResponse::ok(to_json(&product)),
        Err(e) => error_response(e),
    }
}

async fn adjust_quantity(service: &InventoryService, id: &str, body: Option<&str>) -> HttpResponse {
    let body: QuantityBody = match parse_body(body) {
        Ok(body) => body,
        Err(response) => return response,
    };
    match service.adjust_quantity(id, body.delta).await {
        Ok(product) => HttpResponse::ok(to_json(&product)),
        Err(e) => error_response(e),
    }
}

async fn delete_product(service: &InventoryService, id: &str) -> HttpResponse {
    match service.delete(id).await {
        Ok(()) => HttpResponse::ok(json!({ "success": true })),
        Err(e) => error_response(e),
    }
}

async fn send_alert(service: &InventoryService, id: &str) -> HttpResponse {
    match service.send_alert_for(id).await {
        Ok(_) => HttpResponse::ok(json!({
            "success": true,
            "message": "Alert sent successfully",
        })),
        Err(e) => error_response(e),
    }
}

/// Map service errors to transport status codes.
///
/// Adapter error text passes through to the client unsanitized, which
/// mirrors the system this replaces; see DESIGN.md before tightening.
fn error_response(error: InventoryError) -> HttpResponse {
    match error {
        InventoryError::NotFound => HttpResponse::error(404, "Product not found"),
        InventoryError::Validation(message) => HttpResponse::error(400, message),
        InventoryError::Store(e) => HttpResponse::error(500, e.to_string()),
        InventoryError::Notify(e) => HttpResponse::error(500, e.to_string()),
    }
}

fn parse_body<T: serde::de::DeserializeOwned>(
    body: Option<&str>,
) -> std::result::Result<T, HttpResponse> {
    let raw = body.unwrap_or_default();
    serde_json::from_str(raw)
        .map_err(|e| HttpResponse::error(400, format!("Invalid request body: {}", e)))
}

fn to_json<T: serde::Serialize>(value: &T) -> Value {
    // Products always serialize; a failure here is a programming error.
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Extract a single parameter from a raw query string.
fn query_param(query: &str, name: &str) -> String {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| percent_decode(value))
        .unwrap_or_default()
}

/// Minimal percent-decoding for query parameter values.
fn percent_decode(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
                if let Some(byte) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                    out.push(byte);
                    i += 3;
                    continue;
                }
                out.push(b'%');
            }
            other => out.push(other),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
