//! End-to-end reconciliation scenarios
//!
//! Drives the full stack (router, auth middleware, ingest, orchestrator)
//! against the in-memory store and a recording webhook transport.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::Router;
use http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use shared::error::AppResult;
use shared::models::{OrderStatus, SyncField, SyncStatus};
use sync_server::catalog::{MemoryCatalog, Product, ProductCatalog};
use sync_server::core::{Config, ServerState};
use sync_server::store::{MemoryOrderStore, OrderStore};
use sync_server::sync::transport::{WebhookResponse, WebhookTransport};
use sync_server::sync::CrmConfig;

const API_KEY: &str = "test-inbound-key";

/// Records every outbound POST; URLs containing the configured fragment
/// answer 500
struct RecordingTransport {
    requests: Mutex<Vec<(String, Value)>>,
    fail_url_containing: Mutex<Option<&'static str>>,
}

impl RecordingTransport {
    fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            fail_url_containing: Mutex::new(None),
        }
    }

    fn fail_urls_containing(&self, fragment: &'static str) {
        *self.fail_url_containing.lock().unwrap() = Some(fragment);
    }

    fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().unwrap().clone()
    }

    fn urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|(url, _)| url).collect()
    }
}

#[async_trait]
impl WebhookTransport for RecordingTransport {
    async fn post_json(
        &self,
        url: &str,
        _headers: &[(&'static str, String)],
        body: &Value,
    ) -> AppResult<WebhookResponse> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), body.clone()));
        let fail = self
            .fail_url_containing
            .lock()
            .unwrap()
            .map(|fragment| url.contains(fragment))
            .unwrap_or(false);
        Ok(WebhookResponse {
            status: if fail { 500 } else { 200 },
            body: if fail { "boom" } else { "ok" }.to_string(),
        })
    }
}

struct TestHarness {
    router: Router,
    store: Arc<MemoryOrderStore>,
    transport: Arc<RecordingTransport>,
}

fn harness() -> TestHarness {
    harness_with_key(Some(API_KEY))
}

fn harness_with_key(inbound_key: Option<&str>) -> TestHarness {
    let config = Config {
        http_port: 0,
        environment: "test".to_string(),
        inbound_api_key: inbound_key.map(str::to_string),
        crm: CrmConfig {
            customer_endpoint: Some("https://crm.test/customer".into()),
            customer_api_key: Some("outbound-key".into()),
            invoice_status_endpoint: Some("https://crm.test/invoice-status".into()),
            invoice_status_api_key: None,
            payment_endpoint: Some("https://crm.test/payment".into()),
            payment_bearer_token: Some("bearer".into()),
        },
        webhook_timeout_secs: 15,
        log_dir: None,
    };

    let store = Arc::new(MemoryOrderStore::new());
    let catalog = Arc::new(MemoryCatalog::new());
    catalog.insert(Product {
        id: "P1".into(),
        sku: None,
        name: "Membership".into(),
        price: "50".parse().unwrap(),
        fulfillment_product_id: None,
    });
    let transport = Arc::new(RecordingTransport::new());

    let state = ServerState::with_collaborators(
        config,
        store.clone() as Arc<dyn OrderStore>,
        catalog as Arc<dyn ProductCatalog>,
        transport.clone() as Arc<dyn WebhookTransport>,
    );
    let router = sync_server::api::router(state.clone()).with_state(state);

    TestHarness {
        router,
        store,
        transport,
    }
}

async fn post_json(
    router: &Router,
    path: &str,
    api_key: Option<&str>,
    body: Value,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json");
    if let Some(key) = api_key {
        builder = builder.header("X-CRM-API-Key", key);
    }
    let request = builder
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn get_json(router: &Router, path: &str, api_key: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(key) = api_key {
        builder = builder.header("X-CRM-API-Key", key);
    }
    let request = builder.body(Body::empty()).unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn invoice_payload() -> Value {
    json!({
        "invoiceId": "INV1",
        "memberId": "M1",
        "email": "a@b.com",
        "memberName": "Kari Nordmann",
        "total": 100.0,
        "invoiceLines": [{"productId": "P1", "quantity": 2, "unitPrice": 50}]
    })
}

// ==================== Ingest ====================

#[tokio::test]
async fn ingest_creates_order_with_computed_total() {
    let h = harness();

    let (status, body) = post_json(&h.router, "/api/invoice", Some(API_KEY), invoice_payload()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["digitalInvoiceId"], "INV1");
    assert_eq!(body["wooStatus"], "pending");
    assert!(body.get("warnings").is_none());

    let order = h.store.find_by_invoice_id("INV1").unwrap();
    assert_eq!(order.total, "100".parse().unwrap());
    assert_eq!(order.lines.len(), 1);
    // Ingest alone never notifies the CRM of its own data
    assert!(h.transport.requests().is_empty());
    assert_eq!(order.sync.marker(SyncField::CustomerNumber), "");
}

#[tokio::test]
async fn reingest_replaces_lines_without_duplicating_order() {
    let h = harness();
    post_json(&h.router, "/api/invoice", Some(API_KEY), invoice_payload()).await;
    let first = h.store.find_by_invoice_id("INV1").unwrap();

    let mut second_payload = invoice_payload();
    second_payload["invoiceLines"] =
        json!([{"productId": "P1", "quantity": 1, "unitPrice": 75}]);
    let (status, body) = post_json(&h.router, "/api/invoice", Some(API_KEY), second_payload).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Order updated from digital invoice");
    assert_eq!(h.store.len(), 1);
    let updated = h.store.find_by_invoice_id("INV1").unwrap();
    assert_eq!(updated.id, first.id);
    assert_eq!(updated.lines.len(), 1);
    assert_eq!(updated.total, "75".parse().unwrap());
}

#[tokio::test]
async fn ingest_missing_required_field_is_400() {
    let h = harness();
    let mut payload = invoice_payload();
    payload["email"] = json!("");

    let (status, body) = post_json(&h.router, "/api/invoice", Some(API_KEY), payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing required field: email");
}

#[tokio::test]
async fn ingest_unresolvable_line_returns_warning() {
    let h = harness();
    let mut payload = invoice_payload();
    payload["invoiceLines"] = json!([
        {"productId": "P1", "quantity": 2, "unitPrice": 50},
        {"productId": "GHOST", "quantity": 1, "unitPrice": 10}
    ]);

    let (status, body) = post_json(&h.router, "/api/invoice", Some(API_KEY), payload).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["warnings"][0], "Product not found for productId: GHOST");
}

#[tokio::test]
async fn ingest_seeds_marker_for_crm_sent_customer_number() {
    let h = harness();
    let mut payload = invoice_payload();
    payload["pogCustomerNumber"] = json!("C42");

    post_json(&h.router, "/api/invoice", Some(API_KEY), payload).await;

    let order = h.store.find_by_invoice_id("INV1").unwrap();
    assert_eq!(order.customer_number, "C42");
    assert_eq!(order.sync.marker(SyncField::CustomerNumber), "C42");

    // A later fulfillment push of the same value must stay silent
    let (status, _) = post_json(
        &h.router,
        "/api/sync",
        Some(API_KEY),
        json!({"invoiceId": "INV1", "updatePogCustomerNumber": true, "pogCustomerNumber": "C42"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(h.transport.requests().is_empty());
}

// ==================== Auth ====================

#[tokio::test]
async fn missing_api_key_is_401() {
    let h = harness();
    let (status, _) = post_json(&h.router, "/api/invoice", None, invoice_payload()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_api_key_is_403() {
    let h = harness();
    let (status, _) = post_json(&h.router, "/api/invoice", Some("nope"), invoice_payload()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unconfigured_server_key_is_500() {
    let h = harness_with_key(None);
    let (status, _) = post_json(&h.router, "/api/invoice", Some(API_KEY), invoice_payload()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn health_needs_no_key() {
    let h = harness();
    let (status, body) = get_json(&h.router, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

// ==================== Fulfillment sync + reconciliation ====================

#[tokio::test]
async fn customer_number_push_fires_webhook_exactly_once() {
    let h = harness();
    post_json(&h.router, "/api/invoice", Some(API_KEY), invoice_payload()).await;

    let push = json!({
        "invoiceId": "INV1",
        "updatePogCustomerNumber": true,
        "pogCustomerNumber": "C42"
    });
    let (status, body) = post_json(&h.router, "/api/sync", Some(API_KEY), push.clone()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["updated"][0], "pogCustomerNumber");

    let requests = h.transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, "https://crm.test/customer");
    assert_eq!(requests[0].1["invoiceId"], "INV1");
    assert_eq!(requests[0].1["pog_customer_number"], "C42");

    let order = h.store.find_by_invoice_id("INV1").unwrap();
    assert_eq!(order.sync.marker(SyncField::CustomerNumber), "C42");
    assert_eq!(order.sync.error_count, 0);
    assert_eq!(order.sync.status, SyncStatus::Success);

    // The same push again: marker already current, nothing leaves
    post_json(&h.router, "/api/sync", Some(API_KEY), push).await;
    assert_eq!(h.transport.requests().len(), 1);
}

#[tokio::test]
async fn unknown_invoice_sync_is_404() {
    let h = harness();
    let (status, _) = post_json(
        &h.router,
        "/api/sync",
        Some(API_KEY),
        json!({"invoiceId": "GHOST", "updatePogCustomerNumber": true, "pogCustomerNumber": "C1"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn paid_push_completes_order_and_fires_status_and_payment_once() {
    let h = harness();
    post_json(&h.router, "/api/invoice", Some(API_KEY), invoice_payload()).await;

    let paid = json!({
        "invoiceId": "INV1",
        "updateInvoiceStatus": true,
        "status": "paid",
        "amountPaid": 100.0
    });
    let (status, _) = post_json(&h.router, "/api/sync", Some(API_KEY), paid.clone()).await;
    assert_eq!(status, StatusCode::OK);

    let order = h.store.find_by_invoice_id("INV1").unwrap();
    assert_eq!(order.status, OrderStatus::Completed);
    assert!(order.is_paid());
    assert_eq!(order.amount_paid, Some("100".parse().unwrap()));

    let urls = h.transport.urls();
    assert_eq!(
        urls,
        vec!["https://crm.test/invoice-status", "https://crm.test/payment"]
    );
    // Local completion overrides whatever the status field says
    assert_eq!(h.transport.requests()[0].1["status"], "paid");
    assert_eq!(h.transport.requests()[1].1["event"], "invoice_paid");

    // A second paid push for an already-paid order stays silent
    post_json(&h.router, "/api/sync", Some(API_KEY), paid).await;
    assert_eq!(h.transport.requests().len(), 2);
}

#[tokio::test]
async fn kid_and_invoice_number_push_batches_one_status_webhook() {
    let h = harness();
    post_json(&h.router, "/api/invoice", Some(API_KEY), invoice_payload()).await;

    let (status, body) = post_json(
        &h.router,
        "/api/sync",
        Some(API_KEY),
        json!({
            "invoiceId": "INV1",
            "kid": "004212345678",
            "pogInvoiceNumber": "2024-001",
            "pogStatus": "invoice"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["updated"],
        json!(["kid", "pogInvoiceNumber", "pogStatus"])
    );

    let requests = h.transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, "https://crm.test/invoice-status");
    let payload = &requests[0].1;
    assert_eq!(payload["kid"], "004212345678");
    assert_eq!(payload["pogInvoiceNumber"], "2024-001");
    assert_eq!(payload["invoiceNumber"], "2024-001");
    assert_eq!(payload["status"], "unpaid");

    let order = h.store.find_by_invoice_id("INV1").unwrap();
    assert_eq!(order.sync.marker(SyncField::KidNumber), "004212345678");
    assert_eq!(order.sync.marker(SyncField::InvoiceNumber), "2024-001");
    assert_eq!(order.sync.marker(SyncField::StatusField), "invoice");
}

#[tokio::test]
async fn webhook_failure_is_recorded_but_does_not_fail_the_push() {
    let h = harness();
    post_json(&h.router, "/api/invoice", Some(API_KEY), invoice_payload()).await;
    h.transport.fail_urls_containing("customer");

    let (status, body) = post_json(
        &h.router,
        "/api/sync",
        Some(API_KEY),
        json!({"invoiceId": "INV1", "updatePogCustomerNumber": true, "pogCustomerNumber": "C42"}),
    )
    .await;

    // The fulfillment push itself succeeded; the delivery failure lives on
    // the order's sync state
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let order = h.store.find_by_invoice_id("INV1").unwrap();
    assert_eq!(order.sync.status, SyncStatus::Failed);
    assert_eq!(order.sync.error_count, 1);
    assert!(order.sync.last_error.is_some());
    assert_eq!(order.sync.marker(SyncField::CustomerNumber), "");
}

// ==================== Forced resync ====================

#[tokio::test]
async fn forced_resync_bypasses_markers_and_reports_both_outcomes() {
    let h = harness();
    let mut payload = invoice_payload();
    payload["pogCustomerNumber"] = json!("C42");
    post_json(&h.router, "/api/invoice", Some(API_KEY), payload).await;
    let order_id = h.store.find_by_invoice_id("INV1").unwrap().id;

    // Marker is already seeded to C42; force must send anyway
    let (status, body) = post_json(
        &h.router,
        &format!("/api/sync/orders/{}/resync", order_id),
        Some(API_KEY),
        json!({}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("customer number sent"));
    assert!(message.contains("invoice status sent"));

    let mut urls = h.transport.urls();
    urls.sort();
    assert_eq!(
        urls,
        vec!["https://crm.test/customer", "https://crm.test/invoice-status"]
    );
}

#[tokio::test]
async fn forced_resync_reports_partial_failure() {
    let h = harness();
    let mut payload = invoice_payload();
    payload["pogCustomerNumber"] = json!("C42");
    post_json(&h.router, "/api/invoice", Some(API_KEY), payload).await;
    let order_id = h.store.find_by_invoice_id("INV1").unwrap().id;
    h.transport.fail_urls_containing("customer");

    let (status, body) = post_json(
        &h.router,
        &format!("/api/sync/orders/{}/resync", order_id),
        Some(API_KEY),
        json!({}),
    )
    .await;

    // Always 200: the aggregate outcome is in the body
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("customer number failed"));
    assert!(message.contains("invoice status sent"));
    // Both kinds attempted despite the first failing
    assert_eq!(h.transport.requests().len(), 2);
}

#[tokio::test]
async fn forced_resync_unknown_order_reports_failure() {
    let h = harness();
    let (status, body) = post_json(
        &h.router,
        "/api/sync/orders/424242/resync",
        Some(API_KEY),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("not found"));
}

// ==================== Reporting ====================

#[tokio::test]
async fn report_counts_failed_orders() {
    let h = harness();
    post_json(&h.router, "/api/invoice", Some(API_KEY), invoice_payload()).await;
    h.transport.fail_urls_containing("customer");
    post_json(
        &h.router,
        "/api/sync",
        Some(API_KEY),
        json!({"invoiceId": "INV1", "updatePogCustomerNumber": true, "pogCustomerNumber": "C42"}),
    )
    .await;

    let (status, body) = get_json(&h.router, "/api/sync/report", Some(API_KEY)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["totalOrders"], 1);
    assert_eq!(body["stats"]["failedCount"], 1);
    assert_eq!(body["stats"]["successRate"], 0.0);
    assert_eq!(body["failed"][0]["invoiceId"], "INV1");
    assert_eq!(body["failed"][0]["errorCount"], 1);
}
