mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{
    client_for, config_for, config_with_side_channel, refused_base_url, stalled_base_url,
    truncated_body_base_url, PASSKEY, RECIPIENT,
};
use mockito::Matcher;
use serde_json::{json, Value};
use watios_client::{ClientOptions, ResponseInterceptor, WatiosClient};
use watios_common::{DedupGate, ErrorRecord, Response};

#[tokio::test]
async fn test_success_passes_response_through_and_reports_stats() {
    let mut target = mockito::Server::new_async().await;
    let mut side = mockito::Server::new_async().await;

    let order = target
        .mock("GET", "/orders/7")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":7,"total":12.5}"#)
        .create_async()
        .await;

    let stats = side
        .mock("POST", "/add_usage")
        .match_body(Matcher::PartialJson(json!({
            "passkey": PASSKEY,
            "details": {
                "status": 200,
                "url": "/orders/7",
                "method": "get",
                "responseData": { "id": 7, "total": 12.5 },
            },
        })))
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;

    let messages = side
        .mock("POST", "/send_message")
        .expect(0)
        .create_async()
        .await;

    let client = client_for(&target.url(), &side);

    let response = client.get("/orders/7").send().await.unwrap();
    client.flush().await;

    assert_eq!(response.status.as_u16(), 200);
    assert_eq!(response.json::<Value>().unwrap()["id"], 7);
    order.assert_async().await;
    stats.assert_async().await;
    messages.assert_async().await;
}

#[tokio::test]
async fn test_duplicate_errors_notify_once_and_always_report() {
    let mut side = mockito::Server::new_async().await;

    let messages = side
        .mock("POST", "/send_message")
        .match_body(Matcher::PartialJson(json!({ "phonenumber": RECIPIENT })))
        .with_status(200)
        .with_body(r#"{"sent":true}"#)
        .expect(1)
        .create_async()
        .await;

    let stats = side
        .mock("POST", "/add_usage")
        .match_body(Matcher::PartialJson(json!({
            "passkey": PASSKEY,
            "details": { "errorCode": "ECONNREFUSED", "url": "/x", "method": "get" },
        })))
        .with_status(200)
        .with_body("{}")
        .expect(2)
        .create_async()
        .await;

    let client = client_for(&refused_base_url(), &side);

    let first = client.get("/x").send().await.unwrap_err();
    let second = client.get("/x").send().await.unwrap_err();
    client.flush().await;

    for record in [&first, &second] {
        assert_eq!(record.error_code, "ECONNREFUSED");
        assert_eq!(record.url, "/x");
        assert_eq!(record.method, "get");
        assert_eq!(record.status, "No status");
        assert!(record.is_request_error);
    }
    assert_eq!(client.alerter().gate().len(), 1);
    messages.assert_async().await;
    stats.assert_async().await;
}

#[tokio::test]
async fn test_errors_on_different_urls_are_not_suppressed() {
    let mut target = mockito::Server::new_async().await;
    let mut side = mockito::Server::new_async().await;

    let _upstream = target
        .mock("GET", Matcher::Regex("^/(a|b)$".to_string()))
        .with_status(500)
        .with_body("upstream exploded")
        .expect(2)
        .create_async()
        .await;

    let messages = side
        .mock("POST", "/send_message")
        .with_status(200)
        .expect(2)
        .create_async()
        .await;

    let stats = side
        .mock("POST", "/add_usage")
        .with_status(200)
        .expect(2)
        .create_async()
        .await;

    let client = client_for(&target.url(), &side);

    let a = client.get("/a").send().await.unwrap_err();
    let b = client.get("/b").send().await.unwrap_err();
    client.flush().await;

    assert_eq!(a.error_code, "ERR_BAD_RESPONSE");
    assert_eq!(a.status, "500");
    assert_eq!(a.response_data, json!("upstream exploded"));
    assert_eq!(a.error_code, b.error_code);
    assert_ne!(a.url, b.url);
    messages.assert_async().await;
    stats.assert_async().await;
}

#[tokio::test]
async fn test_bad_request_message_uses_response_detail() {
    let mut target = mockito::Server::new_async().await;
    let mut side = mockito::Server::new_async().await;

    let _orders = target
        .mock("POST", "/orders")
        .match_body(Matcher::Json(json!({ "quantity": -1 })))
        .with_status(422)
        .with_body(r#"{"error":{"message":"quantity must be positive"}}"#)
        .create_async()
        .await;

    let _messages = side
        .mock("POST", "/send_message")
        .with_status(200)
        .create_async()
        .await;
    let _stats = side
        .mock("POST", "/add_usage")
        .with_status(200)
        .create_async()
        .await;

    let client = client_for(&target.url(), &side);

    let record = client
        .post("/orders")
        .json(&json!({ "quantity": -1 }))
        .send()
        .await
        .unwrap_err();
    client.flush().await;

    assert_eq!(record.error_code, "ERR_BAD_REQUEST");
    assert_eq!(record.message, "Bad request: quantity must be positive");
    assert_eq!(record.method, "post");
    assert_eq!(record.status, "422");
}

#[tokio::test]
async fn test_notifier_failure_does_not_change_rejection() {
    let mut target = mockito::Server::new_async().await;
    let mut side = mockito::Server::new_async().await;

    let _order = target
        .mock("DELETE", "/orders/7")
        .with_status(404)
        .create_async()
        .await;

    let messages = side
        .mock("POST", "/send_message")
        .with_status(500)
        .with_body("messaging provider down")
        .expect(1)
        .create_async()
        .await;
    let stats = side
        .mock("POST", "/add_usage")
        .with_status(503)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&target.url(), &side);

    let record = client.delete("/orders/7").send().await.unwrap_err();
    client.flush().await;

    assert_eq!(record.error_code, "ERR_BAD_REQUEST");
    assert_eq!(record.message, "Bad request: Request failed with status code 404");
    assert_eq!(record.response_data, json!("No data"));
    assert_eq!(client.alerter().pending(), 0);
    messages.assert_async().await;
    stats.assert_async().await;
}

#[tokio::test]
async fn test_rejection_does_not_wait_for_side_channels() {
    let stalled = stalled_base_url().await;
    let options = ClientOptions::builder()
        .recipient_address(RECIPIENT)
        .access_credential(PASSKEY)
        .base_url(refused_base_url())
        .build();
    let client = WatiosClient::new(options, &config_with_side_channel(&stalled)).unwrap();

    let started = Instant::now();
    let record = client.get("/x").send().await.unwrap_err();
    let elapsed = started.elapsed();

    assert_eq!(record.error_code, "ECONNREFUSED");
    // Side channels hold their connections until the 5s timeout.
    assert!(elapsed < Duration::from_secs(2), "rejection took {:?}", elapsed);
    assert_eq!(client.alerter().pending(), 2);
}

#[tokio::test]
async fn test_truncated_body_keeps_received_status() {
    let mut side = mockito::Server::new_async().await;
    let _side_channels = side
        .mock("POST", Matcher::Any)
        .with_status(200)
        .create_async()
        .await;

    let client = client_for(&truncated_body_base_url().await, &side);

    let record = client.get("/report").send().await.unwrap_err();
    client.flush().await;

    assert!(record.is_request_error);
    assert_eq!(record.status, "200");
    assert_eq!(record.url, "/report");
    assert_eq!(record.method, "get");
}

#[derive(Default)]
struct Counts {
    responses: AtomicUsize,
    errors: AtomicUsize,
}

struct CountingInterceptor(Arc<Counts>);

impl ResponseInterceptor for CountingInterceptor {
    fn on_response(&self, _response: &Response) {
        self.0.responses.fetch_add(1, Ordering::SeqCst);
    }

    fn on_error(&self, _record: &ErrorRecord) {
        self.0.errors.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn test_interceptors_observe_outcomes() {
    let mut target = mockito::Server::new_async().await;
    let mut side = mockito::Server::new_async().await;

    let _put = target
        .mock("PUT", "/profile")
        .with_status(204)
        .create_async()
        .await;
    let _patch = target
        .mock("PATCH", "/profile")
        .with_status(409)
        .create_async()
        .await;
    let _side_channels = side
        .mock("POST", Matcher::Any)
        .with_status(200)
        .create_async()
        .await;

    let counts = Arc::new(Counts::default());
    let client =
        client_for(&target.url(), &side).with_interceptor(CountingInterceptor(counts.clone()));

    client.put("/profile").send().await.unwrap();
    client.patch("/profile").send().await.unwrap_err();
    client.flush().await;

    assert_eq!(counts.responses.load(Ordering::SeqCst), 1);
    assert_eq!(counts.errors.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_shared_gate_suppresses_across_clients() {
    let mut side = mockito::Server::new_async().await;

    let messages = side
        .mock("POST", "/send_message")
        .with_status(200)
        .expect(1)
        .create_async()
        .await;
    let stats = side
        .mock("POST", "/add_usage")
        .with_status(200)
        .expect(2)
        .create_async()
        .await;

    let gate = Arc::new(DedupGate::new());
    let base_url = refused_base_url();
    let build = |gate: Arc<DedupGate>| {
        let options = ClientOptions::builder()
            .recipient_address(RECIPIENT)
            .access_credential(PASSKEY)
            .base_url(base_url.as_str())
            .dedup_gate(gate)
            .build();
        WatiosClient::new(options, &config_for(&side)).unwrap()
    };

    let first = build(gate.clone());
    let second = build(gate.clone());

    first.get("/x").send().await.unwrap_err();
    second.get("/x").send().await.unwrap_err();
    first.flush().await;
    second.flush().await;

    messages.assert_async().await;
    stats.assert_async().await;
}

#[tokio::test]
async fn test_separate_clients_have_separate_windows() {
    let mut side = mockito::Server::new_async().await;

    let messages = side
        .mock("POST", "/send_message")
        .with_status(200)
        .expect(2)
        .create_async()
        .await;
    let _stats = side
        .mock("POST", "/add_usage")
        .with_status(200)
        .create_async()
        .await;

    let base_url = refused_base_url();
    let first = client_for(&base_url, &side);
    let second = client_for(&base_url, &side);

    first.get("/x").send().await.unwrap_err();
    second.get("/x").send().await.unwrap_err();
    first.flush().await;
    second.flush().await;

    messages.assert_async().await;
}

#[tokio::test]
async fn test_manual_alert_runs_the_same_pipeline() {
    let mut side = mockito::Server::new_async().await;

    let messages = side
        .mock("POST", "/send_message")
        .match_body(Matcher::Regex(r"ERROR ALERT.*UNKNOWN_ERROR.*Stack".to_string()))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;
    let stats = side
        .mock("POST", "/add_usage")
        .match_body(Matcher::PartialJson(json!({
            "passkey": PASSKEY,
            "details": {
                "errorCode": "UNKNOWN_ERROR",
                "message": "payment webhook signature mismatch",
                "isRequestError": false,
                "name": "Error",
            },
        })))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let client = client_for("http://127.0.0.1:1", &side);
    let alerter = client.alerter();

    let record = alerter.alert(anyhow::anyhow!("payment webhook signature mismatch"));
    alerter.flush().await;

    assert!(!record.is_request_error);
    assert_eq!(record.url, "No URL");
    messages.assert_async().await;
    stats.assert_async().await;
}
