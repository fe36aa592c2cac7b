//! HTTP boundary tests.

use std::net::SocketAddr;

use serde_json::{json, Value};
use url_tester::config::TesterConfig;
use url_tester::http::HttpServer;
use url_tester::lifecycle::Shutdown;

mod common;

async fn start_server(shutdown: &Shutdown) -> SocketAddr {
    start_server_with(TesterConfig::default(), shutdown).await
}

async fn start_server_with(config: TesterConfig, shutdown: &Shutdown) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });
    addr
}

#[tokio::test]
async fn test_post_runs_specs_in_order() {
    let backend = common::start_mock_backend(200, "{}").await;
    let shutdown = Shutdown::new();
    let addr = start_server(&shutdown).await;

    let payload = json!([
        {
            "url": backend.url("/ok"),
            "method": "GET",
            "body": "",
            "headers": {},
            "req_count": 10,
            "c_req_count": 2
        },
        {
            "url": "not a url",
            "method": "POST",
            "body": "x",
            "headers": {"X-Test": "1"},
            "req_count": 5,
            "c_req_count": 1
        }
    ]);

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let res = client
        .post(format!("http://{}/test/post", addr))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-request-id"));

    let body: Value = res.json().await.unwrap();
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 2);

    assert_eq!(records[0]["method"], "GET");
    assert_eq!(records[0]["url"], backend.url("/ok"));
    assert_eq!(records[0]["successful_requests"], 10);
    assert_eq!(records[0]["failed_requests"], 0);
    assert!(records[0]["time"].as_f64().unwrap() >= 0.0);

    assert_eq!(records[1]["method"], "POST");
    assert_eq!(records[1]["successful_requests"], 0);
    assert_eq!(records[1]["failed_requests"], 5);
    assert!(records[1]["logs"].as_str().unwrap().contains("Invalid URL"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let shutdown = Shutdown::new();
    let addr = start_server(&shutdown).await;

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let res = client
        .post(format!("http://{}/test/post", addr))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    let body: Value = res.json().await.unwrap();
    assert!(body["error"].is_string());

    shutdown.trigger();
}

#[tokio::test]
async fn test_zero_concurrency_is_bad_request() {
    let backend = common::start_mock_backend(200, "{}").await;
    let shutdown = Shutdown::new();
    let addr = start_server(&shutdown).await;

    let payload = json!([{
        "url": backend.url("/ok"),
        "method": "GET",
        "req_count": 3,
        "c_req_count": 0
    }]);

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let res = client
        .post(format!("http://{}/test/post", addr))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    let body: Value = res.json().await.unwrap();
    assert!(body["details"].as_str().unwrap().contains("c_req_count"));
    assert_eq!(backend.in_flight.total(), 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let shutdown = Shutdown::new();
    let addr = start_server(&shutdown).await;

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let res = client
        .request(reqwest::Method::OPTIONS, format!("http://{}/test/post", addr))
        .header("origin", "http://example.com")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["access-control-allow-origin"], "*");

    let res = client
        .post(format!("http://{}/test/post", addr))
        .header("origin", "http://example.com")
        .json(&json!([]))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!([]));

    shutdown.trigger();
}

#[tokio::test]
async fn test_status_endpoint() {
    let shutdown = Shutdown::new();
    let addr = start_server(&shutdown).await;

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let body: Value = client
        .get(format!("http://{}/status", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "operational");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let backend = common::start_mock_backend(200, "{}").await;
    let mut config = TesterConfig::default();
    config.server.max_body_size = 64;
    let shutdown = Shutdown::new();
    let addr = start_server_with(config, &shutdown).await;

    let payload = json!([{
        "url": backend.url("/ok"),
        "method": "POST",
        "body": "x".repeat(200),
        "req_count": 1,
        "c_req_count": 1
    }]);

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let res = client
        .post(format!("http://{}/test/post", addr))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 413);
    assert!(res.headers().contains_key("x-request-id"));

    let body: Value = res.json().await.unwrap();
    assert!(body["error"].is_string());
    assert_eq!(backend.in_flight.total(), 0);

    // A small request on the same server still goes through.
    let res = client
        .post(format!("http://{}/test/post", addr))
        .json(&json!([]))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    shutdown.trigger();
}
