//! API surface tests: routes bound on an ephemeral port, no browser needed
//!
//! Only the request-validation paths are exercised here — everything past the
//! URL normalizer would touch the network.

use discoverlens::{server, AnalyzerConfig};
use std::sync::Arc;

async fn spawn_server() -> String {
    let config = Arc::new(AnalyzerConfig::default());
    let router = server::build_router(config);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_api_rejects_missing_and_unsafe_urls() {
    let base = spawn_server().await;

    tokio::task::spawn_blocking(move || {
        let client = reqwest::blocking::Client::new();

        let res = client
            .post(format!("{}/api/analyze", base))
            .json(&serde_json::json!({}))
            .send()
            .unwrap();
        assert_eq!(res.status().as_u16(), 400);
        let body: serde_json::Value = res.json().unwrap();
        assert_eq!(body["kind"], "invalid_url");
        assert_eq!(body["error"], "URL is required");

        let res = client
            .post(format!("{}/api/analyze", base))
            .json(&serde_json::json!({ "url": "javascript:alert(1)" }))
            .send()
            .unwrap();
        assert_eq!(res.status().as_u16(), 400);
        let body: serde_json::Value = res.json().unwrap();
        assert_eq!(body["kind"], "invalid_url");
        assert!(body["error"].as_str().unwrap().starts_with("Invalid URL"));
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_form_error_state_preserves_submitted_url() {
    let base = spawn_server().await;

    tokio::task::spawn_blocking(move || {
        let client = reqwest::blocking::Client::new();

        let res = client
            .post(format!("{}/analyze", base))
            .form(&[("url", "not a url")])
            .send()
            .unwrap();
        assert!(res.status().is_success());
        let page = res.text().unwrap();
        assert!(page.contains("value=\"not a url\""));
        assert!(page.contains("Invalid URL"));

        let res = client
            .post(format!("{}/analyze", base))
            .form(&[("url", "")])
            .send()
            .unwrap();
        let page = res.text().unwrap();
        assert!(page.contains("URL is required"));
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_home_page_serves_form() {
    let base = spawn_server().await;

    tokio::task::spawn_blocking(move || {
        let page = reqwest::blocking::get(format!("{}/", base))
            .unwrap()
            .text()
            .unwrap();
        assert!(page.contains("action=\"/analyze\""));
        assert!(page.contains("name=\"url\""));
    })
    .await
    .unwrap();
}
