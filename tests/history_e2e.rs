mod e2e_utils;

use apitester::config::AppConfig;
use apitester::domain::MethodPolicy;
use chrono::{DateTime, FixedOffset};
use e2e_utils::{StubTarget, TestApiServer};
use serde_json::json;

fn timestamp(value: &serde_json::Value) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(value.as_str().expect("timestamp should be a string"))
        .expect("timestamp should be RFC 3339")
}

#[tokio::test]
async fn test_history_lists_fifty_newest_first() {
    let target = StubTarget::start().await.expect("Failed to start stub target");
    let api = TestApiServer::start().await.expect("Failed to start API server");

    for i in 0..60 {
        let (status, _) = api
            .proxy(json!({ "method": "GET", "url": target.url(&format!("/ok?n={}", i)) }))
            .await;
        assert_eq!(status, 200);
    }

    let (status, history) = api.get("/api/history").await;
    assert_eq!(status, 200);

    let records = history.as_array().unwrap();
    assert_eq!(records.len(), 50);
    assert_eq!(records[0]["url"], target.url("/ok?n=59"));
    assert!(records
        .windows(2)
        .all(|w| timestamp(&w[0]["timestamp"]) >= timestamp(&w[1]["timestamp"])));
    assert!(records.iter().all(|r| r["id"].is_string()));

    let (_, limited) = api.get("/api/requests?limit=3").await;
    assert_eq!(limited.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_clear_history_empties_list() {
    let target = StubTarget::start().await.expect("Failed to start stub target");
    let api = TestApiServer::start().await.expect("Failed to start API server");

    api.proxy(json!({ "method": "GET", "url": target.url("/ok") })).await;
    api.proxy(json!({ "method": "GET", "url": target.url("/ok") })).await;

    let (status, cleared) = api.delete("/api/requests").await;
    assert_eq!(status, 200);
    assert_eq!(cleared["success"], true);

    let (_, history) = api.get("/api/history").await;
    assert_eq!(history, json!([]));
}

#[tokio::test]
async fn test_delete_single_record() {
    let target = StubTarget::start().await.expect("Failed to start stub target");
    let api = TestApiServer::start().await.expect("Failed to start API server");

    let (_, outcome) = api.proxy(json!({ "method": "GET", "url": target.url("/ok") })).await;
    let path = format!("/api/requests/{}", outcome["id"].as_str().unwrap());

    let (status, body) = api.delete(&path).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({ "success": true }));

    let (status, body) = api.get(&path).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Request not found");

    let (status, _) = api.delete(&path).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_disabled_history_still_proxies() {
    let target = StubTarget::start().await.expect("Failed to start stub target");
    let mut config = AppConfig::default();
    config.history.enabled = false;
    let api = TestApiServer::start_with(config).await.expect("Failed to start API server");

    let (status, outcome) = api.proxy(json!({ "method": "GET", "url": target.url("/ok") })).await;
    assert_eq!(status, 200);
    assert_eq!(outcome["data"], json!({ "ok": true }));
    assert!(outcome.get("id").is_none());

    let (status, _) = api.get("/api/history").await;
    assert_eq!(status, 503);
}

#[tokio::test]
async fn test_strict_policy_rejects_unknown_verbs() {
    let target = StubTarget::start().await.expect("Failed to start stub target");
    let mut config = AppConfig::default();
    config.outbound.method_policy = MethodPolicy::Strict;
    let api = TestApiServer::start_with(config).await.expect("Failed to start API server");

    let (status, body) = api.proxy(json!({ "method": "PATCH", "url": target.url("/echo") })).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Unsupported method: PATCH");

    let (_, history) = api.get("/api/history").await;
    assert_eq!(history, json!([]));
}

#[tokio::test]
async fn test_version_endpoint() {
    let api = TestApiServer::start().await.expect("Failed to start API server");

    let (status, body) = api.get("/api/version").await;

    assert_eq!(status, 200);
    assert_eq!(body["version"], apitester::VERSION);
    assert!(body["build"].is_string());
}
