//! End-to-end relay tests against mock upstreams.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use fetch_relay::config::RelayConfig;

mod common;
use common::{MockReply, TestRelay};

fn test_config() -> RelayConfig {
    let mut config = RelayConfig::default();
    config.upstream.system_proxy = false;
    config
}

#[tokio::test]
async fn test_json_upstream_is_relayed() {
    let upstream = common::start_mock_backend("200 OK", "application/json", r#"{"a":1}"#).await;
    let relay = TestRelay::start(test_config()).await;

    let res = common::client()
        .get(relay.relay_url(&format!("http://{}/data.json", upstream)))
        .send()
        .await
        .expect("Relay unreachable");

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
    assert_eq!(res.headers()["content-type"], "application/json");
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body, serde_json::json!({"a": 1}));
}

#[tokio::test]
async fn test_missing_url_never_reaches_upstream() {
    let hits = Arc::new(AtomicUsize::new(0));
    let h = hits.clone();
    let _upstream = common::start_programmable_backend(move |_| {
        h.fetch_add(1, Ordering::SeqCst);
        async { MockReply::new("200 OK", "text/plain", "hit") }
    })
    .await;
    let relay = TestRelay::start(test_config()).await;

    for path in ["/api/proxy", "/api/proxy?url="] {
        let res = common::client()
            .get(format!("http://{}{}", relay.addr, path))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 400);
        assert!(res.text().await.unwrap().contains("\"url\""));
    }
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_upstream_error_status_is_mirrored() {
    let upstream = common::start_mock_backend("404 Not Found", "text/html", "<h1>secret</h1>").await;
    let relay = TestRelay::start(test_config()).await;

    let res = common::client()
        .get(relay.relay_url(&format!("http://{}/missing", upstream)))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 404);
    assert!(res.headers()["content-type"].to_str().unwrap().starts_with("text/plain"));
    let body = res.text().await.unwrap();
    assert_eq!(body, "Failed to fetch URL: Not Found");
    assert!(!body.contains("secret"));
}

#[tokio::test]
async fn test_unreachable_upstream_is_500() {
    // Bind then drop to get a port nobody listens on.
    let closed = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let relay = TestRelay::start(test_config()).await;

    let res = common::client()
        .get(relay.relay_url(&format!("http://{}/", closed)))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 500);
    assert!(res.text().await.unwrap().starts_with("Internal proxy error: "));
}

#[tokio::test]
async fn test_html_passes_through_verbatim() {
    let upstream = common::start_mock_backend("200 OK", "text/html", "<p>hi</p>").await;
    let relay = TestRelay::start(test_config()).await;

    let res = common::client()
        .get(relay.relay_url(&format!("http://{}/", upstream)))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "text/html");
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
    assert!(res.headers().get("content-encoding").is_none());
    assert_eq!(res.text().await.unwrap(), "<p>hi</p>");
}

#[tokio::test]
async fn test_upstream_headers_are_copied() {
    let upstream = common::start_programmable_backend(|_| async {
        MockReply::new("200 OK", "text/plain", "body")
            .header("X-Upstream", "yes")
            .header("Cache-Control", "max-age=60")
    })
    .await;
    let relay = TestRelay::start(test_config()).await;

    let res = common::client()
        .get(relay.relay_url(&format!("http://{}/", upstream)))
        .send()
        .await
        .unwrap();

    assert_eq!(res.headers()["x-upstream"], "yes");
    assert_eq!(res.headers()["cache-control"], "max-age=60");
    assert!(res.headers().get("x-request-id").is_some());
    assert_eq!(res.text().await.unwrap(), "body");
}

#[tokio::test]
async fn test_redirects_are_followed() {
    let upstream = common::start_programmable_backend(|path| async move {
        if path == "/old" {
            MockReply::new("302 Found", "text/plain", "").header("Location", "/new")
        } else {
            MockReply::new("200 OK", "text/plain", format!("landed on {}", path))
        }
    })
    .await;
    let relay = TestRelay::start(test_config()).await;

    let res = common::client()
        .get(relay.relay_url(&format!("http://{}/old", upstream)))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "landed on /new");
}

#[tokio::test]
async fn test_created_status_collapses_to_200() {
    let upstream = common::start_mock_backend("201 Created", "application/json", "[1,2,3]").await;
    let relay = TestRelay::start(test_config()).await;

    let res = common::client()
        .get(relay.relay_url(&format!("http://{}/", upstream)))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "[1,2,3]");
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let upstream = common::start_programmable_backend(|_| async {
        tokio::time::sleep(Duration::from_secs(3)).await;
        MockReply::new("200 OK", "text/plain", "too late")
    })
    .await;
    let mut config = test_config();
    config.upstream.timeout_secs = 1;
    let relay = TestRelay::start(config).await;

    let res = common::client()
        .get(relay.relay_url(&format!("http://{}/", upstream)))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 500);
    assert!(res.text().await.unwrap().contains("timed out"));
}

#[tokio::test]
async fn test_invalid_json_body_is_500() {
    let upstream = common::start_mock_backend("200 OK", "application/json", "{not json").await;
    let relay = TestRelay::start(test_config()).await;

    let res = common::client()
        .get(relay.relay_url(&format!("http://{}/", upstream)))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 500);
}
