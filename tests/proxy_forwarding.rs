//! End-to-end forwarding behaviour through a live proxy.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use dev_proxy::config::PathRewriteRule;

mod common;

#[tokio::test]
async fn test_forwards_context_with_path_and_query() {
    let backend = common::start_echo_backend().await;
    let proxy = common::start_proxy(common::config_for(backend)).await;

    let res = common::client()
        .get(format!("http://{}/api/workflow/search?start=0&size=15", proxy.addr))
        .send()
        .await
        .expect("Proxy unreachable");

    assert_eq!(res.status(), StatusCode::OK);
    let seen = res.text().await.unwrap();
    assert!(
        seen.starts_with("GET /api/workflow/search?start=0&size=15 HTTP/1.1\r\n"),
        "unexpected request line: {seen}"
    );
    // change_origin is on by default
    assert!(seen.to_lowercase().contains(&format!("host: {backend}\r\n")));

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_unmatched_paths_are_not_forwarded() {
    let hits = Arc::new(AtomicU32::new(0));
    let h = hits.clone();
    let backend = common::start_programmable_backend(move |_| {
        let h = h.clone();
        async move {
            h.fetch_add(1, Ordering::SeqCst);
            (200, "backend".into())
        }
    })
    .await;
    let proxy = common::start_proxy(common::config_for(backend)).await;
    let client = common::client();

    for path in ["/", "/static/js/main.js", "/apis", "/ui/api/workflow"] {
        let res = client
            .get(format!("http://{}{}", proxy.addr, path))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{path} should not be proxied");
        assert_eq!(res.text().await.unwrap(), "No matching route found");
    }
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    let res = client
        .get(format!("http://{}/api", proxy.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "backend");
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_context_match_ignores_case() {
    let backend = common::start_echo_backend().await;
    let proxy = common::start_proxy(common::config_for(backend)).await;

    let res = common::client()
        .get(format!("http://{}/API/workflow", proxy.addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let seen = res.text().await.unwrap();
    assert!(
        seen.starts_with("GET /API/workflow HTTP/1.1\r\n"),
        "unexpected request line: {seen}"
    );

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_host_preserved_without_change_origin() {
    let backend = common::start_echo_backend().await;
    let mut config = common::config_for(backend);
    config.proxy.change_origin = false;
    let proxy = common::start_proxy(config).await;

    let seen = common::client()
        .get(format!("http://{}/api/health", proxy.addr))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(seen.to_lowercase().contains(&format!("host: {}\r\n", proxy.addr)));

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_post_body_and_headers_reach_backend() {
    let backend = common::start_echo_backend().await;
    let proxy = common::start_proxy(common::config_for(backend)).await;

    let payload = r#"{"name":"kitchensink","version":1}"#;
    let res = common::client()
        .post(format!("http://{}/api/workflow", proxy.addr))
        .header("content-type", "application/json")
        .header("x-request-id", "req-42")
        .body(payload)
        .send()
        .await
        .unwrap();

    assert_eq!(res.headers()["x-request-id"], "req-42");
    let seen = res.text().await.unwrap();
    let lower = seen.to_lowercase();
    assert!(seen.starts_with("POST /api/workflow HTTP/1.1\r\n"));
    assert!(lower.contains("content-type: application/json\r\n"));
    assert!(lower.contains("x-request-id: req-42\r\n"));
    assert!(seen.ends_with(payload));

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_request_id_generated_when_missing() {
    let backend = common::start_echo_backend().await;
    let proxy = common::start_proxy(common::config_for(backend)).await;

    let res = common::client()
        .get(format!("http://{}/api/metadata/workflow", proxy.addr))
        .send()
        .await
        .unwrap();

    let id = res.headers()["x-request-id"].to_str().unwrap().to_string();
    assert_eq!(id.len(), 36, "expected a UUID, got {id}");
    let seen = res.text().await.unwrap().to_lowercase();
    assert!(seen.contains(&format!("x-request-id: {id}\r\n")));

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_backend_status_and_headers_pass_through() {
    let backend =
        common::start_programmable_backend(|_| async { (503, "Service Unavailable".into()) }).await;
    let proxy = common::start_proxy(common::config_for(backend)).await;

    let res = common::client()
        .get(format!("http://{}/api/queue", proxy.addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(res.headers().get("keep-alive").is_none());
    assert_eq!(res.text().await.unwrap(), "Service Unavailable");

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_path_rewrite_strips_context() {
    let backend = common::start_echo_backend().await;
    let mut config = common::config_for(backend);
    config.proxy.path_rewrite.push(PathRewriteRule {
        pattern: "^/api/".into(),
        replacement: "/".into(),
    });
    let proxy = common::start_proxy(config).await;

    let seen = common::client()
        .get(format!("http://{}/api/metadata/taskdefs?access=READ", proxy.addr))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(
        seen.starts_with("GET /metadata/taskdefs?access=READ HTTP/1.1\r\n"),
        "unexpected request line: {seen}"
    );

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_unreachable_backend_answers_gateway_timeout() {
    let dead = common::unused_addr().await;
    let proxy = common::start_proxy(common::config_for(dead)).await;

    let res = common::client()
        .get(format!("http://{}/api/workflow/abc", proxy.addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(
        res.text().await.unwrap(),
        format!("Error occurred while trying to proxy: {}/api/workflow/abc", proxy.addr)
    );

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    let backend = common::start_programmable_backend(|_| async {
        tokio::time::sleep(Duration::from_secs(3)).await;
        (200, "late".into())
    })
    .await;
    let mut config = common::config_for(backend);
    config.timeouts.request_secs = 1;
    let proxy = common::start_proxy(config).await;

    let res = common::client()
        .get(format!("http://{}/api/slow", proxy.addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::GATEWAY_TIMEOUT);

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_backend_hangup_answers_internal_error() {
    let backend = common::start_hangup_backend().await;
    let proxy = common::start_proxy(common::config_for(backend)).await;

    let res = common::client()
        .get(format!("http://{}/api/workflow/abc", proxy.addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        res.text().await.unwrap(),
        format!("Error occurred while trying to proxy: {}/api/workflow/abc", proxy.addr)
    );

    proxy.shutdown.trigger();
}
