// tests/metrics.rs
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serial_test::serial;
use tower::ServiceExt;

// Build full in-process app (API routes + /metrics).
async fn build_app() -> Router {
    std::env::remove_var("CLASSIFIER_CONFIG_PATH");
    std::env::remove_var("CLASSIFIER_ARTIFACT_PATH");
    tweet_trend_classifier::app()
        .await
        .expect("app() should build Router in tests")
}

async fn scrape(app: &Router) -> String {
    let resp = app
        .clone()
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    // axum::body::to_bytes requires an explicit limit
    let body = body::to_bytes(resp.into_body(), 1_048_576).await.unwrap(); // 1 MiB
    String::from_utf8(body.to_vec()).unwrap()
}

#[tokio::test]
#[serial]
async fn metrics_endpoint_counts_classifications_by_label() {
    let app = build_app().await;

    let resp = app
        .clone()
        .oneshot(
            Request::post("/classify")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"text":"gempa guncang lombok"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let text = scrape(&app).await;
    for needle in [
        "classify_requests_total",
        "label=\"factual\"",
        "classify_duration_ms",
    ] {
        assert!(text.contains(needle), "missing `{needle}` in:\n{text}");
    }
}

#[tokio::test]
#[serial]
async fn app_can_be_built_twice_in_one_process() {
    // the Prometheus recorder is installed once and reused
    let a = build_app().await;
    let b = build_app().await;
    scrape(&a).await;
    scrape(&b).await;
}
