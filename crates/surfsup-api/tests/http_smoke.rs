use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use surfsup_core::MemoryDataset;
use tower::ServiceExt;

#[tokio::test]
async fn health_ready_metrics_endpoints() {
    let (app, state) = surfsup_api::build_app(MemoryDataset::default()).unwrap();

    // /healthz returns 200 and increments a counter
    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // /readyz initially 503
    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/readyz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

    surfsup_api::set_ready(&state, true);

    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/readyz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // /metrics returns prometheus text and contains our counter
    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let ct = res.headers().get("content-type").unwrap().to_str().unwrap();
    assert!(ct.starts_with("text/plain"));
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("surfsup_requests_total"));
}

#[tokio::test]
async fn home_lists_available_routes() {
    let (app, _state) = surfsup_api::build_app(MemoryDataset::default()).unwrap();

    let res = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    for route in ["/api/v1.0/precipitation", "/api/v1.0/stations", "/api/v1.0/tobs"] {
        assert!(text.contains(route), "missing {route}");
    }
}

#[tokio::test]
async fn unknown_nested_path_is_not_found() {
    let (app, _state) = surfsup_api::build_app(MemoryDataset::default()).unwrap();

    let res = app
        .oneshot(
            Request::builder()
                .uri("/api/v1.0/a/b/c")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
