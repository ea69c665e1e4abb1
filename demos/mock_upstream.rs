//! Pretend wallboard backend for local development.
//!
//! ```text
//! cargo run --example mock_upstream
//! BACKEND_URL=http://127.0.0.1:3001/api BACKEND_BEARER_TOKEN=dev cargo run
//! curl -N http://127.0.0.1:3000/bff/wallboard/events
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap},
    response::Response,
    routing::get,
    Json, Router,
};

fn has_bearer(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer "))
}

async fn events(headers: HeaderMap) -> Response {
    println!("events subscription (bearer: {})", has_bearer(&headers));

    let stream = futures_util::stream::unfold(0u64, |tick| async move {
        if tick > 0 {
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
        let frame = format!(
            "data: {{\"tick\":{},\"queue_depth\":{},\"agents_logged_in\":{}}}\n\n",
            tick,
            (tick * 7) % 13,
            40 + (tick % 5)
        );
        Some((Ok::<_, Infallible>(Bytes::from(frame)), tick + 1))
    });

    Response::builder()
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from_stream(stream))
        .unwrap()
}

async fn campaigns(headers: HeaderMap) -> Json<serde_json::Value> {
    println!("campaigns request (bearer: {})", has_bearer(&headers));
    Json(serde_json::json!([
        { "id": "acme", "answer_rate": 0.82 },
        { "id": "globex", "answer_rate": 0.67 }
    ]))
}

#[tokio::main]
async fn main() {
    let app = Router::new()
        .route("/api/wallboard/events", get(events))
        .route("/api/campaigns", get(campaigns));

    let addr = SocketAddr::from(([127, 0, 0, 1], 3001));
    println!("Mock wallboard backend listening on http://{}/api", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
