//! Shared utilities for integration tests: mock upstreams and a proxy
//! launcher bound to an ephemeral port.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use wallboard_bff::config::BffConfig;
use wallboard_bff::{HttpServer, Shutdown};

/// What the echo upstream saw.
#[derive(Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: BTreeMap<String, Vec<String>>,
    pub body: String,
}

impl Echo {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub async fn from_response(res: reqwest::Response) -> Echo {
        let text = res.text().await.unwrap();
        serde_json::from_str(&text).unwrap_or_else(|e| panic!("not an echo ({e}): {text}"))
    }
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Response {
    let mut seen: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in headers.iter() {
        seen.entry(name.as_str().to_string())
            .or_default()
            .push(value.to_str().unwrap_or("<binary>").to_string());
    }
    let echo = Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers: seen,
        body: String::from_utf8_lossy(&body).into_owned(),
    };
    ([("x-echo-method", method.to_string())], Json(echo)).into_response()
}

async fn redirect() -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, "http://elsewhere.example/login")],
    )
        .into_response()
}

async fn missing() -> Response {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("x-upstream", "yes")
        .header(header::SET_COOKIE, "a=1")
        .header(header::SET_COOKIE, "b=2")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("no such campaign"))
        .unwrap()
}

/// Upstream that echoes every request as JSON, plus `/api/redirect`
/// (302) and `/api/missing` (404 with custom headers).
pub async fn start_echo_upstream() -> SocketAddr {
    let app = Router::new()
        .route("/api/redirect", any(redirect))
        .route("/api/missing", any(missing))
        .fallback(echo);
    serve(app).await
}

/// One SSE subscription as seen by the upstream.
pub struct SseSubscription {
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub frames: mpsc::Sender<Bytes>,
}

/// Upstream whose `text/event-stream` bodies are driven by the test.
///
/// Every request hands a [`SseSubscription`] to the returned receiver; the
/// stream ends when its `frames` sender is dropped.
pub async fn start_sse_upstream() -> (SocketAddr, mpsc::Receiver<SseSubscription>) {
    let (sub_tx, sub_rx) = mpsc::channel(8);

    let app = Router::new().fallback(move |uri: Uri, headers: HeaderMap| {
        let sub_tx = sub_tx.clone();
        async move {
            let (frames, rx) = mpsc::channel::<Bytes>(1);
            let _ = sub_tx
                .send(SseSubscription {
                    query: uri.query().map(str::to_string),
                    authorization: headers
                        .get(header::AUTHORIZATION)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string),
                    frames,
                })
                .await;

            let stream = futures_util::stream::unfold(rx, |mut rx| async move {
                rx.recv().await.map(|frame| (Ok::<_, Infallible>(frame), rx))
            });
            Response::builder()
                .header(header::CONTENT_TYPE, "text/event-stream")
                .header(header::CACHE_CONTROL, "no-cache")
                .body(Body::from_stream(stream))
                .unwrap()
        }
    });

    (serve(app).await, sub_rx)
}

/// Upstream that reports the first body chunk of each upload as soon as it
/// arrives, then answers with the whole body once the upload ends.
pub async fn start_upload_upstream() -> (SocketAddr, mpsc::Receiver<String>) {
    let (first_tx, first_rx) = mpsc::channel(8);

    let app = Router::new().fallback(move |body: Body| {
        let first_tx = first_tx.clone();
        async move {
            let mut chunks = body.into_data_stream();
            let mut received = String::new();
            if let Some(Ok(chunk)) = chunks.next().await {
                received.push_str(&String::from_utf8_lossy(&chunk));
                let _ = first_tx.send(received.clone()).await;
            }
            while let Some(Ok(chunk)) = chunks.next().await {
                received.push_str(&String::from_utf8_lossy(&chunk));
            }
            received
        }
    });

    (serve(app).await, first_rx)
}

/// Raw TCP upstream that reads each request head and hangs up without
/// answering. The counter tracks accepted connections.
pub async fn start_hangup_upstream() -> (SocketAddr, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let attempts = Arc::new(AtomicUsize::new(0));

    let counter = attempts.clone();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async move {
                let mut seen = Vec::new();
                let mut buf = [0u8; 1024];
                while !seen.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => seen.extend_from_slice(&buf[..n]),
                    }
                }
                drop(socket);
            });
        }
    });

    (addr, attempts)
}

/// Raw TCP upstream that answers every request with `response` verbatim.
pub async fn start_raw_upstream(response: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut seen = Vec::new();
                let mut buf = [0u8; 1024];
                while !seen.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => seen.extend_from_slice(&buf[..n]),
                    }
                }
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// An address nothing is listening on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Proxy configuration pointing at `upstream`'s `/api` root.
pub fn proxy_config(upstream: SocketAddr, token: Option<&str>) -> BffConfig {
    let mut config = BffConfig::default();
    config.upstream.base_url = format!("http://{}/api/", upstream);
    config.upstream.bearer_token = token.map(str::to_string);
    config.upstream.connect_timeout_secs = 2;
    config
}

/// Start the proxy on an ephemeral port.
pub async fn start_proxy(config: BffConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(config).unwrap();
    let shutdown = Shutdown::new();
    let signalled = shutdown.signalled();
    tokio::spawn(async move {
        let _ = server.run(listener, signalled).await;
    });

    (addr, shutdown)
}

/// Test client: no system proxy, no redirect following.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
