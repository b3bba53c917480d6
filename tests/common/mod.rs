//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::Notify;

use round_robin_proxy::config::{BackendConfig, ProxyConfig};
use round_robin_proxy::{BackendPool, HttpServer, Shutdown};

/// A mock upstream that answers every request with its name.
pub struct NamedBackend {
    pub addr: SocketAddr,
    pub hits: Arc<AtomicUsize>,
}

impl NamedBackend {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
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

/// Start a mock backend that returns `name` as the body and counts hits.
pub async fn start_named_backend(name: &'static str) -> NamedBackend {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().fallback(move || {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            name
        }
    });

    NamedBackend {
        addr: serve(app).await,
        hits,
    }
}

/// Start a mock backend that echoes the request it received as JSON,
/// answering 201 with an `x-upstream` header.
pub async fn start_echo_backend() -> SocketAddr {
    async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> impl IntoResponse {
        let mut seen: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in &headers {
            seen.entry(name.to_string())
                .or_default()
                .push(value.to_str().unwrap_or_default().to_string());
        }

        (
            StatusCode::CREATED,
            [("x-upstream", "echo")],
            Json(json!({
                "method": method.as_str(),
                "path": uri.path(),
                "query": uri.query(),
                "headers": seen,
                "body": String::from_utf8_lossy(&body),
            })),
        )
    }

    serve(Router::new().fallback(echo)).await
}

/// Start a mock backend that sleeps before answering.
pub async fn start_slow_backend(delay: Duration) -> SocketAddr {
    let app = Router::new().fallback(move || async move {
        tokio::time::sleep(delay).await;
        "slow"
    });
    serve(app).await
}

/// A mock upstream whose handler never finishes on its own.
pub struct HangingBackend {
    pub addr: SocketAddr,
    /// Notified when a request reaches the handler.
    pub started: Arc<Notify>,
    /// Notified when the handler future is dropped.
    pub dropped: Arc<Notify>,
}

impl HangingBackend {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

struct NotifyOnDrop(Arc<Notify>);

impl Drop for NotifyOnDrop {
    fn drop(&mut self) {
        self.0.notify_one();
    }
}

pub async fn start_hanging_backend() -> HangingBackend {
    let started = Arc::new(Notify::new());
    let dropped = Arc::new(Notify::new());

    let (on_start, on_drop) = (started.clone(), dropped.clone());
    let app = Router::new().fallback(move || {
        let (on_start, on_drop) = (on_start.clone(), on_drop.clone());
        async move {
            let _guard = NotifyOnDrop(on_drop);
            on_start.notify_one();
            tokio::time::sleep(Duration::from_secs(60)).await;
            "too late"
        }
    });

    HangingBackend {
        addr: serve(app).await,
        started,
        dropped,
    }
}

/// An address nothing is listening on.
pub fn unused_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// A running proxy under test.
pub struct TestProxy {
    pub addr: SocketAddr,
    pub pool: Arc<BackendPool>,
    shutdown: Shutdown,
}

impl TestProxy {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestProxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the proxy in front of `backends`.
pub async fn start_proxy(backends: &[String]) -> TestProxy {
    let mut config = ProxyConfig::default();
    config.backends = backends.iter().map(|b| BackendConfig::new(b.as_str())).collect();
    start_proxy_with(config).await
}

pub async fn start_proxy_with(mut config: ProxyConfig) -> TestProxy {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.bind_address = addr.to_string();

    let server = HttpServer::new(config).unwrap();
    let pool = server.pool();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestProxy {
        addr,
        pool,
        shutdown,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// GET `path` and return the body text.
pub async fn get_text(client: &reqwest::Client, url: &str) -> String {
    client.get(url).send().await.unwrap().text().await.unwrap()
}

pub fn as_value(text: &str) -> Value {
    serde_json::from_str(text).unwrap()
}
