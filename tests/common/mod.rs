//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use platform_demo::config::StackConfig;
use platform_demo::data_service::{
    CatalogStore, DataServer, DbError, FootballClub, Item, PoolStatus,
};
use platform_demo::gateway::{BackendClient, GatewayServer};
use platform_demo::lifecycle::Shutdown;

/// One request as seen by a mock backend.
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub path: String,
    /// Raw request head, header names as sent.
    pub head: String,
}

impl MockRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<String> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim().to_string())
        })
    }
}

/// Start a programmable mock backend on an ephemeral port.
///
/// `f` receives each request and returns `(status, delay, body)`; the
/// response is written after `delay`.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(MockRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, Duration, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let head = match read_head(&mut socket).await {
                            Some(head) => head,
                            None => return,
                        };
                        let path = head
                            .lines()
                            .next()
                            .and_then(|line| line.split_whitespace().nth(1))
                            .unwrap_or("/")
                            .to_string();

                        let (status, delay, body) = f(MockRequest { path, head }).await;
                        tokio::time::sleep(delay).await;

                        let response = format!(
                            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status,
                            reason(status),
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a mock backend that always answers 200 with `body`.
pub async fn start_mock_backend(body: &'static str) -> SocketAddr {
    start_programmable_backend(move |_| async move { (200, Duration::ZERO, body.to_string()) })
        .await
}

/// Mock backend that records every request it sees.
pub async fn start_recording_backend(
    body: &'static str,
) -> (SocketAddr, Arc<Mutex<Vec<MockRequest>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let addr = start_programmable_backend(move |req| {
        sink.lock().unwrap().push(req);
        async move { (200, Duration::ZERO, body.to_string()) }
    })
    .await;
    (addr, seen)
}

async fn read_head(socket: &mut tokio::net::TcpStream) -> Option<String> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
            return Some(String::from_utf8_lossy(&buf).into_owned());
        }
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "Unknown",
    }
}

/// An address nothing is listening on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Config tuned for tests: metrics off, fast retries.
pub fn test_config() -> StackConfig {
    let mut config = StackConfig::default();
    config.observability.metrics_enabled = false;
    config.retries.base_delay_ms = 10;
    config.retries.max_delay_ms = 50;
    config
}

/// Start the gateway against `backend` and return its address.
pub async fn start_gateway(
    mut config: StackConfig,
    backend: SocketAddr,
    request_timeout: Duration,
    shutdown: &Shutdown,
) -> SocketAddr {
    config.gateway.backend_base_url = format!("http://{}", backend);
    let client = BackendClient::new(&config.gateway, &config.retries)
        .unwrap()
        .with_request_timeout(request_timeout)
        .with_ready_timeout(Duration::from_millis(500));
    let server = GatewayServer::with_client(&config, client);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });
    addr
}

/// Start the data service over `store` and return its address.
pub async fn start_data_service(store: Arc<dyn CatalogStore>, shutdown: &Shutdown) -> SocketAddr {
    start_data_service_with(test_config(), store, shutdown).await
}

/// Start the data service with an explicit config.
pub async fn start_data_service_with(
    config: StackConfig,
    store: Arc<dyn CatalogStore>,
    shutdown: &Shutdown,
) -> SocketAddr {
    let server = DataServer::new(&config, store);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });
    addr
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// How the in-memory store should behave.
#[derive(Debug, Clone)]
pub enum StoreMode {
    Healthy,
    Unavailable,
    QueryFails,
    /// Every checkout waits out the acquire timeout.
    Exhausted,
    /// Every call hangs this long before answering.
    Slow(Duration),
}

/// In-memory `CatalogStore`.
pub struct MockCatalogStore {
    pub items: Vec<Item>,
    pub clubs: Vec<FootballClub>,
    pub mode: StoreMode,
    pub closed: Mutex<bool>,
}

impl MockCatalogStore {
    pub fn new(items: Vec<Item>, clubs: Vec<FootballClub>) -> Self {
        Self {
            items,
            clubs,
            mode: StoreMode::Healthy,
            closed: Mutex::new(false),
        }
    }

    pub fn failing(mode: StoreMode) -> Self {
        Self {
            mode,
            ..Self::new(Vec::new(), Vec::new())
        }
    }

    async fn check(&self) -> Result<(), DbError> {
        match self.mode {
            StoreMode::Healthy => Ok(()),
            StoreMode::Slow(delay) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
            StoreMode::Exhausted => Err(DbError::from(sqlx::Error::PoolTimedOut)),
            StoreMode::Unavailable => Err(DbError::Unavailable(
                "connection to server at \"10.1.2.3\", port 5432 failed".to_string(),
            )),
            StoreMode::QueryFails => Err(DbError::Query(
                "relation \"items\" does not exist".to_string(),
            )),
        }
    }
}

#[async_trait]
impl CatalogStore for MockCatalogStore {
    async fn probe(&self) -> Result<PoolStatus, DbError> {
        self.check().await?;
        Ok(PoolStatus { size: 3, idle: 2, max: 10 })
    }

    async fn list_items(&self) -> Result<Vec<Item>, DbError> {
        self.check().await?;
        let mut items = self.items.clone();
        items.sort_by_key(|i| i.id);
        Ok(items)
    }

    async fn list_clubs(&self) -> Result<Vec<FootballClub>, DbError> {
        self.check().await?;
        let mut clubs = self.clubs.clone();
        clubs.sort_by_key(|c| c.id);
        Ok(clubs)
    }

    async fn close(&self) {
        *self.closed.lock().unwrap() = true;
    }
}

pub fn item(id: i32, name: &str) -> Item {
    Item {
        id,
        name: name.to_string(),
        description: Some(format!("{} description", name)),
        created_at: NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap(),
    }
}

pub fn club(id: i32, name: &str, country: &str, founded_year: i32) -> FootballClub {
    FootballClub {
        id,
        name: name.to_string(),
        country: Some(country.to_string()),
        founded_year: Some(founded_year),
        created_at: NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap(),
    }
}
