//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use image_proxy::config::ProxyConfig;
use image_proxy::http::HttpServer;
use image_proxy::lifecycle::Shutdown;

/// A canned origin answer.
#[derive(Clone)]
pub struct OriginReply {
    pub status: u16,
    pub content_type: Option<&'static str>,
    pub body: Vec<u8>,
    /// Content-Length to announce instead of the real body length.
    pub declared_length: Option<usize>,
}

impl OriginReply {
    pub fn ok(content_type: &'static str, body: &[u8]) -> Self {
        Self {
            status: 200,
            content_type: Some(content_type),
            body: body.to_vec(),
            declared_length: None,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            content_type: Some("text/plain"),
            body: b"nope".to_vec(),
            declared_length: None,
        }
    }

    /// Announce `len` bytes but send only the real body, then hang up.
    #[allow(dead_code)]
    pub fn truncated(mut self, len: usize) -> Self {
        self.declared_length = Some(len);
        self
    }
}

/// Request heads seen by a mock origin, in arrival order.
#[derive(Clone, Default)]
pub struct Recorded(Arc<Mutex<Vec<String>>>);

#[allow(dead_code)]
impl Recorded {
    pub fn count(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    pub fn heads(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// Value of `name` in the `index`th request, matched case-insensitively.
    pub fn header(&self, index: usize, name: &str) -> Option<String> {
        let heads = self.heads();
        let head = heads.get(index)?;
        head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim().to_string())
        })
    }
}

/// Start a mock origin on an ephemeral port answering every request via `f`.
pub async fn start_programmable_origin<F, Fut>(f: F) -> (SocketAddr, Recorded)
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = OriginReply> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let recorded = Recorded::default();
    let log = recorded.clone();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let log = log.clone();
                    tokio::spawn(async move {
                        let head = read_head(&mut socket).await;
                        log.0.lock().unwrap().push(head);

                        let reply = f().await;
                        let status_text = match reply.status {
                            200 => "200 OK",
                            403 => "403 Forbidden",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let mut response = format!("HTTP/1.1 {}\r\n", status_text);
                        if let Some(content_type) = reply.content_type {
                            response.push_str(&format!("Content-Type: {}\r\n", content_type));
                        }
                        response.push_str(&format!(
                            "Content-Length: {}\r\nConnection: close\r\n\r\n",
                            reply.declared_length.unwrap_or(reply.body.len())
                        ));

                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.write_all(&reply.body).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, recorded)
}

/// Start a mock origin that always gives the same answer.
#[allow(dead_code)]
pub async fn start_mock_origin(reply: OriginReply) -> (SocketAddr, Recorded) {
    start_programmable_origin(move || {
        let reply = reply.clone();
        async move { reply }
    })
    .await
}

/// Start a mock origin that waits `delay` before answering.
#[allow(dead_code)]
pub async fn start_slow_origin(delay: Duration, reply: OriginReply) -> (SocketAddr, Recorded) {
    start_programmable_origin(move || {
        let reply = reply.clone();
        async move {
            tokio::time::sleep(delay).await;
            reply
        }
    })
    .await
}

/// An address nothing is listening on.
#[allow(dead_code)]
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Config suitable for tests: loopback bind, no system proxy.
#[allow(dead_code)]
pub fn test_config() -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.fetch.system_proxy = false;
    config
}

/// Start the proxy on an ephemeral port.
#[allow(dead_code)]
pub async fn start_proxy(config: ProxyConfig) -> (SocketAddr, Shutdown) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config).unwrap();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

async fn read_head(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}
