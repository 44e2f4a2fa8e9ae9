//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use edge_router::config::{BrandConfig, EdgeConfig};

/// Start a mock origin that answers 200 and echoes the request target
/// (path plus query) in the response body, so tests can observe
/// exactly what the origin was asked for.
#[allow(dead_code)]
pub async fn start_echo_origin(addr: SocketAddr) {
    let listener = TcpListener::bind(addr).await.unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let target = read_request_target(&mut socket).await.unwrap_or_default();
                        let response = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            target.len(),
                            target
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}

/// Start a programmable mock origin; the closure receives the request
/// target and decides status and body per request.
#[allow(dead_code)]
pub async fn start_programmable_origin<F, Fut>(addr: SocketAddr, f: F)
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await.unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let target = read_request_target(&mut socket).await.unwrap_or_default();
                        let (status, body) = f(target).await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}

/// A config with two brands pointing at the given origin.
pub fn edge_config(proxy_addr: SocketAddr, origin_addr: SocketAddr) -> EdgeConfig {
    let mut config = EdgeConfig::default();
    config.listener.bind_address = proxy_addr.to_string();
    config.origin.url = format!("http://{}", origin_addr);
    config.observability.metrics_enabled = false;
    config.brands.push(BrandConfig {
        name: "moneyone".into(),
        hosts: vec!["moneyone.in".into(), "www.moneyone.in".into()],
        path_prefix: "/moneyone".into(),
    });
    config.brands.push(BrandConfig {
        name: "onemoney".into(),
        hosts: vec!["onemoney.in".into(), "www.onemoney.in".into()],
        path_prefix: "/onemoney".into(),
    });
    config
}

/// Read enough of the request to extract the request-line target.
async fn read_request_target(socket: &mut TcpStream) -> Option<String> {
    let mut buf = vec![0u8; 4096];
    let mut filled = 0;
    loop {
        let n = socket.read(&mut buf[filled..]).await.ok()?;
        if n == 0 {
            break;
        }
        filled += n;
        if buf[..filled].windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
        if filled == buf.len() {
            break;
        }
    }
    let text = String::from_utf8_lossy(&buf[..filled]);
    let request_line = text.lines().next()?;
    request_line.split_whitespace().nth(1).map(|s| s.to_string())
}
