//! End-to-end rewrite tests through the running proxy.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::sync::mpsc;

use edge_router::http::HttpServer;
use edge_router::lifecycle::Shutdown;

mod common;

#[tokio::test]
async fn test_rewrites_through_proxy() {
    let origin_addr: SocketAddr = "127.0.0.1:29181".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:29182".parse().unwrap();

    common::start_echo_origin(origin_addr).await;

    let config = common::edge_config(proxy_addr, origin_addr);
    let shutdown = Shutdown::new();
    let (_updates_tx, updates_rx) = mpsc::unbounded_channel();
    let server = HttpServer::new(config).unwrap();
    let listener = tokio::net::TcpListener::bind(proxy_addr).await.unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, updates_rx, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_secs(1)).await;

    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap();

    let cases = [
        // Root resolves to the brand's default document.
        ("moneyone.in", "/", "/moneyone/index.html"),
        // Already prefixed paths keep their prefix.
        ("moneyone.in", "/moneyone/team", "/moneyone/team/index.html"),
        ("moneyone.in", "/moneyone/team/", "/moneyone/team/index.html"),
        // www variant resolves identically.
        ("www.moneyone.in", "/team", "/moneyone/team/index.html"),
        // Assets pass through unprefixed.
        ("moneyone.in", "/styles/main.css", "/styles/main.css"),
        ("moneyone.in", "/favicon.ico", "/favicon.ico"),
        (
            "moneyone.in",
            "/_next/static/chunk.js",
            "/_next/static/chunk.js",
        ),
        // Unprefixed routes gain the brand prefix.
        ("onemoney.in", "/pricing", "/onemoney/pricing/index.html"),
        // Unknown hosts fall through to the default branch.
        ("cdn123.cloudfront.net", "/about", "/about/index.html"),
        ("cdn123.cloudfront.net", "/logo.png", "/logo.png"),
    ];

    for (host, uri, expected) in cases {
        let res = client
            .get(format!("http://{}{}", proxy_addr, uri))
            .header(reqwest::header::HOST, host)
            .send()
            .await
            .expect("Proxy unreachable");
        assert_eq!(res.status(), 200, "host={} uri={}", host, uri);
        let body = res.text().await.unwrap();
        assert_eq!(body, expected, "host={} uri={}", host, uri);
    }
}

#[tokio::test]
async fn test_query_string_survives_rewrite() {
    let origin_addr: SocketAddr = "127.0.0.1:29183".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:29184".parse().unwrap();

    common::start_echo_origin(origin_addr).await;

    let config = common::edge_config(proxy_addr, origin_addr);
    let shutdown = Shutdown::new();
    let (_updates_tx, updates_rx) = mpsc::unbounded_channel();
    let server = HttpServer::new(config).unwrap();
    let listener = tokio::net::TcpListener::bind(proxy_addr).await.unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, updates_rx, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_secs(1)).await;

    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap();

    let res = client
        .get(format!("http://{}/team?utm_source=mail", proxy_addr))
        .header(reqwest::header::HOST, "moneyone.in")
        .send()
        .await
        .expect("Proxy unreachable");
    assert_eq!(res.status(), 200);
    assert_eq!(
        res.text().await.unwrap(),
        "/moneyone/team/index.html?utm_source=mail"
    );
}

#[tokio::test]
async fn test_repeated_requests_are_deterministic() {
    let origin_addr: SocketAddr = "127.0.0.1:29185".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:29186".parse().unwrap();

    common::start_echo_origin(origin_addr).await;

    let config = common::edge_config(proxy_addr, origin_addr);
    let shutdown = Shutdown::new();
    let (_updates_tx, updates_rx) = mpsc::unbounded_channel();
    let server = HttpServer::new(config).unwrap();
    let listener = tokio::net::TcpListener::bind(proxy_addr).await.unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, updates_rx, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_secs(1)).await;

    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap();

    let mut bodies = Vec::new();
    for _ in 0..3 {
        let res = client
            .get(format!("http://{}/pricing", proxy_addr))
            .header(reqwest::header::HOST, "www.onemoney.in")
            .send()
            .await
            .expect("Proxy unreachable");
        bodies.push(res.text().await.unwrap());
    }
    assert_eq!(bodies[0], "/onemoney/pricing/index.html");
    assert!(bodies.windows(2).all(|w| w[0] == w[1]));
}
