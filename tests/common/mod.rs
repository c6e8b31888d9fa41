#![allow(dead_code)]

use campsite_bookings::{
    AppState, app, auth::Role, auth::TokenAuthority, db, services::capacity::CapacityTable,
};
use serde_json::Value;
use std::{net::SocketAddr, sync::Arc};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

pub struct TestServer {
    pub addr: SocketAddr,
    pub tokens: TokenAuthority,
}

impl TestServer {
    pub fn token(&self, subject: &str, role: Role) -> String {
        self.tokens
            .issue(subject, role, chrono::Duration::hours(1))
            .expect("issue token")
    }

    pub fn bearer(&self, role: Role) -> String {
        let subject = match role {
            Role::Manager => "front-desk",
            Role::Owner => "owner",
        };
        format!("Bearer {}", self.token(subject, role))
    }
}

pub async fn spawn(capacity: CapacityTable) -> TestServer {
    let pool = Arc::new(db::memory_pool().await.expect("memory pool"));
    let tokens = TokenAuthority::new("integration-secret").expect("token authority");
    let state = AppState::new(pool, capacity, tokens.clone())
        .with_password_params(argon2::Params::new(1024, 1, 1, None).expect("argon2 params"));
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app(state)).await.expect("serve");
    });
    TestServer { addr, tokens }
}

/// Send one raw HTTP/1.1 request and return status plus decoded JSON body.
pub async fn send(
    addr: SocketAddr,
    method: &str,
    path: &str,
    headers: &[(&str, &str)],
    body: Option<&str>,
) -> (u16, Value) {
    let (status, _, json) = send_with_headers(addr, method, path, headers, body).await;
    (status, json)
}

/// Like [`send`], also returning response headers with lowercased names.
pub async fn send_with_headers(
    addr: SocketAddr,
    method: &str,
    path: &str,
    headers: &[(&str, &str)],
    body: Option<&str>,
) -> (u16, Vec<(String, String)>, Value) {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let mut req = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    for (k, v) in headers {
        req.push_str(&format!("{k}: {v}\r\n"));
    }
    if let Some(body) = body {
        req.push_str("Content-Type: application/json\r\n");
        req.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }
    req.push_str("\r\n");
    if let Some(body) = body {
        req.push_str(body);
    }
    stream
        .write_all(req.as_bytes())
        .await
        .expect("write request");

    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    let (head, body) = response
        .split_once("\r\n\r\n")
        .expect("http response must have separator");
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .expect("http status");
    let response_headers = head
        .lines()
        .skip(1)
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_string()))
        .collect();
    let json = if body.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
    };
    (status, response_headers, json)
}

pub fn booking_body(tier: &str, check_in: &str, check_out: &str, guests: u32) -> String {
    serde_json::json!({
        "packageType": tier,
        "checkIn": check_in,
        "checkOut": check_out,
        "guests": guests,
        "vegGuests": guests,
        "nonVegGuests": 0,
        "customerName": "Ravi Kulkarni",
        "customerPhone": "+91 99755 00000"
    })
    .to_string()
}
