//! One-shot clients for the aggregation server: the producer side
//! that publishes a feed file and the reader side that fetches the
//! snapshot. Plain glue over the wire protocol; each call opens one
//! connection, performs one request/response cycle, and returns.

use std::path::Path;

use serde_json::{Map, Value};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufStream};
use tokio::net::TcpStream;
use tracing::debug;

use crate::clock::LamportClock;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("server closed the connection before a status line")]
    NoResponse,
    #[error("feed file has no usable id entry")]
    MissingId,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Parsed server reply: status code, the echoed clock when the server
/// sent one, and the body when one was declared.
#[derive(Debug)]
pub struct ServerReply {
    pub status: u16,
    pub lamport: Option<u64>,
    pub body: Option<String>,
}

/// Read a `key: value` feed file into a JSON object. Lines without a
/// colon are skipped; the result must carry a non-empty `id`.
pub fn read_feed(path: &Path) -> Result<Map<String, Value>, ClientError> {
    let text = std::fs::read_to_string(path)?;
    let mut doc = Map::new();
    for line in text.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        doc.insert(key.to_string(), Value::String(value.trim().to_string()));
    }
    match doc.get("id").and_then(Value::as_str) {
        Some(id) if !id.is_empty() => Ok(doc),
        _ => Err(ClientError::MissingId),
    }
}

/// Publish one reading. Ticks `clock` for the send event, carries the
/// ticked value in the request, and folds the server's echoed clock
/// back in, so the producer's clock ends up ahead of everything it
/// has seen.
pub async fn publish(
    addr: &str,
    clock: &LamportClock,
    payload: &Map<String, Value>,
) -> Result<ServerReply, ClientError> {
    let body = serde_json::to_string_pretty(payload)?;
    let sent = clock.tick();

    let request = format!(
        "PUT /weather.json HTTP/1.1\r\nContent-Type: application/json\r\nContent-Length: {}\r\nLamport-Clock: {}\r\n\r\n{}",
        body.len(),
        sent,
        body,
    );

    let reply = exchange(addr, request.as_bytes()).await?;
    if let Some(remote) = reply.lamport {
        clock.merge(remote);
    }
    debug!(status = reply.status, clock = clock.value(), "published reading");
    Ok(reply)
}

/// Fetch the current snapshot.
pub async fn fetch(addr: &str) -> Result<ServerReply, ClientError> {
    exchange(addr, b"GET /weather.json HTTP/1.1\r\nConnection: close\r\n\r\n").await
}

async fn exchange(addr: &str, request: &[u8]) -> Result<ServerReply, ClientError> {
    let stream = TcpStream::connect(addr)
        .await
        .map_err(|source| ClientError::Connect {
            addr: addr.to_string(),
            source,
        })?;
    let mut stream = BufStream::new(stream);
    stream.write_all(request).await?;
    stream.flush().await?;

    let mut status_line = String::new();
    if stream.read_line(&mut status_line).await? == 0 {
        return Err(ClientError::NoResponse);
    }
    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .unwrap_or(0);

    let mut lamport = None;
    let mut content_length: Option<usize> = None;
    loop {
        let mut line = String::new();
        if stream.read_line(&mut line).await? == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if name.eq_ignore_ascii_case("lamport-clock") {
            lamport = value.parse().ok();
        } else if name.eq_ignore_ascii_case("content-length") {
            content_length = value.parse().ok();
        }
    }

    let body = match content_length {
        Some(len) if len > 0 => {
            let mut buf = vec![0u8; len];
            stream.read_exact(&mut buf).await?;
            Some(String::from_utf8_lossy(&buf).into_owned())
        }
        _ => None,
    };

    Ok(ServerReply {
        status,
        lamport,
        body,
    })
}
