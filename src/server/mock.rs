//! In-memory connection used by the server and API tests.

use std::collections::HashMap;
use std::io::{self, Cursor};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::sync::RwLock;

use crate::server::{HttpServer, Route, ServerConfig};

/// Replays a fixed request and records whatever the server writes back.
pub(crate) struct MockTcpStream {
    read_data: Cursor<Vec<u8>>,
    write_data: Vec<u8>,
    stall_when_drained: bool,
}

impl MockTcpStream {
    pub(crate) fn new(read_data: impl Into<Vec<u8>>) -> Self {
        Self {
            read_data: Cursor::new(read_data.into()),
            write_data: Vec::new(),
            stall_when_drained: false,
        }
    }

    /// Like [`MockTcpStream::new`], but once the data runs out reads never
    /// complete, as with a client that stopped sending.
    pub(crate) fn stalled(read_data: impl Into<Vec<u8>>) -> Self {
        Self {
            stall_when_drained: true,
            ..Self::new(read_data)
        }
    }

    pub(crate) fn written_data(&self) -> &[u8] {
        &self.write_data
    }
}

impl AsyncRead for MockTcpStream {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let drained = this.read_data.position() >= this.read_data.get_ref().len() as u64;
        if drained && this.stall_when_drained {
            return Poll::Pending;
        }
        let n = std::io::Read::read(&mut this.read_data, buf.initialize_unfilled())?;
        buf.advance(n);
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for MockTcpStream {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        this.write_data.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// A response read back off the mock stream.
#[derive(Debug)]
pub(crate) struct TestResponse {
    pub(crate) status: u16,
    pub(crate) headers: HashMap<String, String>,
    pub(crate) body: Vec<u8>,
}

impl TestResponse {
    pub(crate) fn parse(raw: &[u8]) -> Self {
        let split = raw
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .expect("response has no header terminator");
        let head = std::str::from_utf8(&raw[..split]).expect("response head is not UTF-8");
        let mut lines = head.split("\r\n");

        let status = lines
            .next()
            .and_then(|line| line.split_whitespace().nth(1))
            .and_then(|code| code.parse().ok())
            .expect("response has no status code");

        let headers = lines
            .filter_map(|line| line.split_once(": "))
            .map(|(k, v)| (k.to_ascii_lowercase(), v.to_string()))
            .collect();

        Self {
            status,
            headers,
            body: raw[split + 4..].to_vec(),
        }
    }

    pub(crate) fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub(crate) fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub(crate) fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is not JSON")
    }
}

/// Build a raw HTTP/1.1 request, adding a JSON body when given.
pub(crate) fn raw_request(method: &str, path: &str, body: Option<&Value>) -> Vec<u8> {
    match body {
        Some(body) => {
            let body = body.to_string();
            format!(
                "{method} {path} HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
                body.len()
            )
            .into_bytes()
        }
        None => format!("{method} {path} HTTP/1.1\r\nHost: localhost\r\n\r\n").into_bytes(),
    }
}

/// Push `raw` through [`HttpServer::handle_connection`] and parse the reply.
pub(crate) async fn send(routes: &Arc<RwLock<Vec<Route>>>, raw: Vec<u8>) -> TestResponse {
    let mut stream = MockTcpStream::new(raw);
    HttpServer::handle_connection(&mut stream, routes.clone(), &ServerConfig::default())
        .await
        .expect("mock connection failed");
    TestResponse::parse(stream.written_data())
}
