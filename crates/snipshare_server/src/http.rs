//! Minimal HTTP listener for the webhook route.
//!
//! The server speaks just enough HTTP/1.1 to accept provider
//! deliveries: one route, connection-per-request, close after
//! responding. Everything interesting happens in
//! [`WebhookHandler`](crate::handler::WebhookHandler).

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::{Headers, HttpReply, WebhookHandler};
use snipshare_core::SnippetService;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;

const WEBHOOK_PATH: &str = "/identity-webhook";
const MAX_HEAD_BYTES: usize = 16 * 1024;

/// The webhook HTTP server.
pub struct WebhookServer {
    config: ServerConfig,
    handler: Arc<WebhookHandler>,
}

impl WebhookServer {
    /// Creates a server, failing fast when the signing secret is
    /// missing or malformed.
    pub fn new(config: ServerConfig, service: Arc<SnippetService>) -> ServerResult<Self> {
        let handler = Arc::new(WebhookHandler::new(&config, service)?);
        Ok(Self { config, handler })
    }

    /// Binds the configured address and serves until the task is
    /// cancelled.
    pub async fn serve(&self) -> ServerResult<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve_on(listener).await
    }

    /// Serves on an already-bound listener.
    ///
    /// Useful when the caller binds port 0 and needs the actual address.
    pub async fn serve_on(&self, listener: TcpListener) -> ServerResult<()> {
        tracing::info!(addr = %listener.local_addr()?, "webhook server listening");

        loop {
            let (stream, peer) = listener.accept().await?;
            let handler = Arc::clone(&self.handler);
            let timeout = self.config.request_timeout;
            let max_body = self.config.max_body_bytes;
            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, handler, timeout, max_body).await {
                    tracing::debug!(%peer, error = %e, "connection closed with error");
                }
            });
        }
    }
}

async fn handle_connection<S>(
    mut stream: S,
    handler: Arc<WebhookHandler>,
    timeout: std::time::Duration,
    max_body: usize,
) -> std::io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let reply = match tokio::time::timeout(timeout, read_request(&mut stream, max_body)).await {
        Ok(Ok(request)) => route(&handler, &request),
        Ok(Err(e)) => HttpReply {
            status: e.status_code(),
            body: e.to_string(),
        },
        Err(_) => HttpReply {
            status: 408,
            body: "request timed out".into(),
        },
    };
    write_reply(&mut stream, &reply).await
}

#[derive(Debug)]
struct Request {
    method: String,
    path: String,
    headers: Headers,
    body: Vec<u8>,
}

fn route(handler: &WebhookHandler, request: &Request) -> HttpReply {
    if request.path != WEBHOOK_PATH {
        return HttpReply {
            status: 404,
            body: "not found".into(),
        };
    }
    if request.method != "POST" {
        return HttpReply {
            status: 405,
            body: "method not allowed".into(),
        };
    }
    handler.handle(&request.headers, &request.body)
}

async fn read_request<S>(stream: &mut S, max_body: usize) -> ServerResult<Request>
where
    S: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let head_end = loop {
        if let Some(pos) = find_subslice(&buf, b"\r\n\r\n") {
            break pos;
        }
        if buf.len() > MAX_HEAD_BYTES {
            return Err(ServerError::invalid_request("request head too large"));
        }
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(ServerError::invalid_request("unexpected end of stream"));
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = std::str::from_utf8(&buf[..head_end])
        .map_err(|_| ServerError::invalid_request("request head is not UTF-8"))?;
    let mut lines = head.split("\r\n");

    let request_line = lines
        .next()
        .ok_or_else(|| ServerError::invalid_request("empty request"))?;
    let mut parts = request_line.split_whitespace();
    let method = parts
        .next()
        .ok_or_else(|| ServerError::invalid_request("missing method"))?
        .to_string();
    let path = parts
        .next()
        .ok_or_else(|| ServerError::invalid_request("missing path"))?
        .to_string();

    let mut headers = Headers::new();
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            return Err(ServerError::invalid_request("malformed header line"));
        };
        headers.insert(name.trim(), value.trim());
    }

    let content_length: usize = match headers.get("content-length") {
        Some(value) => value
            .parse()
            .map_err(|_| ServerError::invalid_request("bad content-length"))?,
        None => 0,
    };
    if content_length > max_body {
        return Err(ServerError::invalid_request("request body too large"));
    }

    let mut body = buf[head_end + 4..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(ServerError::invalid_request("body shorter than declared"));
        }
        body.extend_from_slice(&chunk[..n]);
    }
    body.truncate(content_length);

    Ok(Request {
        method,
        path,
        headers,
        body,
    })
}

async fn write_reply<S>(stream: &mut S, reply: &HttpReply) -> std::io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    let head = format!(
        "HTTP/1.1 {} {}\r\ncontent-type: text/plain; charset=utf-8\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
        reply.status,
        reason(reply.status),
        reply.body.len()
    );
    stream.write_all(head.as_bytes()).await?;
    stream.write_all(reply.body.as_bytes()).await?;
    stream.flush().await
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        408 => "Request Timeout",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_request(method: &str, path: &str, headers: &[(&str, &str)], body: &[u8]) -> Vec<u8> {
        let mut out = format!("{method} {path} HTTP/1.1\r\n").into_bytes();
        for (name, value) in headers {
            out.extend_from_slice(format!("{name}: {value}\r\n").as_bytes());
        }
        out.extend_from_slice(format!("content-length: {}\r\n\r\n", body.len()).as_bytes());
        out.extend_from_slice(body);
        out
    }

    async fn parse(bytes: Vec<u8>) -> ServerResult<Request> {
        let (mut client, mut server) = tokio::io::duplex(64 * 1024);
        tokio::spawn(async move {
            client.write_all(&bytes).await.unwrap();
            client.shutdown().await.unwrap();
        });
        read_request(&mut server, 256 * 1024).await
    }

    #[tokio::test]
    async fn parses_post_with_body() {
        let bytes = raw_request(
            "POST",
            "/identity-webhook",
            &[("provider-id", "msg_1")],
            b"{\"type\":\"noop\"}",
        );
        let request = parse(bytes).await.unwrap();

        assert_eq!(request.method, "POST");
        assert_eq!(request.path, "/identity-webhook");
        assert_eq!(request.headers.get("provider-id"), Some("msg_1"));
        assert_eq!(request.body, b"{\"type\":\"noop\"}");
    }

    #[tokio::test]
    async fn rejects_truncated_body() {
        let mut bytes = raw_request("POST", "/identity-webhook", &[], b"full body here");
        bytes.truncate(bytes.len() - 5);
        let err = parse(bytes).await.unwrap_err();
        assert!(matches!(err, ServerError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn rejects_oversized_body() {
        let bytes = raw_request("POST", "/identity-webhook", &[], &vec![b'x'; 512]);
        let (mut client, mut server) = tokio::io::duplex(64 * 1024);
        tokio::spawn(async move {
            client.write_all(&bytes).await.unwrap();
        });
        let err = read_request(&mut server, 256).await.unwrap_err();
        assert!(matches!(err, ServerError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn unknown_path_is_404() {
        let service = Arc::new(SnippetService::new());
        let config = ServerConfig::default().with_secret("secret");
        let handler = WebhookHandler::new(&config, service).unwrap();
        let request = parse(raw_request("POST", "/elsewhere", &[], b"")).await.unwrap();

        let reply = route(&handler, &request);
        assert_eq!(reply.status, 404);
    }

    #[tokio::test]
    async fn wrong_method_is_405() {
        let service = Arc::new(SnippetService::new());
        let config = ServerConfig::default().with_secret("secret");
        let handler = WebhookHandler::new(&config, service).unwrap();
        let request = parse(raw_request("GET", "/identity-webhook", &[], b"")).await.unwrap();

        let reply = route(&handler, &request);
        assert_eq!(reply.status, 405);
    }

    #[tokio::test]
    async fn reply_is_well_formed() {
        let (mut client, mut server) = tokio::io::duplex(4096);
        let reply = HttpReply {
            status: 200,
            body: "webhook processed".into(),
        };
        write_reply(&mut server, &reply).await.unwrap();
        drop(server);

        let mut out = Vec::new();
        client.read_to_end(&mut out).await.unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.ends_with("webhook processed"));
        assert!(text.contains("content-length: 17"));
    }
}
