//! Contract with the backend call-initiation service.
//!
//! `POST /api/call` takes `{ "phone_number", "wait_for_answer" }` and answers 2xx with a
//! `message`, or non-2xx with an optional `detail`. `GET /api/health` reports liveness.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::error::{DialerError, Result};

const CALL_PATH: &str = "api/call";
const HEALTH_PATH: &str = "api/health";

pub const FALLBACK_REJECTION_MESSAGE: &str = "Failed to make call";
pub const TRANSPORT_ERROR_MESSAGE: &str = "An error occurred while making the call";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRequest {
    pub phone_number: String,
    pub wait_for_answer: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CallResponse {
    pub message: String,
    #[serde(default)]
    pub success: Option<bool>,
    /// Voice-agent room the call was placed into, when the backend reports one
    #[serde(default)]
    pub room_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    #[error("Backend rejected request ({status}): {}", .detail.as_deref().unwrap_or("no detail"))]
    Rejected { status: u16, detail: Option<String> },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },
}

impl CallError {
    /// Text shown to the operator in the result banner
    pub fn user_message(&self) -> String {
        match self {
            CallError::Rejected {
                detail: Some(detail),
                ..
            } => detail.clone(),
            CallError::Rejected { detail: None, .. } => FALLBACK_REJECTION_MESSAGE.to_string(),
            CallError::Transport { .. } | CallError::MalformedResponse { .. } => {
                TRANSPORT_ERROR_MESSAGE.to_string()
            }
        }
    }

    fn transport(err: impl std::fmt::Display) -> Self {
        CallError::Transport {
            message: err.to_string(),
        }
    }

    fn malformed(err: impl std::fmt::Display) -> Self {
        CallError::MalformedResponse {
            message: err.to_string(),
        }
    }
}

/// Backend that places outbound calls
#[async_trait]
pub trait CallBackend: Send + Sync {
    /// Human-readable location of the backend, for display
    fn endpoint(&self) -> &str;

    /// Issue exactly one call-initiation request
    async fn place_call(
        &self,
        request: CallRequest,
    ) -> std::result::Result<CallResponse, CallError>;

    /// Probe the backend's health endpoint
    async fn health(&self) -> std::result::Result<HealthResponse, CallError>;
}

/// `CallBackend` over HTTP
pub struct HttpCallBackend {
    http_client: Client,
    base_url: Url,
    display_url: String,
}

impl HttpCallBackend {
    pub fn new(base_url: &str, connect_timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| DialerError::Http(e.to_string()))?;
        Self::with_client(base_url, http_client)
    }

    pub fn with_client(base_url: &str, http_client: Client) -> Result<Self> {
        let mut url = Url::parse(base_url).map_err(|e| DialerError::InvalidUrl {
            url: base_url.to_string(),
            message: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DialerError::InvalidUrl {
                url: base_url.to_string(),
                message: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        // Relative joins drop the last path segment unless it ends in '/'
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(Self {
            http_client,
            display_url: base_url.trim_end_matches('/').to_string(),
            base_url: url,
        })
    }

    fn url_for(&self, path: &str) -> std::result::Result<Url, CallError> {
        self.base_url.join(path).map_err(CallError::transport)
    }
}

#[async_trait]
impl CallBackend for HttpCallBackend {
    fn endpoint(&self) -> &str {
        &self.display_url
    }

    async fn place_call(
        &self,
        request: CallRequest,
    ) -> std::result::Result<CallResponse, CallError> {
        let url = self.url_for(CALL_PATH)?;
        tracing::debug!("POST {} wait_for_answer={}", url, request.wait_for_answer);

        let response = self
            .http_client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(CallError::transport)?;

        let status = response.status();
        let body = response.text().await.map_err(CallError::transport)?;

        if status.is_success() {
            serde_json::from_str::<CallResponse>(&body).map_err(CallError::malformed)
        } else {
            Err(parse_rejection(status.as_u16(), &body))
        }
    }

    async fn health(&self) -> std::result::Result<HealthResponse, CallError> {
        let url = self.url_for(HEALTH_PATH)?;
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(CallError::transport)?;

        let status = response.status();
        let body = response.text().await.map_err(CallError::transport)?;

        if status.is_success() {
            serde_json::from_str::<HealthResponse>(&body).map_err(CallError::malformed)
        } else {
            Err(parse_rejection(status.as_u16(), &body))
        }
    }
}

/// Build a rejection from a non-2xx body. The body must be JSON; only a non-empty
/// string `detail` is surfaced (validation errors carry a list there instead).
fn parse_rejection(status: u16, body: &str) -> CallError {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => {
            let detail = value
                .get("detail")
                .and_then(serde_json::Value::as_str)
                .filter(|d| !d.is_empty())
                .map(str::to_string);
            CallError::Rejected { status, detail }
        }
        Err(e) => CallError::malformed(format!("status {}: {}", status, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    /// Accept one connection, answer it with a canned response and hand back the raw
    /// request that was received.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            request
        });

        (format!("http://{}", addr), handle)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let headers = String::from_utf8_lossy(&buf[..pos]).to_lowercase();
                let content_length = headers
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= pos + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn backend(base_url: &str) -> HttpCallBackend {
        let client = Client::builder().no_proxy().build().unwrap();
        HttpCallBackend::with_client(base_url, client).unwrap()
    }

    fn request() -> CallRequest {
        CallRequest {
            phone_number: "+18005551234".to_string(),
            wait_for_answer: true,
        }
    }

    #[tokio::test]
    async fn test_place_call_success() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"success":true,"message":"Call placed","room_name":null}"#,
        )
        .await;

        let response = backend(&url).place_call(request()).await.unwrap();
        assert_eq!(response.message, "Call placed");
        assert_eq!(response.success, Some(true));
        assert_eq!(response.room_name, None);

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /api/call HTTP/1.1"));
        let body = raw.split("\r\n\r\n").nth(1).unwrap();
        let sent: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(
            sent,
            serde_json::json!({ "phone_number": "+18005551234", "wait_for_answer": true })
        );
    }

    #[tokio::test]
    async fn test_base_url_with_path_prefix() {
        let (url, server) = serve_once("200 OK", r#"{"message":"ok"}"#).await;
        let prefixed = format!("{}/voice", url);

        backend(&prefixed).place_call(request()).await.unwrap();
        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /voice/api/call HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_rejection_with_detail() {
        let (url, _server) = serve_once(
            "500 Internal Server Error",
            r#"{"detail":"Agent busy"}"#,
        )
        .await;

        let err = backend(&url).place_call(request()).await.unwrap_err();
        assert_eq!(
            err,
            CallError::Rejected {
                status: 500,
                detail: Some("Agent busy".to_string())
            }
        );
        assert_eq!(err.user_message(), "Agent busy");
    }

    #[tokio::test]
    async fn test_rejection_without_detail() {
        let (url, _server) = serve_once("500 Internal Server Error", r#"{}"#).await;

        let err = backend(&url).place_call(request()).await.unwrap_err();
        assert_eq!(err.user_message(), FALLBACK_REJECTION_MESSAGE);
    }

    #[tokio::test]
    async fn test_rejection_with_structured_detail_uses_fallback() {
        let (url, _server) = serve_once(
            "422 Unprocessable Entity",
            r#"{"detail":[{"loc":["body","phone_number"],"msg":"invalid"}]}"#,
        )
        .await;

        let err = backend(&url).place_call(request()).await.unwrap_err();
        assert_eq!(
            err,
            CallError::Rejected {
                status: 422,
                detail: None
            }
        );
    }

    #[tokio::test]
    async fn test_non_json_bodies_are_malformed() {
        let (url, _server) = serve_once("502 Bad Gateway", "<html>bad gateway</html>").await;
        let err = backend(&url).place_call(request()).await.unwrap_err();
        assert!(matches!(err, CallError::MalformedResponse { .. }));
        assert_eq!(err.user_message(), TRANSPORT_ERROR_MESSAGE);

        let (url, _server) = serve_once("200 OK", r#"{"status":"queued"}"#).await;
        let err = backend(&url).place_call(request()).await.unwrap_err();
        assert!(matches!(err, CallError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = backend(&format!("http://{}", addr))
            .place_call(request())
            .await
            .unwrap_err();
        assert!(matches!(err, CallError::Transport { .. }));
        assert_eq!(err.user_message(), TRANSPORT_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_health() {
        let (url, server) = serve_once("200 OK", r#"{"status":"ok"}"#).await;
        let health = backend(&url).health().await.unwrap();
        assert!(health.is_ok());

        let raw = server.await.unwrap();
        assert!(raw.starts_with("GET /api/health HTTP/1.1"));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            HttpCallBackend::new("not a url", Duration::from_secs(1)),
            Err(DialerError::InvalidUrl { .. })
        ));
        assert!(matches!(
            HttpCallBackend::new("ftp://example.com", Duration::from_secs(1)),
            Err(DialerError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_endpoint_display() {
        let backend =
            HttpCallBackend::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();
        assert_eq!(backend.endpoint(), "http://localhost:8000");
    }
}
