use async_trait::async_trait;
use http::{HeaderMap, Request, Response};
use tracing::error;

use crate::errors::{FCMError, Result};

/// Executes HTTP exchanges for the FCM client and its token provider.
///
/// Swap the implementation to route through a proxy, pin TLS roots or
/// stub the network in tests. Implementations must tolerate concurrent calls.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: &Request<Vec<u8>>) -> Result<Response<Vec<u8>>>;
}

/// Default transport backed by `reqwest`
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured client (proxy, TLS, timeouts)
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: &Request<Vec<u8>>) -> Result<Response<Vec<u8>>> {
        let response = self
            .client
            .request(request.method().clone(), request.uri().to_string())
            .headers(request.headers().clone())
            .body(request.body().clone())
            .send()
            .await
            .map_err(|e| {
                error!(uri = %request.uri(), "HTTP exchange failed: {}", e);
                FCMError::SendRequestError(e.to_string())
            })?;

        let mut builder = Response::builder()
            .status(response.status())
            .version(response.version());
        if let Some(headers) = builder.headers_mut() {
            headers.extend(response.headers().clone());
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FCMError::SendRequestError(format!("failed to read body: {}", e)))?;

        builder
            .body(body.to_vec())
            .map_err(|e| FCMError::SendRequestError(e.to_string()))
    }
}

/// Renders a request the way it goes out on the wire
pub fn dump_request(request: &Request<Vec<u8>>) -> String {
    let uri = request.uri();
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let mut dump = format!("{} {} HTTP/1.1\r\n", request.method(), target);
    if let Some(host) = uri.authority() {
        dump.push_str(&format!("Host: {}\r\n", host));
    }
    push_headers(&mut dump, request.headers());
    dump.push_str("\r\n");
    dump.push_str(&String::from_utf8_lossy(request.body()));
    dump
}

/// Renders a response with its status line, headers and body
pub fn dump_response(response: &Response<Vec<u8>>) -> String {
    let mut dump = format!("{:?} {}\r\n", response.version(), response.status());
    push_headers(&mut dump, response.headers());
    dump.push_str("\r\n");
    dump.push_str(&String::from_utf8_lossy(response.body()));
    dump
}

fn push_headers(dump: &mut String, headers: &HeaderMap) {
    for (name, value) in headers {
        dump.push_str(&format!(
            "{}: {}\r\n",
            name,
            String::from_utf8_lossy(value.as_bytes())
        ));
    }
}
