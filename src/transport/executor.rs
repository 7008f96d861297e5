//! The single-attempt HTTP seam.
//!
//! [`HttpExecutor`] performs exactly one network attempt; retry policy,
//! header assembly and envelope handling all live in
//! [`super::Transport`]. Tests swap the executor for a scripted mock,
//! production uses [`ReqwestExecutor`].

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::errors::{Error, Result};

/// HTTP method subset the verification API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// One fully assembled outgoing request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    /// Ordered header list; later entries replace earlier ones with the
    /// same (case-insensitive) name.
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl HttpRequest {
    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw response of one attempt.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    /// Parsed JSON body, `None` when the body was not valid JSON.
    pub body: Option<serde_json::Value>,
}

/// Performs exactly one network attempt per call.
#[async_trait]
pub trait HttpExecutor: Send + Sync {
    /// Execute the request. A `Connection` error means the service was
    /// never reached (or answered unintelligibly at the socket level);
    /// any response with an HTTP status comes back as `Ok`.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

#[async_trait]
impl<E: HttpExecutor + ?Sized> HttpExecutor for Arc<E> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        (**self).execute(request).await
    }
}

/// Production executor over a shared [`reqwest::Client`].
pub struct ReqwestExecutor {
    client: reqwest::Client,
}

impl ReqwestExecutor {
    pub fn new(config: &Arc<ClientConfig>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Connection(format!("Failed to build HTTP client: {}", e)))?;
        Ok(ReqwestExecutor { client })
    }
}

#[async_trait]
impl HttpExecutor for ReqwestExecutor {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        let body = serde_json::from_str(&text).ok();
        Ok(HttpResponse { status, body })
    }
}
