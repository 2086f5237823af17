//! Small JSON HTTP client used to talk to a running woodchat server.
//!
//! Each call is a single attempt unless a retry budget is set. Retries cover
//! network failures, 429 and 5xx, waiting for `Retry-After` when the server
//! sends one and doubling from 200 ms otherwise. Error bodies are read from
//! `{"error": ...}`, `{"message": ...}` or `{"detail": ...}`.
//! `WOODCHAT_HTTP_RAW=1` logs request and response bodies under the
//! `http.raw` target.
//!
//! ```no_run
//! # async fn demo() -> Result<(), woodchat_http::HttpError> {
//! let client = woodchat_http::HttpClient::new("http://127.0.0.1:5000")?;
//! let health: serde_json::Value = client
//!     .get_json("healthz", woodchat_http::RequestOpts::default())
//!     .await?;
//! # Ok(()) }
//! ```
//!
//! [`ChatApi`] wraps the client with the two calls the chat surface needs.

use reqwest::header::{CONTENT_TYPE, HeaderMap, RETRY_AFTER};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, warn};

mod chat_api;

pub use chat_api::ChatApi;

const RAW_ENV: &str = "WOODCHAT_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024;
const SNIPPET_MAX: usize = 500;

static REQUEST_SEQ: AtomicU64 = AtomicU64::new(1);

fn raw_enabled() -> bool {
    matches!(env::var(RAW_ENV).as_deref(), Ok("1" | "true" | "yes"))
}

fn raw_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(&bytes[..bytes.len().min(RAW_MAX_BODY)]).into_owned()
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}")]
    Api { status: StatusCode, message: String },
}

impl HttpError {
    /// Status code for [`HttpError::Api`] errors.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HttpError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Per-request overrides of the client defaults.
///
/// ```
/// use woodchat_http::RequestOpts;
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(30)),
///     ..Default::default()
/// };
/// assert!(opts.retries.is_none());
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestOpts {
    pub timeout: Option<Duration>,
    pub retries: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Duration,
    pub max_retries: usize,
}

/// One completed exchange, before its status is judged.
struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// A base without a trailing slash gets one, so relative paths such as
    /// `api/ask` resolve beneath it.
    ///
    /// ```
    /// use woodchat_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("http://localhost:5000/chat")?;
    /// assert_eq!(client.base().as_str(), "http://localhost:5000/chat/");
    /// assert_eq!(client.default_timeout, Duration::from_secs(15));
    /// assert_eq!(client.max_retries, 0);
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let mut base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: Duration::from_secs(15),
            max_retries: 0,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    pub fn with_retries(mut self, n: usize) -> Self {
        self.max_retries = n;
        self
    }

    pub async fn get_json<T>(&self, path: &str, opts: RequestOpts) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        self.request_json::<(), T>(Method::GET, path, None, opts)
            .await
    }

    pub async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOpts,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request_json(Method::POST, path, Some(body), opts)
            .await
    }

    async fn request_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        opts: RequestOpts,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self
            .base
            .join(path.trim_start_matches('/'))
            .map_err(|e| HttpError::Url(e.to_string()))?;
        let body = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| HttpError::Build(e.to_string()))?;

        let budget = opts.retries.unwrap_or(self.max_retries);
        let timeout = opts.timeout.unwrap_or(self.default_timeout);
        let req_id = format!("r{}", REQUEST_SEQ.fetch_add(1, Ordering::Relaxed));
        let mut retries = 0usize;

        loop {
            let (failure, server_wait) =
                match self.attempt(&method, &url, body.as_deref(), timeout, &req_id).await {
                    Ok(reply) if reply.status.is_success() => {
                        return decode(&req_id, &reply.body);
                    }
                    Ok(reply) => {
                        let failure = HttpError::Api {
                            status: reply.status,
                            message: extract_error_message(&reply.body),
                        };
                        if !is_retryable(reply.status) {
                            warn!(
                                req_id = %req_id,
                                error = %failure,
                                body_snippet = %snip_body(&reply.body),
                                "http.error"
                            );
                            return Err(failure);
                        }
                        (failure, retry_after(&reply.headers))
                    }
                    Err(failure) => (failure, None),
                };

            if retries >= budget {
                warn!(req_id = %req_id, retries, error = %failure, "http.error");
                return Err(failure);
            }
            retries += 1;
            let delay = server_wait.unwrap_or_else(|| backoff(retries));
            warn!(
                req_id = %req_id,
                retry = retries,
                budget,
                backoff_ms = delay.as_millis() as u64,
                error = %failure,
                "http.retrying"
            );
            sleep(delay).await;
        }
    }

    async fn attempt(
        &self,
        method: &Method,
        url: &Url,
        body: Option<&[u8]>,
        timeout: Duration,
        req_id: &str,
    ) -> Result<Reply, HttpError> {
        let mut rb = self
            .inner
            .request(method.clone(), url.clone())
            .timeout(timeout);
        if let Some(bytes) = body {
            rb = rb
                .header(CONTENT_TYPE, "application/json")
                .body(bytes.to_vec());
        }

        debug!(
            req_id,
            %method,
            path = %url.path(),
            timeout_ms = timeout.as_millis() as u64,
            "http.request.start"
        );
        if raw_enabled() {
            let text = body.map(raw_text).unwrap_or_default();
            debug!(target: "http.raw", req_id, %method, %url, body = %text, "request");
        }

        let started = Instant::now();
        let network = |e: reqwest::Error| HttpError::Network(e.to_string());
        let resp = rb.send().await.map_err(network)?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await.map_err(network)?.to_vec();

        debug!(
            req_id,
            %status,
            duration_ms = started.elapsed().as_millis() as u64,
            body_len = body.len(),
            "http.response"
        );
        if raw_enabled() {
            debug!(target: "http.raw", req_id, %status, body = %raw_text(&body), "response");
        }
        Ok(Reply {
            status,
            headers,
            body,
        })
    }
}

fn decode<T: DeserializeOwned>(req_id: &str, body: &[u8]) -> Result<T, HttpError> {
    serde_json::from_slice(body).map_err(|e| {
        let snippet = snip_body(body);
        warn!(req_id, serde_err = %e, body_snippet = %snippet, "http.response.decode_error");
        HttpError::Decode(e.to_string(), snippet)
    })
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn backoff(attempt: usize) -> Duration {
    Duration::from_millis(200u64.saturating_mul(1 << (attempt.saturating_sub(1)).min(16)))
}

fn retry_after(h: &HeaderMap) -> Option<Duration> {
    h.get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())?
        .parse()
        .ok()
        .map(Duration::from_secs)
}

/// Best human-readable message from an error body.
fn extract_error_message(body: &[u8]) -> String {
    #[derive(Deserialize)]
    struct Msg {
        #[serde(default)]
        error: Option<serde_json::Value>,
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        detail: Option<String>,
    }

    if let Ok(m) = serde_json::from_slice::<Msg>(body) {
        match m.error {
            Some(serde_json::Value::String(s)) if !s.is_empty() => return s,
            // {"error": {"message": "..."}}
            Some(serde_json::Value::Object(obj)) => {
                if let Some(s) = obj.get("message").and_then(|v| v.as_str()) {
                    return s.to_string();
                }
            }
            _ => {}
        }
        if let Some(s) = m.message.filter(|s| !s.is_empty()) {
            return s;
        }
        if let Some(s) = m.detail.filter(|s| !s.is_empty()) {
            return s;
        }
    }
    snip_body(body)
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > SNIPPET_MAX {
        let mut cut = SNIPPET_MAX;
        while !snip.is_char_boundary(cut) {
            cut -= 1;
        }
        snip.truncate(cut);
        snip.push_str("...");
    }
    snip
}
