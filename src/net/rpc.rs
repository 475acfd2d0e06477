//! JSON-RPC 2.0 transport.
//!
//! Courier talks to the network through a single blocking request/response
//! call. [`HttpTransport`] is the production transport; tests script a mock
//! transport instead.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use url::Url;

/// Error talking to the network.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("failed to reach {url}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}: {body}")]
    Http {
        url: String,
        status: u16,
        body: String,
    },

    #[error("`{method}` failed: {message} (code {code})")]
    Node {
        method: String,
        code: i64,
        message: String,
        data: Option<Value>,
    },

    #[error("invalid response to `{method}`")]
    InvalidResponse {
        method: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A blocking JSON-RPC transport.
pub trait Transport {
    /// Send one request and return its `result` value.
    fn request(&self, method: &str, params: Value) -> Result<Value, RpcError>;

    /// Human-readable endpoint, for messages.
    fn endpoint(&self) -> String;
}

#[derive(Serialize)]
struct Request<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct Response {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<ErrorObject>,
}

#[derive(Deserialize)]
struct ErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

/// JSON-RPC over HTTP(S).
#[derive(Debug)]
pub struct HttpTransport {
    url: Url,
    client: reqwest::blocking::Client,
    next_id: AtomicU64,
}

impl HttpTransport {
    /// Create a transport for `url`. `timeout` bounds each HTTP request.
    pub fn new(url: Url, timeout: Duration) -> Result<Self, RpcError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("courier/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| RpcError::Transport {
                url: url.to_string(),
                source,
            })?;

        Ok(HttpTransport {
            url,
            client,
            next_id: AtomicU64::new(1),
        })
    }
}

impl Transport for HttpTransport {
    fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = Request {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        tracing::debug!("rpc -> {} (id {})", method, id);

        let response = self
            .client
            .post(self.url.clone())
            .json(&body)
            .send()
            .map_err(|source| RpcError::Transport {
                url: self.endpoint(),
                source,
            })?;

        let status = response.status();
        let text = response.text().map_err(|source| RpcError::Transport {
            url: self.endpoint(),
            source,
        })?;

        if !status.is_success() {
            return Err(RpcError::Http {
                url: self.endpoint(),
                status: status.as_u16(),
                body: text,
            });
        }

        decode_response(method, &text)
    }

    fn endpoint(&self) -> String {
        // Never echo credentials embedded in the URL.
        let mut url = self.url.clone();
        let _ = url.set_password(None);
        let _ = url.set_username("");
        url.to_string()
    }
}

/// Decode a JSON-RPC response envelope into its `result`.
pub fn decode_response(method: &str, text: &str) -> Result<Value, RpcError> {
    let response: Response =
        serde_json::from_str(text).map_err(|source| RpcError::InvalidResponse {
            method: method.to_string(),
            source,
        })?;

    if let Some(error) = response.error {
        return Err(RpcError::Node {
            method: method.to_string(),
            code: error.code,
            message: error.message,
            data: error.data,
        });
    }

    Ok(response.result.unwrap_or(Value::Null))
}

/// Typed JSON-RPC client over any transport.
#[derive(Debug)]
pub struct RpcClient<T> {
    transport: T,
}

impl<T: Transport> RpcClient<T> {
    pub fn new(transport: T) -> Self {
        RpcClient { transport }
    }

    /// Get the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Call `method` and deserialize its result.
    pub fn call<R: DeserializeOwned>(&self, method: &str, params: Value) -> Result<R, RpcError> {
        let value = self.transport.request(method, params)?;
        serde_json::from_value(value).map_err(|source| RpcError::InvalidResponse {
            method: method.to_string(),
            source,
        })
    }
}
