//! Tool adapters: the client half of each host round trip.
//!
//! A tool shapes its arguments into a JSON payload, POSTs it to the host
//! route through [`HostClient`], and renders whatever comes back with
//! [`format_response`]. Tools never branch on the response themselves.

pub mod line_tools;

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::HostConfig;

/// Errors raised by the tool-side HTTP client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configured base URL is not an absolute http(s) URL.
    #[error("invalid host base URL: {url}")]
    InvalidBaseUrl {
        /// The rejected URL.
        url: String,
    },

    /// The request could not be sent or its body could not be read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// A response from the host, whatever its status.
#[derive(Debug, Clone, PartialEq)]
pub struct HostReply {
    /// HTTP status code.
    pub status: u16,
    /// Parsed JSON body, or the raw text as a JSON string if it was not JSON.
    pub body: Value,
}

impl HostReply {
    /// Whether the status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// HTTP client for the host routes.
#[derive(Debug, Clone)]
pub struct HostClient {
    http: Client,
    base_url: String,
}

impl HostClient {
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be built.
    pub fn new(config: &HostConfig) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Self::with_client(builder.build()?, &config.base_url)
    }

    /// Creates a client around an existing `reqwest::Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute http(s) URL.
    pub fn with_client(http: Client, base_url: &str) -> Result<Self, ClientError> {
        let parsed = Url::parse(base_url).map_err(|_| ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidBaseUrl {
                url: base_url.to_string(),
            });
        }

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL the routes are appended to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for a route path such as `/create_line_based_element/`.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// POSTs `payload` as JSON to `path`.
    ///
    /// Any HTTP status is returned as a [`HostReply`].
    ///
    /// # Errors
    ///
    /// Returns an error only if the request cannot be sent or the response
    /// body cannot be read.
    pub async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<HostReply, ClientError> {
        let url = self.url_for(path);
        debug!(url = %url, "POST to host");

        let response = self.http.post(&url).json(payload).send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text))
        };

        debug!(url = %url, status, "Host replied");
        Ok(HostReply { status, body })
    }
}

/// Renders a host round trip as text for the tool caller.
///
/// - 2xx: the body, pretty-printed
/// - other statuses: `Error (HTTP <status>): <message>`, using the body's
///   `error` field when there is one
/// - transport failures: `Error: <message>`
#[must_use]
pub fn format_response(result: &Result<HostReply, ClientError>) -> String {
    match result {
        Ok(reply) if reply.is_success() => render_value(&reply.body),
        Ok(reply) => {
            let message = reply
                .body
                .get("error")
                .map_or_else(|| render_value(&reply.body), render_value);
            format!("Error (HTTP {}): {message}", reply.status)
        }
        Err(e) => format!("Error: {e}"),
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}
