//! Outbound HTTP helper.
//!
//! [`HttpClient::send_request`] performs one JSON request and reports any
//! failure as `None`, so reactors can turn it straight into a fallback
//! reply. Failures are logged here with the status and body.

use std::collections::HashMap;
use std::fmt;

use reqwest::Client;
use tracing::{debug, warn};

/// HTTP method supported by [`HttpClient::send_request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    /// Arguments are sent as query parameters.
    Get,
    /// Arguments are sent as a JSON body.
    Post,
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
        })
    }
}

/// Thin JSON-over-HTTP wrapper around a shared [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct HttpClient {
    http: Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send a request and decode the JSON reply.
    ///
    /// `args` should be a JSON object (or `Null` for none). For GET its
    /// scalar members become query parameters; for POST it is the body.
    /// `headers` are applied on top of the JSON `Content-Type` and
    /// `Accept` defaults.
    ///
    /// Returns `None` on transport errors, non-2xx statuses, and bodies
    /// that are not valid JSON.
    pub async fn send_request(
        &self,
        method: RequestMethod,
        url: &str,
        args: &serde_json::Value,
        headers: &HashMap<String, String>,
    ) -> Option<serde_json::Value> {
        let mut req = match method {
            RequestMethod::Get => self.http.get(url).query(&query_pairs(args)),
            RequestMethod::Post => self.http.post(url).json(args),
        }
        .header("Content-Type", "application/json")
        .header("Accept", "application/json");

        for (k, v) in headers {
            req = req.header(k.as_str(), v.as_str());
        }

        debug!(method = %method, url = %url, "sending outbound request");

        let response = match req.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(method = %method, url = %url, error = %e, "outbound request failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                method = %method,
                url = %url,
                status = status.as_u16(),
                body = %body,
                "outbound request returned error status"
            );
            return None;
        }

        match response.json::<serde_json::Value>().await {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(method = %method, url = %url, error = %e, "outbound response was not JSON");
                None
            }
        }
    }
}

/// Flatten a JSON object into query pairs. Strings are sent bare, other
/// scalars in their JSON form; nulls are dropped.
fn query_pairs(args: &serde_json::Value) -> Vec<(String, String)> {
    let Some(map) = args.as_object() else {
        return Vec::new();
    };
    map.iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| {
            let value = match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), value)
        })
        .collect()
}
