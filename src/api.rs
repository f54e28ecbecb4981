// API client module: a small blocking HTTP client that talks to the
// back-office service. Every call goes to `<api>/<path>` and exchanges JSON.
// The `Transport` trait is the seam tests replace; `HttpTransport` is the
// reqwest-backed implementation used by the binary.

use std::time::Duration;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use reqwest::blocking::Client;
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Failure of a single request: the connection, the status, or the body.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error(
        "Response code {} ({}) from {url}{}",
        .status.as_u16(),
        .status.canonical_reason().unwrap_or("Unknown"),
        response_text(.body)
    )]
    Status {
        status: StatusCode,
        url: String,
        body: String,
    },

    #[error("Invalid JSON response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

fn response_text(body: &str) -> String {
    match body.trim() {
        "" => String::new(),
        text => format!(" - {text}"),
    }
}

/// Issues one request and hands back the body of a successful response.
pub trait Transport {
    /// Non-success statuses must come back as `ApiError::Status`.
    fn send(&self, method: Method, url: &str, body: Option<&Value>) -> Result<String, ApiError>;

    /// GET `url` and decode the body as JSON.
    fn fetch_json(&self, url: &str) -> Result<Value, ApiError> {
        let text = self.send(Method::GET, url, None)?;
        decode(url, &text)
    }

    /// POST `body` as JSON to `url` and decode the JSON response.
    fn post_json(&self, url: &str, body: &Value) -> Result<Value, ApiError> {
        let text = self.send(Method::POST, url, Some(body))?;
        decode(url, &text)
    }
}

fn decode(url: &str, text: &str) -> Result<Value, ApiError> {
    serde_json::from_str(text).map_err(|source| ApiError::Decode {
        url: url.to_string(),
        source,
    })
}

/// reqwest blocking client. Transport defaults apply (no retries, default
/// timeouts).
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    spinner: bool,
}

impl HttpTransport {
    pub fn new() -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(HttpTransport {
            client,
            spinner: false,
        })
    }

    /// Show a spinner on stderr while a request is outstanding.
    pub fn with_spinner(mut self, enabled: bool) -> Self {
        self.spinner = enabled;
        self
    }

    fn execute(&self, method: Method, url: &str, body: Option<&Value>) -> Result<String, ApiError> {
        debug!("{method} {url}");
        let mut req = self
            .client
            .request(method, url)
            .header(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(body) = body {
            req = req.json(body);
        }
        let res = req.send()?;
        let status = res.status();
        debug!("{url} -> {status}");
        if !status.is_success() {
            let body = res.text().unwrap_or_default();
            return Err(ApiError::Status {
                status,
                url: url.to_string(),
                body,
            });
        }
        Ok(res.text()?)
    }
}

impl Transport for HttpTransport {
    fn send(&self, method: Method, url: &str, body: Option<&Value>) -> Result<String, ApiError> {
        let spinner = self.spinner.then(|| spinner(format!("{method} {url}")));
        let result = self.execute(method, url, body);
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }
        result
    }
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// A product as returned by the service. Only `name`, `rrp` and `info` are
/// rendered; `id` is optional and may be a number or a string.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rrp: Value,
    #[serde(default)]
    pub info: String,
}

/// Payload of the add-product form.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub rrp: f64,
    pub info: String,
}

/// Text for a scalar JSON value as the service sent it; `None` for null.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Typed calls against one base URL.
pub struct ApiClient<'t, T: Transport + ?Sized> {
    transport: &'t T,
    base_url: String,
}

impl<'t, T: Transport + ?Sized> ApiClient<'t, T> {
    pub fn new(transport: &'t T, base_url: impl Into<String>) -> Self {
        ApiClient {
            transport,
            base_url: base_url.into(),
        }
    }

    /// `<api>/<path>`, without doubling the separator.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// GET `/<category>`.
    pub fn products(&self, category: &str) -> Result<Vec<Product>, ApiError> {
        let url = self.url(category);
        let value = self.transport.fetch_json(&url)?;
        products_from(&url, value)
    }

    /// POST a new product to `/<category>`; the service answers with the
    /// updated list.
    pub fn add_product(&self, category: &str, product: &NewProduct) -> Result<Vec<Product>, ApiError> {
        let url = self.url(category);
        let body = json!({
            "name": product.name,
            "rrp": product.rrp,
            "info": product.info,
        });
        let value = self.transport.post_json(&url, &body)?;
        products_from(&url, value)
    }

    /// POST `{ amount }` to `/orders/<id>`. The response body is ignored.
    pub fn add_order(&self, id: &str, amount: i64) -> Result<(), ApiError> {
        let url = self.url(&format!("orders/{id}"));
        self.transport
            .send(Method::POST, &url, Some(&json!({ "amount": amount })))?;
        Ok(())
    }
}

fn products_from(url: &str, value: Value) -> Result<Vec<Product>, ApiError> {
    serde_json::from_value(value).map_err(|source| ApiError::Decode {
        url: url.to_string(),
        source,
    })
}
