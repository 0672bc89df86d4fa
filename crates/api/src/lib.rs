//! Savor storefront API client.
//!
//! This module provides a lightweight client for the storefront's REST API.
//! It focuses on:
//!
//! - Constructing an HTTP client with sensible defaults (cookies, timeout)
//! - Reading the API origin from `SAVOR_API_BASE` and validating it
//! - Attaching a bearer token drawn from an injected [`TokenSource`]
//! - Typed helpers for the demo-login and cart endpoints
//!
//! # Example
//!
//! ```ignore
//! use savor_api::StorefrontClient;
//! use savor_types::DemoRole;
//!
//! async fn login() -> anyhow::Result<()> {
//!     let client = StorefrontClient::new_from_env()?;
//!     let credentials = client.demo_token(DemoRole::User).await?;
//!     println!("logged in as {}", credentials.user.id);
//!     Ok(())
//! }
//! ```

use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, Method, RequestBuilder, StatusCode, header};
use savor_types::{CartItem, Credentials, DemoRole, StorefrontUser};
use savor_util::redact_sensitive;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};
use url::Url;

/// Environment variable naming the storefront API origin.
pub const API_BASE_ENV: &str = "SAVOR_API_BASE";
/// Origin used when [`API_BASE_ENV`] is unset.
pub const DEFAULT_API_BASE: &str = "http://localhost:5000";
/// Every REST route lives under this prefix.
const API_PREFIX: &str = "/api";
/// Hostnames allowed for local development regardless of scheme.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1"];
const REQUEST_TIMEOUT: Duration = Duration::from_secs(50);

/// Supplies the bearer token attached to outgoing requests.
///
/// Implemented by the auth state store so the client never reaches into a
/// process-wide singleton.
pub trait TokenSource: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

/// Thin wrapper around a configured `reqwest::Client` for storefront API access.
#[derive(Clone)]
pub struct StorefrontClient {
    pub base_url: String,
    pub http: Client,
    pub user_agent: String,
    token_source: Option<Arc<dyn TokenSource>>,
}

impl fmt::Debug for StorefrontClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorefrontClient")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .field("has_token_source", &self.token_source.is_some())
            .finish()
    }
}

impl StorefrontClient {
    /// Construct a client whose origin comes from `SAVOR_API_BASE`, falling back
    /// to [`DEFAULT_API_BASE`].
    pub fn new_from_env() -> Result<Self> {
        let base_url = env::var(API_BASE_ENV).unwrap_or_else(|_| DEFAULT_API_BASE.into());
        Self::new(base_url)
    }

    /// Construct a client for an explicit origin.
    ///
    /// Non-localhost origins must use HTTPS. A trailing slash is dropped.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        validate_base_url(&base_url)?;

        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(default_headers)
            .cookie_store(true)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("build http client")?;

        Ok(Self {
            base_url,
            http,
            user_agent: format!("savor-cli/0.1; {}", env::consts::OS),
            token_source: None,
        })
    }

    /// Attach the source consulted for a bearer token on every request.
    pub fn with_token_source(mut self, token_source: Arc<dyn TokenSource>) -> Self {
        self.token_source = Some(token_source);
        self
    }

    /// Build a `reqwest::RequestBuilder` for a method and API-relative path.
    ///
    /// `path` is resolved under `/api`; the bearer token is attached when the
    /// token source has one.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}{}", self.base_url, API_PREFIX, path);
        debug!(%url, %method, "building request");

        let builder = self.http.request(method, url).header(header::USER_AGENT, &self.user_agent);
        match self.token_source.as_ref().and_then(|source| source.bearer_token()) {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Request a short-lived demo account for `role`.
    pub async fn demo_token(&self, role: DemoRole) -> Result<Credentials> {
        let response: DemoTokenResponse = self
            .send_json(self.request(Method::POST, "/demo/auth/demo-token").json(&json!({ "role": role })))
            .await
            .with_context(|| format!("request {role} demo token"))?;
        Ok(Credentials {
            access_token: response.token,
            user: response.user,
        })
    }

    /// Fetch the authenticated user's cart.
    pub async fn cart(&self) -> Result<Vec<CartItem>> {
        let response: CartResponse = self.send_json(self.request(Method::GET, "/cart")).await.context("fetch cart")?;
        Ok(response.items)
    }

    pub async fn add_to_cart(&self, product_id: &str, quantity: u32) -> Result<ApiMessage> {
        let body = json!({ "productId": product_id, "quantity": quantity });
        self.send_json(self.request(Method::POST, "/cart/add").json(&body))
            .await
            .context("add item to cart")
    }

    /// Replace the remote cart with `items` and return what the server kept.
    pub async fn sync_cart(&self, items: &[CartItem]) -> Result<Vec<CartItem>> {
        let response: CartResponse = self
            .send_json(self.request(Method::POST, "/cart/sync").json(&json!({ "cartItems": items })))
            .await
            .context("sync cart")?;
        Ok(response.items)
    }

    pub async fn update_cart_item(&self, product_id: &str, quantity: u32) -> Result<ApiMessage> {
        let body = json!({ "productId": product_id, "quantity": quantity });
        self.send_json(self.request(Method::PUT, "/cart/update").json(&body))
            .await
            .context("update cart item")
    }

    pub async fn remove_cart_item(&self, product_id: &str) -> Result<ApiMessage> {
        let body = json!({ "productId": product_id });
        self.send_json(self.request(Method::DELETE, "/cart/remove").json(&body))
            .await
            .context("remove cart item")
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!("unauthorized request; token may be expired");
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(status_error(status, &text));
        }
        response.json::<T>().await.context("decode response body")
    }
}

/// Error for a non-success response. The body's `message` is preferred over the
/// raw text, and either is redacted since error bodies may echo credentials.
fn status_error(status: StatusCode, body: &str) -> anyhow::Error {
    let message = serde_json::from_str::<ApiMessage>(body)
        .ok()
        .and_then(|payload| payload.message)
        .unwrap_or_else(|| body.to_string());
    anyhow!("storefront API returned {status}: {}", redact_sensitive(&message))
}

/// Generic `{ "message": ... }` acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DemoTokenResponse {
    token: String,
    user: StorefrontUser,
}

#[derive(Debug, Default, Deserialize)]
struct CartResponse {
    #[serde(default)]
    items: Vec<CartItem>,
}

/// Validate that a base URL is acceptable for use by the client.
///
/// Rules:
/// - `localhost` or `127.0.0.1`: any scheme is allowed
/// - otherwise: scheme must be HTTPS
fn validate_base_url(base: &str) -> Result<()> {
    let parsed_base_url = Url::parse(base).map_err(|e| anyhow!("Invalid {} URL '{}': {}", API_BASE_ENV, base, e))?;

    let host_name = parsed_base_url
        .host_str()
        .ok_or_else(|| anyhow!("{} must include a host", API_BASE_ENV))?;

    if LOCALHOST_DOMAINS
        .iter()
        .any(|&allowed| host_name.eq_ignore_ascii_case(allowed))
    {
        return Ok(());
    }

    if parsed_base_url.scheme() != "https" {
        return Err(anyhow!(
            "{} must use https for non-localhost hosts; got '{}://'",
            API_BASE_ENV,
            parsed_base_url.scheme()
        ));
    }

    Ok(())
}
