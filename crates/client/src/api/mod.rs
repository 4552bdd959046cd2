//! REST API client for the Kirana storefront backend.
//!
//! # Architecture
//!
//! - One generic JSON request path with bearer-token attachment and a
//!   one-shot refresh-and-retry when the backend reports an expired token
//! - Typed endpoint wrappers grouped by concern (catalog, cart, addresses,
//!   orders, payments, auth)
//! - In-memory caching via `moka` for product lookups (5 minute TTL)
//!
//! # Token refresh
//!
//! A 401 whose body carries `code == "token_not_valid"` triggers exactly one
//! refresh of the access token followed by a retry of the original request.
//! If the refresh itself fails, stored tokens are purged and
//! [`ApiError::SessionExpired`] is returned - the embedding shell's cue to
//! send the user back to login. Any other 401 is surfaced as-is.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use kirana_client::{api::ApiClient, config::ClientConfig, session::FileSession};
//!
//! let config = ClientConfig::from_env()?;
//! let session = Arc::new(FileSession::open(&config.session_file));
//! let client = ApiClient::new(&config, session)?;
//!
//! let product = client.get_product(ProductId::new(3)).await?;
//! client.add_to_cart(product.id, 2).await?;
//! ```

mod addresses;
mod auth;
mod cart;
mod catalog;
mod orders;
mod payments;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use kirana_core::ProductId;

use crate::config::ClientConfig;
use crate::session::SessionStore;
use self::types::Product;

const PRODUCT_CACHE_CAPACITY: u64 = 1000;
const PRODUCT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Marker the backend puts in 401 bodies when the access token has expired.
const TOKEN_INVALID_MARKER: &str = "token_not_valid";

/// Errors that can occur when talking to the storefront API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The API returned a non-success status.
    #[error("API error ({status}): {body}")]
    Api { status: StatusCode, body: String },

    /// The access token expired and could not be refreshed.
    #[error("Session expired, sign in again")]
    SessionExpired,

    /// The API returned a success status with a non-JSON body.
    #[error("Server returned a non-JSON response")]
    UnexpectedContentType,
}

/// Whether a request carries the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Auth {
    /// Attach the access token when one is stored.
    Bearer,
    /// Never attach a token.
    Public,
}

/// Client for the storefront REST API.
///
/// Cheaply cloneable; all clones share the HTTP pool, session store, and
/// product cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    /// API base with no trailing slash; endpoint paths start with `/`.
    base: String,
    session: Arc<dyn SessionStore>,
    products: Cache<ProductId, Product>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ClientConfig, session: Arc<dyn SessionStore>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let products = Cache::builder()
            .max_capacity(PRODUCT_CACHE_CAPACITY)
            .time_to_live(PRODUCT_CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base: config.api_base.as_str().trim_end_matches('/').to_string(),
                session,
                products,
            }),
        })
    }

    /// The session store this client reads tokens from.
    #[must_use]
    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.inner.session
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base)
    }

    async fn send_once(
        &self,
        method: &Method,
        path: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let mut request = self.inner.http.request(method.clone(), self.endpoint(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        request.send().await
    }

    /// Execute a request and return the raw JSON body (null for 204/empty).
    pub(crate) async fn request_value(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        auth: Auth,
    ) -> Result<Value, ApiError> {
        let token = match auth {
            Auth::Bearer => self.inner.session.access_token(),
            Auth::Public => None,
        };

        let response = self
            .send_once(&method, path, body.as_ref(), token.as_deref())
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED && auth == Auth::Bearer {
            let text = response.text().await?;
            if has_token_invalid_marker(&text) {
                let access = self.refresh_access_token().await?;
                let retry = self
                    .send_once(&method, path, body.as_ref(), Some(&access))
                    .await?;
                return read_json_body(retry).await;
            }
            return Err(ApiError::Api {
                status: StatusCode::UNAUTHORIZED,
                body: text,
            });
        }

        read_json_body(response).await
    }

    /// Execute a request and deserialize the JSON body.
    pub(crate) async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        auth: Auth,
    ) -> Result<T, ApiError> {
        let value = self.request_value(method, path, body, auth).await?;
        serde_json::from_value(value).map_err(ApiError::Parse)
    }

    /// Execute a request and discard the body (DELETE endpoints return 204).
    pub(crate) async fn request_unit(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        auth: Auth,
    ) -> Result<(), ApiError> {
        self.request_value(method, path, body, auth).await.map(|_| ())
    }

    /// Exchange the stored refresh token for a fresh access token.
    ///
    /// On any failure the stored tokens are purged so the next attempt goes
    /// through login instead of looping on a dead refresh token.
    async fn refresh_access_token(&self) -> Result<String, ApiError> {
        let Some(refresh) = self.inner.session.refresh_token() else {
            self.inner.session.clear_tokens();
            return Err(ApiError::SessionExpired);
        };

        let response = self
            .send_once(
                &Method::POST,
                "/user/token/refresh/",
                Some(&serde_json::json!({ "refresh": refresh })),
                None,
            )
            .await?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "Token refresh rejected");
            self.inner.session.clear_tokens();
            return Err(ApiError::SessionExpired);
        }

        let value = read_json_body(response).await?;
        let refreshed: types::RefreshedAccess =
            serde_json::from_value(value).map_err(ApiError::Parse)?;
        self.inner.session.set_access_token(&refreshed.access);
        Ok(refreshed.access)
    }

    pub(crate) async fn cached_product(&self, id: ProductId) -> Option<Product> {
        self.inner.products.get(&id).await
    }

    pub(crate) async fn cache_product(&self, product: Product) {
        self.inner.products.insert(product.id, product).await;
    }
}

/// Check a 401 body for the backend's expired-token marker.
fn has_token_invalid_marker(body: &str) -> bool {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("code").and_then(|c| c.as_str().map(String::from)))
        .is_some_and(|code| code == TOKEN_INVALID_MARKER)
}

/// Read a response body as JSON, mapping non-success statuses and non-JSON
/// success bodies to errors. 204/empty bodies become `Value::Null`.
async fn read_json_body(response: reqwest::Response) -> Result<Value, ApiError> {
    let status = response.status();
    let is_json = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));

    let text = response.text().await?;

    if !status.is_success() {
        tracing::error!(
            status = %status,
            body = %truncate(&text, 500),
            "API returned non-success status"
        );
        return Err(ApiError::Api { status, body: text });
    }

    if status == StatusCode::NO_CONTENT || text.is_empty() {
        return Ok(Value::Null);
    }

    if !is_json {
        tracing::error!(body = %truncate(&text, 500), "Non-JSON response body");
        return Err(ApiError::UnexpectedContentType);
    }

    serde_json::from_str(&text).map_err(ApiError::Parse)
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
