//! REST client for the storefront cart API.
//!
//! Thin, typed wrapper over the backend cart endpoints. Every call carries a
//! bearer token and a per-request timeout; a timed-out call surfaces as a
//! retryable [`GatewayError::Timeout`], never as silent abandonment.
//!
//! Endpoints:
//! - `POST /auth/login` - exchange credentials for a bearer token
//! - `GET /products/:id` - product snapshot for add-to-cart
//! - `GET /cart` / `POST /cart` - list and add lines
//! - `PUT /cart/:productId/:size` - update a line quantity
//! - `DELETE /cart/:productId/:size` / `DELETE /cart` - remove and clear

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use fashionhub_core::{Accessory, CartLine, LineKey, Product, ProductId};

use crate::config::CartConfig;
use crate::session::AccessToken;

/// Errors that can occur when calling the cart API.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request exceeded the configured timeout. Retryable.
    #[error("request timed out")]
    Timeout,

    /// Token missing, expired, or rejected (401/403).
    #[error("not authenticated")]
    Unauthorized,

    /// Resource does not exist (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response body.
    #[error("parse error: {0}")]
    Parse(String),
}

impl GatewayError {
    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(e)
        }
    }
}

/// Credentials for `POST /auth/login`.
#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

/// Body for `POST /cart`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddLineRequest<'a> {
    product_id: ProductId,
    size: &'a str,
    quantity: u32,
    accessories: &'a [Accessory],
}

/// Body for `PUT /cart/:productId/:size`.
#[derive(Debug, Serialize)]
struct UpdateQuantityRequest {
    quantity: u32,
}

/// Client for the storefront cart REST API.
#[derive(Debug, Clone)]
pub struct CartGateway {
    client: reqwest::Client,
    base: String,
}

impl CartGateway {
    /// Create a new gateway from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &CartConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base: config.api_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base)
    }

    fn line_url(&self, key: &LineKey) -> String {
        self.url(&format!("cart/{}/{}", key.product_id, key.size))
    }

    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` on bad credentials, or a transport error.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AccessToken, GatewayError> {
        let response = self
            .client
            .post(self.url("auth/login"))
            .json(&LoginRequest { email, password })
            .send()
            .await
            .map_err(GatewayError::from_reqwest)?;

        let response = check_status(response).await?;
        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))?;

        Ok(AccessToken::new(body.token))
    }

    /// Fetch a product snapshot by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown products, or a transport error.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, GatewayError> {
        let response = self
            .client
            .get(self.url(&format!("products/{id}")))
            .send()
            .await
            .map_err(GatewayError::from_reqwest)?;

        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))
    }

    /// Fetch the authenticated user's cart.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` when the token is rejected, or a transport
    /// error.
    #[instrument(skip(self, token))]
    pub async fn get_cart(&self, token: &AccessToken) -> Result<Vec<CartLine>, GatewayError> {
        let response = self
            .client
            .get(self.url("cart"))
            .bearer_auth(token.expose())
            .send()
            .await
            .map_err(GatewayError::from_reqwest)?;

        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))
    }

    /// Add a line to the remote cart. The backend merges duplicate
    /// `(productId, size)` keys by summing quantities.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` when the token is rejected, or a transport
    /// error.
    #[instrument(skip(self, token, accessories), fields(product = %product_id, size = %size))]
    pub async fn add_line(
        &self,
        token: &AccessToken,
        product_id: ProductId,
        size: &str,
        quantity: u32,
        accessories: &[Accessory],
    ) -> Result<(), GatewayError> {
        let response = self
            .client
            .post(self.url("cart"))
            .bearer_auth(token.expose())
            .json(&AddLineRequest {
                product_id,
                size,
                quantity,
                accessories,
            })
            .send()
            .await
            .map_err(GatewayError::from_reqwest)?;

        check_status(response).await.map(drop)
    }

    /// Set the quantity of an existing remote line.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the line is absent, `Unauthorized` when the
    /// token is rejected, or a transport error.
    #[instrument(skip(self, token), fields(key = %key))]
    pub async fn update_line(
        &self,
        token: &AccessToken,
        key: &LineKey,
        quantity: u32,
    ) -> Result<(), GatewayError> {
        let response = self
            .client
            .put(self.line_url(key))
            .bearer_auth(token.expose())
            .json(&UpdateQuantityRequest { quantity })
            .send()
            .await
            .map_err(GatewayError::from_reqwest)?;

        check_status(response).await.map(drop)
    }

    /// Remove one line from the remote cart.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the line is absent, `Unauthorized` when the
    /// token is rejected, or a transport error.
    #[instrument(skip(self, token), fields(key = %key))]
    pub async fn remove_line(
        &self,
        token: &AccessToken,
        key: &LineKey,
    ) -> Result<(), GatewayError> {
        let response = self
            .client
            .delete(self.line_url(key))
            .bearer_auth(token.expose())
            .send()
            .await
            .map_err(GatewayError::from_reqwest)?;

        check_status(response).await.map(drop)
    }

    /// Clear the remote cart. Idempotent on the backend side.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` when the token is rejected, or a transport
    /// error.
    #[instrument(skip(self, token))]
    pub async fn clear(&self, token: &AccessToken) -> Result<(), GatewayError> {
        let response = self
            .client
            .delete(self.url("cart"))
            .bearer_auth(token.expose())
            .send()
            .await
            .map_err(GatewayError::from_reqwest)?;

        check_status(response).await.map(drop)
    }
}

/// Map non-success statuses to the gateway error taxonomy.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(GatewayError::Unauthorized);
    }

    let message = response.text().await.unwrap_or_default();
    if status == StatusCode::NOT_FOUND {
        return Err(GatewayError::NotFound(message));
    }

    Err(GatewayError::Api {
        status: status.as_u16(),
        message,
    })
}
