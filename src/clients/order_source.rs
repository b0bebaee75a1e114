//! Order status source.
//!
//! [`OrderQueryService`] is the seam the trackers poll through. [`EsbasClient`]
//! is the production implementation backed by the food court gateway.

use crate::config::OrderSourceConfig;
use crate::model::{OrderId, OrderItem};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ORIGIN, USER_AGENT};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Errors returned by an order source.
///
/// Every variant is a failed query. An order without items is `Ok(vec![])`,
/// never an error.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Deserialization failed: {0}")]
    DeserializeFailed(String),

    /// Used by test doubles and in-process sources.
    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

/// Looks up the current items of an order.
#[async_trait]
pub trait OrderQueryService: Send + Sync {
    async fn query(&self, order: &OrderId) -> Result<Vec<OrderItem>, QueryError>;
}

const AUTH_PATH: &str = "/mipapigateway/api/Login/Authenticate";
const ORDER_STATUS_PATH: &str = "/MIPAPIGATEWAY/api/Stock/GetProductFoodCourtDeliveryOrderStatus";

/// Credential payload of the login endpoint.
///
/// The gateway requires the placeholder fields even though it ignores them.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthPayload<'a> {
    kullanici_adi: &'a str,
    sifre: &'a str,
    id: u32,
    reklam: &'a str,
    soyad: &'a str,
    jeton: &'a str,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    token: Option<String>,
}

/// REST client for the food court order gateway.
///
/// Authenticates on every query; the gateway's tokens are short-lived and the
/// poll rate is low.
pub struct EsbasClient {
    base_url: String,
    username: String,
    password: String,
    client: Client,
}

impl EsbasClient {
    pub fn new(config: &OrderSourceConfig) -> Result<Self, QueryError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| QueryError::ApiError(format!("Invalid user agent: {}", e)))?,
        );
        headers.insert(
            ORIGIN,
            HeaderValue::from_str(&config.origin)
                .map_err(|e| QueryError::ApiError(format!("Invalid origin: {}", e)))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            base_url: config.base_url.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            client,
        })
    }

    async fn authenticate(&self) -> Result<String, QueryError> {
        let url = format!("{}{}", self.base_url, AUTH_PATH);
        let payload = AuthPayload {
            kullanici_adi: &self.username,
            sifre: &self.password,
            id: 0,
            reklam: "dize",
            soyad: "dize",
            jeton: "dize",
        };

        let response = self.client.post(&url).json(&payload).send().await?;
        if !response.status().is_success() {
            return Err(QueryError::AuthFailed(format!("status {}", response.status())));
        }

        let auth: AuthResponse = response
            .json()
            .await
            .map_err(|e| QueryError::DeserializeFailed(e.to_string()))?;

        match auth.token {
            Some(token) if !token.is_empty() => {
                debug!("Obtained gateway token");
                Ok(token)
            }
            _ => Err(QueryError::AuthFailed("response carried no token".to_string())),
        }
    }
}

#[async_trait]
impl OrderQueryService for EsbasClient {
    #[instrument(skip(self), fields(order = %order))]
    async fn query(&self, order: &OrderId) -> Result<Vec<OrderItem>, QueryError> {
        let token = self.authenticate().await.inspect_err(|e| {
            warn!(error = %e, "Gateway authentication failed");
        })?;

        let url = format!("{}{}", self.base_url, ORDER_STATUS_PATH);
        let response = self
            .client
            .get(&url)
            .query(&[("orderNumber", order.as_str())])
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(QueryError::ApiError(format!(
                "Failed to fetch order status: {}",
                response.status()
            )));
        }

        let items: Option<Vec<OrderItem>> = response
            .json()
            .await
            .map_err(|e| QueryError::DeserializeFailed(e.to_string()))?;
        let items = items.unwrap_or_default();

        debug!(count = items.len(), "Fetched order items");
        Ok(items)
    }
}
