use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

use super::error::ApiError;
use super::traits::{MarketplaceApi, QueryPairs};
use crate::config::ClientConfig;
use crate::models::PaymentType;

/// reqwest-backed marketplace client
pub struct HttpMarketplaceClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpMarketplaceClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("marketplace-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Value, ApiError> {
        let response = builder.send().await.map_err(|err| {
            warn!(error = %err, "request failed before a response arrived");
            ApiError::Network {
                reason: err.to_string(),
            }
        })?;

        let status = response.status();
        let url = response.url().clone();
        let body = response.text().await?;
        debug!(%url, status = status.as_u16(), bytes = body.len(), "response received");

        let value = if body.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str::<Value>(&body) {
                Ok(value) => value,
                Err(err) if status.is_success() => return Err(ApiError::from(err)),
                Err(_) => Value::String(body),
            }
        };

        if status.is_success() {
            Ok(value)
        } else {
            let err = ApiError::from_response(status.as_u16(), &value);
            warn!(%url, status = status.as_u16(), error = %err, "server rejected request");
            Err(err)
        }
    }

    async fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.send(self.request(Method::GET, path)).await
    }

    async fn post(&self, path: &str, body: Option<Value>) -> Result<Value, ApiError> {
        let builder = self.request(Method::POST, path);
        let builder = match body {
            Some(body) => builder.json(&body),
            None => builder,
        };
        self.send(builder).await
    }
}

/// `{prefix}/{id}/{action}` with `id` escaped as a single path segment.
fn id_path(prefix: &str, id: &str, action: &str) -> String {
    format!("{}/{}/{}", prefix, urlencoding::encode(id), action)
}

#[async_trait]
impl MarketplaceApi for HttpMarketplaceClient {
    async fn list_properties(&self, query: QueryPairs) -> Result<Value, ApiError> {
        debug!(?query, "listing properties");
        self.send(self.request(Method::GET, "/api/property").query(&query))
            .await
    }

    async fn my_properties(&self) -> Result<Value, ApiError> {
        self.get("/api/property/my-properties").await
    }

    async fn ordered_properties(&self) -> Result<Value, ApiError> {
        self.get("/api/property/user/orders").await
    }

    async fn pending_payments(&self) -> Result<Value, ApiError> {
        self.get("/api/property/user/pending-payments").await
    }

    async fn order_property(&self, property_id: &str) -> Result<Value, ApiError> {
        self.post(&id_path("/api/property", property_id, "order"), None)
            .await
    }

    async fn initialize_payment(
        &self,
        property_id: &str,
        payment_type: PaymentType,
    ) -> Result<Value, ApiError> {
        let body = json!({
            "propertyId": property_id,
            "paymentType": payment_type,
        });
        self.post("/api/payments/initialize", Some(body)).await
    }

    async fn cancel_payment(&self, payment_id: &str) -> Result<Value, ApiError> {
        self.post(&id_path("/api/payments", payment_id, "cancel"), None)
            .await
    }

    async fn client_summary(&self) -> Result<Value, ApiError> {
        self.get("/api/payments/client/summary").await
    }

    async fn owner_earnings(&self) -> Result<Value, ApiError> {
        self.get("/api/payments/owner/earnings").await
    }

    async fn my_payments(&self, query: QueryPairs) -> Result<Value, ApiError> {
        self.send(
            self.request(Method::GET, "/api/payments/user/my-payments")
                .query(&query),
        )
        .await
    }
}
