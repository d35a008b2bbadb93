use async_trait::async_trait;
use serde_json::Value;

use super::error::ApiError;
use crate::models::PaymentType;

/// Query pairs forwarded verbatim to list endpoints.
pub type QueryPairs = Vec<(String, String)>;

/// The marketplace REST surface this client consumes.
///
/// Methods return the raw JSON body; envelope normalization and typed
/// decoding happen above this seam so every transport shares them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketplaceApi: Send + Sync {
    /// `GET /api/property`
    async fn list_properties(&self, query: QueryPairs) -> Result<Value, ApiError>;

    /// `GET /api/property/my-properties`
    async fn my_properties(&self) -> Result<Value, ApiError>;

    /// `GET /api/property/user/orders`
    async fn ordered_properties(&self) -> Result<Value, ApiError>;

    /// `GET /api/property/user/pending-payments`
    async fn pending_payments(&self) -> Result<Value, ApiError>;

    /// `POST /api/property/:id/order`
    async fn order_property(&self, property_id: &str) -> Result<Value, ApiError>;

    /// `POST /api/payments/initialize`
    async fn initialize_payment(
        &self,
        property_id: &str,
        payment_type: PaymentType,
    ) -> Result<Value, ApiError>;

    /// `POST /api/payments/:id/cancel`
    async fn cancel_payment(&self, payment_id: &str) -> Result<Value, ApiError>;

    /// `GET /api/payments/client/summary`
    async fn client_summary(&self) -> Result<Value, ApiError>;

    /// `GET /api/payments/owner/earnings`
    async fn owner_earnings(&self) -> Result<Value, ApiError>;

    /// `GET /api/payments/user/my-payments`
    async fn my_payments(&self, query: QueryPairs) -> Result<Value, ApiError>;
}
