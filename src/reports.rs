use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::envelope::unwrap_data;
use crate::api::{decode_page, ApiError, MarketplaceApi};
use crate::filters::PaymentHistoryQuery;
use crate::models::{ClientPaymentSummary, OwnerEarnings, Page, Payment};

/// Read-only payment reporting: client summary, owner earnings, payment history.
pub struct PaymentReports<A>
where
    A: MarketplaceApi + 'static,
{
    api: Arc<A>,
}

impl<A> PaymentReports<A>
where
    A: MarketplaceApi + 'static,
{
    pub fn new(api: Arc<A>) -> Self {
        Self { api }
    }

    pub async fn client_summary(&self) -> Result<ClientPaymentSummary, ApiError> {
        let payload = self.api.client_summary().await?;
        decode_object(payload)
    }

    pub async fn owner_earnings(&self) -> Result<OwnerEarnings, ApiError> {
        let payload = self.api.owner_earnings().await?;
        let earnings: OwnerEarnings = decode_object(payload)?;
        info!(
            total = earnings.total_earnings,
            sales = earnings.completed_sales,
            "reports: owner earnings loaded"
        );
        Ok(earnings)
    }

    /// Fetches one page of history and records the server's paging on `query`.
    /// On failure `query` goes back to the last filters that loaded.
    pub async fn my_payments(
        &self,
        query: &mut PaymentHistoryQuery,
    ) -> Result<Page<Payment>, ApiError> {
        let pairs = query.query_pairs();
        debug!(?pairs, "reports: fetching payment history");
        let payload = match self.api.my_payments(pairs).await {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, "reports: failed to fetch payment history");
                query.rollback();
                return Err(err);
            }
        };
        let page = decode_page::<Payment>(payload, query.page());
        query.apply_pagination(page.pagination);
        Ok(page)
    }
}

fn decode_object<T: DeserializeOwned>(payload: Value) -> Result<T, ApiError> {
    Ok(serde_json::from_value(unwrap_data(payload))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockMarketplaceApi;
    use crate::models::{PaymentStatus, PaymentType};
    use serde_json::json;

    #[tokio::test]
    async fn client_summary_unwraps_data() {
        let mut api = MockMarketplaceApi::new();
        api.expect_client_summary().returning(|| {
            Ok(json!({
                "success": true,
                "data": { "totalPaid": 120000, "pendingAmount": 5000, "completedCount": 3, "pendingCount": 1 }
            }))
        });

        let summary = PaymentReports::new(Arc::new(api)).client_summary().await.unwrap();
        assert_eq!(summary.total_paid, 120000.0);
        assert_eq!(summary.completed_count, 3);
        assert_eq!(summary.cancelled_count, 0);
    }

    #[tokio::test]
    async fn owner_earnings_with_recent_payments() {
        let mut api = MockMarketplaceApi::new();
        api.expect_owner_earnings().returning(|| {
            Ok(json!({
                "totalEarnings": 980000,
                "totalCommission": 20000,
                "completedSales": 2,
                "recentPayments": [
                    { "_id": "pay-1", "amount": 500000, "paymentType": "full_payment", "paymentStatus": "Completed" }
                ]
            }))
        });

        let earnings = PaymentReports::new(Arc::new(api)).owner_earnings().await.unwrap();
        assert_eq!(earnings.completed_sales, 2);
        assert_eq!(earnings.recent_payments.len(), 1);
        assert_eq!(earnings.recent_payments[0].payment_type, PaymentType::FullPayment);
    }

    #[tokio::test]
    async fn history_forwards_filters_and_tracks_paging() {
        let mut api = MockMarketplaceApi::new();
        api.expect_my_payments()
            .withf(|pairs| {
                pairs.iter().any(|(k, v)| k == "status" && v == "Pending")
                    && pairs.iter().any(|(k, v)| k == "page" && v == "1")
            })
            .returning(|_| {
                Ok(json!({
                    "payments": [
                        { "_id": "pay-2", "amount": 10000, "paymentType": "booking_fee", "paymentStatus": "Pending" }
                    ],
                    "pagination": { "currentPage": 1, "totalPages": 4, "total": 31 }
                }))
            });

        let reports = PaymentReports::new(Arc::new(api));
        let mut query = PaymentHistoryQuery::new();
        query.set_status(Some(PaymentStatus::Pending));

        let page = reports.my_payments(&mut query).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].payment_status, PaymentStatus::Pending);
        assert_eq!(query.pagination().total_pages, 4);
        assert!(query.go_to_page(4));
    }

    #[tokio::test]
    async fn undecodable_summary_is_a_decode_error() {
        let mut api = MockMarketplaceApi::new();
        api.expect_client_summary()
            .returning(|| Ok(json!({ "totalPaid": "lots" })));

        let err = PaymentReports::new(Arc::new(api)).client_summary().await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn failed_history_page_can_be_retried() {
        let mut api = MockMarketplaceApi::new();
        let mut seq = mockall::Sequence::new();
        api.expect_my_payments()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(json!({
                    "payments": [],
                    "pagination": { "currentPage": 1, "totalPages": 2, "total": 15 }
                }))
            });
        api.expect_my_payments()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Err(ApiError::Network {
                    reason: "timed out".to_string(),
                })
            });
        api.expect_my_payments()
            .times(1)
            .in_sequence(&mut seq)
            .withf(|pairs| pairs.iter().any(|(k, v)| k == "page" && v == "2"))
            .returning(|_| {
                Ok(json!({
                    "payments": [{ "_id": "pay-9", "amount": 700 }],
                    "pagination": { "currentPage": 2, "totalPages": 2, "total": 15 }
                }))
            });

        let reports = PaymentReports::new(Arc::new(api));
        let mut query = PaymentHistoryQuery::new();
        reports.my_payments(&mut query).await.unwrap();

        assert!(query.go_to_page(2));
        assert!(reports.my_payments(&mut query).await.is_err());
        assert_eq!(query.page(), 1);

        assert!(query.go_to_page(2));
        let page = reports.my_payments(&mut query).await.unwrap();
        assert_eq!(page.items[0].id, "pay-9");
        assert_eq!(query.page(), 2);
    }
}
