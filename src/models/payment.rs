use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::property::PropertyRef;

/// Payment lifecycle status. Unknown strings decode into `Other`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Cancelled,
    Expired,
    Other(String),
}

impl From<String> for PaymentStatus {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "pending" => PaymentStatus::Pending,
            "completed" => PaymentStatus::Completed,
            "failed" => PaymentStatus::Failed,
            "cancelled" | "canceled" => PaymentStatus::Cancelled,
            "expired" => PaymentStatus::Expired,
            _ => PaymentStatus::Other(value),
        }
    }
}

impl From<PaymentStatus> for String {
    fn from(status: PaymentStatus) -> Self {
        status.to_string()
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Completed => "Completed",
            PaymentStatus::Failed => "Failed",
            PaymentStatus::Cancelled => "Cancelled",
            PaymentStatus::Expired => "Expired",
            PaymentStatus::Other(other) => other,
        };
        write!(f, "{}", status)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    #[default]
    FullPayment,
    BookingFee,
    BrokerCommission,
}

impl Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let payment_type = match self {
            PaymentType::FullPayment => "full_payment",
            PaymentType::BookingFee => "booking_fee",
            PaymentType::BrokerCommission => "broker_commission",
        };
        write!(f, "{}", payment_type)
    }
}

/// Payment history record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub amount: f64,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub payment_type: PaymentType,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub payment_status: PaymentStatus,
    pub chapa_reference: Option<String>,
    pub property: Option<PropertyRef>,
    pub commission_amount: Option<f64>,
    pub commission_rate: Option<f64>,
    pub owner_amount: Option<f64>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Totals shown on a client's payment dashboard
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientPaymentSummary {
    pub total_paid: f64,
    pub pending_amount: f64,
    pub completed_count: u64,
    pub pending_count: u64,
    pub cancelled_count: u64,
}

/// Totals shown on an owner's earnings page
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct OwnerEarnings {
    pub total_earnings: f64,
    pub total_commission: f64,
    pub pending_earnings: f64,
    pub completed_sales: u64,
    pub recent_payments: Vec<Payment>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_amount_and_status_fall_back_to_defaults() {
        let payment: Payment = serde_json::from_value(json!({
            "_id": "pay-3",
            "amount": null,
            "paymentType": null,
            "paymentStatus": null,
            "property": { "_id": "p1", "title": null }
        }))
        .unwrap();
        assert_eq!(payment.amount, 0.0);
        assert_eq!(payment.payment_type, PaymentType::FullPayment);
        assert_eq!(payment.payment_status, PaymentStatus::Pending);
        assert_eq!(payment.property.as_ref().map(|p| p.id()), Some("p1"));
    }

    #[test]
    fn decodes_history_record() {
        let payment: Payment = serde_json::from_value(json!({
            "_id": "pay-1",
            "amount": 150000.0,
            "paymentType": "booking_fee",
            "paymentStatus": "Completed",
            "chapaReference": "chapa-123",
            "property": { "_id": "p1", "title": "Bole apartment" },
            "commissionAmount": 3000.0,
            "commissionRate": 2.0,
            "createdAt": "2024-05-02T08:30:00Z"
        }))
        .unwrap();

        assert_eq!(payment.payment_type, PaymentType::BookingFee);
        assert_eq!(payment.payment_status, PaymentStatus::Completed);
        assert_eq!(payment.property.as_ref().map(|p| p.id()), Some("p1"));
        assert_eq!(payment.commission_amount, Some(3000.0));
    }

    #[test]
    fn status_parsing_is_case_insensitive() {
        assert_eq!(PaymentStatus::from("cancelled".to_string()), PaymentStatus::Cancelled);
        assert_eq!(PaymentStatus::from("Canceled".to_string()), PaymentStatus::Cancelled);
        assert_eq!(
            PaymentStatus::from("refunded".to_string()),
            PaymentStatus::Other("refunded".to_string())
        );
    }

    #[test]
    fn payment_type_wire_names() {
        assert_eq!(PaymentType::FullPayment.to_string(), "full_payment");
        assert_eq!(
            serde_json::to_value(PaymentType::BrokerCommission).unwrap(),
            json!("broker_commission")
        );
    }

    #[test]
    fn summary_tolerates_missing_fields() {
        let summary: ClientPaymentSummary =
            serde_json::from_value(json!({ "totalPaid": 5000 })).unwrap();
        assert_eq!(summary.total_paid, 5000.0);
        assert_eq!(summary.pending_count, 0);
    }
}
