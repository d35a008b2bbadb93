use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::payment::PaymentStatus;
use super::user::UserRef;

/// Kind of item being listed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PropertyType {
    Home,
    Car,
    Electronics,
}

impl Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let property_type = match self {
            PropertyType::Home => "Home",
            PropertyType::Car => "Car",
            PropertyType::Electronics => "Electronics",
        };
        write!(f, "{}", property_type)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Purpose {
    Sell,
    Rent,
}

impl Display for Purpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let purpose = match self {
            Purpose::Sell => "Sell",
            Purpose::Rent => "Rent",
        };
        write!(f, "{}", purpose)
    }
}

/// Listing lifecycle status as reported by the server.
///
/// Strings the client does not know decode into `Other` so a new backend
/// status never breaks a whole listing page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum PropertyStatus {
    #[default]
    Available,
    Pending,
    Ordered,
    Sold,
    Rented,
    Other(String),
}

impl From<String> for PropertyStatus {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "available" => PropertyStatus::Available,
            "pending" => PropertyStatus::Pending,
            "ordered" => PropertyStatus::Ordered,
            "sold" => PropertyStatus::Sold,
            "rented" => PropertyStatus::Rented,
            _ => PropertyStatus::Other(value),
        }
    }
}

impl From<PropertyStatus> for String {
    fn from(status: PropertyStatus) -> Self {
        status.to_string()
    }
}

impl Display for PropertyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            PropertyStatus::Available => "Available",
            PropertyStatus::Pending => "Pending",
            PropertyStatus::Ordered => "Ordered",
            PropertyStatus::Sold => "Sold",
            PropertyStatus::Rented => "Rented",
            PropertyStatus::Other(other) => other,
        };
        write!(f, "{}", status)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HomeDetails {
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub area: Option<f64>,
    pub floors: Option<u32>,
    pub year_built: Option<i32>,
    pub furnished: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CarDetails {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub mileage: Option<f64>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
}

/// Order bookkeeping embedded in an ordered listing
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderInfo {
    pub order_date: Option<DateTime<Utc>>,
    pub payment_status: Option<PaymentStatus>,
    pub ordered_by: Option<UserRef>,
}

/// Payment bookkeeping embedded in an ordered listing
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    pub payment_id: Option<String>,
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_url: Option<String>,
    pub payment_date: Option<DateTime<Utc>>,
    pub amount: Option<f64>,
    pub due_date: Option<DateTime<Utc>>,
}

impl PaymentInfo {
    /// The id to cancel or retry with; `paymentId` wins over the embedded `_id`.
    pub fn resolved_id(&self) -> Option<&str> {
        self.payment_id
            .as_deref()
            .or(self.id.as_deref())
            .filter(|id| !id.is_empty())
    }
}

/// Core listing model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub description: String,
    pub property_type: Option<PropertyType>,
    pub purpose: Option<Purpose>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub price: f64,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub city: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub status: PropertyStatus,
    pub home_details: Option<HomeDetails>,
    pub car_details: Option<CarDetails>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub images: Vec<String>,
    pub owner: Option<UserRef>,
    pub order_info: Option<OrderInfo>,
    pub payment_info: Option<PaymentInfo>,
    pub payment_status: Option<PaymentStatus>,
}

impl Property {
    pub fn owner_id(&self) -> Option<&str> {
        self.owner.as_ref().map(UserRef::id)
    }

    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// A property reference inside payment records: an id or a denormalized summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PropertyRef {
    Id(String),
    Summary {
        #[serde(rename = "_id")]
        id: String,
        #[serde(default, deserialize_with = "super::null_as_default")]
        title: String,
        #[serde(default, deserialize_with = "super::null_as_default")]
        price: f64,
        #[serde(default, deserialize_with = "super::null_as_default")]
        city: String,
    },
}

impl PropertyRef {
    pub fn id(&self) -> &str {
        match self {
            PropertyRef::Id(id) => id,
            PropertyRef::Summary { id, .. } => id,
        }
    }
}
