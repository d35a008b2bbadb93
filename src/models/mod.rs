pub mod payment;
pub mod property;
pub mod user;

pub use payment::{ClientPaymentSummary, OwnerEarnings, Payment, PaymentStatus, PaymentType};
pub use property::{
    CarDetails, HomeDetails, OrderInfo, PaymentInfo, Property, PropertyRef, PropertyStatus,
    PropertyType, Purpose,
};
pub use user::{Role, User, UserRef};

use serde::{Deserialize, Deserializer, Serialize};

/// Reads an explicit `null` the same way as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Pagination metadata returned alongside list endpoints
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            total: 0,
        }
    }
}

/// A decoded list response: the records plus whatever paging the server reported.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
    /// True when the payload matched no known envelope and no array was found in it.
    pub malformed: bool,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            pagination: Pagination::default(),
            malformed: false,
        }
    }
}
