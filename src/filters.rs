//! Filter and pagination state for listing and payment-history pages.
//!
//! Edits to the draft form never hit the network. Only `submit`, page
//! changes, limit changes, `clear` and URL re-syncs report that a re-fetch
//! is due, and every filter or limit change sends the user back to page 1.

use serde::{Deserialize, Serialize};

use crate::api::QueryPairs;
use crate::models::{Pagination, PaymentStatus, PaymentType};

pub const DEFAULT_LISTING_LIMIT: u32 = 12;
pub const DEFAULT_HISTORY_LIMIT: u32 = 10;

/// Listing filter form. Values are forwarded verbatim; blank fields are omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyFilters {
    pub property_type: Option<String>,
    pub purpose: Option<String>,
    pub city: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub search: Option<String>,
}

impl PropertyFilters {
    fn pairs(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        [
            ("propertyType", &self.property_type),
            ("purpose", &self.purpose),
            ("city", &self.city),
            ("minPrice", &self.min_price),
            ("maxPrice", &self.max_price),
            ("search", &self.search),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .map(|v| (key, v))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.pairs().next().is_none()
    }
}

/// Filters a listing page receives through its URL when navigated to.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UrlFilters {
    pub property_type: Option<String>,
    pub search: Option<String>,
}

/// Draft and applied listing filters plus the paging the server last reported.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingQuery {
    draft: PropertyFilters,
    applied: PropertyFilters,
    page: u32,
    limit: u32,
    pagination: Pagination,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            draft: PropertyFilters::default(),
            applied: PropertyFilters::default(),
            page: 1,
            limit: DEFAULT_LISTING_LIMIT,
            pagination: Pagination::default(),
        }
    }
}

impl ListingQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// The form being edited. Changes here are not forwarded until `submit`.
    pub fn draft_mut(&mut self) -> &mut PropertyFilters {
        &mut self.draft
    }

    pub fn draft(&self) -> &PropertyFilters {
        &self.draft
    }

    pub fn applied(&self) -> &PropertyFilters {
        &self.applied
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    /// Applies the draft and returns to page 1. Always re-fetches.
    pub fn submit(&mut self) -> bool {
        self.applied = self.draft.clone();
        self.page = 1;
        true
    }

    /// Resets every filter and returns to page 1.
    pub fn clear(&mut self) -> bool {
        self.draft = PropertyFilters::default();
        self.applied = PropertyFilters::default();
        self.page = 1;
        true
    }

    /// Changes the page size; returns to page 1 when it actually changed.
    pub fn set_limit(&mut self, limit: u32) -> bool {
        if limit == 0 || limit == self.limit {
            return false;
        }
        self.limit = limit;
        self.page = 1;
        true
    }

    /// Moves to `page` if it lies within the last reported page range.
    pub fn go_to_page(&mut self, page: u32) -> bool {
        if page == 0 || page > self.pagination.total_pages.max(1) || page == self.page {
            return false;
        }
        self.page = page;
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to_page(self.page.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> bool {
        self.go_to_page(self.page.saturating_sub(1))
    }

    /// Merges filters carried by navigation into both draft and applied state.
    /// Fields the URL does not carry keep their current values.
    pub fn sync_from_url(&mut self, url: &UrlFilters) -> bool {
        if let Some(property_type) = &url.property_type {
            self.draft.property_type = Some(property_type.clone());
        }
        if let Some(search) = &url.search {
            self.draft.search = Some(search.clone());
        }
        self.applied = self.draft.clone();
        self.page = 1;
        true
    }

    /// Records the server's paging. The server's current page wins.
    pub fn apply_pagination(&mut self, pagination: Pagination) {
        self.pagination = pagination;
        self.page = pagination.current_page.max(1);
    }

    /// `page`, `limit`, then every non-blank applied filter.
    pub fn query_pairs(&self) -> QueryPairs {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ];
        pairs.extend(
            self.applied
                .pairs()
                .map(|(key, value)| (key.to_string(), value.to_string())),
        );
        pairs
    }

    pub fn query_string(&self) -> String {
        serde_urlencoded::to_string(self.query_pairs()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct HistoryParams {
    status: Option<PaymentStatus>,
    payment_type: Option<PaymentType>,
    page: u32,
    limit: u32,
}

impl Default for HistoryParams {
    fn default() -> Self {
        Self {
            status: None,
            payment_type: None,
            page: 1,
            limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Filters for the payment history page, plus the ones last loaded successfully.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentHistoryQuery {
    params: HistoryParams,
    loaded: HistoryParams,
    pagination: Pagination,
}

impl PaymentHistoryQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self) -> u32 {
        self.params.page
    }

    pub fn limit(&self) -> u32 {
        self.params.limit
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn set_status(&mut self, status: Option<PaymentStatus>) -> bool {
        if self.params.status == status {
            return false;
        }
        self.params.status = status;
        self.params.page = 1;
        true
    }

    pub fn set_payment_type(&mut self, payment_type: Option<PaymentType>) -> bool {
        if self.params.payment_type == payment_type {
            return false;
        }
        self.params.payment_type = payment_type;
        self.params.page = 1;
        true
    }

    pub fn set_limit(&mut self, limit: u32) -> bool {
        if limit == 0 || limit == self.params.limit {
            return false;
        }
        self.params.limit = limit;
        self.params.page = 1;
        true
    }

    pub fn go_to_page(&mut self, page: u32) -> bool {
        if page == 0 || page > self.pagination.total_pages.max(1) || page == self.params.page {
            return false;
        }
        self.params.page = page;
        true
    }

    /// Records a successful load: the server's paging and the filters that produced it.
    pub fn apply_pagination(&mut self, pagination: Pagination) {
        self.pagination = pagination;
        self.params.page = pagination.current_page.max(1);
        self.loaded = self.params.clone();
    }

    /// Drops changes made since the last successful load.
    pub fn rollback(&mut self) {
        self.params = self.loaded.clone();
    }

    pub fn query_pairs(&self) -> QueryPairs {
        let mut pairs = vec![
            ("page".to_string(), self.params.page.to_string()),
            ("limit".to_string(), self.params.limit.to_string()),
        ];
        if let Some(status) = &self.params.status {
            pairs.push(("status".to_string(), status.to_string()));
        }
        if let Some(payment_type) = &self.params.payment_type {
            pairs.push(("paymentType".to_string(), payment_type.to_string()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value<'a>(pairs: &'a QueryPairs, key: &str) -> Option<&'a str> {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn paged(query: &mut ListingQuery, current_page: u32, total_pages: u32) {
        query.apply_pagination(Pagination {
            current_page,
            total_pages,
            total: u64::from(total_pages) * 12,
        });
    }

    #[test]
    fn submit_resets_page_and_forwards_filters_verbatim() {
        let mut query = ListingQuery::new();
        paged(&mut query, 3, 5);
        assert_eq!(query.page(), 3);

        query.draft_mut().property_type = Some("Home".to_string());
        query.draft_mut().min_price = Some("100000".to_string());
        assert!(query.submit());

        let pairs = query.query_pairs();
        assert_eq!(query.page(), 1);
        assert_eq!(value(&pairs, "page"), Some("1"));
        assert_eq!(value(&pairs, "propertyType"), Some("Home"));
        assert_eq!(value(&pairs, "minPrice"), Some("100000"));
        assert_eq!(value(&pairs, "maxPrice"), None);
    }

    #[test]
    fn draft_edits_are_not_forwarded_until_submit() {
        let mut query = ListingQuery::new();
        query.draft_mut().city = Some("Adama".to_string());
        assert_eq!(value(&query.query_pairs(), "city"), None);
        query.submit();
        assert_eq!(value(&query.query_pairs(), "city"), Some("Adama"));
    }

    #[test]
    fn blank_fields_are_omitted() {
        let mut query = ListingQuery::new();
        query.draft_mut().search = Some("   ".to_string());
        query.draft_mut().purpose = Some(String::new());
        query.submit();
        assert!(query.applied().is_empty());
        assert_eq!(query.query_pairs().len(), 2);
    }

    #[test]
    fn clear_resets_everything_to_page_one() {
        let mut query = ListingQuery::new();
        query.draft_mut().city = Some("Hawassa".to_string());
        query.submit();
        paged(&mut query, 2, 4);

        assert!(query.clear());
        assert_eq!(query.page(), 1);
        assert!(query.applied().is_empty());
        assert!(query.draft().is_empty());
    }

    #[test]
    fn changing_limit_resets_page() {
        let mut query = ListingQuery::new();
        paged(&mut query, 4, 6);
        assert!(query.set_limit(24));
        assert_eq!(query.page(), 1);
        assert_eq!(value(&query.query_pairs(), "limit"), Some("24"));

        assert!(!query.set_limit(24));
        assert!(!query.set_limit(0));
    }

    #[test]
    fn page_changes_stay_in_range() {
        let mut query = ListingQuery::new();
        paged(&mut query, 1, 3);

        assert!(!query.go_to_page(0));
        assert!(!query.go_to_page(4));
        assert!(!query.go_to_page(1));
        assert!(query.go_to_page(3));
        assert!(!query.next_page());
        assert!(query.previous_page());
        assert_eq!(query.page(), 2);
    }

    #[test]
    fn url_filters_merge_into_existing_state() {
        let mut query = ListingQuery::new();
        query.draft_mut().city = Some("Addis Ababa".to_string());
        query.submit();
        paged(&mut query, 2, 3);

        assert!(query.sync_from_url(&UrlFilters {
            property_type: Some("Car".to_string()),
            search: None,
        }));

        let pairs = query.query_pairs();
        assert_eq!(query.page(), 1);
        assert_eq!(value(&pairs, "propertyType"), Some("Car"));
        assert_eq!(value(&pairs, "city"), Some("Addis Ababa"));
        assert_eq!(query.draft().property_type.as_deref(), Some("Car"));
    }

    #[test]
    fn query_string_is_url_encoded() {
        let mut query = ListingQuery::new();
        query.draft_mut().search = Some("3 bedroom & garden".to_string());
        query.submit();
        assert_eq!(
            query.query_string(),
            "page=1&limit=12&search=3+bedroom+%26+garden"
        );
    }

    #[test]
    fn history_filters_reset_page() {
        let mut query = PaymentHistoryQuery::new();
        query.apply_pagination(Pagination {
            current_page: 2,
            total_pages: 5,
            total: 50,
        });
        assert_eq!(query.page(), 2);

        assert!(query.set_status(Some(PaymentStatus::Completed)));
        assert_eq!(query.page(), 1);
        assert!(!query.set_status(Some(PaymentStatus::Completed)));

        assert!(query.go_to_page(3));
        assert!(query.set_payment_type(Some(PaymentType::BookingFee)));
        assert_eq!(query.page(), 1);

        let pairs = query.query_pairs();
        assert_eq!(value(&pairs, "status"), Some("Completed"));
        assert_eq!(value(&pairs, "paymentType"), Some("booking_fee"));
        assert_eq!(value(&pairs, "limit"), Some("10"));
    }

    #[test]
    fn history_rollback_restores_last_loaded_filters() {
        let mut query = PaymentHistoryQuery::new();
        query.apply_pagination(Pagination {
            current_page: 1,
            total_pages: 3,
            total: 25,
        });

        assert!(query.go_to_page(2));
        assert!(query.set_limit(20));
        query.rollback();
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), DEFAULT_HISTORY_LIMIT);

        assert!(query.go_to_page(2));
    }
}
