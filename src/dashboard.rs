//! Client/owner dashboard: three tabs of listings, each re-fetched on demand.
//!
//! Every load takes a generation number for its tab. When a response comes
//! back after a newer load for the same tab was issued, it is dropped, so a
//! slow request can never overwrite fresher data.

use std::collections::HashMap;
use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::api::{decode_page, ApiError, MarketplaceApi};
use crate::models::{OrderInfo, PaymentInfo, PaymentStatus, Property};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DashboardTab {
    #[default]
    MyProperties,
    Orders,
    PendingPayments,
}

impl DashboardTab {
    fn index(self) -> usize {
        match self {
            DashboardTab::MyProperties => 0,
            DashboardTab::Orders => 1,
            DashboardTab::PendingPayments => 2,
        }
    }
}

impl Display for DashboardTab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tab = match self {
            DashboardTab::MyProperties => "my-properties",
            DashboardTab::Orders => "orders",
            DashboardTab::PendingPayments => "pending-payments",
        };
        write!(f, "{}", tab)
    }
}

/// What happened to a tab load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The response was stored; carries the record count.
    Applied(usize),
    /// A newer load for the same tab was issued meanwhile; the response was dropped.
    Stale,
}

#[derive(Debug, Default)]
struct DashboardState {
    active: DashboardTab,
    lists: HashMap<DashboardTab, Vec<Property>>,
}

pub struct Dashboard<A>
where
    A: MarketplaceApi + 'static,
{
    api: Arc<A>,
    state: RwLock<DashboardState>,
    generations: [AtomicU64; 3],
}

impl<A> Dashboard<A>
where
    A: MarketplaceApi + 'static,
{
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            state: RwLock::new(DashboardState::default()),
            generations: Default::default(),
        }
    }

    pub async fn active_tab(&self) -> DashboardTab {
        self.state.read().await.active
    }

    /// Snapshot of the locally held list for `tab`.
    pub async fn properties(&self, tab: DashboardTab) -> Vec<Property> {
        self.state
            .read()
            .await
            .lists
            .get(&tab)
            .cloned()
            .unwrap_or_default()
    }

    /// Switches tabs and loads the new tab.
    pub async fn select_tab(&self, tab: DashboardTab) -> Result<LoadOutcome, ApiError> {
        self.state.write().await.active = tab;
        self.load(tab).await
    }

    pub async fn load(&self, tab: DashboardTab) -> Result<LoadOutcome, ApiError> {
        let generation = self.generations[tab.index()].fetch_add(1, Ordering::SeqCst) + 1;
        debug!(%tab, generation, "dashboard: loading tab");

        let payload = self.fetch(tab).await.map_err(|err| {
            warn!(%tab, error = %err, "dashboard: failed to load tab");
            err
        })?;
        let page = decode_page::<Property>(payload, 1);

        let mut state = self.state.write().await;
        if self.generations[tab.index()].load(Ordering::SeqCst) != generation {
            debug!(%tab, generation, "dashboard: dropping stale response");
            return Ok(LoadOutcome::Stale);
        }

        let count = page.items.len();
        state.lists.insert(tab, page.items);
        info!(%tab, count, "dashboard: tab loaded");
        Ok(LoadOutcome::Applied(count))
    }

    /// Re-fetches every tab. The first failure is returned after all loads finish.
    pub async fn refresh_all(&self) -> Result<(), ApiError> {
        let (mine, orders, pending) = tokio::join!(
            self.load(DashboardTab::MyProperties),
            self.load(DashboardTab::Orders),
            self.load(DashboardTab::PendingPayments),
        );
        mine?;
        orders?;
        pending?;
        Ok(())
    }

    async fn fetch(&self, tab: DashboardTab) -> Result<Value, ApiError> {
        match tab {
            DashboardTab::MyProperties => self.api.my_properties().await,
            DashboardTab::Orders => self.api.ordered_properties().await,
            DashboardTab::PendingPayments => self.api.pending_payments().await,
        }
    }

    /// Reflects a cancelled payment in the active tab without waiting for a re-fetch.
    ///
    /// On the pending-payments tab the entry is dropped; elsewhere its payment
    /// status becomes `Cancelled`. Returns whether an entry matched.
    pub async fn mark_payment_cancelled(&self, property_id: &str, payment_id: &str) -> bool {
        let mut state = self.state.write().await;
        let active = state.active;
        let Some(list) = state.lists.get_mut(&active) else {
            return false;
        };

        let is_target = |property: &Property| {
            property.id == property_id
                || property
                    .payment_info
                    .as_ref()
                    .and_then(PaymentInfo::resolved_id)
                    == Some(payment_id)
        };

        if active == DashboardTab::PendingPayments {
            let before = list.len();
            list.retain(|property| !is_target(property));
            return list.len() != before;
        }

        let mut patched = false;
        for property in list.iter_mut() {
            if is_target(&*property) {
                mark_cancelled(property);
                patched = true;
            }
        }
        debug!(%active, property_id, payment_id, patched, "dashboard: optimistic cancel");
        patched
    }
}

fn mark_cancelled(property: &mut Property) {
    let cancelled = Some(PaymentStatus::Cancelled);
    let mut touched = false;

    if let Some(info) = property.payment_info.as_mut() {
        info.payment_status = cancelled.clone();
        touched = true;
    }
    if let Some(info) = property.order_info.as_mut() {
        info.payment_status = cancelled.clone();
        touched = true;
    }
    if property.payment_status.is_some() || !touched {
        property.payment_status = cancelled.clone();
    }
    if !touched {
        property.order_info = Some(OrderInfo {
            payment_status: cancelled,
            ..OrderInfo::default()
        });
    }
}
