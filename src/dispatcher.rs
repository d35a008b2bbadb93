//! Order, payment and cancellation actions.
//!
//! Each action is guarded per id: while a request for a property (or a
//! payment) is outstanding, a second submission for the same id is refused
//! without touching the network. Other ids stay usable.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::api::envelope::unwrap_data;
use crate::api::{ApiError, MarketplaceApi};
use crate::config::ClientConfig;
use crate::dashboard::Dashboard;
use crate::models::{PaymentType, User};
use crate::status::Viewer;

pub const CANCEL_PAYMENT_PROMPT: &str = "Are you sure you want to cancel this payment?";
const INITIALIZE_FAILED_MESSAGE: &str = "Failed to initialize payment";

/// Sends the user somewhere else: the login page or an external checkout.
#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send + Sync {
    fn navigate(&self, url: &str);
}

/// Asks the user a yes/no question and blocks until they answer.
#[cfg_attr(test, mockall::automock)]
pub trait Confirmer: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// A logged-in user and the token their requests carry.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: User,
}

impl Session {
    pub fn viewer(&self) -> Viewer {
        Viewer::from(&self.user)
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Please log in to continue")]
    Unauthenticated { login_url: String },

    #[error("A request for {0} is already in progress")]
    AlreadyInFlight(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl DispatchError {
    pub fn user_message(&self) -> String {
        match self {
            DispatchError::Api(err) => err.user_message(),
            other => other.to_string(),
        }
    }

    /// Where the user was sent instead of being shown a message, if anywhere.
    pub fn redirect(&self) -> Option<&str> {
        match self {
            DispatchError::Unauthenticated { login_url } => Some(login_url),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// Cancelled on the server; `refreshed` says whether the follow-up re-fetch succeeded.
    Cancelled { refreshed: bool },
    /// The user said no at the prompt.
    Declined,
}

/// Set of ids with an outstanding request
#[derive(Debug, Default)]
pub struct InFlight {
    ids: Mutex<HashSet<String>>,
}

impl InFlight {
    pub fn try_acquire(&self, id: &str) -> Option<InFlightGuard<'_>> {
        let mut ids = self.ids.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if ids.insert(id.to_string()) {
            Some(InFlightGuard {
                set: self,
                id: id.to_string(),
            })
        } else {
            None
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains(id)
    }
}

/// Releases its id when dropped.
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    set: &'a InFlight,
    id: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set
            .ids
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&self.id);
    }
}

pub struct ActionDispatcher<A, N, C>
where
    A: MarketplaceApi + 'static,
    N: Navigator,
    C: Confirmer,
{
    api: Arc<A>,
    navigator: N,
    confirmer: C,
    session: Option<Session>,
    login_url: String,
    processing_payments: InFlight,
    cancelling_payments: InFlight,
}

impl<A, N, C> ActionDispatcher<A, N, C>
where
    A: MarketplaceApi + 'static,
    N: Navigator,
    C: Confirmer,
{
    pub fn new(api: Arc<A>, navigator: N, confirmer: C, login_url: impl Into<String>) -> Self {
        Self {
            api,
            navigator,
            confirmer,
            session: None,
            login_url: login_url.into(),
            processing_payments: InFlight::default(),
            cancelling_payments: InFlight::default(),
        }
    }

    /// Uses the login page configured for the client.
    pub fn from_config(api: Arc<A>, navigator: N, confirmer: C, config: &ClientConfig) -> Self {
        Self::new(api, navigator, confirmer, config.login_path.clone())
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    pub fn viewer(&self) -> Option<Viewer> {
        self.session.as_ref().map(Session::viewer)
    }

    pub fn is_processing(&self, property_id: &str) -> bool {
        self.processing_payments.contains(property_id)
    }

    pub fn is_cancelling(&self, payment_id: &str) -> bool {
        self.cancelling_payments.contains(payment_id)
    }

    /// Orders a listing and sends the buyer to checkout. Returns the checkout URL.
    pub async fn order(&self, property_id: &str) -> Result<String, DispatchError> {
        if self.session.is_none() {
            info!(property_id, "order: no session, redirecting to login");
            return Err(self.redirect_to_login());
        }

        let _guard = self
            .processing_payments
            .try_acquire(property_id)
            .ok_or_else(|| self.already_in_flight(property_id))?;

        info!(property_id, "order: placing order");
        self.api.order_property(property_id).await.map_err(|err| {
            error!(property_id, error = %err, "order: failed to place order");
            err
        })?;

        self.start_payment(property_id, PaymentType::FullPayment).await
    }

    /// Starts (or retries) a payment and sends the buyer to checkout.
    pub async fn initiate_payment(
        &self,
        property_id: &str,
        payment_type: PaymentType,
    ) -> Result<String, DispatchError> {
        let _guard = self
            .processing_payments
            .try_acquire(property_id)
            .ok_or_else(|| self.already_in_flight(property_id))?;

        self.start_payment(property_id, payment_type).await
    }

    async fn start_payment(
        &self,
        property_id: &str,
        payment_type: PaymentType,
    ) -> Result<String, DispatchError> {
        info!(property_id, %payment_type, "payment: initializing");
        let payload = match self.api.initialize_payment(property_id, payment_type).await {
            Ok(payload) => payload,
            Err(err) if err.is_unauthorized() => {
                warn!(property_id, "payment: session rejected, redirecting to login");
                return Err(self.redirect_to_login());
            }
            Err(err) => {
                error!(property_id, error = %err, "payment: failed to initialize");
                return Err(err.into());
            }
        };

        let url = payment_url(payload)?;
        info!(property_id, %url, "payment: redirecting to checkout");
        self.navigator.navigate(&url);
        Ok(url)
    }

    /// Cancels a pending payment after the user confirms.
    ///
    /// On success the dashboard's active tab is patched right away, then the
    /// whole dashboard is re-fetched. On failure the active tab is re-fetched
    /// so the local view matches the server again.
    pub async fn cancel_payment(
        &self,
        dashboard: &Dashboard<A>,
        payment_id: &str,
        property_id: &str,
    ) -> Result<CancelOutcome, DispatchError> {
        if self.is_cancelling(payment_id) {
            return Err(self.already_in_flight(payment_id));
        }
        if !self.confirmer.confirm(CANCEL_PAYMENT_PROMPT) {
            info!(payment_id, "cancel: declined by user");
            return Ok(CancelOutcome::Declined);
        }

        let _guard = self
            .cancelling_payments
            .try_acquire(payment_id)
            .ok_or_else(|| self.already_in_flight(payment_id))?;

        info!(payment_id, property_id, "cancel: cancelling payment");
        if let Err(err) = self.api.cancel_payment(payment_id).await {
            error!(payment_id, error = %err, "cancel: server refused");
            let active = dashboard.active_tab().await;
            if let Err(reload_err) = dashboard.load(active).await {
                warn!(error = %reload_err, "cancel: re-fetch after failure also failed");
            }
            return Err(err.into());
        }

        dashboard.mark_payment_cancelled(property_id, payment_id).await;

        let refreshed = match dashboard.refresh_all().await {
            Ok(()) => true,
            Err(err) => {
                warn!(payment_id, error = %err, "cancel: dashboard re-fetch failed");
                false
            }
        };
        Ok(CancelOutcome::Cancelled { refreshed })
    }

    fn redirect_to_login(&self) -> DispatchError {
        self.navigator.navigate(&self.login_url);
        DispatchError::Unauthenticated {
            login_url: self.login_url.clone(),
        }
    }

    fn already_in_flight(&self, id: &str) -> DispatchError {
        warn!(id, "duplicate submission ignored");
        DispatchError::AlreadyInFlight(id.to_string())
    }
}

/// Pulls the checkout URL out of an initialize response.
fn payment_url(payload: Value) -> Result<String, ApiError> {
    let body = unwrap_data(payload);
    let url = ["paymentUrl", "checkoutUrl", "checkout_url"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .filter(|url| !url.trim().is_empty());

    match url {
        Some(url) => Ok(url.to_string()),
        None => {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or(INITIALIZE_FAILED_MESSAGE)
                .to_string();
            Err(ApiError::Server {
                status: 200,
                message,
            })
        }
    }
}
