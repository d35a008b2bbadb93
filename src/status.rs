//! One classifier for every page that shows a listing's status and buttons.

use serde::Serialize;

use crate::models::{PaymentStatus, Property, PropertyStatus, Role, User};

/// Who is looking at the listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: String,
    pub role: Role,
}

impl From<&User> for Viewer {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            role: user.role,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyState {
    Available,
    OrderedPending { payment_id: Option<String> },
    OrderedCompleted,
    /// Ordered, and the last payment attempt ended without completing
    /// (cancelled, failed or expired). The buyer may retry.
    OrderedCancelled { payment_status: PaymentStatus },
    SoldOrRented(PropertyStatus),
    Other(PropertyStatus),
}

impl PropertyState {
    pub fn of(property: &Property) -> Self {
        match &property.status {
            PropertyStatus::Ordered => match effective_payment_status(property) {
                Some(PaymentStatus::Completed) => PropertyState::OrderedCompleted,
                None | Some(PaymentStatus::Pending) => PropertyState::OrderedPending {
                    payment_id: property
                        .payment_info
                        .as_ref()
                        .and_then(|info| info.resolved_id())
                        .map(str::to_string),
                },
                Some(PaymentStatus::Other(other)) if other.trim().is_empty() => {
                    PropertyState::OrderedPending { payment_id: None }
                }
                Some(other) => PropertyState::OrderedCancelled {
                    payment_status: other.clone(),
                },
            },
            PropertyStatus::Available => PropertyState::Available,
            status @ (PropertyStatus::Sold | PropertyStatus::Rented) => {
                PropertyState::SoldOrRented(status.clone())
            }
            status => PropertyState::Other(status.clone()),
        }
    }

    pub fn label(&self) -> String {
        match self {
            PropertyState::Available => "available".to_string(),
            PropertyState::OrderedPending { .. } => "payment pending".to_string(),
            PropertyState::OrderedCompleted => "payment completed".to_string(),
            PropertyState::OrderedCancelled { payment_status } => {
                format!("payment {}", payment_status.to_string().to_lowercase())
            }
            PropertyState::SoldOrRented(status) | PropertyState::Other(status) => {
                status.to_string().to_lowercase()
            }
        }
    }
}

/// Buttons a listing card may enable
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Affordances {
    pub can_order: bool,
    pub can_complete_payment: bool,
    pub can_cancel_payment: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub state: PropertyState,
    pub label: String,
    pub affordances: Affordances,
}

/// `paymentInfo` wins over `orderInfo`, which wins over the flat field.
pub fn effective_payment_status(property: &Property) -> Option<&PaymentStatus> {
    property
        .payment_info
        .as_ref()
        .and_then(|info| info.payment_status.as_ref())
        .or_else(|| {
            property
                .order_info
                .as_ref()
                .and_then(|info| info.payment_status.as_ref())
        })
        .or(property.payment_status.as_ref())
}

/// A viewer may order unless they own the listing or hold a staff role.
/// Anonymous viewers may order; the dispatcher sends them to log in.
pub fn may_order(property: &Property, viewer: Option<&Viewer>) -> bool {
    match viewer {
        None => true,
        Some(viewer) => !viewer.role.is_staff() && property.owner_id() != Some(viewer.user_id.as_str()),
    }
}

pub fn classify(property: &Property, viewer: Option<&Viewer>) -> Classification {
    let state = PropertyState::of(property);

    let affordances = match &state {
        PropertyState::Available => Affordances {
            can_order: may_order(property, viewer),
            ..Affordances::default()
        },
        PropertyState::OrderedPending { payment_id } => Affordances {
            can_complete_payment: true,
            can_cancel_payment: payment_id.is_some(),
            ..Affordances::default()
        },
        PropertyState::OrderedCancelled { .. } => Affordances {
            can_complete_payment: true,
            ..Affordances::default()
        },
        PropertyState::OrderedCompleted
        | PropertyState::SoldOrRented(_)
        | PropertyState::Other(_) => Affordances::default(),
    };

    Classification {
        label: state.label(),
        state,
        affordances,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OrderInfo, PaymentInfo};
    use serde_json::json;

    fn property(status: &str) -> Property {
        serde_json::from_value(json!({
            "_id": "p1",
            "title": "Listing",
            "status": status,
            "owner": "owner-1"
        }))
        .unwrap()
    }

    fn client(id: &str) -> Viewer {
        Viewer {
            user_id: id.to_string(),
            role: Role::Client,
        }
    }

    #[test]
    fn ordered_with_completed_payment_info() {
        let mut p = property("Ordered");
        p.payment_info = Some(PaymentInfo {
            payment_status: Some(PaymentStatus::Completed),
            ..PaymentInfo::default()
        });

        let c = classify(&p, Some(&client("buyer")));
        assert_eq!(c.state, PropertyState::OrderedCompleted);
        assert_eq!(c.label, "payment completed");
        assert_eq!(c.affordances, Affordances::default());
    }

    #[test]
    fn ordered_with_pending_order_info_only() {
        let mut p = property("Ordered");
        p.order_info = Some(OrderInfo {
            payment_status: Some(PaymentStatus::Pending),
            ..OrderInfo::default()
        });

        let c = classify(&p, Some(&client("buyer")));
        assert_eq!(c.label, "payment pending");
        assert!(c.affordances.can_complete_payment);
        // No payment id to cancel with.
        assert!(!c.affordances.can_cancel_payment);
        assert!(!c.affordances.can_order);
    }

    #[test]
    fn pending_payment_with_id_can_be_cancelled() {
        let mut p = property("Ordered");
        p.payment_info = Some(PaymentInfo {
            id: Some("pay-1".to_string()),
            payment_status: Some(PaymentStatus::Pending),
            ..PaymentInfo::default()
        });

        let c = classify(&p, None);
        assert_eq!(
            c.state,
            PropertyState::OrderedPending {
                payment_id: Some("pay-1".to_string())
            }
        );
        assert!(c.affordances.can_complete_payment);
        assert!(c.affordances.can_cancel_payment);
    }

    #[test]
    fn ordered_without_any_payment_status_is_pending() {
        let c = classify(&property("Ordered"), None);
        assert_eq!(c.label, "payment pending");
        assert!(c.affordances.can_complete_payment);
    }

    #[test]
    fn cancelled_payment_can_be_retried_not_cancelled() {
        let mut p = property("Ordered");
        p.payment_status = Some(PaymentStatus::Cancelled);

        let c = classify(&p, None);
        assert_eq!(c.label, "payment cancelled");
        assert!(c.affordances.can_complete_payment);
        assert!(!c.affordances.can_cancel_payment);
    }

    #[test]
    fn payment_info_beats_order_info_beats_flat_field() {
        let mut p = property("Ordered");
        p.payment_status = Some(PaymentStatus::Completed);
        p.order_info = Some(OrderInfo {
            payment_status: Some(PaymentStatus::Cancelled),
            ..OrderInfo::default()
        });
        assert_eq!(classify(&p, None).label, "payment cancelled");

        p.payment_info = Some(PaymentInfo {
            payment_status: Some(PaymentStatus::Pending),
            ..PaymentInfo::default()
        });
        assert_eq!(classify(&p, None).label, "payment pending");
    }

    #[test]
    fn expired_payment_behaves_like_cancelled() {
        let mut p = property("Ordered");
        p.payment_status = Some(PaymentStatus::Expired);
        let c = classify(&p, None);
        assert_eq!(c.label, "payment expired");
        assert!(c.affordances.can_complete_payment);
        assert!(!c.affordances.can_cancel_payment);
    }

    #[test]
    fn available_listing_for_a_client() {
        let c = classify(&property("Available"), Some(&client("buyer")));
        assert_eq!(c.label, "available");
        assert!(c.affordances.can_order);
    }

    #[test]
    fn owner_never_orders_own_listing() {
        for status in ["Available", "Ordered", "Sold", "Pending"] {
            let c = classify(&property(status), Some(&client("owner-1")));
            assert!(!c.affordances.can_order, "status {}", status);
        }
    }

    #[test]
    fn staff_cannot_order() {
        for role in [Role::Admin, Role::Broker] {
            let viewer = Viewer {
                user_id: "staff".to_string(),
                role,
            };
            assert!(!classify(&property("Available"), Some(&viewer)).affordances.can_order);
        }
    }

    #[test]
    fn terminal_and_other_statuses_have_no_actions() {
        for (status, label) in [("Sold", "sold"), ("Rented", "rented"), ("Pending", "pending"), ("Archived", "archived")] {
            let c = classify(&property(status), Some(&client("buyer")));
            assert_eq!(c.label, label);
            assert_eq!(c.affordances, Affordances::default());
        }
        assert!(matches!(
            PropertyState::of(&property("Sold")),
            PropertyState::SoldOrRented(PropertyStatus::Sold)
        ));
    }
}
