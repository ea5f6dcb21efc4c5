//! Order permissions.

use serde::{Deserialize, Serialize};

use super::{Grants, Role};

/// Order lifecycle status as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    AwaitingPayment,
    PaymentConfirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 8] = [
        OrderStatus::Pending,
        OrderStatus::AwaitingPayment,
        OrderStatus::PaymentConfirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
        OrderStatus::Refunded,
    ];

    /// No further transitions happen from a terminal status.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered | OrderStatus::Cancelled | OrderStatus::Refunded
        )
    }

    /// Whether staff may still cancel: nothing has left the warehouse yet.
    fn is_cancellable_by_staff(self) -> bool {
        !matches!(
            self,
            OrderStatus::Shipped | OrderStatus::Delivered | OrderStatus::Cancelled
        )
    }
}

/// What the current user may do with one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderPermissions {
    pub can_view: bool,
    pub can_update_status: bool,
    pub can_cancel: bool,
    pub can_confirm_payment: bool,
    pub can_assign_sales_rep: bool,
    pub can_archive: bool,
    pub can_delete: bool,
}

impl OrderPermissions {
    /// `is_owner` is true when the order belongs to the current user.
    pub fn derive(role: Option<Role>, is_owner: bool, status: OrderStatus) -> Self {
        let role = Role::or_lowest(role);
        Self {
            can_view: is_owner || role.at_least(Role::FulfillmentCoordinator),
            can_update_status: role.at_least(Role::FulfillmentCoordinator),
            can_cancel: (is_owner && status == OrderStatus::Pending)
                || (role.at_least(Role::SalesRep) && status.is_cancellable_by_staff()),
            can_confirm_payment: (is_owner || role.at_least(Role::SalesRep))
                && status == OrderStatus::AwaitingPayment,
            can_assign_sales_rep: role.at_least(Role::SalesManager),
            can_archive: role.at_least(Role::SalesManager) && status.is_terminal(),
            can_delete: role.at_least(Role::Admin),
        }
    }
}

impl Grants for OrderPermissions {
    fn entries(&self) -> Vec<(&'static str, bool)> {
        vec![
            ("view", self.can_view),
            ("update_status", self.can_update_status),
            ("cancel", self.can_cancel),
            ("confirm_payment", self.can_confirm_payment),
            ("assign_sales_rep", self.can_assign_sales_rep),
            ("archive", self.can_archive),
            ("delete", self.can_delete),
        ]
    }
}
