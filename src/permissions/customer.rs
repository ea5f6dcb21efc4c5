//! Customer account permissions.

use serde::Serialize;

use super::{Grants, Role};

/// What the current user may do with one customer account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CustomerPermissions {
    pub can_view_profile: bool,
    pub can_edit_profile: bool,
    pub can_view_pricing_tier: bool,
    pub can_assign_sales_rep: bool,
    pub can_change_status: bool,
    pub can_delete: bool,
}

impl CustomerPermissions {
    /// `is_self` is true when the account is the current user's own.
    pub fn derive(role: Option<Role>, is_self: bool) -> Self {
        let role = Role::or_lowest(role);
        Self {
            can_view_profile: is_self || role.at_least(Role::SalesRep),
            can_edit_profile: is_self || role.at_least(Role::SalesRep),
            can_view_pricing_tier: role.at_least(Role::SalesRep),
            can_assign_sales_rep: role.at_least(Role::SalesManager),
            can_change_status: role.at_least(Role::SalesManager),
            can_delete: role.at_least(Role::Admin),
        }
    }
}

impl Grants for CustomerPermissions {
    fn entries(&self) -> Vec<(&'static str, bool)> {
        vec![
            ("view_profile", self.can_view_profile),
            ("edit_profile", self.can_edit_profile),
            ("view_pricing_tier", self.can_view_pricing_tier),
            ("assign_sales_rep", self.can_assign_sales_rep),
            ("change_status", self.can_change_status),
            ("delete", self.can_delete),
        ]
    }
}
