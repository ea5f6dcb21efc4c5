//! Role-wide capabilities and their memoization.

use std::sync::Arc;

use moka::sync::Cache;
use serde::Serialize;

use super::Role;

/// A permission record that can be listed as `(name, granted)` pairs.
///
/// Used for the CLI tables and for checking monotonicity generically.
pub trait Grants {
    fn entries(&self) -> Vec<(&'static str, bool)>;
}

/// Capabilities derived from the role alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RolePermissions {
    pub role: Role,
    pub can_browse_catalog: bool,
    pub can_place_orders: bool,
    pub can_request_quotes: bool,
    pub can_view_all_orders: bool,
    pub can_manage_fulfillment: bool,
    pub can_view_customers: bool,
    pub can_create_quotes: bool,
    pub can_view_reports: bool,
    pub can_view_providers: bool,
    pub can_manage_providers: bool,
    pub can_manage_pricing: bool,
    pub can_approve_discounts: bool,
    pub can_manage_team: bool,
    pub can_manage_users: bool,
    pub can_access_settings: bool,
}

impl RolePermissions {
    /// Derive capabilities for `role`; `None` is treated as the lowest role.
    pub fn derive(role: Option<Role>) -> Self {
        let role = Role::or_lowest(role);
        Self {
            role,
            can_browse_catalog: role.at_least(Role::Customer),
            can_place_orders: role.at_least(Role::Customer),
            can_request_quotes: role.at_least(Role::Customer),
            can_view_all_orders: role.at_least(Role::FulfillmentCoordinator),
            can_manage_fulfillment: role.at_least(Role::FulfillmentCoordinator),
            can_view_customers: role.at_least(Role::SalesRep),
            can_create_quotes: role.at_least(Role::SalesRep),
            can_view_reports: role.at_least(Role::SalesRep),
            can_view_providers: role.at_least(Role::FulfillmentCoordinator),
            can_manage_providers: role.at_least(Role::SalesManager),
            can_manage_pricing: role.at_least(Role::SalesManager),
            can_approve_discounts: role.at_least(Role::SalesManager),
            can_manage_team: role.at_least(Role::SalesManager),
            can_manage_users: role.at_least(Role::Admin),
            can_access_settings: role.at_least(Role::Admin),
        }
    }

    /// Whether this is an internal (staff) role.
    pub fn is_staff(&self) -> bool {
        self.role.at_least(Role::FulfillmentCoordinator)
    }
}

impl Grants for RolePermissions {
    fn entries(&self) -> Vec<(&'static str, bool)> {
        vec![
            ("browse_catalog", self.can_browse_catalog),
            ("place_orders", self.can_place_orders),
            ("request_quotes", self.can_request_quotes),
            ("view_all_orders", self.can_view_all_orders),
            ("manage_fulfillment", self.can_manage_fulfillment),
            ("view_customers", self.can_view_customers),
            ("create_quotes", self.can_create_quotes),
            ("view_reports", self.can_view_reports),
            ("view_providers", self.can_view_providers),
            ("manage_providers", self.can_manage_providers),
            ("manage_pricing", self.can_manage_pricing),
            ("approve_discounts", self.can_approve_discounts),
            ("manage_team", self.can_manage_team),
            ("manage_users", self.can_manage_users),
            ("access_settings", self.can_access_settings),
        ]
    }
}

/// Memoizes [`RolePermissions`] per role.
///
/// Repeated lookups for the same role return the same `Arc`, so callers can
/// compare records with [`Arc::ptr_eq`].
#[derive(Clone)]
pub struct PermissionCache {
    cache: Cache<Role, Arc<RolePermissions>>,
}

impl PermissionCache {
    pub fn new() -> Self {
        Self {
            cache: Cache::new(Role::ALL.len() as u64),
        }
    }

    /// Capabilities for `role`, derived once per role.
    pub fn get(&self, role: Option<Role>) -> Arc<RolePermissions> {
        let role = Role::or_lowest(role);
        self.cache
            .get_with(role, || Arc::new(RolePermissions::derive(Some(role))))
    }
}

impl Default for PermissionCache {
    fn default() -> Self {
        Self::new()
    }
}
