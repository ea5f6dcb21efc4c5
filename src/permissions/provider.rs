//! Provider (supplier) permissions.

use serde::Serialize;

use super::{Grants, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProviderPermissions {
    pub can_view: bool,
    pub can_edit: bool,
    pub can_manage_pricing: bool,
    pub can_archive: bool,
    pub can_delete: bool,
}

impl ProviderPermissions {
    pub fn derive(role: Option<Role>) -> Self {
        let role = Role::or_lowest(role);
        Self {
            can_view: role.at_least(Role::FulfillmentCoordinator),
            can_edit: role.at_least(Role::SalesManager),
            can_manage_pricing: role.at_least(Role::SalesManager),
            can_archive: role.at_least(Role::SalesManager),
            can_delete: role.at_least(Role::Admin),
        }
    }
}

impl Grants for ProviderPermissions {
    fn entries(&self) -> Vec<(&'static str, bool)> {
        vec![
            ("view", self.can_view),
            ("edit", self.can_edit),
            ("manage_pricing", self.can_manage_pricing),
            ("archive", self.can_archive),
            ("delete", self.can_delete),
        ]
    }
}
