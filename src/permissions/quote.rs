//! Quote permissions.

use serde::{Deserialize, Serialize};

use super::{Grants, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Draft,
    Sent,
    Accepted,
    Rejected,
    Expired,
    Converted,
}

impl QuoteStatus {
    pub const ALL: [QuoteStatus; 6] = [
        QuoteStatus::Draft,
        QuoteStatus::Sent,
        QuoteStatus::Accepted,
        QuoteStatus::Rejected,
        QuoteStatus::Expired,
        QuoteStatus::Converted,
    ];

    /// Still open for changes by sales.
    pub fn is_editable(self) -> bool {
        matches!(self, QuoteStatus::Draft | QuoteStatus::Sent)
    }
}

/// What the current user may do with one quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuotePermissions {
    pub can_request: bool,
    pub can_view: bool,
    pub can_edit: bool,
    pub can_approve_discount: bool,
    pub can_convert_to_order: bool,
    pub can_delete: bool,
}

impl QuotePermissions {
    pub fn derive(role: Option<Role>, is_owner: bool, status: QuoteStatus) -> Self {
        let role = Role::or_lowest(role);
        Self {
            can_request: role.at_least(Role::Customer),
            can_view: is_owner || role.at_least(Role::SalesRep),
            can_edit: role.at_least(Role::SalesRep) && status.is_editable(),
            can_approve_discount: role.at_least(Role::SalesManager),
            can_convert_to_order: (is_owner || role.at_least(Role::SalesRep))
                && status == QuoteStatus::Accepted,
            can_delete: role.at_least(Role::Admin),
        }
    }
}

impl Grants for QuotePermissions {
    fn entries(&self) -> Vec<(&'static str, bool)> {
        vec![
            ("request", self.can_request),
            ("view", self.can_view),
            ("edit", self.can_edit),
            ("approve_discount", self.can_approve_discount),
            ("convert_to_order", self.can_convert_to_order),
            ("delete", self.can_delete),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anyone_can_request() {
        let perms = QuotePermissions::derive(None, false, QuoteStatus::Draft);
        assert!(perms.can_request);
        assert!(!perms.can_view);
    }

    #[test]
    fn edits_stop_once_accepted() {
        let sent = QuotePermissions::derive(Some(Role::SalesRep), false, QuoteStatus::Sent);
        assert!(sent.can_edit);
        let accepted = QuotePermissions::derive(Some(Role::SalesRep), false, QuoteStatus::Accepted);
        assert!(!accepted.can_edit);
        assert!(accepted.can_convert_to_order);
    }

    #[test]
    fn owner_converts_accepted_quote() {
        let perms = QuotePermissions::derive(Some(Role::Customer), true, QuoteStatus::Accepted);
        assert!(perms.can_convert_to_order);
        assert!(!perms.can_approve_discount);
    }
}
