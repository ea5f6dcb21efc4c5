//! Role-based capability derivation.
//!
//! Every capability is a pure function of the user's [`Role`] plus, for
//! record-level checks, ownership and the record's status. Role thresholds
//! only ever use `>=`, so a higher role never loses a capability a lower
//! role holds.
//!
//! ```rust
//! use medsource::permissions::{OrderPermissions, OrderStatus, PermissionCache, Role};
//!
//! let cache = PermissionCache::new();
//! assert!(cache.get(Some(Role::SalesRep)).can_create_quotes);
//! assert!(!cache.get(None).can_view_all_orders);
//!
//! let order = OrderPermissions::derive(Some(Role::Customer), true, OrderStatus::AwaitingPayment);
//! assert!(order.can_confirm_payment);
//! ```

mod capabilities;
pub mod customer;
pub mod order;
pub mod provider;
pub mod quote;
mod role;
mod session;

pub use capabilities::{Grants, PermissionCache, RolePermissions};
pub use customer::CustomerPermissions;
pub use order::{OrderPermissions, OrderStatus};
pub use provider::ProviderPermissions;
pub use quote::{QuotePermissions, QuoteStatus};
pub use role::Role;
pub use session::Session;
