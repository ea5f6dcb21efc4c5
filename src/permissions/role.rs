//! Role levels.

use std::fmt;
use std::str::FromStr;

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::MedsourceError;

/// Ordered role scale. A higher level holds every capability of the levels
/// below it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    #[default]
    Customer = 0,
    FulfillmentCoordinator = 1,
    SalesRep = 2,
    SalesManager = 3,
    Admin = 4,
}

impl Role {
    /// Every role, lowest first.
    pub const ALL: [Role; 5] = [
        Role::Customer,
        Role::FulfillmentCoordinator,
        Role::SalesRep,
        Role::SalesManager,
        Role::Admin,
    ];

    pub fn level(self) -> u8 {
        self as u8
    }

    /// Role for a numeric level, if it is on the scale.
    pub fn from_level(level: i64) -> Option<Role> {
        match level {
            0 => Some(Role::Customer),
            1 => Some(Role::FulfillmentCoordinator),
            2 => Some(Role::SalesRep),
            3 => Some(Role::SalesManager),
            4 => Some(Role::Admin),
            _ => None,
        }
    }

    /// Threshold check used by every capability.
    pub fn at_least(self, threshold: Role) -> bool {
        self >= threshold
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::FulfillmentCoordinator => "fulfillment_coordinator",
            Role::SalesRep => "sales_rep",
            Role::SalesManager => "sales_manager",
            Role::Admin => "admin",
        }
    }

    /// Resolve optional session data; absence means the lowest role.
    pub fn or_lowest(role: Option<Role>) -> Role {
        role.unwrap_or_default()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = MedsourceError;

    /// Accepts snake_case, kebab-case or bare names, and numeric levels.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        if let Ok(level) = normalized.parse::<i64>() {
            return Role::from_level(level)
                .ok_or_else(|| MedsourceError::InvalidRequest(format!("unknown role level {level}")));
        }
        match normalized.as_str() {
            "customer" => Ok(Role::Customer),
            "fulfillment_coordinator" | "fulfillmentcoordinator" | "fulfillment" => {
                Ok(Role::FulfillmentCoordinator)
            }
            "sales_rep" | "salesrep" => Ok(Role::SalesRep),
            "sales_manager" | "salesmanager" => Ok(Role::SalesManager),
            "admin" => Ok(Role::Admin),
            _ => Err(MedsourceError::InvalidRequest(format!("unknown role {s:?}"))),
        }
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.level())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRole {
    Level(i64),
    Name(String),
    Other(IgnoredAny),
}

/// Lenient role field: numbers or names on the scale map to a role; null,
/// out-of-range or malformed values become `None`.
pub(crate) fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Option<Role>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawRole>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawRole::Level(level)) => Role::from_level(level),
        Some(RawRole::Name(name)) => name.parse().ok(),
        Some(RawRole::Other(_)) | None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_is_ordered() {
        for pair in Role::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[1].at_least(pair[0]));
            assert!(!pair[0].at_least(pair[1]));
        }
    }

    #[test]
    fn parse_names_and_levels() {
        assert_eq!("sales-rep".parse::<Role>().unwrap(), Role::SalesRep);
        assert_eq!("Sales Manager".parse::<Role>().unwrap(), Role::SalesManager);
        assert_eq!("4".parse::<Role>().unwrap(), Role::Admin);
        assert!("7".parse::<Role>().is_err());
        assert!("janitor".parse::<Role>().is_err());
    }

    #[test]
    fn missing_role_is_customer() {
        assert_eq!(Role::or_lowest(None), Role::Customer);
    }
}
