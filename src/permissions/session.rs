//! Authenticated session as returned by the backend.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use super::Role;
use super::role::deserialize_lenient;
use crate::Result;
use crate::types::ApiEnvelope;

/// The current user, as far as capability derivation is concerned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Session {
    pub user_id: Option<String>,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionPayload {
    #[serde(default, deserialize_with = "deserialize_user_id")]
    user_id: Option<String>,
    /// Older session payloads carry the user under `id`.
    #[serde(default, deserialize_with = "deserialize_user_id")]
    id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    role: Option<Role>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawUserId {
    Text(String),
    Unsigned(u64),
    Signed(i64),
    Other(IgnoredAny),
}

/// Accept string or integer ids; anything else reads as no id.
fn deserialize_user_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawUserId>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawUserId::Text(id)) if !id.is_empty() => Some(id),
        Some(RawUserId::Unsigned(id)) => Some(id.to_string()),
        Some(RawUserId::Signed(id)) => Some(id.to_string()),
        _ => None,
    })
}

impl Session {
    /// An unauthenticated visitor.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Parse the session endpoint's envelope.
    ///
    /// Malformed JSON is an error. A failed envelope yields an anonymous
    /// session, and a missing, null or unrecognised role yields
    /// [`Role::Customer`]. The user id may be a string or an integer, under
    /// `userId` or `id`; any other id value reads as no id.
    pub fn from_envelope_json(json: &str) -> Result<Self> {
        let envelope: ApiEnvelope<SessionPayload> = serde_json::from_str(json)?;
        let status_code = envelope.status_code;
        let Some(payload) = envelope.into_payload() else {
            debug!(status_code, "no session in envelope");
            return Ok(Self::anonymous());
        };
        Ok(Self {
            user_id: payload.user_id.or(payload.id),
            role: Role::or_lowest(payload.role),
        })
    }

    /// Whether this session owns a record created by `owner_id`.
    pub fn owns(&self, owner_id: &str) -> bool {
        self.user_id.as_deref() == Some(owner_id)
    }
}
