//! Group and membership records.
//!
//! Members exist to resolve names in the presentation layer; the balance
//! math keys everything by user id and never looks at them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Admin,
    Member,
}

impl MemberRole {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }
}

impl TryFrom<&str> for MemberRole {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            other => Err(EngineError::InvalidRecord(format!(
                "invalid member role: {other}"
            ))),
        }
    }
}

/// A shared-expense group. The default currency doubles as the settlement
/// denomination: every settlement recorded in the group carries it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub default_currency: Currency,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupMember {
    pub user_id: Uuid,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub role: MemberRole,
}

impl GroupMember {
    /// Display name for `user`, if present in `members`.
    #[must_use]
    pub fn name_of(members: &[GroupMember], user: Uuid) -> Option<&str> {
        members
            .iter()
            .find(|m| m.user_id == user)
            .map(|m| m.display_name.as_str())
    }
}
