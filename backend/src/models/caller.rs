//! The authenticated operator on whose behalf a request runs.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;

use crate::types::OperatorId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ToSchema)]
pub enum CallerRole {
    /// Platform administrator.
    Admin,
    /// Reviewer staff.
    Observer,
    /// Any other signed-in party (donors, hospitals); read-only.
    #[default]
    Registrant,
}

impl CallerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallerRole::Admin => "admin",
            CallerRole::Observer => "observer",
            CallerRole::Registrant => "registrant",
        }
    }

    pub fn has_review_authority(&self) -> bool {
        matches!(self, CallerRole::Admin | CallerRole::Observer)
    }

    /// Parses a role name. Unknown names degrade to the read-only role.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" | "system_admin" => CallerRole::Admin,
            "observer" | "reviewer" => CallerRole::Observer,
            _ => CallerRole::Registrant,
        }
    }
}

impl Serialize for CallerRole {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CallerRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "admin" => Ok(CallerRole::Admin),
            "observer" => Ok(CallerRole::Observer),
            "registrant" => Ok(CallerRole::Registrant),
            // tolerate legacy casings
            "Admin" | "ADMIN" => Ok(CallerRole::Admin),
            "Observer" | "OBSERVER" => Ok(CallerRole::Observer),
            other => Err(serde::de::Error::unknown_variant(
                other,
                &["admin", "observer", "registrant"],
            )),
        }
    }
}

/// Caller context passed explicitly into every lifecycle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub id: OperatorId,
    pub role: CallerRole,
}

impl Caller {
    pub fn new(id: OperatorId, role: CallerRole) -> Self {
        Self { id, role }
    }
}
