pub mod jwt;

pub use jwt::{CredentialVerifier, TokenAuthority, TokenError, VerificationError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tenant type carried by every session token.
///
/// Roles are mutually exclusive and not hierarchical: an `Admin` does not pass
/// a `Mechanic` check, and a `StoreOwner` does not pass one either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "user")]
    Customer,
    #[serde(rename = "mechanic")]
    Mechanic,
    #[serde(rename = "store_owner")]
    StoreOwner,
    #[serde(rename = "admin")]
    Admin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Customer, Role::Mechanic, Role::StoreOwner, Role::Admin];

    /// Wire name used in token claims and configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "user",
            Role::Mechanic => "mechanic",
            Role::StoreOwner => "store_owner",
            Role::Admin => "admin",
        }
    }

    /// Dashboard root for an authenticated session of this role
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Role::Customer => "/screens/client/dashboard",
            Role::Mechanic => "/screens/mechanic/dashboard",
            Role::StoreOwner => "/screens/owner/dashboard",
            Role::Admin => "/screens/admin/dashboard",
        }
    }

    /// Sign-in page a session of this role is sent to when it needs to authenticate.
    /// Store owners share the mechanic sign-in page.
    pub fn signin_path(&self) -> &'static str {
        match self {
            Role::Customer => "/auth/client/signin",
            Role::Mechanic | Role::StoreOwner => "/auth/mechanic/signin",
            Role::Admin => "/auth/admin/signin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown role '{0}' (expected one of: user, mechanic, store_owner, admin)")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "user" | "customer" | "client" => Ok(Role::Customer),
            "mechanic" => Ok(Role::Mechanic),
            "store_owner" | "owner" => Ok(Role::StoreOwner),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// JWT payload as signed by [`TokenAuthority::issue`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ClaimsWire")]
pub struct Claims {
    pub id: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Incoming claim set. Older tokens carry the role under `type`, and some
/// carry both keys; `role` wins when both are present.
#[derive(Deserialize)]
struct ClaimsWire {
    id: String,
    #[serde(default)]
    role: Option<Role>,
    #[serde(default, rename = "type")]
    legacy_role: Option<Role>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    iss: String,
    aud: String,
    iat: i64,
    exp: i64,
}

impl TryFrom<ClaimsWire> for Claims {
    type Error = String;

    fn try_from(wire: ClaimsWire) -> Result<Self, Self::Error> {
        let role = wire
            .role
            .or(wire.legacy_role)
            .ok_or_else(|| "missing role claim".to_string())?;

        Ok(Self {
            id: wire.id,
            role,
            email: wire.email,
            name: wire.name,
            iss: wire.iss,
            aud: wire.aud,
            iat: wire.iat,
            exp: wire.exp,
        })
    }
}

/// Decoded caller identity, derived fresh from the session token on every request.
///
/// Serialized into the `x-decoded-token` header for downstream handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,
    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

impl TryFrom<Claims> for Identity {
    type Error = VerificationError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let issued_at = DateTime::from_timestamp(claims.iat, 0)
            .ok_or_else(|| VerificationError::new("issued-at timestamp out of range"))?;
        let expires_at = DateTime::from_timestamp(claims.exp, 0)
            .ok_or_else(|| VerificationError::new("expiry timestamp out of range"))?;

        Ok(Self {
            id: claims.id,
            role: claims.role,
            email: claims.email,
            name: claims.name,
            issued_at,
            expires_at,
        })
    }
}

/// Who a new token is issued for.
#[derive(Debug, Clone)]
pub struct TokenSubject {
    pub id: String,
    pub role: Role,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl TokenSubject {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
            email: None,
            name: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_wire_names_round_trip_through_serde() {
        for role in Role::ALL {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.as_str()));
            let back: Role = serde_json::from_str(&json).unwrap();
            assert_eq!(back, role);
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(serde_json::from_str::<Role>("\"superuser\"").is_err());
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn role_parses_cli_aliases() {
        assert_eq!("client".parse::<Role>().unwrap(), Role::Customer);
        assert_eq!("owner".parse::<Role>().unwrap(), Role::StoreOwner);
        assert_eq!("store_owner".parse::<Role>().unwrap(), Role::StoreOwner);
    }

    #[test]
    fn claims_accept_legacy_type_key() {
        let claims: Claims = serde_json::from_value(serde_json::json!({
            "id": "u-1",
            "type": "mechanic",
            "iss": "i",
            "aud": "a",
            "iat": 1_700_000_000,
            "exp": 1_700_003_600
        }))
        .unwrap();
        assert_eq!(claims.role, Role::Mechanic);
    }

    #[test]
    fn claims_with_both_role_keys_prefer_role() {
        let claims: Claims = serde_json::from_value(serde_json::json!({
            "id": "u-1",
            "role": "store_owner",
            "type": "mechanic",
            "iss": "i",
            "aud": "a",
            "iat": 1_700_000_000,
            "exp": 1_700_003_600
        }))
        .unwrap();
        assert_eq!(claims.role, Role::StoreOwner);
    }

    #[test]
    fn claims_without_any_role_are_rejected() {
        let result = serde_json::from_value::<Claims>(serde_json::json!({
            "id": "u-1",
            "iss": "i",
            "aud": "a",
            "iat": 1_700_000_000,
            "exp": 1_700_003_600
        }));
        assert!(result.is_err());
    }

    #[test]
    fn identity_serializes_with_compact_timestamps() {
        let claims = Claims {
            id: "u-9".into(),
            role: Role::Admin,
            email: Some("a@cartuner.test".into()),
            name: None,
            iss: "i".into(),
            aud: "a".into(),
            iat: 1_700_000_000,
            exp: 1_700_003_600,
        };
        let identity = Identity::try_from(claims).unwrap();
        let value = serde_json::to_value(&identity).unwrap();

        assert_eq!(value["id"], "u-9");
        assert_eq!(value["role"], "admin");
        assert_eq!(value["iat"], 1_700_000_000);
        assert_eq!(value["exp"], 1_700_003_600);
        assert!(value.get("name").is_none());
    }

    #[test]
    fn store_owner_signs_in_through_mechanic_page() {
        assert_eq!(Role::StoreOwner.signin_path(), Role::Mechanic.signin_path());
        assert_ne!(Role::StoreOwner.dashboard_path(), Role::Mechanic.dashboard_path());
    }
}
