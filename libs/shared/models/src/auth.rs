use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtHeader {
    pub alg: String,
    pub typ: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: Option<u64>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub name: Option<String>,
    pub iat: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Doctor,
    Admin,
}

impl Role {
    /// Unknown or missing roles are treated as the least privileged one.
    pub fn from_claim(role: Option<&str>) -> Self {
        match role.map(|r| r.to_ascii_lowercase()).as_deref() {
            Some("admin") => Role::Admin,
            Some("doctor") => Role::Doctor,
            _ => Role::Patient,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Role,
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Authenticated caller for the lifetime of one request.
///
/// Built by the auth middleware after the bearer token validates and handed
/// to handlers through request extensions. The access token is forwarded to
/// the clinic API on the caller's behalf.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub access_token: String,
}

impl Session {
    pub fn new(user: User, access_token: impl Into<String>) -> Self {
        Self {
            user,
            access_token: access_token.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    /// Patients may only act for themselves; admins may act for anyone.
    pub fn can_act_for(&self, user_id: &str) -> bool {
        self.user.is_admin() || self.user.id == user_id
    }
}
