use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const TOKEN_ISSUER: &str = "synaptix-app";
pub const TOKEN_AUDIENCE: &str = "synaptix-users";
pub const SESSION_COOKIE: &str = "auth_session";
pub const LEGACY_SESSION_COOKIE: &str = "auth-token";

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtHeader {
    pub alg: String,
    pub typ: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Doctor,
    Patient,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Doctor => "doctor",
            Role::Patient => "patient",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "doctor" => Ok(Role::Doctor),
            "patient" => Ok(Role::Patient),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// The authenticated caller, as carried in the session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl User {
    pub fn is_doctor(&self) -> bool {
        self.role == Some(Role::Doctor)
    }

    /// Sessions created before roles existed carry no role and are treated as patients.
    pub fn may_act_as_patient(&self) -> bool {
        matches!(self.role, None | Some(Role::Patient))
    }
}
