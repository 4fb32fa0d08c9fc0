use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::credentials::record::CredentialRecord;

/// Lifetime of a signed assertion.
pub const ASSERTION_LIFETIME_SECS: i64 = 3600;

pub const JWT_ALGORITHM: &str = "RS256";
pub const JWT_TYPE: &str = "JWT";

/// Which cache slot / response schema an exchange targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Access,
    Id,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access_token",
            TokenKind::Id => "id_token",
        }
    }
}

/// The header that describes how the assertion is signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JwtHeader {
    pub alg: &'static str,
    pub typ: &'static str,
}

impl Default for JwtHeader {
    fn default() -> Self {
        Self {
            alg: JWT_ALGORITHM,
            typ: JWT_TYPE,
        }
    }
}

/// Payload of the JWT-bearer assertion. Built fresh for every exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimSet {
    /// Service account email.
    pub iss: String,
    /// Token endpoint URI.
    pub aud: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    /// Space separated scopes.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub scope: String,
    pub iat: i64,
    pub exp: i64,
}

/// Build the claim set for one exchange issued at `now`.
///
/// `target_audience` is only passed for ID token requests.
pub fn build_claim_set<K>(
    credentials: &CredentialRecord<K>,
    scope: &str,
    target_audience: Option<&str>,
    now: DateTime<Utc>,
) -> ClaimSet {
    let exp = now + TimeDelta::seconds(ASSERTION_LIFETIME_SECS);
    ClaimSet {
        iss: credentials.client_email.clone(),
        aud: credentials.token_uri.clone(),
        target_audience: target_audience.map(str::to_owned),
        scope: scope.to_owned(),
        iat: now.timestamp(),
        exp: exp.timestamp(),
    }
}

/// Scopes as they appear in the `scope` claim.
pub fn join_scopes<S: AsRef<str>>(scopes: &[S]) -> String {
    scopes
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ")
}
