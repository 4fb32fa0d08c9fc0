use std::path::Path;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Lifetime assumed when the token endpoint does not declare one.
pub const DEFAULT_EXPIRY_SECONDS: i64 = 3600;

/// Largest `expires_in` accepted from the token endpoint (100 years).
pub const MAX_EXPIRY_SECONDS: i64 = 100 * 365 * 24 * 60 * 60;

/// Expiry arithmetic shared by both token kinds.
pub trait Expiring {
    /// Local time the token was received; `None` means unknown.
    fn creation_time(&self) -> Option<DateTime<Utc>>;

    fn lifetime(&self) -> TimeDelta;

    /// `None` when the creation time is unknown or the sum leaves the
    /// representable range.
    fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.creation_time()
            .and_then(|created| created.checked_add_signed(self.lifetime()))
    }

    /// `creation_time + lifetime - now`, or zero when the expiry instant is
    /// unknown so such a token always counts as expired.
    fn time_to_expiry(&self, now: DateTime<Utc>) -> TimeDelta {
        match self.expires_at() {
            Some(expires_at) => expires_at - now,
            None => TimeDelta::zero(),
        }
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.time_to_expiry(now) <= TimeDelta::zero()
    }
}

/// OAuth2 access token as returned by the token endpoint.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
    /// Declared lifetime in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn new(access_token: String, token_type: String, expires_in: Option<i64>) -> Self {
        Self {
            access_token,
            token_type,
            expires_in,
            creation_time: None,
        }
    }

    /// Returns a copy stamped with the time it was received.
    pub fn created_at(mut self, creation_time: DateTime<Utc>) -> Self {
        self.creation_time = Some(creation_time);
        self
    }
}

impl Expiring for AccessToken {
    fn creation_time(&self) -> Option<DateTime<Utc>> {
        self.creation_time
    }

    /// Out-of-range declared lifetimes collapse to zero.
    fn lifetime(&self) -> TimeDelta {
        TimeDelta::try_seconds(self.expires_in.unwrap_or(DEFAULT_EXPIRY_SECONDS))
            .unwrap_or_else(TimeDelta::zero)
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"[censored]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("creation_time", &self.creation_time)
            .finish()
    }
}

/// OpenID Connect identity token. Always lives for [`DEFAULT_EXPIRY_SECONDS`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdToken {
    pub id_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<DateTime<Utc>>,
}

impl IdToken {
    pub fn new(id_token: String) -> Self {
        Self {
            id_token,
            creation_time: None,
        }
    }

    pub fn created_at(mut self, creation_time: DateTime<Utc>) -> Self {
        self.creation_time = Some(creation_time);
        self
    }

    /// Writes the token as JSON (`id_token`, `creation_time`).
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let data = serde_json::to_vec(self).map_err(std::io::Error::other)?;
        tokio::fs::write(path, data).await?;
        Ok(())
    }

    /// Reads a token previously written by [`IdToken::save`].
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = tokio::fs::read(path).await?;
        let token = serde_json::from_slice(&data).map_err(std::io::Error::other)?;
        Ok(token)
    }
}

impl Expiring for IdToken {
    fn creation_time(&self) -> Option<DateTime<Utc>> {
        self.creation_time
    }

    fn lifetime(&self) -> TimeDelta {
        TimeDelta::seconds(DEFAULT_EXPIRY_SECONDS)
    }
}

impl std::fmt::Debug for IdToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdToken")
            .field("id_token", &"[censored]")
            .field("creation_time", &self.creation_time)
            .finish()
    }
}
