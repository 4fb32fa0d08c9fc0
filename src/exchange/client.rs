use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::cache::token::{AccessToken, IdToken, MAX_EXPIRY_SECONDS};
use crate::error::{ExchangeError, Result};
use crate::exchange::transport::{HttpResponse, Transport};
use crate::helpers::time::Clock;

pub const JWT_BEARER_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Body posted to the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRequest {
    pub grant_type: String,
    pub assertion: String,
}

impl ExchangeRequest {
    pub fn jwt_bearer(assertion: String) -> Self {
        Self {
            grant_type: JWT_BEARER_GRANT_TYPE.to_owned(),
            assertion,
        }
    }
}

#[derive(Deserialize)]
struct AccessTokenResponse {
    access_token: String,
    token_type: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Deserialize)]
struct IdTokenResponse {
    id_token: String,
}

/// Swaps a signed assertion for a token at the credential's token endpoint.
#[derive(Debug, Clone)]
pub struct ExchangeClient<T> {
    transport: T,
}

impl<T: Transport> ExchangeClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn exchange_access_token<C: Clock>(
        &self,
        token_uri: &str,
        assertion: String,
        clock: &C,
    ) -> Result<AccessToken> {
        let response: AccessTokenResponse = self.exchange(token_uri, assertion).await?;
        check_expires_in(response.expires_in)?;
        info!("access token received from '{}'", token_uri);
        Ok(AccessToken::new(
            response.access_token,
            response.token_type,
            response.expires_in,
        )
        .created_at(clock.now()))
    }

    pub async fn exchange_id_token<C: Clock>(
        &self,
        token_uri: &str,
        assertion: String,
        clock: &C,
    ) -> Result<IdToken> {
        let response: IdTokenResponse = self.exchange(token_uri, assertion).await?;
        info!("id token received from '{}'", token_uri);
        Ok(IdToken::new(response.id_token).created_at(clock.now()))
    }

    async fn exchange<R: DeserializeOwned>(&self, token_uri: &str, assertion: String) -> Result<R> {
        let request = ExchangeRequest::jwt_bearer(assertion);
        let response = self.transport.post_json(token_uri, &request).await?;
        Ok(decode_response(response)?)
    }
}

fn decode_response<R: DeserializeOwned>(response: HttpResponse) -> std::result::Result<R, ExchangeError> {
    if !response.status.is_success() {
        let body = response.body_text();
        error!("token request failed: {} {}", response.status, body);
        return Err(ExchangeError::Status {
            status: response.status,
            body,
        });
    }
    serde_json::from_slice(&response.body).map_err(|e| {
        error!("token response decode error: {}", e);
        ExchangeError::Decode(e)
    })
}

fn check_expires_in(expires_in: Option<i64>) -> std::result::Result<(), ExchangeError> {
    match expires_in {
        Some(secs) if !(0..=MAX_EXPIRY_SECONDS).contains(&secs) => {
            error!("token response carries unusable expires_in: {}", secs);
            Err(ExchangeError::InvalidResponse(format!(
                "expires_in {secs} outside 0..={MAX_EXPIRY_SECONDS}"
            )))
        }
        _ => Ok(()),
    }
}
