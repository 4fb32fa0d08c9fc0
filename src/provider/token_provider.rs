use std::future::Future;
use std::path::Path;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::cache::token::{AccessToken, Expiring, IdToken};
use crate::cache::token_cache::TokenCache;
use crate::credentials::record::CredentialRecord;
use crate::error::Result;
use crate::exchange::client::ExchangeClient;
use crate::exchange::transport::{HttpTransport, Transport};
use crate::helpers::time::{Clock, SystemClock};
use crate::jwt::claims::{build_claim_set, join_scopes, JwtHeader, TokenKind};
use crate::jwt::signer::{Rs256Signer, Signer};
use crate::observability::metrics::get_metrics;
use crate::provider::options::ProviderOptions;

/// Issues access and ID tokens for one service account.
///
/// Each token kind has its own cache slot. A cached token is returned while
/// more than one second of its lifetime remains; otherwise a new assertion is
/// signed and exchanged, and the result replaces the slot.
///
/// Unless [`ProviderOptions::single_flight`] is set, concurrent callers that
/// all find a slot stale each perform their own exchange and the last one to
/// finish wins the slot.
pub struct TokenProvider<T = HttpTransport, S = Rs256Signer, C = SystemClock>
where
    S: Signer,
{
    credentials: CredentialRecord<S::Key>,
    signer: S,
    exchange: ExchangeClient<T>,
    clock: C,
    scope: String,
    target_audience: Option<String>,
    access_token: TokenCache<AccessToken>,
    id_token: TokenCache<IdToken>,
}

impl TokenProvider {
    /// Provider over the default `reqwest` transport and RS256 signer.
    pub fn new(credentials: &[u8], options: ProviderOptions) -> Result<Self> {
        Self::with_parts(
            credentials,
            options,
            HttpTransport::default(),
            Rs256Signer,
            SystemClock,
        )
    }

    /// Same as [`TokenProvider::new`], reading the credential document from `path`.
    pub async fn from_file<P: AsRef<Path>>(path: P, options: ProviderOptions) -> Result<Self> {
        let credentials = CredentialRecord::load(path, &Rs256Signer).await?;
        Ok(Self::from_record(
            credentials,
            options,
            HttpTransport::default(),
            Rs256Signer,
            SystemClock,
        ))
    }
}

impl<T, S, C> TokenProvider<T, S, C>
where
    T: Transport,
    S: Signer,
    C: Clock,
{
    pub fn with_parts(
        credentials: &[u8],
        options: ProviderOptions,
        transport: T,
        signer: S,
        clock: C,
    ) -> Result<Self> {
        let credentials = CredentialRecord::parse(credentials, &signer)?;
        Ok(Self::from_record(credentials, options, transport, signer, clock))
    }

    pub fn from_record(
        credentials: CredentialRecord<S::Key>,
        options: ProviderOptions,
        transport: T,
        signer: S,
        clock: C,
    ) -> Self {
        info!(
            "token provider for '{}' (scopes: {:?}, target audience: {:?})",
            credentials.client_email, options.scopes, options.target_audience
        );
        Self {
            credentials,
            signer,
            exchange: ExchangeClient::new(transport),
            clock,
            scope: join_scopes(&options.scopes),
            target_audience: options.target_audience,
            access_token: TokenCache::new(options.single_flight),
            id_token: TokenCache::new(options.single_flight),
        }
    }

    /// Cached access token, or a fresh one for the configured scopes.
    pub async fn get_access_token(&self) -> Result<AccessToken> {
        self.get_or_refresh(TokenKind::Access, &self.access_token, |assertion| {
            self.exchange
                .exchange_access_token(&self.credentials.token_uri, assertion, &self.clock)
        })
        .await
    }

    /// Cached ID token, or a fresh one for the configured target audience.
    pub async fn get_id_token(&self) -> Result<IdToken> {
        self.get_or_refresh(TokenKind::Id, &self.id_token, |assertion| {
            self.exchange
                .exchange_id_token(&self.credentials.token_uri, assertion, &self.clock)
        })
        .await
    }

    /// Whatever the access token slot holds, fresh or not.
    pub async fn cached_access_token(&self) -> Option<AccessToken> {
        self.access_token.peek().await
    }

    pub async fn cached_id_token(&self) -> Option<IdToken> {
        self.id_token.peek().await
    }

    pub fn credentials(&self) -> &CredentialRecord<S::Key> {
        &self.credentials
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn target_audience(&self) -> Option<&str> {
        self.target_audience.as_deref()
    }

    pub fn transport(&self) -> &T {
        self.exchange.transport()
    }

    /// Remaining lifetime of `token` by the clock the cache decides with.
    pub fn time_to_expiry<Tok: Expiring>(&self, token: &Tok) -> TimeDelta {
        token.time_to_expiry(self.clock.now())
    }

    async fn get_or_refresh<Tok, F, Fut>(
        &self,
        kind: TokenKind,
        cache: &TokenCache<Tok>,
        exchange: F,
    ) -> Result<Tok>
    where
        Tok: Expiring + Clone,
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<Tok>>,
    {
        let metrics = get_metrics();
        let label = kind.as_str();

        if let Some(token) = cache.get(self.clock.now()).await {
            debug!("{} served from cache", label);
            metrics.cache_hits.with_label_values(&[label]).inc();
            return Ok(token);
        }

        let _refresh = cache.refresh_guard().await;
        let now = self.clock.now();
        if cache.is_single_flight() {
            // another caller may have refreshed while we waited
            if let Some(token) = cache.get(now).await {
                debug!("{} refreshed by a concurrent caller", label);
                metrics.cache_hits.with_label_values(&[label]).inc();
                return Ok(token);
            }
        }

        let assertion = self.assertion(kind, now).inspect_err(|e| {
            warn!("{} assertion failed: {}", label, e);
            metrics.exchange_failures.with_label_values(&[label, e.reason()]).inc();
        })?;

        info!("exchanging assertion for {}", label);
        metrics.exchange_requests.with_label_values(&[label]).inc();
        let start = Instant::now();
        let result = exchange(assertion).await;
        metrics
            .exchange_duration
            .with_label_values(&[label])
            .observe(start.elapsed().as_secs_f64());

        let token = result.inspect_err(|e| {
            warn!("{} exchange failed: {}", label, e);
            metrics.exchange_failures.with_label_values(&[label, e.reason()]).inc();
        })?;

        if let Some(expires_at) = token.expires_at() {
            metrics
                .token_expiry_unix
                .with_label_values(&[label])
                .set(expires_at.timestamp());
        }
        cache.set(token.clone()).await;
        Ok(token)
    }

    /// Sign a freshly built claim set for `kind` issued at `now`.
    fn assertion(&self, kind: TokenKind, now: DateTime<Utc>) -> Result<String> {
        let target_audience = match kind {
            TokenKind::Access => None,
            TokenKind::Id => self.target_audience.as_deref(),
        };
        let claims = build_claim_set(&self.credentials, &self.scope, target_audience, now);
        self.signer
            .sign(&JwtHeader::default(), &claims, &self.credentials.key)
    }
}
