use std::future::Future;
use std::time::Duration;

use http::header::CONTENT_TYPE;
use http::StatusCode;
use reqwest::Client;
use tracing::debug;

use crate::error::ExchangeError;
use crate::exchange::client::ExchangeRequest;

/// Raw answer of the token endpoint.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// HTTP capability the exchange client sends requests through.
///
/// One request per call. Timeouts and connection reuse are the
/// implementation's business.
pub trait Transport: Send + Sync {
    fn post_json(
        &self,
        url: &str,
        body: &ExchangeRequest,
    ) -> impl Future<Output = Result<HttpResponse, ExchangeError>> + Send;
}

/// `reqwest` backed transport.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, ExchangeError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExchangeError::Transport(Box::new(e)))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn post_json(
        &self,
        url: &str,
        body: &ExchangeRequest,
    ) -> Result<HttpResponse, ExchangeError> {
        debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| ExchangeError::Transport(Box::new(e)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ExchangeError::Transport(Box::new(e)))?;

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}
