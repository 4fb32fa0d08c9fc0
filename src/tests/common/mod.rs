// tests/common/mod.rs
pub use serde_json::json;

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use base64::prelude::{Engine as _, BASE64_URL_SAFE_NO_PAD};
use chrono::{DateTime, TimeZone, Utc};
use http::StatusCode;
use reqwest::Client;
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::error::{Error, ExchangeError, Result};
use crate::exchange::client::ExchangeRequest;
use crate::exchange::transport::{HttpResponse, Transport};
use crate::helpers::time::ManualClock;
use crate::jwt::claims::{ClaimSet, JwtHeader};
use crate::jwt::signer::Signer;
use crate::provider::{ProviderOptions, TokenProvider};

pub const TEST_PRIVATE_KEY: &str = include_str!("../fixtures/test_key.pem");
pub const TEST_PUBLIC_KEY: &str = include_str!("../fixtures/test_key.pub.pem");
pub const TEST_CLIENT_EMAIL: &str = "robot@test-project.iam.gserviceaccount.com";

/// Fixed start time for clock driven tests.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

/// Full service-account document pointing at `token_uri`.
pub fn credentials_json(token_uri: &str, private_key: &str) -> Value {
    json!({
        "type": "service_account",
        "project_id": "test-project",
        "private_key_id": "0123456789abcdef",
        "private_key": private_key,
        "client_email": TEST_CLIENT_EMAIL,
        "client_id": "1234567890",
        "auth_uri": "https://accounts.example/o/oauth2/auth",
        "token_uri": token_uri,
        "auth_provider_x509_cert_url": "https://www.example/oauth2/v1/certs",
        "client_x509_cert_url": "https://www.example/robot/v1/metadata/x509/robot"
    })
}

pub fn credentials_bytes(token_uri: &str) -> Vec<u8> {
    serde_json::to_vec(&credentials_json(token_uri, TEST_PRIVATE_KEY)).unwrap()
}

/// Decode the (unverified) claims segment of a compact JWS.
pub fn decode_segment(assertion: &str, index: usize) -> Value {
    let segment = assertion.split('.').nth(index).expect("jws segment");
    let raw = BASE64_URL_SAFE_NO_PAD.decode(segment).expect("base64url segment");
    serde_json::from_slice(&raw).expect("json segment")
}

pub fn decode_claims(assertion: &str) -> Value {
    decode_segment(assertion, 1)
}

/// Signer that never touches key material and can be told to fail.
#[derive(Clone, Default)]
pub struct FakeSigner {
    pub signed: Arc<AtomicUsize>,
    pub fail: bool,
}

impl FakeSigner {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn count(&self) -> usize {
        self.signed.load(Ordering::SeqCst)
    }
}

impl Signer for FakeSigner {
    type Key = String;

    fn load_key(&self, private_key: &str) -> Result<String> {
        if private_key.contains("not a key") {
            return Err(Error::MalformedCredentials("cannot load private_key".into()));
        }
        Ok(private_key.to_owned())
    }

    fn sign(&self, header: &JwtHeader, claims: &ClaimSet, _key: &String) -> Result<String> {
        if self.fail {
            return Err(Error::SigningFailed("signer unavailable".into()));
        }
        self.signed.fetch_add(1, Ordering::SeqCst);
        let header = BASE64_URL_SAFE_NO_PAD.encode(serde_json::to_vec(header).unwrap());
        let claims = BASE64_URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).unwrap());
        Ok(format!("{header}.{claims}.fake-signature"))
    }
}

#[derive(Default)]
struct TransportState {
    responses: VecDeque<std::result::Result<HttpResponse, String>>,
    requests: Vec<(String, ExchangeRequest)>,
}

/// Transport answering from a queue and recording every request.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    state: Arc<Mutex<TransportState>>,
    delay: Option<Duration>,
}

impl RecordingTransport {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }

    pub fn respond_json(&self, status: StatusCode, body: Value) {
        self.respond_raw(status, &body.to_string());
    }

    pub fn respond_raw(&self, status: StatusCode, body: &str) {
        self.state.lock().unwrap().responses.push_back(Ok(HttpResponse {
            status,
            body: body.as_bytes().to_vec(),
        }));
    }

    pub fn fail_transport(&self, message: &str) {
        self.state
            .lock()
            .unwrap()
            .responses
            .push_back(Err(message.to_owned()));
    }

    pub fn requests(&self) -> Vec<(String, ExchangeRequest)> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }
}

impl Transport for RecordingTransport {
    async fn post_json(
        &self,
        url: &str,
        body: &ExchangeRequest,
    ) -> std::result::Result<HttpResponse, ExchangeError> {
        let next = {
            let mut state = self.state.lock().unwrap();
            state.requests.push((url.to_owned(), body.clone()));
            state.responses.pop_front()
        };
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match next {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(ExchangeError::Transport(message.into())),
            None => Err(ExchangeError::Transport("no response queued".into())),
        }
    }
}

pub type TestProvider = TokenProvider<RecordingTransport, FakeSigner, Arc<ManualClock>>;

/// Provider over fakes, with its clock standing at [`t0`].
pub fn test_provider(
    token_uri: &str,
    options: ProviderOptions,
    transport: RecordingTransport,
    signer: FakeSigner,
) -> (TestProvider, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(t0()));
    let provider = TokenProvider::with_parts(
        &credentials_bytes(token_uri),
        options,
        transport,
        signer,
        clock.clone(),
    )
    .expect("provider");
    (provider, clock)
}

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}
