//! Service-account credential document and the record parsed from it.

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, error};

use crate::error::{Error, Result};
use crate::jwt::signer::Signer;

/// Service-account JSON document as issued by the identity provider.
///
/// Every key must be present for the document to be accepted. The fields stay
/// optional here so a rejection can name the key that is missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceAccountDocument {
    #[serde(rename = "type")]
    pub credential_type: Option<String>,
    pub project_id: Option<String>,
    pub private_key_id: Option<String>,
    pub private_key: Option<String>,
    pub client_email: Option<String>,
    pub client_id: Option<String>,
    pub auth_uri: Option<String>,
    pub token_uri: Option<String>,
    pub auth_provider_x509_cert_url: Option<String>,
    pub client_x509_cert_url: Option<String>,
}

/// Parsed credentials, immutable once built.
///
/// `K` is the signer's handle to the loaded private key.
pub struct CredentialRecord<K> {
    pub client_email: String,
    pub key: K,
    pub token_uri: String,
    pub project_id: String,
    pub private_key_id: String,
}

impl<K> CredentialRecord<K> {
    /// Parse a credential document and load its key through `signer`.
    pub fn parse<S>(document: &[u8], signer: &S) -> Result<Self>
    where
        S: Signer<Key = K>,
    {
        let document: ServiceAccountDocument = serde_json::from_slice(document)
            .map_err(|e| Error::MalformedCredentials(format!("invalid credential document: {e}")))?;

        let client_email = required("client_email", document.client_email)?;
        let private_key = required("private_key", document.private_key)?;
        let token_uri = required("token_uri", document.token_uri)?;
        present("type", document.credential_type)?;
        let project_id = present("project_id", document.project_id)?;
        let private_key_id = present("private_key_id", document.private_key_id)?;
        present("client_id", document.client_id)?;
        present("auth_uri", document.auth_uri)?;
        present("auth_provider_x509_cert_url", document.auth_provider_x509_cert_url)?;
        present("client_x509_cert_url", document.client_x509_cert_url)?;

        let key = signer.load_key(&private_key).inspect_err(|e| {
            error!("loading key for '{}' failed: {}", client_email, e);
        })?;
        debug!("loaded credentials for '{}'", client_email);

        Ok(Self {
            client_email,
            key,
            token_uri,
            project_id,
            private_key_id,
        })
    }

    /// Read the credential document from disk, then [`CredentialRecord::parse`] it.
    pub async fn load<S, P>(path: P, signer: &S) -> Result<Self>
    where
        S: Signer<Key = K>,
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let document = tokio::fs::read(path).await.map_err(|e| {
            Error::MalformedCredentials(format!("cannot read '{}': {e}", path.display()))
        })?;
        Self::parse(&document, signer)
    }
}

/// Present and non-blank; for the fields the exchange depends on.
fn required(field: &str, value: Option<String>) -> Result<String> {
    present(field, value.filter(|v| !v.trim().is_empty()))
}

fn present(field: &str, value: Option<String>) -> Result<String> {
    value.ok_or_else(|| Error::MalformedCredentials(format!("missing required field '{field}'")))
}

impl<K> std::fmt::Debug for CredentialRecord<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("client_email", &self.client_email)
            .field("key", &"[censored]")
            .field("token_uri", &self.token_uri)
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .finish()
    }
}
