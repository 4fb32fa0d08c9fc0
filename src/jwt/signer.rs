use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

use crate::error::{Error, Result};
use crate::jwt::claims::{ClaimSet, JwtHeader, JWT_ALGORITHM};

/// Signing capability used to turn a claim set into a compact JWS.
pub trait Signer: Send + Sync {
    /// Opaque handle to loaded key material.
    type Key: Send + Sync;

    /// Parse PEM key material. Failures are [`Error::MalformedCredentials`].
    fn load_key(&self, private_key: &str) -> Result<Self::Key>;

    /// Sign `header.claims`. Failures are [`Error::SigningFailed`].
    fn sign(&self, header: &JwtHeader, claims: &ClaimSet, key: &Self::Key) -> Result<String>;
}

/// RS256 signer backed by `jsonwebtoken`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rs256Signer;

impl Signer for Rs256Signer {
    type Key = EncodingKey;

    fn load_key(&self, private_key: &str) -> Result<EncodingKey> {
        EncodingKey::from_rsa_pem(private_key.as_bytes())
            .map_err(|e| Error::MalformedCredentials(format!("cannot load private_key: {e}")))
    }

    fn sign(&self, header: &JwtHeader, claims: &ClaimSet, key: &EncodingKey) -> Result<String> {
        if header.alg != JWT_ALGORITHM {
            return Err(Error::SigningFailed(format!(
                "unsupported algorithm '{}'",
                header.alg
            )));
        }
        let mut jws_header = Header::new(Algorithm::RS256);
        jws_header.typ = Some(header.typ.to_owned());
        encode(&jws_header, claims, key).map_err(|e| Error::SigningFailed(e.to_string()))
    }
}
