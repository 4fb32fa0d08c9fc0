//! # Service Account Token Library
//!
//! Issues and caches OAuth2 access tokens and OpenID Connect ID tokens for a
//! service account using the JWT-bearer grant (RFC 7523).
//!
//! Modules:
//! - `credentials`: service-account document parsing
//! - `jwt`: claim set construction and RS256 signing
//! - `exchange`: token endpoint request / response handling
//! - `cache`: token types, expiry arithmetic and cache slots
//! - `provider`: the token provider callers talk to
//! - `config`, `server`, `observability`, `utils`: service plumbing

pub mod cache;
pub mod config;
pub mod credentials;
pub mod error;
pub mod exchange;
pub mod helpers;
pub mod jwt;
pub mod observability;
pub mod provider;
pub mod server;
pub mod utils;

#[cfg(test)]
mod tests;


pub use crate::cache::token::{AccessToken, Expiring, IdToken};
pub use crate::error::{Error, ExchangeError, Result};
pub use crate::provider::{ProviderOptions, TokenProvider};
