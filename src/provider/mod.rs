//! Token provider: the entry point callers use to obtain tokens.

pub mod options;
pub mod token_provider;

pub use options::ProviderOptions;
pub use token_provider::TokenProvider;
