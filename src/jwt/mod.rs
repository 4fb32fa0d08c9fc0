pub mod claims;
pub mod signer;
