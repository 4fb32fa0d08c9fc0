pub mod client;
pub mod transport;
