// umami-api: Async Rust client for the Umami recipe-sharing service API

pub mod client;
pub mod credential;
pub mod endpoints;
pub mod error;
pub mod models;
pub mod normalize;
pub mod transport;

pub use client::ApiClient;
pub use credential::CredentialCell;
pub use error::Error;
pub use transport::TransportConfig;
