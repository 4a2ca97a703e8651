//! # huexim-adapter-hue-cloud
//!
//! Hue cloud adapter — implements the `BridgeApi` and `TokenService` ports
//! over HTTP.
//!
//! ## Responsibilities
//! - Build the bridge routes for both URL generations (with and without a
//!   registered username)
//! - Send requests with the vendor or account bearer token
//! - Classify every vendor answer (status, fault payload, bridge error,
//!   plain-text timeout) into the domain error taxonomy
//!
//! ## Dependency rule
//! Depends on `huexim-domain` and `huexim-app` (for port traits).

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod routes;

pub use auth::AuthServiceClient;
pub use client::HueCloudClient;
pub use config::HueCloudConfig;
pub use error::HueCloudError;
