//! Hue cloud adapter configuration.

use std::time::Duration;

use serde::Deserialize;

/// Configuration for the vendor cloud and the token service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HueCloudConfig {
    /// Base URL of the vendor cloud API.
    pub api_base_url: String,
    /// Base URL of the auth service holding vendor tokens.
    pub auth_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Application name sent when registering a bridge username.
    pub device_type: String,
}

impl Default for HueCloudConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.meethue.com".to_string(),
            auth_url: "http://localhost:8080".to_string(),
            request_timeout_secs: 30,
            device_type: "huexim#driver".to_string(),
        }
    }
}

impl HueCloudConfig {
    /// The request timeout as a [`Duration`].
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
