//! Auth service client — the [`TokenService`] port over HTTP.

use huexim_app::ports::TokenService;
use huexim_domain::error::XimError;
use reqwest::Method;
use serde_json::Value;

use crate::client::{Scope, send};
use crate::config::HueCloudConfig;
use crate::error::HueCloudError;

/// The vendor token in an auth service answer.
///
/// The service answers `{"access_token": ..}`, or `{"result": "false"}` when
/// it holds nothing for the channel set.
fn token_from(body: &Value) -> Option<String> {
    let refused = match body.get("result") {
        Some(Value::String(result)) => result == "false",
        Some(Value::Bool(result)) => !result,
        _ => false,
    };
    if refused {
        return None;
    }
    body.get("access_token")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// HTTP client for the auth service.
#[derive(Debug, Clone)]
pub struct AuthServiceClient {
    http: reqwest::Client,
    base_url: String,
}

impl AuthServiceClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HueCloudError::Http`] when the HTTP client cannot be built.
    pub fn new(config: &HueCloudConfig) -> Result<Self, HueCloudError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            http,
            base_url: config.auth_url.trim_end_matches('/').to_string(),
        })
    }

    async fn call(
        &self,
        method: Method,
        path: &str,
        account_token: &str,
    ) -> Result<Value, XimError> {
        let url = format!("{}{path}", self.base_url);
        send(&self.http, method, &url, account_token, None, Scope::Account)
            .await
            .map_err(HueCloudError::into_domain)
    }
}

impl TokenService for AuthServiceClient {
    async fn fetch_token(
        &self,
        account_token: &str,
        channel_set: &str,
    ) -> Result<Option<String>, XimError> {
        let path = format!("/token/hue/{channel_set}");
        let body = self.call(Method::GET, &path, account_token).await?;
        let token = token_from(&body);
        tracing::debug!(found = token.is_some(), "vendor token fetched");
        Ok(token)
    }

    async fn refresh_token(
        &self,
        account_token: &str,
        channel_set: &str,
    ) -> Result<Option<String>, XimError> {
        let path = format!("/refresh_token/hue/{channel_set}");
        let body = self.call(Method::POST, &path, account_token).await?;
        Ok(token_from(&body))
    }

    async fn revoke_token(&self, account_token: &str) -> Result<(), XimError> {
        self.call(Method::DELETE, "/token/hue", account_token).await?;
        Ok(())
    }
}
