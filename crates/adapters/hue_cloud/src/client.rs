//! Vendor cloud client — the [`BridgeApi`] port over HTTP.

use huexim_app::ports::{BridgeApi, BridgeInfo, BridgeSession};
use huexim_domain::action::LightCommand;
use huexim_domain::error::XimError;
use huexim_domain::fault;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::config::HueCloudConfig;
use crate::error::HueCloudError;
use crate::routes::{self, BridgeRoutes};

/// What a request addresses; decides what a 404 means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scope {
    /// Account-level endpoints (bridge listing, auth service).
    Account,
    /// Paths under one bridge; a 404 means the vendor does not know it.
    Bridge,
}

/// Turn a raw HTTP answer into a JSON body or a classified error.
///
/// A success status does not imply success: the vendor reports faults and
/// bridge errors inside regular 200 bodies.
pub(crate) fn classify_response(
    status: u16,
    body: &str,
    scope: Scope,
) -> Result<Value, HueCloudError> {
    if status == 504 {
        return Err(HueCloudError::Domain(XimError::BridgeTimeout));
    }
    let success = (200..300).contains(&status);

    match serde_json::from_str::<Value>(body) {
        Ok(value) => {
            if let Some(err) = fault::classify_body(&value) {
                return Err(HueCloudError::Domain(err));
            }
            if success {
                Ok(value)
            } else {
                Err(unexpected_status(status, body, scope))
            }
        }
        Err(err) => {
            if let Some(known) = fault::classify_text(body) {
                Err(HueCloudError::Domain(known))
            } else if !success {
                Err(unexpected_status(status, body, scope))
            } else if body.trim().is_empty() {
                Ok(Value::Null)
            } else {
                Err(HueCloudError::PayloadParse(err))
            }
        }
    }
}

fn unexpected_status(status: u16, body: &str, scope: Scope) -> HueCloudError {
    if status == 404 && scope == Scope::Bridge {
        return HueCloudError::Domain(XimError::InvalidBridge);
    }
    HueCloudError::Status {
        status,
        body: body.trim().to_string(),
    }
}

/// Send one request and classify the answer.
pub(crate) async fn send(
    http: &reqwest::Client,
    method: Method,
    url: &str,
    bearer: &str,
    body: Option<&Value>,
    scope: Scope,
) -> Result<Value, HueCloudError> {
    let mut request = http.request(method, url).bearer_auth(bearer);
    if let Some(body) = body {
        request = request.json(body);
    }
    let response = request.send().await?;
    let status = response.status().as_u16();
    let text = response.text().await?;
    tracing::debug!(status, "vendor answered");
    classify_response(status, &text, scope)
}

#[derive(Debug, Deserialize)]
struct RawBridge {
    id: String,
    #[serde(default)]
    internalipaddress: Option<String>,
}

/// Bridges from a listing answer; anything that is not a list of bridges
/// means the account has none.
fn parse_bridges(body: Value) -> Vec<BridgeInfo> {
    let Value::Array(items) = body else {
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<RawBridge>(item).ok())
        .map(|raw| BridgeInfo {
            id: raw.id,
            internal_ip: raw.internalipaddress,
        })
        .collect()
}

/// Registration answers `[{"success": {"username": ..}}]`.
fn parse_username(body: &Value) -> Option<String> {
    body.as_array()?
        .iter()
        .find_map(|item| item.pointer("/success/username")?.as_str())
        .map(str::to_string)
}

/// HTTP client for the vendor cloud.
#[derive(Debug, Clone)]
pub struct HueCloudClient {
    http: reqwest::Client,
    base_url: String,
    device_type: String,
}

impl HueCloudClient {
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
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            device_type: config.device_type.clone(),
        })
    }

    async fn call(
        &self,
        method: Method,
        path: &str,
        access_token: &str,
        body: Option<&Value>,
        scope: Scope,
    ) -> Result<Value, XimError> {
        let url = format!("{}{path}", self.base_url);
        send(&self.http, method, &url, access_token, body, scope)
            .await
            .map_err(HueCloudError::into_domain)
    }

    async fn put_state(
        &self,
        session: &BridgeSession,
        path: &str,
        command: &LightCommand,
    ) -> Result<(), XimError> {
        let body = serde_json::to_value(command).map_err(XimError::request_failed)?;
        self.call(
            Method::PUT,
            path,
            &session.access_token,
            Some(&body),
            Scope::Bridge,
        )
        .await?;
        Ok(())
    }
}

impl BridgeApi for HueCloudClient {
    async fn list_bridges(&self, access_token: &str) -> Result<Vec<BridgeInfo>, XimError> {
        let body = self
            .call(Method::GET, routes::BRIDGES, access_token, None, Scope::Account)
            .await?;
        let bridges = parse_bridges(body);
        tracing::debug!(count = bridges.len(), "bridges listed");
        Ok(bridges)
    }

    async fn press_link_button(&self, access_token: &str, bridge_id: &str) -> Result<(), XimError> {
        let body = json!({ "linkbutton": true });
        self.call(
            Method::PUT,
            &routes::link_button(bridge_id),
            access_token,
            Some(&body),
            Scope::Bridge,
        )
        .await?;
        tracing::debug!(bridge_id = %bridge_id, "link button pressed");
        Ok(())
    }

    async fn register_username(
        &self,
        access_token: &str,
        bridge_id: &str,
    ) -> Result<String, XimError> {
        let body = json!({ "devicetype": self.device_type });
        let answer = self
            .call(
                Method::POST,
                &routes::register(bridge_id),
                access_token,
                Some(&body),
                Scope::Bridge,
            )
            .await?;
        parse_username(&answer)
            .ok_or_else(|| XimError::request_failed("bridge registration returned no username"))
    }

    async fn fetch_listing(&self, session: &BridgeSession) -> Result<Value, XimError> {
        let routes = BridgeRoutes::for_session(session);
        tracing::debug!(generation = %routes.generation(), "fetching bridge listing");
        self.call(
            Method::GET,
            &routes.listing(),
            &session.access_token,
            None,
            Scope::Bridge,
        )
        .await
    }

    async fn fetch_light(&self, session: &BridgeSession, light_id: &str) -> Result<Value, XimError> {
        let path = BridgeRoutes::for_session(session).light(light_id);
        self.call(Method::GET, &path, &session.access_token, None, Scope::Bridge)
            .await
    }

    async fn fetch_group(&self, session: &BridgeSession, group: u32) -> Result<Value, XimError> {
        let path = BridgeRoutes::for_session(session).group(group);
        self.call(Method::GET, &path, &session.access_token, None, Scope::Bridge)
            .await
    }

    async fn send_light_state(
        &self,
        session: &BridgeSession,
        light_id: &str,
        command: &LightCommand,
    ) -> Result<(), XimError> {
        let path = BridgeRoutes::for_session(session).light_state(light_id);
        self.put_state(session, &path, command).await
    }

    async fn send_group_action(
        &self,
        session: &BridgeSession,
        group: u32,
        command: &LightCommand,
    ) -> Result<(), XimError> {
        let path = BridgeRoutes::for_session(session).group_action(group);
        self.put_state(session, &path, command).await
    }
}
