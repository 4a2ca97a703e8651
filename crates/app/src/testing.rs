//! In-memory port implementations shared by the unit tests.

use std::sync::Mutex;

use huexim_domain::action::LightCommand;
use huexim_domain::error::XimError;
use serde_json::{Value, json};

use crate::ports::{BridgeApi, BridgeInfo, BridgeSession, TokenService};

#[derive(Debug, Clone, PartialEq)]
pub enum BridgeCall {
    ListBridges,
    PressLinkButton(String),
    RegisterUsername(String),
    FetchListing(BridgeSession),
    FetchLight(String),
    FetchGroup(u32),
    SendLightState(String, LightCommand),
    SendGroupAction(u32, LightCommand),
}

pub struct FakeBridge {
    pub calls: Mutex<Vec<BridgeCall>>,
    pub bridges: Mutex<Vec<BridgeInfo>>,
    pub listing: Mutex<Value>,
    pub entry: Mutex<Value>,
    pub username: String,
    pub failure: Mutex<Option<fn() -> XimError>>,
}

impl Default for FakeBridge {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            bridges: Mutex::new(vec![BridgeInfo {
                id: "001788fffe6a2b3c".to_string(),
                internal_ip: Some("192.168.1.20".to_string()),
            }]),
            listing: Mutex::new(json!({})),
            entry: Mutex::new(json!({})),
            username: "registered-user".to_string(),
            failure: Mutex::new(None),
        }
    }
}

impl FakeBridge {
    pub fn with_listing(listing: Value) -> Self {
        let bridge = Self::default();
        *bridge.listing.lock().unwrap() = listing;
        bridge
    }

    pub fn with_entry(entry: Value) -> Self {
        let bridge = Self::default();
        *bridge.entry.lock().unwrap() = entry;
        bridge
    }

    pub fn failing(failure: fn() -> XimError) -> Self {
        let bridge = Self::default();
        *bridge.failure.lock().unwrap() = Some(failure);
        bridge
    }

    pub fn calls(&self) -> Vec<BridgeCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: BridgeCall) -> Result<(), XimError> {
        self.calls.lock().unwrap().push(call);
        match *self.failure.lock().unwrap() {
            Some(failure) => Err(failure()),
            None => Ok(()),
        }
    }
}

impl BridgeApi for FakeBridge {
    async fn list_bridges(&self, _access_token: &str) -> Result<Vec<BridgeInfo>, XimError> {
        self.record(BridgeCall::ListBridges)?;
        Ok(self.bridges.lock().unwrap().clone())
    }

    async fn press_link_button(&self, _access_token: &str, bridge_id: &str) -> Result<(), XimError> {
        self.record(BridgeCall::PressLinkButton(bridge_id.to_string()))
    }

    async fn register_username(
        &self,
        _access_token: &str,
        bridge_id: &str,
    ) -> Result<String, XimError> {
        self.record(BridgeCall::RegisterUsername(bridge_id.to_string()))?;
        Ok(self.username.clone())
    }

    async fn fetch_listing(&self, session: &BridgeSession) -> Result<Value, XimError> {
        self.record(BridgeCall::FetchListing(session.clone()))?;
        Ok(self.listing.lock().unwrap().clone())
    }

    async fn fetch_light(&self, _session: &BridgeSession, light_id: &str) -> Result<Value, XimError> {
        self.record(BridgeCall::FetchLight(light_id.to_string()))?;
        Ok(self.entry.lock().unwrap().clone())
    }

    async fn fetch_group(&self, _session: &BridgeSession, group: u32) -> Result<Value, XimError> {
        self.record(BridgeCall::FetchGroup(group))?;
        Ok(self.entry.lock().unwrap().clone())
    }

    async fn send_light_state(
        &self,
        _session: &BridgeSession,
        light_id: &str,
        command: &LightCommand,
    ) -> Result<(), XimError> {
        self.record(BridgeCall::SendLightState(light_id.to_string(), command.clone()))
    }

    async fn send_group_action(
        &self,
        _session: &BridgeSession,
        group: u32,
        command: &LightCommand,
    ) -> Result<(), XimError> {
        self.record(BridgeCall::SendGroupAction(group, command.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenCall {
    Fetch(String, String),
    Refresh(String, String),
    Revoke(String),
}

pub struct FakeTokens {
    pub calls: Mutex<Vec<TokenCall>>,
    pub token: Option<String>,
    pub refreshed: Option<String>,
    pub failure: Option<fn() -> XimError>,
}

impl Default for FakeTokens {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            token: Some("vendor-token".to_string()),
            refreshed: Some("refreshed-token".to_string()),
            failure: None,
        }
    }
}

impl FakeTokens {
    pub fn calls(&self) -> Vec<TokenCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: TokenCall) -> Result<(), XimError> {
        self.calls.lock().unwrap().push(call);
        match self.failure {
            Some(failure) => Err(failure()),
            None => Ok(()),
        }
    }
}

impl TokenService for FakeTokens {
    async fn fetch_token(
        &self,
        account_token: &str,
        channel_set: &str,
    ) -> Result<Option<String>, XimError> {
        self.record(TokenCall::Fetch(
            account_token.to_string(),
            channel_set.to_string(),
        ))?;
        Ok(self.token.clone())
    }

    async fn refresh_token(
        &self,
        account_token: &str,
        channel_set: &str,
    ) -> Result<Option<String>, XimError> {
        self.record(TokenCall::Refresh(
            account_token.to_string(),
            channel_set.to_string(),
        ))?;
        Ok(self.refreshed.clone())
    }

    async fn revoke_token(&self, account_token: &str) -> Result<(), XimError> {
        self.record(TokenCall::Revoke(account_token.to_string()))
    }
}
