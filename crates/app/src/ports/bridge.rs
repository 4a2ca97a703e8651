//! Bridge port — the vendor cloud endpoints that reach a Hue bridge.

use std::future::Future;

use huexim_domain::action::LightCommand;
use huexim_domain::error::XimError;
use serde_json::Value;

/// Credentials and addressing for one linked bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeSession {
    pub access_token: String,
    pub bridge_id: String,
    /// Username registered on the bridge. Its presence selects the newer
    /// URL generation.
    pub username: Option<String>,
}

/// A bridge attached to the vendor account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeInfo {
    pub id: String,
    pub internal_ip: Option<String>,
}

/// Vendor cloud access to a bridge.
///
/// Implementations classify every vendor failure into an [`XimError`]
/// before returning; callers never see transport types.
pub trait BridgeApi: Send + Sync {
    /// Bridges attached to the account owning `access_token`.
    fn list_bridges(
        &self,
        access_token: &str,
    ) -> impl Future<Output = Result<Vec<BridgeInfo>, XimError>> + Send;

    /// Press the virtual link button so a new username can be registered.
    fn press_link_button(
        &self,
        access_token: &str,
        bridge_id: &str,
    ) -> impl Future<Output = Result<(), XimError>> + Send;

    /// Register this application on the bridge and return its username.
    fn register_username(
        &self,
        access_token: &str,
        bridge_id: &str,
    ) -> impl Future<Output = Result<String, XimError>> + Send;

    /// Raw listing of lights (and groups, where the URL generation has them).
    fn fetch_listing(
        &self,
        session: &BridgeSession,
    ) -> impl Future<Output = Result<Value, XimError>> + Send;

    /// Raw entry for one light.
    fn fetch_light(
        &self,
        session: &BridgeSession,
        light_id: &str,
    ) -> impl Future<Output = Result<Value, XimError>> + Send;

    /// Raw entry for one group.
    fn fetch_group(
        &self,
        session: &BridgeSession,
        group: u32,
    ) -> impl Future<Output = Result<Value, XimError>> + Send;

    /// Apply a command to one light.
    fn send_light_state(
        &self,
        session: &BridgeSession,
        light_id: &str,
        command: &LightCommand,
    ) -> impl Future<Output = Result<(), XimError>> + Send;

    /// Apply a command to every light of a group.
    fn send_group_action(
        &self,
        session: &BridgeSession,
        group: u32,
        command: &LightCommand,
    ) -> impl Future<Output = Result<(), XimError>> + Send;
}

impl<T: BridgeApi> BridgeApi for std::sync::Arc<T> {
    fn list_bridges(
        &self,
        access_token: &str,
    ) -> impl Future<Output = Result<Vec<BridgeInfo>, XimError>> + Send {
        (**self).list_bridges(access_token)
    }

    fn press_link_button(
        &self,
        access_token: &str,
        bridge_id: &str,
    ) -> impl Future<Output = Result<(), XimError>> + Send {
        (**self).press_link_button(access_token, bridge_id)
    }

    fn register_username(
        &self,
        access_token: &str,
        bridge_id: &str,
    ) -> impl Future<Output = Result<String, XimError>> + Send {
        (**self).register_username(access_token, bridge_id)
    }

    fn fetch_listing(
        &self,
        session: &BridgeSession,
    ) -> impl Future<Output = Result<Value, XimError>> + Send {
        (**self).fetch_listing(session)
    }

    fn fetch_light(
        &self,
        session: &BridgeSession,
        light_id: &str,
    ) -> impl Future<Output = Result<Value, XimError>> + Send {
        (**self).fetch_light(session, light_id)
    }

    fn fetch_group(
        &self,
        session: &BridgeSession,
        group: u32,
    ) -> impl Future<Output = Result<Value, XimError>> + Send {
        (**self).fetch_group(session, group)
    }

    fn send_light_state(
        &self,
        session: &BridgeSession,
        light_id: &str,
        command: &LightCommand,
    ) -> impl Future<Output = Result<(), XimError>> + Send {
        (**self).send_light_state(session, light_id, command)
    }

    fn send_group_action(
        &self,
        session: &BridgeSession,
        group: u32,
        command: &LightCommand,
    ) -> impl Future<Output = Result<(), XimError>> + Send {
        (**self).send_group_action(session, group, command)
    }
}
