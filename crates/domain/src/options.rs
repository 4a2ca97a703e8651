//! Driver options — the object every entry point receives, and the payload
//! handed back through the callback.
//!
//! Fields this crate does not interpret are kept verbatim in `extra` so the
//! response is an augmented copy of what the driver sent.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::action::ActionRequest;
use crate::device::{Device, LightStatus};
use crate::error::XimResult;

/// Keys owned by [`XimResponse`]; stale copies on the input are dropped.
const RESPONSE_KEYS: [&str; 3] = ["result", "list", "groups"];

/// Session state carried between driver calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct XimContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hue_access_token: Option<String>,
    /// Older name of `hue_access_token`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub bridgeid: Option<String>,
    /// Username registered on the bridge; selects the newer URL generation.
    #[serde(
        rename = "userName",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_name: Option<String>,
    /// Last known catalog, keyed by driver device id.
    #[serde(default, deserialize_with = "lenient_catalog")]
    pub lights: BTreeMap<String, Device>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl XimContent {
    /// The vendor access token, whichever name it was stored under.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        non_empty(self.hue_access_token.as_deref()).or(non_empty(self.access_token.as_deref()))
    }

    /// The bridge identifier, if one is stored.
    #[must_use]
    pub fn bridge_id(&self) -> Option<&str> {
        non_empty(self.bridgeid.as_deref())
    }

    /// The registered bridge username, if one is stored.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        non_empty(self.user_name.as_deref())
    }
}

/// Options object supplied by the driver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct XimOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xim_content: Option<XimContent>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub device_id: Option<String>,
    /// Raw requested action; read through [`XimOptions::light_action`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light_action: Option<Value>,
    /// Hub account token, used against the auth service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantum_token: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub xim_channel_set: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl XimOptions {
    /// Parse a driver options document.
    ///
    /// # Errors
    ///
    /// Returns the JSON error when `json` is not a valid options object.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The vendor access token from `xim_content`.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.xim_content.as_ref().and_then(XimContent::token)
    }

    /// The bridge id from `xim_content`.
    #[must_use]
    pub fn bridge_id(&self) -> Option<&str> {
        self.xim_content.as_ref().and_then(XimContent::bridge_id)
    }

    /// The registered bridge username from `xim_content`.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.xim_content.as_ref().and_then(XimContent::username)
    }

    /// The hub account token.
    #[must_use]
    pub fn quantum_token(&self) -> Option<&str> {
        non_empty(self.quantum_token.as_deref())
    }

    /// The target device id.
    #[must_use]
    pub fn device_id(&self) -> Option<&str> {
        non_empty(self.device_id.as_deref())
    }

    /// The requested action, from `light_action` or the older `action` key.
    ///
    /// # Errors
    ///
    /// Returns the JSON error when the action is present but not an action
    /// object.
    pub fn light_action(&self) -> Result<Option<ActionRequest>, serde_json::Error> {
        self.light_action
            .as_ref()
            .or_else(|| self.extra.get("action").filter(|value| !value.is_null()))
            .map(ActionRequest::deserialize)
            .transpose()
    }

    /// Last known status of a device, from the stored catalog.
    #[must_use]
    pub fn known_status(&self, device_id: &str) -> Option<&LightStatus> {
        self.xim_content
            .as_ref()?
            .lights
            .get(device_id)
            .map(|device| &device.light_status)
    }
}

/// Payload handed to the driver callback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XimResponse {
    #[serde(flatten)]
    pub options: XimOptions,
    pub result: XimResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list: Option<Vec<Device>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<Device>>,
}

impl XimResponse {
    /// Start a response from a fresh copy of the caller's options.
    #[must_use]
    pub fn from_options(options: &XimOptions, result: XimResult) -> Self {
        let mut options = options.clone();
        for key in RESPONSE_KEYS {
            options.extra.remove(key);
        }
        Self {
            options,
            result,
            list: None,
            groups: None,
        }
    }

    /// Mutable access to `xim_content`, created empty when absent.
    pub fn content_mut(&mut self) -> &mut XimContent {
        self.options.xim_content.get_or_insert_with(XimContent::default)
    }

    /// Render as a JSON value.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if serialization fails.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

/// Older drivers stored `lights` as an array, or stored half-built entries;
/// anything that is not a readable device is dropped.
fn lenient_catalog<'de, D>(deserializer: D) -> Result<BTreeMap<String, Device>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(Value::Object(entries)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(BTreeMap::new());
    };
    Ok(entries
        .into_iter()
        .filter_map(|(key, value)| Device::deserialize(value).ok().map(|device| (key, device)))
        .collect())
}
