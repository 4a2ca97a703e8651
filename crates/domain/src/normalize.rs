//! Device normalizer — turns a raw bridge listing into the driver catalog.
//!
//! The bridge cloud has answered discovery in three shapes over time:
//!
//! | Shape | Example |
//! |-------|---------|
//! | Flat light map | `{"1": {...}, "2": {...}}` |
//! | Full config | `{"lights": {...}, "groups": {...}}` (groups optional) |
//! | Light array | `[{"id": "1", ...}, ...]` |
//!
//! All three produce the same [`Catalog`].

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::color::{native_hue_to_degrees, native_level_to_percent};
use crate::device::{Device, LightStatus, LightType, VendorType};
use crate::error::XimError;
use crate::id::group_device_id;

/// The normalized result of one discovery call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    /// Every controllable device keyed by driver device id, groups included.
    pub lights: BTreeMap<String, Device>,
    /// Lights shown to the user (on/off plug-in units left out).
    pub list: Vec<Device>,
    /// Groups, under their offset ids.
    pub groups: Vec<Device>,
    /// Entries that could not be read, as `(key, reason)`.
    pub skipped: Vec<(String, String)>,
}

#[derive(Debug, Default, Deserialize)]
struct RawState {
    #[serde(default)]
    on: Option<bool>,
    #[serde(default)]
    bri: Option<u32>,
    #[serde(default)]
    hue: Option<u32>,
    #[serde(default)]
    sat: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawLight {
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    state: RawState,
}

#[derive(Debug, Deserialize)]
struct RawGroup {
    #[serde(default)]
    name: String,
}

/// Normalize a discovery payload in any of the supported shapes.
///
/// # Errors
///
/// Returns [`XimError::RequestFailed`] when the payload is neither an object
/// nor an array. Individual unreadable entries are recorded in
/// [`Catalog::skipped`] instead of failing the whole listing.
pub fn normalize_listing(payload: &Value) -> Result<Catalog, XimError> {
    let mut catalog = Catalog::default();

    match payload {
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                match item.get("id").and_then(id_to_string) {
                    Some(id) => catalog.add_light(&id, item),
                    None => catalog.skip(index.to_string(), "light without id"),
                }
            }
        }
        Value::Object(root) => match root.get("lights") {
            Some(Value::Object(lights)) => {
                catalog.add_lights(lights);
                if let Some(Value::Object(groups)) = root.get("groups") {
                    catalog.add_groups(groups);
                }
            }
            _ => catalog.add_lights(root),
        },
        other => {
            return Err(XimError::request_failed(format!(
                "unexpected listing payload: {}",
                kind_of(other)
            )));
        }
    }

    catalog.list.sort_by(|a, b| numeric_order(&a.device_id, &b.device_id));
    catalog
        .groups
        .sort_by(|a, b| numeric_order(&a.device_id, &b.device_id));
    Ok(catalog)
}

/// Normalize a single light entry.
///
/// # Errors
///
/// Returns [`XimError::RequestFailed`] when the entry is not a light object.
pub fn normalize_light(device_id: &str, raw: &Value) -> Result<Device, XimError> {
    let light: RawLight = RawLight::deserialize(raw).map_err(XimError::request_failed)?;
    Ok(light_device(device_id, &light))
}

/// Normalize a single group entry under its offset id.
///
/// # Errors
///
/// Returns [`XimError::RequestFailed`] when the entry is not a group object.
pub fn normalize_group(group_number: u32, raw: &Value) -> Result<Device, XimError> {
    let group: RawGroup = RawGroup::deserialize(raw).map_err(XimError::request_failed)?;
    Ok(group_device(group_number, group))
}

impl Catalog {
    fn add_lights(&mut self, lights: &Map<String, Value>) {
        for (id, raw) in lights {
            self.add_light(id, raw);
        }
    }

    fn add_light(&mut self, id: &str, raw: &Value) {
        let light = match RawLight::deserialize(raw) {
            Ok(light) => light,
            Err(err) => return self.skip(id.to_string(), err.to_string()),
        };
        let vendor = VendorType::parse(&light.kind);
        let device = light_device(id, &light);
        if !vendor.is_on_off_plug_in() {
            self.list.push(device.clone());
        }
        self.lights.insert(device.device_id.clone(), device);
    }

    fn add_groups(&mut self, groups: &Map<String, Value>) {
        for (key, raw) in groups {
            let Ok(number) = key.trim().parse::<u32>() else {
                self.skip(key.clone(), "group key is not numeric");
                continue;
            };
            match RawGroup::deserialize(raw) {
                Ok(group) => {
                    let device = group_device(number, group);
                    self.groups.push(device.clone());
                    self.lights.insert(device.device_id.clone(), device);
                }
                Err(err) => self.skip(key.clone(), err.to_string()),
            }
        }
    }

    fn skip(&mut self, key: String, reason: impl Into<String>) {
        self.skipped.push((key, reason.into()));
    }
}

fn light_device(device_id: &str, light: &RawLight) -> Device {
    let vendor = VendorType::parse(&light.kind);
    let light_type = vendor.light_type();
    let state = &light.state;

    let mut status = LightStatus::power(state.on.unwrap_or(false));
    if vendor.supports_hue() {
        status.hue = state.hue.map(native_hue_to_degrees);
        status.saturation = state.sat.map(native_level_to_percent);
    }
    if light_type.supports_brightness() {
        status.brightness = state.bri.map(native_level_to_percent);
    }

    Device {
        device_id: device_id.to_string(),
        device_name: light.name.clone(),
        is_group: false,
        light_type,
        infrared_support: false,
        native_toggle_support: false,
        light_status: status,
    }
}

fn group_device(group_number: u32, group: RawGroup) -> Device {
    Device {
        device_id: group_device_id(group_number),
        device_name: group.name,
        is_group: true,
        light_type: LightType::Color,
        infrared_support: false,
        native_toggle_support: false,
        light_status: LightStatus::power(true),
    }
}

fn id_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn numeric_order(a: &str, b: &str) -> std::cmp::Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        (Ok(_), Err(_)) => std::cmp::Ordering::Less,
        (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
