//! Light actions — translating a driver request into a bridge command body.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::color::{
    ColorPoint, degrees_to_native_hue, hex_to_rgb, named_color_to_rgb, percent_to_native_level,
    rgb_to_xy,
};
use crate::device::LightStatus;
use crate::error::ColorError;

/// The sparse set of changes a driver asks for.
///
/// At most one color source is honoured, in priority order: the
/// `hue`+`brightness`+`saturation` triple, then `rgb`, then
/// `short_color_code`.
///
/// Drivers are loosely typed: `onoff` and `toggle` take any truthy value,
/// numeric fields take floats or numeric strings and are truncated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    #[serde(default, deserialize_with = "truthy", skip_serializing_if = "Option::is_none")]
    pub onoff: Option<bool>,
    #[serde(default, deserialize_with = "truthy", skip_serializing_if = "Option::is_none")]
    pub toggle: Option<bool>,
    /// Degrees.
    #[serde(default, deserialize_with = "truncated", skip_serializing_if = "Option::is_none")]
    pub hue: Option<u32>,
    /// Percent.
    #[serde(default, deserialize_with = "truncated", skip_serializing_if = "Option::is_none")]
    pub brightness: Option<u32>,
    /// Percent.
    #[serde(default, deserialize_with = "truncated", skip_serializing_if = "Option::is_none")]
    pub saturation: Option<u32>,
    /// `#RGB` or `#RRGGBB`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rgb: Option<String>,
    /// CSS color keyword.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_color_code: Option<String>,
}

/// Body of a light-state or group-action command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LightCommand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hue: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xy: Option<ColorPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bri: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sat: Option<u8>,
}

impl LightCommand {
    /// Whether the command changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl ActionRequest {
    /// Build the native command.
    ///
    /// `current` is the last known status of the target, needed to resolve
    /// `toggle`. Without it a toggle emits no `on` field.
    ///
    /// # Errors
    ///
    /// Returns a [`ColorError`] when the selected color source cannot be
    /// parsed.
    pub fn to_command(&self, current: Option<&LightStatus>) -> Result<LightCommand, ColorError> {
        let mut command = LightCommand {
            on: self.power(current),
            ..LightCommand::default()
        };

        if let (Some(hue), Some(_), Some(_)) = (self.hue, self.brightness, self.saturation) {
            command.hue = Some(degrees_to_native_hue(hue));
        } else if let Some(hex) = &self.rgb {
            command.xy = Some(rgb_to_xy(hex_to_rgb(hex)?));
        } else if let Some(name) = &self.short_color_code {
            command.xy = Some(rgb_to_xy(named_color_to_rgb(name)?));
        }

        command.bri = self.brightness.map(percent_to_native_level);
        command.sat = self.saturation.map(percent_to_native_level);
        Ok(command)
    }

    fn power(&self, current: Option<&LightStatus>) -> Option<bool> {
        if let Some(onoff) = self.onoff {
            return Some(onoff);
        }
        match (self.toggle, current) {
            (Some(true), Some(status)) => Some(!status.onoff),
            _ => None,
        }
    }
}

fn truthy<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::Bool(flag)) => Some(flag),
        Some(Value::Number(number)) => Some(number.as_f64().is_some_and(|n| n != 0.0)),
        Some(Value::String(text)) => Some(!text.is_empty()),
        Some(Value::Array(_) | Value::Object(_)) => Some(true),
    })
}

/// Negative values clamp to zero.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn truncated<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let number = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    number
        .filter(|n| n.is_finite())
        .map(|n| Some(n.trunc() as u32))
        .ok_or_else(|| D::Error::custom("expected a number"))
}
