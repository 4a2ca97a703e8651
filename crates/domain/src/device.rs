//! Device — the canonical shape of a light or group reported to the driver.

use serde::{Deserialize, Serialize};

/// Capability class of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightType {
    /// Color-capable (may still be temperature-only, see [`VendorType`]).
    #[default]
    Color,
    /// Brightness only.
    Dimmer,
    /// On/off only.
    White,
}

impl LightType {
    /// Whether devices of this type accept brightness.
    #[must_use]
    pub fn supports_brightness(self) -> bool {
        !matches!(self, Self::White)
    }
}

impl std::fmt::Display for LightType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Color => f.write_str("color"),
            Self::Dimmer => f.write_str("dimmer"),
            Self::White => f.write_str("white"),
        }
    }
}

/// The vendor's free-text device type, classified.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VendorType {
    DimmableLight,
    DimmablePlugIn,
    OnOffLight,
    OnOffPlugIn,
    ColorTemperatureLight,
    ColorLight,
    ExtendedColorLight,
    /// Anything else; treated as full color.
    Other(String),
}

impl VendorType {
    /// Classify the bridge's `type` string (case-insensitive).
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "dimmable light" => Self::DimmableLight,
            "dimmable plug-in unit" => Self::DimmablePlugIn,
            "on/off light" => Self::OnOffLight,
            "on/off plug-in unit" => Self::OnOffPlugIn,
            "color temperature light" => Self::ColorTemperatureLight,
            "color light" => Self::ColorLight,
            "extended color light" => Self::ExtendedColorLight,
            _ => Self::Other(raw.to_string()),
        }
    }

    /// The driver-facing capability class.
    #[must_use]
    pub fn light_type(&self) -> LightType {
        match self {
            Self::DimmableLight | Self::DimmablePlugIn => LightType::Dimmer,
            Self::OnOffLight | Self::OnOffPlugIn => LightType::White,
            Self::ColorTemperatureLight
            | Self::ColorLight
            | Self::ExtendedColorLight
            | Self::Other(_) => LightType::Color,
        }
    }

    /// Whether hue and saturation are meaningful for this device.
    ///
    /// Color-class devices qualify unless they are plug-ins or
    /// temperature-only lamps.
    #[must_use]
    pub fn supports_hue(&self) -> bool {
        self.light_type() == LightType::Color
            && !matches!(
                self,
                Self::ColorTemperatureLight | Self::DimmablePlugIn | Self::OnOffPlugIn
            )
    }

    /// Whether this is a pure on/off plug-in unit.
    ///
    /// These stay controllable but are left out of the discoverable list.
    #[must_use]
    pub fn is_on_off_plug_in(&self) -> bool {
        matches!(self, Self::OnOffPlugIn)
    }
}

/// Current state of a device, in caller-facing ranges.
///
/// Fields a device type cannot honour are absent rather than zero.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LightStatus {
    #[serde(default)]
    pub onoff: bool,
    /// Degrees in `[0, 360)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hue: Option<u16>,
    /// Percent in `[0, 100]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturation: Option<u8>,
    /// Percent in `[0, 100]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<u8>,
}

impl LightStatus {
    /// A status carrying only the power state.
    #[must_use]
    pub fn power(onoff: bool) -> Self {
        Self {
            onoff,
            ..Self::default()
        }
    }
}

/// A light or group as reported to the driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub device_id: String,
    #[serde(default)]
    pub device_name: String,
    #[serde(default)]
    pub is_group: bool,
    #[serde(default)]
    pub light_type: LightType,
    #[serde(default)]
    pub infrared_support: bool,
    #[serde(default)]
    pub native_toggle_support: bool,
    #[serde(default)]
    pub light_status: LightStatus,
}
