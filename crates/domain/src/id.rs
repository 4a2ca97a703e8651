//! Device identifiers shared between lights and groups.
//!
//! Lights and groups live in one numeric namespace on the driver side. Light
//! ids are the bridge's own numbers; group ids are the bridge group number
//! plus [`GROUP_ID_OFFSET`].

use std::fmt;

/// Offset added to bridge group numbers to form a driver device id.
pub const GROUP_ID_OFFSET: u32 = 90_000;

/// Where a command for a driver device id has to be sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeviceTarget {
    /// A single light, addressed by its bridge id.
    Light(String),
    /// A group, addressed by its bridge group number (offset removed).
    Group(u32),
}

impl DeviceTarget {
    /// Route a driver device id.
    ///
    /// Numeric ids at or above the offset are groups. Everything else,
    /// including non-numeric ids, is passed to the light endpoints unchanged.
    #[must_use]
    pub fn from_device_id(device_id: &str) -> Self {
        match device_id.trim().parse::<u32>() {
            Ok(number) if number >= GROUP_ID_OFFSET => Self::Group(number - GROUP_ID_OFFSET),
            _ => Self::Light(device_id.to_string()),
        }
    }

    /// The driver device id this target is known by.
    #[must_use]
    pub fn device_id(&self) -> String {
        match self {
            Self::Light(id) => id.clone(),
            Self::Group(number) => group_device_id(*number),
        }
    }
}

impl fmt::Display for DeviceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light(id) => write!(f, "light {id}"),
            Self::Group(number) => write!(f, "group {number}"),
        }
    }
}

/// Driver device id for a bridge group number.
#[must_use]
pub fn group_device_id(group_number: u32) -> String {
    (u64::from(group_number) + u64::from(GROUP_ID_OFFSET)).to_string()
}
