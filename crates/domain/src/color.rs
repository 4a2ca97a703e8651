//! Color model — conversions between caller-facing colors and the values a
//! Hue bridge understands.
//!
//! Callers describe colors as hex strings, CSS keywords, or hue/saturation/
//! brightness percentages. The bridge wants CIE 1931 `xy` chromaticity or its
//! own integer ranges (`hue` in `0..=65535`, `sat`/`bri` in `0..=254`).
//!
//! All integer rescaling truncates toward zero.

mod named;

use serde::{Deserialize, Serialize};

use crate::error::ColorError;

/// Highest native hue value accepted in a command.
pub const NATIVE_HUE_MAX: u32 = 65_535;
/// Native hue range used when reporting state.
pub const REPORTED_HUE_MAX: u32 = 65_534;
/// Native saturation/brightness range used when reporting state.
pub const REPORTED_LEVEL_MAX: u32 = 254;
/// Native saturation/brightness range used when issuing commands.
pub const COMMAND_LEVEL_MAX: u32 = 255;
/// Degrees in a full hue circle.
pub const DEGREES: u32 = 360;
/// Upper bound of a percentage.
pub const PERCENT: u32 = 100;

/// sRGB → XYZ rows (D50-adapted, as the bridge firmware expects).
const RGB_TO_XYZ: [[f64; 3]; 3] = [
    [0.436_074_7, 0.385_064_9, 0.093_080_4],
    [0.222_504_5, 0.716_878_6, 0.040_616_9],
    [0.013_932_2, 0.097_104_5, 0.714_173_3],
];

/// An 8-bit sRGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// A CIE 1931 chromaticity coordinate.
///
/// Serializes as the two-element array `[x, y]` used in bridge commands.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct ColorPoint {
    pub x: f64,
    pub y: f64,
}

impl From<[f64; 2]> for ColorPoint {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<ColorPoint> for [f64; 2] {
    fn from(point: ColorPoint) -> Self {
        [point.x, point.y]
    }
}

/// Parse `#RGB` or `#RRGGBB` (the leading `#` is optional).
///
/// The short form duplicates each digit, so `#f0a` equals `#ff00aa`.
///
/// # Errors
///
/// Returns [`ColorError::InvalidColorFormat`] when the digits are not 3 or 6
/// hexadecimal characters.
pub fn hex_to_rgb(hex: &str) -> Result<Rgb, ColorError> {
    let invalid = || ColorError::InvalidColorFormat(hex.to_string());
    let digits = hex.trim().strip_prefix('#').unwrap_or(hex.trim());
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return Err(invalid()),
    };

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&expanded[range], 16).map_err(|_| invalid())
    };
    Ok(Rgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Look up a CSS color keyword such as `"tomato"`.
///
/// # Errors
///
/// Returns [`ColorError::UnknownColorName`] when the keyword is not in the
/// table.
pub fn named_color_to_rgb(name: &str) -> Result<Rgb, ColorError> {
    named::lookup(name).ok_or_else(|| ColorError::UnknownColorName(name.to_string()))
}

/// sRGB transfer function: companded channel in `[0, 1]` to linear light.
#[must_use]
pub fn gamma_correct(channel: f64) -> f64 {
    if channel > 0.040_45 {
        ((channel + 0.055) / 1.055).powf(2.4)
    } else {
        channel / 12.92
    }
}

/// Convert an sRGB triple to `xy` chromaticity.
///
/// Black has no chromaticity; it maps to `(0, 0)` instead of NaN.
#[must_use]
pub fn rgb_to_xy(rgb: Rgb) -> ColorPoint {
    let linear = [rgb.r, rgb.g, rgb.b].map(|c| gamma_correct(f64::from(c) / 255.0));
    let [x, y, z] = RGB_TO_XYZ.map(|row| {
        row.iter()
            .zip(linear.iter())
            .map(|(weight, channel)| weight * channel)
            .sum::<f64>()
    });

    let sum = x + y + z;
    if sum == 0.0 || !sum.is_finite() {
        return ColorPoint::default();
    }
    ColorPoint {
        x: x / sum,
        y: y / sum,
    }
}

/// Integer rescale `floor(value * to_max / from_max)`.
///
/// Used in both directions: native → percent/degrees when reporting state,
/// percent/degrees → native when issuing commands. A zero `from_max` yields 0.
#[must_use]
pub fn rescale(value: u32, from_max: u32, to_max: u32) -> u32 {
    if from_max == 0 {
        return 0;
    }
    let scaled = u64::from(value) * u64::from(to_max) / u64::from(from_max);
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

/// Reported native hue → degrees, kept inside `[0, 360)`.
#[must_use]
pub fn native_hue_to_degrees(hue: u32) -> u16 {
    let degrees = rescale(hue, REPORTED_HUE_MAX, DEGREES).min(DEGREES - 1);
    u16::try_from(degrees).unwrap_or(0)
}

/// Reported native saturation/brightness → percent in `[0, 100]`.
#[must_use]
pub fn native_level_to_percent(level: u32) -> u8 {
    let percent = rescale(level, REPORTED_LEVEL_MAX, PERCENT).min(PERCENT);
    u8::try_from(percent).unwrap_or(100)
}

/// Degrees → native command hue.
#[must_use]
pub fn degrees_to_native_hue(degrees: u32) -> u16 {
    let hue = rescale(degrees.min(DEGREES), DEGREES, NATIVE_HUE_MAX);
    u16::try_from(hue).unwrap_or(u16::MAX)
}

/// Percent → native command saturation/brightness.
#[must_use]
pub fn percent_to_native_level(percent: u32) -> u8 {
    let level = rescale(percent.min(PERCENT), PERCENT, COMMAND_LEVEL_MAX);
    u8::try_from(level).unwrap_or(u8::MAX)
}
