//! # huexim-domain
//!
//! Pure domain model for the Hue cloud driver adapter.
//!
//! ## Responsibilities
//! - **Color model**: hex / CSS keyword parsing, sRGB gamma correction, CIE
//!   `xy` chromaticity, integer rescaling between caller and bridge ranges
//! - **Device normalization**: raw bridge listings (three historical shapes)
//!   into one canonical catalog of lights and groups
//! - **Actions**: driver action requests into minimal bridge command bodies
//! - **Identifiers**: the shared light/group id namespace and its routing
//! - **Errors**: the numeric result taxonomy reported to the driver
//! - **Options**: the driver's options object and callback payload
//!
//! ## Dependency rule
//! This crate has **no internal dependencies** and performs no IO.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod action;
pub mod color;
pub mod device;
pub mod error;
pub mod fault;
pub mod id;
pub mod normalize;
pub mod options;
