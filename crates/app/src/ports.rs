//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the entry-point logic and the outside
//! world: the vendor cloud reaching the bridge, and the auth service holding
//! vendor tokens.

pub mod bridge;
pub mod token;

pub use bridge::{BridgeApi, BridgeInfo, BridgeSession};
pub use token::TokenService;
