//! # huexim-app
//!
//! Application layer — the driver entry points and the **port definitions**
//! (traits) they run against.
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `BridgeApi` — the vendor cloud endpoints that reach a bridge
//!   - `TokenService` — the auth service holding per-account vendor tokens
//! - Provide the use-case services:
//!   - `LinkService` — link and unlink a vendor account and bridge
//!   - `LightService` — discovery, state polling and commands
//! - Expose `XimDriver`, the five driver entry points, each finishing with
//!   exactly one response
//!
//! ## Dependency rule
//! Depends on `huexim-domain` only. Never imports adapter crates. Adapters
//! depend on *this* crate, not the reverse.

pub mod driver;
pub mod ports;
pub mod services;

#[cfg(test)]
mod testing;
