//! Light service — discovery, state polling and commands for a linked bridge.

use huexim_domain::action::LightCommand;
use huexim_domain::device::Device;
use huexim_domain::error::XimError;
use huexim_domain::id::DeviceTarget;
use huexim_domain::normalize::{self, Catalog};

use crate::ports::{BridgeApi, BridgeSession};

/// Application service for the light-facing entry points.
pub struct LightService<B> {
    bridge: B,
}

impl<B: BridgeApi> LightService<B> {
    /// Create a new service backed by the given bridge port.
    pub fn new(bridge: B) -> Self {
        Self { bridge }
    }

    /// Fetch and normalize the bridge listing.
    ///
    /// # Errors
    ///
    /// Returns the classified upstream error, or
    /// [`XimError::RequestFailed`] when the listing has an unknown shape.
    #[tracing::instrument(skip(self, session), fields(bridge_id = %session.bridge_id))]
    pub async fn discover(&self, session: &BridgeSession) -> Result<Catalog, XimError> {
        let payload = self.bridge.fetch_listing(session).await?;
        let catalog = normalize::normalize_listing(&payload)?;

        for (key, reason) in &catalog.skipped {
            tracing::warn!(key = %key, reason = %reason, "skipped unreadable bridge entry");
        }
        tracing::info!(
            lights = catalog.list.len(),
            groups = catalog.groups.len(),
            catalog = catalog.lights.len(),
            "discovery complete"
        );
        Ok(catalog)
    }

    /// Fetch and normalize the current state of one light or group.
    ///
    /// # Errors
    ///
    /// Returns the classified upstream error, or
    /// [`XimError::RequestFailed`] when the entry cannot be read.
    #[tracing::instrument(skip(self, session), fields(device = %target))]
    pub async fn stat(
        &self,
        session: &BridgeSession,
        target: &DeviceTarget,
    ) -> Result<Device, XimError> {
        let device = match target {
            DeviceTarget::Light(light_id) => {
                let raw = self.bridge.fetch_light(session, light_id).await?;
                normalize::normalize_light(light_id, &raw)?
            }
            DeviceTarget::Group(group) => {
                let raw = self.bridge.fetch_group(session, *group).await?;
                normalize::normalize_group(*group, &raw)?
            }
        };
        tracing::debug!(onoff = device.light_status.onoff, "state fetched");
        Ok(device)
    }

    /// Send a command to one light or group.
    ///
    /// # Errors
    ///
    /// Returns the classified upstream error.
    #[tracing::instrument(skip(self, session, command), fields(device = %target))]
    pub async fn apply(
        &self,
        session: &BridgeSession,
        target: &DeviceTarget,
        command: &LightCommand,
    ) -> Result<(), XimError> {
        let sent = match target {
            DeviceTarget::Light(light_id) => {
                self.bridge
                    .send_light_state(session, light_id, command)
                    .await
            }
            DeviceTarget::Group(group) => {
                self.bridge
                    .send_group_action(session, *group, command)
                    .await
            }
        };
        sent?;
        tracing::debug!("command applied");
        Ok(())
    }
}
