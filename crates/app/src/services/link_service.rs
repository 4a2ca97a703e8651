//! Link service — linking a vendor account and bridge, and unlinking it.

use huexim_domain::error::XimError;

use crate::ports::{BridgeApi, TokenService};

/// Outcome of a link attempt that reached the vendor cloud.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// A bridge was found and this application registered on it.
    Linked {
        access_token: String,
        bridge_id: String,
        username: String,
    },
    /// The account lists no bridge with the stored token; the token was
    /// refreshed and the driver must authenticate again.
    TokenRefreshed { access_token: Option<String> },
}

/// Application service for the account-facing entry points.
pub struct LinkService<B, T> {
    bridge: B,
    tokens: T,
}

impl<B: BridgeApi, T: TokenService> LinkService<B, T> {
    /// Create a new service backed by the given ports.
    pub fn new(bridge: B, tokens: T) -> Self {
        Self { bridge, tokens }
    }

    /// Run the link pipeline.
    ///
    /// Steps run strictly in sequence and the first failure ends the
    /// pipeline: fetch the vendor token, find the bridge, press the virtual
    /// link button, register a username.
    ///
    /// # Errors
    ///
    /// Returns [`XimError::NoStoredToken`] when the auth service holds no
    /// token, or the first classified upstream error.
    #[tracing::instrument(skip(self, account_token))]
    pub async fn link(
        &self,
        account_token: &str,
        channel_set: &str,
    ) -> Result<LinkOutcome, XimError> {
        let access_token = self
            .tokens
            .fetch_token(account_token, channel_set)
            .await?
            .ok_or(XimError::NoStoredToken)?;

        let bridges = self.bridge.list_bridges(&access_token).await?;
        let Some(bridge) = bridges.into_iter().next() else {
            tracing::info!("no bridge listed for this token, refreshing it");
            let access_token = self.tokens.refresh_token(account_token, channel_set).await?;
            return Ok(LinkOutcome::TokenRefreshed { access_token });
        };
        tracing::debug!(
            bridge_id = %bridge.id,
            internal_ip = ?bridge.internal_ip,
            "bridge found"
        );

        self.bridge
            .press_link_button(&access_token, &bridge.id)
            .await?;
        let username = self
            .bridge
            .register_username(&access_token, &bridge.id)
            .await?;

        tracing::info!(bridge_id = %bridge.id, "bridge linked");
        Ok(LinkOutcome::Linked {
            access_token,
            bridge_id: bridge.id,
            username,
        })
    }

    /// Revoke the vendor token held for this account.
    ///
    /// # Errors
    ///
    /// Returns the classified error from the auth service.
    #[tracing::instrument(skip(self, account_token))]
    pub async fn unlink(&self, account_token: &str) -> Result<(), XimError> {
        self.tokens.revoke_token(account_token).await?;
        tracing::info!("vendor token revoked");
        Ok(())
    }
}
