//! Driver entry points — the five calls the host driver makes.
//!
//! Every entry point takes the driver's options by reference, works on its
//! own copy, and finishes with exactly one [`XimResponse`]. The callback
//! variants hand that response to an `FnOnce`, so a second invocation cannot
//! be expressed.

use std::fmt;
use std::str::FromStr;

use huexim_domain::device::LightStatus;
use huexim_domain::error::{ErrorCode, XimError, XimResult};
use huexim_domain::id::DeviceTarget;
use huexim_domain::options::{XimContent, XimOptions, XimResponse};

use crate::ports::{BridgeApi, BridgeSession, TokenService};
use crate::services::light_service::LightService;
use crate::services::link_service::{LinkOutcome, LinkService};

/// The driver-invoked entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryPoint {
    Authenticate,
    Discovery,
    Action,
    Stat,
    Unlink,
}

impl EntryPoint {
    /// Every entry point, in driver documentation order.
    pub const ALL: [Self; 5] = [
        Self::Authenticate,
        Self::Discovery,
        Self::Action,
        Self::Stat,
        Self::Unlink,
    ];

    /// Lowercase name as used by the driver.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Authenticate => "authenticate",
            Self::Discovery => "discovery",
            Self::Action => "action",
            Self::Stat => "stat",
            Self::Unlink => "unlink",
        }
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown entry point name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown entry point {0:?}")]
pub struct UnknownEntryPoint(pub String);

impl FromStr for EntryPoint {
    type Err = UnknownEntryPoint;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|entry| entry.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownEntryPoint(s.to_string()))
    }
}

/// Facade exposing the entry points over the bridge and token ports.
pub struct XimDriver<B, T> {
    link: LinkService<B, T>,
    lights: LightService<B>,
}

impl<B, T> XimDriver<B, T>
where
    B: BridgeApi + Clone,
    T: TokenService,
{
    /// Create a driver backed by the given ports.
    pub fn new(bridge: B, tokens: T) -> Self {
        Self {
            link: LinkService::new(bridge.clone(), tokens),
            lights: LightService::new(bridge),
        }
    }

    /// Run `entry` and hand its response to `callback`, exactly once.
    pub async fn invoke<F>(&self, entry: EntryPoint, options: &XimOptions, callback: F)
    where
        F: FnOnce(XimResponse),
    {
        callback(self.run(entry, options).await);
    }

    /// Run `entry` and return its response.
    pub async fn run(&self, entry: EntryPoint, options: &XimOptions) -> XimResponse {
        match entry {
            EntryPoint::Authenticate => self.authenticate(options).await,
            EntryPoint::Discovery => self.discovery(options).await,
            EntryPoint::Action => self.action(options).await,
            EntryPoint::Stat => self.stat(options).await,
            EntryPoint::Unlink => self.unlink(options).await,
        }
    }

    /// Link the account's bridge and store fresh credentials.
    ///
    /// `xim_content` on the response is rebuilt from scratch.
    pub async fn authenticate(&self, options: &XimOptions) -> XimResponse {
        let outcome = self.try_authenticate(options).await;
        let mut response = finish(EntryPoint::Authenticate, options, outcome.as_ref().err());
        response.options.xim_content = Some(XimContent::default());

        match outcome {
            Ok(LinkOutcome::Linked {
                access_token,
                bridge_id,
                username,
            }) => {
                let content = response.content_mut();
                content.hue_access_token = Some(access_token);
                content.bridgeid = Some(bridge_id);
                content.user_name = Some(username);
            }
            Ok(LinkOutcome::TokenRefreshed { access_token }) => {
                tracing::warn!(err_no = 112, "no bridge listed, vendor token refreshed");
                response.result = XimResult::new(ErrorCode::AccessTokenExpired, "Refresh Access Token");
                response.content_mut().hue_access_token = access_token;
            }
            Err(_) => {}
        }
        response
    }

    /// List the bridge's lights and groups.
    pub async fn discovery(&self, options: &XimOptions) -> XimResponse {
        let catalog = match session(options) {
            Ok(session) => self.lights.discover(&session).await,
            Err(err) => Err(err),
        };

        match catalog {
            Ok(catalog) => {
                let mut response = finish(EntryPoint::Discovery, options, None);
                response.content_mut().lights = catalog.lights;
                response.list = Some(catalog.list);
                response.groups = Some(catalog.groups);
                response
            }
            Err(err) => {
                let mut response = finish(EntryPoint::Discovery, options, Some(&err));
                response.list = Some(Vec::new());
                response.groups = Some(Vec::new());
                response
            }
        }
    }

    /// Change a light or group.
    pub async fn action(&self, options: &XimOptions) -> XimResponse {
        let applied = self.try_action(options).await;
        let mut response = finish(EntryPoint::Action, options, applied.as_ref().err());

        if let Ok((device_id, Some(onoff))) = applied
            && let Some(device) = response.content_mut().lights.get_mut(&device_id)
        {
            device.light_status.onoff = onoff;
        }
        response.options.device_id = None;
        response.options.light_action = None;
        response.options.extra.remove("action");
        response
    }

    /// Poll one light or group.
    pub async fn stat(&self, options: &XimOptions) -> XimResponse {
        let polled = match (session(options), target(options)) {
            (Ok(session), Ok(target)) => self.lights.stat(&session, &target).await,
            (Err(err), _) | (_, Err(err)) => Err(err),
        };

        match polled {
            Ok(device) => {
                let mut response = finish(EntryPoint::Stat, options, None);
                response
                    .content_mut()
                    .lights
                    .insert(device.device_id.clone(), device.clone());
                response.list = Some(vec![device]);
                response
            }
            Err(err) => {
                let mut response = finish(EntryPoint::Stat, options, Some(&err));
                response.list = Some(Vec::new());
                response
            }
        }
    }

    /// Revoke the stored vendor token and forget bridge credentials.
    pub async fn unlink(&self, options: &XimOptions) -> XimResponse {
        let revoked = match options.quantum_token() {
            Some(account_token) => self.link.unlink(account_token).await,
            None => Err(XimError::MissingAccessToken),
        };

        let mut response = finish(EntryPoint::Unlink, options, revoked.as_ref().err());
        if revoked.is_ok()
            && let Some(content) = response.options.xim_content.as_mut()
        {
            content.hue_access_token = None;
            content.access_token = None;
            content.bridgeid = None;
            content.user_name = None;
        }
        response
    }

    async fn try_authenticate(&self, options: &XimOptions) -> Result<LinkOutcome, XimError> {
        let account_token = options.quantum_token().ok_or(XimError::MissingAccessToken)?;
        let channel_set = options
            .xim_channel_set
            .as_deref()
            .filter(|set| !set.trim().is_empty())
            .ok_or_else(|| XimError::request_failed("xim_channel_set missing"))?;
        self.link.link(account_token, channel_set).await
    }

    /// Returns the device id and the power state that was sent, if any.
    async fn try_action(&self, options: &XimOptions) -> Result<(String, Option<bool>), XimError> {
        let session = session(options)?;
        let target = target(options)?;
        let request = options
            .light_action()
            .map_err(XimError::request_failed)?
            .ok_or(XimError::MissingAction)?;

        let device_id = target.device_id();
        let known: Option<&LightStatus> = options.known_status(&device_id);
        let command = request.to_command(known)?;
        if command.is_empty() {
            tracing::debug!(device_id = %device_id, "action changes nothing, no command sent");
            return Ok((device_id, None));
        }
        tracing::debug!(device_id = %device_id, command = ?command, "translated action");

        self.lights.apply(&session, &target, &command).await?;
        Ok((device_id, command.on))
    }
}

/// Credentials for bridge-scoped calls. The token is checked first so a call
/// without one never reaches the network.
fn session(options: &XimOptions) -> Result<BridgeSession, XimError> {
    let access_token = options.access_token().ok_or(XimError::MissingAccessToken)?;
    let bridge_id = options.bridge_id().ok_or(XimError::InvalidBridge)?;
    Ok(BridgeSession {
        access_token: access_token.to_string(),
        bridge_id: bridge_id.to_string(),
        username: options.username().map(str::to_string),
    })
}

fn target(options: &XimOptions) -> Result<DeviceTarget, XimError> {
    options
        .device_id()
        .map(DeviceTarget::from_device_id)
        .ok_or(XimError::MissingDevice)
}

/// Start the response for `entry`, logging the outcome.
fn finish(entry: EntryPoint, options: &XimOptions, err: Option<&XimError>) -> XimResponse {
    let result = match err {
        Some(err) => {
            let result = XimResult::from(err);
            tracing::warn!(entry = %entry, err_no = result.err_no, error = %err, "entry point failed");
            result
        }
        None => {
            tracing::info!(entry = %entry, "entry point succeeded");
            XimResult::ok()
        }
    };
    XimResponse::from_options(options, result)
}
