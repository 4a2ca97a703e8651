//! Error taxonomy shared by every entry point.
//!
//! Failures are never surfaced to the host driver as Rust errors. Each
//! [`XimError`] maps to exactly one numeric [`ErrorCode`], and the pair
//! `(err_no, err_msg)` travels back on the callback payload as an
//! [`XimResult`].

use serde::{Deserialize, Serialize};

/// Numeric result codes understood by the host driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Success. The only code that is not a failure.
    Ok,
    /// Generic request failure (transport, malformed payload, bad input).
    RequestFailed,
    /// The auth service holds no vendor token for this channel set.
    NoStoredToken,
    /// The vendor rejected the access token.
    InvalidAccessToken,
    /// The access token expired and must be refreshed.
    AccessTokenExpired,
    /// No access token was supplied with the call.
    MissingAccessToken,
    /// Bridge identifier missing or unknown to the vendor cloud.
    InvalidBridge,
    /// The vendor cloud timed out talking to the bridge.
    BridgeTimeout,
    /// An upstream fault that matches none of the above.
    UpstreamFault,
}

impl ErrorCode {
    /// The numeric value reported as `err_no`.
    #[must_use]
    pub fn err_no(self) -> u32 {
        match self {
            Self::Ok => 0,
            Self::RequestFailed => 1,
            Self::NoStoredToken => 2,
            Self::InvalidAccessToken => 110,
            Self::AccessTokenExpired => 112,
            Self::MissingAccessToken => 113,
            Self::InvalidBridge => 120,
            Self::BridgeTimeout => 121,
            Self::UpstreamFault => 900,
        }
    }
}

/// Failures while parsing a color given by the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    /// Not a `#RGB` / `#RRGGBB` hex string.
    #[error("invalid color format {0:?}")]
    InvalidColorFormat(String),

    /// Not a known CSS color keyword.
    #[error("unknown color name {0:?}")]
    UnknownColorName(String),
}

/// Any failure an entry point can end with.
#[derive(Debug, thiserror::Error)]
pub enum XimError {
    /// No vendor access token (or hub account token) on the call.
    #[error("access token missing")]
    MissingAccessToken,

    /// The auth service has no token stored for the channel set.
    #[error("no token stored for this channel set")]
    NoStoredToken,

    /// No bridge identifier, or the vendor does not know it.
    #[error("bridge identifier missing or invalid")]
    InvalidBridge,

    /// The call needs a `device_id` and none was given.
    #[error("device_id missing")]
    MissingDevice,

    /// An action call without any `light_action`.
    #[error("light action missing")]
    MissingAction,

    /// The vendor rejected the access token.
    #[error("invalid access token")]
    InvalidAccessToken,

    /// The vendor reports the access token as expired.
    #[error("access token expired")]
    AccessTokenExpired,

    /// The vendor cloud timed out reaching the bridge.
    #[error("bridge timeout")]
    BridgeTimeout,

    /// Transport failure or a payload that could not be understood.
    #[error("request failed")]
    RequestFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A vendor fault the taxonomy has no dedicated code for.
    #[error("upstream fault: {0}")]
    UpstreamFault(String),

    /// A color in the action request could not be parsed.
    #[error("invalid color")]
    Color(#[from] ColorError),
}

impl XimError {
    /// The numeric code reported for this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MissingAccessToken => ErrorCode::MissingAccessToken,
            Self::NoStoredToken => ErrorCode::NoStoredToken,
            Self::InvalidBridge => ErrorCode::InvalidBridge,
            Self::InvalidAccessToken => ErrorCode::InvalidAccessToken,
            Self::AccessTokenExpired => ErrorCode::AccessTokenExpired,
            Self::BridgeTimeout => ErrorCode::BridgeTimeout,
            Self::UpstreamFault(_) => ErrorCode::UpstreamFault,
            Self::MissingDevice | Self::MissingAction | Self::RequestFailed(_) | Self::Color(_) => {
                ErrorCode::RequestFailed
            }
        }
    }

    /// Wrap any error as a generic request failure.
    pub fn request_failed(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::RequestFailed(err.into())
    }
}

/// The `result` object attached to every callback payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XimResult {
    pub err_no: u32,
    pub err_msg: String,
}

impl XimResult {
    /// The success result.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            err_no: ErrorCode::Ok.err_no(),
            err_msg: "ok".to_string(),
        }
    }

    /// A result with an explicit code and message.
    #[must_use]
    pub fn new(code: ErrorCode, err_msg: impl Into<String>) -> Self {
        Self {
            err_no: code.err_no(),
            err_msg: err_msg.into(),
        }
    }

    /// Whether this is the success result.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.err_no == ErrorCode::Ok.err_no()
    }
}

impl From<&XimError> for XimResult {
    fn from(err: &XimError) -> Self {
        let message = match err {
            XimError::RequestFailed(source) => format!("fail: {source}"),
            XimError::Color(source) => source.to_string(),
            other => other.to_string(),
        };
        Self::new(err.code(), message)
    }
}

impl From<XimError> for XimResult {
    fn from(err: XimError) -> Self {
        Self::from(&err)
    }
}
