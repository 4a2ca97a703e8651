//! Hue cloud adapter error types.

use huexim_domain::error::XimError;

/// Errors specific to the Hue cloud adapter.
#[derive(Debug, thiserror::Error)]
pub enum HueCloudError {
    /// The HTTP client could not be built or the request never completed.
    #[error("HTTP transport error")]
    Http(#[source] reqwest::Error),

    /// The server answered with a status this adapter has no meaning for.
    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    /// A success body could not be decoded into the expected shape.
    #[error("failed to parse response payload")]
    PayloadParse(#[source] serde_json::Error),

    /// The answer was classified into the domain taxonomy.
    #[error("domain error")]
    Domain(#[source] XimError),
}

impl HueCloudError {
    /// Convert into an [`XimError`] for propagation across port boundaries.
    pub fn into_domain(self) -> XimError {
        match self {
            Self::Domain(err) => err,
            Self::Status { status: 504, .. } => XimError::BridgeTimeout,
            other => XimError::request_failed(other),
        }
    }
}

impl From<HueCloudError> for XimError {
    fn from(err: HueCloudError) -> Self {
        err.into_domain()
    }
}

impl From<reqwest::Error> for HueCloudError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err)
    }
}
