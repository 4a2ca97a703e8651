//! Classification of vendor error payloads into the [`XimError`] taxonomy.

use serde_json::Value;

use crate::error::XimError;

/// Vendor fault code for a rejected access token.
pub const INVALID_ACCESS_TOKEN: &str = "keymanagement.service.invalid_access_token";
/// Vendor fault code for an expired access token.
pub const ACCESS_TOKEN_EXPIRED: &str = "keymanagement.service.access_token_expired";

/// Plain-text body the cloud returns when the bridge does not answer.
pub const GATEWAY_TIMEOUT_BODY: &str = "Gateway Timeout";

/// Inspect a decoded response body for a vendor failure.
///
/// Returns `None` when the body looks like a regular answer.
#[must_use]
pub fn classify_body(body: &Value) -> Option<XimError> {
    if let Some(fault) = body.get("fault") {
        return Some(classify_fault(fault));
    }

    if let Some(code) = body.get("code").and_then(code_text)
        && (code == "404" || code == "109")
    {
        return Some(XimError::request_failed(format!("bridge answered code {code}")));
    }

    if let Some(description) = bridge_error(body) {
        return Some(XimError::UpstreamFault(description));
    }

    None
}

/// Inspect a raw text body that could not be decoded as JSON.
///
/// Returns `None` when the text is not a known vendor failure.
#[must_use]
pub fn classify_text(body: &str) -> Option<XimError> {
    (body.trim() == GATEWAY_TIMEOUT_BODY).then_some(XimError::BridgeTimeout)
}

fn classify_fault(fault: &Value) -> XimError {
    let errorcode = fault
        .pointer("/detail/errorcode")
        .and_then(Value::as_str)
        .unwrap_or_default();

    match errorcode {
        INVALID_ACCESS_TOKEN => XimError::InvalidAccessToken,
        ACCESS_TOKEN_EXPIRED => XimError::AccessTokenExpired,
        _ => {
            let description = fault
                .get("faultstring")
                .and_then(Value::as_str)
                .filter(|text| !text.is_empty())
                .unwrap_or(if errorcode.is_empty() {
                    "unrecognised fault"
                } else {
                    errorcode
                });
            XimError::UpstreamFault(description.to_string())
        }
    }
}

/// Bridges answer failures as `[{"error": {"type": .., "description": ..}}]`.
fn bridge_error(body: &Value) -> Option<String> {
    body.as_array()?.iter().find_map(|item| {
        let error = item.get("error")?;
        let description = error
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("bridge error");
        Some(match error.get("type").and_then(Value::as_u64) {
            Some(kind) => format!("{description} (type {kind})"),
            None => description.to_string(),
        })
    })
}

fn code_text(code: &Value) -> Option<String> {
    match code {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
