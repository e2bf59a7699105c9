//! Shared HTTP plumbing for vendor adapters.

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;

use crate::error::{Error, Result};

/// Build the HTTP client shared by every adapter.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Read a vendor response as JSON.
///
/// A status other than 200 becomes [`Error::Provider`] carrying the status
/// and raw body. A 200 with an undecodable body is reported as a 500 with
/// the decode failure and the raw body.
pub async fn read_json(provider: &str, response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    let body = response.text().await?;

    if status != StatusCode::OK {
        tracing::warn!(
            provider = provider,
            status = status.as_u16(),
            "Vendor returned an error status"
        );
        return Err(Error::Provider {
            status: status.as_u16(),
            message: body,
        });
    }

    serde_json::from_str(&body).map_err(|e| {
        tracing::warn!(provider = provider, error = %e, "Vendor body is not valid JSON");
        Error::Provider {
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            message: format!("Internal Server Error: undecodable response body ({e}): {body}"),
        }
    })
}
