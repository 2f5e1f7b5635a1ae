//! Shared request plumbing for the HTTP providers.

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use ticketgate_core::TransportError;
use tracing::debug;

pub(crate) const USER_AGENT: &str = concat!("ticketgate/", env!("CARGO_PKG_VERSION"));

pub(crate) fn build_client(service: &'static str) -> Result<Client, TransportError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|err| TransportError::Request {
            service,
            message: err.to_string(),
        })
}

/// Send `request` and return the body of a successful response.
///
/// A 404 becomes `NotFound` for `resource`; any other non-2xx status is `Http`.
pub(crate) async fn fetch_body(
    service: &'static str,
    resource: &str,
    request: RequestBuilder,
) -> Result<String, TransportError> {
    let response = request.send().await.map_err(|err| TransportError::Request {
        service,
        message: err.to_string(),
    })?;

    let status = response.status();
    let url = response.url().to_string();
    debug!(service, status = status.as_u16(), url = %url, "response received");

    if status == StatusCode::NOT_FOUND {
        return Err(TransportError::NotFound {
            service,
            resource: resource.to_string(),
        });
    }
    if !status.is_success() {
        return Err(TransportError::Http {
            service,
            status: status.as_u16(),
            url,
        });
    }

    response.text().await.map_err(|err| TransportError::Request {
        service,
        message: err.to_string(),
    })
}

pub(crate) fn decode<T: DeserializeOwned>(
    service: &'static str,
    body: &str,
) -> Result<T, TransportError> {
    serde_json::from_str(body).map_err(|err| TransportError::Decode {
        service,
        message: err.to_string(),
    })
}
