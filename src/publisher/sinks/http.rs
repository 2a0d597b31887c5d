//! Shared HTTP plumbing for backend sinks.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};

use crate::error::PublishError;
use crate::publisher::configuration::PublisherKind;

const SINK_HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const SINK_HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) fn build_sink_http_client(publisher: PublisherKind) -> Result<Client, PublishError> {
    Client::builder()
        .connect_timeout(SINK_HTTP_CONNECT_TIMEOUT)
        .timeout(SINK_HTTP_REQUEST_TIMEOUT)
        .build()
        .map_err(|e| PublishError::Configuration(format!(
            "{}: failed to create HTTP client: {}",
            publisher, e
        )))
}

/// Send a request and treat any non-2xx response as a rejected write.
pub(crate) async fn send_checked(
    publisher: PublisherKind,
    request: RequestBuilder,
) -> Result<(), PublishError> {
    let response = request
        .send()
        .await
        .map_err(|e| PublishError::transport(publisher, e))?;
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(PublishError::Rejected {
        publisher,
        status: status.as_u16(),
        body,
    })
}

/// Join a base url and path segments with single slashes.
pub(crate) fn join_url(base: &str, segments: &[&str]) -> String {
    let mut url = base.trim_end_matches('/').to_string();
    for segment in segments {
        url.push('/');
        url.push_str(segment.trim_matches('/'));
    }
    url
}
