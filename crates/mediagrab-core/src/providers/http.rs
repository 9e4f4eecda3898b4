//! Shared HTTP plumbing for extraction service clients.

use crate::error::ExtractionError;
use crate::utils::truncate_str;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Longest error body kept in an [`ExtractionError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 300;

/// JSON-over-HTTP access to one extraction endpoint.
pub(super) struct ExtractorHttp {
    endpoint: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl ExtractorHttp {
    pub(super) fn new(endpoint: &str, timeout: Duration) -> Self {
        let client = match reqwest::Client::builder().timeout(timeout).build() {
            Ok(client) => client,
            Err(_) => reqwest::Client::new(),
        };

        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client,
            timeout,
        }
    }

    /// GET the endpoint with `query` and decode the JSON body.
    ///
    /// A 204, an empty body or a JSON `null` all mean "no payload".
    pub(super) async fn get_json<T: DeserializeOwned>(
        &self,
        query: &[(&str, &str)],
    ) -> Result<Option<T>, ExtractionError> {
        debug!(
            endpoint = %self.endpoint,
            timeout_secs = self.timeout.as_secs(),
            "Extraction request"
        );

        let response = self
            .client
            .get(&self.endpoint)
            .query(query)
            .send()
            .await
            .map_err(|e| ExtractionError::Network(e.without_url().to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ExtractionError::Network(e.without_url().to_string()))?;

        if !status.is_success() {
            return Err(ExtractionError::Status {
                status: status.as_u16(),
                body: truncate_str(text.trim(), MAX_ERROR_BODY_CHARS),
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        decode_body(&text)
    }
}

/// Decode an extraction response body, treating blank and `null` as absent.
pub(super) fn decode_body<T: DeserializeOwned>(text: &str) -> Result<Option<T>, ExtractionError> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str::<Option<T>>(text).map_err(|e| ExtractionError::Json(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Probe {
        value: u32,
    }

    #[test]
    fn test_decode_body() {
        assert_eq!(decode_body::<Probe>("").ok(), Some(None));
        assert_eq!(decode_body::<Probe>("  null ").ok(), Some(None));
        assert_eq!(
            decode_body::<Probe>(r#"{"value": 3}"#).ok(),
            Some(Some(Probe { value: 3 }))
        );
        assert!(matches!(
            decode_body::<Probe>("<html>"),
            Err(ExtractionError::Json(_))
        ));
    }
}
