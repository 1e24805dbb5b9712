//! HTTP client for the backend data API.
//!
//! Every resource of a timeline lives at `<base_url>/<slug>/<endpoint>` and
//! is fetched with a plain `GET`. Responses are decoded into the schemas of
//! `timeline-types` and validated before they are handed to the store.

use reqwest::Url;
use serde::de::DeserializeOwned;
use timeline_types::{Endpoint, Slug, Validate};
use tracing::debug;

use crate::config::BackendConfig;
use crate::error::StoreError;

/// Client for the per-timeline endpoints of the backend.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: Url,
}

impl BackendClient {
    /// Build a client from configuration.
    ///
    /// Returns [`StoreError::Config`] if the base URL cannot carry path
    /// segments or the HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self, StoreError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| StoreError::Config(format!("invalid base URL {}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::Config(format!(
                "base URL {} cannot carry a path",
                config.base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| StoreError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// URL of `endpoint` for the timeline `slug`.
    ///
    /// The slug is percent-encoded as a single path segment; a trailing
    /// slash on the base URL is ignored.
    pub fn url(&self, slug: &Slug, endpoint: Endpoint) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                StoreError::Config(format!("base URL {} cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .push(slug.as_str())
            .push(endpoint.path());
        Ok(url)
    }

    /// Fetch, decode and validate one endpoint.
    pub async fn fetch<T>(&self, slug: &Slug, endpoint: Endpoint) -> Result<T, StoreError>
    where
        T: DeserializeOwned + Validate,
    {
        let url = self.url(slug, endpoint)?;
        debug!(%url, %endpoint, "fetching timeline resource");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| StoreError::Http {
                endpoint,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| StoreError::Http {
            endpoint,
            message: e.to_string(),
        })?;

        let payload: T = serde_json::from_slice(&body).map_err(|e| StoreError::Decode {
            endpoint,
            message: e.to_string(),
        })?;

        payload
            .validate()
            .map_err(|source| StoreError::InvalidPayload { endpoint, source })?;

        Ok(payload)
    }
}
