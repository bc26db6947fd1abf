use anyhow::{Context, Result};
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::error::ApiError;

pub const DEFAULT_API_BASE: &str = "http://localhost:3050";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// HTTP client for the configuration backend.
///
/// Every request shares the deadline given at construction; nothing is
/// retried.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for `segments` below the base, each segment
    /// percent-encoded on its own, with `query` appended.
    pub fn endpoint<'a>(
        &self,
        segments: impl IntoIterator<Item = &'a str>,
        query: &[(&str, String)],
    ) -> Result<Url, ApiError> {
        let invalid = |reason: String| ApiError::InvalidUrl {
            url: self.base_url.clone(),
            reason,
        };
        let mut url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| invalid("cannot be a base URL".to_string()))?;
            path.pop_if_empty();
            path.extend(segments.into_iter().filter(|s| !s.is_empty()));
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    pub async fn get_json(&self, url: Url) -> Result<Value, ApiError> {
        debug!(%url, "GET");

        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| ApiError::Transport { url: url.to_string(), source })?;

        let (_, text) = Self::read_success(url.as_str(), resp).await?;
        serde_json::from_str(&text).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// PUT a JSON body and return the status and raw response text.
    pub async fn put_json(&self, url: Url, body: &Value) -> Result<(StatusCode, String), ApiError> {
        debug!(%url, "PUT");

        let resp = self
            .client
            .put(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|source| ApiError::Transport { url: url.to_string(), source })?;

        Self::read_success(url.as_str(), resp).await
    }

    async fn read_success(url: &str, resp: reqwest::Response) -> Result<(StatusCode, String), ApiError> {
        let status = resp.status();
        let text = resp.text().await.map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;

        if !status.is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status,
                body: text,
            });
        }
        Ok((status, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_and_encodes() {
        let client = ApiClient::new("http://localhost:3050/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3050");
        assert_eq!(
            client.endpoint("api/db/services".split('/'), &[]).unwrap().as_str(),
            "http://localhost:3050/api/db/services"
        );
        assert_eq!(
            client
                .endpoint(["api", "db", "services", "a/b?c#d"], &[])
                .unwrap()
                .as_str(),
            "http://localhost:3050/api/db/services/a%2Fb%3Fc%23d"
        );
        assert_eq!(
            client
                .endpoint(["api", "db", "services"], &[("name", "x y&z".to_string()), ("limit", "1".to_string())])
                .unwrap()
                .as_str(),
            "http://localhost:3050/api/db/services?name=x+y%26z&limit=1"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path_prefix() {
        let client = ApiClient::new("http://gateway/config/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.endpoint(["api", "db", "services"], &[]).unwrap().as_str(),
            "http://gateway/config/api/db/services"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let client = ApiClient::new("not a url", Duration::from_secs(1)).unwrap();
        let err = client.endpoint(["api"], &[]).unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_connection_refused_is_a_transport_error() {
        // Port 9 (discard) is not expected to be listening on the test host.
        let client = ApiClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let url = client.endpoint(["api", "db", "services"], &[]).unwrap();
        let err = client.get_json(url).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport { .. }));
        assert_eq!(err.url(), "http://127.0.0.1:9/api/db/services");
    }
}
