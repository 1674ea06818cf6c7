use crate::error::FetchError;
use crate::scrapers::traits::ListingFetcher;
use crate::scrapers::types::SearchRequest;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

const ZYTE_EXTRACT_URL: &str = "https://api.zyte.com/v1/extract";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExtractRequest<'a> {
    url: &'a str,
    browser_html: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExtractResponse {
    #[serde(default)]
    browser_html: Option<String>,
}

/// Fetches rendered pages through the Zyte extraction API, which runs the
/// browser on its side
pub struct ZyteFetcher {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl ZyteFetcher {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, FetchError> {
        Self::with_endpoint(api_key, timeout, ZYTE_EXTRACT_URL.to_string())
    }

    /// Create a fetcher against a different extraction endpoint
    pub fn with_endpoint(api_key: String, timeout: Duration, endpoint: String) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| FetchError::Http {
                url: endpoint.clone(),
                source,
            })?;

        Ok(Self {
            client,
            api_key,
            endpoint,
        })
    }
}

#[async_trait]
impl ListingFetcher for ZyteFetcher {
    async fn fetch(&self, request: &SearchRequest) -> Result<String, FetchError> {
        info!("Requesting {} through Zyte", request.url);

        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(&self.api_key, Some(""))
            .json(&ExtractRequest {
                url: &request.url,
                browser_html: true,
            })
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: self.endpoint.clone(),
                source,
            })?;

        if !response.status().is_success() {
            warn!("Zyte returned status: {}", response.status());
            return Err(FetchError::Status {
                service: "Zyte",
                status: response.status(),
            });
        }

        let body: ExtractResponse = response.json().await.map_err(|source| FetchError::Http {
            url: self.endpoint.clone(),
            source,
        })?;

        let html = body.browser_html.unwrap_or_default();
        if html.trim().is_empty() {
            return Err(FetchError::EmptyPage);
        }

        debug!("Downloaded {} bytes of HTML", html.len());
        Ok(html)
    }

    fn source_name(&self) -> &'static str {
        "Zyte"
    }
}
