use crate::error::FetchError;
use crate::scrapers::types::SearchRequest;
use async_trait::async_trait;

/// Anything that can turn a search request into rendered HTML.
/// Browser lifecycle and anti-bot handling stay behind this call.
#[async_trait]
pub trait ListingFetcher: Send + Sync {
    /// Fetch the rendered search results page
    async fn fetch(&self, request: &SearchRequest) -> Result<String, FetchError>;

    /// Get the name of the fetch backend
    fn source_name(&self) -> &'static str;
}
