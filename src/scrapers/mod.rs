pub mod browser;
pub mod extractor;
pub mod traits;
pub mod types;
pub mod zyte;

pub use browser::{BrowserFetcher, BrowserOptions};
pub use extractor::ListingExtractor;
pub use traits::ListingFetcher;
pub use types::{SearchRequest, SiteSelectors};
pub use zyte::ZyteFetcher;
