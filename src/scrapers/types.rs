use crate::models::FilterCriteria;

pub const DAFT_BASE_URL: &str = "https://www.daft.ie";
pub const DEFAULT_SEARCH_URL: &str = "https://www.daft.ie/sharing/dublin-city";

/// What to fetch: the search page URL plus the criteria it was built from
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub url: String,
    pub criteria: FilterCriteria,
}

impl SearchRequest {
    /// Builds the search URL with the price range pushed down to the site
    pub fn new(search_url: &str, criteria: &FilterCriteria) -> Self {
        let separator = if search_url.contains('?') { '&' } else { '?' };
        let url = format!(
            "{}{}rentalPrice_from={}&rentalPrice_to={}",
            search_url, separator, criteria.price_min, criteria.price_max
        );

        Self {
            url,
            criteria: criteria.clone(),
        }
    }
}

/// CSS selectors for the parts of a search results page
#[derive(Debug, Clone)]
pub struct SiteSelectors {
    /// One element per listing
    pub card: String,
    pub link: String,
    pub price: String,
    pub address: String,
    pub beds: String,
    pub available_from: String,
    pub property_type: String,
}

impl Default for SiteSelectors {
    fn default() -> Self {
        Self {
            card: r#"ul[data-testid="results"] > li"#.to_string(),
            link: "a[href]".to_string(),
            price: r#"[data-testid="price"]"#.to_string(),
            address: r#"[data-testid="address"]"#.to_string(),
            beds: r#"[data-testid="beds"]"#.to_string(),
            available_from: r#"[data-testid="available-from"]"#.to_string(),
            property_type: r#"[data-testid="property-type"]"#.to_string(),
        }
    }
}
