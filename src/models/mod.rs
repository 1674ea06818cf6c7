use chrono::NaiveDate;
use std::fmt;

/// One room listing scraped from the search results page
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub id: String,
    /// Whole euro per month
    pub price: u32,
    pub address: String,
    /// 0 when the card does not say
    pub bedrooms: u32,
    pub url: String,
    pub available_from: Option<NaiveDate>,
    pub property_type: Option<String>,
}

/// A location the hunt is restricted to, e.g. `D7` for Dublin 7.
///
/// Dublin postal districts are recognised in all the spellings that show up
/// in listing addresses: `D7`, the Eircode routing key `D07` and `Dublin 7`.
/// Anything else is matched as a plain token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocationCode {
    code: String,
    aliases: Vec<String>,
}

impl LocationCode {
    pub fn new(code: &str) -> Self {
        let code = code.trim().to_uppercase();
        let aliases = match dublin_district(&code) {
            Some((number, suffix)) => vec![
                format!("D{}{}", number, suffix),
                format!("D{:02}{}", number, suffix),
                format!("DUBLIN {}{}", number, suffix),
            ],
            None => vec![code.clone()],
        };

        Self { code, aliases }
    }

    pub fn as_str(&self) -> &str {
        &self.code
    }

    /// True if any spelling of this code appears in `address` as a whole token
    pub fn matches(&self, address: &str) -> bool {
        let haystack = address.to_uppercase();
        self.aliases
            .iter()
            .any(|alias| contains_token(&haystack, alias))
    }
}

impl fmt::Display for LocationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

/// Splits `D7` / `D07` / `D6W` into district number and suffix
fn dublin_district(code: &str) -> Option<(u32, &'static str)> {
    let rest = code.strip_prefix('D')?;
    let (digits, suffix) = match rest.strip_suffix('W') {
        Some(digits) => (digits, "W"),
        None => (rest, ""),
    };

    if digits.is_empty() || digits.len() > 2 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let number: u32 = digits.parse().ok()?;
    if (1..=24).contains(&number) {
        Some((number, suffix))
    } else {
        None
    }
}

fn contains_token(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }

    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Fixed criteria a listing must meet to be worth an email
#[derive(Debug, Clone)]
pub struct FilterCriteria {
    pub price_min: u32,
    pub price_max: u32,
    pub location_codes: Vec<LocationCode>,
    /// Listings available later than this are ignored
    pub earliest_available_date: Option<NaiveDate>,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            price_min: 1000,
            price_max: 1700,
            location_codes: ["D6", "D7", "D8"].iter().map(|c| LocationCode::new(c)).collect(),
            earliest_available_date: None,
        }
    }
}
