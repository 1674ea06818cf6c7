use crate::error::ExtractError;
use crate::models::Listing;
use crate::scrapers::types::SiteSelectors;
use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

struct CompiledSelectors {
    card: Selector,
    link: Selector,
    price: Selector,
    address: Selector,
    beds: Selector,
    available_from: Selector,
    property_type: Selector,
}

fn compile(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::InvalidSelector {
        selector: selector.to_string(),
        reason: format!("{:?}", e),
    })
}

/// Turns a rendered search results page into listings
pub struct ListingExtractor {
    selectors: CompiledSelectors,
    base_url: String,
}

impl ListingExtractor {
    /// Compile the selectors up front so a typo fails before any fetch
    pub fn new(selectors: &SiteSelectors, base_url: &str) -> Result<Self, ExtractError> {
        Ok(Self {
            selectors: CompiledSelectors {
                card: compile(&selectors.card)?,
                link: compile(&selectors.link)?,
                price: compile(&selectors.price)?,
                address: compile(&selectors.address)?,
                beds: compile(&selectors.beds)?,
                available_from: compile(&selectors.available_from)?,
                property_type: compile(&selectors.property_type)?,
            },
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Lazily yields one result per listing card, in page order.
    /// A card that fails to parse yields an error and does not stop the rest.
    pub fn extract<'a>(
        &'a self,
        document: &'a Html,
    ) -> impl Iterator<Item = Result<Listing, ExtractError>> + 'a {
        document
            .select(&self.selectors.card)
            .enumerate()
            .map(move |(index, card)| self.parse_card(index, card))
    }

    fn parse_card(&self, index: usize, card: ElementRef<'_>) -> Result<Listing, ExtractError> {
        let href = card
            .select(&self.selectors.link)
            .next()
            .and_then(|link| link.value().attr("href"))
            .ok_or(ExtractError::MissingField { index, field: "url" })?;

        let id = id_from_href(href).ok_or_else(|| ExtractError::InvalidField {
            index,
            field: "id",
            value: href.to_string(),
        })?;

        let price_text = text_of(card, &self.selectors.price)
            .ok_or(ExtractError::MissingField { index, field: "price" })?;
        let price = parse_price(&price_text).ok_or_else(|| ExtractError::InvalidField {
            index,
            field: "price",
            value: price_text.clone(),
        })?;

        let address = text_of(card, &self.selectors.address)
            .ok_or(ExtractError::MissingField { index, field: "address" })?;

        let bedrooms = parse_bedrooms(text_of(card, &self.selectors.beds).as_deref());

        let available_from = text_of(card, &self.selectors.available_from).and_then(|text| {
            let date = parse_available_from(&text);
            if date.is_none() && !is_immediate(&text) {
                debug!("Card {}: could not read availability {:?}", index, text);
            }
            date
        });

        Ok(Listing {
            id,
            price,
            address,
            bedrooms,
            url: self.absolute_url(href),
            available_from,
            property_type: text_of(card, &self.selectors.property_type),
        })
    }

    fn absolute_url(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            href.to_string()
        } else if href.starts_with('/') {
            format!("{}{}", self.base_url, href)
        } else {
            format!("{}/{}", self.base_url, href)
        }
    }
}

/// Whitespace-normalised text of the first match, if it has any
fn text_of(card: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let element = card.select(selector).next()?;
    let text = element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ");

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// `/share/dublin-7-phibsborough/5512345?x=1` -> `5512345`
fn id_from_href(href: &str) -> Option<String> {
    let path = href.split(|c: char| c == '?' || c == '#').next().unwrap_or("");
    let segment = path.trim_end_matches('/').rsplit('/').next()?;

    if !segment.is_empty() && segment.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(segment.to_string())
    } else {
        None
    }
}

/// Monthly rent in whole euro from text like `€1,400 per month` or `€250 per week`
pub fn parse_price(text: &str) -> Option<u32> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ',')
        .filter(char::is_ascii_digit)
        .collect();
    let amount: u64 = digits.parse().ok()?;

    let lower = text.to_lowercase();
    let monthly = if lower.contains("week") || lower.contains("p/w") {
        amount.checked_mul(52)?.checked_add(6)? / 12
    } else {
        amount
    };

    u32::try_from(monthly).ok()
}

/// Unknown bedroom counts come back as 0
pub fn parse_bedrooms(text: Option<&str>) -> u32 {
    let Some(text) = text else {
        return 0;
    };

    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if let Ok(count) = digits.parse() {
        return count;
    }

    let lower = text.to_lowercase();
    if ["single", "double", "twin"].iter().any(|kind| lower.contains(kind)) {
        1
    } else {
        0
    }
}

fn is_immediate(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("immediately") || lower.contains("now")
}

/// `Available from 9th Feb 2025` -> 2025-02-09; immediate or unreadable -> None
pub fn parse_available_from(text: &str) -> Option<NaiveDate> {
    if is_immediate(text) {
        return None;
    }

    let start = text.find(|c: char| c.is_ascii_digit())?;
    let candidate = text[start..]
        .replace(',', " ")
        .split_whitespace()
        .map(strip_ordinal)
        .collect::<Vec<_>>()
        .join(" ");

    ["%d %b %Y", "%d %B %Y", "%d/%m/%Y", "%Y-%m-%d"]
        .iter()
        .find_map(|format| NaiveDate::parse_and_remainder(&candidate, format).ok())
        .map(|(date, _rest)| date)
}

fn strip_ordinal(token: &str) -> &str {
    for suffix in ["st", "nd", "rd", "th"] {
        if let Some(number) = token.strip_suffix(suffix) {
            if !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()) {
                return number;
            }
        }
    }
    token
}
