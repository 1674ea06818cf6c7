#![allow(dead_code)]

use async_trait::async_trait;
use room_hunter::error::{FetchError, NotifyError, StoreError};
use room_hunter::notify::Notifier;
use room_hunter::scrapers::types::DAFT_BASE_URL;
use room_hunter::scrapers::{ListingExtractor, ListingFetcher, SearchRequest, SiteSelectors};
use room_hunter::store::{MemorySeenStore, SeenStore};
use room_hunter::{FilterCriteria, Hunter, LocationCode};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

pub const RESULTS_PAGE: &str = include_str!("../fixtures/daft_results.html");

/// Serves a fixed page, or fails like a blocked navigation
pub struct StubFetcher {
    page: Option<String>,
}

impl StubFetcher {
    pub fn serving(page: &str) -> Self {
        Self {
            page: Some(page.to_string()),
        }
    }

    pub fn failing() -> Self {
        Self { page: None }
    }
}

#[async_trait]
impl ListingFetcher for StubFetcher {
    async fn fetch(&self, _request: &SearchRequest) -> Result<String, FetchError> {
        self.page.clone().ok_or(FetchError::EmptyPage)
    }

    fn source_name(&self) -> &'static str {
        "stub"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentEmail {
    pub recipient: String,
    pub subject: String,
    pub html_body: String,
}

/// Records every send; fails for subjects containing any of `fail_on`
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub sent: Arc<Mutex<Vec<SentEmail>>>,
    pub fail_on: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn fail_when_subject_contains(&self, needle: &str) {
        self.fail_on.lock().unwrap().push(needle.to_string());
    }

    pub fn stop_failing(&self) {
        self.fail_on.lock().unwrap().clear();
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> Result<(), NotifyError> {
        let failing = self
            .fail_on
            .lock()
            .unwrap()
            .iter()
            .any(|needle| subject.contains(needle.as_str()));
        if failing {
            // The variant does not matter to the hunter, only that send failed
            return Err(NotifyError::Address {
                address: recipient.to_string(),
                source: "@".parse::<lettre::Address>().unwrap_err(),
            });
        }

        self.sent.lock().unwrap().push(SentEmail {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
        });
        Ok(())
    }
}

/// Memory store that remembers which IDs were looked up
#[derive(Default)]
pub struct SpyStore {
    pub inner: MemorySeenStore,
    pub checked: Mutex<Vec<String>>,
}

impl SpyStore {
    pub fn checked(&self) -> Vec<String> {
        self.checked.lock().unwrap().clone()
    }
}

#[async_trait]
impl SeenStore for SpyStore {
    fn contains(&self, id: &str) -> bool {
        self.checked.lock().unwrap().push(id.to_string());
        self.inner.contains(id)
    }

    async fn add(&mut self, id: &str) -> Result<(), StoreError> {
        self.inner.add(id).await
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}

/// Knows nothing and cannot record anything, like a full disk
#[derive(Default)]
pub struct FailingStore {
    pub checked: Mutex<Vec<String>>,
}

impl FailingStore {
    pub fn checked(&self) -> Vec<String> {
        self.checked.lock().unwrap().clone()
    }
}

#[async_trait]
impl SeenStore for FailingStore {
    fn contains(&self, id: &str) -> bool {
        self.checked.lock().unwrap().push(id.to_string());
        false
    }

    async fn add(&mut self, _id: &str) -> Result<(), StoreError> {
        Err(StoreError::Append {
            path: PathBuf::from("seen_listings.txt"),
            source: io::Error::new(io::ErrorKind::Other, "No space left on device"),
        })
    }

    fn len(&self) -> usize {
        0
    }
}

pub fn d7_criteria() -> FilterCriteria {
    FilterCriteria {
        price_min: 1000,
        price_max: 1700,
        location_codes: vec![LocationCode::new("D7")],
        earliest_available_date: None,
    }
}

pub fn hunter<S: SeenStore>(
    fetcher: StubFetcher,
    notifier: &RecordingNotifier,
    store: S,
    criteria: FilterCriteria,
) -> Hunter<S> {
    Hunter::new(
        Box::new(fetcher),
        Box::new(notifier.clone()),
        store,
        ListingExtractor::new(&SiteSelectors::default(), DAFT_BASE_URL).unwrap(),
        SearchRequest::new("https://www.daft.ie/sharing/dublin-city", &criteria),
        "hunter@example.com",
    )
}

/// A results page with the given `(id, price, address)` cards
pub fn page(cards: &[(&str, &str, &str)]) -> String {
    let items: String = cards
        .iter()
        .map(|(id, price, address)| {
            format!(
                r#"<li><a href="/share/room/{id}">
                    <div data-testid="price">{price}</div>
                    <div data-testid="address">{address}</div>
                    <p data-testid="beds">1 Bed</p>
                </a></li>"#
            )
        })
        .collect();

    format!(r#"<html><body><ul data-testid="results">{items}</ul></body></html>"#)
}
