use crate::error::{RunError, StoreError};
use crate::filter;
use crate::models::Listing;
use crate::notify::template::{format_euro, NotificationEmail};
use crate::notify::Notifier;
use crate::scrapers::extractor::ListingExtractor;
use crate::scrapers::traits::ListingFetcher;
use crate::scrapers::types::SearchRequest;
use crate::store::SeenStore;
use chrono::Local;
use scraper::Html;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, error, info, warn};

/// What happened to one qualifying listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingOutcome {
    AlreadySeen,
    Notified,
    /// Left unmarked so the next run tries again
    NotifyFailed,
}

/// Counts for one fetch cycle
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Listing cards found on the page
    pub total: usize,
    /// Cards that could not be parsed
    pub skipped: usize,
    /// Listings that passed the filter
    pub qualifying: usize,
    pub already_seen: usize,
    pub notified: usize,
    pub failed: usize,
}

impl RunSummary {
    /// Qualifying listings not notified before this run
    pub fn new_listings(&self) -> usize {
        self.notified + self.failed
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} total, {} skipped, {} matching, {} new, {} notified, {} failed",
            self.total,
            self.skipped,
            self.qualifying,
            self.new_listings(),
            self.notified,
            self.failed
        )
    }
}

/// Runs one fetch cycle: fetch, extract, filter, dedup, notify, mark seen
pub struct Hunter<S> {
    fetcher: Box<dyn ListingFetcher>,
    notifier: Box<dyn Notifier>,
    store: S,
    extractor: ListingExtractor,
    search: SearchRequest,
    recipient: String,
}

impl<S: SeenStore> Hunter<S> {
    pub fn new(
        fetcher: Box<dyn ListingFetcher>,
        notifier: Box<dyn Notifier>,
        store: S,
        extractor: ListingExtractor,
        search: SearchRequest,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            notifier,
            store,
            extractor,
            search,
            recipient: recipient.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// A fetch failure aborts before anything is marked. Notification
    /// failures are per listing and leave the listing eligible next run.
    pub async fn run_once(&mut self) -> Result<RunSummary, RunError> {
        info!("Fetching {} via {}", self.search.url, self.fetcher.source_name());

        let html = match self.fetcher.fetch(&self.search).await {
            Ok(html) => html,
            Err(e) => {
                error!("Fetch failed, nothing marked as seen: {}", e);
                return Err(e.into());
            }
        };

        let mut summary = RunSummary::default();
        let qualifying = self.select(&html, &mut summary);

        let mut attempted = HashSet::new();
        for listing in &qualifying {
            // The same card can show up twice, e.g. as a featured result
            if !attempted.insert(listing.id.as_str()) {
                debug!("Listing {} repeated on page", listing.id);
                continue;
            }

            match self.process(listing).await? {
                ListingOutcome::AlreadySeen => summary.already_seen += 1,
                ListingOutcome::Notified => summary.notified += 1,
                ListingOutcome::NotifyFailed => summary.failed += 1,
            }
        }

        info!("Scan complete: {}", summary);
        Ok(summary)
    }

    /// Extract and filter. Kept synchronous so the parsed document never
    /// lives across an await.
    fn select(&self, html: &str, summary: &mut RunSummary) -> Vec<Listing> {
        let document = Html::parse_document(html);
        let mut qualifying = Vec::new();

        for result in self.extractor.extract(&document) {
            summary.total += 1;

            let listing = match result {
                Ok(listing) => listing,
                Err(e) => {
                    summary.skipped += 1;
                    warn!("Skipping listing: {}", e);
                    continue;
                }
            };

            match filter::check(&listing, &self.search.criteria) {
                Ok(()) => qualifying.push(listing),
                Err(reason) => debug!("Listing {} rejected on {:?}", listing.id, reason),
            }
        }

        info!(
            "Found {} listings, {} match the criteria",
            summary.total,
            qualifying.len()
        );
        summary.qualifying = qualifying.len();
        qualifying
    }

    async fn process(&mut self, listing: &Listing) -> Result<ListingOutcome, StoreError> {
        if self.store.contains(&listing.id) {
            debug!("Skipping already seen listing: {}", listing.id);
            return Ok(ListingOutcome::AlreadySeen);
        }

        info!(
            "New listing found: {} - {}",
            listing.address,
            format_euro(listing.price)
        );

        let email = NotificationEmail::for_listing(listing, Local::now());
        if let Err(e) = self
            .notifier
            .send(&self.recipient, &email.subject, &email.html_body)
            .await
        {
            warn!(
                "Email failed for listing {}, will retry next run: {}",
                listing.id, e
            );
            return Ok(ListingOutcome::NotifyFailed);
        }

        // Mark right away so a crash later in the run cannot re-send this one
        if let Err(e) = self.store.add(&listing.id).await {
            error!("Notified listing {} but could not record it: {}", listing.id, e);
            return Err(e);
        }

        Ok(ListingOutcome::Notified)
    }
}
