use anyhow::Context;
use room_hunter::config::{AppConfig, FetchBackend};
use room_hunter::notify::SmtpNotifier;
use room_hunter::scrapers::types::DAFT_BASE_URL;
use room_hunter::scrapers::{
    BrowserFetcher, BrowserOptions, ListingExtractor, ListingFetcher, SearchRequest, SiteSelectors,
    ZyteFetcher,
};
use room_hunter::store::{FileSeenStore, SeenStore};
use room_hunter::{telemetry, Hunter};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Invalid configuration")?;

    // Initialize logging
    telemetry::init(&config.log_level)?;

    let criteria = &config.criteria;
    let codes: Vec<&str> = criteria.location_codes.iter().map(|c| c.as_str()).collect();
    info!("🏠 Room Hunter - Daft.ie");
    info!("==========================================");
    info!(
        "Search criteria: €{}-€{}, {}",
        criteria.price_min,
        criteria.price_max,
        codes.join(", ")
    );
    if let Some(date) = criteria.earliest_available_date {
        info!("Only rooms available by {}", date);
    }

    // Load previously seen listings
    let store = FileSeenStore::load(&config.seen_listings_file).await;
    let seen_before = store.len();

    let extractor = ListingExtractor::new(&SiteSelectors::default(), DAFT_BASE_URL)?;
    let notifier = SmtpNotifier::new(&config.smtp).context("Failed to set up email")?;

    let fetcher: Box<dyn ListingFetcher> = match &config.backend {
        FetchBackend::Browser => Box::new(BrowserFetcher::new(BrowserOptions {
            timeout: config.fetch_timeout,
            debug_dir: config.debug_capture_dir.clone(),
            ..BrowserOptions::default()
        })?),
        FetchBackend::Zyte { api_key } => {
            Box::new(ZyteFetcher::new(api_key.clone(), config.fetch_timeout)?)
        }
    };

    let search = SearchRequest::new(&config.search_url, criteria);
    let mut hunter = Hunter::new(
        fetcher,
        Box::new(notifier),
        store,
        extractor,
        search,
        config.recipient.clone(),
    );

    let summary = hunter.run_once().await?;

    info!("==========================================");
    info!(
        "💾 {} seen listings recorded ({} new this run)",
        hunter.store().len(),
        hunter.store().len() - seen_before
    );
    if summary.failed > 0 {
        info!("{} listings will be retried on the next run", summary.failed);
    }

    Ok(())
}
