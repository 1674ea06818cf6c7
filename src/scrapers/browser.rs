use crate::error::FetchError;
use crate::scrapers::traits::ListingFetcher;
use crate::scrapers::types::SearchRequest;
use anyhow::Context;
use async_trait::async_trait;
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const ACCEPT_COOKIES_JS: &str = r#"
    const button = document.querySelector(
        '#didomi-notice-agree-button, button[id*="accept"], button[data-testid*="accept"]'
    );
    if (button) button.click();
"#;

/// Settings for the headless Chrome session
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// Upper bound on waiting for the results list
    pub timeout: Duration,
    /// Element that signals the results have rendered
    pub wait_selector: String,
    /// Where to drop page HTML and a screenshot for each fetch
    pub debug_dir: Option<PathBuf>,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            wait_selector: r#"ul[data-testid="results"]"#.to_string(),
            debug_dir: None,
        }
    }
}

/// Fetches search pages with headless Chrome
pub struct BrowserFetcher {
    browser: Arc<Browser>,
    options: BrowserOptions,
}

impl BrowserFetcher {
    /// Launch Chrome and keep it for the lifetime of the fetcher
    pub fn new(options: BrowserOptions) -> Result<Self, FetchError> {
        info!("Launching headless Chrome...");

        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .window_size(Some((1366, 900)))
            .idle_browser_timeout(options.timeout + Duration::from_secs(30))
            .args(vec![
                OsStr::new("--disable-blink-features=AutomationControlled"),
                OsStr::new("--lang=en-IE"),
            ])
            .build()
            .map_err(|e| FetchError::Browser(anyhow::anyhow!("Failed to build launch options: {}", e)))?;

        let browser = Browser::new(launch_options)
            .context("Failed to launch Chrome browser")
            .map_err(FetchError::Browser)?;

        Ok(Self {
            browser: Arc::new(browser),
            options,
        })
    }
}

#[async_trait]
impl ListingFetcher for BrowserFetcher {
    async fn fetch(&self, request: &SearchRequest) -> Result<String, FetchError> {
        let browser = Arc::clone(&self.browser);
        let options = self.options.clone();
        let url = request.url.clone();

        // headless_chrome blocks on every call
        tokio::task::spawn_blocking(move || fetch_page(&browser, &url, &options)).await?
    }

    fn source_name(&self) -> &'static str {
        "headless Chrome"
    }
}

fn fetch_page(browser: &Browser, url: &str, options: &BrowserOptions) -> Result<String, FetchError> {
    let tab = browser
        .new_tab()
        .context("Failed to open tab")
        .map_err(FetchError::Browser)?;

    let html = closing_after(|| load_page(&tab, url, options), || tab.close(true))?;

    if html.trim().is_empty() {
        return Err(FetchError::EmptyPage);
    }

    debug!("Downloaded {} bytes of HTML", html.len());
    Ok(html)
}

/// Runs `work`, then `close` whatever `work` returned
fn closing_after<T, R, E: fmt::Display>(
    work: impl FnOnce() -> Result<T, FetchError>,
    close: impl FnOnce() -> Result<R, E>,
) -> Result<T, FetchError> {
    let result = work();
    if let Err(e) = close() {
        debug!("Failed to close tab: {}", e);
    }
    result
}

fn load_page(tab: &Tab, url: &str, options: &BrowserOptions) -> Result<String, FetchError> {
    tab.set_default_timeout(options.timeout);

    tab.enable_stealth_mode()
        .context("Failed to enable stealth mode")
        .map_err(FetchError::Browser)?;
    tab.set_user_agent(USER_AGENT, Some("en-IE,en;q=0.9"), None)
        .context("Failed to set user agent")
        .map_err(FetchError::Browser)?;

    info!("Opening search page {}", url);
    tab.navigate_to(url)
        .and_then(|tab| tab.wait_until_navigated())
        .with_context(|| format!("Failed to navigate to {}", url))
        .map_err(FetchError::Browser)?;

    // Cookie banner covers the results on first visit
    if let Err(e) = tab.evaluate(ACCEPT_COOKIES_JS, false) {
        debug!("Cookie banner script failed: {}", e);
    }
    thread::sleep(Duration::from_secs(2));

    if let Err(e) = tab.wait_for_element(&options.wait_selector) {
        if let Some(dir) = &options.debug_dir {
            capture_debug(tab, dir, None);
        }
        return Err(FetchError::Timeout {
            timeout_secs: options.timeout.as_secs(),
            reason: format!("{} ({})", options.wait_selector, e),
        });
    }

    let html = tab
        .get_content()
        .context("Failed to read page HTML")
        .map_err(FetchError::Browser)?;

    if let Some(dir) = &options.debug_dir {
        capture_debug(tab, dir, Some(&html));
    }

    Ok(html)
}

/// Best effort: a failed capture never fails the fetch
fn capture_debug(tab: &Tab, dir: &Path, html: Option<&str>) {
    if let Err(e) = std::fs::create_dir_all(dir) {
        warn!("Could not create debug directory {}: {}", dir.display(), e);
        return;
    }

    if let Some(html) = html {
        let path = dir.join("search_page.html");
        match std::fs::write(&path, html) {
            Ok(()) => info!("Saved page HTML to {} ({} bytes)", path.display(), html.len()),
            Err(e) => warn!("Could not save page HTML: {}", e),
        }
    }

    let screenshot = tab.capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true);
    match screenshot {
        Ok(data) => {
            let path = dir.join("search_page.png");
            match std::fs::write(&path, data) {
                Ok(()) => info!("Saved screenshot to {}", path.display()),
                Err(e) => warn!("Could not save screenshot: {}", e),
            }
        }
        Err(e) => warn!("Could not capture screenshot: {}", e),
    }
}
