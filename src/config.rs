use crate::error::ConfigError;
use crate::models::{FilterCriteria, LocationCode};
use crate::notify::SmtpSettings;
use crate::scrapers::types::DEFAULT_SEARCH_URL;
use chrono::NaiveDate;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Which fetcher renders the search page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchBackend {
    Browser,
    Zyte { api_key: String },
}

/// Everything a run needs, read once at start
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub smtp: SmtpSettings,
    pub recipient: String,
    pub seen_listings_file: PathBuf,
    pub criteria: FilterCriteria,
    pub search_url: String,
    pub backend: FetchBackend,
    pub fetch_timeout: Duration,
    pub debug_capture_dir: Option<PathBuf>,
    pub log_level: String,
}

impl AppConfig {
    /// Load from the process environment, reading `.env` first if present
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let username = get("EMAIL_ADDRESS").ok_or(ConfigError::Missing("EMAIL_ADDRESS"))?;
        let password = get("EMAIL_APP_PASSWORD").ok_or(ConfigError::Missing("EMAIL_APP_PASSWORD"))?;
        let recipient = get("NOTIFY_RECIPIENT").unwrap_or_else(|| username.clone());

        let smtp = SmtpSettings {
            server: get("SMTP_SERVER").unwrap_or_else(|| "smtp-mail.outlook.com".to_string()),
            port: parse_or("SMTP_PORT", get("SMTP_PORT"), 587, "a port number")?,
            username,
            password,
        };

        let price_min = parse_or("PRICE_MIN", get("PRICE_MIN"), 1000, "a whole euro amount")?;
        let price_max = parse_or("PRICE_MAX", get("PRICE_MAX"), 1700, "a whole euro amount")?;
        if price_min > price_max {
            return Err(ConfigError::PriceRange {
                min: price_min,
                max: price_max,
            });
        }

        let codes = get("LOCATION_CODES").unwrap_or_else(|| "D6,D7,D8".to_string());
        let location_codes: Vec<LocationCode> = codes
            .split(',')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(LocationCode::new)
            .collect();
        if location_codes.is_empty() {
            return Err(ConfigError::Invalid {
                name: "LOCATION_CODES",
                expected: "a comma separated list of codes",
                value: codes,
            });
        }

        let earliest_available_date = get("AVAILABLE_BY")
            .map(|value| {
                NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|_| ConfigError::Invalid {
                    name: "AVAILABLE_BY",
                    expected: "a YYYY-MM-DD date",
                    value,
                })
            })
            .transpose()?;

        let backend = match get("FETCH_BACKEND").as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("browser") => FetchBackend::Browser,
            Some("zyte") => FetchBackend::Zyte {
                api_key: get("ZYTE_API_KEY").ok_or(ConfigError::Missing("ZYTE_API_KEY"))?,
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "FETCH_BACKEND",
                    expected: "browser or zyte",
                    value: other.to_string(),
                })
            }
        };

        let timeout_secs: u64 = parse_or("FETCH_TIMEOUT_SECS", get("FETCH_TIMEOUT_SECS"), 60, "a number of seconds")?;

        Ok(Self {
            smtp,
            recipient,
            seen_listings_file: get("SEEN_LISTINGS_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("seen_listings.txt")),
            criteria: FilterCriteria {
                price_min,
                price_max,
                location_codes,
                earliest_available_date,
            },
            search_url: get("SEARCH_URL").unwrap_or_else(|| DEFAULT_SEARCH_URL.to_string()),
            backend,
            fetch_timeout: Duration::from_secs(timeout_secs),
            debug_capture_dir: get("DEBUG_CAPTURE_DIR").map(PathBuf::from),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or<T: FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
            name,
            expected,
            value,
        }),
    }
}
