pub mod config;
pub mod error;
pub mod filter;
pub mod hunter;
pub mod models;
pub mod notify;
pub mod scrapers;
pub mod store;
pub mod telemetry;

pub use hunter::{Hunter, ListingOutcome, RunSummary};
pub use models::{FilterCriteria, Listing, LocationCode};
